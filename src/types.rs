//! Configuration for geoblocks operations.
//!
//! A single serializable `Config` carries the knobs shared by the indexing,
//! injection and subdivision routines. It loads from JSON (and TOML with the
//! `toml` feature) and validates itself on load.
use crate::spatial::DistanceMetric;
use serde::de::Error;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Shared operation settings
///
/// # Example
///
/// ```rust
/// use geoblocks::Config;
///
/// // Create default config
/// let config = Config::default();
/// assert_eq!(config.geohash_precision, 8);
///
/// // Load from JSON
/// let json = r#"{
///     "geohash_precision": 6,
///     "distance_metric": "rhumb",
///     "fill_value": null
/// }"#;
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.geohash_precision, 6);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Geohash precision used when indexing features (1-12, default: 8)
    #[serde(default = "Config::default_geohash_precision")]
    pub geohash_precision: usize,

    /// Metric for edge lengths and along-edge interpolation
    #[serde(default)]
    pub distance_metric: DistanceMetric,

    /// Value injected into a target feature when no source feature matches
    #[serde(default = "Config::default_fill_value")]
    pub fill_value: Value,

    /// Determinant magnitude a vertex must exceed to count as reflex
    #[serde(default)]
    pub reflex_tolerance: f64,
}

impl Config {
    const fn default_geohash_precision() -> usize {
        8
    }

    fn default_fill_value() -> Value {
        Value::from(0)
    }

    pub fn with_geohash_precision(mut self, precision: usize) -> Self {
        self.geohash_precision = precision;
        self
    }

    pub fn with_distance_metric(mut self, metric: DistanceMetric) -> Self {
        self.distance_metric = metric;
        self
    }

    pub fn with_fill_value(mut self, value: impl Into<Value>) -> Self {
        self.fill_value = value.into();
        self
    }

    pub fn with_reflex_tolerance(mut self, tolerance: f64) -> Self {
        self.reflex_tolerance = tolerance;
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.geohash_precision < 1 || self.geohash_precision > 12 {
            return Err("Geohash precision must be between 1 and 12".to_string());
        }

        if !self.reflex_tolerance.is_finite() {
            return Err("Reflex tolerance must be finite (not NaN or infinity)".to_string());
        }
        if self.reflex_tolerance < 0.0 {
            return Err("Reflex tolerance must not be negative".to_string());
        }

        Ok(())
    }

    /// Load configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let config: Config = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(serde_json::Error::custom(e));
        }
        Ok(config)
    }

    /// Save configuration as JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load configuration from TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        let config: Config = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    /// Save configuration as TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            geohash_precision: Self::default_geohash_precision(),
            distance_metric: DistanceMetric::default(),
            fill_value: Self::default_fill_value(),
            reflex_tolerance: 0.0,
        }
    }
}
