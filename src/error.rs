//! Error types for geoblocks.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GeoBlocksError>;

/// Everything that can go wrong in a geoblocks call.
///
/// Precondition violations fail fast. Geometric degeneracies are not errors:
/// they are logged and resolved by the routine's documented fallback.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GeoBlocksError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Vector dimensions differ: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },

    #[error("Index {index} is out of range for length {len}")]
    InvalidIndex { index: usize, len: usize },

    #[error("Expected a quad (4 edges), found {edges} edges")]
    NotAQuad { edges: usize },

    #[error("Polygon has a reflex vertex at index {index}")]
    ReflexVertex { index: usize },

    #[error("Unsupported geometry: expected {expected}, found {actual}")]
    UnsupportedGeometry { expected: String, actual: String },

    #[error("Geohash precision must be between 1 and 12, got {0}")]
    InvalidPrecision(usize),

    #[error("Property path error: {0}")]
    PropertyPath(String),

    #[error("Geohash dictionary indexed {indexed} features but the collection has {actual}")]
    StaleDictionary { indexed: usize, actual: usize },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GeoBlocksError {
    pub(crate) fn unsupported(expected: &str, actual: impl Into<String>) -> Self {
        GeoBlocksError::UnsupportedGeometry {
            expected: expected.to_string(),
            actual: actual.into(),
        }
    }
}
