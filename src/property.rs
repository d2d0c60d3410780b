//! Feature property helpers.
//!
//! Nested properties are addressed with dotted paths such as `"stats.pop"`.
//! Paths are tokenized once into a [`PropertyPath`] and walked with a cursor;
//! a missing intermediate key is an error, never a silent insert.

use crate::error::{GeoBlocksError, Result};
use geojson::{Feature, FeatureCollection, JsonObject};
use serde_json::Value;
use std::fmt;

/// Mutable properties of a feature, created empty when absent.
pub fn props_mut(feature: &mut Feature) -> &mut JsonObject {
    feature.properties.get_or_insert_with(JsonObject::new)
}

/// A tokenized dotted property path.
///
/// Whitespace is stripped and empty segments are dropped, so `" a . b.."`
/// is the same path as `"a.b"`.
///
/// # Examples
///
/// ```
/// use geoblocks::property::PropertyPath;
///
/// let path = PropertyPath::parse("stats. population").unwrap();
/// assert_eq!(path.segments(), &["stats", "population"]);
/// assert!(PropertyPath::parse(" . ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyPath {
    segments: Vec<String>,
}

impl PropertyPath {
    pub fn parse(path: &str) -> Result<Self> {
        let compact: String = path.chars().filter(|c| !c.is_whitespace()).collect();
        let segments: Vec<String> = compact
            .split('.')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if segments.is_empty() {
            return Err(GeoBlocksError::PropertyPath(format!(
                "Path '{}' has no segments",
                path
            )));
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    fn split_leaf(&self) -> (&[String], &str) {
        match self.segments.split_last() {
            Some((leaf, parents)) => (parents, leaf.as_str()),
            None => (&self.segments[..0], ""),
        }
    }

    fn get<'a>(&self, props: &'a JsonObject) -> Option<&'a Value> {
        let (first, rest) = self.segments.split_first()?;
        let mut current = props.get(first)?;
        for segment in rest {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// The object holding the leaf, walking every parent segment.
    fn parent_mut<'a>(&self, props: &'a mut JsonObject) -> Result<&'a mut JsonObject> {
        let (parents, _) = self.split_leaf();
        let mut current = props;
        for (depth, segment) in parents.iter().enumerate() {
            current = current
                .get_mut(segment)
                .ok_or_else(|| {
                    GeoBlocksError::PropertyPath(format!(
                        "Missing key '{}' in path '{}'",
                        segment, self
                    ))
                })?
                .as_object_mut()
                .ok_or_else(|| {
                    GeoBlocksError::PropertyPath(format!(
                        "Key '{}' at depth {} of '{}' is not an object",
                        segment, depth, self
                    ))
                })?;
        }
        Ok(current)
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

/// Value at a dotted path, `None` when any segment is missing.
pub fn get_prop_value<'a>(feature: &'a Feature, path: &str) -> Result<Option<&'a Value>> {
    let path = PropertyPath::parse(path)?;
    Ok(feature.properties.as_ref().and_then(|props| path.get(props)))
}

/// Set the value at a dotted path, creating the leaf.
///
/// Every intermediate key must already exist and hold an object.
pub fn set_prop_value(feature: &mut Feature, path: &str, value: Value) -> Result<()> {
    let path = PropertyPath::parse(path)?;
    let parent = path.parent_mut(props_mut(feature))?;
    let (_, leaf) = path.split_leaf();
    parent.insert(leaf.to_string(), value);
    Ok(())
}

/// Make sure every segment of a dotted path holds an object, creating empty
/// objects where keys are missing.
///
/// Fails when a segment already holds something other than an object.
pub fn ensure_prop_object(feature: &mut Feature, path: &str) -> Result<()> {
    let path = PropertyPath::parse(path)?;
    let mut current = props_mut(feature);
    for segment in path.segments() {
        current = current
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(JsonObject::new()))
            .as_object_mut()
            .ok_or_else(|| {
                GeoBlocksError::PropertyPath(format!(
                    "Key '{}' of '{}' is not an object",
                    segment, path
                ))
            })?;
    }
    Ok(())
}

/// Append to the array at a dotted path, creating an empty array first.
pub fn push_prop_value(feature: &mut Feature, path: &str, value: Value) -> Result<()> {
    let path = PropertyPath::parse(path)?;
    let parent = path.parent_mut(props_mut(feature))?;
    let (_, leaf) = path.split_leaf();
    match parent
        .entry(leaf.to_string())
        .or_insert_with(|| Value::Array(Vec::new()))
    {
        Value::Array(items) => {
            items.push(value);
            Ok(())
        }
        _ => Err(GeoBlocksError::PropertyPath(format!(
            "Value at '{}' is not an array",
            path
        ))),
    }
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Property names are dot-joined identifiers; anything else gets a `_` prefix.
fn sanitize_name(name: &str) -> String {
    if name.split('.').all(is_identifier) {
        name.to_string()
    } else {
        format!("_{}", name)
    }
}

/// Set a top-level property, returning the name actually used.
///
/// # Examples
///
/// ```
/// use geoblocks::feature::point_feature;
/// use geoblocks::property::set_property;
/// use geo::coord;
///
/// let mut feature = point_feature(coord! { x: 0.5, y: 0.5 }, None);
/// assert_eq!(set_property(&mut feature, "height", 3.into()), "height");
/// assert_eq!(set_property(&mut feature, "2nd floor", 4.into()), "_2nd floor");
/// ```
pub fn set_property(feature: &mut Feature, name: &str, value: Value) -> String {
    let name = sanitize_name(name);
    props_mut(feature).insert(name.clone(), value);
    name
}

/// Set several top-level properties at once, returning how many were set.
pub fn set_values(feature: &mut Feature, names: &[&str], values: Vec<Value>) -> Result<usize> {
    if names.len() != values.len() {
        return Err(GeoBlocksError::DimensionMismatch {
            left: names.len(),
            right: values.len(),
        });
    }
    for (name, value) in names.iter().zip(values) {
        set_property(feature, name, value);
    }
    Ok(names.len())
}

/// Set a top-level property on every feature of a collection.
pub fn add_prop(collection: &mut FeatureCollection, name: &str, value: &Value) {
    for feature in &mut collection.features {
        props_mut(feature).insert(name.to_string(), value.clone());
    }
}

/// Remove a top-level property from every feature, returning how many had it.
pub fn remove_prop(collection: &mut FeatureCollection, name: &str) -> usize {
    collection
        .features
        .iter_mut()
        .filter_map(|f| f.properties.as_mut())
        .filter_map(|props| props.remove(name))
        .count()
}

pub fn prop_names(feature: &Feature) -> Vec<String> {
    feature
        .properties
        .as_ref()
        .map(|props| props.keys().cloned().collect())
        .unwrap_or_default()
}

pub fn has_prop(feature: &Feature, name: &str) -> bool {
    feature
        .properties
        .as_ref()
        .is_some_and(|props| props.contains_key(name))
}

pub fn num_props(feature: &Feature) -> usize {
    feature.properties.as_ref().map_or(0, |props| props.len())
}

/// Aggregate computed by [`features_stat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stat {
    Min,
    Max,
    Mean,
}

impl Stat {
    /// Property key the aggregate is written under.
    pub fn key(self) -> &'static str {
        match self {
            Stat::Min => "min",
            Stat::Max => "max",
            Stat::Mean => "mean",
        }
    }

    /// Aggregate a list of values, `None` when it is empty.
    pub fn of(self, values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        Some(match self {
            Stat::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            Stat::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Stat::Mean => values.iter().sum::<f64>() / values.len() as f64,
        })
    }
}

/// Aggregate a numeric property over features.
///
/// Features without the property, or with a non-numeric value, are skipped.
/// Returns `None` when no feature contributes a value.
pub fn features_stat(features: &[Feature], path: &str, stat: Stat) -> Result<Option<f64>> {
    let path = PropertyPath::parse(path)?;
    let values: Vec<f64> = features
        .iter()
        .filter_map(|f| f.properties.as_ref())
        .filter_map(|props| path.get(props))
        .filter_map(Value::as_f64)
        .collect();
    Ok(stat.of(&values))
}
