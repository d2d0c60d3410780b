use crate::compute::line::rebuild_coords;
use crate::error::{GeoBlocksError, Result};
use crate::feature::{feature_collection, line_from_feature, polygon_feature};
use crate::spatial::DistanceMetric;
use geojson::{FeatureCollection, JsonObject};
use serde_json::Value;

/// Property numbering loft polygons in emission order.
pub const POLYGON_NUMBER_KEY: &str = "polygonNumber";

/// Loft quads between consecutive lines.
///
/// Lines listed in `flip` are reversed first. Every line is then rebuilt to
/// the larger vertex count of the first and last line, and vertex `j` of each
/// line is joined to vertex `j` of the next. Each quad carries only a
/// `polygonNumber` property, counted from 0.
pub fn polygons_by_loft(
    lines: &FeatureCollection,
    flip: &[usize],
    metric: DistanceMetric,
) -> Result<FeatureCollection> {
    if lines.features.len() < 2 {
        return Err(GeoBlocksError::InvalidInput(format!(
            "Loft needs at least 2 lines, got {}",
            lines.features.len()
        )));
    }

    let mut curves = lines
        .features
        .iter()
        .map(|f| line_from_feature(f).map(|l| l.0))
        .collect::<Result<Vec<_>>>()?;

    let mut flip = flip.to_vec();
    flip.sort_unstable();
    flip.dedup();
    for index in flip {
        curves
            .get_mut(index)
            .ok_or(GeoBlocksError::InvalidIndex {
                index,
                len: lines.features.len(),
            })?
            .reverse();
    }

    let target = curves
        .first()
        .map_or(0, Vec::len)
        .max(curves.last().map_or(0, Vec::len));
    let curves = curves
        .iter()
        .map(|c| rebuild_coords(c, target, metric))
        .collect::<Result<Vec<_>>>()?;

    let mut polygons = Vec::with_capacity((curves.len() - 1) * (target - 1));
    for pair in curves.windows(2) {
        let (here, next) = (&pair[0], &pair[1]);
        for j in 0..target - 1 {
            let mut props = JsonObject::new();
            props.insert(POLYGON_NUMBER_KEY.to_string(), Value::from(polygons.len()));
            let ring = [here[j], next[j], next[j + 1], here[j + 1]];
            polygons.push(polygon_feature(&ring, Some(props))?);
        }
    }

    log::debug!(
        "Lofted {} lines at {} vertices into {} polygons",
        curves.len(),
        target,
        polygons.len()
    );
    Ok(feature_collection(polygons))
}
