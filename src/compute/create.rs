//! Feature constructors from an origin and metric offsets.
//!
//! Offsets are `[east, north]` displacements in meters from the origin,
//! optionally rotated clockwise as a whole by `rotation_deg`.

use crate::compute::vector::find_new_coord;
use crate::error::{GeoBlocksError, Result};
use crate::feature::{line_feature, point_feature, polygon_feature};
use geo::{Coord, Point};
use geoblocks_types::Vector2;
use geojson::{Feature, JsonObject};

fn project_all(origin: &Point, offsets: &[Vector2], rotation_deg: f64) -> Vec<Coord> {
    offsets
        .iter()
        .map(|offset| find_new_coord(origin, *offset, rotation_deg).0)
        .collect()
}

/// Point feature displaced from `origin`.
pub fn point_by_offset(
    origin: &Point,
    offset: Vector2,
    rotation_deg: f64,
    properties: Option<JsonObject>,
) -> Feature {
    point_feature(find_new_coord(origin, offset, rotation_deg).0, properties)
}

/// LineString feature through every offset, in order.
pub fn line_by_offsets(
    origin: &Point,
    offsets: &[Vector2],
    rotation_deg: f64,
    properties: Option<JsonObject>,
) -> Result<Feature> {
    line_feature(&project_all(origin, offsets, rotation_deg), properties)
}

/// Polygon feature whose ring visits every offset, closed automatically.
///
/// # Examples
///
/// ```
/// use geoblocks::compute::create::polygon_by_offsets;
/// use geoblocks::feature::ensure_coord_arr;
/// use geo::Point;
///
/// let origin = Point::new(116.0, 39.0);
/// let square = [[0.0, 0.0], [100.0, 0.0], [100.0, 100.0], [0.0, 100.0]];
/// let polygon = polygon_by_offsets(&origin, &square, 0.0, None).unwrap();
/// assert_eq!(ensure_coord_arr(&polygon).unwrap().len(), 5);
/// ```
pub fn polygon_by_offsets(
    origin: &Point,
    offsets: &[Vector2],
    rotation_deg: f64,
    properties: Option<JsonObject>,
) -> Result<Feature> {
    if offsets.len() < 3 {
        return Err(GeoBlocksError::InvalidInput(format!(
            "A polygon needs at least 3 offsets, got {}",
            offsets.len()
        )));
    }
    polygon_feature(&project_all(origin, offsets, rotation_deg), properties)
}
