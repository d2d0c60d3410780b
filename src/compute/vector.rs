//! Vector primitives over plain numeric arrays.
//!
//! Vectors live in a local planar frame: `x` east, `y` north.

use crate::error::{GeoBlocksError, Result};
use crate::spatial::rhumb_destination;
use geo::Point;
use geoblocks_types::Vector2;

const NORTH: Vector2 = [0.0, 1.0];

/// Euclidean norm.
///
/// # Examples
///
/// ```
/// use geoblocks::compute::vector::magnitude;
///
/// assert_eq!(magnitude(&[3.0, 4.0]), 5.0);
/// ```
pub fn magnitude(v: &[f64]) -> f64 {
    v.iter().map(|c| c * c).sum::<f64>().sqrt()
}

/// Dot product of two vectors of equal length.
pub fn dot_product(v1: &[f64], v2: &[f64]) -> Result<f64> {
    if v1.len() != v2.len() {
        return Err(GeoBlocksError::DimensionMismatch {
            left: v1.len(),
            right: v2.len(),
        });
    }
    Ok(v1.iter().zip(v2).map(|(a, b)| a * b).sum())
}

/// Signed area of the parallelogram spanned by `v1` and `v2`.
///
/// Positive when `v2` turns left (counter-clockwise) from `v1`.
pub fn determinant_2d(v1: Vector2, v2: Vector2) -> f64 {
    v1[0] * v2[1] - v1[1] * v2[0]
}

/// Unsigned angle between two vectors, in degrees within `[0, 180]`.
///
/// Fails for vectors of different lengths or of zero magnitude.
///
/// # Examples
///
/// ```
/// use geoblocks::compute::vector::angle_between;
///
/// let angle = angle_between(&[1.0, 0.0], &[0.0, 1.0]).unwrap();
/// assert!((angle - 90.0).abs() < 1e-12);
/// ```
pub fn angle_between(v1: &[f64], v2: &[f64]) -> Result<f64> {
    let dot = dot_product(v1, v2)?;
    let norms = magnitude(v1) * magnitude(v2);
    if norms == 0.0 {
        return Err(GeoBlocksError::InvalidInput(
            "Cannot measure an angle against a zero-length vector".to_string(),
        ));
    }
    // Norm of the wedge product, exact zero for parallel vectors
    let wedge = (0..v1.len())
        .flat_map(|i| (i + 1..v1.len()).map(move |j| (i, j)))
        .map(|(i, j)| {
            let w = v1[i] * v2[j] - v1[j] * v2[i];
            w * w
        })
        .sum::<f64>()
        .sqrt();
    Ok(wedge.atan2(dot).to_degrees())
}

fn unit_angle(cosine: f64) -> f64 {
    cosine.clamp(-1.0, 1.0).acos().to_degrees()
}

/// Compass bearing of an east/north displacement, degrees in `[0, 360)`.
fn offset_bearing(offset: Vector2, length: f64) -> f64 {
    let angle = unit_angle(offset[1] / length);
    if determinant_2d(offset, NORTH) < 0.0 {
        360.0 - angle
    } else {
        angle
    }
}

/// Project `origin` by a displacement given in meters in the local frame.
///
/// The displacement is turned into a compass bearing, offset clockwise by
/// `rotation_deg`, and followed along a rhumb line for its length. A zero
/// displacement returns `origin`.
///
/// # Examples
///
/// ```
/// use geoblocks::compute::vector::find_new_coord;
/// use geo::Point;
///
/// let origin = Point::new(116.0, 39.0);
/// let east = find_new_coord(&origin, [500.0, 0.0], 0.0);
/// assert!(east.x() > origin.x());
/// assert!((east.y() - origin.y()).abs() < 1e-9);
/// ```
pub fn find_new_coord(origin: &Point, offset_m: Vector2, rotation_deg: f64) -> Point {
    let length = magnitude(&offset_m);
    if length == 0.0 {
        return *origin;
    }
    let bearing = (offset_bearing(offset_m, length) + rotation_deg).rem_euclid(360.0);
    rhumb_destination(origin, bearing, length)
}

/// Wrap ring indices into `[0, ring_len)`.
///
/// Any integer wraps, however far out of range.
pub fn index_check(indices: &[isize], ring_len: usize) -> Result<Vec<usize>> {
    if ring_len == 0 {
        return Err(GeoBlocksError::InvalidInput(
            "Cannot wrap indices into an empty ring".to_string(),
        ));
    }
    let n = ring_len as isize;
    Ok(indices
        .iter()
        .map(|i| i.rem_euclid(n) as usize)
        .collect())
}

/// `to - from` as a planar vector.
pub(crate) fn between(from: &geo::Coord, to: &geo::Coord) -> Vector2 {
    [to.x - from.x, to.y - from.y]
}
