use super::reflex_split::quad_reflex_split;
use super::{emit, source_ring};
use crate::compute::reflex::find_all_reflex_points;
use crate::compute::validation::validate_quad;
use crate::error::{GeoBlocksError, Result};
use crate::spatial::{DistanceMetric, distance_between, point_along};
use crate::types::Config;
use geo::{Coord, Point};
use geojson::{Feature, FeatureCollection};

/// Cut a convex quad into `num` strips across its long axis.
///
/// The long axis is the pair of opposite edges with the larger combined
/// length, starting from the pair holding the longest edge. Both edges of the
/// pair get `num + 1` evenly spaced points, one walked forward and the other
/// backward, and each strip joins consecutive points on the two edges.
///
/// Fails with [`GeoBlocksError::ReflexVertex`] when the quad is not convex.
pub fn quads_longest_split(
    quad: &[Coord],
    num: usize,
    metric: DistanceMetric,
    tolerance: f64,
) -> Result<Vec<Vec<Coord>>> {
    validate_quad(quad)?;
    if num == 0 {
        return Err(GeoBlocksError::InvalidInput(
            "Split count must be at least 1".to_string(),
        ));
    }
    if let Some(reflex) = find_all_reflex_points(quad, tolerance).first() {
        return Err(GeoBlocksError::ReflexVertex {
            index: reflex.coord_index,
        });
    }

    let corner = |i: usize| Point::from(quad[i % 4]);
    let lengths: Vec<f64> = (0..4)
        .map(|i| distance_between(&corner(i), &corner(i + 1), metric))
        .collect();
    let longest = (0..4).fold(0, |best, i| if lengths[i] > lengths[best] { i } else { best });
    let pair_len = |i: usize| lengths[i % 4] + lengths[(i + 2) % 4];
    let a = if pair_len(longest) >= pair_len(longest + 1) {
        longest
    } else {
        (longest + 1) % 4
    };

    let (a0, a1) = (corner(a), corner(a + 1));
    let (b0, b1) = (corner(a + 3), corner(a + 2));
    let side_a: Vec<Coord> = (0..=num)
        .map(|k| point_along(&a0, &a1, k as f64 / num as f64, metric).0)
        .collect();
    let side_b: Vec<Coord> = (0..=num)
        .map(|k| point_along(&b0, &b1, k as f64 / num as f64, metric).0)
        .collect();

    Ok((0..num)
        .map(|k| vec![side_a[k], side_a[k + 1], side_b[k + 1], side_b[k]])
        .collect())
}

/// Split a quad into `num` quads along its long axis.
///
/// A quad with a reflex vertex gets the three-way reflex split instead and
/// `num` is ignored.
///
/// # Examples
///
/// ```
/// use geoblocks::compute::subdivide::quads_by_number_split;
/// use geoblocks::feature::polygon_feature;
/// use geoblocks::Config;
/// use geo::coord;
///
/// let quad = polygon_feature(
///     &[
///         coord! { x: 0.0, y: 0.0 },
///         coord! { x: 0.03, y: 0.0 },
///         coord! { x: 0.03, y: 0.01 },
///         coord! { x: 0.0, y: 0.01 },
///     ],
///     None,
/// )
/// .unwrap();
/// let strips = quads_by_number_split(&quad, 3, &Config::default()).unwrap();
/// assert_eq!(strips.features.len(), 3);
/// ```
pub fn quads_by_number_split(
    polygon: &Feature,
    num: usize,
    config: &Config,
) -> Result<FeatureCollection> {
    let ring = source_ring(polygon)?;
    validate_quad(&ring)?;

    let reflex = find_all_reflex_points(&ring, config.reflex_tolerance);
    let quads = match reflex.first() {
        Some(r) => {
            log::debug!(
                "Quad has reflex vertex {}, splitting in three instead of {}",
                r.coord_index,
                num
            );
            quad_reflex_split(&ring, r)?
        }
        None => quads_longest_split(
            &ring,
            num,
            config.distance_metric,
            config.reflex_tolerance,
        )?,
    };
    emit(polygon, quads)
}
