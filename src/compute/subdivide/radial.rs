use super::{emit, source_ring};
use crate::compute::reflex::find_all_reflex_points;
use crate::error::{GeoBlocksError, Result};
use crate::spatial::{DistanceMetric, bbox_center, midpoint};
use crate::types::Config;
use geo::{Coord, Geometry, LineString, Point};
use geojson::{Feature, FeatureCollection};

/// Split a convex open ring into one quad per vertex around its bbox center.
///
/// Quad `i` is `[center, mid(prev, v), v, mid(v, next)]`.
pub fn radial_split(
    ring: &[Coord],
    metric: DistanceMetric,
    tolerance: f64,
) -> Result<Vec<Vec<Coord>>> {
    if let Some(reflex) = find_all_reflex_points(ring, tolerance).first() {
        return Err(GeoBlocksError::ReflexVertex {
            index: reflex.coord_index,
        });
    }
    let n = ring.len();
    if n < 3 {
        return Err(GeoBlocksError::InvalidInput(format!(
            "Radial split needs at least 3 vertices, got {}",
            n
        )));
    }

    let center = bbox_center(&Geometry::LineString(LineString::from(ring.to_vec())))
        .map(|p| p.0)
        .ok_or_else(|| GeoBlocksError::InvalidInput("Ring has no coordinates".to_string()))?;

    let mids: Vec<Coord> = (0..n)
        .map(|i| midpoint(&Point::from(ring[i]), &Point::from(ring[(i + 1) % n]), metric).0)
        .collect();

    Ok((0..n)
        .map(|i| vec![center, mids[(i + n - 1) % n], ring[i], mids[i]])
        .collect())
}

/// Split a convex polygon into as many quads as it has vertices.
///
/// Fails with [`GeoBlocksError::ReflexVertex`] on a non-convex polygon.
pub fn quads_by_radial_split(polygon: &Feature, config: &Config) -> Result<FeatureCollection> {
    let ring = source_ring(polygon)?;
    let quads = radial_split(&ring, config.distance_metric, config.reflex_tolerance)?;
    log::debug!("Radial split produced {} quads", quads.len());
    emit(polygon, quads)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::{polygon_feature, polygon_from_feature};
    use crate::spatial::planar_area;
    use geo::coord;

    fn hexagon() -> Vec<Coord> {
        (0..6)
            .map(|i| {
                let a = (i as f64 * 60.0).to_radians();
                coord! { x: 0.01 * a.cos(), y: 0.01 * a.sin() }
            })
            .collect()
    }

    #[test]
    fn test_radial_split_one_quad_per_vertex() {
        let polygon = polygon_feature(&hexagon(), None).unwrap();
        let config = Config::default().with_distance_metric(DistanceMetric::Euclidean);
        let quads = quads_by_radial_split(&polygon, &config).unwrap();
        assert_eq!(quads.features.len(), 6);

        let source = planar_area(&polygon_from_feature(&polygon).unwrap());
        let total: f64 = quads
            .features
            .iter()
            .map(|f| planar_area(&polygon_from_feature(f).unwrap()))
            .sum();
        assert!((total - source).abs() / source < 1e-9);
    }

    #[test]
    fn test_radial_split_rejects_reflex() {
        let dart = polygon_feature(
            &[
                coord! { x: 0.0, y: 0.0 },
                coord! { x: 0.01, y: 0.004 },
                coord! { x: 0.02, y: 0.0 },
                coord! { x: 0.01, y: 0.02 },
            ],
            None,
        )
        .unwrap();
        assert!(matches!(
            quads_by_radial_split(&dart, &Config::default()),
            Err(GeoBlocksError::ReflexVertex { index: 1 })
        ));
    }
}
