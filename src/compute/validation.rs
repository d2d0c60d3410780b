//! Precondition checks shared by the compute routines.

use crate::error::{GeoBlocksError, Result};
use crate::feature::open_ring;
use geo::{Coord, Point, Polygon};

/// Largest geohash precision supported (60 bits of interleaved coordinates).
pub const MAX_GEOHASH_PRECISION: usize = 12;

/// Validates a 2D point has valid longitude and latitude.
///
/// Longitude: [-180.0, 180.0], Latitude: [-90.0, 90.0]
///
/// # Examples
///
/// ```
/// use geoblocks::compute::validation::validate_geographic_point;
/// use geo::Point;
///
/// assert!(validate_geographic_point(&Point::new(116.4, 39.9)).is_ok());
/// assert!(validate_geographic_point(&Point::new(200.0, 39.9)).is_err());
/// assert!(validate_geographic_point(&Point::new(116.4, 95.0)).is_err());
/// ```
pub fn validate_geographic_point(point: &Point) -> Result<()> {
    let (x, y) = (point.x(), point.y());

    if !x.is_finite() {
        return Err(GeoBlocksError::InvalidInput(format!(
            "Longitude must be finite, got: {}",
            x
        )));
    }

    if !y.is_finite() {
        return Err(GeoBlocksError::InvalidInput(format!(
            "Latitude must be finite, got: {}",
            y
        )));
    }

    if !(-180.0..=180.0).contains(&x) {
        return Err(GeoBlocksError::InvalidInput(format!(
            "Longitude out of range [-180.0, 180.0]: {}",
            x
        )));
    }

    if !(-90.0..=90.0).contains(&y) {
        return Err(GeoBlocksError::InvalidInput(format!(
            "Latitude out of range [-90.0, 90.0]: {}",
            y
        )));
    }

    Ok(())
}

/// Validates every coordinate of a list.
pub fn validate_coords(coords: &[Coord]) -> Result<()> {
    for (idx, coord) in coords.iter().enumerate() {
        validate_geographic_point(&Point::from(*coord))
            .map_err(|e| GeoBlocksError::InvalidInput(format!("Point at index {}: {}", idx, e)))?;
    }
    Ok(())
}

/// Validates a geohash precision lies in `1..=12`.
pub fn validate_precision(precision: usize) -> Result<()> {
    if (1..=MAX_GEOHASH_PRECISION).contains(&precision) {
        Ok(())
    } else {
        Err(GeoBlocksError::InvalidPrecision(precision))
    }
}

/// Validates a closed ring and returns it open (closing duplicate removed).
///
/// A valid ring has at least 4 entries including the closing duplicate, i.e.
/// at least 3 distinct vertices, and finite coordinates.
pub fn validate_ring(ring: &[Coord]) -> Result<Vec<Coord>> {
    if ring.len() < 4 || ring.first() != ring.last() {
        return Err(GeoBlocksError::InvalidInput(format!(
            "Ring must be closed with at least 4 entries, got {}",
            ring.len()
        )));
    }
    if let Some(idx) = ring.iter().position(|c| !c.x.is_finite() || !c.y.is_finite()) {
        return Err(GeoBlocksError::InvalidInput(format!(
            "Ring coordinate at index {} is not finite",
            idx
        )));
    }

    let open = open_ring(ring);
    let mut distinct = open.clone();
    distinct.dedup();
    if distinct.len() < 3 {
        return Err(GeoBlocksError::InvalidInput(
            "Ring must have at least 3 distinct vertices".to_string(),
        ));
    }
    Ok(open)
}

/// Validates a polygon has no holes and a valid exterior; returns the open exterior ring.
pub fn validate_simple_polygon(polygon: &Polygon) -> Result<Vec<Coord>> {
    if !polygon.interiors().is_empty() {
        return Err(GeoBlocksError::unsupported(
            "Polygon without holes",
            format!("Polygon with {} holes", polygon.interiors().len()),
        ));
    }
    validate_ring(&polygon.exterior().0)
}

/// Validates an open ring has exactly 4 edges.
pub fn validate_quad(open: &[Coord]) -> Result<()> {
    if open.len() != 4 {
        return Err(GeoBlocksError::NotAQuad { edges: open.len() });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{coord, polygon};

    #[test]
    fn test_valid_geographic_point() {
        assert!(validate_geographic_point(&Point::new(116.4074, 39.9042)).is_ok());
        assert!(validate_geographic_point(&Point::new(180.0, 0.0)).is_ok());
        assert!(validate_geographic_point(&Point::new(-180.0, -90.0)).is_ok());
    }

    #[test]
    fn test_invalid_geographic_point() {
        assert!(validate_geographic_point(&Point::new(f64::NAN, 0.0)).is_err());
        assert!(validate_geographic_point(&Point::new(0.0, f64::INFINITY)).is_err());
        assert!(validate_geographic_point(&Point::new(-181.0, 0.0)).is_err());
    }

    #[test]
    fn test_validate_coords_reports_index() {
        let coords = vec![coord! { x: 0.0, y: 0.0 }, coord! { x: 0.0, y: 91.0 }];
        let err = validate_coords(&coords).unwrap_err();
        assert!(err.to_string().contains("index 1"));
    }

    #[test]
    fn test_validate_precision() {
        assert!(validate_precision(1).is_ok());
        assert!(validate_precision(12).is_ok());
        assert!(matches!(
            validate_precision(0),
            Err(GeoBlocksError::InvalidPrecision(0))
        ));
        assert!(validate_precision(13).is_err());
    }

    #[test]
    fn test_validate_ring() {
        let ring = vec![
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 1.0, y: 0.0 },
            coord! { x: 1.0, y: 1.0 },
            coord! { x: 0.0, y: 0.0 },
        ];
        assert_eq!(validate_ring(&ring).unwrap().len(), 3);

        let unclosed = &ring[..3];
        assert!(validate_ring(unclosed).is_err());

        let collapsed = vec![
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 1.0, y: 0.0 },
            coord! { x: 1.0, y: 0.0 },
            coord! { x: 0.0, y: 0.0 },
        ];
        assert!(validate_ring(&collapsed).is_err());
    }

    #[test]
    fn test_validate_simple_polygon_rejects_holes() {
        let holed = polygon!(
            exterior: [(x: 0.0, y: 0.0), (x: 4.0, y: 0.0), (x: 4.0, y: 4.0), (x: 0.0, y: 4.0)],
            interiors: [[(x: 1.0, y: 1.0), (x: 2.0, y: 1.0), (x: 2.0, y: 2.0)]],
        );
        assert!(matches!(
            validate_simple_polygon(&holed),
            Err(GeoBlocksError::UnsupportedGeometry { .. })
        ));
    }

    #[test]
    fn test_validate_quad() {
        let tri = vec![
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 1.0, y: 0.0 },
            coord! { x: 1.0, y: 1.0 },
        ];
        assert!(matches!(
            validate_quad(&tri),
            Err(GeoBlocksError::NotAQuad { edges: 3 })
        ));
    }
}
