//! Spatial operations and utilities leveraging the geo crate.
//!
//! Every call into the `geo` crate made by the subdivision, indexing and
//! injection routines goes through this module. `geo`'s metric spaces take
//! and return meters, so distances here are meters end to end and no
//! kilometer conversion happens at this boundary.

use geo::{
    Bearing, BoundingRect, ChamberlainDuquetteArea, Contains, Destination, Distance, Euclidean,
    Geodesic, Geometry, Haversine, InteriorPoint, InterpolatePoint, Intersects, LineString, Point,
    Polygon, Rect, Relate, Rhumb,
};
use serde::{Deserialize, Serialize};

/// Distance metrics for spatial calculations.
///
/// Different metrics are appropriate for different use cases:
/// - **Haversine**: Fast spherical distance, good for most lon/lat calculations
/// - **Geodesic**: More accurate ellipsoidal distance (Karney 2013), slower
/// - **Rhumb**: Constant bearing distance, useful for navigation
/// - **Euclidean**: Planar distance, only for projected coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Haversine formula - assumes spherical Earth, fast and accurate enough for most uses
    #[default]
    Haversine,
    /// Geodesic distance using Karney (2013) - more accurate, accounts for Earth's ellipsoid
    Geodesic,
    /// Rhumb line (loxodrome) - maintains constant bearing
    Rhumb,
    /// Euclidean distance - for planar/projected coordinates only
    Euclidean,
}

/// Calculate the distance between two points using the specified metric.
///
/// # Returns
///
/// Distance in meters (coordinate units for `Euclidean`)
///
/// # Examples
///
/// ```rust
/// use geoblocks::spatial::{distance_between, DistanceMetric};
/// use geo::Point;
///
/// let beijing = Point::new(116.4074, 39.9042);
/// let shanghai = Point::new(121.4737, 31.2304);
///
/// let dist = distance_between(&beijing, &shanghai, DistanceMetric::Haversine);
/// assert!(dist > 1_000_000.0 && dist < 1_100_000.0);
/// ```
pub fn distance_between(point1: &Point, point2: &Point, metric: DistanceMetric) -> f64 {
    match metric {
        DistanceMetric::Haversine => Haversine.distance(*point1, *point2),
        DistanceMetric::Geodesic => Geodesic.distance(*point1, *point2),
        DistanceMetric::Rhumb => Rhumb.distance(*point1, *point2),
        DistanceMetric::Euclidean => Euclidean.distance(*point1, *point2),
    }
}

/// Point a `fraction` of the way from `start` to `end` along the metric's path.
///
/// The endpoints are returned exactly for fractions 0 and 1 so that shared
/// corners of neighbouring pieces stay bit-identical.
pub fn point_along(start: &Point, end: &Point, fraction: f64, metric: DistanceMetric) -> Point {
    if fraction <= 0.0 || start == end {
        return *start;
    }
    if fraction >= 1.0 {
        return *end;
    }
    match metric {
        DistanceMetric::Haversine => Haversine.point_at_ratio_between(*start, *end, fraction),
        DistanceMetric::Geodesic => Geodesic.point_at_ratio_between(*start, *end, fraction),
        DistanceMetric::Rhumb => Rhumb.point_at_ratio_between(*start, *end, fraction),
        DistanceMetric::Euclidean => Euclidean.point_at_ratio_between(*start, *end, fraction),
    }
}

/// Midpoint of two points along the metric's path.
pub fn midpoint(start: &Point, end: &Point, metric: DistanceMetric) -> Point {
    point_along(start, end, 0.5, metric)
}

/// Point at an arc-length `fraction` (clamped to `[0, 1]`) of a whole line.
///
/// Returns `None` for a line without coordinates.
///
/// # Examples
///
/// ```rust
/// use geoblocks::spatial::{along_line, DistanceMetric};
/// use geo::{line_string, Point};
///
/// let line = line_string![(x: 0.0, y: 0.0), (x: 2.0, y: 0.0), (x: 2.0, y: 2.0)];
/// let half = along_line(&line, 0.5, DistanceMetric::Euclidean).unwrap();
/// assert_eq!(half, Point::new(2.0, 0.0));
/// ```
pub fn along_line(line: &LineString, fraction: f64, metric: DistanceMetric) -> Option<Point> {
    let points: Vec<Point> = line.points().collect();
    let first = *points.first()?;
    let fraction = fraction.clamp(0.0, 1.0);

    let lengths: Vec<f64> = points
        .windows(2)
        .map(|w| distance_between(&w[0], &w[1], metric))
        .collect();
    let total: f64 = lengths.iter().sum();
    if total == 0.0 {
        return Some(first);
    }

    let mut remaining = total * fraction;
    for (segment, length) in points.windows(2).zip(&lengths) {
        if remaining <= *length {
            let ratio = if *length == 0.0 { 0.0 } else { remaining / length };
            return Some(point_along(&segment[0], &segment[1], ratio, metric));
        }
        remaining -= length;
    }
    points.last().copied()
}

/// Initial great-circle bearing from `origin` to `destination`, degrees in `[0, 360)`.
pub fn bearing(origin: &Point, destination: &Point) -> f64 {
    Haversine.bearing(*origin, *destination)
}

/// Project `origin` along a constant compass bearing for `meters`.
///
/// # Examples
///
/// ```rust
/// use geoblocks::spatial::{distance_between, rhumb_destination, DistanceMetric};
/// use geo::Point;
///
/// let origin = Point::new(116.0, 39.0);
/// let north = rhumb_destination(&origin, 0.0, 1000.0);
/// assert!(north.y() > origin.y());
/// let dist = distance_between(&origin, &north, DistanceMetric::Rhumb);
/// assert!((dist - 1000.0).abs() < 1e-3);
/// ```
pub fn rhumb_destination(origin: &Point, bearing_degrees: f64, meters: f64) -> Point {
    Rhumb.destination(*origin, bearing_degrees, meters)
}

/// Axis-aligned bounding box of a geometry, `None` when it has no coordinates.
pub fn bbox(geometry: &Geometry) -> Option<Rect> {
    geometry.bounding_rect()
}

/// Center of the bounding box of a geometry.
pub fn bbox_center(geometry: &Geometry) -> Option<Point> {
    bbox(geometry).map(|rect| Point::from(rect.center()))
}

/// A point guaranteed to lie on the geometry (inside it for polygons).
pub fn point_on_geometry(geometry: &Geometry) -> Option<Point> {
    geometry.interior_point()
}

/// True when `b` lies entirely inside `a` and their interiors meet.
pub fn contains(a: &Geometry, b: &Geometry) -> bool {
    a.relate(b).is_contains()
}

/// True when `a` lies entirely inside `b` (the converse of [`contains`]).
pub fn within(a: &Geometry, b: &Geometry) -> bool {
    a.relate(b).is_within()
}

/// True when the geometries are topologically equal.
pub fn equals(a: &Geometry, b: &Geometry) -> bool {
    a.relate(b).is_equal_topo()
}

/// True when the geometries have the same dimension, their interiors meet,
/// and neither covers the other.
pub fn overlaps(a: &Geometry, b: &Geometry) -> bool {
    a.relate(b).is_overlaps()
}

/// True when the geometries share at least one point.
pub fn intersects(a: &Geometry, b: &Geometry) -> bool {
    a.intersects(b)
}

/// Check if a point is contained within a polygon.
///
/// # Examples
///
/// ```rust
/// use geoblocks::spatial::point_in_polygon;
/// use geo::{polygon, Point};
///
/// let poly = polygon![
///     (x: 116.0, y: 39.0),
///     (x: 117.0, y: 39.0),
///     (x: 117.0, y: 40.0),
///     (x: 116.0, y: 40.0),
///     (x: 116.0, y: 39.0),
/// ];
///
/// assert!(point_in_polygon(&poly, &Point::new(116.5, 39.5)));
/// assert!(!point_in_polygon(&poly, &Point::new(118.0, 39.5)));
/// ```
pub fn point_in_polygon(polygon: &Polygon, point: &Point) -> bool {
    polygon.contains(point)
}

/// Area of a polygon in square meters on a spherical Earth.
pub fn polygon_area(polygon: &Polygon) -> f64 {
    polygon.chamberlain_duquette_unsigned_area()
}

/// Area of a polygon in squared coordinate units.
pub fn planar_area(polygon: &Polygon) -> f64 {
    use geo::Area;
    polygon.unsigned_area()
}
