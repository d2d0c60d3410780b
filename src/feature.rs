//! GeoJSON feature helpers.
//!
//! Conversion between GeoJSON features and `geo` geometries, ring handling,
//! feature constructors and feature-collection filters. Only Point,
//! LineString and Polygon (and their Multi forms for read-only predicates)
//! are understood.

use crate::error::{GeoBlocksError, Result};
use geo::{Coord, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};
use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};

/// GeoJSON type name of a geometry value.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

/// The geometry value of a feature, failing when the feature has none.
pub fn geometry_value(feature: &Feature) -> Result<&Value> {
    feature
        .geometry
        .as_ref()
        .map(|g| &g.value)
        .ok_or_else(|| GeoBlocksError::unsupported("a feature with geometry", "no geometry"))
}

fn position_to_coord(position: &[f64]) -> Result<Coord> {
    if position.len() < 2 {
        return Err(GeoBlocksError::InvalidInput(
            "Coordinate must have at least 2 values".to_string(),
        ));
    }
    Ok(Coord {
        x: position[0],
        y: position[1],
    })
}

fn positions_to_coords(positions: &[Vec<f64>]) -> Result<Vec<Coord>> {
    positions.iter().map(|p| position_to_coord(p)).collect()
}

fn rings_to_polygon(rings: &[Vec<Vec<f64>>]) -> Result<Polygon> {
    let Some((exterior, interiors)) = rings.split_first() else {
        return Err(GeoBlocksError::InvalidInput(
            "Polygon must have at least one ring".to_string(),
        ));
    };
    let exterior = LineString::from(positions_to_coords(exterior)?);
    let interiors = interiors
        .iter()
        .map(|ring| positions_to_coords(ring).map(LineString::from))
        .collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}

fn coord_to_position(coord: &Coord) -> Vec<f64> {
    vec![coord.x, coord.y]
}

fn coords_to_positions<'a>(coords: impl IntoIterator<Item = &'a Coord>) -> Vec<Vec<f64>> {
    coords.into_iter().map(coord_to_position).collect()
}

fn polygon_to_rings(polygon: &Polygon) -> Vec<Vec<Vec<f64>>> {
    let mut rings = Vec::with_capacity(1 + polygon.interiors().len());
    rings.push(coords_to_positions(polygon.exterior().coords()));
    for interior in polygon.interiors() {
        rings.push(coords_to_positions(interior.coords()));
    }
    rings
}

/// Convert a GeoJSON geometry value into a `geo` geometry.
pub fn value_to_geo(value: &Value) -> Result<geo::Geometry> {
    let geometry = match value {
        Value::Point(p) => geo::Geometry::Point(Point::from(position_to_coord(p)?)),
        Value::MultiPoint(ps) => geo::Geometry::MultiPoint(MultiPoint::new(
            positions_to_coords(ps)?.into_iter().map(Point::from).collect(),
        )),
        Value::LineString(ps) => {
            geo::Geometry::LineString(LineString::from(positions_to_coords(ps)?))
        }
        Value::MultiLineString(lines) => geo::Geometry::MultiLineString(MultiLineString::new(
            lines
                .iter()
                .map(|l| positions_to_coords(l).map(LineString::from))
                .collect::<Result<Vec<_>>>()?,
        )),
        Value::Polygon(rings) => geo::Geometry::Polygon(rings_to_polygon(rings)?),
        Value::MultiPolygon(polys) => geo::Geometry::MultiPolygon(MultiPolygon::new(
            polys
                .iter()
                .map(|rings| rings_to_polygon(rings))
                .collect::<Result<Vec<_>>>()?,
        )),
        Value::GeometryCollection(_) => {
            return Err(GeoBlocksError::unsupported(
                "a simple geometry",
                "GeometryCollection",
            ));
        }
    };
    Ok(geometry)
}

/// Convert a feature's geometry into a `geo` geometry.
pub fn to_geo(feature: &Feature) -> Result<geo::Geometry> {
    value_to_geo(geometry_value(feature)?)
}

/// Read a Point feature.
pub fn point_from_feature(feature: &Feature) -> Result<Point> {
    match geometry_value(feature)? {
        Value::Point(p) => Ok(Point::from(position_to_coord(p)?)),
        other => Err(GeoBlocksError::unsupported("Point", type_name(other))),
    }
}

/// Read a LineString feature.
pub fn line_from_feature(feature: &Feature) -> Result<LineString> {
    match geometry_value(feature)? {
        Value::LineString(ps) => Ok(LineString::from(positions_to_coords(ps)?)),
        other => Err(GeoBlocksError::unsupported("LineString", type_name(other))),
    }
}

/// Read a Polygon feature.
pub fn polygon_from_feature(feature: &Feature) -> Result<Polygon> {
    match geometry_value(feature)? {
        Value::Polygon(rings) => rings_to_polygon(rings),
        other => Err(GeoBlocksError::unsupported("Polygon", type_name(other))),
    }
}

/// Flatten a feature's coordinates to a single list.
///
/// Points yield one coordinate, lines their vertices and polygons their
/// exterior ring (closing duplicate included). Multi geometries with a single
/// member are unwrapped; anything else is rejected.
pub fn ensure_coord_arr(feature: &Feature) -> Result<Vec<Coord>> {
    match geometry_value(feature)? {
        Value::Point(p) => Ok(vec![position_to_coord(p)?]),
        Value::MultiPoint(ps) => positions_to_coords(ps),
        Value::LineString(ps) => positions_to_coords(ps),
        Value::MultiLineString(lines) if lines.len() == 1 => positions_to_coords(&lines[0]),
        Value::Polygon(rings) if !rings.is_empty() => positions_to_coords(&rings[0]),
        Value::MultiPolygon(polys) if polys.len() == 1 && !polys[0].is_empty() => {
            positions_to_coords(&polys[0][0])
        }
        other => Err(GeoBlocksError::unsupported(
            "a geometry with a single coordinate list",
            type_name(other),
        )),
    }
}

/// Drop the closing duplicate of a ring, if present.
pub fn open_ring(coords: &[Coord]) -> Vec<Coord> {
    let mut ring = coords.to_vec();
    if ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    ring
}

/// Append the closing duplicate to a ring, if missing.
pub fn close_ring(coords: &[Coord]) -> Vec<Coord> {
    let mut ring = coords.to_vec();
    if let Some(first) = ring.first().copied()
        && ring.last() != Some(&first)
    {
        ring.push(first);
    }
    ring
}

/// Build a Point feature.
pub fn point_feature(coord: Coord, properties: Option<JsonObject>) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(coord_to_position(&coord)))),
        id: None,
        properties,
        foreign_members: None,
    }
}

/// Build a LineString feature from at least two coordinates.
pub fn line_feature(coords: &[Coord], properties: Option<JsonObject>) -> Result<Feature> {
    if coords.len() < 2 {
        return Err(GeoBlocksError::InvalidInput(format!(
            "LineString needs at least 2 coordinates, got {}",
            coords.len()
        )));
    }
    Ok(Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::LineString(coords_to_positions(coords)))),
        id: None,
        properties,
        foreign_members: None,
    })
}

/// Build a Polygon feature from a ring, closing it when needed.
///
/// The ring must hold at least three distinct vertices.
pub fn polygon_feature(ring: &[Coord], properties: Option<JsonObject>) -> Result<Feature> {
    let ring = close_ring(ring);
    if ring.len() < 4 {
        return Err(GeoBlocksError::InvalidInput(format!(
            "Polygon ring needs at least 3 distinct vertices, got {}",
            ring.len().saturating_sub(1)
        )));
    }
    Ok(Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Polygon(vec![coords_to_positions(&ring)]))),
        id: None,
        properties,
        foreign_members: None,
    })
}

/// Build a Polygon feature from a `geo` polygon, holes included.
pub fn feature_from_polygon(polygon: &Polygon, properties: Option<JsonObject>) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Polygon(polygon_to_rings(polygon)))),
        id: None,
        properties,
        foreign_members: None,
    }
}

/// Wrap features into a collection.
pub fn feature_collection(features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

fn filter_by<'a>(
    collection: &'a FeatureCollection,
    keep: impl Fn(&Value) -> bool,
) -> Vec<&'a Feature> {
    collection
        .features
        .iter()
        .filter(|f| f.geometry.as_ref().is_some_and(|g| keep(&g.value)))
        .collect()
}

pub fn points(collection: &FeatureCollection) -> Vec<&Feature> {
    filter_by(collection, |v| matches!(v, Value::Point(_)))
}

pub fn line_strings(collection: &FeatureCollection) -> Vec<&Feature> {
    filter_by(collection, |v| matches!(v, Value::LineString(_)))
}

pub fn polygons(collection: &FeatureCollection) -> Vec<&Feature> {
    filter_by(collection, |v| matches!(v, Value::Polygon(_)))
}

pub fn polygons_with_holes(collection: &FeatureCollection) -> Vec<&Feature> {
    filter_by(collection, |v| matches!(v, Value::Polygon(rings) if rings.len() > 1))
}

pub fn multi_points(collection: &FeatureCollection) -> Vec<&Feature> {
    filter_by(collection, |v| matches!(v, Value::MultiPoint(_)))
}

pub fn multi_line_strings(collection: &FeatureCollection) -> Vec<&Feature> {
    filter_by(collection, |v| matches!(v, Value::MultiLineString(_)))
}

pub fn multi_polygons(collection: &FeatureCollection) -> Vec<&Feature> {
    filter_by(collection, |v| matches!(v, Value::MultiPolygon(_)))
}

/// Append a feature, returning the new collection length.
pub fn add_feature(collection: &mut FeatureCollection, feature: Feature) -> usize {
    collection.features.push(feature);
    collection.features.len()
}

/// Remove the first feature with the given id. Returns whether one was found.
///
/// Removing shifts the position of every later feature, so any geohash
/// dictionary built over the collection is stale afterwards.
pub fn delete_feature(collection: &mut FeatureCollection, id: &Id) -> bool {
    match collection
        .features
        .iter()
        .position(|f| f.id.as_ref() == Some(id))
    {
        Some(pos) => {
            collection.features.remove(pos);
            true
        }
        None => false,
    }
}

/// Rotate coordinates to the right by `num` places.
pub fn coords_shift<T>(coords: &mut [T], num: usize) {
    if !coords.is_empty() {
        coords.rotate_right(num % coords.len());
    }
}
