//! Square grids over polygons.

use crate::error::{GeoBlocksError, Result};
use crate::feature::{feature_collection, polygon_feature, polygon_from_feature, to_geo};
use crate::spatial::{DistanceMetric, bbox, distance_between, intersects};
use geo::{Coord, Geometry, Point};
use geojson::{Feature, FeatureCollection, JsonObject};

fn carried_props(feature: &Feature, names: &[&str]) -> Result<Option<JsonObject>> {
    if names.is_empty() {
        return Ok(None);
    }
    let mut carried = JsonObject::new();
    for name in names {
        let value = feature
            .properties
            .as_ref()
            .and_then(|props| props.get(*name))
            .ok_or_else(|| {
                GeoBlocksError::InvalidInput(format!("Polygon has no property '{}'", name))
            })?;
        carried.insert(name.to_string(), value.clone());
    }
    Ok(Some(carried))
}

/// Cover a polygon with square cells of `size_m` meters.
///
/// Cells are laid out from the south-west corner of the polygon's bounding
/// box and kept when they touch the polygon. Each cell carries a copy of the
/// named polygon properties; naming a property the polygon lacks is an error.
pub fn grid_polygon(
    polygon: &Feature,
    size_m: f64,
    carry_props: &[&str],
) -> Result<FeatureCollection> {
    if !(size_m.is_finite() && size_m > 0.0) {
        return Err(GeoBlocksError::InvalidInput(format!(
            "Grid cell size must be positive, got {}",
            size_m
        )));
    }
    let shape = Geometry::Polygon(polygon_from_feature(polygon)?);
    let props = carried_props(polygon, carry_props)?;
    let rect = bbox(&shape)
        .ok_or_else(|| GeoBlocksError::InvalidInput("Polygon has no coordinates".to_string()))?;

    let (min, max) = (rect.min(), rect.max());
    let ground_width = distance_between(
        &Point::new(min.x, min.y),
        &Point::new(max.x, min.y),
        DistanceMetric::Haversine,
    );
    let ground_height = distance_between(
        &Point::new(min.x, min.y),
        &Point::new(min.x, max.y),
        DistanceMetric::Haversine,
    );
    if ground_width == 0.0 || ground_height == 0.0 {
        return Err(GeoBlocksError::InvalidInput(
            "Cannot grid a polygon with a flat bounding box".to_string(),
        ));
    }

    let cell_w = rect.width() * size_m / ground_width;
    let cell_h = rect.height() * size_m / ground_height;
    let cols = (rect.width() / cell_w).ceil().max(1.0) as usize;
    let rows = (rect.height() / cell_h).ceil().max(1.0) as usize;

    let mut cells = Vec::new();
    for col in 0..cols {
        for row in 0..rows {
            let x0 = min.x + col as f64 * cell_w;
            let y0 = min.y + row as f64 * cell_h;
            let ring = [
                Coord { x: x0, y: y0 },
                Coord { x: x0 + cell_w, y: y0 },
                Coord { x: x0 + cell_w, y: y0 + cell_h },
                Coord { x: x0, y: y0 + cell_h },
            ];
            let cell = polygon_feature(&ring, props.clone())?;
            if intersects(&to_geo(&cell)?, &shape) {
                cells.push(cell);
            }
        }
    }

    log::debug!(
        "Gridded polygon into {} of {} cells ({}x{})",
        cells.len(),
        cols * rows,
        cols,
        rows
    );
    Ok(feature_collection(cells))
}

/// Keep grid cells touching any mask feature, copying the named mask properties.
///
/// A cell touching several mask features is emitted once per feature.
pub fn mask_grid(
    grid: &FeatureCollection,
    mask: &FeatureCollection,
    mask_props: &[&str],
) -> Result<FeatureCollection> {
    let masks = mask
        .features
        .iter()
        .map(|f| to_geo(f).map(|g| (f, g)))
        .collect::<Result<Vec<_>>>()?;

    let mut kept = Vec::new();
    for cell in &grid.features {
        let cell_geo = to_geo(cell)?;
        for (mask_feature, mask_geo) in &masks {
            if !intersects(&cell_geo, mask_geo) {
                continue;
            }
            let mut cell = cell.clone();
            let props = cell.properties.get_or_insert_with(JsonObject::new);
            for name in mask_props {
                let value = mask_feature
                    .properties
                    .as_ref()
                    .and_then(|p| p.get(*name))
                    .cloned()
                    .unwrap_or_default();
                props.insert(name.to_string(), value);
            }
            kept.push(cell);
        }
    }
    Ok(feature_collection(kept))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::point_feature;
    use geo::coord;
    use serde_json::{Value, json};

    fn block() -> Feature {
        polygon_feature(
            &[
                coord! { x: 0.0, y: 0.0 },
                coord! { x: 0.01, y: 0.0 },
                coord! { x: 0.01, y: 0.01 },
                coord! { x: 0.0, y: 0.01 },
            ],
            json!({"zone": "A", "pop": 10}).as_object().cloned(),
        )
        .unwrap()
    }

    #[test]
    fn test_grid_covers_polygon() {
        // ~1.11 km square, 500 m cells -> 3 x 3
        let grid = grid_polygon(&block(), 500.0, &["zone"]).unwrap();
        assert_eq!(grid.features.len(), 9);
        for cell in &grid.features {
            let props = cell.properties.as_ref().unwrap();
            assert_eq!(props["zone"], json!("A"));
            assert!(!props.contains_key("pop"));
        }
    }

    #[test]
    fn test_grid_skips_cells_outside_triangle() {
        let triangle = polygon_feature(
            &[
                coord! { x: 0.0, y: 0.0 },
                coord! { x: 0.01, y: 0.0 },
                coord! { x: 0.0, y: 0.01 },
            ],
            None,
        )
        .unwrap();
        let grid = grid_polygon(&triangle, 200.0, &[]).unwrap();
        // 6 x 6 layout, the far corner cells miss the hypotenuse
        assert!(grid.features.len() < 36);
        assert!(grid.features.len() > 18);
    }

    #[test]
    fn test_grid_rejects_missing_property_and_bad_size() {
        assert!(grid_polygon(&block(), 500.0, &["missing"]).is_err());
        assert!(grid_polygon(&block(), 0.0, &[]).is_err());
    }

    #[test]
    fn test_mask_grid_copies_properties() {
        let grid = grid_polygon(&block(), 500.0, &[]).unwrap();
        let mask = feature_collection(vec![point_feature(
            coord! { x: 0.001, y: 0.001 },
            json!({"name": "stop"}).as_object().cloned(),
        )]);
        let masked = mask_grid(&grid, &mask, &["name", "absent"]).unwrap();
        assert_eq!(masked.features.len(), 1);
        let props = masked.features[0].properties.as_ref().unwrap();
        assert_eq!(props["name"], json!("stop"));
        assert_eq!(props["absent"], Value::Null);
    }
}
