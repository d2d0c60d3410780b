//! Line rebuilding, extension, division and vertex angles.

use crate::error::{GeoBlocksError, Result};
use crate::feature::{
    ensure_coord_arr, geometry_value, line_feature, line_from_feature, type_name,
};
use crate::spatial::{
    DistanceMetric, along_line, bearing, distance_between, midpoint, rhumb_destination,
};
use geo::{Coord, LineString, Point};
use geojson::{Feature, Value};

fn segment_lengths(coords: &[Coord], metric: DistanceMetric) -> Vec<f64> {
    coords
        .windows(2)
        .map(|w| distance_between(&Point::from(w[0]), &Point::from(w[1]), metric))
        .collect()
}

/// Vertex to drop: the far end of the shortest segment, never the last vertex.
fn shortest_removable(lengths: &[f64]) -> usize {
    let mut index = 1;
    let mut min = f64::INFINITY;
    // The final segment is skipped so the last vertex survives
    for (i, len) in lengths[..lengths.len() - 1].iter().enumerate() {
        if *len < min {
            min = *len;
            index = i + 1;
        }
    }
    index
}

fn longest_segment(lengths: &[f64]) -> usize {
    let mut index = 0;
    let mut max = f64::NEG_INFINITY;
    for (i, len) in lengths.iter().enumerate() {
        if *len > max {
            max = *len;
            index = i;
        }
    }
    index
}

/// Rebuild a coordinate list to exactly `target` vertices.
///
/// Extra vertices go from the shortest segment; missing ones are midpoints
/// of the longest. The first and last vertex never move.
pub fn rebuild_coords(
    coords: &[Coord],
    target: usize,
    metric: DistanceMetric,
) -> Result<Vec<Coord>> {
    if target < 2 {
        return Err(GeoBlocksError::InvalidInput(format!(
            "A line needs at least 2 vertices, asked for {}",
            target
        )));
    }
    if coords.len() < 2 {
        return Err(GeoBlocksError::InvalidInput(format!(
            "Cannot rebuild a line of {} vertices",
            coords.len()
        )));
    }

    let mut coords = coords.to_vec();
    while coords.len() > target {
        let lengths = segment_lengths(&coords, metric);
        coords.remove(shortest_removable(&lengths));
    }
    while coords.len() < target {
        let lengths = segment_lengths(&coords, metric);
        let i = longest_segment(&lengths);
        let mid = midpoint(&Point::from(coords[i]), &Point::from(coords[i + 1]), metric);
        coords.insert(i + 1, mid.0);
    }
    Ok(coords)
}

/// Rebuild a LineString feature to exactly `target` vertices, keeping its properties.
///
/// # Examples
///
/// ```
/// use geoblocks::compute::line::line_by_rebuild;
/// use geoblocks::feature::{ensure_coord_arr, line_feature};
/// use geoblocks::spatial::DistanceMetric;
/// use geo::coord;
///
/// let coords = [coord! { x: 0.0, y: 0.0 }, coord! { x: 0.01, y: 0.0 }];
/// let line = line_feature(&coords, None).unwrap();
/// let rebuilt = line_by_rebuild(&line, 5, DistanceMetric::Haversine).unwrap();
/// assert_eq!(ensure_coord_arr(&rebuilt).unwrap().len(), 5);
/// ```
pub fn line_by_rebuild(line: &Feature, target: usize, metric: DistanceMetric) -> Result<Feature> {
    let coords = line_from_feature(line)?.0;
    let rebuilt = rebuild_coords(&coords, target, metric)?;
    line_feature(&rebuilt, line.properties.clone())
}

/// Extend a line by `meters` past one end, following its terminal segment.
///
/// With `at_end` the new vertex is appended after the last vertex, otherwise
/// it is prepended before the first.
pub fn line_extend(line: &Feature, meters: f64, at_end: bool) -> Result<Feature> {
    let mut coords = line_from_feature(line)?.0;
    if coords.len() < 2 {
        return Err(GeoBlocksError::InvalidInput(
            "Cannot extend a line with fewer than 2 vertices".to_string(),
        ));
    }
    let n = coords.len();
    let (from, tip) = if at_end {
        (coords[n - 2], coords[n - 1])
    } else {
        (coords[1], coords[0])
    };
    let heading = bearing(&Point::from(from), &Point::from(tip));
    let extended = rhumb_destination(&Point::from(tip), heading, meters).0;

    if at_end {
        coords.push(extended);
    } else {
        coords.insert(0, extended);
    }
    line_feature(&coords, line.properties.clone())
}

/// Split a line into `num` pieces of equal length.
pub fn lines_divide(line: &Feature, num: usize, metric: DistanceMetric) -> Result<Vec<Feature>> {
    if num == 0 {
        return Err(GeoBlocksError::InvalidInput(
            "Cannot divide a line into 0 pieces".to_string(),
        ));
    }
    let geometry = line_from_feature(line)?;
    let coords = &geometry.0;
    if coords.len() < 2 {
        return Err(GeoBlocksError::InvalidInput(
            "Cannot divide a line with fewer than 2 vertices".to_string(),
        ));
    }

    let lengths = segment_lengths(coords, metric);
    let total: f64 = lengths.iter().sum();
    // Arc-length position of every original vertex
    let mut offsets = Vec::with_capacity(coords.len());
    let mut run = 0.0;
    offsets.push(0.0);
    for len in &lengths {
        run += len;
        offsets.push(run);
    }

    let cut = |k: usize| -> Result<Coord> {
        let fraction = k as f64 / num as f64;
        along_line(&geometry, fraction, metric)
            .map(|p| p.0)
            .ok_or_else(|| GeoBlocksError::InvalidInput("Empty line".to_string()))
    };

    let mut pieces = Vec::with_capacity(num);
    for k in 0..num {
        let start = total * k as f64 / num as f64;
        let end = total * (k + 1) as f64 / num as f64;
        let mut piece = vec![cut(k)?];
        piece.extend(
            coords
                .iter()
                .zip(&offsets)
                .filter(|(_, off)| **off > start && **off < end)
                .map(|(c, _)| *c),
        );
        piece.push(if k + 1 == num { coords[coords.len() - 1] } else { cut(k + 1)? });
        pieces.push(line_feature(&piece, line.properties.clone())?);
    }
    Ok(pieces)
}

/// Turning angles between consecutive segment bearings, degrees in `[0, 360)`.
///
/// For a LineString there is one angle per interior vertex. For a Polygon
/// the exterior ring is walked cyclically and the result is aligned with the
/// closed ring: entry `i` is the angle at vertex `i`, with the first entry
/// repeated at the end.
pub fn internal_angles(feature: &Feature) -> Result<Vec<f64>> {
    let cyclic = match geometry_value(feature)? {
        Value::LineString(_) => false,
        Value::Polygon(_) => true,
        other => {
            return Err(GeoBlocksError::unsupported(
                "LineString or Polygon",
                type_name(other),
            ));
        }
    };
    let coords = ensure_coord_arr(feature)?;
    let bearings: Vec<f64> = coords
        .windows(2)
        .map(|w| bearing(&Point::from(w[0]), &Point::from(w[1])))
        .collect();
    if bearings.len() < 2 {
        return Ok(Vec::new());
    }

    let turn = |from: f64, to: f64| (to - from).rem_euclid(360.0);
    let mut angles: Vec<f64> = bearings.windows(2).map(|w| turn(w[0], w[1])).collect();
    if cyclic {
        if let (Some(first), Some(last)) = (bearings.first(), bearings.last()) {
            angles.push(turn(*last, *first));
        }
        if let Some(closing) = angles.last().copied() {
            angles.insert(0, closing);
        }
    }
    Ok(angles)
}

/// Total length of a line in meters.
pub fn line_length(line: &LineString, metric: DistanceMetric) -> f64 {
    segment_lengths(&line.0, metric).iter().sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::polygon_feature;
    use geo::coord;

    fn zigzag() -> Vec<Coord> {
        vec![
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 0.001, y: 0.0 },
            coord! { x: 0.0011, y: 0.0 },
            coord! { x: 0.005, y: 0.002 },
            coord! { x: 0.01, y: 0.0 },
        ]
    }

    #[test]
    fn test_rebuild_hits_target_count() {
        let coords = zigzag();
        for target in 2..12 {
            let rebuilt = rebuild_coords(&coords, target, DistanceMetric::Haversine).unwrap();
            assert_eq!(rebuilt.len(), target);
            assert_eq!(rebuilt[0], coords[0]);
            assert_eq!(rebuilt[target - 1], coords[4]);
        }
    }

    #[test]
    fn test_rebuild_drops_shortest_segment_first() {
        let rebuilt = rebuild_coords(&zigzag(), 4, DistanceMetric::Haversine).unwrap();
        assert!(!rebuilt.contains(&coord! { x: 0.0011, y: 0.0 }));
        assert!(rebuilt.contains(&coord! { x: 0.001, y: 0.0 }));
    }

    #[test]
    fn test_rebuild_keeps_last_vertex_when_last_segment_shortest() {
        let coords = vec![
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 0.01, y: 0.0 },
            coord! { x: 0.02, y: 0.0 },
            coord! { x: 0.02001, y: 0.0 },
        ];
        let rebuilt = rebuild_coords(&coords, 3, DistanceMetric::Haversine).unwrap();
        assert_eq!(rebuilt.last(), coords.last());
    }

    #[test]
    fn test_rebuild_rejects_bad_counts() {
        assert!(rebuild_coords(&zigzag(), 1, DistanceMetric::Haversine).is_err());
        assert!(rebuild_coords(&zigzag()[..1], 3, DistanceMetric::Haversine).is_err());
    }

    #[test]
    fn test_rebuild_round_trip_counts() {
        let line = line_feature(&zigzag(), None).unwrap();
        let down = line_by_rebuild(&line, 3, DistanceMetric::Haversine).unwrap();
        let up = line_by_rebuild(&down, 5, DistanceMetric::Haversine).unwrap();
        assert_eq!(ensure_coord_arr(&down).unwrap().len(), 3);
        assert_eq!(ensure_coord_arr(&up).unwrap().len(), 5);
    }

    #[test]
    fn test_line_extend_both_ends() {
        let line = line_feature(
            &[coord! { x: 10.0, y: 0.0 }, coord! { x: 10.01, y: 0.0 }],
            None,
        )
        .unwrap();

        let forward = ensure_coord_arr(&line_extend(&line, 500.0, true).unwrap()).unwrap();
        assert_eq!(forward.len(), 3);
        assert!(forward[2].x > 10.01);
        assert!(forward[2].y.abs() < 1e-6);

        let backward = ensure_coord_arr(&line_extend(&line, 500.0, false).unwrap()).unwrap();
        assert!(backward[0].x < 10.0);
        let gained = distance_between(
            &Point::from(backward[0]),
            &Point::from(backward[1]),
            DistanceMetric::Rhumb,
        );
        assert!((gained - 500.0).abs() < 0.5);
    }

    #[test]
    fn test_lines_divide_equal_lengths() {
        let line = line_feature(&zigzag(), None).unwrap();
        let pieces = lines_divide(&line, 4, DistanceMetric::Euclidean).unwrap();
        assert_eq!(pieces.len(), 4);

        let lengths: Vec<f64> = pieces
            .iter()
            .map(|p| line_length(&line_from_feature(p).unwrap(), DistanceMetric::Euclidean))
            .collect();
        for len in &lengths {
            assert!((len - lengths[0]).abs() < 1e-9);
        }
        let last = ensure_coord_arr(&pieces[3]).unwrap();
        assert_eq!(last.last(), zigzag().last());
    }

    #[test]
    fn test_internal_angles_polygon_aligned_with_ring() {
        let square = polygon_feature(
            &[
                coord! { x: 0.0, y: 0.0 },
                coord! { x: 0.0, y: 0.001 },
                coord! { x: 0.001, y: 0.001 },
                coord! { x: 0.001, y: 0.0 },
            ],
            None,
        )
        .unwrap();
        let angles = internal_angles(&square).unwrap();
        assert_eq!(angles.len(), 5);
        for angle in &angles {
            assert!((angle - 90.0).abs() < 0.01, "angle {}", angle);
        }
    }

    #[test]
    fn test_internal_angles_line() {
        let line = line_feature(
            &[
                coord! { x: 0.0, y: 0.0 },
                coord! { x: 0.0, y: 0.001 },
                coord! { x: 0.001, y: 0.001 },
            ],
            None,
        )
        .unwrap();
        let angles = internal_angles(&line).unwrap();
        assert_eq!(angles.len(), 1);
        assert!((angles[0] - 90.0).abs() < 0.01);
    }
}
