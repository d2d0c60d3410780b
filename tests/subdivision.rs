use geo::algorithm::line_intersection::{LineIntersection, line_intersection};
use geo::{Coord, Line, coord};
use geoblocks::compute::line::{line_by_rebuild, rebuild_coords};
use geoblocks::feature::{
    ensure_coord_arr, feature_collection, line_feature, open_ring, polygon_feature,
    polygon_from_feature,
};
use geoblocks::spatial::planar_area;
use geoblocks::{
    Config, DistanceMetric, GeoBlocksError, find_all_reflex_points, polygons_by_loft,
    polygons_by_reflex_split, quads_by_number_split, quads_by_radial_split,
};
use geojson::Feature;
use serde_json::json;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn dart() -> Vec<Coord> {
    vec![
        coord! { x: 0.0, y: 0.0 },
        coord! { x: 0.01, y: 0.004 },
        coord! { x: 0.02, y: 0.0 },
        coord! { x: 0.01, y: 0.02 },
    ]
}

fn area_of(feature: &Feature) -> f64 {
    planar_area(&polygon_from_feature(feature).expect("polygon feature"))
}

/// True when two non-adjacent edges of the ring meet.
fn self_intersects(ring: &[Coord]) -> bool {
    let open = open_ring(ring);
    let n = open.len();
    let edge = |i: usize| Line::new(open[i], open[(i + 1) % n]);
    for i in 0..n {
        for j in (i + 2)..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            match line_intersection(edge(i), edge(j)) {
                Some(LineIntersection::SinglePoint { .. })
                | Some(LineIntersection::Collinear { .. }) => {
                    return true;
                }
                None => {}
            }
        }
    }
    false
}

/// Test 1: Convex rings have no reflex vertices, in either winding
#[test]
fn test_convex_rings_have_no_reflex_vertices() {
    let pentagon: Vec<Coord> = (0..5)
        .map(|i| {
            let a = (i as f64 * 72.0).to_radians();
            coord! { x: 116.0 + 0.01 * a.cos(), y: 39.0 + 0.01 * a.sin() }
        })
        .collect();
    assert!(find_all_reflex_points(&pentagon, 0.0).is_empty());

    let mut reversed = pentagon.clone();
    reversed.reverse();
    assert!(find_all_reflex_points(&reversed, 0.0).is_empty());
}

/// Test 2: A ring with one known reflex vertex reports exactly that vertex
#[test]
fn test_single_reflex_vertex_found() {
    let reflex = find_all_reflex_points(&dart(), 0.0);
    assert_eq!(reflex.len(), 1);
    assert_eq!(reflex[0].coord_index, 1);
}

/// Test 3: Radial split of an N-gon gives N pieces tiling the polygon
#[test]
fn test_radial_split_tiles_polygon() {
    init_logger();
    let octagon: Vec<Coord> = (0..8)
        .map(|i| {
            let a = (i as f64 * 45.0 + 10.0).to_radians();
            coord! { x: 0.02 * a.cos(), y: 0.02 * a.sin() }
        })
        .collect();
    let polygon = polygon_feature(&octagon, json!({"id": 8}).as_object().cloned()).unwrap();
    let config = Config::default().with_distance_metric(DistanceMetric::Euclidean);

    let pieces = quads_by_radial_split(&polygon, &config).unwrap();
    assert_eq!(pieces.features.len(), 8);

    let total: f64 = pieces.features.iter().map(area_of).sum();
    let source = area_of(&polygon);
    assert!((total - source).abs() / source < 1e-9);

    for piece in &pieces.features {
        assert!(!self_intersects(&ensure_coord_arr(piece).unwrap()));
        assert_eq!(piece.properties.as_ref().unwrap()["id"], json!(8));
    }
}

/// Test 4: Quad split by number keeps the total area (scenario 3)
#[test]
fn test_quad_split_by_number_preserves_area() {
    init_logger();
    let quad = polygon_feature(
        &[
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 0.04, y: 0.002 },
            coord! { x: 0.041, y: 0.012 },
            coord! { x: 0.001, y: 0.011 },
        ],
        None,
    )
    .unwrap();

    for metric in [DistanceMetric::Euclidean, DistanceMetric::Haversine] {
        let config = Config::default().with_distance_metric(metric);
        let pieces = quads_by_number_split(&quad, 3, &config).unwrap();
        assert_eq!(pieces.features.len(), 3);

        let total: f64 = pieces.features.iter().map(area_of).sum();
        let source = area_of(&quad);
        assert!(
            (total - source).abs() / source < 1e-6,
            "{:?}: {} vs {}",
            metric,
            total,
            source
        );
    }
}

/// Test 5: A quad with one reflex vertex splits into three simple quads (scenario 4)
#[test]
fn test_reflex_quad_splits_in_three() {
    init_logger();
    let polygon = polygon_feature(&dart(), None).unwrap();
    let pieces = polygons_by_reflex_split(&polygon, &Config::default()).unwrap();
    assert_eq!(pieces.features.len(), 3);

    let total: f64 = pieces.features.iter().map(area_of).sum();
    assert!((total - area_of(&polygon)).abs() / area_of(&polygon) < 1e-9);
    for piece in &pieces.features {
        let ring = ensure_coord_arr(piece).unwrap();
        assert_eq!(ring.len(), 5);
        assert!(!self_intersects(&ring));
    }
}

/// Test 6: Clockwise input splits the same way
#[test]
fn test_reflex_split_clockwise_input() {
    let mut ring = dart();
    ring.reverse();
    let polygon = polygon_feature(&ring, None).unwrap();
    let pieces = polygons_by_reflex_split(&polygon, &Config::default()).unwrap();
    assert_eq!(pieces.features.len(), 3);
}

/// Test 7: A convex polygon comes back whole
#[test]
fn test_reflex_split_convex_unchanged() {
    let square = polygon_feature(
        &[
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 0.01, y: 0.0 },
            coord! { x: 0.01, y: 0.01 },
            coord! { x: 0.0, y: 0.01 },
        ],
        None,
    )
    .unwrap();
    let pieces = polygons_by_reflex_split(&square, &Config::default()).unwrap();
    assert_eq!(pieces.features.len(), 1);
    assert_eq!(pieces.features[0].geometry, square.geometry);
}

/// Test 8: Nearly collinear notches leave no reflex piece behind
#[test]
fn test_reflex_split_near_degenerate_notch() {
    init_logger();
    let ring = vec![
        coord! { x: 0.0, y: 0.0 },
        coord! { x: 0.01, y: 0.0 },
        coord! { x: 0.02, y: 0.000001 },
        coord! { x: 0.03, y: 0.0 },
        coord! { x: 0.03, y: 0.01 },
        coord! { x: 0.0, y: 0.01 },
    ];
    let polygon = polygon_feature(&ring, None).unwrap();
    let reflex = find_all_reflex_points(&ring, 0.0);
    assert_eq!(reflex.len(), 1);

    let pieces = polygons_by_reflex_split(&polygon, &Config::default()).unwrap();
    assert!(pieces.features.len() >= 2);
    let total: f64 = pieces.features.iter().map(area_of).sum();
    assert!((total - area_of(&polygon)).abs() / area_of(&polygon) < 1e-9);
    for piece in &pieces.features {
        let ring = ensure_coord_arr(piece).unwrap();
        assert!(find_all_reflex_points(&ring, 0.0).is_empty());
        assert!(!self_intersects(&ring));
    }

    // The same dent disappears once the tolerance covers it
    let tolerant = Config::default().with_reflex_tolerance(1e-6);
    let whole = polygons_by_reflex_split(&polygon, &tolerant).unwrap();
    assert_eq!(whole.features.len(), 1);
}

/// Test 9: Subdivision rejects holes and non-quads
#[test]
fn test_subdivision_preconditions() {
    let holed = Feature {
        bbox: None,
        geometry: Some(geojson::Geometry::new(geojson::Value::Polygon(vec![
            vec![
                vec![0.0, 0.0],
                vec![4.0, 0.0],
                vec![4.0, 4.0],
                vec![0.0, 4.0],
                vec![0.0, 0.0],
            ],
            vec![
                vec![1.0, 1.0],
                vec![2.0, 1.0],
                vec![2.0, 2.0],
                vec![1.0, 1.0],
            ],
        ]))),
        id: None,
        properties: None,
        foreign_members: None,
    };
    assert!(matches!(
        polygons_by_reflex_split(&holed, &Config::default()),
        Err(GeoBlocksError::UnsupportedGeometry { .. })
    ));

    let triangle = polygon_feature(
        &[
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 1.0, y: 0.0 },
            coord! { x: 0.0, y: 1.0 },
        ],
        None,
    )
    .unwrap();
    assert!(matches!(
        quads_by_number_split(&triangle, 2, &Config::default()),
        Err(GeoBlocksError::NotAQuad { edges: 3 })
    ));

    let line = line_feature(&[coord! { x: 0.0, y: 0.0 }, coord! { x: 1.0, y: 1.0 }], None).unwrap();
    assert!(matches!(
        quads_by_radial_split(&line, &Config::default()),
        Err(GeoBlocksError::UnsupportedGeometry { .. })
    ));
}

/// Test 10: Line rebuild always hits the requested vertex count
#[test]
fn test_line_rebuild_vertex_counts() {
    let coords: Vec<Coord> = (0..7)
        .map(|i| coord! { x: 116.0 + i as f64 * 0.001, y: 39.0 + ((i * i) % 5) as f64 * 0.0005 })
        .collect();
    let line = line_feature(&coords, None).unwrap();

    for k in 2..20 {
        let rebuilt = line_by_rebuild(&line, k, DistanceMetric::Haversine).unwrap();
        let rebuilt_coords = ensure_coord_arr(&rebuilt).unwrap();
        assert_eq!(rebuilt_coords.len(), k);

        let back =
            rebuild_coords(&rebuilt_coords, coords.len(), DistanceMetric::Haversine).unwrap();
        assert_eq!(back.len(), coords.len());
    }
}

/// Test 11: Loft between three lines
#[test]
fn test_loft_three_lines() {
    init_logger();
    let lines = feature_collection(vec![
        line_feature(
            &[
                coord! { x: 0.0, y: 0.0 },
                coord! { x: 0.01, y: 0.0 },
                coord! { x: 0.02, y: 0.0 },
                coord! { x: 0.03, y: 0.0 },
            ],
            None,
        )
        .unwrap(),
        line_feature(
            &[coord! { x: 0.03, y: 0.01 }, coord! { x: 0.0, y: 0.01 }],
            None,
        )
        .unwrap(),
        line_feature(
            &[coord! { x: 0.0, y: 0.02 }, coord! { x: 0.03, y: 0.02 }],
            None,
        )
        .unwrap(),
    ]);

    let polygons = polygons_by_loft(&lines, &[1], DistanceMetric::Euclidean).unwrap();
    assert_eq!(polygons.features.len(), 6);

    let total: f64 = polygons.features.iter().map(area_of).sum();
    assert!((total - 0.03 * 0.02).abs() < 1e-12);
    for polygon in &polygons.features {
        assert!(!self_intersects(&ensure_coord_arr(polygon).unwrap()));
    }
}
