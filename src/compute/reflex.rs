//! Reflex vertex detection.

use crate::compute::vector::{between, determinant_2d};
use crate::feature::open_ring;
use geo::Coord;
use geoblocks_types::reflex::ReflexPoint;

/// Twice the signed shoelace area of an open ring; positive when counter-clockwise.
pub(crate) fn ring_orientation(open: &[Coord]) -> f64 {
    let n = open.len();
    (0..n)
        .map(|i| {
            let (a, b) = (open[i], open[(i + 1) % n]);
            a.x * b.y - b.x * a.y
        })
        .sum()
}

/// Every reflex vertex of a ring, in ring order.
///
/// The ring may be open or closed; returned indices refer to the open ring.
/// A vertex is reflex when the determinant of its two edge vectors, signed by
/// the ring's winding, exceeds `tolerance`. Either winding works. Rings with
/// fewer than three vertices or no area have no reflex vertices.
///
/// # Examples
///
/// ```
/// use geoblocks::compute::reflex::find_all_reflex_points;
/// use geo::coord;
///
/// let dart = [
///     coord! { x: 0.0, y: 0.0 },
///     coord! { x: 2.0, y: 1.0 },
///     coord! { x: 4.0, y: 0.0 },
///     coord! { x: 2.0, y: 4.0 },
/// ];
/// let reflex = find_all_reflex_points(&dart, 0.0);
/// assert_eq!(reflex.len(), 1);
/// assert_eq!(reflex[0].coord_index, 1);
/// ```
pub fn find_all_reflex_points(ring: &[Coord], tolerance: f64) -> Vec<ReflexPoint> {
    let open = open_ring(ring);
    let n = open.len();
    if n < 3 {
        return Vec::new();
    }
    let winding = ring_orientation(&open).signum();
    if winding == 0.0 {
        return Vec::new();
    }

    (0..n)
        .filter_map(|j| {
            let first_vec = between(&open[j], &open[(j + n - 1) % n]);
            let sec_vec = between(&open[j], &open[(j + 1) % n]);
            let turn = determinant_2d(first_vec, sec_vec) * winding;
            (turn > tolerance).then(|| ReflexPoint::new(j, first_vec, sec_vec))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::coord;

    fn dart() -> Vec<Coord> {
        vec![
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 0.01, y: 0.004 },
            coord! { x: 0.02, y: 0.0 },
            coord! { x: 0.01, y: 0.02 },
        ]
    }

    #[test]
    fn test_convex_rings_have_no_reflex_points() {
        let square = [
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 1.0, y: 0.0 },
            coord! { x: 1.0, y: 1.0 },
            coord! { x: 0.0, y: 1.0 },
            coord! { x: 0.0, y: 0.0 },
        ];
        assert!(find_all_reflex_points(&square, 0.0).is_empty());

        let mut clockwise = square.to_vec();
        clockwise.reverse();
        assert!(find_all_reflex_points(&clockwise, 0.0).is_empty());
    }

    #[test]
    fn test_single_reflex_vertex_either_winding() {
        let ring = dart();
        let reflex = find_all_reflex_points(&ring, 0.0);
        assert_eq!(reflex.len(), 1);
        assert_eq!(reflex[0].coord_index, 1);

        let mut reversed = ring.clone();
        reversed.reverse();
        let reflex = find_all_reflex_points(&reversed, 0.0);
        assert_eq!(reflex.len(), 1);
        assert_eq!(reflex[0].coord_index, 2);
    }

    #[test]
    fn test_edge_vectors_point_to_neighbours() {
        let reflex = find_all_reflex_points(&dart(), 0.0);
        let r = &reflex[0];
        assert!((r.first_vec[0] + 0.01).abs() < 1e-12);
        assert!((r.first_vec[1] + 0.004).abs() < 1e-12);
        assert!((r.sec_vec[0] - 0.01).abs() < 1e-12);
        assert!((r.sec_vec[1] + 0.004).abs() < 1e-12);
    }

    #[test]
    fn test_tolerance_ignores_shallow_dents() {
        let shallow = [
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 1.0, y: 1e-9 },
            coord! { x: 2.0, y: 0.0 },
            coord! { x: 1.0, y: 2.0 },
        ];
        assert_eq!(find_all_reflex_points(&shallow, 0.0).len(), 1);
        assert!(find_all_reflex_points(&shallow, 1e-6).is_empty());
    }

    #[test]
    fn test_degenerate_rings() {
        let line = [coord! { x: 0.0, y: 0.0 }, coord! { x: 1.0, y: 1.0 }];
        assert!(find_all_reflex_points(&line, 0.0).is_empty());

        let flat = [
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 1.0, y: 0.0 },
            coord! { x: 2.0, y: 0.0 },
        ];
        assert!(find_all_reflex_points(&flat, 0.0).is_empty());
    }
}
