use super::{emit, planar_mid, source_ring};
use crate::compute::reflex::find_all_reflex_points;
use crate::compute::validation::validate_quad;
use crate::compute::vector::magnitude;
use crate::error::{GeoBlocksError, Result};
use crate::types::Config;
use geo::algorithm::line_intersection::{LineIntersection, line_intersection};
use geo::{Coord, Line};
use geoblocks_types::reflex::ReflexPoint;
use geojson::{Feature, FeatureCollection};

/// Ray length relative to the farthest vertex from the reflex vertex.
const RAY_REACH: f64 = 1.5;

/// Split a quad at its single reflex vertex into three quads.
///
/// With reflex vertex `A`, its successors `B`, `C` and predecessor `D`, the
/// pivot `P` is the midpoint of `A` and the opposite vertex `C`. The cuts run
/// from `P` parallel to `BC` and `CD`, meeting `AB` and `DA` at their
/// midpoints `Q1` and `Q2`. The pieces are `[A, Q1, P, Q2]`,
/// `[Q1, B, C, P]` and `[P, C, D, Q2]`.
pub fn quad_reflex_split(ring: &[Coord], reflex: &ReflexPoint) -> Result<Vec<Vec<Coord>>> {
    validate_quad(ring)?;
    let r = reflex.coord_index;
    if r >= ring.len() {
        return Err(GeoBlocksError::InvalidIndex {
            index: r,
            len: ring.len(),
        });
    }

    let a = ring[r];
    let b = ring[(r + 1) % 4];
    let c = ring[(r + 2) % 4];
    let d = ring[(r + 3) % 4];
    let pivot = planar_mid(&a, &c);
    let q1 = planar_mid(&a, &b);
    let q2 = planar_mid(&a, &d);

    Ok(vec![
        vec![a, q1, pivot, q2],
        vec![q1, b, c, pivot],
        vec![pivot, c, d, q2],
    ])
}

fn sub(a: &Coord, b: &Coord) -> [f64; 2] {
    [a.x - b.x, a.y - b.y]
}

/// Consecutive duplicates removed, including across the wrap.
fn dedup_ring(mut ring: Vec<Coord>) -> Vec<Coord> {
    ring.dedup();
    while ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    ring
}

/// Nearest boundary crossing of a ray, with the index of the edge it lies on.
fn nearest_crossing(ring: &[Coord], r: usize, ray: Line) -> Option<(usize, Coord)> {
    let n = ring.len();
    let origin = ray.start;
    let mut best: Option<(usize, Coord, f64)> = None;

    for e in 0..n {
        let next = (e + 1) % n;
        if e == r || next == r {
            continue;
        }
        let edge = Line::new(ring[e], ring[next]);
        let Some(LineIntersection::SinglePoint { intersection, .. }) = line_intersection(ray, edge)
        else {
            continue;
        };
        let dist = magnitude(&sub(&intersection, &origin));
        if dist > 0.0 && best.is_none_or(|(_, _, d)| dist < d) {
            best = Some((e, intersection, dist));
        }
    }
    best.map(|(e, x, _)| (e, x))
}

/// Split an open ring in two along a chord from a reflex vertex.
///
/// A ray leaves the reflex vertex into the polygon, opposite the sum of its
/// unit edge vectors, and stops at the nearest edge it crosses. The chord
/// from the vertex to that crossing divides the ring. When no crossing is
/// found, or a half would have fewer than three vertices, the ring is
/// returned whole.
pub fn vector_add_split(ring: &[Coord], reflex: &ReflexPoint) -> Result<Vec<Vec<Coord>>> {
    let n = ring.len();
    let r = reflex.coord_index;
    if r >= n {
        return Err(GeoBlocksError::InvalidIndex { index: r, len: n });
    }
    let unsplit = || -> Result<Vec<Vec<Coord>>> { Ok(vec![ring.to_vec()]) };

    let Some(outward) = reflex.bisector() else {
        log::warn!("Reflex vertex {} has no bisector, ring left unsplit", r);
        return unsplit();
    };
    let a = ring[r];
    let reach = ring
        .iter()
        .map(|c| magnitude(&sub(c, &a)))
        .fold(0.0, f64::max)
        * RAY_REACH;
    let ray = Line::new(
        a,
        Coord {
            x: a.x - outward[0] * reach,
            y: a.y - outward[1] * reach,
        },
    );

    let Some((e, crossing)) = nearest_crossing(ring, r, ray) else {
        log::warn!("Ray from reflex vertex {} crosses no edge, ring left unsplit", r);
        return unsplit();
    };

    // r ..= e then the crossing; the crossing then e+1 ..= r
    let mut first = Vec::with_capacity(n);
    let mut i = r;
    loop {
        first.push(ring[i]);
        if i == e {
            break;
        }
        i = (i + 1) % n;
    }
    first.push(crossing);

    let mut second = vec![crossing];
    let mut i = (e + 1) % n;
    loop {
        second.push(ring[i]);
        if i == r {
            break;
        }
        i = (i + 1) % n;
    }

    let first = dedup_ring(first);
    let second = dedup_ring(second);
    if first.len() < 3 || second.len() < 3 {
        log::warn!(
            "Chord from reflex vertex {} leaves a degenerate piece, ring left unsplit",
            r
        );
        return unsplit();
    }
    Ok(vec![first, second])
}

/// One dispatch step: no reflex vertex keeps the ring, a quad with one gets
/// the three-way split, anything else a chord split at its first reflex vertex.
pub fn reflex_split_handler(ring: &[Coord], tolerance: f64) -> Result<Vec<Vec<Coord>>> {
    let reflex = find_all_reflex_points(ring, tolerance);
    match reflex.as_slice() {
        [] => Ok(vec![ring.to_vec()]),
        [only] if ring.len() == 4 => {
            log::debug!("Quad reflex split at vertex {}", only.coord_index);
            quad_reflex_split(ring, only)
        }
        [first, ..] => {
            log::debug!(
                "Vector-add split at vertex {} of {} reflex",
                first.coord_index,
                reflex.len()
            );
            vector_add_split(ring, first)
        }
    }
}

fn split_until_convex(ring: Vec<Coord>, tolerance: f64, out: &mut Vec<Vec<Coord>>) -> Result<()> {
    let reflex = find_all_reflex_points(&ring, tolerance);
    if reflex.is_empty() || (ring.len() == 4 && reflex.len() == 1) {
        out.extend(reflex_split_handler(&ring, tolerance)?);
        return Ok(());
    }

    let pieces = vector_add_split(&ring, &reflex[0])?;
    if pieces.len() < 2 {
        out.extend(pieces);
        return Ok(());
    }
    for piece in pieces {
        split_until_convex(piece, tolerance, out)?;
    }
    Ok(())
}

/// Split a polygon at its reflex vertices until no piece has one.
///
/// A convex polygon comes back as a single piece. A quad with one reflex
/// vertex becomes three quads. Other polygons are split along chords, each
/// half recursively, and every chord removes at least one reflex vertex.
pub fn polygons_by_reflex_split(polygon: &Feature, config: &Config) -> Result<FeatureCollection> {
    let ring = source_ring(polygon)?;
    let mut pieces = Vec::new();
    split_until_convex(ring, config.reflex_tolerance, &mut pieces)?;
    log::debug!("Reflex split produced {} pieces", pieces.len());
    emit(polygon, pieces)
}
