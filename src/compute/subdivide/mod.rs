//! Polygon subdivision strategies.
//!
//! Every strategy takes a hole-free Polygon feature and returns a collection
//! of smaller polygons that partition it. Pieces keep the winding of the
//! input ring and carry a copy of the source properties, except loft pieces
//! which are numbered instead.
//!
//! Ring-level helpers work on open rings (closing duplicate removed) and are
//! exposed for callers that already hold coordinates.

mod loft;
mod quad;
mod radial;
mod reflex_split;

pub use loft::polygons_by_loft;
pub use quad::{quads_by_number_split, quads_longest_split};
pub use radial::{quads_by_radial_split, radial_split};
pub use reflex_split::{
    polygons_by_reflex_split, quad_reflex_split, reflex_split_handler, vector_add_split,
};

use crate::compute::validation::validate_simple_polygon;
use crate::error::Result;
use crate::feature::{feature_collection, polygon_feature, polygon_from_feature};
use geo::Coord;
use geojson::{Feature, FeatureCollection};

/// Open exterior ring of a hole-free polygon feature.
fn source_ring(polygon: &Feature) -> Result<Vec<Coord>> {
    validate_simple_polygon(&polygon_from_feature(polygon)?)
}

/// Wrap open rings as polygon features carrying the source properties.
fn emit(source: &Feature, rings: Vec<Vec<Coord>>) -> Result<FeatureCollection> {
    let features = rings
        .iter()
        .map(|ring| polygon_feature(ring, source.properties.clone()))
        .collect::<Result<Vec<_>>>()?;
    Ok(feature_collection(features))
}

fn planar_mid(a: &Coord, b: &Coord) -> Coord {
    Coord {
        x: (a.x + b.x) / 2.0,
        y: (a.y + b.y) / 2.0,
    }
}
