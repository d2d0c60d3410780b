//! Compute layer for geometry algorithms.
//!
//! This module holds the algorithmic core, kept apart from the GeoJSON
//! plumbing in [`crate::feature`] and [`crate::property`]:
//! - Vector primitives and origin-relative projection
//! - Geohash encoding and prefix dictionaries
//! - Reflex vertex detection and polygon subdivision
//! - Line rebuilding and grid generation

pub mod create;
pub mod geohash;
pub mod grid;
pub mod line;
pub mod reflex;
pub mod subdivide;
pub mod validation;
pub mod vector;
