//! # geoblocks-types
//!
//! Core value types for the geoblocks toolkit.
//!
//! This crate provides the small serializable descriptors that the geometry
//! and indexing routines exchange:
//!
//! - **Geohash types**: `GeoHash` (an encoded cell plus its resolved precision)
//! - **Reflex types**: `ReflexPoint` and the `Vector2` alias
//!
//! ## Examples
//!
//! ```rust
//! use geoblocks_types::hash::GeoHash;
//!
//! let hash = GeoHash::new("wx4g0", 5);
//! assert_eq!(hash.prefix(3), "wx4");
//! assert!(!hash.is_world());
//! ```

pub mod hash;
pub mod reflex;

pub use reflex::Vector2;
