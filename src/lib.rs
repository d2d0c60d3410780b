//! GeoJSON geometry toolkit: polygon subdivision, geohash indexing and property injection.
//!
//! ```rust
//! use geoblocks::prelude::*;
//! use geo::coord;
//!
//! let config = Config::default();
//! let quad = polygon_feature(
//!     &[
//!         coord! { x: 116.30, y: 39.90 },
//!         coord! { x: 116.33, y: 39.90 },
//!         coord! { x: 116.33, y: 39.91 },
//!         coord! { x: 116.30, y: 39.91 },
//!     ],
//!     serde_json::json!({"block": "A"}).as_object().cloned(),
//! )?;
//! let strips = quads_by_number_split(&quad, 3, &config)?;
//!
//! let mut stops = feature_collection(vec![point_feature(coord! { x: 116.305, y: 39.905 }, None)]);
//! let report = feat_feat_injection(&strips, &mut stops, &["block"], &[], &config)?;
//! assert_eq!(report.unmatched, 0);
//! # Ok::<(), geoblocks::GeoBlocksError>(())
//! ```

pub mod compute;
pub mod error;
pub mod feature;
pub mod inject;
pub mod property;
pub mod spatial;
pub mod types;

pub use error::{GeoBlocksError, Result};

pub use geo::{Coord, LineString, Point, Polygon, Rect};
pub use geoblocks_types::hash::GeoHash;
pub use geoblocks_types::reflex::{ReflexPoint, Vector2};

pub use spatial::{DistanceMetric, distance_between};

pub use types::Config;

pub use compute::geohash::{FeatureIndex, GeoHashDictionary, geohash_dictionary, geohash_encode};
pub use compute::reflex::find_all_reflex_points;
pub use compute::subdivide::{
    polygons_by_loft, polygons_by_reflex_split, quads_by_number_split, quads_by_radial_split,
};

pub use inject::{
    Containment, InjectionReport, distance_injection, feat_feat_injection, features_by_overlap,
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{Config, GeoBlocksError, Result};

    pub use geo::{Coord, Point, Polygon};

    pub use crate::spatial::{DistanceMetric, distance_between};

    pub use crate::feature::{feature_collection, line_feature, point_feature, polygon_feature};

    pub use crate::compute::geohash::{GeoHashDictionary, geohash_dictionary, tag_geohash};

    pub use crate::compute::subdivide::{
        polygons_by_loft, polygons_by_reflex_split, quads_by_number_split, quads_by_radial_split,
    };

    pub use crate::inject::{InjectionReport, feat_feat_injection};
}
