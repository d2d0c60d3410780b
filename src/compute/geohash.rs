//! Geohash encoding and prefix dictionaries for approximate spatial lookup.
//!
//! A feature is encoded from one reference coordinate (points) or from the two
//! corners of its bounding box (everything else). For two corners the hash is
//! cut back to the prefix both corners share, so the cell always covers the
//! whole shape.
//!
//! A [`GeoHashDictionary`] maps every hash prefix to the features whose hash
//! starts with it. It is a snapshot of a collection: it remembers how many
//! features it indexed and refuses lookups against a collection of a
//! different length.
//!
//! # Memory Layout
//!
//! ```text
//! GeoHashDictionary
//! ├─ buckets: HashMap<String, Vec<FeatureIndex>>
//! │  ├─ "w"    -> [0, 1]
//! │  ├─ "wx"   -> [0, 1]
//! │  ├─ "wx4"  -> [0]
//! │  └─ "wx5"  -> [1]
//! ├─ hashes: [wx4.., wx5..]
//! └─ precision: 3
//! ```

use crate::compute::validation::{validate_geographic_point, validate_precision};
use crate::error::{GeoBlocksError, Result};
use crate::feature::to_geo;
use crate::property::props_mut;
use crate::spatial::bbox;
use geo::{Coord, Geometry, Point, Rect};
use geoblocks_types::hash::GeoHash;
use geojson::{Feature, FeatureCollection};
use rustc_hash::FxHashMap;
use serde_json::Value;

/// Property written with the resolved hash.
pub const GEOHASH_KEY: &str = "geoHash";
/// Property written with the resolved precision.
pub const GEOHASH_PRECISION_KEY: &str = "geoHashPrecision";

const BASE32: &[u8; 32] = b"0123456789bcdefghjkmnpqrstuvwxyz";
const BITS_PER_CHAR: usize = 5;

/// Encode a coordinate into a geohash of `precision` characters.
///
/// Even bits bisect longitude, odd bits latitude. A coordinate on a
/// bisection midpoint falls into the upper half.
///
/// # Examples
///
/// ```
/// use geoblocks::compute::geohash::encode_coord;
/// use geo::coord;
///
/// let hash = encode_coord(coord! { x: 116.0, y: 39.0 }, 5).unwrap();
/// assert_eq!(hash.len(), 5);
/// assert!(hash.starts_with('w'));
/// ```
pub fn encode_coord(coord: Coord, precision: usize) -> Result<String> {
    validate_precision(precision)?;
    validate_geographic_point(&Point::from(coord))?;

    let mut lon_range = (-180.0_f64, 180.0_f64);
    let mut lat_range = (-90.0_f64, 90.0_f64);
    let mut hash = String::with_capacity(precision);
    let mut bits = 0usize;

    for step in 0..precision * BITS_PER_CHAR {
        let (range, value) = if step % 2 == 0 {
            (&mut lon_range, coord.x)
        } else {
            (&mut lat_range, coord.y)
        };
        let mid = (range.0 + range.1) / 2.0;
        bits <<= 1;
        if value >= mid {
            bits |= 1;
            range.0 = mid;
        } else {
            range.1 = mid;
        }

        if step % BITS_PER_CHAR == BITS_PER_CHAR - 1 {
            hash.push(BASE32[bits] as char);
            bits = 0;
        }
    }

    Ok(hash)
}

/// Bounding box of a geohash cell. The empty hash is the whole world.
pub fn cell(hash: &str) -> Result<Rect> {
    if hash.is_empty() {
        return Ok(Rect::new(
            Coord { x: -180.0, y: -90.0 },
            Coord { x: 180.0, y: 90.0 },
        ));
    }
    geohash::decode_bbox(hash)
        .map_err(|e| GeoBlocksError::InvalidInput(format!("Invalid geohash '{}': {}", hash, e)))
}

fn reference_coords(geometry: &Geometry) -> Result<Vec<Coord>> {
    if let Geometry::Point(p) = geometry {
        return Ok(vec![p.0]);
    }
    let rect = bbox(geometry).ok_or_else(|| {
        GeoBlocksError::InvalidInput("Cannot geohash a geometry without coordinates".to_string())
    })?;
    Ok(vec![rect.min(), rect.max()])
}

fn common_prefix_len(a: &str, b: &str) -> usize {
    a.chars().zip(b.chars()).take_while(|(x, y)| x == y).count()
}

/// Geohash of a feature at up to `precision` characters.
///
/// Points keep the requested precision. Other geometries resolve to the
/// prefix shared by their bounding-box corners, possibly the world cell.
pub fn geohash_encode(feature: &Feature, precision: usize) -> Result<GeoHash> {
    validate_precision(precision)?;
    let geometry = to_geo(feature)?;
    let coords = reference_coords(&geometry)?;

    let mut hashes = coords
        .into_iter()
        .map(|c| encode_coord(c, precision))
        .collect::<Result<Vec<_>>>()?
        .into_iter();
    let Some(mut hash) = hashes.next() else {
        return Ok(GeoHash::world());
    };
    for other in hashes {
        let shared = common_prefix_len(&hash, &other);
        hash.truncate(shared);
    }

    if hash.is_empty() {
        log::warn!("Bounding box corners share no geohash prefix, using the world cell");
        return Ok(GeoHash::world());
    }
    let resolved = hash.len();
    Ok(GeoHash::new(hash, resolved))
}

/// Encode a feature and write `geoHash` / `geoHashPrecision` onto its properties.
pub fn tag_geohash(feature: &mut Feature, precision: usize) -> Result<GeoHash> {
    let hash = geohash_encode(feature, precision)?;
    write_geohash(feature, &hash);
    Ok(hash)
}

/// Write an already computed hash onto a feature's properties.
pub fn write_geohash(feature: &mut Feature, hash: &GeoHash) {
    let props = props_mut(feature);
    props.insert(GEOHASH_KEY.to_string(), Value::from(hash.hash.clone()));
    props.insert(GEOHASH_PRECISION_KEY.to_string(), Value::from(hash.precision));
}

/// Position of a feature in the collection a dictionary was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureIndex(pub usize);

impl FeatureIndex {
    pub fn get(self) -> usize {
        self.0
    }
}

/// Summary of a dictionary.
#[derive(Debug, Clone)]
pub struct DictionaryStats {
    /// Number of prefix keys
    pub bucket_count: usize,
    /// Number of indexed features
    pub feature_count: usize,
    /// Features resolved to the world cell
    pub world_count: usize,
    /// Largest bucket at the dictionary precision
    pub max_bucket_len: usize,
    /// Resolved dictionary precision
    pub precision: usize,
}

/// Prefix map from geohash to feature indices over one collection snapshot.
#[derive(Debug, Clone)]
pub struct GeoHashDictionary {
    buckets: FxHashMap<String, Vec<FeatureIndex>>,
    hashes: Vec<GeoHash>,
    precision: usize,
}

impl GeoHashDictionary {
    /// Index a collection at up to `precision` characters.
    ///
    /// The dictionary precision is the coarsest precision any feature
    /// resolved to; keys are registered from length 1 up to it.
    pub fn build(collection: &FeatureCollection, precision: usize) -> Result<Self> {
        validate_precision(precision)?;
        let hashes = collection
            .features
            .iter()
            .map(|f| geohash_encode(f, precision))
            .collect::<Result<Vec<_>>>()?;

        let resolved = hashes
            .iter()
            .map(|h| h.precision)
            .min()
            .unwrap_or(precision);

        let mut buckets: FxHashMap<String, Vec<FeatureIndex>> = FxHashMap::default();
        for (idx, hash) in hashes.iter().enumerate() {
            let depth = hash.precision.min(resolved);
            for len in 1..=depth {
                buckets
                    .entry(hash.prefix(len).to_string())
                    .or_default()
                    .push(FeatureIndex(idx));
            }
        }

        log::debug!(
            "Built geohash dictionary: {} features, {} keys, precision {}",
            hashes.len(),
            buckets.len(),
            resolved
        );

        Ok(Self {
            buckets,
            hashes,
            precision: resolved,
        })
    }

    /// Coarsest precision across the indexed features.
    pub fn precision(&self) -> usize {
        self.precision
    }

    /// Number of indexed features.
    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    /// Resolved hash of an indexed feature.
    pub fn hash_of(&self, index: FeatureIndex) -> Option<&GeoHash> {
        self.hashes.get(index.0)
    }

    /// Exact bucket for a prefix key.
    pub fn get(&self, prefix: &str) -> Option<&[FeatureIndex]> {
        self.buckets.get(prefix).map(Vec::as_slice)
    }

    pub fn contains_key(&self, prefix: &str) -> bool {
        self.buckets.contains_key(prefix)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.buckets.keys().map(String::as_str)
    }

    /// Candidate features for a hash.
    ///
    /// The hash is cut to the dictionary precision first. The empty prefix
    /// matches every feature; an unknown prefix matches none.
    pub fn candidates(&self, hash: &str) -> Vec<FeatureIndex> {
        let end = hash
            .char_indices()
            .nth(self.precision)
            .map_or(hash.len(), |(i, _)| i);
        let prefix = &hash[..end];
        if prefix.is_empty() {
            return (0..self.hashes.len()).map(FeatureIndex).collect();
        }
        self.get(prefix).map(<[_]>::to_vec).unwrap_or_default()
    }

    /// Fail when `collection` no longer matches the indexed snapshot.
    pub fn ensure_fresh(&self, collection: &FeatureCollection) -> Result<()> {
        if collection.features.len() != self.hashes.len() {
            return Err(GeoBlocksError::StaleDictionary {
                indexed: self.hashes.len(),
                actual: collection.features.len(),
            });
        }
        Ok(())
    }

    pub fn stats(&self) -> DictionaryStats {
        let max_bucket_len = self
            .buckets
            .iter()
            .filter(|(key, _)| key.len() == self.precision)
            .map(|(_, bucket)| bucket.len())
            .max()
            .unwrap_or(0);

        DictionaryStats {
            bucket_count: self.buckets.len(),
            feature_count: self.hashes.len(),
            world_count: self.hashes.iter().filter(|h| h.is_world()).count(),
            max_bucket_len,
            precision: self.precision,
        }
    }
}

/// Build a [`GeoHashDictionary`] over a collection.
pub fn geohash_dictionary(
    collection: &FeatureCollection,
    precision: usize,
) -> Result<GeoHashDictionary> {
    GeoHashDictionary::build(collection, precision)
}
