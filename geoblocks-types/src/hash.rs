use serde::{Deserialize, Serialize};

/// A geohash cell together with the precision it was resolved at.
///
/// For points the precision equals the requested one. For lines and polygons
/// it is the length of the prefix shared by both bounding-box corners, so the
/// cell is always large enough to hold the whole shape. A precision of `0`
/// (empty hash) is the world cell.
///
/// # Examples
///
/// ```
/// use geoblocks_types::hash::GeoHash;
///
/// let world = GeoHash::world();
/// assert!(world.is_world());
/// assert_eq!(world.precision, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GeoHash {
    /// Base-32 encoded cell
    pub hash: String,
    /// Number of significant characters in `hash`
    pub precision: usize,
}

impl GeoHash {
    pub fn new(hash: impl Into<String>, precision: usize) -> Self {
        Self {
            hash: hash.into(),
            precision,
        }
    }

    /// The cell covering the whole coordinate range.
    pub fn world() -> Self {
        Self {
            hash: String::new(),
            precision: 0,
        }
    }

    pub fn is_world(&self) -> bool {
        self.hash.is_empty()
    }

    /// The first `len` characters of the hash, or the whole hash if shorter.
    pub fn prefix(&self, len: usize) -> &str {
        let end = len.min(self.hash.len());
        &self.hash[..end]
    }

    /// True when `other` lies inside this cell (this hash is a prefix of it).
    pub fn covers(&self, other: &GeoHash) -> bool {
        other.hash.starts_with(&self.hash)
    }
}

impl std::fmt::Display for GeoHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.hash)
    }
}
