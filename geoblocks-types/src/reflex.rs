use serde::{Deserialize, Serialize};

/// A 2D displacement in coordinate space (x = east, y = north).
pub type Vector2 = [f64; 2];

/// A ring vertex whose interior angle exceeds 180 degrees.
///
/// Produced on demand by reflex detection and never stored. The two vectors
/// point from the vertex towards its previous and next ring neighbours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReflexPoint {
    /// Index of the vertex in the open ring (closing duplicate removed)
    pub coord_index: usize,
    /// Vector from the vertex to the previous vertex
    pub first_vec: Vector2,
    /// Vector from the vertex to the next vertex
    pub sec_vec: Vector2,
}

impl ReflexPoint {
    pub fn new(coord_index: usize, first_vec: Vector2, sec_vec: Vector2) -> Self {
        Self {
            coord_index,
            first_vec,
            sec_vec,
        }
    }

    /// Sum of the two edge vectors scaled to unit length.
    ///
    /// For a reflex vertex this points out of the polygon; negate it to
    /// head into the interior. Returns `None` when the edges cancel out.
    pub fn bisector(&self) -> Option<Vector2> {
        let a = unit(self.first_vec)?;
        let b = unit(self.sec_vec)?;
        unit([a[0] + b[0], a[1] + b[1]])
    }
}

fn unit(v: Vector2) -> Option<Vector2> {
    let len = (v[0] * v[0] + v[1] * v[1]).sqrt();
    if len == 0.0 || !len.is_finite() {
        None
    } else {
        Some([v[0] / len, v[1] / len])
    }
}
