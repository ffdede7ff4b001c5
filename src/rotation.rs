use crate::types::{Shape, ShapeKind};

/// Normalizes a direction in degrees into `[0, 360)`.
pub fn normalize_direction(degrees: f64) -> f64 {
    let d = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if d >= 360.0 { 0.0 } else { d }
}

/// Nearest discrete orientation for a direction: `round(n * dir / 360) mod n`.
pub fn rotation_index(degrees: f64, steps: usize) -> usize {
    if steps == 0 {
        return 0;
    }
    let dir = normalize_direction(degrees);
    ((steps as f64 * dir / 360.0 + 0.5).floor() as usize) % steps
}

/// Angle in degrees of rotation index `index`.
pub fn index_angle(index: usize, steps: usize) -> f64 {
    if steps == 0 { 0.0 } else { 360.0 / steps as f64 * index as f64 }
}

/// One precomputed shape per discrete orientation of a frame.
///
/// Entry `i` is the base shape turned by `360 / N * i` degrees about the
/// frame center. A non-rotatable frame only fills entry 0.
#[derive(Clone, Debug)]
pub struct RotationCache {
    entries: Vec<Shape>,
}

impl RotationCache {
    pub fn build(base: Shape, steps: usize, rotatable: bool) -> Self {
        let mut cache = Self { entries: vec![Shape::None; steps] };
        cache.replace(base, rotatable);
        cache
    }

    /// Discards every entry, then fills the cache from a new base shape.
    pub fn replace(&mut self, base: Shape, rotatable: bool) {
        let steps = self.entries.len();
        self.entries.fill(Shape::None);
        if steps == 0 {
            return;
        }
        self.entries[0] = base;
        if !rotatable {
            return;
        }
        for (i, slot) in self.entries.iter_mut().enumerate().skip(1) {
            *slot = base.rotated(index_angle(i, steps).to_radians());
        }
    }

    /// Shape at a rotation index; `Shape::None` for an unfilled or out-of-range index.
    pub fn get(&self, index: usize) -> Shape {
        self.entries.get(index).copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Kind of the declared shape (entry 0 always holds it).
    pub fn kind(&self) -> ShapeKind {
        self.get(0).kind()
    }
}
