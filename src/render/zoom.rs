//! Pan/zoom transform between world (layout) and screen coordinates.

use crate::shared::Point;
use serde::{Deserialize, Serialize};

pub const MIN_SCALE: f64 = 0.1;
pub const MAX_SCALE: f64 = 4.0;

/// `screen = world × k + (x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomTransform {
    pub k: f64,
    pub x: f64,
    pub y: f64,
}

impl Default for ZoomTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ZoomTransform {
    pub const IDENTITY: Self = Self {
        k: 1.0,
        x: 0.0,
        y: 0.0,
    };

    pub fn apply(&self, world: Point) -> Point {
        Point::new(world.x * self.k + self.x, world.y * self.k + self.y)
    }

    pub fn invert(&self, screen: Point) -> Point {
        Point::new((screen.x - self.x) / self.k, (screen.y - self.y) / self.k)
    }

    /// Shift by a screen-space delta.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }

    /// Multiply the scale by `factor`, keeping the world point under the
    /// screen-space `pivot` fixed. The scale is clamped to `[0.1, 4]`.
    pub fn zoom_at(&mut self, factor: f64, pivot: Point) {
        self.scale_to(self.k * factor, pivot);
    }

    /// Set the scale to `k` (clamped), keeping `pivot` fixed.
    pub fn scale_to(&mut self, k: f64, pivot: Point) {
        if !k.is_finite() {
            return;
        }
        let anchor = self.invert(pivot);
        self.k = k.clamp(MIN_SCALE, MAX_SCALE);
        self.x = pivot.x - anchor.x * self.k;
        self.y = pivot.y - anchor.y * self.k;
    }
}
