//! 2D vector helpers shared by physics, collisions and goal checks

use serde::{Deserialize, Serialize};

/// Point or direction in field coordinates (origin top-left, y grows downward)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn scale(self, s: f32) -> Vec2 {
        Vec2::new(self.x * s, self.y * s)
    }

    pub fn add(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x + other.x, self.y + other.y)
    }

    pub fn sub(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x - other.x, self.y - other.y)
    }
}

/// Euclidean distance between `a` and `b`
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    b.sub(a).length()
}

/// Unit vector pointing from `a` to `b`.
///
/// Returns `None` when the points coincide: there is no meaningful direction,
/// and callers skip their correction for that tick.
pub fn normal(a: Vec2, b: Vec2) -> Option<Vec2> {
    let delta = b.sub(a);
    let dist = delta.length();
    if dist == 0.0 || !dist.is_finite() {
        return None;
    }
    Some(delta.scale(1.0 / dist))
}
