//! Static line segments for missile collision
//!
//! Lines live in the z = 0 plane. They are supplied by the level and never
//! move during a session.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::EPSILON;

/// A wall boundary segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub a: Vec2,
    pub b: Vec2,
}

impl Line {
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self { a, b }
    }

    #[inline]
    pub fn direction(&self) -> Vec2 {
        self.b - self.a
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.direction().length()
    }

    /// Zero-length segments act as a single point
    pub fn is_degenerate(&self) -> bool {
        self.direction().length_squared() < EPSILON
    }

    /// Unit normal on the left of a -> b (zero for a degenerate segment)
    pub fn normal(&self) -> Vec2 {
        self.direction().perp().normalize_or_zero()
    }

    /// Parameter in [0, 1] of the point on the segment closest to `p`
    pub fn closest_t(&self, p: Vec2) -> f32 {
        if self.is_degenerate() {
            return 0.0;
        }
        let d = self.direction();
        ((p - self.a).dot(d) / d.length_squared()).clamp(0.0, 1.0)
    }

    /// Point on the segment closest to `p`
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        self.a + self.direction() * self.closest_t(p)
    }

    /// Midpoint of the segment
    pub fn center(&self) -> Vec2 {
        (self.a + self.b) * 0.5
    }
}
