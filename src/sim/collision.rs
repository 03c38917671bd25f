//! Collision detection and response
//!
//! Two very different models share this module:
//! - The missile samples a few circles against static line segments and
//!   receives a penalty (spring-damper) force, so any number of simultaneous
//!   contacts simply add up inside one RK4 evaluation.
//! - Target detection is a plain rectangle overlap in tile units.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::line::Line;
use super::rigid_body::{Forces, RigidBodyState};
use super::tiles::CellRect;
use crate::consts::EPSILON;
use crate::tuning::ContactTuning;

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Closest point on the segment (if hit)
    pub point: Vec2,
    /// Surface normal at the contact, pointing toward the circle center
    pub normal: Vec2,
    /// Penetration depth
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// A sampling circle fixed to a body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionPoint {
    /// Offset from the body origin, in body space
    pub offset: Vec3,
    pub r: f32,
    /// `r * r`
    pub rs: f32,
}

impl CollisionPoint {
    pub fn new(offset: Vec3, r: f32) -> Self {
        Self { offset, r, rs: r * r }
    }

    /// World-space center of this circle for a body in `state`
    #[inline]
    pub fn to_world(&self, state: &RigidBodyState) -> Vec3 {
        state.position() + state.orientation() * self.offset
    }
}

/// Check a collision circle centered at `center` against a line segment
pub fn circle_segment(center: Vec2, circle: &CollisionPoint, line: &Line) -> CollisionResult {
    let closest = line.closest_point(center);
    let delta = center - closest;
    let dist_sq = delta.length_squared();

    if dist_sq >= circle.rs {
        return CollisionResult::miss();
    }

    let dist = dist_sq.sqrt();
    let normal = if dist > EPSILON {
        delta / dist
    } else {
        // Center sits on the segment; push out along the segment normal
        if line.is_degenerate() { Vec2::Y } else { line.normal() }
    };

    CollisionResult {
        hit: true,
        point: closest,
        normal,
        penetration: circle.r - dist,
    }
}

/// Penalty response of one body circle against one line.
///
/// Adds `n * (k * depth - c * v_n)` (never pulling) at the contact, and the
/// matching torque about the body center, into `forces`. Returns whether the
/// circle touched the line.
pub fn vs_line(
    state: &RigidBodyState,
    forces: &mut Forces,
    circle: &CollisionPoint,
    line: &Line,
    contact: &ContactTuning,
) -> bool {
    let point = circle.to_world(state);
    let result = circle_segment(point.truncate(), circle, line);
    if !result.hit {
        return false;
    }

    let normal = result.normal.extend(0.0);
    let arm = point - state.position();
    let point_velocity = state.velocity() + state.angular_velocity().cross(arm);
    let approach = point_velocity.dot(normal);

    let magnitude = (contact.stiffness * result.penetration - contact.damping * approach).max(0.0);
    forces.add_at(arm, normal * magnitude);
    true
}

/// Inclusive overlap of two integer rectangles (they share at least one cell)
#[allow(clippy::too_many_arguments)]
pub fn overlap(x1: i32, y1: i32, w1: i32, h1: i32, x2: i32, y2: i32, w2: i32, h2: i32) -> bool {
    !(((x1 + w1 - 1) < x2) || ((x2 + w2 - 1) < x1) || ((y1 + h1 - 1) < y2) || ((y2 + h2 - 1) < y1))
}

/// [`overlap`] on two [`CellRect`]s
#[inline]
pub fn rects_overlap(a: &CellRect, b: &CellRect) -> bool {
    overlap(a.x, a.y, a.w, a.h, b.x, b.y, b.w, b.h)
}

/// Circle vs cell rectangle (continuous, touching does not count)
pub fn circle_box(center: Vec2, radius: f32, rect: &CellRect) -> bool {
    let closest = center.clamp(rect.min(), rect.max());
    center.distance_squared(closest) < radius * radius
}
