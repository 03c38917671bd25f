//! Missileman - physics core for a morphing platformer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (tile kinematics, rigid bodies, collisions, sessions)
//! - `clock`: Fixed-step loop driver with render interpolation remainder
//! - `input`: Per-tick control snapshots, input sources and replays
//! - `tuning`: Data-driven physics constants
//! - `transform`: Render transform export

pub mod clock;
pub mod error;
pub mod input;
pub mod sim;
pub mod transform;
pub mod tuning;

pub use clock::FixedStepLoop;
pub use error::SimError;
pub use input::{Controls, InputSource, Replay};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const STEP: f32 = 1.0 / 60.0;
    /// Largest wall-clock delta accepted per frame (avoids spiral of death after pause/resume)
    pub const MAX_FRAME_DELTA: f64 = 1.0;

    /// Missile collision circle radius
    pub const MISSILE_POINT_RADIUS: f32 = 0.25;
    /// Distance of each collision circle from the missile center along its long axis
    pub const MISSILE_POINT_OFFSET: f32 = 0.175;

    /// Speed below which a new missile starts upright instead of along its velocity
    pub const MORPH_ALIGN_TOLERANCE: f32 = 0.75;
    /// Ticks spent growing/shrinking between forms
    pub const MORPH_TICKS: u32 = 10;

    /// Guard for normalizing near-zero vectors and quaternions
    pub const EPSILON: f32 = 1.0e-6;
}

/// Clamp `x` into `[min, max]`
#[inline]
pub fn bound(x: f32, min: f32, max: f32) -> f32 {
    x.max(min).min(max)
}

/// Heading (rotation about +z) that turns body-space +y onto `dir`
#[inline]
pub fn heading_of(dir: Vec2) -> f32 {
    -dir.x.atan2(dir.y)
}
