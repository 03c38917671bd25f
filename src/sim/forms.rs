//! Per-form force models for the rigid body
//!
//! The integrator asks the active form for its forces, control forces and
//! velocity limit. The player picks the form from its morph state.

use glam::{Quat, Vec3};

use super::math::clamp_length;
use super::rigid_body::{Forces, RigidBodyState};
use crate::input::Controls;
use crate::tuning::{ManTuning, MissileTuning};

/// Force model plugged into [`super::rigid_body::RigidBody::update`]
pub trait FormPhysics {
    /// Environmental forces (gravity and the like)
    fn forces(&self, state: &RigidBodyState, controls: &Controls, out: &mut Forces);

    /// Forces driven by the controls, applied after contacts
    fn control(&self, _state: &RigidBodyState, _controls: &Controls, _out: &mut Forces) {}

    /// Clamp momentum after a completed integration step
    fn limit_velocity(&self, state: &mut RigidBodyState, controls: &Controls);
}

/// Add a body-space thrust vector, rotated into world space
#[inline]
pub fn thrust(out: &mut Forces, orientation: Quat, body_thrust: Vec3) {
    out.force += orientation * body_thrust;
}

/// Running, jumping man on the rigid body
#[derive(Debug, Clone, Copy)]
pub struct ManPhysics {
    tuning: ManTuning,
}

impl ManPhysics {
    pub fn new(tuning: ManTuning) -> Self {
        Self { tuning }
    }
}

impl FormPhysics for ManPhysics {
    fn forces(&self, state: &RigidBodyState, controls: &Controls, out: &mut Forces) {
        // Holding jump replaces gravity rather than adding to it
        if !controls.jump {
            out.force.y -= self.tuning.gravity * state.mass();
        }
    }

    fn control(&self, _state: &RigidBodyState, controls: &Controls, out: &mut Forces) {
        if controls.left {
            out.force.x -= self.tuning.run_force;
        } else if controls.right {
            out.force.x += self.tuning.run_force;
        }
        if controls.jump {
            out.force.y += self.tuning.jump_force;
        }
    }

    fn limit_velocity(&self, state: &mut RigidBodyState, controls: &Controls) {
        let t = &self.tuning;
        let mut v = state.velocity();
        v.x = v.x.clamp(-t.max_xspeed, t.max_xspeed);
        v.y = v.y.clamp(-t.max_yspeed, t.max_yspeed);

        if !controls.left && !controls.right {
            v.x *= t.idle_damping;
        } else if (controls.left && v.x > 0.0) || (controls.right && v.x < 0.0) {
            v.x *= t.reverse_damping;
        }

        state.set_momentum(v * state.mass());
        // The man never tips over
        state.set_angular_momentum(Vec3::ZERO);
        state.set_orientation(Quat::IDENTITY);
    }
}

/// Thrust-propelled missile steered by torque
#[derive(Debug, Clone, Copy)]
pub struct MissilePhysics {
    tuning: MissileTuning,
}

impl MissilePhysics {
    pub fn new(tuning: MissileTuning) -> Self {
        Self { tuning }
    }

    /// Body-space thrust vector
    pub fn thrust_vector(&self) -> Vec3 {
        Vec3::new(0.0, self.tuning.thrust, 0.0)
    }
}

impl FormPhysics for MissilePhysics {
    fn forces(&self, _state: &RigidBodyState, _controls: &Controls, _out: &mut Forces) {}

    fn control(&self, state: &RigidBodyState, controls: &Controls, out: &mut Forces) {
        if controls.left {
            out.torque.z += self.tuning.torque;
        } else if controls.right {
            out.torque.z -= self.tuning.torque;
        }
        thrust(out, state.orientation(), self.thrust_vector());
    }

    fn limit_velocity(&self, state: &mut RigidBodyState, _controls: &Controls) {
        let max_momentum = self.tuning.max_speed * state.mass();
        state.set_momentum(clamp_length(state.momentum(), max_momentum));
        state.set_angular_momentum(clamp_length(
            state.angular_momentum(),
            self.tuning.max_angular_momentum,
        ));
    }
}
