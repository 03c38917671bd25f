//! Rigid-body entity integrated with RK4
//!
//! Canonical state is {position, momentum, orientation, angular momentum}.
//! Velocity, angular velocity, spin and the body-to-world matrix are derived
//! from it and only ever recomputed, never written directly.

use glam::{Mat4, Quat, Vec3};

use super::collision::{CollisionPoint, vs_line};
use super::forms::FormPhysics;
use super::line::Line;
use super::math::{normalize_quat, rk4_weight, rotation_z, spin};
use crate::input::Controls;
use crate::tuning::ContactTuning;

/// Inertia of the unit body about z
pub const INERTIA: f32 = 1.0 / 6.0;

/// Force and torque accumulator for one evaluation
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Forces {
    pub force: Vec3,
    pub torque: Vec3,
}

impl Forces {
    /// Apply `force` at `arm` (offset from the body center)
    #[inline]
    pub fn add_at(&mut self, arm: Vec3, force: Vec3) {
        self.force += force;
        self.torque += arm.cross(force);
    }
}

/// Body state: canonical values plus the quantities derived from them
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidBodyState {
    position: Vec3,
    momentum: Vec3,
    orientation: Quat,
    angular_momentum: Vec3,

    velocity: Vec3,
    angular_velocity: Vec3,
    spin: Quat,
    body_to_world: Mat4,

    mass: f32,
    inverse_mass: f32,
    inertia: f32,
    inverse_inertia: f32,
}

impl Default for RigidBodyState {
    fn default() -> Self {
        Self::new(1.0, INERTIA)
    }
}

impl RigidBodyState {
    pub fn new(mass: f32, inertia: f32) -> Self {
        let mut state = Self {
            position: Vec3::ZERO,
            momentum: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            angular_momentum: Vec3::ZERO,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            spin: Quat::from_xyzw(0.0, 0.0, 0.0, 0.0),
            body_to_world: Mat4::IDENTITY,
            mass,
            inverse_mass: mass.recip(),
            inertia,
            inverse_inertia: inertia.recip(),
        };
        state.recalculate();
        state
    }

    /// Rebuild the derived quantities from the canonical state
    pub fn recalculate(&mut self) {
        self.orientation = normalize_quat(self.orientation);
        self.velocity = self.momentum * self.inverse_mass;
        self.angular_velocity = self.angular_momentum * self.inverse_inertia;
        self.spin = spin(self.angular_velocity, self.orientation);
        self.body_to_world = Mat4::from_rotation_translation(self.orientation, self.position);
    }

    /// Copy of this state advanced along `d` for `dt`
    pub fn displaced(&self, d: &Derivative, dt: f32) -> Self {
        let mut next = *self;
        next.position += d.velocity * dt;
        next.momentum += d.force * dt;
        next.orientation = next.orientation + d.spin * dt;
        next.angular_momentum += d.torque * dt;
        next.recalculate();
        next
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite()
            && self.momentum.is_finite()
            && self.orientation.is_finite()
            && self.angular_momentum.is_finite()
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn momentum(&self) -> Vec3 {
        self.momentum
    }

    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    pub fn angular_momentum(&self) -> Vec3 {
        self.angular_momentum
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn angular_velocity(&self) -> Vec3 {
        self.angular_velocity
    }

    pub fn spin(&self) -> Quat {
        self.spin
    }

    pub fn body_to_world(&self) -> Mat4 {
        self.body_to_world
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn inertia(&self) -> f32 {
        self.inertia
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.recalculate();
    }

    pub fn set_momentum(&mut self, momentum: Vec3) {
        self.momentum = momentum;
        self.recalculate();
    }

    pub fn set_orientation(&mut self, orientation: Quat) {
        self.orientation = orientation;
        self.recalculate();
    }

    pub fn set_angular_momentum(&mut self, angular_momentum: Vec3) {
        self.angular_momentum = angular_momentum;
        self.recalculate();
    }
}

/// One evaluation of the force model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Derivative {
    pub velocity: Vec3,
    pub force: Vec3,
    pub spin: Quat,
    pub torque: Vec3,
}

/// Static geometry and contact response the body is integrated against
#[derive(Debug, Clone, Copy)]
pub struct Contacts<'a> {
    pub points: &'a [CollisionPoint],
    pub lines: &'a [Line],
    pub tuning: &'a ContactTuning,
}

impl Contacts<'_> {
    /// Penalty forces of every point against every line
    pub fn apply(&self, state: &RigidBodyState, forces: &mut Forces) -> usize {
        let mut touching = 0;
        for line in self.lines {
            for p in self.points {
                if vs_line(state, forces, p, line, self.tuning) {
                    touching += 1;
                }
            }
        }
        touching
    }
}

/// Total force and torque on a body in `state`. Pure: only the returned
/// accumulator is written.
pub fn total_forces(
    state: &RigidBodyState,
    physics: &dyn FormPhysics,
    controls: &Controls,
    contacts: &Contacts<'_>,
) -> Forces {
    let mut forces = Forces::default();
    physics.forces(state, controls, &mut forces);
    contacts.apply(state, &mut forces);
    physics.control(state, controls, &mut forces);
    forces
}

fn evaluate(
    initial: &RigidBodyState,
    step: Option<(&Derivative, f32)>,
    physics: &dyn FormPhysics,
    controls: &Controls,
    contacts: &Contacts<'_>,
) -> Derivative {
    let state = match step {
        Some((d, dt)) => initial.displaced(d, dt),
        None => *initial,
    };
    let forces = total_forces(&state, physics, controls, contacts);
    Derivative {
        velocity: state.velocity,
        force: forces.force,
        spin: state.spin,
        torque: forces.torque,
    }
}

/// A body advanced by classical fourth-order Runge-Kutta
#[derive(Debug, Clone, Default)]
pub struct RigidBody {
    state: RigidBodyState,
}

impl RigidBody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current state
    pub fn state(&self) -> &RigidBodyState {
        &self.state
    }

    pub fn position(&self) -> Vec3 {
        self.state.position
    }

    pub fn orientation(&self) -> Quat {
        self.state.orientation
    }

    pub fn velocity(&self) -> Vec3 {
        self.state.velocity
    }

    /// Place the body at rest, upright
    pub fn reset(&mut self, x: f32, y: f32) {
        let mut state = RigidBodyState::new(self.state.mass, self.state.inertia);
        state.position = Vec3::new(x, y, 0.0);
        state.recalculate();
        self.state = state;
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        self.state.set_position(Vec3::new(x, y, 0.0));
    }

    /// Set linear velocity (momentum follows from the mass)
    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.state.set_momentum(velocity * self.state.mass);
    }

    /// Turn to `theta` about +z (upright when `None`) and stop spinning
    pub fn set_rotation(&mut self, theta: Option<f32>) {
        self.state.orientation = rotation_z(theta.unwrap_or(0.0));
        self.state.angular_momentum = Vec3::ZERO;
        self.state.recalculate();
    }

    /// Advance by `dt`.
    ///
    /// After integration the form's velocity limit is applied and the derived
    /// quantities are rebuilt. A step that produces non-finite values is
    /// discarded.
    pub fn update(
        &mut self,
        dt: f32,
        physics: &dyn FormPhysics,
        controls: &Controls,
        contacts: &Contacts<'_>,
    ) {
        let initial = self.state;

        let a = evaluate(&initial, None, physics, controls, contacts);
        let b = evaluate(&initial, Some((&a, dt * 0.5)), physics, controls, contacts);
        let c = evaluate(&initial, Some((&b, dt * 0.5)), physics, controls, contacts);
        let d = evaluate(&initial, Some((&c, dt)), physics, controls, contacts);

        let mut next = initial;
        next.position += rk4_weight(a.velocity, b.velocity, c.velocity, d.velocity) * dt;
        next.momentum += rk4_weight(a.force, b.force, c.force, d.force) * dt;
        next.orientation = next.orientation + rk4_weight(a.spin, b.spin, c.spin, d.spin) * dt;
        next.angular_momentum += rk4_weight(a.torque, b.torque, c.torque, d.torque) * dt;
        next.recalculate();

        physics.limit_velocity(&mut next, controls);
        next.recalculate();

        debug_assert!(next.is_finite(), "rigid body integration produced non-finite state");
        if !next.is_finite() {
            log::error!("Discarding non-finite rigid body step at {:?}", initial.position);
            return;
        }

        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::forms::{ManPhysics, MissilePhysics};
    use crate::tuning::{ManTuning, MissileTuning};
    use glam::Vec2;

    /// No forces at all
    struct Drift;

    impl FormPhysics for Drift {
        fn forces(&self, _: &RigidBodyState, _: &Controls, _: &mut Forces) {}
        fn limit_velocity(&self, _: &mut RigidBodyState, _: &Controls) {}
    }

    /// Constant force along +x
    struct Push(f32);

    impl FormPhysics for Push {
        fn forces(&self, _: &RigidBodyState, _: &Controls, out: &mut Forces) {
            out.force.x += self.0;
        }
        fn limit_velocity(&self, _: &mut RigidBodyState, _: &Controls) {}
    }

    /// Constant torque about +z
    struct Twist(f32);

    impl FormPhysics for Twist {
        fn forces(&self, _: &RigidBodyState, _: &Controls, out: &mut Forces) {
            out.torque.z += self.0;
        }
        fn limit_velocity(&self, _: &mut RigidBodyState, _: &Controls) {}
    }

    fn no_contacts(tuning: &ContactTuning) -> Contacts<'_> {
        Contacts {
            points: &[],
            lines: &[],
            tuning,
        }
    }

    #[test]
    fn test_reset_is_at_rest() {
        let mut body = RigidBody::new();
        body.set_velocity(Vec3::new(3.0, 4.0, 0.0));
        body.set_rotation(Some(1.0));
        body.reset(2.0, 5.0);
        assert_eq!(body.position(), Vec3::new(2.0, 5.0, 0.0));
        assert_eq!(body.velocity(), Vec3::ZERO);
        assert_eq!(body.orientation(), Quat::IDENTITY);
    }

    #[test]
    fn test_drift_moves_in_straight_line() {
        let tuning = ContactTuning::default();
        let mut body = RigidBody::new();
        body.set_velocity(Vec3::new(1.0, 2.0, 0.0));
        for _ in 0..60 {
            body.update(1.0 / 60.0, &Drift, &Controls::IDLE, &no_contacts(&tuning));
        }
        assert!((body.position() - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_constant_force_matches_closed_form() {
        // x = 0.5 * a * t^2, exact for RK4
        let tuning = ContactTuning::default();
        let mut body = RigidBody::new();
        for _ in 0..60 {
            body.update(1.0 / 60.0, &Push(2.0), &Controls::IDLE, &no_contacts(&tuning));
        }
        assert!((body.position().x - 1.0).abs() < 1e-3);
        assert!((body.velocity().x - 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_torque_spins_and_stays_normalized() {
        let tuning = ContactTuning::default();
        let mut body = RigidBody::new();
        for _ in 0..600 {
            body.update(1.0 / 60.0, &Twist(0.5), &Controls::IDLE, &no_contacts(&tuning));
            let len = body.orientation().length();
            assert!((len - 1.0).abs() < 1e-4);
        }
        assert!(body.state().angular_momentum().z > 0.0);
        assert!(body.state().angular_velocity().z > 0.0);
    }

    #[test]
    fn test_body_to_world_matches_state() {
        let mut body = RigidBody::new();
        body.reset(3.0, 4.0);
        body.set_rotation(Some(std::f32::consts::FRAC_PI_2));
        let m = body.state().body_to_world();
        let p = m.transform_point3(Vec3::Y);
        assert!((p - Vec3::new(2.0, 4.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_rests_on_floor_line() {
        let tuning = ContactTuning::default();
        let physics = ManPhysics::new(ManTuning::default());
        let points = [
            CollisionPoint::new(Vec3::new(0.0, 0.175, 0.0), 0.25),
            CollisionPoint::new(Vec3::new(0.0, -0.175, 0.0), 0.25),
        ];
        let lines = [Line::new(Vec2::new(-10.0, 0.0), Vec2::new(10.0, 0.0))];
        let contacts = Contacts {
            points: &points,
            lines: &lines,
            tuning: &tuning,
        };
        let mut body = RigidBody::new();
        body.reset(0.0, 1.0);
        for _ in 0..600 {
            body.update(1.0 / 60.0, &physics, &Controls::IDLE, &contacts);
        }
        // Settles with the lower circle slightly sunk into the floor
        let y = body.position().y;
        assert!(y > 0.175 && y < 0.175 + 0.25, "y = {}", y);
        assert!(body.velocity().length() < 0.5);
    }

    #[test]
    fn test_missile_speed_capped() {
        let tuning = ContactTuning::default();
        let missile = MissileTuning::default();
        let physics = MissilePhysics::new(missile);
        let mut body = RigidBody::new();
        for _ in 0..300 {
            body.update(1.0 / 60.0, &physics, &Controls::IDLE, &no_contacts(&tuning));
        }
        assert!(body.velocity().length() <= missile.max_speed + 1e-3);
        // Thrust along body +y while upright
        assert!(body.velocity().y > 9.0);
    }

    #[test]
    fn test_total_forces_is_pure() {
        let tuning = ContactTuning::default();
        let physics = ManPhysics::new(ManTuning::default());
        let state = RigidBodyState::default();
        let before = state;
        let a = total_forces(&state, &physics, &Controls::IDLE, &no_contacts(&tuning));
        let b = total_forces(&state, &physics, &Controls::IDLE, &no_contacts(&tuning));
        assert_eq!(a, b);
        assert_eq!(state, before);
    }
}
