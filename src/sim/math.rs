//! Vector and quaternion helpers on top of glam
//!
//! glam covers the arithmetic; these are the few combinations the integrator
//! needs, with guards for the degenerate cases (zero-length normalize).

use std::ops::{Add, Mul};

use glam::{Quat, Vec3};

use crate::consts::EPSILON;

/// Normalize a quaternion, falling back to identity when it has collapsed
#[inline]
pub fn normalize_quat(q: Quat) -> Quat {
    let len_sq = q.length_squared();
    if !len_sq.is_finite() || len_sq < EPSILON {
        Quat::IDENTITY
    } else {
        q * len_sq.sqrt().recip()
    }
}

/// Time derivative of an orientation: `0.5 * (0, w) * q`
#[inline]
pub fn spin(angular_velocity: Vec3, orientation: Quat) -> Quat {
    let w = angular_velocity * 0.5;
    Quat::from_xyzw(w.x, w.y, w.z, 0.0) * orientation
}

/// RK4 weighting of four derivative samples: `(a + 2(b + c) + d) / 6`
#[inline]
pub fn rk4_weight<T>(a: T, b: T, c: T, d: T) -> T
where
    T: Copy + Add<Output = T> + Mul<f32, Output = T>,
{
    (a + (b + c) * 2.0 + d) * (1.0 / 6.0)
}

/// Rotation about +z, in radians, for a planar orientation
#[inline]
pub fn rotation_z(theta: f32) -> Quat {
    Quat::from_rotation_z(theta)
}

/// Signed angle of an orientation about +z (planar bodies only)
#[inline]
pub fn heading(orientation: Quat) -> f32 {
    let up = orientation * Vec3::Y;
    crate::heading_of(up.truncate())
}

/// Cap the length of a vector without changing its direction
#[inline]
pub fn clamp_length(v: Vec3, max: f32) -> Vec3 {
    let len_sq = v.length_squared();
    if len_sq > max * max && len_sq > EPSILON {
        v * (max / len_sq.sqrt())
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_normalize_quat_guards_zero() {
        let q = normalize_quat(Quat::from_xyzw(0.0, 0.0, 0.0, 0.0));
        assert_eq!(q, Quat::IDENTITY);
        let q = normalize_quat(Quat::from_xyzw(f32::NAN, 0.0, 0.0, 1.0));
        assert_eq!(q, Quat::IDENTITY);
    }

    #[test]
    fn test_normalize_quat_unit_length() {
        let q = normalize_quat(Quat::from_xyzw(0.0, 0.0, 3.0, 4.0));
        assert!((q.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_spin_matches_rotation_rate() {
        // Integrating spin for a short time should rotate about +z by w*dt
        let w = Vec3::new(0.0, 0.0, 2.0);
        let q = Quat::IDENTITY;
        let dt = 0.001;
        let next = normalize_quat(q + spin(w, q) * dt);
        assert!((heading(next) - 0.002).abs() < 1e-5);
    }

    #[test]
    fn test_rk4_weight_constant() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        let w = rk4_weight(v, v, v, v);
        assert!((w - v).length() < 1e-6);
    }

    #[test]
    fn test_heading_round_trip() {
        assert!((heading(rotation_z(FRAC_PI_2)) - FRAC_PI_2).abs() < 1e-5);
        assert!(heading(Quat::IDENTITY).abs() < 1e-6);
    }

    #[test]
    fn test_clamp_length() {
        let v = clamp_length(Vec3::new(30.0, 40.0, 0.0), 10.0);
        assert!((v.length() - 10.0).abs() < 1e-4);
        assert_eq!(clamp_length(Vec3::X, 10.0), Vec3::X);
    }
}
