//! Render transform export
//!
//! Plain-old-data snapshot of where to draw a player, ready to be copied
//! straight into a GPU instance buffer.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec3};

/// Translation, rotation (xyzw quaternion) and scale of one entity
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct RenderTransform {
    pub translation: [f32; 3],
    pub rotation: [f32; 4],
    pub scale: [f32; 3],
}

impl Default for RenderTransform {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Quat::IDENTITY, Vec3::ONE)
    }
}

impl RenderTransform {
    pub fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation: translation.to_array(),
            rotation: rotation.to_array(),
            scale: scale.to_array(),
        }
    }

    /// Blend between the previous and current step; `alpha` in [0, 1]
    pub fn interpolate(
        previous: (Vec3, Quat),
        current: (Vec3, Quat),
        scale: Vec3,
        alpha: f32,
    ) -> Self {
        let alpha = alpha.clamp(0.0, 1.0);
        Self::new(
            previous.0.lerp(current.0, alpha),
            previous.1.slerp(current.1, alpha).normalize(),
            scale,
        )
    }

    pub fn translation(&self) -> Vec3 {
        Vec3::from_array(self.translation)
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_array(self.rotation)
    }

    /// Model matrix (scale, then rotate, then translate)
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::from_array(self.scale),
            self.rotation(),
            self.translation(),
        )
    }
}
