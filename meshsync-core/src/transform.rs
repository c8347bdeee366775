//! Scene object placement
//!
//! A [`Transform`] keeps position, rotation and scale together with the
//! matrices derived from them. The rotation is stored both as a quaternion
//! and as Euler angles in ZXY order (Z applied first, then X, then Y), the
//! convention used by Unity.

use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Rigid/scaled transform with cached forward and inverse matrices
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    /// Euler angles in radians; `x`, `y` and `z` hold the rotation about
    /// each axis, applied in Z, X, Y order.
    pub rotation_euler_zxy: Vec3,
    pub scale: Vec3,
    pub local2world: Mat4,
    pub world2local: Mat4,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        rotation_euler_zxy: Vec3::ZERO,
        scale: Vec3::ONE,
        local2world: Mat4::IDENTITY,
        world2local: Mat4::IDENTITY,
    };

    /// Build a transform from translation, rotation and scale
    pub fn from_trs(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        let mut transform = Self {
            position,
            scale,
            ..Self::IDENTITY
        };
        transform.set_rotation(rotation);
        transform
    }

    /// Set the rotation from a quaternion, refreshing the Euler form and matrices
    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation.normalize();
        self.rotation_euler_zxy = quat_to_euler_zxy(self.rotation);
        self.update_matrices();
    }

    /// Set the rotation from ZXY Euler angles (radians)
    pub fn set_rotation_euler_zxy(&mut self, euler: Vec3) {
        self.rotation_euler_zxy = euler;
        self.rotation = euler_zxy_to_quat(euler);
        self.update_matrices();
    }

    /// Set the translation and refresh the matrices
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.update_matrices();
    }

    /// Recompute `local2world` and `world2local` from position, rotation and scale
    pub fn update_matrices(&mut self) {
        self.local2world =
            Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position);
        self.world2local = self.local2world.inverse();
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Transform a point from local to world space
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.local2world.transform_point3(point)
    }

    /// Transform a point from world to local space
    pub fn inverse_transform_point(&self, point: Vec3) -> Vec3 {
        self.world2local.transform_point3(point)
    }

    /// Check that the cached matrices agree with each other and with the
    /// Euler/quaternion pair, within `epsilon`
    pub fn is_consistent(&self, epsilon: f32) -> bool {
        let product = self.local2world * self.world2local;
        let rotation = euler_zxy_to_quat(self.rotation_euler_zxy);
        product.abs_diff_eq(Mat4::IDENTITY, epsilon)
            && (rotation.dot(self.rotation).abs() - 1.0).abs() <= epsilon
    }
}

/// Quaternion for ZXY Euler angles (Z applied first, Y last)
pub fn euler_zxy_to_quat(euler: Vec3) -> Quat {
    Quat::from_euler(EulerRot::YXZ, euler.y, euler.x, euler.z)
}

/// ZXY Euler angles for a quaternion
pub fn quat_to_euler_zxy(rotation: Quat) -> Vec3 {
    let (y, x, z) = rotation.to_euler(EulerRot::YXZ);
    Vec3::new(x, y, z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_identity_default() {
        let transform = Transform::default();
        assert!(transform.is_identity());
        assert!(transform.is_consistent(1e-6));
    }

    #[test]
    fn test_from_trs_matrices_are_inverse() {
        let transform = Transform::from_trs(
            Vec3::new(1.0, 2.0, 3.0),
            Quat::from_rotation_y(0.7),
            Vec3::new(2.0, 2.0, 0.5),
        );
        assert!(transform.is_consistent(1e-4));

        let p = Vec3::new(0.3, -1.2, 4.0);
        let back = transform.inverse_transform_point(transform.transform_point(p));
        assert!(back.abs_diff_eq(p, 1e-4));
    }

    #[test]
    fn test_euler_zxy_order() {
        // Z first, then X, then Y
        let euler = Vec3::new(0.3, -0.4, 0.5);
        let expected =
            Quat::from_rotation_y(euler.y) * Quat::from_rotation_x(euler.x) * Quat::from_rotation_z(euler.z);
        let q = euler_zxy_to_quat(euler);
        assert!(q.abs_diff_eq(expected, 1e-6));

        let round = quat_to_euler_zxy(q);
        assert!(round.abs_diff_eq(euler, 1e-5));
    }

    #[test]
    fn test_set_rotation_euler_updates_matrix() {
        let mut transform = Transform::default();
        transform.set_rotation_euler_zxy(Vec3::new(0.0, FRAC_PI_2, 0.0));
        let rotated = transform.transform_point(Vec3::X);
        assert!(rotated.abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), 1e-6));
        assert!(transform.is_consistent(1e-5));
    }
}
