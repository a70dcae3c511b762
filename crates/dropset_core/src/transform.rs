//! Object and camera poses.
//!
//! Instances carry a full TRS transform; cameras are inverted through
//! [`Transform::normalized_matrix`], which ignores scale.  Euler angles use
//! the XYZ order scene files are written in.

use glam::{EulerRot, Mat4, Quat, Vec3};

/// World-space transform of a scene object.
///
/// # Example
/// ```rust,ignore
/// use dropset_core::Transform;
/// use glam::Vec3;
///
/// let t = Transform::from_euler_xyz(Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 0.0, 1.57));
/// let m = t.matrix();
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// World-space position.
    pub position: Vec3,
    /// Orientation as a unit quaternion.
    pub rotation: Quat,
    /// Non-uniform scale factor.
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    /// Identity transform with unit scale.
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Construct with a world-space position, identity rotation and scale.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// Construct from a position and XYZ Euler angles in radians.
    ///
    /// XYZ order means X is applied first, then Y, then Z (`R = Rz * Ry * Rx`),
    /// the convention scene authoring tools use for `rotation_euler`.
    pub fn from_euler_xyz(position: Vec3, euler: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::from_euler(EulerRot::ZYX, euler.z, euler.y, euler.x),
            scale: Vec3::ONE,
        }
    }

    /// Construct with a position and a look-at rotation.
    ///
    /// The resulting transform's local `-Z` points at `target`; `up` is the
    /// world-up hint; when it is parallel to the view direction another world
    /// axis stands in.  A target equal to `position` keeps identity rotation.
    pub fn looking_at(position: Vec3, target: Vec3, up: Vec3) -> Self {
        let dir = (target - position).normalize_or_zero();
        let up = if dir.cross(up.normalize_or_zero()).length_squared() < 1e-8 {
            if dir.y.abs() > 0.9 {
                Vec3::Z
            } else {
                Vec3::Y
            }
        } else {
            up
        };
        let rotation = if dir.length_squared() < 1e-10 {
            Quat::IDENTITY
        } else {
            Mat4::look_at_rh(position, target, up)
                .to_scale_rotation_translation()
                .1
                .inverse()
        };
        Self {
            position,
            rotation,
            scale: Vec3::ONE,
        }
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Build the TRS matrix (`T * R * S`).
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Build the rigid part of the matrix (`T * R`), scale stripped.
    pub fn normalized_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation.normalize(), self.position)
    }

    /// Rotation as XYZ Euler angles in radians (inverse of [`Transform::from_euler_xyz`]).
    pub fn euler_xyz(&self) -> Vec3 {
        let (z, y, x) = self.rotation.to_euler(EulerRot::ZYX);
        Vec3::new(x, y, z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_matrix() {
        let t = Transform::default();
        assert!((t.matrix() - Mat4::IDENTITY).abs_diff_eq(Mat4::ZERO, 1e-6));
    }

    #[test]
    fn translation_only() {
        let t = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        let m = t.matrix();
        let (_, _, pos) = m.to_scale_rotation_translation();
        assert!((pos - Vec3::new(1.0, 2.0, 3.0)).length() < 1e-5);
    }

    #[test]
    fn euler_applies_x_before_z() {
        // +90° about X sends +Y to +Z; +90° about Z then leaves +Z untouched.
        let half_pi = std::f32::consts::FRAC_PI_2;
        let t = Transform::from_euler_xyz(Vec3::ZERO, Vec3::new(half_pi, 0.0, half_pi));
        let v = t.matrix().transform_point3(Vec3::Y);
        assert!(v.abs_diff_eq(Vec3::Z, 1e-5));
    }

    #[test]
    fn euler_roundtrip() {
        let e = Vec3::new(0.3, -0.4, 1.1);
        let t = Transform::from_euler_xyz(Vec3::ZERO, e);
        assert!(t.euler_xyz().abs_diff_eq(e, 1e-5));
    }

    #[test]
    fn normalized_matrix_drops_scale() {
        let t = Transform::from_position(Vec3::X).with_scale(Vec3::splat(3.0));
        let m = t.normalized_matrix();
        assert!(m.transform_point3(Vec3::Y).abs_diff_eq(Vec3::new(1.0, 1.0, 0.0), 1e-6));
    }

    #[test]
    fn looking_at_faces_target() {
        let t = Transform::looking_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        let forward = t.rotation * Vec3::NEG_Z;
        assert!(forward.abs_diff_eq(Vec3::NEG_Z, 1e-5));
    }

    #[test]
    fn looking_at_with_parallel_up_stays_finite() {
        let t = Transform::looking_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Z);
        assert!(t.rotation.is_finite());
        let forward = t.rotation * Vec3::NEG_Z;
        assert!(forward.abs_diff_eq(Vec3::NEG_Z, 1e-5));
    }
}
