//! Per-draw object placement.

use cgmath::{Deg, Matrix4, Vector3};

/// Scale, Euler rotation in degrees and translation of a single draw.
///
/// The model matrix is `translate * rot_z * rot_y * rot_x * scale`, i.e. the
/// mesh is scaled first, then rotated about X, Y and Z in that order, then moved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale: Vector3<f32>,
    /// Rotation about the X, Y and Z axis in degrees.
    pub rotation: Vector3<f32>,
    pub position: Vector3<f32>,
}

impl Transform {
    pub fn new(scale: Vector3<f32>, rotation: Vector3<f32>, position: Vector3<f32>) -> Self {
        Self {
            scale,
            rotation,
            position,
        }
    }

    /// Unrotated transform.
    pub fn scaled_at(scale: Vector3<f32>, position: Vector3<f32>) -> Self {
        Self::new(scale, Vector3::new(0.0, 0.0, 0.0), position)
    }

    pub fn to_matrix(&self) -> Matrix4<f32> {
        let scale = Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z);
        let rotation_x = Matrix4::from_angle_x(Deg(self.rotation.x));
        let rotation_y = Matrix4::from_angle_y(Deg(self.rotation.y));
        let rotation_z = Matrix4::from_angle_z(Deg(self.rotation.z));
        let translation = Matrix4::from_translation(self.position);

        translation * rotation_z * rotation_y * rotation_x * scale
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::scaled_at(Vector3::new(1.0, 1.0, 1.0), Vector3::new(0.0, 0.0, 0.0))
    }
}
