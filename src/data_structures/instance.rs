//! Per-draw object data for GPU rendering.
//!
//! Every draw call snapshots the current object state (model matrix, colour,
//! texture use, material) into an [`ObjectRaw`] that is fed to the vertex
//! shader through an instance-stepped vertex buffer.

use cgmath::{Matrix3, Matrix4, SquareMatrix, Vector2, Vector3, Vector4};

use crate::data_structures::mesh::Vertex;

/// Per-object material parameters as the shader sees them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaterialState {
    pub ambient_color: Vector3<f32>,
    pub ambient_strength: f32,
    pub diffuse_color: Vector3<f32>,
    pub specular_color: Vector3<f32>,
    pub shininess: f32,
}

impl Default for MaterialState {
    fn default() -> Self {
        Self {
            ambient_color: Vector3::new(1.0, 1.0, 1.0),
            ambient_strength: 0.2,
            diffuse_color: Vector3::new(1.0, 1.0, 1.0),
            specular_color: Vector3::new(0.0, 0.0, 0.0),
            shininess: 1.0,
        }
    }
}

/// The object-scoped uniform state that is live at the time of a draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObjectInstance {
    pub model: Matrix4<f32>,
    pub color: Vector4<f32>,
    pub use_texture: bool,
    /// Sampler slot; negative means none.
    pub texture_slot: i32,
    pub uv_scale: Vector2<f32>,
    pub material: MaterialState,
}

impl ObjectInstance {
    pub fn new() -> Self {
        Self {
            model: Matrix4::identity(),
            color: Vector4::new(1.0, 1.0, 1.0, 1.0),
            use_texture: false,
            texture_slot: -1,
            uv_scale: Vector2::new(1.0, 1.0),
            material: MaterialState::default(),
        }
    }

    /// Texture slot to bind for this draw, if texturing is on and the slot is valid.
    pub fn bound_slot(&self) -> Option<usize> {
        (self.use_texture && self.texture_slot >= 0).then_some(self.texture_slot as usize)
    }

    /// Cofactor of the model's linear part. Proportional to the inverse
    /// transpose, and still defined when a scale component is zero.
    pub fn normal_matrix(&self) -> Matrix3<f32> {
        let a = self.model.x.truncate();
        let b = self.model.y.truncate();
        let c = self.model.z.truncate();
        Matrix3::from_cols(b.cross(c), c.cross(a), a.cross(b))
    }

    pub fn to_raw(&self) -> ObjectRaw {
        let textured = if self.bound_slot().is_some() { 1.0 } else { 0.0 };
        let m = &self.material;
        ObjectRaw {
            model: self.model.into(),
            normal: self.normal_matrix().into(),
            color: self.color.into(),
            uv_scale: [self.uv_scale.x, self.uv_scale.y, textured, 0.0],
            ambient: [
                m.ambient_color.x,
                m.ambient_color.y,
                m.ambient_color.z,
                m.ambient_strength,
            ],
            diffuse: m.diffuse_color.into(),
            specular: [
                m.specular_color.x,
                m.specular_color.y,
                m.specular_color.z,
                m.shininess,
            ],
        }
    }
}

impl Default for ObjectInstance {
    fn default() -> Self {
        Self::new()
    }
}

/**
 * The raw instance is the actual data stored on the GPU
 */
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectRaw {
    model: [[f32; 4]; 4],
    normal: [[f32; 3]; 3],
    color: [f32; 4],
    // u scale, v scale, texture flag, unused
    uv_scale: [f32; 4],
    // rgb + ambient strength
    ambient: [f32; 4],
    diffuse: [f32; 3],
    // rgb + shininess. The shader takes its exponent from the light, shininess
    // only travels along for inspection.
    specular: [f32; 4],
}

impl ObjectRaw {
    pub fn is_textured(&self) -> bool {
        self.uv_scale[2] > 0.5
    }

    pub fn color(&self) -> [f32; 4] {
        self.color
    }

    pub fn model(&self) -> [[f32; 4]; 4] {
        self.model
    }

    /// Specular colour in rgb, shininess in w.
    pub fn specular(&self) -> [f32; 4] {
        self.specular
    }
}

/**
 * Locations 0..=2 belong to `ModelVertex`, the instance takes 3..=14.
 * A mat4 takes up four vertex slots and a mat3 three.
 */
impl Vertex for ObjectRaw {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ObjectRaw>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 4,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 5,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 12]>() as wgpu::BufferAddress,
                    shader_location: 6,
                    format: wgpu::VertexFormat::Float32x4,
                },
                // normal matrix
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 16]>() as wgpu::BufferAddress,
                    shader_location: 7,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 19]>() as wgpu::BufferAddress,
                    shader_location: 8,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 22]>() as wgpu::BufferAddress,
                    shader_location: 9,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // colour
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 25]>() as wgpu::BufferAddress,
                    shader_location: 10,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 29]>() as wgpu::BufferAddress,
                    shader_location: 11,
                    format: wgpu::VertexFormat::Float32x4,
                },
                // material
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 33]>() as wgpu::BufferAddress,
                    shader_location: 12,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 37]>() as wgpu::BufferAddress,
                    shader_location: 13,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 40]>() as wgpu::BufferAddress,
                    shader_location: 14,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_layout_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<ObjectRaw>(), 44 * 4);
    }

    #[test]
    fn texture_flag_requires_a_valid_slot() {
        let mut instance = ObjectInstance::new();
        instance.use_texture = true;
        assert_eq!(instance.bound_slot(), None);
        assert!(!instance.to_raw().is_textured());

        instance.texture_slot = 2;
        assert_eq!(instance.bound_slot(), Some(2));
        assert!(instance.to_raw().is_textured());

        instance.use_texture = false;
        assert_eq!(instance.bound_slot(), None);
    }

    #[test]
    fn shininess_rides_in_the_specular_w() {
        let mut instance = ObjectInstance::new();
        instance.material.specular_color = Vector3::new(0.1, 0.2, 0.3);
        instance.material.shininess = 256.0;
        assert_eq!(instance.to_raw().specular(), [0.1, 0.2, 0.3, 256.0]);
    }

    #[test]
    fn normal_matrix_undoes_non_uniform_scale() {
        let mut instance = ObjectInstance::new();
        instance.model = Matrix4::from_nonuniform_scale(2.0, 4.0, 1.0);
        let n = instance.normal_matrix();
        assert!((n.x.x / n.z.z - 0.5).abs() < 1e-6);
        assert!((n.y.y / n.z.z - 0.25).abs() < 1e-6);
    }

    #[test]
    fn flat_scale_keeps_the_plane_normal() {
        let mut instance = ObjectInstance::new();
        instance.model = Matrix4::from_nonuniform_scale(3.5, 0.0, 1.7);
        let normal = instance.normal_matrix() * Vector3::new(0.0, 1.0, 0.0);
        assert!(normal.y > 0.0);
        assert_eq!(normal.x, 0.0);
        assert_eq!(normal.z, 0.0);
    }
}
