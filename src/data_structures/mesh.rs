//! Vertex layout, primitive kinds and CPU-side geometry.

/// Anything that can be laid out in a vertex buffer.
pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 6]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// The primitive meshes a scene can draw.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    Plane,
    Box,
    Cylinder,
    Prism,
    Sphere,
    HalfSphere,
    Torus,
}

impl Shape {
    pub const ALL: [Shape; 7] = [
        Shape::Plane,
        Shape::Box,
        Shape::Cylinder,
        Shape::Prism,
        Shape::Sphere,
        Shape::HalfSphere,
        Shape::Torus,
    ];

    /// Dense index, used to keep one GPU mesh per kind in a fixed array.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Triangle list ready for upload.
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    pub vertices: Vec<ModelVertex>,
    /// Counter-clockwise triangles.
    pub indices: Vec<u32>,
}

impl GeometryData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Append a vertex and return its index.
    pub fn push_vertex(&mut self, position: [f32; 3], normal: [f32; 3], tex_coords: [f32; 2]) -> u32 {
        self.vertices.push(ModelVertex {
            position,
            normal,
            tex_coords,
        });
        (self.vertices.len() - 1) as u32
    }

    pub fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// Two triangles `a b c` and `c d a`; corners must be given counter-clockwise.
    pub fn push_quad(&mut self, a: u32, b: u32, c: u32, d: u32) {
        self.push_triangle(a, b, c);
        self.push_triangle(c, d, a);
    }
}
