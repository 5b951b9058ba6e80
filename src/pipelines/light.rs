use wgpu::util::DeviceExt;

use crate::data_structures::light::{LightSource, MAX_LIGHTS};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightRaw {
    position: [f32; 3],
    focal_strength: f32,
    ambient_color: [f32; 3],
    specular_intensity: f32,
    diffuse_color: [f32; 3],
    // Due to uniforms requiring 16 byte (4 float) spacing, we need to use a padding field here
    _padding: u32,
    specular_color: [f32; 3],
    _padding2: u32,
}

impl From<&LightSource> for LightRaw {
    fn from(light: &LightSource) -> Self {
        Self {
            position: light.position.into(),
            focal_strength: light.focal_strength,
            ambient_color: light.ambient_color.into(),
            specular_intensity: light.specular_intensity,
            diffuse_color: light.diffuse_color.into(),
            _padding: 0,
            specular_color: light.specular_color.into(),
            _padding2: 0,
        }
    }
}

/// Everything the scene shader reads once per frame.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalsUniform {
    pub view: [[f32; 4]; 4],
    /// Already converted to wgpu clip space.
    pub projection: [[f32; 4]; 4],
    pub view_position: [f32; 3],
    pub use_lighting: u32,
    pub lights: [LightRaw; MAX_LIGHTS],
}

pub fn mk_buffer(device: &wgpu::Device, globals: GlobalsUniform) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Globals Uniform Buffer"),
        contents: bytemuck::cast_slice(&[globals]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("globals_bind_group_layout"),
    })
}

pub fn mk_bind_group(
    device: &wgpu::Device,
    bind_group_layout: &wgpu::BindGroupLayout,
    globals_buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: bind_group_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: globals_buffer.as_entire_binding(),
        }],
        label: Some("globals_bind_group"),
    })
}
