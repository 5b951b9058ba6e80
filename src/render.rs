//! Frame recording and submission.
//!
//! Scene code sets uniforms and issues draws as if it were driving an
//! immediate-mode GL program. [`FrameRecorder`] keeps that program state on
//! the CPU and snapshots it for every draw; [`SceneRenderer`] replays the
//! recorded draws inside one render pass.
//!
//! # Key types
//!
//! - [`MeshDrawer`] is the draw seam scene code talks to
//! - [`DrawCall`] is one recorded draw with its per-object data
//! - [`FrameRecorder`] implements both [`ShaderManager`] and [`MeshDrawer`]
//! - [`SceneRenderer`] owns the GPU buffers and pipeline used to replay draws

use cgmath::{Matrix4, SquareMatrix, Vector3};

use crate::{
    data_structures::{
        instance::{ObjectInstance, ObjectRaw},
        light::{LightSource, MAX_LIGHTS},
        mesh::Shape,
        texture::Texture,
        texture_registry::TextureRegistry,
    },
    pipelines::{
        basic::mk_scene_pipeline,
        light::{self, GlobalsUniform, LightRaw},
    },
    resources::{
        mesh::MeshLibrary,
        texture::{BoundTexture, bind_texture},
    },
    shader::{self, LightField, ShaderManager, Uniform, parse_light_uniform},
};

/// GL clip space has z in [-1, 1], wgpu uses [0, 1].
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

const OBJECT_UNIFORMS: [&str; 10] = [
    shader::MODEL,
    shader::OBJECT_COLOR,
    shader::OBJECT_TEXTURE,
    shader::USE_TEXTURE,
    shader::UV_SCALE,
    shader::MATERIAL_AMBIENT_COLOR,
    shader::MATERIAL_AMBIENT_STRENGTH,
    shader::MATERIAL_DIFFUSE_COLOR,
    shader::MATERIAL_SPECULAR_COLOR,
    shader::MATERIAL_SHININESS,
];

const GLOBAL_UNIFORMS: [&str; 4] = [
    shader::VIEW,
    shader::PROJECTION,
    shader::VIEW_POSITION,
    shader::USE_LIGHTING,
];

pub trait MeshDrawer {
    fn draw(&mut self, shape: Shape);
}

/// A single recorded draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawCall {
    pub shape: Shape,
    /// Registry slot to sample from, when texturing was on.
    pub texture_slot: Option<usize>,
    pub raw: ObjectRaw,
}

/// CPU copy of the shader program state for one frame.
#[derive(Debug, Clone)]
pub struct FrameRecorder {
    view: Matrix4<f32>,
    /// GL convention, converted on upload.
    projection: Matrix4<f32>,
    view_position: Vector3<f32>,
    use_lighting: bool,
    lights: [LightSource; MAX_LIGHTS],
    object: ObjectInstance,
    draws: Vec<DrawCall>,
}

impl FrameRecorder {
    pub fn new() -> Self {
        Self {
            view: Matrix4::identity(),
            projection: Matrix4::identity(),
            view_position: Vector3::new(0.0, 0.0, 0.0),
            use_lighting: false,
            lights: [LightSource::off(); MAX_LIGHTS],
            object: ObjectInstance::new(),
            draws: Vec::new(),
        }
    }

    /// Forget last frame's draws. Uniform state carries over like it does in GL.
    pub fn begin_frame(&mut self) {
        self.draws.clear();
    }

    pub fn draws(&self) -> &[DrawCall] {
        &self.draws
    }

    pub fn object(&self) -> &ObjectInstance {
        &self.object
    }

    pub fn view(&self) -> Matrix4<f32> {
        self.view
    }

    pub fn projection(&self) -> Matrix4<f32> {
        self.projection
    }

    pub fn view_position(&self) -> Vector3<f32> {
        self.view_position
    }

    pub fn use_lighting(&self) -> bool {
        self.use_lighting
    }

    pub fn lights(&self) -> &[LightSource; MAX_LIGHTS] {
        &self.lights
    }

    pub fn globals(&self) -> GlobalsUniform {
        GlobalsUniform {
            view: self.view.into(),
            projection: (OPENGL_TO_WGPU_MATRIX * self.projection).into(),
            view_position: self.view_position.into(),
            use_lighting: self.use_lighting as u32,
            lights: self.lights.each_ref().map(LightRaw::from),
        }
    }

    fn set_light(&mut self, name: &str, index: usize, field: LightField, value: Uniform) {
        let Some(light) = self.lights.get_mut(index) else {
            log::warn!("{name} addresses light {index}, only {MAX_LIGHTS} are available");
            return;
        };
        match (field, value) {
            (LightField::Position, Uniform::Vec3(v)) => light.position = v,
            (LightField::AmbientColor, Uniform::Vec3(v)) => light.ambient_color = v,
            (LightField::DiffuseColor, Uniform::Vec3(v)) => light.diffuse_color = v,
            (LightField::SpecularColor, Uniform::Vec3(v)) => light.specular_color = v,
            (LightField::FocalStrength, Uniform::Float(f)) => light.focal_strength = f,
            (LightField::SpecularIntensity, Uniform::Float(f)) => light.specular_intensity = f,
            (_, value) => log::warn!("uniform {name} does not accept {value:?}"),
        }
    }
}

impl Default for FrameRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl ShaderManager for FrameRecorder {
    fn set_uniform(&mut self, name: &str, value: Uniform) {
        match (name, value) {
            (shader::MODEL, Uniform::Mat4(m)) => self.object.model = m,
            (shader::VIEW, Uniform::Mat4(m)) => self.view = m,
            (shader::PROJECTION, Uniform::Mat4(m)) => self.projection = m,
            (shader::VIEW_POSITION, Uniform::Vec3(v)) => self.view_position = v,
            (shader::OBJECT_COLOR, Uniform::Vec4(v)) => self.object.color = v,
            (shader::OBJECT_TEXTURE, Uniform::Sampler2D(slot) | Uniform::Int(slot)) => {
                self.object.texture_slot = slot
            }
            (shader::USE_TEXTURE, Uniform::Bool(on)) => self.object.use_texture = on,
            (shader::USE_TEXTURE, Uniform::Int(on)) => self.object.use_texture = on != 0,
            (shader::USE_LIGHTING, Uniform::Bool(on)) => self.use_lighting = on,
            (shader::USE_LIGHTING, Uniform::Int(on)) => self.use_lighting = on != 0,
            (shader::UV_SCALE, Uniform::Vec2(v)) => self.object.uv_scale = v,
            (shader::MATERIAL_AMBIENT_COLOR, Uniform::Vec3(v)) => self.object.material.ambient_color = v,
            (shader::MATERIAL_AMBIENT_STRENGTH, Uniform::Float(f)) => {
                self.object.material.ambient_strength = f
            }
            (shader::MATERIAL_DIFFUSE_COLOR, Uniform::Vec3(v)) => self.object.material.diffuse_color = v,
            (shader::MATERIAL_SPECULAR_COLOR, Uniform::Vec3(v)) => {
                self.object.material.specular_color = v
            }
            (shader::MATERIAL_SHININESS, Uniform::Float(f)) => self.object.material.shininess = f,
            _ if OBJECT_UNIFORMS.contains(&name) || GLOBAL_UNIFORMS.contains(&name) => {
                log::warn!("uniform {name} does not accept {value:?}")
            }
            _ => match parse_light_uniform(name) {
                Some((index, field)) => self.set_light(name, index, field, value),
                None => log::warn!("unknown uniform {name}, ignoring {value:?}"),
            },
        }
    }
}

impl MeshDrawer for FrameRecorder {
    fn draw(&mut self, shape: Shape) {
        self.draws.push(DrawCall {
            shape,
            texture_slot: self.object.bound_slot(),
            raw: self.object.to_raw(),
        });
    }
}

/// GPU side of the scene: pipeline, uniform and instance buffers.
pub struct SceneRenderer {
    pipeline: wgpu::RenderPipeline,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,
    /// Bound for untextured draws so the layout never changes.
    blank: BoundTexture,
}

impl SceneRenderer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        color_format: wgpu::TextureFormat,
        texture_layout: &wgpu::BindGroupLayout,
    ) -> anyhow::Result<Self> {
        let globals_layout = light::mk_bind_group_layout(device);
        let globals_buffer = light::mk_buffer(device, FrameRecorder::new().globals());
        let globals_bind_group = light::mk_bind_group(device, &globals_layout, &globals_buffer);
        let pipeline = mk_scene_pipeline(device, color_format, &globals_layout, texture_layout);
        let blank = bind_texture(
            device,
            texture_layout,
            Texture::create_solid([255, 255, 255, 255], device, queue, "blank"),
            "blank",
        )?;
        let instance_capacity = 64;
        Ok(Self {
            pipeline,
            globals_buffer,
            globals_bind_group,
            instance_buffer: mk_instance_buffer(device, instance_capacity),
            instance_capacity,
            blank,
        })
    }

    /// Upload the frame's globals and per-draw data.
    pub fn prepare(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, frame: &FrameRecorder) {
        queue.write_buffer(&self.globals_buffer, 0, bytemuck::cast_slice(&[frame.globals()]));

        let raws: Vec<ObjectRaw> = frame.draws().iter().map(|d| d.raw).collect();
        if raws.len() > self.instance_capacity {
            self.instance_capacity = raws.len().next_power_of_two();
            log::debug!("Growing instance buffer to {} objects", self.instance_capacity);
            self.instance_buffer = mk_instance_buffer(device, self.instance_capacity);
        }
        if !raws.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&raws));
        }
    }

    /// Replay the recorded draws in order.
    pub fn draw(
        &self,
        render_pass: &mut wgpu::RenderPass<'_>,
        frame: &FrameRecorder,
        meshes: &MeshLibrary,
        textures: &TextureRegistry<BoundTexture>,
    ) {
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.globals_bind_group, &[]);
        render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));

        for (i, call) in frame.draws().iter().enumerate() {
            let Some(mesh) = meshes.get(call.shape) else {
                log::warn!("{:?} mesh was never loaded, skipping draw", call.shape);
                continue;
            };
            let texture = call
                .texture_slot
                .and_then(|slot| textures.get(slot))
                .unwrap_or(&self.blank);
            let instance = i as u32;
            render_pass.set_bind_group(1, &texture.bind_group, &[]);
            render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..mesh.num_elements, 0, instance..instance + 1);
        }
    }
}

fn mk_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Object Instance Buffer"),
        size: (capacity * std::mem::size_of::<ObjectRaw>()) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

#[cfg(test)]
mod tests {
    use cgmath::{Vector2, Vector4};

    use super::*;

    #[test]
    fn draws_snapshot_the_current_object_state() {
        let mut frame = FrameRecorder::new();
        frame.set_vec4(shader::OBJECT_COLOR, Vector4::new(1.0, 0.0, 0.0, 1.0));
        frame.draw(Shape::Box);
        frame.set_vec4(shader::OBJECT_COLOR, Vector4::new(0.0, 1.0, 0.0, 1.0));
        frame.draw(Shape::Sphere);

        let draws = frame.draws();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[0].shape, Shape::Box);
        assert_eq!(draws[0].raw.color(), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(draws[1].raw.color(), [0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn texture_slot_is_only_recorded_while_texturing() {
        let mut frame = FrameRecorder::new();
        frame.set_sampler2d(shader::OBJECT_TEXTURE, 1);
        frame.draw(Shape::Plane);
        frame.set_int(shader::USE_TEXTURE, 1);
        frame.draw(Shape::Plane);
        frame.set_bool(shader::USE_TEXTURE, false);
        frame.draw(Shape::Plane);

        let slots: Vec<_> = frame.draws().iter().map(|d| d.texture_slot).collect();
        assert_eq!(slots, vec![None, Some(1), None]);
    }

    #[test]
    fn begin_frame_keeps_uniform_state() {
        let mut frame = FrameRecorder::new();
        frame.set_vec2(shader::UV_SCALE, Vector2::new(2.0, 3.0));
        frame.set_bool(shader::USE_LIGHTING, true);
        frame.draw(Shape::Torus);

        frame.begin_frame();

        assert!(frame.draws().is_empty());
        assert_eq!(frame.object().uv_scale, Vector2::new(2.0, 3.0));
        assert!(frame.use_lighting());
    }

    #[test]
    fn light_uniforms_fill_their_slot() {
        let mut frame = FrameRecorder::new();
        frame.set_vec3("lightSources[1].position", Vector3::new(0.0, 4.0, 8.0));
        frame.set_float("lightSources[1].focalStrength", 32.0);
        frame.set_float("lightSources[7].focalStrength", 99.0);

        assert_eq!(frame.lights()[1].position, Vector3::new(0.0, 4.0, 8.0));
        assert_eq!(frame.lights()[1].focal_strength, 32.0);
        assert_eq!(frame.lights()[0], LightSource::off());
    }

    #[test]
    fn mismatched_and_unknown_uniforms_change_nothing() {
        let mut frame = FrameRecorder::new();
        let before = *frame.object();
        frame.set_float(shader::MODEL, 2.0);
        frame.set_vec3(shader::OBJECT_COLOR, Vector3::new(1.0, 0.0, 0.0));
        frame.set_float("lightSources[0].position", 1.0);
        frame.set_float("fogDensity", 0.5);

        assert_eq!(*frame.object(), before);
        assert_eq!(frame.lights()[0], LightSource::off());
    }

    #[test]
    fn projection_depth_is_remapped_on_upload() {
        let mut frame = FrameRecorder::new();
        let gl = cgmath::perspective(cgmath::Deg(80.0), 1.25, 0.1, 100.0);
        frame.set_mat4(shader::PROJECTION, gl);

        assert_eq!(frame.projection(), gl);
        let uploaded = Matrix4::from(frame.globals().projection);
        let near = uploaded * cgmath::Vector4::new(0.0, 0.0, -0.1, 1.0);
        assert!((near.z / near.w).abs() < 1e-5);
    }
}
