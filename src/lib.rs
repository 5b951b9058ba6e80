//! desk-diorama
//!
//! A small 3D desk scene (monitor, keyboard, mouse and speakers on a wooden
//! table) drawn with `wgpu`, explored with a free-look camera.
//!
//! Scene code talks to the GPU through two narrow traits so that it can run
//! without one: [`shader::ShaderManager`] receives named uniforms and
//! [`render::MeshDrawer`] receives draws. [`render::FrameRecorder`]
//! implements both and is replayed by [`render::SceneRenderer`].
//!
//! High-level modules
//! - `camera`: camera, projection, input controller and the per-frame view
//! - `config`: TOML-backed runtime settings
//! - `context`: window surface, device and queue
//! - `data_structures`: meshes, transforms, materials, lights, textures
//! - `desk`: the diorama's content and draw order
//! - `flow`: the winit event loop
//! - `pipelines`: the Phong pipeline and its globals uniform
//! - `render`: frame recording and replay
//! - `resources`: primitive mesh generation, image loading
//! - `scene`: texture/material registries and uniform helpers

pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod desk;
pub mod error;
pub mod flow;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod scene;
pub mod shader;

pub use config::DioramaConfig;
pub use flow::run;
