//! Application event loop.
//!
//! Each frame follows the same steps:
//! 1. Apply input gathered since the last frame and push the view
//!    ([`ViewManager::prepare_scene_view`])
//! 2. Record the desk's draws into a [`FrameRecorder`]
//! 3. Upload globals and per-draw data, replay the draws in one render pass
//! 4. Present and request the next frame

use std::{iter, sync::Arc};

use instant::Instant;
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::PhysicalKey,
    window::{CursorGrabMode, Window},
};

use crate::{
    camera::{ViewManager, scroll_lines},
    config::DioramaConfig,
    context::Context,
    desk,
    render::{FrameRecorder, SceneRenderer},
    resources::{
        load_binaries,
        mesh::MeshLibrary,
        texture::{BoundTexture, GpuTextureLoader, texture_layout},
    },
    scene::SceneManager,
};

const CLEAR_COLOUR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 1.0,
};

/// Everything that exists once the window and GPU are up.
pub struct AppState {
    ctx: Context,
    scene: SceneManager<BoundTexture>,
    meshes: MeshLibrary,
    frame: FrameRecorder,
    renderer: SceneRenderer,
    view: ViewManager,
    /// Relative mouse motion arrives through device events only while the
    /// cursor is grabbed.
    cursor_grabbed: bool,
}

impl AppState {
    async fn new(window: Arc<Window>, config: &DioramaConfig) -> anyhow::Result<Self> {
        let cursor_grabbed = grab_cursor(&window);
        let ctx = Context::new(window).await?;

        let files: Vec<&str> = config
            .assets
            .textures
            .iter()
            .map(|entry| entry.file.as_str())
            .collect();
        let sources = load_binaries(&config.assets.directory, &files).await;

        let layout = texture_layout(&ctx.device);
        let mut scene = SceneManager::new();
        let mut frame = FrameRecorder::new();
        let mut loader = GpuTextureLoader::new(&ctx.device, &ctx.queue, &layout, sources);
        desk::prepare_scene(&mut scene, &mut loader, &config.assets.textures, &mut frame);

        let mut meshes = MeshLibrary::new();
        for shape in desk::MESHES {
            meshes.load(&ctx.device, shape);
        }

        let renderer = SceneRenderer::new(&ctx.device, &ctx.queue, ctx.config.format, &layout)?;
        let view = ViewManager::new(&config.camera, ctx.config.width, ctx.config.height);

        Ok(Self {
            ctx,
            scene,
            meshes,
            frame,
            renderer,
            view,
            cursor_grabbed,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.ctx.resize(width, height);
        if width > 0 && height > 0 {
            self.view.resize(width, height);
        }
    }

    fn render(&mut self, dt: instant::Duration) -> Result<(), wgpu::SurfaceError> {
        self.ctx.window.request_redraw();

        if !self.ctx.is_surface_configured() {
            return Ok(());
        }

        self.frame.begin_frame();
        self.view.prepare_scene_view(&mut self.frame, dt);
        desk::render_scene(&self.scene, &mut self.frame);
        self.renderer
            .prepare(&self.ctx.device, &self.ctx.queue, &self.frame);

        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOUR),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: self.ctx.depth_view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            self.renderer.draw(
                &mut render_pass,
                &self.frame,
                &self.meshes,
                self.scene.textures(),
            );
        }

        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

/// Lock the cursor to the window and hide it. Returns false if the platform
/// refuses both grab modes.
fn grab_cursor(window: &Window) -> bool {
    let grabbed = window
        .set_cursor_grab(CursorGrabMode::Locked)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
    window.set_cursor_visible(false);
    match grabbed {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Cursor grab refused ({e}), steering with absolute positions");
            false
        }
    }
}

pub struct App {
    async_runtime: tokio::runtime::Runtime,
    config: DioramaConfig,
    state: Option<AppState>,
    last_time: Instant,
    error: Option<anyhow::Error>,
}

impl App {
    pub fn new(config: DioramaConfig) -> anyhow::Result<Self> {
        Ok(Self {
            async_runtime: tokio::runtime::Runtime::new()?,
            config,
            state: None,
            last_time: Instant::now(),
            error: None,
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("App initialization failed: {error:#}");
        self.error = Some(error);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        let window_attributes = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(winit::dpi::PhysicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, e.into()),
        };

        let init = AppState::new(window, &self.config);
        match self.async_runtime.block_on(init) {
            Ok(state) => {
                state.ctx.window.request_redraw();
                self.last_time = Instant::now();
                self.state = Some(state);
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            if state.cursor_grabbed {
                state.view.controller.process_mouse(dx, dy);
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                state
                    .view
                    .controller
                    .process_keyboard(code, key_state.is_pressed());
                if state.view.controller.close_requested() {
                    event_loop.exit();
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if !state.cursor_grabbed {
                    state
                        .view
                        .controller
                        .process_cursor_position(position.x, position.y);
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                state.view.controller.process_scroll(scroll_lines(&delta));
            }
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();

                match state.render(dt) {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = state.ctx.window.inner_size();
                        state.resize(size.width, size.height);
                    }
                    Err(e) => {
                        log::error!("Unable to render {e}");
                    }
                }
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &mut self.state {
            state.scene.destroy_textures();
        }
    }
}

/// Open the diorama window and run until it is closed.
pub fn run(config: DioramaConfig) -> anyhow::Result<()> {
    if let Err(e) = env_logger::try_init() {
        println!("Logger already initialised: {e}");
    }

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config)?;
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
