//! Fly camera, its input controller and the per-frame view/projection push.
//!
//! The camera is a position with a front/up basis. Mouse motion steers the
//! front vector through yaw and pitch, W/A/S/D/Q/E move along the basis and
//! the scroll wheel changes how fast. P and O switch between a perspective
//! view and a fixed orthographic front elevation.

use cgmath::{Angle, Deg, EuclideanSpace, InnerSpace, Matrix4, Point3, Vector3};
use instant::Duration;
use winit::{dpi::PhysicalPosition, event::MouseScrollDelta, keyboard::KeyCode};

use crate::{
    config::CameraConfig,
    shader::{self, ShaderManager},
};

pub const PITCH_LIMIT: f32 = 89.0;
pub const MIN_SPEED: f32 = 0.1;
pub const MAX_SPEED: f32 = 20.0;
const SCROLL_STEP: f32 = 0.1;

/// Pose used while the orthographic view is active.
const ORTHO_POSITION: Vector3<f32> = Vector3::new(0.0, 5.0, 14.0);
const ORTHO_FRONT: Vector3<f32> = Vector3::new(0.0, -0.2, -1.0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    /// Unit length.
    pub front: Vector3<f32>,
    /// Unit length.
    pub up: Vector3<f32>,
    /// Vertical field of view in degrees.
    pub zoom: f32,
    pub movement_speed: f32,
    /// Degrees.
    pub yaw: f32,
    /// Degrees, within ±[`PITCH_LIMIT`].
    pub pitch: f32,
}

impl Camera {
    pub fn new<P: Into<Point3<f32>>, V: Into<Vector3<f32>>>(
        position: P,
        front: V,
        up: V,
        zoom: f32,
        movement_speed: f32,
    ) -> Self {
        let up: Vector3<f32> = up.into();
        let mut camera = Self {
            position: position.into(),
            front: Vector3::unit_z(),
            up: up.normalize(),
            zoom,
            movement_speed,
            yaw: 0.0,
            pitch: 0.0,
        };
        camera.look_towards(front.into());
        camera
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        Self::new(
            config.position,
            config.front,
            config.up,
            config.zoom,
            config.movement_speed,
        )
    }

    /// Point the camera along `direction` and derive yaw/pitch from it so the
    /// next mouse move continues from here.
    pub fn look_towards(&mut self, direction: Vector3<f32>) {
        let front = direction.normalize();
        self.pitch = Deg::asin(front.y).0.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.yaw = Deg::atan2(front.z, front.x).0;
        self.front = front;
    }

    /// Recompute the front vector from yaw and pitch.
    pub fn apply_yaw_pitch(&mut self) {
        let (sin_yaw, cos_yaw) = Deg(self.yaw).sin_cos();
        let (sin_pitch, cos_pitch) = Deg(self.pitch).sin_cos();
        self.front = Vector3::new(cos_yaw * cos_pitch, sin_pitch, sin_yaw * cos_pitch).normalize();
    }

    pub fn right(&self) -> Vector3<f32> {
        self.front.cross(self.up).normalize()
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.position + self.front, self.up)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectionMode {
    #[default]
    Perspective,
    Orthographic,
}

/// Window-dependent projection parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    width: u32,
    height: u32,
    znear: f32,
    zfar: f32,
    ortho_half_height: f32,
}

impl Projection {
    pub fn new(width: u32, height: u32, znear: f32, zfar: f32, ortho_half_height: f32) -> Self {
        Self {
            width,
            height,
            znear,
            zfar,
            ortho_half_height,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    pub fn aspect(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }

    /// GL-convention projection matrix.
    pub fn calc_matrix(&self, mode: ProjectionMode, fovy: Deg<f32>) -> Matrix4<f32> {
        match mode {
            ProjectionMode::Perspective => {
                cgmath::perspective(fovy, self.aspect(), self.znear, self.zfar)
            }
            ProjectionMode::Orthographic => {
                let h = self.ortho_half_height;
                let w = h * self.aspect();
                cgmath::ortho(-w, w, -h, h, self.znear, self.zfar)
            }
        }
    }
}

/// Scroll wheel movement in lines.
pub fn scroll_lines(delta: &MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, lines) => *lines,
        // roughly one line per 20 pixels
        MouseScrollDelta::PixelDelta(PhysicalPosition { y, .. }) => *y as f32 / 20.0,
    }
}

#[derive(Debug)]
pub struct CameraController {
    mode: ProjectionMode,
    sensitivity: f32,
    amount_forward: f32,
    amount_backward: f32,
    amount_left: f32,
    amount_right: f32,
    amount_up: f32,
    amount_down: f32,
    rotate_horizontal: f32,
    rotate_vertical: f32,
    /// Wheel ticks since the last update, applied and clamped one by one.
    scroll: Vec<f32>,
    last_cursor: Option<(f64, f64)>,
    close_requested: bool,
}

impl CameraController {
    pub fn new(sensitivity: f32) -> Self {
        Self {
            mode: ProjectionMode::Perspective,
            sensitivity,
            amount_forward: 0.0,
            amount_backward: 0.0,
            amount_left: 0.0,
            amount_right: 0.0,
            amount_up: 0.0,
            amount_down: 0.0,
            rotate_horizontal: 0.0,
            rotate_vertical: 0.0,
            scroll: Vec::new(),
            last_cursor: None,
            close_requested: false,
        }
    }

    pub fn mode(&self) -> ProjectionMode {
        self.mode
    }

    pub fn close_requested(&self) -> bool {
        self.close_requested
    }

    /// Returns whether the key is one the controller handles.
    pub fn process_keyboard(&mut self, key: KeyCode, pressed: bool) -> bool {
        let amount = if pressed { 1.0 } else { 0.0 };
        match key {
            KeyCode::KeyW => self.amount_forward = amount,
            KeyCode::KeyS => self.amount_backward = amount,
            KeyCode::KeyA => self.amount_left = amount,
            KeyCode::KeyD => self.amount_right = amount,
            KeyCode::KeyQ => self.amount_up = amount,
            KeyCode::KeyE => self.amount_down = amount,
            KeyCode::KeyP => {
                if pressed && self.mode != ProjectionMode::Perspective {
                    log::debug!("Switching to perspective projection");
                    self.mode = ProjectionMode::Perspective;
                    self.last_cursor = None;
                }
            }
            KeyCode::KeyO => {
                if pressed && self.mode != ProjectionMode::Orthographic {
                    log::debug!("Switching to orthographic projection");
                    self.mode = ProjectionMode::Orthographic;
                }
            }
            KeyCode::Escape => {
                if pressed {
                    self.close_requested = true;
                }
            }
            _ => return false,
        }
        true
    }

    /// Relative mouse motion in pixels, y growing downwards.
    pub fn process_mouse(&mut self, dx: f64, dy: f64) {
        if self.mode != ProjectionMode::Perspective {
            return;
        }
        self.rotate_horizontal += dx as f32;
        self.rotate_vertical -= dy as f32;
    }

    /// Absolute cursor position. The first sample only records where the
    /// cursor is.
    pub fn process_cursor_position(&mut self, x: f64, y: f64) {
        if self.mode != ProjectionMode::Perspective {
            return;
        }
        if let Some((last_x, last_y)) = self.last_cursor.replace((x, y)) {
            self.process_mouse(x - last_x, y - last_y);
        }
    }

    pub fn process_scroll(&mut self, lines: f32) {
        self.scroll.push(lines);
    }

    pub fn update(&mut self, camera: &mut Camera, dt: Duration) {
        for lines in self.scroll.drain(..) {
            let wanted = camera.movement_speed + lines * SCROLL_STEP;
            if wanted > MAX_SPEED {
                log::warn!("Movement speed capped at {MAX_SPEED}");
            }
            camera.movement_speed = wanted.clamp(MIN_SPEED, MAX_SPEED);
        }

        if self.mode == ProjectionMode::Orthographic {
            camera.position = Point3::from_vec(ORTHO_POSITION);
            camera.up = Vector3::unit_y();
            camera.look_towards(ORTHO_FRONT);
            self.rotate_horizontal = 0.0;
            self.rotate_vertical = 0.0;
            return;
        }

        let step = camera.movement_speed * dt.as_secs_f32();
        let right = camera.right();
        camera.position += camera.front * (self.amount_forward - self.amount_backward) * step;
        camera.position += right * (self.amount_right - self.amount_left) * step;
        camera.position += camera.up * (self.amount_up - self.amount_down) * step;

        if self.rotate_horizontal != 0.0 || self.rotate_vertical != 0.0 {
            camera.yaw += self.rotate_horizontal * self.sensitivity;
            camera.pitch = (camera.pitch + self.rotate_vertical * self.sensitivity)
                .clamp(-PITCH_LIMIT, PITCH_LIMIT);
            camera.apply_yaw_pitch();
            self.rotate_horizontal = 0.0;
            self.rotate_vertical = 0.0;
        }
    }
}

/// Owns the camera state and pushes the view each frame.
#[derive(Debug)]
pub struct ViewManager {
    pub camera: Camera,
    pub controller: CameraController,
    pub projection: Projection,
}

impl ViewManager {
    pub fn new(config: &CameraConfig, width: u32, height: u32) -> Self {
        Self {
            camera: Camera::from_config(config),
            controller: CameraController::new(config.mouse_sensitivity),
            projection: Projection::new(
                width,
                height,
                config.near,
                config.far,
                config.ortho_half_height,
            ),
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.projection.resize(width, height);
    }

    /// Apply input gathered since the last frame and push `view`,
    /// `projection` and `viewPosition`.
    pub fn prepare_scene_view(&mut self, shader: &mut impl ShaderManager, dt: Duration) {
        self.controller.update(&mut self.camera, dt);

        let view = self.camera.view_matrix();
        let projection = self
            .projection
            .calc_matrix(self.controller.mode(), Deg(self.camera.zoom));

        shader.set_mat4(shader::VIEW, view);
        shader.set_mat4(shader::PROJECTION, projection);
        shader.set_vec3(shader::VIEW_POSITION, self.camera.position.to_vec());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera::from_config(&CameraConfig::default())
    }

    fn assert_close(a: Vector3<f32>, b: Vector3<f32>) {
        assert!((a - b).magnitude() < 1e-4, "{a:?} != {b:?}");
    }

    #[test]
    fn yaw_and_pitch_follow_the_initial_front() {
        let cam = camera();
        assert!((cam.yaw + 90.0).abs() < 1e-4);
        assert!(cam.pitch < 0.0);
        assert!((cam.front.magnitude() - 1.0).abs() < 1e-6);

        let mut turned = cam;
        turned.apply_yaw_pitch();
        assert_close(turned.front, cam.front);
    }

    #[test]
    fn forward_moves_along_front_scaled_by_time() {
        let mut cam = camera();
        let start = cam.position;
        let mut controller = CameraController::new(0.1);
        controller.process_keyboard(KeyCode::KeyW, true);

        controller.update(&mut cam, Duration::from_secs(2));

        assert_close(cam.position - start, cam.front * 2.5 * 2.0);
    }

    #[test]
    fn strafe_and_lift_use_right_and_up() {
        let mut cam = camera();
        let start = cam.position;
        let mut controller = CameraController::new(0.1);
        controller.process_keyboard(KeyCode::KeyD, true);
        controller.process_keyboard(KeyCode::KeyQ, true);

        controller.update(&mut cam, Duration::from_secs(1));

        assert_close(cam.position - start, (cam.right() + cam.up) * 2.5);

        controller.process_keyboard(KeyCode::KeyD, false);
        controller.process_keyboard(KeyCode::KeyQ, false);
        let stopped = cam.position;
        controller.update(&mut cam, Duration::from_secs(1));
        assert_eq!(cam.position, stopped);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut cam = camera();
        let mut controller = CameraController::new(0.1);

        controller.process_mouse(0.0, -5000.0);
        controller.update(&mut cam, Duration::ZERO);
        assert_eq!(cam.pitch, PITCH_LIMIT);
        assert!(cam.front.y > 0.99);

        controller.process_mouse(0.0, 10000.0);
        controller.update(&mut cam, Duration::ZERO);
        assert_eq!(cam.pitch, -PITCH_LIMIT);
        assert!((cam.front.magnitude() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn mouse_right_turns_yaw() {
        let mut cam = camera();
        let yaw = cam.yaw;
        let mut controller = CameraController::new(0.1);

        controller.process_mouse(100.0, 0.0);
        controller.update(&mut cam, Duration::ZERO);

        assert!((cam.yaw - (yaw + 10.0)).abs() < 1e-4);
    }

    #[test]
    fn first_cursor_sample_only_seeds() {
        let mut cam = camera();
        let before = cam;
        let mut controller = CameraController::new(0.1);

        controller.process_cursor_position(500.0, 400.0);
        controller.update(&mut cam, Duration::ZERO);
        assert_eq!(cam, before);

        controller.process_cursor_position(510.0, 400.0);
        controller.update(&mut cam, Duration::ZERO);
        assert!((cam.yaw - (before.yaw + 1.0)).abs() < 1e-4);
    }

    #[test]
    fn scroll_speed_is_clamped_both_ways() {
        let mut cam = camera();
        let mut controller = CameraController::new(0.1);

        controller.process_scroll(-100.0);
        controller.update(&mut cam, Duration::ZERO);
        assert_eq!(cam.movement_speed, MIN_SPEED);

        controller.process_scroll(1000.0);
        controller.update(&mut cam, Duration::ZERO);
        assert_eq!(cam.movement_speed, MAX_SPEED);

        controller.process_scroll(-10.0);
        controller.update(&mut cam, Duration::ZERO);
        assert!((cam.movement_speed - 19.0).abs() < 1e-4);
    }

    #[test]
    fn each_scroll_tick_is_clamped_on_its_own() {
        let mut cam = camera();
        cam.movement_speed = 0.5;
        let mut controller = CameraController::new(0.1);

        controller.process_scroll(-10.0);
        controller.process_scroll(10.0);
        controller.update(&mut cam, Duration::ZERO);

        assert!((cam.movement_speed - 1.1).abs() < 1e-5);
    }

    #[test]
    fn orthographic_mode_pins_the_pose_and_ignores_input() {
        let mut cam = camera();
        let mut controller = CameraController::new(0.1);
        assert!(controller.process_keyboard(KeyCode::KeyO, true));
        controller.process_keyboard(KeyCode::KeyW, true);
        controller.process_mouse(300.0, 300.0);

        controller.update(&mut cam, Duration::from_secs(1));

        assert_eq!(controller.mode(), ProjectionMode::Orthographic);
        assert_eq!(cam.position, Point3::new(0.0, 5.0, 14.0));
        assert_close(cam.front, ORTHO_FRONT.normalize());

        controller.process_keyboard(KeyCode::KeyP, true);
        controller.process_keyboard(KeyCode::KeyW, false);
        controller.update(&mut cam, Duration::from_secs(1));
        assert_eq!(controller.mode(), ProjectionMode::Perspective);
        assert_eq!(cam.position, Point3::new(0.0, 5.0, 14.0));
    }

    #[test]
    fn escape_requests_close_and_unknown_keys_pass_through() {
        let mut controller = CameraController::new(0.1);
        assert!(!controller.process_keyboard(KeyCode::KeyZ, true));
        assert!(!controller.close_requested());
        assert!(controller.process_keyboard(KeyCode::Escape, true));
        assert!(controller.close_requested());
    }

    #[test]
    fn orthographic_projection_is_affine() {
        let projection = Projection::new(1000, 800, 0.1, 100.0, 5.0);
        let ortho = projection.calc_matrix(ProjectionMode::Orthographic, Deg(80.0));
        let perspective = projection.calc_matrix(ProjectionMode::Perspective, Deg(80.0));

        assert_eq!(ortho.w.w, 1.0);
        assert_eq!(ortho.z.w, 0.0);
        assert!((ortho.y.y - 1.0 / 5.0).abs() < 1e-6);
        assert!((ortho.x.x - 1.0 / (5.0 * 1.25)).abs() < 1e-6);
        assert_eq!(perspective.z.w, -1.0);
    }

    #[test]
    fn scroll_lines_reads_both_delta_kinds() {
        assert_eq!(scroll_lines(&MouseScrollDelta::LineDelta(0.0, 2.0)), 2.0);
        assert_eq!(
            scroll_lines(&MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, 40.0))),
            2.0
        );
    }
}
