use cgmath::Vector3;

/// Light slots available to the scene shader.
pub const MAX_LIGHTS: usize = 4;

/// A point light as the Phong shader consumes it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightSource {
    pub position: Vector3<f32>,
    pub ambient_color: Vector3<f32>,
    pub diffuse_color: Vector3<f32>,
    pub specular_color: Vector3<f32>,
    /// Specular exponent.
    pub focal_strength: f32,
    pub specular_intensity: f32,
}

impl LightSource {
    /// A light that contributes nothing. Unused slots hold this.
    pub fn off() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            ambient_color: Vector3::new(0.0, 0.0, 0.0),
            diffuse_color: Vector3::new(0.0, 0.0, 0.0),
            specular_color: Vector3::new(0.0, 0.0, 0.0),
            focal_strength: 1.0,
            specular_intensity: 0.0,
        }
    }
}

impl Default for LightSource {
    fn default() -> Self {
        Self::off()
    }
}
