//! Named shader uniforms.
//!
//! Scene code talks to the renderer the way it would talk to a GL program:
//! by setting uniforms by name. [`ShaderManager`] is that seam; the GPU side
//! is [`crate::render::FrameRecorder`], tests use a recorder of their own.

use cgmath::{Matrix4, Vector2, Vector3, Vector4};

pub const MODEL: &str = "model";
pub const VIEW: &str = "view";
pub const PROJECTION: &str = "projection";
pub const VIEW_POSITION: &str = "viewPosition";
pub const OBJECT_COLOR: &str = "objectColor";
pub const OBJECT_TEXTURE: &str = "objectTexture";
pub const USE_TEXTURE: &str = "bUseTexture";
pub const USE_LIGHTING: &str = "bUseLighting";
pub const UV_SCALE: &str = "UVscale";
pub const MATERIAL_AMBIENT_COLOR: &str = "material.ambientColor";
pub const MATERIAL_AMBIENT_STRENGTH: &str = "material.ambientStrength";
pub const MATERIAL_DIFFUSE_COLOR: &str = "material.diffuseColor";
pub const MATERIAL_SPECULAR_COLOR: &str = "material.specularColor";
pub const MATERIAL_SHININESS: &str = "material.shininess";

/// A value that can be assigned to a uniform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Uniform {
    Mat4(Matrix4<f32>),
    Vec4(Vector4<f32>),
    Vec3(Vector3<f32>),
    Vec2(Vector2<f32>),
    Float(f32),
    Int(i32),
    Bool(bool),
    Sampler2D(i32),
}

pub trait ShaderManager {
    fn set_uniform(&mut self, name: &str, value: Uniform);

    fn set_mat4(&mut self, name: &str, value: Matrix4<f32>) {
        self.set_uniform(name, Uniform::Mat4(value));
    }

    fn set_vec4(&mut self, name: &str, value: Vector4<f32>) {
        self.set_uniform(name, Uniform::Vec4(value));
    }

    fn set_vec3(&mut self, name: &str, value: Vector3<f32>) {
        self.set_uniform(name, Uniform::Vec3(value));
    }

    fn set_vec2(&mut self, name: &str, value: Vector2<f32>) {
        self.set_uniform(name, Uniform::Vec2(value));
    }

    fn set_float(&mut self, name: &str, value: f32) {
        self.set_uniform(name, Uniform::Float(value));
    }

    fn set_int(&mut self, name: &str, value: i32) {
        self.set_uniform(name, Uniform::Int(value));
    }

    fn set_bool(&mut self, name: &str, value: bool) {
        self.set_uniform(name, Uniform::Bool(value));
    }

    fn set_sampler2d(&mut self, name: &str, slot: i32) {
        self.set_uniform(name, Uniform::Sampler2D(slot));
    }
}

/// Fields of one `lightSources[i]` entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LightField {
    Position,
    AmbientColor,
    DiffuseColor,
    SpecularColor,
    FocalStrength,
    SpecularIntensity,
}

impl LightField {
    pub const ALL: [LightField; 6] = [
        LightField::Position,
        LightField::AmbientColor,
        LightField::DiffuseColor,
        LightField::SpecularColor,
        LightField::FocalStrength,
        LightField::SpecularIntensity,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LightField::Position => "position",
            LightField::AmbientColor => "ambientColor",
            LightField::DiffuseColor => "diffuseColor",
            LightField::SpecularColor => "specularColor",
            LightField::FocalStrength => "focalStrength",
            LightField::SpecularIntensity => "specularIntensity",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }
}

/// Uniform name of a light field, e.g. `lightSources[1].diffuseColor`.
pub fn light_uniform(index: usize, field: LightField) -> String {
    format!("lightSources[{index}].{}", field.name())
}

/// Inverse of [`light_uniform`].
pub fn parse_light_uniform(name: &str) -> Option<(usize, LightField)> {
    let rest = name.strip_prefix("lightSources[")?;
    let (index, field) = rest.split_once("].")?;
    let index = index.parse().ok()?;
    Some((index, LightField::from_name(field)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn light_names_round_trip() {
        for field in LightField::ALL {
            let name = light_uniform(3, field);
            assert_eq!(parse_light_uniform(&name), Some((3, field)));
        }
        assert_eq!(light_uniform(0, LightField::FocalStrength), "lightSources[0].focalStrength");
    }

    #[test]
    fn malformed_light_names_are_rejected() {
        assert_eq!(parse_light_uniform("lightSources[x].position"), None);
        assert_eq!(parse_light_uniform("lightSources[0].colour"), None);
        assert_eq!(parse_light_uniform("lightSources[0]position"), None);
        assert_eq!(parse_light_uniform("material.shininess"), None);
    }

    #[derive(Default)]
    struct Last(Option<(String, Uniform)>);

    impl ShaderManager for Last {
        fn set_uniform(&mut self, name: &str, value: Uniform) {
            self.0 = Some((name.to_string(), value));
        }
    }

    #[test]
    fn typed_helpers_wrap_their_value() {
        let mut shader = Last::default();
        shader.set_sampler2d(OBJECT_TEXTURE, 2);
        assert_eq!(shader.0, Some((OBJECT_TEXTURE.to_string(), Uniform::Sampler2D(2))));
        shader.set_bool(USE_LIGHTING, true);
        assert_eq!(shader.0, Some((USE_LIGHTING.to_string(), Uniform::Bool(true))));
    }
}
