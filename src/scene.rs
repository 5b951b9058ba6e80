//! Scene composition: textures, materials, transforms and lights.
//!
//! [`SceneManager`] owns the texture and material registries and turns
//! per-object settings into uniform writes on a [`ShaderManager`].

use cgmath::{Vector2, Vector4};

use crate::{
    data_structures::{
        light::LightSource,
        material::{Material, MaterialRegistry},
        texture_registry::TextureRegistry,
        transform::Transform,
    },
    shader::{self, LightField, ShaderManager, light_uniform},
};

/// Turns an image file into whatever handle the renderer binds.
pub trait TextureLoader {
    type Handle;

    fn load(&mut self, file_name: &str) -> anyhow::Result<Self::Handle>;
}

pub struct SceneManager<T> {
    textures: TextureRegistry<T>,
    materials: MaterialRegistry,
}

impl<T> SceneManager<T> {
    pub fn new() -> Self {
        Self {
            textures: TextureRegistry::new(),
            materials: MaterialRegistry::new(),
        }
    }

    /// Load `file_name` and register it under `tag`.
    ///
    /// Failures are logged and leave the registry untouched; callers are free
    /// to carry on without the texture.
    pub fn create_texture<L>(&mut self, loader: &mut L, file_name: &str, tag: &str) -> bool
    where
        L: TextureLoader<Handle = T>,
    {
        let handle = match loader.load(file_name) {
            Ok(handle) => handle,
            Err(e) => {
                log::error!("Could not load image: {file_name}: {e:#}");
                return false;
            }
        };
        match self.textures.register(tag, handle) {
            Ok(slot) => {
                log::debug!("Texture {tag} bound to slot {slot}");
                true
            }
            Err(e) => {
                log::error!("Could not register {file_name}: {e}");
                false
            }
        }
    }

    pub fn find_texture(&self, tag: &str) -> Option<&T> {
        self.textures.find(tag)
    }

    pub fn find_texture_slot(&self, tag: &str) -> Option<usize> {
        self.textures.find_slot(tag)
    }

    pub fn textures(&self) -> &TextureRegistry<T> {
        &self.textures
    }

    /// Release every loaded texture.
    pub fn destroy_textures(&mut self) {
        log::debug!("Releasing {} textures", self.textures.len());
        self.textures.clear();
    }

    pub fn define_material(&mut self, material: Material) {
        self.materials.define(material);
    }

    pub fn find_material(&self, tag: &str) -> Option<&Material> {
        self.materials.find(tag)
    }

    pub fn set_transformations(&self, shader: &mut impl ShaderManager, transform: &Transform) {
        shader.set_mat4(shader::MODEL, transform.to_matrix());
    }

    pub fn set_shader_color(&self, shader: &mut impl ShaderManager, color: Vector4<f32>) {
        shader.set_int(shader::USE_TEXTURE, 0);
        shader.set_vec4(shader::OBJECT_COLOR, color);
    }

    /// Sample the texture registered as `tag` for the following draws.
    ///
    /// An unknown tag turns texturing off instead of binding a bogus slot.
    pub fn set_shader_texture(&self, shader: &mut impl ShaderManager, tag: &str) {
        match self.find_texture_slot(tag) {
            Some(slot) => {
                shader.set_int(shader::USE_TEXTURE, 1);
                shader.set_sampler2d(shader::OBJECT_TEXTURE, slot as i32);
            }
            None => {
                log::debug!("No texture tagged {tag}");
                shader.set_int(shader::USE_TEXTURE, 0);
            }
        }
    }

    pub fn set_texture_uv_scale(&self, shader: &mut impl ShaderManager, u: f32, v: f32) {
        shader.set_vec2(shader::UV_SCALE, Vector2::new(u, v));
    }

    /// Push the material tagged `tag`. An unknown tag pushes nothing, so the
    /// previous material stays in effect.
    pub fn set_shader_material(&self, shader: &mut impl ShaderManager, tag: &str) {
        let Some(material) = self.find_material(tag) else {
            log::debug!("No material tagged {tag}");
            return;
        };
        shader.set_vec3(shader::MATERIAL_AMBIENT_COLOR, material.ambient_color);
        shader.set_float(shader::MATERIAL_AMBIENT_STRENGTH, material.ambient_strength);
        shader.set_vec3(shader::MATERIAL_DIFFUSE_COLOR, material.diffuse_color);
        shader.set_vec3(shader::MATERIAL_SPECULAR_COLOR, material.specular_color);
        shader.set_float(shader::MATERIAL_SHININESS, material.shininess);
    }

    /// Push `lights` into consecutive light slots and switch lighting on.
    pub fn setup_lights(&self, shader: &mut impl ShaderManager, lights: &[LightSource]) {
        for (i, light) in lights.iter().enumerate() {
            shader.set_vec3(&light_uniform(i, LightField::Position), light.position);
            shader.set_vec3(&light_uniform(i, LightField::AmbientColor), light.ambient_color);
            shader.set_vec3(&light_uniform(i, LightField::DiffuseColor), light.diffuse_color);
            shader.set_vec3(&light_uniform(i, LightField::SpecularColor), light.specular_color);
            shader.set_float(&light_uniform(i, LightField::FocalStrength), light.focal_strength);
            shader.set_float(
                &light_uniform(i, LightField::SpecularIntensity),
                light.specular_intensity,
            );
        }
        shader.set_bool(shader::USE_LIGHTING, true);
    }
}

impl<T> Default for SceneManager<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Vector3;

    use super::*;
    use crate::shader::Uniform;

    #[derive(Default)]
    struct Uniforms(Vec<(String, Uniform)>);

    impl ShaderManager for Uniforms {
        fn set_uniform(&mut self, name: &str, value: Uniform) {
            self.0.push((name.to_string(), value));
        }
    }

    /// Hands out the file name as the handle; files starting with `bad` fail.
    struct NameLoader;

    impl TextureLoader for NameLoader {
        type Handle = String;

        fn load(&mut self, file_name: &str) -> anyhow::Result<String> {
            if file_name.starts_with("bad") {
                anyhow::bail!("cannot decode {file_name}");
            }
            Ok(file_name.to_string())
        }
    }

    fn grey() -> Material {
        Material {
            tag: "grey".into(),
            ambient_color: Vector3::new(0.3, 0.3, 0.3),
            ambient_strength: 0.3,
            diffuse_color: Vector3::new(0.3, 0.3, 0.3),
            specular_color: Vector3::new(0.3, 0.3, 0.3),
            shininess: 32.0,
        }
    }

    #[test]
    fn failed_loads_leave_the_registry_untouched() {
        let mut scene = SceneManager::new();
        assert!(scene.create_texture(&mut NameLoader, "wood.png", "wood"));
        assert!(!scene.create_texture(&mut NameLoader, "bad.png", "bad"));
        assert!(scene.create_texture(&mut NameLoader, "cloth.png", "cloth"));

        assert_eq!(scene.find_texture_slot("wood"), Some(0));
        assert_eq!(scene.find_texture_slot("cloth"), Some(1));
        assert_eq!(scene.find_texture_slot("bad"), None);
        assert_eq!(scene.find_texture("cloth").map(String::as_str), Some("cloth.png"));
    }

    #[test]
    fn seventeenth_texture_is_refused() {
        let mut scene = SceneManager::new();
        for i in 0..16 {
            assert!(scene.create_texture(&mut NameLoader, &format!("{i}.png"), &format!("t{i}")));
        }
        assert!(!scene.create_texture(&mut NameLoader, "extra.png", "extra"));
        assert_eq!(scene.textures().len(), 16);
    }

    #[test]
    fn destroy_releases_everything() {
        let mut scene = SceneManager::new();
        scene.create_texture(&mut NameLoader, "wood.png", "wood");
        scene.destroy_textures();
        assert!(scene.textures().is_empty());
        assert_eq!(scene.find_texture("wood"), None);
    }

    #[test]
    fn shader_texture_binds_the_slot() {
        let mut scene = SceneManager::new();
        scene.create_texture(&mut NameLoader, "wood.png", "wood");
        scene.create_texture(&mut NameLoader, "cloth.png", "cloth");
        let mut shader = Uniforms::default();

        scene.set_shader_texture(&mut shader, "cloth");

        assert_eq!(
            shader.0,
            vec![
                (shader::USE_TEXTURE.to_string(), Uniform::Int(1)),
                (shader::OBJECT_TEXTURE.to_string(), Uniform::Sampler2D(1)),
            ]
        );
    }

    #[test]
    fn unknown_texture_turns_texturing_off() {
        let scene = SceneManager::<String>::new();
        let mut shader = Uniforms::default();

        scene.set_shader_texture(&mut shader, "missing");

        assert_eq!(shader.0, vec![(shader::USE_TEXTURE.to_string(), Uniform::Int(0))]);
    }

    #[test]
    fn shader_color_disables_texturing_first() {
        let scene = SceneManager::<String>::new();
        let mut shader = Uniforms::default();
        let red = Vector4::new(1.0, 0.0, 0.0, 1.0);

        scene.set_shader_color(&mut shader, red);

        assert_eq!(
            shader.0,
            vec![
                (shader::USE_TEXTURE.to_string(), Uniform::Int(0)),
                (shader::OBJECT_COLOR.to_string(), Uniform::Vec4(red)),
            ]
        );
    }

    #[test]
    fn uv_scale_is_pushed_as_vec2() {
        let scene = SceneManager::<String>::new();
        let mut shader = Uniforms::default();

        scene.set_texture_uv_scale(&mut shader, 4.0, 2.0);

        assert_eq!(
            shader.0,
            vec![(shader::UV_SCALE.to_string(), Uniform::Vec2(Vector2::new(4.0, 2.0)))]
        );
    }

    #[test]
    fn material_pushes_all_five_fields() {
        let mut scene = SceneManager::<String>::new();
        scene.define_material(grey());
        let mut shader = Uniforms::default();

        scene.set_shader_material(&mut shader, "grey");

        let names: Vec<_> = shader.0.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(
            names,
            vec![
                shader::MATERIAL_AMBIENT_COLOR,
                shader::MATERIAL_AMBIENT_STRENGTH,
                shader::MATERIAL_DIFFUSE_COLOR,
                shader::MATERIAL_SPECULAR_COLOR,
                shader::MATERIAL_SHININESS,
            ]
        );
        assert_eq!(shader.0[4].1, Uniform::Float(32.0));
    }

    #[test]
    fn unknown_material_pushes_nothing() {
        let mut scene = SceneManager::<String>::new();
        scene.define_material(grey());
        let mut shader = Uniforms::default();

        scene.set_shader_material(&mut shader, "Grey");

        assert!(shader.0.is_empty());
    }

    #[test]
    fn lights_fill_consecutive_slots_then_enable_lighting() {
        let scene = SceneManager::<String>::new();
        let mut shader = Uniforms::default();
        let lights = [LightSource::off(), LightSource::off()];

        scene.setup_lights(&mut shader, &lights);

        assert_eq!(shader.0.len(), 2 * 6 + 1);
        assert_eq!(shader.0[0].0, "lightSources[0].position");
        assert_eq!(shader.0[6].0, "lightSources[1].position");
        assert_eq!(
            shader.0.last(),
            Some(&(shader::USE_LIGHTING.to_string(), Uniform::Bool(true)))
        );
    }

    #[test]
    fn transformations_push_the_model_matrix() {
        let scene = SceneManager::<String>::new();
        let mut shader = Uniforms::default();
        let transform = Transform::scaled_at(Vector3::new(2.0, 1.0, 1.0), Vector3::new(0.0, 1.0, 3.0));

        scene.set_transformations(&mut shader, &transform);

        assert_eq!(shader.0, vec![(shader::MODEL.to_string(), Uniform::Mat4(transform.to_matrix()))]);
    }
}
