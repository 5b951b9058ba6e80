//! Surface materials and their lookup table.

use cgmath::Vector3;

/// Lighting response of a surface, addressed by `tag`.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub tag: String,
    pub ambient_color: Vector3<f32>,
    pub ambient_strength: f32,
    pub diffuse_color: Vector3<f32>,
    pub specular_color: Vector3<f32>,
    pub shininess: f32,
}

/// Append-only list of materials searched front to back.
#[derive(Debug, Default)]
pub struct MaterialRegistry {
    materials: Vec<Material>,
}

impl MaterialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, material: Material) {
        self.materials.push(material);
    }

    /// First material whose tag matches exactly.
    pub fn find(&self, tag: &str) -> Option<&Material> {
        self.materials.iter().find(|material| material.tag == tag)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}
