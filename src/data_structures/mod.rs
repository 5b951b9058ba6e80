//! Engine data structures: meshes, materials, textures and per-draw state.
//!
//! - `instance` holds the per-draw object state and its GPU layout
//! - `light` describes the point lights of a scene
//! - `material` contains surface materials and their tag lookup
//! - `mesh` contains the vertex layout, primitive kinds and CPU geometry
//! - `texture` contains GPU texture wrapper and creation utilities
//! - `texture_registry` maps tags to texture slots
//! - `transform` builds model matrices from scale/rotation/translation

pub mod instance;
pub mod light;
pub mod material;
pub mod mesh;
pub mod texture;
pub mod texture_registry;
pub mod transform;
