//! The desk diorama: a monitor on a stand, keyboard, mouse and two speakers
//! on a wooden table.

use cgmath::Vector3;

use crate::{
    config::TextureEntry,
    data_structures::{light::LightSource, material::Material, mesh::Shape, transform::Transform},
    render::MeshDrawer,
    scene::{SceneManager, TextureLoader},
    shader::{self, ShaderManager},
};

/// (file, tag) of every texture the desk uses.
pub const TEXTURES: [(&str, &str); 3] = [
    ("desktop.jpg", "desktop"),
    ("tab.png", "tab"),
    ("table.png", "table"),
];

/// Meshes to upload before the first frame.
pub const MESHES: [Shape; 7] = [
    Shape::Plane,
    Shape::Box,
    Shape::Cylinder,
    Shape::Prism,
    Shape::Sphere,
    Shape::Torus,
    Shape::HalfSphere,
];

/// Space between neighbouring keys.
pub const KEY_GAP: f32 = 0.1;

fn rgb(r: f32, g: f32, b: f32) -> Vector3<f32> {
    Vector3::new(r, g, b)
}

pub fn materials() -> Vec<Material> {
    vec![
        // wood, barely reflective
        Material {
            tag: "table".into(),
            ambient_color: rgb(0.1, 0.1, 0.1),
            ambient_strength: 0.5,
            diffuse_color: rgb(0.2, 0.2, 0.3),
            specular_color: rgb(0.8, 0.8, 1.0),
            shininess: 1.0,
        },
        Material {
            tag: "blackPlastic".into(),
            ambient_color: rgb(0.1, 0.1, 0.1),
            ambient_strength: 0.1,
            diffuse_color: rgb(0.2, 0.2, 0.2),
            specular_color: rgb(0.1, 0.1, 0.1),
            shininess: 32.0,
        },
        Material {
            tag: "greyPlastic".into(),
            ambient_color: rgb(0.3, 0.3, 0.3),
            ambient_strength: 0.3,
            diffuse_color: rgb(0.3, 0.3, 0.3),
            specular_color: rgb(0.3, 0.3, 0.3),
            shininess: 32.0,
        },
        Material {
            tag: "screen".into(),
            ambient_color: rgb(0.2, 0.2, 0.2),
            ambient_strength: 0.8,
            diffuse_color: rgb(0.4, 0.4, 0.5),
            specular_color: rgb(1.0, 1.0, 1.0),
            shininess: 256.0,
        },
    ]
}

/// A dim white key light and a purple fill closer to the desk.
pub fn lights() -> [LightSource; 2] {
    [
        LightSource {
            position: rgb(0.0, 8.0, 10.0),
            ambient_color: rgb(0.01, 0.01, 0.01),
            diffuse_color: rgb(0.4, 0.4, 0.4),
            specular_color: rgb(0.0, 0.0, 0.0),
            focal_strength: 32.0,
            specular_intensity: 0.05,
        },
        LightSource {
            position: rgb(0.0, 4.0, 8.0),
            ambient_color: rgb(0.1, 0.0, 0.15),
            diffuse_color: rgb(0.2, 0.0, 0.25),
            specular_color: rgb(0.0, 0.0, 0.0),
            focal_strength: 32.0,
            specular_intensity: 0.05,
        },
    ]
}

/// Load every texture in `entries`; returns how many made it into the registry.
pub fn load_scene_textures<L: TextureLoader>(
    scene: &mut SceneManager<L::Handle>,
    loader: &mut L,
    entries: &[TextureEntry],
) -> usize {
    entries
        .iter()
        .filter(|entry| scene.create_texture(loader, &entry.file, &entry.tag))
        .count()
}

pub fn define_object_materials<T>(scene: &mut SceneManager<T>) {
    for material in materials() {
        scene.define_material(material);
    }
}

/// Textures, materials and lights. Meshes are uploaded by the caller.
pub fn prepare_scene<L: TextureLoader>(
    scene: &mut SceneManager<L::Handle>,
    loader: &mut L,
    entries: &[TextureEntry],
    shader: &mut impl ShaderManager,
) {
    let loaded = load_scene_textures(scene, loader, entries);
    log::info!("Loaded {loaded} of {} scene textures", entries.len());
    define_object_materials(scene);
    scene.setup_lights(shader, &lights());
}

/// Number of (columns, rows) of keys that fit on a keyboard of `keyboard`
/// scale. Partial keys are dropped.
pub fn key_grid(keyboard: Vector3<f32>, key: Vector3<f32>) -> (usize, usize) {
    let columns = (keyboard.x / (key.x + KEY_GAP)) as usize;
    let rows = (keyboard.z / (key.z + KEY_GAP)) as usize;
    (columns, rows)
}

/// Centre of key (`column`, `row`) on a keyboard centred at `keyboard_position`.
pub fn key_position(
    keyboard_position: Vector3<f32>,
    keyboard: Vector3<f32>,
    key: Vector3<f32>,
    column: usize,
    row: usize,
) -> Vector3<f32> {
    Vector3::new(
        keyboard_position.x - (keyboard.x / 2.0 - 0.15) + (key.x + KEY_GAP) * column as f32,
        keyboard_position.y + 0.1,
        keyboard_position.z - (keyboard.z / 2.0 - 0.15) + (key.z + KEY_GAP) * row as f32,
    )
}

fn place<T, G: ShaderManager + MeshDrawer>(
    scene: &SceneManager<T>,
    gfx: &mut G,
    shape: Shape,
    transform: Transform,
) {
    scene.set_transformations(gfx, &transform);
    gfx.draw(shape);
}

/// Issue the draws for one frame, always in the same order.
pub fn render_scene<T, G: ShaderManager + MeshDrawer>(scene: &SceneManager<T>, gfx: &mut G) {
    let none = Vector3::new(0.0, 0.0, 0.0);

    // table top
    scene.set_shader_texture(gfx, "table");
    scene.set_shader_material(gfx, "table");
    place(scene, gfx, Shape::Plane, Transform::scaled_at(rgb(20.0, 1.0, 10.0), none));
    gfx.set_int(shader::USE_TEXTURE, 0);

    // monitor stand
    let base_scale = rgb(1.0, 0.5, 1.0);
    let base = rgb(0.0, 1.0, 3.0);
    scene.set_shader_material(gfx, "greyPlastic");
    place(scene, gfx, Shape::Cylinder, Transform::scaled_at(base_scale, base));

    let legs = [
        (rgb(0.2, 0.2, 2.6), rgb(30.0, -60.0, 0.0), base + rgb(-1.8, -0.3, 1.0)),
        (rgb(0.2, 0.2, 2.6), rgb(30.0, 60.0, 0.0), base + rgb(1.8, -0.3, 1.0)),
        (rgb(0.2, 0.2, 1.8), rgb(-45.0, 0.0, 0.0), base + rgb(0.0, -0.3, -1.5)),
    ];
    for (scale, rotation, position) in legs {
        scene.set_shader_material(gfx, "greyPlastic");
        place(scene, gfx, Shape::Box, Transform::new(scale, rotation, position));
    }

    let post_scale = rgb(base_scale.x - 0.2, 4.0, 1.0);
    let post = base + rgb(0.0, post_scale.y / 2.0, 0.0);
    scene.set_shader_material(gfx, "greyPlastic");
    place(scene, gfx, Shape::Box, Transform::scaled_at(post_scale, post));

    // monitor
    let monitor = post + rgb(0.0, post_scale.y / 2.0, 0.1);
    scene.set_shader_material(gfx, "blackPlastic");
    place(scene, gfx, Shape::Box, Transform::scaled_at(rgb(8.0, 4.0, 1.0), monitor));

    // screen, facing the viewer
    let screen_scale = rgb(3.5, 0.0, 1.7);
    let screen_rotation = rgb(90.0, 0.0, 0.0);
    let screen = monitor + rgb(0.0, 0.0, 0.567);
    gfx.set_int(shader::USE_TEXTURE, 1);
    scene.set_shader_texture(gfx, "desktop");
    scene.set_shader_material(gfx, "screen");
    place(scene, gfx, Shape::Plane, Transform::new(screen_scale, screen_rotation, screen));

    // a window on the desktop, just in front of it
    let tab = screen + rgb(-1.7, -1.0, 0.01);
    scene.set_shader_texture(gfx, "tab");
    scene.set_shader_material(gfx, "screen");
    place(scene, gfx, Shape::Plane, Transform::new(screen_scale / 3.0, screen_rotation, tab));

    // keyboard
    let keyboard_scale = rgb(6.0, 0.2, 1.5);
    let keyboard = rgb(0.0, 0.0, 7.0);
    gfx.set_int(shader::USE_TEXTURE, 0);
    scene.set_shader_material(gfx, "blackPlastic");
    place(scene, gfx, Shape::Box, Transform::scaled_at(keyboard_scale, keyboard));

    let key_scale = rgb(0.2, 0.2, 0.2);
    let (columns, rows) = key_grid(keyboard_scale, key_scale);
    for row in 0..rows {
        for column in 0..columns {
            let position = key_position(keyboard, keyboard_scale, key_scale, column, row);
            scene.set_transformations(gfx, &Transform::scaled_at(key_scale, position));
            scene.set_shader_material(gfx, "blackPlastic");
            gfx.draw(Shape::Box);
        }
    }

    // mouse
    scene.set_shader_material(gfx, "blackPlastic");
    place(scene, gfx, Shape::HalfSphere, Transform::scaled_at(rgb(0.4, 0.2, 0.7), rgb(4.0, 0.0, 9.0)));

    // speakers: a rim around the cone, then the cabinet behind it
    for speaker in [rgb(-4.0, 0.1, 6.0), rgb(4.0, 0.1, 6.0)] {
        scene.set_shader_material(gfx, "blackPlastic");
        place(
            scene,
            gfx,
            Shape::Torus,
            Transform::new(rgb(0.64, 1.2, 0.5), rgb(90.0, 0.0, 0.0), speaker),
        );
        scene.set_shader_material(gfx, "blackPlastic");
        place(
            scene,
            gfx,
            Shape::Cylinder,
            Transform::scaled_at(rgb(0.7, 3.0, 0.9), speaker + rgb(0.0, 0.07, 0.3)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyboard_fits_twenty_by_five_keys() {
        assert_eq!(key_grid(rgb(6.0, 0.2, 1.5), rgb(0.2, 0.2, 0.2)), (20, 5));
    }

    #[test]
    fn partial_keys_are_dropped() {
        assert_eq!(key_grid(rgb(1.0, 0.2, 0.5), rgb(0.4, 0.2, 0.4)), (2, 1));
        assert_eq!(key_grid(rgb(0.3, 0.2, 0.3), rgb(0.4, 0.2, 0.4)), (0, 0));
    }

    #[test]
    fn first_key_sits_in_the_corner() {
        let first = key_position(rgb(0.0, 0.0, 7.0), rgb(6.0, 0.2, 1.5), rgb(0.2, 0.2, 0.2), 0, 0);
        assert!((first.x + 2.85).abs() < 1e-5);
        assert!((first.y - 0.1).abs() < 1e-6);
        assert!((first.z - 6.4).abs() < 1e-5);
    }

    #[test]
    fn material_tags_are_unique() {
        let materials = materials();
        for (i, m) in materials.iter().enumerate() {
            assert!(materials[i + 1..].iter().all(|other| other.tag != m.tag));
        }
    }

    #[test]
    fn every_primitive_is_uploaded() {
        for shape in Shape::ALL {
            assert!(MESHES.contains(&shape), "{shape:?} is never loaded");
        }
    }
}
