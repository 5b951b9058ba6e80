//! Runtime settings with TOML file support.
//!
//! Every section uses `#[serde(default)]` so a file only has to name what it
//! overrides, e.g. just `[camera] zoom = 60.0`.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use cgmath::{InnerSpace, Vector3};
use serde::{Deserialize, Serialize};

const DEGENERATE_EPSILON: f32 = 1e-10;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DioramaConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub assets: AssetConfig,
}

impl DioramaConfig {
    /// Load from a TOML file. A missing file yields the defaults, a file that
    /// exists but does not parse is an error.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(e).with_context(|| format!("Failed to read {}", path.display())),
        };
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config
            .camera
            .validate()
            .with_context(|| format!("Invalid [camera] section in {}", path.display()))?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 800,
            title: "Desk Diorama".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    /// Normalised on use.
    pub front: [f32; 3],
    pub up: [f32; 3],
    /// Vertical field of view in degrees.
    pub zoom: f32,
    pub movement_speed: f32,
    pub mouse_sensitivity: f32,
    pub near: f32,
    pub far: f32,
    /// Half of the visible height in orthographic mode, in world units.
    pub ortho_half_height: f32,
}

impl CameraConfig {
    /// `front` and `up` must span a plane, otherwise the camera basis has no
    /// right vector.
    pub fn validate(&self) -> anyhow::Result<()> {
        let front = Vector3::from(self.front);
        let up = Vector3::from(self.up);
        if !has_direction(front) {
            anyhow::bail!("camera front {:?} has no direction", self.front);
        }
        if !has_direction(up) {
            anyhow::bail!("camera up {:?} has no direction", self.up);
        }
        if !has_direction(front.normalize().cross(up.normalize())) {
            anyhow::bail!(
                "camera front {:?} and up {:?} are parallel",
                self.front,
                self.up
            );
        }
        Ok(())
    }
}

// false for NaN components too
fn has_direction(v: Vector3<f32>) -> bool {
    v.magnitude2() > DEGENERATE_EPSILON
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 3.3, 12.0],
            front: [0.0, -0.5, -2.0],
            up: [0.0, 1.0, 0.0],
            zoom: 80.0,
            movement_speed: 2.5,
            mouse_sensitivity: 0.1,
            near: 0.1,
            far: 100.0,
            ortho_half_height: 5.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextureEntry {
    pub file: String,
    pub tag: String,
}

impl TextureEntry {
    pub fn new(file: &str, tag: &str) -> Self {
        Self {
            file: file.to_string(),
            tag: tag.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssetConfig {
    pub directory: PathBuf,
    pub textures: Vec<TextureEntry>,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("assets"),
            textures: crate::desk::TEXTURES
                .iter()
                .map(|(file, tag)| TextureEntry::new(file, tag))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_desk_window() {
        let config = DioramaConfig::default();
        assert_eq!((config.window.width, config.window.height), (1000, 800));
        assert_eq!(config.camera.zoom, 80.0);
        assert_eq!(config.assets.textures.len(), 3);
        assert_eq!(config.assets.textures[0], TextureEntry::new("desktop.jpg", "desktop"));
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: DioramaConfig = toml::from_str(
            r#"
[camera]
zoom = 60.0

[assets]
directory = "media"
"#,
        )
        .unwrap();
        assert_eq!(config.camera.zoom, 60.0);
        assert_eq!(config.camera.movement_speed, 2.5);
        assert_eq!(config.assets.directory, PathBuf::from("media"));
        assert_eq!(config.assets.textures.len(), 3);
        assert_eq!(config.window, WindowConfig::default());
    }

    #[test]
    fn texture_list_can_be_replaced() {
        let config: DioramaConfig = toml::from_str(
            r#"
[[assets.textures]]
file = "oak.png"
tag = "table"
"#,
        )
        .unwrap();
        assert_eq!(config.assets.textures, vec![TextureEntry::new("oak.png", "table")]);
    }

    fn camera_error(front: [f32; 3], up: [f32; 3]) -> String {
        let camera = CameraConfig {
            front,
            up,
            ..Default::default()
        };
        format!("{:#}", camera.validate().unwrap_err())
    }

    #[test]
    fn default_camera_is_valid() {
        assert!(CameraConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_front_is_rejected() {
        assert!(camera_error([0.0, 0.0, 0.0], [0.0, 1.0, 0.0]).contains("front"));
    }

    #[test]
    fn zero_up_is_rejected() {
        assert!(camera_error([0.0, -0.5, -2.0], [0.0, 0.0, 0.0]).contains("up"));
    }

    #[test]
    fn front_parallel_to_up_is_rejected() {
        assert!(camera_error([0.0, 2.0, 0.0], [0.0, 1.0, 0.0]).contains("parallel"));
        assert!(camera_error([0.0, -3.0, 0.0], [0.0, 1.0, 0.0]).contains("parallel"));
    }

    #[test]
    fn load_refuses_a_degenerate_camera() {
        let path = std::env::temp_dir().join(format!("desk-diorama-flat-{}.toml", std::process::id()));
        std::fs::write(&path, "[camera]\nfront = [0.0, 0.0, 0.0]\n").unwrap();

        let err = DioramaConfig::load(&path).unwrap_err();

        assert!(format!("{err:#}").contains("Invalid [camera]"));
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("desk-diorama-no-such-config.toml");
        assert_eq!(DioramaConfig::load(&path).unwrap(), DioramaConfig::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let path = std::env::temp_dir().join(format!("desk-diorama-bad-{}.toml", std::process::id()));
        std::fs::write(&path, "[camera\nzoom = ").unwrap();

        let err = DioramaConfig::load(&path).unwrap_err();

        assert!(format!("{err:#}").contains("Failed to parse"));
        std::fs::remove_file(path).unwrap();
    }
}
