#![allow(dead_code)]

use desk_diorama::{
    config::TextureEntry,
    desk,
    render::FrameRecorder,
    scene::{SceneManager, TextureLoader},
};

/// Hands out the file name as the texture handle. Files listed in `broken`
/// fail to load.
#[derive(Default)]
pub struct FakeLoader {
    pub broken: Vec<String>,
    pub requested: Vec<String>,
}

impl TextureLoader for FakeLoader {
    type Handle = String;

    fn load(&mut self, file_name: &str) -> anyhow::Result<String> {
        self.requested.push(file_name.to_string());
        if self.broken.iter().any(|b| b == file_name) {
            anyhow::bail!("{file_name} is not an image");
        }
        Ok(file_name.to_string())
    }
}

pub fn desk_entries() -> Vec<TextureEntry> {
    desk::TEXTURES
        .iter()
        .map(|(file, tag)| TextureEntry::new(file, tag))
        .collect()
}

/// A scene prepared the way the app does it, with `entries` as texture list.
pub fn prepared_scene(entries: &[TextureEntry]) -> (SceneManager<String>, FrameRecorder) {
    let mut scene = SceneManager::new();
    let mut frame = FrameRecorder::new();
    desk::prepare_scene(&mut scene, &mut FakeLoader::default(), entries, &mut frame);
    (scene, frame)
}

/// Record one frame of the desk.
pub fn record_frame(scene: &SceneManager<String>, frame: &mut FrameRecorder) {
    frame.begin_frame();
    desk::render_scene(scene, frame);
}
