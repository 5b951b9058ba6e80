//! Tagged texture slots.
//!
//! Textures are registered once at load time and addressed afterwards by a
//! string tag. The slot index doubles as the sampler unit the shader reads
//! from, so slots are never reused or removed individually.

use crate::error::TextureError;

/// Number of texture slots available to a scene.
pub const MAX_TEXTURE_SLOTS: usize = 16;

/// A loaded texture handle together with the tag it was registered under.
#[derive(Debug, Clone)]
struct TextureRecord<T> {
    handle: T,
    tag: String,
}

/// Fixed-capacity registry of `(handle, tag)` pairs.
///
/// Generic over the handle so the lookup rules can be shared by the GPU
/// textures and by anything else that wants tagged slots.
#[derive(Debug)]
pub struct TextureRegistry<T> {
    records: Vec<TextureRecord<T>>,
}

impl<T> TextureRegistry<T> {
    pub fn new() -> Self {
        Self {
            records: Vec::with_capacity(MAX_TEXTURE_SLOTS),
        }
    }

    /// Append a texture and return the slot it was placed in.
    pub fn register(&mut self, tag: impl Into<String>, handle: T) -> Result<usize, TextureError> {
        let tag = tag.into();
        if self.records.len() >= MAX_TEXTURE_SLOTS {
            return Err(TextureError::RegistryFull {
                capacity: MAX_TEXTURE_SLOTS,
                tag,
            });
        }
        self.records.push(TextureRecord { handle, tag });
        Ok(self.records.len() - 1)
    }

    /// Slot of the first texture registered under `tag` (exact, case-sensitive).
    pub fn find_slot(&self, tag: &str) -> Option<usize> {
        self.records.iter().position(|record| record.tag == tag)
    }

    /// Handle of the first texture registered under `tag`.
    pub fn find(&self, tag: &str) -> Option<&T> {
        self.records
            .iter()
            .find(|record| record.tag == tag)
            .map(|record| &record.handle)
    }

    pub fn get(&self, slot: usize) -> Option<&T> {
        self.records.get(slot).map(|record| &record.handle)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop every handle at once. Used at shutdown.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl<T> Default for TextureRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_follow_registration_order() {
        let mut registry = TextureRegistry::new();
        assert_eq!(registry.register("desktop", 7u32).unwrap(), 0);
        assert_eq!(registry.register("tab", 9u32).unwrap(), 1);

        assert_eq!(registry.find_slot("tab"), Some(1));
        assert_eq!(registry.find("desktop"), Some(&7));
        assert_eq!(registry.get(1), Some(&9));
    }

    #[test]
    fn lookup_is_exact_and_case_sensitive() {
        let mut registry = TextureRegistry::new();
        registry.register("table", 1u32).unwrap();

        assert_eq!(registry.find_slot("Table"), None);
        assert_eq!(registry.find_slot("tabl"), None);
        assert_eq!(registry.find("table "), None);
    }

    #[test]
    fn first_match_wins_for_duplicate_tags() {
        let mut registry = TextureRegistry::new();
        registry.register("wood", 1u32).unwrap();
        registry.register("wood", 2u32).unwrap();

        assert_eq!(registry.find_slot("wood"), Some(0));
        assert_eq!(registry.find("wood"), Some(&1));
    }

    #[test]
    fn refuses_more_than_sixteen_textures() {
        let mut registry = TextureRegistry::new();
        for i in 0..MAX_TEXTURE_SLOTS {
            registry.register(format!("tex{i}"), i).unwrap();
        }
        let err = registry.register("overflow", 99).unwrap_err();
        assert!(matches!(err, TextureError::RegistryFull { capacity: 16, .. }));
        assert_eq!(registry.len(), MAX_TEXTURE_SLOTS);
        assert_eq!(registry.find_slot("overflow"), None);
    }

    #[test]
    fn clear_releases_everything() {
        let mut registry = TextureRegistry::new();
        registry.register("a", 1u8).unwrap();
        registry.clear();
        assert!(registry.is_empty());
        assert_eq!(registry.find_slot("a"), None);
    }
}
