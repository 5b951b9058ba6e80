//! Errors callers are expected to match on.
//!
//! Setup paths that only ever bubble up to `main` use `anyhow` instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("could not decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("not implemented to handle image with {0} channels")]
    UnsupportedChannels(u8),
    #[error("no free texture slot for '{tag}' (capacity {capacity})")]
    RegistryFull { capacity: usize, tag: String },
}
