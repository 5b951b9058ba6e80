//! Render pipeline construction.
//!
//! - `basic` builds the Phong scene pipeline from `scene.wgsl`
//! - `light` holds the per-frame globals uniform (camera and lights)

pub mod basic;
pub mod light;
