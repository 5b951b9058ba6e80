use std::collections::HashMap;

use anyhow::anyhow;
use image::GenericImageView;

use crate::{data_structures::texture::Texture, error::TextureError, scene::TextureLoader};

/// Pixels of a decoded image, flipped so that row 0 is the bottom row.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    /// Always RGBA8, whatever the source had.
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Channel count of the source image (3 or 4).
    pub channels: u8,
}

/// Decode an image file's bytes.
///
/// Only RGB and RGBA sources are accepted. The image is flipped vertically so
/// that texture coordinate v = 0 addresses the bottom of the picture.
pub fn decode_image(bytes: &[u8]) -> Result<DecodedImage, TextureError> {
    let img = image::load_from_memory(bytes)?;
    let channels = img.color().channel_count();
    if !matches!(channels, 3 | 4) {
        return Err(TextureError::UnsupportedChannels(channels));
    }
    let img = img.flipv();
    let (width, height) = img.dimensions();
    Ok(DecodedImage {
        pixels: img.to_rgba8().into_raw(),
        width,
        height,
        channels,
    })
}

pub fn texture_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
        label: Some("object_texture_bind_group_layout"),
    })
}

/// A texture together with the bind group that exposes it to the scene shader.
#[derive(Debug)]
pub struct BoundTexture {
    pub texture: Texture,
    pub bind_group: wgpu::BindGroup,
}

pub fn bind_texture(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    texture: Texture,
    label: &str,
) -> anyhow::Result<BoundTexture> {
    let sampler = texture
        .sampler
        .as_ref()
        .ok_or_else(|| anyhow!("texture {label} has no sampler"))?;
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
        label: Some(label),
    });
    Ok(BoundTexture {
        texture,
        bind_group,
    })
}

/// Turns prefetched image files into GPU textures.
///
/// File contents are read up front (see [`super::load_binaries`]) so that
/// creating a texture never blocks on IO.
pub struct GpuTextureLoader<'a> {
    device: &'a wgpu::Device,
    queue: &'a wgpu::Queue,
    layout: &'a wgpu::BindGroupLayout,
    sources: HashMap<String, anyhow::Result<Vec<u8>>>,
}

impl<'a> GpuTextureLoader<'a> {
    pub fn new(
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        layout: &'a wgpu::BindGroupLayout,
        sources: HashMap<String, anyhow::Result<Vec<u8>>>,
    ) -> Self {
        Self {
            device,
            queue,
            layout,
            sources,
        }
    }
}

impl TextureLoader for GpuTextureLoader<'_> {
    type Handle = BoundTexture;

    fn load(&mut self, file_name: &str) -> anyhow::Result<BoundTexture> {
        let bytes = self
            .sources
            .remove(file_name)
            .unwrap_or_else(|| Err(anyhow!("{file_name} was never read from disk")))?;
        let decoded = decode_image(&bytes)?;
        log::info!(
            "Successfully loaded image: {}, width: {}, height: {}, channels: {}",
            file_name,
            decoded.width,
            decoded.height,
            decoded.channels
        );
        let texture = Texture::from_decoded(self.device, self.queue, &decoded, file_name)?;
        bind_texture(self.device, self.layout, texture, file_name)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, RgbImage, Rgba, RgbaImage};

    use super::*;

    fn encode_png(img: DynamicImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn rgb_images_are_flipped_and_expanded() {
        let mut img = RgbImage::new(1, 2);
        img.put_pixel(0, 0, Rgb([255, 0, 0]));
        img.put_pixel(0, 1, Rgb([0, 0, 255]));

        let decoded = decode_image(&encode_png(DynamicImage::ImageRgb8(img))).unwrap();

        assert_eq!(decoded.channels, 3);
        assert_eq!((decoded.width, decoded.height), (1, 2));
        // bottom row (blue) comes first after the flip
        assert_eq!(decoded.pixels, vec![0, 0, 255, 255, 255, 0, 0, 255]);
    }

    #[test]
    fn rgba_keeps_alpha() {
        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(0, 0, Rgba([10, 20, 30, 40]));
        img.put_pixel(1, 0, Rgba([50, 60, 70, 80]));

        let decoded = decode_image(&encode_png(DynamicImage::ImageRgba8(img))).unwrap();

        assert_eq!(decoded.channels, 4);
        assert_eq!(decoded.pixels, vec![10, 20, 30, 40, 50, 60, 70, 80]);
    }

    #[test]
    fn grayscale_is_rejected() {
        let mut img = GrayImage::new(1, 1);
        img.put_pixel(0, 0, Luma([128]));

        let err = decode_image(&encode_png(DynamicImage::ImageLuma8(img))).unwrap_err();

        assert!(matches!(err, TextureError::UnsupportedChannels(1)));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let err = decode_image(b"definitely not an image").unwrap_err();
        assert!(matches!(err, TextureError::Decode(_)));
    }
}
