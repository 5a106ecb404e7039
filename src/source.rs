use std::sync::Arc;

use image::{DynamicImage, RgbaImage};

/// The decoded, unmodified photo.
///
/// Cloning shares the pixel buffer; nothing ever writes to it after construction, so the
/// corrector and the sampler can hold the same image without coordination.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pixels: Arc<RgbaImage>,
}

impl SourceImage {
    pub fn new(pixels: RgbaImage) -> Self {
        Self {
            pixels: Arc::new(pixels),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Tightly packed RGBA8 rows.
    pub fn as_raw(&self) -> &[u8] {
        self.pixels.as_raw()
    }
}

impl From<RgbaImage> for SourceImage {
    fn from(pixels: RgbaImage) -> Self {
        Self::new(pixels)
    }
}

impl From<&DynamicImage> for SourceImage {
    fn from(image: &DynamicImage) -> Self {
        Self::new(image.to_rgba8())
    }
}
