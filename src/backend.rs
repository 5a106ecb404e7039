use image::RgbaImage;

use crate::color::CorrectionParams;
use crate::errors::{CorrectionError, Result};
use crate::source::SourceImage;

/// What a renderer can hold. Checked once when a corrector binds an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendCapabilities {
    pub max_texture_dimension: u32,
    pub npot_textures: bool,
}

impl BackendCapabilities {
    pub fn validate(&self, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(CorrectionError::invalid(format!(
                "image has no pixels ({}x{})",
                width, height
            )));
        }
        if !self.npot_textures && !(width.is_power_of_two() && height.is_power_of_two()) {
            return Err(CorrectionError::UnsupportedTextureFormat {
                message: format!("non-power-of-two textures are required for {}x{}", width, height),
            });
        }
        if width > self.max_texture_dimension || height > self.max_texture_dimension {
            return Err(CorrectionError::ImageTooLarge {
                width,
                height,
                max: self.max_texture_dimension,
            });
        }
        Ok(())
    }
}

/// A device that can run the correction over a bound source image.
pub trait RenderBackend {
    fn name(&self) -> &str;

    fn capabilities(&self) -> BackendCapabilities;

    /// Bind `image` as the texture source. Called once, after capability validation.
    fn upload(&mut self, image: &SourceImage) -> Result<()>;

    /// Clear to transparent black and draw the whole source through `params`.
    fn render(&mut self, params: &CorrectionParams) -> Result<RgbaImage>;

    /// Free device resources. Must be safe to call more than once.
    fn release(&mut self);
}
