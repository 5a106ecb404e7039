use image::RgbaImage;
use rayon::prelude::*;

use crate::backend::{BackendCapabilities, RenderBackend};
use crate::color::{self, CorrectionParams};
use crate::errors::{CorrectionError, Result};
use crate::source::SourceImage;

/// Same limit the GPU device is requested with.
pub const DEFAULT_MAX_DIMENSION: u32 = 16384;

/// Software renderer. Shares the transform with the shader through `color::apply_transform`,
/// which makes it the reference the GPU output is compared against.
#[derive(Debug)]
pub struct CpuRenderer {
    max_dimension: u32,
    source: Option<SourceImage>,
}

impl Default for CpuRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuRenderer {
    pub fn new() -> Self {
        Self::with_max_dimension(DEFAULT_MAX_DIMENSION)
    }

    pub fn with_max_dimension(max_dimension: u32) -> Self {
        Self {
            max_dimension,
            source: None,
        }
    }
}

impl RenderBackend for CpuRenderer {
    fn name(&self) -> &str {
        "cpu"
    }

    fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities {
            max_texture_dimension: self.max_dimension,
            npot_textures: true,
        }
    }

    fn upload(&mut self, image: &SourceImage) -> Result<()> {
        self.source = Some(image.clone());
        Ok(())
    }

    fn render(&mut self, params: &CorrectionParams) -> Result<RgbaImage> {
        let source = self.source.as_ref().ok_or_else(|| CorrectionError::Render {
            message: "no source image bound".to_string(),
        })?;
        let (width, height) = source.dimensions();

        // Cleared surface; every pixel is then overwritten by the single draw below
        let mut surface = RgbaImage::new(width, height);

        let pixel_count = (width as usize) * (height as usize);
        let pixels_per_thread = (pixel_count / num_cpus::get()).max(1);
        // Chunks stay aligned to whole RGBA pixels
        let bytes_per_chunk = pixels_per_thread * 4;

        let src = source.as_raw();
        surface
            .par_chunks_mut(bytes_per_chunk)
            .zip(src.par_chunks(bytes_per_chunk))
            .for_each(|(dst, src)| {
                for (out, px) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
                    let rgb = [
                        color::normalize(px[0]),
                        color::normalize(px[1]),
                        color::normalize(px[2]),
                    ];
                    let [r, g, b] = color::apply_transform(rgb, params);
                    out[0] = color::quantize(r);
                    out[1] = color::quantize(g);
                    out[2] = color::quantize(b);
                    out[3] = px[3];
                }
            });

        Ok(surface)
    }

    fn release(&mut self) {
        self.source = None;
    }
}
