//! The correction engine: a bound source image, the current parameters, and the surface they
//! produce.

use image::RgbaImage;

use crate::backend::RenderBackend;
use crate::color::{CorrectionParams, Rgb};
use crate::cpu::CpuRenderer;
use crate::errors::{CorrectionError, Result};
use crate::gpu::GpuRenderer;
use crate::source::SourceImage;

/// Applies `CorrectionParams` to a source image and keeps the rendered result.
///
/// Every setter re-renders the full frame. Parameters and surface are committed together, only
/// after the render succeeded, so a failed call leaves the previous state in place.
pub struct Corrector {
    backend: Box<dyn RenderBackend>,
    source: SourceImage,
    params: CorrectionParams,
    surface: RgbaImage,
}

impl std::fmt::Debug for Corrector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Corrector")
            .field("backend", &self.backend.name())
            .field("dimensions", &self.source.dimensions())
            .field("params", &self.params)
            .finish()
    }
}

impl Corrector {
    /// Bind `image` on the GPU.
    pub fn new(image: SourceImage) -> Result<Self> {
        let renderer = GpuRenderer::acquire()?;
        Self::with_backend(Box::new(renderer), image)
    }

    /// Bind `image` on the GPU, or on the CPU renderer when no GPU context can be acquired.
    /// Other failures (oversized image, rejected shader) are still returned.
    pub fn new_with_fallback(image: SourceImage) -> Result<Self> {
        Self::with_fallback_from(
            || GpuRenderer::acquire().map(|r| Box::new(r) as Box<dyn RenderBackend>),
            image,
        )
    }

    /// Bind `image` on the backend `acquire` returns. Only `UnsupportedBackend` switches to the
    /// CPU renderer; any other acquisition error is passed through.
    pub fn with_fallback_from<F>(acquire: F, image: SourceImage) -> Result<Self>
    where
        F: FnOnce() -> Result<Box<dyn RenderBackend>>,
    {
        match acquire() {
            Ok(backend) => Self::with_backend(backend, image),
            Err(CorrectionError::UnsupportedBackend { message }) => {
                log::warn!("GPU unavailable ({}), using CPU renderer", message);
                Self::with_backend(Box::new(CpuRenderer::new()), image)
            }
            Err(e) => Err(e),
        }
    }

    /// Bind `image` on the CPU renderer.
    pub fn cpu(image: SourceImage) -> Result<Self> {
        Self::with_backend(Box::new(CpuRenderer::new()), image)
    }

    pub fn with_backend(mut backend: Box<dyn RenderBackend>, image: SourceImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        backend.capabilities().validate(width, height)?;
        backend.upload(&image)?;

        let params = CorrectionParams::default();
        let surface = backend.render(&params)?;

        log::info!(
            "Corrector ready: {}x{} on {}",
            width,
            height,
            backend.name()
        );

        Ok(Self {
            backend,
            source: image,
            params,
            surface,
        })
    }

    pub fn set_multiplier(&mut self, rgb: &[f32]) -> Result<()> {
        let multiplier = Rgb::from_slice(rgb)?;
        self.apply(CorrectionParams {
            multiplier,
            ..self.params
        })
    }

    pub fn set_bias(&mut self, rgb: &[f32]) -> Result<()> {
        let bias = Rgb::from_slice(rgb)?;
        self.apply(CorrectionParams { bias, ..self.params })
    }

    pub fn set_linear_color_space(&mut self, enabled: bool) -> Result<()> {
        self.apply(CorrectionParams {
            linear_space: enabled,
            ..self.params
        })
    }

    /// Replace all parameters with a single re-render.
    pub fn set_params(&mut self, params: CorrectionParams) -> Result<()> {
        params.validate()?;
        self.apply(params)
    }

    fn apply(&mut self, params: CorrectionParams) -> Result<()> {
        let surface = self.render(&params)?;
        self.params = params;
        self.surface = surface;
        Ok(())
    }

    fn render(&mut self, params: &CorrectionParams) -> Result<RgbaImage> {
        log::trace!(
            "render multiplier={:?} bias={:?} linear={}",
            params.multiplier,
            params.bias,
            params.linear_space
        );
        self.backend.render(params)
    }

    pub fn params(&self) -> &CorrectionParams {
        &self.params
    }

    /// The most recent full-frame render.
    pub fn surface(&self) -> &RgbaImage {
        &self.surface
    }

    pub fn source(&self) -> &SourceImage {
        &self.source
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Release backend resources now instead of at drop.
    pub fn dispose(mut self) {
        self.backend.release();
    }
}

impl Drop for Corrector {
    fn drop(&mut self) {
        self.backend.release();
    }
}
