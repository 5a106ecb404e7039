use std::cell::Cell;
use std::rc::Rc;

use image::{Rgba, RgbaImage};
use whitepoint::{
    BackendCapabilities, CorrectionError, CorrectionParams, Corrector, CpuRenderer, GpuRenderer,
    RenderBackend, Rgb, Sampler, SourceImage,
};

fn photo(width: u32, height: u32) -> SourceImage {
    SourceImage::new(RgbaImage::from_fn(width, height, |x, y| {
        Rgba([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            ((x * 31 + y * 17) % 256) as u8,
            if x % 3 == 0 { 128 } else { 255 },
        ])
    }))
}

fn max_channel_diff(a: &RgbaImage, b: &RgbaImage) -> u8 {
    a.as_raw()
        .iter()
        .zip(b.as_raw())
        .map(|(x, y)| x.abs_diff(*y))
        .max()
        .unwrap_or(0)
}

#[test]
fn test_identity_reproduces_source() {
    let source = photo(33, 21);
    let mut corrector = Corrector::cpu(source.clone()).unwrap();
    corrector.set_multiplier(&[1.3, 0.9, 1.1]).unwrap();
    corrector.set_bias(&[0.05, 0.0, -0.05]).unwrap();

    corrector.set_multiplier(&[1.0, 1.0, 1.0]).unwrap();
    corrector.set_bias(&[0.0, 0.0, 0.0]).unwrap();
    corrector.set_linear_color_space(false).unwrap();
    assert_eq!(corrector.surface().as_raw(), source.as_raw());
}

#[test]
fn test_rendering_is_deterministic() {
    let params = CorrectionParams {
        multiplier: Rgb::new(1.7, 0.8, 1.2),
        bias: Rgb::new(-0.02, 0.03, 0.0),
        linear_space: true,
    };
    let mut a = Corrector::cpu(photo(40, 30)).unwrap();
    let mut b = Corrector::cpu(photo(40, 30)).unwrap();
    a.set_params(params).unwrap();
    b.set_params(params).unwrap();
    assert_eq!(a.surface(), b.surface());

    let first = a.surface().clone();
    a.set_params(params).unwrap();
    assert_eq!(a.surface(), &first);
}

#[test]
fn test_linear_toggle_returns_to_same_output() {
    let mut corrector = Corrector::cpu(photo(24, 24)).unwrap();
    corrector.set_multiplier(&[1.25, 1.0, 0.8]).unwrap();
    corrector.set_linear_color_space(true).unwrap();
    let before = corrector.surface().clone();

    corrector.set_linear_color_space(false).unwrap();
    assert_ne!(corrector.surface(), &before);
    corrector.set_linear_color_space(true).unwrap();
    assert_eq!(corrector.surface(), &before);
}

#[test]
fn test_linear_identity_matches_source() {
    let source = photo(16, 16);
    let mut corrector = Corrector::cpu(source.clone()).unwrap();
    corrector.set_linear_color_space(true).unwrap();
    assert!(max_channel_diff(corrector.surface(), source.pixels()) <= 1);
}

#[test]
fn test_invalid_setters_leave_params_unchanged() {
    let mut corrector = Corrector::cpu(photo(8, 8)).unwrap();
    corrector.set_multiplier(&[1.1, 1.0, 0.9]).unwrap();
    let params = *corrector.params();
    let surface = corrector.surface().clone();

    for bad in [&[1.0, 2.0][..], &[f32::NAN, 1.0, 1.0][..], &[][..]] {
        let err = corrector.set_multiplier(bad).unwrap_err();
        assert!(matches!(err, CorrectionError::InvalidParameter { .. }));
        assert!(err.is_recoverable());
    }
    assert!(corrector.set_bias(&[0.0, 0.0, 0.0, 0.0]).is_err());

    assert_eq!(corrector.params(), &params);
    assert_eq!(corrector.surface(), &surface);
}

#[test]
fn test_sampling_ignores_correction() {
    let source = photo(50, 50);
    let mut sampler = Sampler::new(source.clone());
    let before = sampler.sample_region(20, 30);

    let mut corrector = Corrector::cpu(source).unwrap();
    corrector.set_multiplier(&[3.0, 0.1, 2.0]).unwrap();
    corrector.set_bias(&[0.2, 0.2, 0.2]).unwrap();
    corrector.set_linear_color_space(true).unwrap();

    assert_eq!(sampler.sample_region(20, 30), before);
}

#[test]
fn test_mid_gray_balances_to_target() {
    let source = SourceImage::new(RgbaImage::from_pixel(4, 4, Rgba([128, 128, 128, 255])));
    let mut sampler = Sampler::new(source.clone());
    sampler.set_sample_size(3.0).unwrap();

    let sample = sampler.sample_region(2, 2);
    for c in sample.to_array() {
        assert!((c - 128.0 / 255.0).abs() < 1e-6);
    }

    let target = Rgb::new(240.0 / 255.0, 235.0 / 255.0, 230.0 / 255.0);
    let multiplier = whitepoint::derive_multiplier(sample, target, false).unwrap();

    let mut corrector = Corrector::cpu(source).unwrap();
    corrector.set_multiplier(&multiplier.to_array()).unwrap();
    for px in corrector.surface().pixels() {
        assert_eq!(px, &Rgba([240, 235, 230, 255]));
    }
}

/// Backend that counts releases and reports configurable capabilities.
struct RecordingBackend {
    caps: BackendCapabilities,
    releases: Rc<Cell<usize>>,
    inner: CpuRenderer,
}

impl RenderBackend for RecordingBackend {
    fn name(&self) -> &str {
        "recording"
    }

    fn capabilities(&self) -> BackendCapabilities {
        self.caps
    }

    fn upload(&mut self, image: &SourceImage) -> whitepoint::Result<()> {
        self.inner.upload(image)
    }

    fn render(&mut self, params: &CorrectionParams) -> whitepoint::Result<RgbaImage> {
        self.inner.render(params)
    }

    fn release(&mut self) {
        self.releases.set(self.releases.get() + 1);
        self.inner.release();
    }
}

fn recording(caps: BackendCapabilities) -> (Box<RecordingBackend>, Rc<Cell<usize>>) {
    let releases = Rc::new(Cell::new(0));
    let backend = RecordingBackend {
        caps,
        releases: releases.clone(),
        inner: CpuRenderer::new(),
    };
    (Box::new(backend), releases)
}

#[test]
fn test_fallback_keeps_acquired_backend() {
    let (backend, releases) = recording(BackendCapabilities {
        max_texture_dimension: 4096,
        npot_textures: true,
    });
    let corrector = Corrector::with_fallback_from(|| Ok(backend as Box<dyn RenderBackend>), photo(9, 7)).unwrap();
    assert_eq!(corrector.backend_name(), "recording");
    drop(corrector);
    assert_eq!(releases.get(), 1);

    let corrector = Corrector::with_fallback_from(
        || {
            Err(CorrectionError::UnsupportedBackend {
                message: "no adapter".into(),
            })
        },
        photo(9, 7),
    )
    .unwrap();
    assert_eq!(corrector.backend_name(), "cpu");
}

#[test]
fn test_empty_image_is_invalid() {
    let (backend, _) = recording(BackendCapabilities {
        max_texture_dimension: 4096,
        npot_textures: false,
    });
    let err = Corrector::with_backend(backend, SourceImage::new(RgbaImage::new(0, 0))).unwrap_err();
    assert!(matches!(err, CorrectionError::InvalidParameter { .. }));
    assert!(err.is_recoverable());
}

#[test]
fn test_npot_required() {
    let caps = BackendCapabilities {
        max_texture_dimension: 4096,
        npot_textures: false,
    };
    let (backend, _) = recording(caps);
    let err = Corrector::with_backend(backend, photo(30, 20)).unwrap_err();
    assert!(matches!(err, CorrectionError::UnsupportedTextureFormat { .. }));

    let (backend, _) = recording(caps);
    assert!(Corrector::with_backend(backend, photo(32, 16)).is_ok());
}

#[test]
fn test_image_too_large() {
    let caps = BackendCapabilities {
        max_texture_dimension: 16,
        npot_textures: true,
    };
    let (backend, _) = recording(caps);
    let err = Corrector::with_backend(backend, photo(8, 17)).unwrap_err();
    assert!(matches!(err, CorrectionError::ImageTooLarge { width: 8, height: 17, max: 16 }));
    assert_eq!(err.error_code(), "IMAGE_TOO_LARGE");
}

#[test]
fn test_dispose_releases_resources() {
    let caps = BackendCapabilities {
        max_texture_dimension: 4096,
        npot_textures: true,
    };
    let (backend, releases) = recording(caps);
    let corrector = Corrector::with_backend(backend, photo(4, 4)).unwrap();
    assert_eq!(releases.get(), 0);
    corrector.dispose();
    assert!(releases.get() >= 1);

    let (backend, releases) = recording(caps);
    {
        let _corrector = Corrector::with_backend(backend, photo(4, 4)).unwrap();
    }
    assert_eq!(releases.get(), 1);
}

fn gpu() -> Option<GpuRenderer> {
    match GpuRenderer::acquire() {
        Ok(renderer) => Some(renderer),
        Err(e) => {
            eprintln!("skipping GPU test: {}", e);
            None
        }
    }
}

#[test]
fn test_gpu_matches_cpu() {
    let Some(renderer) = gpu() else { return };
    let info = renderer.adapter_summary();
    assert_eq!(info.max_texture_dimension, renderer.capabilities().max_texture_dimension);
    assert!(info.to_string().contains(&info.backend));
    // Width not a multiple of 64 exercises the padded readback
    let source = photo(97, 41);
    let mut on_gpu = Corrector::with_backend(Box::new(renderer), source.clone()).unwrap();
    let mut on_cpu = Corrector::cpu(source.clone()).unwrap();

    assert_eq!(on_gpu.surface().as_raw(), source.as_raw());

    for linear_space in [false, true] {
        let params = CorrectionParams {
            multiplier: Rgb::new(1.4, 0.95, 0.7),
            bias: Rgb::new(0.01, -0.02, 0.0),
            linear_space,
        };
        on_gpu.set_params(params).unwrap();
        on_cpu.set_params(params).unwrap();
        assert!(max_channel_diff(on_gpu.surface(), on_cpu.surface()) <= 1);
    }
    on_gpu.dispose();
}

#[test]
fn test_gpu_rejects_oversized_image() {
    let Some(renderer) = gpu() else { return };
    let max = renderer.capabilities().max_texture_dimension;
    let source = SourceImage::new(RgbaImage::new(max + 1, 1));
    let err = Corrector::with_backend(Box::new(renderer), source).unwrap_err();
    assert!(matches!(err, CorrectionError::ImageTooLarge { .. }));
}
