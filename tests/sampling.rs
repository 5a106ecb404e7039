use image::{Rgba, RgbaImage};
use whitepoint::{CorrectionError, Rgb, Sampler, SourceImage, WhiteBalance};

fn noise(width: u32, height: u32) -> SourceImage {
    SourceImage::new(RgbaImage::from_fn(width, height, |x, y| {
        let h = x.wrapping_mul(2654435761).wrapping_add(y.wrapping_mul(40503));
        Rgba([(h & 0xFF) as u8, ((h >> 8) & 0xFF) as u8, ((h >> 16) & 0xFF) as u8, (h >> 24) as u8])
    }))
}

fn mean_of(source: &SourceImage, x0: u32, y0: u32, size: u32) -> [f64; 3] {
    let mut sums = [0f64; 3];
    for y in y0..y0 + size {
        for x in x0..x0 + size {
            let px = source.pixels().get_pixel(x, y);
            for c in 0..3 {
                sums[c] += px[c] as f64;
            }
        }
    }
    let n = (size * size) as f64;
    sums.map(|s| s / n / 255.0)
}

fn assert_rgb_close(actual: Rgb, expected: [f64; 3]) {
    for (a, e) in actual.to_array().iter().zip(expected) {
        assert!((*a as f64 - e).abs() < 1e-6, "{:?} vs {:?}", actual, expected);
    }
}

#[test]
fn test_corner_sample_stays_in_bounds() {
    let source = noise(100, 100);
    let mut sampler = Sampler::new(source.clone());
    sampler.set_sample_size(5.0).unwrap();

    assert_rgb_close(sampler.sample_region(0, 0), mean_of(&source, 0, 0, 5));
    assert_rgb_close(sampler.sample_region(99, 99), mean_of(&source, 95, 95, 5));
}

#[test]
fn test_interior_sample_is_centered() {
    let source = noise(64, 48);
    let mut sampler = Sampler::new(source.clone());
    sampler.set_sample_size(7.0).unwrap();
    assert_rgb_close(sampler.sample_region(30, 20), mean_of(&source, 27, 17, 7));

    // Even sizes put the extra pixel before the centre
    sampler.set_sample_size(4.0).unwrap();
    assert_rgb_close(sampler.sample_region(30, 20), mean_of(&source, 28, 18, 4));
}

#[test]
fn test_default_size_is_three() {
    let source = noise(10, 10);
    let mut sampler = Sampler::new(source.clone());
    assert_eq!(sampler.sample_size(), 3);
    assert_rgb_close(sampler.sample_region(5, 5), mean_of(&source, 4, 4, 3));
}

#[test]
fn test_invalid_sizes_rejected() {
    let mut sampler = Sampler::new(noise(10, 10));
    sampler.set_sample_size(6.0).unwrap();
    for n in [0.0, -3.0, 3.5] {
        let err = sampler.set_sample_size(n).unwrap_err();
        assert!(matches!(err, CorrectionError::InvalidParameter { .. }));
    }
    assert_eq!(sampler.sample_size(), 6);
}

#[test]
fn test_sampling_is_pure() {
    let mut sampler = Sampler::new(noise(80, 60));
    sampler.set_sample_size(9.0).unwrap();
    let first = sampler.sample_region(40, 30);
    sampler.sample_region(0, 0);
    sampler.sample_region(79, 59);
    assert_eq!(sampler.sample_region(40, 30), first);
}

#[test]
fn test_pick_builds_params() {
    let source = SourceImage::new(RgbaImage::from_pixel(12, 12, Rgba([200, 100, 50, 255])));
    let mut sampler = Sampler::new(source);
    let balance = WhiteBalance {
        target: Rgb::splat(0.8),
        linear_space: false,
    };
    let params = balance.pick(&mut sampler, 6, 6).unwrap();
    assert!((params.multiplier.r - 0.8 * 255.0 / 200.0).abs() < 1e-5);
    assert!((params.multiplier.g - 0.8 * 255.0 / 100.0).abs() < 1e-5);
    assert!((params.multiplier.b - 0.8 * 255.0 / 50.0).abs() < 1e-5);
    assert_eq!(params.bias, Rgb::ZERO);
    assert!(!params.linear_space);
}

#[test]
fn test_pick_on_black_fails() {
    let source = SourceImage::new(RgbaImage::from_pixel(5, 5, Rgba([0, 0, 0, 255])));
    let mut sampler = Sampler::new(source);
    assert!(WhiteBalance::default().pick(&mut sampler, 2, 2).is_err());
}

#[test]
fn test_huge_sample_size_covers_whole_image() {
    let source = noise(4, 4);
    let mut sampler = Sampler::new(source.clone());
    sampler.set_sample_size(u32::MAX as f64).unwrap();
    assert_eq!(sampler.sample_size(), u32::MAX);
    assert_rgb_close(sampler.sample_region(2, 2), mean_of(&source, 0, 0, 4));

    sampler.set_sample_size(100_000.0).unwrap();
    assert_rgb_close(sampler.sample_region(0, 3), mean_of(&source, 0, 0, 4));
}
