use crate::color::Rgb;
use crate::errors::{CorrectionError, Result};
use crate::source::SourceImage;

pub const DEFAULT_SAMPLE_SIZE: u32 = 3;

/// Once the scratch buffer has been this large it is not shrunk below it again.
/// Slider drags bounce between small sizes; this keeps them from reallocating.
const SCRATCH_FLOOR: u32 = 64;

/// Averages a square neighbourhood of the pristine source image.
#[derive(Debug, Clone)]
pub struct Sampler {
    source: SourceImage,
    sample_size: u32,
    /// Side length the scratch buffer is sized for.
    scratch_extent: u32,
    scratch: Vec<u8>,
}

impl Sampler {
    pub fn new(source: SourceImage) -> Self {
        let extent = DEFAULT_SAMPLE_SIZE.min(source.width()).min(source.height());
        Self {
            source,
            sample_size: DEFAULT_SAMPLE_SIZE,
            scratch_extent: extent,
            scratch: vec![0; extent as usize * extent as usize * 4],
        }
    }

    pub fn sample_size(&self) -> u32 {
        self.sample_size
    }

    pub fn scratch_extent(&self) -> u32 {
        self.scratch_extent
    }

    /// Set the side length of later samples. UI sliders hand over floats, so anything that is not
    /// a positive whole number is rejected here.
    pub fn set_sample_size(&mut self, n: f64) -> Result<()> {
        if !n.is_finite() || n < 1.0 || n.fract() != 0.0 || n > u32::MAX as f64 {
            return Err(CorrectionError::invalid(format!(
                "sample size must be a positive integer, got {}",
                n
            )));
        }
        let n = n as u32;
        self.resize_scratch(n)?;
        self.sample_size = n;
        Ok(())
    }

    /// The scratch block never needs to be larger than the image, so the extent is capped at
    /// `min(width, height)`. Under that cap it follows the requested size, and once it has
    /// reached `SCRATCH_FLOOR` it does not shrink below it.
    fn resize_scratch(&mut self, n: u32) -> Result<()> {
        let (width, height) = self.source.dimensions();
        let cap = width.min(height);
        let wanted = if n >= self.scratch_extent {
            n
        } else if self.scratch_extent >= SCRATCH_FLOOR {
            n.max(SCRATCH_FLOOR)
        } else {
            n
        };
        let extent = wanted.min(cap);
        if extent != self.scratch_extent {
            let len = (extent as usize)
                .checked_mul(extent as usize)
                .and_then(|v| v.checked_mul(4))
                .ok_or_else(|| {
                    CorrectionError::invalid(format!("sample block of {} pixels is too large", n))
                })?;
            self.scratch_extent = extent;
            self.scratch.resize(len, 0);
            self.scratch.shrink_to(len);
        }
        Ok(())
    }

    /// Mean colour of the `size x size` block centred on `(x, y)`, normalized to [0, 1].
    ///
    /// The block is shifted to stay inside the image, so near an edge the effective centre moves
    /// away from `(x, y)` instead of reading out of bounds.
    pub fn sample_region(&mut self, x: i64, y: i64) -> Rgb {
        let (width, height) = self.source.dimensions();
        let size = self
            .sample_size
            .min(self.scratch_extent)
            .min(width)
            .min(height);
        if size == 0 {
            return Rgb::ZERO;
        }

        let half = (size / 2) as i64;
        let left = (x - half).clamp(0, (width - size) as i64) as u32;
        let top = (y - half).clamp(0, (height - size) as i64) as u32;

        let block = self.extract(left, top, size);

        let mut sums = [0u64; 3];
        for px in block.chunks_exact(4) {
            sums[0] += px[0] as u64;
            sums[1] += px[1] as u64;
            sums[2] += px[2] as u64;
        }
        let count = (size as u64 * size as u64) as f64;
        let mean = |sum: u64| (sum as f64 / count / 255.0) as f32;

        let rgb = Rgb::new(mean(sums[0]), mean(sums[1]), mean(sums[2]));
        log::debug!(
            "Sampled {}x{} block at ({}, {}) for click ({}, {}): {:?}",
            size,
            size,
            left,
            top,
            x,
            y,
            rgb
        );
        rgb
    }

    /// Copy the block rows into the scratch buffer and return the filled part.
    fn extract(&mut self, left: u32, top: u32, size: u32) -> &[u8] {
        let stride = self.source.width() as usize * 4;
        let row_bytes = size as usize * 4;
        let raw = self.source.as_raw();
        for row in 0..size as usize {
            let start = (top as usize + row) * stride + left as usize * 4;
            let dst = row * row_bytes;
            self.scratch[dst..dst + row_bytes].copy_from_slice(&raw[start..start + row_bytes]);
        }
        &self.scratch[..row_bytes * size as usize]
    }
}
