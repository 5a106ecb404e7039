use crate::color::{self, CorrectionParams, Rgb};
use crate::errors::{CorrectionError, Result};
use crate::sampler::Sampler;

/// Slightly warm off-white. Pure white tends to read as blown out on screen.
pub const DEFAULT_TARGET_WHITE: Rgb = Rgb::new(0.95, 0.95, 0.93);

/// Multiplier that maps `sample` onto `target`, per channel.
/// In linear mode the ratio is taken between linear-light values, matching how the
/// corrector applies it.
pub fn derive_multiplier(sample: Rgb, target: Rgb, linear_space: bool) -> Result<Rgb> {
    let ratio = |t: f32, s: f32| -> Result<f32> {
        if s <= 0.0 {
            return Err(CorrectionError::invalid(format!(
                "sampled channel is {}, cannot balance against black",
                s
            )));
        }
        let m = if linear_space {
            color::to_linear(t) / color::to_linear(s)
        } else {
            t / s
        };
        if !m.is_finite() {
            return Err(CorrectionError::invalid(format!("multiplier {} is not finite", m)));
        }
        Ok(m)
    };

    Ok(Rgb::new(
        ratio(target.r, sample.r)?,
        ratio(target.g, sample.g)?,
        ratio(target.b, sample.b)?,
    ))
}

/// A white-point pick: where the user clicked and what they want it to become.
#[derive(Debug, Clone, Copy)]
pub struct WhiteBalance {
    pub target: Rgb,
    pub linear_space: bool,
}

impl Default for WhiteBalance {
    fn default() -> Self {
        Self {
            target: DEFAULT_TARGET_WHITE,
            linear_space: false,
        }
    }
}

impl WhiteBalance {
    /// Sample around `(x, y)` and build parameters that bring that colour to the target.
    pub fn pick(&self, sampler: &mut Sampler, x: i64, y: i64) -> Result<CorrectionParams> {
        let sample = sampler.sample_region(x, y);
        let multiplier = derive_multiplier(sample, self.target, self.linear_space)?;
        log::info!(
            "White point at ({}, {}): sample {:?} -> multiplier {:?}",
            x,
            y,
            sample,
            multiplier
        );
        Ok(CorrectionParams {
            multiplier,
            bias: Rgb::ZERO,
            linear_space: self.linear_space,
        })
    }
}
