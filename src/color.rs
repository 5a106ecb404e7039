use serde::{Deserialize, Serialize};

use crate::errors::{CorrectionError, Result};

/// Display gamma used to move between encoded and linear light.
pub const GAMMA: f32 = 2.2;

/// A per-channel RGB triple. Used for multipliers, biases and sampled colors alike.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const ONE: Rgb = Rgb::splat(1.0);
    pub const ZERO: Rgb = Rgb::splat(0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub const fn splat(v: f32) -> Self {
        Self { r: v, g: v, b: v }
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    pub fn is_finite(&self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite()
    }

    /// Apply `f` to each channel.
    pub fn map(self, f: impl Fn(f32) -> f32) -> Self {
        Self::new(f(self.r), f(self.g), f(self.b))
    }

    /// Build a triple from loosely typed caller input, e.g. values read from UI fields.
    pub fn from_slice(values: &[f32]) -> Result<Self> {
        let [r, g, b] = values else {
            return Err(CorrectionError::invalid(format!(
                "expected 3 components, got {}",
                values.len()
            )));
        };
        let rgb = Self::new(*r, *g, *b);
        if !rgb.is_finite() {
            return Err(CorrectionError::invalid(format!(
                "components must be finite, got {:?}",
                values
            )));
        }
        Ok(rgb)
    }
}

impl From<[f32; 3]> for Rgb {
    fn from([r, g, b]: [f32; 3]) -> Self {
        Self::new(r, g, b)
    }
}

/// The full state of the correction: `out = in * multiplier + bias`, optionally in linear light.
///
/// Components are not clamped. Values outside the display range saturate at the output stage,
/// which is how over- and under-correction become visible.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrectionParams {
    pub multiplier: Rgb,
    pub bias: Rgb,
    pub linear_space: bool,
}

impl Default for CorrectionParams {
    fn default() -> Self {
        Self {
            multiplier: Rgb::ONE,
            bias: Rgb::ZERO,
            linear_space: false,
        }
    }
}

impl CorrectionParams {
    pub fn is_identity(&self) -> bool {
        self.multiplier == Rgb::ONE && self.bias == Rgb::ZERO && !self.linear_space
    }

    pub fn validate(&self) -> Result<()> {
        if !self.multiplier.is_finite() {
            return Err(CorrectionError::invalid("multiplier must be finite"));
        }
        if !self.bias.is_finite() {
            return Err(CorrectionError::invalid("bias must be finite"));
        }
        Ok(())
    }
}

/// Decode an encoded (display) value to linear light.
#[inline]
pub fn to_linear(c: f32) -> f32 {
    c.powf(GAMMA)
}

/// Encode a linear value back to display space.
#[inline]
pub fn to_encoded(lin: f32) -> f32 {
    lin.powf(1.0 / GAMMA)
}

/// The per-channel transform. Mirrors `fs_main` in `gpu/shaders/correction.wgsl`.
#[inline]
pub fn apply_channel(c: f32, multiplier: f32, bias: f32, linear_space: bool) -> f32 {
    if linear_space {
        to_encoded(to_linear(c) * multiplier + bias)
    } else {
        c * multiplier + bias
    }
}

/// Transform one encoded RGB triple. Alpha is not part of the transform.
#[inline]
pub fn apply_transform(rgb: [f32; 3], params: &CorrectionParams) -> [f32; 3] {
    let m = params.multiplier.to_array();
    let b = params.bias.to_array();
    [
        apply_channel(rgb[0], m[0], b[0], params.linear_space),
        apply_channel(rgb[1], m[1], b[1], params.linear_space),
        apply_channel(rgb[2], m[2], b[2], params.linear_space),
    ]
}

/// Output stage of an 8-bit unorm target: clamp to [0, 1], round to nearest.
/// NaN (a negative base raised to 1/2.2) stores as 0.
#[inline]
pub fn quantize(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[inline]
pub fn normalize(v: u8) -> f32 {
    v as f32 / 255.0
}
