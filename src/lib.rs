//! White balance correction from a picked neutral point.
//!
//! [`Sampler`] measures the average colour around a click on the untouched source;
//! [`balance::derive_multiplier`] turns that into a per-channel gain; [`Corrector`] renders the
//! whole image through `out = in * multiplier + bias` on the GPU, or on the CPU when no GPU is
//! available.

pub mod backend;
pub mod balance;
pub mod color;
pub mod corrector;
pub mod cpu;
pub mod errors;
pub mod gpu;
pub mod logging;
pub mod sampler;
pub mod settings;
pub mod source;

pub use backend::{BackendCapabilities, RenderBackend};
pub use balance::{derive_multiplier, WhiteBalance};
pub use color::{CorrectionParams, Rgb};
pub use corrector::Corrector;
pub use cpu::CpuRenderer;
pub use errors::{CorrectionError, Result};
pub use gpu::{GpuAdapterInfo, GpuRenderer};
pub use sampler::Sampler;
pub use settings::Settings;
pub use source::SourceImage;
