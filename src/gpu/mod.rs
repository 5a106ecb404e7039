pub mod types;
pub mod init;
pub mod pipelines;
pub mod render;
pub mod info;

pub use types::{CorrectionUniform, GpuAdapterInfo, GpuRenderer};
pub use init::SURFACE_FORMAT;
