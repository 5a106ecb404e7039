use std::fmt;

use super::types::{GpuAdapterInfo, GpuRenderer};

impl GpuRenderer {
    /// Describe the adapter this renderer runs on.
    pub fn adapter_summary(&self) -> GpuAdapterInfo {
        let device_type = match self.adapter_info.device_type {
            wgpu::DeviceType::DiscreteGpu => "discrete",
            wgpu::DeviceType::IntegratedGpu => "integrated",
            wgpu::DeviceType::VirtualGpu => "virtual",
            wgpu::DeviceType::Cpu => "software",
            wgpu::DeviceType::Other => "other",
        };
        GpuAdapterInfo {
            adapter_name: self.adapter_info.name.clone(),
            backend: self.adapter_info.backend.to_str().to_string(),
            device_type,
            max_texture_dimension: self.max_texture_dimension,
        }
    }
}

impl fmt::Display for GpuAdapterInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {}), max texture {}",
            self.adapter_name, self.backend, self.device_type, self.max_texture_dimension
        )
    }
}
