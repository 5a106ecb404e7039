use wgpu::util::DeviceExt;

use super::types::{CorrectionUniform, GpuRenderer, QUAD_VERTICES};
use crate::color::CorrectionParams;
use crate::errors::{CorrectionError, Result};

/// Format of both the source texture and the render target.
pub const SURFACE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

impl GpuRenderer {
    pub async fn new() -> Result<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| CorrectionError::UnsupportedBackend {
                message: "no suitable GPU adapter found".to_string(),
            })?;

        let adapter_info = adapter.get_info();

        // The surface is sampled as a texture, drawn into, and copied out for readback
        let format_features = adapter.get_texture_format_features(SURFACE_FORMAT);
        let required_usages = wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::RENDER_ATTACHMENT
            | wgpu::TextureUsages::COPY_SRC
            | wgpu::TextureUsages::COPY_DST;
        if !format_features.allowed_usages.contains(required_usages) {
            return Err(CorrectionError::UnsupportedTextureFormat {
                message: format!(
                    "{:?} lacks {:?} on {}",
                    SURFACE_FORMAT,
                    required_usages - format_features.allowed_usages,
                    adapter_info.name
                ),
            });
        }

        // Ask for the largest textures the adapter can do; photos are big
        let required_limits = wgpu::Limits::downlevel_defaults().using_resolution(adapter.limits());

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("whitepoint_gpu_device"),
                    required_features: wgpu::Features::empty(),
                    required_limits,
                    memory_hints: wgpu::MemoryHints::Performance,
                },
                None,
            )
            .await
            .map_err(|e| CorrectionError::UnsupportedBackend {
                message: e.to_string(),
            })?;

        // Errors we care about are captured with error scopes; anything else is logged
        // instead of taking the process down.
        device.on_uncaptured_error(Box::new(|error| {
            log::error!("Uncaptured GPU error: {}", error);
        }));

        let max_texture_dimension = device.limits().max_texture_dimension_2d;

        let (bind_group_layout, pipeline) = Self::create_correction_pipeline(&device)?;

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("correction_quad"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let uniform = CorrectionUniform::from(&CorrectionParams::default());
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("correction_params"),
            contents: bytemuck::bytes_of(&uniform),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let renderer = Self {
            device,
            queue,
            adapter_info,
            max_texture_dimension,
            bind_group_layout,
            pipeline,
            vertex_buffer,
            uniform_buffer,
            surface: None,
            released: false,
        };
        log::info!("GPU initialized: {}", renderer.adapter_summary());
        Ok(renderer)
    }

    /// Blocking constructor for synchronous callers.
    pub fn acquire() -> Result<Self> {
        pollster::block_on(Self::new())
    }
}
