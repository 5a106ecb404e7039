use crate::color::CorrectionParams;

/// GPU renderer for the correction pass. Owns every wgpu object it creates.
#[derive(Debug)]
pub struct GpuRenderer {
    pub(crate) device: wgpu::Device,
    pub(crate) queue: wgpu::Queue,
    pub(crate) adapter_info: wgpu::AdapterInfo,
    pub(crate) max_texture_dimension: u32,
    pub(crate) bind_group_layout: wgpu::BindGroupLayout,
    pub(crate) pipeline: wgpu::RenderPipeline,
    pub(crate) vertex_buffer: wgpu::Buffer,
    pub(crate) uniform_buffer: wgpu::Buffer,
    pub(crate) surface: Option<SurfaceResources>,
    pub(crate) released: bool,
}

/// Per-image objects, created when a source is bound.
#[derive(Debug)]
pub(crate) struct SurfaceResources {
    pub source_texture: wgpu::Texture,
    pub target_texture: wgpu::Texture,
    pub target_view: wgpu::TextureView,
    pub bind_group: wgpu::BindGroup,
    pub readback_buffer: wgpu::Buffer,
    pub width: u32,
    pub height: u32,
    pub padded_bytes_per_row: u32,
}

/// Uniform block layout shared with `shaders/correction.wgsl`.
/// vec3 fields are 16-byte aligned in WGSL, so the flag and padding fill the fourth lane.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CorrectionUniform {
    pub multiplier: [f32; 3],
    pub linear_space: u32,
    pub bias: [f32; 3],
    pub _pad: u32,
}

impl From<&CorrectionParams> for CorrectionUniform {
    fn from(params: &CorrectionParams) -> Self {
        Self {
            multiplier: params.multiplier.to_array(),
            linear_space: if params.linear_space { 1 } else { 0 },
            bias: params.bias.to_array(),
            _pad: 0,
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
}

/// Two triangles covering clip space.
pub const QUAD_VERTICES: [Vertex; 6] = [
    Vertex { position: [-1.0, -1.0] },
    Vertex { position: [1.0, -1.0] },
    Vertex { position: [1.0, 1.0] },
    Vertex { position: [-1.0, -1.0] },
    Vertex { position: [1.0, 1.0] },
    Vertex { position: [-1.0, 1.0] },
];

/// Adapter description for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpuAdapterInfo {
    pub adapter_name: String,
    pub backend: String,
    pub device_type: &'static str,
    pub max_texture_dimension: u32,
}
