use image::RgbaImage;

use super::init::SURFACE_FORMAT;
use super::types::{CorrectionUniform, GpuRenderer, SurfaceResources};
use crate::backend::{BackendCapabilities, RenderBackend};
use crate::color::CorrectionParams;
use crate::errors::{CorrectionError, Result};
use crate::source::SourceImage;

/// Row pitch of a texture-to-buffer copy must be a multiple of 256 bytes.
pub(crate) fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * 4;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

fn render_error(message: impl Into<String>) -> CorrectionError {
    CorrectionError::Render {
        message: message.into(),
    }
}

impl GpuRenderer {
    fn create_surface(&self, image: &SourceImage) -> SurfaceResources {
        let (width, height) = image.dimensions();
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let source_texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("source_texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: SURFACE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &source_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            image.as_raw(),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let target_texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("render_surface"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: SURFACE_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let target_view = target_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("correction_bind_group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(
                        &source_texture.create_view(&wgpu::TextureViewDescriptor::default()),
                    ),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
            ],
        });

        let padded_bytes_per_row = padded_bytes_per_row(width);
        let readback_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("surface_readback"),
            size: padded_bytes_per_row as u64 * height as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        SurfaceResources {
            source_texture,
            target_texture,
            target_view,
            bind_group,
            readback_buffer,
            width,
            height,
            padded_bytes_per_row,
        }
    }

    fn read_surface(&self, surface: &SurfaceResources) -> Result<RgbaImage> {
        let buffer_slice = surface.readback_buffer.slice(..);
        let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |res| {
            let _ = tx.send(res);
        });
        self.device.poll(wgpu::Maintain::Wait);
        let mapped = pollster::block_on(rx.receive()).unwrap_or(Err(wgpu::BufferAsyncError));
        mapped.map_err(|e| render_error(format!("surface readback failed: {}", e)))?;

        // Strip row padding while copying out
        let unpadded = (surface.width * 4) as usize;
        let pixels = {
            let data = buffer_slice.get_mapped_range();
            let mut pixels = Vec::with_capacity(unpadded * surface.height as usize);
            for row in data.chunks_exact(surface.padded_bytes_per_row as usize) {
                pixels.extend_from_slice(&row[..unpadded]);
            }
            pixels
        };
        surface.readback_buffer.unmap();

        RgbaImage::from_raw(surface.width, surface.height, pixels)
            .ok_or_else(|| render_error("readback size does not match the surface"))
    }
}

impl RenderBackend for GpuRenderer {
    fn name(&self) -> &str {
        &self.adapter_info.name
    }

    fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities {
            max_texture_dimension: self.max_texture_dimension,
            // Core WebGPU allows any size for single-mip 2D textures
            npot_textures: true,
        }
    }

    fn upload(&mut self, image: &SourceImage) -> Result<()> {
        if self.released {
            return Err(render_error("renderer has been released"));
        }

        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let surface = self.create_surface(image);
        let validation = pollster::block_on(self.device.pop_error_scope());
        let oom = pollster::block_on(self.device.pop_error_scope());
        if let Some(error) = validation.or(oom) {
            return Err(render_error(format!("texture upload failed: {}", error)));
        }

        log::debug!(
            "Bound {}x{} source on {}",
            surface.width,
            surface.height,
            self.adapter_info.name
        );

        if let Some(old) = self.surface.replace(surface) {
            release_surface(old);
        }
        Ok(())
    }

    fn render(&mut self, params: &CorrectionParams) -> Result<RgbaImage> {
        let surface = self
            .surface
            .as_ref()
            .ok_or_else(|| render_error("no source image bound"))?;

        let _span = tracing::trace_span!("gpu_render", width = surface.width, height = surface.height).entered();

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let uniform = CorrectionUniform::from(params);
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniform));

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("correction_encoder"),
        });

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("correction_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface.target_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_pipeline(&self.pipeline);
            rpass.set_bind_group(0, &surface.bind_group, &[]);
            rpass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            rpass.draw(0..6, 0..1);
        }

        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture: &surface.target_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &surface.readback_buffer,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(surface.padded_bytes_per_row),
                    rows_per_image: Some(surface.height),
                },
            },
            wgpu::Extent3d {
                width: surface.width,
                height: surface.height,
                depth_or_array_layers: 1,
            },
        );

        self.queue.submit(Some(encoder.finish()));

        if let Some(error) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(render_error(error.to_string()));
        }

        self.read_surface(surface)
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        if let Some(surface) = self.surface.take() {
            release_surface(surface);
        }
        self.vertex_buffer.destroy();
        self.uniform_buffer.destroy();
        self.released = true;
        log::debug!("Released GPU resources on {}", self.adapter_info.name);
    }
}

fn release_surface(surface: SurfaceResources) {
    surface.source_texture.destroy();
    surface.target_texture.destroy();
    surface.readback_buffer.destroy();
}

impl Drop for GpuRenderer {
    fn drop(&mut self) {
        self.release();
    }
}
