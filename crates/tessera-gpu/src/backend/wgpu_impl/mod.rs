//! wgpu implementation of [`Backend`].

mod encode;
mod init;
mod pipeline;

use std::sync::{Arc, Mutex, PoisonError};

use winit::window::Window;

use crate::device::{AcquireError, DeviceConfig, DeviceError, SurfaceCapabilities, SurfaceConfig};
use crate::render::{CommandList, PipelineDesc, PipelineError};
use crate::resource::{BufferDesc, SamplerDesc, TextureDesc, TextureViewDesc};

use super::{Backend, NativeLimits};

use encode::UniformArena;
pub use pipeline::WgpuPipeline;

/// Owns the wgpu instance, adapter, device, queue and (optionally) the window
/// surface.
#[derive(Debug)]
pub struct WgpuBackend {
    instance: wgpu::Instance,
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: Option<wgpu::Surface<'static>>,

    /// Swap chain image between acquire and present.
    frame: Mutex<Option<wgpu::SurfaceTexture>>,
    uniforms: Mutex<Option<UniformArena>>,
}

impl WgpuBackend {
    /// Negotiates a device able to present to `window`.
    ///
    /// Blocks on the adapter and device requests.
    pub fn new(window: Arc<Window>, config: &DeviceConfig) -> Result<Self, DeviceError> {
        pollster::block_on(init::negotiate(Some(window.into()), config))
    }

    /// Negotiates a device without a surface, for offscreen rendering.
    pub fn headless(config: &DeviceConfig) -> Result<Self, DeviceError> {
        pollster::block_on(init::negotiate(None, config))
    }

    pub fn instance(&self) -> &wgpu::Instance {
        &self.instance
    }

    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }
}

fn map_surface_error(err: wgpu::SurfaceError) -> AcquireError {
    match err {
        wgpu::SurfaceError::Timeout => AcquireError::Timeout,
        wgpu::SurfaceError::Outdated => AcquireError::Outdated,
        wgpu::SurfaceError::Lost => AcquireError::Lost,
        wgpu::SurfaceError::OutOfMemory => AcquireError::OutOfMemory,
        _ => AcquireError::Other,
    }
}

impl Backend for WgpuBackend {
    type Buffer = wgpu::Buffer;
    type Texture = wgpu::Texture;
    type TextureView = wgpu::TextureView;
    type Sampler = wgpu::Sampler;
    type Pipeline = WgpuPipeline;

    fn limits(&self) -> NativeLimits {
        let limits = self.device.limits();
        NativeLimits {
            min_uniform_buffer_offset_alignment: limits.min_uniform_buffer_offset_alignment,
            max_bind_groups: limits.max_bind_groups,
            max_color_attachments: limits.max_color_attachments,
        }
    }

    fn create_buffer(&self, desc: &BufferDesc<'_>, contents: Option<&[u8]>) -> wgpu::Buffer {
        use wgpu::util::DeviceExt;

        match contents {
            Some(contents) => self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: desc.label,
                    contents,
                    usage: desc.usage,
                }),
            None => self.device.create_buffer(&wgpu::BufferDescriptor {
                label: desc.label,
                size: desc.size,
                usage: desc.usage,
                mapped_at_creation: false,
            }),
        }
    }

    fn write_buffer(&self, buffer: &wgpu::Buffer, offset: u64, data: &[u8]) {
        self.queue.write_buffer(buffer, offset, data);
    }

    fn create_texture(&self, desc: &TextureDesc<'_>) -> wgpu::Texture {
        self.device.create_texture(&wgpu::TextureDescriptor {
            label: desc.label,
            size: wgpu::Extent3d {
                width: desc.width,
                height: desc.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: desc.mip_level_count,
            sample_count: desc.sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: desc.format,
            usage: desc.usage,
            view_formats: &[],
        })
    }

    fn write_texture(&self, texture: &wgpu::Texture, desc: &TextureDesc<'_>, data: &[u8]) {
        let block = desc.format.block_copy_size(None).unwrap_or(4);
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(block * desc.width),
                rows_per_image: Some(desc.height),
            },
            wgpu::Extent3d {
                width: desc.width,
                height: desc.height,
                depth_or_array_layers: 1,
            },
        );
    }

    fn create_texture_view(
        &self,
        texture: &wgpu::Texture,
        desc: &TextureViewDesc<'_>,
    ) -> wgpu::TextureView {
        texture.create_view(&wgpu::TextureViewDescriptor {
            label: desc.label,
            format: desc.format,
            aspect: desc.aspect,
            ..Default::default()
        })
    }

    fn create_sampler(&self, desc: &SamplerDesc<'_>) -> wgpu::Sampler {
        self.device.create_sampler(&wgpu::SamplerDescriptor {
            label: desc.label,
            address_mode_u: desc.address_mode,
            address_mode_v: desc.address_mode,
            address_mode_w: desc.address_mode,
            mag_filter: desc.mag_filter,
            min_filter: desc.min_filter,
            lod_min_clamp: desc.lod_min_clamp,
            lod_max_clamp: desc.lod_max_clamp,
            compare: desc.compare,
            ..Default::default()
        })
    }

    fn create_pipeline(&self, desc: &PipelineDesc) -> Result<WgpuPipeline, PipelineError> {
        Ok(pipeline::create_pipeline(&self.device, desc))
    }

    fn submit(&self, commands: &CommandList<Self>) {
        self.encode(commands);
    }

    fn poll(&self) {
        if let Err(e) = self.device.poll(wgpu::PollType::Poll) {
            log::warn!("device poll failed: {e}");
        }
    }

    fn surface_capabilities(&self) -> Option<SurfaceCapabilities> {
        let caps = self.surface.as_ref()?.get_capabilities(&self.adapter);
        Some(SurfaceCapabilities {
            formats: caps.formats,
            present_modes: caps.present_modes,
            alpha_modes: caps.alpha_modes,
        })
    }

    fn configure_surface(&self, config: &SurfaceConfig) {
        let Some(surface) = &self.surface else {
            log::warn!("configure_surface on a headless backend");
            return;
        };

        // Any held image belongs to the old configuration.
        self.frame
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        surface.configure(
            &self.device,
            &wgpu::SurfaceConfiguration {
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                format: config.format,
                width: config.width,
                height: config.height,
                present_mode: config.present_mode,
                alpha_mode: config.alpha_mode,
                view_formats: vec![],
                desired_maximum_frame_latency: config.desired_maximum_frame_latency,
            },
        );
    }

    fn acquire_surface_view(&self) -> Result<wgpu::TextureView, AcquireError> {
        let Some(surface) = &self.surface else {
            return Err(AcquireError::Other);
        };

        let frame = surface.get_current_texture().map_err(map_surface_error)?;
        if frame.suboptimal {
            // Dropping the texture discards it unpresented.
            return Err(AcquireError::Suboptimal);
        }

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        *self.frame.lock().unwrap_or_else(PoisonError::into_inner) = Some(frame);
        Ok(view)
    }

    fn present_surface(&self) {
        let frame = self
            .frame
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(frame) = frame {
            frame.present();
        }
    }
}
