//! Native GPU seam.
//!
//! Every call that reaches the GPU goes through [`Backend`]. The handle types in
//! `resource`, `render` and `scene` are generic over it, so the same recording
//! and validation code drives wgpu in production and a recording mock in tests.

mod wgpu_impl;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

use std::fmt;

use crate::device::{AcquireError, SurfaceCapabilities, SurfaceConfig};
use crate::render::{CommandList, PipelineDesc, PipelineError};
use crate::resource::{BufferDesc, SamplerDesc, TextureDesc, TextureViewDesc};

pub use wgpu_impl::{WgpuBackend, WgpuPipeline};

/// Device limits the recording layer needs to know about.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct NativeLimits {
    /// Required alignment of dynamic uniform offsets, in bytes.
    pub min_uniform_buffer_offset_alignment: u32,
    pub max_bind_groups: u32,
    pub max_color_attachments: u32,
}

impl Default for NativeLimits {
    fn default() -> Self {
        let limits = wgpu::Limits::default();
        Self {
            min_uniform_buffer_offset_alignment: limits.min_uniform_buffer_offset_alignment,
            max_bind_groups: limits.max_bind_groups,
            max_color_attachments: limits.max_color_attachments,
        }
    }
}

/// Native object factory and submission sink.
///
/// Implementations own the native device, queue and (optionally) the presentable
/// surface. Validation happens before these methods are called; a backend may
/// assume its inputs are well-formed.
pub trait Backend: fmt::Debug + Send + Sync + Sized + 'static {
    type Buffer: fmt::Debug + Send + Sync;
    type Texture: fmt::Debug + Send + Sync;
    type TextureView: fmt::Debug + Send + Sync;
    type Sampler: fmt::Debug + Send + Sync;
    type Pipeline: fmt::Debug + Send + Sync;

    fn limits(&self) -> NativeLimits;

    /// Creates a buffer, optionally filled with `contents` at creation time.
    fn create_buffer(&self, desc: &BufferDesc<'_>, contents: Option<&[u8]>) -> Self::Buffer;
    fn write_buffer(&self, buffer: &Self::Buffer, offset: u64, data: &[u8]);

    fn create_texture(&self, desc: &TextureDesc<'_>) -> Self::Texture;

    /// Uploads tightly packed texels covering mip level 0.
    fn write_texture(&self, texture: &Self::Texture, desc: &TextureDesc<'_>, data: &[u8]);
    fn create_texture_view(
        &self,
        texture: &Self::Texture,
        desc: &TextureViewDesc<'_>,
    ) -> Self::TextureView;
    fn create_sampler(&self, desc: &SamplerDesc<'_>) -> Self::Sampler;

    fn create_pipeline(&self, desc: &PipelineDesc) -> Result<Self::Pipeline, PipelineError>;

    /// Encodes and submits one recorded command list.
    fn submit(&self, commands: &CommandList<Self>);

    /// Services completion callbacks without blocking.
    fn poll(&self);

    /// Capabilities of the presentable surface, if the backend owns one.
    fn surface_capabilities(&self) -> Option<SurfaceCapabilities>;
    fn configure_surface(&self, config: &SurfaceConfig);

    /// Acquires the next presentable image and returns a view of it.
    fn acquire_surface_view(&self) -> Result<Self::TextureView, AcquireError>;

    /// Presents the image returned by the last successful acquire.
    fn present_surface(&self);
}
