use std::sync::Arc;

use crate::backend::{Backend, WgpuBackend};

/// Creation parameters for a 2D texture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureDesc<'a> {
    pub label: Option<&'a str>,
    pub width: u32,
    pub height: u32,
    pub format: wgpu::TextureFormat,
    pub usage: wgpu::TextureUsages,
    pub sample_count: u32,
    pub mip_level_count: u32,
}

impl<'a> TextureDesc<'a> {
    /// Single-sampled, single-mip 2D texture.
    pub fn new_2d(
        label: Option<&'a str>,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        usage: wgpu::TextureUsages,
    ) -> Self {
        Self {
            label,
            width,
            height,
            format,
            usage,
            sample_count: 1,
            mip_level_count: 1,
        }
    }

    pub fn info(&self) -> TextureInfo {
        TextureInfo {
            width: self.width,
            height: self.height,
            format: self.format,
            usage: self.usage,
            sample_count: self.sample_count,
        }
    }

    /// Bytes of tightly packed texel data covering mip level 0, if the format
    /// has a fixed block size.
    pub fn data_size(&self) -> Option<usize> {
        let block = self.format.block_copy_size(None)?;
        Some(block as usize * self.width as usize * self.height as usize)
    }
}

/// Metadata shared by a texture and the views created from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureInfo {
    pub width: u32,
    pub height: u32,
    pub format: wgpu::TextureFormat,
    pub usage: wgpu::TextureUsages,
    pub sample_count: u32,
}

/// View creation parameters. `None` format means the texture's own format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextureViewDesc<'a> {
    pub label: Option<&'a str>,
    pub format: Option<wgpu::TextureFormat>,
    pub aspect: wgpu::TextureAspect,
}

/// A 2D texture together with its default full-resource view.
#[derive(Debug)]
pub struct Texture<B: Backend = WgpuBackend> {
    native: B::Texture,
    label: String,
    info: TextureInfo,
    default_view: Arc<TextureView<B>>,
}

impl<B: Backend> Texture<B> {
    pub(crate) fn new(
        native: B::Texture,
        label: &str,
        info: TextureInfo,
        default_view: TextureView<B>,
    ) -> Self {
        Self {
            native,
            label: label.to_owned(),
            info,
            default_view: Arc::new(default_view),
        }
    }

    pub fn native(&self) -> &B::Texture {
        &self.native
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn info(&self) -> TextureInfo {
        self.info
    }

    pub fn size(&self) -> (u32, u32) {
        (self.info.width, self.info.height)
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.info.format
    }

    /// View covering every mip and aspect of the texture.
    pub fn view(&self) -> &Arc<TextureView<B>> {
        &self.default_view
    }
}

/// A typed window onto a texture, as consumed by render targets and bindings.
#[derive(Debug)]
pub struct TextureView<B: Backend = WgpuBackend> {
    native: B::TextureView,
    info: TextureInfo,
}

impl<B: Backend> TextureView<B> {
    pub(crate) fn from_native(native: B::TextureView, info: TextureInfo) -> Self {
        Self { native, info }
    }

    pub fn native(&self) -> &B::TextureView {
        &self.native
    }

    pub fn info(&self) -> TextureInfo {
        self.info
    }

    pub fn size(&self) -> (u32, u32) {
        (self.info.width, self.info.height)
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.info.format
    }

    pub fn sample_count(&self) -> u32 {
        self.info.sample_count
    }

    pub fn usage(&self) -> wgpu::TextureUsages {
        self.info.usage
    }

    pub fn is_depth(&self) -> bool {
        self.info.format.is_depth_stencil_format()
    }
}
