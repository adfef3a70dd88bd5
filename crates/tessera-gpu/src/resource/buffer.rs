use std::sync::Arc;

use crate::backend::{Backend, WgpuBackend};

/// Creation parameters for a raw buffer.
#[derive(Debug, Clone, Copy)]
pub struct BufferDesc<'a> {
    pub label: Option<&'a str>,
    pub size: u64,
    pub usage: wgpu::BufferUsages,
}

/// Untyped GPU buffer.
#[derive(Debug)]
pub struct Buffer<B: Backend = WgpuBackend> {
    native: B::Buffer,
    label: String,
    size: u64,
    usage: wgpu::BufferUsages,
}

impl<B: Backend> Buffer<B> {
    pub(crate) fn from_native(native: B::Buffer, desc: &BufferDesc<'_>) -> Self {
        Self {
            native,
            label: desc.label.unwrap_or("buffer").to_owned(),
            size: desc.size,
            usage: desc.usage,
        }
    }

    pub fn native(&self) -> &B::Buffer {
        &self.native
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Size in bytes as requested at creation.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn usage(&self) -> wgpu::BufferUsages {
        self.usage
    }
}

/// Buffer of vertices with a fixed stride.
#[derive(Debug)]
pub struct VertexBuffer<B: Backend = WgpuBackend> {
    buffer: Buffer<B>,
    vertex_count: u32,
    stride: u64,
}

impl<B: Backend> VertexBuffer<B> {
    pub(crate) fn new(buffer: Buffer<B>, vertex_count: u32, stride: u64) -> Self {
        Self {
            buffer,
            vertex_count,
            stride,
        }
    }

    pub fn buffer(&self) -> &Buffer<B> {
        &self.buffer
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Distance in bytes between consecutive vertices.
    pub fn stride(&self) -> u64 {
        self.stride
    }
}

/// Buffer of 16 or 32-bit indices.
#[derive(Debug)]
pub struct IndexBuffer<B: Backend = WgpuBackend> {
    buffer: Buffer<B>,
    index_count: u32,
    format: wgpu::IndexFormat,
}

impl<B: Backend> IndexBuffer<B> {
    pub(crate) fn new(buffer: Buffer<B>, index_count: u32, format: wgpu::IndexFormat) -> Self {
        Self {
            buffer,
            index_count,
            format,
        }
    }

    pub fn buffer(&self) -> &Buffer<B> {
        &self.buffer
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn format(&self) -> wgpu::IndexFormat {
        self.format
    }
}

/// Uniform block storage.
///
/// The inner buffer is reference counted so command buffers can keep it alive
/// until submission without borrowing the owner.
#[derive(Debug)]
pub struct UniformBuffer<B: Backend = WgpuBackend> {
    buffer: Arc<Buffer<B>>,
}

impl<B: Backend> UniformBuffer<B> {
    pub(crate) fn new(buffer: Buffer<B>) -> Self {
        Self {
            buffer: Arc::new(buffer),
        }
    }

    pub fn buffer(&self) -> &Arc<Buffer<B>> {
        &self.buffer
    }

    pub fn size(&self) -> u64 {
        self.buffer.size()
    }
}
