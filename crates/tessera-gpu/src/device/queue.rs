use std::sync::Arc;

use bytemuck::Pod;

use crate::backend::{Backend, WgpuBackend};
use crate::render::{ClearFlags, GraphicsCommandBuffer, RenderTarget, RenderTargetError};
use crate::resource::{Buffer, ResourceError};

/// Submission endpoint of a device.
///
/// Work executes in submission order. Nothing here blocks on the GPU.
#[derive(Debug)]
pub struct Queue<B: Backend = WgpuBackend> {
    backend: Arc<B>,
    uniform_alignment: u32,
}

impl<B: Backend> Queue<B> {
    pub(crate) fn new(backend: Arc<B>) -> Self {
        let uniform_alignment = backend.limits().min_uniform_buffer_offset_alignment;
        Self {
            backend,
            uniform_alignment,
        }
    }

    /// Starts recording a render pass into `target`.
    ///
    /// Attachments selected by `clear` are cleared to `clear_color` /
    /// `clear_depth`; the others keep their contents.
    pub fn create_graphics_command_buffer(
        &self,
        target: &RenderTarget<B>,
        clear: ClearFlags,
        clear_color: wgpu::Color,
        clear_depth: f32,
    ) -> Result<GraphicsCommandBuffer<B>, RenderTargetError> {
        if target.is_empty() {
            return Err(RenderTargetError::Empty);
        }

        Ok(GraphicsCommandBuffer::new(
            target.clone(),
            clear,
            clear_color,
            clear_depth,
            self.uniform_alignment,
        ))
    }

    /// Hands a finished recording to the GPU. The recording cannot be reused.
    pub fn submit(&self, commands: GraphicsCommandBuffer<B>) {
        let list = commands.finish();
        log::trace!(
            "submit '{}': {} draws, {} uniform bytes",
            list.label,
            list.draws.len(),
            list.dynamic_uniforms.len()
        );
        self.backend.submit(&list);
    }

    /// Schedules a copy of `value` to the start of `buffer`.
    pub fn write_buffer<T: Pod>(&self, buffer: &Buffer<B>, value: &T) -> Result<(), ResourceError> {
        self.write_buffer_bytes(buffer, 0, bytemuck::bytes_of(value))
    }

    /// Schedules a copy of `data` into `buffer` at `offset`.
    ///
    /// The copy lands before any later submission. Offset and length must be
    /// multiples of 4 and the buffer must have COPY_DST usage.
    pub fn write_buffer_bytes(
        &self,
        buffer: &Buffer<B>,
        offset: u64,
        data: &[u8],
    ) -> Result<(), ResourceError> {
        let len = data.len() as u64;

        if !buffer.usage().contains(wgpu::BufferUsages::COPY_DST) {
            return Err(ResourceError::MissingUsage {
                label: buffer.label().to_owned(),
                required: wgpu::BufferUsages::COPY_DST,
            });
        }
        if offset % 4 != 0 || len % 4 != 0 {
            return Err(ResourceError::Unaligned { offset, len });
        }
        if offset.checked_add(len).is_none_or(|end| end > buffer.size()) {
            return Err(ResourceError::OutOfBounds {
                label: buffer.label().to_owned(),
                offset,
                len,
                size: buffer.size(),
            });
        }
        if data.is_empty() {
            return Ok(());
        }

        self.backend.write_buffer(buffer.native(), offset, data);
        Ok(())
    }
}
