//! tessera GPU layer.
//!
//! Owned resource handles, render targets, single-pass command recording and a
//! small scene graph on top of wgpu. All native calls go through
//! [`backend::Backend`]; [`WgpuBackend`] drives real hardware.
//!
//! Typical frame:
//! 1. `Device::poll`
//! 2. acquire the surface view and build a `RenderTarget`
//! 3. `Queue::create_graphics_command_buffer`, bind pipeline and resources
//! 4. `SceneRenderer::render_scene`
//! 5. `Queue::submit`, then `Surface::present`

pub mod backend;
pub mod device;
pub mod logging;
pub mod render;
pub mod resource;
pub mod scene;

#[cfg(test)]
mod testing;

pub use backend::{Backend, WgpuBackend};
pub use device::{Device, DeviceConfig, DeviceError, PresentModePreference, Queue, Surface};
pub use render::{
    AttachmentPoint, ClearFlags, CommandError, GraphicsCommandBuffer, GraphicsPipeline,
    PipelineDesc, PipelineError, RenderTarget, RenderTargetError,
};
pub use resource::{
    Buffer, IndexBuffer, ResourceError, Sampler, Texture, TextureView, UniformBuffer, VertexBuffer,
};
pub use scene::{Material, Mesh, NodeId, Scene, SceneNode, SceneRenderer, TextureSlot, Vertex};
