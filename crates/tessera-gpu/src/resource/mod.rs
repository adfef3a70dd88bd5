//! Owned GPU resource handles.
//!
//! Handles wrap the backend's native object together with the creation-time
//! metadata validation needs (size, usage, format). They are created by
//! [`Device`](crate::Device) factories and shared through `Arc`.

mod buffer;
mod error;
mod sampler;
mod texture;

pub use buffer::{Buffer, BufferDesc, IndexBuffer, UniformBuffer, VertexBuffer};
pub use error::ResourceError;
pub use sampler::{Sampler, SamplerDesc};
pub use texture::{Texture, TextureDesc, TextureInfo, TextureView, TextureViewDesc};
