//! Render pass recording.
//!
//! - `target`: attachment sets a pass draws into
//! - `pipeline`: validated pipeline configuration and its binding layout
//! - `command`: the per-pass recording interface and its finished form

mod command;
mod pipeline;
mod target;

pub use command::{
    BoundEntry, BoundGroup, BoundResource, ClearFlags, CommandError, CommandList, DrawCall,
    GraphicsCommandBuffer, LoadAction,
};
pub use pipeline::{
    BindGroupLayoutDesc, BindingEntry, BindingKind, ColorTarget, DepthState, GraphicsPipeline,
    PipelineDesc, PipelineError, PrimitiveState, ResourceClass, VertexLayout,
};
pub use target::{AttachmentPoint, RenderTarget, RenderTargetError};
