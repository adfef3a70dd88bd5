//! Scene graph and traversal.
//!
//! Nodes live in an arena owned by [`Scene`]; meshes and materials are shared
//! through `Arc` so one mesh can hang off many nodes. [`SceneRenderer`] turns a
//! subtree into draws on a [`GraphicsCommandBuffer`](crate::render::GraphicsCommandBuffer).

mod graph;
mod material;
mod mesh;
mod primitives;
mod render;

pub use graph::{NodeId, Scene, SceneNode};
pub use material::{Material, TextureSlot};
pub use mesh::{Mesh, Vertex};
pub use primitives::cube_geometry;
pub use render::{BindingSlot, RenderStats, SceneRenderer};
