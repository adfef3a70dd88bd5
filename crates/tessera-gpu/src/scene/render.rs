use glam::Mat4;

use crate::backend::Backend;
use crate::render::{CommandError, GraphicsCommandBuffer};

use super::{NodeId, Scene};

/// A `(group, slot)` binding address.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BindingSlot {
    pub group: u32,
    pub slot: u32,
}

impl BindingSlot {
    pub const fn new(group: u32, slot: u32) -> Self {
        Self { group, slot }
    }
}

/// Counters from one traversal.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct RenderStats {
    pub nodes_visited: usize,
    pub draw_calls: usize,
    /// Meshes left out because their material has no diffuse texture.
    pub meshes_skipped: usize,
}

/// Walks a scene and records one draw per textured mesh.
///
/// For each node the model-view-projection matrix goes through the dynamic
/// uniform arena at `transform`; each mesh's diffuse texture is bound at
/// `diffuse`. Anything else the pipeline declares (samplers, lights) must be
/// bound by the caller before traversal.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SceneRenderer {
    pub transform: BindingSlot,
    pub diffuse: BindingSlot,
}

impl Default for SceneRenderer {
    fn default() -> Self {
        Self {
            transform: BindingSlot::new(0, 0),
            diffuse: BindingSlot::new(0, 1),
        }
    }
}

impl SceneRenderer {
    /// Renders the whole scene starting at its root.
    pub fn render_scene<B: Backend>(
        &self,
        cmd: &mut GraphicsCommandBuffer<B>,
        scene: &Scene<B>,
        view: Mat4,
        projection: Mat4,
    ) -> Result<RenderStats, CommandError> {
        self.render_node(cmd, scene, scene.root(), Mat4::IDENTITY, view, projection)
    }

    /// Renders `node` and its subtree, with `parent_world` as the world
    /// transform of the node's parent.
    ///
    /// Parents are drawn before children, children in insertion order.
    pub fn render_node<B: Backend>(
        &self,
        cmd: &mut GraphicsCommandBuffer<B>,
        scene: &Scene<B>,
        node: NodeId,
        parent_world: Mat4,
        view: Mat4,
        projection: Mat4,
    ) -> Result<RenderStats, CommandError> {
        let mut stats = RenderStats::default();
        let view_projection = projection * view;
        self.visit(cmd, scene, node, parent_world, view_projection, &mut stats)?;
        Ok(stats)
    }

    fn visit<B: Backend>(
        &self,
        cmd: &mut GraphicsCommandBuffer<B>,
        scene: &Scene<B>,
        id: NodeId,
        parent_world: Mat4,
        view_projection: Mat4,
        stats: &mut RenderStats,
    ) -> Result<(), CommandError> {
        let Some(node) = scene.node(id) else {
            return Ok(());
        };
        stats.nodes_visited += 1;

        let world = parent_world * node.local_transform();

        if !node.meshes().is_empty() {
            let mvp = view_projection * world;
            cmd.bind_dynamic_uniform_buffer(self.transform.group, self.transform.slot, &mvp)?;
        }

        for mesh in node.meshes() {
            let Some(texture) = mesh.material().diffuse() else {
                log::trace!("node '{}': mesh without diffuse texture skipped", node.name());
                stats.meshes_skipped += 1;
                continue;
            };

            cmd.bind_texture(self.diffuse.group, self.diffuse.slot, texture.view())?;
            cmd.draw(mesh)?;
            stats.draw_calls += 1;
        }

        for &child in node.children() {
            self.visit(cmd, scene, child, world, view_projection, stats)?;
        }
        Ok(())
    }
}
