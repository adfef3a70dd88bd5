use std::sync::Arc;

use glam::Mat4;
use slotmap::{SlotMap, new_key_type};

use crate::backend::{Backend, WgpuBackend};

use super::Mesh;

new_key_type! {
    /// Handle to a node in a [`Scene`].
    pub struct NodeId;
}

/// One node of the scene hierarchy.
#[derive(Debug)]
pub struct SceneNode<B: Backend = WgpuBackend> {
    name: String,
    local_transform: Mat4,
    meshes: Vec<Arc<Mesh<B>>>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl<B: Backend> SceneNode<B> {
    fn new(name: &str, local_transform: Mat4, parent: Option<NodeId>) -> Self {
        Self {
            name: name.to_owned(),
            local_transform,
            meshes: Vec::new(),
            parent,
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Transform relative to the parent node.
    pub fn local_transform(&self) -> Mat4 {
        self.local_transform
    }

    pub fn meshes(&self) -> &[Arc<Mesh<B>>] {
        &self.meshes
    }

    pub fn add_mesh(&mut self, mesh: Arc<Mesh<B>>) {
        self.meshes.push(mesh);
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in insertion order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Node arena rooted at a single root node.
///
/// World transforms are derived on demand from the chain of local transforms
/// and never cached, so editing a node is immediately visible in all of its
/// descendants.
#[derive(Debug)]
pub struct Scene<B: Backend = WgpuBackend> {
    nodes: SlotMap<NodeId, SceneNode<B>>,
    root: NodeId,
}

impl<B: Backend> Scene<B> {
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(SceneNode::new("root", Mat4::IDENTITY, None));
        Self { nodes, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode<B>> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode<B>> {
        self.nodes.get_mut(id)
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Appends a new child to `parent`. `None` if `parent` does not exist.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        name: &str,
        local_transform: Mat4,
    ) -> Option<NodeId> {
        if !self.nodes.contains_key(parent) {
            return None;
        }
        let id = self
            .nodes
            .insert(SceneNode::new(name, local_transform, Some(parent)));
        self.nodes[parent].children.push(id);
        Some(id)
    }

    /// Adds `mesh` to node `id`. Returns false if the node does not exist.
    pub fn add_mesh(&mut self, id: NodeId, mesh: Arc<Mesh<B>>) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) => {
                node.add_mesh(mesh);
                true
            }
            None => false,
        }
    }

    pub fn set_local_transform(&mut self, id: NodeId, transform: Mat4) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) => {
                node.local_transform = transform;
                true
            }
            None => false,
        }
    }

    /// Removes `id` and its whole subtree. The root cannot be removed.
    ///
    /// Returns the number of nodes removed.
    pub fn remove_node(&mut self, id: NodeId) -> usize {
        if id == self.root {
            return 0;
        }
        let Some(parent) = self.nodes.get(id).map(|n| n.parent) else {
            return 0;
        };

        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(p)) {
            parent.children.retain(|&c| c != id);
        }

        let mut removed = 0;
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.remove(next) {
                stack.extend(node.children);
                removed += 1;
            }
        }
        removed
    }

    /// Product of local transforms from the root down to `id`.
    pub fn world_transform(&self, id: NodeId) -> Option<Mat4> {
        let mut node = self.nodes.get(id)?;
        let mut world = node.local_transform;
        while let Some(parent) = node.parent.and_then(|p| self.nodes.get(p)) {
            world = parent.local_transform * world;
            node = parent;
        }
        Some(world)
    }

    /// `id` and every node below it, parents before children, children in
    /// insertion order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            let Some(node) = self.nodes.get(next) else { continue };
            out.push(next);
            stack.extend(node.children.iter().rev());
        }
        out
    }
}

impl<B: Backend> Default for Scene<B> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::MockBackend;
    use glam::{Quat, Vec3};

    fn translate(x: f32, y: f32, z: f32) -> Mat4 {
        Mat4::from_translation(Vec3::new(x, y, z))
    }

    fn approx(a: Mat4, b: Mat4) -> bool {
        a.abs_diff_eq(b, 1e-5)
    }

    #[test]
    fn world_transform_composes_root_to_node() {
        let mut scene = Scene::<MockBackend>::new();
        let root = scene.root();
        scene.set_local_transform(root, Mat4::from_scale(Vec3::splat(2.0)));

        let a = scene.add_child(root, "a", translate(1.0, 0.0, 0.0)).unwrap();
        let b = scene
            .add_child(a, "b", Mat4::from_quat(Quat::from_rotation_y(1.0)))
            .unwrap();

        let expected = Mat4::from_scale(Vec3::splat(2.0))
            * translate(1.0, 0.0, 0.0)
            * Mat4::from_quat(Quat::from_rotation_y(1.0));
        assert!(approx(scene.world_transform(b).unwrap(), expected));
    }

    #[test]
    fn unrelated_insert_leaves_world_transform_alone() {
        let mut scene = Scene::<MockBackend>::new();
        let root = scene.root();
        let a = scene.add_child(root, "a", translate(0.0, 3.0, 0.0)).unwrap();
        let b = scene.add_child(a, "b", translate(1.0, 0.0, 0.0)).unwrap();
        let before = scene.world_transform(b).unwrap();

        scene.add_child(root, "elsewhere", translate(9.0, 9.0, 9.0));
        scene.add_child(a, "sibling", translate(-4.0, 0.0, 0.0));

        assert_eq!(scene.world_transform(b).unwrap(), before);
    }

    #[test]
    fn local_edit_only_moves_descendants() {
        let mut scene = Scene::<MockBackend>::new();
        let root = scene.root();
        let a = scene.add_child(root, "a", Mat4::IDENTITY).unwrap();
        let a1 = scene.add_child(a, "a1", translate(1.0, 0.0, 0.0)).unwrap();
        let a2 = scene.add_child(a1, "a2", translate(0.0, 1.0, 0.0)).unwrap();
        let c = scene.add_child(root, "c", translate(0.0, 0.0, 5.0)).unwrap();

        let ids = [root, a, a1, a2, c];
        let before: Vec<_> = ids.iter().map(|&id| scene.world_transform(id)).collect();

        scene.set_local_transform(a, translate(10.0, 0.0, 0.0));

        let after: Vec<_> = ids.iter().map(|&id| scene.world_transform(id)).collect();
        assert_eq!(after[0], before[0]);
        assert_ne!(after[1], before[1]);
        assert_ne!(after[2], before[2]);
        assert_ne!(after[3], before[3]);
        assert_eq!(after[4], before[4]);
    }

    #[test]
    fn removing_a_node_drops_its_subtree() {
        let mut scene = Scene::<MockBackend>::new();
        let root = scene.root();
        let a = scene.add_child(root, "a", Mat4::IDENTITY).unwrap();
        let b = scene.add_child(a, "b", Mat4::IDENTITY).unwrap();
        scene.add_child(b, "c", Mat4::IDENTITY).unwrap();
        let d = scene.add_child(root, "d", Mat4::IDENTITY).unwrap();

        assert_eq!(scene.remove_node(a), 3);
        assert_eq!(scene.len(), 2);
        assert!(!scene.contains(b));
        assert_eq!(scene.node(root).unwrap().children(), &[d]);

        assert_eq!(scene.remove_node(root), 0);
        assert_eq!(scene.remove_node(a), 0);
        assert!(scene.add_child(a, "orphan", Mat4::IDENTITY).is_none());
    }

    #[test]
    fn descendants_are_depth_first_in_order() {
        let mut scene = Scene::<MockBackend>::new();
        let root = scene.root();
        let a = scene.add_child(root, "a", Mat4::IDENTITY).unwrap();
        let a1 = scene.add_child(a, "a1", Mat4::IDENTITY).unwrap();
        let b = scene.add_child(root, "b", Mat4::IDENTITY).unwrap();

        assert_eq!(scene.descendants(root), vec![root, a, a1, b]);
        assert_eq!(scene.descendants(a), vec![a, a1]);
    }
}
