use std::sync::Arc;

use bytemuck::{Pod, Zeroable};

use crate::backend::{Backend, WgpuBackend};
use crate::render::VertexLayout;
use crate::resource::{IndexBuffer, VertexBuffer};

use super::Material;

/// Vertex format shared by meshes and the pipelines that draw them.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coord: [f32; 2],
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x3, // normal
        2 => Float32x2  // tex_coord
    ];

    pub fn new(position: [f32; 3], normal: [f32; 3], tex_coord: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            tex_coord,
        }
    }

    pub fn layout() -> VertexLayout {
        VertexLayout {
            stride: size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: Self::ATTRS.to_vec(),
        }
    }
}

/// Drawable geometry plus the material it is shaded with.
#[derive(Debug)]
pub struct Mesh<B: Backend = WgpuBackend> {
    vertex_buffer: VertexBuffer<B>,
    index_buffer: Option<IndexBuffer<B>>,
    material: Arc<Material<B>>,
}

impl<B: Backend> Mesh<B> {
    pub fn new(
        vertex_buffer: VertexBuffer<B>,
        index_buffer: Option<IndexBuffer<B>>,
        material: Arc<Material<B>>,
    ) -> Self {
        Self {
            vertex_buffer,
            index_buffer,
            material,
        }
    }

    pub fn vertex_buffer(&self) -> &VertexBuffer<B> {
        &self.vertex_buffer
    }

    pub fn index_buffer(&self) -> Option<&IndexBuffer<B>> {
        self.index_buffer.as_ref()
    }

    pub fn material(&self) -> &Arc<Material<B>> {
        &self.material
    }

    /// Indices drawn when indexed, vertices otherwise.
    pub fn element_count(&self) -> u32 {
        match &self.index_buffer {
            Some(ib) => ib.index_count(),
            None => self.vertex_buffer.vertex_count(),
        }
    }
}
