use std::collections::HashMap;
use std::sync::Arc;

use glam::Vec4;

use crate::backend::{Backend, WgpuBackend};
use crate::resource::Texture;

/// Role a texture plays in shading.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TextureSlot {
    Ambient,
    Emissive,
    Diffuse,
    Specular,
    SpecularPower,
    Normal,
    Bump,
    Opacity,
}

/// Surface appearance shared by any number of meshes.
#[derive(Debug)]
pub struct Material<B: Backend = WgpuBackend> {
    textures: HashMap<TextureSlot, Arc<Texture<B>>>,
    diffuse_color: Vec4,
}

impl<B: Backend> Material<B> {
    /// No textures, white diffuse color.
    pub fn new() -> Self {
        Self {
            textures: HashMap::new(),
            diffuse_color: Vec4::ONE,
        }
    }

    /// Assigns `texture` to `slot`, returning the previous one.
    pub fn set_texture(
        &mut self,
        slot: TextureSlot,
        texture: Arc<Texture<B>>,
    ) -> Option<Arc<Texture<B>>> {
        self.textures.insert(slot, texture)
    }

    pub fn with_texture(mut self, slot: TextureSlot, texture: Arc<Texture<B>>) -> Self {
        self.set_texture(slot, texture);
        self
    }

    pub fn remove_texture(&mut self, slot: TextureSlot) -> Option<Arc<Texture<B>>> {
        self.textures.remove(&slot)
    }

    pub fn texture(&self, slot: TextureSlot) -> Option<&Arc<Texture<B>>> {
        self.textures.get(&slot)
    }

    #[inline]
    pub fn diffuse(&self) -> Option<&Arc<Texture<B>>> {
        self.texture(TextureSlot::Diffuse)
    }

    pub fn diffuse_color(&self) -> Vec4 {
        self.diffuse_color
    }

    pub fn set_diffuse_color(&mut self, color: Vec4) {
        self.diffuse_color = color;
    }
}

impl<B: Backend> Default for Material<B> {
    fn default() -> Self {
        Self::new()
    }
}
