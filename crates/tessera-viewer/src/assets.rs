//! Image and OBJ loading on top of the device factories.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use glam::{Mat4, Vec4};
use tessera_gpu::resource::TextureDesc;
use tessera_gpu::{Device, Material, Scene, Texture, TextureSlot, Vertex};

const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Decodes a PNG or JPEG file into an sRGB texture.
pub fn load_texture(device: &Device, path: &Path) -> Result<Arc<Texture>> {
    let image = image::open(path)
        .with_context(|| format!("failed to open image {}", path.display()))?
        .into_rgba8();
    let (width, height) = image.dimensions();

    let label = path.to_string_lossy();
    let desc = TextureDesc::new_2d(
        Some(label.as_ref()),
        width,
        height,
        TEXTURE_FORMAT,
        wgpu::TextureUsages::TEXTURE_BINDING,
    );
    let texture = device
        .create_texture_with_data(&desc, image.as_raw())
        .with_context(|| format!("failed to upload {}", path.display()))?;

    log::debug!("loaded texture {} ({width}x{height})", path.display());
    Ok(texture)
}

/// Two-tone checkerboard, used when a texture cannot be loaded.
pub fn checkerboard(device: &Device, size: u32, cell: u32) -> Result<Arc<Texture>> {
    let desc = TextureDesc::new_2d(
        Some("checkerboard"),
        size,
        size,
        TEXTURE_FORMAT,
        wgpu::TextureUsages::TEXTURE_BINDING,
    );
    let texture = device.create_texture_with_data(&desc, &checkerboard_pixels(size, cell))?;
    Ok(texture)
}

fn checkerboard_pixels(size: u32, cell: u32) -> Vec<u8> {
    let cell = cell.max(1);
    let mut pixels = Vec::with_capacity(size as usize * size as usize * 4);
    for y in 0..size {
        for x in 0..size {
            let light = ((x / cell) + (y / cell)) % 2 == 0;
            let v = if light { 230 } else { 40 };
            pixels.extend_from_slice(&[v, v, v, 255]);
        }
    }
    pixels
}

/// Loads an OBJ file and its MTL materials into a new scene.
///
/// Every model becomes one child of the root. Texture paths are resolved
/// relative to the OBJ file; a texture that fails to load leaves its slot
/// empty, so meshes without a diffuse map are not drawn.
pub fn load_scene(device: &Device, path: &Path) -> Result<Scene> {
    let (models, materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .with_context(|| format!("failed to load OBJ {}", path.display()))?;

    let materials = materials.unwrap_or_else(|e| {
        log::warn!("no materials for {}: {e}", path.display());
        Vec::new()
    });

    let base = path.parent().unwrap_or(Path::new(""));
    let mut textures = TextureCache::new(base);
    let materials: Vec<_> = materials
        .iter()
        .map(|mtl| Arc::new(build_material(device, &mut textures, mtl)))
        .collect();
    let fallback = device.create_material();

    let mut scene = Scene::new();
    let root = scene.root();
    for model in &models {
        if model.mesh.indices.is_empty() {
            continue;
        }

        let material = model
            .mesh
            .material_id
            .and_then(|id| materials.get(id))
            .unwrap_or(&fallback);
        let vertices = obj_vertices(&model.mesh);
        let mesh = device
            .create_mesh(
                Some(&model.name),
                &vertices,
                Some(&model.mesh.indices),
                Arc::clone(material),
            )
            .with_context(|| format!("failed to upload mesh '{}'", model.name))?;

        if let Some(node) = scene.add_child(root, &model.name, Mat4::IDENTITY) {
            scene.add_mesh(node, mesh);
        }
    }

    log::info!(
        "loaded {}: {} models, {} materials, {} textures",
        path.display(),
        models.len(),
        materials.len(),
        textures.loaded()
    );
    Ok(scene)
}

fn build_material(device: &Device, textures: &mut TextureCache, mtl: &tobj::Material) -> Material {
    let mut material = Material::new();

    let [r, g, b] = mtl.diffuse.unwrap_or([1.0; 3]);
    material.set_diffuse_color(Vec4::new(r, g, b, mtl.dissolve.unwrap_or(1.0)));

    let maps = [
        (TextureSlot::Ambient, mtl.ambient_texture.as_deref()),
        (TextureSlot::Diffuse, mtl.diffuse_texture.as_deref()),
        (TextureSlot::Specular, mtl.specular_texture.as_deref()),
        (TextureSlot::SpecularPower, mtl.shininess_texture.as_deref()),
        (TextureSlot::Normal, mtl.normal_texture.as_deref()),
        (TextureSlot::Opacity, mtl.dissolve_texture.as_deref()),
        (TextureSlot::Emissive, mtl.unknown_param.get("map_Ke").map(String::as_str)),
        (
            TextureSlot::Bump,
            mtl.unknown_param
                .get("map_bump")
                .or_else(|| mtl.unknown_param.get("bump"))
                .map(String::as_str),
        ),
    ];

    for (slot, file) in maps {
        let Some(file) = file.filter(|f| !f.is_empty()) else { continue };
        if let Some(texture) = textures.get(device, file) {
            material.set_texture(slot, texture);
        }
    }
    material
}

/// Textures shared between materials, keyed by resolved path. Failed loads
/// are remembered so each missing file is reported once.
struct TextureCache<'a> {
    base: &'a Path,
    entries: HashMap<PathBuf, Option<Arc<Texture>>>,
}

impl<'a> TextureCache<'a> {
    fn new(base: &'a Path) -> Self {
        Self {
            base,
            entries: HashMap::new(),
        }
    }

    fn get(&mut self, device: &Device, file: &str) -> Option<Arc<Texture>> {
        let path = self.base.join(file.replace('\\', "/"));
        self.entries
            .entry(path)
            .or_insert_with_key(|path| match load_texture(device, path) {
                Ok(texture) => Some(texture),
                Err(e) => {
                    log::warn!("{e:#}");
                    None
                }
            })
            .clone()
    }

    fn loaded(&self) -> usize {
        self.entries.values().filter(|t| t.is_some()).count()
    }
}

/// Interleaves a single-indexed OBJ mesh. Missing normals are zero, missing
/// texture coordinates are zero, and V is flipped to a top-left origin.
fn obj_vertices(mesh: &tobj::Mesh) -> Vec<Vertex> {
    let count = mesh.positions.len() / 3;
    (0..count)
        .map(|i| {
            let position = [
                mesh.positions[3 * i],
                mesh.positions[3 * i + 1],
                mesh.positions[3 * i + 2],
            ];
            let normal = match mesh.normals.get(3 * i..3 * i + 3) {
                Some(&[x, y, z]) => [x, y, z],
                _ => [0.0; 3],
            };
            let tex_coord = match mesh.texcoords.get(2 * i..2 * i + 2) {
                Some(&[u, v]) => [u, 1.0 - v],
                _ => [0.0; 2],
            };
            Vertex::new(position, normal, tex_coord)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkerboard_alternates_cells() {
        let pixels = checkerboard_pixels(4, 2);
        assert_eq!(pixels.len(), 4 * 4 * 4);

        let texel = |x: usize, y: usize| pixels[(y * 4 + x) * 4];
        assert_eq!(texel(0, 0), 230);
        assert_eq!(texel(1, 1), 230);
        assert_eq!(texel(2, 0), 40);
        assert_eq!(texel(0, 2), 40);
        assert_eq!(texel(3, 3), 230);
        assert!(pixels.chunks(4).all(|p| p[3] == 255));
    }

    #[test]
    fn obj_vertices_interleave_and_flip_v() {
        let mesh = tobj::Mesh {
            positions: vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0],
            normals: vec![0.0, 0.0, 1.0, 0.0, 1.0, 0.0],
            texcoords: vec![0.25, 0.0, 1.0, 0.75],
            indices: vec![0, 1, 0],
            ..Default::default()
        };

        let vertices = obj_vertices(&mesh);
        assert_eq!(vertices.len(), 2);
        assert_eq!(vertices[0], Vertex::new([0.0, 1.0, 2.0], [0.0, 0.0, 1.0], [0.25, 1.0]));
        assert_eq!(vertices[1], Vertex::new([3.0, 4.0, 5.0], [0.0, 1.0, 0.0], [1.0, 0.25]));
    }

    #[test]
    fn obj_vertices_without_normals_or_uvs() {
        let mesh = tobj::Mesh {
            positions: vec![1.0, 2.0, 3.0],
            ..Default::default()
        };

        let vertices = obj_vertices(&mesh);
        assert_eq!(vertices, vec![Vertex::new([1.0, 2.0, 3.0], [0.0; 3], [0.0; 2])]);
    }
}
