use std::sync::Arc;

use bytemuck::Pod;
use winit::window::Window;

use crate::backend::{Backend, WgpuBackend};
use crate::render::{GraphicsPipeline, PipelineDesc, PipelineError};
use crate::resource::{
    Buffer, BufferDesc, IndexBuffer, ResourceError, Sampler, SamplerDesc, Texture, TextureDesc,
    TextureView, TextureViewDesc, UniformBuffer, VertexBuffer,
};
use crate::scene::{Material, Mesh, Vertex, cube_geometry};

use super::{DeviceConfig, DeviceError, Queue, Surface};

/// Explicit GPU context.
///
/// Owns the backend, the queue and (when created for a window) the surface.
/// Every other resource is created through it. There is no global instance;
/// pass the device to whatever needs it.
#[derive(Debug)]
pub struct Device<B: Backend = WgpuBackend> {
    backend: Arc<B>,
    queue: Queue<B>,
    surface: Option<Surface<B>>,
}

impl Device<WgpuBackend> {
    /// Negotiates adapter and device for `window` and configures its surface.
    ///
    /// Blocks until the adapter and device requests resolve.
    pub fn create(window: Arc<Window>, config: DeviceConfig) -> Result<Self, DeviceError> {
        let size = window.inner_size();
        let backend = WgpuBackend::new(window, &config)?;
        Self::with_surface(backend, size.width, size.height, &config)
    }
}

impl<B: Backend> Device<B> {
    /// Device without a presentable surface.
    pub fn headless(backend: B) -> Self {
        let backend = Arc::new(backend);
        Self {
            queue: Queue::new(Arc::clone(&backend)),
            backend,
            surface: None,
        }
    }

    /// Device whose backend owns a surface; configures it at `width` x `height`.
    pub fn with_surface(
        backend: B,
        width: u32,
        height: u32,
        config: &DeviceConfig,
    ) -> Result<Self, DeviceError> {
        let capabilities = backend
            .surface_capabilities()
            .ok_or(DeviceError::NoSurface)?;

        let mut device = Self::headless(backend);
        let surface = Surface::new(
            Arc::clone(&device.backend),
            capabilities,
            width,
            height,
            config,
        )?;
        device.surface = Some(surface);
        Ok(device)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn queue(&self) -> &Queue<B> {
        &self.queue
    }

    pub fn surface(&self) -> Option<&Surface<B>> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut Surface<B>> {
        self.surface.as_mut()
    }

    /// Drains finished GPU work and fires completion callbacks. Call once per
    /// frame.
    pub fn poll(&self) {
        self.backend.poll();
    }

    // ── buffers ──────────────────────────────────────────────────────────

    pub fn create_buffer(&self, desc: &BufferDesc<'_>) -> Result<Arc<Buffer<B>>, ResourceError> {
        if desc.size == 0 {
            return Err(zero_size(desc.label));
        }
        let native = self.backend.create_buffer(desc, None);
        Ok(Arc::new(Buffer::from_native(native, desc)))
    }

    /// Buffer initialized with `contents`.
    pub fn create_buffer_init(
        &self,
        label: Option<&str>,
        usage: wgpu::BufferUsages,
        contents: &[u8],
    ) -> Result<Arc<Buffer<B>>, ResourceError> {
        self.buffer_with_contents(label, usage, contents).map(Arc::new)
    }

    fn buffer_with_contents(
        &self,
        label: Option<&str>,
        usage: wgpu::BufferUsages,
        contents: &[u8],
    ) -> Result<Buffer<B>, ResourceError> {
        if contents.is_empty() {
            return Err(zero_size(label));
        }
        let desc = BufferDesc {
            label,
            size: contents.len() as u64,
            usage,
        };
        let native = self.backend.create_buffer(&desc, Some(contents));
        Ok(Buffer::from_native(native, &desc))
    }

    pub fn create_vertex_buffer<V: Pod>(
        &self,
        label: Option<&str>,
        vertices: &[V],
    ) -> Result<VertexBuffer<B>, ResourceError> {
        let buffer = self.buffer_with_contents(
            label,
            wgpu::BufferUsages::VERTEX,
            bytemuck::cast_slice(vertices),
        )?;
        Ok(VertexBuffer::new(
            buffer,
            vertices.len() as u32,
            size_of::<V>() as u64,
        ))
    }

    /// 32-bit index buffer.
    pub fn create_index_buffer(
        &self,
        label: Option<&str>,
        indices: &[u32],
    ) -> Result<IndexBuffer<B>, ResourceError> {
        let buffer = self.buffer_with_contents(
            label,
            wgpu::BufferUsages::INDEX,
            bytemuck::cast_slice(indices),
        )?;
        Ok(IndexBuffer::new(
            buffer,
            indices.len() as u32,
            wgpu::IndexFormat::Uint32,
        ))
    }

    /// 16-bit index buffer. Padded to a 4-byte multiple for upload.
    pub fn create_index_buffer_u16(
        &self,
        label: Option<&str>,
        indices: &[u16],
    ) -> Result<IndexBuffer<B>, ResourceError> {
        let mut bytes = bytemuck::cast_slice::<u16, u8>(indices).to_vec();
        bytes.resize(bytes.len().next_multiple_of(4), 0);

        let buffer = self.buffer_with_contents(label, wgpu::BufferUsages::INDEX, &bytes)?;
        Ok(IndexBuffer::new(
            buffer,
            indices.len() as u32,
            wgpu::IndexFormat::Uint16,
        ))
    }

    /// Uniform buffer of `size` bytes, writable through the queue.
    pub fn create_uniform_buffer(
        &self,
        label: Option<&str>,
        size: u64,
    ) -> Result<UniformBuffer<B>, ResourceError> {
        let desc = BufferDesc {
            label,
            size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        };
        if size == 0 {
            return Err(zero_size(label));
        }
        let native = self.backend.create_buffer(&desc, None);
        Ok(UniformBuffer::new(Buffer::from_native(native, &desc)))
    }

    /// Uniform buffer holding `value`.
    pub fn create_uniform_buffer_init<T: Pod>(
        &self,
        label: Option<&str>,
        value: &T,
    ) -> Result<UniformBuffer<B>, ResourceError> {
        let buffer = self.buffer_with_contents(
            label,
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            bytemuck::bytes_of(value),
        )?;
        Ok(UniformBuffer::new(buffer))
    }

    // ── textures ─────────────────────────────────────────────────────────

    pub fn create_texture(&self, desc: &TextureDesc<'_>) -> Result<Arc<Texture<B>>, ResourceError> {
        if desc.width == 0 || desc.height == 0 || desc.mip_level_count == 0 {
            return Err(zero_size(desc.label));
        }
        let native = self.backend.create_texture(desc);
        Ok(Arc::new(self.wrap_texture(native, desc)))
    }

    /// Texture filled with tightly packed texels for mip level 0.
    ///
    /// COPY_DST is added to the requested usage.
    pub fn create_texture_with_data(
        &self,
        desc: &TextureDesc<'_>,
        data: &[u8],
    ) -> Result<Arc<Texture<B>>, ResourceError> {
        if desc.width == 0 || desc.height == 0 || desc.mip_level_count == 0 {
            return Err(zero_size(desc.label));
        }
        let expected = desc
            .data_size()
            .ok_or(ResourceError::UnsupportedFormat(desc.format))?;
        if data.len() != expected {
            return Err(ResourceError::DataSizeMismatch {
                label: desc.label.unwrap_or("texture").to_owned(),
                expected,
                found: data.len(),
            });
        }

        let desc = TextureDesc {
            usage: desc.usage | wgpu::TextureUsages::COPY_DST,
            ..*desc
        };
        let native = self.backend.create_texture(&desc);
        self.backend.write_texture(&native, &desc, data);
        Ok(Arc::new(self.wrap_texture(native, &desc)))
    }

    /// Depth attachment sized to a render target.
    pub fn create_depth_texture(
        &self,
        label: Option<&str>,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
    ) -> Result<Arc<Texture<B>>, ResourceError> {
        let desc = TextureDesc::new_2d(
            label,
            width,
            height,
            format,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        );
        self.create_texture(&desc)
    }

    /// Additional view of `texture`, e.g. a reinterpreting format.
    pub fn create_texture_view(
        &self,
        texture: &Texture<B>,
        desc: &TextureViewDesc<'_>,
    ) -> Arc<TextureView<B>> {
        let native = self.backend.create_texture_view(texture.native(), desc);
        let info = crate::resource::TextureInfo {
            format: desc.format.unwrap_or(texture.format()),
            ..texture.info()
        };
        Arc::new(TextureView::from_native(native, info))
    }

    fn wrap_texture(&self, native: B::Texture, desc: &TextureDesc<'_>) -> Texture<B> {
        let view = self
            .backend
            .create_texture_view(&native, &TextureViewDesc::default());
        let info = desc.info();
        Texture::new(
            native,
            desc.label.unwrap_or("texture"),
            info,
            TextureView::from_native(view, info),
        )
    }

    pub fn create_sampler(&self, desc: &SamplerDesc<'_>) -> Arc<Sampler<B>> {
        let native = self.backend.create_sampler(desc);
        Arc::new(Sampler::from_native(native, desc))
    }

    // ── pipelines ────────────────────────────────────────────────────────

    /// Validates `desc` and creates the native pipeline from it.
    pub fn create_graphics_pipeline(
        &self,
        desc: PipelineDesc,
    ) -> Result<Arc<GraphicsPipeline<B>>, PipelineError> {
        desc.validate()?;

        let max = self.backend.limits().max_bind_groups;
        if desc.bind_group_layouts.len() > max as usize {
            return Err(PipelineError::TooManyBindGroups {
                label: desc.label.clone(),
                count: desc.bind_group_layouts.len(),
                max,
            });
        }

        let native = self.backend.create_pipeline(&desc)?;
        log::debug!("created pipeline '{}'", desc.label);
        Ok(Arc::new(GraphicsPipeline::new(native, desc)))
    }

    // ── scene resources ──────────────────────────────────────────────────

    /// Uploads `vertices` (and `indices`, if any) into a mesh drawn with
    /// `material`.
    pub fn create_mesh(
        &self,
        label: Option<&str>,
        vertices: &[Vertex],
        indices: Option<&[u32]>,
        material: Arc<Material<B>>,
    ) -> Result<Arc<Mesh<B>>, ResourceError> {
        let vertex_buffer = self.create_vertex_buffer(label, vertices)?;
        let index_buffer = match indices {
            Some(indices) => Some(self.create_index_buffer(label, indices)?),
            None => None,
        };
        Ok(Arc::new(Mesh::new(vertex_buffer, index_buffer, material)))
    }

    /// Axis-aligned cube of edge `size` centered at the origin, with per-face
    /// normals and texture coordinates.
    pub fn create_cube(
        &self,
        size: f32,
        material: Arc<Material<B>>,
    ) -> Result<Arc<Mesh<B>>, ResourceError> {
        let (vertices, indices) = cube_geometry(size);
        self.create_mesh(Some("cube"), &vertices, Some(&indices), material)
    }

    /// Shareable material with no textures and a white diffuse color.
    pub fn create_material(&self) -> Arc<Material<B>> {
        Arc::new(Material::new())
    }
}

fn zero_size(label: Option<&str>) -> ResourceError {
    ResourceError::ZeroSize {
        label: label.unwrap_or("unnamed").to_owned(),
    }
}
