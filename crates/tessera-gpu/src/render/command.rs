use std::collections::BTreeMap;
use std::sync::Arc;

use bytemuck::Pod;
use thiserror::Error;

use crate::backend::{Backend, WgpuBackend};
use crate::resource::{Buffer, Sampler, TextureView, UniformBuffer};
use crate::scene::Mesh;

use super::pipeline::{BindingKind, GraphicsPipeline, ResourceClass};
use super::target::RenderTarget;

bitflags::bitflags! {
    /// Attachments cleared when the pass begins. Unset attachments are loaded.
    #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
    pub struct ClearFlags: u8 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
        const STENCIL = 1 << 2;
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum LoadAction<T> {
    Clear(T),
    Load,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("no graphics pipeline is bound")]
    NoPipeline,

    #[error("pipeline '{pipeline}' declares nothing at group {group}, slot {slot}")]
    UnknownBinding {
        pipeline: String,
        group: u32,
        slot: u32,
    },

    #[error("group {group}, slot {slot} expects a {expected}, got a {found}")]
    BindingMismatch {
        group: u32,
        slot: u32,
        expected: ResourceClass,
        found: ResourceClass,
    },

    #[error("texture bound at group {group}, slot {slot} lacks TEXTURE_BINDING usage")]
    NotSampleable { group: u32, slot: u32 },

    #[error("group {group}, slot {slot} samples {expected:?}, view provides {found:?}")]
    SampleTypeMismatch {
        group: u32,
        slot: u32,
        expected: wgpu::TextureSampleType,
        found: Option<wgpu::TextureSampleType>,
    },

    #[error("dynamic uniform at group {group}, slot {slot} is empty")]
    EmptyUniform { group: u32, slot: u32 },

    #[error("nothing bound at group {group}, slot {slot}")]
    MissingBinding { group: u32, slot: u32 },

    #[error("pipeline '{pipeline}' does not match the render target: {reason}")]
    IncompatibleTarget { pipeline: String, reason: String },

    #[error("mesh vertex stride {found} does not match pipeline stride {expected}")]
    VertexLayoutMismatch { expected: u64, found: u64 },
}

/// A resource captured for one binding address.
#[derive(Debug)]
pub enum BoundResource<B: Backend = WgpuBackend> {
    Buffer(Arc<Buffer<B>>),
    /// Slice of the recording's dynamic uniform arena.
    DynamicUniform { offset: u32, size: u64 },
    Texture(Arc<TextureView<B>>),
    Sampler(Arc<Sampler<B>>),
}

impl<B: Backend> BoundResource<B> {
    /// True when both refer to the same native object. Dynamic offsets are
    /// ignored since they are supplied per draw.
    pub fn same_object(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Buffer(a), Self::Buffer(b)) => Arc::ptr_eq(a, b),
            (Self::DynamicUniform { size: a, .. }, Self::DynamicUniform { size: b, .. }) => a == b,
            (Self::Texture(a), Self::Texture(b)) => Arc::ptr_eq(a, b),
            (Self::Sampler(a), Self::Sampler(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn dynamic_offset(&self) -> u32 {
        match self {
            Self::DynamicUniform { offset, .. } => *offset,
            _ => 0,
        }
    }
}

impl<B: Backend> Clone for BoundResource<B> {
    fn clone(&self) -> Self {
        match self {
            Self::Buffer(b) => Self::Buffer(Arc::clone(b)),
            Self::DynamicUniform { offset, size } => Self::DynamicUniform {
                offset: *offset,
                size: *size,
            },
            Self::Texture(v) => Self::Texture(Arc::clone(v)),
            Self::Sampler(s) => Self::Sampler(Arc::clone(s)),
        }
    }
}

#[derive(Debug)]
pub struct BoundEntry<B: Backend = WgpuBackend> {
    pub slot: u32,
    pub kind: BindingKind,
    pub resource: BoundResource<B>,
}

/// Resources of one bind group as seen by a single draw, ordered by slot.
#[derive(Debug)]
pub struct BoundGroup<B: Backend = WgpuBackend> {
    pub entries: Vec<BoundEntry<B>>,
}

impl<B: Backend> BoundGroup<B> {
    pub fn resource(&self, slot: u32) -> Option<&BoundResource<B>> {
        self.entries
            .iter()
            .find(|e| e.slot == slot)
            .map(|e| &e.resource)
    }

    /// Offsets for every dynamic entry, in slot order.
    pub fn dynamic_offsets(&self) -> Vec<u32> {
        self.entries
            .iter()
            .filter(|e| e.kind.has_dynamic_offset())
            .map(|e| e.resource.dynamic_offset())
            .collect()
    }

    /// Whether a native bind group built for `other` can be reused for `self`.
    pub fn same_objects(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .zip(&other.entries)
                .all(|(a, b)| a.slot == b.slot && a.resource.same_object(&b.resource))
    }
}

/// Everything one draw needs, captured when `draw` was called.
#[derive(Debug)]
pub struct DrawCall<B: Backend = WgpuBackend> {
    pub pipeline: Arc<GraphicsPipeline<B>>,
    pub groups: Vec<BoundGroup<B>>,
    pub mesh: Arc<Mesh<B>>,
}

impl<B: Backend> DrawCall<B> {
    pub fn is_indexed(&self) -> bool {
        self.mesh.index_buffer().is_some()
    }

    /// Number of indices or vertices drawn.
    pub fn element_count(&self) -> u32 {
        self.mesh.element_count()
    }
}

/// A finished recording, ready for the backend to encode.
#[derive(Debug)]
pub struct CommandList<B: Backend = WgpuBackend> {
    pub label: String,
    pub target: RenderTarget<B>,
    pub color_load: LoadAction<wgpu::Color>,
    pub depth_load: LoadAction<f32>,
    pub stencil_load: LoadAction<u32>,
    pub draws: Vec<DrawCall<B>>,
    /// Uniform data referenced by `BoundResource::DynamicUniform` offsets.
    pub dynamic_uniforms: Vec<u8>,
}

/// Records a single render pass.
///
/// A pipeline must be bound before anything else. Bindings are staged per
/// `(group, slot)` and snapshotted into each draw, so rebinding between draws
/// never affects draws already recorded. Failed calls record nothing.
#[derive(Debug)]
pub struct GraphicsCommandBuffer<B: Backend = WgpuBackend> {
    label: String,
    target: RenderTarget<B>,
    color_load: LoadAction<wgpu::Color>,
    depth_load: LoadAction<f32>,
    stencil_load: LoadAction<u32>,

    pipeline: Option<Arc<GraphicsPipeline<B>>>,
    staged: BTreeMap<(u32, u32), BoundResource<B>>,

    draws: Vec<DrawCall<B>>,
    dynamic_uniforms: Vec<u8>,
    uniform_alignment: usize,
}

impl<B: Backend> GraphicsCommandBuffer<B> {
    pub(crate) fn new(
        target: RenderTarget<B>,
        clear: ClearFlags,
        clear_color: wgpu::Color,
        clear_depth: f32,
        uniform_alignment: u32,
    ) -> Self {
        let load = |flag: ClearFlags| clear.contains(flag);

        Self {
            label: "graphics command buffer".to_owned(),
            target,
            color_load: if load(ClearFlags::COLOR) {
                LoadAction::Clear(clear_color)
            } else {
                LoadAction::Load
            },
            depth_load: if load(ClearFlags::DEPTH) {
                LoadAction::Clear(clear_depth)
            } else {
                LoadAction::Load
            },
            stencil_load: if load(ClearFlags::STENCIL) {
                LoadAction::Clear(0)
            } else {
                LoadAction::Load
            },
            pipeline: None,
            staged: BTreeMap::new(),
            draws: Vec::new(),
            dynamic_uniforms: Vec::new(),
            uniform_alignment: uniform_alignment.max(1) as usize,
        }
    }

    /// Sets the label used for the native pass and in diagnostics.
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn target(&self) -> &RenderTarget<B> {
        &self.target
    }

    pub fn pipeline(&self) -> Option<&Arc<GraphicsPipeline<B>>> {
        self.pipeline.as_ref()
    }

    pub fn draws(&self) -> &[DrawCall<B>] {
        &self.draws
    }

    pub fn draw_count(&self) -> usize {
        self.draws.len()
    }

    pub fn dynamic_uniform_bytes(&self) -> &[u8] {
        &self.dynamic_uniforms
    }

    pub fn color_load(&self) -> LoadAction<wgpu::Color> {
        self.color_load
    }

    pub fn depth_load(&self) -> LoadAction<f32> {
        self.depth_load
    }

    /// Binds `pipeline` for subsequent draws and drops all staged bindings.
    pub fn set_graphics_pipeline(
        &mut self,
        pipeline: &Arc<GraphicsPipeline<B>>,
    ) -> Result<(), CommandError> {
        let incompatible = |reason: String| CommandError::IncompatibleTarget {
            pipeline: pipeline.label().to_owned(),
            reason,
        };

        let colors = self.target.color_formats();
        if pipeline.color_formats() != colors {
            let reason = format!(
                "color targets {:?}, attachments {:?}",
                pipeline.color_formats(),
                colors
            );
            return self.fail(incompatible(reason));
        }

        let depth = self.target.depth_format();
        if pipeline.depth_format() != depth {
            let reason = format!(
                "depth format {:?}, attachment {:?}",
                pipeline.depth_format(),
                depth
            );
            return self.fail(incompatible(reason));
        }

        let samples = pipeline.desc().sample_count;
        if self.target.sample_count() != Some(samples) {
            let reason = format!(
                "sample count {samples}, attachments {:?}",
                self.target.sample_count()
            );
            return self.fail(incompatible(reason));
        }

        self.pipeline = Some(Arc::clone(pipeline));
        self.staged.clear();
        Ok(())
    }

    /// Binds a uniform or storage buffer.
    ///
    /// A plain uniform buffer may also fill a dynamic slot; it is then bound
    /// with offset zero.
    pub fn bind_buffer(
        &mut self,
        group: u32,
        slot: u32,
        buffer: &Arc<Buffer<B>>,
    ) -> Result<(), CommandError> {
        let kind = self.declared(group, slot)?;

        let usage = buffer.usage();
        let found = if usage.contains(wgpu::BufferUsages::UNIFORM) {
            ResourceClass::UniformBuffer
        } else if usage.contains(wgpu::BufferUsages::STORAGE) {
            ResourceClass::StorageBuffer
        } else {
            ResourceClass::PlainBuffer
        };

        let accepted = match kind {
            BindingKind::UniformBuffer | BindingKind::DynamicUniformBuffer => {
                usage.contains(wgpu::BufferUsages::UNIFORM)
            }
            BindingKind::StorageBuffer { .. } => usage.contains(wgpu::BufferUsages::STORAGE),
            BindingKind::Texture { .. } | BindingKind::Sampler { .. } => false,
        };
        if !accepted {
            return self.mismatch(group, slot, kind, found);
        }

        self.stage(group, slot, BoundResource::Buffer(Arc::clone(buffer)));
        Ok(())
    }

    pub fn bind_uniform_buffer(
        &mut self,
        group: u32,
        slot: u32,
        buffer: &UniformBuffer<B>,
    ) -> Result<(), CommandError> {
        self.bind_buffer(group, slot, buffer.buffer())
    }

    pub fn bind_texture(
        &mut self,
        group: u32,
        slot: u32,
        view: &Arc<TextureView<B>>,
    ) -> Result<(), CommandError> {
        let kind = self.declared(group, slot)?;
        let BindingKind::Texture { sample_type } = kind else {
            return self.mismatch(group, slot, kind, ResourceClass::Texture);
        };
        if !view.usage().contains(wgpu::TextureUsages::TEXTURE_BINDING) {
            return self.fail(CommandError::NotSampleable { group, slot });
        }
        let found = view_sample_type(view);
        if !found.is_some_and(|found| sample_type_accepts(sample_type, found)) {
            return self.fail(CommandError::SampleTypeMismatch {
                group,
                slot,
                expected: sample_type,
                found,
            });
        }

        self.stage(group, slot, BoundResource::Texture(Arc::clone(view)));
        Ok(())
    }

    pub fn bind_sampler(
        &mut self,
        group: u32,
        slot: u32,
        sampler: &Arc<Sampler<B>>,
    ) -> Result<(), CommandError> {
        let kind = self.declared(group, slot)?;
        if !matches!(kind, BindingKind::Sampler { .. }) {
            return self.mismatch(group, slot, kind, ResourceClass::Sampler);
        }

        self.stage(group, slot, BoundResource::Sampler(Arc::clone(sampler)));
        Ok(())
    }

    /// Copies `value` into the recording's uniform arena and binds it.
    ///
    /// Each call gets its own offset, aligned to the device's minimum uniform
    /// offset alignment, so per-draw values never overwrite each other.
    pub fn bind_dynamic_uniform_buffer<T: Pod>(
        &mut self,
        group: u32,
        slot: u32,
        value: &T,
    ) -> Result<(), CommandError> {
        let kind = self.declared(group, slot)?;
        if kind != BindingKind::DynamicUniformBuffer {
            return self.mismatch(group, slot, kind, ResourceClass::DynamicUniformBuffer);
        }

        let bytes = bytemuck::bytes_of(value);
        if bytes.is_empty() {
            return self.fail(CommandError::EmptyUniform { group, slot });
        }

        let offset = self
            .dynamic_uniforms
            .len()
            .next_multiple_of(self.uniform_alignment);
        self.dynamic_uniforms.resize(offset, 0);
        self.dynamic_uniforms.extend_from_slice(bytes);

        self.stage(
            group,
            slot,
            BoundResource::DynamicUniform {
                offset: offset as u32,
                size: bytes.len() as u64,
            },
        );
        Ok(())
    }

    /// Records one draw of `mesh` with the currently staged bindings.
    ///
    /// Indexed when the mesh has an index buffer. Every binding the pipeline
    /// declares must be staged.
    pub fn draw(&mut self, mesh: &Arc<Mesh<B>>) -> Result<(), CommandError> {
        let Some(pipeline) = self.pipeline.clone() else {
            return self.fail(CommandError::NoPipeline);
        };

        if let Some(expected) = pipeline.vertex_stride() {
            let found = mesh.vertex_buffer().stride();
            if expected != found {
                return self.fail(CommandError::VertexLayoutMismatch { expected, found });
            }
        }

        let layouts = &pipeline.desc().bind_group_layouts;
        let mut groups = Vec::with_capacity(layouts.len());
        for (group, layout) in layouts.iter().enumerate() {
            let group = group as u32;
            let mut entries = Vec::with_capacity(layout.entries.len());

            for entry in &layout.entries {
                let Some(resource) = self.staged.get(&(group, entry.slot)) else {
                    return self.fail(CommandError::MissingBinding {
                        group,
                        slot: entry.slot,
                    });
                };
                entries.push(BoundEntry {
                    slot: entry.slot,
                    kind: entry.kind,
                    resource: resource.clone(),
                });
            }

            entries.sort_by_key(|e| e.slot);
            groups.push(BoundGroup { entries });
        }

        log::trace!(
            "{}: draw #{} ({} elements)",
            self.label,
            self.draws.len(),
            mesh.element_count()
        );

        self.draws.push(DrawCall {
            pipeline,
            groups,
            mesh: Arc::clone(mesh),
        });
        Ok(())
    }

    pub(crate) fn finish(self) -> CommandList<B> {
        CommandList {
            label: self.label,
            target: self.target,
            color_load: self.color_load,
            depth_load: self.depth_load,
            stencil_load: self.stencil_load,
            draws: self.draws,
            dynamic_uniforms: self.dynamic_uniforms,
        }
    }

    /// Declared kind at `(group, slot)` of the bound pipeline.
    fn declared(&self, group: u32, slot: u32) -> Result<BindingKind, CommandError> {
        let Some(pipeline) = &self.pipeline else {
            return self.fail(CommandError::NoPipeline);
        };
        match pipeline.binding(group, slot) {
            Some(entry) => Ok(entry.kind),
            None => self.fail(CommandError::UnknownBinding {
                pipeline: pipeline.label().to_owned(),
                group,
                slot,
            }),
        }
    }

    fn stage(&mut self, group: u32, slot: u32, resource: BoundResource<B>) {
        self.staged.insert((group, slot), resource);
    }

    fn mismatch(
        &self,
        group: u32,
        slot: u32,
        kind: BindingKind,
        found: ResourceClass,
    ) -> Result<(), CommandError> {
        self.fail(CommandError::BindingMismatch {
            group,
            slot,
            expected: kind.class(),
            found,
        })
    }

    fn fail<T>(&self, err: CommandError) -> Result<T, CommandError> {
        log::error!("{}: {err}", self.label);
        Err(err)
    }
}

/// Sample type a shader sees through `view`. Depth-stencil formats are read
/// through their depth aspect.
fn view_sample_type<B: Backend>(view: &TextureView<B>) -> Option<wgpu::TextureSampleType> {
    let aspect = view
        .is_depth()
        .then_some(wgpu::TextureAspect::DepthOnly);
    view.format().sample_type(aspect, None)
}

/// Whether a texture of sample type `found` may fill a slot declared as
/// `declared`. Unfilterable float slots also take filterable floats and depth.
fn sample_type_accepts(
    declared: wgpu::TextureSampleType,
    found: wgpu::TextureSampleType,
) -> bool {
    use wgpu::TextureSampleType as T;

    match (declared, found) {
        (T::Float { filterable: true }, T::Float { filterable }) => filterable,
        (T::Float { filterable: false }, T::Float { .. } | T::Depth) => true,
        (T::Depth, T::Depth) | (T::Uint, T::Uint) | (T::Sint, T::Sint) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{AttachmentPoint, ColorTarget};
    use crate::testing::{
        color_view, depth_view, mock_device, recording, textured_mesh, textured_pipeline_desc,
        textured_target, texture_view,
    };
    use glam::Mat4;

    #[test]
    fn depth_view_is_rejected_by_filterable_texture_slot() {
        let device = mock_device();
        let (mut cmd, _) = recording(&device);
        let depth = depth_view(&device, 8, 8);

        assert_eq!(
            cmd.bind_texture(0, 1, &depth),
            Err(CommandError::SampleTypeMismatch {
                group: 0,
                slot: 1,
                expected: wgpu::TextureSampleType::Float { filterable: true },
                found: Some(wgpu::TextureSampleType::Depth),
            })
        );

        let color = texture_view(&device, 8, 8, wgpu::TextureUsages::TEXTURE_BINDING);
        assert!(cmd.bind_texture(0, 1, &color).is_ok());
    }

    #[test]
    fn sample_type_compatibility() {
        use wgpu::TextureSampleType as T;

        let filterable = T::Float { filterable: true };
        let unfilterable = T::Float { filterable: false };

        assert!(sample_type_accepts(filterable, filterable));
        assert!(!sample_type_accepts(filterable, unfilterable));
        assert!(!sample_type_accepts(filterable, T::Depth));
        assert!(sample_type_accepts(unfilterable, filterable));
        assert!(sample_type_accepts(unfilterable, T::Depth));
        assert!(sample_type_accepts(T::Depth, T::Depth));
        assert!(!sample_type_accepts(T::Uint, T::Sint));
    }

    #[test]
    fn draw_before_pipeline_is_rejected() {
        let device = mock_device();
        let mesh = textured_mesh(&device);
        let mut cmd = device
            .queue()
            .create_graphics_command_buffer(
                &textured_target(&device, 16, 16),
                ClearFlags::all(),
                wgpu::Color::BLACK,
                1.0,
            )
            .unwrap();

        assert_eq!(cmd.draw(&mesh), Err(CommandError::NoPipeline));
        assert_eq!(cmd.draw_count(), 0);

        let texture = mesh.material().diffuse().unwrap();
        assert_eq!(
            cmd.bind_texture(0, 1, texture.view()),
            Err(CommandError::NoPipeline)
        );
    }

    #[test]
    fn binding_kind_mismatch_records_nothing() {
        let device = mock_device();
        let (mut cmd, _) = recording(&device);
        let mesh = textured_mesh(&device);
        let texture = mesh.material().diffuse().unwrap();

        let err = cmd.bind_texture(0, 0, texture.view()).unwrap_err();
        assert_eq!(
            err,
            CommandError::BindingMismatch {
                group: 0,
                slot: 0,
                expected: ResourceClass::DynamicUniformBuffer,
                found: ResourceClass::Texture,
            }
        );
        assert!(matches!(
            cmd.draw(&mesh),
            Err(CommandError::MissingBinding { group: 0, slot: 0 })
        ));
    }

    #[test]
    fn unknown_slot_is_rejected() {
        let device = mock_device();
        let (mut cmd, _) = recording(&device);
        let sampler = device.create_sampler(&Default::default());

        assert!(matches!(
            cmd.bind_sampler(0, 7, &sampler),
            Err(CommandError::UnknownBinding { group: 0, slot: 7, .. })
        ));
        assert!(matches!(
            cmd.bind_sampler(3, 2, &sampler),
            Err(CommandError::UnknownBinding { group: 3, .. })
        ));
    }

    #[test]
    fn dynamic_uniforms_are_aligned() {
        let device = mock_device();
        let (mut cmd, _) = recording(&device);

        cmd.bind_dynamic_uniform_buffer(0, 0, &Mat4::IDENTITY).unwrap();
        cmd.bind_dynamic_uniform_buffer(0, 0, &Mat4::from_scale(glam::Vec3::splat(2.0)))
            .unwrap();

        // 64-byte matrices, 256-byte alignment on the mock device.
        let bytes = cmd.dynamic_uniform_bytes();
        assert_eq!(bytes.len(), 256 + 64);
        assert_eq!(&bytes[..64], bytemuck::bytes_of(&Mat4::IDENTITY));
        assert!(bytes[64..256].iter().all(|b| *b == 0));
    }

    #[test]
    fn draws_snapshot_their_bindings() {
        let device = mock_device();
        let (mut cmd, _) = recording(&device);
        let mesh = textured_mesh(&device);
        let sampler = device.create_sampler(&Default::default());
        let first = texture_view(&device, 4, 4, wgpu::TextureUsages::TEXTURE_BINDING);
        let second = texture_view(&device, 4, 4, wgpu::TextureUsages::TEXTURE_BINDING);

        cmd.bind_dynamic_uniform_buffer(0, 0, &Mat4::IDENTITY).unwrap();
        cmd.bind_texture(0, 1, &first).unwrap();
        cmd.bind_sampler(0, 2, &sampler).unwrap();
        cmd.draw(&mesh).unwrap();

        cmd.bind_dynamic_uniform_buffer(0, 0, &Mat4::IDENTITY).unwrap();
        cmd.bind_texture(0, 1, &second).unwrap();
        cmd.draw(&mesh).unwrap();

        let draws = cmd.draws();
        assert_eq!(draws.len(), 2);

        let texture_of = |draw: &DrawCall<_>| match draw.groups[0].resource(1) {
            Some(BoundResource::Texture(view)) => Arc::clone(view),
            other => panic!("unexpected binding {other:?}"),
        };
        assert!(Arc::ptr_eq(&texture_of(&draws[0]), &first));
        assert!(Arc::ptr_eq(&texture_of(&draws[1]), &second));

        assert_eq!(draws[0].groups[0].dynamic_offsets(), vec![0]);
        assert_eq!(draws[1].groups[0].dynamic_offsets(), vec![256]);
        assert!(draws[0].is_indexed());
    }

    #[test]
    fn rebinding_pipeline_resets_bindings() {
        let device = mock_device();
        let (mut cmd, pipeline) = recording(&device);
        let mesh = textured_mesh(&device);
        let sampler = device.create_sampler(&Default::default());
        let texture = mesh.material().diffuse().unwrap();

        cmd.bind_dynamic_uniform_buffer(0, 0, &Mat4::IDENTITY).unwrap();
        cmd.bind_texture(0, 1, texture.view()).unwrap();
        cmd.bind_sampler(0, 2, &sampler).unwrap();
        cmd.set_graphics_pipeline(&pipeline).unwrap();

        assert!(matches!(
            cmd.draw(&mesh),
            Err(CommandError::MissingBinding { .. })
        ));
    }

    #[test]
    fn plain_buffers_cannot_fill_uniform_slots() {
        let device = mock_device();
        let (mut cmd, _) = recording(&device);

        let vertex_only = device
            .create_buffer_init(Some("raw"), wgpu::BufferUsages::VERTEX, &[0u8; 64])
            .unwrap();
        assert_eq!(
            cmd.bind_buffer(0, 0, &vertex_only),
            Err(CommandError::BindingMismatch {
                group: 0,
                slot: 0,
                expected: ResourceClass::DynamicUniformBuffer,
                found: ResourceClass::PlainBuffer,
            })
        );

        let uniform = device.create_uniform_buffer(Some("mvp"), 64).unwrap();
        assert_eq!(cmd.bind_uniform_buffer(0, 0, &uniform), Ok(()));
    }

    #[test]
    fn pipeline_must_match_target_formats() {
        let device = mock_device();
        let pipeline = {
            let mut desc = textured_pipeline_desc();
            desc.color_targets = vec![Some(ColorTarget::opaque(wgpu::TextureFormat::Rgba16Float))];
            device.create_graphics_pipeline(desc).unwrap()
        };

        let mut cmd = device
            .queue()
            .create_graphics_command_buffer(
                &textured_target(&device, 8, 8),
                ClearFlags::COLOR,
                wgpu::Color::BLACK,
                1.0,
            )
            .unwrap();
        assert!(matches!(
            cmd.set_graphics_pipeline(&pipeline),
            Err(CommandError::IncompatibleTarget { .. })
        ));
        assert!(cmd.pipeline().is_none());

        // Color-only target against a pipeline that also writes depth.
        let mut color_only = RenderTarget::new();
        color_only
            .attach_texture(AttachmentPoint::Color0, color_view(&device, 8, 8))
            .unwrap();
        let depth_pipeline = device
            .create_graphics_pipeline(textured_pipeline_desc())
            .unwrap();
        let mut cmd = device
            .queue()
            .create_graphics_command_buffer(&color_only, ClearFlags::COLOR, wgpu::Color::BLACK, 1.0)
            .unwrap();
        assert!(cmd.set_graphics_pipeline(&depth_pipeline).is_err());
    }

    #[test]
    fn clear_flags_select_load_actions() {
        let device = mock_device();
        let target = textured_target(&device, 8, 8);
        let color = wgpu::Color {
            r: 0.4,
            g: 0.6,
            b: 0.9,
            a: 1.0,
        };

        let cmd = device
            .queue()
            .create_graphics_command_buffer(&target, ClearFlags::COLOR, color, 1.0)
            .unwrap();
        assert_eq!(cmd.color_load(), LoadAction::Clear(color));
        assert_eq!(cmd.depth_load(), LoadAction::Load);

        let cmd = device
            .queue()
            .create_graphics_command_buffer(&target, ClearFlags::DEPTH, color, 0.5)
            .unwrap();
        assert_eq!(cmd.color_load(), LoadAction::Load);
        assert_eq!(cmd.depth_load(), LoadAction::Clear(0.5));
    }
}
