use std::collections::HashSet;
use std::fmt;

use thiserror::Error;

use crate::backend::{Backend, WgpuBackend};

/// What a pipeline expects at one binding address.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BindingKind {
    UniformBuffer,
    /// Uniform buffer bound with a per-draw offset.
    DynamicUniformBuffer,
    StorageBuffer { read_only: bool },
    Texture { sample_type: wgpu::TextureSampleType },
    Sampler { binding_type: wgpu::SamplerBindingType },
}

impl BindingKind {
    pub fn class(self) -> ResourceClass {
        match self {
            BindingKind::UniformBuffer => ResourceClass::UniformBuffer,
            BindingKind::DynamicUniformBuffer => ResourceClass::DynamicUniformBuffer,
            BindingKind::StorageBuffer { .. } => ResourceClass::StorageBuffer,
            BindingKind::Texture { .. } => ResourceClass::Texture,
            BindingKind::Sampler { .. } => ResourceClass::Sampler,
        }
    }

    pub fn has_dynamic_offset(self) -> bool {
        matches!(self, BindingKind::DynamicUniformBuffer)
    }
}

/// Coarse resource category used in binding diagnostics.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ResourceClass {
    UniformBuffer,
    DynamicUniformBuffer,
    StorageBuffer,
    /// Buffer with neither UNIFORM nor STORAGE usage.
    PlainBuffer,
    Texture,
    Sampler,
}

impl fmt::Display for ResourceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResourceClass::UniformBuffer => "uniform buffer",
            ResourceClass::DynamicUniformBuffer => "dynamic uniform buffer",
            ResourceClass::StorageBuffer => "storage buffer",
            ResourceClass::PlainBuffer => "buffer",
            ResourceClass::Texture => "texture",
            ResourceClass::Sampler => "sampler",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BindingEntry {
    pub slot: u32,
    pub kind: BindingKind,
    pub visibility: wgpu::ShaderStages,
}

impl BindingEntry {
    pub fn new(slot: u32, kind: BindingKind, visibility: wgpu::ShaderStages) -> Self {
        Self {
            slot,
            kind,
            visibility,
        }
    }
}

/// Layout of one bind group. Entries are addressed by slot, not position.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct BindGroupLayoutDesc {
    pub entries: Vec<BindingEntry>,
}

impl BindGroupLayoutDesc {
    pub fn new(entries: Vec<BindingEntry>) -> Self {
        Self { entries }
    }

    pub fn entry(&self, slot: u32) -> Option<&BindingEntry> {
        self.entries.iter().find(|e| e.slot == slot)
    }
}

/// One vertex buffer's layout.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexLayout {
    pub stride: u64,
    pub step_mode: wgpu::VertexStepMode,
    pub attributes: Vec<wgpu::VertexAttribute>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ColorTarget {
    pub format: wgpu::TextureFormat,
    pub blend: Option<wgpu::BlendState>,
}

impl ColorTarget {
    pub fn opaque(format: wgpu::TextureFormat) -> Self {
        Self {
            format,
            blend: Some(wgpu::BlendState::REPLACE),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DepthState {
    pub format: wgpu::TextureFormat,
    pub write_enabled: bool,
    pub compare: wgpu::CompareFunction,
}

impl DepthState {
    /// Less-than test with writes on.
    pub fn less(format: wgpu::TextureFormat) -> Self {
        Self {
            format,
            write_enabled: true,
            compare: wgpu::CompareFunction::Less,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PrimitiveState {
    pub topology: wgpu::PrimitiveTopology,
    pub front_face: wgpu::FrontFace,
    pub cull_mode: Option<wgpu::Face>,
}

impl Default for PrimitiveState {
    fn default() -> Self {
        Self {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
        }
    }
}

/// Complete description of a graphics pipeline.
///
/// Filled in as one value and validated when the pipeline is created; the
/// resulting [`GraphicsPipeline`] keeps it immutable.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineDesc {
    pub label: String,
    /// WGSL source containing both entry points.
    pub shader_source: String,
    pub vertex_entry: String,
    /// `None` for depth-only pipelines.
    pub fragment_entry: Option<String>,
    pub vertex_layouts: Vec<VertexLayout>,
    /// Indexed by bind group number.
    pub bind_group_layouts: Vec<BindGroupLayoutDesc>,
    /// Indexed by color attachment; must match the render target layout.
    pub color_targets: Vec<Option<ColorTarget>>,
    pub depth: Option<DepthState>,
    pub primitive: PrimitiveState,
    pub sample_count: u32,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("pipeline '{label}' has no shader source")]
    MissingShader { label: String },

    #[error("pipeline '{label}' writes no color or depth output")]
    NoOutputs { label: String },

    #[error("pipeline '{label}' has color targets but no fragment entry point")]
    MissingFragment { label: String },

    #[error("pipeline '{label}' declares group {group}, slot {slot} twice")]
    DuplicateBinding { label: String, group: u32, slot: u32 },

    #[error("pipeline '{label}' uses vertex location {location} twice")]
    DuplicateVertexLocation { label: String, location: u32 },

    #[error("pipeline '{label}': {format:?} is not a depth format")]
    InvalidDepthFormat {
        label: String,
        format: wgpu::TextureFormat,
    },

    #[error("pipeline '{label}': {format:?} is not a color format")]
    InvalidColorFormat {
        label: String,
        format: wgpu::TextureFormat,
    },

    #[error("pipeline '{label}': unsupported sample count {count}")]
    InvalidSampleCount { label: String, count: u32 },

    #[error("pipeline '{label}' needs {count} bind groups, device allows {max}")]
    TooManyBindGroups { label: String, count: usize, max: u32 },

    #[error("native pipeline creation failed: {0}")]
    Native(String),
}

impl PipelineDesc {
    pub fn validate(&self) -> Result<(), PipelineError> {
        let label = || self.label.clone();

        if self.shader_source.trim().is_empty() || self.vertex_entry.is_empty() {
            return Err(PipelineError::MissingShader { label: label() });
        }

        let has_color = self.color_targets.iter().any(Option::is_some);
        if !has_color && self.depth.is_none() {
            return Err(PipelineError::NoOutputs { label: label() });
        }
        if has_color && self.fragment_entry.is_none() {
            return Err(PipelineError::MissingFragment { label: label() });
        }

        for target in self.color_targets.iter().flatten() {
            if target.format.is_depth_stencil_format() {
                return Err(PipelineError::InvalidColorFormat {
                    label: label(),
                    format: target.format,
                });
            }
        }
        if let Some(depth) = &self.depth {
            if !depth.format.is_depth_stencil_format() {
                return Err(PipelineError::InvalidDepthFormat {
                    label: label(),
                    format: depth.format,
                });
            }
        }

        if !matches!(self.sample_count, 1 | 4) {
            return Err(PipelineError::InvalidSampleCount {
                label: label(),
                count: self.sample_count,
            });
        }

        for (group, layout) in self.bind_group_layouts.iter().enumerate() {
            let mut seen = HashSet::new();
            for entry in &layout.entries {
                if !seen.insert(entry.slot) {
                    return Err(PipelineError::DuplicateBinding {
                        label: label(),
                        group: group as u32,
                        slot: entry.slot,
                    });
                }
            }
        }

        let mut locations = HashSet::new();
        let attributes = self.vertex_layouts.iter().flat_map(|l| &l.attributes);
        for attr in attributes {
            if !locations.insert(attr.shader_location) {
                return Err(PipelineError::DuplicateVertexLocation {
                    label: label(),
                    location: attr.shader_location,
                });
            }
        }

        Ok(())
    }
}

/// Native pipeline plus the configuration it was created from.
#[derive(Debug)]
pub struct GraphicsPipeline<B: Backend = WgpuBackend> {
    native: B::Pipeline,
    desc: PipelineDesc,
}

impl<B: Backend> GraphicsPipeline<B> {
    pub(crate) fn new(native: B::Pipeline, desc: PipelineDesc) -> Self {
        Self { native, desc }
    }

    pub fn native(&self) -> &B::Pipeline {
        &self.native
    }

    pub fn desc(&self) -> &PipelineDesc {
        &self.desc
    }

    pub fn label(&self) -> &str {
        &self.desc.label
    }

    /// Declared binding at `(group, slot)`.
    pub fn binding(&self, group: u32, slot: u32) -> Option<&BindingEntry> {
        self.desc
            .bind_group_layouts
            .get(group as usize)
            .and_then(|layout| layout.entry(slot))
    }

    /// Color formats trimmed of trailing unused targets.
    pub fn color_formats(&self) -> Vec<Option<wgpu::TextureFormat>> {
        let mut formats: Vec<_> = self
            .desc
            .color_targets
            .iter()
            .map(|t| t.map(|t| t.format))
            .collect();
        while formats.last() == Some(&None) {
            formats.pop();
        }
        formats
    }

    pub fn depth_format(&self) -> Option<wgpu::TextureFormat> {
        self.desc.depth.map(|d| d.format)
    }

    /// Stride of the first vertex buffer, if the pipeline consumes vertices.
    pub fn vertex_stride(&self) -> Option<u64> {
        self.desc.vertex_layouts.first().map(|l| l.stride)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::textured_pipeline_desc;

    #[test]
    fn textured_pipeline_is_valid() {
        assert_eq!(textured_pipeline_desc().validate(), Ok(()));
    }

    #[test]
    fn duplicate_slot_is_rejected() {
        let mut desc = textured_pipeline_desc();
        desc.bind_group_layouts[0].entries.push(BindingEntry::new(
            1,
            BindingKind::UniformBuffer,
            wgpu::ShaderStages::VERTEX,
        ));

        let err = desc.validate().unwrap_err();
        assert!(matches!(
            err,
            PipelineError::DuplicateBinding { group: 0, slot: 1, .. }
        ));
    }

    #[test]
    fn pipeline_needs_an_output() {
        let mut desc = textured_pipeline_desc();
        desc.color_targets.clear();
        desc.depth = None;
        assert!(matches!(desc.validate(), Err(PipelineError::NoOutputs { .. })));
    }

    #[test]
    fn depth_state_needs_depth_format() {
        let mut desc = textured_pipeline_desc();
        desc.depth = Some(DepthState::less(wgpu::TextureFormat::Rgba8Unorm));
        assert!(matches!(
            desc.validate(),
            Err(PipelineError::InvalidDepthFormat { .. })
        ));
    }

    #[test]
    fn color_targets_need_fragment_stage() {
        let mut desc = textured_pipeline_desc();
        desc.fragment_entry = None;
        assert!(matches!(
            desc.validate(),
            Err(PipelineError::MissingFragment { .. })
        ));
    }

    #[test]
    fn binding_kinds_map_to_classes() {
        assert!(BindingKind::DynamicUniformBuffer.has_dynamic_offset());
        assert!(!BindingKind::UniformBuffer.has_dynamic_offset());
        assert_eq!(
            BindingKind::StorageBuffer { read_only: true }.class(),
            ResourceClass::StorageBuffer
        );
        assert_eq!(ResourceClass::Texture.to_string(), "texture");
    }
}
