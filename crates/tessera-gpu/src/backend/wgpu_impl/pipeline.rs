use crate::render::{BindGroupLayoutDesc, BindingKind, PipelineDesc};

/// Native pipeline and the bind group layouts it was built against.
#[derive(Debug)]
pub struct WgpuPipeline {
    pub(super) pipeline: wgpu::RenderPipeline,
    pub(super) bind_group_layouts: Vec<wgpu::BindGroupLayout>,
}

impl WgpuPipeline {
    pub fn raw(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }
}

fn binding_type(kind: BindingKind) -> wgpu::BindingType {
    match kind {
        BindingKind::UniformBuffer | BindingKind::DynamicUniformBuffer => {
            wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: kind.has_dynamic_offset(),
                min_binding_size: None,
            }
        }
        BindingKind::StorageBuffer { read_only } => wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        BindingKind::Texture { sample_type } => wgpu::BindingType::Texture {
            sample_type,
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        BindingKind::Sampler { binding_type } => wgpu::BindingType::Sampler(binding_type),
    }
}

fn create_bind_group_layout(
    device: &wgpu::Device,
    label: &str,
    desc: &BindGroupLayoutDesc,
) -> wgpu::BindGroupLayout {
    let entries: Vec<wgpu::BindGroupLayoutEntry> = desc
        .entries
        .iter()
        .map(|e| wgpu::BindGroupLayoutEntry {
            binding: e.slot,
            visibility: e.visibility,
            ty: binding_type(e.kind),
            count: None,
        })
        .collect();

    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &entries,
    })
}

pub(super) fn create_pipeline(device: &wgpu::Device, desc: &PipelineDesc) -> WgpuPipeline {
    let label = desc.label.as_str();

    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(desc.shader_source.as_str().into()),
    });

    let bind_group_layouts: Vec<wgpu::BindGroupLayout> = desc
        .bind_group_layouts
        .iter()
        .map(|layout| create_bind_group_layout(device, label, layout))
        .collect();
    let layout_refs: Vec<&wgpu::BindGroupLayout> = bind_group_layouts.iter().collect();

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &layout_refs,
        immediate_size: 0,
    });

    let vertex_buffers: Vec<wgpu::VertexBufferLayout> = desc
        .vertex_layouts
        .iter()
        .map(|l| wgpu::VertexBufferLayout {
            array_stride: l.stride,
            step_mode: l.step_mode,
            attributes: &l.attributes,
        })
        .collect();

    let targets: Vec<Option<wgpu::ColorTargetState>> = desc
        .color_targets
        .iter()
        .map(|t| {
            t.map(|t| wgpu::ColorTargetState {
                format: t.format,
                blend: t.blend,
                write_mask: wgpu::ColorWrites::ALL,
            })
        })
        .collect();

    let fragment = desc
        .fragment_entry
        .as_deref()
        .map(|entry| wgpu::FragmentState {
            module: &shader,
            entry_point: Some(entry),
            compilation_options: Default::default(),
            targets: &targets,
        });

    let depth_stencil = desc.depth.map(|d| wgpu::DepthStencilState {
        format: d.format,
        depth_write_enabled: d.write_enabled,
        depth_compare: d.compare,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    });

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some(&desc.vertex_entry),
            compilation_options: Default::default(),
            buffers: &vertex_buffers,
        },
        fragment,
        primitive: wgpu::PrimitiveState {
            topology: desc.primitive.topology,
            strip_index_format: None,
            front_face: desc.primitive.front_face,
            cull_mode: desc.primitive.cull_mode,
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil,
        multisample: wgpu::MultisampleState {
            count: desc.sample_count,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview_mask: None,
        cache: None,
    });

    WgpuPipeline {
        pipeline,
        bind_group_layouts,
    }
}
