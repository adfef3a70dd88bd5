use tessera_gpu::render::{
    BindGroupLayoutDesc, BindingEntry, BindingKind, ColorTarget, DepthState, PipelineDesc,
    PrimitiveState,
};
use tessera_gpu::Vertex;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Unlit textured geometry.
///
/// Group 0: model-view-projection at 0 (dynamic uniform), albedo texture at 1,
/// sampler at 2.
pub fn texture_unlit(color_format: wgpu::TextureFormat) -> PipelineDesc {
    let group0 = BindGroupLayoutDesc::new(vec![
        BindingEntry::new(
            0,
            BindingKind::DynamicUniformBuffer,
            wgpu::ShaderStages::VERTEX,
        ),
        BindingEntry::new(
            1,
            BindingKind::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
            },
            wgpu::ShaderStages::FRAGMENT,
        ),
        BindingEntry::new(
            2,
            BindingKind::Sampler {
                binding_type: wgpu::SamplerBindingType::Filtering,
            },
            wgpu::ShaderStages::FRAGMENT,
        ),
    ]);

    PipelineDesc {
        label: "texture unlit".to_owned(),
        shader_source: include_str!("shaders/texture_unlit.wgsl").to_owned(),
        vertex_entry: "vs_main".to_owned(),
        fragment_entry: Some("fs_main".to_owned()),
        vertex_layouts: vec![Vertex::layout()],
        bind_group_layouts: vec![group0],
        color_targets: vec![Some(ColorTarget::opaque(color_format))],
        depth: Some(DepthState::less(DEPTH_FORMAT)),
        // OBJ scenes are not reliably wound, so both faces are drawn.
        primitive: PrimitiveState {
            cull_mode: None,
            ..PrimitiveState::default()
        },
        sample_count: 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_matches_shader_bindings() {
        let desc = texture_unlit(wgpu::TextureFormat::Bgra8UnormSrgb);
        assert!(desc.validate().is_ok());

        let group = &desc.bind_group_layouts[0];
        assert!(matches!(
            group.entry(0).map(|e| e.kind),
            Some(BindingKind::DynamicUniformBuffer)
        ));
        assert!(matches!(group.entry(1).map(|e| e.kind), Some(BindingKind::Texture { .. })));
        assert!(matches!(group.entry(2).map(|e| e.kind), Some(BindingKind::Sampler { .. })));
        assert!(desc.shader_source.contains("@group(0) @binding(2)"));
    }
}
