//! Shared fixtures for unit tests.

use std::sync::Arc;

use crate::backend::mock::MockBackend;
use crate::device::{Device, DeviceConfig, SurfaceCapabilities};
use crate::render::{
    AttachmentPoint, BindGroupLayoutDesc, BindingEntry, BindingKind, ClearFlags, ColorTarget,
    DepthState, GraphicsCommandBuffer, GraphicsPipeline, PipelineDesc, PrimitiveState,
    RenderTarget,
};
use crate::resource::{TextureDesc, TextureView};
use crate::scene::{Material, Mesh, TextureSlot, Vertex};

pub(crate) const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Bgra8UnormSrgb;
pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

pub(crate) fn mock_device() -> Device<MockBackend> {
    Device::headless(MockBackend::new())
}

pub(crate) fn surface_capabilities() -> SurfaceCapabilities {
    SurfaceCapabilities {
        formats: vec![wgpu::TextureFormat::Bgra8Unorm, COLOR_FORMAT],
        present_modes: vec![wgpu::PresentMode::Fifo, wgpu::PresentMode::Mailbox],
        alpha_modes: vec![wgpu::CompositeAlphaMode::Opaque],
    }
}

pub(crate) fn surface_device(width: u32, height: u32) -> Device<MockBackend> {
    let backend = MockBackend::with_surface(surface_capabilities());
    Device::with_surface(backend, width, height, &DeviceConfig::default())
        .expect("mock surface configures")
}

pub(crate) fn texture_view(
    device: &Device<MockBackend>,
    width: u32,
    height: u32,
    usage: wgpu::TextureUsages,
) -> Arc<TextureView<MockBackend>> {
    let desc = TextureDesc::new_2d(Some("fixture"), width, height, COLOR_FORMAT, usage);
    let texture = device.create_texture(&desc).expect("fixture texture");
    Arc::clone(texture.view())
}

pub(crate) fn color_view(
    device: &Device<MockBackend>,
    width: u32,
    height: u32,
) -> Arc<TextureView<MockBackend>> {
    let usage = wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING;
    texture_view(device, width, height, usage)
}

pub(crate) fn depth_view(
    device: &Device<MockBackend>,
    width: u32,
    height: u32,
) -> Arc<TextureView<MockBackend>> {
    let texture = device
        .create_depth_texture(Some("depth"), width, height, DEPTH_FORMAT)
        .expect("fixture depth texture");
    Arc::clone(texture.view())
}

/// Color + depth target matching [`textured_pipeline_desc`].
pub(crate) fn textured_target(
    device: &Device<MockBackend>,
    width: u32,
    height: u32,
) -> RenderTarget<MockBackend> {
    let mut target = RenderTarget::new();
    target
        .attach_texture(AttachmentPoint::Color0, color_view(device, width, height))
        .expect("color attachment");
    target
        .attach_texture(AttachmentPoint::DepthStencil, depth_view(device, width, height))
        .expect("depth attachment");
    target
}

/// mvp at (0, 0), diffuse texture at (0, 1), sampler at (0, 2).
pub(crate) fn textured_pipeline_desc() -> PipelineDesc {
    let layout = BindGroupLayoutDesc::new(vec![
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
        label: "textured".to_owned(),
        shader_source: "// mock shader".to_owned(),
        vertex_entry: "vs_main".to_owned(),
        fragment_entry: Some("fs_main".to_owned()),
        vertex_layouts: vec![Vertex::layout()],
        bind_group_layouts: vec![layout],
        color_targets: vec![Some(ColorTarget::opaque(COLOR_FORMAT))],
        depth: Some(DepthState::less(DEPTH_FORMAT)),
        primitive: PrimitiveState::default(),
        sample_count: 1,
    }
}

/// Unit cube whose material has a 2x2 diffuse texture.
pub(crate) fn textured_mesh(device: &Device<MockBackend>) -> Arc<Mesh<MockBackend>> {
    let desc = TextureDesc::new_2d(
        Some("diffuse"),
        2,
        2,
        wgpu::TextureFormat::Rgba8UnormSrgb,
        wgpu::TextureUsages::TEXTURE_BINDING,
    );
    let texture = device
        .create_texture_with_data(&desc, &[200; 16])
        .expect("diffuse texture");
    let material = Material::new().with_texture(TextureSlot::Diffuse, texture);
    device
        .create_cube(1.0, Arc::new(material))
        .expect("cube mesh")
}

/// Recording into a 64x64 color + depth target with the textured pipeline bound.
pub(crate) fn recording(
    device: &Device<MockBackend>,
) -> (
    GraphicsCommandBuffer<MockBackend>,
    Arc<GraphicsPipeline<MockBackend>>,
) {
    let pipeline = device
        .create_graphics_pipeline(textured_pipeline_desc())
        .expect("textured pipeline");
    let mut cmd = device
        .queue()
        .create_graphics_command_buffer(
            &textured_target(device, 64, 64),
            ClearFlags::all(),
            wgpu::Color::BLACK,
            1.0,
        )
        .expect("recording");
    cmd.set_graphics_pipeline(&pipeline)
        .expect("pipeline matches target");
    (cmd, pipeline)
}

pub(crate) fn bind_sampler(
    device: &Device<MockBackend>,
    cmd: &mut GraphicsCommandBuffer<MockBackend>,
) {
    let sampler = device.create_sampler(&Default::default());
    cmd.bind_sampler(0, 2, &sampler).expect("sampler slot");
}
