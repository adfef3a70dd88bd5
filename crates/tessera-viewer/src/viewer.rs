use std::sync::Arc;

use anyhow::{Context, Result};
use glam::{Mat4, Quat, Vec3};
use tessera_gpu::resource::SamplerDesc;
use tessera_gpu::{
    AttachmentPoint, Backend, ClearFlags, Device, GraphicsPipeline, Material, Mesh, RenderTarget,
    Sampler, Scene, SceneRenderer, Texture, TextureSlot, UniformBuffer,
};
use winit::window::Window;

use crate::assets;
use crate::camera::Camera;
use crate::clock::{FpsCounter, FrameClock};
use crate::config::ViewerConfig;
use crate::pipeline::{self, DEPTH_FORMAT};

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.4,
    g: 0.6,
    b: 0.9,
    a: 1.0,
};

const CAMERA_POSITION: Vec3 = Vec3::new(7.5, 2.0, 0.0);
const CAMERA_ROTATION: Vec3 = Vec3::new(0.0, 80.0, 0.0);

/// Cube spin rate in degrees per second.
const CUBE_SPIN: f32 = 90.0;

/// Everything one window draws: a spinning textured cube plus the loaded scene.
pub struct Viewer {
    window: Arc<Window>,
    device: Device,

    pipeline: Arc<GraphicsPipeline>,
    sampler: Arc<Sampler>,
    depth: Arc<Texture>,

    cube: Arc<Mesh>,
    cube_texture: Arc<Texture>,
    cube_mvp: UniformBuffer,

    scene: Scene,
    scene_renderer: SceneRenderer,

    camera: Camera,
    clock: FrameClock,
    fps: FpsCounter,
}

impl Viewer {
    pub fn new(window: Arc<Window>, config: &ViewerConfig) -> Result<Self> {
        let device = Device::create(Arc::clone(&window), config.device.clone())
            .context("failed to create GPU device")?;

        let surface = device.surface().context("device has no surface")?;
        let (width, height) = surface.size();

        let pipeline = device
            .create_graphics_pipeline(pipeline::texture_unlit(surface.format()))
            .context("failed to create texture unlit pipeline")?;

        let sampler = device.create_sampler(&SamplerDesc {
            label: Some("linear repeat"),
            ..SamplerDesc::default()
        });

        let depth = device.create_depth_texture(Some("depth"), width, height, DEPTH_FORMAT)?;

        let cube_texture = match &config.texture_path {
            Some(path) => assets::load_texture(&device, path).or_else(|e| {
                log::warn!("{e:#}; using checkerboard");
                assets::checkerboard(&device, 256, 32)
            })?,
            None => assets::checkerboard(&device, 256, 32)?,
        };
        let cube_material =
            Material::new().with_texture(TextureSlot::Diffuse, Arc::clone(&cube_texture));
        let cube = device.create_cube(2.0, Arc::new(cube_material))?;
        let cube_mvp = device.create_uniform_buffer(Some("cube mvp"), size_of::<Mat4>() as u64)?;

        let mut scene = match &config.model_path {
            Some(path) => assets::load_scene(&device, path).unwrap_or_else(|e| {
                log::warn!("{e:#}; drawing the cube only");
                Scene::new()
            }),
            None => Scene::new(),
        };
        scene.set_local_transform(scene.root(), Mat4::from_scale(Vec3::splat(config.model_scale)));

        let camera = Camera::new(
            CAMERA_POSITION,
            CAMERA_ROTATION,
            width as f32 / height as f32,
        );

        Ok(Self {
            window,
            device,
            pipeline,
            sampler,
            depth,
            cube,
            cube_texture,
            cube_mvp,
            scene,
            scene_renderer: SceneRenderer::default(),
            camera,
            clock: FrameClock::new(),
            fps: FpsCounter::default(),
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn request_redraw(&self) {
        self.window.request_redraw();
    }

    pub fn reset_camera(&mut self) {
        self.camera.reset();
        log::debug!(
            "camera reset to {} facing {}",
            self.camera.position(),
            self.camera.rotation()
        );
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        if let Some(depth) = resize_frame(&mut self.device, &mut self.camera, width, height)? {
            self.depth = depth;
        }
        Ok(())
    }

    pub fn render(&mut self) -> Result<()> {
        let time = self.clock.tick();
        if let Some(fps) = self.fps.frame(time.dt) {
            log::info!("fps: {fps}");
        }

        self.device.poll();

        let Some(surface) = self.device.surface_mut() else {
            return Ok(());
        };
        let Some(frame) = surface.get_next_texture_view()? else {
            return Ok(());
        };

        let mut target = RenderTarget::new();
        target.attach_texture(AttachmentPoint::Color0, frame)?;
        target.attach_texture(AttachmentPoint::DepthStencil, Arc::clone(self.depth.view()))?;

        let view = self.camera.view();
        let projection = self.camera.projection();

        let cube_model = Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0))
            * Mat4::from_quat(Quat::from_axis_angle(
                Vec3::ONE.normalize(),
                (time.elapsed * CUBE_SPIN).to_radians(),
            ));

        let queue = self.device.queue();
        queue.write_buffer(self.cube_mvp.buffer(), &(projection * view * cube_model))?;

        let mut cmd = queue.create_graphics_command_buffer(
            &target,
            ClearFlags::COLOR | ClearFlags::DEPTH,
            CLEAR_COLOR,
            1.0,
        )?;
        cmd.set_label("frame");
        cmd.set_graphics_pipeline(&self.pipeline)?;

        cmd.bind_uniform_buffer(0, 0, &self.cube_mvp)?;
        cmd.bind_texture(0, 1, self.cube_texture.view())?;
        cmd.bind_sampler(0, 2, &self.sampler)?;
        cmd.draw(&self.cube)?;

        let stats = self
            .scene_renderer
            .render_scene(&mut cmd, &self.scene, view, projection)?;
        log::trace!(
            "frame {}: {} nodes, {} draws, {} untextured meshes",
            time.frame_index,
            stats.nodes_visited,
            stats.draw_calls,
            stats.meshes_skipped
        );

        queue.submit(cmd);
        if let Some(surface) = self.device.surface_mut() {
            surface.present();
        }
        Ok(())
    }
}

/// Reconfigures the surface, rebuilds the depth attachment at the clamped
/// surface size and updates the projection. `None` for a headless device.
fn resize_frame<B: Backend>(
    device: &mut Device<B>,
    camera: &mut Camera,
    width: u32,
    height: u32,
) -> Result<Option<Arc<Texture<B>>>> {
    let Some(surface) = device.surface_mut() else {
        return Ok(None);
    };
    surface.resize(width, height);
    let (width, height) = surface.size();

    let depth = device.create_depth_texture(Some("depth"), width, height, DEPTH_FORMAT)?;
    camera.set_aspect(width as f32 / height as f32);
    log::debug!("projection aspect {:.3}", camera.aspect());
    Ok(Some(depth))
}

#[cfg(test)]
mod tests {
    use tessera_gpu::DeviceConfig;
    use tessera_gpu::backend::mock::MockBackend;
    use tessera_gpu::device::SurfaceCapabilities;

    use super::*;

    fn surface_device(width: u32, height: u32) -> Device<MockBackend> {
        let backend = MockBackend::with_surface(SurfaceCapabilities {
            formats: vec![wgpu::TextureFormat::Bgra8UnormSrgb],
            present_modes: vec![wgpu::PresentMode::Fifo],
            alpha_modes: vec![wgpu::CompositeAlphaMode::Opaque],
        });
        Device::with_surface(backend, width, height, &DeviceConfig::default()).unwrap()
    }

    #[test]
    fn resize_rebuilds_depth_and_aspect() {
        let mut device = surface_device(800, 600);
        let mut camera = Camera::new(CAMERA_POSITION, CAMERA_ROTATION, 800.0 / 600.0);

        let depth = resize_frame(&mut device, &mut camera, 1024, 512).unwrap().unwrap();
        assert_eq!(depth.size(), (1024, 512));
        assert_eq!(depth.format(), DEPTH_FORMAT);
        assert_eq!(camera.aspect(), 2.0);

        let state = device.backend().state();
        let last = state.surface_configs.last().unwrap();
        assert_eq!((last.width, last.height), (1024, 512));
    }

    #[test]
    fn minimized_window_gets_a_one_pixel_depth() {
        let mut device = surface_device(800, 600);
        let mut camera = Camera::new(CAMERA_POSITION, CAMERA_ROTATION, 800.0 / 600.0);

        let depth = resize_frame(&mut device, &mut camera, 0, 0).unwrap().unwrap();
        assert_eq!(depth.size(), (1, 1));
        assert_eq!(camera.aspect(), 1.0);
        assert_eq!(device.surface().unwrap().size(), (1, 1));

        let depth = resize_frame(&mut device, &mut camera, 300, 0).unwrap().unwrap();
        assert_eq!(depth.size(), (300, 1));
        assert_eq!(camera.aspect(), 300.0);
    }

    #[test]
    fn headless_resize_keeps_the_camera() {
        let mut device = Device::headless(MockBackend::new());
        let mut camera = Camera::new(CAMERA_POSITION, CAMERA_ROTATION, 1.5);

        assert!(resize_frame(&mut device, &mut camera, 640, 480).unwrap().is_none());
        assert_eq!(camera.aspect(), 1.5);
    }
}
