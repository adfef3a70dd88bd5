use std::path::PathBuf;

use tessera_gpu::DeviceConfig;
use tessera_gpu::logging::LoggingConfig;
use winit::dpi::LogicalSize;

/// Viewer configuration.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,

    /// OBJ scene drawn through the scene graph. `None` draws only the cube.
    pub model_path: Option<PathBuf>,
    /// Uniform scale applied to the scene root.
    pub model_scale: f32,

    /// Texture on the spinning cube. A checkerboard is used if it fails to load.
    pub texture_path: Option<PathBuf>,

    pub device: DeviceConfig,
    pub logging: LoggingConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "tessera viewer".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
            model_path: Some(PathBuf::from("assets/crytek-sponza/sponza_nobanner.obj")),
            model_scale: 0.01,
            texture_path: Some(PathBuf::from("assets/textures/webgpu.png")),
            device: DeviceConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ViewerConfig {
    /// Defaults, with the model path taken from the first argument if present.
    ///
    /// `args` excludes the program name.
    pub fn from_args(mut args: impl Iterator<Item = String>) -> Self {
        let mut config = Self::default();
        if let Some(model) = args.next() {
            config.model_path = Some(PathBuf::from(model));
        }
        config
    }
}
