//! Windowed viewer: a spinning textured cube in front of an OBJ scene.
//!
//! Usage: `tessera-viewer [model.obj]`. Escape quits, R resets the camera.

mod assets;
mod camera;
mod clock;
mod config;
mod pipeline;
mod runtime;
mod viewer;

use anyhow::Result;
use tessera_gpu::logging::init_logging;

use crate::config::ViewerConfig;
use crate::runtime::Runtime;

fn main() -> Result<()> {
    let config = ViewerConfig::from_args(std::env::args().skip(1));
    init_logging(config.logging.clone());

    log::info!("starting {}", config.title);
    Runtime::run(config)
}
