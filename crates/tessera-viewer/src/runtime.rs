use std::sync::Arc;

use anyhow::{Context, Result};
use tessera_gpu::DeviceError;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::config::ViewerConfig;
use crate::viewer::Viewer;

/// Entry point for the windowed viewer.
pub struct Runtime;

impl Runtime {
    /// Opens the window and drives frames until it is closed or Escape is
    /// pressed. Returns the error that ended the loop, if any.
    pub fn run(config: ViewerConfig) -> Result<()> {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = RuntimeState::new(config);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.fatal {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

struct RuntimeState {
    config: ViewerConfig,
    viewer: Option<Viewer>,
    fatal: Option<anyhow::Error>,
}

impl RuntimeState {
    fn new(config: ViewerConfig) -> Self {
        Self {
            config,
            viewer: None,
            fatal: None,
        }
    }

    fn create_viewer(&self, event_loop: &ActiveEventLoop) -> Result<Viewer> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        Viewer::new(Arc::new(window), &self.config)
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{error:#}");
        self.fatal = Some(error);
        event_loop.exit();
    }

    fn on_key(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        if event.state != ElementState::Pressed || event.repeat {
            return;
        }
        match event.physical_key {
            PhysicalKey::Code(KeyCode::Escape) => event_loop.exit(),
            PhysicalKey::Code(KeyCode::KeyR) => {
                if let Some(viewer) = &mut self.viewer {
                    viewer.reset_camera();
                }
            }
            _ => {}
        }
    }

    fn resize(&mut self, event_loop: &ActiveEventLoop, width: u32, height: u32) {
        let Some(viewer) = &mut self.viewer else {
            return;
        };
        match viewer.resize(width, height) {
            Ok(()) => viewer.request_redraw(),
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(viewer) = &mut self.viewer else {
            return;
        };
        let Err(e) = viewer.render() else {
            return;
        };

        // Surface-level failures cannot be recovered by trying again next frame.
        if e.downcast_ref::<DeviceError>().is_some() {
            self.fail(event_loop, e);
        } else {
            log::error!("frame failed: {e:#}");
        }
    }
}

impl ApplicationHandler for RuntimeState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.viewer.is_some() {
            return;
        }

        match self.create_viewer(event_loop) {
            Ok(viewer) => {
                viewer.request_redraw();
                self.viewer = Some(viewer);
            }
            Err(e) => self.fail(event_loop, e.context("failed to start viewer")),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw; the cube is animated.
        if let Some(viewer) = &self.viewer {
            viewer.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::KeyboardInput { event, .. } => self.on_key(event_loop, &event),

            WindowEvent::Resized(size) => self.resize(event_loop, size.width, size.height),

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(size) = self.viewer.as_ref().map(|v| v.window().inner_size()) {
                    self.resize(event_loop, size.width, size.height);
                }
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {}
        }
    }
}
