use std::sync::Arc;

use crate::backend::{Backend, WgpuBackend};
use crate::resource::{TextureInfo, TextureView};

use super::{DeviceConfig, DeviceError, PresentModePreference};

/// What the presentable surface supports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurfaceCapabilities {
    pub formats: Vec<wgpu::TextureFormat>,
    pub present_modes: Vec<wgpu::PresentMode>,
    pub alpha_modes: Vec<wgpu::CompositeAlphaMode>,
}

/// Active swap chain configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceConfig {
    pub width: u32,
    pub height: u32,
    pub format: wgpu::TextureFormat,
    pub present_mode: wgpu::PresentMode,
    pub alpha_mode: wgpu::CompositeAlphaMode,
    pub desired_maximum_frame_latency: u32,
}

/// Reason the next image could not be acquired.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AcquireError {
    Timeout,
    Outdated,
    /// Acquired, but no longer matches the surface exactly.
    Suboptimal,
    Lost,
    OutOfMemory,
    Other,
}

impl AcquireError {
    /// Whether a reconfigure and a skipped frame recovers from this.
    pub fn is_transient(self) -> bool {
        !matches!(self, AcquireError::OutOfMemory)
    }
}

/// Presentable swap chain bound to the device's window.
///
/// At most one image is acquired at a time. It must be presented (after the
/// frame's command buffer is submitted) before the next acquire.
#[derive(Debug)]
pub struct Surface<B: Backend = WgpuBackend> {
    backend: Arc<B>,
    config: SurfaceConfig,
    capabilities: SurfaceCapabilities,
    current: Option<Arc<TextureView<B>>>,
}

impl<B: Backend> Surface<B> {
    pub(crate) fn new(
        backend: Arc<B>,
        capabilities: SurfaceCapabilities,
        width: u32,
        height: u32,
        device_config: &DeviceConfig,
    ) -> Result<Self, DeviceError> {
        let format = choose_surface_format(&capabilities, device_config.prefer_srgb)
            .ok_or(DeviceError::NoSurfaceFormats)?;
        let present_mode = choose_present_mode(&capabilities, device_config.present_mode);
        let alpha_mode = choose_alpha_mode(&capabilities, device_config.alpha_mode);

        let config = SurfaceConfig {
            width: width.max(1),
            height: height.max(1),
            format,
            present_mode,
            alpha_mode,
            desired_maximum_frame_latency: device_config.desired_maximum_frame_latency,
        };

        log::info!(
            "surface: {}x{} {:?}, {:?}, {:?}",
            config.width,
            config.height,
            config.format,
            config.present_mode,
            config.alpha_mode
        );
        backend.configure_surface(&config);

        Ok(Self {
            backend,
            config,
            capabilities,
            current: None,
        })
    }

    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    pub fn capabilities(&self) -> &SurfaceCapabilities {
        &self.capabilities
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn present_mode(&self) -> wgpu::PresentMode {
        self.config.present_mode
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Reconfigures the swap chain. Each dimension is clamped to at least 1.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        log::debug!("surface resized to {}x{}", self.config.width, self.config.height);

        self.reconfigure();
    }

    /// Acquires the next presentable image.
    ///
    /// Returns `Ok(None)` when the surface needed reconfiguration (outdated,
    /// suboptimal, lost or timed out); skip drawing this tick and try again on
    /// the next one.
    pub fn get_next_texture_view(&mut self) -> Result<Option<Arc<TextureView<B>>>, DeviceError> {
        if let Some(current) = &self.current {
            log::warn!("next surface image requested before the current one was presented");
            return Ok(Some(Arc::clone(current)));
        }

        match self.backend.acquire_surface_view() {
            Ok(native) => {
                let info = TextureInfo {
                    width: self.config.width,
                    height: self.config.height,
                    format: self.config.format,
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                    sample_count: 1,
                };
                let view = Arc::new(TextureView::from_native(native, info));
                self.current = Some(Arc::clone(&view));
                Ok(Some(view))
            }
            Err(err) if err.is_transient() => {
                log::debug!("surface acquire failed ({err:?}); reconfiguring");
                self.reconfigure();
                Ok(None)
            }
            Err(_) => {
                log::error!("surface out of memory");
                Err(DeviceError::SurfaceOutOfMemory)
            }
        }
    }

    /// Whether an image is acquired and waiting to be presented.
    pub fn has_pending_frame(&self) -> bool {
        self.current.is_some()
    }

    /// Presents the acquired image. Without one this only logs.
    pub fn present(&mut self) {
        if self.current.take().is_none() {
            log::warn!("present called without an acquired surface image");
            return;
        }
        self.backend.present_surface();
    }

    fn reconfigure(&mut self) {
        // An acquired image is invalid once the swap chain changes.
        self.current = None;
        self.backend.configure_surface(&self.config);
    }
}

pub(crate) fn choose_surface_format(
    caps: &SurfaceCapabilities,
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    if prefer_srgb {
        let preferred = [
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::Rgba8UnormSrgb,
        ];
        for f in preferred {
            if caps.formats.contains(&f) {
                return Some(f);
            }
        }
    }

    caps.formats.first().copied()
}

pub(crate) fn choose_present_mode(
    caps: &SurfaceCapabilities,
    preference: PresentModePreference,
) -> wgpu::PresentMode {
    match preference {
        PresentModePreference::Vsync => wgpu::PresentMode::Fifo,
        PresentModePreference::LowLatency => {
            [wgpu::PresentMode::Immediate, wgpu::PresentMode::Mailbox]
                .into_iter()
                .find(|m| caps.present_modes.contains(m))
                .unwrap_or(wgpu::PresentMode::Fifo)
        }
    }
}

pub(crate) fn choose_alpha_mode(
    caps: &SurfaceCapabilities,
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| caps.alpha_modes.contains(m))
        .or_else(|| caps.alpha_modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::MockBackend;
    use crate::device::Device;
    use crate::testing::{surface_capabilities, surface_device};

    // ── selection ────────────────────────────────────────────────────────

    #[test]
    fn srgb_format_is_preferred() {
        let mut caps = surface_capabilities();
        caps.formats = vec![
            wgpu::TextureFormat::Rgba8Unorm,
            wgpu::TextureFormat::Rgba8UnormSrgb,
        ];
        assert_eq!(
            choose_surface_format(&caps, true),
            Some(wgpu::TextureFormat::Rgba8UnormSrgb)
        );
        assert_eq!(
            choose_surface_format(&caps, false),
            Some(wgpu::TextureFormat::Rgba8Unorm)
        );

        caps.formats.clear();
        assert_eq!(choose_surface_format(&caps, true), None);
    }

    #[test]
    fn low_latency_prefers_immediate_then_mailbox() {
        let mut caps = surface_capabilities();
        caps.present_modes = vec![
            wgpu::PresentMode::Fifo,
            wgpu::PresentMode::Mailbox,
            wgpu::PresentMode::Immediate,
        ];
        let low = PresentModePreference::LowLatency;
        assert_eq!(choose_present_mode(&caps, low), wgpu::PresentMode::Immediate);

        caps.present_modes = vec![wgpu::PresentMode::Fifo, wgpu::PresentMode::Mailbox];
        assert_eq!(choose_present_mode(&caps, low), wgpu::PresentMode::Mailbox);

        caps.present_modes = vec![wgpu::PresentMode::Fifo];
        assert_eq!(choose_present_mode(&caps, low), wgpu::PresentMode::Fifo);

        caps.present_modes = vec![wgpu::PresentMode::Immediate];
        assert_eq!(
            choose_present_mode(&caps, PresentModePreference::Vsync),
            wgpu::PresentMode::Fifo
        );
    }

    #[test]
    fn unsupported_alpha_mode_falls_back() {
        let caps = surface_capabilities();
        let chosen = choose_alpha_mode(&caps, Some(wgpu::CompositeAlphaMode::PostMultiplied));
        assert_eq!(chosen, caps.alpha_modes[0]);
    }

    // ── lifecycle ────────────────────────────────────────────────────────

    #[test]
    fn default_config_configures_low_latency_mode() {
        // Fixture advertises Fifo and Mailbox.
        let device = surface_device(320, 240);
        assert_eq!(
            device.surface().unwrap().present_mode(),
            wgpu::PresentMode::Mailbox
        );

        let state = device.backend().state();
        let last = state.surface_configs.last().unwrap();
        assert_eq!(last.present_mode, wgpu::PresentMode::Mailbox);
    }

    #[test]
    fn vsync_config_configures_fifo() {
        let config = DeviceConfig {
            present_mode: PresentModePreference::Vsync,
            ..DeviceConfig::default()
        };
        let backend = MockBackend::with_surface(surface_capabilities());
        let device = Device::with_surface(backend, 320, 240, &config).unwrap();

        assert_eq!(
            device.surface().unwrap().present_mode(),
            wgpu::PresentMode::Fifo
        );
        let state = device.backend().state();
        assert_eq!(
            state.surface_configs.last().unwrap().present_mode,
            wgpu::PresentMode::Fifo
        );
    }

    #[test]
    fn resize_to_zero_is_clamped() {
        let mut device = surface_device(800, 600);
        let surface = device.surface_mut().unwrap();

        surface.resize(0, 0);
        assert_eq!(surface.size(), (1, 1));

        let view = surface.get_next_texture_view().unwrap().unwrap();
        assert_eq!(view.size(), (1, 1));

        let state = device.backend().state();
        let last = state.surface_configs.last().unwrap();
        assert_eq!((last.width, last.height), (1, 1));
    }

    #[test]
    fn transient_acquire_failure_skips_the_frame() {
        let mut device = surface_device(320, 240);
        device.backend().fail_next_acquire(AcquireError::Outdated);
        let configures = device.backend().state().surface_configs.len();

        let surface = device.surface_mut().unwrap();
        assert!(surface.get_next_texture_view().unwrap().is_none());
        assert!(!surface.has_pending_frame());

        assert_eq!(device.backend().state().surface_configs.len(), configures + 1);
    }

    #[test]
    fn out_of_memory_is_fatal() {
        let mut device = surface_device(320, 240);
        device.backend().fail_next_acquire(AcquireError::OutOfMemory);

        let surface = device.surface_mut().unwrap();
        assert_eq!(
            surface.get_next_texture_view().unwrap_err(),
            DeviceError::SurfaceOutOfMemory
        );
    }

    #[test]
    fn present_without_frame_is_a_no_op() {
        let mut device = surface_device(320, 240);
        device.surface_mut().unwrap().present();
        assert_eq!(device.backend().state().presents, 0);

        let surface = device.surface_mut().unwrap();
        surface.get_next_texture_view().unwrap().unwrap();
        surface.present();
        surface.present();
        assert_eq!(device.backend().state().presents, 1);
    }
}
