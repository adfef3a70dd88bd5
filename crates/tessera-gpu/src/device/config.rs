/// Present-mode policy applied when the surface is configured.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum PresentModePreference {
    /// `Immediate`, then `Mailbox`, falling back to `Fifo`.
    #[default]
    LowLatency,
    /// Always `Fifo`.
    Vsync,
}

/// Device negotiation and surface parameters.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Prefer an sRGB 8-bit surface format when available.
    pub prefer_srgb: bool,

    pub present_mode: PresentModePreference,

    /// Used if the surface supports it; otherwise the first supported mode.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    pub power_preference: wgpu::PowerPreference,

    /// Favor an empty set for portability unless a feature is strictly needed.
    pub required_features: wgpu::Features,
    pub required_limits: wgpu::Limits,

    /// Hint only; support depends on platform and backend.
    pub desired_maximum_frame_latency: u32,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            present_mode: PresentModePreference::default(),
            alpha_mode: None,
            power_preference: wgpu::PowerPreference::HighPerformance,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
        }
    }
}
