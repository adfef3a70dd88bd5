use crate::backend::{Backend, WgpuBackend};

/// Sampling state. Every axis shares the same address mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerDesc<'a> {
    pub label: Option<&'a str>,
    pub address_mode: wgpu::AddressMode,
    pub mag_filter: wgpu::FilterMode,
    pub min_filter: wgpu::FilterMode,
    pub lod_min_clamp: f32,
    pub lod_max_clamp: f32,
    /// Comparison function for depth samplers.
    pub compare: Option<wgpu::CompareFunction>,
}

impl Default for SamplerDesc<'_> {
    /// Linear filtering with repeat addressing.
    fn default() -> Self {
        Self {
            label: None,
            address_mode: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            lod_min_clamp: 0.0,
            lod_max_clamp: 32.0,
            compare: None,
        }
    }
}

#[derive(Debug)]
pub struct Sampler<B: Backend = WgpuBackend> {
    native: B::Sampler,
    label: String,
    comparison: bool,
}

impl<B: Backend> Sampler<B> {
    pub(crate) fn from_native(native: B::Sampler, desc: &SamplerDesc<'_>) -> Self {
        Self {
            native,
            label: desc.label.unwrap_or("sampler").to_owned(),
            comparison: desc.compare.is_some(),
        }
    }

    pub fn native(&self) -> &B::Sampler {
        &self.native
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_comparison(&self) -> bool {
        self.comparison
    }
}
