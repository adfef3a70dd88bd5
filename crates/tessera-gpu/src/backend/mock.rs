//! Recording backend for unit tests.
//!
//! Built for this crate's tests and, with the `mock` feature, for dependents.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::device::{AcquireError, SurfaceCapabilities, SurfaceConfig};
use crate::render::{
    BoundGroup, BoundResource, CommandList, LoadAction, PipelineDesc, PipelineError,
};
use crate::resource::{BufferDesc, SamplerDesc, TextureDesc, TextureViewDesc};

use super::{Backend, NativeLimits};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockBuffer {
    pub id: u64,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockTexture {
    pub id: u64,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockView {
    pub id: u64,
    /// `None` for swap chain images.
    pub texture: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockSampler {
    pub id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockPipeline {
    pub id: u64,
    pub label: String,
}

/// One draw as the backend saw it.
#[derive(Debug, Clone, PartialEq)]
pub struct MockDraw {
    pub pipeline: u64,
    pub vertex_buffer: u64,
    pub indexed: bool,
    pub count: u32,
    /// `(group, slot, view id)` of every bound texture.
    pub textures: Vec<(u32, u32, u64)>,
    /// Dynamic offsets per bind group.
    pub dynamic_offsets: Vec<Vec<u32>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MockSubmission {
    pub label: String,
    pub color_views: Vec<Option<u64>>,
    pub depth_view: Option<u64>,
    pub color_load: LoadAction<wgpu::Color>,
    pub depth_load: LoadAction<f32>,
    pub draws: Vec<MockDraw>,
    pub dynamic_uniforms: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct MockState {
    next_id: u64,
    pub pipelines: usize,
    /// `(buffer id, offset, bytes)`.
    pub buffer_writes: Vec<(u64, u64, Vec<u8>)>,
    pub texture_writes: Vec<u64>,
    pub submissions: Vec<MockSubmission>,
    pub surface_configs: Vec<SurfaceConfig>,
    pub presents: usize,
    pub polls: usize,
    acquire_failures: VecDeque<AcquireError>,
}

impl MockState {
    fn id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Debug)]
pub struct MockBackend {
    state: Mutex<MockState>,
    limits: NativeLimits,
    surface: Option<SurfaceCapabilities>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState::default()),
            limits: NativeLimits::default(),
            surface: None,
        }
    }

    pub fn with_surface(capabilities: SurfaceCapabilities) -> Self {
        Self {
            surface: Some(capabilities),
            ..Self::new()
        }
    }

    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Makes the next surface acquire fail with `err`.
    pub fn fail_next_acquire(&self, err: AcquireError) {
        self.state().acquire_failures.push_back(err);
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn record_draws(commands: &CommandList<MockBackend>) -> Vec<MockDraw> {
    commands
        .draws
        .iter()
        .map(|draw| {
            let textures = draw
                .groups
                .iter()
                .enumerate()
                .flat_map(|(group, bound)| {
                    bound.entries.iter().filter_map(move |e| match &e.resource {
                        BoundResource::Texture(view) => {
                            Some((group as u32, e.slot, view.native().id))
                        }
                        _ => None,
                    })
                })
                .collect();

            MockDraw {
                pipeline: draw.pipeline.native().id,
                vertex_buffer: draw.mesh.vertex_buffer().buffer().native().id,
                indexed: draw.is_indexed(),
                count: draw.element_count(),
                textures,
                dynamic_offsets: draw.groups.iter().map(BoundGroup::dynamic_offsets).collect(),
            }
        })
        .collect()
}

impl Backend for MockBackend {
    type Buffer = MockBuffer;
    type Texture = MockTexture;
    type TextureView = MockView;
    type Sampler = MockSampler;
    type Pipeline = MockPipeline;

    fn limits(&self) -> NativeLimits {
        self.limits
    }

    fn create_buffer(&self, desc: &BufferDesc<'_>, contents: Option<&[u8]>) -> MockBuffer {
        let size = contents.map_or(desc.size, |c| c.len() as u64);
        MockBuffer {
            id: self.state().id(),
            size,
        }
    }

    fn write_buffer(&self, buffer: &MockBuffer, offset: u64, data: &[u8]) {
        self.state()
            .buffer_writes
            .push((buffer.id, offset, data.to_vec()));
    }

    fn create_texture(&self, desc: &TextureDesc<'_>) -> MockTexture {
        MockTexture {
            id: self.state().id(),
            width: desc.width,
            height: desc.height,
        }
    }

    fn write_texture(&self, texture: &MockTexture, _desc: &TextureDesc<'_>, _data: &[u8]) {
        self.state().texture_writes.push(texture.id);
    }

    fn create_texture_view(&self, texture: &MockTexture, _desc: &TextureViewDesc<'_>) -> MockView {
        MockView {
            id: self.state().id(),
            texture: Some(texture.id),
        }
    }

    fn create_sampler(&self, _desc: &SamplerDesc<'_>) -> MockSampler {
        MockSampler {
            id: self.state().id(),
        }
    }

    fn create_pipeline(&self, desc: &PipelineDesc) -> Result<MockPipeline, PipelineError> {
        let mut state = self.state();
        state.pipelines += 1;
        Ok(MockPipeline {
            id: state.id(),
            label: desc.label.clone(),
        })
    }

    fn submit(&self, commands: &CommandList<Self>) {
        let submission = MockSubmission {
            label: commands.label.clone(),
            color_views: commands
                .target
                .color_attachments()
                .iter()
                .map(|a| a.as_ref().map(|v| v.native().id))
                .collect(),
            depth_view: commands.target.depth_stencil().map(|v| v.native().id),
            color_load: commands.color_load,
            depth_load: commands.depth_load,
            draws: record_draws(commands),
            dynamic_uniforms: commands.dynamic_uniforms.clone(),
        };
        self.state().submissions.push(submission);
    }

    fn poll(&self) {
        self.state().polls += 1;
    }

    fn surface_capabilities(&self) -> Option<SurfaceCapabilities> {
        self.surface.clone()
    }

    fn configure_surface(&self, config: &SurfaceConfig) {
        self.state().surface_configs.push(config.clone());
    }

    fn acquire_surface_view(&self) -> Result<MockView, AcquireError> {
        let mut state = self.state();
        if let Some(err) = state.acquire_failures.pop_front() {
            return Err(err);
        }
        Ok(MockView {
            id: state.id(),
            texture: None,
        })
    }

    fn present_surface(&self) {
        self.state().presents += 1;
    }
}
