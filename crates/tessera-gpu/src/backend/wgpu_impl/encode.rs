use std::num::NonZeroU64;

use crate::render::{BoundGroup, BoundResource, CommandList, DrawCall, LoadAction};

use super::WgpuBackend;

/// Growable buffer backing a recording's dynamic uniforms.
#[derive(Debug)]
pub(super) struct UniformArena {
    buffer: wgpu::Buffer,
    capacity: u64,
}

const MIN_ARENA_SIZE: u64 = 64 * 1024;

impl WgpuBackend {
    /// Uploads `data` into the arena, growing it first if needed.
    fn upload_uniforms(&self, data: &[u8]) -> Option<wgpu::Buffer> {
        if data.is_empty() {
            return None;
        }

        let mut arena = self.uniforms.lock().unwrap_or_else(|e| e.into_inner());
        let needed = data.len() as u64;

        let grow = arena.as_ref().is_none_or(|a| a.capacity < needed);
        if grow {
            let capacity = needed.next_power_of_two().max(MIN_ARENA_SIZE);
            log::debug!("dynamic uniform arena grown to {capacity} bytes");
            *arena = Some(UniformArena {
                buffer: self.device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some("tessera dynamic uniforms"),
                    size: capacity,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                }),
                capacity,
            });
        }

        let arena = arena.as_ref()?;
        self.queue.write_buffer(&arena.buffer, 0, data);
        Some(arena.buffer.clone())
    }

    pub(super) fn encode(&self, commands: &CommandList<Self>) {
        let uniforms = self.upload_uniforms(&commands.dynamic_uniforms);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some(commands.label.as_str()),
            });

        let color_load = match commands.color_load {
            LoadAction::Clear(c) => wgpu::LoadOp::Clear(c),
            LoadAction::Load => wgpu::LoadOp::Load,
        };
        let color_attachments: Vec<Option<wgpu::RenderPassColorAttachment>> = commands
            .target
            .color_attachments()
            .iter()
            .map(|slot| {
                slot.as_ref().map(|view| wgpu::RenderPassColorAttachment {
                    view: view.native(),
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: color_load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })
            })
            .collect();

        let depth_stencil_attachment = commands.target.depth_stencil().map(|view| {
            let depth_load = match commands.depth_load {
                LoadAction::Clear(d) => wgpu::LoadOp::Clear(d),
                LoadAction::Load => wgpu::LoadOp::Load,
            };
            let stencil_ops = view.format().has_stencil_aspect().then(|| wgpu::Operations {
                load: match commands.stencil_load {
                    LoadAction::Clear(s) => wgpu::LoadOp::Clear(s),
                    LoadAction::Load => wgpu::LoadOp::Load,
                },
                store: wgpu::StoreOp::Store,
            });

            wgpu::RenderPassDepthStencilAttachment {
                view: view.native(),
                depth_ops: Some(wgpu::Operations {
                    load: depth_load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops,
            }
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some(commands.label.as_str()),
                color_attachments: &color_attachments,
                depth_stencil_attachment,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            self.encode_draws(&mut pass, &commands.draws, uniforms.as_ref());
        }

        self.queue.submit(std::iter::once(encoder.finish()));
    }

    fn encode_draws(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        draws: &[DrawCall<Self>],
        uniforms: Option<&wgpu::Buffer>,
    ) {
        let mut current: Option<&DrawCall<Self>> = None;
        // Last native bind group per group index, with the bindings it was built from.
        let mut groups: Vec<Option<(&BoundGroup<Self>, wgpu::BindGroup)>> = Vec::new();

        'draws: for draw in draws {
            let pipeline_changed =
                current.is_none_or(|c| !std::sync::Arc::ptr_eq(&c.pipeline, &draw.pipeline));
            if pipeline_changed {
                pass.set_pipeline(&draw.pipeline.native().pipeline);
                groups.clear();
            }
            current = Some(draw);

            groups.resize_with(draw.groups.len(), || None);
            for (index, bound) in draw.groups.iter().enumerate() {
                let reusable = groups[index]
                    .as_ref()
                    .is_some_and(|(prev, _)| prev.same_objects(bound));
                if !reusable {
                    let layout = &draw.pipeline.native().bind_group_layouts[index];
                    let Some(bind_group) = self.create_bind_group(layout, bound, uniforms) else {
                        log::error!("draw skipped: dynamic uniform arena missing");
                        continue 'draws;
                    };
                    groups[index] = Some((bound, bind_group));
                }

                if let Some((_, bind_group)) = &groups[index] {
                    pass.set_bind_group(index as u32, bind_group, &bound.dynamic_offsets());
                }
            }

            let vertex_buffer = draw.mesh.vertex_buffer().buffer().native();
            pass.set_vertex_buffer(0, vertex_buffer.slice(..));

            match draw.mesh.index_buffer() {
                Some(ib) => {
                    pass.set_index_buffer(ib.buffer().native().slice(..), ib.format());
                    pass.draw_indexed(0..ib.index_count(), 0, 0..1);
                }
                None => pass.draw(0..draw.mesh.vertex_buffer().vertex_count(), 0..1),
            }
        }
    }

    fn create_bind_group(
        &self,
        layout: &wgpu::BindGroupLayout,
        bound: &BoundGroup<Self>,
        uniforms: Option<&wgpu::Buffer>,
    ) -> Option<wgpu::BindGroup> {
        let mut entries = Vec::with_capacity(bound.entries.len());
        for entry in &bound.entries {
            let resource = match &entry.resource {
                BoundResource::Buffer(buffer) => buffer.native().as_entire_binding(),
                BoundResource::DynamicUniform { size, .. } => {
                    wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: uniforms?,
                        offset: 0,
                        size: NonZeroU64::new(*size),
                    })
                }
                BoundResource::Texture(view) => wgpu::BindingResource::TextureView(view.native()),
                BoundResource::Sampler(sampler) => wgpu::BindingResource::Sampler(sampler.native()),
            };
            entries.push(wgpu::BindGroupEntry {
                binding: entry.slot,
                resource,
            });
        }

        Some(self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: None,
            layout,
            entries: &entries,
        }))
    }
}
