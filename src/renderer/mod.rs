//! Forward renderer: `begin` / `draw_scene` / `end` over a [`Scene`].

mod mesh;

pub use mesh::{GpuDraw, GpuModel};

use crate::camera::core::CameraUniform;
use crate::effect::{EffectCache, EffectKey, DEPTH_FORMAT};
use crate::gpu::GpuContext;
use crate::lighting::LightsUniform;
use crate::scene::Scene;
use wgpu::util::DeviceExt;

/// Per-frame draw counters, reset by [`ForwardRenderer::begin`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStatistics {
    /// Mesh parts drawn this frame.
    pub meshes_drawn: u32,
}

struct ActiveFrame {
    surface: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
}

/// Draws a [`Scene`] into the window surface.
///
/// Call order per frame: [`begin`](Self::begin), any number of
/// [`draw_scene`](Self::draw_scene) calls, [`end`](Self::end). GPU mesh
/// copies are refreshed lazily when the scene's generation moves.
pub struct ForwardRenderer {
    context: GpuContext,
    depth_view: wgpu::TextureView,
    effects: EffectCache,
    sampler: wgpu::Sampler,
    camera_uniform: CameraUniform,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    lights_buffer: wgpu::Buffer,
    lights_bind_group: wgpu::BindGroup,
    uploaded: Option<GpuModel>,
    uploaded_generation: Option<u64>,
    frame: Option<ActiveFrame>,
    stats: RenderStatistics,
}

fn create_depth_view(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Buffer"),
        size: wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

impl ForwardRenderer {
    /// Build a renderer over an initialized GPU context.
    #[must_use]
    pub fn new(context: GpuContext) -> Self {
        let device = &context.device;
        let effects = EffectCache::new(device, context.format());
        let depth_view = create_depth_view(device, &context.config);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Diffuse Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let camera_uniform = CameraUniform::default();
        let camera_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Camera Buffer"),
                contents: bytemuck::cast_slice(&[camera_uniform]),
                usage: wgpu::BufferUsages::UNIFORM
                    | wgpu::BufferUsages::COPY_DST,
            });
        let camera_bind_group =
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Camera Bind Group"),
                layout: effects.camera_layout(),
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                }],
            });

        let lights_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Lights Buffer"),
                contents: bytemuck::cast_slice(&[LightsUniform::default()]),
                usage: wgpu::BufferUsages::UNIFORM
                    | wgpu::BufferUsages::COPY_DST,
            });
        let lights_bind_group =
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Lights Bind Group"),
                layout: effects.lights_layout(),
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: lights_buffer.as_entire_binding(),
                }],
            });

        Self {
            depth_view,
            effects,
            sampler,
            camera_uniform,
            camera_buffer,
            camera_bind_group,
            lights_buffer,
            lights_bind_group,
            uploaded: None,
            uploaded_generation: None,
            frame: None,
            stats: RenderStatistics::default(),
            context,
        }
    }

    /// Reconfigure the surface and depth buffer for a new window size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.context.resize(width, height);
        self.depth_view =
            create_depth_view(&self.context.device, &self.context.config);
    }

    /// Counters for the frame being recorded (or the last finished one).
    #[must_use]
    pub fn statistics(&self) -> RenderStatistics {
        self.stats
    }

    /// Start a frame: acquire the next surface texture and clear color
    /// and depth.
    ///
    /// # Errors
    ///
    /// Propagates [`wgpu::SurfaceError`]; on `Lost`/`Outdated` the caller
    /// resizes and skips the frame.
    pub fn begin(&mut self) -> Result<(), wgpu::SurfaceError> {
        let surface = self.context.acquire()?;
        let view = surface
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self.context.device.create_command_encoder(
            &wgpu::CommandEncoderDescriptor {
                label: Some("Clear Encoder"),
            },
        );
        {
            let _pass =
                encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Clear Pass"),
                    color_attachments: &[Some(
                        wgpu::RenderPassColorAttachment {
                            view: &view,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                                store: wgpu::StoreOp::Store,
                            },
                            depth_slice: None,
                        },
                    )],
                    depth_stencil_attachment: Some(
                        wgpu::RenderPassDepthStencilAttachment {
                            view: &self.depth_view,
                            depth_ops: Some(wgpu::Operations {
                                load: wgpu::LoadOp::Clear(1.0),
                                store: wgpu::StoreOp::Store,
                            }),
                            stencil_ops: None,
                        },
                    ),
                    timestamp_writes: None,
                    occlusion_query_set: None,
                });
        }
        let _ = self.context.queue.submit(std::iter::once(encoder.finish()));

        self.frame = Some(ActiveFrame { surface, view });
        self.stats = RenderStatistics::default();
        Ok(())
    }

    /// Record the scene's draw calls into the active frame.
    ///
    /// A no-op (with a warning) when called outside a
    /// [`begin`](Self::begin)/[`end`](Self::end) pair.
    pub fn draw_scene(&mut self, scene: &Scene) {
        if self.frame.is_none() {
            log::warn!("draw_scene called outside begin/end");
            return;
        }

        // Refresh GPU mesh copies when the model list changed.
        if self.uploaded_generation != Some(scene.generation()) {
            self.uploaded = scene.active_model().map(|model| {
                mesh::upload_model(
                    &self.context.device,
                    &self.context.queue,
                    &self.effects,
                    &self.sampler,
                    model,
                )
            });
            self.uploaded_generation = Some(scene.generation());
        }

        self.camera_uniform.update(&scene.camera);
        self.context.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[self.camera_uniform]),
        );
        self.context.queue.write_buffer(
            &self.lights_buffer,
            0,
            bytemuck::cast_slice(&[LightsUniform::from_lights(
                scene.lights(),
            )]),
        );

        let lit = !scene.lights().is_empty();

        // Build any missing pipeline variants before the pass borrows the
        // encoder.
        if let Some(model) = &self.uploaded {
            for draw in &model.draws {
                let key = EffectKey {
                    lit,
                    textured: draw.textured,
                };
                let _ = self.effects.pipeline(&self.context.device, key);
            }
        }

        let Self {
            context,
            depth_view,
            effects,
            camera_bind_group,
            lights_bind_group,
            uploaded,
            frame,
            stats,
            ..
        } = self;
        let Some(frame) = frame.as_ref() else {
            return;
        };
        let Some(model) = uploaded.as_ref() else {
            return;
        };

        let mut encoder = context.device.create_command_encoder(
            &wgpu::CommandEncoderDescriptor {
                label: Some("Scene Encoder"),
            },
        );
        {
            let mut pass =
                encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Scene Pass"),
                    color_attachments: &[Some(
                        wgpu::RenderPassColorAttachment {
                            view: &frame.view,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Load,
                                store: wgpu::StoreOp::Store,
                            },
                            depth_slice: None,
                        },
                    )],
                    depth_stencil_attachment: Some(
                        wgpu::RenderPassDepthStencilAttachment {
                            view: &*depth_view,
                            depth_ops: Some(wgpu::Operations {
                                load: wgpu::LoadOp::Load,
                                store: wgpu::StoreOp::Store,
                            }),
                            stencil_ops: None,
                        },
                    ),
                    timestamp_writes: None,
                    occlusion_query_set: None,
                });

            pass.set_bind_group(0, &*camera_bind_group, &[]);
            pass.set_bind_group(1, &*lights_bind_group, &[]);

            for draw in &model.draws {
                let key = EffectKey {
                    lit,
                    textured: draw.textured,
                };
                let Some(pipeline) = effects.cached(key) else {
                    continue;
                };
                pass.set_pipeline(pipeline);
                pass.set_bind_group(2, &draw.bind_group, &[]);
                pass.set_vertex_buffer(
                    0,
                    model.vertex_buffers[draw.mesh].slice(..),
                );
                pass.set_index_buffer(
                    draw.index_buffer.slice(..),
                    wgpu::IndexFormat::Uint32,
                );
                pass.draw_indexed(0..draw.index_count, 0, 0..1);
                stats.meshes_drawn += 1;
            }
        }
        let _ = context.queue.submit(std::iter::once(encoder.finish()));
    }

    /// Finish the frame and present it.
    pub fn end(&mut self) {
        if let Some(frame) = self.frame.take() {
            frame.surface.present();
        }
    }
}
