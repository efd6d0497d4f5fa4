//! GPU-side copies of a loaded model.

use wgpu::util::DeviceExt;

use crate::effect::EffectCache;
use crate::model::{Material, Model};

/// Per-draw uniform: baked node transform plus material diffuse.
/// NOTE: must match the WGSL `DrawData` struct.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct DrawUniform {
    model: [[f32; 4]; 4],
    diffuse: [f32; 4],
}

/// One recorded draw: index data plus the group-2 material bindings.
pub struct GpuDraw {
    /// Index into [`GpuModel::vertex_buffers`].
    pub mesh: usize,
    /// Triangle indices for this part.
    pub index_buffer: wgpu::Buffer,
    /// Number of indices to draw.
    pub index_count: u32,
    /// Group-2 bind group (draw uniform, plus texture when textured).
    pub bind_group: wgpu::BindGroup,
    /// Whether the textured effect variant applies.
    pub textured: bool,
}

/// GPU copies of one model: shared vertex buffers plus the draw list.
pub struct GpuModel {
    /// One vertex buffer per source mesh.
    pub vertex_buffers: Vec<wgpu::Buffer>,
    /// Draw list in model draw-item order.
    pub draws: Vec<GpuDraw>,
}

/// Decode material texture bytes and upload them, or `None` when the
/// material is untextured or its image does not decode.
fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    material: &Material,
) -> Option<wgpu::TextureView> {
    let texture = material.texture.as_ref()?;
    let decoded = match image::load_from_memory(&texture.bytes) {
        Ok(img) => img.to_rgba8(),
        Err(e) => {
            log::warn!(
                "texture `{}` failed to decode, drawing untextured: {e}",
                texture.filename
            );
            return None;
        }
    };

    let (width, height) = decoded.dimensions();
    let size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };
    let gpu_texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Diffuse Texture"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &gpu_texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &decoded,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        size,
    );
    Some(gpu_texture.create_view(&wgpu::TextureViewDescriptor::default()))
}

/// Upload a model's meshes, materials, and draw list to the GPU.
pub fn upload_model(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    effects: &EffectCache,
    sampler: &wgpu::Sampler,
    model: &Model,
) -> GpuModel {
    let vertex_buffers = model
        .meshes
        .iter()
        .map(|mesh| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Model Vertices"),
                contents: bytemuck::cast_slice(&mesh.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            })
        })
        .collect();

    // Textures are shared per material, not per draw.
    let texture_views: Vec<Option<wgpu::TextureView>> = model
        .materials
        .iter()
        .map(|material| upload_texture(device, queue, material))
        .collect();

    let mut draws = Vec::with_capacity(model.draw_items.len());
    for item in &model.draw_items {
        let part = &model.meshes[item.mesh].parts[item.part];
        if part.indices.is_empty() {
            continue;
        }
        let material = &model.materials[item.material];

        let uniform = DrawUniform {
            model: item.transform.to_cols_array_2d(),
            diffuse: [
                material.diffuse.x,
                material.diffuse.y,
                material.diffuse.z,
                1.0,
            ],
        };
        let draw_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Draw Uniform"),
                contents: bytemuck::cast_slice(&[uniform]),
                usage: wgpu::BufferUsages::UNIFORM,
            });

        let texture_view = texture_views[item.material].as_ref();
        let bind_group = match texture_view {
            Some(view) => {
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("Textured Material Bind Group"),
                    layout: effects.material_textured_layout(),
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: draw_buffer.as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::TextureView(
                                view,
                            ),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: wgpu::BindingResource::Sampler(sampler),
                        },
                    ],
                })
            }
            None => device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Material Bind Group"),
                layout: effects.material_layout(),
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: draw_buffer.as_entire_binding(),
                }],
            }),
        };

        draws.push(GpuDraw {
            mesh: item.mesh,
            index_buffer: device.create_buffer_init(
                &wgpu::util::BufferInitDescriptor {
                    label: Some("Model Indices"),
                    contents: bytemuck::cast_slice(&part.indices),
                    usage: wgpu::BufferUsages::INDEX,
                },
            ),
            index_count: part.indices.len() as u32,
            bind_group,
            textured: texture_view.is_some(),
        });
    }

    log::debug!(
        "uploaded model `{}`: {} meshes, {} draws",
        model.name,
        model.meshes.len(),
        draws.len()
    );

    GpuModel {
        vertex_buffers,
        draws,
    }
}
