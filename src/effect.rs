//! Capability-keyed cache of the forward shader's pipeline variants.
//!
//! The mesh shader exists in four variants, keyed by whether lighting is
//! active and whether the material carries a diffuse texture. Variants
//! are composed from one WGSL source with naga_oil defines and memoized
//! on first use; the cache is owned by the renderer, not a global.

use std::collections::HashMap;

use naga_oil::compose::{
    Composer, ComposerError, NagaModuleDescriptor, ShaderDefValue, ShaderType,
};

use crate::model::Vertex;

const MODEL_SHADER: &str = include_str!("../assets/shaders/model.wgsl");
const MODEL_SHADER_PATH: &str = "shaders/model.wgsl";

/// Depth buffer format shared by every variant.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Capability key selecting a shader variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectKey {
    /// Directional lights are active this frame.
    pub lit: bool,
    /// The material carries a diffuse texture.
    pub textured: bool,
}

impl EffectKey {
    /// Number of distinct variants.
    pub const VARIANTS: usize = 4;

    /// 2-bit slot index: bit 0 = lit, bit 1 = textured.
    #[must_use]
    pub fn index(self) -> usize {
        usize::from(self.lit) | (usize::from(self.textured) << 1)
    }

    fn shader_defs(self) -> HashMap<String, ShaderDefValue> {
        let mut defs = HashMap::new();
        if self.lit {
            let _ = defs.insert("LIGHTING".to_owned(), ShaderDefValue::Bool(true));
        }
        if self.textured {
            let _ = defs.insert("TEXTURE".to_owned(), ShaderDefValue::Bool(true));
        }
        defs
    }
}

/// Compose the shader variant for `key` into naga IR.
pub fn compose_variant(key: EffectKey) -> Result<naga::Module, Box<ComposerError>> {
    let mut composer = Composer::default();
    composer
        .make_naga_module(NagaModuleDescriptor {
            source: MODEL_SHADER,
            file_path: MODEL_SHADER_PATH,
            shader_type: ShaderType::Wgsl,
            shader_defs: key.shader_defs(),
            ..Default::default()
        })
        .map_err(Box::new)
}

fn uniform_entry(
    binding: u32,
    visibility: wgpu::ShaderStages,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

/// Memoizing store for the pipeline variants and their bind group
/// layouts.
pub struct EffectCache {
    format: wgpu::TextureFormat,
    camera_layout: wgpu::BindGroupLayout,
    lights_layout: wgpu::BindGroupLayout,
    material_layout: wgpu::BindGroupLayout,
    material_textured_layout: wgpu::BindGroupLayout,
    pipelines: [Option<wgpu::RenderPipeline>; EffectKey::VARIANTS],
}

impl EffectCache {
    /// Create an empty cache targeting the given surface format.
    #[must_use]
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let camera_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Camera Layout"),
                entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX)],
            });
        let lights_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Lights Layout"),
                entries: &[uniform_entry(0, wgpu::ShaderStages::FRAGMENT)],
            });
        let material_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Material Layout"),
                entries: &[uniform_entry(
                    0,
                    wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                )],
            });
        let material_textured_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Textured Material Layout"),
                entries: &[
                    uniform_entry(
                        0,
                        wgpu::ShaderStages::VERTEX
                            | wgpu::ShaderStages::FRAGMENT,
                    ),
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float {
                                filterable: true,
                            },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(
                            wgpu::SamplerBindingType::Filtering,
                        ),
                        count: None,
                    },
                ],
            });

        Self {
            format,
            camera_layout,
            lights_layout,
            material_layout,
            material_textured_layout,
            pipelines: [None, None, None, None],
        }
    }

    /// Layout for the camera uniform (group 0).
    #[must_use]
    pub fn camera_layout(&self) -> &wgpu::BindGroupLayout {
        &self.camera_layout
    }

    /// Layout for the lights uniform (group 1).
    #[must_use]
    pub fn lights_layout(&self) -> &wgpu::BindGroupLayout {
        &self.lights_layout
    }

    /// Layout for an untextured material (group 2).
    #[must_use]
    pub fn material_layout(&self) -> &wgpu::BindGroupLayout {
        &self.material_layout
    }

    /// Layout for a textured material (group 2).
    #[must_use]
    pub fn material_textured_layout(&self) -> &wgpu::BindGroupLayout {
        &self.material_textured_layout
    }

    /// The variant for `key`, composing and building it on first use.
    pub fn pipeline(
        &mut self,
        device: &wgpu::Device,
        key: EffectKey,
    ) -> &wgpu::RenderPipeline {
        let index = key.index();
        if self.pipelines[index].is_none() {
            self.pipelines[index] = Some(self.build_pipeline(device, key));
        }
        // Just stored above.
        self.pipelines[index].as_ref().unwrap_or_else(|| unreachable!())
    }

    /// The variant for `key`, if it has been built.
    #[must_use]
    pub fn cached(&self, key: EffectKey) -> Option<&wgpu::RenderPipeline> {
        self.pipelines[key.index()].as_ref()
    }

    fn build_pipeline(
        &self,
        device: &wgpu::Device,
        key: EffectKey,
    ) -> wgpu::RenderPipeline {
        let module = match compose_variant(key) {
            Ok(module) => module,
            // The shader source is embedded; composition can only fail on
            // a build that never produced a working variant.
            Err(e) => panic!("model shader failed to compose: {e}"),
        };
        let shader =
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Model Shader"),
                source: wgpu::ShaderSource::Naga(std::borrow::Cow::Owned(
                    module,
                )),
            });

        let material_layout = if key.textured {
            &self.material_textured_layout
        } else {
            &self.material_layout
        };
        let layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Model Pipeline Layout"),
                bind_group_layouts: &[
                    &self.camera_layout,
                    &self.lights_layout,
                    material_layout,
                ],
                push_constant_ranges: &[],
            });

        let vertex_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &wgpu::vertex_attr_array![
                0 => Float32x3,
                1 => Float32x3,
                2 => Float32x2,
            ],
        };

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Model Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[vertex_layout],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                // Exported models disagree on winding; draw both faces.
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }
}
