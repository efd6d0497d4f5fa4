//! Document-to-[`Model`] conversion.
//!
//! `load_model` is the boundary the viewer state machine calls through:
//! JSON text in, fully normalized [`Model`] out, with referenced textures
//! resolved synchronously through a caller-supplied resolver (one call per
//! referenced filename, names relative to the model file's folder).

use std::path::Path;

use glam::{Mat4, Quat, Vec3};
use rustc_hash::FxHashMap;

use super::document::{
    attribute_size, MeshDef, ModelDocument, NodeDef,
};
use super::{
    DrawItem, Material, MeshData, MeshPart, Model, ModelAnimation,
    TextureData, Vertex,
};
use crate::error::ViewError;

/// Offsets (in floats) of the attributes the viewer keeps, within one
/// interleaved source vertex.
struct VertexLayout {
    stride: usize,
    position: Option<usize>,
    normal: Option<usize>,
    uv: Option<usize>,
}

impl VertexLayout {
    fn from_attributes(attributes: &[String]) -> Result<Self, ViewError> {
        let mut layout = Self {
            stride: 0,
            position: None,
            normal: None,
            uv: None,
        };
        for name in attributes {
            match name.as_str() {
                "POSITION" => layout.position = Some(layout.stride),
                "NORMAL" => layout.normal = Some(layout.stride),
                "TEXCOORD0" => layout.uv = Some(layout.stride),
                _ => {}
            }
            layout.stride += attribute_size(name)?;
        }
        if layout.position.is_none() {
            return Err(ViewError::Format(
                "mesh has no POSITION attribute".to_owned(),
            ));
        }
        Ok(layout)
    }
}

fn read3(vertices: &[f32], base: usize, offset: Option<usize>) -> [f32; 3] {
    offset.map_or([0.0; 3], |o| {
        [
            vertices[base + o],
            vertices[base + o + 1],
            vertices[base + o + 2],
        ]
    })
}

fn read2(vertices: &[f32], base: usize, offset: Option<usize>) -> [f32; 2] {
    offset.map_or([0.0; 2], |o| [vertices[base + o], vertices[base + o + 1]])
}

fn convert_mesh(mesh: &MeshDef) -> Result<MeshData, ViewError> {
    let layout = VertexLayout::from_attributes(&mesh.attributes)?;
    if layout.stride == 0 || mesh.vertices.len() % layout.stride != 0 {
        return Err(ViewError::Format(format!(
            "vertex stream length {} is not a multiple of stride {}",
            mesh.vertices.len(),
            layout.stride
        )));
    }

    let count = mesh.vertices.len() / layout.stride;
    let mut vertices = Vec::with_capacity(count);
    for i in 0..count {
        let base = i * layout.stride;
        vertices.push(Vertex {
            position: read3(&mesh.vertices, base, layout.position),
            normal: read3(&mesh.vertices, base, layout.normal),
            uv: read2(&mesh.vertices, base, layout.uv),
        });
    }

    let mut parts = Vec::new();
    for part in &mesh.parts {
        if part.primitive != "TRIANGLES" {
            log::warn!(
                "skipping mesh part `{}` with primitive {}",
                part.id,
                part.primitive
            );
            continue;
        }
        if let Some(&bad) =
            part.indices.iter().find(|&&i| i as usize >= count)
        {
            return Err(ViewError::Format(format!(
                "part `{}` index {bad} out of range ({count} vertices)",
                part.id
            )));
        }
        parts.push(MeshPart {
            id: part.id.clone(),
            indices: part.indices.clone(),
        });
    }

    Ok(MeshData { vertices, parts })
}

fn node_local_transform(node: &NodeDef) -> Mat4 {
    let translation = node.translation.map_or(Vec3::ZERO, Vec3::from_array);
    let rotation = node
        .rotation
        .map_or(Quat::IDENTITY, |[x, y, z, w]| Quat::from_xyzw(x, y, z, w));
    let scale = node.scale.map_or(Vec3::ONE, Vec3::from_array);
    Mat4::from_scale_rotation_translation(scale, rotation, translation)
}

/// Walk the node hierarchy, baking world transforms into draw items.
fn collect_draw_items(
    nodes: &[NodeDef],
    parent: Mat4,
    parts_by_id: &FxHashMap<&str, (usize, usize)>,
    materials_by_id: &FxHashMap<&str, usize>,
    out: &mut Vec<DrawItem>,
) {
    for node in nodes {
        let world = parent * node_local_transform(node);
        for binding in &node.parts {
            let Some(&(mesh, part)) =
                parts_by_id.get(binding.meshpartid.as_str())
            else {
                log::warn!(
                    "node `{}` references unknown mesh part `{}`",
                    node.id,
                    binding.meshpartid
                );
                continue;
            };
            let Some(&material) =
                materials_by_id.get(binding.materialid.as_str())
            else {
                log::warn!(
                    "node `{}` references unknown material `{}`",
                    node.id,
                    binding.materialid
                );
                continue;
            };
            out.push(DrawItem {
                mesh,
                part,
                material,
                transform: world,
            });
        }
        collect_draw_items(
            &node.children,
            world,
            parts_by_id,
            materials_by_id,
            out,
        );
    }
}

/// Load a model from JSON text.
///
/// `resolver` is called synchronously once per referenced texture
/// filename and returns the raw image bytes; a resolver failure fails the
/// whole load (the caller keeps its previous model).
pub fn load_model<R>(
    name: &str,
    json: &str,
    mut resolver: R,
) -> Result<Model, ViewError>
where
    R: FnMut(&str) -> Result<Vec<u8>, ViewError>,
{
    let document = ModelDocument::from_json(json)?;

    let meshes = document
        .meshes
        .iter()
        .map(convert_mesh)
        .collect::<Result<Vec<_>, _>>()?;

    let mut materials = Vec::with_capacity(document.materials.len());
    for def in &document.materials {
        let texture = match def.textures.first() {
            Some(tex) => Some(TextureData {
                filename: tex.filename.clone(),
                bytes: resolver(&tex.filename)?,
            }),
            None => None,
        };
        materials.push(Material {
            id: def.id.clone(),
            diffuse: def.diffuse.map_or(Vec3::ONE, Vec3::from_array),
            texture,
        });
    }

    let mut parts_by_id = FxHashMap::default();
    for (mesh_idx, mesh) in meshes.iter().enumerate() {
        for (part_idx, part) in mesh.parts.iter().enumerate() {
            let _ = parts_by_id.insert(part.id.as_str(), (mesh_idx, part_idx));
        }
    }
    let materials_by_id: FxHashMap<&str, usize> = materials
        .iter()
        .enumerate()
        .map(|(i, m)| (m.id.as_str(), i))
        .collect();

    let mut draw_items = Vec::new();
    collect_draw_items(
        &document.nodes,
        Mat4::IDENTITY,
        &parts_by_id,
        &materials_by_id,
        &mut draw_items,
    );

    let animations = document
        .animations
        .iter()
        .map(|a| ModelAnimation {
            id: a.id.clone(),
            duration: a.duration(),
        })
        .collect();

    let model_name = if document.id.is_empty() {
        name.to_owned()
    } else {
        document.id.clone()
    };

    Ok(Model::new(
        model_name, meshes, materials, draw_items, animations,
    ))
}

/// Load a model from a file, resolving textures relative to its folder.
pub fn load_model_file(path: &Path) -> Result<Model, ViewError> {
    let json = std::fs::read_to_string(path)?;
    let folder = path.parent().unwrap_or_else(|| Path::new("."));
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();

    load_model(stem, &json, |texture_name| {
        std::fs::read(folder.join(texture_name)).map_err(ViewError::Io)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXTURED: &str = r#"{
        "id": "crate",
        "meshes": [{
            "attributes": ["POSITION", "NORMAL", "TEXCOORD0"],
            "vertices": [
                0,0,0, 0,1,0, 0,0,
                1,0,0, 0,1,0, 1,0,
                0,0,1, 0,1,0, 0,1
            ],
            "parts": [
                {"id": "lid", "type": "TRIANGLES", "indices": [0,1,2]},
                {"id": "glow", "type": "LINES", "indices": [0,1]}
            ]
        }],
        "materials": [{
            "id": "wood",
            "diffuse": [0.8, 0.6, 0.4],
            "textures": [{"id": "d", "filename": "wood.png", "type": "DIFFUSE"}]
        }],
        "nodes": [{
            "id": "root",
            "translation": [0, 2, 0],
            "children": [{
                "id": "lid_node",
                "translation": [0, 0.5, 0],
                "parts": [{"meshpartid": "lid", "materialid": "wood"}]
            }]
        }],
        "animations": [{"id": "open", "bones": [
            {"boneId": "lid_node", "keyframes": [{"keytime": 0.5}]}
        ]}]
    }"#;

    #[test]
    fn loads_and_normalizes_vertices() {
        let model =
            load_model("crate", TEXTURED, |_| Ok(vec![1, 2, 3])).unwrap();
        assert_eq!(model.meshes.len(), 1);
        let mesh = &model.meshes[0];
        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.vertices[1].position, [1.0, 0.0, 0.0]);
        assert_eq!(mesh.vertices[1].uv, [1.0, 0.0]);
        // The LINES part is skipped, the TRIANGLES part kept.
        assert_eq!(mesh.parts.len(), 1);
        assert_eq!(mesh.parts[0].id, "lid");
    }

    #[test]
    fn resolver_is_called_per_texture() {
        let mut asked = Vec::new();
        let model = load_model("crate", TEXTURED, |name| {
            asked.push(name.to_owned());
            Ok(vec![0xde, 0xad])
        })
        .unwrap();
        assert_eq!(asked, ["wood.png"]);
        let tex = model.materials[0].texture.as_ref().unwrap();
        assert_eq!(tex.bytes, [0xde, 0xad]);
    }

    #[test]
    fn resolver_failure_fails_the_load() {
        let result = load_model("crate", TEXTURED, |name| {
            Err(ViewError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                name.to_owned(),
            )))
        });
        assert!(matches!(result, Err(ViewError::Io(_))));
    }

    #[test]
    fn draw_items_bake_nested_transforms() {
        let model = load_model("crate", TEXTURED, |_| Ok(Vec::new())).unwrap();
        assert_eq!(model.draw_items.len(), 1);
        let item = &model.draw_items[0];
        assert_eq!((item.mesh, item.part, item.material), (0, 0, 0));
        let origin = item.transform.transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(0.0, 2.5, 0.0)).length() < 1e-6);
    }

    #[test]
    fn animation_table_carries_durations() {
        let model = load_model("crate", TEXTURED, |_| Ok(Vec::new())).unwrap();
        assert_eq!(model.animations.len(), 1);
        assert_eq!(model.animations[0].id, "open");
        assert!((model.animations[0].duration - 0.5).abs() < 1e-6);
    }

    #[test]
    fn out_of_range_index_is_a_format_error() {
        let bad = r#"{
            "meshes": [{
                "attributes": ["POSITION"],
                "vertices": [0,0,0],
                "parts": [{"id": "p", "type": "TRIANGLES", "indices": [0,0,9]}]
            }]
        }"#;
        assert!(matches!(
            load_model("bad", bad, |_| Ok(Vec::new())),
            Err(ViewError::Format(_))
        ));
    }

    #[test]
    fn missing_position_is_a_format_error() {
        let bad = r#"{
            "meshes": [{"attributes": ["NORMAL"], "vertices": [0,0,0]}]
        }"#;
        assert!(matches!(
            load_model("bad", bad, |_| Ok(Vec::new())),
            Err(ViewError::Format(_))
        ));
    }
}
