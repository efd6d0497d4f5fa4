//! serde decode of the G3DJ exchange document.
//!
//! Only the surface the viewer consumes is modeled: mesh geometry,
//! material diffuse color and texture references, the node hierarchy, and
//! animation names/keytimes. Everything else in the document is ignored
//! by serde.

use serde::Deserialize;

use crate::error::ViewError;

/// Top-level document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ModelDocument {
    /// Document id; may be empty.
    pub id: String,
    /// Mesh definitions.
    pub meshes: Vec<MeshDef>,
    /// Material definitions.
    pub materials: Vec<MaterialDef>,
    /// Root nodes of the scene graph.
    pub nodes: Vec<NodeDef>,
    /// Animation definitions.
    pub animations: Vec<AnimationDef>,
}

impl ModelDocument {
    /// Parse a document from JSON text.
    pub fn from_json(json: &str) -> Result<Self, ViewError> {
        serde_json::from_str(json).map_err(|e| ViewError::Format(e.to_string()))
    }
}

/// A mesh: attribute names describing the flat vertex stream, plus parts.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MeshDef {
    /// Vertex attribute names, e.g. `POSITION`, `NORMAL`, `TEXCOORD0`.
    pub attributes: Vec<String>,
    /// Interleaved vertex components.
    pub vertices: Vec<f32>,
    /// Index ranges by primitive type.
    pub parts: Vec<MeshPartDef>,
}

/// One indexed part of a mesh.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MeshPartDef {
    /// Part id, referenced from node part bindings.
    pub id: String,
    /// Primitive type, e.g. `TRIANGLES`.
    #[serde(rename = "type")]
    pub primitive: String,
    /// Indices into the owning mesh's vertices.
    pub indices: Vec<u32>,
}

/// A material definition.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MaterialDef {
    /// Material id, referenced from node part bindings.
    pub id: String,
    /// Diffuse color, RGB.
    pub diffuse: Option<[f32; 3]>,
    /// Texture references; the first one is used as the diffuse map.
    pub textures: Vec<TextureDef>,
}

/// A texture reference inside a material.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TextureDef {
    /// Texture id within the material.
    pub id: String,
    /// Image filename, relative to the model file's folder.
    pub filename: String,
    /// Usage tag, e.g. `DIFFUSE`.
    #[serde(rename = "type")]
    pub usage: String,
}

/// A scene-graph node: TRS transform, part bindings, children.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NodeDef {
    /// Node id.
    pub id: String,
    /// Local translation.
    pub translation: Option<[f32; 3]>,
    /// Local rotation quaternion, `[x, y, z, w]`.
    pub rotation: Option<[f32; 4]>,
    /// Local scale.
    pub scale: Option<[f32; 3]>,
    /// Mesh-part/material bindings drawn at this node.
    pub parts: Vec<NodePartDef>,
    /// Child nodes.
    pub children: Vec<NodeDef>,
}

/// Binding of a mesh part to a material at a node.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NodePartDef {
    /// Id of the mesh part to draw.
    pub meshpartid: String,
    /// Id of the material to draw it with.
    pub materialid: String,
}

/// An animation: bones with keyframes; only keytimes are consumed here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnimationDef {
    /// Animation id.
    pub id: String,
    /// Per-bone keyframe tracks.
    pub bones: Vec<BoneTrackDef>,
}

/// One bone's keyframe track.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BoneTrackDef {
    /// Target bone id.
    #[serde(rename = "boneId")]
    pub bone_id: String,
    /// Keyframes; transform payloads are ignored.
    pub keyframes: Vec<KeyframeDef>,
}

/// A keyframe; only its time is consumed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct KeyframeDef {
    /// Key time in seconds.
    pub keytime: f32,
}

impl AnimationDef {
    /// Total duration: the maximum keytime across all bone tracks.
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.bones
            .iter()
            .flat_map(|bone| bone.keyframes.iter())
            .map(|key| key.keytime)
            .fold(0.0, f32::max)
    }
}

/// Component count of a vertex attribute, or a `Format` error for
/// attributes this viewer does not understand.
pub fn attribute_size(name: &str) -> Result<usize, ViewError> {
    let size = match name {
        "POSITION" | "NORMAL" | "TANGENT" | "BINORMAL" => 3,
        "COLOR" => 4,
        "COLORPACKED" => 1,
        _ if name.starts_with("TEXCOORD") => 2,
        _ if name.starts_with("BLENDWEIGHT") => 2,
        _ => {
            return Err(ViewError::Format(format!(
                "unknown vertex attribute `{name}`"
            )))
        }
    };
    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "id": "cube",
        "meshes": [{
            "attributes": ["POSITION", "NORMAL"],
            "vertices": [0,0,0, 0,1,0, 1,0,0, 0,1,0, 0,0,1, 0,1,0],
            "parts": [{"id": "part0", "type": "TRIANGLES", "indices": [0,1,2]}]
        }],
        "materials": [{"id": "mat0", "diffuse": [1.0, 0.5, 0.25]}],
        "nodes": [{"id": "root", "parts": [{"meshpartid": "part0", "materialid": "mat0"}]}],
        "animations": [{
            "id": "spin",
            "bones": [{"boneId": "root", "keyframes": [
                {"keytime": 0.0}, {"keytime": 1.25}
            ]}]
        }]
    }"#;

    #[test]
    fn parses_minimal_document() {
        let doc = ModelDocument::from_json(MINIMAL).unwrap();
        assert_eq!(doc.id, "cube");
        assert_eq!(doc.meshes[0].parts[0].indices, [0, 1, 2]);
        assert_eq!(doc.materials[0].diffuse, Some([1.0, 0.5, 0.25]));
        assert_eq!(doc.animations[0].id, "spin");
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let doc =
            ModelDocument::from_json(r#"{"version": [0, 1], "meshes": []}"#)
                .unwrap();
        assert!(doc.meshes.is_empty());
    }

    #[test]
    fn malformed_json_is_a_format_error() {
        match ModelDocument::from_json("{not json") {
            Err(ViewError::Format(_)) => {}
            other => panic!("expected Format error, got {other:?}"),
        }
    }

    #[test]
    fn duration_is_max_keytime() {
        let doc = ModelDocument::from_json(MINIMAL).unwrap();
        assert!((doc.animations[0].duration() - 1.25).abs() < 1e-6);
        assert_eq!(AnimationDef::default().duration(), 0.0);
    }

    #[test]
    fn attribute_sizes() {
        assert_eq!(attribute_size("POSITION").unwrap(), 3);
        assert_eq!(attribute_size("TEXCOORD0").unwrap(), 2);
        assert_eq!(attribute_size("COLORPACKED").unwrap(), 1);
        assert!(attribute_size("FANCY").is_err());
    }
}
