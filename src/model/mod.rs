//! Runtime model representation and the JSON document loader.
//!
//! [`document`] is the serde decode of the G3DJ exchange document;
//! [`loader`] normalizes a document into the [`Model`] the scene holds.

/// serde structs for the viewer-visible surface of the G3DJ document.
pub mod document;
/// Document-to-[`Model`] conversion and file loading.
pub mod loader;

use std::sync::atomic::{AtomicU64, Ordering};

use glam::{Mat4, Vec3};

pub use loader::{load_model, load_model_file};

/// Process-unique tag source for loaded models; lets a stale
/// [`AnimationHandle`] from a previous model be detected.
static NEXT_MODEL_TAG: AtomicU64 = AtomicU64::new(1);

/// Interleaved vertex layout every mesh is normalized into at load time.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Object-space normal (zero when the source mesh has none).
    pub normal: [f32; 3],
    /// Diffuse texture coordinates (zero when the source mesh has none).
    pub uv: [f32; 2],
}

/// One triangle-list part of a mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshPart {
    /// Part id referenced from node part bindings.
    pub id: String,
    /// Triangle-list indices into the owning mesh's vertices.
    pub indices: Vec<u32>,
}

/// A mesh: one vertex array shared by its parts.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    /// Normalized vertices.
    pub vertices: Vec<Vertex>,
    /// Triangle-list parts.
    pub parts: Vec<MeshPart>,
}

/// Raw bytes of a texture referenced by a material. Decode happens at GPU
/// upload, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureData {
    /// Filename as referenced by the document (model-folder relative).
    pub filename: String,
    /// Undecoded image bytes.
    pub bytes: Vec<u8>,
}

/// A material: diffuse color plus an optional diffuse texture.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Material id referenced from node part bindings.
    pub id: String,
    /// Diffuse color, linear RGB.
    pub diffuse: Vec3,
    /// Diffuse texture, if the document references one.
    pub texture: Option<TextureData>,
}

/// One drawable unit: a mesh part with its material and the node world
/// transform baked at load time (static pose; skinning is out of scope).
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    /// Index into [`Model::meshes`].
    pub mesh: usize,
    /// Index into that mesh's parts.
    pub part: usize,
    /// Index into [`Model::materials`].
    pub material: usize,
    /// Baked node world transform.
    pub transform: Mat4,
}

/// An animation owned by a model: its name and total duration.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelAnimation {
    /// Animation id as named in the document.
    pub id: String,
    /// Duration in seconds (maximum keyframe time across bones).
    pub duration: f32,
}

/// Opaque reference to an animation owned by a specific loaded model.
///
/// Carries the owning model's tag so a handle surviving a model switch is
/// rejected instead of silently selecting the wrong animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationHandle {
    tag: u64,
    index: usize,
}

/// A loaded model: geometry, materials, draw list, and the animation
/// table with its playback clock.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    tag: u64,
    /// Model name (document id, or the file stem when absent).
    pub name: String,
    /// Normalized meshes.
    pub meshes: Vec<MeshData>,
    /// Materials referenced by the draw list.
    pub materials: Vec<Material>,
    /// Flat draw list with baked transforms.
    pub draw_items: Vec<DrawItem>,
    /// Animation table, in document order.
    pub animations: Vec<ModelAnimation>,
    current_animation: Option<usize>,
    clock: f32,
}

impl Model {
    pub(crate) fn new(
        name: String,
        meshes: Vec<MeshData>,
        materials: Vec<Material>,
        draw_items: Vec<DrawItem>,
        animations: Vec<ModelAnimation>,
    ) -> Self {
        Self {
            tag: NEXT_MODEL_TAG.fetch_add(1, Ordering::Relaxed),
            name,
            meshes,
            materials,
            draw_items,
            animations,
            current_animation: None,
            clock: 0.0,
        }
    }

    /// Handle for the animation at `index`, if it exists.
    #[must_use]
    pub fn animation_handle(&self, index: usize) -> Option<AnimationHandle> {
        (index < self.animations.len()).then_some(AnimationHandle {
            tag: self.tag,
            index,
        })
    }

    /// Whether `handle` was issued by this model.
    #[must_use]
    pub fn owns(&self, handle: AnimationHandle) -> bool {
        handle.tag == self.tag && handle.index < self.animations.len()
    }

    /// The currently selected animation, if any.
    #[must_use]
    pub fn current_animation(&self) -> Option<&ModelAnimation> {
        self.current_animation.and_then(|i| self.animations.get(i))
    }

    /// Select an animation by handle, or clear the selection with `None`.
    /// The playback clock restarts on every change.
    ///
    /// Returns `false` (and changes nothing) when the handle belongs to a
    /// different model.
    pub fn select_animation(
        &mut self,
        handle: Option<AnimationHandle>,
    ) -> bool {
        match handle {
            Some(h) if !self.owns(h) => false,
            Some(h) => {
                self.current_animation = Some(h.index);
                self.clock = 0.0;
                true
            }
            None => {
                self.current_animation = None;
                self.clock = 0.0;
                true
            }
        }
    }

    /// Advance the playback clock of the selected animation, wrapping at
    /// its duration. No-op without a selection.
    pub fn advance_animation(&mut self, dt: f32) {
        let Some(animation) = self.current_animation() else {
            return;
        };
        let duration = animation.duration;
        if duration <= 0.0 {
            self.clock = 0.0;
            return;
        }
        self.clock = (self.clock + dt) % duration;
    }

    /// Current playback clock in seconds.
    #[must_use]
    pub fn animation_clock(&self) -> f32 {
        self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model_with_animations(names: &[&str]) -> Model {
        Model::new(
            "test".to_owned(),
            Vec::new(),
            Vec::new(),
            Vec::new(),
            names
                .iter()
                .map(|n| ModelAnimation {
                    id: (*n).to_owned(),
                    duration: 2.0,
                })
                .collect(),
        )
    }

    #[test]
    fn handles_are_model_specific() {
        let a = model_with_animations(&["walk"]);
        let mut b = model_with_animations(&["walk"]);

        let foreign = a.animation_handle(0).unwrap();
        assert!(!b.owns(foreign));
        assert!(!b.select_animation(Some(foreign)));
        assert!(b.current_animation().is_none());

        let own = b.animation_handle(0).unwrap();
        assert!(b.select_animation(Some(own)));
        assert_eq!(b.current_animation().unwrap().id, "walk");
    }

    #[test]
    fn out_of_range_handle_is_none() {
        let m = model_with_animations(&["walk"]);
        assert!(m.animation_handle(1).is_none());
    }

    #[test]
    fn clock_wraps_and_resets_on_selection() {
        let mut m = model_with_animations(&["walk", "run"]);
        let walk = m.animation_handle(0).unwrap();
        assert!(m.select_animation(Some(walk)));

        m.advance_animation(1.5);
        assert!((m.animation_clock() - 1.5).abs() < 1e-6);
        m.advance_animation(1.0);
        assert!((m.animation_clock() - 0.5).abs() < 1e-6);

        let run = m.animation_handle(1).unwrap();
        assert!(m.select_animation(Some(run)));
        assert_eq!(m.animation_clock(), 0.0);
    }

    #[test]
    fn clock_is_inert_without_selection() {
        let mut m = model_with_animations(&["walk"]);
        m.advance_animation(1.0);
        assert_eq!(m.animation_clock(), 0.0);
    }
}
