//! The viewer-level state machine.
//!
//! Owns everything the UI events address (active folder, file listing,
//! animation entry list, lighting toggle) and mediates between those
//! events and the [`Scene`] the renderer reads. Every transition either
//! fully applies or leaves prior state untouched; errors are returned for
//! the shell to surface and never escalate past this boundary.

use std::path::PathBuf;

use glam::Vec3;

use crate::camera::core::DEFAULT_VIEW_POSITION;
use crate::error::ViewError;
use crate::files::{enumerate_models, FileEntry};
use crate::lighting::DEFAULT_LIGHTS;
use crate::model::{load_model_file, AnimationHandle};
use crate::scene::Scene;

/// UI-originated events, applied synchronously on the main loop.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerEvent {
    /// The browse dialog confirmed a new model folder.
    FolderChanged(PathBuf),
    /// A file was selected (`None` clears the selection).
    FileSelected(Option<String>),
    /// An animation was selected (`None` clears the selection).
    AnimationSelected(Option<AnimationHandle>),
    /// The lighting checkbox changed.
    LightingToggled(bool),
}

/// One row of the animation selection list. The leading row is the
/// "no animation" entry with neither handle nor name.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationEntry {
    /// Handle to pass back in an [`ViewerEvent::AnimationSelected`].
    pub handle: Option<AnimationHandle>,
    /// Display name; `None` for the leading "no animation" row.
    pub name: Option<String>,
}

/// Mutable view-level state addressed by UI events.
pub struct ViewerState {
    folder: Option<PathBuf>,
    files: Vec<FileEntry>,
    animation_entries: Vec<AnimationEntry>,
    lighting_enabled: bool,
}

impl Default for ViewerState {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewerState {
    /// Create the startup state: no folder, no model, lighting off.
    #[must_use]
    pub fn new() -> Self {
        Self {
            folder: None,
            files: Vec::new(),
            animation_entries: vec![AnimationEntry {
                handle: None,
                name: None,
            }],
            lighting_enabled: false,
        }
    }

    /// The active model folder, once one has been chosen.
    #[must_use]
    pub fn folder(&self) -> Option<&PathBuf> {
        self.folder.as_ref()
    }

    /// Non-hidden model files of the active folder, in listing order.
    #[must_use]
    pub fn files(&self) -> &[FileEntry] {
        &self.files
    }

    /// Animation selection rows for the active model ("none" row first).
    #[must_use]
    pub fn animation_entries(&self) -> &[AnimationEntry] {
        &self.animation_entries
    }

    /// Whether the default light rig is applied.
    #[must_use]
    pub fn lighting_enabled(&self) -> bool {
        self.lighting_enabled
    }

    /// Apply one UI event to this state and the scene it mediates.
    ///
    /// On error the transition did not happen and all prior state is
    /// intact.
    pub fn handle_event(
        &mut self,
        scene: &mut Scene,
        event: ViewerEvent,
    ) -> Result<(), ViewError> {
        match event {
            ViewerEvent::FolderChanged(path) => self.set_folder(path),
            ViewerEvent::FileSelected(name) => {
                self.select_file(scene, name.as_deref())
            }
            ViewerEvent::AnimationSelected(handle) => {
                Self::select_animation(scene, handle)
            }
            ViewerEvent::LightingToggled(enabled) => {
                self.set_lighting(scene, enabled);
                Ok(())
            }
        }
    }

    /// Switch the active folder, replacing the file listing wholesale
    /// with its non-hidden model files. Enumeration happens first; on
    /// failure the previous folder and listing survive.
    fn set_folder(&mut self, path: PathBuf) -> Result<(), ViewError> {
        let entries = enumerate_models(&path)?;
        self.files = entries.into_iter().filter(|e| !e.is_hidden).collect();
        self.folder = Some(path);
        Ok(())
    }

    /// Load the named file as the new model, or clear the model with
    /// `None`. Both success paths reset the camera to the default view;
    /// a failed load retains the previous model, camera, and animation
    /// list.
    fn select_file(
        &mut self,
        scene: &mut Scene,
        name: Option<&str>,
    ) -> Result<(), ViewError> {
        let Some(name) = name else {
            scene.replace_model(None);
            self.rebuild_animation_entries(scene);
            Self::reset_camera(scene);
            return Ok(());
        };

        let path = self
            .files
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.full_path.clone())
            .or_else(|| self.folder.as_ref().map(|f| f.join(name)))
            .unwrap_or_else(|| PathBuf::from(name));

        let model = load_model_file(&path)?;
        scene.replace_model(Some(model));
        self.rebuild_animation_entries(scene);
        Self::reset_camera(scene);
        Ok(())
    }

    /// Switch the active model's animation. A handle minted by any other
    /// model is rejected without side effects.
    fn select_animation(
        scene: &mut Scene,
        handle: Option<AnimationHandle>,
    ) -> Result<(), ViewError> {
        let Some(model) = scene.active_model_mut() else {
            if handle.is_none() {
                return Ok(());
            }
            return Err(ViewError::InvalidSelection(
                "no model is loaded".to_owned(),
            ));
        };
        if model.select_animation(handle) {
            Ok(())
        } else {
            Err(ViewError::InvalidSelection(
                "animation does not belong to the loaded model".to_owned(),
            ))
        }
    }

    /// Apply or clear the default light rig. The scene light list is a
    /// global override: clearing removes every light.
    fn set_lighting(&mut self, scene: &mut Scene, enabled: bool) {
        self.lighting_enabled = enabled;
        scene.clear_lights();
        if enabled {
            scene.set_lights(&DEFAULT_LIGHTS);
        }
    }

    /// Rebuild the animation rows from the active model's own table,
    /// which keeps any selectable handle owned by that model.
    fn rebuild_animation_entries(&mut self, scene: &Scene) {
        self.animation_entries.clear();
        self.animation_entries.push(AnimationEntry {
            handle: None,
            name: None,
        });
        if let Some(model) = scene.active_model() {
            for (index, animation) in model.animations.iter().enumerate() {
                self.animation_entries.push(AnimationEntry {
                    handle: model.animation_handle(index),
                    name: Some(animation.id.clone()),
                });
            }
        }
    }

    fn reset_camera(scene: &mut Scene) {
        scene.camera.set_look_at(DEFAULT_VIEW_POSITION, Vec3::ZERO);
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    const ROBOT: &str = r#"{
        "id": "robot",
        "meshes": [{
            "attributes": ["POSITION"],
            "vertices": [0,0,0, 1,0,0, 0,1,0],
            "parts": [{"id": "body", "type": "TRIANGLES", "indices": [0,1,2]}]
        }],
        "materials": [{"id": "skin", "diffuse": [0.5, 0.5, 0.5]}],
        "nodes": [{"id": "root", "parts": [
            {"meshpartid": "body", "materialid": "skin"}
        ]}],
        "animations": [
            {"id": "walk", "bones": [{"boneId": "root", "keyframes": [{"keytime": 1.0}]}]},
            {"id": "wave", "bones": [{"boneId": "root", "keyframes": [{"keytime": 0.25}]}]}
        ]
    }"#;

    fn write_robot(dir: &Path) {
        std::fs::write(dir.join("robot.g3dj"), ROBOT).unwrap();
    }

    fn entry_names(state: &ViewerState) -> Vec<Option<String>> {
        state
            .animation_entries()
            .iter()
            .map(|e| e.name.clone())
            .collect()
    }

    #[test]
    fn folder_change_replaces_listing() {
        let tmp = tempfile::TempDir::new().unwrap();
        write_robot(tmp.path());
        std::fs::write(tmp.path().join(".hidden.g3dj"), ROBOT).unwrap();
        std::fs::write(tmp.path().join("readme.txt"), "hi").unwrap();

        let mut state = ViewerState::new();
        let mut scene = Scene::new();
        state
            .handle_event(
                &mut scene,
                ViewerEvent::FolderChanged(tmp.path().to_path_buf()),
            )
            .unwrap();

        let names: Vec<_> =
            state.files().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["robot.g3dj"]);
        assert_eq!(state.folder(), Some(&tmp.path().to_path_buf()));
    }

    #[test]
    fn bad_folder_keeps_prior_listing() {
        let tmp = tempfile::TempDir::new().unwrap();
        write_robot(tmp.path());

        let mut state = ViewerState::new();
        let mut scene = Scene::new();
        state
            .handle_event(
                &mut scene,
                ViewerEvent::FolderChanged(tmp.path().to_path_buf()),
            )
            .unwrap();

        let missing = tmp.path().join("missing");
        let result = state.handle_event(
            &mut scene,
            ViewerEvent::FolderChanged(missing.clone()),
        );
        assert!(matches!(result, Err(ViewError::NotFound(p)) if p == missing));
        assert_eq!(state.folder(), Some(&tmp.path().to_path_buf()));
        assert_eq!(state.files().len(), 1);
    }

    #[test]
    fn file_selection_loads_resets_camera_and_rebuilds_entries() {
        let tmp = tempfile::TempDir::new().unwrap();
        write_robot(tmp.path());

        let mut state = ViewerState::new();
        let mut scene = Scene::new();
        state
            .handle_event(
                &mut scene,
                ViewerEvent::FolderChanged(tmp.path().to_path_buf()),
            )
            .unwrap();

        // Wander the camera off before loading.
        scene.camera.set_look_at(Vec3::new(1.0, 2.0, 3.0), Vec3::ONE);

        state
            .handle_event(
                &mut scene,
                ViewerEvent::FileSelected(Some("robot.g3dj".to_owned())),
            )
            .unwrap();

        assert_eq!(scene.active_model().unwrap().name, "robot");
        assert_eq!(scene.camera.position, DEFAULT_VIEW_POSITION);
        assert_eq!(scene.camera.target, Vec3::ZERO);
        assert_eq!(
            entry_names(&state),
            [None, Some("walk".to_owned()), Some("wave".to_owned())]
        );
    }

    #[test]
    fn failed_load_retains_previous_model() {
        let tmp = tempfile::TempDir::new().unwrap();
        write_robot(tmp.path());
        std::fs::write(tmp.path().join("broken.g3dj"), "{oops").unwrap();

        let mut state = ViewerState::new();
        let mut scene = Scene::new();
        state
            .handle_event(
                &mut scene,
                ViewerEvent::FolderChanged(tmp.path().to_path_buf()),
            )
            .unwrap();
        state
            .handle_event(
                &mut scene,
                ViewerEvent::FileSelected(Some("robot.g3dj".to_owned())),
            )
            .unwrap();

        let generation = scene.generation();
        scene.camera.set_look_at(Vec3::new(4.0, 4.0, 4.0), Vec3::ZERO);

        let result = state.handle_event(
            &mut scene,
            ViewerEvent::FileSelected(Some("broken.g3dj".to_owned())),
        );
        assert!(matches!(result, Err(ViewError::Format(_))));
        assert_eq!(scene.active_model().unwrap().name, "robot");
        assert_eq!(scene.generation(), generation);
        // Camera untouched by the failed transition.
        assert_eq!(scene.camera.position, Vec3::new(4.0, 4.0, 4.0));
        assert_eq!(entry_names(&state).len(), 3);
    }

    #[test]
    fn clearing_selection_unloads_and_resets() {
        let tmp = tempfile::TempDir::new().unwrap();
        write_robot(tmp.path());

        let mut state = ViewerState::new();
        let mut scene = Scene::new();
        state
            .handle_event(
                &mut scene,
                ViewerEvent::FolderChanged(tmp.path().to_path_buf()),
            )
            .unwrap();
        state
            .handle_event(
                &mut scene,
                ViewerEvent::FileSelected(Some("robot.g3dj".to_owned())),
            )
            .unwrap();

        state
            .handle_event(&mut scene, ViewerEvent::FileSelected(None))
            .unwrap();
        assert!(scene.active_model().is_none());
        assert_eq!(entry_names(&state), [None]);
        assert_eq!(scene.camera.position, DEFAULT_VIEW_POSITION);
    }

    #[test]
    fn animation_selection_and_stale_handle_rejection() {
        let tmp = tempfile::TempDir::new().unwrap();
        write_robot(tmp.path());

        let mut state = ViewerState::new();
        let mut scene = Scene::new();
        state
            .handle_event(
                &mut scene,
                ViewerEvent::FolderChanged(tmp.path().to_path_buf()),
            )
            .unwrap();
        state
            .handle_event(
                &mut scene,
                ViewerEvent::FileSelected(Some("robot.g3dj".to_owned())),
            )
            .unwrap();

        let walk = state.animation_entries()[1].handle.unwrap();
        state
            .handle_event(
                &mut scene,
                ViewerEvent::AnimationSelected(Some(walk)),
            )
            .unwrap();
        assert_eq!(
            scene.active_model().unwrap().current_animation().unwrap().id,
            "walk"
        );

        // Reload the same file: fresh model, the old handle is stale.
        state
            .handle_event(
                &mut scene,
                ViewerEvent::FileSelected(Some("robot.g3dj".to_owned())),
            )
            .unwrap();
        let result = state.handle_event(
            &mut scene,
            ViewerEvent::AnimationSelected(Some(walk)),
        );
        assert!(matches!(result, Err(ViewError::InvalidSelection(_))));
        assert!(scene.active_model().unwrap().current_animation().is_none());

        // Clearing with no model loaded is fine.
        state
            .handle_event(&mut scene, ViewerEvent::FileSelected(None))
            .unwrap();
        state
            .handle_event(&mut scene, ViewerEvent::AnimationSelected(None))
            .unwrap();
    }

    #[test]
    fn lighting_round_trips_to_empty() {
        let mut state = ViewerState::new();
        let mut scene = Scene::new();

        state
            .handle_event(&mut scene, ViewerEvent::LightingToggled(true))
            .unwrap();
        assert!(state.lighting_enabled());
        assert_eq!(scene.lights(), &DEFAULT_LIGHTS);

        state
            .handle_event(&mut scene, ViewerEvent::LightingToggled(false))
            .unwrap();
        assert!(!state.lighting_enabled());
        assert!(scene.lights().is_empty());
    }
}
