//! Ties the core pieces together for the shell: scene, viewer state,
//! camera controller, renderer, and the cursors behind the next/previous
//! cycling actions.

use std::path::PathBuf;

use glam::Vec3;

use crate::camera::controller::CameraInputController;
use crate::camera::core::DEFAULT_VIEW_POSITION;
use crate::error::ViewError;
use crate::gpu::GpuContext;
use crate::input::KeyAction;
use crate::options::Options;
use crate::renderer::{ForwardRenderer, RenderStatistics};
use crate::scene::Scene;
use crate::state::{ViewerEvent, ViewerState};

/// Step a wrapping cursor over a list of `len` entries.
fn step_index(len: usize, current: Option<usize>, forward: bool) -> usize {
    match current {
        Some(index) if forward => (index + 1) % len,
        Some(index) => (index + len - 1) % len,
        None if forward => 0,
        None => len - 1,
    }
}

/// The viewer application core, one per window.
pub struct ViewerEngine {
    renderer: ForwardRenderer,
    scene: Scene,
    state: ViewerState,
    controller: CameraInputController,
    file_cursor: Option<usize>,
    animation_cursor: usize,
}

impl ViewerEngine {
    /// Build an engine over an initialized GPU context.
    #[must_use]
    pub fn new(context: GpuContext, options: &Options) -> Self {
        let mut scene = Scene::new();
        scene.camera.aspect =
            context.config.width as f32 / context.config.height.max(1) as f32;

        Self {
            renderer: ForwardRenderer::new(context),
            scene,
            state: ViewerState::new(),
            controller: CameraInputController::with_speeds(
                options.camera.speeds(),
            ),
            file_cursor: None,
            animation_cursor: 0,
        }
    }

    /// Read access to the view-level state.
    #[must_use]
    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    /// Read access to the scene.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The camera controller, for the shell's per-frame input push.
    pub fn controller_mut(&mut self) -> &mut CameraInputController {
        &mut self.controller
    }

    /// Last frame's draw counters.
    #[must_use]
    pub fn statistics(&self) -> RenderStatistics {
        self.renderer.statistics()
    }

    /// Apply one UI event and keep the cycling cursors in step with it.
    pub fn handle_event(
        &mut self,
        event: ViewerEvent,
    ) -> Result<(), ViewError> {
        let outcome = self.state.handle_event(&mut self.scene, event.clone());
        if outcome.is_ok() {
            match event {
                ViewerEvent::FolderChanged(_) => {
                    self.file_cursor = None;
                }
                ViewerEvent::FileSelected(name) => {
                    self.file_cursor = name.as_deref().and_then(|n| {
                        self.state.files().iter().position(|f| f.name == n)
                    });
                    self.animation_cursor = 0;
                }
                ViewerEvent::AnimationSelected(handle) => {
                    self.animation_cursor = self
                        .state
                        .animation_entries()
                        .iter()
                        .position(|e| e.handle == handle)
                        .unwrap_or(0);
                }
                ViewerEvent::LightingToggled(_) => {}
            }
        }
        outcome
    }

    /// Perform a discrete key action. [`KeyAction::OpenFolder`] needs the
    /// shell's dialog and is a no-op here.
    pub fn apply_action(&mut self, action: KeyAction) -> Result<(), ViewError> {
        match action {
            KeyAction::OpenFolder => {
                log::debug!("open-folder is handled by the shell");
                Ok(())
            }
            KeyAction::NextFile | KeyAction::PrevFile => {
                if self.state.files().is_empty() {
                    return Ok(());
                }
                let forward = action == KeyAction::NextFile;
                let index = step_index(
                    self.state.files().len(),
                    self.file_cursor,
                    forward,
                );
                let name = self.state.files()[index].name.clone();
                self.handle_event(ViewerEvent::FileSelected(Some(name)))
            }
            KeyAction::ClearModel => {
                self.handle_event(ViewerEvent::FileSelected(None))
            }
            KeyAction::NextAnimation | KeyAction::PrevAnimation => {
                let entries = self.state.animation_entries();
                if entries.len() <= 1 {
                    return Ok(());
                }
                let forward = action == KeyAction::NextAnimation;
                let index = step_index(
                    entries.len(),
                    Some(self.animation_cursor),
                    forward,
                );
                let handle = entries[index].handle;
                self.handle_event(ViewerEvent::AnimationSelected(handle))
            }
            KeyAction::ToggleLighting => self.handle_event(
                ViewerEvent::LightingToggled(!self.state.lighting_enabled()),
            ),
            KeyAction::ResetCamera => {
                self.scene
                    .camera
                    .set_look_at(DEFAULT_VIEW_POSITION, Vec3::ZERO);
                Ok(())
            }
        }
    }

    /// Point the viewer at a starting folder (startup convenience).
    pub fn set_folder(&mut self, folder: PathBuf) -> Result<(), ViewError> {
        self.handle_event(ViewerEvent::FolderChanged(folder))
    }

    /// Advance one frame: camera motion, then the animation clock.
    /// Call after the frame's events and input sampling, before
    /// [`render`](Self::render).
    pub fn update(&mut self, dt: f32) {
        // Key movement normalized to a 60 Hz reference step.
        self.controller
            .update_scaled(&mut self.scene.camera, dt * 60.0);
        if let Some(model) = self.scene.active_model_mut() {
            model.advance_animation(dt);
        }
    }

    /// Draw the frame.
    ///
    /// # Errors
    ///
    /// Propagates [`wgpu::SurfaceError`]; on `Lost`/`Outdated` the shell
    /// resizes and tries again next frame.
    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.renderer.begin()?;
        self.renderer.draw_scene(&self.scene);
        self.renderer.end();
        Ok(())
    }

    /// Handle a window resize.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.renderer.resize(width, height);
        self.scene.camera.aspect = width as f32 / height.max(1) as f32;
    }

    /// Compose the status line shown in the window title.
    #[must_use]
    pub fn status_line(&self, fps: f32) -> String {
        let model = self
            .scene
            .active_model()
            .map_or("no model", |m| m.name.as_str());
        format!(
            "{} | {} | {:.0} fps | {} meshes",
            model,
            self.scene.camera,
            fps,
            self.renderer.statistics().meshes_drawn
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_index_wraps_both_ways() {
        assert_eq!(step_index(3, None, true), 0);
        assert_eq!(step_index(3, Some(0), true), 1);
        assert_eq!(step_index(3, Some(2), true), 0);
        assert_eq!(step_index(3, None, false), 2);
        assert_eq!(step_index(3, Some(0), false), 2);
        assert_eq!(step_index(3, Some(2), false), 1);
        assert_eq!(step_index(1, Some(0), true), 0);
    }
}
