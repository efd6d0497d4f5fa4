//! The scene the renderer consumes: model list, light list, camera.

use crate::camera::core::Camera;
use crate::lighting::DirectLight;
use crate::model::Model;

/// Scene contents for one frame.
///
/// The viewer keeps zero or one model loaded; the list shape matches the
/// renderer's contract. Model mutations bump a generation counter so the
/// renderer knows when its GPU copies are stale.
pub struct Scene {
    models: Vec<Model>,
    lights: Vec<DirectLight>,
    /// The view camera, mutated in place by the input controller.
    pub camera: Camera,
    generation: u64,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create an empty scene with the default camera.
    #[must_use]
    pub fn new() -> Self {
        Self {
            models: Vec::new(),
            lights: Vec::new(),
            camera: Camera::default(),
            generation: 0,
        }
    }

    /// Loaded models (zero or one in this viewer).
    #[must_use]
    pub fn models(&self) -> &[Model] {
        &self.models
    }

    /// The active model, if one is loaded.
    #[must_use]
    pub fn active_model(&self) -> Option<&Model> {
        self.models.first()
    }

    /// Mutable access to the active model (animation clock, selection).
    pub fn active_model_mut(&mut self) -> Option<&mut Model> {
        self.models.first_mut()
    }

    /// Replace the loaded model (or clear it with `None`). The previous
    /// model is dropped; nothing else retains it.
    pub fn replace_model(&mut self, model: Option<Model>) {
        self.models.clear();
        if let Some(model) = model {
            self.models.push(model);
        }
        self.generation += 1;
    }

    /// The active light list.
    #[must_use]
    pub fn lights(&self) -> &[DirectLight] {
        &self.lights
    }

    /// Replace the light list wholesale.
    pub fn set_lights(&mut self, lights: &[DirectLight]) {
        self.lights.clear();
        self.lights.extend_from_slice(lights);
    }

    /// Clear the light list.
    pub fn clear_lights(&mut self) {
        self.lights.clear();
    }

    /// Generation counter; changes whenever the model list does.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lighting::DEFAULT_LIGHTS;
    use crate::model::Model;

    fn empty_model() -> Model {
        Model::new(
            "m".to_owned(),
            Vec::new(),
            Vec::new(),
            Vec::new(),
            Vec::new(),
        )
    }

    #[test]
    fn replace_model_bumps_generation() {
        let mut scene = Scene::new();
        let g0 = scene.generation();
        scene.replace_model(Some(empty_model()));
        assert_eq!(scene.models().len(), 1);
        assert!(scene.generation() > g0);

        let g1 = scene.generation();
        scene.replace_model(None);
        assert!(scene.models().is_empty());
        assert!(scene.generation() > g1);
    }

    #[test]
    fn light_list_round_trips() {
        let mut scene = Scene::new();
        assert!(scene.lights().is_empty());
        scene.set_lights(&DEFAULT_LIGHTS);
        assert_eq!(scene.lights().len(), 3);
        scene.clear_lights();
        assert!(scene.lights().is_empty());
    }
}
