//! Runtime configuration with TOML load/save.
//!
//! Every sub-struct uses `#[serde(default)]` so a partial file (e.g. only
//! overriding `[camera]`) works.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::camera::controller::ControllerSpeeds;
use crate::error::ViewError;
use crate::input::KeyBindings;

/// Initial window dimensions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WindowOptions {
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
        }
    }
}

/// Camera controller speeds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraOptions {
    /// Radians of orbit per pixel of pointer delta.
    pub rotate_speed: f32,
    /// World units of pan per pixel of pointer delta.
    pub pan_speed: f32,
    /// World units of key movement per frame step.
    pub move_speed: f32,
    /// Dolly factor per scroll unit.
    pub zoom_speed: f32,
}

impl Default for CameraOptions {
    fn default() -> Self {
        let speeds = ControllerSpeeds::default();
        Self {
            rotate_speed: speeds.rotate,
            pan_speed: speeds.pan,
            move_speed: speeds.movement,
            zoom_speed: speeds.zoom,
        }
    }
}

impl CameraOptions {
    /// Convert into the controller's speed set.
    #[must_use]
    pub fn speeds(&self) -> ControllerSpeeds {
        ControllerSpeeds {
            rotate: self.rotate_speed,
            pan: self.pan_speed,
            movement: self.move_speed,
            zoom: self.zoom_speed,
        }
    }
}

/// Frame pacing.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq,
)]
#[serde(default)]
pub struct TimingOptions {
    /// Run uncapped instead of vsynced.
    pub no_fixed_step: bool,
}

/// Top-level options container.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Options {
    /// Initial window size.
    pub window: WindowOptions,
    /// Camera controller speeds.
    pub camera: CameraOptions,
    /// Frame pacing.
    pub timing: TimingOptions,
    /// Discrete action key bindings.
    pub keybindings: KeyBindings,
}

impl Options {
    /// Load options from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, ViewError> {
        let content = std::fs::read_to_string(path).map_err(ViewError::Io)?;
        toml::from_str(&content)
            .map_err(|e| ViewError::Format(e.to_string()))
    }

    /// Save options to a TOML file (pretty-printed).
    pub fn save(&self, path: &Path) -> Result<(), ViewError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ViewError::Format(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ViewError::Io)?;
        }
        std::fs::write(path, content).map_err(ViewError::Io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::KeyAction;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = Options::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed: Options = toml::from_str(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r"
[camera]
move_speed = 0.5
";
        let opts: Options = toml::from_str(toml_str).unwrap();
        assert_eq!(opts.camera.move_speed, 0.5);
        // Everything else should be default
        assert_eq!(opts.window.width, 1200);
        assert!(!opts.timing.no_fixed_step);
    }

    #[test]
    fn keybinding_lookup() {
        let opts = Options::default();
        assert_eq!(
            opts.keybindings.lookup("KeyL"),
            Some(KeyAction::ToggleLighting)
        );
        assert_eq!(opts.keybindings.lookup("KeyZ"), None);
    }

    #[test]
    fn save_and_load_round_trip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("prefs").join("viewer.toml");

        let mut opts = Options::default();
        opts.timing.no_fixed_step = true;
        opts.save(&path).unwrap();

        let loaded = Options::load(&path).unwrap();
        assert_eq!(opts, loaded);
    }
}
