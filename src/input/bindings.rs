//! Discrete action key bindings.
//!
//! Key strings use the `winit::keyboard::KeyCode` debug format: `"KeyL"`,
//! `"BracketRight"`, `"Escape"`, etc. Only discrete actions are bindable;
//! continuous camera movement keys are sampled per frame by the frame
//! sampler, not bound here.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A discrete viewer action triggered by a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyAction {
    /// Open the folder-picker dialog.
    OpenFolder,
    /// Select the next model file in the listing.
    NextFile,
    /// Select the previous model file in the listing.
    PrevFile,
    /// Unload the current model.
    ClearModel,
    /// Select the next animation entry.
    NextAnimation,
    /// Select the previous animation entry.
    PrevAnimation,
    /// Toggle the default light rig.
    ToggleLighting,
    /// Reset the camera to the default view.
    ResetCamera,
}

/// Maps physical key strings to [`KeyAction`]s.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct KeyBindings {
    bindings: HashMap<String, KeyAction>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let bindings = HashMap::from([
            ("KeyO".into(), KeyAction::OpenFolder),
            ("BracketRight".into(), KeyAction::NextFile),
            ("BracketLeft".into(), KeyAction::PrevFile),
            ("Escape".into(), KeyAction::ClearModel),
            ("Period".into(), KeyAction::NextAnimation),
            ("Comma".into(), KeyAction::PrevAnimation),
            ("KeyL".into(), KeyAction::ToggleLighting),
            ("KeyR".into(), KeyAction::ResetCamera),
        ]);
        Self { bindings }
    }
}

impl KeyBindings {
    /// Look up the action for a physical key string.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<KeyAction> {
        self.bindings.get(key).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bindings_cover_the_panel_actions() {
        let bindings = KeyBindings::default();
        assert_eq!(bindings.lookup("KeyO"), Some(KeyAction::OpenFolder));
        assert_eq!(bindings.lookup("Escape"), Some(KeyAction::ClearModel));
        assert_eq!(
            bindings.lookup("BracketRight"),
            Some(KeyAction::NextFile)
        );
        assert_eq!(bindings.lookup("KeyW"), None);
    }

    #[test]
    fn bindings_round_trip_through_serde() {
        let bindings = KeyBindings::default();
        let json = serde_json::to_string(&bindings).unwrap();
        let parsed: KeyBindings = serde_json::from_str(&json).unwrap();
        assert_eq!(bindings, parsed);
    }
}
