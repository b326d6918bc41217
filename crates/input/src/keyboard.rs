use std::collections::BTreeSet;

use crate::{ControlEvent, InputIntent, MovementKey};

const SHIFT: &str = "shift";
const SPACE: &str = " ";

/// Keyboard state fed from key-down / key-up callbacks.
///
/// Key names are compared lower-cased, so `W` and `w` are the same key.
/// Shift is level-sensitive: it reports run on while held. Space reports a
/// jump once per physical press; auto-repeat while held is ignored.
#[derive(Debug, Clone, Default)]
pub struct KeyboardIntentSource {
    held: BTreeSet<String>,
}

impl KeyboardIntentSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, key: &str) -> Option<ControlEvent> {
        let key = normalize(key);
        let newly_pressed = self.held.insert(key.clone());
        match key.as_str() {
            SHIFT => Some(ControlEvent::RunChanged(true)),
            SPACE if newly_pressed => Some(ControlEvent::JumpPressed),
            _ => None,
        }
    }

    pub fn key_up(&mut self, key: &str) -> Option<ControlEvent> {
        let key = normalize(key);
        self.held.remove(&key);
        match key.as_str() {
            SHIFT => Some(ControlEvent::RunChanged(false)),
            _ => None,
        }
    }

    pub fn is_held(&self, key: &str) -> bool {
        self.held.contains(&normalize(key))
    }

    /// Movement flags for the current frame.
    pub fn intent(&self) -> InputIntent {
        let mut intent = InputIntent::default();
        for key in MovementKey::ALL {
            intent.set(key, self.held.contains(key.key_name()));
        }
        intent
    }

    /// Forget every held key, e.g. when the window loses focus.
    pub fn clear(&mut self) {
        self.held.clear();
    }
}

fn normalize(key: &str) -> String {
    match key {
        "Space" | "Spacebar" => SPACE.to_owned(),
        _ => key.to_lowercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movement_keys_are_case_insensitive() {
        let mut kb = KeyboardIntentSource::new();
        assert_eq!(kb.key_down("W"), None);
        assert!(kb.intent().forward);
        kb.key_up("w");
        assert!(!kb.intent().any_direction());
    }

    #[test]
    fn shift_is_level_sensitive() {
        let mut kb = KeyboardIntentSource::new();
        assert_eq!(kb.key_down("Shift"), Some(ControlEvent::RunChanged(true)));
        assert_eq!(kb.key_down("Shift"), Some(ControlEvent::RunChanged(true)));
        assert_eq!(kb.key_up("Shift"), Some(ControlEvent::RunChanged(false)));
    }

    #[test]
    fn space_jumps_on_press_edge_only() {
        let mut kb = KeyboardIntentSource::new();
        assert_eq!(kb.key_down(" "), Some(ControlEvent::JumpPressed));
        assert_eq!(kb.key_down(" "), None);
        assert_eq!(kb.key_up(" "), None);
        assert_eq!(kb.key_down("Space"), Some(ControlEvent::JumpPressed));
    }

    #[test]
    fn unbound_keys_are_tracked_but_not_movement() {
        let mut kb = KeyboardIntentSource::new();
        kb.key_down("q");
        assert!(kb.is_held("Q"));
        assert!(!kb.intent().any_direction());
        kb.clear();
        assert!(!kb.is_held("q"));
    }
}
