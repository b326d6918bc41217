use serde::{Deserialize, Serialize};

/// One of the four movement directions, named from the character's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MovementKey {
    Forward,
    Left,
    Back,
    Right,
}

impl MovementKey {
    pub const ALL: [MovementKey; 4] = [Self::Forward, Self::Left, Self::Back, Self::Right];

    /// Keyboard key bound to this direction.
    pub fn key_name(self) -> &'static str {
        match self {
            Self::Forward => "w",
            Self::Left => "a",
            Self::Back => "s",
            Self::Right => "d",
        }
    }

    pub fn from_key_name(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.key_name() == key)
    }
}

/// Pressed state of every movement direction for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InputIntent {
    pub forward: bool,
    pub left: bool,
    pub back: bool,
    pub right: bool,
}

impl InputIntent {
    pub fn from_keys(keys: &[MovementKey]) -> Self {
        let mut intent = Self::default();
        for &key in keys {
            intent.set(key, true);
        }
        intent
    }

    pub fn is_pressed(&self, key: MovementKey) -> bool {
        match key {
            MovementKey::Forward => self.forward,
            MovementKey::Left => self.left,
            MovementKey::Back => self.back,
            MovementKey::Right => self.right,
        }
    }

    pub fn set(&mut self, key: MovementKey, pressed: bool) {
        match key {
            MovementKey::Forward => self.forward = pressed,
            MovementKey::Left => self.left = pressed,
            MovementKey::Back => self.back = pressed,
            MovementKey::Right => self.right = pressed,
        }
    }

    pub fn any_direction(&self) -> bool {
        self.forward || self.left || self.back || self.right
    }

    /// Directions pressed on either source.
    pub fn union(self, other: Self) -> Self {
        Self {
            forward: self.forward || other.forward,
            left: self.left || other.left,
            back: self.back || other.back,
            right: self.right || other.right,
        }
    }
}

/// Discrete requests that do not fit in per-frame movement flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlEvent {
    RunChanged(bool),
    JumpPressed,
}
