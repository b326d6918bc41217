use glam::Vec2;
use playground_common::JoystickConfig;
use serde::{Deserialize, Serialize};

use crate::{ControlEvent, InputIntent, MovementKey};

/// Eight-way direction of a joystick drag, in screen terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoystickDirection {
    Up,
    UpRight,
    Right,
    DownRight,
    Down,
    DownLeft,
    Left,
    UpLeft,
}

impl JoystickDirection {
    /// Classify a drag angle in degrees, as produced by
    /// `atan2(pressed.y - current.y, pressed.x - current.x)`.
    ///
    /// Sector edges are half-open except around 180 degrees, which belongs to
    /// `Right` from both sides.
    pub fn from_angle(degrees: f32) -> Option<Self> {
        let a = degrees;
        let direction = if (65.0..115.0).contains(&a) {
            Self::Up
        } else if (115.0..155.0).contains(&a) {
            Self::UpRight
        } else if a >= 155.0 || a < -155.0 {
            Self::Right
        } else if (-155.0..-115.0).contains(&a) {
            Self::DownRight
        } else if (-115.0..-65.0).contains(&a) {
            Self::Down
        } else if (-65.0..-25.0).contains(&a) {
            Self::DownLeft
        } else if (-25.0..25.0).contains(&a) {
            Self::Left
        } else if (25.0..65.0).contains(&a) {
            Self::UpLeft
        } else {
            return None;
        };
        Some(direction)
    }

    pub fn keys(self) -> &'static [MovementKey] {
        use MovementKey::*;
        match self {
            Self::Up => &[Forward],
            Self::UpRight => &[Forward, Right],
            Self::Right => &[Right],
            Self::DownRight => &[Back, Right],
            Self::Down => &[Back],
            Self::DownLeft => &[Back, Left],
            Self::Left => &[Left],
            Self::UpLeft => &[Forward, Left],
        }
    }
}

/// Result of one drag sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JoystickReading {
    pub direction: Option<JoystickDirection>,
    pub keys: InputIntent,
    /// The drag went past the strength threshold; drives the run toggle.
    pub strong: bool,
    /// Where to draw the handle relative to its rest position.
    pub handle_offset: Vec2,
    pub angle_degrees: f32,
    pub distance: f32,
}

impl JoystickReading {
    pub fn run_event(&self) -> ControlEvent {
        ControlEvent::RunChanged(self.strong)
    }
}

/// On-screen joystick fed from pointer or touch callbacks.
#[derive(Debug, Clone, Default)]
pub struct JoystickIntentSource {
    config: JoystickConfig,
    pressed_at: Option<Vec2>,
    intent: InputIntent,
    strong: bool,
}

impl JoystickIntentSource {
    pub fn new(config: JoystickConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Start a drag at a screen point.
    pub fn press(&mut self, point: Vec2) {
        self.pressed_at = Some(point);
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed_at.is_some()
    }

    /// Sample a drag. Ignored unless the joystick is pressed.
    pub fn drag(&mut self, point: Vec2) -> Option<JoystickReading> {
        let origin = self.pressed_at?;
        let offset = point - origin;
        let max = self.config.max_handle_offset;
        let handle_offset = offset.clamp(Vec2::splat(-max), Vec2::splat(max));

        let toward = origin - point;
        let angle_degrees = toward.y.atan2(toward.x).to_degrees();
        let distance = offset.length();
        let direction = JoystickDirection::from_angle(angle_degrees);
        let keys = direction
            .map(|d| InputIntent::from_keys(d.keys()))
            .unwrap_or_default();
        let strong = distance > self.config.strength_threshold;

        self.intent = keys;
        self.strong = strong;
        tracing::trace!(angle_degrees, distance, ?direction, strong, "joystick drag");
        Some(JoystickReading {
            direction,
            keys,
            strong,
            handle_offset,
            angle_degrees,
            distance,
        })
    }

    /// End the drag: every key is released and running stops.
    pub fn release(&mut self) -> ControlEvent {
        self.pressed_at = None;
        self.intent = InputIntent::default();
        self.strong = false;
        ControlEvent::RunChanged(false)
    }

    /// The separate jump button.
    pub fn jump_tap(&self) -> ControlEvent {
        ControlEvent::JumpPressed
    }

    pub fn intent(&self) -> InputIntent {
        self.intent
    }

    pub fn is_strong(&self) -> bool {
        self.strong
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> JoystickIntentSource {
        JoystickIntentSource::new(JoystickConfig::default())
    }

    #[test]
    fn sector_boundaries() {
        use JoystickDirection::*;
        let cases = [
            (65.0, Up),
            (114.9, Up),
            (115.0, UpRight),
            (155.0, Right),
            (180.0, Right),
            (-180.0, Right),
            (-155.0, DownRight),
            (-115.0, Down),
            (-65.0, DownLeft),
            (-25.0, Left),
            (24.9, Left),
            (25.0, UpLeft),
            (64.9, UpLeft),
        ];
        for (angle, expected) in cases {
            assert_eq!(JoystickDirection::from_angle(angle), Some(expected), "{angle}");
        }
        assert_eq!(JoystickDirection::from_angle(f32::NAN), None);
    }

    #[test]
    fn dragging_up_moves_forward() {
        let mut js = source();
        js.press(Vec2::new(100.0, 100.0));
        let reading = js.drag(Vec2::new(100.0, 80.0)).unwrap();
        assert_eq!(reading.direction, Some(JoystickDirection::Up));
        assert!(reading.keys.forward && !reading.keys.back);
        assert!(!reading.strong);
        assert_eq!(js.intent(), reading.keys);
    }

    #[test]
    fn dragging_right_moves_right() {
        let mut js = source();
        js.press(Vec2::ZERO);
        let reading = js.drag(Vec2::new(20.0, 0.0)).unwrap();
        assert_eq!(reading.direction, Some(JoystickDirection::Right));
        assert!(reading.keys.right);
    }

    #[test]
    fn far_drag_is_strong_and_handle_is_clamped() {
        let mut js = source();
        js.press(Vec2::ZERO);
        let reading = js.drag(Vec2::new(-60.0, 50.0)).unwrap();
        assert!(reading.strong);
        assert_eq!(reading.run_event(), ControlEvent::RunChanged(true));
        assert_eq!(reading.handle_offset, Vec2::new(-40.0, 40.0));
        assert_eq!(reading.direction, Some(JoystickDirection::DownLeft));
    }

    #[test]
    fn drag_without_press_is_ignored() {
        let mut js = source();
        assert!(js.drag(Vec2::new(10.0, 10.0)).is_none());
        assert!(!js.intent().any_direction());
    }

    #[test]
    fn release_clears_everything() {
        let mut js = source();
        js.press(Vec2::ZERO);
        js.drag(Vec2::new(0.0, -50.0));
        assert!(js.is_strong());
        assert_eq!(js.release(), ControlEvent::RunChanged(false));
        assert!(!js.is_pressed());
        assert!(!js.is_strong());
        assert!(!js.intent().any_direction());
        assert_eq!(js.jump_tap(), ControlEvent::JumpPressed);
    }
}
