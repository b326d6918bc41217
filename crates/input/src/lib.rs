//! Input intent: keyboard and touch joystick reduced to the same movement flags.
//!
//! # Invariants
//! - Both sources produce the same [`InputIntent`] and [`ControlEvent`] types, so the
//!   character logic never knows which device drove it.
//! - Sources only record flags; nothing here reads or mutates the world.

pub mod intent;
pub mod joystick;
pub mod keyboard;

pub use intent::{ControlEvent, InputIntent, MovementKey};
pub use joystick::{JoystickDirection, JoystickIntentSource, JoystickReading};
pub use keyboard::KeyboardIntentSource;

pub fn crate_info() -> &'static str {
    "playground-input"
}
