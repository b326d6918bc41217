//! Character controller: turns movement intent into animation, facing and body motion.
//!
//! # Invariants
//! - Jump takes priority over Run, Run over Walk, Walk over Idle.
//! - At most one cross-fade is in flight; at rest exactly one clip plays at full weight.
//! - The model never turns by more than the configured step in one update.
//! - A missing body degrades to a logged no-op, never a panic.

pub mod animation;
pub mod controller;
pub mod movement;

pub use animation::{AnimationMixer, AnimationState, ClipId};
pub use controller::{CharacterController, CharacterSettings, ControllerError, character_body};
pub use movement::{camera_yaw, direction_offset, facing, rotate_towards, walk_direction};

pub fn crate_info() -> &'static str {
    "playground-character"
}
