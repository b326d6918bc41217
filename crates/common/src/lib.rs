//! Shared types for the physics playground.
//!
//! # Invariants
//! - Object descriptors are plain data; both halves of a scene object are built from the same one.
//! - Configuration is validated once at load time and treated as immutable afterwards.

pub mod config;
pub mod options;
pub mod types;

pub use config::{
    BackendKind, CharacterConfig, ConfigError, JoystickConfig, PhysicsConfig, PlaygroundConfig,
    ViewportConfig,
};
pub use options::ObjectOptions;
pub use types::{ObjectId, Transform};
