//! Object registry: authoritative pairing of scene visuals with physics bodies.
//!
//! # Invariants
//! - Object names are unique within a registry.
//! - Every entry's body is in exactly one world and its visual in exactly one scene
//!   from `add` until teardown.
//! - After `update(dt)`, every visual sits where its body was read after that step.
//! - Teardown releases each visual's resources exactly once; repeating it is a no-op.

pub mod error;
pub mod registry;

pub use error::RegistryError;
pub use registry::{ObjectRegistry, ObjectSpec, SceneObjectEntry};

pub fn crate_info() -> &'static str {
    "playground-kernel"
}
