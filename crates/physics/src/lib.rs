//! Physics binding: one body contract over interchangeable engines.
//!
//! # Invariants
//! - A body is created, then added to exactly one world, then removed at most once.
//! - `step(0)` never moves a body.
//! - Callers never branch on the concrete engine; they go through [`PhysicsBackend`]
//!   and ask for the [`MotionModel`] when locomotion differs.

pub mod backend;
pub mod descriptor;
pub mod engine;
pub mod error;
pub mod rigid;
pub mod simple;

pub use backend::PhysicsBackend;
pub use descriptor::{BodyDescriptor, BodyHandle, BodyShape, BodyTransform, MotionModel};
pub use engine::{PhysicsEngineHandle, PhysicsWorld};
pub use error::PhysicsError;
pub use rigid::RigidWorld;
pub use simple::{SimpleBody, SimpleWorld};

pub fn crate_info() -> &'static str {
    "playground-physics"
}
