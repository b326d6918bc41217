//! Backend-agnostic physics binding.
//!
//! Every physics engine the playground can drive implements [`PhysicsBackend`].
//! The object registry and the character controller only ever talk to this
//! trait, so switching engines never touches their logic.

use crate::{BodyDescriptor, BodyHandle, BodyTransform, MotionModel, PhysicsError};

/// Operations the registry and the character controller need from a physics world.
///
/// A body goes through three phases: created (`create_body`), simulated
/// (`add_to_world`) and removed (`remove_from_world`). Only simulated bodies
/// take part in `step` and can be read or pushed.
pub trait PhysicsBackend {
    /// Human-readable engine name.
    fn name(&self) -> &str;

    /// Build a body from a descriptor. The body is not simulated until it is added.
    fn create_body(&mut self, descriptor: &BodyDescriptor) -> Result<BodyHandle, PhysicsError>;

    /// Add a created body to the world.
    fn add_to_world(&mut self, body: BodyHandle) -> Result<(), PhysicsError>;

    /// Take a body out of the world and release it. Removing twice is a no-op
    /// and reports `false`.
    fn remove_from_world(&mut self, body: BodyHandle) -> bool;

    /// Advance the simulation by `dt` seconds. `dt <= 0` must not move anything.
    fn step(&mut self, dt: f32);

    /// Pose of a simulated body.
    fn read_transform(&self, body: BodyHandle) -> Result<BodyTransform, PhysicsError>;

    /// How locomotion should be applied to bodies of this backend.
    fn motion_model(&self) -> MotionModel;

    /// Shift a body horizontally by a position increment.
    fn apply_position_delta(&mut self, body: BodyHandle, dx: f32, dz: f32)
    -> Result<(), PhysicsError>;

    /// Add to a body's horizontal linear velocity.
    fn set_horizontal_velocity_delta(
        &mut self,
        body: BodyHandle,
        dx: f32,
        dz: f32,
    ) -> Result<(), PhysicsError>;

    /// Apply an instantaneous upward impulse.
    fn apply_upward_impulse(&mut self, body: BodyHandle, magnitude: f32)
    -> Result<(), PhysicsError>;

    /// Number of bodies currently simulated.
    fn body_count(&self) -> usize;
}
