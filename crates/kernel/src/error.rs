use playground_common::ObjectId;
use playground_physics::PhysicsError;

/// Errors from registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("an object named {0:?} already exists")]
    DuplicateName(String),
    #[error("object {0} is not registered")]
    UnknownObject(ObjectId),
    #[error("object {0} has no readable physics body")]
    MissingBody(ObjectId, #[source] PhysicsError),
    #[error("physics backend rejected object: {0}")]
    Physics(#[from] PhysicsError),
    #[error("registry has been torn down")]
    TornDown,
}
