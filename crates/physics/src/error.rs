use crate::BodyHandle;

/// Errors from physics binding operations.
#[derive(Debug, thiserror::Error)]
pub enum PhysicsError {
    #[error("body {0:?} does not exist")]
    UnknownBody(BodyHandle),
    #[error("body {0:?} is not part of the world")]
    BodyNotInWorld(BodyHandle),
    #[error("body {0:?} was already added to the world")]
    AlreadyInWorld(BodyHandle),
    #[error("invalid body descriptor: {0}")]
    InvalidDescriptor(String),
    #[error("invalid physics settings: {0}")]
    InvalidSettings(String),
}
