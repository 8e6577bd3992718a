//! Orbital system error types.

use orrery_orbit::OrbitError;

use crate::body::BodyId;

/// Errors raised by [`OrbitalSystem`](crate::OrbitalSystem) operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SystemError {
    /// The requested parent does not exist in this system.
    #[error("parent {0} does not exist in this system")]
    InvalidParent(BodyId),

    /// The handle refers to a body that was removed or never existed.
    #[error("unknown body {0}")]
    UnknownBody(BodyId),

    /// A parent link does not point strictly up the hierarchy.
    #[error("body {0} has a parent that is not resolved before it")]
    CyclicParentage(BodyId),

    /// Sampling ranges for random generation are unusable.
    #[error("invalid generation bounds for {field}: {reason}")]
    InvalidBounds {
        field: &'static str,
        reason: &'static str,
    },

    /// Orbit validation or propagation failed.
    #[error(transparent)]
    Orbit(#[from] OrbitError),
}
