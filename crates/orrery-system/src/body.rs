//! Bodies stored in an [`OrbitalSystem`](crate::OrbitalSystem) and their handles.

use std::fmt;

use glam::DVec3;
use orrery_orbit::{OrbitState, OrbitalElements};
use serde::{Deserialize, Serialize};

/// Stable handle to a body. Indexes the owning system's storage and is never
/// reused, so a handle to a removed body stays invalid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub(crate) usize);

impl BodyId {
    /// Storage index. Parents always have a lower index than their children.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A body orbiting either the origin or another body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub(crate) name: String,
    pub(crate) orbit: OrbitState,
    pub(crate) parent: Option<BodyId>,
    /// Absolute position as of the last step.
    pub(crate) position: DVec3,
}

impl Body {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn orbit(&self) -> &OrbitState {
        &self.orbit
    }

    pub fn elements(&self) -> &OrbitalElements {
        self.orbit.elements()
    }

    /// `None` for bodies orbiting the fixed origin.
    pub fn parent(&self) -> Option<BodyId> {
        self.parent
    }

    /// Absolute position resolved by the most recent step.
    pub fn position(&self) -> DVec3 {
        self.position
    }
}
