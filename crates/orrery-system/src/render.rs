//! Hand-off of body lifecycle and positions to whatever draws them.

use glam::DVec3;

use crate::body::{Body, BodyId};

/// Receives scene changes and per-step positions from an
/// [`OrbitalSystem`](crate::OrbitalSystem). The system never draws anything
/// itself.
pub trait Renderer {
    /// A body was added; create its visual representation.
    fn insert_body(&mut self, id: BodyId, body: &Body);

    /// A body was removed; drop its visual representation.
    fn remove_body(&mut self, id: BodyId);

    /// New absolute position for a body, once per step.
    fn update_position(&mut self, id: BodyId, position: DVec3);
}

/// Headless stepping.
impl Renderer for () {
    fn insert_body(&mut self, _id: BodyId, _body: &Body) {}

    fn remove_body(&mut self, _id: BodyId) {}

    fn update_position(&mut self, _id: BodyId, _position: DVec3) {}
}

/// Lifecycle notice queued until the next step reaches a renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SceneChange {
    Inserted(BodyId),
    Removed(BodyId),
}
