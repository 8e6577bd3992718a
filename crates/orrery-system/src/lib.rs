//! Multi-level orbital systems.
//!
//! An [`OrbitalSystem`] owns a forest of bodies (planets, their moons, the
//! moons' own satellites) and advances them once per simulation tick. Each
//! body's position is computed around its parent's position from the same
//! tick, so nested systems stay consistent. Positions are handed to a
//! [`Renderer`] collaborator; nothing here draws.

mod body;
mod error;
mod generate;
mod render;
mod system;

pub use body::{Body, BodyId};
pub use error::SystemError;
pub use generate::{GenerationBounds, SampleRange};
pub use render::Renderer;
pub use system::OrbitalSystem;
