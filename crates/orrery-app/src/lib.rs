//! Headless driver for orbital systems.
//!
//! Builds a system from config or a catalog, runs it through a fixed-timestep
//! frame loop, and reports positions via `tracing`.

pub mod driver;
mod error;
pub mod frame_loop;
pub mod platform;
pub mod renderer;
pub mod scenario;

pub use error::AppError;
