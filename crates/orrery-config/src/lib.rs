//! Configuration for the orrery simulation.
//!
//! Settings persist to disk as RON, tolerate missing or unknown fields, and
//! can be overridden from the command line via clap.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    BodyClassConfig, Config, CountRange, DebugConfig, GenerationConfig, RangeConfig,
    SimulationConfig, SolverSettings,
};
pub use error::ConfigError;
