//! Command-line argument parsing for the orrery driver.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Orrery command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "orrery", about = "Headless Kepler orbit propagation")]
pub struct CliArgs {
    /// Frames to simulate (0 = until interrupted).
    #[arg(long)]
    pub frames: Option<u64>,

    /// RNG seed for system generation.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Orbital time units per wall-clock second.
    #[arg(long)]
    pub time_scale: Option<f64>,

    /// Number of generated planets.
    #[arg(long)]
    pub planets: Option<u32>,

    /// Pace frames against the wall clock.
    #[arg(long)]
    pub realtime: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Build the system from a solar-system catalog JSON file instead of
    /// generating it randomly.
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Write the final system state as RON, to the given file or to
    /// `snapshot.ron` in the data directory when no file is given.
    #[arg(long, num_args = 0..=1)]
    pub snapshot: Option<Option<PathBuf>>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(frames) = args.frames {
            self.simulation.frames = frames;
        }
        if let Some(seed) = args.seed {
            self.generation.seed = Some(seed);
        }
        if let Some(scale) = args.time_scale {
            self.simulation.time_scale = scale;
        }
        if let Some(count) = args.planets {
            self.generation.planet_count = count;
        }
        if args.realtime {
            self.simulation.realtime = true;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
