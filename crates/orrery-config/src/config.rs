//! Configuration structs with sensible defaults and RON persistence.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level simulation configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Clock and run-length settings.
    pub simulation: SimulationConfig,
    /// Kepler solver tolerances.
    pub solver: SolverSettings,
    /// Random system generation.
    pub generation: GenerationConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Clock settings for the frame loop.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Fixed simulation step in seconds of wall-clock time.
    pub fixed_dt: f64,
    /// Orbital time units advanced per wall-clock second.
    pub time_scale: f64,
    /// Longest frame accepted before clamping, in seconds.
    pub max_frame_time: f64,
    /// Frames to run before exiting (0 = run until interrupted).
    pub frames: u64,
    /// Pace frames against the wall clock instead of running flat out.
    pub realtime: bool,
}

/// Newton-Raphson settings for Kepler's equation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SolverSettings {
    /// Convergence threshold on the Newton step, in radians.
    pub epsilon: f64,
    /// Iteration cap before reporting non-convergence.
    pub max_iterations: u32,
}

/// Inclusive-exclusive numeric range `[min, max)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RangeConfig {
    pub min: f64,
    pub max: f64,
}

impl RangeConfig {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// Inclusive count range `[min, max]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CountRange {
    pub min: u32,
    pub max: u32,
}

impl CountRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }
}

/// Element ranges for one tier of generated bodies (planets, moons, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BodyClassConfig {
    pub orbital_period: RangeConfig,
    pub semi_major_axis: RangeConfig,
    pub eccentricity: RangeConfig,
    /// Radians.
    pub inclination: RangeConfig,
}

/// Random system layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerationConfig {
    /// RNG seed. `None` picks a fresh seed each run.
    pub seed: Option<u64>,
    /// Bodies orbiting the origin.
    pub planet_count: u32,
    pub planets: BodyClassConfig,
    pub moons: BodyClassConfig,
    pub sub_satellites: BodyClassConfig,
    pub moons_per_planet: CountRange,
    pub sub_satellites_per_moon: CountRange,
    /// Start bodies at a random orbital phase.
    pub random_phase: bool,
    /// Period stretch factor `exp(periapsis / falloff)`; `None` disables it.
    pub period_falloff: Option<f64>,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Frames between position reports (0 = never).
    pub report_interval: u64,
}

// --- Default implementations ---

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            time_scale: 60.0,
            max_frame_time: 0.25,
            frames: 600,
            realtime: false,
        }
    }
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            epsilon: 1e-6,
            max_iterations: 100,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            planet_count: 10,
            planets: BodyClassConfig {
                orbital_period: RangeConfig::new(500.0, 750.0),
                semi_major_axis: RangeConfig::new(10.0, 300.0),
                eccentricity: RangeConfig::new(0.0, 0.3),
                inclination: RangeConfig::new(-0.3, 0.3),
            },
            moons: BodyClassConfig {
                orbital_period: RangeConfig::new(500.0, 750.0),
                semi_major_axis: RangeConfig::new(5.0, 10.0),
                eccentricity: RangeConfig::new(0.0, 0.3),
                inclination: RangeConfig::new(-0.3, 0.3),
            },
            sub_satellites: BodyClassConfig {
                orbital_period: RangeConfig::new(50.0, 100.0),
                semi_major_axis: RangeConfig::new(0.5, 2.0),
                eccentricity: RangeConfig::new(0.0, 0.1),
                inclination: RangeConfig::new(-0.5, 0.5),
            },
            moons_per_planet: CountRange::new(0, 12),
            sub_satellites_per_moon: CountRange::new(0, 0),
            random_phase: true,
            period_falloff: Some(100.0),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            report_interval: 60,
        }
    }
}

// --- Validation ---

impl Config {
    /// Reject values that parse but cannot drive the frame loop.
    ///
    /// Element ranges are checked later by the generator, which knows the
    /// orbital constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sim = &self.simulation;
        if !(sim.fixed_dt.is_finite() && sim.fixed_dt > 0.0) {
            return Err(ConfigError::Invalid {
                field: "simulation.fixed_dt",
                reason: "must be positive",
            });
        }
        if !sim.time_scale.is_finite() {
            return Err(ConfigError::Invalid {
                field: "simulation.time_scale",
                reason: "must be finite",
            });
        }
        if !(sim.max_frame_time.is_finite() && sim.max_frame_time >= sim.fixed_dt) {
            return Err(ConfigError::Invalid {
                field: "simulation.max_frame_time",
                reason: "must be at least one fixed step",
            });
        }
        let gen_cfg = &self.generation;
        if gen_cfg.moons_per_planet.min > gen_cfg.moons_per_planet.max {
            return Err(ConfigError::Invalid {
                field: "generation.moons_per_planet",
                reason: "min is greater than max",
            });
        }
        if gen_cfg.sub_satellites_per_moon.min > gen_cfg.sub_satellites_per_moon.max {
            return Err(ConfigError::Invalid {
                field: "generation.sub_satellites_per_moon",
                reason: "min is greater than max",
            });
        }
        Ok(())
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}
