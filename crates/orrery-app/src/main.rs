//! Orrery: headless Kepler orbit propagation.
//!
//! Run with: `cargo run -p orrery-app -- --frames 600 --seed 42`

use std::process::ExitCode;

use clap::Parser;
use orrery_app::driver;
use orrery_app::platform::PlatformDirs;
use orrery_app::renderer::TracingRenderer;
use orrery_app::{AppError, scenario};
use orrery_config::{CliArgs, Config};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{error, info};

fn main() -> ExitCode {
    let args = CliArgs::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("orrery: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &CliArgs) -> Result<(), AppError> {
    let dirs = match &args.config {
        Some(root) => PlatformDirs::resolve_with_root(root),
        None => PlatformDirs::resolve()?,
    };
    dirs.create_dirs()?;

    let mut config = Config::load_or_create(&dirs.config_dir)?;
    config.apply_cli_overrides(args);
    config.validate()?;

    orrery_log::init_logging(Some(&dirs.log_dir), cfg!(debug_assertions), Some(&config));
    info!("Orrery starting (config: {})", dirs.config_dir.display());

    let mut system = match &args.catalog {
        Some(path) => {
            let catalog = driver::load_catalog(path)?;
            scenario::build_from_catalog(&catalog, scenario::solver_config(&config.solver))?
        }
        None => {
            let seed = scenario::resolve_seed(&config.generation);
            info!("Generating system with seed {seed}");
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            scenario::build_random(&config, &mut rng)?
        }
    };

    let mut renderer = TracingRenderer::new(config.debug.report_interval);
    driver::run_frames(&mut system, &config.simulation, &mut renderer)?;

    if let Some(requested) = &args.snapshot {
        let path = driver::snapshot_path(requested.as_deref(), &dirs.data_dir);
        driver::write_snapshot(&system, &path)?;
    }
    Ok(())
}
