//! Runs a built system through the frame loop and exports the result.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use orrery_config::SimulationConfig;
use orrery_orbit::Catalog;
use orrery_system::{OrbitalSystem, SystemError};
use tracing::info;

use crate::AppError;
use crate::frame_loop::FrameLoop;
use crate::renderer::TracingRenderer;

/// Counters from a finished run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    pub steps: u64,
    /// Orbital time advanced, in the system's time unit.
    pub elapsed: f64,
}

/// Drive `system` for `sim.frames` frames, or forever when that is zero.
///
/// Each fixed step advances orbital time by `fixed_dt * time_scale`. Without
/// `realtime` every frame is exactly one fixed step, so runs are reproducible.
pub fn run_frames(
    system: &mut OrbitalSystem,
    sim: &SimulationConfig,
    renderer: &mut TracingRenderer,
) -> Result<RunSummary, SystemError> {
    let mut frame_loop = FrameLoop::new(sim.fixed_dt, sim.max_frame_time);
    let step_dt = sim.fixed_dt * sim.time_scale;
    let frame_budget = Duration::from_secs_f64(sim.fixed_dt);
    let start_elapsed = system.elapsed();

    while sim.frames == 0 || frame_loop.frame_count() < sim.frames {
        let frame_start = Instant::now();
        let step = |_dt: f64, _sim_time: f64| system.step_with(step_dt, &mut *renderer);
        if sim.realtime {
            frame_loop.tick(step)?;
        } else {
            frame_loop.tick_with(sim.fixed_dt, step)?;
        }
        renderer.end_frame(system.elapsed());

        if sim.realtime
            && let Some(rest) = frame_budget.checked_sub(frame_start.elapsed())
        {
            std::thread::sleep(rest);
        }
    }

    let summary = RunSummary {
        frames: frame_loop.frame_count(),
        steps: frame_loop.update_count(),
        elapsed: system.elapsed() - start_elapsed,
    };
    info!(
        "Ran {} frames ({} steps), orbital time advanced {:.2}",
        summary.frames, summary.steps, summary.elapsed
    );
    Ok(summary)
}

/// Read and parse a catalog JSON file.
pub fn load_catalog(path: &Path) -> Result<Catalog, AppError> {
    let json = std::fs::read_to_string(path).map_err(|e| AppError::io(path, e))?;
    Ok(Catalog::from_json(&json)?)
}

/// File name used when `--snapshot` is given without a path.
pub const DEFAULT_SNAPSHOT_NAME: &str = "snapshot.ron";

/// Where a snapshot goes: the requested file, or the default name under
/// `data_dir`.
pub fn snapshot_path(requested: Option<&Path>, data_dir: &Path) -> PathBuf {
    match requested {
        Some(path) => path.to_path_buf(),
        None => data_dir.join(DEFAULT_SNAPSHOT_NAME),
    }
}

/// Write the system state as pretty RON.
pub fn write_snapshot(system: &OrbitalSystem, path: &Path) -> Result<(), AppError> {
    let pretty = ron::ser::PrettyConfig::new().depth_limit(4);
    let serialized = ron::ser::to_string_pretty(system, pretty)?;
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        std::fs::create_dir_all(dir).map_err(|e| AppError::io(dir, e))?;
    }
    std::fs::write(path, serialized).map_err(|e| AppError::io(path, e))?;
    info!("Wrote snapshot of {} bodies to {}", system.len(), path.display());
    Ok(())
}

/// Read a snapshot written by [`write_snapshot`] and check its hierarchy.
pub fn read_snapshot(path: &Path) -> Result<OrbitalSystem, AppError> {
    let contents = std::fs::read_to_string(path).map_err(|e| AppError::io(path, e))?;
    let system: OrbitalSystem = ron::from_str(&contents)?;
    system.validate()?;
    Ok(system)
}
