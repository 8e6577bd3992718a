//! Fixed-timestep frame loop.
//!
//! Decouples simulation steps (fixed `dt`) from frame timing using an
//! accumulator, and clamps long frames so a stall never triggers a burst of
//! catch-up steps.

use std::time::Instant;
use tracing::warn;

/// Fixed-timestep loop state.
///
/// Call [`tick`](Self::tick) once per frame with wall-clock timing, or
/// [`tick_with`](Self::tick_with) with an explicit frame time.
pub struct FrameLoop {
    fixed_dt: f64,
    max_frame_time: f64,
    previous_time: Instant,
    accumulator: f64,
    total_sim_time: f64,
    frame_count: u64,
    update_count: u64,
}

impl FrameLoop {
    /// Creates a loop stepping at `fixed_dt` seconds and clamping frames
    /// longer than `max_frame_time`.
    pub fn new(fixed_dt: f64, max_frame_time: f64) -> Self {
        Self {
            fixed_dt,
            max_frame_time,
            previous_time: Instant::now(),
            accumulator: 0.0,
            total_sim_time: 0.0,
            frame_count: 0,
            update_count: 0,
        }
    }

    /// Runs one frame timed against the wall clock.
    ///
    /// See [`tick_with`](Self::tick_with).
    pub fn tick<E>(&mut self, update_fn: impl FnMut(f64, f64) -> Result<(), E>) -> Result<f64, E> {
        let current_time = Instant::now();
        let frame_time = current_time
            .duration_since(self.previous_time)
            .as_secs_f64();
        self.previous_time = current_time;
        self.tick_with(frame_time, update_fn)
    }

    /// Runs one frame of `frame_time` seconds.
    ///
    /// `update_fn(fixed_dt, total_sim_time)` is called zero or more times. The
    /// first error stops the frame and is returned. On success returns the
    /// interpolation alpha in `[0.0, 1.0)`.
    pub fn tick_with<E>(
        &mut self,
        frame_time: f64,
        mut update_fn: impl FnMut(f64, f64) -> Result<(), E>,
    ) -> Result<f64, E> {
        let mut frame_time = frame_time.max(0.0);
        if frame_time > self.max_frame_time {
            warn!(
                "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                frame_time * 1000.0,
                self.max_frame_time * 1000.0
            );
            frame_time = self.max_frame_time;
        }

        self.accumulator += frame_time;

        while self.accumulator >= self.fixed_dt {
            update_fn(self.fixed_dt, self.total_sim_time)?;
            self.total_sim_time += self.fixed_dt;
            self.accumulator -= self.fixed_dt;
            self.update_count += 1;
        }

        self.frame_count += 1;
        Ok(self.alpha())
    }

    /// Returns the current interpolation alpha without running a tick.
    pub fn alpha(&self) -> f64 {
        if self.accumulator > 0.0 {
            self.accumulator / self.fixed_dt
        } else {
            0.0
        }
    }

    pub fn fixed_dt(&self) -> f64 {
        self.fixed_dt
    }

    /// Returns the total number of frames run.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Returns the total number of simulation update steps executed.
    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    /// Returns the total simulation time in seconds.
    pub fn total_sim_time(&self) -> f64 {
        self.total_sim_time
    }
}
