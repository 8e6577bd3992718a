//! Mutable orbit state: elements plus the time since periapsis passage.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::elements::OrbitalElements;
use crate::error::OrbitError;
use crate::kepler::{self, SolverConfig};

/// An orbit being propagated forward in time.
///
/// `time` is always kept in `[0, orbital_period)`; every write goes through
/// [`OrbitState::set_time`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrbitState {
    elements: OrbitalElements,
    time: f64,
}

impl OrbitState {
    /// Start at periapsis (`time = 0`).
    pub fn new(elements: OrbitalElements) -> Self {
        Self { elements, time: 0.0 }
    }

    /// Start at an arbitrary phase. `time` is normalised like [`set_time`](Self::set_time).
    pub fn with_time(elements: OrbitalElements, time: f64) -> Result<Self, OrbitError> {
        let mut state = Self::new(elements);
        state.set_time(time)?;
        Ok(state)
    }

    pub fn elements(&self) -> &OrbitalElements {
        &self.elements
    }

    /// Time since periapsis passage, in `[0, orbital_period)`.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Store `time` reduced modulo the orbital period.
    ///
    /// Negative values wrap backwards, so rewinding works.
    ///
    /// # Errors
    ///
    /// [`OrbitError::NonFinite`] if `time` is NaN or infinite; the stored time
    /// is left unchanged.
    pub fn set_time(&mut self, time: f64) -> Result<(), OrbitError> {
        if !time.is_finite() {
            return Err(OrbitError::NonFinite { field: "time" });
        }
        let period = self.elements.orbital_period();
        let reduced = time.rem_euclid(period);
        // rem_euclid can round up to exactly `period` for tiny negative inputs.
        self.time = if reduced >= period { 0.0 } else { reduced };
        Ok(())
    }

    /// Advance (or rewind, for negative `dt`) the orbit by `dt`.
    pub fn advance(&mut self, dt: f64) -> Result<(), OrbitError> {
        self.set_time(self.time + dt)
    }

    pub fn mean_anomaly(&self) -> f64 {
        kepler::mean_anomaly(self.time, self.elements.orbital_period())
    }

    pub fn eccentric_anomaly(&self, solver: &SolverConfig) -> Result<f64, OrbitError> {
        kepler::solve_eccentric_anomaly(self.mean_anomaly(), self.elements.eccentricity(), solver)
    }

    pub fn true_anomaly(&self, solver: &SolverConfig) -> Result<f64, OrbitError> {
        let e_anom = self.eccentric_anomaly(solver)?;
        Ok(kepler::true_anomaly(e_anom, self.elements.eccentricity()))
    }

    /// Current distance to the barycenter.
    pub fn radial_distance(&self, solver: &SolverConfig) -> Result<f64, OrbitError> {
        let e_anom = self.eccentric_anomaly(solver)?;
        Ok(kepler::radial_distance(
            self.elements.semi_major_axis(),
            self.elements.eccentricity(),
            e_anom,
        ))
    }

    /// Current position around `barycenter`.
    pub fn cartesian(&self, barycenter: DVec3, solver: &SolverConfig) -> Result<DVec3, OrbitError> {
        kepler::cartesian_position(&self.elements, self.time, barycenter, solver)
    }

    /// Jump to `time` and return the position there.
    pub fn cartesian_at(
        &mut self,
        time: f64,
        barycenter: DVec3,
        solver: &SolverConfig,
    ) -> Result<DVec3, OrbitError> {
        self.set_time(time)?;
        self.cartesian(barycenter, solver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circle() -> OrbitalElements {
        OrbitalElements::circular(360.0, 10.0).unwrap()
    }

    #[test]
    fn test_time_wraps_modulo_period() {
        let mut state = OrbitState::new(circle());
        state.set_time(725.0).unwrap();
        assert!((state.time() - 5.0).abs() < 1e-12);

        state.set_time(-10.0).unwrap();
        assert!((state.time() - 350.0).abs() < 1e-12);
    }

    #[test]
    fn test_advance_stays_in_range_over_long_runs() {
        let mut state = OrbitState::new(circle());
        for _ in 0..100_000 {
            state.advance(7.3).unwrap();
            assert!((0.0..360.0).contains(&state.time()));
        }
        let expected = (100_000.0 * 7.3_f64).rem_euclid(360.0);
        assert!((state.time() - expected).abs() < 1e-6);
    }

    #[test]
    fn test_tiny_negative_time_does_not_reach_period() {
        let mut state = OrbitState::new(circle());
        state.set_time(-1e-20).unwrap();
        assert!(state.time() < 360.0);
    }

    #[test]
    fn test_non_finite_time_rejected_and_state_kept() {
        let mut state = OrbitState::with_time(circle(), 12.0).unwrap();
        assert!(state.set_time(f64::INFINITY).is_err());
        assert_eq!(state.time(), 12.0);
    }

    #[test]
    fn test_derived_anomalies_for_circle() {
        let state = OrbitState::with_time(circle(), 90.0).unwrap();
        let solver = SolverConfig::default();
        let quarter = std::f64::consts::FRAC_PI_2;
        assert!((state.mean_anomaly() - quarter).abs() < 1e-12);
        assert!((state.eccentric_anomaly(&solver).unwrap() - quarter).abs() < 1e-12);
        assert!((state.true_anomaly(&solver).unwrap() - quarter).abs() < 1e-12);
        assert!((state.radial_distance(&solver).unwrap() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_cartesian_at_moves_the_clock() {
        let mut state = OrbitState::new(circle());
        let pos = state
            .cartesian_at(450.0, DVec3::ZERO, &SolverConfig::default())
            .unwrap();
        assert!((state.time() - 90.0).abs() < 1e-12);
        assert!((pos - DVec3::new(0.0, 0.0, 10.0)).length() < 1e-9);
    }

    #[test]
    fn test_eccentric_orbit_starts_at_periapsis() {
        let elements = OrbitalElements::new(50.0, 8.0, 0.25, 0.0, 0.0, 0.0).unwrap();
        let state = OrbitState::new(elements);
        let solver = SolverConfig::default();
        assert!((state.radial_distance(&solver).unwrap() - 6.0).abs() < 1e-12);
    }
}
