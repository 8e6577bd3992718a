//! Keplerian propagation: elements + time -> Cartesian position.
//!
//! Every function here is pure. The axis convention used by
//! [`cartesian_position`] puts the reference plane on XZ with +Y as its
//! normal: an un-rotated orbit has periapsis on +X and advances towards +Z,
//! and inclination tilts the orbit along Y.

use std::f64::consts::TAU;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::elements::{OrbitalElements, check_eccentricity};
use crate::error::OrbitError;

/// Newton-Raphson settings for Kepler's equation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Convergence threshold on the size of a Newton step, in radians.
    pub epsilon: f64,
    /// Maximum number of Newton steps before giving up.
    pub max_iterations: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            epsilon: 1e-6,
            max_iterations: 100,
        }
    }
}

/// Mean anomaly `2π·t/P`. Defined for any real `time`.
pub fn mean_anomaly(time: f64, orbital_period: f64) -> f64 {
    TAU * time / orbital_period
}

/// Solve Kepler's equation `E - e·sin(E) = M` for the eccentric anomaly `E`.
///
/// Newton-Raphson seeded with `E₀ = M`, stopping once a Newton step is smaller
/// than `solver.epsilon`. The root always lies in `[M - e, M + e]`; that
/// bracket is narrowed every iteration and a Newton step landing outside it is
/// replaced by bisection, so high eccentricities cannot diverge. A circular
/// orbit returns `M` unchanged.
///
/// # Errors
///
/// - [`OrbitError::InvalidEccentricity`] if `eccentricity` is outside `[0, 1)`.
/// - [`OrbitError::InvalidTolerance`] if `solver.epsilon` is not positive.
/// - [`OrbitError::NonFinite`] if `mean_anomaly` is NaN or infinite.
/// - [`OrbitError::NonConvergence`] if the cap is reached first.
pub fn solve_eccentric_anomaly(
    mean_anomaly: f64,
    eccentricity: f64,
    solver: &SolverConfig,
) -> Result<f64, OrbitError> {
    check_eccentricity(eccentricity)?;
    if !(solver.epsilon.is_finite() && solver.epsilon > 0.0) {
        return Err(OrbitError::InvalidTolerance(solver.epsilon));
    }
    if !mean_anomaly.is_finite() {
        return Err(OrbitError::NonFinite {
            field: "mean anomaly",
        });
    }
    if eccentricity == 0.0 {
        return Ok(mean_anomaly);
    }

    let mut low = mean_anomaly - eccentricity;
    let mut high = mean_anomaly + eccentricity;
    let mut e_anom = mean_anomaly;
    let mut last_step = f64::INFINITY;
    for _ in 0..solver.max_iterations {
        let delta = e_anom - eccentricity * e_anom.sin() - mean_anomaly;
        // The residual is increasing in E.
        if delta < 0.0 {
            low = e_anom;
        } else {
            high = e_anom;
        }

        // Bounded below by 1 - e > 0.
        let derivative = 1.0 - eccentricity * e_anom.cos();
        let newton = e_anom - delta / derivative;
        let next = if (low..=high).contains(&newton) {
            newton
        } else {
            0.5 * (low + high)
        };

        last_step = (next - e_anom).abs();
        if next == newton && last_step < solver.epsilon {
            return Ok(next);
        }
        e_anom = next;
    }

    Err(OrbitError::NonConvergence {
        mean_anomaly,
        eccentricity,
        iterations: solver.max_iterations,
        last_step,
    })
}

/// True anomaly from the eccentric anomaly.
///
/// Equivalent to `2·atan(sqrt((1+e)/(1-e))·tan(E/2))`, written with `atan2`
/// so that `E = π` does not pass through an infinite tangent.
pub fn true_anomaly(eccentric_anomaly: f64, eccentricity: f64) -> f64 {
    let half = eccentric_anomaly / 2.0;
    2.0 * ((1.0 + eccentricity).sqrt() * half.sin())
        .atan2((1.0 - eccentricity).sqrt() * half.cos())
}

/// Distance from the focus, `a·(1 - e·cos E)`.
pub fn radial_distance(semi_major_axis: f64, eccentricity: f64, eccentric_anomaly: f64) -> f64 {
    semi_major_axis * (1.0 - eccentricity * eccentric_anomaly.cos())
}

/// Rotate an in-plane polar coordinate `(r, u = ν + ω)` into the render frame.
pub(crate) fn orient(elements: &OrbitalElements, radius: f64, argument_of_latitude: f64) -> DVec3 {
    let (sin_o, cos_o) = elements.longitude_of_ascending_node().sin_cos();
    let (sin_i, cos_i) = elements.inclination().sin_cos();
    let (sin_u, cos_u) = argument_of_latitude.sin_cos();

    let x = radius * (cos_o * cos_u - sin_o * sin_u * cos_i);
    let y = radius * sin_u * sin_i;
    let z = radius * (sin_o * cos_u + cos_o * sin_u * cos_i);

    DVec3::new(x, y, z)
}

/// Position of a body at `time` since periapsis passage, offset by `barycenter`.
///
/// `time` is reduced modulo the orbital period before the anomaly is formed,
/// so very large times keep full precision.
///
/// # Errors
///
/// Propagates [`solve_eccentric_anomaly`] failures.
pub fn cartesian_position(
    elements: &OrbitalElements,
    time: f64,
    barycenter: DVec3,
    solver: &SolverConfig,
) -> Result<DVec3, OrbitError> {
    if !time.is_finite() {
        return Err(OrbitError::NonFinite { field: "time" });
    }
    let period = elements.orbital_period();
    let m = mean_anomaly(time.rem_euclid(period), period);
    let e = elements.eccentricity();

    let e_anom = solve_eccentric_anomaly(m, e, solver)?;
    let nu = true_anomaly(e_anom, e);
    let r = radial_distance(elements.semi_major_axis(), e, e_anom);

    Ok(barycenter + orient(elements, r, nu + elements.argument_of_periapsis()))
}

/// Orbital period in years of a body with the given semi-major axis in AU,
/// from Kepler's third law around a solar-mass primary.
pub fn period_from_semi_major_axis(semi_major_axis_au: f64) -> f64 {
    semi_major_axis_au.powf(1.5)
}
