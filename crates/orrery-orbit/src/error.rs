//! Orbit validation and solver error types.

/// Errors raised while validating orbital elements or propagating an orbit.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OrbitError {
    /// Eccentricity outside `[0, 1)`. Parabolic and hyperbolic orbits are not supported.
    #[error("eccentricity {0} is outside [0, 1)")]
    InvalidEccentricity(f64),

    /// Orbital period is zero or negative.
    #[error("orbital period must be positive, got {0}")]
    InvalidPeriod(f64),

    /// Semi-major axis is zero or negative.
    #[error("semi-major axis must be positive, got {0}")]
    InvalidSemiMajorAxis(f64),

    /// A value that must be finite was NaN or infinite.
    #[error("{field} must be finite")]
    NonFinite {
        /// Name of the offending quantity.
        field: &'static str,
    },

    /// Solver tolerance is not a positive finite number.
    #[error("solver tolerance must be positive and finite, got {0}")]
    InvalidTolerance(f64),

    /// Newton-Raphson exhausted its iteration cap without meeting the tolerance.
    #[error(
        "Kepler's equation did not converge for M={mean_anomaly}, e={eccentricity} \
         after {iterations} iterations (last step {last_step:e})"
    )]
    NonConvergence {
        /// Mean anomaly that was being solved for.
        mean_anomaly: f64,
        /// Eccentricity of the orbit.
        eccentricity: f64,
        /// Iterations performed.
        iterations: u32,
        /// Magnitude of the final Newton step.
        last_step: f64,
    },
}
