//! Keplerian orbit propagation.
//!
//! Converts classical orbital elements and a time value into a 3D position by
//! solving Kepler's equation with Newton-Raphson. Everything here is pure and
//! re-entrant; stateful stepping of many bodies lives in `orrery-system`.

mod catalog;
mod elements;
mod error;
mod kepler;
mod path;
mod state;

pub use catalog::{
    AroundPlanet, Catalog, CatalogBody, CatalogError, CatalogOrbit, DAYS_PER_YEAR, KM_PER_AU,
};
pub use elements::OrbitalElements;
pub use error::OrbitError;
pub use kepler::{
    SolverConfig, cartesian_position, mean_anomaly, period_from_semi_major_axis, radial_distance,
    solve_eccentric_anomaly, true_anomaly,
};
pub use path::orbit_path;
pub use state::OrbitState;
