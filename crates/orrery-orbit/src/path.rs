//! Orbit line sampling for renderers that draw trajectories.

use glam::DVec3;

use crate::elements::OrbitalElements;
use crate::kepler::orient;

/// Sample `points` positions along an orbit, evenly spaced in true anomaly.
///
/// Starts at periapsis and sweeps `arc` radians (use `TAU` for the full
/// ellipse; the last point then coincides with the first). Uses the conic
/// equation `r = a(1-e²)/(1+e·cos ν)` directly, so no Kepler solve is needed.
pub fn orbit_path(
    elements: &OrbitalElements,
    barycenter: DVec3,
    points: usize,
    arc: f64,
) -> Vec<DVec3> {
    let e = elements.eccentricity();
    let semi_latus_rectum = elements.semi_major_axis() * (1.0 - e * e);
    let step = if points > 1 {
        arc / (points - 1) as f64
    } else {
        0.0
    };

    (0..points)
        .map(|k| {
            let nu = k as f64 * step;
            let r = semi_latus_rectum / (1.0 + e * nu.cos());
            barycenter + orient(elements, r, nu + elements.argument_of_periapsis())
        })
        .collect()
}
