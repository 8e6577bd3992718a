//! Random body generation for demos and tests.
//!
//! Elements are drawn uniformly from caller-supplied ranges. Generation is
//! deterministic for a seeded RNG.

use glam::DVec3;
use orrery_orbit::{OrbitState, OrbitalElements};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::body::BodyId;
use crate::error::SystemError;
use crate::system::OrbitalSystem;

/// Largest eccentricity the sampler will emit.
const MAX_SAMPLED_ECCENTRICITY: f64 = 1.0 - f64::EPSILON;

/// Closed-open `[min, max)` sampling range. `min == max` always yields `min`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SampleRange {
    pub min: f64,
    pub max: f64,
}

impl SampleRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Degenerate range that always yields `value`.
    pub const fn fixed(value: f64) -> Self {
        Self::new(value, value)
    }

    fn check(&self, field: &'static str) -> Result<(), SystemError> {
        if !(self.min.is_finite() && self.max.is_finite()) {
            return Err(SystemError::InvalidBounds {
                field,
                reason: "bounds must be finite",
            });
        }
        if self.min > self.max {
            return Err(SystemError::InvalidBounds {
                field,
                reason: "min is greater than max",
            });
        }
        if !(self.max - self.min).is_finite() {
            return Err(SystemError::InvalidBounds {
                field,
                reason: "range width overflows",
            });
        }
        Ok(())
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.min == self.max {
            self.min
        } else {
            rng.random_range(self.min..self.max)
        }
    }
}

/// Sampling ranges for [`OrbitalSystem::generate_random_satellites`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationBounds {
    pub orbital_period: SampleRange,
    pub semi_major_axis: SampleRange,
    /// Must lie within `[0, 1]`; samples are always strictly below 1.
    pub eccentricity: SampleRange,
    pub inclination: SampleRange,
    pub argument_of_periapsis: SampleRange,
    pub longitude_of_ascending_node: SampleRange,
    /// Start each body at a random point of its orbit instead of periapsis.
    pub random_phase: bool,
    /// Stretch the period by `exp(periapsis / falloff)`, slowing outer bodies.
    pub period_falloff: Option<f64>,
}

impl Default for GenerationBounds {
    /// Planet-like defaults.
    fn default() -> Self {
        Self {
            orbital_period: SampleRange::new(500.0, 750.0),
            semi_major_axis: SampleRange::new(10.0, 300.0),
            eccentricity: SampleRange::new(0.0, 0.3),
            inclination: SampleRange::new(-0.3, 0.3),
            argument_of_periapsis: SampleRange::fixed(0.0),
            longitude_of_ascending_node: SampleRange::fixed(0.0),
            random_phase: true,
            period_falloff: Some(100.0),
        }
    }
}

impl GenerationBounds {
    /// Moon-like defaults: same as planets but on tight orbits.
    pub fn moons() -> Self {
        Self {
            semi_major_axis: SampleRange::new(5.0, 10.0),
            ..Self::default()
        }
    }

    /// Check every range before anything is sampled.
    pub fn validate(&self) -> Result<(), SystemError> {
        self.orbital_period.check("orbital_period")?;
        self.semi_major_axis.check("semi_major_axis")?;
        self.eccentricity.check("eccentricity")?;
        self.inclination.check("inclination")?;
        self.argument_of_periapsis.check("argument_of_periapsis")?;
        self.longitude_of_ascending_node
            .check("longitude_of_ascending_node")?;

        if self.orbital_period.min <= 0.0 {
            return Err(SystemError::InvalidBounds {
                field: "orbital_period",
                reason: "minimum must be positive",
            });
        }
        if self.semi_major_axis.min <= 0.0 {
            return Err(SystemError::InvalidBounds {
                field: "semi_major_axis",
                reason: "minimum must be positive",
            });
        }
        if self.eccentricity.min < 0.0 || self.eccentricity.max > 1.0 || self.eccentricity.min >= 1.0
        {
            return Err(SystemError::InvalidBounds {
                field: "eccentricity",
                reason: "range must lie within [0, 1)",
            });
        }
        if let Some(falloff) = self.period_falloff {
            if !(falloff.is_finite() && falloff > 0.0) {
                return Err(SystemError::InvalidBounds {
                    field: "period_falloff",
                    reason: "falloff must be positive and finite",
                });
            }
            let widest_periapsis = self.semi_major_axis.max * (1.0 - self.eccentricity.min);
            let longest_period = self.orbital_period.max * (widest_periapsis / falloff).exp();
            if !longest_period.is_finite() {
                return Err(SystemError::InvalidBounds {
                    field: "period_falloff",
                    reason: "stretched period overflows",
                });
            }
        }
        Ok(())
    }

    /// Draw one set of elements. Call [`validate`](Self::validate) first.
    pub fn sample_elements<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<OrbitalElements, SystemError> {
        let semi_major_axis = self.semi_major_axis.sample(rng);
        let eccentricity = self.eccentricity.sample(rng).min(MAX_SAMPLED_ECCENTRICITY);
        let mut orbital_period = self.orbital_period.sample(rng);
        if let Some(falloff) = self.period_falloff {
            let periapsis = semi_major_axis * (1.0 - eccentricity);
            orbital_period *= (periapsis / falloff).exp();
        }

        Ok(OrbitalElements::new(
            orbital_period,
            semi_major_axis,
            eccentricity,
            self.inclination.sample(rng),
            self.argument_of_periapsis.sample(rng),
            self.longitude_of_ascending_node.sample(rng),
        )?)
    }
}

impl OrbitalSystem {
    /// Add `n` bodies with elements drawn from `bounds`, orbiting `parent` (or
    /// the origin).
    ///
    /// Bounds and parent are checked, and every body is sampled and solved,
    /// before anything is added. Names are derived from the parent's name, or
    /// `satellite-<k>` for roots.
    pub fn generate_random_satellites<R: Rng + ?Sized>(
        &mut self,
        n: usize,
        bounds: &GenerationBounds,
        parent: Option<BodyId>,
        rng: &mut R,
    ) -> Result<Vec<BodyId>, SystemError> {
        bounds.validate()?;
        let prefix = match parent {
            Some(parent_id) => self
                .body(parent_id)
                .map_err(|_| SystemError::InvalidParent(parent_id))?
                .name()
                .to_string(),
            None => "satellite".to_string(),
        };

        let mut sampled = Vec::with_capacity(n);
        for _ in 0..n {
            let elements = bounds.sample_elements(rng)?;
            let phase = if bounds.random_phase {
                rng.random_range(0.0..elements.orbital_period())
            } else {
                0.0
            };
            // The solver ignores the barycenter, so this catches any failure
            // `add_body_at` would hit.
            OrbitState::with_time(elements, phase)?.cartesian(DVec3::ZERO, self.solver())?;
            sampled.push((elements, phase));
        }

        let mut ids = Vec::with_capacity(n);
        for (k, (elements, phase)) in sampled.into_iter().enumerate() {
            ids.push(self.add_body_at(format!("{prefix}-{k}"), elements, parent, phase)?);
        }

        debug!("Generated {n} bodies around {}", prefix);
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_generated_elements_stay_in_bounds() {
        let bounds = GenerationBounds {
            period_falloff: None,
            ..GenerationBounds::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut system = OrbitalSystem::default();
        let ids = system
            .generate_random_satellites(200, &bounds, None, &mut rng)
            .unwrap();
        assert_eq!(ids.len(), 200);

        for id in ids {
            let body = system.body(id).unwrap();
            let el = body.elements();
            assert!((500.0..750.0).contains(&el.orbital_period()));
            assert!((10.0..300.0).contains(&el.semi_major_axis()));
            assert!((0.0..0.3).contains(&el.eccentricity()));
            assert!((-0.3..0.3).contains(&el.inclination()));
            assert!(body.orbit().time() < el.orbital_period());
        }
    }

    #[test]
    fn test_full_eccentricity_range_never_reaches_one() {
        let bounds = GenerationBounds {
            eccentricity: SampleRange::new(0.999_999_9, 1.0),
            period_falloff: None,
            random_phase: false,
            ..GenerationBounds::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..1000 {
            let elements = bounds.sample_elements(&mut rng).unwrap();
            assert!(elements.eccentricity() < 1.0);
        }
    }

    #[test]
    fn test_generation_is_seed_deterministic() {
        let bounds = GenerationBounds::default();
        let run = |seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut system = OrbitalSystem::default();
            system
                .generate_random_satellites(10, &bounds, None, &mut rng)
                .unwrap();
            system
                .bodies()
                .map(|(_, b)| *b.elements())
                .collect::<Vec<_>>()
        };
        assert_eq!(run(42), run(42));
        assert_ne!(run(42), run(43));
    }

    #[test]
    fn test_period_falloff_slows_outer_bodies() {
        let bounds = GenerationBounds {
            orbital_period: SampleRange::fixed(100.0),
            semi_major_axis: SampleRange::fixed(200.0),
            eccentricity: SampleRange::fixed(0.0),
            inclination: SampleRange::fixed(0.0),
            period_falloff: Some(100.0),
            ..GenerationBounds::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let elements = bounds.sample_elements(&mut rng).unwrap();
        assert!((elements.orbital_period() - 100.0 * 2.0_f64.exp()).abs() < 1e-9);
    }

    #[test]
    fn test_moons_attach_to_parent() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut system = OrbitalSystem::default();
        let planets = system
            .generate_random_satellites(2, &GenerationBounds::default(), None, &mut rng)
            .unwrap();
        let moons = system
            .generate_random_satellites(5, &GenerationBounds::moons(), Some(planets[1]), &mut rng)
            .unwrap();

        assert_eq!(system.len(), 7);
        for moon in &moons {
            let body = system.body(*moon).unwrap();
            assert_eq!(body.parent(), Some(planets[1]));
            assert!(body.name().starts_with("satellite-1-"));
        }
        system.step(1.0).unwrap();
    }

    #[test]
    fn test_invalid_bounds_rejected_before_adding() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut system = OrbitalSystem::default();

        let cases = [
            (
                GenerationBounds {
                    eccentricity: SampleRange::new(0.5, 1.5),
                    ..GenerationBounds::default()
                },
                "eccentricity",
            ),
            (
                GenerationBounds {
                    semi_major_axis: SampleRange::new(10.0, 1.0),
                    ..GenerationBounds::default()
                },
                "semi_major_axis",
            ),
            (
                GenerationBounds {
                    orbital_period: SampleRange::new(0.0, 10.0),
                    ..GenerationBounds::default()
                },
                "orbital_period",
            ),
            (
                GenerationBounds {
                    inclination: SampleRange::new(f64::NAN, 1.0),
                    ..GenerationBounds::default()
                },
                "inclination",
            ),
            (
                GenerationBounds {
                    period_falloff: Some(0.0),
                    ..GenerationBounds::default()
                },
                "period_falloff",
            ),
        ];

        for (bounds, expected_field) in cases {
            match system.generate_random_satellites(3, &bounds, None, &mut rng) {
                Err(SystemError::InvalidBounds { field, .. }) => assert_eq!(field, expected_field),
                other => panic!("expected InvalidBounds for {expected_field}, got {other:?}"),
            }
        }
        assert!(system.is_empty());
    }

    #[test]
    fn test_overflowing_falloff_rejected_up_front() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut system = OrbitalSystem::default();
        let bounds = GenerationBounds {
            semi_major_axis: SampleRange::new(1.0, 200_000.0),
            period_falloff: Some(100.0),
            ..GenerationBounds::default()
        };
        let result = system.generate_random_satellites(20, &bounds, None, &mut rng);
        assert!(matches!(
            result,
            Err(SystemError::InvalidBounds {
                field: "period_falloff",
                ..
            })
        ));
        assert!(system.is_empty());
    }

    #[test]
    fn test_huge_finite_range_rejected_instead_of_panicking() {
        let bounds = GenerationBounds {
            inclination: SampleRange::new(-f64::MAX, f64::MAX),
            ..GenerationBounds::default()
        };
        assert!(matches!(
            bounds.validate(),
            Err(SystemError::InvalidBounds {
                field: "inclination",
                ..
            })
        ));
    }

    #[test]
    fn test_unsolvable_batch_adds_nothing() {
        let solver = orrery_orbit::SolverConfig {
            epsilon: 1e-12,
            max_iterations: 1,
        };
        let mut system = OrbitalSystem::new(solver);
        let bounds = GenerationBounds {
            eccentricity: SampleRange::new(0.9, 0.95),
            period_falloff: None,
            random_phase: true,
            ..GenerationBounds::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let result = system.generate_random_satellites(10, &bounds, None, &mut rng);
        assert!(matches!(result, Err(SystemError::Orbit(_))));
        assert!(system.is_empty());
    }

    #[test]
    fn test_unknown_parent_rejected_before_adding() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut system = OrbitalSystem::default();
        let planet = system
            .add_body("planet", OrbitalElements::circular(10.0, 1.0).unwrap(), None)
            .unwrap();
        system.remove_body(planet).unwrap();

        let result =
            system.generate_random_satellites(3, &GenerationBounds::moons(), Some(planet), &mut rng);
        assert_eq!(result, Err(SystemError::InvalidParent(planet)));
        assert!(system.is_empty());
    }
}
