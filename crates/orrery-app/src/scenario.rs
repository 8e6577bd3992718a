//! Building the initial [`OrbitalSystem`] from config or a catalog file.

use orrery_config::{BodyClassConfig, Config, CountRange, GenerationConfig, RangeConfig, SolverSettings};
use orrery_orbit::{Catalog, CatalogError, SolverConfig};
use orrery_system::{BodyId, GenerationBounds, OrbitalSystem, SampleRange, SystemError};
use rand::Rng;
use tracing::{debug, info, warn};

use crate::AppError;

pub fn solver_config(settings: &SolverSettings) -> SolverConfig {
    SolverConfig {
        epsilon: settings.epsilon,
        max_iterations: settings.max_iterations,
    }
}

fn sample_range(range: &RangeConfig) -> SampleRange {
    SampleRange::new(range.min, range.max)
}

/// Sampling bounds for one body class. Orientation angles other than the
/// inclination stay at zero.
pub fn generation_bounds(class: &BodyClassConfig, generation: &GenerationConfig) -> GenerationBounds {
    GenerationBounds {
        orbital_period: sample_range(&class.orbital_period),
        semi_major_axis: sample_range(&class.semi_major_axis),
        eccentricity: sample_range(&class.eccentricity),
        inclination: sample_range(&class.inclination),
        argument_of_periapsis: SampleRange::fixed(0.0),
        longitude_of_ascending_node: SampleRange::fixed(0.0),
        random_phase: generation.random_phase,
        period_falloff: generation.period_falloff,
    }
}

/// The configured seed, or a fresh random one.
pub fn resolve_seed(generation: &GenerationConfig) -> u64 {
    generation.seed.unwrap_or_else(rand::random)
}

fn sample_count<R: Rng + ?Sized>(range: &CountRange, rng: &mut R) -> usize {
    if range.min >= range.max {
        range.min as usize
    } else {
        rng.random_range(range.min..=range.max) as usize
    }
}

/// Generate planets around the origin, moons around each planet and
/// sub-satellites around each moon.
pub fn build_random<R: Rng + ?Sized>(config: &Config, rng: &mut R) -> Result<OrbitalSystem, SystemError> {
    let generation = &config.generation;
    let planet_bounds = generation_bounds(&generation.planets, generation);
    let moon_bounds = generation_bounds(&generation.moons, generation);
    let sub_bounds = generation_bounds(&generation.sub_satellites, generation);

    let mut system = OrbitalSystem::new(solver_config(&config.solver));
    let planets = system.generate_random_satellites(
        generation.planet_count as usize,
        &planet_bounds,
        None,
        rng,
    )?;

    for planet in planets {
        let moon_count = sample_count(&generation.moons_per_planet, rng);
        let moons = system.generate_random_satellites(moon_count, &moon_bounds, Some(planet), rng)?;
        for moon in moons {
            let sub_count = sample_count(&generation.sub_satellites_per_moon, rng);
            system.generate_random_satellites(sub_count, &sub_bounds, Some(moon), rng)?;
        }
    }

    info!("Generated system with {} bodies", system.len());
    Ok(system)
}

/// Build planets and their satellites from a catalog, each starting at its
/// catalog mean anomaly.
///
/// Records that orbit neither the Sun nor a listed planet are skipped.
pub fn build_from_catalog(catalog: &Catalog, solver: SolverConfig) -> Result<OrbitalSystem, AppError> {
    let mut system = OrbitalSystem::new(solver);
    let mut placed = 0usize;

    for planet in catalog.planets() {
        let orbit = planet.to_orbit()?;
        let planet_id: BodyId =
            system.add_body_at(planet.display_name(), orbit.elements, None, orbit.epoch_time)?;
        placed += 1;

        for moon in catalog.satellites_of(&planet.id) {
            let orbit = match moon.to_orbit() {
                Ok(orbit) => orbit,
                Err(CatalogError::MissingPeriod { body }) => {
                    warn!("Skipping '{body}': no sidereal period");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            system.add_body_at(
                moon.display_name(),
                orbit.elements,
                Some(planet_id),
                orbit.epoch_time,
            )?;
            placed += 1;
        }
        debug!("Placed '{}' with {} satellites", planet.display_name(), system.children(planet_id).count());
    }

    let skipped = catalog.bodies.len().saturating_sub(placed);
    if skipped > 0 {
        warn!("Skipped {skipped} catalog records without a usable orbit");
    }
    info!("Loaded {placed} bodies from catalog");
    Ok(system)
}
