//! Import of solar-system catalog records (the `bodies` JSON document served by
//! public solar-system APIs) into orbital elements.
//!
//! Catalog distances are kilometres and angles are degrees. Converted orbits
//! use AU for distances, radians for angles and days as the time unit.

use serde::Deserialize;

use crate::elements::OrbitalElements;
use crate::error::OrbitError;
use crate::kepler::period_from_semi_major_axis;

/// Kilometres per astronomical unit.
pub const KM_PER_AU: f64 = 1.496e8;

/// Days per Julian year.
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Errors raised while reading a catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The document is not valid catalog JSON.
    #[error("failed to parse catalog: {0}")]
    Parse(#[source] serde_json::Error),

    /// A satellite record has no sidereal period. The third-law fallback only
    /// holds around the Sun, so it is not applied to moons.
    #[error("catalog satellite '{body}' has no sidereal period")]
    MissingPeriod { body: String },

    /// A record carries elements that do not describe a closed orbit.
    #[error("catalog body '{body}' has invalid elements: {source}")]
    Elements {
        body: String,
        #[source]
        source: OrbitError,
    },
}

/// Reference from a moon to the planet it orbits.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct AroundPlanet {
    /// Catalog id of the parent planet.
    pub planet: String,
}

/// One catalog record. Unknown fields are ignored; missing numbers default to zero.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogBody {
    pub id: String,
    pub name: String,
    pub english_name: String,
    pub is_planet: bool,
    /// Kilometres. Zero for bodies that do not orbit anything (the Sun).
    pub semimajor_axis: f64,
    pub eccentricity: f64,
    /// Degrees.
    pub inclination: f64,
    /// Mean anomaly at epoch, degrees.
    pub main_anomaly: f64,
    /// Degrees.
    pub arg_periapsis: f64,
    /// Degrees.
    pub long_asc_node: f64,
    /// Sidereal period in days, zero when unknown.
    pub sideral_orbit: f64,
    pub around_planet: Option<AroundPlanet>,
}

/// A catalog record converted for propagation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CatalogOrbit {
    pub elements: OrbitalElements,
    /// Time since periapsis at the catalog epoch, in days.
    pub epoch_time: f64,
}

impl CatalogBody {
    /// Display name: the English name when present, else the native one, else the id.
    pub fn display_name(&self) -> &str {
        [&self.english_name, &self.name, &self.id]
            .into_iter()
            .find(|s| !s.is_empty())
            .map(String::as_str)
            .unwrap_or("unnamed")
    }

    /// Whether the record describes an orbit at all.
    pub fn is_orbiting(&self) -> bool {
        self.semimajor_axis != 0.0
    }

    /// Convert to AU / radians / days.
    ///
    /// The period comes from `sideralOrbit` when present. Retrograde bodies
    /// carry a negative value there; only its magnitude is used since the
    /// inclination already encodes the direction. Planets without a period
    /// fall back to Kepler's third law around a solar-mass primary.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::MissingPeriod`] for a satellite without a period.
    /// - [`CatalogError::Elements`] if the converted values are rejected by
    ///   [`OrbitalElements::new`].
    pub fn to_orbit(&self) -> Result<CatalogOrbit, CatalogError> {
        let semi_major_axis = self.semimajor_axis / KM_PER_AU;
        let orbital_period = if self.sideral_orbit != 0.0 {
            self.sideral_orbit.abs()
        } else if self.around_planet.is_some() {
            return Err(CatalogError::MissingPeriod {
                body: self.display_name().to_string(),
            });
        } else {
            period_from_semi_major_axis(semi_major_axis) * DAYS_PER_YEAR
        };

        let elements = OrbitalElements::new(
            orbital_period,
            semi_major_axis,
            self.eccentricity,
            self.inclination.to_radians(),
            self.arg_periapsis.to_radians(),
            self.long_asc_node.to_radians(),
        )
        .map_err(|source| CatalogError::Elements {
            body: self.display_name().to_string(),
            source,
        })?;

        Ok(CatalogOrbit {
            elements,
            epoch_time: self.main_anomaly.rem_euclid(360.0) / 360.0 * orbital_period,
        })
    }
}

/// A parsed catalog document.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Catalog {
    #[serde(default)]
    pub bodies: Vec<CatalogBody>,
}

impl Catalog {
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        serde_json::from_str(json).map_err(CatalogError::Parse)
    }

    /// Orbiting planets, in document order.
    pub fn planets(&self) -> impl Iterator<Item = &CatalogBody> {
        self.bodies.iter().filter(|b| b.is_planet && b.is_orbiting())
    }

    /// Orbiting bodies whose parent is the planet with catalog id `planet_id`.
    pub fn satellites_of<'a>(&'a self, planet_id: &'a str) -> impl Iterator<Item = &'a CatalogBody> {
        self.bodies.iter().filter(move |b| {
            b.is_orbiting()
                && b
                    .around_planet
                    .as_ref()
                    .is_some_and(|around| around.planet == planet_id)
        })
    }
}
