//! Classical orbital elements, validated once at construction.

use serde::{Deserialize, Serialize};

use crate::error::OrbitError;

/// Immutable set of classical Keplerian elements for a closed (elliptical) orbit.
///
/// Angles are in radians and may take any finite value; they are never
/// normalised. Construct with [`OrbitalElements::new`] or deserialize, both of
/// which reject invalid values.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawElements", into = "RawElements")]
pub struct OrbitalElements {
    orbital_period: f64,
    semi_major_axis: f64,
    eccentricity: f64,
    inclination: f64,
    argument_of_periapsis: f64,
    longitude_of_ascending_node: f64,
}

/// Unvalidated mirror of [`OrbitalElements`] used for (de)serialization.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
struct RawElements {
    orbital_period: f64,
    semi_major_axis: f64,
    eccentricity: f64,
    #[serde(default)]
    inclination: f64,
    #[serde(default)]
    argument_of_periapsis: f64,
    #[serde(default)]
    longitude_of_ascending_node: f64,
}

impl TryFrom<RawElements> for OrbitalElements {
    type Error = OrbitError;

    fn try_from(raw: RawElements) -> Result<Self, Self::Error> {
        OrbitalElements::new(
            raw.orbital_period,
            raw.semi_major_axis,
            raw.eccentricity,
            raw.inclination,
            raw.argument_of_periapsis,
            raw.longitude_of_ascending_node,
        )
    }
}

impl From<OrbitalElements> for RawElements {
    fn from(elements: OrbitalElements) -> Self {
        Self {
            orbital_period: elements.orbital_period,
            semi_major_axis: elements.semi_major_axis,
            eccentricity: elements.eccentricity,
            inclination: elements.inclination,
            argument_of_periapsis: elements.argument_of_periapsis,
            longitude_of_ascending_node: elements.longitude_of_ascending_node,
        }
    }
}

/// Rejects eccentricities outside `[0, 1)`, including NaN.
pub(crate) fn check_eccentricity(eccentricity: f64) -> Result<(), OrbitError> {
    if (0.0..1.0).contains(&eccentricity) {
        Ok(())
    } else {
        Err(OrbitError::InvalidEccentricity(eccentricity))
    }
}

fn check_finite(value: f64, field: &'static str) -> Result<(), OrbitError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(OrbitError::NonFinite { field })
    }
}

impl OrbitalElements {
    /// Validate and build a set of elements.
    ///
    /// # Errors
    ///
    /// - [`OrbitError::NonFinite`] if any value is NaN or infinite.
    /// - [`OrbitError::InvalidPeriod`] / [`OrbitError::InvalidSemiMajorAxis`]
    ///   if either is not strictly positive.
    /// - [`OrbitError::InvalidEccentricity`] if `eccentricity` is outside `[0, 1)`.
    pub fn new(
        orbital_period: f64,
        semi_major_axis: f64,
        eccentricity: f64,
        inclination: f64,
        argument_of_periapsis: f64,
        longitude_of_ascending_node: f64,
    ) -> Result<Self, OrbitError> {
        check_finite(orbital_period, "orbital period")?;
        check_finite(semi_major_axis, "semi-major axis")?;
        check_finite(inclination, "inclination")?;
        check_finite(argument_of_periapsis, "argument of periapsis")?;
        check_finite(longitude_of_ascending_node, "longitude of ascending node")?;
        check_eccentricity(eccentricity)?;
        if orbital_period <= 0.0 {
            return Err(OrbitError::InvalidPeriod(orbital_period));
        }
        if semi_major_axis <= 0.0 {
            return Err(OrbitError::InvalidSemiMajorAxis(semi_major_axis));
        }

        Ok(Self {
            orbital_period,
            semi_major_axis,
            eccentricity,
            inclination,
            argument_of_periapsis,
            longitude_of_ascending_node,
        })
    }

    /// Circular, un-inclined orbit. Handy for tests and fixed layouts.
    pub fn circular(orbital_period: f64, radius: f64) -> Result<Self, OrbitError> {
        Self::new(orbital_period, radius, 0.0, 0.0, 0.0, 0.0)
    }

    pub fn orbital_period(&self) -> f64 {
        self.orbital_period
    }

    pub fn semi_major_axis(&self) -> f64 {
        self.semi_major_axis
    }

    pub fn eccentricity(&self) -> f64 {
        self.eccentricity
    }

    pub fn inclination(&self) -> f64 {
        self.inclination
    }

    pub fn argument_of_periapsis(&self) -> f64 {
        self.argument_of_periapsis
    }

    pub fn longitude_of_ascending_node(&self) -> f64 {
        self.longitude_of_ascending_node
    }

    /// Average angular rate in radians per time unit.
    pub fn mean_motion(&self) -> f64 {
        std::f64::consts::TAU / self.orbital_period
    }

    /// Closest distance to the focus, `a(1 - e)`.
    pub fn periapsis_distance(&self) -> f64 {
        self.semi_major_axis * (1.0 - self.eccentricity)
    }

    /// Farthest distance from the focus, `a(1 + e)`.
    pub fn apoapsis_distance(&self) -> f64 {
        self.semi_major_axis * (1.0 + self.eccentricity)
    }

    pub fn semi_minor_axis(&self) -> f64 {
        self.semi_major_axis * (1.0 - self.eccentricity * self.eccentricity).sqrt()
    }

    /// Longitude of periapsis, `Ω + ω`.
    pub fn longitude_of_periapsis(&self) -> f64 {
        self.longitude_of_ascending_node + self.argument_of_periapsis
    }
}
