//! Search geometry: coordinates, radii and regions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SamplerError};

/// Unit of a search radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DistanceUnit {
    #[serde(rename = "km")]
    Kilometers,
    #[serde(rename = "m")]
    Meters,
}

impl DistanceUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceUnit::Kilometers => "km",
            DistanceUnit::Meters => "m",
        }
    }
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistanceUnit {
    type Err = SamplerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "km" | "kilometers" | "kilometres" => Ok(DistanceUnit::Kilometers),
            "m" | "meters" | "metres" => Ok(DistanceUnit::Meters),
            other => Err(SamplerError::invalid_region(format!(
                "unknown distance unit '{other}' (expected km or m)"
            ))),
        }
    }
}

/// A strictly positive radius with its unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Distance {
    pub value: f64,
    pub unit: DistanceUnit,
}

impl Distance {
    /// Create a radius, rejecting zero, negative and non-finite values.
    pub fn new(value: f64, unit: DistanceUnit) -> Result<Self> {
        if !value.is_finite() || value <= 0.0 {
            return Err(SamplerError::invalid_region(format!(
                "radius must be a positive number, got {value} {unit}"
            )));
        }
        Ok(Self { value, unit })
    }

    pub fn kilometers(value: f64) -> Result<Self> {
        Self::new(value, DistanceUnit::Kilometers)
    }

    pub fn meters(value: f64) -> Result<Self> {
        Self::new(value, DistanceUnit::Meters)
    }

    pub fn as_km(&self) -> f64 {
        match self.unit {
            DistanceUnit::Kilometers => self.value,
            DistanceUnit::Meters => self.value / 1000.0,
        }
    }

    pub fn as_meters(&self) -> f64 {
        match self.unit {
            DistanceUnit::Kilometers => self.value * 1000.0,
            DistanceUnit::Meters => self.value,
        }
    }

    /// The radius used for the children of a saturated region.
    ///
    /// Kilometer radii above 1 are halved. Anything at or below 1 km switches
    /// to meters without shrinking (1 km becomes 1000 m), and meter radii are
    /// halved. The switch step keeps the footprint constant, so callers must
    /// bound refinement by depth or a minimum radius.
    pub fn refined(&self) -> Distance {
        match self.unit {
            DistanceUnit::Kilometers if self.value > 1.0 => Distance {
                value: self.value / 2.0,
                unit: DistanceUnit::Kilometers,
            },
            DistanceUnit::Kilometers => Distance {
                value: self.value * 1000.0,
                unit: DistanceUnit::Meters,
            },
            DistanceUnit::Meters => Distance {
                value: self.value / 2.0,
                unit: DistanceUnit::Meters,
            },
        }
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

/// A point in signed decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    /// Create a point, rejecting out-of-range or non-finite degrees.
    pub fn new(lat: f64, lon: f64) -> Result<Self> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(SamplerError::invalid_region(format!(
                "latitude must be within [-90, 90], got {lat}"
            )));
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(SamplerError::invalid_region(format!(
                "longitude must be within [-180, 180], got {lon}"
            )));
        }
        Ok(Self { lat, lon })
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lon)
    }
}

/// One query's footprint: a center and a radius.
///
/// Regions only exist for the duration of a search; they are never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub center: Coordinates,
    pub radius: Distance,
}

impl Region {
    pub fn new(center: Coordinates, radius: Distance) -> Self {
        Self { center, radius }
    }

    /// Re-check a region whose public fields may have been set directly.
    pub fn validate(&self) -> Result<()> {
        Distance::new(self.radius.value, self.radius.unit)?;
        Coordinates::new(self.center.lat, self.center.lon)?;
        Ok(())
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} around {}", self.radius, self.center)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_rejects_non_positive() {
        assert!(Distance::kilometers(0.0).is_err());
        assert!(Distance::kilometers(-1.5).is_err());
        assert!(Distance::meters(f64::NAN).is_err());
        assert!(Distance::meters(f64::INFINITY).is_err());
        assert!(Distance::meters(0.001).is_ok());
    }

    #[test]
    fn test_refine_halves_kilometers_above_one() {
        let r = Distance::kilometers(5.0).unwrap().refined();
        assert_eq!(r, Distance { value: 2.5, unit: DistanceUnit::Kilometers });

        let r = r.refined();
        assert_eq!(r, Distance { value: 1.25, unit: DistanceUnit::Kilometers });
    }

    #[test]
    fn test_refine_switches_to_meters_at_or_below_one_km() {
        let r = Distance::kilometers(1.0).unwrap().refined();
        assert_eq!(r, Distance { value: 1000.0, unit: DistanceUnit::Meters });

        let r = Distance::kilometers(0.625).unwrap().refined();
        assert_eq!(r, Distance { value: 625.0, unit: DistanceUnit::Meters });
    }

    #[test]
    fn test_refine_halves_meters() {
        let r = Distance::meters(1000.0).unwrap().refined();
        assert_eq!(r, Distance { value: 500.0, unit: DistanceUnit::Meters });
    }

    #[test]
    fn test_metric_radius_never_grows() {
        let mut r = Distance::kilometers(37.0).unwrap();
        for _ in 0..20 {
            let next = r.refined();
            assert!(next.as_meters() <= r.as_meters());
            assert!(next.value > 0.0);
            r = next;
        }
    }

    #[test]
    fn test_unit_parsing() {
        assert_eq!("km".parse::<DistanceUnit>().unwrap(), DistanceUnit::Kilometers);
        assert_eq!(" Meters ".parse::<DistanceUnit>().unwrap(), DistanceUnit::Meters);
        assert!("mi".parse::<DistanceUnit>().is_err());
    }

    #[test]
    fn test_coordinates_range() {
        assert!(Coordinates::new(41.8781, -87.6298).is_ok());
        assert!(Coordinates::new(90.0, 180.0).is_ok());
        assert!(Coordinates::new(90.5, 0.0).is_err());
        assert!(Coordinates::new(0.0, -180.1).is_err());
    }

    #[test]
    fn test_region_validate_catches_hand_built_fields() {
        let center = Coordinates::new(0.0, 0.0).unwrap();
        let mut region = Region::new(center, Distance::kilometers(1.0).unwrap());
        assert!(region.validate().is_ok());

        region.radius.value = 0.0;
        assert!(region.validate().is_err());

        region.radius.value = 1.0;
        region.center.lon = 200.0;
        assert!(region.validate().is_err());
    }

    #[test]
    fn test_display() {
        let region = Region::new(
            Coordinates::new(1.5, -2.0).unwrap(),
            Distance::kilometers(2.5).unwrap(),
        );
        assert_eq!(region.to_string(), "2.5 km around (1.5, -2)");
    }
}
