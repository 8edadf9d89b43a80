//! Offsets on a spherical earth for subdividing a search region.
//!
//! A saturated region is refined by querying four children whose centers are
//! shifted north, south, east and west by the refined radius. Degrees of
//! latitude are a fixed length; degrees of longitude shrink with `cos(lat)`
//! and vanish at the poles.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::GeoError;
use crate::types::region::{Coordinates, Distance, Region};

/// Kilometers per degree of latitude (and of longitude at the equator).
pub const KM_PER_DEGREE: f64 = 111.32;

/// Below this `|cos(lat)|` the longitude offset is treated as undefined.
///
/// `cos(90°)` evaluates to ~6e-17 in floating point, not zero.
const POLE_EPSILON: f64 = 1e-12;

/// Direction of a child region relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// Traversal order for children.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
        };
        f.write_str(s)
    }
}

/// The four candidate centers around a parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Offsets {
    pub north: Coordinates,
    pub south: Coordinates,
    pub east: Coordinates,
    pub west: Coordinates,
}

impl Offsets {
    /// Centers in traversal order.
    pub fn in_order(&self) -> [(Direction, Coordinates); 4] {
        [
            (Direction::North, self.north),
            (Direction::South, self.south),
            (Direction::East, self.east),
            (Direction::West, self.west),
        ]
    }
}

/// Degrees of latitude spanned by `km`.
pub fn lat_offset_degrees(km: f64) -> f64 {
    km / KM_PER_DEGREE
}

/// Degrees of longitude spanned by `km` at latitude `lat`.
pub fn lon_offset_degrees(lat: f64, km: f64) -> Result<f64, GeoError> {
    let scale = lat.to_radians().cos().abs();
    if scale < POLE_EPSILON {
        return Err(GeoError::PoleSingularity { latitude: lat });
    }
    Ok(km / (KM_PER_DEGREE * scale))
}

/// Shift `center` by `radius` in each cardinal direction.
///
/// Latitudes are clamped to the poles and longitudes wrapped across the
/// antimeridian. At a pole the east/west centers keep the center longitude.
pub fn offset_region(center: Coordinates, radius: Distance) -> Offsets {
    let km = radius.as_km();
    let dlat = lat_offset_degrees(km);

    let (east_lon, west_lon) = match lon_offset_degrees(center.lat, km) {
        Ok(dlon) => (
            wrap_longitude(center.lon + dlon),
            wrap_longitude(center.lon - dlon),
        ),
        Err(e) => {
            debug!(error = %e, "Skipping east/west offset");
            (center.lon, center.lon)
        }
    };

    Offsets {
        north: Coordinates {
            lat: clamp_latitude(center.lat + dlat),
            lon: center.lon,
        },
        south: Coordinates {
            lat: clamp_latitude(center.lat - dlat),
            lon: center.lon,
        },
        east: Coordinates {
            lat: center.lat,
            lon: east_lon,
        },
        west: Coordinates {
            lat: center.lat,
            lon: west_lon,
        },
    }
}

/// Children of `region`, each carrying `new_radius`, in traversal order.
pub fn child_regions(region: &Region, new_radius: Distance) -> [(Direction, Region); 4] {
    offset_region(region.center, new_radius)
        .in_order()
        .map(|(direction, center)| (direction, Region::new(center, new_radius)))
}

fn clamp_latitude(lat: f64) -> f64 {
    lat.clamp(-90.0, 90.0)
}

/// Fold any longitude into [-180, 180], keeping 180 itself.
fn wrap_longitude(lon: f64) -> f64 {
    if (-180.0..=180.0).contains(&lon) {
        return lon;
    }
    (lon + 180.0).rem_euclid(360.0) - 180.0
}
