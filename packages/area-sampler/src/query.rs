//! Query descriptors handed to a data source.
//!
//! Building a query is pure: no I/O happens here. Data sources choose which
//! rendering they need (the structured fields, the natural-language text, or
//! a map search URL).

use serde::{Deserialize, Serialize};

use crate::types::region::{Coordinates, Distance, DistanceUnit, Region};

const MAP_SEARCH_BASE: &str = "https://www.google.com/maps/search/";

/// Parameters describing one region query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryDescriptor {
    pub category: String,
    pub radius: f64,
    pub unit: DistanceUnit,
    pub center: Coordinates,
}

impl QueryDescriptor {
    /// Natural-language query, e.g. `factories within 5 km of 41.8781° N, 87.6298° W`.
    ///
    /// Coordinates are printed unrounded with hemisphere letters.
    pub fn query_text(&self) -> String {
        let (lat, lon) = hemisphere_coordinates(&self.center);
        format!(
            "{} within {} {} of {}, {}",
            self.category, self.radius, self.unit, lat, lon
        )
    }

    /// Map search URL for the query text.
    pub fn search_url(&self) -> String {
        let encoded: String =
            url::form_urlencoded::byte_serialize(self.query_text().as_bytes()).collect();
        format!("{MAP_SEARCH_BASE}{encoded}")
    }

    /// The region this query covers.
    pub fn region(&self) -> Option<Region> {
        Distance::new(self.radius, self.unit)
            .ok()
            .map(|radius| Region::new(self.center, radius))
    }
}

/// Build the query for `category` over a radius around `center`.
pub fn build_query(category: &str, radius: Distance, center: Coordinates) -> QueryDescriptor {
    QueryDescriptor {
        category: category.to_string(),
        radius: radius.value,
        unit: radius.unit,
        center,
    }
}

/// Build the query covering `region`.
pub fn query_for_region(category: &str, region: &Region) -> QueryDescriptor {
    build_query(category, region.radius, region.center)
}

fn hemisphere_coordinates(center: &Coordinates) -> (String, String) {
    let lat_dir = if center.lat >= 0.0 { 'N' } else { 'S' };
    let lon_dir = if center.lon >= 0.0 { 'E' } else { 'W' };
    (
        format!("{}° {}", center.lat.abs(), lat_dir),
        format!("{}° {}", center.lon.abs(), lon_dir),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chicago_query() -> QueryDescriptor {
        build_query(
            "factories",
            Distance::kilometers(5.0).unwrap(),
            Coordinates::new(41.8781, -87.6298).unwrap(),
        )
    }

    #[test]
    fn test_query_text() {
        assert_eq!(
            chicago_query().query_text(),
            "factories within 5 km of 41.8781° N, 87.6298° W"
        );
    }

    #[test]
    fn test_query_text_southern_eastern() {
        let query = build_query(
            "bakeries",
            Distance::meters(625.0).unwrap(),
            Coordinates::new(-33.8688, 151.2093).unwrap(),
        );
        assert_eq!(
            query.query_text(),
            "bakeries within 625 m of 33.8688° S, 151.2093° E"
        );
    }

    #[test]
    fn test_search_url_is_form_encoded() {
        assert_eq!(
            chicago_query().search_url(),
            "https://www.google.com/maps/search/factories+within+5+km+of+41.8781%C2%B0+N%2C+87.6298%C2%B0+W"
        );
    }

    #[test]
    fn test_build_is_deterministic() {
        assert_eq!(chicago_query(), chicago_query());
        assert_eq!(chicago_query().region().unwrap().radius.value, 5.0);
    }
}
