//! Built-in solar resource table.

use crate::error::SizingError;
use serde::Serialize;

/// A known location and its average solar resource.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Location {
    pub name: &'static str,
    pub latitude: f64,
    pub longitude: f64,
    /// Average daily irradiance (kWh/m²/day)
    pub irradiance: f64,
}

/// The lookup table. Simplified annual averages.
pub const LOCATIONS: [Location; 6] = [
    Location {
        name: "phoenix",
        latitude: 33.4484,
        longitude: -112.0740,
        irradiance: 6.5,
    },
    Location {
        name: "miami",
        latitude: 25.7617,
        longitude: -80.1918,
        irradiance: 5.8,
    },
    Location {
        name: "denver",
        latitude: 39.7392,
        longitude: -104.9903,
        irradiance: 5.5,
    },
    Location {
        name: "seattle",
        latitude: 47.6062,
        longitude: -122.3321,
        irradiance: 3.4,
    },
    Location {
        name: "chicago",
        latitude: 41.8781,
        longitude: -87.6298,
        irradiance: 4.2,
    },
    Location {
        name: "utah",
        latitude: 39.5501,
        longitude: -111.8947,
        irradiance: 5.8,
    },
];

/// Finds a location by name, case-insensitively.
///
/// A miss leaves caller state untouched and names the query so the UI
/// can show a "not found" notice with the known options.
pub fn lookup(name: &str) -> Result<&'static Location, SizingError> {
    let needle = name.trim().to_lowercase();
    LOCATIONS
        .iter()
        .find(|l| l.name == needle)
        .ok_or_else(|| SizingError::UnknownLocation(name.to_string()))
}

/// The known location names, for help text.
pub fn names() -> Vec<&'static str> {
    LOCATIONS.iter().map(|l| l.name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_hit_is_case_insensitive() {
        let location = lookup("Phoenix").unwrap();
        assert_eq!(location.irradiance, 6.5);
        assert_eq!(lookup(" seattle ").unwrap().irradiance, 3.4);
    }

    #[test]
    fn test_lookup_miss_names_the_query() {
        match lookup("atlantis") {
            Err(SizingError::UnknownLocation(query)) => assert_eq!(query, "atlantis"),
            other => panic!("expected UnknownLocation, got {:?}", other),
        }
    }
}
