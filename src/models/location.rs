//! Location model for geographic coordinates

use serde::{Deserialize, Serialize};

use crate::geo;

/// A WGS84 position
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Location {
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    pub lon: f64,
}

impl Location {
    /// Create a new location
    #[must_use]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Great-circle distance to another location in meters
    #[must_use]
    pub fn distance_to(&self, other: &Location) -> f64 {
        geo::distance_meters(self.lat, self.lon, other.lat, other.lon)
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.6}, {:.6}", self.lat, self.lon)
    }

    /// Whether both coordinates are finite and within WGS84 bounds
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}
