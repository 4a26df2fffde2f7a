//! Point-of-interest model and category taxonomy

use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Closed set of categories every upstream record is mapped into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoiCategory {
    Restaurant,
    Cafe,
    Bar,
    Shop,
    Hotel,
    Attraction,
    Museum,
    Park,
    Pharmacy,
    Hospital,
    Bank,
    GasStation,
    Parking,
    Other,
}

impl PoiCategory {
    /// Every category, in display order
    pub const ALL: [PoiCategory; 14] = [
        PoiCategory::Restaurant,
        PoiCategory::Cafe,
        PoiCategory::Bar,
        PoiCategory::Shop,
        PoiCategory::Hotel,
        PoiCategory::Attraction,
        PoiCategory::Museum,
        PoiCategory::Park,
        PoiCategory::Pharmacy,
        PoiCategory::Hospital,
        PoiCategory::Bank,
        PoiCategory::GasStation,
        PoiCategory::Parking,
        PoiCategory::Other,
    ];

    /// Wire name, as used in JSON and on the command line
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PoiCategory::Restaurant => "restaurant",
            PoiCategory::Cafe => "cafe",
            PoiCategory::Bar => "bar",
            PoiCategory::Shop => "shop",
            PoiCategory::Hotel => "hotel",
            PoiCategory::Attraction => "attraction",
            PoiCategory::Museum => "museum",
            PoiCategory::Park => "park",
            PoiCategory::Pharmacy => "pharmacy",
            PoiCategory::Hospital => "hospital",
            PoiCategory::Bank => "bank",
            PoiCategory::GasStation => "gas_station",
            PoiCategory::Parking => "parking",
            PoiCategory::Other => "other",
        }
    }

    /// Human-readable label
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            PoiCategory::Restaurant => "Restaurant",
            PoiCategory::Cafe => "Café",
            PoiCategory::Bar => "Bar",
            PoiCategory::Shop => "Shop",
            PoiCategory::Hotel => "Hotel",
            PoiCategory::Attraction => "Attraction",
            PoiCategory::Museum => "Museum",
            PoiCategory::Park => "Park",
            PoiCategory::Pharmacy => "Pharmacy",
            PoiCategory::Hospital => "Hospital",
            PoiCategory::Bank => "Bank",
            PoiCategory::GasStation => "Gas Station",
            PoiCategory::Parking => "Parking",
            PoiCategory::Other => "Other",
        }
    }
}

impl Display for PoiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PoiCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        PoiCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == normalized)
            .ok_or_else(|| format!("Unknown category '{s}'"))
    }
}

/// A named place returned by a nearby search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Poi {
    /// Upstream element identifier
    pub id: String,
    pub name: String,
    pub category: PoiCategory,
    /// Straight-line distance from the query location in meters
    pub distance: f64,
    pub lat: f64,
    pub lon: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<String>,
}

impl Poi {
    /// Compact distance, e.g. `350m` or `1.2km`
    #[must_use]
    pub fn format_distance(&self) -> String {
        format_distance(self.distance)
    }

    /// Directions link for the place
    #[must_use]
    pub fn directions_url(&self) -> String {
        format!(
            "https://www.google.com/maps/dir/?api=1&destination={},{}",
            self.lat, self.lon
        )
    }
}

/// Compact distance formatting shared by list and detail output
#[must_use]
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{}m", meters.round())
    } else {
        format!("{:.1}km", meters / 1000.0)
    }
}
