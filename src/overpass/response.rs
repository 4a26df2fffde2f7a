//! Overpass JSON response structures and conversion into [`Poi`]s

use std::collections::HashMap;

use serde::Deserialize;

use crate::category::map_category;
use crate::models::{Location, Poi};

/// Top-level Overpass `[out:json]` document
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OverpassResponse {
    pub elements: Vec<OverpassElement>,
    /// Set by the server when evaluation hit a runtime error
    #[serde(default)]
    pub remark: Option<String>,
}

/// A single OSM element
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OverpassElement {
    pub id: i64,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

impl OverpassElement {
    fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .get(key)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    /// Display name, if the element carries a usable one
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.tag("name")
    }

    fn address(&self) -> Option<String> {
        let street = self.tag("addr:street")?;
        let number = self.tag("addr:housenumber").unwrap_or_default();
        Some(format!("{street} {number}").trim().to_string())
    }

    /// Build a POI relative to `origin`.
    ///
    /// Returns `None` for elements without a name or without coordinates.
    #[must_use]
    pub fn to_poi(&self, origin: &Location) -> Option<Poi> {
        let name = self.name()?;
        let (lat, lon) = (self.lat?, self.lon?);
        let position = Location::new(lat, lon);
        if !position.is_valid() {
            return None;
        }

        Some(Poi {
            id: self.id.to_string(),
            name: name.to_string(),
            category: map_category(&self.tags),
            distance: origin.distance_to(&position),
            lat,
            lon,
            address: self.address(),
            phone: self.tag("phone").or_else(|| self.tag("contact:phone")).map(str::to_string),
            website: self
                .tag("website")
                .or_else(|| self.tag("contact:website"))
                .map(str::to_string),
            opening_hours: self.tag("opening_hours").map(str::to_string),
        })
    }
}
