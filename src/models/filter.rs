//! Consumer-side filtering of a fetched POI list

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::poi::{Poi, PoiCategory};

/// Distance the filter starts out with
pub const DEFAULT_MAX_DISTANCE_M: f64 = 2000.0;

/// Distance a cleared filter falls back to
pub const CLEARED_MAX_DISTANCE_M: f64 = 5000.0;

/// Category and distance restrictions chosen by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    /// Allowed categories; empty means no restriction
    pub categories: BTreeSet<PoiCategory>,
    /// Maximum distance in meters
    pub max_distance: f64,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            categories: BTreeSet::new(),
            max_distance: DEFAULT_MAX_DISTANCE_M,
        }
    }
}

impl FilterState {
    #[must_use]
    pub fn new(categories: impl IntoIterator<Item = PoiCategory>, max_distance: f64) -> Self {
        Self {
            categories: categories.into_iter().collect(),
            max_distance,
        }
    }

    /// Add the category if absent, remove it otherwise
    pub fn toggle_category(&mut self, category: PoiCategory) {
        if !self.categories.remove(&category) {
            self.categories.insert(category);
        }
    }

    /// Reset to no category restriction and the wide default distance
    pub fn clear(&mut self) {
        self.categories.clear();
        self.max_distance = CLEARED_MAX_DISTANCE_M;
    }

    #[must_use]
    pub fn matches(&self, poi: &Poi) -> bool {
        (self.categories.is_empty() || self.categories.contains(&poi.category))
            && poi.distance <= self.max_distance
    }

    /// Keep the matching POIs, preserving their order
    #[must_use]
    pub fn apply<'a>(&self, pois: &'a [Poi]) -> Vec<&'a Poi> {
        pois.iter().filter(|poi| self.matches(poi)).collect()
    }
}
