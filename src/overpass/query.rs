//! Overpass QL query construction for nearby searches

use crate::models::Location;

/// Hard ceiling on the radius sent upstream, in meters
pub const MAX_RADIUS_M: f64 = 1500.0;

/// Maximum number of elements requested from upstream
pub const RESULT_LIMIT: u32 = 50;

/// Evaluation budget granted to the Overpass server, in seconds
pub const QUERY_TIMEOUT_SECS: u32 = 15;

/// Node filter on one tag key matching any of the listed values
#[derive(Debug, Clone, Copy)]
pub struct TagFilter {
    pub key: &'static str,
    pub values: &'static [&'static str],
}

/// The tag filters a nearby search asks for
pub const NEARBY_FILTERS: &[TagFilter] = &[
    TagFilter {
        key: "amenity",
        values: &[
            "restaurant",
            "fast_food",
            "cafe",
            "bar",
            "pub",
            "pharmacy",
            "bank",
            "fuel",
        ],
    },
    TagFilter {
        key: "tourism",
        values: &["hotel", "museum", "attraction"],
    },
    TagFilter {
        key: "shop",
        values: &["supermarket", "convenience"],
    },
];

/// Clamp a requested radius to `[0, max_radius_m]`, never above [`MAX_RADIUS_M`]
#[must_use]
pub fn effective_radius(requested_m: f64, max_radius_m: f64) -> f64 {
    requested_m.min(max_radius_m.min(MAX_RADIUS_M)).max(0.0)
}

/// A nearby-places query around a center point
#[derive(Debug, Clone, PartialEq)]
pub struct OverpassQuery {
    center: Location,
    radius_m: f64,
    limit: u32,
    timeout_secs: u32,
}

impl OverpassQuery {
    /// Query around `center`; the requested radius is clamped to `max_radius_m`
    #[must_use]
    pub fn nearby(center: Location, requested_radius_m: f64, max_radius_m: f64) -> Self {
        Self {
            center,
            radius_m: effective_radius(requested_radius_m, max_radius_m),
            limit: RESULT_LIMIT,
            timeout_secs: QUERY_TIMEOUT_SECS,
        }
    }

    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub fn with_timeout_secs(mut self, timeout_secs: u32) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Radius actually sent upstream
    #[must_use]
    pub fn radius_m(&self) -> f64 {
        self.radius_m
    }

    #[must_use]
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Render the query in Overpass QL
    #[must_use]
    pub fn render(&self) -> String {
        let around = format!(
            "(around:{},{},{})",
            self.radius_m, self.center.lat, self.center.lon
        );

        let mut query = format!("[out:json][timeout:{}];\n(\n", self.timeout_secs);
        for filter in NEARBY_FILTERS {
            query.push_str(&format!(
                "  node[\"{}\"~\"{}\"]{};\n",
                filter.key,
                filter.values.join("|"),
                around
            ));
        }
        query.push_str(&format!(");\nout body {};", self.limit));
        query
    }
}

/// Encode a query as an `application/x-www-form-urlencoded` body
#[must_use]
pub fn form_body(query: &str) -> String {
    format!("data={}", urlencoding::encode(query))
}
