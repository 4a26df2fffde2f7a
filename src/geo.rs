//! Great-circle distance on a spherical Earth.

/// Earth's mean radius in meters, as used by `haversine` in kilometers.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance between two WGS84 points, in meters.
#[must_use]
pub fn distance_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let from = haversine::Location {
        latitude: lat1,
        longitude: lon1,
    };
    let to = haversine::Location {
        latitude: lat2,
        longitude: lon2,
    };
    haversine::distance(from, to, haversine::Units::Kilometers) * 1000.0
}
