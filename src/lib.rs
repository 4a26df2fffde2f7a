//! `poifinder` - Nearby points of interest from OpenStreetMap
//!
//! This library queries Overpass API servers for places around a location,
//! falling back across endpoints, and turns the raw elements into
//! categorized, distance-sorted POIs.

pub mod category;
pub mod config;
pub mod error;
pub mod favorites;
pub mod fetcher;
pub mod geo;
pub mod geolocation;
pub mod logging;
pub mod models;
pub mod overpass;

// Re-export core types for public API
pub use category::map_category;
pub use config::PoiFinderConfig;
pub use error::{EndpointError, LocationError, PoiFinderError};
pub use favorites::{Favorites, FjallStore, KeyValueStore, MemoryStore};
pub use fetcher::{FallbackPolicy, PoiFetcher};
pub use geo::distance_meters;
pub use geolocation::{LocationInput, LocationParser, LocationProvider};
pub use models::{FilterState, Location, Poi, PoiCategory};
pub use overpass::{OverpassClient, OverpassTransport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, PoiFinderError>;
