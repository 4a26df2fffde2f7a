//! Data models for the POI finder
//!
//! This module contains the core domain models organized by concern:
//! - Location: Geographic coordinates
//! - Poi: Points of interest and their categories
//! - Filter: Consumer-side category and distance filtering

pub mod filter;
pub mod location;
pub mod poi;

// Re-export all public types for convenient access
pub use filter::FilterState;
pub use location::Location;
pub use poi::{Poi, PoiCategory};
