//! Overpass API integration
//!
//! - `query`: Overpass QL construction and radius clamping
//! - `response`: JSON response structures and element-to-POI conversion
//! - `client`: single-endpoint HTTP transport with a hard timeout

pub mod client;
pub mod query;
pub mod response;

pub use client::{OverpassClient, OverpassTransport, parse_body};
pub use query::{MAX_RADIUS_M, OverpassQuery, QUERY_TIMEOUT_SECS, RESULT_LIMIT, effective_radius};
pub use response::{OverpassElement, OverpassResponse};
