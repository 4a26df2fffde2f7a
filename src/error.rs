//! Error types and handling for the POI finder

use thiserror::Error;

/// Message used when a fetch had no endpoint to try at all
pub const ALL_ENDPOINTS_FAILED: &str = "All API endpoints failed. Please try again later.";

/// Failure of a single request against one Overpass endpoint.
///
/// Every variant is recoverable from the fetcher's point of view: it moves on
/// to the next candidate endpoint.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EndpointError {
    /// No response within the per-attempt budget
    #[error("Request to {endpoint} timed out after {timeout_ms} ms")]
    Timeout { endpoint: String, timeout_ms: u64 },

    /// Endpoint answered with a non-2xx status
    #[error("HTTP {status}")]
    Http { status: u16 },

    /// Payload was not the expected JSON, or was an HTML error page
    #[error("Invalid response: {reason}")]
    InvalidResponse { reason: String },

    /// Connection could not be established or was dropped
    #[error("Network error: {message}")]
    Network { message: String },
}

impl EndpointError {
    pub fn invalid_response<S: Into<String>>(reason: S) -> Self {
        Self::InvalidResponse {
            reason: reason.into(),
        }
    }

    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
        }
    }
}

/// Failure reported by a location provider
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    #[error("Location permission denied. Please enable location services.")]
    PermissionDenied,

    #[error("Location unavailable: {0}")]
    Unavailable(String),

    #[error("Timed out while acquiring location")]
    Timeout,
}

/// Main error type for the POI finder
#[derive(Error, Debug)]
pub enum PoiFinderError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Location acquisition errors
    #[error(transparent)]
    Location(#[from] LocationError),

    /// Every candidate endpoint failed; carries the last failure's message
    #[error("{message}")]
    AllEndpointsExhausted { message: String, attempts: usize },

    /// Favorites store errors
    #[error("Store error: {message}")]
    Store { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl PoiFinderError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new store error
    pub fn store<S: Into<String>>(message: S) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Build the exhaustion error from the last recorded endpoint failure
    #[must_use]
    pub fn exhausted(last_error: Option<&EndpointError>, attempts: usize) -> Self {
        let message = last_error.map_or_else(|| ALL_ENDPOINTS_FAILED.to_string(), ToString::to_string);
        Self::AllEndpointsExhausted { message, attempts }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            PoiFinderError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            PoiFinderError::Validation { message } => format!("Invalid input: {message}"),
            PoiFinderError::Location(err) => format!("Location unavailable. {err}"),
            PoiFinderError::AllEndpointsExhausted { message, .. } => {
                format!("We couldn't load the places ({message}). Please try again.")
            }
            PoiFinderError::Store { .. } => {
                "Favorites could not be saved. Check the data directory permissions.".to_string()
            }
            PoiFinderError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}
