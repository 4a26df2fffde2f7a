//! Configuration management for the POI finder
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::PoiFinderError;
use crate::overpass::{MAX_RADIUS_M, QUERY_TIMEOUT_SECS, RESULT_LIMIT};
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoiFinderConfig {
    /// Overpass API configuration
    #[serde(default)]
    pub overpass: OverpassConfig,
    /// Favorites store configuration
    #[serde(default)]
    pub favorites: FavoritesConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Default search settings
    #[serde(default)]
    pub defaults: DefaultsConfig,
    /// Location acquisition settings
    #[serde(default)]
    pub geolocation: GeolocationConfig,
}

/// Overpass API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverpassConfig {
    /// Candidate interpreter endpoints, tried in order
    #[serde(default = "default_overpass_endpoints")]
    pub endpoints: Vec<String>,
    /// Per-endpoint request timeout in seconds
    #[serde(default = "default_overpass_timeout")]
    pub timeout_seconds: u32,
    /// Evaluation budget requested from the server in seconds
    #[serde(default = "default_query_timeout")]
    pub query_timeout_seconds: u32,
    /// Upper bound on the search radius in meters, at most 1500
    #[serde(default = "default_max_radius")]
    pub max_radius_m: f64,
    /// Maximum number of elements returned by the server
    #[serde(default = "default_result_limit")]
    pub result_limit: u32,
    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Favorites store configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoritesConfig {
    /// Directory holding the favorites database
    #[serde(default = "default_favorites_location")]
    pub location: String,
    /// Key under which the favorite ids are stored
    #[serde(default = "default_favorites_key")]
    pub key: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Default search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Search radius in meters
    #[serde(default = "default_search_radius")]
    pub search_radius_m: f64,
    /// Maximum distance of the default filter in meters
    #[serde(default = "default_max_distance")]
    pub max_distance_m: f64,
}

/// Location acquisition settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeolocationConfig {
    /// Time allowed for each location provider in seconds
    #[serde(default = "default_geolocation_timeout")]
    pub timeout_seconds: u32,
    /// Geocoding API base URL used to resolve place names
    #[serde(default = "default_geocoding_base_url")]
    pub geocoding_base_url: String,
}

// Default value functions
fn default_overpass_endpoints() -> Vec<String> {
    vec![
        "https://overpass-api.de/api/interpreter".to_string(),
        "https://overpass.kumi.systems/api/interpreter".to_string(),
        "https://maps.mail.ru/osm/tools/overpass/api/interpreter".to_string(),
    ]
}

fn default_overpass_timeout() -> u32 {
    15
}

fn default_query_timeout() -> u32 {
    QUERY_TIMEOUT_SECS
}

fn default_max_radius() -> f64 {
    MAX_RADIUS_M
}

fn default_result_limit() -> u32 {
    RESULT_LIMIT
}

fn default_user_agent() -> String {
    format!("poifinder/{}", crate::VERSION)
}

fn default_favorites_location() -> String {
    dirs::data_dir()
        .map(|dir| dir.join("poifinder").to_string_lossy().to_string())
        .unwrap_or_else(|| ".poifinder".to_string())
}

fn default_favorites_key() -> String {
    "poi_favorites".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_search_radius() -> f64 {
    1000.0
}

fn default_max_distance() -> f64 {
    crate::models::filter::DEFAULT_MAX_DISTANCE_M
}

fn default_geolocation_timeout() -> u32 {
    10
}

fn default_geocoding_base_url() -> String {
    "https://geocoding-api.open-meteo.com/v1".to_string()
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self {
            endpoints: default_overpass_endpoints(),
            timeout_seconds: default_overpass_timeout(),
            query_timeout_seconds: default_query_timeout(),
            max_radius_m: default_max_radius(),
            result_limit: default_result_limit(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for FavoritesConfig {
    fn default() -> Self {
        Self {
            location: default_favorites_location(),
            key: default_favorites_key(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            search_radius_m: default_search_radius(),
            max_distance_m: default_max_distance(),
        }
    }
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_geolocation_timeout(),
            geocoding_base_url: default_geocoding_base_url(),
        }
    }
}

impl Default for PoiFinderConfig {
    fn default() -> Self {
        Self {
            overpass: OverpassConfig::default(),
            favorites: FavoritesConfig::default(),
            logging: LoggingConfig::default(),
            defaults: DefaultsConfig::default(),
            geolocation: GeolocationConfig::default(),
        }
    }
}

impl OverpassConfig {
    /// Per-endpoint timeout as a `Duration`
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }
}

impl GeolocationConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }
}

impl PoiFinderConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. POIFINDER_OVERPASS__TIMEOUT_SECONDS=20
        builder = builder.add_source(
            Environment::with_prefix("POIFINDER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: PoiFinderConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        // Apply defaults for missing values
        config.apply_defaults();

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("poifinder").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.overpass.endpoints.is_empty() {
            self.overpass.endpoints = default_overpass_endpoints();
        }
        if self.overpass.timeout_seconds == 0 {
            self.overpass.timeout_seconds = default_overpass_timeout();
        }
        if self.overpass.query_timeout_seconds == 0 {
            self.overpass.query_timeout_seconds = default_query_timeout();
        }
        if self.overpass.max_radius_m <= 0.0 {
            self.overpass.max_radius_m = default_max_radius();
        }
        if self.overpass.result_limit == 0 {
            self.overpass.result_limit = default_result_limit();
        }
        if self.overpass.user_agent.is_empty() {
            self.overpass.user_agent = default_user_agent();
        }
        if self.favorites.location.is_empty() {
            self.favorites.location = default_favorites_location();
        }
        if self.favorites.key.is_empty() {
            self.favorites.key = default_favorites_key();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.defaults.search_radius_m <= 0.0 {
            self.defaults.search_radius_m = default_search_radius();
        }
        if self.defaults.max_distance_m <= 0.0 {
            self.defaults.max_distance_m = default_max_distance();
        }
        if self.geolocation.timeout_seconds == 0 {
            self.geolocation.timeout_seconds = default_geolocation_timeout();
        }
        if self.geolocation.geocoding_base_url.is_empty() {
            self.geolocation.geocoding_base_url = default_geocoding_base_url();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_endpoints()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate the Overpass endpoint list
    pub fn validate_endpoints(&self) -> Result<()> {
        if self.overpass.endpoints.is_empty() {
            return Err(
                PoiFinderError::config("At least one Overpass endpoint is required").into(),
            );
        }

        for endpoint in &self.overpass.endpoints {
            if !is_http_url(endpoint) {
                return Err(PoiFinderError::config(format!(
                    "Overpass endpoint '{endpoint}' must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.overpass.timeout_seconds > 300 {
            return Err(
                PoiFinderError::config("Overpass timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.overpass.query_timeout_seconds > 180 {
            return Err(PoiFinderError::config(
                "Overpass query timeout cannot exceed 180 seconds",
            )
            .into());
        }

        if !self.overpass.max_radius_m.is_finite() || self.overpass.max_radius_m > MAX_RADIUS_M {
            return Err(PoiFinderError::config(format!(
                "Maximum radius cannot exceed {MAX_RADIUS_M} m"
            ))
            .into());
        }

        if self.overpass.result_limit > 1000 {
            return Err(PoiFinderError::config("Result limit cannot exceed 1000").into());
        }

        if !self.defaults.max_distance_m.is_finite() {
            return Err(PoiFinderError::config("Maximum distance must be finite").into());
        }

        if self.geolocation.timeout_seconds > 120 {
            return Err(
                PoiFinderError::config("Geolocation timeout cannot exceed 120 seconds").into(),
            );
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(PoiFinderError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(PoiFinderError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !is_http_url(&self.geolocation.geocoding_base_url) {
            return Err(PoiFinderError::config(
                "Geocoding base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        Ok(())
    }

    /// Favorites database directory with `~` expanded
    #[must_use]
    pub fn favorites_path(&self) -> PathBuf {
        expand_home(&self.favorites.location)
    }
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
