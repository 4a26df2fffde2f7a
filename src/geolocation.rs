//! Location acquisition
//!
//! A search needs a center point. It comes from a [`LocationProvider`]:
//! fixed coordinates, a geocoded place name, or a primary provider backed by a
//! secondary one when the first fails or takes too long.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::error::{LocationError, PoiFinderError};
use crate::models::Location;

/// Source of the device's (or user's) current position
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_location(&self) -> Result<Location, LocationError>;
}

/// Coordinates supplied up front
#[derive(Debug, Clone, Copy)]
pub struct FixedLocationProvider {
    location: Location,
}

impl FixedLocationProvider {
    #[must_use]
    pub fn new(location: Location) -> Self {
        Self { location }
    }
}

#[async_trait]
impl LocationProvider for FixedLocationProvider {
    async fn current_location(&self) -> Result<Location, LocationError> {
        Ok(self.location)
    }
}

/// Open-Meteo geocoding response
#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    results: Option<Vec<GeocodingResult>>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    name: String,
    latitude: f64,
    longitude: f64,
    country: Option<String>,
}

/// Resolves a place name to coordinates with the Open-Meteo geocoding API
#[derive(Debug, Clone)]
pub struct GeocodingLocationProvider {
    client: Client,
    base_url: String,
    name: String,
}

impl GeocodingLocationProvider {
    pub fn new(
        base_url: impl Into<String>,
        name: impl Into<String>,
        user_agent: &str,
    ) -> anyhow::Result<Self> {
        let client = Client::builder().user_agent(user_agent).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            name: name.into(),
        })
    }

    fn search_url(&self) -> String {
        format!(
            "{}/search?name={}&count=1&language=en&format=json",
            self.base_url,
            urlencoding::encode(&self.name)
        )
    }
}

#[async_trait]
impl LocationProvider for GeocodingLocationProvider {
    #[instrument(skip(self), fields(name = %self.name))]
    async fn current_location(&self) -> Result<Location, LocationError> {
        let started = Instant::now();
        info!("Geocoding location: '{}'", self.name);

        let response = self
            .client
            .get(self.search_url())
            .send()
            .await
            .map_err(|e| LocationError::Unavailable(format!("Geocoding request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LocationError::Unavailable(format!(
                "Geocoding service returned HTTP {}",
                status.as_u16()
            )));
        }

        let body: GeocodingResponse = response.json().await.map_err(|e| {
            LocationError::Unavailable(format!("Invalid geocoding response: {e}"))
        })?;

        let Some(first) = body.results.unwrap_or_default().into_iter().next() else {
            warn!("No results found for location '{}'", self.name);
            return Err(LocationError::Unavailable(format!(
                "No place found for '{}'",
                self.name
            )));
        };

        let location = Location::new(first.latitude, first.longitude);
        info!(
            "Resolved '{}' to {} ({}) in {:.3}s",
            self.name,
            first.name,
            location.format_coordinates(),
            started.elapsed().as_secs_f64()
        );
        debug!("Geocoded country: {:?}", first.country);
        Ok(location)
    }
}

/// Tries a primary provider, then an optional secondary one.
///
/// Each provider gets its own time budget; running out of it counts as a
/// [`LocationError::Timeout`] for that provider.
pub struct FallbackLocationProvider {
    primary: Box<dyn LocationProvider>,
    secondary: Option<Box<dyn LocationProvider>>,
    timeout: Duration,
}

impl FallbackLocationProvider {
    pub fn new(primary: Box<dyn LocationProvider>, timeout: Duration) -> Self {
        Self {
            primary,
            secondary: None,
            timeout,
        }
    }

    #[must_use]
    pub fn with_secondary(mut self, secondary: Box<dyn LocationProvider>) -> Self {
        self.secondary = Some(secondary);
        self
    }

    async fn bounded(&self, provider: &dyn LocationProvider) -> Result<Location, LocationError> {
        tokio::time::timeout(self.timeout, provider.current_location())
            .await
            .unwrap_or(Err(LocationError::Timeout))
    }
}

#[async_trait]
impl LocationProvider for FallbackLocationProvider {
    async fn current_location(&self) -> Result<Location, LocationError> {
        match self.bounded(self.primary.as_ref()).await {
            Ok(location) => Ok(location),
            Err(err) => match &self.secondary {
                Some(secondary) => {
                    warn!("Primary location source failed ({}), trying fallback", err);
                    self.bounded(secondary.as_ref()).await
                }
                None => Err(err),
            },
        }
    }
}

/// Location parsing utilities
pub struct LocationParser;

impl LocationParser {
    /// Parse user input into coordinates or a place name
    pub fn parse(input: &str) -> crate::Result<LocationInput> {
        let input = input.trim();
        if input.is_empty() {
            return Err(PoiFinderError::validation("Location must not be empty"));
        }

        if let Some((lat, lon)) = Self::parse_coordinates(input) {
            return Ok(LocationInput::Coordinates(Location::new(lat, lon)));
        }

        Ok(LocationInput::Name(input.to_string()))
    }

    /// Coordinates from "lat,lon" or "lat lon" within valid ranges
    fn parse_coordinates(input: &str) -> Option<(f64, f64)> {
        let parts: Vec<&str> = input
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .collect();

        let [lat, lon] = parts.as_slice() else {
            return None;
        };
        let lat = lat.parse::<f64>().ok()?;
        let lon = lon.parse::<f64>().ok()?;

        ((-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)).then_some((lat, lon))
    }
}

/// Types of location input
#[derive(Debug, Clone, PartialEq)]
pub enum LocationInput {
    Coordinates(Location),
    /// Place name to geocode
    Name(String),
}

impl LocationInput {
    /// Provider that yields this input's position
    pub fn into_provider(
        self,
        geocoding_base_url: &str,
        user_agent: &str,
    ) -> anyhow::Result<Box<dyn LocationProvider>> {
        Ok(match self {
            LocationInput::Coordinates(location) => Box::new(FixedLocationProvider::new(location)),
            LocationInput::Name(name) => Box::new(GeocodingLocationProvider::new(
                geocoding_base_url,
                name,
                user_agent,
            )?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    struct FailingProvider(LocationError);

    #[async_trait]
    impl LocationProvider for FailingProvider {
        async fn current_location(&self) -> Result<Location, LocationError> {
            Err(self.0.clone())
        }
    }

    struct SlowProvider;

    #[async_trait]
    impl LocationProvider for SlowProvider {
        async fn current_location(&self) -> Result<Location, LocationError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Location::new(0.0, 0.0))
        }
    }

    #[rstest]
    #[case("46.8182,8.2275", 46.8182, 8.2275)]
    #[case("46.8182 8.2275", 46.8182, 8.2275)]
    #[case("-46.8182, -8.2275", -46.8182, -8.2275)]
    #[case("  52.52,13.405  ", 52.52, 13.405)]
    fn test_location_parser_coordinates(#[case] input: &str, #[case] lat: f64, #[case] lon: f64) {
        assert_eq!(
            LocationParser::parse(input).unwrap(),
            LocationInput::Coordinates(Location::new(lat, lon))
        );
    }

    #[rstest]
    #[case("91.0,8.0")]
    #[case("46.0,-181.0")]
    #[case("46.0")]
    #[case("46.0,8.0,0.0")]
    #[case("Interlaken")]
    #[case("New York City")]
    fn test_location_parser_names(#[case] input: &str) {
        assert!(matches!(
            LocationParser::parse(input).unwrap(),
            LocationInput::Name(_)
        ));
    }

    #[test]
    fn test_location_parser_rejects_empty() {
        assert!(matches!(
            LocationParser::parse("   "),
            Err(PoiFinderError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_fixed_provider() {
        let provider = FixedLocationProvider::new(Location::new(1.0, 2.0));
        assert_eq!(provider.current_location().await, Ok(Location::new(1.0, 2.0)));
    }

    #[tokio::test]
    async fn test_fallback_uses_secondary_on_failure() {
        let provider = FallbackLocationProvider::new(
            Box::new(FailingProvider(LocationError::PermissionDenied)),
            Duration::from_secs(1),
        )
        .with_secondary(Box::new(FixedLocationProvider::new(Location::new(3.0, 4.0))));

        assert_eq!(provider.current_location().await, Ok(Location::new(3.0, 4.0)));
    }

    #[tokio::test]
    async fn test_fallback_without_secondary_reports_primary_error() {
        let provider = FallbackLocationProvider::new(
            Box::new(FailingProvider(LocationError::PermissionDenied)),
            Duration::from_secs(1),
        );
        assert_eq!(
            provider.current_location().await,
            Err(LocationError::PermissionDenied)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_provider_times_out() {
        let provider = FallbackLocationProvider::new(Box::new(SlowProvider), Duration::from_secs(10));
        assert_eq!(provider.current_location().await, Err(LocationError::Timeout));

        let provider = FallbackLocationProvider::new(Box::new(SlowProvider), Duration::from_secs(10))
            .with_secondary(Box::new(FixedLocationProvider::new(Location::new(5.0, 6.0))));
        assert_eq!(provider.current_location().await, Ok(Location::new(5.0, 6.0)));
    }

    #[test]
    fn test_search_url_is_encoded() {
        let provider =
            GeocodingLocationProvider::new("https://geo.example/v1/", "São Paulo", "test").unwrap();
        assert_eq!(
            provider.search_url(),
            "https://geo.example/v1/search?name=S%C3%A3o%20Paulo&count=1&language=en&format=json"
        );
    }
}
