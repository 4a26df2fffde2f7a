//! Nearby POI retrieval with sequential endpoint fallback
//!
//! Endpoints are tried strictly in order, one request in flight at a time.
//! The first successful response wins; each failure is logged and recorded,
//! and only when every candidate has failed does the caller see an error.

use std::time::{Duration, Instant};

use tracing::{debug, info, instrument, warn};

use crate::config::PoiFinderConfig;
use crate::error::{EndpointError, PoiFinderError};
use crate::models::{Location, Poi};
use crate::overpass::{
    MAX_RADIUS_M, OverpassClient, OverpassQuery, OverpassResponse, OverpassTransport,
    QUERY_TIMEOUT_SECS, RESULT_LIMIT,
};

/// Ordered endpoints plus the budget allowed for each attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackPolicy {
    pub endpoints: Vec<String>,
    pub attempt_timeout: Duration,
}

impl FallbackPolicy {
    pub fn new<I, S>(endpoints: I, attempt_timeout: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            endpoints: endpoints.into_iter().map(Into::into).collect(),
            attempt_timeout,
        }
    }

    #[must_use]
    pub fn from_config(config: &PoiFinderConfig) -> Self {
        Self::new(config.overpass.endpoints.clone(), config.overpass.timeout())
    }
}

/// Fetches and normalizes POIs around a location
#[derive(Debug, Clone)]
pub struct PoiFetcher<T: OverpassTransport = OverpassClient> {
    transport: T,
    policy: FallbackPolicy,
    max_radius_m: f64,
    result_limit: u32,
    query_timeout_secs: u32,
}

impl PoiFetcher<OverpassClient> {
    /// Build an HTTP-backed fetcher from configuration
    pub fn from_config(config: &PoiFinderConfig) -> anyhow::Result<Self> {
        let transport = OverpassClient::new(&config.overpass.user_agent)?;
        Ok(Self::new(transport, FallbackPolicy::from_config(config))
            .with_max_radius(config.overpass.max_radius_m)
            .with_result_limit(config.overpass.result_limit)
            .with_query_timeout_secs(config.overpass.query_timeout_seconds))
    }
}

impl<T: OverpassTransport> PoiFetcher<T> {
    pub fn new(transport: T, policy: FallbackPolicy) -> Self {
        Self {
            transport,
            policy,
            max_radius_m: MAX_RADIUS_M,
            result_limit: RESULT_LIMIT,
            query_timeout_secs: QUERY_TIMEOUT_SECS,
        }
    }

    /// Lower the radius cap; values above [`MAX_RADIUS_M`] have no effect
    #[must_use]
    pub fn with_max_radius(mut self, max_radius_m: f64) -> Self {
        self.max_radius_m = max_radius_m;
        self
    }

    #[must_use]
    pub fn with_result_limit(mut self, result_limit: u32) -> Self {
        self.result_limit = result_limit;
        self
    }

    #[must_use]
    pub fn with_query_timeout_secs(mut self, query_timeout_secs: u32) -> Self {
        self.query_timeout_secs = query_timeout_secs;
        self
    }

    #[must_use]
    pub fn policy(&self) -> &FallbackPolicy {
        &self.policy
    }

    /// Query sent upstream for a search around `location`
    #[must_use]
    pub fn build_query(&self, location: &Location, radius_m: f64) -> OverpassQuery {
        OverpassQuery::nearby(*location, radius_m, self.max_radius_m)
            .with_limit(self.result_limit)
            .with_timeout_secs(self.query_timeout_secs)
    }

    /// Fetch named POIs around `location`, nearest first.
    ///
    /// The radius is clamped before it is sent upstream. Fails only after
    /// every configured endpoint has failed, with the last failure's message.
    #[instrument(skip(self))]
    pub async fn fetch_nearby(&self, location: &Location, radius_m: f64) -> crate::Result<Vec<Poi>> {
        let query = self.build_query(location, radius_m);
        if query.radius_m() < radius_m {
            debug!(
                "Requested radius {}m clamped to {}m",
                radius_m,
                query.radius_m()
            );
        }
        let rendered = query.render();

        let mut last_error: Option<EndpointError> = None;
        for (attempt, endpoint) in self.policy.endpoints.iter().enumerate() {
            debug!(
                "Trying Overpass endpoint {}/{}: {}",
                attempt + 1,
                self.policy.endpoints.len(),
                endpoint
            );
            let started = Instant::now();

            match self
                .transport
                .query(endpoint, &rendered, self.policy.attempt_timeout)
                .await
            {
                Ok(response) => {
                    let pois = normalize(&response, location);
                    info!(
                        "Fetched {} POIs from {} in {:.3}s",
                        pois.len(),
                        endpoint,
                        started.elapsed().as_secs_f64()
                    );
                    return Ok(pois);
                }
                Err(err) => {
                    warn!("Overpass endpoint {} failed: {}", endpoint, err);
                    last_error = Some(err);
                }
            }
        }

        Err(PoiFinderError::exhausted(
            last_error.as_ref(),
            self.policy.endpoints.len(),
        ))
    }
}

/// Turn a raw response into distance-sorted POIs.
///
/// Unnamed elements and elements without coordinates are dropped. Equal
/// distances keep the upstream order.
#[must_use]
pub fn normalize(response: &OverpassResponse, origin: &Location) -> Vec<Poi> {
    if let Some(remark) = &response.remark {
        warn!("Overpass remark: {}", remark);
    }

    let mut pois: Vec<Poi> = response
        .elements
        .iter()
        .filter_map(|element| element.to_poi(origin))
        .collect();
    pois.sort_by(|a, b| a.distance.total_cmp(&b.distance));

    debug!(
        "Normalized {} of {} elements",
        pois.len(),
        response.elements.len()
    );
    pois
}
