//! Single-endpoint Overpass client
//!
//! One call is one HTTP POST against one server, bounded by a hard timeout.
//! There are no retries here; falling back to another server is the caller's
//! job (see [`crate::fetcher`]).

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, instrument};

use super::query::form_body;
use super::response::OverpassResponse;
use crate::error::EndpointError;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Transport used by the fetcher to reach one Overpass endpoint
#[async_trait]
pub trait OverpassTransport: Send + Sync {
    /// Run `query` against `endpoint`, giving up after `timeout`
    async fn query(
        &self,
        endpoint: &str,
        query: &str,
        timeout: Duration,
    ) -> std::result::Result<OverpassResponse, EndpointError>;
}

/// HTTP implementation of [`OverpassTransport`]
#[derive(Debug, Clone)]
pub struct OverpassClient {
    client: Client,
}

impl OverpassClient {
    /// Create a new client with the given user agent
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .with_context(|| "Failed to create HTTP client")?;

        Ok(Self { client })
    }

    async fn send(
        &self,
        endpoint: &str,
        query: &str,
    ) -> std::result::Result<OverpassResponse, EndpointError> {
        let response = self
            .client
            .post(endpoint)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(form_body(query))
            .send()
            .await
            .map_err(|e| EndpointError::network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EndpointError::Http {
                status: status.as_u16(),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| EndpointError::network(format!("Failed to read response body: {e}")))?;

        parse_body(&text)
    }
}

#[async_trait]
impl OverpassTransport for OverpassClient {
    #[instrument(skip(self, query))]
    async fn query(
        &self,
        endpoint: &str,
        query: &str,
        timeout: Duration,
    ) -> std::result::Result<OverpassResponse, EndpointError> {
        let started = Instant::now();

        // Dropping the in-flight future on expiry aborts the request.
        let result = tokio::time::timeout(timeout, self.send(endpoint, query))
            .await
            .unwrap_or_else(|_| {
                Err(EndpointError::Timeout {
                    endpoint: endpoint.to_string(),
                    timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                })
            });

        debug!(
            "Overpass request finished in {:.3}s (ok: {})",
            started.elapsed().as_secs_f64(),
            result.is_ok()
        );
        result
    }
}

/// Validate and parse a successful response body.
///
/// Overpass reports many failures (overload, rate limiting, bad gateway) as
/// HTML pages; anything starting with markup is rejected before JSON parsing.
pub fn parse_body(text: &str) -> std::result::Result<OverpassResponse, EndpointError> {
    if text.trim_start().starts_with('<') {
        return Err(EndpointError::invalid_response("Server returned error page"));
    }

    serde_json::from_str(text)
        .map_err(|e| EndpointError::invalid_response(format!("Malformed JSON payload: {e}")))
}
