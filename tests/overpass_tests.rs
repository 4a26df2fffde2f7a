//! HTTP-level tests for the Overpass client, the fallback fetcher and geocoding

use std::time::Duration;

use poifinder::geolocation::GeocodingLocationProvider;
use poifinder::{
    EndpointError, FallbackPolicy, Location, LocationError, LocationProvider, OverpassClient,
    OverpassTransport, PoiCategory, PoiFetcher, PoiFinderError,
};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const INTERPRETER: &str = "/api/interpreter";

fn client() -> OverpassClient {
    OverpassClient::new("poifinder-tests").unwrap()
}

fn endpoint(server: &MockServer) -> String {
    format!("{}{}", server.uri(), INTERPRETER)
}

fn sample_body() -> serde_json::Value {
    json!({
        "version": 0.6,
        "elements": [
            {"type": "node", "id": 100, "lat": 52.5230, "lon": 13.4050,
             "tags": {"name": "Museum Island", "tourism": "museum"}},
            {"type": "node", "id": 101, "lat": 52.5205, "lon": 13.4050,
             "tags": {"name": "Corner Pharmacy", "amenity": "pharmacy"}},
            {"type": "node", "id": 102, "lat": 52.5201, "lon": 13.4050,
             "tags": {"amenity": "waste_basket"}}
        ]
    })
}

#[tokio::test]
async fn test_client_posts_form_encoded_query() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(INTERPRETER))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("data=%5Bout%3Ajson%5D"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
        .expect(1)
        .mount(&server)
        .await;

    let response = client()
        .query(&endpoint(&server), "[out:json];node(1);out;", Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(response.elements.len(), 3);
}

#[tokio::test]
async fn test_client_maps_server_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client()
        .query(&endpoint(&server), "[out:json];", Duration::from_secs(5))
        .await
        .unwrap_err();
    assert_eq!(err, EndpointError::Http { status: 500 });
}

#[tokio::test]
async fn test_client_rejects_html_error_page() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<!DOCTYPE html><html><body>Too many requests</body></html>"),
        )
        .mount(&server)
        .await;

    let err = client()
        .query(&endpoint(&server), "[out:json];", Duration::from_secs(5))
        .await
        .unwrap_err();
    assert!(matches!(err, EndpointError::InvalidResponse { .. }));
}

#[tokio::test]
async fn test_client_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(sample_body())
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let err = client()
        .query(&endpoint(&server), "[out:json];", Duration::from_millis(200))
        .await
        .unwrap_err();
    assert!(matches!(err, EndpointError::Timeout { timeout_ms: 200, .. }));
}

#[tokio::test]
async fn test_client_network_failure() {
    // Nothing listens on the discard port.
    let err = client()
        .query("http://127.0.0.1:9/api/interpreter", "[out:json];", Duration::from_secs(5))
        .await
        .unwrap_err();
    assert!(matches!(err, EndpointError::Network { .. }));
}

#[tokio::test]
async fn test_fetcher_falls_back_to_next_server() {
    let failing = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(504))
        .expect(1)
        .mount(&failing)
        .await;

    let healthy = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(INTERPRETER))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
        .expect(1)
        .mount(&healthy)
        .await;

    let unused = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
        .expect(0)
        .mount(&unused)
        .await;

    let policy = FallbackPolicy::new(
        [endpoint(&failing), endpoint(&healthy), endpoint(&unused)],
        Duration::from_secs(5),
    );
    let fetcher = PoiFetcher::new(client(), policy);
    let pois = fetcher
        .fetch_nearby(&Location::new(52.5200, 13.4050), 1000.0)
        .await
        .unwrap();

    let names: Vec<&str> = pois.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Corner Pharmacy", "Museum Island"]);
    assert_eq!(pois[0].category, PoiCategory::Pharmacy);
    assert_eq!(pois[1].category, PoiCategory::Museum);
}

#[tokio::test]
async fn test_fetcher_reports_last_failure() {
    let overloaded = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>overloaded</html>"))
        .mount(&overloaded)
        .await;

    let limited = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&limited)
        .await;

    let policy = FallbackPolicy::new(
        [endpoint(&overloaded), endpoint(&limited)],
        Duration::from_secs(5),
    );
    let err = PoiFetcher::new(client(), policy)
        .fetch_nearby(&Location::new(0.0, 0.0), 500.0)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "HTTP 429");
    assert!(matches!(
        err,
        PoiFinderError::AllEndpointsExhausted { attempts: 2, .. }
    ));
}

#[tokio::test]
async fn test_geocoding_resolves_first_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("name", "Interlaken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"name": "Interlaken", "latitude": 46.6863, "longitude": 7.8632, "country": "Switzerland"},
                {"name": "Interlaken", "latitude": 42.6, "longitude": -76.7, "country": "United States"}
            ]
        })))
        .mount(&server)
        .await;

    let provider = GeocodingLocationProvider::new(server.uri(), "Interlaken", "test").unwrap();
    assert_eq!(
        provider.current_location().await,
        Ok(Location::new(46.6863, 7.8632))
    );
}

#[tokio::test]
async fn test_geocoding_without_results_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"generationtime_ms": 0.5})))
        .mount(&server)
        .await;

    let provider = GeocodingLocationProvider::new(server.uri(), "Nowhere", "test").unwrap();
    assert!(matches!(
        provider.current_location().await,
        Err(LocationError::Unavailable(_))
    ));
}
