//! Places client tests against a mock HTTP server.
//!
//! - **Status taxonomy**: each Places status maps to the right outcome
//! - **Backoff**: `OVER_QUERY_LIMIT` is retried up to the attempt budget
//! - **Request shape**: key, fields, input type and query are sent as query params

use std::time::Duration;

use electorate_geocoder::config::RetryPolicy;
use electorate_geocoder::geocode::{Geocoder, PlacesClient, PlacesSettings};
use electorate_geocoder::initialization::init_client;
use electorate_geocoder::GeocodeError;
use httptest::{matchers::*, responders::*, Expectation, Server};
use secrecy::SecretString;
use serde_json::json;

const PLACES_PATH: &str = "/maps/api/place/findplacefromtext/json";

fn client(server: &Server, max_attempts: u32) -> PlacesClient {
    let http = init_client(Duration::from_secs(5)).expect("Failed to create client");
    PlacesClient::new(
        http,
        PlacesSettings {
            api_key: SecretString::new("test-key".into()),
            endpoint: server.url_str(PLACES_PATH),
            retry: RetryPolicy::immediate(max_attempts),
        },
    )
}

fn example_candidate() -> serde_json::Value {
    json!({
        "formatted_address": "1 Example St, Sydney NSW 2000, Australia",
        "geometry": { "location": { "lat": -33.8688, "lng": 151.2093 } },
        "name": "Example Club",
        "types": ["point_of_interest", "establishment"]
    })
}

#[tokio::test]
async fn test_ok_sends_expected_params_and_returns_first_candidate() {
    let server = Server::run();
    server.expect(
        Expectation::matching(httptest::all_of![
            request::method_path("GET", PLACES_PATH),
            request::query(url_decoded(contains(("key", "test-key")))),
            request::query(url_decoded(contains(("inputtype", "textquery")))),
            request::query(url_decoded(contains((
                "fields",
                "name,types,formatted_address,geometry"
            )))),
            request::query(url_decoded(contains(("input", "Example Club, NSW, Australia")))),
        ])
        .respond_with(json_encoded(json!({
            "status": "OK",
            "candidates": [
                example_candidate(),
                {
                    "formatted_address": "Elsewhere",
                    "geometry": { "location": { "lat": 0.0, "lng": 0.0 } },
                    "name": "Second Choice",
                    "types": []
                }
            ]
        }))),
    );

    let candidate = client(&server, 1)
        .resolve("Example Club, NSW, Australia")
        .await
        .expect("Lookup should succeed");

    assert_eq!(candidate.name, "Example Club");
    assert_eq!(candidate.formatted_address, "1 Example St, Sydney NSW 2000, Australia");
    assert!((candidate.latitude - -33.8688).abs() < 1e-9);
    assert!((candidate.longitude - 151.2093).abs() < 1e-9);
    assert_eq!(candidate.types_joined(), "point_of_interest,establishment");
}

#[tokio::test]
async fn test_zero_results_is_no_candidate() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", PLACES_PATH))
            .respond_with(json_encoded(json!({ "status": "ZERO_RESULTS", "candidates": [] }))),
    );

    let result = client(&server, 3).resolve("Nowhere Club, TAS, Australia").await;
    assert!(matches!(result, Err(GeocodeError::NoCandidate { .. })));
}

#[tokio::test]
async fn test_request_denied_is_fatal() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", PLACES_PATH)).respond_with(
            json_encoded(json!({
                "status": "REQUEST_DENIED",
                "error_message": "The provided API key is invalid.",
                "candidates": []
            })),
        ),
    );

    let err = client(&server, 3)
        .resolve("Example Club, NSW, Australia")
        .await
        .expect_err("Denied should fail");
    assert!(err.is_fatal());
    assert!(err.to_string().contains("The provided API key is invalid."));
}

#[tokio::test]
async fn test_rate_limit_exhausts_attempt_budget() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", PLACES_PATH))
            .times(3)
            .respond_with(json_encoded(json!({ "status": "OVER_QUERY_LIMIT" }))),
    );

    let result = client(&server, 3).resolve("Busy Club, VIC, Australia").await;
    match result {
        Err(GeocodeError::RateLimitExceeded { attempts, .. }) => assert_eq!(attempts, 3),
        other => panic!("expected RateLimitExceeded, got {other:?}"),
    }
}

#[tokio::test]
async fn test_rate_limit_then_success() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", PLACES_PATH))
            .times(2)
            .respond_with(httptest::cycle![
                json_encoded(json!({ "status": "OVER_QUERY_LIMIT" })),
                json_encoded(json!({ "status": "OK", "candidates": [example_candidate()] })),
            ]),
    );

    let candidate = client(&server, 5)
        .resolve("Example Club, NSW, Australia")
        .await
        .expect("Second attempt should succeed");
    assert_eq!(candidate.name, "Example Club");
}

#[tokio::test]
async fn test_unknown_status_is_malformed() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", PLACES_PATH))
            .respond_with(json_encoded(json!({ "status": "INVALID_REQUEST" }))),
    );

    let err = client(&server, 3)
        .resolve("Example Club, NSW, Australia")
        .await
        .expect_err("Invalid request should fail");
    assert_eq!(
        err.to_string(),
        "Bad response for query (Example Club, NSW, Australia): INVALID_REQUEST"
    );
}

#[tokio::test]
async fn test_non_json_body_is_malformed() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", PLACES_PATH))
            .respond_with(status_code(200).body("<html>maintenance</html>")),
    );

    let result = client(&server, 1).resolve("Example Club, NSW, Australia").await;
    assert!(matches!(result, Err(GeocodeError::MalformedResponse { .. })));
}

#[tokio::test]
async fn test_server_errors_are_retried_then_surface_as_transport() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", PLACES_PATH))
            .times(2)
            .respond_with(status_code(503)),
    );

    let result = client(&server, 2).resolve("Example Club, NSW, Australia").await;
    assert!(matches!(result, Err(GeocodeError::Transport { .. })));
}
