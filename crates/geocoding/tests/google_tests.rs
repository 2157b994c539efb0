//! Tests for GoogleGeocoder against a local HTTP server.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use axum::{extract::Query, http::StatusCode, routing::get, Json, Router};
use serde_json::{json, Value};

use climate_common::ClimateError;
use geocoding::{Geocoder, GoogleGeocoder};

async fn geocode(Query(params): Query<HashMap<String, String>>) -> (StatusCode, Json<Value>) {
    if params.get("key").map(String::as_str) != Some("test-key") {
        return (
            StatusCode::OK,
            Json(json!({"status": "REQUEST_DENIED", "results": [], "error_message": "bad key"})),
        );
    }

    match params.get("address").map(String::as_str) {
        Some("94107") => (
            StatusCode::OK,
            Json(json!({
                "status": "OK",
                "results": [{
                    "formatted_address": "San Francisco, CA 94107, USA",
                    "geometry": {"location": {"lat": 37.7576171, "lng": -122.3933185}}
                }]
            })),
        ),
        Some("Lake Wobegon MN") => (
            StatusCode::OK,
            Json(json!({"status": "ZERO_RESULTS", "results": []})),
        ),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({}))),
    }
}

async fn spawn_server() -> SocketAddr {
    let app = Router::new().route("/geocode/json", get(geocode));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn geocoder(key: &str) -> GoogleGeocoder {
    let addr = spawn_server().await;
    GoogleGeocoder::new(format!("http://{}/geocode/json", addr), key, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_geocode_resolves_address() {
    let geocoder = geocoder("test-key").await;
    let location = geocoder.geocode("94107").await.unwrap().unwrap();

    assert_eq!(location.formatted_address, "San Francisco, CA 94107, USA");
    assert_eq!(location.lat, 37.7576171);
    assert_eq!(location.lng, -122.3933185);
}

#[tokio::test]
async fn test_geocode_zero_results() {
    let geocoder = geocoder("test-key").await;
    assert!(geocoder.geocode("Lake Wobegon MN").await.unwrap().is_none());
}

#[tokio::test]
async fn test_geocode_denied_key() {
    let geocoder = geocoder("wrong-key").await;
    let result = geocoder.geocode("94107").await;
    assert!(matches!(result, Err(ClimateError::Geocoding(_))));
}

#[tokio::test]
async fn test_geocode_http_error() {
    let geocoder = geocoder("test-key").await;
    match geocoder.geocode("somewhere else").await {
        Err(ClimateError::Geocoding(msg)) => assert!(msg.contains("500")),
        other => panic!("expected geocoding error, got {:?}", other),
    }
}
