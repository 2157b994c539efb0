//! Google Maps Platform geocoding.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use climate_common::{ClimateError, ClimateResult, GeoLocation};

use crate::Geocoder;

/// Google geocoding JSON endpoint.
pub const DEFAULT_GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    formatted_address: String,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

impl From<GeocodeResult> for GeoLocation {
    fn from(result: GeocodeResult) -> Self {
        GeoLocation::new(
            result.formatted_address,
            result.geometry.location.lat,
            result.geometry.location.lng,
        )
    }
}

/// Geocoder backed by the Google geocoding API.
pub struct GoogleGeocoder {
    client: Client,
    url: String,
    api_key: String,
}

impl GoogleGeocoder {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> ClimateResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClimateError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    #[instrument(skip(self))]
    async fn geocode(&self, address: &str) -> ClimateResult<Option<GeoLocation>> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("address", address), ("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| ClimateError::Geocoding(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClimateError::Geocoding(format!(
                "Geocoder returned HTTP {}",
                status
            )));
        }

        let body: GeocodeResponse = response
            .json()
            .await
            .map_err(|e| ClimateError::Geocoding(format!("Invalid geocoder response: {}", e)))?;

        interpret(body)
    }
}

fn interpret(body: GeocodeResponse) -> ClimateResult<Option<GeoLocation>> {
    match body.status.as_str() {
        "OK" => {
            let location = body.results.into_iter().next().map(GeoLocation::from);
            if let Some(location) = &location {
                debug!(formatted_address = %location.formatted_address, "Address resolved");
            }
            Ok(location)
        }
        "ZERO_RESULTS" => Ok(None),
        other => Err(ClimateError::Geocoding(match body.error_message {
            Some(message) => format!("Geocoder status {}: {}", other, message),
            None => format!("Geocoder status {}", other),
        })),
    }
}
