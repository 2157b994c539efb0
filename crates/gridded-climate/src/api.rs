//! HTTP access to the `GridData` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use climate_common::{ClimateError, ClimateResult, Coordinate, DateRange};

use crate::elements::{GridElement, GRID_ELEMENTS};
use crate::response::{is_data_void_body, GridDataResponse};

/// Public RCC-ACIS endpoint.
pub const DEFAULT_GRID_DATA_URL: &str = "https://grid2.rcc-acis.org/GridData";

/// Request body for `GridData`.
#[derive(Debug, Clone, Serialize)]
pub struct GridDataRequest {
    pub grid: String,
    /// `"<lng>,<lat>"`
    pub loc: String,
    pub sdate: String,
    pub edate: String,
    pub elems: &'static [GridElement],
}

impl GridDataRequest {
    pub fn new(grid: impl Into<String>, point: Coordinate, range: DateRange) -> Self {
        Self {
            grid: grid.into(),
            loc: format!("{},{}", point.lng_key(), point.lat_key()),
            sdate: range.start_str(),
            edate: range.end_str(),
            elems: GRID_ELEMENTS,
        }
    }
}

/// Outcome of a successful upstream call. Both variants carry the exact
/// body text so it can be cached as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridFetch {
    Data(String),
    /// The service has no data for this location.
    NoData(String),
}

impl GridFetch {
    pub fn body(&self) -> &str {
        match self {
            GridFetch::Data(body) | GridFetch::NoData(body) => body,
        }
    }
}

/// Upstream gridded-climate API.
#[async_trait]
pub trait GridDataApi: Send + Sync {
    /// Endpoint URL, part of every cache key.
    fn endpoint(&self) -> &str;

    /// Fetch one grid/location/date-range response. No retries.
    async fn fetch(&self, request: &GridDataRequest) -> ClimateResult<GridFetch>;
}

/// RCC-ACIS HTTP client.
pub struct AcisGridApi {
    client: Client,
    endpoint: String,
}

impl AcisGridApi {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> ClimateResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClimateError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl GridDataApi for AcisGridApi {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    #[instrument(skip(self, request), fields(grid = %request.grid, loc = %request.loc))]
    async fn fetch(&self, request: &GridDataRequest) -> ClimateResult<GridFetch> {
        debug!(url = %self.endpoint, sdate = %request.sdate, edate = %request.edate, "Requesting grid data");

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| ClimateError::Upstream(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClimateError::Upstream(format!("Failed to read response: {}", e)))?;

        classify_response(status.is_success(), status.as_u16(), body)
    }
}

/// Sort an upstream reply into data, data-void or failure.
///
/// The data-void signature is accepted whatever the HTTP status, since the
/// service reports it both as an error status and inline.
pub fn classify_response(success: bool, status: u16, body: String) -> ClimateResult<GridFetch> {
    if is_data_void_body(&body) {
        warn!(status, "No grid data available for location");
        return Ok(GridFetch::NoData(body));
    }

    if !success {
        return Err(ClimateError::Upstream(format!(
            "Grid data request failed with status {}: {}",
            status,
            truncate(&body, 200)
        )));
    }

    let parsed = GridDataResponse::parse(&body)
        .map_err(|e| ClimateError::Upstream(format!("Unparseable grid data response: {}", e)))?;
    if let Some(error) = parsed.error {
        return Err(ClimateError::Upstream(format!("Grid data request rejected: {}", error)));
    }

    Ok(GridFetch::Data(body))
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VOID: &str = r#"{"status": "Invalid request.", "error": "bad ur"}"#;

    #[test]
    fn test_request_body_shape() {
        let request = GridDataRequest::new(
            "loca:wmean:rcp85",
            Coordinate::new(37.7576171, -122.3933185),
            DateRange::for_year(2080).unwrap(),
        );
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["grid"], "loca:wmean:rcp85");
        assert_eq!(json["loc"], "-122.3933185,37.7576171");
        assert_eq!(json["sdate"], "2080-01-01");
        assert_eq!(json["edate"], "2080-12-31");
        assert_eq!(json["elems"].as_array().unwrap().len(), GRID_ELEMENTS.len());
    }

    #[test]
    fn test_classify_data() {
        let body = r#"{"data": [["2080", 3, 41, 61.5, 2, 230, 22.07]]}"#.to_string();
        assert_eq!(classify_response(true, 200, body.clone()).unwrap(), GridFetch::Data(body));
    }

    #[test]
    fn test_classify_data_void_on_error_status() {
        let fetch = classify_response(false, 400, VOID.to_string()).unwrap();
        assert_eq!(fetch, GridFetch::NoData(VOID.to_string()));
    }

    #[test]
    fn test_classify_data_void_inline() {
        let fetch = classify_response(true, 200, VOID.to_string()).unwrap();
        assert!(matches!(fetch, GridFetch::NoData(_)));
    }

    #[test]
    fn test_classify_other_failures() {
        assert!(matches!(
            classify_response(false, 502, "Bad Gateway".to_string()),
            Err(ClimateError::Upstream(_))
        ));
        assert!(matches!(
            classify_response(true, 200, r#"{"error": "Unknown grid"}"#.to_string()),
            Err(ClimateError::Upstream(_))
        ));
        assert!(matches!(
            classify_response(true, 200, "not json".to_string()),
            Err(ClimateError::Upstream(_))
        ));
    }

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("°F°F", 2), "°F");
        assert_eq!(truncate("short", 200), "short");
    }
}
