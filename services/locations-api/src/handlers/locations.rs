//! `GET /locations` handler.

use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use climate_common::{ClimateError, ClimateResult, DateRange};

use crate::state::AppState;

/// Query parameters for the locations endpoint.
#[derive(Debug, Deserialize, Default)]
pub struct LocationParams {
    /// Free-text address; hyphens stand in for spaces.
    pub address: Option<String>,

    /// Projection year.
    pub year: Option<String>,
}

/// A validated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationRequest {
    pub address: String,
    pub year: i32,
}

/// Error body, `{"error": "<CODE>"}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
}

const LOCATION_NOT_FOUND: &str = "LOCATION_NOT_FOUND";

/// Normalize and check the query. Address is checked before year.
pub fn validate(params: &LocationParams) -> ClimateResult<LocationRequest> {
    let address = params
        .address
        .as_deref()
        .map(normalize_address)
        .filter(|address| !address.is_empty())
        .ok_or_else(|| ClimateError::MissingParameter("address".to_string()))?;

    let raw_year = params
        .year
        .as_deref()
        .map(str::trim)
        .filter(|year| !year.is_empty())
        .ok_or_else(|| ClimateError::MissingParameter("year".to_string()))?;

    let year: i32 = raw_year.parse().map_err(|_| ClimateError::InvalidParameter {
        param: "year".to_string(),
        message: format!("'{}' is not an integer", raw_year),
    })?;

    if DateRange::for_year(year).is_none() {
        return Err(ClimateError::InvalidParameter {
            param: "year".to_string(),
            message: format!("{} is out of range", year),
        });
    }

    Ok(LocationRequest { address, year })
}

/// URL-friendly addresses use hyphens for spaces.
pub fn normalize_address(address: &str) -> String {
    address.replace('-', " ").trim().to_string()
}

/// GET /locations?address=&year=
pub async fn locations_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<LocationParams>,
) -> Response {
    let request = match validate(&params) {
        Ok(request) => request,
        Err(e) => {
            counter!("locations_requests_total", "outcome" => "bad_request").increment(1);
            warn!(error = %e, "Rejected locations request");
            return error_response(&e);
        }
    };

    match state
        .aggregation
        .get_location_results(&request.address, request.year)
        .await
    {
        Ok(Some(results)) => {
            counter!("locations_requests_total", "outcome" => "ok").increment(1);
            (StatusCode::OK, Json(results)).into_response()
        }
        Ok(None) => {
            counter!("locations_requests_total", "outcome" => "not_found").increment(1);
            (
                StatusCode::NOT_FOUND,
                Json(ErrorBody {
                    error: LOCATION_NOT_FOUND,
                }),
            )
                .into_response()
        }
        Err(e) => {
            counter!("locations_requests_total", "outcome" => "error").increment(1);
            if e.is_client_error() {
                warn!(
                    error = %e,
                    address = %request.address,
                    year = request.year,
                    "Rejected locations request"
                );
            } else {
                error!(
                    error = %e,
                    address = %request.address,
                    year = request.year,
                    "Locations request failed"
                );
            }
            error_response(&e)
        }
    }
}

fn error_response(err: &ClimateError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(ErrorBody {
            error: err.error_code(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(address: Option<&str>, year: Option<&str>) -> LocationParams {
        LocationParams {
            address: address.map(str::to_string),
            year: year.map(str::to_string),
        }
    }

    #[test]
    fn test_validate_ok() {
        let request = validate(&params(Some("94107"), Some("2080"))).unwrap();
        assert_eq!(request.address, "94107");
        assert_eq!(request.year, 2080);
    }

    #[test]
    fn test_hyphens_become_spaces() {
        let request = validate(&params(Some("-San-Francisco-CA-"), Some("2050"))).unwrap();
        assert_eq!(request.address, "San Francisco CA");
    }

    #[test]
    fn test_missing_address_checked_first() {
        for address in [None, Some(""), Some("   "), Some("---")] {
            let err = validate(&params(address, None)).unwrap_err();
            assert_eq!(err.error_code(), "MISSING_ADDRESS");
        }
    }

    #[test]
    fn test_missing_year() {
        for year in [None, Some(""), Some(" ")] {
            let err = validate(&params(Some("94107"), year)).unwrap_err();
            assert_eq!(err.error_code(), "MISSING_YEAR");
        }
    }

    #[test]
    fn test_invalid_year() {
        for year in ["twenty", "2080.5", "99999999999"] {
            let err = validate(&params(Some("94107"), Some(year))).unwrap_err();
            assert_eq!(err.error_code(), "INVALID_YEAR");
            assert_eq!(err.http_status_code(), 400);
        }
    }
}
