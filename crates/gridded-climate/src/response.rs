//! Decoding of `GridData` response bodies.

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use serde_json::Value;

use climate_common::{ClimateError, ClimateResult};

/// Status/error pair the service returns when it has no data for a location.
const DATA_VOID_STATUS: &str = "Invalid request.";
const DATA_VOID_ERROR: &str = "bad ur";

/// Raw `GridData` response. Successful bodies carry `data`, failures carry
/// `error` and sometimes `status`.
#[derive(Debug, Default, Deserialize)]
pub struct GridDataResponse {
    #[serde(default)]
    pub data: Option<Vec<Vec<Value>>>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl GridDataResponse {
    pub fn parse(body: &str) -> ClimateResult<Self> {
        Ok(serde_json::from_str(body)?)
    }

    /// Whether this is the "no data at this location" signature.
    pub fn is_data_void(&self) -> bool {
        self.status.as_deref() == Some(DATA_VOID_STATUS)
            && self.error.as_deref() == Some(DATA_VOID_ERROR)
    }

    /// Data rows, or a data-contract error if the body is an error body.
    pub fn rows(self) -> ClimateResult<Vec<Vec<Value>>> {
        if let Some(error) = self.error {
            return Err(ClimateError::DataContract(format!(
                "Grid data response contains error: {}",
                error
            )));
        }
        Ok(self.data.unwrap_or_default())
    }
}

/// Whether a raw body is the data-void signature. Non-JSON is never void.
pub fn is_data_void_body(body: &str) -> bool {
    serde_json::from_str::<GridDataResponse>(body)
        .map(|r| r.is_data_void())
        .unwrap_or(false)
}

/// Numeric cell value. The service returns numbers, but dates and some
/// values arrive as strings.
pub fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Year cell of a yearly row: "2080", "2080-01-01" or 2080.
pub fn parse_year(value: &Value) -> Option<i32> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()) {
                s.parse().ok()
            } else {
                NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().map(|d| d.year())
            }
        }
        other => {
            let year = parse_number(other)?;
            (year.fract() == 0.0).then_some(year as i32)
        }
    }
}
