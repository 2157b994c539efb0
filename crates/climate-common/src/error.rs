//! Error types for the climate location services.

use thiserror::Error;

/// Result type alias using ClimateError.
pub type ClimateResult<T> = Result<T, ClimateError>;

/// Primary error type for location lookups and data aggregation.
#[derive(Debug, Error)]
pub enum ClimateError {
    // === Request Errors ===
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    // === Collaborator Errors ===
    #[error("Geocoding failed: {0}")]
    Geocoding(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Gridded climate API error: {0}")]
    Upstream(String),

    // === Data Errors ===
    #[error("Unexpected upstream data: {0}")]
    DataContract(String),

    // === Infrastructure Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ClimateError {
    /// Machine-readable error code returned in the `error` field of responses.
    ///
    /// Only request errors expose a specific code; everything else is
    /// reported as a generic server error.
    pub fn error_code(&self) -> &'static str {
        match self {
            ClimateError::MissingParameter(param) => match param.as_str() {
                "address" => "MISSING_ADDRESS",
                "year" => "MISSING_YEAR",
                _ => "MISSING_PARAMETER",
            },
            ClimateError::InvalidParameter { param, .. } => match param.as_str() {
                "year" => "INVALID_YEAR",
                _ => "INVALID_PARAMETER",
            },
            _ => "INTERNAL_ERROR",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            ClimateError::MissingParameter(_) | ClimateError::InvalidParameter { .. } => 400,
            _ => 500,
        }
    }

    /// Whether the error was caused by the request rather than by the service.
    pub fn is_client_error(&self) -> bool {
        self.http_status_code() < 500
    }
}

impl From<serde_json::Error> for ClimateError {
    fn from(err: serde_json::Error) -> Self {
        ClimateError::DataContract(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_parameter_codes() {
        let err = ClimateError::MissingParameter("address".to_string());
        assert_eq!(err.error_code(), "MISSING_ADDRESS");
        assert_eq!(err.http_status_code(), 400);

        let err = ClimateError::MissingParameter("year".to_string());
        assert_eq!(err.error_code(), "MISSING_YEAR");
        assert!(err.is_client_error());
    }

    #[test]
    fn test_invalid_year_code() {
        let err = ClimateError::InvalidParameter {
            param: "year".to_string(),
            message: "not an integer".to_string(),
        };
        assert_eq!(err.error_code(), "INVALID_YEAR");
        assert_eq!(err.http_status_code(), 400);
    }

    #[test]
    fn test_server_errors_are_generic() {
        let errors = [
            ClimateError::Geocoding("timeout".to_string()),
            ClimateError::Database("connection refused".to_string()),
            ClimateError::Cache("insert failed".to_string()),
            ClimateError::Upstream("502".to_string()),
            ClimateError::DataContract("year mismatch".to_string()),
        ];

        for err in errors {
            assert_eq!(err.error_code(), "INTERNAL_ERROR");
            assert_eq!(err.http_status_code(), 500);
            assert!(!err.is_client_error());
        }
    }

    #[test]
    fn test_json_error_is_data_contract() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: ClimateError = json_err.into();
        assert!(matches!(err, ClimateError::DataContract(_)));
    }
}
