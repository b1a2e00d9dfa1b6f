//! Response types for the SG Reconciliation API.
//!
//! This module defines the error response structures and error handling
//! for the HTTP API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }

    fn internal(error: ApiError) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        match error {
            EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. }
            | EngineError::InvalidConfig { .. } => ApiErrorResponse::internal(
                ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
            ),
            EngineError::SourceNotFound { .. } => {
                ApiErrorResponse::bad_request(ApiError::new("SOURCE_NOT_FOUND", message))
            }
            EngineError::SourceFormat { .. } => {
                ApiErrorResponse::bad_request(ApiError::new("SOURCE_FORMAT", message))
            }
            EngineError::EmptySource { table } => ApiErrorResponse::bad_request(
                ApiError::with_details(
                    "EMPTY_SOURCE",
                    message,
                    format!("The '{}' table must contain at least one row", table),
                ),
            ),
            EngineError::InvalidDate { .. } => {
                ApiErrorResponse::bad_request(ApiError::new("INVALID_DATE", message))
            }
            EngineError::ConflictingPayCodeRule { code, .. } => ApiErrorResponse::bad_request(
                ApiError::with_details(
                    "CONFLICTING_PAY_CODE",
                    message,
                    format!("Pay code '{}' must have a single OTE treatment", code),
                ),
            ),
            EngineError::QuarterResolution { .. } => ApiErrorResponse::internal(
                ApiError::with_details(
                    "QUARTER_RESOLUTION_ERROR",
                    "Payment date could not be assigned to a quarter",
                    message,
                ),
            ),
            EngineError::ComputationError { stage, .. } => ApiErrorResponse::internal(
                ApiError::with_details(
                    "COMPUTATION_ERROR",
                    format!("Reconciliation failed in stage '{}'", stage),
                    message,
                ),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_serialization() {
        let error = ApiError::new("TEST_ERROR", "Test message");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"code\":\"TEST_ERROR\""));
        assert!(json.contains("\"message\":\"Test message\""));
        assert!(!json.contains("details"));
    }

    #[test]
    fn test_api_error_with_details_serialization() {
        let error = ApiError::with_details("TEST_ERROR", "Test message", "Some details");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"details\":\"Some details\""));
    }

    #[test]
    fn test_empty_source_is_bad_request() {
        let response: ApiErrorResponse = EngineError::EmptySource {
            table: "PayCodes".to_string(),
        }
        .into();
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.error.code, "EMPTY_SOURCE");
        assert!(response.error.message.contains("PayCodes"));
    }

    #[test]
    fn test_conflicting_rule_is_bad_request() {
        let response: ApiErrorResponse = EngineError::ConflictingPayCodeRule {
            code: "ORD".to_string(),
            first: Some("OTE".to_string()),
            second: None,
        }
        .into();
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.error.code, "CONFLICTING_PAY_CODE");
    }

    #[test]
    fn test_computation_error_is_internal() {
        let response: ApiErrorResponse =
            EngineError::computation("variance", "variance overflowed").into();
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.error.code, "COMPUTATION_ERROR");
        assert!(response.error.message.contains("variance"));
    }

    #[test]
    fn test_quarter_resolution_is_internal() {
        let response: ApiErrorResponse = EngineError::QuarterResolution {
            date: chrono::NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            matches: 0,
        }
        .into();
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.error.code, "QUARTER_RESOLUTION_ERROR");
    }
}
