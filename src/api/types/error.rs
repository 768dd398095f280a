//! API error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::domain::DomainError;

/// Error classes; kept server-side, the wire body only carries the message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorType {
    InvalidRequestError,
    AuthenticationError,
    NotFoundError,
    ServerError,
}

impl std::fmt::Display for ApiErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequestError => write!(f, "invalid_request_error"),
            Self::AuthenticationError => write!(f, "authentication_error"),
            Self::NotFoundError => write!(f, "not_found_error"),
            Self::ServerError => write!(f, "server_error"),
        }
    }
}

/// Error body: `{"error": ...}`, or `{"valid": false, "error": ...}` for checks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid: Option<bool>,
    pub error: String,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error_type: ApiErrorType,
    pub response: ApiErrorResponse,
}

impl ApiError {
    /// Create a new API error
    pub fn new(status: StatusCode, error_type: ApiErrorType, message: impl Into<String>) -> Self {
        Self {
            status,
            error_type,
            response: ApiErrorResponse {
                valid: None,
                error: message.into(),
            },
        }
    }

    /// Mark the body as the negative result of a key check
    pub fn invalid_key(mut self) -> Self {
        self.response.valid = Some(false);
        self
    }

    /// Bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ApiErrorType::InvalidRequestError, message)
    }

    /// Authentication error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, ApiErrorType::AuthenticationError, message)
    }

    /// Unknown or inactive key; reported like a bad request
    pub fn unknown_key(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ApiErrorType::NotFoundError, message)
    }

    /// Internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, ApiErrorType::ServerError, message)
    }

    /// Map a domain error, replacing fault detail with `fault_message`
    ///
    /// Negative outcomes keep their message. Faults are logged and only the
    /// generic message reaches the client.
    pub fn from_domain(err: &DomainError, fault_message: &str) -> Self {
        match err {
            DomainError::Validation { message } => Self::bad_request(message),
            DomainError::NotFound { message } => Self::unknown_key(message),
            DomainError::Conflict { .. }
            | DomainError::Storage { .. }
            | DomainError::Configuration { .. }
            | DomainError::Internal { .. } => {
                error!(error = %err, "{}", fault_message);
                Self::internal(fault_message)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self::from_domain(&err, "Internal server error")
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_type, self.response.error)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_creation() {
        let err = ApiError::bad_request("Invalid API key format");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.error_type, ApiErrorType::InvalidRequestError);
        assert_eq!(err.response.error, "Invalid API key format");
        assert!(err.response.valid.is_none());
    }

    #[test]
    fn test_invalid_key_body() {
        let err = ApiError::bad_request("Invalid API key format").invalid_key();
        let json = serde_json::to_value(&err.response).unwrap();

        assert_eq!(
            json,
            serde_json::json!({ "valid": false, "error": "Invalid API key format" })
        );
    }

    #[test]
    fn test_plain_error_body() {
        let err = ApiError::internal("Failed to create API key");
        let json = serde_json::to_value(&err.response).unwrap();

        assert_eq!(json, serde_json::json!({ "error": "Failed to create API key" }));
    }

    #[test]
    fn test_domain_error_conversion() {
        let not_found: ApiError = DomainError::not_found("API key not registered").into();
        assert_eq!(not_found.status, StatusCode::BAD_REQUEST);
        assert_eq!(not_found.error_type, ApiErrorType::NotFoundError);

        let validation: ApiError = DomainError::validation("Invalid API key format").into();
        assert_eq!(validation.error_type, ApiErrorType::InvalidRequestError);
    }

    #[test]
    fn test_faults_hide_detail() {
        let err = ApiError::from_domain(
            &DomainError::storage("connection to 10.0.0.5:5432 refused"),
            "Failed to verify API key",
        );

        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_type, ApiErrorType::ServerError);
        assert_eq!(err.response.error, "Failed to verify API key");
    }

    #[test]
    fn test_all_error_types() {
        assert_eq!(ApiError::bad_request("").status, StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::unauthorized("").status, StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::unknown_key("").status, StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::internal("").status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
