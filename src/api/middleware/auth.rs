//! API key authentication extractor

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::ApiKey;
use crate::infrastructure::api_key::ValidatedKey;

/// Extractor that requires a registered, active API key
///
/// Extracts the API key from either:
/// - Authorization header: `Bearer <api_key>`
/// - X-API-Key header: `<api_key>`
///
/// A successful extraction counts as a use of the key.
#[derive(Debug, Clone)]
pub struct RequireApiKey(pub ValidatedKey);

impl FromRequestParts<AppState> for RequireApiKey {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let api_key_value = extract_api_key_from_headers(&parts.headers)?;

        debug!(key = %log_label(&api_key_value), "Validating API key");

        let validated = state
            .api_key_service
            .check(&api_key_value)
            .await
            .map_err(|e| {
                if e.is_negative_outcome() {
                    debug!(reason = %e, "API key rejected");
                    ApiError::unauthorized("Invalid API key")
                } else {
                    ApiError::from_domain(&e, "Failed to verify API key")
                }
            })?;

        Ok(RequireApiKey(validated))
    }
}

/// Loggable form of a presented key; never the secret token segment
fn log_label(value: &str) -> String {
    ApiKey::parse(value)
        .map(|key| key.redacted())
        .unwrap_or_else(|_| "<malformed>".to_string())
}

fn extract_api_key_from_headers(headers: &HeaderMap) -> Result<String, ApiError> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        let auth_str = auth_header
            .to_str()
            .map_err(|_| ApiError::bad_request("Invalid Authorization header encoding"))?;

        if let Some(token) = auth_str.strip_prefix("Bearer ") {
            return Ok(token.trim().to_string());
        }
    }

    if let Some(api_key_header) = headers.get("x-api-key") {
        let key = api_key_header
            .to_str()
            .map_err(|_| ApiError::bad_request("Invalid X-API-Key header encoding"))?;

        return Ok(key.trim().to_string());
    }

    Err(ApiError::unauthorized(
        "API key required. Provide via 'Authorization: Bearer <key>' or 'X-API-Key: <key>' header",
    ))
}
