//! API key issue and check endpoints

use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::api::middleware::RequireApiKey;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::{ApiKeyRecord, ApiKeyValidationError, DomainError};

const ISSUED_MESSAGE: &str = "API key created and stored";
const VALID_MESSAGE: &str = "API key is valid and registered";
const ISSUE_FAILED: &str = "Failed to create API key";
const CHECK_FAILED: &str = "Failed to verify API key";

/// Response to a successful issuance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueKeyResponse {
    #[serde(rename = "apiKey")]
    pub api_key: String,
    pub message: String,
}

/// Request to check a key
///
/// `apiKey` is kept untyped so a non-string value reads as a bad format
/// rather than a missing field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckKeyRequest {
    #[serde(rename = "apiKey", default)]
    pub api_key: Option<Value>,
}

impl CheckKeyRequest {
    /// The presented key; absent or null reads as empty
    pub fn candidate(self) -> Result<String, ApiKeyValidationError> {
        match self.api_key {
            None | Some(Value::Null) => Ok(String::new()),
            Some(Value::String(key)) => Ok(key),
            Some(_) => Err(ApiKeyValidationError::InvalidFormat),
        }
    }
}

/// Response to a successful check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckKeyResponse {
    pub valid: bool,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub last_used: Option<DateTime<Utc>>,
}

/// Metadata of the key authenticating the request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentKeyResponse {
    pub id: i64,
    pub status: String,
    pub issued_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub last_used: Option<DateTime<Utc>>,
}

impl From<&ApiKeyRecord> for CurrentKeyResponse {
    fn from(record: &ApiKeyRecord) -> Self {
        Self {
            id: record.id().value(),
            status: record.status().as_str().to_string(),
            issued_at: record
                .key()
                .issued_at_millis()
                .and_then(DateTime::<Utc>::from_timestamp_millis),
            created_at: record.created_at(),
            last_used: record.last_used_at(),
        }
    }
}

/// POST /create
pub async fn issue_key(State(state): State<AppState>) -> Result<Json<IssueKeyResponse>, ApiError> {
    let record = state
        .api_key_service
        .issue()
        .await
        .map_err(|e| ApiError::from_domain(&e, ISSUE_FAILED))?;

    Ok(Json(IssueKeyResponse {
        api_key: record.key().to_string(),
        message: ISSUED_MESSAGE.to_string(),
    }))
}

/// POST /check
///
/// An unreadable body is treated the same as a missing `apiKey` field.
pub async fn check_key(
    State(state): State<AppState>,
    payload: Result<Json<CheckKeyRequest>, ApiError>,
) -> Result<Json<CheckKeyResponse>, ApiError> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!(reason = %rejection, "Unreadable check request body");
            CheckKeyRequest::default()
        }
    };

    let candidate = request
        .candidate()
        .map_err(|e| ApiError::from_domain(&DomainError::from(e), CHECK_FAILED).invalid_key())?;

    let validated = state
        .api_key_service
        .check(&candidate)
        .await
        .map_err(|e| ApiError::from_domain(&e, CHECK_FAILED).invalid_key())?;

    Ok(Json(CheckKeyResponse {
        valid: true,
        message: VALID_MESSAGE.to_string(),
        created_at: validated.record.created_at(),
        last_used: validated.record.last_used_at(),
    }))
}

/// GET /api/keys/current
pub async fn current_key(RequireApiKey(validated): RequireApiKey) -> Json<CurrentKeyResponse> {
    Json(CurrentKeyResponse::from(&validated.record))
}
