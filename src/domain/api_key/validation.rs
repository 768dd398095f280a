//! API key format validation

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Fixed prefix carried by every issued key
pub const KEY_PREFIX: &str = "hpx-16-";

/// Structural pattern a key must satisfy before any storage lookup
static KEY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^hpx-16-[a-z0-9]+\.[A-Za-z0-9_-]+$").unwrap());

/// Errors that can occur during API key validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApiKeyValidationError {
    #[error("API key missing from request")]
    Missing,

    #[error("Invalid API key format")]
    InvalidFormat,
}

/// Validate the shape of an API key
///
/// Rules:
/// - Cannot be empty
/// - Must start with `hpx-16-`
/// - Lowercase base-36 timestamp, a single dot, then a URL-safe base64 token
pub fn validate_api_key(key: &str) -> Result<(), ApiKeyValidationError> {
    if key.is_empty() {
        return Err(ApiKeyValidationError::Missing);
    }

    if !KEY_PATTERN.is_match(key) {
        return Err(ApiKeyValidationError::InvalidFormat);
    }

    Ok(())
}
