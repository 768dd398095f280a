//! API Key domain
//!
//! Domain types and traits for issuing and validating API keys.

mod entity;
mod repository;
mod validation;

pub use entity::{ApiKey, ApiKeyRecord, ApiKeyRecordId, ApiKeyStatus};
#[cfg(test)]
pub use repository::MockApiKeyRepository;
pub use repository::ApiKeyRepository;
pub use validation::{validate_api_key, ApiKeyValidationError, KEY_PREFIX};
