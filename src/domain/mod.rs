//! Domain layer - Core business logic and entities

pub mod api_key;
pub mod error;

pub use api_key::{
    ApiKey, ApiKeyRecord, ApiKeyRecordId, ApiKeyRepository, ApiKeyStatus, ApiKeyValidationError,
};
pub use error::DomainError;
