//! API Key infrastructure implementations
//!
//! Key generation, the in-memory and PostgreSQL repositories, and the
//! service tying them together.

mod generator;
mod postgres_repository;
mod repository;
mod service;

pub use generator::ApiKeyGenerator;
pub use postgres_repository::PostgresApiKeyRepository;
pub use repository::InMemoryApiKeyRepository;
pub use service::{ApiKeyService, ValidatedKey, DEFAULT_OPERATION_TIMEOUT};
