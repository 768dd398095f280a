//! Application state for shared services

use std::sync::Arc;

use crate::domain::api_key::{ApiKeyRecord, ApiKeyRepository};
use crate::domain::DomainError;
use crate::infrastructure::api_key::{ApiKeyService, ValidatedKey};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub api_key_service: Arc<dyn ApiKeyServiceTrait>,
}

impl AppState {
    pub fn new(api_key_service: Arc<dyn ApiKeyServiceTrait>) -> Self {
        Self { api_key_service }
    }
}

/// Trait for API key service operations
#[async_trait::async_trait]
pub trait ApiKeyServiceTrait: Send + Sync {
    async fn issue(&self) -> Result<ApiKeyRecord, DomainError>;
    async fn check(&self, key: &str) -> Result<ValidatedKey, DomainError>;
    async fn count(&self) -> Result<u64, DomainError>;
}

#[async_trait::async_trait]
impl<R: ApiKeyRepository + 'static> ApiKeyServiceTrait for ApiKeyService<R> {
    async fn issue(&self) -> Result<ApiKeyRecord, DomainError> {
        ApiKeyService::issue(self).await
    }

    async fn check(&self, key: &str) -> Result<ValidatedKey, DomainError> {
        ApiKeyService::check(self, key).await
    }

    async fn count(&self) -> Result<u64, DomainError> {
        ApiKeyService::count(self).await
    }
}
