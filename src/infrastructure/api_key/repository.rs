//! In-memory API key repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::api_key::{ApiKey, ApiKeyRecord, ApiKeyRecordId, ApiKeyRepository};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct Inner {
    records: HashMap<String, ApiKeyRecord>,
    last_id: i64,
}

/// In-memory implementation of ApiKeyRepository
///
/// Ids are assigned under the same lock that guards uniqueness, so they are
/// strictly increasing in insertion order. Data is lost when the process ends.
#[derive(Debug, Clone, Default)]
pub struct InMemoryApiKeyRepository {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryApiKeyRepository {
    /// Create a new in-memory repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository holding already-persisted records
    pub fn with_records(records: Vec<ApiKeyRecord>) -> Self {
        let last_id = records.iter().map(|r| r.id().value()).max().unwrap_or(0);
        let records = records
            .into_iter()
            .map(|r| (r.key().as_str().to_string(), r))
            .collect();

        Self {
            inner: Arc::new(RwLock::new(Inner { records, last_id })),
        }
    }

    /// Fetch a record regardless of its status
    pub async fn get(&self, key: &ApiKey) -> Option<ApiKeyRecord> {
        self.inner.read().await.records.get(key.as_str()).cloned()
    }
}

#[async_trait]
impl ApiKeyRepository for InMemoryApiKeyRepository {
    async fn insert(&self, key: &ApiKey) -> Result<ApiKeyRecord, DomainError> {
        let mut inner = self.inner.write().await;

        if inner.records.contains_key(key.as_str()) {
            return Err(DomainError::conflict(format!(
                "API key '{}' already exists",
                key.redacted()
            )));
        }

        inner.last_id += 1;
        let record = ApiKeyRecord::new(ApiKeyRecordId::new(inner.last_id), key.clone(), Utc::now());
        inner
            .records
            .insert(key.as_str().to_string(), record.clone());

        Ok(record)
    }

    async fn lookup_active(&self, key: &ApiKey) -> Result<Option<ApiKeyRecord>, DomainError> {
        let inner = self.inner.read().await;

        Ok(inner
            .records
            .get(key.as_str())
            .filter(|r| r.is_active())
            .cloned())
    }

    async fn record_usage(&self, key: &ApiKey) -> Result<DateTime<Utc>, DomainError> {
        let mut inner = self.inner.write().await;

        match inner.records.get_mut(key.as_str()) {
            Some(record) => Ok(record.record_usage_at(Utc::now())),
            None => Err(DomainError::not_found(format!(
                "API key '{}' not found",
                key.redacted()
            ))),
        }
    }

    async fn count(&self) -> Result<u64, DomainError> {
        Ok(self.inner.read().await.records.len() as u64)
    }
}
