//! API key repository trait

use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[cfg(test)]
use mockall::automock;

use super::entity::{ApiKey, ApiKeyRecord};
use crate::domain::DomainError;

/// Persistence contract for issued API keys
///
/// Key uniqueness is enforced by the implementation; callers never check
/// for existence before inserting.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ApiKeyRepository: Send + Sync {
    /// Store a new active key stamped with the current time
    ///
    /// Fails with `Conflict` when the key is already stored.
    async fn insert(&self, key: &ApiKey) -> Result<ApiKeyRecord, DomainError>;

    /// Fetch the record for `key` if it exists and is active
    async fn lookup_active(&self, key: &ApiKey) -> Result<Option<ApiKeyRecord>, DomainError>;

    /// Stamp the key as used now and return the stored timestamp
    async fn record_usage(&self, key: &ApiKey) -> Result<DateTime<Utc>, DomainError>;

    /// Count stored keys, regardless of status
    async fn count(&self) -> Result<u64, DomainError>;
}
