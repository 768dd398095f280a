//! API Key service
//!
//! Issues new keys and validates presented ones against the repository.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::domain::api_key::{ApiKey, ApiKeyRecord, ApiKeyRepository};
use crate::domain::DomainError;

use super::generator::ApiKeyGenerator;

/// Insert attempts per issuance; a conflict on the last one is surfaced
const ISSUE_ATTEMPTS: u32 = 2;

/// Default bound on a single repository call
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(5);

/// Result of a successful key check
#[derive(Debug, Clone)]
pub struct ValidatedKey {
    /// The stored record, with `last_used_at` reflecting this check when recorded
    pub record: ApiKeyRecord,
    /// False when the key was valid but stamping its usage failed
    pub usage_recorded: bool,
}

/// API Key service for issuing and checking keys
#[derive(Debug)]
pub struct ApiKeyService<R>
where
    R: ApiKeyRepository,
{
    repository: Arc<R>,
    generator: ApiKeyGenerator,
    operation_timeout: Duration,
}

impl<R: ApiKeyRepository> ApiKeyService<R> {
    /// Create a new API key service
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            generator: ApiKeyGenerator::new(),
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }

    /// Bound every repository call by `timeout`
    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Generate and persist a new API key
    ///
    /// A key collision is retried once with a fresh key before it is
    /// reported as a conflict.
    pub async fn issue(&self) -> Result<ApiKeyRecord, DomainError> {
        let mut attempt = 1;

        loop {
            let key = self.generator.generate();

            match self.bounded("insert", self.repository.insert(&key)).await {
                Err(DomainError::Conflict { .. }) if attempt < ISSUE_ATTEMPTS => {
                    warn!(key = %key.redacted(), attempt, "Generated API key collided, regenerating");
                    attempt += 1;
                }
                Ok(record) => {
                    info!(id = %record.id(), key = %key.redacted(), "API key issued");
                    return Ok(record);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Check a presented key and record its usage
    ///
    /// Malformed input is rejected before the repository is touched. A
    /// failure to record usage is logged and does not invalidate the check.
    pub async fn check(&self, candidate: &str) -> Result<ValidatedKey, DomainError> {
        let key = ApiKey::parse(candidate)?;

        debug!(key = %key.redacted(), "Checking API key");

        let mut record = self
            .bounded("lookup", self.repository.lookup_active(&key))
            .await?
            .ok_or_else(|| DomainError::not_found("API key not registered or inactive"))?;

        let usage_recorded = match self
            .bounded("record usage", self.repository.record_usage(&key))
            .await
        {
            Ok(used_at) => {
                record.record_usage_at(used_at);
                true
            }
            Err(e) => {
                warn!(key = %key.redacted(), error = %e, "Failed to record API key usage");
                false
            }
        };

        Ok(ValidatedKey {
            record,
            usage_recorded,
        })
    }

    /// Count stored keys
    pub async fn count(&self) -> Result<u64, DomainError> {
        self.bounded("count", self.repository.count()).await
    }

    async fn bounded<T>(
        &self,
        operation: &str,
        fut: impl Future<Output = Result<T, DomainError>>,
    ) -> Result<T, DomainError> {
        match tokio::time::timeout(self.operation_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(DomainError::storage(format!(
                "API key {} timed out after {}ms",
                operation,
                self.operation_timeout.as_millis()
            ))),
        }
    }
}
