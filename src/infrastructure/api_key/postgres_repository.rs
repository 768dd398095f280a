//! PostgreSQL API key repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use crate::domain::api_key::{
    ApiKey, ApiKeyRecord, ApiKeyRecordId, ApiKeyRepository, ApiKeyStatus,
};
use crate::domain::DomainError;

/// Stamps usage without moving `last_used_at` behind creation or an earlier use
const RECORD_USAGE_SQL: &str = r#"
    UPDATE api_keys
    SET last_used_at = GREATEST($2, created_at, COALESCE(last_used_at, created_at))
    WHERE api_key = $1
    RETURNING last_used_at
"#;

/// PostgreSQL implementation of ApiKeyRepository
///
/// Expects the `api_keys` table created by the storage migrations.
#[derive(Debug, Clone)]
pub struct PostgresApiKeyRepository {
    pool: PgPool,
}

impl PostgresApiKeyRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApiKeyRepository for PostgresApiKeyRepository {
    async fn insert(&self, key: &ApiKey) -> Result<ApiKeyRecord, DomainError> {
        let row = sqlx::query(
            r#"
            INSERT INTO api_keys (api_key, status, created_at)
            VALUES ($1, $2, $3)
            RETURNING id, api_key, status, created_at, last_used_at
            "#,
        )
        .bind(key.as_str())
        .bind(ApiKeyStatus::Active.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let unique_violation = e
                .as_database_error()
                .map(|db| db.is_unique_violation())
                .unwrap_or(false);

            if unique_violation {
                DomainError::conflict(format!("API key '{}' already exists", key.redacted()))
            } else {
                DomainError::storage(format!("Failed to insert API key: {}", e))
            }
        })?;

        row_to_record(&row)
    }

    async fn lookup_active(&self, key: &ApiKey) -> Result<Option<ApiKeyRecord>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, api_key, status, created_at, last_used_at
            FROM api_keys
            WHERE api_key = $1 AND status = $2
            "#,
        )
        .bind(key.as_str())
        .bind(ApiKeyStatus::Active.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to look up API key: {}", e)))?;

        match row {
            Some(row) => Ok(Some(row_to_record(&row)?)),
            None => Ok(None),
        }
    }

    async fn record_usage(&self, key: &ApiKey) -> Result<DateTime<Utc>, DomainError> {
        let used: Option<DateTime<Utc>> = sqlx::query_scalar(RECORD_USAGE_SQL)
        .bind(key.as_str())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to record API key usage: {}", e)))?;

        used.ok_or_else(|| {
            DomainError::not_found(format!("API key '{}' not found", key.redacted()))
        })
    }

    async fn count(&self) -> Result<u64, DomainError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM api_keys")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to count API keys: {}", e)))?;

        Ok(count as u64)
    }
}

fn row_to_record(row: &sqlx::postgres::PgRow) -> Result<ApiKeyRecord, DomainError> {
    let id: i64 = row.get("id");
    let api_key: String = row.get("api_key");
    let status: String = row.get("status");
    let created_at: DateTime<Utc> = row.get("created_at");
    let last_used_at: Option<DateTime<Utc>> = row.get("last_used_at");

    let key = ApiKey::parse(api_key)
        .map_err(|e| DomainError::storage(format!("Invalid API key in database: {}", e)))?;

    Ok(ApiKeyRecord::restore(
        ApiKeyRecordId::new(id),
        key,
        str_to_status(&status),
        created_at,
        last_used_at,
    ))
}

/// Unknown status strings are treated as inactive so they never validate
fn str_to_status(s: &str) -> ApiKeyStatus {
    s.parse().unwrap_or(ApiKeyStatus::Inactive)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_conversion() {
        assert_eq!(ApiKeyStatus::Active.as_str(), "active");
        assert_eq!(ApiKeyStatus::Inactive.as_str(), "inactive");

        assert_eq!(str_to_status("active"), ApiKeyStatus::Active);
        assert_eq!(str_to_status("inactive"), ApiKeyStatus::Inactive);
        assert_eq!(str_to_status("aktif"), ApiKeyStatus::Inactive);
        assert_eq!(str_to_status(""), ApiKeyStatus::Inactive);
    }

    #[test]
    fn test_usage_stamp_is_floored_by_previous_use() {
        let sql = RECORD_USAGE_SQL.split_whitespace().collect::<Vec<_>>().join(" ");

        assert!(sql.contains(
            "SET last_used_at = GREATEST($2, created_at, COALESCE(last_used_at, created_at))"
        ));
        assert!(sql.contains("RETURNING last_used_at"));
    }
}
