//! HPX key service
//!
//! Issues opaque API keys of the form `hpx-16-<base36 ms>.<base64url token>`
//! and validates them against a persistent registry, recording each use.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use sqlx::PgPool;
use tracing::info;

use api::state::AppState;
use infrastructure::api_key::{ApiKeyService, InMemoryApiKeyRepository, PostgresApiKeyRepository};
use infrastructure::storage::{connect_pool, run_storage_migrations, StorageConfig, StorageType};

/// Wired services plus the persistence client they share
pub struct Application {
    pub state: AppState,
    pool: Option<PgPool>,
}

impl Application {
    /// Storage backend the services were wired against
    pub fn storage_type(&self) -> StorageType {
        if self.pool.is_some() {
            StorageType::Postgres
        } else {
            StorageType::InMemory
        }
    }

    /// Release the persistence client
    pub async fn shutdown(self) {
        if let Some(pool) = self.pool {
            pool.close().await;
            info!("PostgreSQL pool closed");
        }
    }
}

/// Build the application for the configured storage backend
///
/// For PostgreSQL the pool is opened and pending migrations are applied
/// before any service is handed out.
pub async fn build_application(config: &AppConfig) -> anyhow::Result<Application> {
    let storage = StorageConfig::from_settings(&config.storage)?;
    let operation_timeout = config.storage.operation_timeout();

    info!("Storage backend: {:?}", storage.storage_type());

    match storage {
        StorageConfig::InMemory => {
            let repository = Arc::new(InMemoryApiKeyRepository::new());
            let service = ApiKeyService::new(repository).with_operation_timeout(operation_timeout);

            Ok(Application {
                state: AppState::new(Arc::new(service)),
                pool: None,
            })
        }
        StorageConfig::Postgres(pg_config) => {
            let pool = connect_pool(&pg_config).await?;

            run_storage_migrations(&pool).await?;

            let repository = Arc::new(PostgresApiKeyRepository::new(pool.clone()));
            let service = ApiKeyService::new(repository).with_operation_timeout(operation_timeout);

            Ok(Application {
                state: AppState::new(Arc::new(service)),
                pool: Some(pool),
            })
        }
    }
}
