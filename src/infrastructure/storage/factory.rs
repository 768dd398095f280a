//! Storage selection at startup

use crate::config::StorageSettings;
use crate::domain::DomainError;

use super::postgres::PostgresConfig;

/// Supported storage types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageType {
    /// In-memory storage (for testing/development)
    InMemory,
    /// PostgreSQL storage
    Postgres,
}

impl StorageType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "memory" | "inmemory" | "in-memory" | "in_memory" => Some(Self::InMemory),
            "postgres" | "postgresql" | "pg" => Some(Self::Postgres),
            _ => None,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone)]
pub enum StorageConfig {
    /// In-memory storage configuration
    InMemory,
    /// PostgreSQL storage configuration
    Postgres(PostgresConfig),
}

impl StorageConfig {
    /// Resolve the storage configuration from application settings
    ///
    /// The database URL falls back to `DATABASE_URL` when not configured.
    pub fn from_settings(settings: &StorageSettings) -> Result<Self, DomainError> {
        let storage_type = StorageType::from_str(&settings.backend).ok_or_else(|| {
            DomainError::configuration(format!(
                "Unknown storage backend '{}'",
                settings.backend
            ))
        })?;

        match storage_type {
            StorageType::InMemory => Ok(Self::InMemory),
            StorageType::Postgres => {
                let url = settings
                    .database_url
                    .clone()
                    .or_else(|| std::env::var("DATABASE_URL").ok())
                    .ok_or_else(|| {
                        DomainError::configuration(
                            "storage.database_url or DATABASE_URL is required for postgres",
                        )
                    })?;

                Ok(Self::Postgres(
                    PostgresConfig::new(url)
                        .with_max_connections(settings.max_connections)
                        .with_min_connections(settings.min_connections)
                        .with_connect_timeout(settings.connect_timeout_secs)
                        .with_idle_timeout(settings.idle_timeout_secs),
                ))
            }
        }
    }

    /// Returns the storage type
    pub fn storage_type(&self) -> StorageType {
        match self {
            Self::InMemory => StorageType::InMemory,
            Self::Postgres(_) => StorageType::Postgres,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_type_from_str() {
        assert_eq!(
            StorageType::from_str("memory"),
            Some(StorageType::InMemory)
        );
        assert_eq!(
            StorageType::from_str("in-memory"),
            Some(StorageType::InMemory)
        );
        assert_eq!(
            StorageType::from_str("postgres"),
            Some(StorageType::Postgres)
        );
        assert_eq!(StorageType::from_str("PG"), Some(StorageType::Postgres));
        assert_eq!(StorageType::from_str("mysql"), None);
    }

    #[test]
    fn test_from_settings_in_memory() {
        let settings = StorageSettings::default();
        let config = StorageConfig::from_settings(&settings).unwrap();

        assert_eq!(config.storage_type(), StorageType::InMemory);
    }

    #[test]
    fn test_from_settings_postgres() {
        let settings = StorageSettings {
            backend: "postgres".to_string(),
            database_url: Some("postgres://db/keys".to_string()),
            max_connections: 20,
            ..Default::default()
        };

        match StorageConfig::from_settings(&settings).unwrap() {
            StorageConfig::Postgres(pg) => {
                assert_eq!(pg.url, "postgres://db/keys");
                assert_eq!(pg.max_connections, 20);
            }
            other => panic!("Expected Postgres config, got {:?}", other),
        }
    }

    #[test]
    fn test_from_settings_unknown_backend() {
        let settings = StorageSettings {
            backend: "mysql".to_string(),
            ..Default::default()
        };

        let result = StorageConfig::from_settings(&settings);
        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }
}
