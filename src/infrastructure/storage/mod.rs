//! Storage infrastructure - connection pooling, migrations and backend selection

mod factory;
pub mod migrations;
mod postgres;

pub use factory::{StorageConfig, StorageType};
pub use migrations::{run_storage_migrations, Migration, Migrator, PostgresMigrator};
pub use postgres::{connect_pool, PostgresConfig};
