//! Migrate command - applies schema migrations to the configured database

use clap::Args;
use tracing::info;

use crate::infrastructure::storage::{connect_pool, Migrator, PostgresMigrator, StorageConfig};

#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// Revert the most recently applied migration instead
    #[arg(long)]
    pub revert: bool,
}

pub async fn run(args: MigrateArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;

    let StorageConfig::Postgres(pg_config) = StorageConfig::from_settings(&config.storage)? else {
        anyhow::bail!("Migrations require storage.backend = \"postgres\"");
    };

    let pool = connect_pool(&pg_config).await?;
    let migrator = PostgresMigrator::new(pool.clone());

    if args.revert {
        match migrator.revert().await? {
            Some(version) => println!("Reverted migration {}", version),
            None => println!("No migrations to revert"),
        }
    } else {
        migrator.run().await?;
        let version = migrator.version().await?;
        info!(version = ?version, "Migrations complete");
        println!("Schema at version {}", version.unwrap_or(0));
    }

    pool.close().await;
    Ok(())
}
