//! CLI module for the HPX key service
//!
//! Provides subcommands:
//! - `serve`: HTTP server
//! - `migrate`: apply (or revert) schema migrations
//! - `issue`: print a new key
//! - `check`: validate a key

pub mod keys;
pub mod migrate;
pub mod serve;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// HPX key service - issues and validates API keys
#[derive(Parser)]
#[command(name = "hpx-keys")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve,

    /// Apply pending schema migrations
    Migrate(migrate::MigrateArgs),

    /// Issue a new key and print it
    Issue,

    /// Check whether a key is registered and active
    Check(keys::CheckArgs),
}

/// Load `.env`, configuration and logging; shared by every subcommand
pub(crate) fn bootstrap() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging);

    Ok(config)
}
