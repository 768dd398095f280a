//! Key commands - issue and check keys from the command line

use clap::Args;
use tracing::warn;

use crate::infrastructure::storage::StorageType;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// The key to check
    pub key: String,
}

/// Issue a key and print it on stdout
pub async fn issue() -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    let application = crate::build_application(&config).await?;

    if application.storage_type() == StorageType::InMemory {
        warn!("In-memory storage selected; the issued key is discarded on exit");
    }

    let result = application.state.api_key_service.issue().await;
    application.shutdown().await;

    let record = result?;
    println!("{}", record.key());

    Ok(())
}

/// Check a key; a rejected key ends the process with an error
pub async fn check(args: CheckArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    let application = crate::build_application(&config).await?;

    let result = application.state.api_key_service.check(&args.key).await;
    application.shutdown().await;

    let validated = result?;
    let record = &validated.record;

    println!("valid: true");
    println!("status: {}", record.status().as_str());
    println!("created_at: {}", record.created_at().to_rfc3339());
    match record.last_used_at() {
        Some(at) => println!("last_used: {}", at.to_rfc3339()),
        None => println!("last_used: never"),
    }

    if !validated.usage_recorded {
        warn!("Key is valid but its usage could not be recorded");
    }

    Ok(())
}
