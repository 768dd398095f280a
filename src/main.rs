use clap::Parser;
use hpx_keys::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => cli::serve::run().await,
        Command::Migrate(args) => cli::migrate::run(args).await,
        Command::Issue => cli::keys::issue().await,
        Command::Check(args) => cli::keys::check(args).await,
    }
}
