// Reviewbot
// Main entry point for the registry review bot binary

use clap::Parser;
use reviewbot_engine::cli::{Cli, Command};
use reviewbot_engine::config::{Config, Credentials};
use reviewbot_engine::{handlers, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    telemetry::init(cli.log.as_deref());

    tracing::info!("Reviewbot v{}", env!("CARGO_PKG_VERSION"));

    let config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load_or_default()?,
    };

    let exit_code = match cli.command {
        Command::Review { pr, dry_run } => {
            let credentials = Credentials::from_env()?;
            handlers::handle_review(&config, credentials, pr, dry_run).await?
        }

        Command::Check {
            original,
            proposed,
            author,
        } => handlers::handle_check(&config, &original, &proposed, &author).await?,
    };

    // Non-zero when any problem was found, so the hosting CI fails the check.
    if exit_code != 0 {
        std::process::exit(exit_code);
    }

    Ok(())
}
