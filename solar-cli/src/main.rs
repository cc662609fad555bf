use anyhow::Context;
use clap::Parser;
use tracing::debug;

use solar_cli::cli::Cli;
use solar_cli::config::AppConfig;
use solar_cli::{app, logging};

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cwd = std::env::current_dir().context("cannot determine working directory")?;
    let config = AppConfig::resolve(cli.config.as_deref(), &cwd)?.apply(cli.overrides());

    logging::init_logging(&config.logging.level);
    if cli.log_level.is_some() {
        // An explicit flag beats RUST_LOG.
        logging::set_log_level(&config.logging.level)?;
    }
    if cli.quiet {
        logging::set_console_enabled(false)?;
    }
    logging::set_log_file(config.logging.log_file())?;
    debug!(?config, "configuration resolved");

    let store = app::open_store(&config.storage_config()).await?;
    let output = app::run(&store, cli.command).await?;
    println!("{output}");

    Ok(())
}
