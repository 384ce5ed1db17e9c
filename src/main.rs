use clap::Parser;
use eyre::{Context, Result};
use std::io;
use tracing::debug;

use employeestore::Store;
use employeestore::cli::{self, Cli};
use employeestore::config::Config;

fn setup_logging(verbose: bool) {
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::WARN };

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    if let Some(store_path) = cli.store_path {
        config.store_path = store_path;
    }
    debug!(store_path = ?config.store_path, "Configuration loaded");

    let store = Store::open_with(&config.store_path, config.store_options()).context("Failed to open store")?;

    let stdout = io::stdout();
    let stdin = io::stdin();
    cli::execute(&store, cli.command, &mut stdout.lock(), &mut stdin.lock())
}
