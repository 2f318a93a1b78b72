mod abi;
mod bind;
mod bind_config;
mod chain;
mod cli;
mod commands;
mod config;
mod error;
mod network;
mod precheck;
mod price;
mod registry;
mod rpc;
mod signer;
mod stats;
mod tx;
mod units;

use anyhow::Result;
use clap::Parser;

use tracing_subscriber::{fmt, EnvFilter};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = cli::Cli::parse();
    let config = config::Config::load(cli.config_path.as_deref())?;
    tracing::debug!(config = %config.path.display(), network = %cli.network, "settings loaded");
    cli.run(config).await
}
