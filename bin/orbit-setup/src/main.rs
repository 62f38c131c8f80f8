//! orbit-setup prepares the configuration of an Arbitrum Orbit chain and its nodes.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    // Variables from a local .env file take part in argument parsing.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize the logger.
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .init();

    let store = cli.store();
    tracing::debug!(config_folder = %store.root().display(), "Using configuration folder");

    match cli.command {
        Command::PrepareChainConfig(args) => commands::prepare_chain_config(&store, &args),
        Command::PrepareNodeConfig(args) => commands::prepare_node_config(&store, &args),
        Command::UpdateNodeConfig(args) => commands::update_node_config(&store, &args),
        Command::DasConfig(args) => commands::das_config(&store, &args),
        Command::ChainInfo(args) => commands::chain_info(&store, &args),
        Command::Accounts(args) => commands::accounts(&args),
        Command::CheckFunding(args) => commands::check_funding(&args).await,
    }
}
