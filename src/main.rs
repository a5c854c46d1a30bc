// Main entry point - Dependency wiring and command dispatch
mod domain;
mod application;
mod infrastructure;
mod presentation;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::application::map_builder::Verbosity;
use crate::infrastructure::config::load_gpm_config;
use crate::presentation::app_state::AppState;
use crate::presentation::cli::Cli;
use crate::presentation::commands;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --log-level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Some(result) = commands::run_offline(&cli.command) {
        return result;
    }

    // Load configuration
    let config = load_gpm_config(&cli.config)?;
    let verbosity = if cli.verbose {
        Verbosity::Verbose
    } else {
        Verbosity::Quiet
    };

    let state = AppState::from_config(&config, verbosity)?;
    commands::run(&state, cli.command).await
}
