//! Volum - live-reloading 3D scene server.

mod actor;
mod cli;
mod config;
mod core;
mod freshness;
mod hooks;
mod logger;
mod objects;
mod plugins;
mod reload;
mod scene;
mod utils;

use std::sync::Arc;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::RuntimeConfig;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    if matches!(cli.command, Commands::Plugins) {
        cli::plugins::run_plugins();
        return Ok(());
    }

    let config = RuntimeConfig::load(&cli)?;
    logger::set_verbose(config.debug);

    match &cli.command {
        Commands::Serve { .. } => cli::serve::serve(Arc::new(config)),
        Commands::Check { .. } => cli::check::run_check(&config),
        Commands::Plugins => Ok(()),
    }
}
