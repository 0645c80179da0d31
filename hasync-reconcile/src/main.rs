use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use hasync_reconcile::settings::{default_settings, load_settings, Settings};
use tracing_subscriber::EnvFilter;

mod cli;
mod reconcile_cmd;
mod show_cmd;

use cli::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Reconcile(args) => reconcile_cmd::run_reconcile(args),
        Command::Show(args) => show_cmd::run_show(args),
    }
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Load settings from `path`, or the embedded defaults.
pub(crate) fn resolve_settings(path: Option<&Path>) -> Result<Settings> {
    match path {
        Some(path) => load_settings(path)
            .with_context(|| format!("failed to load settings {}", path.display())),
        None => default_settings().context("embedded settings are invalid"),
    }
}
