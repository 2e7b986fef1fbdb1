mod cli;
mod commands;
mod util;

use std::io;
use std::process;

use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli.command) {
        error!("{err:#}");
        process::exit(1);
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Check(args) => commands::check::run(args),
        Commands::Payload(args) => commands::payload::run(args),
        Commands::Report(args) => commands::report::run(args),
        Commands::Apply(args) => commands::apply::run(args),
        Commands::Strip(args) => commands::strip::run(args),
        Commands::Tools(args) => commands::tools::run(args),
    }
}

/// RUST_LOG wins; otherwise `--verbose` picks debug for this crate only.
fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "tocmark=debug" } else { "tocmark=info" };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .without_time()
        .with_writer(io::stderr)
        .init();
}
