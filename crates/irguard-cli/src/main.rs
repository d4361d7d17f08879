mod bootstrap_helpers;
mod cli_args;
mod commands;

use anyhow::Result;
use clap::Parser;

use crate::bootstrap_helpers::init_tracing;
use crate::cli_args::Cli;

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    commands::dispatch(cli.config.as_deref(), &cli.command)
}
