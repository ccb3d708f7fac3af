// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Quay daemon (quayd)
//!
//! Listens for push webhooks and runs the build-and-deploy pipeline, or runs
//! a single pipeline from the command line.

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{check, rollback, run, serve};

#[derive(Parser)]
#[command(
    name = "quayd",
    version,
    about = "Quay - push-triggered build and deploy"
)]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, global = true, env = "QUAY_CONFIG", default_value = "quay.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Listen for webhooks and deploy every accepted push
    Serve,
    /// Run the pipeline once for a branch and print the outcome
    Run(run::RunArgs),
    /// Validate the config and print the resolved layout
    Check,
    /// Swap the previous deployment back in
    Rollback,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve => serve::handle(&cli.config).await,
        Commands::Run(args) => run::handle(args, &cli.config).await,
        Commands::Check => check::handle(&cli.config),
        Commands::Rollback => rollback::handle(&cli.config).await,
    }
}
