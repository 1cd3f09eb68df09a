//! Binary crate for the `weather-notify` command-line tool.
//!
//! This crate focuses on:
//! - Standing in for the widget host (context files, logged notifications)
//! - Inspecting how a payload is parsed and scheduled
//! - Interactive configuration

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
