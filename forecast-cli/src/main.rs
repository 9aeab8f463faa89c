//! Binary crate for the `forecast` command-line tool.
//!
//! This crate focuses on:
//! - Interactive prompts (location, forecast type, API key on first run)
//! - Logging setup
//! - Human-friendly output formatting

use clap::Parser;
use log::LevelFilter;

mod cli;
mod render;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    init_logging(cmd.log_level());
    cmd.run().await
}

/// `RUST_LOG`, when set, overrides the level chosen with `-v`.
fn init_logging(level: LevelFilter) {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}
