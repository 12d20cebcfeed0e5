//! Sentra - hybrid sentiment classification for free-text passages
//!
//! Usage:
//!   sentra predict "TEXT"        Classify one passage
//!   sentra batch reviews.txt     Classify one passage per line
//!   sentra interactive           Prompt loop
//!   sentra --help                Show all commands

use anyhow::Result;
use clap::Parser;

use sentra::cli::{self, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("sentra=info".parse()?),
        )
        .init();

    cli::execute(&cli)
}
