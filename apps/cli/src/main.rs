//! Pressroom CLI: browse, check and publish tutorial articles.
//!
//! Loads article documents from a content directory and renders them as
//! anchored pages with a table of contents.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
