// Recast CLI entry point

use anyhow::Context;
use clap::Parser;
use recast_cli::{Cli, CommandRouter, OutputStyle};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;

    if let Err(e) = runtime.block_on(CommandRouter::route(cli)) {
        eprintln!("{}", OutputStyle::default().error(&e.user_message()));
        std::process::exit(1);
    }
    Ok(())
}
