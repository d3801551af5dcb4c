mod cli;
mod commands;
mod config;
mod observability;
mod output;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};
use output::print_error;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let app_config = config::load(cli.config.as_deref())?;

    let level = cli.log_level.as_deref().unwrap_or(&app_config.logging.level);
    observability::init_tracing_with_level(level);

    match &cli.command {
        Commands::Export(args) => commands::export::export(args, &app_config.graphql).await?,
        Commands::Check(args) => commands::check::check(args, &app_config.graphql)?,
    }

    Ok(())
}
