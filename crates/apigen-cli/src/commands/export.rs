use std::fs;

use anyhow::{Context, Result};
use apigen_graphql::{GraphQLConfig, LazySchema};

use crate::cli::ExportArgs;
use crate::output::print_success;

pub async fn export(args: &ExportArgs, config: &GraphQLConfig) -> Result<()> {
    let factory = super::load_factory(&args.metadata, config)?;
    let schema = LazySchema::new(factory).get_or_build_wait().await?;
    let sdl = schema.sdl();

    match &args.output {
        Some(path) => {
            fs::write(path, &sdl).with_context(|| format!("Cannot write {}", path.display()))?;
            print_success(&format!("Schema written to {}", path.display()));
        }
        None => print!("{sdl}"),
    }
    Ok(())
}
