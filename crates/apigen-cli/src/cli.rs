use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "apigen")]
#[command(about = "apigen CLI: generate GraphQL schemas from resource metadata")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to apigen.toml (defaults are used when omitted)
    #[arg(short, long, global = true, env = "APIGEN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `apigen_graphql=trace` (RUST_LOG wins)
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the SDL of the generated schema
    Export(ExportArgs),
    /// Build the schema and report what it contains
    Check(CheckArgs),
}

#[derive(clap::Args)]
pub struct ExportArgs {
    /// Metadata document (TOML, or JSON by extension)
    #[arg(short, long)]
    pub metadata: PathBuf,
    /// Write the SDL to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct CheckArgs {
    /// Metadata document (TOML, or JSON by extension)
    #[arg(short, long)]
    pub metadata: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_export() {
        let cli = Cli::try_parse_from([
            "apigen",
            "export",
            "--metadata",
            "api.toml",
            "-o",
            "schema.graphql",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        match cli.command {
            Commands::Export(args) => {
                assert_eq!(args.metadata, PathBuf::from("api.toml"));
                assert_eq!(args.output, Some(PathBuf::from("schema.graphql")));
            }
            Commands::Check(_) => panic!("expected export"),
        }
    }

    #[test]
    fn test_metadata_is_required() {
        assert!(Cli::try_parse_from(["apigen", "check"]).is_err());
    }
}
