use anyhow::Result;
use apigen_graphql::GraphQLConfig;
use colored::Colorize;

use crate::cli::CheckArgs;
use crate::output::{print_field, print_success};

/// Root field and type counts of a built schema.
#[derive(Debug, PartialEq, Eq)]
pub struct SchemaSummary {
    pub queries: usize,
    pub mutations: usize,
    pub subscriptions: usize,
    pub types: usize,
}

pub fn summarize(args: &CheckArgs, config: &GraphQLConfig) -> Result<SchemaSummary> {
    let factory = super::load_factory(&args.metadata, config)?;

    let definition = factory.build()?;
    let summary = SchemaSummary {
        queries: definition.query.len(),
        mutations: definition.mutation.as_ref().map_or(0, |m| m.len()),
        subscriptions: definition.subscription.as_ref().map_or(0, |s| s.len()),
        types: definition.types().len(),
    };

    // The executable schema validates what the definition alone cannot.
    definition.into_executable(factory.config())?;
    Ok(summary)
}

pub fn check(args: &CheckArgs, config: &GraphQLConfig) -> Result<()> {
    let summary = summarize(args, config)?;

    println!("{}", args.metadata.display().to_string().bold());
    print_field("Queries", summary.queries);
    print_field("Mutations", summary.mutations);
    print_field("Subscriptions", summary.subscriptions);
    print_field("Types", summary.types);
    print_success("Schema is valid");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;

    use super::*;

    fn bookstore() -> CheckArgs {
        CheckArgs {
            metadata: PathBuf::from(concat!(
                env!("CARGO_MANIFEST_DIR"),
                "/../apigen-graphql/tests/fixtures/bookstore.toml"
            )),
        }
    }

    #[test]
    fn test_summarize_bookstore() {
        let summary = summarize(&bookstore(), &GraphQLConfig::default()).unwrap();
        assert_eq!(summary.queries, 7);
        assert_eq!(summary.mutations, 3);
        assert_eq!(summary.subscriptions, 1);
        assert!(summary.types > 10);
    }

    #[test]
    fn test_disabled_graphql() {
        let config = GraphQLConfig {
            enabled: false,
            ..GraphQLConfig::default()
        };
        let err = summarize(&bookstore(), &config).unwrap_err();
        assert!(err.to_string().contains("disabled"));
    }

    #[test]
    fn test_missing_metadata() {
        let args = CheckArgs {
            metadata: PathBuf::from("/nonexistent/api.toml"),
        };
        let err = summarize(&args, &GraphQLConfig::default()).unwrap_err();
        assert!(err.to_string().contains("Cannot load metadata"));
    }
}
