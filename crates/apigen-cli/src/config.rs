use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use apigen_graphql::GraphQLConfig;
use serde::Deserialize;

/// Contents of `apigen.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub graphql: GraphQLConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "warn".to_string()
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(content)?;
    config.graphql.validate().map_err(anyhow::Error::msg)?;
    Ok(config)
}

pub fn load(path: Option<&Path>) -> Result<AppConfig> {
    let Some(path) = path else {
        return Ok(AppConfig::default());
    };
    let content = fs::read_to_string(path)
        .with_context(|| format!("Cannot read config file {}", path.display()))?;
    parse(&content).with_context(|| format!("Invalid config file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use apigen_metadata::PaginationType;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let config = load(None).unwrap();
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.graphql.max_depth, 15);
    }

    #[test]
    fn test_parse_sections() {
        let config = parse(
            r#"
            [logging]
            level = "debug"

            [graphql]
            introspection = false
            mercure_hub_url = "https://hub.example.com/.well-known/mercure"

            [graphql.pagination]
            type = "page"
            items_per_page = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.logging.level, "debug");
        assert!(!config.graphql.introspection);
        assert_eq!(config.graphql.pagination.pagination_type, PaginationType::Page);
        assert_eq!(config.graphql.pagination.items_per_page, 10);
    }

    #[test]
    fn test_invalid_limits_are_rejected() {
        let err = parse("[graphql]\nmax_depth = 0\n").unwrap_err();
        assert!(err.to_string().contains("max_depth"));
    }

    #[test]
    fn test_missing_file() {
        let err = load(Some(Path::new("/nonexistent/apigen.toml"))).unwrap_err();
        assert!(err.to_string().contains("Cannot read config file"));
    }
}
