//! GraphQL configuration.
//!
//! Configuration is read from the `[graphql]` section of `apigen.toml`.
//!
//! # Example Configuration
//!
//! ```toml
//! [graphql]
//! enabled = true
//! nesting_separator = "_"
//! max_depth = 15
//! max_complexity = 500
//! introspection = true
//! mercure_hub_url = "https://hub.example.com/.well-known/mercure"
//!
//! [graphql.pagination]
//! type = "cursor"
//! items_per_page = 30
//! ```

use apigen_metadata::PaginationType;
use serde::{Deserialize, Serialize};

use crate::schema::SchemaBuilderConfig;

/// GraphQL API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQLConfig {
    /// Enable the GraphQL schema.
    /// Default: true
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Replaces dots of filter keys in argument names.
    /// Default: "_"
    #[serde(default = "default_nesting_separator")]
    pub nesting_separator: String,

    /// Maximum query depth allowed.
    /// Default: 15
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Maximum query complexity allowed.
    /// Default: 500
    #[serde(default = "default_max_complexity")]
    pub max_complexity: usize,

    /// Enable GraphQL introspection queries.
    /// Default: true (development-friendly)
    #[serde(default = "default_introspection")]
    pub introspection: bool,

    /// Hub advertised to mercure subscriptions.
    #[serde(default)]
    pub mercure_hub_url: Option<String>,

    /// Collection pagination defaults.
    #[serde(default)]
    pub pagination: PaginationConfig,
}

/// Collection pagination defaults, overridable per operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(rename = "type", default)]
    pub pagination_type: PaginationType,

    #[serde(default = "default_page_parameter_name")]
    pub page_parameter_name: String,

    #[serde(default = "default_items_per_page_parameter_name")]
    pub items_per_page_parameter_name: String,

    /// Let clients choose the page size.
    #[serde(default)]
    pub client_items_per_page: bool,

    #[serde(default = "default_items_per_page")]
    pub items_per_page: usize,
}

fn default_enabled() -> bool {
    true
}

fn default_nesting_separator() -> String {
    "_".to_string()
}

fn default_max_depth() -> usize {
    15
}

fn default_max_complexity() -> usize {
    500
}

fn default_introspection() -> bool {
    true
}

fn default_page_parameter_name() -> String {
    "page".to_string()
}

fn default_items_per_page_parameter_name() -> String {
    "itemsPerPage".to_string()
}

fn default_items_per_page() -> usize {
    30
}

impl Default for GraphQLConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            nesting_separator: default_nesting_separator(),
            max_depth: default_max_depth(),
            max_complexity: default_max_complexity(),
            introspection: default_introspection(),
            mercure_hub_url: None,
            pagination: PaginationConfig::default(),
        }
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            pagination_type: PaginationType::default(),
            page_parameter_name: default_page_parameter_name(),
            items_per_page_parameter_name: default_items_per_page_parameter_name(),
            client_items_per_page: false,
            items_per_page: default_items_per_page(),
        }
    }
}

impl GraphQLConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration values are invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_depth == 0 {
            return Err("graphql.max_depth must be > 0".into());
        }
        if self.max_complexity == 0 {
            return Err("graphql.max_complexity must be > 0".into());
        }
        if self.nesting_separator.is_empty() {
            return Err("graphql.nesting_separator must not be empty".into());
        }
        if self.pagination.items_per_page == 0 {
            return Err("graphql.pagination.items_per_page must be > 0".into());
        }
        Ok(())
    }

    /// Converts this config to a SchemaBuilderConfig.
    #[must_use]
    pub fn to_schema_builder_config(&self) -> SchemaBuilderConfig {
        SchemaBuilderConfig {
            max_depth: self.max_depth,
            max_complexity: self.max_complexity,
            introspection_enabled: self.introspection,
        }
    }
}
