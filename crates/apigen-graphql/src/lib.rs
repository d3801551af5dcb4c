//! # apigen-graphql
//!
//! Metadata-driven GraphQL schema generation.
//!
//! Given resource metadata (resources, their GraphQL operations, property
//! types, filters and backed enums), this crate builds a complete schema
//! following the conventions of Relay-style resource APIs:
//!
//! - Item and collection queries, plus the `node` query over the `Node`
//!   interface
//! - Mutations taking an `input` object and returning a payload
//! - Mercure-backed subscriptions
//! - Cursor or page based collection connections
//! - Filter and parameter arguments shaped from bracket notation keys
//!
//! ## Overview
//!
//! [`SchemaFactory`] produces a [`SchemaDefinition`], an inspectable model of
//! every root field and type. [`SchemaDefinition::into_executable`] turns it
//! into an `async_graphql` dynamic schema whose resolvers read and write a
//! [`StateProvider`]/[`StateProcessor`] pair such as [`InMemoryState`].
//!
//! ## Configuration
//!
//! Add to `apigen.toml`:
//!
//! ```toml
//! [graphql]
//! enabled = true
//! max_depth = 15
//! max_complexity = 500
//! introspection = true
//! ```
//!
//! ## Modules
//!
//! - [`config`] - Configuration options
//! - [`types`] - The schema type model and the types container
//! - [`schema`] - Schema building and lazy loading
//! - [`resolvers`] - Resolver factories and state
//! - [`pagination`] - Pagination policy
//! - [`error`] - Error types for GraphQL operations

pub mod config;
pub mod error;
pub mod pagination;
pub mod resolvers;
pub mod schema;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{GraphQLConfig, PaginationConfig};
pub use error::GraphQLError;
pub use pagination::{Pagination, PaginationPolicy};
pub use resolvers::{InMemoryState, ResolverFactories, StateProcessor, StateProvider};
pub use schema::{
    LazySchema, ScalarDefinition, SchemaBuilderConfig, SchemaDefinition, SchemaFactory,
    SchemaServices,
};
pub use types::{SchemaType, TypesContainer};

/// Result type for GraphQL operations.
pub type Result<T> = std::result::Result<T, GraphQLError>;
