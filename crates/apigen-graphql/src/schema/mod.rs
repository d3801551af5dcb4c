//! Schema generation.
//!
//! [`SchemaFactory`] walks the resource metadata and produces a
//! [`SchemaDefinition`]: the query, mutation and subscription roots plus
//! every type they reference. A definition becomes an executable
//! `async_graphql` schema through [`SchemaDefinition::into_executable`].
//!
//! ## Components
//!
//! - [`SchemaBuilder`] - Collects root fields per resource operation
//! - [`FieldsBuilder`] - Fields and arguments of roots and resource types
//! - [`TypeBuilder`] - Resource object, enum and connection types
//! - [`TypeConverter`] - Property types to schema types
//! - [`LazySchema`] - Deferred, cached executable schema

mod builder;
mod executable;
mod factory;
mod fields_builder;
mod filter_args;
mod lazy;
mod type_builder;
mod type_converter;

pub use builder::{ScalarDefinition, SchemaBuilder, SchemaBuilderConfig, SchemaDefinition};
pub use factory::{SchemaFactory, SchemaServices};
pub use fields_builder::{
    CLIENT_MUTATION_ID, CLIENT_SUBSCRIPTION_ID, FieldsBuilder, FieldsBuilderLocator,
};
pub use lazy::{LazySchema, SchemaState};
pub use type_builder::{TypeBuilder, TypeContext};
pub use type_converter::{ConvertedType, ITERABLE_TYPE, TypeConverter};
