//! Resource metadata for apigen.
//!
//! This crate describes the API surface the schema builders work from:
//! resources and their GraphQL operations, property types, filters and
//! backed enums. It provides:
//!
//! - The descriptor types ([`ResourceDescriptor`], [`Operation`],
//!   [`PropertyDescriptor`], [`PropertyType`])
//! - The collaborator traits the builders consume ([`MetadataProvider`],
//!   [`EnumFieldsProvider`], [`FilterRegistry`], [`NameConverter`],
//!   [`Inflector`])
//! - An in-memory implementation loaded from TOML or JSON documents
//!   ([`MemoryMetadataProvider`], [`MemoryFilterRegistry`])

pub mod error;
pub mod filter;
pub mod memory;
pub mod naming;
pub mod property;
pub mod property_type;
pub mod provider;
pub mod resource;

pub use error::MetadataError;
pub use filter::{
    ConfiguredFilter, Filter, FilterFieldDescription, FilterKind, FilterRegistry,
    MemoryFilterRegistry,
};
pub use memory::{MemoryMetadataProvider, MetadataDocument};
pub use naming::{
    EnglishInflector, IdentityNameConverter, Inflector, NameConverter, SnakeCaseNameConverter,
    lcfirst, ucfirst,
};
pub use property::{PropertyContext, PropertyDescriptor};
pub use property_type::{Builtin, PropertyType, class_basename};
pub use provider::{EnumCase, EnumFieldsProvider, MetadataProvider};
pub use resource::{
    ArgumentSpec, COLLECTION_QUERY, ITEM_QUERY, IoMetadata, Operation, OperationKind,
    PaginationType, Parameter, ResourceDescriptor, SUBSCRIPTION_KEY_SUFFIX,
};
