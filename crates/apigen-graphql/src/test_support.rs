//! Shared fixtures for unit tests.

use std::sync::Arc;

use apigen_metadata::{MemoryFilterRegistry, MemoryMetadataProvider, MetadataDocument};

use crate::config::GraphQLConfig;
use crate::resolvers::InMemoryState;
use crate::schema::SchemaFactory;

pub(crate) const BOOKSTORE: &str = include_str!("../tests/fixtures/bookstore.toml");

pub(crate) const BOOK: &str = "App\\Entity\\Book";
pub(crate) const AUTHOR: &str = "App\\Entity\\Author";

pub(crate) fn bookstore_document() -> MetadataDocument {
    MetadataDocument::from_toml_str(BOOKSTORE).expect("bookstore fixture parses")
}

/// Factory over the metadata document `source` with default settings.
pub(crate) fn factory_from_toml(source: &str) -> SchemaFactory {
    let document = MetadataDocument::from_toml_str(source).expect("document parses");
    factory_from_document(&document, &GraphQLConfig::default(), Arc::new(InMemoryState::new()))
}

fn factory_from_document(
    document: &MetadataDocument,
    config: &GraphQLConfig,
    state: Arc<InMemoryState>,
) -> SchemaFactory {
    let metadata =
        Arc::new(MemoryMetadataProvider::new(document).expect("document is valid metadata"));
    let filters = Arc::new(MemoryFilterRegistry::from_document(document));
    SchemaFactory::from_config(config, metadata, filters, state)
}

pub(crate) fn bookstore_factory_with(
    config: &GraphQLConfig,
    state: Arc<InMemoryState>,
) -> SchemaFactory {
    factory_from_document(&bookstore_document(), config, state)
}

pub(crate) fn bookstore_factory() -> SchemaFactory {
    bookstore_factory_with(&GraphQLConfig::default(), Arc::new(InMemoryState::new()))
}
