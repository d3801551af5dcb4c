pub mod check;
pub mod export;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use apigen_graphql::{GraphQLConfig, InMemoryState, SchemaFactory};
use apigen_metadata::{MemoryFilterRegistry, MemoryMetadataProvider, MetadataDocument};
use tracing::debug;

/// Schema factory over the metadata document at `path`.
pub fn load_factory(path: &Path, config: &GraphQLConfig) -> Result<SchemaFactory> {
    if !config.enabled {
        anyhow::bail!("GraphQL is disabled in configuration (graphql.enabled = false)");
    }

    let document = MetadataDocument::load(path)
        .with_context(|| format!("Cannot load metadata from {}", path.display()))?;
    let metadata = Arc::new(MemoryMetadataProvider::new(&document)?);
    let filters = Arc::new(MemoryFilterRegistry::from_document(&document));
    debug!(
        path = %path.display(),
        resources = document.resources.len(),
        filters = filters.len(),
        "Loaded metadata"
    );

    Ok(SchemaFactory::from_config(
        config,
        metadata,
        filters,
        Arc::new(InMemoryState::new()),
    ))
}
