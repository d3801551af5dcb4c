//! Item resolver: root item queries, `node` and nested relations.

use std::sync::Arc;

use apigen_metadata::{MetadataProvider, Operation};
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::{DynFieldResolver, FieldResolver, ResolveInfo, ResolverFactory, StateProvider, tag_item};
use crate::error::GraphQLError;

pub struct ItemResolverFactory {
    provider: Arc<dyn StateProvider>,
    metadata: Arc<dyn MetadataProvider>,
}

impl ItemResolverFactory {
    pub fn new(provider: Arc<dyn StateProvider>, metadata: Arc<dyn MetadataProvider>) -> Self {
        Self { provider, metadata }
    }
}

impl ResolverFactory for ItemResolverFactory {
    fn create(
        &self,
        resource_class: Option<&str>,
        _root_class: Option<&str>,
        _operation: Option<&Operation>,
    ) -> DynFieldResolver {
        match resource_class {
            // Enums and embedded classes are read from the parent as is.
            Some(class) if !self.metadata.is_resource_class(class) => Arc::new(PropertyResolver),
            _ => Arc::new(ItemResolver {
                provider: Arc::clone(&self.provider),
                resource_class: resource_class.map(str::to_string),
            }),
        }
    }
}

/// Loads items by IRI. Nested relations hold either the IRI or the
/// embedded item.
struct ItemResolver {
    provider: Arc<dyn StateProvider>,
    resource_class: Option<String>,
}

impl ItemResolver {
    async fn load(&self, iri: &str) -> Result<Value, GraphQLError> {
        let item = match &self.resource_class {
            Some(class) => self.provider.item(class, iri).await?,
            None => self.provider.find(iri).await?,
        };
        Ok(item.unwrap_or(Value::Null))
    }
}

#[async_trait]
impl FieldResolver for ItemResolver {
    async fn resolve(&self, info: ResolveInfo) -> Result<Value, GraphQLError> {
        let item = if info.parent().is_some() {
            match info.parent_value() {
                None | Some(Value::Null) => return Ok(Value::Null),
                Some(Value::String(iri)) => self.load(iri).await?,
                Some(embedded) => embedded.clone(),
            }
        } else {
            let Some(iri) = info.args.get("id").and_then(Value::as_str) else {
                return Ok(Value::Null);
            };
            debug!(field = %info.field_name, iri, "Resolving item");
            self.load(iri).await?
        };

        Ok(match &self.resource_class {
            Some(class) => tag_item(item, class),
            None => item,
        })
    }
}

/// Default property access for values that are not resources.
struct PropertyResolver;

#[async_trait]
impl FieldResolver for PropertyResolver {
    async fn resolve(&self, info: ResolveInfo) -> Result<Value, GraphQLError> {
        Ok(info.parent_value().cloned().unwrap_or(Value::Null))
    }
}

#[cfg(test)]
mod tests {
    use apigen_metadata::MemoryMetadataProvider;
    use pretty_assertions::assert_eq;
    use serde_json::{Map, json};

    use super::*;
    use crate::resolvers::{ITEM_RESOURCE_CLASS_KEY, InMemoryState};

    const BOOK: &str = "App\\Entity\\Book";

    async fn factory() -> ItemResolverFactory {
        let state = InMemoryState::new();
        state
            .insert(BOOK, json!({"id": "/books/1", "title": "Dune"}))
            .await
            .unwrap();
        let metadata = MemoryMetadataProvider::from_toml_str(
            r#"
            [[resources]]
            class = "App\\Entity\\Book"
            "#,
        )
        .unwrap();
        ItemResolverFactory::new(Arc::new(state), Arc::new(metadata))
    }

    fn args(id: &str) -> Map<String, Value> {
        let mut args = Map::new();
        args.insert("id".into(), json!(id));
        args
    }

    #[tokio::test]
    async fn test_root_item() {
        let resolver = factory().await.create(Some(BOOK), Some(BOOK), None);
        let item = resolver
            .resolve(ResolveInfo {
                field_name: "book".into(),
                source: None,
                args: args("/books/1"),
            })
            .await
            .unwrap();
        assert_eq!(item["title"], json!("Dune"));
        assert_eq!(item[ITEM_RESOURCE_CLASS_KEY], json!(BOOK));
    }

    #[tokio::test]
    async fn test_missing_item_is_null() {
        let resolver = factory().await.create(Some(BOOK), Some(BOOK), None);
        let item = resolver
            .resolve(ResolveInfo {
                field_name: "book".into(),
                source: None,
                args: args("/books/404"),
            })
            .await
            .unwrap();
        assert_eq!(item, Value::Null);
    }

    #[tokio::test]
    async fn test_node_finds_any_class() {
        let resolver = factory().await.create(None, None, None);
        let item = resolver
            .resolve(ResolveInfo {
                field_name: "node".into(),
                source: None,
                args: args("/books/1"),
            })
            .await
            .unwrap();
        assert_eq!(item["id"], json!("/books/1"));
    }

    #[tokio::test]
    async fn test_nested_relation_by_iri() {
        let resolver = factory().await.create(Some(BOOK), Some("App\\Entity\\Review"), None);
        let item = resolver
            .resolve(ResolveInfo {
                field_name: "book".into(),
                source: Some(json!({"book": "/books/1"})),
                args: Map::new(),
            })
            .await
            .unwrap();
        assert_eq!(item["title"], json!("Dune"));
    }

    #[tokio::test]
    async fn test_non_resource_reads_parent() {
        let resolver = factory()
            .await
            .create(Some("App\\Enum\\BookStatus"), Some(BOOK), None);
        let value = resolver
            .resolve(ResolveInfo {
                field_name: "status".into(),
                source: Some(json!({"status": "draft"})),
                args: Map::new(),
            })
            .await
            .unwrap();
        assert_eq!(value, json!("draft"));
    }
}
