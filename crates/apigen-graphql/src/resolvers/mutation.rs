//! Root mutation resolver.
//!
//! `create` persists a new item, `delete` removes one and every other
//! mutation updates the item named by the input `id`, or creates one when
//! the input has no `id`. The result is the mutation payload:
//! `{<shortName>: item, clientMutationId}`.

use std::sync::Arc;

use apigen_metadata::{Operation, lcfirst};
use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{info, warn};

use super::{DynFieldResolver, FieldResolver, ResolveInfo, ResolverFactory, StateProcessor, StateProvider, tag_item};
use crate::error::GraphQLError;

const CLIENT_MUTATION_ID: &str = "clientMutationId";

pub struct ItemMutationResolverFactory {
    provider: Arc<dyn StateProvider>,
    processor: Arc<dyn StateProcessor>,
}

impl ItemMutationResolverFactory {
    pub fn new(provider: Arc<dyn StateProvider>, processor: Arc<dyn StateProcessor>) -> Self {
        Self { provider, processor }
    }
}

impl ResolverFactory for ItemMutationResolverFactory {
    fn create(
        &self,
        resource_class: Option<&str>,
        _root_class: Option<&str>,
        operation: Option<&Operation>,
    ) -> DynFieldResolver {
        Arc::new(ItemMutationResolver {
            provider: Arc::clone(&self.provider),
            processor: Arc::clone(&self.processor),
            resource_class: resource_class.map(str::to_string),
            operation: operation.cloned(),
        })
    }
}

struct ItemMutationResolver {
    provider: Arc<dyn StateProvider>,
    processor: Arc<dyn StateProcessor>,
    resource_class: Option<String>,
    operation: Option<Operation>,
}

impl ItemMutationResolver {
    async fn existing(&self, class: &str, iri: &str) -> Result<Map<String, Value>, GraphQLError> {
        match self.provider.item(class, iri).await? {
            Some(Value::Object(item)) => Ok(item),
            _ => {
                warn!(resource_class = class, iri, "Mutation target not found");
                Err(GraphQLError::NotFound { iri: iri.to_string() })
            }
        }
    }
}

#[async_trait]
impl FieldResolver for ItemMutationResolver {
    async fn resolve(&self, info: ResolveInfo) -> Result<Value, GraphQLError> {
        let operation = self
            .operation
            .as_ref()
            .ok_or_else(|| GraphQLError::logic("mutation resolver created without an operation"))?;
        let class = self.resource_class.as_deref().unwrap_or(&operation.class);

        let mut input = info
            .args
            .get("input")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        let client_mutation_id = input.remove(CLIENT_MUTATION_ID).unwrap_or(Value::Null);
        let iri = input.get("id").and_then(Value::as_str).map(str::to_string);

        let item = match (operation.name.as_str(), iri) {
            ("create", _) => {
                input.remove("id");
                self.processor.persist(class, input).await?
            }
            ("delete", Some(iri)) => {
                self.processor
                    .remove(class, &iri)
                    .await?
                    .ok_or_else(|| GraphQLError::NotFound { iri: iri.clone() })?;
                serde_json::json!({ "id": iri })
            }
            ("delete", None) => {
                return Err(GraphQLError::invalid_argument("Mutation \"delete\" requires an \"id\""));
            }
            (_, Some(iri)) => {
                let mut item = self.existing(class, &iri).await?;
                item.extend(input);
                self.processor.persist(class, item).await?
            }
            (_, None) => self.processor.persist(class, input).await?,
        };

        info!(mutation = %operation.name, resource_class = class, id = %item["id"], "Applied mutation");

        let mut payload = Map::new();
        payload.insert(lcfirst(&operation.short_name), tag_item(item, class));
        payload.insert(CLIENT_MUTATION_ID.to_string(), client_mutation_id);
        Ok(Value::Object(payload))
    }
}

#[cfg(test)]
mod tests {
    use apigen_metadata::OperationKind;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::resolvers::InMemoryState;

    const BOOK: &str = "App\\Entity\\Book";

    fn resolver(state: Arc<InMemoryState>, name: &str) -> DynFieldResolver {
        let operation = Operation::new(OperationKind::Mutation, name, BOOK, "Book");
        ItemMutationResolverFactory::new(state.clone(), state).create(Some(BOOK), Some(BOOK), Some(&operation))
    }

    fn input(value: Value) -> ResolveInfo {
        let mut args = Map::new();
        args.insert("input".into(), value);
        ResolveInfo {
            field_name: "mutateBook".into(),
            source: None,
            args,
        }
    }

    #[tokio::test]
    async fn test_create() {
        let state = Arc::new(InMemoryState::new());
        let payload = resolver(state.clone(), "create")
            .resolve(input(json!({"title": "Dune", "clientMutationId": "m1"})))
            .await
            .unwrap();

        assert_eq!(payload["clientMutationId"], json!("m1"));
        assert_eq!(payload["book"]["title"], json!("Dune"));
        assert_eq!(payload["book"]["id"], json!("/books/1"));
        assert_eq!(state.len().await, 1);
    }

    #[tokio::test]
    async fn test_update_merges_input() {
        let state = Arc::new(InMemoryState::new());
        state
            .insert(BOOK, json!({"id": "/books/1", "title": "Dune", "isbn": "0441013597"}))
            .await
            .unwrap();

        let payload = resolver(state.clone(), "update")
            .resolve(input(json!({"id": "/books/1", "title": "Dune Messiah"})))
            .await
            .unwrap();

        assert_eq!(payload["book"]["title"], json!("Dune Messiah"));
        assert_eq!(payload["book"]["isbn"], json!("0441013597"));
        assert_eq!(payload["clientMutationId"], Value::Null);
    }

    #[tokio::test]
    async fn test_update_missing_item() {
        let state = Arc::new(InMemoryState::new());
        let err = resolver(state, "update")
            .resolve(input(json!({"id": "/books/9"})))
            .await
            .unwrap_err();
        assert!(matches!(err, GraphQLError::NotFound { iri } if iri == "/books/9"));
    }

    #[tokio::test]
    async fn test_delete() {
        let state = Arc::new(InMemoryState::new());
        state.insert(BOOK, json!({"id": "/books/1"})).await.unwrap();

        let payload = resolver(state.clone(), "delete")
            .resolve(input(json!({"id": "/books/1"})))
            .await
            .unwrap();

        assert_eq!(payload["book"]["id"], json!("/books/1"));
        assert!(state.is_empty().await);
    }
}
