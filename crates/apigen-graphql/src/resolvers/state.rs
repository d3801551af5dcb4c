//! Data access behind the default resolvers.

use std::sync::atomic::{AtomicU64, Ordering};

use apigen_metadata::{EnglishInflector, Inflector, class_basename, lcfirst};
use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::debug;

use super::tag_item;
use crate::error::GraphQLError;

/// Reads items.
#[async_trait]
pub trait StateProvider: Send + Sync {
    /// Item of `resource_class` identified by `iri`.
    async fn item(&self, resource_class: &str, iri: &str) -> Result<Option<Value>, GraphQLError>;

    /// Item identified by `iri` whatever its class.
    async fn find(&self, iri: &str) -> Result<Option<Value>, GraphQLError>;

    /// Every item of `resource_class` in insertion order.
    async fn collection(&self, resource_class: &str) -> Result<Vec<Value>, GraphQLError>;
}

/// Writes items.
#[async_trait]
pub trait StateProcessor: Send + Sync {
    /// Stores `data` and returns the stored item. An `id` is assigned when
    /// `data` has none.
    async fn persist(&self, resource_class: &str, data: Map<String, Value>) -> Result<Value, GraphQLError>;

    /// Removes an item, returning it if it existed.
    async fn remove(&self, resource_class: &str, iri: &str) -> Result<Option<Value>, GraphQLError>;
}

/// In-memory item store keyed by class, then IRI.
///
/// Generated IRIs look like `/books/3`: the pluralized short class name and
/// a counter shared by every class.
#[derive(Debug, Default)]
pub struct InMemoryState {
    items: RwLock<IndexMap<String, IndexMap<String, Value>>>,
    next_id: AtomicU64,
}

impl InMemoryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an item. The item must be an object carrying a string `id`.
    pub async fn insert(&self, resource_class: &str, item: Value) -> Result<(), GraphQLError> {
        let iri = item
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| GraphQLError::State("items must carry a string \"id\"".into()))?
            .to_string();
        self.items
            .write()
            .await
            .entry(resource_class.to_string())
            .or_default()
            .insert(iri, tag_item(item, resource_class));
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.values().map(IndexMap::len).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn collection_path(resource_class: &str) -> String {
        let short_name = lcfirst(class_basename(resource_class));
        format!("/{}", EnglishInflector.pluralize(&short_name))
    }
}

#[async_trait]
impl StateProvider for InMemoryState {
    async fn item(&self, resource_class: &str, iri: &str) -> Result<Option<Value>, GraphQLError> {
        Ok(self
            .items
            .read()
            .await
            .get(resource_class)
            .and_then(|items| items.get(iri))
            .cloned())
    }

    async fn find(&self, iri: &str) -> Result<Option<Value>, GraphQLError> {
        Ok(self
            .items
            .read()
            .await
            .values()
            .find_map(|items| items.get(iri))
            .cloned())
    }

    async fn collection(&self, resource_class: &str) -> Result<Vec<Value>, GraphQLError> {
        Ok(self
            .items
            .read()
            .await
            .get(resource_class)
            .map(|items| items.values().cloned().collect())
            .unwrap_or_default())
    }
}

#[async_trait]
impl StateProcessor for InMemoryState {
    async fn persist(&self, resource_class: &str, mut data: Map<String, Value>) -> Result<Value, GraphQLError> {
        let mut items = self.items.write().await;
        let class_items = items.entry(resource_class.to_string()).or_default();

        let iri = match data.get("id").and_then(Value::as_str) {
            Some(iri) => iri.to_string(),
            None => {
                let path = Self::collection_path(resource_class);
                let iri = loop {
                    let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
                    let candidate = format!("{path}/{id}");
                    if !class_items.contains_key(&candidate) {
                        break candidate;
                    }
                };
                data.insert("id".into(), Value::String(iri.clone()));
                iri
            }
        };

        let item = tag_item(Value::Object(data), resource_class);
        debug!(resource_class, iri = %iri, "Persisting item");
        class_items.insert(iri, item.clone());
        Ok(item)
    }

    async fn remove(&self, resource_class: &str, iri: &str) -> Result<Option<Value>, GraphQLError> {
        debug!(resource_class, iri, "Removing item");
        Ok(self
            .items
            .write()
            .await
            .get_mut(resource_class)
            .and_then(|items| items.shift_remove(iri)))
    }
}
