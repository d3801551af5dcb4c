//! Field resolvers attached by the fields builder.
//!
//! The builders never resolve data themselves. They ask one of four
//! [`ResolverFactory`] instances for an opaque [`FieldResolver`] and store it
//! on the field definition:
//!
//! - `item`: single items, nested relations and the `node` query
//! - `collection`: collection queries and nested collections
//! - `item_mutation`: root mutation fields
//! - `item_subscription`: root subscription fields
//!
//! [`ResolverFactories::with_state`] wires the default implementations
//! against an [`InMemoryState`] (or any other state provider/processor pair).

mod collection;
mod cursor;
mod item;
mod mutation;
mod state;
mod subscription;

use std::sync::Arc;

use apigen_metadata::{MetadataProvider, Operation};
use async_graphql::Value;
use async_trait::async_trait;
use serde_json::Map;

use crate::error::GraphQLError;
use crate::pagination::PaginationPolicy;

pub use collection::CollectionResolverFactory;
pub use item::ItemResolverFactory;
pub use mutation::ItemMutationResolverFactory;
pub use state::{InMemoryState, StateProcessor, StateProvider};
pub use subscription::ItemSubscriptionResolverFactory;

/// Key tagging an item with the class it was loaded as.
pub const ITEM_RESOURCE_CLASS_KEY: &str = "#itemResourceClass";

/// Inputs handed to a resolver on each invocation.
#[derive(Debug, Clone, Default)]
pub struct ResolveInfo {
    /// Name of the field being resolved.
    pub field_name: String,
    /// Parent value, `None` for root fields.
    pub source: Option<serde_json::Value>,
    /// Field arguments.
    pub args: Map<String, serde_json::Value>,
}

impl ResolveInfo {
    /// Parent object, if the field is nested.
    pub fn parent(&self) -> Option<&Map<String, serde_json::Value>> {
        self.source.as_ref().and_then(serde_json::Value::as_object)
    }

    /// Value the parent holds under the field name.
    pub fn parent_value(&self) -> Option<&serde_json::Value> {
        self.parent().and_then(|parent| parent.get(&self.field_name))
    }
}

/// Resolves one field.
#[async_trait]
pub trait FieldResolver: Send + Sync {
    async fn resolve(&self, info: ResolveInfo) -> Result<serde_json::Value, GraphQLError>;
}

pub type DynFieldResolver = Arc<dyn FieldResolver>;

/// Creates resolvers for fields of a resource class.
pub trait ResolverFactory: Send + Sync {
    fn create(
        &self,
        resource_class: Option<&str>,
        root_class: Option<&str>,
        operation: Option<&Operation>,
    ) -> DynFieldResolver;
}

/// The four factories consulted by the fields builder.
#[derive(Clone)]
pub struct ResolverFactories {
    pub item: Arc<dyn ResolverFactory>,
    pub collection: Arc<dyn ResolverFactory>,
    pub item_mutation: Arc<dyn ResolverFactory>,
    pub item_subscription: Arc<dyn ResolverFactory>,
}

impl ResolverFactories {
    /// Default factories reading and writing `state`.
    pub fn with_state<S>(
        state: Arc<S>,
        metadata: Arc<dyn MetadataProvider>,
        pagination: Arc<dyn PaginationPolicy>,
        mercure_hub_url: Option<String>,
    ) -> Self
    where
        S: StateProvider + StateProcessor + 'static,
    {
        let provider: Arc<dyn StateProvider> = state.clone();
        let processor: Arc<dyn StateProcessor> = state;
        Self {
            item: Arc::new(ItemResolverFactory::new(
                Arc::clone(&provider),
                Arc::clone(&metadata),
            )),
            collection: Arc::new(CollectionResolverFactory::new(
                Arc::clone(&provider),
                metadata,
                pagination,
            )),
            item_mutation: Arc::new(ItemMutationResolverFactory::new(
                Arc::clone(&provider),
                processor,
            )),
            item_subscription: Arc::new(ItemSubscriptionResolverFactory::new(
                provider,
                mercure_hub_url,
            )),
        }
    }
}

impl std::fmt::Debug for ResolverFactories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverFactories").finish_non_exhaustive()
    }
}

/// Tags `item` with the class it belongs to unless already tagged.
pub(crate) fn tag_item(mut item: serde_json::Value, resource_class: &str) -> serde_json::Value {
    if let Some(object) = item.as_object_mut() {
        object
            .entry(ITEM_RESOURCE_CLASS_KEY)
            .or_insert_with(|| serde_json::Value::String(resource_class.to_string()));
    }
    item
}

/// Convert a serde_json::Value to async_graphql::Value.
pub(crate) fn json_to_graphql_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                Value::Number(u.into())
            } else if let Some(f) = n.as_f64() {
                Value::Number(
                    async_graphql_value::Number::from_f64(f)
                        .unwrap_or_else(|| async_graphql_value::Number::from(0)),
                )
            } else {
                Value::Null
            }
        }
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(arr) => {
            Value::List(arr.into_iter().map(json_to_graphql_value).collect())
        }
        serde_json::Value::Object(obj) => Value::Object(
            obj.into_iter()
                .map(|(k, v)| (async_graphql_value::Name::new(k), json_to_graphql_value(v)))
                .collect(),
        ),
    }
}

/// Convert an async_graphql::Value back to JSON. Enum values become strings.
pub(crate) fn graphql_value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => serde_json::Value::Number(n.clone()),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Enum(name) => serde_json::Value::String(name.to_string()),
        Value::Binary(bytes) => serde_json::Value::Array(
            bytes.iter().map(|b| serde_json::Value::from(*b)).collect(),
        ),
        Value::List(items) => {
            serde_json::Value::Array(items.iter().map(graphql_value_to_json).collect())
        }
        Value::Object(obj) => serde_json::Value::Object(
            obj.iter()
                .map(|(k, v)| (k.to_string(), graphql_value_to_json(v)))
                .collect(),
        ),
    }
}
