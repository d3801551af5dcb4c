//! Root subscription resolver.
//!
//! Resolves the subscribed item once and advertises the mercure topic
//! clients listen on for later updates.

use std::sync::Arc;

use apigen_metadata::{Operation, lcfirst};
use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::warn;

use super::{DynFieldResolver, FieldResolver, ResolveInfo, ResolverFactory, StateProvider, tag_item};
use crate::error::GraphQLError;

const CLIENT_SUBSCRIPTION_ID: &str = "clientSubscriptionId";

pub struct ItemSubscriptionResolverFactory {
    provider: Arc<dyn StateProvider>,
    mercure_hub_url: Option<String>,
}

impl ItemSubscriptionResolverFactory {
    pub fn new(provider: Arc<dyn StateProvider>, mercure_hub_url: Option<String>) -> Self {
        Self {
            provider,
            mercure_hub_url,
        }
    }
}

impl ResolverFactory for ItemSubscriptionResolverFactory {
    fn create(
        &self,
        resource_class: Option<&str>,
        _root_class: Option<&str>,
        operation: Option<&Operation>,
    ) -> DynFieldResolver {
        Arc::new(ItemSubscriptionResolver {
            provider: Arc::clone(&self.provider),
            mercure_hub_url: self.mercure_hub_url.clone(),
            resource_class: resource_class.map(str::to_string),
            operation: operation.cloned(),
        })
    }
}

struct ItemSubscriptionResolver {
    provider: Arc<dyn StateProvider>,
    mercure_hub_url: Option<String>,
    resource_class: Option<String>,
    operation: Option<Operation>,
}

impl ItemSubscriptionResolver {
    fn mercure_url(&self, iri: &str) -> Value {
        match &self.mercure_hub_url {
            Some(hub) => Value::String(format!("{hub}?topic={}", urlencoding::encode(iri))),
            None => Value::Null,
        }
    }
}

#[async_trait]
impl FieldResolver for ItemSubscriptionResolver {
    async fn resolve(&self, info: ResolveInfo) -> Result<Value, GraphQLError> {
        let operation = self
            .operation
            .as_ref()
            .ok_or_else(|| GraphQLError::logic("subscription resolver created without an operation"))?;
        let class = self.resource_class.as_deref().unwrap_or(&operation.class);

        let input = info
            .args
            .get("input")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        let iri = input
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| GraphQLError::invalid_argument("Subscriptions require an \"id\""))?;

        let item = self
            .provider
            .item(class, iri)
            .await?
            .ok_or_else(|| {
                warn!(resource_class = class, iri, "Subscribed item not found");
                GraphQLError::NotFound { iri: iri.to_string() }
            })?;

        let mut payload = Map::new();
        payload.insert(lcfirst(&operation.short_name), tag_item(item, class));
        payload.insert(
            CLIENT_SUBSCRIPTION_ID.to_string(),
            input.get(CLIENT_SUBSCRIPTION_ID).cloned().unwrap_or(Value::Null),
        );
        if operation.mercure {
            payload.insert("mercureUrl".into(), self.mercure_url(iri));
        }
        Ok(Value::Object(payload))
    }
}
