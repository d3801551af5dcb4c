//! Resource and operation descriptors.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::MetadataError;

/// Name of the default item query operation.
pub const ITEM_QUERY: &str = "item_query";

/// Name of the default collection query operation.
pub const COLLECTION_QUERY: &str = "collection_query";

/// Suffix of subscription keys.
pub const SUBSCRIPTION_KEY_SUFFIX: &str = "_subscription";

/// Kind of a GraphQL operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    #[default]
    Query,
    QueryCollection,
    Mutation,
    Subscription,
}

impl OperationKind {
    /// Name given to an operation of this kind when none is declared.
    pub fn default_name(&self) -> Option<&'static str> {
        match self {
            Self::Query => Some(ITEM_QUERY),
            Self::QueryCollection => Some(COLLECTION_QUERY),
            Self::Mutation | Self::Subscription => None,
        }
    }
}

/// Pagination style of a collection operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaginationType {
    #[default]
    Cursor,
    Page,
}

impl PaginationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cursor => "cursor",
            Self::Page => "page",
        }
    }
}

/// A custom argument declared on an operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArgumentSpec {
    /// GraphQL type language, for example `"[String!]!"`.
    #[serde(rename = "type", default)]
    pub ty: Option<String>,

    #[serde(default)]
    pub description: Option<String>,
}

impl ArgumentSpec {
    pub fn new(ty: impl Into<String>) -> Self {
        Self {
            ty: Some(ty.into()),
            description: None,
        }
    }
}

/// A declared operation parameter.
///
/// Keys containing `:property` are expanded from the description of
/// `filter`; any other key becomes a plain string argument.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(default)]
    pub filter: Option<String>,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub description: Option<String>,
}

/// Input or output class override.
///
/// `class: None` is an explicit null class: the operation has no body in
/// that direction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IoMetadata {
    pub class: Option<String>,
}

impl IoMetadata {
    pub fn class(class: impl Into<String>) -> Self {
        Self {
            class: Some(class.into()),
        }
    }

    pub fn disabled() -> Self {
        Self { class: None }
    }
}

/// One GraphQL operation exposed by a resource.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Operation {
    pub kind: OperationKind,
    pub name: String,
    pub class: String,
    pub short_name: String,
    pub description: Option<String>,
    pub normalization_context: Option<Map<String, Value>>,
    pub denormalization_context: Option<Map<String, Value>>,
    pub args: Option<IndexMap<String, ArgumentSpec>>,
    pub extra_args: Option<IndexMap<String, ArgumentSpec>>,
    pub parameters: IndexMap<String, Parameter>,
    pub nested: bool,
    pub deprecation_reason: Option<String>,
    pub mercure: bool,
    pub filters: Vec<String>,
    pub resolver: Option<String>,
    pub input: Option<IoMetadata>,
    pub output: Option<IoMetadata>,
    pub pagination_enabled: Option<bool>,
    pub pagination_type: Option<PaginationType>,
    pub pagination_client_items_per_page: Option<bool>,
}

impl Operation {
    /// Creates an operation of `kind` named `name` on `class`.
    pub fn new(
        kind: OperationKind,
        name: impl Into<String>,
        class: impl Into<String>,
        short_name: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            class: class.into(),
            short_name: short_name.into(),
            ..Self::default()
        }
    }

    /// Key of the operation within its resource.
    ///
    /// Subscriptions are keyed `<name>_subscription` so they can share a
    /// name with the mutation they follow.
    pub fn key(&self) -> String {
        if self.is_subscription() {
            format!("{}{SUBSCRIPTION_KEY_SUFFIX}", self.name)
        } else {
            self.name.clone()
        }
    }

    pub fn is_query(&self) -> bool {
        matches!(self.kind, OperationKind::Query | OperationKind::QueryCollection)
    }

    pub fn is_collection(&self) -> bool {
        self.kind == OperationKind::QueryCollection
    }

    pub fn is_mutation(&self) -> bool {
        self.kind == OperationKind::Mutation
    }

    pub fn is_subscription(&self) -> bool {
        self.kind == OperationKind::Subscription
    }

    /// Serialization groups of the normalization context.
    pub fn normalization_groups(&self) -> Option<Vec<String>> {
        self.normalization_context.as_ref().and_then(context_groups)
    }

    /// Serialization groups of the denormalization context.
    pub fn denormalization_groups(&self) -> Option<Vec<String>> {
        self.denormalization_context.as_ref().and_then(context_groups)
    }
}

fn context_groups(context: &Map<String, Value>) -> Option<Vec<String>> {
    match context.get("groups")? {
        Value::String(group) => Some(vec![group.clone()]),
        Value::Array(groups) => Some(
            groups
                .iter()
                .filter_map(|g| g.as_str().map(str::to_string))
                .collect(),
        ),
        _ => None,
    }
}

/// A logical API resource.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceDescriptor {
    pub class: String,
    pub short_name: String,
    pub description: Option<String>,

    /// GraphQL operations keyed by name. `None` when the resource is not
    /// exposed through GraphQL at all.
    pub graphql_operations: Option<IndexMap<String, Operation>>,
}

impl ResourceDescriptor {
    /// Looks up a GraphQL operation by its [key](Operation::key).
    pub fn operation(&self, name: &str) -> Result<&Operation, MetadataError> {
        self.graphql_operations
            .as_ref()
            .and_then(|operations| operations.get(name))
            .ok_or_else(|| MetadataError::operation_not_found(&self.class, name))
    }

    /// First query that is not backed by a custom resolver.
    pub fn query_operation(&self) -> Option<&Operation> {
        self.graphql_operations
            .as_ref()?
            .values()
            .find(|operation| operation.is_query() && operation.resolver.is_none())
    }

    pub fn has_graphql_operations(&self) -> bool {
        self.graphql_operations.is_some()
    }
}
