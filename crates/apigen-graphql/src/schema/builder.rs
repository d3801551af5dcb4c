//! Assembles the root types from resource metadata.

use std::rc::Rc;

use apigen_metadata::OperationKind;
use tracing::{debug, info};

use super::fields_builder::FieldsBuilder;
use crate::error::GraphQLError;
use crate::types::{FieldMap, SchemaType, TypesContainer};

/// Configuration for schema execution limits.
#[derive(Debug, Clone)]
pub struct SchemaBuilderConfig {
    /// Maximum query depth allowed.
    pub max_depth: usize,

    /// Maximum query complexity allowed.
    pub max_complexity: usize,

    /// Whether to enable introspection queries.
    pub introspection_enabled: bool,
}

impl Default for SchemaBuilderConfig {
    fn default() -> Self {
        Self {
            max_depth: 15,
            max_complexity: 500,
            introspection_enabled: true,
        }
    }
}

/// A custom scalar registered before any resource is processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarDefinition {
    pub name: String,
    pub description: Option<String>,
}

impl ScalarDefinition {
    pub fn new(name: impl Into<String>, description: Option<&str>) -> Self {
        Self {
            name: name.into(),
            description: description.map(str::to_string),
        }
    }

    /// `Iterable` and `Upload`.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("Iterable", Some("The `Iterable` scalar type represents an array or a Traversable with any kind of data.")),
            Self::new("Upload", Some("The `Upload` type represents a file to be uploaded in the same HTTP request as specified by [graphql-multipart-request-spec](https://github.com/jaydenseric/graphql-multipart-request-spec).")),
        ]
    }
}

/// Root types of a built schema plus the types they reference.
pub struct SchemaDefinition {
    pub query: FieldMap,
    pub mutation: Option<FieldMap>,
    pub subscription: Option<FieldMap>,
    pub(crate) types: Rc<TypesContainer>,
    /// Lazy field thunks resolve through the fields builder, which must
    /// outlive them.
    pub(crate) fields_builder: Rc<FieldsBuilder>,
}

impl SchemaDefinition {
    pub fn types(&self) -> &TypesContainer {
        &self.types
    }

    /// Named type registered as `name`, with one wrapper removed.
    pub fn type_loader(&self, name: &str) -> Option<SchemaType> {
        self.types.get(name).ok().map(|ty| ty.unwrap_once().clone())
    }
}

impl std::fmt::Debug for SchemaDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaDefinition")
            .field("query", &self.query.keys().collect::<Vec<_>>())
            .field("mutation", &self.mutation.as_ref().map(|m| m.keys().collect::<Vec<_>>()))
            .field(
                "subscription",
                &self.subscription.as_ref().map(|s| s.keys().collect::<Vec<_>>()),
            )
            .field("types", &self.types)
            .finish()
    }
}

/// Builds the query, mutation and subscription roots.
pub struct SchemaBuilder {
    fields_builder: Rc<FieldsBuilder>,
    extra_types: Vec<ScalarDefinition>,
}

impl SchemaBuilder {
    pub fn new(fields_builder: Rc<FieldsBuilder>, extra_types: Vec<ScalarDefinition>) -> Self {
        Self {
            fields_builder,
            extra_types,
        }
    }

    /// Walks every resource operation and collects the root fields.
    ///
    /// Root fields are merged in discovery order; the first field of a name
    /// wins. Mutation and subscription roots exist only when non-empty.
    pub fn get_schema(self) -> Result<SchemaDefinition, GraphQLError> {
        let types = Rc::clone(self.fields_builder.types());
        for scalar in &self.extra_types {
            types.set(
                scalar.name.clone(),
                SchemaType::scalar(scalar.name.clone(), scalar.description.clone()),
            );
        }

        let mut query = FieldMap::new();
        query.insert("node".into(), self.fields_builder.get_node_query_fields()?);
        let mut mutation = FieldMap::new();
        let mut subscription = FieldMap::new();

        let metadata = &self.fields_builder.services().metadata;
        for resource_class in metadata.resource_names() {
            let resource = metadata.resource_metadata(&resource_class)?;
            let Some(operations) = &resource.graphql_operations else {
                continue;
            };

            for operation in operations.values() {
                let (target, fields) = match operation.kind {
                    OperationKind::QueryCollection => (
                        &mut query,
                        self.fields_builder
                            .get_collection_query_fields(&resource_class, operation)?,
                    ),
                    OperationKind::Query => (
                        &mut query,
                        self.fields_builder
                            .get_item_query_fields(&resource_class, operation)?,
                    ),
                    OperationKind::Subscription => {
                        if !operation.mercure {
                            continue;
                        }
                        (
                            &mut subscription,
                            self.fields_builder
                                .get_subscription_fields(&resource_class, operation)?,
                        )
                    }
                    OperationKind::Mutation => (
                        &mut mutation,
                        self.fields_builder
                            .get_mutation_fields(&resource_class, operation)?,
                    ),
                };
                merge_first_wins(target, fields);
            }
            debug!(resource_class = %resource_class, "Collected root fields");
        }

        info!(
            queries = query.len(),
            mutations = mutation.len(),
            subscriptions = subscription.len(),
            types = types.len(),
            "Built schema definition"
        );

        Ok(SchemaDefinition {
            query,
            mutation: (!mutation.is_empty()).then_some(mutation),
            subscription: (!subscription.is_empty()).then_some(subscription),
            types,
            fields_builder: self.fields_builder,
        })
    }
}

fn merge_first_wins(target: &mut FieldMap, fields: FieldMap) {
    for (name, field) in fields {
        target.entry(name).or_insert(field);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test_support::{bookstore_factory, factory_from_toml};

    fn keys(fields: &FieldMap) -> Vec<&str> {
        fields.keys().map(String::as_str).collect()
    }

    #[test]
    fn test_root_fields_per_operation() {
        let schema = bookstore_factory().build().unwrap();

        assert_eq!(
            keys(&schema.query),
            vec!["node", "book", "books", "author", "authors", "review", "reviews"]
        );
        assert_eq!(
            keys(schema.mutation.as_ref().unwrap()),
            vec!["createBook", "updateBook", "deleteBook"]
        );
        assert_eq!(
            keys(schema.subscription.as_ref().unwrap()),
            vec!["updateBookSubscribe"]
        );
    }

    #[test]
    fn test_root_field_types() {
        let schema = bookstore_factory().build().unwrap();

        assert_eq!(schema.query["node"].ty.to_string(), "Node");
        assert_eq!(schema.query["book"].ty.to_string(), "Book");
        assert_eq!(schema.query["books"].ty.to_string(), "BookCursorConnection");
        assert_eq!(schema.query["authors"].ty.to_string(), "AuthorPageConnection");
        assert_eq!(schema.query["reviews"].ty.to_string(), "[Review]");

        let mutation = schema.mutation.unwrap();
        assert_eq!(mutation["createBook"].ty.to_string(), "createBookPayload");
        assert_eq!(mutation["createBook"].args["input"].ty.to_string(), "createBookInput!");
        assert_eq!(mutation["updateBook"].ty.to_string(), "updateBookPayload");
        assert_eq!(mutation["updateBook"].args["input"].ty.to_string(), "updateBookInput!");

        let subscription = schema.subscription.unwrap();
        assert_eq!(
            subscription["updateBookSubscribe"].ty.to_string(),
            "updateBookSubscriptionPayload"
        );
        assert_eq!(
            subscription["updateBookSubscribe"].args["input"].ty.to_string(),
            "updateBookSubscriptionInput!"
        );
    }

    #[test]
    fn test_default_scalars_are_registered() {
        let schema = bookstore_factory().build().unwrap();
        assert!(schema.types().has("Iterable"));
        assert!(schema.types().has("Upload"));
        assert!(schema.types().has("Node"));
        assert!(schema.type_loader("Book").is_some());
        assert!(schema.type_loader("Missing").is_none());
    }

    #[test]
    fn test_subscriptions_require_mercure() {
        let schema = factory_from_toml(
            r#"
            [[resources]]
            class = "App\\Entity\\Book"

            [[resources.properties]]
            name = "title"
            type = "string"

            [[resources.graphql]]
            kind = "query"

            [[resources.graphql]]
            kind = "subscription"
            name = "update"
            "#,
        )
        .build()
        .unwrap();

        assert_eq!(keys(&schema.query), vec!["node", "book"]);
        assert!(schema.mutation.is_none());
        assert!(schema.subscription.is_none());
    }

    #[test]
    fn test_first_root_field_wins() {
        let schema = factory_from_toml(
            r#"
            [[resources]]
            class = "App\\Entity\\Book"

            [[resources.graphql]]
            kind = "query"
            description = "First."

            [[resources]]
            class = "App\\Legacy\\Book"

            [[resources.graphql]]
            kind = "query"
            description = "Second."
            "#,
        )
        .build()
        .unwrap();

        assert_eq!(keys(&schema.query), vec!["node", "book"]);
        assert_eq!(schema.query["book"].description.as_deref(), Some("First."));
    }

    #[test]
    fn test_resources_without_graphql_are_skipped() {
        let schema = factory_from_toml(
            r#"
            [[resources]]
            class = "App\\Entity\\Publisher"
            "#,
        )
        .build()
        .unwrap();

        assert_eq!(keys(&schema.query), vec!["node"]);
    }
}
