//! Collection resolver.
//!
//! Loads the items of a collection field, applies equality filters and
//! shapes the result the way the field type expects: a cursor connection,
//! a page connection, or a plain list when pagination is disabled.

use std::sync::Arc;

use apigen_metadata::{MetadataProvider, Operation, PaginationType};
use async_trait::async_trait;
use serde_json::{Map, Value, json};
use tracing::debug;

use super::{DynFieldResolver, FieldResolver, ResolveInfo, ResolverFactory, StateProvider, cursor, tag_item};
use crate::error::GraphQLError;
use crate::pagination::PaginationPolicy;

const CURSOR_ARGS: [&str; 4] = ["first", "last", "before", "after"];

pub struct CollectionResolverFactory {
    provider: Arc<dyn StateProvider>,
    metadata: Arc<dyn MetadataProvider>,
    pagination: Arc<dyn PaginationPolicy>,
}

impl CollectionResolverFactory {
    pub fn new(
        provider: Arc<dyn StateProvider>,
        metadata: Arc<dyn MetadataProvider>,
        pagination: Arc<dyn PaginationPolicy>,
    ) -> Self {
        Self {
            provider,
            metadata,
            pagination,
        }
    }
}

impl ResolverFactory for CollectionResolverFactory {
    fn create(
        &self,
        resource_class: Option<&str>,
        _root_class: Option<&str>,
        operation: Option<&Operation>,
    ) -> DynFieldResolver {
        let resource_class = resource_class.map(str::to_string);
        let is_resource = resource_class
            .as_deref()
            .is_some_and(|class| self.metadata.is_resource_class(class));
        let pagination = operation
            .filter(|op| {
                is_resource
                    && resource_class.as_deref() == Some(op.class.as_str())
                    && self.pagination.is_enabled(op)
            })
            .map(|op| PageSettings {
                pagination_type: self.pagination.pagination_type(op),
                page_parameter_name: self.pagination.options().page_parameter_name,
                items_per_page_parameter_name: self.pagination.options().items_per_page_parameter_name,
                client_items_per_page: self.pagination.client_items_per_page(op),
                items_per_page: self.pagination.options().items_per_page,
            });

        Arc::new(CollectionResolver {
            provider: Arc::clone(&self.provider),
            resource_class,
            pagination,
        })
    }
}

#[derive(Debug, Clone)]
struct PageSettings {
    pagination_type: PaginationType,
    page_parameter_name: String,
    items_per_page_parameter_name: String,
    client_items_per_page: bool,
    items_per_page: usize,
}

impl PageSettings {
    fn is_pagination_arg(&self, name: &str) -> bool {
        match self.pagination_type {
            PaginationType::Cursor => CURSOR_ARGS.contains(&name),
            PaginationType::Page => {
                name == self.page_parameter_name || name == self.items_per_page_parameter_name
            }
        }
    }
}

struct CollectionResolver {
    provider: Arc<dyn StateProvider>,
    resource_class: Option<String>,
    pagination: Option<PageSettings>,
}

impl CollectionResolver {
    async fn load(&self, info: &ResolveInfo) -> Result<Vec<Value>, GraphQLError> {
        if info.parent().is_none() {
            return match &self.resource_class {
                Some(class) => self.provider.collection(class).await,
                None => Ok(Vec::new()),
            };
        }

        let Some(Value::Array(entries)) = info.parent_value() else {
            return Ok(Vec::new());
        };

        let mut items = Vec::with_capacity(entries.len());
        for entry in entries {
            let item = match (entry, &self.resource_class) {
                (Value::String(iri), Some(class)) => self.provider.item(class, iri).await?,
                (Value::String(iri), None) => self.provider.find(iri).await?,
                (embedded, _) => Some(embedded.clone()),
            };
            items.extend(item);
        }
        Ok(items)
    }

    fn matches_filters(&self, item: &Value, args: &Map<String, Value>) -> bool {
        args.iter()
            .filter(|(name, _)| {
                !self
                    .pagination
                    .as_ref()
                    .is_some_and(|settings| settings.is_pagination_arg(name))
            })
            .all(|(name, expected)| match expected {
                Value::Null | Value::Object(_) => true,
                // Ordering and other structured filters.
                Value::Array(candidates) if candidates.iter().any(Value::is_object) => true,
                Value::Array(candidates) => {
                    let property = name.strip_suffix("_list").unwrap_or(name);
                    candidates
                        .iter()
                        .any(|candidate| scalar_eq(item.get(property), candidate))
                }
                scalar => scalar_eq(item.get(name.as_str()), scalar),
            })
    }
}

/// Loose scalar equality: numbers and booleans also match their string form.
fn scalar_eq(actual: Option<&Value>, expected: &Value) -> bool {
    match (actual, expected) {
        (Some(actual), expected) if actual == expected => true,
        (Some(Value::String(actual)), expected) => expected.to_string() == *actual,
        (Some(actual), Value::String(expected)) => actual.to_string() == *expected,
        _ => false,
    }
}

fn usize_arg(args: &Map<String, Value>, name: &str) -> Result<Option<usize>, GraphQLError> {
    match args.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| {
                GraphQLError::invalid_argument(format!("Argument \"{name}\" must be a non-negative integer"))
            }),
    }
}

fn cursor_arg(args: &Map<String, Value>, name: &str) -> Result<Option<usize>, GraphQLError> {
    args.get(name)
        .and_then(Value::as_str)
        .map(cursor::decode)
        .transpose()
}

fn cursor_connection(
    items: Vec<Value>,
    args: &Map<String, Value>,
    items_per_page: usize,
) -> Result<Value, GraphQLError> {
    let total = items.len();
    let first = usize_arg(args, "first")?;
    let last = usize_arg(args, "last")?;

    let mut offset = cursor_arg(args, "after")?.map_or(0, |after| after.saturating_add(1));
    let mut end = cursor_arg(args, "before")?.unwrap_or(total).min(total);
    if let Some(first) = first {
        end = end.min(offset.saturating_add(first));
    }
    if let Some(last) = last {
        offset = offset.max(end.saturating_sub(last));
    }
    if first.is_none() && last.is_none() {
        end = end.min(offset.saturating_add(items_per_page));
    }
    let offset = offset.min(end);

    let edges: Vec<Value> = items
        .into_iter()
        .enumerate()
        .skip(offset)
        .take(end - offset)
        .map(|(index, node)| json!({"node": node, "cursor": cursor::encode(index)}))
        .collect();

    let start_cursor = edges.first().map_or(Value::Null, |edge| edge["cursor"].clone());
    let end_cursor = edges.last().map_or(Value::Null, |edge| edge["cursor"].clone());

    Ok(json!({
        "edges": edges,
        "pageInfo": {
            "startCursor": start_cursor,
            "endCursor": end_cursor,
            "hasNextPage": end < total,
            "hasPreviousPage": offset > 0,
        },
        "totalCount": total,
    }))
}

fn page_connection(
    items: Vec<Value>,
    args: &Map<String, Value>,
    settings: &PageSettings,
) -> Result<Value, GraphQLError> {
    let total = items.len();
    let page = usize_arg(args, &settings.page_parameter_name)?.unwrap_or(1);
    if page == 0 {
        return Err(GraphQLError::invalid_argument("Page should not be less than 1"));
    }
    let items_per_page = if settings.client_items_per_page {
        usize_arg(args, &settings.items_per_page_parameter_name)?.unwrap_or(settings.items_per_page)
    } else {
        settings.items_per_page
    };
    if items_per_page == 0 {
        return Err(GraphQLError::invalid_argument("Items per page should be greater than 0"));
    }

    let last_page = total.div_ceil(items_per_page).max(1);
    let collection: Vec<Value> = items
        .into_iter()
        .skip((page - 1) * items_per_page)
        .take(items_per_page)
        .collect();

    Ok(json!({
        "collection": collection,
        "paginationInfo": {
            "itemsPerPage": items_per_page,
            "lastPage": last_page,
            "totalCount": total,
            "hasNextPage": page < last_page,
        },
    }))
}

#[async_trait]
impl FieldResolver for CollectionResolver {
    async fn resolve(&self, info: ResolveInfo) -> Result<Value, GraphQLError> {
        let items: Vec<Value> = self
            .load(&info)
            .await?
            .into_iter()
            .filter(|item| self.matches_filters(item, &info.args))
            .map(|item| match &self.resource_class {
                Some(class) => tag_item(item, class),
                None => item,
            })
            .collect();

        debug!(field = %info.field_name, count = items.len(), "Resolved collection");

        match &self.pagination {
            None => Ok(Value::Array(items)),
            Some(settings) => match settings.pagination_type {
                PaginationType::Cursor => cursor_connection(items, &info.args, settings.items_per_page),
                PaginationType::Page => page_connection(items, &info.args, settings),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use apigen_metadata::{MemoryMetadataProvider, OperationKind};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::PaginationConfig;
    use crate::pagination::Pagination;
    use crate::resolvers::InMemoryState;

    const BOOK: &str = "App\\Entity\\Book";

    async fn factory(config: PaginationConfig) -> CollectionResolverFactory {
        let state = InMemoryState::new();
        for (n, title) in ["Dune", "Emma", "Ulysses", "Dune"].iter().enumerate() {
            state
                .insert(BOOK, json!({"id": format!("/books/{}", n + 1), "title": title}))
                .await
                .unwrap();
        }
        let metadata = MemoryMetadataProvider::from_toml_str(
            r#"
            [[resources]]
            class = "App\\Entity\\Book"
            "#,
        )
        .unwrap();
        CollectionResolverFactory::new(
            Arc::new(state),
            Arc::new(metadata),
            Arc::new(Pagination::new(config)),
        )
    }

    fn collection_operation() -> Operation {
        Operation::new(OperationKind::QueryCollection, "collection_query", BOOK, "Book")
    }

    fn root(args: Value) -> ResolveInfo {
        ResolveInfo {
            field_name: "books".into(),
            source: None,
            args: args.as_object().cloned().unwrap_or_default(),
        }
    }

    #[tokio::test]
    async fn test_cursor_first_page() {
        let resolver = factory(PaginationConfig::default())
            .await
            .create(Some(BOOK), Some(BOOK), Some(&collection_operation()));
        let result = resolver.resolve(root(json!({"first": 2}))).await.unwrap();

        assert_eq!(result["totalCount"], json!(4));
        assert_eq!(result["edges"].as_array().unwrap().len(), 2);
        assert_eq!(result["edges"][0]["cursor"], json!("MA=="));
        assert_eq!(result["pageInfo"]["endCursor"], json!("MQ=="));
        assert_eq!(result["pageInfo"]["hasNextPage"], json!(true));
        assert_eq!(result["pageInfo"]["hasPreviousPage"], json!(false));
    }

    #[tokio::test]
    async fn test_cursor_after() {
        let resolver = factory(PaginationConfig::default())
            .await
            .create(Some(BOOK), Some(BOOK), Some(&collection_operation()));
        let result = resolver
            .resolve(root(json!({"first": 2, "after": "MQ=="})))
            .await
            .unwrap();

        assert_eq!(result["edges"][0]["node"]["title"], json!("Ulysses"));
        assert_eq!(result["pageInfo"]["startCursor"], json!("Mg=="));
        assert_eq!(result["pageInfo"]["hasNextPage"], json!(false));
        assert_eq!(result["pageInfo"]["hasPreviousPage"], json!(true));
    }

    #[tokio::test]
    async fn test_cursor_last() {
        let resolver = factory(PaginationConfig::default())
            .await
            .create(Some(BOOK), Some(BOOK), Some(&collection_operation()));
        let result = resolver.resolve(root(json!({"last": 1}))).await.unwrap();

        assert_eq!(result["edges"].as_array().unwrap().len(), 1);
        assert_eq!(result["edges"][0]["node"]["id"], json!("/books/4"));
    }

    #[tokio::test]
    async fn test_cursor_past_the_end() {
        let resolver = factory(PaginationConfig::default())
            .await
            .create(Some(BOOK), Some(BOOK), Some(&collection_operation()));

        for args in [
            json!({"after": cursor::encode(usize::MAX)}),
            json!({"after": cursor::encode(usize::MAX - 1), "first": 5}),
        ] {
            let result = resolver.resolve(root(args)).await.unwrap();
            assert_eq!(result["edges"], json!([]));
            assert_eq!(result["totalCount"], json!(4));
            assert_eq!(result["pageInfo"]["hasNextPage"], json!(false));
        }
    }

    #[tokio::test]
    async fn test_invalid_cursor() {
        let resolver = factory(PaginationConfig::default())
            .await
            .create(Some(BOOK), Some(BOOK), Some(&collection_operation()));
        let err = resolver
            .resolve(root(json!({"after": "%%%"})))
            .await
            .unwrap_err();
        assert!(matches!(err, GraphQLError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_page_pagination() {
        let config = PaginationConfig {
            pagination_type: PaginationType::Page,
            items_per_page: 3,
            ..PaginationConfig::default()
        };
        let resolver = factory(config)
            .await
            .create(Some(BOOK), Some(BOOK), Some(&collection_operation()));
        let result = resolver.resolve(root(json!({"page": 2}))).await.unwrap();

        assert_eq!(result["collection"].as_array().unwrap().len(), 1);
        assert_eq!(
            result["paginationInfo"],
            json!({"itemsPerPage": 3, "lastPage": 2, "totalCount": 4, "hasNextPage": false})
        );
    }

    #[tokio::test]
    async fn test_client_items_per_page() {
        let config = PaginationConfig {
            pagination_type: PaginationType::Page,
            client_items_per_page: true,
            ..PaginationConfig::default()
        };
        let resolver = factory(config)
            .await
            .create(Some(BOOK), Some(BOOK), Some(&collection_operation()));
        let result = resolver
            .resolve(root(json!({"itemsPerPage": 1})))
            .await
            .unwrap();

        assert_eq!(result["paginationInfo"]["lastPage"], json!(4));
        assert_eq!(result["paginationInfo"]["hasNextPage"], json!(true));
    }

    #[tokio::test]
    async fn test_disabled_pagination_returns_list() {
        let mut operation = collection_operation();
        operation.pagination_enabled = Some(false);
        let resolver = factory(PaginationConfig::default())
            .await
            .create(Some(BOOK), Some(BOOK), Some(&operation));
        let result = resolver.resolve(root(json!({"title": "Dune"}))).await.unwrap();

        assert_eq!(result.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_list_filter() {
        let mut operation = collection_operation();
        operation.pagination_enabled = Some(false);
        let resolver = factory(PaginationConfig::default())
            .await
            .create(Some(BOOK), Some(BOOK), Some(&operation));
        let result = resolver
            .resolve(root(json!({"title_list": ["Emma", "Ulysses"]})))
            .await
            .unwrap();

        assert_eq!(result.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_plain_class_collection_is_a_list() {
        let resolver = factory(PaginationConfig::default())
            .await
            .create(Some("App\\Dto\\Tag"), Some(BOOK), Some(&collection_operation()));
        let result = resolver
            .resolve(ResolveInfo {
                field_name: "tags".into(),
                source: Some(json!({"tags": [{"name": "classic"}, {"name": "epic"}]})),
                args: Map::new(),
            })
            .await
            .unwrap();

        assert_eq!(result.as_array().unwrap().len(), 2);
        assert_eq!(result[1]["name"], json!("epic"));
    }

    #[tokio::test]
    async fn test_nested_collection_from_iris() {
        let mut operation = collection_operation();
        operation.pagination_enabled = Some(false);
        let resolver = factory(PaginationConfig::default())
            .await
            .create(Some(BOOK), Some("App\\Entity\\Author"), Some(&operation));
        let result = resolver
            .resolve(ResolveInfo {
                field_name: "books".into(),
                source: Some(json!({"books": ["/books/2", "/books/404"]})),
                args: Map::new(),
            })
            .await
            .unwrap();

        assert_eq!(result.as_array().unwrap().len(), 1);
        assert_eq!(result[0]["title"], json!("Emma"));
    }
}
