//! Integration tests for query, mutation and subscription execution.
//!
//! These tests build the bookstore schema over an in-memory state and run
//! GraphQL documents through the executable schema.

use std::sync::Arc;

use apigen_graphql::{GraphQLConfig, InMemoryState, SchemaFactory};
use apigen_metadata::{MemoryFilterRegistry, MemoryMetadataProvider, MetadataDocument};
use async_graphql::dynamic::Schema;
use futures_util::StreamExt;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

const BOOKSTORE: &str = include_str!("fixtures/bookstore.toml");

// =============================================================================
// Fixtures
// =============================================================================

async fn seeded_state() -> Arc<InMemoryState> {
    let state = InMemoryState::new();
    state
        .insert(
            "App\\Entity\\Author",
            json!({"id": "/authors/1", "name": "Frank Herbert", "books": ["/books/1", "/books/2"]}),
        )
        .await
        .unwrap();
    state
        .insert(
            "App\\Entity\\Review",
            json!({"id": "/reviews/1", "body": "A classic.", "rating": 5}),
        )
        .await
        .unwrap();
    for (n, title, status) in [
        (1, "Dune", "published"),
        (2, "Dune Messiah", "published"),
        (3, "Children of Dune", "draft"),
    ] {
        let mut book = json!({
            "id": format!("/books/{n}"),
            "title": title,
            "isbn": null,
            "status": status,
            "author": "/authors/1",
            "reviews": [],
        });
        if n == 1 {
            book["reviews"] = json!(["/reviews/1"]);
        }
        state.insert("App\\Entity\\Book", book).await.unwrap();
    }
    Arc::new(state)
}

fn factory(config: &GraphQLConfig, state: Arc<InMemoryState>) -> SchemaFactory {
    let document = MetadataDocument::from_toml_str(BOOKSTORE).unwrap();
    let metadata = Arc::new(MemoryMetadataProvider::new(&document).unwrap());
    let filters = Arc::new(MemoryFilterRegistry::from_document(&document));
    SchemaFactory::from_config(config, metadata, filters, state)
}

async fn schema() -> (Schema, Arc<InMemoryState>) {
    let state = seeded_state().await;
    let schema = factory(&GraphQLConfig::default(), Arc::clone(&state))
        .build_executable()
        .unwrap();
    (schema, state)
}

async fn execute(schema: &Schema, query: &str) -> Value {
    let response = schema.execute(query).await;
    assert!(response.errors.is_empty(), "unexpected errors: {:?}", response.errors);
    response.data.into_json().unwrap()
}

// =============================================================================
// Queries
// =============================================================================

#[tokio::test]
async fn test_item_query_with_nested_relations() {
    let (schema, _) = schema().await;
    let data = execute(
        &schema,
        r#"{
            book(id: "/books/1") {
                id
                title
                isbn
                status
                author { id name }
                reviews { body rating }
            }
        }"#,
    )
    .await;

    assert_eq!(
        data,
        json!({
            "book": {
                "id": "/books/1",
                "title": "Dune",
                "isbn": null,
                "status": "PUBLISHED",
                "author": {"id": "/authors/1", "name": "Frank Herbert"},
                "reviews": [{"body": "A classic.", "rating": 5}],
            }
        })
    );
}

#[tokio::test]
async fn test_missing_item_is_null() {
    let (schema, _) = schema().await;
    let data = execute(&schema, r#"{ book(id: "/books/404") { title } }"#).await;
    assert_eq!(data, json!({"book": null}));
}

#[tokio::test]
async fn test_node_query_resolves_concrete_type() {
    let (schema, _) = schema().await;
    let data = execute(
        &schema,
        r#"{
            book: node(id: "/books/2") { id __typename ... on Book { title } }
            author: node(id: "/authors/1") { __typename ... on Author { name } }
        }"#,
    )
    .await;

    assert_eq!(
        data,
        json!({
            "book": {"id": "/books/2", "__typename": "Book", "title": "Dune Messiah"},
            "author": {"__typename": "Author", "name": "Frank Herbert"},
        })
    );
}

#[tokio::test]
async fn test_cursor_pagination() {
    let (schema, _) = schema().await;
    let data = execute(
        &schema,
        r#"{
            books(first: 2) {
                totalCount
                edges { cursor node { title } }
                pageInfo { startCursor endCursor hasNextPage hasPreviousPage }
            }
        }"#,
    )
    .await;

    assert_eq!(
        data,
        json!({
            "books": {
                "totalCount": 3,
                "edges": [
                    {"cursor": "MA==", "node": {"title": "Dune"}},
                    {"cursor": "MQ==", "node": {"title": "Dune Messiah"}},
                ],
                "pageInfo": {
                    "startCursor": "MA==",
                    "endCursor": "MQ==",
                    "hasNextPage": true,
                    "hasPreviousPage": false,
                },
            }
        })
    );

    let data = execute(
        &schema,
        r#"{ books(first: 2, after: "MQ==") { edges { node { title } } pageInfo { hasNextPage } } }"#,
    )
    .await;
    assert_eq!(
        data,
        json!({
            "books": {
                "edges": [{"node": {"title": "Children of Dune"}}],
                "pageInfo": {"hasNextPage": false},
            }
        })
    );
}

#[tokio::test]
async fn test_invalid_cursor_is_an_error() {
    let (schema, _) = schema().await;
    let response = schema.execute(r#"{ books(after: "%%%") { totalCount } }"#).await;
    assert_eq!(response.errors.len(), 1);
    assert!(response.errors[0].message.contains("is invalid"));
}

#[tokio::test]
async fn test_equality_filters() {
    let (schema, _) = schema().await;
    let data = execute(
        &schema,
        r#"{
            one: books(title: "Dune") { totalCount }
            many: books(title_list: ["Dune", "Children of Dune"]) { edges { node { title } } }
        }"#,
    )
    .await;

    assert_eq!(data["one"], json!({"totalCount": 1}));
    assert_eq!(
        data["many"],
        json!({"edges": [
            {"node": {"title": "Dune"}},
            {"node": {"title": "Children of Dune"}},
        ]})
    );
}

#[tokio::test]
async fn test_page_pagination() {
    let (schema, _) = schema().await;
    let data = execute(
        &schema,
        r#"{
            authors(page: 1) {
                collection { name }
                paginationInfo { itemsPerPage lastPage totalCount hasNextPage }
            }
        }"#,
    )
    .await;

    assert_eq!(
        data,
        json!({
            "authors": {
                "collection": [{"name": "Frank Herbert"}],
                "paginationInfo": {
                    "itemsPerPage": 30,
                    "lastPage": 1,
                    "totalCount": 1,
                    "hasNextPage": false,
                },
            }
        })
    );
}

#[tokio::test]
async fn test_nested_paginated_collection() {
    let (schema, _) = schema().await;
    let data = execute(
        &schema,
        r#"{ author(id: "/authors/1") { books(first: 1) { totalCount edges { node { title } } } } }"#,
    )
    .await;

    assert_eq!(
        data,
        json!({
            "author": {
                "books": {"totalCount": 2, "edges": [{"node": {"title": "Dune"}}]}
            }
        })
    );
}

#[tokio::test]
async fn test_unpaginated_collection_is_a_list() {
    let (schema, _) = schema().await;
    let data = execute(&schema, "{ reviews { id rating } }").await;
    assert_eq!(data, json!({"reviews": [{"id": "/reviews/1", "rating": 5}]}));
}

// =============================================================================
// Mutations
// =============================================================================

#[tokio::test]
async fn test_create_mutation() {
    let (schema, state) = schema().await;
    let data = execute(
        &schema,
        r#"mutation {
            createBook(input: {title: "Heretics of Dune", status: DRAFT, clientMutationId: "m-1"}) {
                book { id title status }
                clientMutationId
            }
        }"#,
    )
    .await;

    let payload = &data["createBook"];
    assert_eq!(payload["clientMutationId"], json!("m-1"));
    assert_eq!(payload["book"]["title"], json!("Heretics of Dune"));
    assert_eq!(payload["book"]["status"], json!("DRAFT"));
    let id = payload["book"]["id"].as_str().unwrap();
    assert!(id.starts_with("/books/"), "unexpected IRI {id}");
    assert_eq!(state.len().await, 6);
}

#[tokio::test]
async fn test_update_mutation_merges_input() {
    let (schema, _) = schema().await;
    let data = execute(
        &schema,
        r#"mutation {
            updateBook(input: {id: "/books/3", status: PUBLISHED}) {
                book { title status }
            }
        }"#,
    )
    .await;

    assert_eq!(
        data,
        json!({"updateBook": {"book": {"title": "Children of Dune", "status": "PUBLISHED"}}})
    );
}

#[tokio::test]
async fn test_update_of_missing_item_fails() {
    let (schema, _) = schema().await;
    let response = schema
        .execute(r#"mutation { updateBook(input: {id: "/books/404", title: "X"}) { book { id } } }"#)
        .await;
    assert_eq!(response.errors.len(), 1);
    assert!(response.errors[0].message.contains("/books/404"));
    let extensions = response.errors[0].extensions.as_ref().unwrap();
    assert_eq!(extensions.get("code"), Some(&async_graphql::Value::from("NOT_FOUND")));
}

#[tokio::test]
async fn test_delete_mutation() {
    let (schema, state) = schema().await;
    let data = execute(
        &schema,
        r#"mutation { deleteBook(input: {id: "/books/2", clientMutationId: "d"}) { book { id } clientMutationId } }"#,
    )
    .await;

    assert_eq!(
        data,
        json!({"deleteBook": {"book": {"id": "/books/2"}, "clientMutationId": "d"}})
    );
    assert_eq!(state.len().await, 4);

    let data = execute(&schema, r#"{ book(id: "/books/2") { id } }"#).await;
    assert_eq!(data, json!({"book": null}));
}

// =============================================================================
// Subscriptions
// =============================================================================

#[tokio::test]
async fn test_subscription_payload() {
    let state = seeded_state().await;
    let config = GraphQLConfig {
        mercure_hub_url: Some("https://hub.example.com/.well-known/mercure".into()),
        ..GraphQLConfig::default()
    };
    let schema = factory(&config, state).build_executable().unwrap();

    let mut stream = schema.execute_stream(
        r#"subscription {
            updateBookSubscribe(input: {id: "/books/1", clientSubscriptionId: "s-1"}) {
                book { title }
                clientSubscriptionId
                mercureUrl
            }
        }"#,
    );
    let response = stream.next().await.unwrap();
    assert!(response.errors.is_empty(), "unexpected errors: {:?}", response.errors);

    assert_eq!(
        response.data.into_json().unwrap(),
        json!({
            "updateBookSubscribe": {
                "book": {"title": "Dune"},
                "clientSubscriptionId": "s-1",
                "mercureUrl": "https://hub.example.com/.well-known/mercure?topic=%2Fbooks%2F1",
            }
        })
    );
    assert!(stream.next().await.is_none());
}

// =============================================================================
// Limits
// =============================================================================

#[tokio::test]
async fn test_introspection_can_be_disabled() {
    let state = seeded_state().await;
    let config = GraphQLConfig {
        introspection: false,
        ..GraphQLConfig::default()
    };
    let schema = factory(&config, state).build_executable().unwrap();

    let response = schema.execute("{ __schema { queryType { name } } }").await;
    assert!(!response.errors.is_empty());
}

#[tokio::test]
async fn test_depth_limit() {
    let state = seeded_state().await;
    let config = GraphQLConfig {
        max_depth: 2,
        ..GraphQLConfig::default()
    };
    let schema = factory(&config, state).build_executable().unwrap();

    let response = schema
        .execute(r#"{ book(id: "/books/1") { author { books { totalCount } } } }"#)
        .await;
    assert!(!response.errors.is_empty());
}
