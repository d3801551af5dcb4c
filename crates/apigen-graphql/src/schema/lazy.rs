//! Deferred schema building.
//!
//! `LazySchema` builds the executable schema on first access and caches it
//! until invalidated. The build graph is not `Send`, so each build runs to
//! completion on a blocking thread.

use std::sync::Arc;

use async_graphql::dynamic::Schema;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use super::SchemaFactory;
use crate::error::GraphQLError;

/// State of the lazy schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaState {
    Uninitialized,
    Building,
    Ready,
    Failed,
}

/// Thread-safe lazy schema holder.
///
/// ```ignore
/// let lazy = LazySchema::new(factory);
/// let schema = lazy.get_or_build_wait().await?;
///
/// // metadata changed
/// lazy.invalidate().await;
/// ```
pub struct LazySchema {
    schema: RwLock<Option<Arc<Schema>>>,

    /// Only one build at a time.
    build_lock: Mutex<()>,

    state: RwLock<SchemaState>,

    factory: Arc<SchemaFactory>,

    /// Message of the last failed build.
    last_error: RwLock<Option<String>>,
}

impl LazySchema {
    #[must_use]
    pub fn new(factory: SchemaFactory) -> Self {
        Self {
            schema: RwLock::new(None),
            build_lock: Mutex::new(()),
            state: RwLock::new(SchemaState::Uninitialized),
            factory: Arc::new(factory),
            last_error: RwLock::new(None),
        }
    }

    pub async fn state(&self) -> SchemaState {
        *self.state.read().await
    }

    /// Gets the schema, building it if necessary.
    ///
    /// # Errors
    ///
    /// Returns `GraphQLError::SchemaInitializing` if another build is in
    /// progress and `GraphQLError::SchemaBuildFailed` if the build fails.
    pub async fn get_or_build(&self) -> Result<Arc<Schema>, GraphQLError> {
        if let Some(schema) = self.get().await {
            return Ok(schema);
        }

        if *self.state.read().await == SchemaState::Building {
            return Err(GraphQLError::SchemaInitializing);
        }

        let Ok(_guard) = self.build_lock.try_lock() else {
            return Err(GraphQLError::SchemaInitializing);
        };

        if let Some(schema) = self.get().await {
            return Ok(schema);
        }

        self.build().await
    }

    /// Like [`get_or_build`](Self::get_or_build), but waits for an
    /// in-progress build instead of failing.
    ///
    /// A previous failure is returned as is until the schema is invalidated.
    pub async fn get_or_build_wait(&self) -> Result<Arc<Schema>, GraphQLError> {
        if let Some(schema) = self.get().await {
            return Ok(schema);
        }

        let _guard = self.build_lock.lock().await;

        if let Some(schema) = self.get().await {
            return Ok(schema);
        }

        if *self.state.read().await == SchemaState::Failed
            && let Some(err) = self.last_error.read().await.as_ref()
        {
            return Err(GraphQLError::SchemaBuildFailed(err.clone()));
        }

        self.build().await
    }

    /// Must be called with the build lock held.
    async fn build(&self) -> Result<Arc<Schema>, GraphQLError> {
        *self.state.write().await = SchemaState::Building;
        info!("Building GraphQL schema...");

        let factory = Arc::clone(&self.factory);
        let result = tokio::task::spawn_blocking(move || factory.build_executable())
            .await
            .map_err(|e| GraphQLError::SchemaBuildFailed(e.to_string()))
            .and_then(|built| built);

        match result {
            Ok(schema) => {
                let schema = Arc::new(schema);
                *self.schema.write().await = Some(Arc::clone(&schema));
                *self.state.write().await = SchemaState::Ready;
                *self.last_error.write().await = None;
                info!("GraphQL schema built successfully");
                Ok(schema)
            }
            Err(e) => {
                let error_msg = e.to_string();
                warn!(error = %error_msg, "Failed to build GraphQL schema");
                *self.state.write().await = SchemaState::Failed;
                *self.last_error.write().await = Some(error_msg.clone());
                Err(GraphQLError::SchemaBuildFailed(error_msg))
            }
        }
    }

    /// The schema if already built, without triggering a build.
    pub async fn get(&self) -> Option<Arc<Schema>> {
        self.schema.read().await.clone()
    }

    /// Drops the cached schema so the next access rebuilds it.
    pub async fn invalidate(&self) {
        let _guard = self.build_lock.lock().await;

        *self.schema.write().await = None;
        *self.state.write().await = SchemaState::Uninitialized;
        *self.last_error.write().await = None;

        info!("GraphQL schema invalidated - will rebuild on next request");
    }

    pub async fn last_error(&self) -> Option<String> {
        self.last_error.read().await.clone()
    }

    pub async fn is_ready(&self) -> bool {
        *self.state.read().await == SchemaState::Ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::bookstore_factory;

    #[tokio::test]
    async fn test_builds_once_and_caches() {
        let lazy = LazySchema::new(bookstore_factory());
        assert_eq!(lazy.state().await, SchemaState::Uninitialized);
        assert!(lazy.get().await.is_none());

        let first = lazy.get_or_build().await.unwrap();
        assert!(lazy.is_ready().await);
        let second = lazy.get_or_build_wait().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_invalidate_resets_state() {
        let lazy = LazySchema::new(bookstore_factory());
        lazy.get_or_build_wait().await.unwrap();

        lazy.invalidate().await;
        assert_eq!(lazy.state().await, SchemaState::Uninitialized);
        assert!(lazy.get().await.is_none());
        assert!(lazy.last_error().await.is_none());
    }
}
