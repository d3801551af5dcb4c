//! Wires the collaborators of a schema build.
//!
//! The build graph (types container, type builder, type converter and
//! fields builder) is single-threaded and lives for one build only.
//! [`SchemaFactory`] holds the thread-safe collaborators and creates a fresh
//! graph each time it builds.

use std::rc::Rc;
use std::sync::Arc;

use apigen_metadata::{
    EnglishInflector, EnumFieldsProvider, FilterRegistry, IdentityNameConverter, Inflector,
    MetadataProvider, NameConverter,
};
use async_graphql::dynamic::Schema;
use tracing::info;

use super::builder::{ScalarDefinition, SchemaBuilder, SchemaBuilderConfig, SchemaDefinition};
use super::fields_builder::{FieldsBuilder, FieldsBuilderLocator};
use super::type_builder::TypeBuilder;
use super::type_converter::TypeConverter;
use crate::config::GraphQLConfig;
use crate::error::GraphQLError;
use crate::pagination::{Pagination, PaginationPolicy};
use crate::resolvers::{ResolverFactories, StateProcessor, StateProvider};
use crate::types::TypesContainer;

/// Thread-safe collaborators shared by every build.
#[derive(Clone)]
pub struct SchemaServices {
    pub metadata: Arc<dyn MetadataProvider>,
    pub enums: Arc<dyn EnumFieldsProvider>,
    pub filters: Arc<dyn FilterRegistry>,
    pub pagination: Arc<dyn PaginationPolicy>,
    pub name_converter: Arc<dyn NameConverter>,
    pub inflector: Arc<dyn Inflector>,
    pub resolvers: ResolverFactories,
    /// Replaces dots of filter keys in argument names.
    pub nesting_separator: String,
}

impl std::fmt::Debug for SchemaServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaServices")
            .field("nesting_separator", &self.nesting_separator)
            .finish_non_exhaustive()
    }
}

/// Builds schemas from metadata.
#[derive(Debug, Clone)]
pub struct SchemaFactory {
    services: SchemaServices,
    extra_types: Vec<ScalarDefinition>,
    config: SchemaBuilderConfig,
}

impl SchemaFactory {
    pub fn new(services: SchemaServices) -> Self {
        Self {
            services,
            extra_types: ScalarDefinition::defaults(),
            config: SchemaBuilderConfig::default(),
        }
    }

    /// Factory over a metadata source that also describes enums, with the
    /// default resolvers reading and writing `state`.
    pub fn from_config<M, S>(
        config: &GraphQLConfig,
        metadata: Arc<M>,
        filters: Arc<dyn FilterRegistry>,
        state: Arc<S>,
    ) -> Self
    where
        M: MetadataProvider + EnumFieldsProvider + 'static,
        S: StateProvider + StateProcessor + 'static,
    {
        let pagination: Arc<dyn PaginationPolicy> =
            Arc::new(Pagination::new(config.pagination.clone()));
        let resolvers = ResolverFactories::with_state(
            state,
            metadata.clone(),
            Arc::clone(&pagination),
            config.mercure_hub_url.clone(),
        );
        let services = SchemaServices {
            metadata: metadata.clone(),
            enums: metadata,
            filters,
            pagination,
            name_converter: Arc::new(IdentityNameConverter),
            inflector: Arc::new(EnglishInflector),
            resolvers,
            nesting_separator: config.nesting_separator.clone(),
        };
        Self::new(services).with_config(config.to_schema_builder_config())
    }

    #[must_use]
    pub fn with_config(mut self, config: SchemaBuilderConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_extra_type(mut self, scalar: ScalarDefinition) -> Self {
        self.extra_types.push(scalar);
        self
    }

    #[must_use]
    pub fn with_name_converter(mut self, name_converter: Arc<dyn NameConverter>) -> Self {
        self.services.name_converter = name_converter;
        self
    }

    pub fn services(&self) -> &SchemaServices {
        &self.services
    }

    pub fn config(&self) -> &SchemaBuilderConfig {
        &self.config
    }

    /// A fresh build graph.
    pub fn fields_builder(&self) -> Rc<FieldsBuilder> {
        let types = Rc::new(TypesContainer::new());
        let locator = FieldsBuilderLocator::new();
        let type_builder = Rc::new(TypeBuilder::new(
            Rc::clone(&types),
            locator.clone(),
            Arc::clone(&self.services.pagination),
        ));
        let type_converter = Rc::new(TypeConverter::new(
            Rc::clone(&type_builder),
            Rc::clone(&types),
            Arc::clone(&self.services.metadata),
            Arc::clone(&self.services.enums),
        ));
        let fields_builder = Rc::new(FieldsBuilder::new(
            self.services.clone(),
            types,
            type_builder,
            type_converter,
        ));
        locator.set(&fields_builder);
        fields_builder
    }

    /// Builds the schema definition.
    pub fn build(&self) -> Result<SchemaDefinition, GraphQLError> {
        SchemaBuilder::new(self.fields_builder(), self.extra_types.clone()).get_schema()
    }

    /// Builds the executable schema.
    pub fn build_executable(&self) -> Result<Schema, GraphQLError> {
        let schema = self.build()?.into_executable(&self.config)?;
        info!("Executable GraphQL schema ready");
        Ok(schema)
    }
}
