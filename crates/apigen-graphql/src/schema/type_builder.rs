//! Builds and caches the named types of the schema.
//!
//! Every type is registered in the [`TypesContainer`] under its final
//! name the first time it is requested, so later requests return the same
//! instance. Resource object fields are computed lazily through the
//! [`FieldsBuilderLocator`]: the fields builder depends on this builder,
//! and field maps of mutually referencing resources must not be built
//! eagerly.

use std::rc::Rc;
use std::sync::Arc;

use apigen_metadata::{
    COLLECTION_QUERY, ITEM_QUERY, Operation, PaginationType, PropertyDescriptor, PropertyType,
    ResourceDescriptor, lcfirst, ucfirst,
};
use serde_json::{Map, Value};
use tracing::trace;

use super::fields_builder::{CLIENT_MUTATION_ID, CLIENT_SUBSCRIPTION_ID, FieldsBuilderLocator};
use crate::error::GraphQLError;
use crate::pagination::PaginationPolicy;
use crate::types::{
    EnumType, FieldDefinition, FieldMap, InputObjectType, InterfaceType, LazyFields,
    NODE_INTERFACE, ObjectType, SchemaType, TypesContainer,
};

/// How a resource type is requested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeContext {
    /// Input object rather than output object.
    pub input: bool,
    /// The inner data type of a mutation or subscription payload.
    pub wrapped: bool,
    /// Nesting depth below the root field.
    pub depth: usize,
}

pub struct TypeBuilder {
    types: Rc<TypesContainer>,
    fields_builder: FieldsBuilderLocator,
    pagination: Arc<dyn PaginationPolicy>,
}

impl TypeBuilder {
    pub fn new(
        types: Rc<TypesContainer>,
        fields_builder: FieldsBuilderLocator,
        pagination: Arc<dyn PaginationPolicy>,
    ) -> Self {
        Self {
            types,
            fields_builder,
            pagination,
        }
    }

    /// Object or input object type of `resource` for `operation`.
    ///
    /// Input types are wrapped in non-null when `property` is required, or
    /// when there is no property.
    pub fn get_resource_object_type(
        &self,
        resource: &Arc<ResourceDescriptor>,
        operation: &Operation,
        property: Option<&PropertyDescriptor>,
        context: TypeContext,
    ) -> Result<SchemaType, GraphQLError> {
        let name = Self::resource_type_name(resource, operation, context);
        let required = context.input && property.is_none_or(PropertyDescriptor::is_required);

        if self.types.has(&name) {
            let existing = self.types.get(&name)?;
            if !matches!(existing.named_type(), SchemaType::Object(_) | SchemaType::InputObject(_)) {
                return Err(GraphQLError::logic(format!(
                    "Type \"{name}\" is registered but is not an object or input object type"
                )));
            }
            trace!(type_name = %name, "Reusing resource type");
            return Ok(Self::wrap_required(existing, required));
        }

        let io = if context.input {
            operation.input.clone()
        } else {
            operation.output.clone()
        };
        let resource_class = io
            .as_ref()
            .and_then(|io| io.class.clone())
            .unwrap_or_else(|| operation.class.clone());
        let wrap_data = !context.wrapped
            && (operation.is_mutation() || operation.is_subscription())
            && !context.input
            && context.depth < 1;

        let thunk = {
            let locator = self.fields_builder.clone();
            let resource = Arc::clone(resource);
            let operation = operation.clone();
            move || -> Result<FieldMap, GraphQLError> {
                let fields_builder = locator.get()?;
                if wrap_data {
                    return fields_builder
                        .type_builder()
                        .wrapped_payload_fields(&resource, &operation, context.depth);
                }

                let mut fields = fields_builder.get_resource_object_type_fields(
                    Some(&resource_class),
                    &operation,
                    context.input,
                    context.depth,
                    io.as_ref(),
                )?;

                if context.input && operation.is_mutation() {
                    if let Some(args) = &operation.args {
                        let mut custom: FieldMap = fields_builder
                            .resolve_resource_args(args, &operation)?
                            .into_iter()
                            .map(|(name, arg)| (name, arg.into()))
                            .collect();
                        if let Some(client_mutation_id) = fields.shift_remove(CLIENT_MUTATION_ID) {
                            custom.insert(CLIENT_MUTATION_ID.to_string(), client_mutation_id);
                        }
                        return Ok(custom);
                    }
                    if let Some(extra_args) = &operation.extra_args {
                        for (name, arg) in fields_builder.resolve_resource_args(extra_args, &operation)? {
                            fields.entry(name).or_insert_with(|| arg.into());
                        }
                    }
                }

                Ok(fields)
            }
        };

        let ty = if context.input {
            SchemaType::InputObject(Rc::new(InputObjectType {
                name: name.clone(),
                description: operation.description.clone(),
                fields: LazyFields::new(thunk),
            }))
        } else {
            let interfaces = if wrap_data {
                Vec::new()
            } else {
                vec![self.get_node_interface()?]
            };
            SchemaType::Object(Rc::new(ObjectType {
                name: name.clone(),
                description: operation.description.clone(),
                interfaces,
                fields: LazyFields::new(thunk),
            }))
        };

        trace!(type_name = %name, input = context.input, depth = context.depth, "Built resource type");
        self.types.set(name, ty.clone());
        Ok(Self::wrap_required(ty, required))
    }

    fn wrap_required(ty: SchemaType, required: bool) -> SchemaType {
        if required { SchemaType::non_null(ty) } else { ty }
    }

    /// Final type name of a resource type.
    pub fn resource_type_name(
        resource: &ResourceDescriptor,
        operation: &Operation,
        context: TypeContext,
    ) -> String {
        let is_payload = operation.is_mutation() || operation.is_subscription();
        let mut name = operation.short_name.clone();

        if operation.is_mutation() {
            name = format!("{}{}", operation.name, ucfirst(&name));
        } else if operation.is_subscription() {
            name = format!("{}{}Subscription", operation.name, ucfirst(&name));
        }

        if context.input {
            if context.depth > 0 {
                name.push_str("Nested");
            }
            name.push_str("Input");
        } else if is_payload {
            if context.depth > 0 {
                name.push_str("Nested");
            }
            name.push_str("Payload");
        }

        if operation.name == ITEM_QUERY || operation.name == COLLECTION_QUERY {
            let counterpart = if operation.is_collection() {
                ITEM_QUERY
            } else {
                COLLECTION_QUERY
            };
            if let Ok(counterpart) = resource.operation(counterpart) {
                if normalization_context(counterpart) != normalization_context(operation) {
                    name.push_str(if operation.is_collection() {
                        "Collection"
                    } else {
                        "Item"
                    });
                }
            }
        }

        if context.wrapped && is_payload {
            name.push_str("Data");
        }

        name
    }

    /// Fields of a mutation or subscription payload: the data field,
    /// `clientMutationId` or `clientSubscriptionId`, and `mercureUrl` for
    /// mercure subscriptions.
    pub(crate) fn wrapped_payload_fields(
        &self,
        resource: &Arc<ResourceDescriptor>,
        operation: &Operation,
        depth: usize,
    ) -> Result<FieldMap, GraphQLError> {
        let data_type = match resource.query_operation() {
            Some(query) if normalization_context(query) == normalization_context(operation) => {
                self.get_resource_object_type(
                    resource,
                    query,
                    None,
                    TypeContext {
                        input: false,
                        wrapped: false,
                        depth,
                    },
                )?
            }
            _ => self.get_resource_object_type(
                resource,
                operation,
                None,
                TypeContext {
                    input: false,
                    wrapped: true,
                    depth,
                },
            )?,
        };

        let mut fields = FieldMap::new();
        fields.insert(lcfirst(&operation.short_name), FieldDefinition::new(data_type));
        if operation.is_subscription() {
            fields.insert(
                CLIENT_SUBSCRIPTION_ID.to_string(),
                FieldDefinition::new(SchemaType::string()),
            );
            if operation.mercure {
                fields.insert("mercureUrl".to_string(), FieldDefinition::new(SchemaType::string()));
            }
        } else {
            fields.insert(
                CLIENT_MUTATION_ID.to_string(),
                FieldDefinition::new(SchemaType::string()),
            );
        }
        Ok(fields)
    }

    /// The Relay `Node` interface, created once per build.
    pub fn get_node_interface(&self) -> Result<Rc<InterfaceType>, GraphQLError> {
        if self.types.has(NODE_INTERFACE) {
            return match self.types.get(NODE_INTERFACE)? {
                SchemaType::Interface(interface) => Ok(interface),
                other => Err(GraphQLError::logic(format!(
                    "Type \"{NODE_INTERFACE}\" is registered as {other}, not as an interface"
                ))),
            };
        }

        let mut fields = FieldMap::new();
        fields.insert(
            "id".to_string(),
            FieldDefinition::new(SchemaType::non_null(SchemaType::id()))
                .with_description("The id of this node."),
        );
        let interface = Rc::new(InterfaceType {
            name: NODE_INTERFACE.to_string(),
            description: Some("A node, according to the Relay specification.".to_string()),
            fields,
        });
        self.types
            .set(NODE_INTERFACE, SchemaType::Interface(Rc::clone(&interface)));
        Ok(interface)
    }

    /// Connection type wrapping `resource_type`, shaped by the pagination
    /// type of `operation`.
    pub fn get_paginated_collection_type(
        &self,
        resource_type: &SchemaType,
        operation: &Operation,
    ) -> Result<SchemaType, GraphQLError> {
        let short_name = resource_type.name().to_string();
        let pagination_type = self.pagination.pagination_type(operation);
        let connection_name = format!("{short_name}{}Connection", ucfirst(pagination_type.as_str()));
        if self.types.has(&connection_name) {
            return self.types.get(&connection_name);
        }

        let fields = match pagination_type {
            PaginationType::Cursor => self.cursor_pagination_fields(resource_type, &short_name),
            PaginationType::Page => self.page_pagination_fields(resource_type, &short_name),
        };
        let connection = SchemaType::Object(Rc::new(ObjectType {
            name: connection_name.clone(),
            description: Some(format!("Connection for {short_name}.")),
            interfaces: Vec::new(),
            fields: LazyFields::ready(fields),
        }));
        self.types.set(connection_name, connection.clone());
        Ok(connection)
    }

    fn ready_object(&self, name: String, description: String, fields: FieldMap) -> SchemaType {
        let object = SchemaType::Object(Rc::new(ObjectType {
            name: name.clone(),
            description: Some(description),
            interfaces: Vec::new(),
            fields: LazyFields::ready(fields),
        }));
        self.types.set(name, object.clone());
        object
    }

    fn cursor_pagination_fields(&self, resource_type: &SchemaType, short_name: &str) -> FieldMap {
        let mut edge_fields = FieldMap::new();
        edge_fields.insert("node".into(), FieldDefinition::new(resource_type.clone()));
        edge_fields.insert(
            "cursor".into(),
            FieldDefinition::new(SchemaType::non_null(SchemaType::string())),
        );
        let edge = self.ready_object(
            format!("{short_name}Edge"),
            format!("Edge of {short_name}."),
            edge_fields,
        );

        let mut page_info_fields = FieldMap::new();
        page_info_fields.insert("endCursor".into(), FieldDefinition::new(SchemaType::string()));
        page_info_fields.insert("startCursor".into(), FieldDefinition::new(SchemaType::string()));
        page_info_fields.insert(
            "hasNextPage".into(),
            FieldDefinition::new(SchemaType::non_null(SchemaType::boolean())),
        );
        page_info_fields.insert(
            "hasPreviousPage".into(),
            FieldDefinition::new(SchemaType::non_null(SchemaType::boolean())),
        );
        let page_info = self.ready_object(
            format!("{short_name}PageInfo"),
            "Information about the current page.".into(),
            page_info_fields,
        );

        let mut fields = FieldMap::new();
        fields.insert("edges".into(), FieldDefinition::new(SchemaType::list_of(edge)));
        fields.insert("pageInfo".into(), FieldDefinition::new(SchemaType::non_null(page_info)));
        fields.insert(
            "totalCount".into(),
            FieldDefinition::new(SchemaType::non_null(SchemaType::int())),
        );
        fields
    }

    fn page_pagination_fields(&self, resource_type: &SchemaType, short_name: &str) -> FieldMap {
        let mut info_fields = FieldMap::new();
        for name in ["itemsPerPage", "lastPage", "totalCount"] {
            info_fields.insert(
                name.into(),
                FieldDefinition::new(SchemaType::non_null(SchemaType::int())),
            );
        }
        info_fields.insert(
            "hasNextPage".into(),
            FieldDefinition::new(SchemaType::non_null(SchemaType::boolean())),
        );
        let pagination_info = self.ready_object(
            format!("{short_name}PaginationInfo"),
            "Information about the pagination.".into(),
            info_fields,
        );

        let mut fields = FieldMap::new();
        fields.insert(
            "collection".into(),
            FieldDefinition::new(SchemaType::list_of(resource_type.clone())),
        );
        fields.insert(
            "paginationInfo".into(),
            FieldDefinition::new(SchemaType::non_null(pagination_info)),
        );
        fields
    }

    /// Enum type of a backed enum class, named `<ShortName>Enum`.
    pub fn get_enum_type(
        &self,
        class: &str,
        short_name: &str,
        description: Option<String>,
    ) -> Result<SchemaType, GraphQLError> {
        let name = if short_name.ends_with("Enum") {
            short_name.to_string()
        } else {
            format!("{short_name}Enum")
        };
        if self.types.has(&name) {
            return self.types.get(&name);
        }

        let values = self.fields_builder.get()?.get_enum_fields(class);
        let enum_type = SchemaType::Enum(Rc::new(EnumType {
            name: name.clone(),
            description,
            values,
        }));
        self.types.set(name, enum_type.clone());
        Ok(enum_type)
    }

    /// Whether `ty` is a collection of objects.
    pub fn is_collection(ty: &PropertyType) -> bool {
        ty.is_collection()
            && ty
                .collection_value_types()
                .first()
                .is_some_and(|value| value.class_name().is_some())
    }
}

fn normalization_context(operation: &Operation) -> Map<String, Value> {
    operation.normalization_context.clone().unwrap_or_default()
}
