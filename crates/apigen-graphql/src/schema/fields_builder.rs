//! Builds the fields of the root types and of resource types.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use apigen_metadata::{
    ArgumentSpec, Builtin, COLLECTION_QUERY, ITEM_QUERY, IoMetadata, Operation, PaginationType,
    PropertyContext, PropertyType, lcfirst, ucfirst,
};
use indexmap::IndexMap;
use tracing::{debug, trace};

use super::factory::SchemaServices;
use super::filter_args::{
    FilterArg, FilterArgs, convert_filter_args_to_types, filter_tree, merge_filter_args, node_type,
    parse_bracket_path,
};
use super::type_builder::TypeBuilder;
use super::type_converter::{ConvertedType, TypeConverter};
use crate::error::GraphQLError;
use crate::types::{
    ArgumentMap, EnumValueDefinition, FieldDefinition, FieldMap, InputValueDefinition, SchemaType,
    TypesContainer,
};

pub const CLIENT_MUTATION_ID: &str = "clientMutationId";
pub const CLIENT_SUBSCRIPTION_ID: &str = "clientSubscriptionId";

const PROPERTY_PLACEHOLDER: &str = "[:property]";

/// Late-bound handle to the [`FieldsBuilder`] of the current build.
///
/// The type builder needs the fields builder inside its lazy field thunks
/// while the fields builder owns the type builder. The locator holds a
/// weak reference set once the fields builder exists.
#[derive(Clone, Default)]
pub struct FieldsBuilderLocator {
    inner: Rc<RefCell<Weak<FieldsBuilder>>>,
}

impl FieldsBuilderLocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, fields_builder: &Rc<FieldsBuilder>) {
        *self.inner.borrow_mut() = Rc::downgrade(fields_builder);
    }

    pub fn get(&self) -> Result<Rc<FieldsBuilder>, GraphQLError> {
        self.inner
            .borrow()
            .upgrade()
            .ok_or_else(|| GraphQLError::logic("the fields builder of this build is gone"))
    }
}

/// Builds field maps for root operations and resource types.
pub struct FieldsBuilder {
    services: SchemaServices,
    types: Rc<TypesContainer>,
    type_builder: Rc<TypeBuilder>,
    type_converter: Rc<TypeConverter>,
}

impl FieldsBuilder {
    pub fn new(
        services: SchemaServices,
        types: Rc<TypesContainer>,
        type_builder: Rc<TypeBuilder>,
        type_converter: Rc<TypeConverter>,
    ) -> Self {
        Self {
            services,
            types,
            type_builder,
            type_converter,
        }
    }

    pub fn types(&self) -> &Rc<TypesContainer> {
        &self.types
    }

    pub fn type_builder(&self) -> &Rc<TypeBuilder> {
        &self.type_builder
    }

    pub fn type_converter(&self) -> &Rc<TypeConverter> {
        &self.type_converter
    }

    pub(crate) fn services(&self) -> &SchemaServices {
        &self.services
    }

    /// The `node(id: ID!): Node` query field.
    pub fn get_node_query_fields(&self) -> Result<FieldDefinition, GraphQLError> {
        let mut field =
            FieldDefinition::new(SchemaType::Interface(self.type_builder.get_node_interface()?));
        field.args.insert(
            "id".into(),
            InputValueDefinition::new(SchemaType::non_null(SchemaType::id())),
        );
        field.resolver = Some(self.services.resolvers.item.create(None, None, None));
        Ok(field)
    }

    /// Root query field of an item query operation.
    pub fn get_item_query_fields(
        &self,
        resource_class: &str,
        operation: &Operation,
    ) -> Result<FieldMap, GraphQLError> {
        let mut fields = FieldMap::new();
        if operation.is_query() && operation.nested {
            return Ok(fields);
        }

        let field_name = lcfirst(&if operation.name == ITEM_QUERY {
            operation.short_name.clone()
        } else {
            format!("{}{}", operation.name, operation.short_name)
        });
        let ty = PropertyType::object(resource_class, true);

        let Some(mut field) = self.get_resource_field_configuration(
            None,
            operation.description.clone(),
            operation.deprecation_reason.clone(),
            &ty,
            resource_class,
            false,
            operation,
            0,
            false,
        )?
        else {
            return Ok(fields);
        };

        let mut args = match &operation.args {
            Some(custom) => self.resolve_resource_args(custom, operation)?,
            None => {
                let mut args = ArgumentMap::new();
                args.insert(
                    "id".into(),
                    InputValueDefinition::new(SchemaType::non_null(SchemaType::id())),
                );
                self.add_parameter_args(operation, &mut args)?;
                args
            }
        };
        self.add_extra_args(operation, &mut args)?;
        field.args = args;

        debug!(field = %field_name, resource_class, "Built item query field");
        fields.insert(field_name, field);
        Ok(fields)
    }

    /// Root query field of a collection query operation, named with the
    /// plural of the short name.
    pub fn get_collection_query_fields(
        &self,
        resource_class: &str,
        operation: &Operation,
    ) -> Result<FieldMap, GraphQLError> {
        let mut fields = FieldMap::new();
        if operation.is_query() && operation.nested {
            return Ok(fields);
        }

        let field_name = lcfirst(&if operation.name == COLLECTION_QUERY {
            operation.short_name.clone()
        } else {
            format!("{}{}", operation.name, operation.short_name)
        });
        let ty = PropertyType::array_of(PropertyType::object(resource_class, false), false);

        let Some(mut field) = self.get_resource_field_configuration(
            None,
            operation.description.clone(),
            operation.deprecation_reason.clone(),
            &ty,
            resource_class,
            false,
            operation,
            0,
            false,
        )?
        else {
            return Ok(fields);
        };

        let mut args = match &operation.args {
            Some(custom) => self.resolve_resource_args(custom, operation)?,
            None => {
                let mut args = std::mem::take(&mut field.args);
                self.add_parameter_args(operation, &mut args)?;
                args
            }
        };
        self.add_extra_args(operation, &mut args)?;
        field.args = args;

        let field_name = self.services.inflector.pluralize(&field_name);
        debug!(field = %field_name, resource_class, "Built collection query field");
        fields.insert(field_name, field);
        Ok(fields)
    }

    /// Root mutation field `<operation><ShortName>` taking an `input`.
    pub fn get_mutation_fields(
        &self,
        resource_class: &str,
        operation: &Operation,
    ) -> Result<FieldMap, GraphQLError> {
        let mut fields = FieldMap::new();
        let ty = PropertyType::object(resource_class, true);
        let description = operation
            .description
            .clone()
            .unwrap_or_else(|| ucfirst(&format!("{}s a {}.", operation.name, operation.short_name)));

        let Some(mut field) = self.get_resource_field_configuration(
            None,
            Some(description),
            operation.deprecation_reason.clone(),
            &ty,
            resource_class,
            false,
            operation,
            0,
            false,
        )?
        else {
            return Ok(fields);
        };

        if let Some(input) = self.get_resource_field_configuration(
            None,
            None,
            operation.deprecation_reason.clone(),
            &ty,
            resource_class,
            true,
            operation,
            0,
            false,
        )? {
            field
                .args
                .entry("input".into())
                .or_insert_with(|| InputValueDefinition {
                    ty: input.ty,
                    description: input.description,
                });
        }

        let field_name = format!("{}{}", operation.name, operation.short_name);
        debug!(field = %field_name, resource_class, "Built mutation field");
        fields.insert(field_name, field);
        Ok(fields)
    }

    /// Root subscription field `<operation><ShortName>Subscribe`. Empty for
    /// operations without mercure.
    pub fn get_subscription_fields(
        &self,
        resource_class: &str,
        operation: &Operation,
    ) -> Result<FieldMap, GraphQLError> {
        let mut fields = FieldMap::new();
        let ty = PropertyType::object(resource_class, true);
        let description = operation.description.clone().unwrap_or_else(|| {
            format!("Subscribes to the action event of a {}.", operation.short_name)
        });

        let Some(mut field) = self.get_resource_field_configuration(
            None,
            Some(description),
            operation.deprecation_reason.clone(),
            &ty,
            resource_class,
            false,
            operation,
            0,
            false,
        )?
        else {
            return Ok(fields);
        };

        if let Some(input) = self.get_resource_field_configuration(
            None,
            None,
            operation.deprecation_reason.clone(),
            &ty,
            resource_class,
            true,
            operation,
            0,
            false,
        )? {
            field
                .args
                .entry("input".into())
                .or_insert_with(|| InputValueDefinition {
                    ty: input.ty,
                    description: input.description,
                });
        }

        let field_name = format!("{}{}Subscribe", operation.name, operation.short_name);
        debug!(field = %field_name, resource_class, "Built subscription field");
        fields.insert(field_name, field);
        Ok(fields)
    }

    /// Fields of the object or input object type of `resource_class`.
    pub fn get_resource_object_type_fields(
        &self,
        resource_class: Option<&str>,
        operation: &Operation,
        input: bool,
        depth: usize,
        io: Option<&IoMetadata>,
    ) -> Result<FieldMap, GraphQLError> {
        let mut fields = FieldMap::new();
        let id_field = || FieldDefinition::new(SchemaType::non_null(SchemaType::id()));
        let client_mutation_id = || FieldDefinition::new(SchemaType::string());

        if io.is_some_and(|io| io.class.is_none()) {
            if input {
                fields.insert(CLIENT_MUTATION_ID.into(), client_mutation_id());
            }
            return Ok(fields);
        }

        if operation.is_subscription() && input {
            fields.insert("id".into(), id_field());
            fields.insert(CLIENT_SUBSCRIPTION_ID.into(), FieldDefinition::new(SchemaType::string()));
            return Ok(fields);
        }

        if operation.is_mutation() && operation.name == "delete" {
            fields.insert("id".into(), id_field());
            if input {
                fields.insert(CLIENT_MUTATION_ID.into(), client_mutation_id());
            }
            return Ok(fields);
        }

        if !input || (operation.resolver.is_none() && operation.name != "create") {
            fields.insert("id".into(), id_field());
        }
        if input && depth >= 1 {
            fields.insert("id".into(), FieldDefinition::new(SchemaType::id()));
        }

        let depth = depth + 1;

        if let Some(class) = resource_class {
            let context = PropertyContext::for_operation(operation);
            for property in self.services.metadata.property_names(class)? {
                let metadata = self.services.metadata.property_metadata(class, &property, &context)?;
                if metadata.types.is_empty()
                    || (!input && !metadata.is_readable())
                    || (input && !metadata.is_writable())
                {
                    continue;
                }

                for candidate in &metadata.types {
                    let Some(field) = self.get_resource_field_configuration(
                        Some(&property),
                        metadata.description.clone(),
                        metadata.deprecation_reason.clone(),
                        candidate,
                        class,
                        input,
                        operation,
                        depth,
                        metadata.has_security(),
                    )?
                    else {
                        continue;
                    };

                    let field_name = if property == "id" {
                        "_id".to_string()
                    } else {
                        self.services.name_converter.normalize(&property, Some(class))
                    };
                    fields.insert(field_name, field);
                    break;
                }
            }
        }

        if operation.is_mutation() && input {
            fields.insert(CLIENT_MUTATION_ID.into(), client_mutation_id());
        }

        Ok(fields)
    }

    /// Cases of a backed enum keyed by name.
    pub fn get_enum_fields(&self, enum_class: &str) -> IndexMap<String, EnumValueDefinition> {
        self.services
            .enums
            .enum_cases(enum_class)
            .unwrap_or_default()
            .into_iter()
            .map(|case| {
                (
                    case.name,
                    EnumValueDefinition {
                        value: case.value,
                        description: case.description,
                    },
                )
            })
            .collect()
    }

    /// Resolves declared arguments and appends the parameter arguments of
    /// `operation`.
    pub fn resolve_resource_args(
        &self,
        args: &IndexMap<String, ArgumentSpec>,
        operation: &Operation,
    ) -> Result<ArgumentMap, GraphQLError> {
        let mut resolved = self.resolve_declared_args(args)?;
        self.add_parameter_args(operation, &mut resolved)?;
        Ok(resolved)
    }

    fn resolve_declared_args(
        &self,
        args: &IndexMap<String, ArgumentSpec>,
    ) -> Result<ArgumentMap, GraphQLError> {
        args.iter()
            .map(|(name, spec)| {
                let type_string = spec.ty.as_deref().ok_or_else(|| {
                    GraphQLError::invalid_argument(format!(
                        "The argument \"{name}\" of the custom operation must have a type"
                    ))
                })?;
                let definition = InputValueDefinition {
                    ty: self.type_converter.resolve_type(type_string)?,
                    description: spec.description.clone(),
                };
                Ok((name.clone(), definition))
            })
            .collect()
    }

    /// Appends `extra_args` of `operation` without overriding.
    fn add_extra_args(&self, operation: &Operation, args: &mut ArgumentMap) -> Result<(), GraphQLError> {
        if let Some(extra_args) = &operation.extra_args {
            for (name, arg) in self.resolve_declared_args(extra_args)? {
                args.entry(name).or_insert(arg);
            }
        }
        Ok(())
    }

    /// Arguments derived from the declared parameters of `operation`.
    ///
    /// A plain key becomes a `String` argument. A key containing
    /// `[:property]` becomes an input object whose fields come from the
    /// description of the parameter's filter.
    fn add_parameter_args(&self, operation: &Operation, args: &mut ArgumentMap) -> Result<(), GraphQLError> {
        for (key, parameter) in &operation.parameters {
            if !key.contains(PROPERTY_PLACEHOLDER) {
                let ty = if parameter.required {
                    SchemaType::non_null(SchemaType::string())
                } else {
                    SchemaType::string()
                };
                args.insert(
                    key.clone(),
                    InputValueDefinition {
                        ty,
                        description: parameter.description.clone(),
                    },
                );
                continue;
            }

            let Some(filter) = parameter
                .filter
                .as_deref()
                .and_then(|id| self.services.filters.get(id))
            else {
                trace!(parameter = %key, "Skipping parameter without a registered filter");
                continue;
            };

            let prefix = key.split(PROPERTY_PLACEHOLDER).next().unwrap_or(key);
            let type_prefix = format!("{}Parameter_{prefix}", operation.short_name);
            let mut tree = FilterArgs::new();
            for (description_key, description) in filter.description(&operation.class) {
                let (description_key, is_list) = match description_key.strip_suffix("[]") {
                    Some(stripped) => (format!("{stripped}_list"), true),
                    None => (description_key, false),
                };
                let description_key =
                    description_key.replace('.', &self.services.nesting_separator);

                let mut segments = parse_bracket_path(&description_key);
                if segments.len() > 1 && segments[0] == prefix {
                    segments.remove(0);
                }

                let mut leaf = parameter_leaf_type(&description.ty);
                if description.required {
                    leaf = SchemaType::non_null(leaf);
                }
                if is_list {
                    leaf = SchemaType::list_of(leaf);
                }
                let (root, branch) = filter_tree(&segments, leaf, &type_prefix);
                merge_filter_args(&mut tree, root, branch);
            }

            let ty = node_type(type_prefix, tree, &self.types, false)?;
            args.insert(
                prefix.to_string(),
                InputValueDefinition {
                    ty,
                    description: parameter.description.clone(),
                },
            );
        }
        Ok(())
    }

    /// Field definition for a property (or a root operation when `property`
    /// is `None`).
    ///
    /// Returns `None` when the type cannot be represented.
    #[allow(clippy::too_many_arguments)]
    pub fn get_resource_field_configuration(
        &self,
        property: Option<&str>,
        description: Option<String>,
        deprecation_reason: Option<String>,
        ty: &PropertyType,
        root_resource: &str,
        input: bool,
        root_operation: &Operation,
        depth: usize,
        force_nullable: bool,
    ) -> Result<Option<FieldDefinition>, GraphQLError> {
        match self.build_field_configuration(
            property,
            description,
            deprecation_reason,
            ty,
            root_resource,
            input,
            root_operation,
            depth,
            force_nullable,
        ) {
            Err(err) if err.is_invalid_type() => {
                trace!(property, root_resource, error = %err, "Leaving out field with unsupported type");
                Ok(None)
            }
            result => result,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn build_field_configuration(
        &self,
        property: Option<&str>,
        description: Option<String>,
        deprecation_reason: Option<String>,
        ty: &PropertyType,
        root_resource: &str,
        input: bool,
        root_operation: &Operation,
        depth: usize,
        force_nullable: bool,
    ) -> Result<Option<FieldDefinition>, GraphQLError> {
        if root_operation.is_subscription() && property.is_none() && !root_operation.mercure {
            return Ok(None);
        }

        let is_collection = TypeBuilder::is_collection(ty);
        let mut resource_class = if is_collection {
            ty.collection_value_types().first().and_then(PropertyType::class_name)
        } else {
            ty.class_name()
        }
        .map(str::to_string);

        let nested_operation = match &resource_class {
            Some(class) if depth >= 1 && self.services.metadata.is_resource_class(class) => {
                let resource = self.services.metadata.resource_metadata(class)?;
                if resource.has_graphql_operations() {
                    let name = if is_collection { COLLECTION_QUERY } else { ITEM_QUERY };
                    Some(resource.operation(name)?.clone())
                } else {
                    None
                }
            }
            _ => None,
        };
        let resource_operation = nested_operation.as_ref().unwrap_or(root_operation);

        let graphql_type = self.convert_type(
            ty,
            input,
            resource_operation,
            root_operation,
            resource_class.as_deref().unwrap_or_default(),
            root_resource,
            property,
            depth,
            force_nullable,
        )?;

        let is_standard = graphql_type.is_standard_scalar();
        if is_standard {
            resource_class = None;
        }

        let mut args = ArgumentMap::new();
        if !input
            && !root_operation.is_mutation()
            && !root_operation.is_subscription()
            && !is_standard
            && is_collection
        {
            let owned = Self::owns_operation(resource_class.as_deref(), resource_operation);
            let mut filter_args = FilterArgs::new();
            if self.is_paginated(resource_class.as_deref(), resource_operation) {
                for (name, arg) in self.get_pagination_args(resource_operation) {
                    filter_args.insert(name, FilterArg::Argument(arg));
                }
            }
            args = self.get_filter_args(
                filter_args,
                resource_class.as_deref().filter(|_| owned),
                root_resource,
                resource_operation,
                root_operation,
                property,
                depth,
            )?;
        }

        let resolvers = &self.services.resolvers;
        let resolver = if is_standard || input {
            None
        } else {
            let factory = if (root_operation.is_mutation() || root_operation.is_subscription()) && depth == 0 {
                if root_operation.is_mutation() {
                    &resolvers.item_mutation
                } else {
                    &resolvers.item_subscription
                }
            } else if is_collection {
                &resolvers.collection
            } else {
                &resolvers.item
            };
            Some(factory.create(
                resource_class.as_deref(),
                Some(root_resource),
                Some(resource_operation),
            ))
        };

        Ok(Some(FieldDefinition {
            ty: graphql_type,
            description,
            args,
            resolver,
            deprecation_reason,
        }))
    }

    fn is_enum_class(&self, class: Option<&str>) -> bool {
        class.is_some_and(|class| self.services.enums.is_backed_enum(class))
    }

    /// Whether `operation` is an operation of `class`. Collections of plain
    /// classes and enums carry the root operation, which is not theirs.
    fn owns_operation(class: Option<&str>, operation: &Operation) -> bool {
        class.is_some_and(|class| class == operation.class)
    }

    /// Collections are paginated only for resources owning the operation.
    /// The collection resolver applies the same rule.
    fn is_paginated(&self, class: Option<&str>, operation: &Operation) -> bool {
        Self::owns_operation(class, operation)
            && !self.is_enum_class(class)
            && self.services.pagination.is_enabled(operation)
    }

    fn get_pagination_args(&self, operation: &Operation) -> ArgumentMap {
        let mut args = ArgumentMap::new();
        match self.services.pagination.pagination_type(operation) {
            PaginationType::Cursor => {
                args.insert(
                    "first".into(),
                    InputValueDefinition::new(SchemaType::int())
                        .with_description("Returns the first n elements from the list."),
                );
                args.insert(
                    "last".into(),
                    InputValueDefinition::new(SchemaType::int())
                        .with_description("Returns the last n elements from the list."),
                );
                args.insert(
                    "before".into(),
                    InputValueDefinition::new(SchemaType::string()).with_description(
                        "Returns the elements in the list that come before the specified cursor.",
                    ),
                );
                args.insert(
                    "after".into(),
                    InputValueDefinition::new(SchemaType::string()).with_description(
                        "Returns the elements in the list that come after the specified cursor.",
                    ),
                );
            }
            PaginationType::Page => {
                let options = self.services.pagination.options();
                args.insert(
                    options.page_parameter_name,
                    InputValueDefinition::new(SchemaType::int())
                        .with_description("Returns the current page."),
                );
                if self.services.pagination.client_items_per_page(operation) {
                    args.insert(
                        options.items_per_page_parameter_name,
                        InputValueDefinition::new(SchemaType::int())
                            .with_description("Returns the number of items per page."),
                    );
                }
            }
        }
        args
    }

    #[allow(clippy::too_many_arguments)]
    fn get_filter_args(
        &self,
        mut args: FilterArgs,
        resource_class: Option<&str>,
        root_resource: &str,
        resource_operation: &Operation,
        root_operation: &Operation,
        property: Option<&str>,
        depth: usize,
    ) -> Result<ArgumentMap, GraphQLError> {
        let Some(resource_class) = resource_class else {
            return convert_filter_args_to_types(args, &self.types);
        };

        let type_prefix = format!("{}Filter", resource_operation.short_name);
        for filter_id in &resource_operation.filters {
            let Some(filter) = self.services.filters.get(filter_id) else {
                trace!(filter = %filter_id, "Skipping unregistered filter");
                continue;
            };

            for (key, description) in filter.description(&resource_operation.class) {
                let nullable = !description.required;
                let filter_type = match Builtin::from_name(&description.ty) {
                    Some(builtin) => PropertyType::builtin(builtin, nullable),
                    None => PropertyType::object(description.ty.clone(), nullable),
                };
                let mut graphql_type = self.convert_type(
                    &filter_type,
                    false,
                    resource_operation,
                    root_operation,
                    resource_class,
                    root_resource,
                    property,
                    depth,
                    false,
                )?;

                let key = match key.strip_suffix("[]") {
                    Some(stripped) => {
                        graphql_type = SchemaType::list_of(graphql_type);
                        format!("{stripped}_list")
                    }
                    None => key,
                };
                let key = key.replace('.', &self.services.nesting_separator);

                let (root, branch) = filter_tree(&parse_bracket_path(&key), graphql_type, &type_prefix);
                merge_filter_args(&mut args, root, branch);
            }
        }

        convert_filter_args_to_types(args, &self.types)
    }

    /// Converts a property type, resolving references and applying the
    /// collection and nullability rules.
    #[allow(clippy::too_many_arguments)]
    fn convert_type(
        &self,
        ty: &PropertyType,
        input: bool,
        resource_operation: &Operation,
        root_operation: &Operation,
        resource_class: &str,
        root_resource: &str,
        property: Option<&str>,
        depth: usize,
        force_nullable: bool,
    ) -> Result<SchemaType, GraphQLError> {
        let converted = self.type_converter.convert_type(
            ty,
            input,
            root_operation,
            resource_class,
            root_resource,
            property,
            depth,
        )?;

        let graphql_type = match converted {
            None => {
                return Err(GraphQLError::invalid_type(format!(
                    "The type \"{}\" is not supported.",
                    ty.builtin_kind().as_str()
                )));
            }
            Some(ConvertedType::Type(graphql_type)) => graphql_type,
            Some(ConvertedType::Reference(name)) => {
                if !self.types.has(&name) {
                    return Err(GraphQLError::invalid_type(format!(
                        "The GraphQL type {name} is not valid. Valid types are: {}. Have you registered this type?",
                        self.types.names().join(", ")
                    )));
                }
                self.types.get(&name)?
            }
        };

        if TypeBuilder::is_collection(ty) {
            if !input && self.is_paginated(Some(resource_class), resource_operation) {
                return self
                    .type_builder
                    .get_paginated_collection_type(&graphql_type, resource_operation);
            }
            return Ok(SchemaType::list_of(graphql_type));
        }

        let is_update = root_operation.is_mutation() && root_operation.name == "update";
        if force_nullable || graphql_type.is_non_null() || ty.is_nullable() || is_update {
            Ok(graphql_type)
        } else {
            Ok(SchemaType::non_null(graphql_type))
        }
    }
}

/// Leaf type of a parameter filter field.
fn parameter_leaf_type(type_name: &str) -> SchemaType {
    match Builtin::from_name(type_name) {
        Some(Builtin::Bool) => SchemaType::boolean(),
        Some(Builtin::Int) => SchemaType::int(),
        Some(Builtin::Float) => SchemaType::float(),
        _ => SchemaType::string(),
    }
}
