//! Materializes a [`SchemaDefinition`] into an executable dynamic schema.
//!
//! The definition is single-threaded; the executable schema must be
//! `Send + Sync`. Every lazy field map is forced first, then each named
//! type is registered once with resolvers that only capture `Arc` data.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use apigen_metadata::{MetadataProvider, class_basename};
use async_graphql::{ErrorExtensions, Value};
use async_graphql::dynamic::{
    Enum, EnumItem, Field, FieldFuture, FieldValue, InputObject, InputValue, Interface,
    InterfaceField, Object, ResolverContext, Scalar, Schema, Subscription, SubscriptionField,
    SubscriptionFieldFuture, TypeRef,
};
use async_graphql_value::Name;
use futures_util::stream;
use tracing::{debug, trace};

use super::builder::{SchemaBuilderConfig, SchemaDefinition};
use crate::error::GraphQLError;
use crate::resolvers::{
    DynFieldResolver, ITEM_RESOURCE_CLASS_KEY, ResolveInfo, graphql_value_to_json,
    json_to_graphql_value,
};
use crate::types::{
    EnumType, FieldDefinition, FieldMap, InputObjectType, InterfaceType, NODE_INTERFACE,
    ObjectType, SchemaType,
};

const QUERY: &str = "Query";
const MUTATION: &str = "Mutation";
const SUBSCRIPTION: &str = "Subscription";
const PLACEHOLDER_FIELD: &str = "_placeholder";

impl SchemaDefinition {
    /// Builds the executable schema.
    pub fn into_executable(self, config: &SchemaBuilderConfig) -> Result<Schema, GraphQLError> {
        self.resolve_all_fields()?;

        let all = self.types.all();
        let node_types = Arc::new(NodeTypes::new(
            &all,
            self.fields_builder.services().metadata.as_ref(),
        ));
        let mut shapes = Shapes {
            enums: HashMap::new(),
            node_types,
        };

        let mut builder = Schema::build(
            QUERY,
            self.mutation.as_ref().map(|_| MUTATION),
            self.subscription.as_ref().map(|_| SUBSCRIPTION),
        );

        let mut registered = HashSet::new();
        for ty in all.values() {
            let named = ty.named_type();
            if named.is_standard_scalar() || !registered.insert(named.name().to_string()) {
                continue;
            }
            builder = match named {
                SchemaType::Scalar(scalar) => {
                    let mut definition = Scalar::new(scalar.name.as_str());
                    if let Some(description) = &scalar.description {
                        definition = definition.description(description);
                    }
                    builder.register(definition)
                }
                SchemaType::Enum(enum_type) => builder.register(enum_definition(enum_type)),
                SchemaType::Interface(interface) => builder.register(interface_definition(interface)),
                SchemaType::Object(object) => builder.register(object_definition(object, &mut shapes)?),
                SchemaType::InputObject(input) => builder.register(input_object_definition(input)?),
                SchemaType::List(_) | SchemaType::NonNull(_) => builder,
            };
        }

        builder = builder.register(root_object(QUERY, &self.query, &mut shapes));
        if let Some(mutation) = &self.mutation {
            builder = builder.register(root_object(MUTATION, mutation, &mut shapes));
        }
        if let Some(subscription) = &self.subscription {
            builder = builder.register(subscription_root(subscription));
        }

        debug!(types = registered.len(), "Registered schema types");

        builder = builder
            .limit_depth(config.max_depth)
            .limit_complexity(config.max_complexity);
        if !config.introspection_enabled {
            builder = builder.disable_introspection();
        }

        builder
            .finish()
            .map_err(|e| GraphQLError::SchemaBuildFailed(e.to_string()))
    }

    /// Forces every lazy field map. Resolving one may register new types,
    /// so this repeats until the container stops growing.
    fn resolve_all_fields(&self) -> Result<(), GraphQLError> {
        let mut forced = HashSet::new();
        loop {
            let pending: Vec<(String, SchemaType)> = self
                .types
                .all()
                .into_iter()
                .filter(|(name, _)| !forced.contains(name))
                .collect();
            if pending.is_empty() {
                return Ok(());
            }

            for (name, ty) in pending {
                match ty.named_type() {
                    SchemaType::Object(object) => {
                        object.fields.get()?;
                    }
                    SchemaType::InputObject(input) => {
                        input.fields.get()?;
                    }
                    _ => {}
                }
                forced.insert(name);
            }
        }
    }
}

/// Maps item classes to the object types implementing `Node`.
struct NodeTypes {
    by_class: HashMap<String, String>,
    names: HashSet<String>,
}

impl NodeTypes {
    fn new(
        types: &indexmap::IndexMap<String, SchemaType>,
        metadata: &dyn MetadataProvider,
    ) -> Self {
        let names: HashSet<String> = types
            .values()
            .filter_map(|ty| ty.named_type().as_object())
            .filter(|object| implements_node(object))
            .map(|object| object.name.clone())
            .collect();

        let mut by_class = HashMap::new();
        for class in metadata.resource_names() {
            let Ok(resource) = metadata.resource_metadata(&class) else {
                continue;
            };
            let candidates = [
                resource.short_name.clone(),
                format!("{}Item", resource.short_name),
            ];
            if let Some(name) = candidates.into_iter().find(|name| names.contains(name)) {
                by_class.insert(class, name);
            }
        }

        Self { by_class, names }
    }

    fn resolve(&self, value: &Value) -> Result<String, async_graphql::Error> {
        let class = match value {
            Value::Object(object) => match object.get(ITEM_RESOURCE_CLASS_KEY) {
                Some(Value::String(class)) => class.as_str(),
                _ => "",
            },
            _ => "",
        };
        if let Some(name) = self.by_class.get(class) {
            return Ok(name.clone());
        }
        let basename = class_basename(class);
        if self.names.contains(basename) {
            return Ok(basename.to_string());
        }
        Err(async_graphql::Error::new(format!(
            "Could not resolve the node type of class \"{class}\""
        )))
    }
}

fn implements_node(object: &ObjectType) -> bool {
    !object.interfaces.is_empty()
        && object
            .fields
            .get()
            .ok()
            .and_then(|fields| fields.get("id").map(|id| id.ty.to_string() == "ID!"))
            .unwrap_or(false)
}

/// Serialized backing values to case names.
struct EnumMapping {
    name: String,
    cases: HashMap<String, String>,
}

impl EnumMapping {
    fn new(enum_type: &EnumType) -> Self {
        let mut cases = HashMap::new();
        for (case, definition) in &enum_type.values {
            cases.insert(
                serde_json::Value::String(case.clone()).to_string(),
                case.clone(),
            );
            cases.insert(definition.value.to_string(), case.clone());
        }
        Self {
            name: enum_type.name.clone(),
            cases,
        }
    }

    fn case_name(&self, value: &Value) -> Result<&str, async_graphql::Error> {
        let key = graphql_value_to_json(value).to_string();
        self.cases.get(&key).map(String::as_str).ok_or_else(|| {
            async_graphql::Error::new(format!("{key} is not a value of enum {}", self.name))
        })
    }
}

/// How a resolved value is handed to the engine.
#[derive(Clone)]
enum OutputShape {
    Plain,
    Enum(Arc<EnumMapping>),
    Node(Arc<NodeTypes>),
    List(Box<OutputShape>),
}

impl OutputShape {
    fn field_value(&self, value: Value) -> Result<Option<FieldValue<'static>>, async_graphql::Error> {
        if matches!(value, Value::Null) {
            return Ok(None);
        }
        match self {
            Self::Plain => Ok(Some(FieldValue::value(value))),
            Self::Enum(mapping) => {
                let case = mapping.case_name(&value)?;
                Ok(Some(FieldValue::value(Value::Enum(Name::new(case)))))
            }
            Self::Node(node_types) => {
                let type_name = node_types.resolve(&value)?;
                Ok(Some(FieldValue::value(value).with_type(type_name)))
            }
            Self::List(inner) => match value {
                Value::List(items) => {
                    let mut values = Vec::with_capacity(items.len());
                    for item in items {
                        values.push(inner.field_value(item)?.unwrap_or(FieldValue::NULL));
                    }
                    Ok(Some(FieldValue::list(values)))
                }
                other => Ok(Some(FieldValue::value(other))),
            },
        }
    }
}

struct Shapes {
    enums: HashMap<String, Arc<EnumMapping>>,
    node_types: Arc<NodeTypes>,
}

impl Shapes {
    fn shape_of(&mut self, ty: &SchemaType) -> OutputShape {
        match ty {
            SchemaType::NonNull(inner) => self.shape_of(inner),
            SchemaType::List(inner) => OutputShape::List(Box::new(self.shape_of(inner))),
            SchemaType::Enum(enum_type) => OutputShape::Enum(Arc::clone(
                self.enums
                    .entry(enum_type.name.clone())
                    .or_insert_with(|| Arc::new(EnumMapping::new(enum_type))),
            )),
            SchemaType::Interface(interface) if interface.name == NODE_INTERFACE => {
                OutputShape::Node(Arc::clone(&self.node_types))
            }
            _ => OutputShape::Plain,
        }
    }
}

fn enum_definition(enum_type: &EnumType) -> Enum {
    let mut definition = Enum::new(enum_type.name.as_str());
    if let Some(description) = &enum_type.description {
        definition = definition.description(description);
    }
    for (case, value) in &enum_type.values {
        let mut item = EnumItem::new(case.as_str());
        if let Some(description) = &value.description {
            item = item.description(description);
        }
        definition = definition.item(item);
    }
    definition
}

fn interface_definition(interface: &InterfaceType) -> Interface {
    let mut definition = Interface::new(interface.name.as_str());
    if let Some(description) = &interface.description {
        definition = definition.description(description);
    }
    for (name, field) in &interface.fields {
        let mut interface_field = InterfaceField::new(name.as_str(), field.ty.to_type_ref());
        if let Some(description) = &field.description {
            interface_field = interface_field.description(description);
        }
        definition = definition.field(interface_field);
    }
    definition
}

fn object_definition(object: &ObjectType, shapes: &mut Shapes) -> Result<Object, GraphQLError> {
    let fields = object.fields.get()?;
    let mut definition = Object::new(object.name.as_str());
    if let Some(description) = &object.description {
        definition = definition.description(description);
    }
    if implements_node(object) {
        for interface in &object.interfaces {
            definition = definition.implement(interface.name.as_str());
        }
    }
    if fields.is_empty() {
        trace!(type_name = %object.name, "Adding placeholder field to empty object");
        return Ok(definition.field(placeholder_field()));
    }
    for (name, field) in fields.iter() {
        definition = definition.field(output_field(name, field, shapes));
    }
    Ok(definition)
}

fn input_object_definition(input: &InputObjectType) -> Result<InputObject, GraphQLError> {
    let fields = input.fields.get()?;
    let mut definition = InputObject::new(input.name.as_str());
    if let Some(description) = &input.description {
        definition = definition.description(description);
    }
    if fields.is_empty() {
        return Ok(definition.field(InputValue::new(PLACEHOLDER_FIELD, TypeRef::named(TypeRef::STRING))));
    }
    for (name, field) in fields.iter() {
        let mut value = InputValue::new(name.as_str(), field.ty.to_type_ref());
        if let Some(description) = &field.description {
            value = value.description(description);
        }
        definition = definition.field(value);
    }
    Ok(definition)
}

fn root_object(name: &str, fields: &FieldMap, shapes: &mut Shapes) -> Object {
    fields.iter().fold(Object::new(name), |object, (field_name, field)| {
        object.field(output_field(field_name, field, shapes))
    })
}

fn placeholder_field() -> Field {
    Field::new(PLACEHOLDER_FIELD, TypeRef::named(TypeRef::STRING), |_| {
        FieldFuture::new(async { Ok(None::<FieldValue>) })
    })
}

fn arguments(definition: &FieldDefinition) -> Vec<InputValue> {
    definition
        .args
        .iter()
        .map(|(name, arg)| {
            let mut value = InputValue::new(name.as_str(), arg.ty.to_type_ref());
            if let Some(description) = &arg.description {
                value = value.description(description);
            }
            value
        })
        .collect()
}

fn resolve_info(ctx: &ResolverContext<'_>, field_name: &str) -> ResolveInfo {
    ResolveInfo {
        field_name: field_name.to_string(),
        source: ctx
            .parent_value
            .as_value()
            .filter(|value| !matches!(value, Value::Null))
            .map(graphql_value_to_json),
        args: ctx
            .args
            .iter()
            .map(|(name, value)| (name.to_string(), graphql_value_to_json(value.as_value())))
            .collect(),
    }
}

fn output_field(name: &str, definition: &FieldDefinition, shapes: &mut Shapes) -> Field {
    let shape = shapes.shape_of(&definition.ty);
    let resolver: Option<DynFieldResolver> = definition.resolver.clone();
    let field_name = name.to_string();

    let mut field = Field::new(name, definition.ty.to_type_ref(), move |ctx| {
        let resolver = resolver.clone();
        let shape = shape.clone();
        let field_name = field_name.clone();
        FieldFuture::new(async move {
            let value = match resolver {
                Some(resolver) => {
                    let info = resolve_info(&ctx, &field_name);
                    json_to_graphql_value(resolver.resolve(info).await.map_err(|e| e.extend())?)
                }
                None => match ctx.parent_value.as_value() {
                    Some(Value::Object(parent)) => {
                        parent.get(field_name.as_str()).cloned().unwrap_or(Value::Null)
                    }
                    _ => Value::Null,
                },
            };
            shape.field_value(value)
        })
    });

    for argument in arguments(definition) {
        field = field.argument(argument);
    }
    if let Some(description) = &definition.description {
        field = field.description(description);
    }
    if let Some(reason) = &definition.deprecation_reason {
        field = field.deprecation(Some(reason.as_str()));
    }
    field
}

fn subscription_root(fields: &FieldMap) -> Subscription {
    let mut subscription = Subscription::new(SUBSCRIPTION);
    for (name, definition) in fields {
        let resolver = definition.resolver.clone();
        let field_name = name.clone();
        let mut field = SubscriptionField::new(name.as_str(), definition.ty.to_type_ref(), move |ctx| {
            let resolver = resolver.clone();
            let field_name = field_name.clone();
            SubscriptionFieldFuture::new(async move {
                let value = match resolver {
                    Some(resolver) => {
                        json_to_graphql_value(
                            resolver
                                .resolve(resolve_info(&ctx, &field_name))
                                .await
                                .map_err(|e| e.extend())?,
                        )
                    }
                    None => Value::Null,
                };
                Ok(stream::once(async move {
                    Ok::<_, async_graphql::Error>(FieldValue::value(value))
                }))
            })
        });
        for argument in arguments(definition) {
            field = field.argument(argument);
        }
        if let Some(description) = &definition.description {
            field = field.description(description);
        }
        subscription = subscription.field(field);
    }
    subscription
}
