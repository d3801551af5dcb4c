//! Conversion of property types to schema types.

use std::rc::Rc;
use std::sync::Arc;

use apigen_metadata::{
    Builtin, COLLECTION_QUERY, EnumFieldsProvider, ITEM_QUERY, MetadataProvider, Operation,
    PropertyContext, PropertyType, class_basename,
};
use async_graphql_parser::types::{BaseType, Type};
use tracing::trace;

use super::type_builder::{TypeBuilder, TypeContext};
use crate::error::GraphQLError;
use crate::types::{SchemaType, TypesContainer};

/// Name of the scalar for arrays of unknown shape.
pub const ITERABLE_TYPE: &str = "Iterable";

/// Outcome of a conversion.
#[derive(Debug, Clone)]
pub enum ConvertedType {
    Type(SchemaType),
    /// Name of a container type, resolved by the caller.
    Reference(String),
}

impl From<SchemaType> for ConvertedType {
    fn from(ty: SchemaType) -> Self {
        Self::Type(ty)
    }
}

/// Maps property types to schema types, building resource types on demand.
pub struct TypeConverter {
    type_builder: Rc<TypeBuilder>,
    types: Rc<TypesContainer>,
    metadata: Arc<dyn MetadataProvider>,
    enums: Arc<dyn EnumFieldsProvider>,
}

impl TypeConverter {
    pub fn new(
        type_builder: Rc<TypeBuilder>,
        types: Rc<TypesContainer>,
        metadata: Arc<dyn MetadataProvider>,
        enums: Arc<dyn EnumFieldsProvider>,
    ) -> Self {
        Self {
            type_builder,
            types,
            metadata,
            enums,
        }
    }

    /// Converts `ty`, the type of `property` on `root_resource`.
    ///
    /// Returns `None` when the type has no schema representation.
    #[allow(clippy::too_many_arguments)]
    pub fn convert_type(
        &self,
        ty: &PropertyType,
        input: bool,
        root_operation: &Operation,
        resource_class: &str,
        root_resource: &str,
        property: Option<&str>,
        depth: usize,
    ) -> Result<Option<ConvertedType>, GraphQLError> {
        let converted = match ty.builtin_kind() {
            Builtin::Bool => Some(SchemaType::boolean().into()),
            Builtin::Int => Some(SchemaType::int().into()),
            Builtin::Float => Some(SchemaType::float().into()),
            Builtin::String => Some(SchemaType::string().into()),
            Builtin::Array | Builtin::Iterable => {
                match self.get_resource_type(ty, input, root_operation, root_resource, property, depth)? {
                    Some(resource_type) => Some(resource_type.into()),
                    None => Some(ConvertedType::Reference(ITERABLE_TYPE.to_string())),
                }
            }
            Builtin::Object => {
                if ty.is_date_time() {
                    Some(SchemaType::string().into())
                } else {
                    self.get_resource_type(ty, input, root_operation, root_resource, property, depth)?
                        .map(ConvertedType::Type)
                }
            }
            Builtin::Null | Builtin::Mixed => None,
        };

        trace!(
            property_type = %ty,
            resource_class,
            converted = ?converted,
            "Converted property type"
        );
        Ok(converted)
    }

    /// Parses a type string such as `[String!]!` and resolves its named type
    /// against the standard scalars and the container.
    pub fn resolve_type(&self, type_string: &str) -> Result<SchemaType, GraphQLError> {
        let parsed = Type::new(type_string).ok_or_else(|| {
            GraphQLError::invalid_argument(format!("\"{type_string}\" is not a valid GraphQL type."))
        })?;
        self.resolve_parsed(&parsed).ok_or_else(|| {
            GraphQLError::invalid_argument(format!("The type \"{type_string}\" was not resolved."))
        })
    }

    fn resolve_parsed(&self, parsed: &Type) -> Option<SchemaType> {
        let ty = match &parsed.base {
            BaseType::Named(name) => SchemaType::standard(name.as_str())
                .or_else(|| self.types.get(name.as_str()).ok())?,
            BaseType::List(inner) => SchemaType::list_of(self.resolve_parsed(inner)?),
        };
        Some(if parsed.nullable { ty } else { SchemaType::non_null(ty) })
    }

    fn get_resource_type(
        &self,
        ty: &PropertyType,
        input: bool,
        root_operation: &Operation,
        root_resource: &str,
        property: Option<&str>,
        depth: usize,
    ) -> Result<Option<SchemaType>, GraphQLError> {
        let class = if TypeBuilder::is_collection(ty) {
            ty.collection_value_types().first().and_then(PropertyType::class_name)
        } else {
            ty.class_name()
        };
        let Some(class) = class else {
            return Ok(None);
        };

        if !self.metadata.is_resource_class(class) {
            if self.enums.is_backed_enum(class) {
                let description = self.enums.enum_description(class);
                return self
                    .type_builder
                    .get_enum_type(class, class_basename(class), description)
                    .map(Some);
            }
            return Ok(None);
        }

        let resource = self.metadata.resource_metadata(class)?;
        if !resource.has_graphql_operations() {
            if self.enums.is_backed_enum(class) {
                return self
                    .type_builder
                    .get_enum_type(class, &resource.short_name, resource.description.clone())
                    .map(Some);
            }
            return Ok(None);
        }

        let property_metadata = match property {
            Some(property) if input => {
                let context = PropertyContext::for_operation(root_operation);
                Some(self.metadata.property_metadata(root_resource, property, &context)?)
            }
            _ => None,
        };

        if input && depth > 0 && !property_metadata.as_ref().is_some_and(|p| p.is_writable_link()) {
            return Ok(Some(SchemaType::string()));
        }

        let is_collection = TypeBuilder::is_collection(ty);
        let operation_key = if class != root_resource && root_operation.is_query() {
            (if is_collection { COLLECTION_QUERY } else { ITEM_QUERY }).to_string()
        } else {
            root_operation.key()
        };
        let operation = match resource.operation(&operation_key) {
            Ok(operation) => operation,
            Err(_) => resource.operation(if is_collection { COLLECTION_QUERY } else { ITEM_QUERY })?,
        };

        let context = TypeContext {
            input,
            wrapped: false,
            depth,
        };
        self.type_builder
            .get_resource_object_type(&resource, operation, property_metadata.as_ref(), context)
            .map(Some)
    }
}

#[cfg(test)]
mod tests {
    use apigen_metadata::OperationKind;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test_support::{BOOK, bookstore_factory};

    fn converted(result: Option<ConvertedType>) -> String {
        match result {
            Some(ConvertedType::Type(ty)) => ty.to_string(),
            Some(ConvertedType::Reference(name)) => format!("ref:{name}"),
            None => "none".to_string(),
        }
    }

    fn item_query() -> Operation {
        Operation::new(OperationKind::Query, ITEM_QUERY, BOOK, "Book")
    }

    fn convert(spec: &str, input: bool, depth: usize, property: Option<&str>) -> String {
        let fields_builder = bookstore_factory().fields_builder();
        let ty: PropertyType = spec.parse().unwrap();
        let result = fields_builder
            .type_converter()
            .convert_type(&ty, input, &item_query(), "", BOOK, property, depth)
            .unwrap();
        converted(result)
    }

    #[test]
    fn test_builtin_types() {
        assert_eq!(convert("bool", false, 0, None), "Boolean");
        assert_eq!(convert("int", false, 0, None), "Int");
        assert_eq!(convert("float", false, 0, None), "Float");
        assert_eq!(convert("?string", false, 0, None), "String");
        assert_eq!(convert("DateTimeInterface", false, 0, None), "String");
        assert_eq!(convert("mixed", false, 0, None), "none");
    }

    #[test]
    fn test_untyped_collections_are_iterable() {
        assert_eq!(convert("array", false, 0, None), "ref:Iterable");
        assert_eq!(convert("string[]", false, 0, None), "ref:Iterable");
    }

    #[test]
    fn test_resources_and_enums() {
        assert_eq!(convert("App\\Entity\\Author", false, 1, None), "Author");
        assert_eq!(convert("App\\Entity\\Review[]", false, 1, None), "Review");
        assert_eq!(convert("App\\Enum\\BookStatus", false, 1, None), "BookStatusEnum");
        // No GraphQL operations.
        assert_eq!(convert("App\\Entity\\Publisher", false, 1, None), "none");
        assert_eq!(convert("App\\Dto\\Unknown", false, 1, None), "none");
    }

    #[test]
    fn test_nested_input_without_writable_link_is_an_iri() {
        assert_eq!(convert("App\\Entity\\Author", true, 1, Some("author")), "String");
    }

    #[test]
    fn test_resolve_type() {
        let fields_builder = bookstore_factory().fields_builder();
        let converter = fields_builder.type_converter();

        assert_eq!(converter.resolve_type("[String!]!").unwrap().to_string(), "[String!]!");
        assert_eq!(converter.resolve_type("ID").unwrap().to_string(), "ID");

        let err = converter.resolve_type("[String").unwrap_err();
        assert_eq!(err.to_string(), "\"[String\" is not a valid GraphQL type.");
        let err = converter.resolve_type("Book").unwrap_err();
        assert_eq!(err.to_string(), "The type \"Book\" was not resolved.");
    }

    #[test]
    fn test_resolve_registered_type() {
        let fields_builder = bookstore_factory().fields_builder();
        fields_builder
            .types()
            .set("Upload", SchemaType::scalar("Upload", None));

        let ty = fields_builder.type_converter().resolve_type("[Upload]").unwrap();
        assert_eq!(ty.to_string(), "[Upload]");
    }
}
