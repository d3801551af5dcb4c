//! Schema type model produced by the builders.
//!
//! Types are shared through `Rc` so that the container can hand out the
//! identical instance for every request of a name. Object and input object
//! fields are a [`LazyFields`] thunk, evaluated at most once, which lets
//! types reference each other before their peers are complete.

mod container;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use async_graphql::dynamic::TypeRef;
use indexmap::IndexMap;
use serde_json::Value;

use crate::error::GraphQLError;
use crate::resolvers::DynFieldResolver;

pub use container::TypesContainer;

/// Insertion-ordered fields of an object or input object.
pub type FieldMap = IndexMap<String, FieldDefinition>;

/// Insertion-ordered arguments of a field.
pub type ArgumentMap = IndexMap<String, InputValueDefinition>;

/// Deferred computation of a field map.
pub type FieldsThunk = Box<dyn FnOnce() -> Result<FieldMap, GraphQLError>>;

/// Names of the built-in GraphQL scalars.
pub const STANDARD_SCALARS: [&str; 5] = ["String", "Int", "Float", "Boolean", "ID"];

/// Name of the Relay node interface.
pub const NODE_INTERFACE: &str = "Node";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarType {
    pub name: String,
    pub description: Option<String>,
}

pub struct ObjectType {
    pub name: String,
    pub description: Option<String>,
    pub interfaces: Vec<Rc<InterfaceType>>,
    pub fields: LazyFields,
}

pub struct InputObjectType {
    pub name: String,
    pub description: Option<String>,
    pub fields: LazyFields,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumValueDefinition {
    /// Backing value the case is serialized from.
    pub value: Value,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumType {
    pub name: String,
    pub description: Option<String>,
    /// Cases keyed by name.
    pub values: IndexMap<String, EnumValueDefinition>,
}

pub struct InterfaceType {
    pub name: String,
    pub description: Option<String>,
    pub fields: FieldMap,
}

/// A type of the generated schema.
#[derive(Clone)]
pub enum SchemaType {
    Scalar(Rc<ScalarType>),
    Object(Rc<ObjectType>),
    InputObject(Rc<InputObjectType>),
    Enum(Rc<EnumType>),
    Interface(Rc<InterfaceType>),
    List(Box<SchemaType>),
    NonNull(Box<SchemaType>),
}

impl SchemaType {
    pub fn scalar(name: impl Into<String>, description: Option<String>) -> Self {
        Self::Scalar(Rc::new(ScalarType {
            name: name.into(),
            description,
        }))
    }

    pub fn string() -> Self {
        Self::scalar("String", None)
    }

    pub fn int() -> Self {
        Self::scalar("Int", None)
    }

    pub fn float() -> Self {
        Self::scalar("Float", None)
    }

    pub fn boolean() -> Self {
        Self::scalar("Boolean", None)
    }

    pub fn id() -> Self {
        Self::scalar("ID", None)
    }

    /// Built-in scalar of that name, if any.
    pub fn standard(name: &str) -> Option<Self> {
        STANDARD_SCALARS
            .contains(&name)
            .then(|| Self::scalar(name, None))
    }

    pub fn list_of(inner: SchemaType) -> Self {
        Self::List(Box::new(inner))
    }

    /// Wraps in non-null unless already non-null.
    pub fn non_null(inner: SchemaType) -> Self {
        match inner {
            Self::NonNull(_) => inner,
            other => Self::NonNull(Box::new(other)),
        }
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, Self::NonNull(_))
    }

    pub fn is_list(&self) -> bool {
        match self {
            Self::List(_) => true,
            Self::NonNull(inner) => inner.is_list(),
            _ => false,
        }
    }

    /// The innermost named type.
    pub fn named_type(&self) -> &SchemaType {
        match self {
            Self::List(inner) | Self::NonNull(inner) => inner.named_type(),
            named => named,
        }
    }

    /// One wrapper removed, as the type loader returns it.
    pub fn unwrap_once(&self) -> &SchemaType {
        match self {
            Self::List(inner) | Self::NonNull(inner) => inner,
            named => named,
        }
    }

    /// Name of the innermost named type.
    pub fn name(&self) -> &str {
        match self.named_type() {
            Self::Scalar(t) => &t.name,
            Self::Object(t) => &t.name,
            Self::InputObject(t) => &t.name,
            Self::Enum(t) => &t.name,
            Self::Interface(t) => &t.name,
            Self::List(_) | Self::NonNull(_) => unreachable!("named_type never returns a wrapper"),
        }
    }

    pub fn is_standard_scalar(&self) -> bool {
        matches!(self.named_type(), Self::Scalar(t) if STANDARD_SCALARS.contains(&t.name.as_str()))
    }

    /// Whether this is an input type (scalar, enum or input object).
    pub fn is_input_type(&self) -> bool {
        matches!(
            self.named_type(),
            Self::Scalar(_) | Self::Enum(_) | Self::InputObject(_)
        )
    }

    pub fn as_object(&self) -> Option<&Rc<ObjectType>> {
        match self {
            Self::Object(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_input_object(&self) -> Option<&Rc<InputObjectType>> {
        match self {
            Self::InputObject(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&Rc<EnumType>> {
        match self {
            Self::Enum(t) => Some(t),
            _ => None,
        }
    }

    /// Identity comparison: same wrappers around the same instance.
    pub fn ptr_eq(&self, other: &SchemaType) -> bool {
        match (self, other) {
            (Self::Scalar(a), Self::Scalar(b)) => Rc::ptr_eq(a, b),
            (Self::Object(a), Self::Object(b)) => Rc::ptr_eq(a, b),
            (Self::InputObject(a), Self::InputObject(b)) => Rc::ptr_eq(a, b),
            (Self::Enum(a), Self::Enum(b)) => Rc::ptr_eq(a, b),
            (Self::Interface(a), Self::Interface(b)) => Rc::ptr_eq(a, b),
            (Self::List(a), Self::List(b)) | (Self::NonNull(a), Self::NonNull(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Reference used by the execution engine.
    pub fn to_type_ref(&self) -> TypeRef {
        match self {
            Self::List(inner) => TypeRef::List(Box::new(inner.to_type_ref())),
            Self::NonNull(inner) => TypeRef::NonNull(Box::new(inner.to_type_ref())),
            named => TypeRef::Named(named.name().to_string().into()),
        }
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List(inner) => write!(f, "[{inner}]"),
            Self::NonNull(inner) => write!(f, "{inner}!"),
            named => f.write_str(named.name()),
        }
    }
}

impl fmt::Debug for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SchemaType({self})")
    }
}

/// One field of an object, input object or interface.
#[derive(Clone)]
pub struct FieldDefinition {
    pub ty: SchemaType,
    pub description: Option<String>,
    pub args: ArgumentMap,
    /// `None` means default property access on the parent value.
    pub resolver: Option<DynFieldResolver>,
    pub deprecation_reason: Option<String>,
}

impl FieldDefinition {
    pub fn new(ty: SchemaType) -> Self {
        Self {
            ty,
            description: None,
            args: ArgumentMap::new(),
            resolver: None,
            deprecation_reason: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl fmt::Debug for FieldDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDefinition")
            .field("ty", &self.ty)
            .field("description", &self.description)
            .field("args", &self.args)
            .field("resolver", &self.resolver.is_some())
            .field("deprecation_reason", &self.deprecation_reason)
            .finish()
    }
}

/// One argument of a field.
#[derive(Debug, Clone)]
pub struct InputValueDefinition {
    pub ty: SchemaType,
    pub description: Option<String>,
}

impl InputValueDefinition {
    pub fn new(ty: SchemaType) -> Self {
        Self {
            ty,
            description: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl From<InputValueDefinition> for FieldDefinition {
    fn from(input: InputValueDefinition) -> Self {
        Self {
            description: input.description,
            ..Self::new(input.ty)
        }
    }
}

/// Field map computed on first access.
pub struct LazyFields {
    thunk: RefCell<Option<FieldsThunk>>,
    resolved: RefCell<Option<Rc<FieldMap>>>,
}

impl LazyFields {
    pub fn new(thunk: impl FnOnce() -> Result<FieldMap, GraphQLError> + 'static) -> Self {
        Self {
            thunk: RefCell::new(Some(Box::new(thunk))),
            resolved: RefCell::new(None),
        }
    }

    /// Fields known up front.
    pub fn ready(fields: FieldMap) -> Self {
        Self {
            thunk: RefCell::new(None),
            resolved: RefCell::new(Some(Rc::new(fields))),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.borrow().is_some()
    }

    /// Evaluates the thunk on first call and returns the memoized map.
    pub fn get(&self) -> Result<Rc<FieldMap>, GraphQLError> {
        if let Some(fields) = self.resolved.borrow().as_ref() {
            return Ok(Rc::clone(fields));
        }

        let thunk = self
            .thunk
            .borrow_mut()
            .take()
            .ok_or_else(|| GraphQLError::logic("fields requested while being resolved"))?;
        let fields = Rc::new(thunk()?);
        *self.resolved.borrow_mut() = Some(Rc::clone(&fields));
        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn test_display_notation() {
        let ty = SchemaType::non_null(SchemaType::list_of(SchemaType::non_null(SchemaType::string())));
        assert_eq!(ty.to_string(), "[String!]!");
        assert_eq!(ty.name(), "String");
        assert!(ty.is_list());
        assert!(ty.is_standard_scalar());
        assert_eq!(ty.unwrap_once().to_string(), "[String!]");
    }

    #[test]
    fn test_non_null_is_idempotent() {
        let ty = SchemaType::non_null(SchemaType::non_null(SchemaType::id()));
        assert_eq!(ty.to_string(), "ID!");
    }

    #[test]
    fn test_ptr_eq() {
        let a = SchemaType::scalar("Iterable", None);
        let b = SchemaType::scalar("Iterable", None);
        assert!(a.ptr_eq(&a.clone()));
        assert!(!a.ptr_eq(&b));
        assert!(SchemaType::list_of(a.clone()).ptr_eq(&SchemaType::list_of(a)));
    }

    #[test]
    fn test_type_ref() {
        let ty = SchemaType::list_of(SchemaType::non_null(SchemaType::int()));
        assert_eq!(ty.to_type_ref().to_string(), "[Int!]");
    }

    #[test]
    fn test_lazy_fields_evaluated_once() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let fields = LazyFields::new(move || {
            counter.set(counter.get() + 1);
            let mut map = FieldMap::new();
            map.insert("id".into(), FieldDefinition::new(SchemaType::id()));
            Ok(map)
        });

        assert!(!fields.is_resolved());
        let first = fields.get().unwrap();
        let second = fields.get().unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(calls.get(), 1);
        assert!(fields.is_resolved());
    }

    #[test]
    fn test_lazy_fields_error_is_not_retried() {
        let fields = LazyFields::new(|| Err(GraphQLError::invalid_argument("broken")));
        assert!(matches!(fields.get(), Err(GraphQLError::InvalidArgument(_))));
        assert!(matches!(fields.get(), Err(GraphQLError::Logic(_))));
    }
}
