//! Registry of the types built during one schema build.

use std::cell::RefCell;

use indexmap::IndexMap;

use super::SchemaType;
use crate::error::GraphQLError;

/// Maps type names to built types.
///
/// Scoped to a single build and not thread-safe: each build creates its
/// own container and drops it once the schema is materialized.
#[derive(Default)]
pub struct TypesContainer {
    types: RefCell<IndexMap<String, SchemaType>>,
}

impl TypesContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `ty` under `name`, replacing any previous entry.
    pub fn set(&self, name: impl Into<String>, ty: SchemaType) {
        self.types.borrow_mut().insert(name.into(), ty);
    }

    pub fn has(&self, name: &str) -> bool {
        self.types.borrow().contains_key(name)
    }

    pub fn get(&self, name: &str) -> Result<SchemaType, GraphQLError> {
        self.types
            .borrow()
            .get(name)
            .cloned()
            .ok_or_else(|| GraphQLError::TypeNotFound(name.to_string()))
    }

    /// Snapshot of every registered type in registration order.
    pub fn all(&self) -> IndexMap<String, SchemaType> {
        self.types.borrow().clone()
    }

    pub fn names(&self) -> Vec<String> {
        self.types.borrow().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.types.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.borrow().is_empty()
    }
}

impl std::fmt::Debug for TypesContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypesContainer")
            .field("types", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_has() {
        let container = TypesContainer::new();
        assert!(!container.has("Iterable"));

        let iterable = SchemaType::scalar("Iterable", None);
        container.set("Iterable", iterable.clone());
        assert!(container.has("Iterable"));
        assert!(container.get("Iterable").unwrap().ptr_eq(&iterable));
        assert_eq!(container.len(), 1);
    }

    #[test]
    fn test_get_missing() {
        let container = TypesContainer::new();
        let err = container.get("Book").unwrap_err();
        assert!(matches!(err, GraphQLError::TypeNotFound(name) if name == "Book"));
    }

    #[test]
    fn test_set_overwrites_silently() {
        let container = TypesContainer::new();
        let first = SchemaType::scalar("Upload", None);
        let second = SchemaType::scalar("Upload", Some("File upload".into()));
        container.set("Upload", first);
        container.set("Upload", second.clone());
        assert!(container.get("Upload").unwrap().ptr_eq(&second));
        assert_eq!(container.all().len(), 1);
    }
}
