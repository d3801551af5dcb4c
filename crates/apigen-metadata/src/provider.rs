//! Read-only collaborators consumed by the schema builders.

use std::sync::Arc;

use serde_json::Value;

use crate::error::MetadataError;
use crate::property::{PropertyContext, PropertyDescriptor};
use crate::resource::ResourceDescriptor;

/// Source of resource, property and operation metadata.
pub trait MetadataProvider: Send + Sync {
    /// Resource classes in discovery order.
    fn resource_names(&self) -> Vec<String>;

    fn resource_metadata(&self, class: &str) -> Result<Arc<ResourceDescriptor>, MetadataError>;

    /// Property names of a resource or plain class, in declaration order.
    fn property_names(&self, class: &str) -> Result<Vec<String>, MetadataError>;

    fn property_metadata(
        &self,
        class: &str,
        property: &str,
        context: &PropertyContext,
    ) -> Result<PropertyDescriptor, MetadataError>;

    fn is_resource_class(&self, class: &str) -> bool;
}

/// One case of a backed enum.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumCase {
    pub name: String,
    /// Backing value.
    pub value: Value,
    pub description: Option<String>,
}

/// Enumerates the cases of backed enums.
pub trait EnumFieldsProvider: Send + Sync {
    /// Cases of `class`, or `None` if it is not a backed enum.
    fn enum_cases(&self, class: &str) -> Option<Vec<EnumCase>>;

    fn enum_description(&self, _class: &str) -> Option<String> {
        None
    }

    fn is_backed_enum(&self, class: &str) -> bool {
        self.enum_cases(class).is_some()
    }
}
