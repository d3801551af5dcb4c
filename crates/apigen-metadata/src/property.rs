//! Property descriptors.

use crate::property_type::PropertyType;
use crate::resource::Operation;

/// One field of a resource or class.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyDescriptor {
    /// Ordered type candidates. A union carries one entry per member.
    pub types: Vec<PropertyType>,
    pub readable: Option<bool>,
    pub writable: Option<bool>,
    pub description: Option<String>,
    pub deprecation_reason: Option<String>,
    /// Security expression guarding the property, if any.
    pub security: Option<String>,
    pub readable_link: Option<bool>,
    pub writable_link: Option<bool>,
    pub required: Option<bool>,
}

impl PropertyDescriptor {
    pub fn new(types: Vec<PropertyType>) -> Self {
        Self {
            types,
            ..Self::default()
        }
    }

    /// Only an explicit `false` hides the property from output types.
    pub fn is_readable(&self) -> bool {
        self.readable != Some(false)
    }

    /// Only an explicit `false` hides the property from input types.
    pub fn is_writable(&self) -> bool {
        self.writable != Some(false)
    }

    /// Whether nested inputs accept a full object instead of an identifier.
    pub fn is_writable_link(&self) -> bool {
        self.writable_link == Some(true)
    }

    /// An unknown requirement counts as required.
    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(true)
    }

    pub fn has_security(&self) -> bool {
        self.security.is_some()
    }
}

/// Serialization context a property is read for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyContext {
    pub normalization_groups: Option<Vec<String>>,
    pub denormalization_groups: Option<Vec<String>>,
}

impl PropertyContext {
    /// Context derived from the serialization groups of `operation`.
    pub fn for_operation(operation: &Operation) -> Self {
        Self {
            normalization_groups: operation.normalization_groups(),
            denormalization_groups: operation.denormalization_groups(),
        }
    }
}
