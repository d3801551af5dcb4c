use thiserror::Error;

/// Errors raised while reading resource metadata.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("Resource \"{0}\" not found")]
    ResourceClassNotFound(String),

    #[error("Operation \"{operation}\" not found for resource \"{resource}\"")]
    OperationNotFound { resource: String, operation: String },

    #[error("Operation \"{operation}\" is declared twice on resource \"{resource}\"")]
    DuplicateOperation { resource: String, operation: String },

    #[error("Property \"{property}\" not found on class \"{class}\"")]
    PropertyNotFound { class: String, property: String },

    #[error("Invalid property type \"{0}\"")]
    InvalidPropertyType(String),

    #[error("Failed to parse metadata document: {0}")]
    Parse(String),
}

impl MetadataError {
    /// Create a new OperationNotFound error
    pub fn operation_not_found(resource: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::OperationNotFound {
            resource: resource.into(),
            operation: operation.into(),
        }
    }

    /// Create a new PropertyNotFound error
    pub fn property_not_found(class: impl Into<String>, property: impl Into<String>) -> Self {
        Self::PropertyNotFound {
            class: class.into(),
            property: property.into(),
        }
    }
}

impl From<toml::de::Error> for MetadataError {
    fn from(err: toml::de::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<serde_json::Error> for MetadataError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
