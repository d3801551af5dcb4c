//! Error types for schema generation and resolution.
//!
//! Build-time errors fall into two groups. [`GraphQLError::InvalidType`] is
//! swallowed per field by the fields builder: the field is left out of the
//! schema. Everything else propagates and fails the build.

use apigen_metadata::MetadataError;
use async_graphql::ErrorExtensions;
use thiserror::Error;

/// Errors that can occur while building or serving a schema.
#[derive(Debug, Error)]
pub enum GraphQLError {
    /// A property type that cannot be represented, or a type reference
    /// that is not registered.
    #[error("{0}")]
    InvalidType(String),

    /// A custom argument without a type, or an unparsable type string.
    #[error("{0}")]
    InvalidArgument(String),

    /// A type name absent from the types container.
    #[error("Type with name \"{0}\" is not present in the types container")]
    TypeNotFound(String),

    /// Metadata lookup failure, including unknown operations.
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    /// Violation of a builder invariant.
    #[error("Logic error: {0}")]
    Logic(String),

    /// Schema is still being built - client should retry.
    #[error("GraphQL schema is initializing, please retry")]
    SchemaInitializing,

    /// Schema build failed.
    #[error("Failed to build GraphQL schema: {0}")]
    SchemaBuildFailed(String),

    /// Item not found by a resolver.
    #[error("Item \"{iri}\" not found")]
    NotFound {
        /// IRI of the missing item.
        iri: String,
    },

    /// Data layer failure.
    #[error("State error: {0}")]
    State(String),
}

impl GraphQLError {
    pub fn invalid_type(msg: impl Into<String>) -> Self {
        Self::InvalidType(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn logic(msg: impl Into<String>) -> Self {
        Self::Logic(msg.into())
    }

    /// Whether the error only disqualifies the field being built.
    #[must_use]
    pub fn is_invalid_type(&self) -> bool {
        matches!(self, Self::InvalidType(_))
    }

    /// Returns the error code for GraphQL error extensions.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidType(_) => "INVALID_TYPE",
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::TypeNotFound(_) => "TYPE_NOT_FOUND",
            Self::Metadata(MetadataError::OperationNotFound { .. }) => "OPERATION_NOT_FOUND",
            Self::Metadata(_) => "METADATA_ERROR",
            Self::Logic(_) => "LOGIC_ERROR",
            Self::SchemaInitializing => "SCHEMA_INITIALIZING",
            Self::SchemaBuildFailed(_) => "SCHEMA_BUILD_FAILED",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::State(_) => "STATE_ERROR",
        }
    }

    /// Returns the Retry-After value in seconds, if applicable.
    #[must_use]
    pub fn retry_after(&self) -> Option<u32> {
        match self {
            Self::SchemaInitializing => Some(5),
            _ => None,
        }
    }
}

impl ErrorExtensions for GraphQLError {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.to_string()).extend_with(|_, ext| {
            ext.set("code", self.error_code());
            if let Some(seconds) = self.retry_after() {
                ext.set("retryAfter", seconds);
            }
        })
    }
}
