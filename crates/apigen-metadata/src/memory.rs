//! In-memory metadata loaded from TOML or JSON documents.
//!
//! # Example Document
//!
//! ```toml
//! [[resources]]
//! class = "App\\Entity\\Book"
//! description = "A book."
//!
//! [[resources.properties]]
//! name = "title"
//! type = "string"
//!
//! [[resources.graphql]]
//! kind = "query"
//!
//! [[resources.graphql]]
//! kind = "query_collection"
//! filters = ["book.search"]
//!
//! [filters."book.search"]
//! kind = "search"
//! properties = ["title"]
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::MetadataError;
use crate::filter::{ConfiguredFilter, FilterKind, MemoryFilterRegistry};
use crate::property::{PropertyContext, PropertyDescriptor};
use crate::property_type::{PropertyType, class_basename};
use crate::provider::{EnumCase, EnumFieldsProvider, MetadataProvider};
use crate::resource::{
    ArgumentSpec, IoMetadata, Operation, OperationKind, PaginationType, Parameter,
    ResourceDescriptor,
};

/// Root of a metadata document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MetadataDocument {
    pub resources: Vec<ResourceDocument>,
    /// Plain classes (DTOs) that only carry properties.
    pub classes: Vec<ClassDocument>,
    pub enums: Vec<EnumDocument>,
    pub filters: IndexMap<String, FilterDocument>,
}

impl MetadataDocument {
    pub fn from_toml_str(source: &str) -> Result<Self, MetadataError> {
        Ok(toml::from_str(source)?)
    }

    pub fn from_json_str(source: &str) -> Result<Self, MetadataError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Reads a document, choosing the format from the file extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MetadataError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| MetadataError::Parse(format!("{}: {e}", path.display())))?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&source),
            _ => Self::from_toml_str(&source),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResourceDocument {
    pub class: String,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Default mercure flag of the resource's operations.
    #[serde(default)]
    pub mercure: bool,
    #[serde(default)]
    pub properties: Vec<PropertyDocument>,
    /// Absent when the resource is not exposed through GraphQL.
    #[serde(default)]
    pub graphql: Option<Vec<OperationDocument>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassDocument {
    pub class: String,
    #[serde(default)]
    pub properties: Vec<PropertyDocument>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PropertyDocument {
    pub name: String,
    #[serde(rename = "type", default)]
    pub ty: Option<String>,
    #[serde(default)]
    pub readable: Option<bool>,
    #[serde(default)]
    pub writable: Option<bool>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub deprecation_reason: Option<String>,
    #[serde(default)]
    pub security: Option<String>,
    #[serde(default)]
    pub readable_link: Option<bool>,
    #[serde(default)]
    pub writable_link: Option<bool>,
    #[serde(default)]
    pub required: Option<bool>,
    /// Serialization groups the property belongs to.
    #[serde(default)]
    pub groups: Option<Vec<String>>,
}

/// `true` keeps the default class, `false` declares a null class, a string
/// overrides the class.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IoDocument {
    Enabled(bool),
    Class(String),
}

impl IoDocument {
    fn into_metadata(self) -> Option<IoMetadata> {
        match self {
            Self::Enabled(true) => None,
            Self::Enabled(false) => Some(IoMetadata::disabled()),
            Self::Class(class) => Some(IoMetadata::class(class)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OperationDocument {
    pub kind: OperationKind,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub normalization_context: Option<Map<String, Value>>,
    #[serde(default)]
    pub denormalization_context: Option<Map<String, Value>>,
    #[serde(default)]
    pub args: Option<IndexMap<String, ArgumentSpec>>,
    #[serde(default)]
    pub extra_args: Option<IndexMap<String, ArgumentSpec>>,
    #[serde(default)]
    pub parameters: IndexMap<String, Parameter>,
    #[serde(default)]
    pub nested: bool,
    #[serde(default)]
    pub deprecation_reason: Option<String>,
    #[serde(default)]
    pub mercure: Option<bool>,
    #[serde(default)]
    pub filters: Vec<String>,
    #[serde(default)]
    pub resolver: Option<String>,
    #[serde(default)]
    pub input: Option<IoDocument>,
    #[serde(default)]
    pub output: Option<IoDocument>,
    #[serde(default)]
    pub pagination_enabled: Option<bool>,
    #[serde(default)]
    pub pagination_type: Option<PaginationType>,
    #[serde(default)]
    pub pagination_client_items_per_page: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnumDocument {
    pub class: String,
    #[serde(default)]
    pub description: Option<String>,
    pub cases: Vec<EnumCaseDocument>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnumCaseDocument {
    pub name: String,
    pub value: Value,
    #[serde(default)]
    pub description: Option<String>,
}

/// Properties of a configured filter, as a list or as a map of options.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FilterProperties {
    List(Vec<String>),
    Map(IndexMap<String, String>),
}

#[derive(Debug, Clone, Deserialize)]
pub struct FilterDocument {
    pub kind: FilterKind,
    pub properties: FilterProperties,
}

impl FilterDocument {
    fn to_filter(&self) -> ConfiguredFilter {
        let properties = match &self.properties {
            FilterProperties::List(names) => names.iter().map(|name| (name.clone(), None)).collect(),
            FilterProperties::Map(options) => options
                .iter()
                .map(|(name, option)| (name.clone(), Some(option.clone())))
                .collect(),
        };
        ConfiguredFilter::new(self.kind, properties)
    }
}

impl MemoryFilterRegistry {
    /// Registry holding every filter declared in `document`.
    pub fn from_document(document: &MetadataDocument) -> Self {
        document
            .filters
            .iter()
            .fold(Self::new(), |registry, (id, filter)| {
                registry.with_filter(id.clone(), Arc::new(filter.to_filter()))
            })
    }
}

#[derive(Debug, Clone)]
struct PropertyEntry {
    descriptor: PropertyDescriptor,
    groups: Option<Vec<String>>,
}

impl PropertyEntry {
    fn from_document(class: &str, property: &PropertyDocument) -> Result<Self, MetadataError> {
        let types = match &property.ty {
            Some(ty) => PropertyType::parse_candidates(ty).map_err(|_| {
                MetadataError::InvalidPropertyType(format!("{class}::{}: {ty}", property.name))
            })?,
            None => Vec::new(),
        };

        Ok(Self {
            descriptor: PropertyDescriptor {
                types,
                readable: property.readable,
                writable: property.writable,
                description: property.description.clone(),
                deprecation_reason: property.deprecation_reason.clone(),
                security: property.security.clone(),
                readable_link: property.readable_link,
                writable_link: property.writable_link,
                required: property.required,
            },
            groups: property.groups.clone(),
        })
    }

    /// Applies serialization group visibility for `context`.
    fn resolve(&self, context: &PropertyContext) -> PropertyDescriptor {
        let mut descriptor = self.descriptor.clone();
        if let Some(groups) = &context.normalization_groups {
            if !self.in_groups(groups) {
                descriptor.readable = Some(false);
            }
        }
        if let Some(groups) = &context.denormalization_groups {
            if !self.in_groups(groups) {
                descriptor.writable = Some(false);
            }
        }
        descriptor
    }

    fn in_groups(&self, groups: &[String]) -> bool {
        self.groups
            .as_ref()
            .is_some_and(|own| own.iter().any(|group| groups.contains(group)))
    }
}

#[derive(Debug, Clone)]
struct EnumEntry {
    description: Option<String>,
    cases: Vec<EnumCase>,
}

/// Metadata provider over a [`MetadataDocument`].
#[derive(Debug, Clone, Default)]
pub struct MemoryMetadataProvider {
    resources: IndexMap<String, Arc<ResourceDescriptor>>,
    properties: HashMap<String, IndexMap<String, PropertyEntry>>,
    enums: HashMap<String, EnumEntry>,
}

impl MemoryMetadataProvider {
    pub fn new(document: &MetadataDocument) -> Result<Self, MetadataError> {
        let mut provider = Self::default();

        for resource in &document.resources {
            let descriptor = resource_descriptor(resource)?;
            provider
                .resources
                .insert(resource.class.clone(), Arc::new(descriptor));
            provider.insert_properties(&resource.class, &resource.properties)?;
        }

        for class in &document.classes {
            provider.insert_properties(&class.class, &class.properties)?;
        }

        for enum_doc in &document.enums {
            provider.enums.insert(
                enum_doc.class.clone(),
                EnumEntry {
                    description: enum_doc.description.clone(),
                    cases: enum_doc
                        .cases
                        .iter()
                        .map(|case| EnumCase {
                            name: case.name.clone(),
                            value: case.value.clone(),
                            description: case.description.clone(),
                        })
                        .collect(),
                },
            );
        }

        debug!(
            resources = provider.resources.len(),
            classes = provider.properties.len(),
            enums = provider.enums.len(),
            "Loaded metadata document"
        );

        Ok(provider)
    }

    pub fn from_toml_str(source: &str) -> Result<Self, MetadataError> {
        Self::new(&MetadataDocument::from_toml_str(source)?)
    }

    fn insert_properties(
        &mut self,
        class: &str,
        properties: &[PropertyDocument],
    ) -> Result<(), MetadataError> {
        let entries = properties
            .iter()
            .map(|property| {
                PropertyEntry::from_document(class, property)
                    .map(|entry| (property.name.clone(), entry))
            })
            .collect::<Result<IndexMap<_, _>, _>>()?;
        self.properties.insert(class.to_string(), entries);
        Ok(())
    }
}

fn resource_descriptor(resource: &ResourceDocument) -> Result<ResourceDescriptor, MetadataError> {
    let short_name = resource
        .short_name
        .clone()
        .unwrap_or_else(|| class_basename(&resource.class).to_string());

    let graphql_operations = match &resource.graphql {
        Some(documents) => {
            let mut operations = IndexMap::new();
            for document in documents {
                let operation = operation_from_document(resource, &short_name, document);
                let key = operation.key();
                if operations.contains_key(&key) {
                    return Err(MetadataError::DuplicateOperation {
                        resource: resource.class.clone(),
                        operation: key,
                    });
                }
                operations.insert(key, operation);
            }
            Some(operations)
        }
        None => None,
    };

    Ok(ResourceDescriptor {
        class: resource.class.clone(),
        short_name,
        description: resource.description.clone(),
        graphql_operations,
    })
}

fn operation_from_document(
    resource: &ResourceDocument,
    short_name: &str,
    op: &OperationDocument,
) -> Operation {
    let name = op
        .name
        .clone()
        .or_else(|| op.kind.default_name().map(str::to_string))
        .unwrap_or_else(|| format!("{:?}", op.kind).to_lowercase());

    Operation {
        kind: op.kind,
        name,
        class: resource.class.clone(),
        short_name: short_name.to_string(),
        description: op.description.clone(),
        normalization_context: op.normalization_context.clone(),
        denormalization_context: op.denormalization_context.clone(),
        args: op.args.clone(),
        extra_args: op.extra_args.clone(),
        parameters: op.parameters.clone(),
        nested: op.nested,
        deprecation_reason: op.deprecation_reason.clone(),
        mercure: op.mercure.unwrap_or(resource.mercure),
        filters: op.filters.clone(),
        resolver: op.resolver.clone(),
        input: op.input.clone().and_then(IoDocument::into_metadata),
        output: op.output.clone().and_then(IoDocument::into_metadata),
        pagination_enabled: op.pagination_enabled,
        pagination_type: op.pagination_type,
        pagination_client_items_per_page: op.pagination_client_items_per_page,
    }
}

impl MetadataProvider for MemoryMetadataProvider {
    fn resource_names(&self) -> Vec<String> {
        self.resources.keys().cloned().collect()
    }

    fn resource_metadata(&self, class: &str) -> Result<Arc<ResourceDescriptor>, MetadataError> {
        self.resources
            .get(class)
            .cloned()
            .ok_or_else(|| MetadataError::ResourceClassNotFound(class.to_string()))
    }

    fn property_names(&self, class: &str) -> Result<Vec<String>, MetadataError> {
        self.properties
            .get(class)
            .map(|properties| properties.keys().cloned().collect())
            .ok_or_else(|| MetadataError::ResourceClassNotFound(class.to_string()))
    }

    fn property_metadata(
        &self,
        class: &str,
        property: &str,
        context: &PropertyContext,
    ) -> Result<PropertyDescriptor, MetadataError> {
        self.properties
            .get(class)
            .and_then(|properties| properties.get(property))
            .map(|entry| entry.resolve(context))
            .ok_or_else(|| MetadataError::property_not_found(class, property))
    }

    fn is_resource_class(&self, class: &str) -> bool {
        self.resources.contains_key(class)
    }
}

impl EnumFieldsProvider for MemoryMetadataProvider {
    fn enum_cases(&self, class: &str) -> Option<Vec<EnumCase>> {
        self.enums.get(class).map(|entry| entry.cases.clone())
    }

    fn enum_description(&self, class: &str) -> Option<String> {
        self.enums.get(class).and_then(|entry| entry.description.clone())
    }
}
