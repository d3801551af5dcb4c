//! Filter descriptions.
//!
//! A filter only describes the query keys it understands; applying it to
//! data is the business of the data layer. Keys use the bracket syntax of
//! HTTP query strings (`order[title]`, `tags[]`, `author.name`).

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Description of one key understood by a filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterFieldDescription {
    pub property: Option<String>,

    /// A built-in type name (`string`, `int`, `bool`, ...) or a class name.
    #[serde(rename = "type")]
    pub ty: String,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub is_collection: bool,
}

impl FilterFieldDescription {
    fn new(property: &str, ty: &str) -> Self {
        Self {
            property: Some(property.to_string()),
            ty: ty.to_string(),
            required: false,
            description: None,
            is_collection: false,
        }
    }

    fn collection(mut self) -> Self {
        self.is_collection = true;
        self
    }
}

/// A filter attached to resource operations.
pub trait Filter: Send + Sync {
    fn description(&self, resource_class: &str) -> IndexMap<String, FilterFieldDescription>;
}

/// Filters by id.
pub trait FilterRegistry: Send + Sync {
    fn has(&self, id: &str) -> bool;

    fn get(&self, id: &str) -> Option<Arc<dyn Filter>>;
}

/// Built-in filter kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    Search,
    Order,
    Exists,
    Date,
    Range,
    Boolean,
    Numeric,
}

const ORDER_PARAMETER: &str = "order";
const EXISTS_PARAMETER: &str = "exists";
const DATE_OPERATORS: &[&str] = &["before", "strictly_before", "after", "strictly_after"];
const RANGE_OPERATORS: &[&str] = &["between", "gt", "gte", "lt", "lte"];

/// A filter of one of the built-in kinds over a set of properties.
///
/// `properties` maps each property to an option whose meaning depends on
/// the kind: the match strategy for `search`, the default direction for
/// `order`. Other kinds ignore it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfiguredFilter {
    kind: FilterKind,
    properties: IndexMap<String, Option<String>>,
}

impl ConfiguredFilter {
    pub fn new(kind: FilterKind, properties: IndexMap<String, Option<String>>) -> Self {
        Self { kind, properties }
    }

    pub fn kind(&self) -> FilterKind {
        self.kind
    }
}

impl Filter for ConfiguredFilter {
    fn description(&self, _resource_class: &str) -> IndexMap<String, FilterFieldDescription> {
        let mut description = IndexMap::new();

        for (property, option) in &self.properties {
            match self.kind {
                FilterKind::Search => {
                    let mut field = FilterFieldDescription::new(property, "string");
                    if let Some(strategy) = option {
                        field.description = Some(format!("Matches {property} ({strategy})"));
                    }
                    description.insert(format!("{property}[]"), field.clone().collection());
                    description.insert(property.clone(), field);
                }
                FilterKind::Order => {
                    description.insert(
                        format!("{ORDER_PARAMETER}[{property}]"),
                        FilterFieldDescription::new(property, "string"),
                    );
                }
                FilterKind::Exists => {
                    description.insert(
                        format!("{EXISTS_PARAMETER}[{property}]"),
                        FilterFieldDescription::new(property, "bool"),
                    );
                }
                FilterKind::Date => {
                    for operator in DATE_OPERATORS {
                        description.insert(
                            format!("{property}[{operator}]"),
                            FilterFieldDescription::new(property, "DateTimeInterface"),
                        );
                    }
                }
                FilterKind::Range => {
                    for operator in RANGE_OPERATORS {
                        description.insert(
                            format!("{property}[{operator}]"),
                            FilterFieldDescription::new(property, "string"),
                        );
                    }
                }
                FilterKind::Boolean => {
                    description.insert(property.clone(), FilterFieldDescription::new(property, "bool"));
                }
                FilterKind::Numeric => {
                    let field = FilterFieldDescription::new(property, "int");
                    description.insert(property.clone(), field.clone());
                    description.insert(format!("{property}[]"), field.collection());
                }
            }
        }

        // Plain keys first, then their collection variants.
        description.sort_by(|a, _, b, _| a.ends_with("[]").cmp(&b.ends_with("[]")));
        description
    }
}

/// Filters held in memory.
#[derive(Default, Clone)]
pub struct MemoryFilterRegistry {
    filters: HashMap<String, Arc<dyn Filter>>,
}

impl MemoryFilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, filter: Arc<dyn Filter>) {
        self.filters.insert(id.into(), filter);
    }

    #[must_use]
    pub fn with_filter(mut self, id: impl Into<String>, filter: Arc<dyn Filter>) -> Self {
        self.insert(id, filter);
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl FilterRegistry for MemoryFilterRegistry {
    fn has(&self, id: &str) -> bool {
        self.filters.contains_key(id)
    }

    fn get(&self, id: &str) -> Option<Arc<dyn Filter>> {
        self.filters.get(id).cloned()
    }
}

impl std::fmt::Debug for MemoryFilterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryFilterRegistry")
            .field("filters", &self.filters.keys().collect::<Vec<_>>())
            .finish()
    }
}
