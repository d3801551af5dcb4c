//! Built-in property type descriptors.
//!
//! A property is described by one or more [`PropertyType`] candidates. Most
//! properties have exactly one; union types (`int|string`) carry one
//! candidate per member, tried in declaration order by the schema builders.
//!
//! Types are written in a compact notation in metadata documents:
//!
//! | notation | meaning |
//! |---|---|
//! | `string`, `int`, `float`, `bool` | scalar built-ins |
//! | `?string`, `string\|null` | nullable |
//! | `App\Entity\Author` | object of the given class |
//! | `App\Entity\Review[]` | array collection of objects |
//! | `string[]` | array collection of scalars |
//! | `array`, `iterable` | untyped collections |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MetadataError;

/// Class names treated as date/time values.
pub const DATE_TIME_CLASSES: &[&str] = &[
    "DateTime",
    "DateTimeImmutable",
    "DateTimeInterface",
    "\\DateTime",
    "\\DateTimeImmutable",
    "\\DateTimeInterface",
];

/// Built-in kind of a property type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Builtin {
    Bool,
    Int,
    Float,
    String,
    Array,
    Iterable,
    Object,
    Null,
    Mixed,
}

impl Builtin {
    /// Parses a built-in type name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "bool" | "boolean" => Some(Self::Bool),
            "int" | "integer" => Some(Self::Int),
            "float" | "double" => Some(Self::Float),
            "string" => Some(Self::String),
            "array" => Some(Self::Array),
            "iterable" => Some(Self::Iterable),
            "object" => Some(Self::Object),
            "null" => Some(Self::Null),
            "mixed" => Some(Self::Mixed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
            Self::Array => "array",
            Self::Iterable => "iterable",
            Self::Object => "object",
            Self::Null => "null",
            Self::Mixed => "mixed",
        }
    }
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One candidate type of a property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyType {
    builtin: Builtin,
    nullable: bool,
    class: Option<String>,
    collection: bool,
    value_types: Vec<PropertyType>,
}

impl PropertyType {
    /// A scalar or untyped built-in.
    pub fn builtin(builtin: Builtin, nullable: bool) -> Self {
        Self {
            builtin,
            nullable,
            class: None,
            collection: matches!(builtin, Builtin::Array | Builtin::Iterable),
            value_types: Vec::new(),
        }
    }

    /// An object of `class`.
    pub fn object(class: impl Into<String>, nullable: bool) -> Self {
        Self {
            builtin: Builtin::Object,
            nullable,
            class: Some(class.into()),
            collection: false,
            value_types: Vec::new(),
        }
    }

    /// An array collection whose elements are `value`.
    pub fn array_of(value: PropertyType, nullable: bool) -> Self {
        Self {
            builtin: Builtin::Array,
            nullable,
            class: None,
            collection: true,
            value_types: vec![value],
        }
    }

    /// An iterable collection whose elements are `value`.
    pub fn iterable_of(value: PropertyType, nullable: bool) -> Self {
        Self {
            builtin: Builtin::Iterable,
            nullable,
            class: None,
            collection: true,
            value_types: vec![value],
        }
    }

    pub fn builtin_kind(&self) -> Builtin {
        self.builtin
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn class_name(&self) -> Option<&str> {
        self.class.as_deref()
    }

    pub fn is_collection(&self) -> bool {
        self.collection
    }

    pub fn collection_value_types(&self) -> &[PropertyType] {
        &self.value_types
    }

    /// Returns a copy with the given nullability.
    #[must_use]
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Whether this is an object of one of the date/time classes.
    pub fn is_date_time(&self) -> bool {
        self.builtin == Builtin::Object
            && self
                .class
                .as_deref()
                .is_some_and(|class| DATE_TIME_CLASSES.contains(&class))
    }

    /// Parses the compact notation into the ordered list of candidates.
    ///
    /// A `null` member of a union is not a candidate of its own; it makes
    /// every other member nullable.
    pub fn parse_candidates(spec: &str) -> Result<Vec<PropertyType>, MetadataError> {
        let members: Vec<&str> = spec.split('|').map(str::trim).collect();
        if members.iter().any(|m| m.is_empty()) {
            return Err(MetadataError::InvalidPropertyType(spec.to_string()));
        }

        let union_nullable = members.len() > 1 && members.contains(&"null");
        let mut candidates = Vec::with_capacity(members.len());
        for member in members {
            if union_nullable && member == "null" {
                continue;
            }
            let candidate: PropertyType = member.parse()?;
            candidates.push(if union_nullable {
                candidate.with_nullable(true)
            } else {
                candidate
            });
        }

        Ok(candidates)
    }
}

impl FromStr for PropertyType {
    type Err = MetadataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (nullable, rest) = match s.strip_prefix('?') {
            Some(rest) => (true, rest.trim()),
            None => (false, s),
        };

        if rest.is_empty() || rest.contains('|') {
            return Err(MetadataError::InvalidPropertyType(s.to_string()));
        }

        if let Some(element) = rest.strip_suffix("[]") {
            let value: PropertyType = element.parse()?;
            if value.is_nullable() {
                return Err(MetadataError::InvalidPropertyType(s.to_string()));
            }
            return Ok(Self::array_of(value, nullable));
        }

        if let Some(builtin) = Builtin::from_name(rest) {
            return Ok(Self::builtin(builtin, nullable || builtin == Builtin::Null));
        }

        if !is_valid_class_name(rest) {
            return Err(MetadataError::InvalidPropertyType(s.to_string()));
        }

        Ok(Self::object(rest, nullable))
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nullable && self.builtin != Builtin::Null {
            f.write_str("?")?;
        }
        match (&self.class, self.value_types.first()) {
            (Some(class), _) => f.write_str(class),
            (None, Some(value)) if self.builtin == Builtin::Array => write!(f, "{value}[]"),
            (None, Some(value)) => write!(f, "iterable<{value}>"),
            (None, None) => f.write_str(self.builtin.as_str()),
        }
    }
}

fn is_valid_class_name(name: &str) -> bool {
    let mut chars = name.trim_start_matches('\\').chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '\\')
}

/// Returns the last namespace segment of a class name.
pub fn class_basename(class: &str) -> &str {
    class.rsplit('\\').next().unwrap_or(class)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scalars() {
        let ty: PropertyType = "string".parse().unwrap();
        assert_eq!(ty.builtin_kind(), Builtin::String);
        assert!(!ty.is_nullable());
        assert!(!ty.is_collection());

        let ty: PropertyType = "?int".parse().unwrap();
        assert_eq!(ty.builtin_kind(), Builtin::Int);
        assert!(ty.is_nullable());
    }

    #[test]
    fn test_parse_object_and_collection() {
        let ty: PropertyType = "?App\\Entity\\Author".parse().unwrap();
        assert_eq!(ty.builtin_kind(), Builtin::Object);
        assert_eq!(ty.class_name(), Some("App\\Entity\\Author"));
        assert!(ty.is_nullable());

        let ty: PropertyType = "App\\Entity\\Review[]".parse().unwrap();
        assert_eq!(ty.builtin_kind(), Builtin::Array);
        assert!(ty.is_collection());
        assert_eq!(
            ty.collection_value_types()[0].class_name(),
            Some("App\\Entity\\Review")
        );

        let ty: PropertyType = "string[]".parse().unwrap();
        assert!(ty.is_collection());
        assert_eq!(ty.collection_value_types()[0].class_name(), None);
    }

    #[test]
    fn test_parse_union() {
        let candidates = PropertyType::parse_candidates("int|string|null").unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].builtin_kind(), Builtin::Int);
        assert_eq!(candidates[1].builtin_kind(), Builtin::String);
        assert!(candidates.iter().all(PropertyType::is_nullable));
    }

    #[test]
    fn test_parse_invalid() {
        assert!("".parse::<PropertyType>().is_err());
        assert!("?".parse::<PropertyType>().is_err());
        assert!("9Lives".parse::<PropertyType>().is_err());
        assert!("?string[]".parse::<PropertyType>().is_ok());
        assert!(PropertyType::parse_candidates("int||string").is_err());
    }

    #[test]
    fn test_date_time() {
        let ty: PropertyType = "DateTimeImmutable".parse().unwrap();
        assert!(ty.is_date_time());
        let ty: PropertyType = "App\\Entity\\Book".parse().unwrap();
        assert!(!ty.is_date_time());
    }

    #[test]
    fn test_display_roundtrip_notation() {
        for notation in ["string", "?int", "App\\Entity\\Review[]", "?App\\Entity\\Author"] {
            let ty: PropertyType = notation.parse().unwrap();
            assert_eq!(ty.to_string(), notation);
        }
    }

    #[test]
    fn test_class_basename() {
        assert_eq!(class_basename("App\\Entity\\Book"), "Book");
        assert_eq!(class_basename("Book"), "Book");
    }
}
