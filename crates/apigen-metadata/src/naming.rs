//! Field and type naming helpers.

use inflector::Inflector as _;

/// Translates property names into exposed field names.
pub trait NameConverter: Send + Sync {
    fn normalize(&self, property: &str, class: Option<&str>) -> String;
}

/// Keeps property names as declared.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityNameConverter;

impl NameConverter for IdentityNameConverter {
    fn normalize(&self, property: &str, _class: Option<&str>) -> String {
        property.to_string()
    }
}

/// Exposes `camelCase` properties as `snake_case` fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnakeCaseNameConverter;

impl NameConverter for SnakeCaseNameConverter {
    fn normalize(&self, property: &str, _class: Option<&str>) -> String {
        property.to_snake_case()
    }
}

/// Pluralizes collection field names.
pub trait Inflector: Send + Sync {
    fn pluralize(&self, word: &str) -> String;
}

/// English pluralization rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishInflector;

impl Inflector for EnglishInflector {
    fn pluralize(&self, word: &str) -> String {
        word.to_plural()
    }
}

/// Lowercases the first character.
pub fn lcfirst(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Uppercases the first character.
pub fn ucfirst(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_helpers() {
        assert_eq!(lcfirst("BookReview"), "bookReview");
        assert_eq!(ucfirst("book"), "Book");
        assert_eq!(lcfirst(""), "");
    }

    #[test]
    fn test_converters() {
        assert_eq!(IdentityNameConverter.normalize("publicationDate", None), "publicationDate");
        assert_eq!(SnakeCaseNameConverter.normalize("publicationDate", None), "publication_date");
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(EnglishInflector.pluralize("book"), "books");
        assert_eq!(EnglishInflector.pluralize("category"), "categories");
    }
}
