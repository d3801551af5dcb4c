//! Cursor encoding for cursor-paginated connections.
//!
//! A cursor is the base64 encoding of the item's zero-based offset.

use base64::Engine;

use crate::error::GraphQLError;

pub(crate) fn encode(offset: usize) -> String {
    base64::engine::general_purpose::STANDARD.encode(offset.to_string())
}

pub(crate) fn decode(cursor: &str) -> Result<usize, GraphQLError> {
    base64::engine::general_purpose::STANDARD
        .decode(cursor)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .and_then(|offset| offset.parse().ok())
        .ok_or_else(|| GraphQLError::invalid_argument(format!("Cursor \"{cursor}\" is invalid")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode() {
        assert_eq!(encode(0), "MA==");
        assert_eq!(encode(10), "MTA=");
    }

    #[test]
    fn test_decode() {
        assert_eq!(decode("MTA=").unwrap(), 10);
        assert!(decode("not base64!").is_err());
        assert!(decode("YWJj").is_err());
    }
}
