//! Error types for element set parsing.

use thiserror::Error;

/// A malformed element set.
///
/// Fatal for the record being parsed; catalog loading treats it as fatal
/// for the whole load so object indices stay dense.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ElementError {
    /// A line does not match the fixed-column grammar.
    #[error("element set {name} line {line} has incorrect format")]
    Grammar { name: String, line: u8 },

    /// The two lines name different objects.
    #[error("element set {name} does not have the same catalog id on both lines ({line1} / {line2})")]
    CatalogIdMismatch {
        name: String,
        line1: String,
        line2: String,
    },

    /// A field matched the grammar but could not be converted.
    #[error("element set {name} field {field} has invalid value '{value}'")]
    InvalidField {
        name: String,
        field: &'static str,
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grammar_error_display() {
        let err = ElementError::Grammar {
            name: "47966".to_string(),
            line: 2,
        };
        assert_eq!(err.to_string(), "element set 47966 line 2 has incorrect format");
    }

    #[test]
    fn test_mismatch_error_display() {
        let err = ElementError::CatalogIdMismatch {
            name: "pair".to_string(),
            line1: "25544".to_string(),
            line2: "25545".to_string(),
        };
        assert!(err.to_string().contains("25544 / 25545"));
    }
}
