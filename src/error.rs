//! Errors for text-to-value conversions (CLI flags, config values)

use thiserror::Error;

/// Failure to turn user-supplied text into one of the rule enums.
///
/// Draft operations themselves never fail; this only surfaces where text
/// enters the crate from outside (command line, config file).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown condition '{0}' (expected products, collections, product_tags or minimum_cart_total)")]
    UnknownCondition(String),

    #[error("unknown match logic '{0}' (expected 'all' or 'any')")]
    UnknownMatchLogic(String),

    #[error("unknown flag '{0}' (expected hide, sort or rename)")]
    UnknownFlag(String),

    #[error("unknown rename mode '{0}' (expected replace, before or after)")]
    UnknownRenameMode(String),

    #[error("unknown condition field '{0}'")]
    UnknownField(String),

    #[error("invalid value '{value}' for {field}")]
    InvalidValue { field: &'static str, value: String },
}

/// Normalize a user-typed token: lowercase, `-` and spaces become `_`
pub(crate) fn normalize_token(s: &str) -> String {
    s.trim()
        .chars()
        .map(|c| match c {
            '-' | ' ' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_token() {
        assert_eq!(normalize_token("Product tags"), "product_tags");
        assert_eq!(normalize_token(" minimum-cart-total "), "minimum_cart_total");
        assert_eq!(normalize_token("NOT_FOUND"), "not_found");
    }

    #[test]
    fn test_error_messages() {
        let err = ParseError::InvalidValue {
            field: "matchMode",
            value: "maybe".to_string(),
        };
        assert_eq!(err.to_string(), "invalid value 'maybe' for matchMode");
        assert!(
            ParseError::UnknownMatchLogic("some".into())
                .to_string()
                .contains("'all' or 'any'")
        );
    }
}
