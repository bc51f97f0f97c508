//! Selected conditions - catalog kinds added to a draft, with their parameters

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::catalog::ConditionKind;
use crate::error::{ParseError, normalize_token};

/// Identifier of a condition within one editing session.
///
/// Assigned in creation order starting at 1 and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConditionId(pub u64);

impl std::fmt::Display for ConditionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Whether a Collections condition applies when the collection is present or absent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionMatch {
    #[default]
    Found,
    NotFound,
}

impl CollectionMatch {
    pub fn label(self) -> &'static str {
        match self {
            Self::Found => "If found",
            Self::NotFound => "If not found",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Self::Found => Self::NotFound,
            Self::NotFound => Self::Found,
        }
    }
}

impl FromStr for CollectionMatch {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "found" => Ok(Self::Found),
            "not_found" => Ok(Self::NotFound),
            _ => Err(ParseError::InvalidValue {
                field: "matchMode",
                value: s.to_string(),
            }),
        }
    }
}

/// Comparison applied to the product amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparator {
    #[default]
    MoreThan,
    LessThan,
}

impl Comparator {
    pub fn label(self) -> &'static str {
        match self {
            Self::MoreThan => "More than",
            Self::LessThan => "Less than",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Self::MoreThan => Self::LessThan,
            Self::LessThan => Self::MoreThan,
        }
    }
}

impl FromStr for Comparator {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "more_than" => Ok(Self::MoreThan),
            "less_than" => Ok(Self::LessThan),
            _ => Err(ParseError::InvalidValue {
                field: "comparator",
                value: s.to_string(),
            }),
        }
    }
}

/// Kind-specific parameters of a selected condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ConditionParams {
    Products {
        comparator: Comparator,
        /// Raw text as typed; not checked to be numeric
        amount: String,
    },
    Collections {
        match_mode: CollectionMatch,
        collection_names: String,
    },
    ProductTags,
    MinimumCartTotal,
}

impl ConditionParams {
    /// Default parameters for a freshly added condition of `kind`
    pub fn defaults_for(kind: ConditionKind) -> Self {
        match kind {
            ConditionKind::Products => Self::Products {
                comparator: Comparator::default(),
                amount: String::new(),
            },
            ConditionKind::Collections => Self::Collections {
                match_mode: CollectionMatch::default(),
                collection_names: String::new(),
            },
            ConditionKind::ProductTags => Self::ProductTags,
            ConditionKind::MinimumCartTotal => Self::MinimumCartTotal,
        }
    }

    pub fn kind(&self) -> ConditionKind {
        match self {
            Self::Products { .. } => ConditionKind::Products,
            Self::Collections { .. } => ConditionKind::Collections,
            Self::ProductTags => ConditionKind::ProductTags,
            Self::MinimumCartTotal => ConditionKind::MinimumCartTotal,
        }
    }

    /// Apply one parameter update.
    ///
    /// Returns `false` when the parameter does not exist on this kind.
    pub fn apply(&mut self, param: ConditionParam) -> bool {
        match (self, param) {
            (Self::Collections { match_mode, .. }, ConditionParam::MatchMode(m)) => {
                *match_mode = m;
                true
            }
            (Self::Collections { collection_names, .. }, ConditionParam::CollectionNames(v)) => {
                *collection_names = v;
                true
            }
            (Self::Products { comparator, .. }, ConditionParam::Comparator(c)) => {
                *comparator = c;
                true
            }
            (Self::Products { amount, .. }, ConditionParam::Amount(v)) => {
                *amount = v;
                true
            }
            _ => false,
        }
    }
}

/// A single parameter edit, one variant per editable field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionParam {
    MatchMode(CollectionMatch),
    CollectionNames(String),
    Comparator(Comparator),
    Amount(String),
}

impl ConditionParam {
    /// Build a parameter edit from its serialized field name and a text value
    pub fn parse(field: &str, value: &str) -> Result<Self, ParseError> {
        match field.trim() {
            "matchMode" | "match_mode" => Ok(Self::MatchMode(value.parse()?)),
            "collectionNames" | "collection_names" => Ok(Self::CollectionNames(value.to_string())),
            "comparator" => Ok(Self::Comparator(value.parse()?)),
            "amount" => Ok(Self::Amount(value.to_string())),
            other => Err(ParseError::UnknownField(other.to_string())),
        }
    }
}

/// One condition instance in the draft
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedCondition {
    pub id: ConditionId,

    #[serde(flatten)]
    pub params: ConditionParams,
}

impl SelectedCondition {
    pub fn new(id: ConditionId, kind: ConditionKind) -> Self {
        Self {
            id,
            params: ConditionParams::defaults_for(kind),
        }
    }

    pub fn kind(&self) -> ConditionKind {
        self.params.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_kind() {
        for &kind in ConditionKind::all() {
            assert_eq!(ConditionParams::defaults_for(kind).kind(), kind);
        }
    }

    #[test]
    fn test_apply_rejects_foreign_param() {
        let mut params = ConditionParams::defaults_for(ConditionKind::Products);
        assert!(!params.apply(ConditionParam::MatchMode(CollectionMatch::NotFound)));
        assert!(params.apply(ConditionParam::Amount("abc".to_string())));
        assert_eq!(
            params,
            ConditionParams::Products {
                comparator: Comparator::MoreThan,
                amount: "abc".to_string(),
            }
        );

        let mut tags = ConditionParams::defaults_for(ConditionKind::ProductTags);
        assert!(!tags.apply(ConditionParam::Amount("5".to_string())));
    }

    #[test]
    fn test_parse_param() {
        assert_eq!(
            ConditionParam::parse("matchMode", "not_found").unwrap(),
            ConditionParam::MatchMode(CollectionMatch::NotFound)
        );
        assert_eq!(
            ConditionParam::parse("comparator", "less-than").unwrap(),
            ConditionParam::Comparator(Comparator::LessThan)
        );
        assert!(matches!(
            ConditionParam::parse("colour", "red"),
            Err(ParseError::UnknownField(_))
        ));
        assert!(matches!(
            ConditionParam::parse("matchMode", "sometimes"),
            Err(ParseError::InvalidValue { field: "matchMode", .. })
        ));
    }

    #[test]
    fn test_serialize_flat() {
        let condition = SelectedCondition {
            id: ConditionId(3),
            params: ConditionParams::Collections {
                match_mode: CollectionMatch::Found,
                collection_names: "Summer".to_string(),
            },
        };

        let value = serde_json::to_value(&condition).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": 3,
                "kind": "collections",
                "matchMode": "found",
                "collectionNames": "Summer"
            })
        );

        let unit = SelectedCondition::new(ConditionId(4), ConditionKind::MinimumCartTotal);
        assert_eq!(
            serde_json::to_value(&unit).unwrap(),
            serde_json::json!({ "id": 4, "kind": "minimum_cart_total" })
        );
    }
}
