//! Condition catalog - the kinds of conditions a rule can be built from

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{ParseError, normalize_token};

/// A type of condition the merchant can add to a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionKind {
    /// Specific products in the cart
    Products,
    /// Products from specific collections in the cart
    Collections,
    /// Products with specific tags in the cart
    ProductTags,
    /// Minimum required cart total
    MinimumCartTotal,
}

impl ConditionKind {
    /// All kinds in catalog order
    pub fn all() -> &'static [ConditionKind] {
        &[
            ConditionKind::Products,
            ConditionKind::Collections,
            ConditionKind::ProductTags,
            ConditionKind::MinimumCartTotal,
        ]
    }

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            ConditionKind::Products => "Products",
            ConditionKind::Collections => "Collections",
            ConditionKind::ProductTags => "Product tags",
            ConditionKind::MinimumCartTotal => "Minimum cart total",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ConditionKind::Products => "Specific products in the cart",
            ConditionKind::Collections => "Products from specific collections in the cart",
            ConditionKind::ProductTags => "Products with specific tags in the cart",
            ConditionKind::MinimumCartTotal => {
                "Minimum required total amount (including tax & shipping)"
            }
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            ConditionKind::Products | ConditionKind::ProductTags => "📦",
            ConditionKind::Collections => "🗂",
            ConditionKind::MinimumCartTotal => "🛒",
        }
    }

    /// snake_case identifier, as serialized
    pub fn slug(self) -> &'static str {
        match self {
            ConditionKind::Products => "products",
            ConditionKind::Collections => "collections",
            ConditionKind::ProductTags => "product_tags",
            ConditionKind::MinimumCartTotal => "minimum_cart_total",
        }
    }
}

impl std::fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ConditionKind {
    type Err = ParseError;

    /// Accepts the slug, the display name or a kebab-case form, ignoring case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = normalize_token(s);
        ConditionKind::all()
            .iter()
            .copied()
            .find(|kind| kind.slug() == token)
            .ok_or_else(|| ParseError::UnknownCondition(s.to_string()))
    }
}

/// Catalog metadata for one condition kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub kind: ConditionKind,
    pub name: &'static str,
    pub description: &'static str,
}

/// List the available condition kinds with their display metadata
pub fn list_available() -> Vec<CatalogEntry> {
    ConditionKind::all()
        .iter()
        .map(|&kind| CatalogEntry {
            kind,
            name: kind.name(),
            description: kind.description(),
        })
        .collect()
}
