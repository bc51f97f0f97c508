//! Payment method draft - the methods a rule hides, sorts or renames

use indexmap::IndexMap;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, warn};

use crate::error::{ParseError, normalize_token};

/// Payment methods offered for selection when no config overrides them
pub const DEFAULT_CANDIDATES: &[&str] = &["Cash on Delivery (COD)", "Amazon Pay", "PayPal"];

/// How a rename value is combined with the method name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenameMode {
    #[default]
    Replace,
    Before,
    After,
}

impl RenameMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Replace => "Replace With",
            Self::Before => "Add Before",
            Self::After => "Add After",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Replace => Self::Before,
            Self::Before => Self::After,
            Self::After => Self::Replace,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Replace => Self::After,
            Self::Before => Self::Replace,
            Self::After => Self::Before,
        }
    }

    /// Preview the name a customer would see. An empty value leaves the name as is.
    pub fn apply(self, name: &str, value: &str) -> String {
        let value = value.trim();
        if value.is_empty() {
            return name.to_string();
        }
        match self {
            Self::Replace => value.to_string(),
            Self::Before => format!("{} {}", value, name),
            Self::After => format!("{} {}", name, value),
        }
    }
}

impl FromStr for RenameMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "replace" | "replace_with" => Ok(Self::Replace),
            "before" | "add_before" => Ok(Self::Before),
            "after" | "add_after" => Ok(Self::After),
            _ => Err(ParseError::UnknownRenameMode(s.to_string())),
        }
    }
}

/// One payment method targeted by the rule
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodEntry {
    pub name: String,

    /// Sort key, used when sorting is enabled
    #[serde(default)]
    pub order_value: Option<String>,

    #[serde(default)]
    pub rename_mode: RenameMode,

    #[serde(default)]
    pub rename_value: Option<String>,
}

impl PaymentMethodEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Name after applying the rename settings
    pub fn renamed(&self) -> String {
        self.rename_mode
            .apply(&self.name, self.rename_value.as_deref().unwrap_or(""))
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

/// Full state of the payment draft, as sent to the editing surface after a change
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PaymentSnapshot {
    pub methods: Vec<PaymentMethodEntry>,
}

impl PaymentSnapshot {
    /// Names in insertion order
    pub fn selected_methods(&self) -> Vec<&str> {
        self.methods.iter().map(|m| m.name.as_str()).collect()
    }

    /// Order values keyed by method name, for methods that have one
    pub fn order_numbers(&self) -> IndexMap<&str, &str> {
        self.methods
            .iter()
            .filter_map(|m| m.order_value.as_deref().map(|v| (m.name.as_str(), v)))
            .collect()
    }
}

/// Payment methods selected for the rule, keyed by name in insertion order
#[derive(Debug, Clone, Default)]
pub struct PaymentMethodDraft {
    entries: IndexMap<String, PaymentMethodEntry>,
}

impl PaymentMethodDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a method by name.
    ///
    /// The name is trimmed. Empty names and names already present (exact,
    /// case-sensitive) are ignored and `false` is returned.
    pub fn add_method(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.entries.contains_key(name) {
            debug!("Ignoring payment method '{}'", name);
            return false;
        }
        self.entries
            .insert(name.to_string(), PaymentMethodEntry::new(name));
        true
    }

    /// Remove a method together with its order and rename data
    pub fn remove_method(&mut self, name: &str) -> bool {
        self.entries.shift_remove(name).is_some()
    }

    pub fn set_order_value(&mut self, name: &str, value: impl Into<String>) -> bool {
        match self.entries.get_mut(name) {
            Some(entry) => {
                entry.order_value = non_empty(value.into());
                true
            }
            None => false,
        }
    }

    pub fn set_rename_mode(&mut self, name: &str, mode: RenameMode) -> bool {
        match self.entries.get_mut(name) {
            Some(entry) => {
                entry.rename_mode = mode;
                true
            }
            None => false,
        }
    }

    pub fn set_rename_value(&mut self, name: &str, value: impl Into<String>) -> bool {
        match self.entries.get_mut(name) {
            Some(entry) => {
                entry.rename_value = non_empty(value.into());
                true
            }
            None => false,
        }
    }

    pub fn get(&self, name: &str) -> Option<&PaymentMethodEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn entries(&self) -> impl Iterator<Item = &PaymentMethodEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn snapshot(&self) -> PaymentSnapshot {
        PaymentSnapshot {
            methods: self.entries.values().cloned().collect(),
        }
    }
}

/// Static list of payment methods the merchant can pick from
#[derive(Debug, Clone)]
pub struct MethodCatalog {
    candidates: Vec<String>,
}

impl Default for MethodCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_CANDIDATES.iter().map(|s| s.to_string()).collect())
    }
}

impl MethodCatalog {
    pub fn new(candidates: Vec<String>) -> Self {
        Self { candidates }
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Case-insensitive search over the candidates.
    ///
    /// The query is a regular expression; if it does not compile it is
    /// matched as a literal substring instead. An empty query returns all
    /// candidates.
    pub fn search(&self, query: &str) -> Vec<&str> {
        if query.is_empty() {
            return self.candidates.iter().map(String::as_str).collect();
        }

        match compile_query(query) {
            Some(regex) => self
                .candidates
                .iter()
                .map(String::as_str)
                .filter(|c| regex.is_match(c))
                .collect(),
            None => {
                let needle = query.to_lowercase();
                self.candidates
                    .iter()
                    .map(String::as_str)
                    .filter(|c| c.to_lowercase().contains(&needle))
                    .collect()
            }
        }
    }
}

/// `None` when the query is not a usable pattern; the caller then matches it literally
fn compile_query(query: &str) -> Option<Regex> {
    RegexBuilder::new(query)
        .case_insensitive(true)
        .build()
        .map_err(|e| warn!("Invalid search pattern '{}': {}", query, e))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_duplicate_is_noop() {
        let mut draft = PaymentMethodDraft::new();
        assert!(draft.add_method("PayPal"));
        assert!(!draft.add_method("PayPal"));
        assert!(!draft.add_method("  PayPal "));
        assert_eq!(draft.len(), 1);
        assert_eq!(draft.get("PayPal").unwrap().name, "PayPal");
    }

    #[test]
    fn test_add_is_case_sensitive() {
        let mut draft = PaymentMethodDraft::new();
        assert!(draft.add_method("PayPal"));
        assert!(draft.add_method("paypal"));
        assert_eq!(draft.len(), 2);
    }

    #[test]
    fn test_add_whitespace_only() {
        let mut draft = PaymentMethodDraft::new();
        assert!(!draft.add_method("  "));
        assert!(!draft.add_method(""));
        assert!(draft.is_empty());
    }

    #[test]
    fn test_add_trims() {
        let mut draft = PaymentMethodDraft::new();
        assert!(draft.add_method("  Amazon Pay  "));
        assert!(draft.contains("Amazon Pay"));
    }

    #[test]
    fn test_remove_discards_fields() {
        let mut draft = PaymentMethodDraft::new();
        draft.add_method("PayPal");
        draft.set_order_value("PayPal", "2");
        draft.set_rename_mode("PayPal", RenameMode::After);
        draft.set_rename_value("PayPal", "(fee)");

        assert!(draft.remove_method("PayPal"));
        assert!(!draft.remove_method("PayPal"));

        draft.add_method("PayPal");
        assert_eq!(draft.get("PayPal").unwrap(), &PaymentMethodEntry::new("PayPal"));
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut draft = PaymentMethodDraft::new();
        for name in DEFAULT_CANDIDATES {
            draft.add_method(name);
        }
        draft.remove_method("Amazon Pay");
        assert_eq!(
            draft.snapshot().selected_methods(),
            vec!["Cash on Delivery (COD)", "PayPal"]
        );
    }

    #[test]
    fn test_setters_on_absent_name() {
        let mut draft = PaymentMethodDraft::new();
        assert!(!draft.set_order_value("PayPal", "1"));
        assert!(!draft.set_rename_mode("PayPal", RenameMode::Before));
        assert!(!draft.set_rename_value("PayPal", "x"));
        assert!(draft.is_empty());
    }

    #[test]
    fn test_order_and_rename_stored_separately() {
        let mut draft = PaymentMethodDraft::new();
        draft.add_method("COD");
        draft.set_order_value("COD", "3");
        draft.set_rename_value("COD", "Pay at door");

        let entry = draft.get("COD").unwrap();
        assert_eq!(entry.order_value.as_deref(), Some("3"));
        assert_eq!(entry.rename_value.as_deref(), Some("Pay at door"));

        draft.set_order_value("COD", "");
        assert_eq!(draft.get("COD").unwrap().order_value, None);
    }

    #[test]
    fn test_snapshot_order_numbers() {
        let mut draft = PaymentMethodDraft::new();
        draft.add_method("PayPal");
        draft.add_method("Amazon Pay");
        draft.set_order_value("Amazon Pay", "1");

        let snapshot = draft.snapshot();
        assert_eq!(snapshot.selected_methods(), vec!["PayPal", "Amazon Pay"]);
        let orders = snapshot.order_numbers();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders.get("Amazon Pay"), Some(&"1"));
    }

    #[test]
    fn test_search() {
        let catalog = MethodCatalog::default();
        assert_eq!(catalog.search("").len(), 3);
        assert_eq!(catalog.search("pay"), vec!["Amazon Pay", "PayPal"]);
        assert_eq!(catalog.search("COD"), vec!["Cash on Delivery (COD)"]);
        assert_eq!(catalog.search("^pay"), vec!["PayPal"]);
        assert!(catalog.search("stripe").is_empty());
    }

    #[test]
    fn test_search_invalid_regex_falls_back_to_literal() {
        let catalog = MethodCatalog::default();
        assert_eq!(catalog.search("(cod"), vec!["Cash on Delivery (COD)"]);
        assert!(catalog.search("[").is_empty());
    }

    #[test]
    fn test_search_oversized_query_matches_literally() {
        let catalog = MethodCatalog::default();
        assert!(catalog.search(&"a".repeat(1_000_000)).is_empty());

        let long_name = format!("Gift card {}", "x".repeat(1_000_000));
        let catalog = MethodCatalog::new(vec![long_name.clone(), "PayPal".to_string()]);
        assert_eq!(catalog.search(&long_name.to_uppercase()), vec![long_name.as_str()]);
    }

    #[test]
    fn test_rename_preview() {
        assert_eq!(RenameMode::Replace.apply("PayPal", "Wallet"), "Wallet");
        assert_eq!(RenameMode::Before.apply("PayPal", "Fast"), "Fast PayPal");
        assert_eq!(RenameMode::After.apply("PayPal", "(2% fee)"), "PayPal (2% fee)");
        assert_eq!(RenameMode::Replace.apply("PayPal", "  "), "PayPal");
    }

    #[test]
    fn test_parse_rename_mode() {
        assert_eq!("Add Before".parse::<RenameMode>().unwrap(), RenameMode::Before);
        assert_eq!("replace".parse::<RenameMode>().unwrap(), RenameMode::Replace);
        assert!("upside-down".parse::<RenameMode>().is_err());
    }
}
