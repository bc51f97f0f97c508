//! Rule model - the draft of a payment method rule and its editing surface

mod catalog;
mod condition;
mod form;
mod payment;
mod sink;

pub use catalog::{CatalogEntry, ConditionKind, list_available};
pub use condition::{
    CollectionMatch, Comparator, ConditionId, ConditionParam, ConditionParams, SelectedCondition,
};
pub use form::{PaymentPayload, Popover, RuleForm, SubmissionPayload};
pub use payment::{
    DEFAULT_CANDIDATES, MethodCatalog, PaymentMethodDraft, PaymentMethodEntry, PaymentSnapshot,
    RenameMode,
};
pub use sink::{JsonSink, LogSink, MemorySink, SubmissionSink};

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

use crate::error::{ParseError, normalize_token};

/// Whether all or any of the conditions must hold for the rule to apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchLogic {
    #[default]
    All,
    Any,
}

impl MatchLogic {
    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All specified conditions above must be met to change the payment methods",
            Self::Any => {
                "Any of the specified conditions is sufficient to change the payment methods"
            }
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Self::All => Self::Any,
            Self::Any => Self::All,
        }
    }
}

impl FromStr for MatchLogic {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "all" => Ok(Self::All),
            "any" => Ok(Self::Any),
            _ => Err(ParseError::UnknownMatchLogic(s.to_string())),
        }
    }
}

/// Which payment method transformations the rule performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    Hide,
    Sort,
    Rename,
}

impl Flag {
    pub fn all() -> &'static [Flag] {
        &[Flag::Hide, Flag::Sort, Flag::Rename]
    }

    pub fn label(self) -> &'static str {
        match self {
            Flag::Hide => "Hide",
            Flag::Sort => "Sort",
            Flag::Rename => "Rename",
        }
    }
}

impl FromStr for Flag {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "hide" => Ok(Flag::Hide),
            "sort" => Ok(Flag::Sort),
            "rename" => Ok(Flag::Rename),
            _ => Err(ParseError::UnknownFlag(s.to_string())),
        }
    }
}

/// Independent toggles for the payment method transformations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flags {
    pub hide: bool,
    pub sort: bool,
    pub rename: bool,
}

impl Default for Flags {
    fn default() -> Self {
        Self {
            hide: true,
            sort: false,
            rename: false,
        }
    }
}

impl Flags {
    pub fn get(&self, flag: Flag) -> bool {
        match flag {
            Flag::Hide => self.hide,
            Flag::Sort => self.sort,
            Flag::Rename => self.rename,
        }
    }

    /// Set a flag, returning whether it changed
    pub fn set(&mut self, flag: Flag, value: bool) -> bool {
        let slot = match flag {
            Flag::Hide => &mut self.hide,
            Flag::Sort => &mut self.sort,
            Flag::Rename => &mut self.rename,
        };
        let changed = *slot != value;
        *slot = value;
        changed
    }
}

/// The rule being authored
#[derive(Debug, Clone, Default)]
pub struct RuleDraft {
    name: String,
    flags: Flags,
    match_logic: MatchLogic,
    conditions: Vec<SelectedCondition>,

    /// Last id handed out; ids are never reused
    last_id: u64,
}

impl RuleDraft {
    /// Create an empty draft with default flags and `all` match logic
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn match_logic(&self) -> MatchLogic {
        self.match_logic
    }

    /// Conditions in insertion order
    pub fn conditions(&self) -> &[SelectedCondition] {
        &self.conditions
    }

    pub fn condition(&self, id: ConditionId) -> Option<&SelectedCondition> {
        self.conditions.iter().find(|c| c.id == id)
    }

    /// Append a condition of `kind` with default parameters
    pub fn add_condition(&mut self, kind: ConditionKind) -> &SelectedCondition {
        self.last_id += 1;
        let id = ConditionId(self.last_id);
        debug!("Adding condition {} ({})", id, kind);
        self.conditions.push(SelectedCondition::new(id, kind));
        &self.conditions[self.conditions.len() - 1]
    }

    /// Remove a condition; `false` if no condition has this id
    pub fn remove_condition(&mut self, id: ConditionId) -> bool {
        let before = self.conditions.len();
        self.conditions.retain(|c| c.id != id);
        before != self.conditions.len()
    }

    /// Update one parameter of one condition in place.
    ///
    /// Returns `false` if the id is absent or the parameter does not belong
    /// to the condition's kind.
    pub fn set_condition_parameter(&mut self, id: ConditionId, param: ConditionParam) -> bool {
        self.conditions
            .iter_mut()
            .find(|c| c.id == id)
            .is_some_and(|c| c.params.apply(param))
    }

    /// Select the match logic, returning whether it changed
    pub fn set_match_logic(&mut self, value: MatchLogic) -> bool {
        let changed = self.match_logic != value;
        self.match_logic = value;
        changed
    }

    pub fn set_flag(&mut self, flag: Flag, value: bool) -> bool {
        self.flags.set(flag, value)
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }
}
