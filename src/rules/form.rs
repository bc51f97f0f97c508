//! Editing surface - owns the drafts and assembles the submission payload

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{
    ConditionId, ConditionKind, ConditionParam, Flag, Flags, MatchLogic, PaymentMethodDraft,
    PaymentSnapshot, RenameMode, RuleDraft, SelectedCondition, SubmissionSink,
};

/// State of the condition catalog popover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Popover {
    #[default]
    Closed,
    Open,
}

/// A payment method as it appears in a submitted payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPayload {
    pub name: String,

    /// Present only when sorting is enabled and a value was entered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_value: Option<String>,

    /// Present whenever renaming is enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rename_mode: Option<RenameMode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rename_value: Option<String>,
}

/// Everything the form holds at the moment of submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub rule_name: String,
    pub flags: Flags,
    pub match_logic: MatchLogic,
    pub conditions: Vec<SelectedCondition>,
    pub payment_methods: Vec<PaymentPayload>,
}

/// The rule editing session.
///
/// Payment method edits go through the form so that every change is
/// followed by a fresh snapshot before the call returns.
#[derive(Debug, Clone, Default)]
pub struct RuleForm {
    draft: RuleDraft,
    payments: PaymentMethodDraft,

    /// Last snapshot received from the payment draft
    payment_data: PaymentSnapshot,

    /// Number of payment notifications received
    notifications: u64,

    popover: Popover,
}

impl RuleForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &RuleDraft {
        &self.draft
    }

    pub fn payments(&self) -> &PaymentMethodDraft {
        &self.payments
    }

    pub fn payment_data(&self) -> &PaymentSnapshot {
        &self.payment_data
    }

    pub fn notifications(&self) -> u64 {
        self.notifications
    }

    // Catalog popover

    pub fn popover(&self) -> Popover {
        self.popover
    }

    pub fn is_catalog_open(&self) -> bool {
        self.popover == Popover::Open
    }

    pub fn open_catalog(&mut self) {
        self.popover = Popover::Open;
    }

    /// Close the popover without picking anything
    pub fn dismiss_catalog(&mut self) {
        self.popover = Popover::Closed;
    }

    pub fn toggle_catalog(&mut self) {
        self.popover = match self.popover {
            Popover::Closed => Popover::Open,
            Popover::Open => Popover::Closed,
        };
    }

    // Rule draft

    /// Add a condition and close the catalog popover
    pub fn add_condition(&mut self, kind: ConditionKind) -> ConditionId {
        self.popover = Popover::Closed;
        self.draft.add_condition(kind).id
    }

    pub fn remove_condition(&mut self, id: ConditionId) -> bool {
        self.draft.remove_condition(id)
    }

    pub fn set_condition_parameter(&mut self, id: ConditionId, param: ConditionParam) -> bool {
        self.draft.set_condition_parameter(id, param)
    }

    pub fn set_match_logic(&mut self, value: MatchLogic) -> bool {
        self.draft.set_match_logic(value)
    }

    pub fn set_flag(&mut self, flag: Flag, value: bool) -> bool {
        self.draft.set_flag(flag, value)
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.draft.set_name(name);
    }

    // Payment draft

    pub fn add_method(&mut self, name: &str) -> bool {
        let changed = self.payments.add_method(name);
        self.notify_payments();
        changed
    }

    pub fn remove_method(&mut self, name: &str) -> bool {
        let changed = self.payments.remove_method(name);
        self.notify_payments();
        changed
    }

    pub fn set_order_value(&mut self, name: &str, value: impl Into<String>) -> bool {
        let changed = self.payments.set_order_value(name, value);
        self.notify_payments();
        changed
    }

    pub fn set_rename_mode(&mut self, name: &str, mode: RenameMode) -> bool {
        let changed = self.payments.set_rename_mode(name, mode);
        self.notify_payments();
        changed
    }

    pub fn set_rename_value(&mut self, name: &str, value: impl Into<String>) -> bool {
        let changed = self.payments.set_rename_value(name, value);
        self.notify_payments();
        changed
    }

    fn notify_payments(&mut self) {
        self.payment_data = self.payments.snapshot();
        self.notifications += 1;
        debug!(
            methods = self.payment_data.methods.len(),
            "Payment methods changed (notification {})", self.notifications
        );
    }

    // Submission

    /// Project the current state into a payload
    pub fn payload(&self) -> SubmissionPayload {
        let flags = self.draft.flags();
        let payment_methods = self
            .payment_data
            .methods
            .iter()
            .map(|entry| PaymentPayload {
                name: entry.name.clone(),
                order_value: entry.order_value.clone().filter(|_| flags.sort),
                rename_mode: flags.rename.then_some(entry.rename_mode),
                rename_value: entry.rename_value.clone().filter(|_| flags.rename),
            })
            .collect();

        SubmissionPayload {
            rule_name: self.draft.name().to_string(),
            flags,
            match_logic: self.draft.match_logic(),
            conditions: self.draft.conditions().to_vec(),
            payment_methods,
        }
    }

    /// Build the payload and hand it to `sink`. Any draft is accepted.
    pub fn submit(&self, sink: &mut dyn SubmissionSink) -> Result<SubmissionPayload> {
        let payload = self.payload();
        info!(
            "Submitting rule '{}' ({} conditions, {} payment methods)",
            payload.rule_name,
            payload.conditions.len(),
            payload.payment_methods.len()
        );
        sink.submit(&payload)?;
        Ok(payload)
    }
}
