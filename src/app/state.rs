//! Application state management

use std::collections::VecDeque;

use crate::config::Config;
use crate::rules::{
    ConditionId, ConditionParams, Flag, LogSink, MemorySink, MethodCatalog, RuleForm,
    SubmissionSink,
};
use crate::theme::Theme;

/// Input mode for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Normal editing mode
    #[default]
    Normal,
    /// Help dialog
    Help,
}

/// Available views in the TUI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Form,
    Log,
}

/// Cards of the form, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Conditions,
    Settings,
    Payments,
}

/// A focusable row of the form.
///
/// The list of rows is derived from the form on every call to
/// [`AppState::fields`], so rows of removed conditions or methods vanish and
/// sort/rename rows only exist while their flag is on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormField {
    AddCondition,
    /// Title row of a condition (removable)
    ConditionHeader(ConditionId),
    /// Match mode of a Collections condition, comparator of a Products condition
    ConditionChoice(ConditionId),
    /// Collection names or product amount
    ConditionText(ConditionId),
    RuleName,
    Flag(Flag),
    MatchLogic,
    MethodInput,
    Method(String),
    MethodOrder(String),
    MethodRenameMode(String),
    MethodRenameValue(String),
    Submit,
}

impl FormField {
    pub fn section(&self) -> Section {
        match self {
            Self::AddCondition
            | Self::ConditionHeader(_)
            | Self::ConditionChoice(_)
            | Self::ConditionText(_) => Section::Conditions,
            Self::RuleName | Self::Flag(_) | Self::MatchLogic => Section::Settings,
            Self::MethodInput
            | Self::Method(_)
            | Self::MethodOrder(_)
            | Self::MethodRenameMode(_)
            | Self::MethodRenameValue(_)
            | Self::Submit => Section::Payments,
        }
    }

    /// Whether the row takes typed text
    pub fn is_text(&self) -> bool {
        matches!(
            self,
            Self::ConditionText(_)
                | Self::RuleName
                | Self::MethodInput
                | Self::MethodOrder(_)
                | Self::MethodRenameValue(_)
        )
    }
}

/// A log entry for activity tracking
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: chrono::DateTime<chrono::Local>,
    pub level: LogLevel,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Main application state
#[derive(Debug)]
pub struct AppState {
    /// Current view/tab
    pub view: View,

    /// Current input mode
    pub mode: Mode,

    /// Loaded configuration
    pub config: Config,

    /// Current theme
    pub theme: Theme,

    /// The rule being edited
    pub form: RuleForm,

    /// Payment method candidates for the search
    pub methods: MethodCatalog,

    /// Index of the focused row in `fields()`
    pub focus: usize,

    /// Cursor position (in chars) within the focused text row
    pub cursor: usize,

    /// Contents of the payment method input
    pub method_input: String,

    /// What the user typed into the method input, before any suggestion was picked
    pub method_query: String,

    /// Suggestion picked with Ctrl-N/Ctrl-P, index into the results for `method_query`
    pub suggestion: Option<usize>,

    /// Highlighted entry of the condition catalog popover
    pub catalog_index: usize,

    /// Payloads submitted this session
    pub history: MemorySink,

    /// Activity log entries
    pub log_entries: VecDeque<LogEntry>,

    /// Scroll offset for log view
    pub log_scroll: usize,

    /// Status message to display
    pub status_message: Option<String>,

    /// Whether the app should quit
    pub should_quit: bool,
}

impl AppState {
    /// Create a new application state from config
    pub fn new(config: Config, theme: Theme) -> Self {
        let methods = config.method_catalog();
        let mut state = Self {
            view: View::default(),
            mode: Mode::default(),
            config,
            theme,
            form: RuleForm::new(),
            methods,
            focus: 0,
            cursor: 0,
            method_input: String::new(),
            method_query: String::new(),
            suggestion: None,
            catalog_index: 0,
            history: MemorySink::default(),
            log_entries: VecDeque::new(),
            log_scroll: 0,
            status_message: None,
            should_quit: false,
        };

        state.log(LogLevel::Info, "💳 Payrule started");
        state.log(
            LogLevel::Info,
            format!(
                "{} payment methods available",
                state.methods.candidates().len()
            ),
        );

        state
    }

    /// Focusable rows in display order
    pub fn fields(&self) -> Vec<FormField> {
        let mut fields = vec![FormField::AddCondition];

        for condition in self.form.draft().conditions() {
            fields.push(FormField::ConditionHeader(condition.id));
            if matches!(
                condition.params,
                ConditionParams::Collections { .. } | ConditionParams::Products { .. }
            ) {
                fields.push(FormField::ConditionChoice(condition.id));
                fields.push(FormField::ConditionText(condition.id));
            }
        }

        fields.push(FormField::RuleName);
        fields.extend(Flag::all().iter().map(|&f| FormField::Flag(f)));
        fields.push(FormField::MatchLogic);
        fields.push(FormField::MethodInput);

        let flags = self.form.draft().flags();
        for entry in self.form.payments().entries() {
            fields.push(FormField::Method(entry.name.clone()));
            if flags.sort {
                fields.push(FormField::MethodOrder(entry.name.clone()));
            }
            if flags.rename {
                fields.push(FormField::MethodRenameMode(entry.name.clone()));
                fields.push(FormField::MethodRenameValue(entry.name.clone()));
            }
        }

        fields.push(FormField::Submit);
        fields
    }

    /// The focused row
    pub fn focused_field(&self) -> FormField {
        let fields = self.fields();
        let idx = self.focus.min(fields.len() - 1);
        fields[idx].clone()
    }

    /// Focus a row by index, clamping to the last row
    pub fn set_focus(&mut self, index: usize) {
        let len = self.fields().len();
        self.focus = index.min(len - 1);
        self.cursor = self
            .field_text(&self.focused_field())
            .map(|t| t.chars().count())
            .unwrap_or(0);
    }

    /// Focus a specific row if it exists
    pub fn focus_field(&mut self, field: &FormField) {
        if let Some(idx) = self.fields().iter().position(|f| f == field) {
            self.set_focus(idx);
        }
    }

    pub fn focus_next(&mut self) {
        let len = self.fields().len();
        self.set_focus((self.focus + 1) % len);
    }

    pub fn focus_prev(&mut self) {
        let len = self.fields().len();
        self.set_focus(self.focus.checked_sub(1).unwrap_or(len - 1));
    }

    /// Jump to the first row of the next card
    pub fn next_section(&mut self) {
        let fields = self.fields();
        let current = self.focused_field().section();
        let target = match current {
            Section::Conditions => Section::Settings,
            Section::Settings => Section::Payments,
            Section::Payments => Section::Conditions,
        };
        if let Some(idx) = fields.iter().position(|f| f.section() == target) {
            self.set_focus(idx);
        }
    }

    /// Jump to the first row of the previous card
    pub fn prev_section(&mut self) {
        let fields = self.fields();
        let current = self.focused_field().section();
        let target = match current {
            Section::Conditions => Section::Payments,
            Section::Settings => Section::Conditions,
            Section::Payments => Section::Settings,
        };
        if let Some(idx) = fields.iter().position(|f| f.section() == target) {
            self.set_focus(idx);
        }
    }

    /// Current text of a text row, `None` for rows that are not text
    pub fn field_text(&self, field: &FormField) -> Option<String> {
        match field {
            FormField::RuleName => Some(self.form.draft().name().to_string()),
            FormField::ConditionText(id) => {
                match self.form.draft().condition(*id).map(|c| &c.params) {
                    Some(ConditionParams::Collections {
                        collection_names, ..
                    }) => Some(collection_names.clone()),
                    Some(ConditionParams::Products { amount, .. }) => Some(amount.clone()),
                    _ => None,
                }
            }
            FormField::MethodInput => Some(self.method_input.clone()),
            FormField::MethodOrder(name) => self
                .form
                .payments()
                .get(name)
                .map(|e| e.order_value.clone().unwrap_or_default()),
            FormField::MethodRenameValue(name) => self
                .form
                .payments()
                .get(name)
                .map(|e| e.rename_value.clone().unwrap_or_default()),
            _ => None,
        }
    }

    /// Search results for what the user typed
    pub fn suggestions(&self) -> Vec<String> {
        self.methods
            .search(&self.method_query)
            .into_iter()
            .map(String::from)
            .collect()
    }

    /// Submit the form to the log and the session history
    pub fn submit(&mut self) {
        let result = self
            .form
            .submit(&mut LogSink)
            .and_then(|payload| self.history.submit(&payload).map(|_| payload));

        match result {
            Ok(payload) => {
                let name = if payload.rule_name.is_empty() {
                    "(unnamed)".to_string()
                } else {
                    format!("'{}'", payload.rule_name)
                };
                self.log(
                    LogLevel::Success,
                    format!(
                        "Submitted rule {} with {} conditions and {} payment methods",
                        name,
                        payload.conditions.len(),
                        payload.payment_methods.len()
                    ),
                );
                self.set_status(format!("Submitted rule {}", name));
            }
            Err(e) => {
                tracing::error!("Submission failed: {:#}", e);
                self.log(LogLevel::Error, format!("Submission failed: {}", e));
                self.set_status("Submission failed");
            }
        }
    }

    /// Add a log entry
    pub fn log(&mut self, level: LogLevel, message: impl Into<String>) {
        self.log_entries.push_back(LogEntry {
            timestamp: chrono::Local::now(),
            level,
            message: message.into(),
        });

        // Keep log bounded
        while self.log_entries.len() > self.config.general.log_retention.max(1) {
            self.log_entries.pop_front();
        }
    }

    /// Set a temporary status message
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    /// Clear the status message
    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    /// Switch between the form and the log
    pub fn next_view(&mut self) {
        self.view = match self.view {
            View::Form => View::Log,
            View::Log => View::Form,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::ConditionKind;

    fn state() -> AppState {
        AppState::new(Config::default(), Theme::default())
    }

    #[test]
    fn test_default_fields() {
        let state = state();
        assert_eq!(
            state.fields(),
            vec![
                FormField::AddCondition,
                FormField::RuleName,
                FormField::Flag(Flag::Hide),
                FormField::Flag(Flag::Sort),
                FormField::Flag(Flag::Rename),
                FormField::MatchLogic,
                FormField::MethodInput,
                FormField::Submit,
            ]
        );
        assert_eq!(state.focused_field(), FormField::AddCondition);
    }

    #[test]
    fn test_condition_rows_follow_kind() {
        let mut state = state();
        let collections = state.form.add_condition(ConditionKind::Collections);
        let tags = state.form.add_condition(ConditionKind::ProductTags);

        let fields = state.fields();
        assert!(fields.contains(&FormField::ConditionChoice(collections)));
        assert!(fields.contains(&FormField::ConditionText(collections)));
        assert!(fields.contains(&FormField::ConditionHeader(tags)));
        assert!(!fields.contains(&FormField::ConditionText(tags)));
    }

    #[test]
    fn test_method_rows_gated_by_flags() {
        let mut state = state();
        state.form.add_method("PayPal");
        let name = "PayPal".to_string();

        assert!(!state.fields().contains(&FormField::MethodOrder(name.clone())));
        state.form.set_flag(Flag::Sort, true);
        assert!(state.fields().contains(&FormField::MethodOrder(name.clone())));
        assert!(!state.fields().contains(&FormField::MethodRenameMode(name.clone())));
        state.form.set_flag(Flag::Rename, true);
        assert!(state.fields().contains(&FormField::MethodRenameValue(name)));
    }

    #[test]
    fn test_focus_wraps_and_clamps() {
        let mut state = state();
        state.focus_prev();
        assert_eq!(state.focused_field(), FormField::Submit);
        state.focus_next();
        assert_eq!(state.focused_field(), FormField::AddCondition);

        state.focus = 99;
        assert_eq!(state.focused_field(), FormField::Submit);
    }

    #[test]
    fn test_section_jumps() {
        let mut state = state();
        state.next_section();
        assert_eq!(state.focused_field(), FormField::RuleName);
        state.next_section();
        assert_eq!(state.focused_field(), FormField::MethodInput);
        state.next_section();
        assert_eq!(state.focused_field(), FormField::AddCondition);
        state.prev_section();
        assert_eq!(state.focused_field(), FormField::MethodInput);
    }

    #[test]
    fn test_cursor_moves_to_end_of_text() {
        let mut state = state();
        state.form.set_name("Rule 1");
        state.focus_field(&FormField::RuleName);
        assert_eq!(state.cursor, 6);
    }

    #[test]
    fn test_submit_records_history() {
        let mut state = state();
        state.form.set_name("Big carts");
        state.submit();
        state.submit();

        assert_eq!(state.history.submissions().len(), 2);
        assert!(
            state
                .log_entries
                .back()
                .unwrap()
                .message
                .contains("'Big carts'")
        );
        assert_eq!(state.status_message.as_deref(), Some("Submitted rule 'Big carts'"));
    }

    #[test]
    fn test_log_is_bounded() {
        let mut config = Config::default();
        config.general.log_retention = 3;
        let mut state = AppState::new(config, Theme::default());
        for i in 0..10 {
            state.log(LogLevel::Info, format!("entry {}", i));
        }
        assert_eq!(state.log_entries.len(), 3);
        assert_eq!(state.log_entries.back().unwrap().message, "entry 9");
    }
}
