//! Event handling for the TUI

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::state::{AppState, FormField, LogLevel, Mode, View};
use crate::rules::{ConditionKind, ConditionParam, ConditionParams, MatchLogic};

/// Handle a key event and update state
pub fn handle_key(state: &mut AppState, key: KeyEvent) {
    // Global keybindings
    match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c'))
        | (KeyModifiers::CONTROL, KeyCode::Char('q')) => {
            state.should_quit = true;
            return;
        }
        (_, KeyCode::F(1)) => {
            state.mode = match state.mode {
                Mode::Help => Mode::Normal,
                Mode::Normal => Mode::Help,
            };
            return;
        }
        (_, KeyCode::F(2)) => {
            state.next_view();
            return;
        }
        (KeyModifiers::CONTROL, KeyCode::Char('t')) => {
            state.theme = state.theme.next();
            state.set_status(format!("Theme: {}", state.theme.name()));
            return;
        }
        (KeyModifiers::CONTROL, KeyCode::Char('s')) => {
            state.submit();
            return;
        }
        _ => {}
    }

    if state.mode == Mode::Help {
        if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
            state.mode = Mode::Normal;
        }
        return;
    }

    match state.view {
        View::Log => handle_log_key(state, key),
        View::Form if state.form.is_catalog_open() => handle_catalog_key(state, key),
        View::Form => handle_form_key(state, key),
    }
}

fn handle_log_key(state: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => state.view = View::Form,
        KeyCode::Up | KeyCode::Char('k') => {
            state.log_scroll = state.log_scroll.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            let max = state.log_entries.len().saturating_sub(1);
            state.log_scroll = (state.log_scroll + 1).min(max);
        }
        KeyCode::Home | KeyCode::Char('g') => state.log_scroll = 0,
        KeyCode::Char('c') => {
            state.log_entries.clear();
            state.log_scroll = 0;
            state.set_status("Log cleared");
        }
        _ => {}
    }
}

fn handle_catalog_key(state: &mut AppState, key: KeyEvent) {
    let kinds = ConditionKind::all();
    let len = kinds.len();

    match key.code {
        KeyCode::Esc => state.form.dismiss_catalog(),
        KeyCode::Down | KeyCode::Char('j') => {
            state.catalog_index = (state.catalog_index + 1) % len;
        }
        KeyCode::Up | KeyCode::Char('k') => {
            state.catalog_index = state.catalog_index.checked_sub(1).unwrap_or(len - 1);
        }
        KeyCode::Enter | KeyCode::Char(' ') => {
            let kind = kinds[state.catalog_index.min(len - 1)];
            let id = state.form.add_condition(kind);
            state.focus_field(&FormField::ConditionHeader(id));
            state.set_status(format!("Added {} condition", kind.name()));
        }
        _ => {}
    }
}

fn handle_form_key(state: &mut AppState, key: KeyEvent) {
    let field = state.focused_field();

    match (key.modifiers, key.code) {
        (_, KeyCode::Up) => state.focus_prev(),
        (_, KeyCode::Down) => state.focus_next(),
        (_, KeyCode::Tab) => state.next_section(),
        (_, KeyCode::BackTab) => state.prev_section(),
        (KeyModifiers::CONTROL, KeyCode::Char('d')) => remove_focused(state, &field),
        (KeyModifiers::CONTROL, KeyCode::Char('n')) if field == FormField::MethodInput => {
            cycle_suggestion(state, true)
        }
        (KeyModifiers::CONTROL, KeyCode::Char('p')) if field == FormField::MethodInput => {
            cycle_suggestion(state, false)
        }
        (_, KeyCode::Esc) => state.clear_status(),
        (_, KeyCode::Enter) => handle_enter(state, &field),
        (m, _) if m.contains(KeyModifiers::CONTROL) || m.contains(KeyModifiers::ALT) => {}
        _ => handle_field_input(state, &field, key),
    }
}

fn handle_enter(state: &mut AppState, field: &FormField) {
    match field {
        FormField::AddCondition => {
            state.catalog_index = 0;
            state.form.open_catalog();
        }
        FormField::MethodInput => {
            let input = std::mem::take(&mut state.method_input);
            state.method_query.clear();
            if state.form.add_method(&input) {
                state.set_status(format!("Added payment method '{}'", input.trim()));
            } else if !input.trim().is_empty() {
                let message = format!("'{}' is already added", input.trim());
                state.log(LogLevel::Warning, message.clone());
                state.set_status(message);
            }
            state.suggestion = None;
            state.cursor = 0;
        }
        FormField::Submit => state.submit(),
        field if field.is_text() => state.focus_next(),
        field => toggle_field(state, field, true),
    }
}

fn remove_focused(state: &mut AppState, field: &FormField) {
    match field {
        FormField::ConditionHeader(id)
        | FormField::ConditionChoice(id)
        | FormField::ConditionText(id) => {
            let name = state
                .form
                .draft()
                .condition(*id)
                .map(|c| c.kind().name())
                .unwrap_or_default();
            if state.form.remove_condition(*id) {
                state.set_status(format!("Removed {} condition", name));
            }
        }
        FormField::Method(name)
        | FormField::MethodOrder(name)
        | FormField::MethodRenameMode(name)
        | FormField::MethodRenameValue(name) => {
            if state.form.remove_method(name) {
                state.set_status(format!("Removed payment method '{}'", name));
            }
        }
        _ => return,
    }
    // Rows after the removed item shift up; keep focus in range
    state.set_focus(state.focus);
}

fn cycle_suggestion(state: &mut AppState, forward: bool) {
    let suggestions = state.methods.search(&state.method_query);
    if suggestions.is_empty() {
        return;
    }
    let len = suggestions.len();
    let next = match (state.suggestion, forward) {
        (None, true) => 0,
        (None, false) => len - 1,
        (Some(i), true) => (i + 1) % len,
        (Some(i), false) => i.checked_sub(1).unwrap_or(len - 1),
    };
    state.method_input = suggestions[next].to_string();
    state.cursor = state.method_input.chars().count();
    state.suggestion = Some(next);
}

/// Toggle a select, checkbox or radio row. `forward` picks the cycle direction.
fn toggle_field(state: &mut AppState, field: &FormField, forward: bool) {
    match field {
        FormField::Flag(flag) => {
            let value = !state.form.draft().flags().get(*flag);
            state.form.set_flag(*flag, value);
            // Sort/rename rows appear or vanish; stay on this row
            state.focus_field(field);
        }
        FormField::MatchLogic => {
            let value = state.form.draft().match_logic().toggle();
            state.form.set_match_logic(value);
            if value == MatchLogic::Any {
                state.set_status("Any condition is sufficient");
            } else {
                state.set_status("All conditions must be met");
            }
        }
        FormField::ConditionChoice(id) => {
            let param = match state.form.draft().condition(*id).map(|c| &c.params) {
                Some(ConditionParams::Collections { match_mode, .. }) => {
                    ConditionParam::MatchMode(match_mode.toggle())
                }
                Some(ConditionParams::Products { comparator, .. }) => {
                    ConditionParam::Comparator(comparator.toggle())
                }
                _ => return,
            };
            state.form.set_condition_parameter(*id, param);
        }
        FormField::MethodRenameMode(name) => {
            if let Some(entry) = state.form.payments().get(name) {
                let mode = if forward {
                    entry.rename_mode.next()
                } else {
                    entry.rename_mode.prev()
                };
                state.form.set_rename_mode(name, mode);
            }
        }
        _ => {}
    }
}

fn handle_field_input(state: &mut AppState, field: &FormField, key: KeyEvent) {
    if !field.is_text() {
        match key.code {
            KeyCode::Char(' ') | KeyCode::Right | KeyCode::Char('l') => {
                toggle_field(state, field, true)
            }
            KeyCode::Left | KeyCode::Char('h') => toggle_field(state, field, false),
            _ => {}
        }
        return;
    }

    let Some(mut text) = state.field_text(field) else {
        return;
    };
    if !handle_text_input(&mut text, &mut state.cursor, key) {
        return;
    }

    match field {
        FormField::RuleName => state.form.set_name(text),
        FormField::ConditionText(id) => {
            let param = match state.form.draft().condition(*id).map(|c| &c.params) {
                Some(ConditionParams::Collections { .. }) => ConditionParam::CollectionNames(text),
                Some(ConditionParams::Products { .. }) => ConditionParam::Amount(text),
                _ => return,
            };
            state.form.set_condition_parameter(*id, param);
        }
        FormField::MethodInput => {
            state.method_query = text.clone();
            state.method_input = text;
            state.suggestion = None;
        }
        FormField::MethodOrder(name) => {
            state.form.set_order_value(name, text);
        }
        FormField::MethodRenameValue(name) => {
            state.form.set_rename_value(name, text);
        }
        _ => {}
    }
}

fn byte_index(s: &str, char_pos: usize) -> usize {
    s.char_indices()
        .nth(char_pos)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Edit `input` at the char-based `cursor`. Returns true if the text changed.
fn handle_text_input(input: &mut String, cursor: &mut usize, key: KeyEvent) -> bool {
    *cursor = (*cursor).min(input.chars().count());

    match key.code {
        KeyCode::Char(c) => {
            let pos = byte_index(input, *cursor);
            input.insert(pos, c);
            *cursor += 1;
            true
        }
        KeyCode::Backspace if *cursor > 0 => {
            *cursor -= 1;
            let pos = byte_index(input, *cursor);
            input.remove(pos);
            true
        }
        KeyCode::Delete if *cursor < input.chars().count() => {
            let pos = byte_index(input, *cursor);
            input.remove(pos);
            true
        }
        KeyCode::Left => {
            *cursor = cursor.saturating_sub(1);
            false
        }
        KeyCode::Right => {
            *cursor = (*cursor + 1).min(input.chars().count());
            false
        }
        KeyCode::Home => {
            *cursor = 0;
            false
        }
        KeyCode::End => {
            *cursor = input.chars().count();
            false
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::rules::{CollectionMatch, Flag, RenameMode};
    use crate::theme::Theme;

    fn state() -> AppState {
        AppState::new(Config::default(), Theme::default())
    }

    fn press(state: &mut AppState, code: KeyCode) {
        handle_key(state, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn ctrl(state: &mut AppState, c: char) {
        handle_key(state, KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL));
    }

    fn type_text(state: &mut AppState, text: &str) {
        for c in text.chars() {
            press(state, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_catalog_pick_adds_condition_and_closes() {
        let mut state = state();
        press(&mut state, KeyCode::Enter);
        assert!(state.form.is_catalog_open());

        press(&mut state, KeyCode::Down);
        press(&mut state, KeyCode::Enter);

        assert!(!state.form.is_catalog_open());
        let conditions = state.form.draft().conditions();
        assert_eq!(conditions.len(), 1);
        assert_eq!(conditions[0].kind(), ConditionKind::Collections);
        assert_eq!(
            state.focused_field(),
            FormField::ConditionHeader(conditions[0].id)
        );
    }

    #[test]
    fn test_catalog_dismiss() {
        let mut state = state();
        press(&mut state, KeyCode::Enter);
        press(&mut state, KeyCode::Esc);
        assert!(!state.form.is_catalog_open());
        assert!(state.form.draft().conditions().is_empty());
    }

    #[test]
    fn test_edit_collection_condition() {
        let mut state = state();
        let id = state.form.add_condition(ConditionKind::Collections);
        state.focus_field(&FormField::ConditionChoice(id));
        press(&mut state, KeyCode::Char(' '));
        press(&mut state, KeyCode::Down);
        type_text(&mut state, "Summer");

        assert_eq!(
            state.form.draft().condition(id).unwrap().params,
            ConditionParams::Collections {
                match_mode: CollectionMatch::NotFound,
                collection_names: "Summer".to_string(),
            }
        );
    }

    #[test]
    fn test_type_rule_name_with_cursor() {
        let mut state = state();
        state.focus_field(&FormField::RuleName);
        type_text(&mut state, "Hde");
        press(&mut state, KeyCode::Left);
        press(&mut state, KeyCode::Left);
        press(&mut state, KeyCode::Char('i'));
        assert_eq!(state.form.draft().name(), "Hide");

        press(&mut state, KeyCode::End);
        press(&mut state, KeyCode::Backspace);
        assert_eq!(state.form.draft().name(), "Hid");
    }

    #[test]
    fn test_add_method_from_input() {
        let mut state = state();
        state.focus_field(&FormField::MethodInput);
        type_text(&mut state, "  PayPal ");
        press(&mut state, KeyCode::Enter);
        type_text(&mut state, "PayPal");
        press(&mut state, KeyCode::Enter);

        assert_eq!(state.form.payments().len(), 1);
        assert!(state.method_input.is_empty());
        assert_eq!(state.status_message.as_deref(), Some("'PayPal' is already added"));
    }

    #[test]
    fn test_suggestions_fill_input() {
        let mut state = state();
        state.focus_field(&FormField::MethodInput);
        ctrl(&mut state, 'n');
        ctrl(&mut state, 'n');
        assert_eq!(state.method_input, "Amazon Pay");
        ctrl(&mut state, 'p');
        assert_eq!(state.method_input, "Cash on Delivery (COD)");
        press(&mut state, KeyCode::Enter);
        assert!(state.form.payments().contains("Cash on Delivery (COD)"));
    }

    #[test]
    fn test_sort_and_rename_rows() {
        let mut state = state();
        state.form.add_method("Amazon Pay");
        state.focus_field(&FormField::Flag(Flag::Sort));
        press(&mut state, KeyCode::Char(' '));
        assert!(state.form.draft().flags().sort);
        assert_eq!(state.focused_field(), FormField::Flag(Flag::Sort));

        state.focus_field(&FormField::MethodOrder("Amazon Pay".to_string()));
        type_text(&mut state, "1");

        state.focus_field(&FormField::Flag(Flag::Rename));
        press(&mut state, KeyCode::Enter);
        state.focus_field(&FormField::MethodRenameMode("Amazon Pay".to_string()));
        press(&mut state, KeyCode::Right);
        state.focus_field(&FormField::MethodRenameValue("Amazon Pay".to_string()));
        type_text(&mut state, "Fast");

        let entry = state.form.payments().get("Amazon Pay").unwrap();
        assert_eq!(entry.order_value.as_deref(), Some("1"));
        assert_eq!(entry.rename_mode, RenameMode::Before);
        assert_eq!(entry.renamed(), "Fast Amazon Pay");
    }

    #[test]
    fn test_remove_focused_condition() {
        let mut state = state();
        let id = state.form.add_condition(ConditionKind::Products);
        state.focus_field(&FormField::ConditionText(id));
        ctrl(&mut state, 'd');
        assert!(state.form.draft().conditions().is_empty());
        assert!(state.focus < state.fields().len());
    }

    #[test]
    fn test_remove_last_method_keeps_focus_in_range() {
        let mut state = state();
        state.form.add_method("PayPal");
        state.focus_field(&FormField::Method("PayPal".to_string()));
        ctrl(&mut state, 'd');
        assert!(state.form.payments().is_empty());
        assert_eq!(state.focused_field(), FormField::Submit);
    }

    #[test]
    fn test_match_logic_radio() {
        let mut state = state();
        state.focus_field(&FormField::MatchLogic);
        press(&mut state, KeyCode::Char(' '));
        assert_eq!(state.form.draft().match_logic(), MatchLogic::Any);
        press(&mut state, KeyCode::Left);
        assert_eq!(state.form.draft().match_logic(), MatchLogic::All);
    }

    #[test]
    fn test_submit_shortcut_and_quit() {
        let mut state = state();
        ctrl(&mut state, 's');
        assert_eq!(state.history.submissions().len(), 1);
        assert!(!state.should_quit);
        ctrl(&mut state, 'q');
        assert!(state.should_quit);
    }

    #[test]
    fn test_help_swallows_keys() {
        let mut state = state();
        press(&mut state, KeyCode::F(1));
        assert_eq!(state.mode, Mode::Help);
        press(&mut state, KeyCode::Enter);
        assert_eq!(state.mode, Mode::Normal);
        assert!(!state.form.is_catalog_open());
    }
}
