//! UI rendering for the TUI

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, Paragraph, Tabs, Wrap},
};

use super::state::{AppState, FormField, LogLevel, Mode, Section, View};
use crate::rules::{ConditionKind, ConditionParams, Flag, MatchLogic, SelectedCondition};
use crate::theme::ThemeColors;

const ICON: &str = "💳";

/// Render the entire UI
pub fn render(frame: &mut Frame, state: &AppState) {
    let colors = state.theme.colors();

    // Set background
    let area = frame.area();
    let bg_block = Block::default().style(Style::default().bg(colors.bg));
    frame.render_widget(bg_block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tabs
            Constraint::Min(0),    // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_tabs(frame, state, chunks[0]);
    match state.view {
        View::Form => render_form(frame, state, chunks[1]),
        View::Log => render_log(frame, state, chunks[1]),
    }
    render_status_bar(frame, state, chunks[2]);

    if state.view == View::Form && state.form.is_catalog_open() {
        render_catalog_popover(frame, state);
    }

    if state.mode == Mode::Help {
        render_help_popup(frame, state);
    }
}

fn render_tabs(frame: &mut Frame, state: &AppState, area: Rect) {
    let colors = state.theme.colors();

    let titles: Vec<Line> = [(View::Form, "Rule"), (View::Log, "Log")]
        .iter()
        .map(|(view, name)| {
            let dot = if state.view == *view { "●" } else { "○" };
            Line::from(format!("{}  {}", dot, name))
        })
        .collect();

    let selected = match state.view {
        View::Form => 0,
        View::Log => 1,
    };

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(colors.block())
                .title(format!(" {} Add Rule Settings ", ICON))
                .title_style(colors.heading()),
        )
        .select(selected)
        .style(colors.tab())
        .highlight_style(colors.tab_active())
        .divider(Span::styled(" │ ", colors.text_muted()));

    frame.render_widget(tabs, area);
}

fn render_form(frame: &mut Frame, state: &AppState, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(area);

    let settings_height = 4 + Flag::all().len() as u16 + 2 + 2;
    let cards = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(6),
            Constraint::Length(settings_height),
            Constraint::Min(6),
        ])
        .split(columns[0]);

    let focused = state.focused_field();

    render_card(
        frame,
        state,
        cards[0],
        " Conditions ",
        Section::Conditions,
        condition_lines(state, &focused),
    );
    render_card(
        frame,
        state,
        cards[1],
        " Rule Settings ",
        Section::Settings,
        settings_lines(state, &focused),
    );
    render_card(
        frame,
        state,
        cards[2],
        " Payment Methods ",
        Section::Payments,
        payment_lines(state, &focused),
    );

    render_payload_preview(frame, state, columns[1]);
}

/// Lines of a card plus the index of the focused line, if the card holds focus
struct CardLines<'a> {
    lines: Vec<Line<'a>>,
    focus_line: Option<usize>,
}

fn render_card(
    frame: &mut Frame,
    state: &AppState,
    area: Rect,
    title: &str,
    section: Section,
    card: CardLines,
) {
    let colors = state.theme.colors();
    let active = state.focused_field().section() == section;

    // Keep the focused line visible
    let inner_height = area.height.saturating_sub(2) as usize;
    let scroll = card
        .focus_line
        .map(|line| (line + 1).saturating_sub(inner_height))
        .unwrap_or(0);

    let paragraph = Paragraph::new(card.lines)
        .scroll((scroll as u16, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(if active {
                    colors.block_focus()
                } else {
                    colors.block()
                })
                .title(title.to_string())
                .title_style(colors.heading()),
        );

    frame.render_widget(paragraph, area);
}

/// Build lines for a card, tracking which one is focused
struct CardBuilder<'a> {
    colors: ThemeColors,
    focused: &'a FormField,
    cursor: usize,
    lines: Vec<Line<'static>>,
    focus_line: Option<usize>,
}

impl<'a> CardBuilder<'a> {
    fn new(state: &AppState, focused: &'a FormField) -> Self {
        Self {
            colors: state.theme.colors(),
            focused,
            cursor: state.cursor,
            lines: Vec::new(),
            focus_line: None,
        }
    }

    fn plain(&mut self, line: Line<'static>) {
        self.lines.push(line);
    }

    /// A focusable row: marker, label, value
    fn row(&mut self, field: FormField, label: &str, value: String) {
        let focused = *self.focused == field;
        if focused {
            self.focus_line = Some(self.lines.len());
        }

        let (marker_style, label_style, value_style) = if focused {
            (
                self.colors.selected(),
                self.colors.text_primary(),
                self.colors.selected(),
            )
        } else {
            (self.colors.text(), self.colors.text_muted(), self.colors.text())
        };

        let value = if focused && field.is_text() {
            with_cursor(&value, self.cursor)
        } else {
            value
        };

        self.lines.push(Line::from(vec![
            Span::styled(if focused { " ▸ " } else { "   " }, marker_style),
            Span::styled(label.to_string(), label_style),
            Span::styled(value, value_style),
        ]));
    }

    fn finish(self) -> CardLines<'static> {
        CardLines {
            lines: self.lines,
            focus_line: self.focus_line,
        }
    }
}

/// Insert a bar at the char-based cursor position
fn with_cursor(text: &str, cursor: usize) -> String {
    let mut out = String::with_capacity(text.len() + 3);
    let mut placed = false;
    for (i, c) in text.chars().enumerate() {
        if i == cursor {
            out.push('▏');
            placed = true;
        }
        out.push(c);
    }
    if !placed {
        out.push('▏');
    }
    out
}

fn placeholder(value: &str, empty: &str) -> String {
    if value.is_empty() {
        empty.to_string()
    } else {
        value.to_string()
    }
}

fn condition_lines(state: &AppState, focused: &FormField) -> CardLines<'static> {
    let mut card = CardBuilder::new(state, focused);
    let colors = state.theme.colors();

    card.row(FormField::AddCondition, "", "[+] Add a new condition".to_string());
    card.plain(Line::from(""));

    let conditions = state.form.draft().conditions();
    if conditions.is_empty() {
        card.plain(Line::styled("   No conditions added yet", colors.text_muted()));
    }

    for condition in conditions {
        condition_rows(&mut card, &colors, condition);
    }

    card.finish()
}

fn condition_rows(card: &mut CardBuilder, colors: &ThemeColors, condition: &SelectedCondition) {
    let kind = condition.kind();
    card.row(
        FormField::ConditionHeader(condition.id),
        "",
        format!("{} {}  {}", kind.icon(), kind.name(), condition.id),
    );
    card.plain(Line::styled(
        format!("      {}", kind.description()),
        colors.text_muted(),
    ));

    match &condition.params {
        ConditionParams::Collections {
            match_mode,
            collection_names,
        } => {
            card.row(
                FormField::ConditionChoice(condition.id),
                "   Condition:   ",
                format!("◂ {} ▸", match_mode.label()),
            );
            card.row(
                FormField::ConditionText(condition.id),
                "   Collections: ",
                placeholder(collection_names, "(enter collections)"),
            );
        }
        ConditionParams::Products { comparator, amount } => {
            card.row(
                FormField::ConditionChoice(condition.id),
                "   Apply if:    ",
                format!("◂ {} ▸", comparator.label()),
            );
            card.row(
                FormField::ConditionText(condition.id),
                "   Amount:      ",
                placeholder(amount, "(enter amount)"),
            );
        }
        ConditionParams::ProductTags | ConditionParams::MinimumCartTotal => {}
    }
    card.plain(Line::from(""));
}

fn settings_lines(state: &AppState, focused: &FormField) -> CardLines<'static> {
    let mut card = CardBuilder::new(state, focused);
    let colors = state.theme.colors();
    let draft = state.form.draft();

    card.row(
        FormField::RuleName,
        "Rule name: ",
        placeholder(draft.name(), "(enter rule name)"),
    );
    card.plain(Line::from(""));

    let flags = draft.flags();
    for &flag in Flag::all() {
        let mark = if flags.get(flag) { "[x]" } else { "[ ]" };
        card.row(FormField::Flag(flag), "", format!("{} {}", mark, flag.label()));
    }
    card.plain(Line::from(""));

    card.plain(Line::from(Span::styled(
        "   Match condition",
        colors.text().add_modifier(Modifier::BOLD),
    )));
    let logic = draft.match_logic();
    let radio = |value: MatchLogic| {
        format!(
            "{} {}",
            if logic == value { "(•)" } else { "( )" },
            value.label()
        )
    };
    card.row(FormField::MatchLogic, "", radio(MatchLogic::All));
    card.plain(Line::styled(
        format!("   {}", radio(MatchLogic::Any)),
        colors.text(),
    ));

    card.finish()
}

fn payment_lines(state: &AppState, focused: &FormField) -> CardLines<'static> {
    let mut card = CardBuilder::new(state, focused);
    let colors = state.theme.colors();

    card.row(
        FormField::MethodInput,
        "Payment method: ",
        placeholder(&state.method_input, "(type or select payment method)"),
    );

    if *focused == FormField::MethodInput {
        let suggestions = state.suggestions();
        let spans: Vec<Span> = std::iter::once(Span::styled("   ", colors.text()))
            .chain(suggestions.iter().enumerate().map(|(i, s)| {
                let style = if state.suggestion == Some(i) {
                    colors.selected()
                } else {
                    colors.text_secondary()
                };
                Span::styled(format!("{}  ", s), style)
            }))
            .collect();
        card.plain(Line::from(spans));
    }
    card.plain(Line::from(""));

    let flags = state.form.draft().flags();
    let payments = state.form.payments();
    if payments.is_empty() {
        card.plain(Line::styled(
            "   No payment methods added yet.",
            colors.text_muted(),
        ));
    }

    for entry in payments.entries() {
        let shown = if flags.rename {
            format!("{}  →  {}", entry.name, entry.renamed())
        } else {
            entry.name.clone()
        };
        card.row(FormField::Method(entry.name.clone()), "", shown);
        if flags.sort {
            card.row(
                FormField::MethodOrder(entry.name.clone()),
                "   Order:    ",
                placeholder(
                    entry.order_value.as_deref().unwrap_or(""),
                    "(enter order number)",
                ),
            );
        }
        if flags.rename {
            card.row(
                FormField::MethodRenameMode(entry.name.clone()),
                "   Rename:   ",
                format!("◂ {} ▸", entry.rename_mode.label()),
            );
            card.row(
                FormField::MethodRenameValue(entry.name.clone()),
                "   New name: ",
                placeholder(
                    entry.rename_value.as_deref().unwrap_or(""),
                    "(new payment name)",
                ),
            );
        }
    }

    card.plain(Line::from(""));
    card.row(FormField::Submit, "", "[ Submit ]".to_string());

    card.finish()
}

fn render_payload_preview(frame: &mut Frame, state: &AppState, area: Rect) {
    let colors = state.theme.colors();

    let json = serde_json::to_string_pretty(&state.form.payload())
        .unwrap_or_else(|e| format!("Failed to render payload: {}", e));
    let lines: Vec<Line> = json
        .lines()
        .map(|l| Line::styled(l.to_string(), colors.text_secondary()))
        .collect();

    let preview = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(colors.block())
            .title(" Payload preview ")
            .title_style(colors.heading()),
    );
    frame.render_widget(preview, area);
}

fn render_log(frame: &mut Frame, state: &AppState, area: Rect) {
    let colors = state.theme.colors();

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let items: Vec<ListItem> = state
        .log_entries
        .iter()
        .rev()
        .skip(state.log_scroll)
        .map(|entry| {
            let (icon, level_style) = match entry.level {
                LogLevel::Info => ("ℹ", colors.text_info()),
                LogLevel::Success => ("✓", colors.text_success()),
                LogLevel::Warning => ("⚠", colors.text_warning()),
                LogLevel::Error => ("✗", colors.text_error()),
            };

            let time = entry.timestamp.format("%H:%M:%S").to_string();

            ListItem::new(Line::from(vec![
                Span::styled(format!(" {} ", icon), level_style),
                Span::styled(format!("[{}] ", time), colors.text_muted()),
                Span::styled(entry.message.clone(), colors.text()),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(colors.block_focus())
            .title(format!(
                " Activity Log ({}) [c: clear] ",
                state.log_entries.len()
            ))
            .title_style(colors.heading()),
    );
    frame.render_widget(list, columns[0]);

    let last = match state.history.last() {
        Some(payload) => serde_json::to_string_pretty(payload)
            .unwrap_or_else(|e| format!("Failed to render payload: {}", e)),
        None => "Nothing submitted yet".to_string(),
    };
    let submitted = Paragraph::new(last)
        .style(colors.text())
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(colors.block())
                .title(format!(
                    " Last submission ({} total) ",
                    state.history.submissions().len()
                ))
                .title_style(colors.heading()),
        );
    frame.render_widget(submitted, columns[1]);
}

fn render_status_bar(frame: &mut Frame, state: &AppState, area: Rect) {
    let colors = state.theme.colors();

    let content = if let Some(ref msg) = state.status_message {
        vec![
            Span::styled(" ", Style::default()),
            Span::styled(msg.clone(), colors.text_secondary()),
        ]
    } else {
        let mut hints = vec![Span::styled(" ", Style::default())];
        for (key, what) in [
            ("↑↓", "move  "),
            ("Tab", "section  "),
            ("^D", "remove  "),
            ("^S", "submit  "),
            ("F1", "help  "),
            ("F2", "log  "),
            ("^Q", "quit"),
        ] {
            hints.push(Span::styled(key, colors.key_hint()));
            hints.push(Span::styled(format!(": {}", what), colors.text_muted()));
        }
        hints
    };

    let status =
        Paragraph::new(Line::from(content)).style(Style::default().bg(colors.bg_secondary));
    frame.render_widget(status, area);
}

fn centered_rect(width: u16, height: u16, r: Rect) -> Rect {
    let width = width.min(r.width.saturating_sub(4));
    let height = height.min(r.height.saturating_sub(4));
    Rect {
        x: r.x + (r.width - width) / 2,
        y: r.y + (r.height - height) / 2,
        width,
        height,
    }
}

fn render_catalog_popover(frame: &mut Frame, state: &AppState) {
    let colors = state.theme.colors();
    let kinds = ConditionKind::all();
    let popup_area = centered_rect(72, kinds.len() as u16 * 2 + 2, frame.area());
    frame.render_widget(Clear, popup_area);

    let items: Vec<ListItem> = kinds
        .iter()
        .enumerate()
        .map(|(i, kind)| {
            let selected = i == state.catalog_index;
            let style = if selected {
                colors.selected()
            } else {
                colors.text()
            };
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(if selected { " ▸ " } else { "   " }, style),
                    Span::styled(format!("{} ", kind.icon()), style),
                    Span::styled(kind.name(), style.add_modifier(Modifier::BOLD)),
                ]),
                Line::styled(format!("      {}", kind.description()), colors.text_muted()),
            ])
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(colors.block_focus())
            .border_type(BorderType::Rounded)
            .style(Style::default().bg(colors.bg))
            .title(" Add a new condition ")
            .title_bottom(Line::from(" ↑↓ navigate │ ↵ add │ Esc close ").centered()),
    );

    frame.render_widget(list, popup_area);
}

fn render_help_popup(frame: &mut Frame, state: &AppState) {
    let colors = state.theme.colors();
    let popup_area = centered_rect(60, 22, frame.area());
    frame.render_widget(Clear, popup_area);

    let entry = |key: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<18}", key), colors.key_hint()),
            Span::styled(what, colors.text()),
        ])
    };

    let content = vec![
        Line::from(""),
        Line::styled("  Form", colors.heading()),
        entry("↑ / ↓", "Move between fields"),
        entry("Tab / Shift+Tab", "Jump to next / previous card"),
        entry("Space / ← →", "Toggle checkbox, radio or select"),
        entry("Enter", "Open catalog, add method, submit"),
        entry("Ctrl+D", "Remove focused condition or method"),
        entry("Ctrl+N / Ctrl+P", "Cycle payment method suggestions"),
        Line::from(""),
        Line::styled("  General", colors.heading()),
        entry("Ctrl+S", "Submit the rule"),
        entry("F2", "Switch between rule and log"),
        entry("Ctrl+T", "Next theme"),
        entry("F1", "Toggle this help"),
        entry("Ctrl+Q / Ctrl+C", "Quit"),
    ];

    let help = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(colors.primary))
            .border_type(BorderType::Rounded)
            .style(Style::default().bg(colors.bg))
            .title(" Help ")
            .title_bottom(Line::from(" Esc close ").centered()),
    );
    frame.render_widget(help, popup_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::rules::Flag;
    use crate::theme::Theme;
    use ratatui::{Terminal, backend::TestBackend};

    fn draw(state: &AppState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 48)).unwrap();
        terminal.draw(|frame| render(frame, state)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_with_cursor() {
        assert_eq!(with_cursor("", 0), "▏");
        assert_eq!(with_cursor("abc", 1), "a▏bc");
        assert_eq!(with_cursor("abc", 9), "abc▏");
    }

    #[test]
    fn test_render_empty_form() {
        let state = AppState::new(Config::default(), Theme::default());
        let screen = draw(&state);
        assert!(screen.contains("No conditions added yet"));
        assert!(screen.contains("No payment methods added yet."));
        assert!(screen.contains("Payload preview"));
    }

    #[test]
    fn test_render_catalog_and_rows() {
        let mut state = AppState::new(Config::default(), Theme::default());
        state.form.add_condition(ConditionKind::Products);
        state.form.add_method("PayPal");
        state.form.set_flag(Flag::Rename, true);
        state.form.open_catalog();

        let screen = draw(&state);
        assert!(screen.contains("Add a new condition"));
        assert!(screen.contains("Minimum cart total"));
        assert!(screen.contains("PayPal"));
    }

    #[test]
    fn test_render_log_view() {
        let mut state = AppState::new(Config::default(), Theme::default());
        state.submit();
        state.next_view();
        let screen = draw(&state);
        assert!(screen.contains("Activity Log"));
        assert!(screen.contains("Last submission (1 total)"));
    }
}
