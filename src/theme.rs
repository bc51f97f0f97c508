//! Theme configuration and colors.
//!
//! Palettes come from the `ratatui-themes` crate; `ThemeColors` derives the
//! styles the form uses from them.

use ratatui::style::{Color, Modifier, Style};
use ratatui_themes::{ThemeName, ThemePalette};
use serde::{Deserialize, Serialize};

/// Theme wrapper around `ThemeName` from ratatui-themes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Theme(pub ThemeName);

impl Theme {
    /// Get the next theme in rotation
    #[must_use]
    pub fn next(&self) -> Theme {
        Theme(self.0.next())
    }

    /// Get the display name for the theme.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.0.display_name()
    }

    /// Load theme from config or use default
    pub fn load(config: &crate::config::Config) -> Theme {
        config
            .general
            .theme
            .as_ref()
            .and_then(|name| name.parse::<ThemeName>().ok())
            .map(Theme::from)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn colors(&self) -> ThemeColors {
        ThemeColors::from_palette(self.0.palette())
    }
}

impl From<ThemeName> for Theme {
    fn from(name: ThemeName) -> Self {
        Theme(name)
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Colors and prebuilt styles for the form
#[derive(Debug, Clone)]
pub struct ThemeColors {
    pub bg: Color,
    pub bg_secondary: Color,
    pub fg: Color,
    pub fg_muted: Color,

    pub primary: Color,
    pub secondary: Color,

    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,

    pub border: Color,
    pub border_focus: Color,
    pub selection: Color,
}

impl ThemeColors {
    #[must_use]
    pub fn from_palette(p: ThemePalette) -> Self {
        Self {
            bg: p.bg,
            bg_secondary: Self::lighten(p.bg, 10),
            fg: p.fg,
            fg_muted: p.muted,

            primary: p.accent,
            secondary: p.secondary,

            success: p.success,
            warning: p.warning,
            error: p.error,
            info: p.info,

            border: p.muted,
            border_focus: p.accent,
            selection: p.selection,
        }
    }

    fn lighten(color: Color, amount: u8) -> Color {
        if let Color::Rgb(r, g, b) = color {
            Color::Rgb(
                r.saturating_add(amount),
                g.saturating_add(amount),
                b.saturating_add(amount),
            )
        } else {
            color
        }
    }

    #[must_use]
    pub fn text(&self) -> Style {
        Style::default().fg(self.fg)
    }

    #[must_use]
    pub fn text_muted(&self) -> Style {
        Style::default().fg(self.fg_muted)
    }

    #[must_use]
    pub fn text_primary(&self) -> Style {
        Style::default().fg(self.primary)
    }

    #[must_use]
    pub fn text_secondary(&self) -> Style {
        Style::default().fg(self.secondary)
    }

    #[must_use]
    pub fn text_success(&self) -> Style {
        Style::default().fg(self.success)
    }

    #[must_use]
    pub fn text_warning(&self) -> Style {
        Style::default().fg(self.warning)
    }

    #[must_use]
    pub fn text_error(&self) -> Style {
        Style::default().fg(self.error)
    }

    #[must_use]
    pub fn text_info(&self) -> Style {
        Style::default().fg(self.info)
    }

    /// Section heading style
    #[must_use]
    pub fn heading(&self) -> Style {
        self.text_primary().add_modifier(Modifier::BOLD)
    }

    /// Block border style
    #[must_use]
    pub fn block(&self) -> Style {
        Style::default().fg(self.border)
    }

    /// Focused block border style
    #[must_use]
    pub fn block_focus(&self) -> Style {
        Style::default().fg(self.border_focus)
    }

    /// Focused field style
    #[must_use]
    pub fn selected(&self) -> Style {
        Style::default()
            .bg(self.selection)
            .fg(self.fg)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn tab(&self) -> Style {
        Style::default().fg(self.fg_muted)
    }

    #[must_use]
    pub fn tab_active(&self) -> Style {
        Style::default()
            .fg(self.primary)
            .add_modifier(Modifier::BOLD)
    }

    /// Key hint style (for shortcuts)
    #[must_use]
    pub fn key_hint(&self) -> Style {
        Style::default()
            .fg(self.secondary)
            .add_modifier(Modifier::BOLD)
    }
}
