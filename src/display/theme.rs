//! Colour theme for terminal output.

use console::Style;
use owo_colors::{AnsiColors, OwoColorize};
use std::fmt::Display;
use std::sync::LazyLock;

/// Shared theme instance.
pub static THEME: LazyLock<Theme> = LazyLock::new(Theme::default);

/// Kind of status line; picks the icon and its colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Success,
    Error,
    Warning,
}

impl Status {
    fn icon(self) -> &'static str {
        match self {
            Self::Success => "✓",
            Self::Error => "✗",
            Self::Warning => "⚠",
        }
    }

    fn color(self) -> AnsiColors {
        match self {
            Self::Success => AnsiColors::Green,
            Self::Error => AnsiColors::Red,
            Self::Warning => AnsiColors::Yellow,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub success: Style,
    pub error: Style,
    pub warning: Style,
    /// Section titles
    pub header: Style,
    /// Words from the vocabulary
    pub word: Style,
    /// Distances and scores
    pub number: Style,
    /// Cache files and embedding paths
    pub path: Style,
    pub dim: Style,
    /// Never emit escape codes, whatever the terminal supports
    plain: bool,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            success: Style::new().green().bright(),
            error: Style::new().red().bright(),
            warning: Style::new().yellow().bright(),
            header: Style::new().cyan().bold(),
            word: Style::new().bold(),
            number: Style::new().cyan(),
            path: Style::new().magenta(),
            dim: Style::new().dim(),
            plain: false,
        }
    }
}

impl Theme {
    /// A theme that renders text unstyled, e.g. for logs and tests.
    pub fn plain() -> Self {
        Self {
            plain: true,
            ..Self::default()
        }
    }

    pub fn success_with_icon(&self, text: &str) -> String {
        self.status_line(Status::Success, text)
    }

    pub fn error_with_icon(&self, text: &str) -> String {
        self.status_line(Status::Error, text)
    }

    pub fn warning_with_icon(&self, text: &str) -> String {
        self.status_line(Status::Warning, text)
    }

    /// Styles `text` unless colours are off.
    pub fn apply<T: Display>(&self, style: &Style, text: T) -> String {
        if self.colors_enabled() {
            style.apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }

    /// False for [`Theme::plain`], under `NO_COLOR`, or when stdout is not a
    /// terminal.
    pub fn colors_enabled(&self) -> bool {
        use is_terminal::IsTerminal;
        !self.plain && std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
    }

    fn status_line(&self, status: Status, text: &str) -> String {
        if !self.colors_enabled() {
            return format!("{} {text}", status.icon());
        }
        let style = match status {
            Status::Success => &self.success,
            Status::Error => &self.error,
            Status::Warning => &self.warning,
        };
        format!(
            "{} {}",
            status.icon().color(status.color()),
            style.apply_to(text)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_status_lines() {
        let theme = Theme::plain();
        assert!(!theme.colors_enabled());
        assert_eq!(theme.success_with_icon("saved"), "✓ saved");
        assert_eq!(
            theme.error_with_icon("'zzz' not found"),
            "✗ 'zzz' not found"
        );
        assert_eq!(theme.warning_with_icon("not cached"), "⚠ not cached");
    }

    #[test]
    fn test_plain_apply_keeps_text() {
        let theme = Theme::plain();
        assert_eq!(theme.apply(&theme.number, 0.25), "0.25");
        assert_eq!(theme.apply(&theme.word, "queen"), "queen");
    }
}
