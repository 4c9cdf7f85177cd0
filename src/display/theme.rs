//! Consistent color theme and styling for terminal output.

use console::Style;
use owo_colors::OwoColorize;
use std::fmt::Display;
use std::sync::LazyLock;

/// Global theme instance for consistent styling across the application.
pub static THEME: LazyLock<Theme> = LazyLock::new(Theme::default);

/// Color theme for terminal output.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Success/positive indicators
    pub success: Style,
    /// Error/failure indicators
    pub error: Style,
    /// Warning/caution indicators
    pub warning: Style,
    /// Dimmed/secondary text
    pub dim: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            success: Style::new().green().bright(),
            error: Style::new().red().bright(),
            warning: Style::new().yellow().bright(),
            dim: Style::new().dim(),
        }
    }
}

impl Theme {
    /// Format a success message with checkmark.
    pub fn success_with_icon(&self, text: &str) -> String {
        Self::icon_line("✓", "✓".green(), &self.success, text, Self::colors_enabled())
    }

    /// Format an error message with X mark.
    pub fn error_with_icon(&self, text: &str) -> String {
        Self::icon_line("✗", "✗".red(), &self.error, text, Self::colors_enabled())
    }

    /// Format a warning message with warning sign.
    pub fn warning_with_icon(&self, text: &str) -> String {
        Self::icon_line("⚠", "⚠".yellow(), &self.warning, text, Self::colors_enabled())
    }

    /// Check if color output should be disabled.
    pub fn should_disable_colors() -> bool {
        use is_terminal::IsTerminal;
        std::env::var("NO_COLOR").is_ok() || !std::io::stdout().is_terminal()
    }

    fn colors_enabled() -> bool {
        !Self::should_disable_colors()
    }

    /// Apply theme styling conditionally based on terminal support.
    pub fn apply<T: Display>(&self, style: &Style, text: T) -> String {
        Self::paint(style, text, Self::colors_enabled())
    }

    fn paint<T: Display>(style: &Style, text: T, colored: bool) -> String {
        if colored {
            style.apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn icon_line(
        icon: &str,
        painted_icon: impl Display,
        style: &Style,
        text: &str,
        colored: bool,
    ) -> String {
        if colored {
            format!("{painted_icon} {}", style.apply_to(text))
        } else {
            format!("{icon} {text}")
        }
    }
}
