//! Terminal styling helpers
//!
//! Colors go through owo-colors; `anstream` strips them when the output is
//! not a terminal.

use indicatif::ProgressStyle;
use owo_colors::{OwoColorize, Style, Styled};
use std::fmt::Display;

/// Check mark used for completed steps
pub const CHECK: &str = "✓";

/// Warning marker
pub const WARN: &str = "!";

/// Semantic styles for CLI output
pub trait Stylize: OwoColorize + Display {
    /// Names: branches, remotes, PR references
    fn accent(&self) -> Styled<&Self> {
        self.style(Style::new().cyan())
    }

    /// Completed work
    fn success(&self) -> Styled<&Self> {
        self.style(Style::new().green())
    }

    /// Something the user should look at
    fn warn(&self) -> Styled<&Self> {
        self.style(Style::new().yellow())
    }

    /// Failures
    fn failure(&self) -> Styled<&Self> {
        self.style(Style::new().red().bold())
    }
}

impl<T: Display> Stylize for T {}

/// Green check mark
pub fn check() -> impl Display {
    CHECK.success().to_string()
}

/// Spinner used while waiting on GitHub
pub fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
}
