//! Terminal styling helpers
//!
//! Colors are always applied; `anstream` strips them when the output is not
//! a terminal.

use indicatif::ProgressStyle;
use owo_colors::OwoColorize;
use std::fmt::Display;

/// Semantic styles for CLI output
pub trait Stylize {
    /// Highlighted value (branch names, URLs)
    fn accent(&self) -> String;
    /// Secondary information
    fn muted(&self) -> String;
    /// Headings
    fn emphasis(&self) -> String;
    /// Warnings
    fn warn(&self) -> String;
    /// Failures
    fn failure(&self) -> String;
}

impl<T: Display> Stylize for T {
    fn accent(&self) -> String {
        self.cyan().to_string()
    }

    fn muted(&self) -> String {
        self.dimmed().to_string()
    }

    fn emphasis(&self) -> String {
        self.bold().to_string()
    }

    fn warn(&self) -> String {
        self.yellow().to_string()
    }

    fn failure(&self) -> String {
        self.red().to_string()
    }
}

/// Green check mark
pub fn check() -> String {
    "✓".green().to_string()
}

/// Red cross
pub fn cross() -> String {
    "✗".red().to_string()
}

/// Spinner used while waiting on the host
pub fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}
