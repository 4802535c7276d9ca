//! Styled terminal output for the command results.

use console::{Term, style};
use std::fmt::Display;

/// Writes command results to stdout. Write failures are ignored.
pub struct Output {
    term: Term,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
        }
    }

    fn line(&self, line: impl AsRef<str>) {
        drop(self.term.write_line(line.as_ref()));
    }

    /// `✓ message` in green.
    pub fn success(&self, message: impl Display) {
        self.line(format!("{} {message}", style("✓").green().bold()));
    }

    /// `⚠ message` in yellow.
    pub fn warning(&self, message: impl Display) {
        self.line(format!("{} {message}", style("⚠").yellow().bold()));
    }

    /// One unstyled line, e.g. a user id.
    pub fn print(&self, message: impl Display) {
        self.line(message.to_string());
    }

    /// Bold cyan title above a listing or a record.
    pub fn header(&self, message: impl Display) {
        self.line(style(message).bold().cyan().to_string());
    }

    /// `label: value`, indented by `indent` spaces.
    pub fn labeled_indent(&self, label: impl Display, value: impl Display, indent: usize) {
        self.line(format!("{:indent$}{}: {value}", "", style(label).dim()));
    }

    /// `label: count` with the count highlighted.
    pub fn count(&self, label: impl Display, count: usize) {
        self.line(format!("{}: {}", style(label).dim(), style(count).cyan().bold()));
    }
}
