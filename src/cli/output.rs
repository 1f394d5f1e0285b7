//! Terminal and JSON output

use crate::core::{Priority, Status};
use crate::error::Result;
use colored::{ColoredString, Colorize};
use serde::Serialize;

/// Writes command results either as coloured text or as JSON documents.
///
/// In JSON mode only [`print_json`](Self::print_json) writes to stdout, so the
/// stream stays machine-readable.
#[derive(Debug, Clone)]
pub struct OutputFormatter {
    json: bool,
}

impl OutputFormatter {
    #[must_use]
    pub fn new(json: bool, no_color: bool) -> Self {
        if no_color {
            colored::control::set_override(false);
        }
        Self { json }
    }

    #[must_use]
    pub const fn is_json(&self) -> bool {
        self.json
    }

    pub fn success(&self, message: &str) {
        if !self.json {
            println!("{} {message}", "✓".green().bold());
        }
    }

    pub fn info(&self, message: &str) {
        if !self.json {
            println!("{message}");
        }
    }

    pub fn warning(&self, message: &str) {
        if !self.json {
            eprintln!("{} {message}", "warning:".yellow().bold());
        }
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {message}", "error:".red().bold());
    }

    pub fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

/// Status rendered with its lifecycle colour
#[must_use]
pub fn status_label(status: Status) -> ColoredString {
    match status {
        Status::Open => status.as_str().cyan(),
        Status::InProgress => status.as_str().yellow(),
        Status::Resolved => status.as_str().green(),
        Status::Closed => status.as_str().dimmed(),
    }
}

#[must_use]
pub fn priority_label(priority: Priority) -> ColoredString {
    match priority {
        Priority::Low => priority.as_str().normal(),
        Priority::Medium => priority.as_str().blue(),
        Priority::High => priority.as_str().yellow().bold(),
        Priority::Critical => priority.as_str().red().bold(),
    }
}
