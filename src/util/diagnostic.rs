//! User-facing error reports.
//!
//! Every configuration failure is reported with its root cause, the facts
//! that led to it, and suggested fixes.

use std::fmt;
use std::path::PathBuf;

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// Suggestion when ROCm configuration was skipped.
    pub const ENABLE_ROCM: &str = "help: Set TF_NEED_ROCM=1 to configure ROCm support";

    /// Suggestion when a probe step fails.
    pub const PROBE_VERBOSE: &str =
        "help: Run `rocm-configure probe --verbose` to see every command that was run";
}

const ERROR_LABEL_COLOR: &str = "\x1b[1;31merror\x1b[0m";
const HELP_LABEL_COLOR: &str = "\x1b[1;32mhelp\x1b[0m";

/// An error report with context lines and numbered suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub message: String,
    /// Facts that led to the error, one per line
    pub context: Vec<String>,
    pub suggestions: Vec<String>,
    /// File the error is about
    pub location: Option<PathBuf>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
            location: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Render for a terminal, with ANSI labels when `color` is set.
    pub fn format(&self, color: bool) -> String {
        let (error_label, help_label) = if color {
            (ERROR_LABEL_COLOR, HELP_LABEL_COLOR)
        } else {
            ("error", "help")
        };

        let mut out = format!("{}: {}\n", error_label, self.message);

        if let Some(ref path) = self.location {
            out.push_str(&format!("  --> {}\n", path.display()));
        }
        for line in &self.context {
            out.push_str(&format!("  = {}\n", line));
        }

        if !self.suggestions.is_empty() {
            out.push_str(&format!("\n{}: consider:\n", help_label));
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                out.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }

        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(false))
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}
