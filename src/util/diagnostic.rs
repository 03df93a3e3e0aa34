//! User-facing error reports.
//!
//! A [`Diagnostic`] names what went wrong, the selections involved and what
//! to change, in a rustc-like layout:
//!
//! ```text
//! error: conflicting variants: '+cuda_hijack' requires '+cuda'.
//!   = note: rule `cuda-hijack-requires-cuda` matched: +cuda_hijack ~cuda
//!   = help: Adjust the selection so the rule no longer matches
//! ```

use std::fmt;

/// Shared help lines for spec input problems.
pub mod suggestions {
    /// Shown when a variant token does not parse.
    pub const NO_SPEC: &str = "help: Pass a spec file, or variants with `-v +name` / `-v name=value`";

    /// Shown when a spec file does not parse.
    pub const BAD_SPEC: &str =
        "help: Spec files are TOML with `version`, `compiler`, `build_type` and a `[variants]` table";
}

const RED_BOLD: &str = "\x1b[1;31m";
const CYAN_BOLD: &str = "\x1b[1;36m";
const GREEN_BOLD: &str = "\x1b[1;32m";
const RESET: &str = "\x1b[0m";

/// An error report with notes and suggested fixes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    /// Extra facts about the failure, shown as `note:` lines
    pub context: Vec<String>,
    /// Suggested fixes, shown as `help:` lines
    pub suggestions: Vec<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
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

    /// Render for a terminal, with ANSI colors when `color` is set.
    pub fn format(&self, color: bool) -> String {
        let paint = |code: &str, label: &str| {
            if color {
                format!("{}{}{}", code, label, RESET)
            } else {
                label.to_string()
            }
        };

        let mut output = format!("{}: {}\n", paint(RED_BOLD, "error"), self.message);
        for note in &self.context {
            output.push_str(&format!("  = {}: {}\n", paint(CYAN_BOLD, "note"), note));
        }
        for help in &self.suggestions {
            output.push_str(&format!("  = {}: {}\n", paint(GREEN_BOLD, "help"), help));
        }
        output
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
