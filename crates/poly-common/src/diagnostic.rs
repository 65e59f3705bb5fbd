use std::fmt;

use crate::Line;

/// The error taxonomy from spec §7. `Syntax` is never produced by this
/// workspace (lexing/parsing is an external collaborator) but is kept here
/// so a caller that does own a parser can report through the same type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Severity {
    Syntax,
    Type,
    Runtime,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Syntax => write!(f, "Syntax Error"),
            Severity::Type => write!(f, "Type Error"),
            Severity::Runtime => write!(f, "Runtime Error"),
        }
    }
}

/// A single non-recoverable diagnostic: the pipeline aborts on the first
/// one raised (§7 "no error is recovered inside the pipeline").
///
/// `trace` holds the chain of internal context an implementer would want
/// under `--debug` (e.g. "while checking argument 2 of `f`") — always
/// populated, only ever *shown* when the caller asks for it. This keeps the
/// decision of whether to show the trace a presentation concern, matching
/// `--debug`'s description in §6 ("with `--debug`, the underlying trace is
/// retained").
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub line: Line,
    pub message: String,
    pub trace: Vec<String>,
}

impl Diagnostic {
    pub fn new(severity: Severity, line: Line, message: impl Into<String>) -> Self {
        Diagnostic {
            severity,
            line,
            message: message.into(),
            trace: Vec::new(),
        }
    }

    pub fn type_error(line: Line, message: impl Into<String>) -> Self {
        Diagnostic::new(Severity::Type, line, message)
    }

    pub fn runtime_error(line: Line, message: impl Into<String>) -> Self {
        Diagnostic::new(Severity::Runtime, line, message)
    }

    /// Attach a line of debug-only context, innermost first.
    pub fn with_trace(mut self, context: impl Into<String>) -> Self {
        self.trace.push(context.into());
        self
    }

    /// Render for a caller that did not pass `--debug`: just the message,
    /// per §6.
    pub fn render_terse(&self) -> String {
        format!("[Line {}] {}: {}", self.line, self.severity, self.message)
    }

    /// Render including the accumulated trace, for `--debug`.
    pub fn render_debug(&self) -> String {
        let mut out = self.render_terse();
        for (depth, ctx) in self.trace.iter().enumerate() {
            out.push_str(&format!("\n  {}└─ {ctx}", "  ".repeat(depth)));
        }
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render_terse())
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terse_render_matches_source_format() {
        let d = Diagnostic::type_error(42, "Expected 'Bool', got 'Int'");
        assert_eq!(
            d.render_terse(),
            "[Line 42] Type Error: Expected 'Bool', got 'Int'"
        );
    }

    #[test]
    fn debug_render_includes_trace_lines() {
        let d = Diagnostic::type_error(1, "boom").with_trace("while checking `f`");
        let rendered = d.render_debug();
        assert!(rendered.contains("boom"));
        assert!(rendered.contains("while checking `f`"));
    }
}
