//! Diagnostic collection: the error-sink capability.
//!
//! The scope engine reports recoverable conflicts and resolution failures
//! here and keeps going; it never aborts on user input. A caller that wants
//! the messages drains the collection after a parse; a caller that ignores it
//! gets the degraded-but-functional behavior.

use std::collections::VecDeque;
use std::fmt;

use crate::{SemanticError, Span};

/// Severity of a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A semantic conflict; parsing continued with the documented resolution.
    Error,
    /// A suspicious construct that resolved to a usable fallback.
    Warning,
}

/// A single diagnostic message.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Severity of this message.
    pub kind: DiagnosticKind,
    /// The message text.
    pub message: String,
    /// Source position, when the triggering declaration carried one.
    pub span: Option<Span>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            DiagnosticKind::Error => "error",
            DiagnosticKind::Warning => "warning",
        };
        match self.span {
            Some(span) => write!(f, "{}: {}: {}", span, kind, self.message),
            None => write!(f, "{}: {}", kind, self.message),
        }
    }
}

/// An accumulating collection of diagnostics.
#[derive(Debug, Default)]
pub struct Diagnostics {
    diagnostics: VecDeque<Diagnostic>,
    has_errors: bool,
}

impl Diagnostics {
    /// Create a new, empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error.
    pub fn error(&mut self, err: SemanticError) {
        let span = err.span();
        self.push(Diagnostic {
            kind: DiagnosticKind::Error,
            message: err.to_string(),
            span,
        });
    }

    /// Record a warning.
    pub fn warning(&mut self, err: SemanticError) {
        let span = err.span();
        self.push(Diagnostic {
            kind: DiagnosticKind::Warning,
            message: err.to_string(),
            span,
        });
    }

    /// Record a free-form note attached to the previous message, e.g.
    /// "previous definition is here".
    pub fn note(&mut self, message: impl Into<String>, span: Option<Span>) {
        self.push(Diagnostic {
            kind: DiagnosticKind::Warning,
            message: message.into(),
            span,
        });
    }

    fn push(&mut self, diagnostic: Diagnostic) {
        if diagnostic.kind == DiagnosticKind::Error {
            self.has_errors = true;
        }
        self.diagnostics.push_back(diagnostic);
    }

    /// Whether any error-level diagnostic was recorded.
    pub fn has_errors(&self) -> bool {
        self.has_errors
    }

    /// Number of collected messages.
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Iterate over all collected messages.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Iterate over error-level messages only.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.kind == DiagnosticKind::Error)
    }

    /// Iterate over warning-level messages only.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.kind == DiagnosticKind::Warning)
    }

    /// Drain all collected messages.
    pub fn drain(&mut self) -> Vec<Diagnostic> {
        self.has_errors = false;
        self.diagnostics.drain(..).collect()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for diagnostic in &self.diagnostics {
            writeln!(f, "{}", diagnostic)?;
        }
        Ok(())
    }
}
