//! Diagnostic system for the Dray front end.
//!
//! Three roles:
//! - [`Diagnostic`] values: location + formatted message + severity +
//!   supplemental lines (supplementals share the parent's severity).
//! - [`DiagnosticSet`]: append-ordered collection with
//!   "attach supplemental to last added".
//! - [`Handler`] capability: where producers send diagnostics. Collect,
//!   suppress, or report immediately; the producer never knows which.
//!
//! Reporting is infallible by design: the parser treats every error as
//! recoverable and keeps going, and final success is judged externally by
//! "no error-severity diagnostics produced".

mod emitter;
mod handler;

pub use emitter::{LineTable, Reporter};
pub use handler::{CollectHandler, EmitHandler, Handler, SuppressHandler};

use dray_ir::Span;
use std::fmt;

/// Diagnostic severity taxonomy.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
    Deprecation,
}

impl Severity {
    pub const fn display_name(self) -> &'static str {
        match self {
            Severity::Error => "Error",
            Severity::Warning => "Warning",
            Severity::Deprecation => "Deprecation",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A supplemental line of a diagnostic. Shares the parent's severity.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Supplemental {
    pub span: Span,
    pub message: String,
}

/// One diagnostic: where, what, how bad, plus follow-up lines.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Diagnostic {
    pub span: Span,
    pub message: String,
    pub severity: Severity,
    pub supplementals: Vec<Supplemental>,
}

impl Diagnostic {
    pub fn new(span: Span, severity: Severity, message: impl Into<String>) -> Self {
        Diagnostic {
            span,
            message: message.into(),
            severity,
            supplementals: Vec::new(),
        }
    }

    pub fn error(span: Span, message: impl Into<String>) -> Self {
        Diagnostic::new(span, Severity::Error, message)
    }

    pub fn warning(span: Span, message: impl Into<String>) -> Self {
        Diagnostic::new(span, Severity::Warning, message)
    }

    pub fn deprecation(span: Span, message: impl Into<String>) -> Self {
        Diagnostic::new(span, Severity::Deprecation, message)
    }

    /// Attach a supplemental line.
    #[must_use]
    pub fn with_supplemental(mut self, span: Span, message: impl Into<String>) -> Self {
        self.supplementals.push(Supplemental {
            span,
            message: message.into(),
        });
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Append-ordered, indexable diagnostic collection.
#[derive(Clone, Default, Debug)]
pub struct DiagnosticSet {
    entries: Vec<Diagnostic>,
}

impl DiagnosticSet {
    pub fn new() -> Self {
        DiagnosticSet::default()
    }

    pub fn push(&mut self, diag: Diagnostic) {
        self.entries.push(diag);
    }

    /// Attach a supplemental to the most recently added diagnostic.
    ///
    /// Dropped silently when the set is empty; a supplemental without a
    /// primary has nothing to attach to.
    pub fn add_supplemental(&mut self, span: Span, message: impl Into<String>) {
        if let Some(last) = self.entries.last_mut() {
            last.supplementals.push(Supplemental {
                span,
                message: message.into(),
            });
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Diagnostic> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    /// Number of error-severity entries.
    pub fn error_count(&self) -> usize {
        self.entries.iter().filter(|d| d.is_error()).count()
    }

    /// Number of warning-severity entries.
    pub fn warning_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|d| d.is_error())
    }
}

impl std::ops::Index<usize> for DiagnosticSet {
    type Output = Diagnostic;

    fn index(&self, index: usize) -> &Diagnostic {
        &self.entries[index]
    }
}

impl<'a> IntoIterator for &'a DiagnosticSet {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
