//! The handler capability.
//!
//! Producers (lexer, parser) report through a `&mut dyn Handler` and never
//! learn whether diagnostics are collected, suppressed, or printed on the
//! spot. Handlers are infallible; a sink that cannot write truncates
//! silently.

use crate::{Diagnostic, DiagnosticSet, Reporter, Severity};
use dray_ir::Span;
use std::io::Write;

/// Where diagnostics go.
///
/// The producer promises to call this at most once per diagnostic, and to
/// send supplementals strictly after their primary.
pub trait Handler {
    /// Report one diagnostic line.
    ///
    /// `supplemental` lines attach to the most recent primary and share its
    /// severity; the `severity` argument of a supplemental is the parent's.
    fn report(&mut self, span: Span, severity: Severity, message: String, supplemental: bool);

    /// Count of error-severity primaries seen so far.
    fn error_count(&self) -> usize;
}

/// Discards everything. Used for speculative parses.
#[derive(Default)]
pub struct SuppressHandler {
    errors: usize,
}

impl SuppressHandler {
    pub fn new() -> Self {
        SuppressHandler::default()
    }
}

impl Handler for SuppressHandler {
    fn report(&mut self, _span: Span, severity: Severity, _message: String, supplemental: bool) {
        if severity == Severity::Error && !supplemental {
            self.errors += 1;
        }
    }

    fn error_count(&self) -> usize {
        self.errors
    }
}

/// Appends to a [`DiagnosticSet`] for later draining.
#[derive(Default)]
pub struct CollectHandler {
    set: DiagnosticSet,
}

impl CollectHandler {
    pub fn new() -> Self {
        CollectHandler::default()
    }

    pub fn set(&self) -> &DiagnosticSet {
        &self.set
    }

    pub fn into_set(self) -> DiagnosticSet {
        self.set
    }
}

impl Handler for CollectHandler {
    fn report(&mut self, span: Span, severity: Severity, message: String, supplemental: bool) {
        if supplemental {
            self.set.add_supplemental(span, message);
        } else {
            self.set.push(Diagnostic::new(span, severity, message));
        }
    }

    fn error_count(&self) -> usize {
        self.set.error_count()
    }
}

/// Reports immediately through a [`Reporter`]'s severity-keyed sinks.
pub struct EmitHandler<'a, W: Write> {
    reporter: Reporter<'a, W>,
    errors: usize,
    last_severity: Severity,
}

impl<'a, W: Write> EmitHandler<'a, W> {
    pub fn new(reporter: Reporter<'a, W>) -> Self {
        EmitHandler {
            reporter,
            errors: 0,
            last_severity: Severity::Error,
        }
    }
}

impl<W: Write> Handler for EmitHandler<'_, W> {
    fn report(&mut self, span: Span, severity: Severity, message: String, supplemental: bool) {
        // Supplementals inherit the severity of the preceding primary.
        let severity = if supplemental {
            self.last_severity
        } else {
            self.last_severity = severity;
            severity
        };
        if severity == Severity::Error && !supplemental {
            self.errors += 1;
        }
        self.reporter.emit_line(span, severity, &message, supplemental);
    }

    fn error_count(&self) -> usize {
        self.errors
    }
}
