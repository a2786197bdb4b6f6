//! Terminal reporting.
//!
//! Spans are byte offsets; the [`LineTable`] resolves them to 1-based
//! line/column pairs at report time.

use crate::{DiagnosticSet, Severity};
use dray_ir::Span;
use std::io::Write;

/// Byte-offset to line/column resolution for one source buffer.
pub struct LineTable {
    /// Byte offset of the start of each line.
    line_starts: Vec<u32>,
}

impl LineTable {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0u32];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i as u32 + 1);
            }
        }
        LineTable { line_starts }
    }

    /// Resolve a byte offset to a 1-based (line, column) pair.
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        let col = offset - self.line_starts[line];
        (line as u32 + 1, col + 1)
    }
}

/// Drains diagnostics to a sink, one line per primary or supplemental.
///
/// Output format is the classic `file(line,col): Severity: message`.
pub struct Reporter<'a, W: Write> {
    file: &'a str,
    lines: LineTable,
    sink: W,
}

impl<'a, W: Write> Reporter<'a, W> {
    pub fn new(file: &'a str, source: &str, sink: W) -> Self {
        Reporter {
            file,
            lines: LineTable::new(source),
            sink,
        }
    }

    /// Emit a single line. Write failures truncate silently; reporting is
    /// infallible by contract.
    pub fn emit_line(&mut self, span: Span, severity: Severity, message: &str, supplemental: bool) {
        let (line, col) = self.lines.line_col(span.start);
        let indent = if supplemental { "       " } else { "" };
        let _ = writeln!(
            self.sink,
            "{indent}{}({line},{col}): {}: {message}",
            self.file,
            severity.display_name()
        );
    }

    /// Drain a set: each primary followed by its supplementals.
    pub fn drain(&mut self, set: &DiagnosticSet) {
        for diag in set {
            self.emit_line(diag.span, diag.severity, &diag.message, false);
            for supp in &diag.supplementals {
                self.emit_line(supp.span, diag.severity, &supp.message, true);
            }
        }
    }

    pub fn into_sink(self) -> W {
        self.sink
    }
}
