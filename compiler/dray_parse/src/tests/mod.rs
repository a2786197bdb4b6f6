//! Parser tests.
//!
//! Shared fixtures lex-and-parse source strings through a collecting
//! handler and assert on the arena-indexed tree plus the diagnostics.

mod decls;
mod stmts;
mod structural;

use crate::ParseOutput;
use dray_diagnostic::{CollectHandler, DiagnosticSet};
use dray_ir::StringInterner;

/// Parse a module, returning the output, diagnostics, and interner.
pub(crate) fn parse(source: &str) -> (ParseOutput, DiagnosticSet, StringInterner) {
    let interner = StringInterner::new();
    let mut handler = CollectHandler::new();
    let output = crate::parse(source, &interner, &mut handler);
    (output, handler.into_set(), interner)
}

/// Parse a module that must produce no diagnostics at all.
pub(crate) fn parse_ok(source: &str) -> (ParseOutput, StringInterner) {
    let (output, diags, interner) = parse(source);
    assert!(
        diags.is_empty(),
        "unexpected diagnostics for {source:?}: {diags:?}"
    );
    (output, interner)
}

/// Parse an expression string, returning the root and the diagnostics.
pub(crate) fn parse_expr(
    source: &str,
) -> (
    dray_ir::ast::ExprId,
    dray_ir::AstArena,
    DiagnosticSet,
    StringInterner,
) {
    let interner = StringInterner::new();
    let mut handler = CollectHandler::new();
    let (expr, arena) = crate::parse_expression_from_string(source, &interner, &mut handler);
    (expr, arena, handler.into_set(), interner)
}

/// Parse a statement string that must produce no diagnostics.
pub(crate) fn parse_stmts_ok(
    source: &str,
) -> (Vec<dray_ir::ast::StmtId>, dray_ir::AstArena, StringInterner) {
    let interner = StringInterner::new();
    let mut handler = CollectHandler::new();
    let (stmts, arena) = crate::parse_statements_from_string(source, &interner, &mut handler);
    let diags = handler.into_set();
    assert!(
        diags.is_empty(),
        "unexpected diagnostics for {source:?}: {diags:?}"
    );
    (stmts, arena, interner)
}
