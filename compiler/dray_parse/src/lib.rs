//! Recursive descent parser for Dray.
//!
//! One [`Parser`] instance parses one module: it consumes the token stream
//! produced by `dray_lexer` and builds the arena-indexed AST from
//! `dray_ir`. Errors never unwind — every production returns a node
//! (possibly an error sentinel), diagnostics flow to the configured
//! handler, and the parser re-synchronises on declaration/statement
//! boundaries.

mod attributes;
mod cursor;
mod grammar;
mod precedence;
pub mod probes;
mod recovery;

#[cfg(test)]
mod tests;

pub use attributes::PrefixAttributes;
pub use cursor::Cursor;
pub use probes::NeedDeclaratorId;
pub use recovery::{synchronize, TokenSet, DECL_BOUNDARY, STMT_BOUNDARY};

use dray_diagnostic::{Handler, Severity};
use dray_ir::ast::{Decl, DeclId, Expr, ExprId, Module, Stmt, StmtId, Type, TypeId};
use dray_ir::{Linkage, Name, Span, StringInterner, Token, TokenKind, TokenList};

/// Output from parsing a module: the module handle plus the arena that owns
/// every node. Diagnostics have already flowed to the handler.
pub struct ParseOutput {
    pub module: Module,
    pub arena: dray_ir::AstArena,
}

/// Parser state, scoped to one parse of one module.
pub struct Parser<'a> {
    pub(crate) cursor: Cursor<'a>,
    pub(crate) arena: dray_ir::AstArena,
    pub(crate) interner: &'a StringInterner,
    pub(crate) handler: &'a mut dyn Handler,
    /// Current linkage, save/restored around `extern(...)` blocks.
    pub(crate) linkage: Linkage,
    /// Span of an `if` whose then-branch is being parsed without braces;
    /// dangling-else detection consults this.
    pub(crate) looking_for_else: Option<Span>,
    /// Depth of `[ ... ]` nesting.
    pub(crate) in_brackets: u32,
}

impl<'a> Parser<'a> {
    pub fn new(
        tokens: &'a TokenList,
        interner: &'a StringInterner,
        handler: &'a mut dyn Handler,
    ) -> Self {
        Parser {
            cursor: Cursor::new(tokens),
            arena: dray_ir::AstArena::new(),
            interner,
            handler,
            linkage: Linkage::Default,
            looking_for_else: None,
            in_brackets: 0,
        }
    }

    // --- Cursor delegation ---

    #[inline]
    pub(crate) fn kind(&self) -> TokenKind {
        self.cursor.kind()
    }

    #[inline]
    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.cursor.check(kind)
    }

    #[inline]
    pub(crate) fn peek_kind(&self, k: usize) -> TokenKind {
        self.cursor.peek_kind(k)
    }

    #[inline]
    pub(crate) fn span(&self) -> Span {
        self.cursor.span()
    }

    #[inline]
    pub(crate) fn prev_span(&self) -> Span {
        self.cursor.prev_span()
    }

    #[inline]
    pub(crate) fn advance(&mut self) -> Token {
        *self.cursor.advance()
    }

    /// Consume the current token if it matches.
    #[inline]
    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.cursor.advance();
            true
        } else {
            false
        }
    }

    #[inline]
    pub(crate) fn is_at_end(&self) -> bool {
        self.cursor.is_at_end()
    }

    /// Doc comment on the current token, if any.
    #[inline]
    pub(crate) fn token_doc(&self) -> Option<Name> {
        self.cursor.current().doc
    }

    // --- Diagnostics ---

    pub(crate) fn error(&mut self, span: Span, message: impl Into<String>) {
        self.handler
            .report(span, Severity::Error, message.into(), false);
    }

    pub(crate) fn error_here(&mut self, message: impl Into<String>) {
        let span = self.span();
        self.error(span, message);
    }

    pub(crate) fn supplemental(&mut self, span: Span, message: impl Into<String>) {
        self.handler
            .report(span, Severity::Error, message.into(), true);
    }

    pub(crate) fn warning(&mut self, span: Span, message: impl Into<String>) {
        self.handler
            .report(span, Severity::Warning, message.into(), false);
    }

    pub(crate) fn deprecation(&mut self, span: Span, message: impl Into<String>) {
        self.handler
            .report(span, Severity::Deprecation, message.into(), false);
    }

    // --- Expect helpers ---

    /// Consume `kind` or diagnose `found ... when expecting ...`.
    pub(crate) fn expect(&mut self, kind: TokenKind) -> bool {
        if self.eat(kind) {
            true
        } else {
            self.expect_failed(kind);
            false
        }
    }

    #[cold]
    fn expect_failed(&mut self, kind: TokenKind) {
        let found = self.kind();
        if found == TokenKind::Eof {
            self.error_here(format!(
                "`{}` expected, not end of file",
                kind.display_name()
            ));
        } else {
            self.error_here(format!(
                "found `{}` when expecting `{}`",
                found.display_name(),
                kind.display_name()
            ));
        }
    }

    /// Consume a closing token, naming the opening location on mismatch.
    pub(crate) fn expect_closing(&mut self, close: TokenKind, open: TokenKind, open_span: Span) -> bool {
        if self.eat(close) {
            return true;
        }
        if self.is_at_end() {
            self.error_here(format!(
                "matching `{}` expected following `{}`, not end of file",
                close.display_name(),
                open.display_name()
            ));
        } else {
            self.error_here(format!(
                "found `{}` when expecting `{}`",
                self.kind().display_name(),
                close.display_name()
            ));
        }
        self.supplemental(
            open_span,
            format!("unmatched `{}` opened here", open.display_name()),
        );
        false
    }

    /// Consume an identifier, or diagnose with `what` naming the context.
    pub(crate) fn expect_identifier(&mut self, what: &str) -> Option<Name> {
        if let Some(name) = self.cursor.ident() {
            self.cursor.advance();
            Some(name)
        } else {
            self.error_here(format!(
                "identifier expected following {what}, not `{}`",
                self.kind().display_name()
            ));
            None
        }
    }

    /// Interned text of a name.
    #[inline]
    pub(crate) fn lookup(&self, name: Name) -> &'a str {
        self.interner.lookup(name)
    }

    /// Identity comparison against a well-known identifier.
    #[inline]
    pub(crate) fn is_well_known(&self, name: Name, text: &str) -> bool {
        self.interner.intern(text) == name
    }

    // --- Sentinels ---

    pub(crate) fn error_expr(&mut self, span: Span) -> ExprId {
        self.arena.alloc_expr(Expr::error(span))
    }

    pub(crate) fn error_type(&mut self, span: Span) -> TypeId {
        self.arena.alloc_type(Type::error(span))
    }

    pub(crate) fn error_stmt(&mut self, span: Span) -> StmtId {
        self.arena.alloc_stmt(Stmt::error(span))
    }

    pub(crate) fn error_decl(&mut self, span: Span) -> DeclId {
        self.arena.alloc_decl(Decl::error(span))
    }

    // --- Recovery ---

    /// Emit `message` and skip to the next declaration boundary, consuming
    /// one terminating `;`.
    pub(crate) fn error_and_resync(&mut self, message: impl Into<String>) {
        self.error_here(message);
        self.resync();
    }

    /// Skip to the next `;` / `}` / EOF; consume the `;`.
    pub(crate) fn resync(&mut self) {
        tracing::trace!(pos = self.cursor.position(), "resync after parse error");
        recovery::synchronize(&mut self.cursor, recovery::DECL_BOUNDARY);
        self.eat(TokenKind::Semicolon);
    }

    /// Span of the expression `id`.
    #[inline]
    pub(crate) fn expr_span(&self, id: ExprId) -> Span {
        self.arena.expr(id).span
    }

    /// Span of the type `id`.
    #[inline]
    pub(crate) fn type_span(&self, id: TypeId) -> Span {
        self.arena.ty(id).span
    }

    /// Span of the statement `id`.
    #[inline]
    pub(crate) fn stmt_span(&self, id: StmtId) -> Span {
        self.arena.stmt(id).span
    }
}

/// Parse a lexed token stream into a module.
pub fn parse_module(
    tokens: &TokenList,
    interner: &StringInterner,
    handler: &mut dyn Handler,
) -> ParseOutput {
    let parser = Parser::new(tokens, interner, handler);
    parser.run_module()
}

/// Lex and parse a source buffer in one step.
pub fn parse(source: &str, interner: &StringInterner, handler: &mut dyn Handler) -> ParseOutput {
    let tokens = dray_lexer::lex(source, interner, handler);
    parse_module(&tokens, interner, handler)
}

/// Parse a single expression from synthesized source text.
///
/// Entry point for string-mixin re-parsing: semantic analysis lexes the
/// mixin buffer and hands it here.
pub fn parse_expression_from_string(
    source: &str,
    interner: &StringInterner,
    handler: &mut dyn Handler,
) -> (ExprId, dray_ir::AstArena) {
    let tokens = dray_lexer::lex(source, interner, handler);
    let mut parser = Parser::new(&tokens, interner, handler);
    let expr = parser.parse_expression();
    if !parser.is_at_end() {
        parser.error_here("unexpected tokens following expression");
    }
    (expr, parser.arena)
}

/// Parse a run of statements from synthesized source text.
pub fn parse_statements_from_string(
    source: &str,
    interner: &StringInterner,
    handler: &mut dyn Handler,
) -> (Vec<StmtId>, dray_ir::AstArena) {
    let tokens = dray_lexer::lex(source, interner, handler);
    let mut parser = Parser::new(&tokens, interner, handler);
    let mut stmts = Vec::new();
    while !parser.is_at_end() {
        let before = parser.cursor.position();
        stmts.push(parser.parse_statement(true));
        if parser.cursor.position() == before {
            // stray closing token; skip it so the loop always advances
            parser.advance();
        }
    }
    (stmts, parser.arena)
}
