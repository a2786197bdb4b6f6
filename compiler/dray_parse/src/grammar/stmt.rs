//! Statement parsing.
//!
//! Statement dispatch, the declaration-vs-expression probe, control flow,
//! exception handling, scope guards, asm token blocks, and the four
//! foreach variants.

use crate::probes::{self, NeedDeclaratorId};
use crate::Parser;
use dray_ir::ast::{
    AsmInst, CatchClause, CondKind, ForeachHeader, ForeachKind, GotoTarget, Param, ParamId,
    ScopeGuardKind, Stmt, StmtId, StmtKind,
};
use dray_ir::{Span, StorageClass, TokenKind};

impl Parser<'_> {
    /// `{ statements }` with looking-for-else context saved across the
    /// braces.
    pub(crate) fn parse_block_statement(&mut self) -> StmtId {
        let open = self.span();
        if !self.expect(TokenKind::LeftCurly) {
            return self.error_stmt(open);
        }

        let saved = self.looking_for_else.take();
        let mut stmts = Vec::new();
        while !self.check(TokenKind::RightCurly) && !self.is_at_end() {
            stmts.push(self.parse_statement(true));
        }
        self.expect_closing(TokenKind::RightCurly, TokenKind::LeftCurly, open);
        self.looking_for_else = saved;

        let span = open.merge(self.prev_span());
        let stmts = self.arena.alloc_stmt_list(&stmts);
        self.arena.alloc_stmt(Stmt::new(StmtKind::Block(stmts), span))
    }

    /// Parse one statement. `semi_ok` permits a bare `;` silently.
    pub(crate) fn parse_statement(&mut self, semi_ok: bool) -> StmtId {
        let start = self.span();

        match self.kind() {
            TokenKind::Semicolon => {
                if !semi_ok {
                    self.deprecation(start, "use `{ }` for an empty statement, not `;`");
                }
                self.advance();
                self.arena.alloc_stmt(Stmt::new(StmtKind::Empty, start))
            }
            TokenKind::LeftCurly => self.parse_block_statement(),
            TokenKind::Identifier if self.peek_kind(1) == TokenKind::Colon => {
                let label = self.cursor.ident().unwrap_or_default();
                self.advance();
                self.advance();
                let stmt = self.parse_statement(true);
                let span = start.merge(self.stmt_span(stmt));
                self.arena
                    .alloc_stmt(Stmt::new(StmtKind::Labeled { label, stmt }, span))
            }
            TokenKind::If => self.parse_if_statement(),
            TokenKind::Else => {
                self.error_and_resync("found `else` without a matching `if`");
                self.error_stmt(start)
            }
            TokenKind::While => self.parse_while_statement(),
            TokenKind::Do => self.parse_do_statement(),
            TokenKind::For => self.parse_for_statement(),
            TokenKind::Foreach | TokenKind::ForeachReverse => {
                let header = self.parse_foreach_header();
                let body = self.parse_statement(false);
                let span = start.merge(self.stmt_span(body));
                self.arena
                    .alloc_stmt(Stmt::new(StmtKind::Foreach { header, body }, span))
            }
            TokenKind::Switch => self.parse_switch_statement(false),
            TokenKind::Final if self.peek_kind(1) == TokenKind::Switch => {
                self.advance();
                self.parse_switch_statement(true)
            }
            TokenKind::Case => self.parse_case_statement(),
            TokenKind::Default => self.parse_default_statement(),
            TokenKind::Return => {
                self.advance();
                let e = if self.check(TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.parse_expression())
                };
                self.expect_semicolon();
                let span = start.merge(self.prev_span());
                self.arena.alloc_stmt(Stmt::new(StmtKind::Return(e), span))
            }
            TokenKind::Break => {
                self.advance();
                let label = self.opt_ident();
                self.expect_semicolon();
                let span = start.merge(self.prev_span());
                self.arena
                    .alloc_stmt(Stmt::new(StmtKind::Break { label }, span))
            }
            TokenKind::Continue => {
                self.advance();
                let label = self.opt_ident();
                self.expect_semicolon();
                let span = start.merge(self.prev_span());
                self.arena
                    .alloc_stmt(Stmt::new(StmtKind::Continue { label }, span))
            }
            TokenKind::Goto => self.parse_goto_statement(),
            TokenKind::Synchronized => {
                self.advance();
                let expr = if self.check(TokenKind::LeftParen) {
                    let open = self.span();
                    self.advance();
                    let e = self.parse_expression();
                    self.expect_closing(TokenKind::RightParen, TokenKind::LeftParen, open);
                    Some(e)
                } else {
                    None
                };
                let body = self.parse_statement(false);
                let span = start.merge(self.stmt_span(body));
                self.arena
                    .alloc_stmt(Stmt::new(StmtKind::Synchronized { expr, body }, span))
            }
            TokenKind::With => {
                self.advance();
                let open = self.span();
                self.expect(TokenKind::LeftParen);
                let expr = self.parse_expression();
                self.expect_closing(TokenKind::RightParen, TokenKind::LeftParen, open);
                let body = self.parse_statement(false);
                let span = start.merge(self.stmt_span(body));
                self.arena
                    .alloc_stmt(Stmt::new(StmtKind::With { expr, body }, span))
            }
            TokenKind::Try => self.parse_try_statement(),
            TokenKind::Throw => {
                self.advance();
                let e = self.parse_expression();
                self.expect_semicolon();
                let span = start.merge(self.prev_span());
                self.arena.alloc_stmt(Stmt::new(StmtKind::Throw(e), span))
            }
            TokenKind::Scope if self.peek_kind(1) == TokenKind::LeftParen => {
                self.parse_scope_guard()
            }
            TokenKind::Asm => self.parse_asm_statement(),
            TokenKind::Pragma => self.parse_pragma_statement(),
            TokenKind::Debug => {
                if self.peek_kind(1) == TokenKind::Assign {
                    self.error_and_resync(
                        "`debug = identifier` conditions can only appear at module level",
                    );
                    return self.error_stmt(start);
                }
                self.parse_conditional_statement(CondKind::Debug)
            }
            TokenKind::Version => {
                if self.peek_kind(1) == TokenKind::Assign {
                    self.error_and_resync(
                        "`version = identifier` conditions can only appear at module level",
                    );
                    return self.error_stmt(start);
                }
                self.parse_conditional_statement(CondKind::Version)
            }
            TokenKind::Static => match self.peek_kind(1) {
                TokenKind::If => self.parse_static_if_statement(),
                TokenKind::Foreach | TokenKind::ForeachReverse => {
                    self.advance(); // static
                    let header = self.parse_foreach_header();
                    let body = self.parse_statement(false);
                    let span = start.merge(self.stmt_span(body));
                    self.arena
                        .alloc_stmt(Stmt::new(StmtKind::StaticForeach { header, body }, span))
                }
                TokenKind::Assert => {
                    self.advance(); // static
                    self.parse_static_assert_statement()
                }
                TokenKind::Import => {
                    self.advance(); // static
                    self.parse_import_statement(true)
                }
                _ => self.parse_declaration_statement(),
            },
            TokenKind::Import if self.peek_kind(1) != TokenKind::LeftParen => {
                self.parse_import_statement(false)
            }
            TokenKind::Mixin => match self.peek_kind(1) {
                // mixin(...) is an expression statement
                TokenKind::LeftParen => self.parse_expression_statement(),
                _ => self.parse_declaration_statement(),
            },
            TokenKind::Struct
            | TokenKind::Union
            | TokenKind::Class
            | TokenKind::Interface
            | TokenKind::Enum
            | TokenKind::Template
            | TokenKind::Alias => self.parse_declaration_statement(),
            kind if self.statement_starts_declaration(kind) => self.parse_declaration_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    /// Decide declaration-vs-expression for tokens that could start either,
    /// biasing toward the expression reading.
    fn statement_starts_declaration(&self, kind: TokenKind) -> bool {
        // storage classes commit to a declaration
        if matches!(
            kind,
            TokenKind::Auto
                | TokenKind::Deprecated
                | TokenKind::At
                | TokenKind::Gshared
                | TokenKind::Extern
                | TokenKind::Lazy
                | TokenKind::Abstract
                | TokenKind::Override
        ) {
            return true;
        }
        if kind.is_type_ctor() && self.peek_kind(1) != TokenKind::LeftParen {
            return true;
        }
        if matches!(kind, TokenKind::Scope | TokenKind::Final)
            && self.peek_kind(1) != TokenKind::LeftParen
        {
            return true;
        }
        // otherwise a full declaration probe decides
        probes::is_declaration(
            self.cursor.tokens(),
            self.cursor.position(),
            NeedDeclaratorId::MustIfDstyle,
            None,
        )
        .is_some()
    }

    /// A declaration in statement position.
    fn parse_declaration_statement(&mut self) -> StmtId {
        let start = self.span();
        let mut decls = Vec::new();
        self.parse_decl_def(&mut decls);
        let span = start.merge(self.prev_span());

        match decls.len() {
            0 => self.arena.alloc_stmt(Stmt::new(StmtKind::Empty, span)),
            1 => self
                .arena
                .alloc_stmt(Stmt::new(StmtKind::DeclStmt(decls[0]), span)),
            _ => {
                let stmts: Vec<StmtId> = decls
                    .into_iter()
                    .map(|d| {
                        let d_span = self.arena.decl(d).span;
                        self.arena
                            .alloc_stmt(Stmt::new(StmtKind::DeclStmt(d), d_span))
                    })
                    .collect();
                let stmts = self.arena.alloc_stmt_list(&stmts);
                self.arena.alloc_stmt(Stmt::new(StmtKind::Block(stmts), span))
            }
        }
    }

    fn parse_expression_statement(&mut self) -> StmtId {
        let start = self.span();
        let e = self.parse_expression();
        self.expect_semicolon();
        let span = start.merge(self.prev_span());
        self.arena.alloc_stmt(Stmt::new(StmtKind::Expr(e), span))
    }

    /// Expect `;`, resynchronising on the statement boundary if missing.
    fn expect_semicolon(&mut self) {
        if self.eat(TokenKind::Semicolon) {
            return;
        }
        self.error_here(format!(
            "found `{}` when expecting `;` following statement",
            self.kind().display_name()
        ));
        crate::recovery::synchronize(&mut self.cursor, crate::recovery::STMT_BOUNDARY);
        self.eat(TokenKind::Semicolon);
    }

    fn opt_ident(&mut self) -> Option<dray_ir::Name> {
        if self.check(TokenKind::Identifier) {
            let name = self.cursor.ident();
            self.advance();
            name
        } else {
            None
        }
    }

    // --- Control flow ---

    /// `if (cond)` with the optional binding form
    /// `if ([storage classes] [Type] id = expr)`.
    fn parse_if_statement(&mut self) -> StmtId {
        let start = self.span();
        self.advance(); // if
        let open = self.span();
        self.expect(TokenKind::LeftParen);

        let param = self.parse_if_condition_param();
        let cond = self.parse_expression();
        self.expect_closing(TokenKind::RightParen, TokenKind::LeftParen, open);

        let saved = self.looking_for_else;
        self.looking_for_else = Some(start);
        let then_branch = self.parse_statement(false);
        self.looking_for_else = saved;

        let else_branch = if self.check(TokenKind::Else) {
            let else_span = self.span();
            self.check_dangling_else(else_span);
            self.advance();
            Some(self.parse_statement(false))
        } else {
            None
        };

        let span = start.merge(self.prev_span());
        self.arena.alloc_stmt(Stmt::new(
            StmtKind::If {
                param,
                cond,
                then_branch,
                else_branch,
            },
            span,
        ))
    }

    /// The declaration part of `if (auto x = e)`. Returns `None` when the
    /// condition is a plain expression; on `Some`, the cursor sits before
    /// the initializer expression (the `=` is consumed).
    fn parse_if_condition_param(&mut self) -> Option<ParamId> {
        let start = self.span();
        let mut stc = StorageClass::NONE;

        loop {
            let flag = match self.kind() {
                TokenKind::Auto => StorageClass::AUTO,
                TokenKind::Scope => StorageClass::SCOPE,
                TokenKind::Ref => StorageClass::REF,
                TokenKind::Const | TokenKind::Immutable | TokenKind::Shared | TokenKind::Inout
                    if self.peek_kind(1) != TokenKind::LeftParen =>
                {
                    self.storage_class_of(self.kind()).unwrap_or_default()
                }
                _ => break,
            };
            let span = self.span();
            self.advance();
            stc = self.append_storage_class(stc, flag, span);
        }

        // `stc id = expr`
        if !stc.is_empty()
            && self.check(TokenKind::Identifier)
            && self.peek_kind(1) == TokenKind::Assign
        {
            let name = self.cursor.ident();
            self.advance();
            self.advance(); // =
            let param = Param {
                stc,
                udas: None,
                ty: None,
                name,
                default: None,
                span: start.merge(self.prev_span()),
            };
            return Some(self.arena.alloc_param(param));
        }

        // `[stc] Type id = expr`
        let is_typed_binding = probes::is_declaration(
            self.cursor.tokens(),
            self.cursor.position(),
            NeedDeclaratorId::Must,
            Some(TokenKind::Assign),
        )
        .is_some();
        if is_typed_binding {
            let base = self.parse_type();
            let ty = self.parse_type_suffixes(base);
            let name = self.opt_ident();
            self.expect(TokenKind::Assign);
            let param = Param {
                stc,
                udas: None,
                ty: Some(ty),
                name,
                default: None,
                span: start.merge(self.prev_span()),
            };
            return Some(self.arena.alloc_param(param));
        }

        if !stc.is_empty() {
            self.error_here("identifier or type expected following storage class in `if (`");
        }
        None
    }

    /// Warn when an `else` is consumed while an enclosing unbraced `if`
    /// then-branch is still being parsed.
    pub(crate) fn check_dangling_else(&mut self, else_span: Span) {
        if self.looking_for_else.is_some() {
            self.warning(
                else_span,
                "`else` is dangling; add { } to make the matching `if` clear",
            );
        }
    }

    fn parse_while_statement(&mut self) -> StmtId {
        let start = self.span();
        self.advance(); // while
        let open = self.span();
        self.expect(TokenKind::LeftParen);
        let cond = self.parse_expression();
        self.expect_closing(TokenKind::RightParen, TokenKind::LeftParen, open);
        let body = self.parse_statement(false);
        let span = start.merge(self.stmt_span(body));
        self.arena
            .alloc_stmt(Stmt::new(StmtKind::While { cond, body }, span))
    }

    fn parse_do_statement(&mut self) -> StmtId {
        let start = self.span();
        self.advance(); // do
        let body = self.parse_statement(false);
        self.expect(TokenKind::While);
        let open = self.span();
        self.expect(TokenKind::LeftParen);
        let cond = self.parse_expression();
        self.expect_closing(TokenKind::RightParen, TokenKind::LeftParen, open);
        self.expect_semicolon();
        let span = start.merge(self.prev_span());
        self.arena
            .alloc_stmt(Stmt::new(StmtKind::DoWhile { body, cond }, span))
    }

    fn parse_for_statement(&mut self) -> StmtId {
        let start = self.span();
        self.advance(); // for
        let open = self.span();
        self.expect(TokenKind::LeftParen);

        let init = if self.eat(TokenKind::Semicolon) {
            None
        } else {
            // the initializer statement consumes its own `;`
            Some(self.parse_statement(true))
        };
        let cond = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression())
        };
        self.expect(TokenKind::Semicolon);
        let increment = if self.check(TokenKind::RightParen) {
            None
        } else {
            Some(self.parse_expression())
        };
        self.expect_closing(TokenKind::RightParen, TokenKind::LeftParen, open);

        let body = self.parse_statement(false);
        let span = start.merge(self.stmt_span(body));
        self.arena.alloc_stmt(Stmt::new(
            StmtKind::For {
                init,
                cond,
                increment,
                body,
            },
            span,
        ))
    }

    /// The shared foreach header:
    /// `foreach[_reverse] ( params ; aggregate [.. upper] )`
    pub(crate) fn parse_foreach_header(&mut self) -> ForeachHeader {
        let kind = if self.check(TokenKind::ForeachReverse) {
            ForeachKind::ForeachReverse
        } else {
            ForeachKind::Foreach
        };
        self.advance();

        let open = self.span();
        self.expect(TokenKind::LeftParen);

        let mut params = Vec::new();
        loop {
            params.push(self.parse_foreach_param());
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::Semicolon);

        let aggregate = self.parse_assign_expr();
        let upper = if self.eat(TokenKind::DotDot) {
            Some(self.parse_assign_expr())
        } else {
            None
        };
        self.expect_closing(TokenKind::RightParen, TokenKind::LeftParen, open);

        let params = self.arena.alloc_params(params);
        ForeachHeader {
            kind,
            params,
            aggregate,
            upper,
        }
    }

    /// One foreach parameter: storage classes, optional type, identifier.
    fn parse_foreach_param(&mut self) -> Param {
        let start = self.span();
        let mut stc = StorageClass::NONE;

        loop {
            let flag = match self.kind() {
                TokenKind::Ref => StorageClass::REF,
                TokenKind::Scope => StorageClass::SCOPE,
                TokenKind::Alias => StorageClass::ALIAS,
                TokenKind::Enum => StorageClass::MANIFEST,
                TokenKind::Const | TokenKind::Immutable | TokenKind::Shared | TokenKind::Inout
                    if self.peek_kind(1) != TokenKind::LeftParen =>
                {
                    self.storage_class_of(self.kind()).unwrap_or_default()
                }
                _ => break,
            };
            let span = self.span();
            self.advance();
            stc = self.append_storage_class(stc, flag, span);
        }

        let (ty, name) = if self.check(TokenKind::Identifier)
            && matches!(
                self.peek_kind(1),
                TokenKind::Comma | TokenKind::Semicolon
            ) {
            let name = self.cursor.ident();
            self.advance();
            (None, name)
        } else {
            let base = self.parse_type();
            let ty = self.parse_type_suffixes(base);
            let name = match self.expect_identifier("foreach variable type") {
                Some(name) => Some(name),
                None => None,
            };
            (Some(ty), name)
        };

        Param {
            stc,
            udas: None,
            ty,
            name,
            default: None,
            span: start.merge(self.prev_span()),
        }
    }

    // --- Switch ---

    fn parse_switch_statement(&mut self, is_final: bool) -> StmtId {
        let start = self.span();
        self.advance(); // switch
        let open = self.span();
        self.expect(TokenKind::LeftParen);
        let cond = self.parse_expression();
        self.expect_closing(TokenKind::RightParen, TokenKind::LeftParen, open);
        let body = self.parse_statement(false);
        let span = start.merge(self.stmt_span(body));
        self.arena.alloc_stmt(Stmt::new(
            StmtKind::Switch {
                cond,
                body,
                is_final,
            },
            span,
        ))
    }

    /// `case a, b:` statements, and the range form `case a: .. case b:`.
    fn parse_case_statement(&mut self) -> StmtId {
        let start = self.span();
        self.advance(); // case

        let mut exprs = vec![self.parse_assign_expr()];
        while self.eat(TokenKind::Comma) {
            if self.check(TokenKind::Colon) {
                break;
            }
            exprs.push(self.parse_assign_expr());
        }
        self.expect(TokenKind::Colon);

        if self.check(TokenKind::DotDot) {
            self.advance();
            self.expect(TokenKind::Case);
            if exprs.len() > 1 {
                self.error(start, "only one `case` allowed for start of case range");
            }
            let last = self.parse_assign_expr();
            self.expect(TokenKind::Colon);
            let body = self.parse_case_body();
            let span = start.merge(self.prev_span());
            return self.arena.alloc_stmt(Stmt::new(
                StmtKind::CaseRange {
                    first: exprs[0],
                    last,
                    body,
                },
                span,
            ));
        }

        let body = self.parse_case_body();
        let span = start.merge(self.prev_span());
        let exprs = self.arena.alloc_expr_list(&exprs);
        self.arena
            .alloc_stmt(Stmt::new(StmtKind::Case { exprs, body }, span))
    }

    fn parse_default_statement(&mut self) -> StmtId {
        let start = self.span();
        self.advance(); // default
        self.expect(TokenKind::Colon);
        let body = self.parse_case_body();
        let span = start.merge(self.prev_span());
        self.arena
            .alloc_stmt(Stmt::new(StmtKind::DefaultCase { body }, span))
    }

    /// The statements following a case/default label, up to the next label
    /// or the end of the switch body.
    fn parse_case_body(&mut self) -> StmtId {
        let start = self.span();
        let mut stmts = Vec::new();
        while !matches!(
            self.kind(),
            TokenKind::Case | TokenKind::Default | TokenKind::RightCurly | TokenKind::Eof
        ) {
            stmts.push(self.parse_statement(true));
        }
        let span = start.merge(self.prev_span());
        let stmts = self.arena.alloc_stmt_list(&stmts);
        self.arena.alloc_stmt(Stmt::new(StmtKind::Block(stmts), span))
    }

    fn parse_goto_statement(&mut self) -> StmtId {
        let start = self.span();
        self.advance(); // goto

        let target = match self.kind() {
            TokenKind::Default => {
                self.advance();
                GotoTarget::Default
            }
            TokenKind::Case => {
                self.advance();
                let e = if self.check(TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.parse_expression())
                };
                GotoTarget::Case(e)
            }
            _ => match self.expect_identifier("`goto`") {
                Some(name) => GotoTarget::Label(name),
                None => {
                    self.resync();
                    return self.error_stmt(start);
                }
            },
        };
        self.expect_semicolon();
        let span = start.merge(self.prev_span());
        self.arena.alloc_stmt(Stmt::new(StmtKind::Goto(target), span))
    }

    // --- Exceptions and guards ---

    fn parse_try_statement(&mut self) -> StmtId {
        let start = self.span();
        self.advance(); // try
        let body = self.parse_statement(false);

        let mut catches = Vec::new();
        while self.check(TokenKind::Catch) {
            let catch_start = self.span();
            self.advance();
            let (ty, ident) = if self.check(TokenKind::LeftParen) {
                let open = self.span();
                self.advance();
                let ty = self.parse_type();
                let ident = self.opt_ident();
                self.expect_closing(TokenKind::RightParen, TokenKind::LeftParen, open);
                (ty, ident)
            } else {
                self.error_here("`catch` must specify `(Type [identifier])`");
                (self.error_type(catch_start), None)
            };
            let handler = self.parse_statement(false);
            catches.push(CatchClause {
                ty,
                ident,
                handler,
                span: catch_start.merge(self.prev_span()),
            });
        }

        let finally = if self.eat(TokenKind::Finally) {
            Some(self.parse_statement(false))
        } else {
            None
        };

        if catches.is_empty() && finally.is_none() {
            self.error(start, "`catch` or `finally` expected following `try`");
        }

        let span = start.merge(self.prev_span());
        let catches = self.arena.alloc_catches(catches);
        self.arena.alloc_stmt(Stmt::new(
            StmtKind::TryCatch {
                body,
                catches,
                finally,
            },
            span,
        ))
    }

    /// `scope(exit|failure|success) statement`
    fn parse_scope_guard(&mut self) -> StmtId {
        let start = self.span();
        self.advance(); // scope
        let open = self.span();
        self.advance(); // (

        let kind = match self.cursor.ident() {
            Some(name) if self.is_well_known(name, "exit") => Some(ScopeGuardKind::Exit),
            Some(name) if self.is_well_known(name, "failure") => Some(ScopeGuardKind::Failure),
            Some(name) if self.is_well_known(name, "success") => Some(ScopeGuardKind::Success),
            _ => None,
        };
        let Some(kind) = kind else {
            self.error_here("valid scope identifiers are `exit`, `failure`, or `success`");
            self.resync();
            return self.error_stmt(start);
        };
        self.advance();
        self.expect_closing(TokenKind::RightParen, TokenKind::LeftParen, open);

        let body = self.parse_statement(false);
        let span = start.merge(self.stmt_span(body));
        self.arena
            .alloc_stmt(Stmt::new(StmtKind::ScopeGuard { kind, body }, span))
    }

    // --- Asm ---

    /// `asm [attributes] { instructions }` — instructions are raw token
    /// runs separated by `;`, with nested braces tracked.
    fn parse_asm_statement(&mut self) -> StmtId {
        let start = self.span();
        self.advance(); // asm
        let stc = self.parse_postfix_attributes(None);

        let open = self.span();
        if !self.expect(TokenKind::LeftCurly) {
            return self.error_stmt(start);
        }

        let mut insts = Vec::new();
        let mut inst_start = self.cursor.position();
        let mut inst_span = self.span();
        let mut depth = 0usize;

        loop {
            match self.kind() {
                TokenKind::Eof => {
                    self.expect_closing(TokenKind::RightCurly, TokenKind::LeftCurly, open);
                    break;
                }
                TokenKind::LeftCurly => {
                    depth += 1;
                    self.advance();
                }
                TokenKind::RightCurly => {
                    if depth == 0 {
                        if self.cursor.position() > inst_start {
                            insts.push(AsmInst {
                                tokens_start: inst_start as u32,
                                tokens_end: self.cursor.position() as u32,
                                span: inst_span.merge(self.prev_span()),
                            });
                        }
                        self.advance();
                        break;
                    }
                    depth -= 1;
                    self.advance();
                }
                TokenKind::Semicolon if depth == 0 => {
                    insts.push(AsmInst {
                        tokens_start: inst_start as u32,
                        tokens_end: self.cursor.position() as u32,
                        span: inst_span.merge(self.span()),
                    });
                    self.advance();
                    inst_start = self.cursor.position();
                    inst_span = self.span();
                }
                _ => {
                    self.advance();
                }
            }
        }

        let span = start.merge(self.prev_span());
        let insts = self.arena.alloc_asm_insts(insts);
        self.arena
            .alloc_stmt(Stmt::new(StmtKind::Asm { stc, insts }, span))
    }

    // --- Conditional and static statements ---

    fn parse_conditional_statement(&mut self, kind: CondKind) -> StmtId {
        let start = self.span();
        self.advance(); // debug / version

        let arg = if self.check(TokenKind::LeftParen) {
            let open = self.span();
            self.advance();
            let arg = self.parse_cond_arg(kind);
            self.expect_closing(TokenKind::RightParen, TokenKind::LeftParen, open);
            arg
        } else {
            if kind == CondKind::Version {
                self.error_here("`(condition)` expected following `version`");
            }
            dray_ir::ast::CondArg::None
        };

        let saved = self.looking_for_else;
        self.looking_for_else = Some(start);
        let then_branch = self.parse_statement(false);
        self.looking_for_else = saved;

        let else_branch = if self.check(TokenKind::Else) {
            let else_span = self.span();
            self.check_dangling_else(else_span);
            self.advance();
            Some(self.parse_statement(false))
        } else {
            None
        };

        let span = start.merge(self.prev_span());
        self.arena.alloc_stmt(Stmt::new(
            StmtKind::Conditional {
                kind,
                arg,
                then_branch,
                else_branch,
            },
            span,
        ))
    }

    fn parse_static_if_statement(&mut self) -> StmtId {
        let start = self.span();
        self.advance(); // static
        self.advance(); // if
        let open = self.span();
        self.expect(TokenKind::LeftParen);
        let cond = self.parse_expression();
        self.expect_closing(TokenKind::RightParen, TokenKind::LeftParen, open);

        let saved = self.looking_for_else;
        self.looking_for_else = Some(start);
        let then_branch = self.parse_statement(false);
        self.looking_for_else = saved;

        let else_branch = if self.check(TokenKind::Else) {
            let else_span = self.span();
            self.check_dangling_else(else_span);
            self.advance();
            Some(self.parse_statement(false))
        } else {
            None
        };

        let span = start.merge(self.prev_span());
        self.arena.alloc_stmt(Stmt::new(
            StmtKind::StaticIf {
                cond,
                then_branch,
                else_branch,
            },
            span,
        ))
    }

    fn parse_static_assert_statement(&mut self) -> StmtId {
        let start = self.span();
        self.advance(); // assert
        let open = self.span();
        self.expect(TokenKind::LeftParen);
        let cond = self.parse_assign_expr();
        let msg = if self.eat(TokenKind::Comma) {
            if self.check(TokenKind::RightParen) {
                None
            } else {
                Some(self.parse_assign_expr())
            }
        } else {
            None
        };
        self.expect_closing(TokenKind::RightParen, TokenKind::LeftParen, open);
        self.expect_semicolon();
        let span = start.merge(self.prev_span());
        self.arena
            .alloc_stmt(Stmt::new(StmtKind::StaticAssert { cond, msg }, span))
    }

    fn parse_import_statement(&mut self, is_static: bool) -> StmtId {
        let start = self.span();
        let mut decls = Vec::new();
        self.parse_import(is_static, &mut decls);
        let span = start.merge(self.prev_span());
        match decls.len() {
            1 => self
                .arena
                .alloc_stmt(Stmt::new(StmtKind::DeclStmt(decls[0]), span)),
            _ => {
                let stmts: Vec<StmtId> = decls
                    .into_iter()
                    .map(|d| {
                        let d_span = self.arena.decl(d).span;
                        self.arena
                            .alloc_stmt(Stmt::new(StmtKind::DeclStmt(d), d_span))
                    })
                    .collect();
                let stmts = self.arena.alloc_stmt_list(&stmts);
                self.arena.alloc_stmt(Stmt::new(StmtKind::Block(stmts), span))
            }
        }
    }

    fn parse_pragma_statement(&mut self) -> StmtId {
        let start = self.span();
        self.advance(); // pragma
        let open = self.span();
        self.expect(TokenKind::LeftParen);
        let name = self
            .expect_identifier("`pragma(`")
            .unwrap_or_default();
        let args = if self.eat(TokenKind::Comma) {
            self.parse_argument_list(TokenKind::RightParen)
        } else {
            dray_ir::ast::ExprRange::EMPTY
        };
        self.expect_closing(TokenKind::RightParen, TokenKind::LeftParen, open);

        let body = if self.eat(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_statement(false))
        };

        let span = start.merge(self.prev_span());
        self.arena
            .alloc_stmt(Stmt::new(StmtKind::Pragma { name, args, body }, span))
    }
}
