//! Postfix expression suffixes: member access, template instances after
//! `.`, calls, indexing, slicing, increments, and `new` expressions.

use crate::Parser;
use dray_ir::ast::{Expr, ExprId, ExprKind, Type, TypeKind};
use dray_ir::{Span, TokenKind};

impl Parser<'_> {
    /// Primary expression followed by its suffix chain.
    pub(crate) fn parse_postfix_expr(&mut self) -> ExprId {
        let e = self.parse_primary_expr();
        self.parse_postfix_suffixes(e)
    }

    /// Apply postfix suffixes to `e`.
    pub(crate) fn parse_postfix_suffixes(&mut self, mut e: ExprId) -> ExprId {
        loop {
            match self.kind() {
                TokenKind::Dot => {
                    self.advance();
                    match self.kind() {
                        TokenKind::Identifier => {
                            let name = self.cursor.ident().unwrap_or_default();
                            self.advance();
                            if self.check(TokenKind::Not) && !self.bang_is_comparison() {
                                let tiargs = self.parse_template_args();
                                let span = self.expr_span(e).merge(self.prev_span());
                                e = self.arena.alloc_expr(Expr::new(
                                    ExprKind::DotTemplateInstance {
                                        lhs: e,
                                        name,
                                        tiargs,
                                    },
                                    span,
                                ));
                            } else {
                                let span = self.expr_span(e).merge(self.prev_span());
                                e = self.arena.alloc_expr(Expr::new(
                                    ExprKind::DotIdent { lhs: Some(e), name },
                                    span,
                                ));
                            }
                        }
                        TokenKind::New => {
                            let start = self.expr_span(e);
                            e = self.parse_new_expr(Some(e), start);
                        }
                        _ => {
                            self.error_here(format!(
                                "identifier or `new` expected following `.`, not `{}`",
                                self.kind().display_name()
                            ));
                            return e;
                        }
                    }
                }
                TokenKind::PlusPlus => {
                    let span = self.expr_span(e).merge(self.span());
                    self.advance();
                    e = self.arena.alloc_expr(Expr::new(ExprKind::PostInc(e), span));
                }
                TokenKind::MinusMinus => {
                    let span = self.expr_span(e).merge(self.span());
                    self.advance();
                    e = self.arena.alloc_expr(Expr::new(ExprKind::PostDec(e), span));
                }
                TokenKind::LeftParen => {
                    let open = self.span();
                    self.advance();
                    let args = self.parse_argument_list(TokenKind::RightParen);
                    self.expect_closing(TokenKind::RightParen, TokenKind::LeftParen, open);
                    let span = self.expr_span(e).merge(self.prev_span());
                    e = self
                        .arena
                        .alloc_expr(Expr::new(ExprKind::Call { callee: e, args }, span));
                }
                TokenKind::LeftBracket => {
                    e = self.parse_index_or_slice(e);
                }
                _ => return e,
            }
        }
    }

    /// `e[]`, `e[l..u]`, `e[a, b]` (arguments may be intervals).
    fn parse_index_or_slice(&mut self, base: ExprId) -> ExprId {
        let open = self.span();
        self.advance(); // [
        self.in_brackets += 1;

        let result = if self.check(TokenKind::RightBracket) {
            ExprKind::Slice {
                base,
                lower: None,
                upper: None,
            }
        } else {
            let first = self.parse_assign_expr();
            if self.eat(TokenKind::DotDot) {
                let upper = self.parse_assign_expr();
                ExprKind::Slice {
                    base,
                    lower: Some(first),
                    upper: Some(upper),
                }
            } else {
                let mut args = vec![first];
                while self.eat(TokenKind::Comma) {
                    if self.check(TokenKind::RightBracket) {
                        break;
                    }
                    let arg = self.parse_assign_expr();
                    let arg = if self.eat(TokenKind::DotDot) {
                        let upper = self.parse_assign_expr();
                        let span = self.expr_span(arg).merge(self.expr_span(upper));
                        self.arena.alloc_expr(Expr::new(
                            ExprKind::Interval {
                                lower: arg,
                                upper,
                            },
                            span,
                        ))
                    } else {
                        arg
                    };
                    args.push(arg);
                }
                let args = self.arena.alloc_expr_list(&args);
                ExprKind::Index { base, args }
            }
        };

        self.in_brackets -= 1;
        self.expect_closing(TokenKind::RightBracket, TokenKind::LeftBracket, open);
        let span = self.expr_span(base).merge(self.prev_span());
        self.arena.alloc_expr(Expr::new(result, span))
    }

    /// `new Type`, `new Type(args)`, `new Type[dim]`, and the anonymous
    /// class form `new class (args) Bases { members }`. `this_expr` is the
    /// placement of a `e.new` chain.
    pub(crate) fn parse_new_expr(&mut self, this_expr: Option<ExprId>, start: Span) -> ExprId {
        self.advance(); // new

        if self.check(TokenKind::Class) {
            return self.parse_new_anon_class(start);
        }

        let ty = self.parse_basic_type();
        let ty = self.parse_new_type_suffixes(ty);

        let args = if self.check(TokenKind::LeftParen) {
            let open = self.span();
            self.advance();
            let args = self.parse_argument_list(TokenKind::RightParen);
            self.expect_closing(TokenKind::RightParen, TokenKind::LeftParen, open);
            args
        } else {
            dray_ir::ast::ExprRange::EMPTY
        };

        let span = start.merge(self.prev_span());
        self.arena.alloc_expr(Expr::new(
            ExprKind::New {
                this_expr,
                ty,
                args,
            },
            span,
        ))
    }

    /// Type suffixes valid after `new`: pointers and array forms. The
    /// final `[dim]` allocates an array of that length.
    fn parse_new_type_suffixes(&mut self, mut ty: dray_ir::ast::TypeId) -> dray_ir::ast::TypeId {
        loop {
            match self.kind() {
                TokenKind::Mul => {
                    let span = self.type_span(ty).merge(self.span());
                    self.advance();
                    ty = self.arena.alloc_type(Type::new(TypeKind::Pointer(ty), span));
                }
                TokenKind::LeftBracket => {
                    let open = self.span();
                    self.advance();
                    self.in_brackets += 1;
                    let kind = if self.check(TokenKind::RightBracket) {
                        TypeKind::DArray(ty)
                    } else {
                        let dim = self.parse_assign_expr();
                        TypeKind::SArray { elem: ty, dim }
                    };
                    self.in_brackets -= 1;
                    self.expect_closing(TokenKind::RightBracket, TokenKind::LeftBracket, open);
                    let span = self.type_span(ty).merge(self.prev_span());
                    ty = self.arena.alloc_type(Type::new(kind, span));
                }
                _ => return ty,
            }
        }
    }

    /// `new class (args) BaseList { members }`
    fn parse_new_anon_class(&mut self, start: Span) -> ExprId {
        self.advance(); // class

        let args = if self.check(TokenKind::LeftParen) {
            let open = self.span();
            self.advance();
            let args = self.parse_argument_list(TokenKind::RightParen);
            self.expect_closing(TokenKind::RightParen, TokenKind::LeftParen, open);
            args
        } else {
            dray_ir::ast::ExprRange::EMPTY
        };

        let mut bases = Vec::new();
        while !self.check(TokenKind::LeftCurly) && !self.is_at_end() {
            bases.push(self.parse_basic_type());
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        let bases = self.arena.alloc_type_list(&bases);

        let members = if self.check(TokenKind::LeftCurly) {
            let open = self.span();
            self.advance();
            let decls = self.parse_decl_defs_until(TokenKind::RightCurly);
            self.expect_closing(TokenKind::RightCurly, TokenKind::LeftCurly, open);
            self.arena.alloc_decl_list(&decls)
        } else {
            self.error_here("`{` expected for anonymous class body");
            dray_ir::ast::DeclRange::EMPTY
        };

        let span = start.merge(self.prev_span());
        self.arena.alloc_expr(Expr::new(
            ExprKind::NewAnonClass {
                args,
                bases,
                members,
            },
            span,
        ))
    }
}
