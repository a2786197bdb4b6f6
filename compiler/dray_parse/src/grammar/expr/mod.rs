//! Expression parsing.
//!
//! The precedence cascade from comma expressions down to unary operators.
//! `primary` holds the leaf grammar, `postfix` the suffix chain.
//!
//! Two deliberate precedence quirks of the language surface here:
//! equality and relational operators share one level (mixing them, or
//! nesting them under `& | ^`, warns without parentheses), and `^^` is
//! right-associative binding tighter than prefix operators, so `-a^^b`
//! parses as `-(a^^b)`.

mod postfix;
mod primary;

use crate::precedence::{self, Prec};
use crate::probes::{self, NeedDeclaratorId};
use crate::Parser;
use dray_ir::ast::{AssignOp, BinOp, Expr, ExprId, ExprKind, UnaryOp};
use dray_ir::{ModFlags, Span, TokenKind};

impl Parser<'_> {
    /// Parse a full expression, including comma expressions.
    pub(crate) fn parse_expression(&mut self) -> ExprId {
        let mut e = self.parse_assign_expr();
        while self.check(TokenKind::Comma) {
            self.advance();
            let rhs = self.parse_assign_expr();
            let span = self.expr_span(e).merge(self.expr_span(rhs));
            e = self
                .arena
                .alloc_expr(Expr::new(ExprKind::Comma { lhs: e, rhs }, span));
        }
        e
    }

    /// Assignment expression (right-associative).
    pub(crate) fn parse_assign_expr(&mut self) -> ExprId {
        let e = self.parse_cond_expr();

        let Some(op) = assign_op_of(self.kind()) else {
            return e;
        };

        // `t ? a = 1 : b = 2` reads ambiguously; require parens around the
        // conditional before assigning to it.
        let node = self.arena.expr(e);
        if matches!(node.kind, ExprKind::Cond { .. }) && !node.parens {
            let span = node.span;
            self.deprecation(
                span,
                "`?:` must be surrounded by parentheses when next to operator `=`",
            );
        }

        self.advance();
        let rhs = self.parse_assign_expr();
        let span = self.expr_span(e).merge(self.expr_span(rhs));
        self.arena
            .alloc_expr(Expr::new(ExprKind::Assign { op, lhs: e, rhs }, span))
    }

    /// Conditional `?:` expression.
    fn parse_cond_expr(&mut self) -> ExprId {
        let cond = self.parse_oror_expr();
        if !self.check(TokenKind::Question) {
            return cond;
        }
        self.advance();
        let then_expr = self.parse_expression();
        self.expect(TokenKind::Colon);
        let else_expr = self.parse_cond_expr();
        let span = self.expr_span(cond).merge(self.expr_span(else_expr));
        self.arena.alloc_expr(Expr::new(
            ExprKind::Cond {
                cond,
                then_expr,
                else_expr,
            },
            span,
        ))
    }

    fn parse_oror_expr(&mut self) -> ExprId {
        let mut e = self.parse_andand_expr();
        while self.check(TokenKind::OrOr) {
            self.advance();
            let rhs = self.parse_andand_expr();
            e = self.binary(BinOp::OrOr, e, rhs);
        }
        e
    }

    fn parse_andand_expr(&mut self) -> ExprId {
        let mut e = self.parse_or_expr();
        while self.check(TokenKind::AndAnd) {
            self.advance();
            let rhs = self.parse_or_expr();
            e = self.binary(BinOp::AndAnd, e, rhs);
        }
        e
    }

    fn parse_or_expr(&mut self) -> ExprId {
        let mut e = self.parse_xor_expr();
        while self.check(TokenKind::Or) {
            self.check_parens("|", e);
            self.advance();
            let rhs = self.parse_xor_expr();
            self.check_parens("|", rhs);
            e = self.binary(BinOp::Or, e, rhs);
        }
        e
    }

    fn parse_xor_expr(&mut self) -> ExprId {
        let mut e = self.parse_and_expr();
        while self.check(TokenKind::Xor) {
            self.check_parens("^", e);
            self.advance();
            let rhs = self.parse_and_expr();
            self.check_parens("^", rhs);
            e = self.binary(BinOp::Xor, e, rhs);
        }
        e
    }

    fn parse_and_expr(&mut self) -> ExprId {
        let mut e = self.parse_cmp_expr();
        while self.check(TokenKind::And) {
            self.check_parens("&", e);
            self.advance();
            let rhs = self.parse_cmp_expr();
            self.check_parens("&", rhs);
            e = self.binary(BinOp::And, e, rhs);
        }
        e
    }

    /// Warn when a comparison sits unparenthesised under `& | ^`.
    fn check_parens(&mut self, op: &str, e: ExprId) {
        let node = self.arena.expr(e);
        if precedence::of_expr(&node.kind) == Prec::Compare && !node.parens {
            let span = node.span;
            self.warning(
                span,
                format!("comparison must be surrounded by parentheses when next to operator `{op}`"),
            );
        }
    }

    /// The single comparison level: equality, identity, `in`, relational.
    fn parse_cmp_expr(&mut self) -> ExprId {
        let mut e = self.parse_shift_expr();
        loop {
            let (op, tokens) = match self.kind() {
                TokenKind::Equal => (BinOp::Equal, 1),
                TokenKind::NotEqual => (BinOp::NotEqual, 1),
                TokenKind::Is => (BinOp::Identity, 1),
                TokenKind::In => (BinOp::In, 1),
                TokenKind::Not if self.peek_kind(1) == TokenKind::Is => (BinOp::NotIdentity, 2),
                TokenKind::Not if self.peek_kind(1) == TokenKind::In => (BinOp::NotIn, 2),
                _ => break,
            };

            // `a < b == c` and friends chain at one level; parse
            // left-to-right but tell the user to parenthesise.
            {
                let node = self.arena.expr(e);
                if precedence::of_expr(&node.kind) == Prec::Compare && !node.parens {
                    let span = node.span;
                    self.warning(
                        span,
                        format!(
                            "`{}` has the same precedence as the preceding comparison; \
                             add parentheses to clarify",
                            op.display_name()
                        ),
                    );
                }
            }

            for _ in 0..tokens {
                self.advance();
            }
            let rhs = self.parse_shift_expr();
            e = self.binary(op, e, rhs);
        }
        e
    }

    fn parse_shift_expr(&mut self) -> ExprId {
        let mut e = self.parse_add_expr();
        loop {
            let op = match self.kind() {
                TokenKind::LeftShift => BinOp::Shl,
                TokenKind::RightShift => BinOp::Shr,
                TokenKind::UnsignedRightShift => BinOp::Ushr,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_add_expr();
            e = self.binary(op, e, rhs);
        }
        e
    }

    fn parse_add_expr(&mut self) -> ExprId {
        let mut e = self.parse_mul_expr();
        loop {
            let op = match self.kind() {
                TokenKind::Add => BinOp::Add,
                TokenKind::Min => BinOp::Sub,
                TokenKind::Tilde => BinOp::Concat,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_mul_expr();
            e = self.binary(op, e, rhs);
        }
        e
    }

    fn parse_mul_expr(&mut self) -> ExprId {
        let mut e = self.parse_pow_expr();
        loop {
            let op = match self.kind() {
                TokenKind::Mul => BinOp::Mul,
                TokenKind::Div => BinOp::Div,
                TokenKind::Mod => BinOp::Mod,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_pow_expr();
            e = self.binary(op, e, rhs);
        }
        e
    }

    /// `^^` is right-associative.
    fn parse_pow_expr(&mut self) -> ExprId {
        let e = self.parse_unary_expr();
        if self.check(TokenKind::Pow) {
            self.advance();
            let rhs = self.parse_pow_expr();
            return self.binary(BinOp::Pow, e, rhs);
        }
        e
    }

    /// Unary operators, casts, `new`, and the C-style-cast disambiguation
    /// for parenthesised type prefixes.
    pub(crate) fn parse_unary_expr(&mut self) -> ExprId {
        let start = self.span();
        let op = match self.kind() {
            TokenKind::And => Some(UnaryOp::AddrOf),
            TokenKind::PlusPlus => Some(UnaryOp::PreInc),
            TokenKind::MinusMinus => Some(UnaryOp::PreDec),
            TokenKind::Mul => Some(UnaryOp::Deref),
            TokenKind::Min => Some(UnaryOp::Neg),
            TokenKind::Add => Some(UnaryOp::UnaryAdd),
            TokenKind::Not => Some(UnaryOp::Not),
            TokenKind::Tilde => Some(UnaryOp::Com),
            _ => None,
        };

        if let Some(op) = op {
            self.advance();
            let mut operand = self.parse_unary_expr();
            // ^^ binds tighter than the pending prefix operator
            if self.check(TokenKind::Pow) {
                self.advance();
                let rhs = self.parse_pow_expr();
                operand = self.binary(BinOp::Pow, operand, rhs);
            }
            let span = start.merge(self.expr_span(operand));
            return self
                .arena
                .alloc_expr(Expr::new(ExprKind::Unary { op, operand }, span));
        }

        match self.kind() {
            TokenKind::Cast => self.parse_cast_expr(),
            TokenKind::New => self.parse_new_expr(None, start),
            TokenKind::LeftParen => self.parse_paren_or_c_cast(),
            _ => self.parse_postfix_expr(),
        }
    }

    /// `cast(Type)e`, the qualifier-only `cast(const)e`, and `cast()e`.
    fn parse_cast_expr(&mut self) -> ExprId {
        let start = self.span();
        self.advance(); // cast
        let open = self.span();
        self.expect(TokenKind::LeftParen);

        let mut mods = ModFlags::NONE;
        let mut to = None;

        // qualifier-only form: every token up to `)` is a qualifier keyword
        loop {
            let m = match self.kind() {
                TokenKind::Const => ModFlags::CONST,
                TokenKind::Immutable => ModFlags::IMMUTABLE,
                TokenKind::Shared => ModFlags::SHARED,
                TokenKind::Inout => ModFlags::WILD,
                _ => break,
            };
            // `cast(const(T))` and `cast(const T)` carry a full type
            if self.peek_kind(1) == TokenKind::LeftParen {
                break;
            }
            let next = self.peek_kind(1);
            if !(next == TokenKind::RightParen || next.is_type_ctor()) {
                break;
            }
            self.advance();
            mods = mods.with(m);
        }

        if !self.check(TokenKind::RightParen) {
            to = Some(self.parse_type());
        }
        self.expect_closing(TokenKind::RightParen, TokenKind::LeftParen, open);

        let operand = self.parse_unary_expr();
        let span = start.merge(self.expr_span(operand));
        self.arena
            .alloc_expr(Expr::new(ExprKind::Cast { to, mods, operand }, span))
    }

    /// At `(`: disambiguate `(Type).member`, the illegal C-style cast
    /// `(Type)expr`, and the ordinary parenthesised expression.
    fn parse_paren_or_c_cast(&mut self) -> ExprId {
        let start = self.span();
        let tokens = self.cursor.tokens();
        let pos = self.cursor.position();

        if let Some(close) = probes::is_declaration(
            tokens,
            pos + 1,
            NeedDeclaratorId::No,
            Some(TokenKind::RightParen),
        ) {
            let after = tokens.kind(close + 1);
            if after == TokenKind::Dot {
                // (Type).identifier
                self.advance(); // (
                let ty = self.parse_type();
                self.expect(TokenKind::RightParen);
                self.advance(); // .
                let name = self
                    .expect_identifier("`(Type).`")
                    .unwrap_or_default();
                let span = start.merge(self.prev_span());
                let e = self
                    .arena
                    .alloc_expr(Expr::new(ExprKind::TypeDotId { ty, name }, span));
                return self.parse_postfix_suffixes(e);
            }
            if token_starts_expression(after) {
                self.error(
                    start,
                    "C style cast illegal, use `cast(Type)Expression`",
                );
                self.advance(); // (
                let ty = self.parse_type();
                self.expect(TokenKind::RightParen);
                let operand = self.parse_unary_expr();
                let span = start.merge(self.expr_span(operand));
                return self.arena.alloc_expr(Expr::new(
                    ExprKind::Cast {
                        to: Some(ty),
                        mods: ModFlags::NONE,
                        operand,
                    },
                    span,
                ));
            }
        }

        self.parse_postfix_expr()
    }

    pub(crate) fn binary(&mut self, op: BinOp, lhs: ExprId, rhs: ExprId) -> ExprId {
        let span = self.expr_span(lhs).merge(self.expr_span(rhs));
        self.arena
            .alloc_expr(Expr::new(ExprKind::Binary { op, lhs, rhs }, span))
    }

    /// Comma-separated assign expressions up to (not consuming) `close`.
    /// Trailing commas are allowed.
    pub(crate) fn parse_argument_list(&mut self, close: TokenKind) -> dray_ir::ast::ExprRange {
        let mut args = Vec::new();
        while !self.check(close) && !self.is_at_end() {
            args.push(self.parse_assign_expr());
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.arena.alloc_expr_list(&args)
    }

    /// Mark an expression as parenthesised.
    pub(crate) fn mark_parens(&mut self, e: ExprId, span: Span) {
        let node = self.arena.expr_mut(e);
        node.parens = true;
        node.span = span;
    }
}

fn assign_op_of(kind: TokenKind) -> Option<AssignOp> {
    Some(match kind {
        TokenKind::Assign => AssignOp::Assign,
        TokenKind::AddAssign => AssignOp::Add,
        TokenKind::MinAssign => AssignOp::Sub,
        TokenKind::MulAssign => AssignOp::Mul,
        TokenKind::DivAssign => AssignOp::Div,
        TokenKind::ModAssign => AssignOp::Mod,
        TokenKind::AndAssign => AssignOp::And,
        TokenKind::OrAssign => AssignOp::Or,
        TokenKind::XorAssign => AssignOp::Xor,
        TokenKind::LeftShiftAssign => AssignOp::Shl,
        TokenKind::RightShiftAssign => AssignOp::Shr,
        TokenKind::UnsignedRightShiftAssign => AssignOp::Ushr,
        TokenKind::ConcatAssign => AssignOp::Concat,
        TokenKind::PowAssign => AssignOp::Pow,
        _ => return None,
    })
}

/// Can `kind` start an expression? Consulted by the C-style-cast check.
pub(crate) fn token_starts_expression(kind: TokenKind) -> bool {
    kind.is_basic_type()
        || kind.is_special_literal()
        || matches!(
            kind,
            TokenKind::Identifier
                | TokenKind::IntLiteral
                | TokenKind::FloatLiteral
                | TokenKind::StringLiteral
                | TokenKind::CharLiteral
                | TokenKind::This
                | TokenKind::Super
                | TokenKind::Null
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Dollar
                | TokenKind::LeftParen
                | TokenKind::LeftBracket
                | TokenKind::LeftCurly
                | TokenKind::And
                | TokenKind::Mul
                | TokenKind::Min
                | TokenKind::Add
                | TokenKind::Not
                | TokenKind::Tilde
                | TokenKind::PlusPlus
                | TokenKind::MinusMinus
                | TokenKind::Cast
                | TokenKind::New
                | TokenKind::Typeof
                | TokenKind::Typeid
                | TokenKind::Assert
                | TokenKind::Mixin
                | TokenKind::Import
                | TokenKind::Is
                | TokenKind::Traits
                | TokenKind::Function
                | TokenKind::Delegate
        )
}
