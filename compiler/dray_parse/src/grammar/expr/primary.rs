//! Primary expressions: literals, identifiers, specials, `is(...)`,
//! `__traits`, lambdas, and the literal collection forms.

use crate::Parser;
use dray_ir::ast::{
    Expr, ExprId, ExprKind, FuncLiteralBody, FuncLiteralKind, IsCmp, IsSpec, IsSpecKw, SpecialKw,
    TemplateParam, TemplateParamRange, VarArg,
};
use dray_ir::{Span, StorageClass, TokenKind, TokenValue};

impl Parser<'_> {
    /// Parse a primary expression (no postfix suffixes).
    pub(crate) fn parse_primary_expr(&mut self) -> ExprId {
        let start = self.span();
        let kind = self.kind();

        if kind.is_basic_type() {
            return self.parse_basic_type_primary();
        }
        if let Some(special) = special_of(kind) {
            self.advance();
            return self
                .arena
                .alloc_expr(Expr::new(ExprKind::Special(special), start));
        }

        match kind {
            TokenKind::Identifier => {
                if self.peek_kind(1) == TokenKind::GoesTo {
                    return self.parse_lambda_from_ident();
                }
                let name = self.cursor.ident().unwrap_or_default();
                self.advance();
                if self.check(TokenKind::Not) && !self.bang_is_comparison() {
                    let tiargs = self.parse_template_args();
                    let span = start.merge(self.prev_span());
                    self.arena
                        .alloc_expr(Expr::new(ExprKind::TemplateInstance { name, tiargs }, span))
                } else {
                    self.arena
                        .alloc_expr(Expr::new(ExprKind::Ident(name), start))
                }
            }
            TokenKind::Dot => {
                // module-scope access `.id`
                self.advance();
                let name = self.expect_identifier("`.`").unwrap_or_default();
                let span = start.merge(self.prev_span());
                self.arena
                    .alloc_expr(Expr::new(ExprKind::DotIdent { lhs: None, name }, span))
            }
            TokenKind::This => {
                self.advance();
                self.arena.alloc_expr(Expr::new(ExprKind::This, start))
            }
            TokenKind::Super => {
                self.advance();
                self.arena.alloc_expr(Expr::new(ExprKind::Super, start))
            }
            TokenKind::Null => {
                self.advance();
                self.arena.alloc_expr(Expr::new(ExprKind::Null, start))
            }
            TokenKind::True | TokenKind::False => {
                let value = kind == TokenKind::True;
                self.advance();
                self.arena
                    .alloc_expr(Expr::new(ExprKind::Bool(value), start))
            }
            TokenKind::Dollar => {
                self.advance();
                self.arena.alloc_expr(Expr::new(ExprKind::Dollar, start))
            }
            TokenKind::IntLiteral => {
                let (value, suffix) = self.cursor.current().int_value().unwrap_or_default();
                self.advance();
                self.arena
                    .alloc_expr(Expr::new(ExprKind::Int { value, suffix }, start))
            }
            TokenKind::FloatLiteral => {
                let (bits, suffix) = self
                    .cursor
                    .current()
                    .float_value()
                    .unwrap_or((0, dray_ir::FloatSuffix::None));
                self.advance();
                self.arena
                    .alloc_expr(Expr::new(ExprKind::Float { bits, suffix }, start))
            }
            TokenKind::CharLiteral => {
                let c = match self.cursor.current().value {
                    TokenValue::Char(c) => c,
                    _ => '\0',
                };
                self.advance();
                self.arena
                    .alloc_expr(Expr::new(ExprKind::CharLit(c), start))
            }
            TokenKind::StringLiteral => self.parse_string_literal(),
            TokenKind::Typeof | TokenKind::Vector => {
                let ty = self.parse_basic_type();
                let span = start.merge(self.prev_span());
                self.arena
                    .alloc_expr(Expr::new(ExprKind::TypeExpr(ty), span))
            }
            TokenKind::Traits => {
                let (name, args) = self.parse_traits_parts();
                let span = start.merge(self.prev_span());
                self.arena
                    .alloc_expr(Expr::new(ExprKind::TraitsExpr { name, args }, span))
            }
            TokenKind::Typeid => {
                self.advance();
                let open = self.span();
                self.expect(TokenKind::LeftParen);
                let arg = self.parse_template_arg();
                self.expect_closing(TokenKind::RightParen, TokenKind::LeftParen, open);
                let span = start.merge(self.prev_span());
                self.arena
                    .alloc_expr(Expr::new(ExprKind::Typeid(arg), span))
            }
            TokenKind::Is => self.parse_is_expr(),
            TokenKind::Assert => {
                self.advance();
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
                let span = start.merge(self.prev_span());
                self.arena
                    .alloc_expr(Expr::new(ExprKind::Assert { cond, msg }, span))
            }
            TokenKind::Mixin => {
                self.advance();
                let open = self.span();
                self.expect(TokenKind::LeftParen);
                let args = self.parse_argument_list(TokenKind::RightParen);
                self.expect_closing(TokenKind::RightParen, TokenKind::LeftParen, open);
                let span = start.merge(self.prev_span());
                self.arena
                    .alloc_expr(Expr::new(ExprKind::Mixin(args), span))
            }
            TokenKind::Import => {
                self.advance();
                let open = self.span();
                self.expect(TokenKind::LeftParen);
                let e = self.parse_assign_expr();
                self.expect_closing(TokenKind::RightParen, TokenKind::LeftParen, open);
                let span = start.merge(self.prev_span());
                self.arena
                    .alloc_expr(Expr::new(ExprKind::ImportExpr(e), span))
            }
            TokenKind::LeftParen => {
                // lambda `(params) => e` / `(params) { }`, else paren expr
                if self.paren_starts_function_literal() {
                    return self.parse_function_literal();
                }
                self.advance();
                let e = self.parse_expression();
                self.expect_closing(TokenKind::RightParen, TokenKind::LeftParen, start);
                let span = start.merge(self.prev_span());
                self.mark_parens(e, span);
                e
            }
            TokenKind::LeftBracket => self.parse_array_literal(),
            TokenKind::LeftCurly | TokenKind::Function | TokenKind::Delegate => {
                self.parse_function_literal()
            }
            TokenKind::Ref if self.peek_kind(1) == TokenKind::LeftParen => {
                self.parse_function_literal()
            }
            _ => {
                self.error_here(format!(
                    "expression expected, not `{}`",
                    kind.display_name()
                ));
                // make progress so callers cannot loop
                if !self.is_at_end()
                    && !matches!(
                        kind,
                        TokenKind::RightParen
                            | TokenKind::RightBracket
                            | TokenKind::RightCurly
                            | TokenKind::Semicolon
                            | TokenKind::Comma
                    )
                {
                    self.advance();
                }
                self.error_expr(start)
            }
        }
    }

    /// Basic type keyword in expression position: `int.max` or `int(3)`.
    fn parse_basic_type_primary(&mut self) -> ExprId {
        let start = self.span();
        let ty = self.parse_basic_type();

        if self.eat(TokenKind::Dot) {
            let name = self
                .expect_identifier("type property access")
                .unwrap_or_default();
            let span = start.merge(self.prev_span());
            return self
                .arena
                .alloc_expr(Expr::new(ExprKind::TypeDotId { ty, name }, span));
        }
        if self.check(TokenKind::LeftParen) {
            let open = self.span();
            self.advance();
            let args = self.parse_argument_list(TokenKind::RightParen);
            self.expect_closing(TokenKind::RightParen, TokenKind::LeftParen, open);
            let span = start.merge(self.prev_span());
            return self
                .arena
                .alloc_expr(Expr::new(ExprKind::CtorCall { ty, args }, span));
        }
        self.error_here("expected `.` property or `(` arguments following type");
        self.error_expr(start)
    }

    /// String literal, folding adjacent literals with a deprecation.
    fn parse_string_literal(&mut self) -> ExprId {
        let start = self.span();
        let (mut name, mut postfix) = self
            .cursor
            .current()
            .string_value()
            .unwrap_or((dray_ir::Name::EMPTY, 0));
        self.advance();

        while self.check(TokenKind::StringLiteral) {
            let span = self.span();
            let (next_name, next_postfix) = self
                .cursor
                .current()
                .string_value()
                .unwrap_or((dray_ir::Name::EMPTY, 0));
            self.advance();
            self.deprecation(
                span,
                "implicit string concatenation is deprecated, use `~` instead",
            );
            if next_postfix != postfix {
                self.error(span, "mismatched string literal postfixes");
            }
            let combined = format!("{}{}", self.lookup(name), self.lookup(next_name));
            name = self.interner.intern(&combined);
            if postfix == 0 {
                postfix = next_postfix;
            }
        }

        let span = start.merge(self.prev_span());
        self.arena
            .alloc_expr(Expr::new(ExprKind::String { name, postfix }, span))
    }

    /// `[a, b]` array literal or `[k: v, ...]` associative literal.
    fn parse_array_literal(&mut self) -> ExprId {
        let open = self.span();
        self.advance(); // [
        self.in_brackets += 1;

        let mut keys = Vec::new();
        let mut values = Vec::new();
        let mut is_assoc = false;
        let mut first = true;

        while !self.check(TokenKind::RightBracket) && !self.is_at_end() {
            let e = self.parse_assign_expr();
            if first && self.check(TokenKind::Colon) {
                is_assoc = true;
            }
            first = false;
            if is_assoc {
                self.expect(TokenKind::Colon);
                let value = self.parse_assign_expr();
                keys.push(e);
                values.push(value);
            } else {
                values.push(e);
            }
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }

        self.in_brackets -= 1;
        self.expect_closing(TokenKind::RightBracket, TokenKind::LeftBracket, open);
        let span = open.merge(self.prev_span());

        let kind = if is_assoc {
            let keys = self.arena.alloc_expr_list(&keys);
            let values = self.arena.alloc_expr_list(&values);
            ExprKind::AssocArrayLiteral { keys, values }
        } else {
            ExprKind::ArrayLiteral(self.arena.alloc_expr_list(&values))
        };
        self.arena.alloc_expr(Expr::new(kind, span))
    }

    /// Does the `(` at the cursor open a function literal?
    fn paren_starts_function_literal(&mut self) -> bool {
        let tokens = self.cursor.tokens();
        match crate::probes::is_parameters(tokens, self.cursor.position()) {
            Some(past) => {
                let mut pos = past;
                // allow postfix attributes between `)` and the body
                if let Some(after) = crate::probes::skip_attributes(tokens, pos) {
                    pos = after;
                }
                matches!(
                    tokens.kind(pos),
                    TokenKind::GoesTo | TokenKind::LeftCurly
                )
            }
            None => false,
        }
    }

    /// `x => e`
    fn parse_lambda_from_ident(&mut self) -> ExprId {
        let start = self.span();
        let name = self.cursor.ident().unwrap_or_default();
        self.advance(); // identifier

        let (params, tparams) = self.implicit_lambda_param(name, start);
        self.expect(TokenKind::GoesTo);
        let body = self.parse_assign_expr();
        let span = start.merge(self.expr_span(body));
        self.arena.alloc_expr(Expr::new(
            ExprKind::FuncLiteral {
                kind: FuncLiteralKind::Lambda,
                is_ref: false,
                has_params: true,
                tparams,
                params,
                varargs: VarArg::None,
                ret: None,
                stc: StorageClass::NONE,
                body: FuncLiteralBody::Expr(body),
            },
            span,
        ))
    }

    /// A single untyped lambda parameter with its synthesized template
    /// type parameter.
    fn implicit_lambda_param(
        &mut self,
        name: dray_ir::Name,
        span: Span,
    ) -> (dray_ir::ast::ParamRange, TemplateParamRange) {
        let (ty, tparam) = self.synthesize_lambda_type(span);
        let param = dray_ir::ast::Param {
            stc: StorageClass::NONE,
            udas: None,
            ty: Some(ty),
            name: Some(name),
            default: None,
            span,
        };
        let params = self.arena.alloc_params(vec![param]);
        let tparams = self.arena.alloc_tparams(vec![tparam]);
        (params, tparams)
    }

    /// Generate the implicit template type parameter an untyped lambda
    /// parameter infers through.
    pub(crate) fn synthesize_lambda_type(
        &mut self,
        span: Span,
    ) -> (dray_ir::ast::TypeId, TemplateParam) {
        use dray_ir::ast::{PathSeg, Type, TypeKind};

        let gen = self.interner.generate_id("T");
        let seg = PathSeg {
            name: gen,
            tiargs: None,
            span,
        };
        let segments = self.arena.alloc_segments(vec![seg]);
        let ty = self.arena.alloc_type(Type::new(
            TypeKind::Path {
                leading_dot: false,
                segments,
            },
            span,
        ));
        let tparam = TemplateParam {
            name: gen,
            kind: dray_ir::ast::TemplateParamKind::Type {
                spec: None,
                default: None,
            },
            span,
        };
        (ty, tparam)
    }

    /// Function literals: `function`/`delegate` forms, `(params) => e`,
    /// `(params) { }`, `ref (params) ...`, and the bare `{ }` block.
    pub(crate) fn parse_function_literal(&mut self) -> ExprId {
        let start = self.span();
        let mut kind = FuncLiteralKind::Lambda;

        match self.kind() {
            TokenKind::Function => {
                kind = FuncLiteralKind::Function;
                self.advance();
            }
            TokenKind::Delegate => {
                kind = FuncLiteralKind::Delegate;
                self.advance();
            }
            TokenKind::LeftCurly => {
                // bare block literal
                let body = self.parse_block_statement();
                let span = start.merge(self.prev_span());
                return self.arena.alloc_expr(Expr::new(
                    ExprKind::FuncLiteral {
                        kind: FuncLiteralKind::Block,
                        is_ref: false,
                        has_params: false,
                        tparams: TemplateParamRange::EMPTY,
                        params: dray_ir::ast::ParamRange::EMPTY,
                        varargs: VarArg::None,
                        ret: None,
                        stc: StorageClass::NONE,
                        body: FuncLiteralBody::Block(body),
                    },
                    span,
                ));
            }
            _ => {}
        }

        let is_ref = self.eat(TokenKind::Ref);

        // optional explicit return type
        let ret = if !self.check(TokenKind::LeftParen)
            && !self.check(TokenKind::LeftCurly)
            && !self.check(TokenKind::GoesTo)
        {
            Some(self.parse_type())
        } else {
            None
        };

        let mut tparams = Vec::new();
        let (params, varargs, has_params) = if self.check(TokenKind::LeftParen) {
            let (p, v) = self.parse_parameter_list(Some(&mut tparams));
            (p, v, true)
        } else {
            (dray_ir::ast::ParamRange::EMPTY, VarArg::None, false)
        };
        let stc = self.parse_postfix_attributes(None);

        let body = if self.eat(TokenKind::GoesTo) {
            FuncLiteralBody::Expr(self.parse_assign_expr())
        } else if self.check(TokenKind::LeftCurly) {
            FuncLiteralBody::Block(self.parse_block_statement())
        } else {
            self.error_here("function literal body expected (`=>` or `{`)");
            let e = self.error_expr(start);
            FuncLiteralBody::Expr(e)
        };

        let tparams = self.arena.alloc_tparams(tparams);
        let span = start.merge(self.prev_span());
        self.arena.alloc_expr(Expr::new(
            ExprKind::FuncLiteral {
                kind,
                is_ref,
                has_params,
                tparams,
                params,
                varargs,
                ret,
                stc,
                body,
            },
            span,
        ))
    }

    /// `is ( Type [id] [(: | ==) Spec] [, TemplateParams] )`
    fn parse_is_expr(&mut self) -> ExprId {
        let start = self.span();
        self.advance(); // is
        let open = self.span();
        self.expect(TokenKind::LeftParen);

        let targ = self.parse_type();
        let ident = if self.check(TokenKind::Identifier) {
            let name = self.cursor.ident();
            self.advance();
            name
        } else {
            None
        };

        let cmp = if self.eat(TokenKind::Colon) {
            IsCmp::Colon
        } else if self.eat(TokenKind::Equal) {
            IsCmp::Equal
        } else {
            IsCmp::None
        };

        let spec = if cmp != IsCmp::None {
            Some(self.parse_is_spec())
        } else {
            None
        };

        let tparams = if self.eat(TokenKind::Comma) {
            let list = self.parse_template_param_items(TokenKind::RightParen);
            self.arena.alloc_tparams(list)
        } else {
            TemplateParamRange::EMPTY
        };

        self.expect_closing(TokenKind::RightParen, TokenKind::LeftParen, open);
        let span = start.merge(self.prev_span());
        self.arena.alloc_expr(Expr::new(
            ExprKind::Is {
                targ,
                ident,
                cmp,
                spec,
                tparams,
            },
            span,
        ))
    }

    fn parse_is_spec(&mut self) -> IsSpec {
        let kw = match self.kind() {
            TokenKind::Struct => Some(IsSpecKw::Struct),
            TokenKind::Union => Some(IsSpecKw::Union),
            TokenKind::Class => Some(IsSpecKw::Class),
            TokenKind::Super => Some(IsSpecKw::Super),
            TokenKind::Enum => Some(IsSpecKw::Enum),
            TokenKind::Interface => Some(IsSpecKw::Interface),
            TokenKind::Package => Some(IsSpecKw::Package),
            TokenKind::Module => Some(IsSpecKw::Module),
            TokenKind::ArgTypesKw => Some(IsSpecKw::ArgTypes),
            TokenKind::ParametersKw => Some(IsSpecKw::Parameters),
            TokenKind::Function => Some(IsSpecKw::Function),
            TokenKind::Delegate => Some(IsSpecKw::Delegate),
            TokenKind::Return => Some(IsSpecKw::Return),
            TokenKind::Vector => Some(IsSpecKw::Vector),
            // qualifier keywords only when they stand alone
            TokenKind::Const
                if matches!(
                    self.peek_kind(1),
                    TokenKind::RightParen | TokenKind::Comma
                ) =>
            {
                Some(IsSpecKw::Const)
            }
            TokenKind::Immutable
                if matches!(
                    self.peek_kind(1),
                    TokenKind::RightParen | TokenKind::Comma
                ) =>
            {
                Some(IsSpecKw::Immutable)
            }
            TokenKind::Shared
                if matches!(
                    self.peek_kind(1),
                    TokenKind::RightParen | TokenKind::Comma
                ) =>
            {
                Some(IsSpecKw::Shared)
            }
            TokenKind::Inout
                if matches!(
                    self.peek_kind(1),
                    TokenKind::RightParen | TokenKind::Comma
                ) =>
            {
                Some(IsSpecKw::Wild)
            }
            _ => None,
        };

        match kw {
            Some(kw) => {
                self.advance();
                IsSpec::Keyword(kw)
            }
            None => IsSpec::Type(self.parse_type()),
        }
    }
}

fn special_of(kind: TokenKind) -> Option<SpecialKw> {
    Some(match kind {
        TokenKind::SpecialFile => SpecialKw::File,
        TokenKind::SpecialFileFullPath => SpecialKw::FileFullPath,
        TokenKind::SpecialLine => SpecialKw::Line,
        TokenKind::SpecialModule => SpecialKw::Module,
        TokenKind::SpecialFunction => SpecialKw::Function,
        TokenKind::SpecialPrettyFunction => SpecialKw::PrettyFunction,
        _ => return None,
    })
}
