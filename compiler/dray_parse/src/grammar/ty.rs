//! Type parsing.
//!
//! Basic types, qualified paths with template instances, type constructors,
//! typeof, vectors, and the pointer/array/function suffixes.

use crate::probes::{self, NeedDeclaratorId};
use crate::Parser;
use dray_ir::ast::{
    BasicType, PathSeg, PathSegRange, TiArg, TiArgRange, Type, TypeId, TypeKind, TypeofArg,
};
use dray_ir::{ModFlags, Name, StorageClass, TokenKind};

impl Parser<'_> {
    /// Parse a full type: leading qualifiers, basic type, suffixes.
    pub(crate) fn parse_type(&mut self) -> TypeId {
        let start = self.span();
        let mut mods = ModFlags::NONE;

        // Leading qualifiers without parens qualify the whole type
        loop {
            let m = match self.kind() {
                TokenKind::Const => ModFlags::CONST,
                TokenKind::Immutable => ModFlags::IMMUTABLE,
                TokenKind::Shared => ModFlags::SHARED,
                TokenKind::Inout => ModFlags::WILD,
                _ => break,
            };
            if self.peek_kind(1) == TokenKind::LeftParen {
                break;
            }
            self.advance();
            mods = mods.with(m);
        }

        let base = self.parse_basic_type();
        let ty = self.parse_type_suffixes(base);

        if mods.is_empty() {
            ty
        } else {
            let span = start.merge(self.type_span(ty));
            self.arena
                .alloc_type(Type::new(TypeKind::Modified { mods, inner: ty }, span))
        }
    }

    /// Parse a basic type: the head of a type without suffixes.
    pub(crate) fn parse_basic_type(&mut self) -> TypeId {
        let start = self.span();
        let kind = self.kind();

        if let Some(basic) = BasicType::from_token(kind) {
            self.advance();
            return self
                .arena
                .alloc_type(Type::new(TypeKind::Basic(basic), start));
        }

        match kind {
            TokenKind::Identifier => {
                let segments = self.parse_type_path_segments();
                let span = start.merge(self.prev_span());
                self.arena.alloc_type(Type::new(
                    TypeKind::Path {
                        leading_dot: false,
                        segments,
                    },
                    span,
                ))
            }
            TokenKind::Dot => {
                self.advance();
                if !self.check(TokenKind::Identifier) {
                    self.error_here("identifier expected following `.`");
                    return self.error_type(start);
                }
                let segments = self.parse_type_path_segments();
                let span = start.merge(self.prev_span());
                self.arena.alloc_type(Type::new(
                    TypeKind::Path {
                        leading_dot: true,
                        segments,
                    },
                    span,
                ))
            }
            TokenKind::Const | TokenKind::Immutable | TokenKind::Shared | TokenKind::Inout => {
                // type constructor with parens: const(T)
                let m = match kind {
                    TokenKind::Const => ModFlags::CONST,
                    TokenKind::Immutable => ModFlags::IMMUTABLE,
                    TokenKind::Shared => ModFlags::SHARED,
                    _ => ModFlags::WILD,
                };
                self.advance();
                let open = self.span();
                self.expect(TokenKind::LeftParen);
                let inner = self.parse_type();
                self.expect_closing(TokenKind::RightParen, TokenKind::LeftParen, open);
                let span = start.merge(self.prev_span());
                self.arena
                    .alloc_type(Type::new(TypeKind::Modified { mods: m, inner }, span))
            }
            TokenKind::Typeof => self.parse_typeof(),
            TokenKind::Vector => {
                self.advance();
                let open = self.span();
                self.expect(TokenKind::LeftParen);
                let inner = self.parse_type();
                self.expect_closing(TokenKind::RightParen, TokenKind::LeftParen, open);
                let span = start.merge(self.prev_span());
                self.arena
                    .alloc_type(Type::new(TypeKind::Vector(inner), span))
            }
            TokenKind::Traits => {
                let (name, args) = self.parse_traits_parts();
                let span = start.merge(self.prev_span());
                self.arena
                    .alloc_type(Type::new(TypeKind::TraitsType { name, args }, span))
            }
            TokenKind::Mixin => {
                self.advance();
                let open = self.span();
                self.expect(TokenKind::LeftParen);
                let args = self.parse_argument_list(TokenKind::RightParen);
                self.expect_closing(TokenKind::RightParen, TokenKind::LeftParen, open);
                let span = start.merge(self.prev_span());
                self.arena
                    .alloc_type(Type::new(TypeKind::MixinType(args), span))
            }
            _ => {
                self.error_here(format!(
                    "basic type expected, not `{}`",
                    kind.display_name()
                ));
                self.error_type(start)
            }
        }
    }

    /// `typeof(e)` / `typeof(return)`, with an optional `.id` chain.
    fn parse_typeof(&mut self) -> TypeId {
        let start = self.span();
        self.advance(); // typeof
        let open = self.span();
        self.expect(TokenKind::LeftParen);

        let arg = if self.check(TokenKind::Return) {
            self.advance();
            TypeofArg::Return
        } else {
            TypeofArg::Expr(self.parse_expression())
        };
        self.expect_closing(TokenKind::RightParen, TokenKind::LeftParen, open);

        let mut segs = Vec::new();
        while self.check(TokenKind::Dot) && self.peek_kind(1) == TokenKind::Identifier {
            self.advance();
            segs.push(self.parse_path_segment());
        }
        let segments = self.arena.alloc_segments(segs);
        let span = start.merge(self.prev_span());
        self.arena
            .alloc_type(Type::new(TypeKind::Typeof { arg, segments }, span))
    }

    /// One path segment: `ident` with optional `!` template arguments.
    pub(crate) fn parse_path_segment(&mut self) -> PathSeg {
        let span = self.span();
        let name = self.cursor.ident().unwrap_or_default();
        self.advance();
        let tiargs = if self.check(TokenKind::Not) && !self.bang_is_comparison() {
            Some(self.parse_template_args())
        } else {
            None
        };
        PathSeg {
            name,
            tiargs,
            span: span.merge(self.prev_span()),
        }
    }

    /// A dotted path `a.b!c.d` starting at the current identifier.
    pub(crate) fn parse_type_path_segments(&mut self) -> PathSegRange {
        let mut segs = vec![self.parse_path_segment()];
        while self.check(TokenKind::Dot) && self.peek_kind(1) == TokenKind::Identifier {
            self.advance();
            segs.push(self.parse_path_segment());
        }
        self.arena.alloc_segments(segs)
    }

    /// `!is` / `!in` are comparisons, never template arguments.
    pub(crate) fn bang_is_comparison(&self) -> bool {
        matches!(self.peek_kind(1), TokenKind::Is | TokenKind::In)
    }

    /// Apply pointer, array, and function/delegate suffixes.
    pub(crate) fn parse_type_suffixes(&mut self, mut ty: TypeId) -> TypeId {
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
                    } else if probes::is_declaration(
                        self.cursor.tokens(),
                        self.cursor.position(),
                        NeedDeclaratorId::No,
                        Some(TokenKind::RightBracket),
                    )
                    .is_some()
                    {
                        let key = self.parse_type();
                        TypeKind::AArray { elem: ty, key }
                    } else {
                        let dim = self.parse_assign_expr();
                        if self.eat(TokenKind::DotDot) {
                            let upper = self.parse_assign_expr();
                            TypeKind::SliceOf {
                                elem: ty,
                                lower: dim,
                                upper,
                            }
                        } else {
                            TypeKind::SArray { elem: ty, dim }
                        }
                    };
                    self.in_brackets -= 1;
                    self.expect_closing(TokenKind::RightBracket, TokenKind::LeftBracket, open);
                    let span = self.type_span(ty).merge(self.prev_span());
                    ty = self.arena.alloc_type(Type::new(kind, span));
                }
                TokenKind::Function | TokenKind::Delegate => {
                    let is_delegate = self.check(TokenKind::Delegate);
                    self.advance();
                    let (params, varargs) = self.parse_parameter_list(None);
                    let stc = self.parse_postfix_attributes(None);
                    let span = self.type_span(ty).merge(self.prev_span());
                    let kind = if is_delegate {
                        TypeKind::Delegate {
                            params,
                            varargs,
                            ret: ty,
                            stc,
                        }
                    } else {
                        TypeKind::Function {
                            params,
                            varargs,
                            ret: ty,
                            stc,
                        }
                    };
                    ty = self.arena.alloc_type(Type::new(kind, span));
                }
                _ => return ty,
            }
        }
    }

    /// Member-function / function-type postfix attributes. When `udas` is
    /// `None`, user-defined attributes here are diagnosed and dropped.
    pub(crate) fn parse_postfix_attributes(
        &mut self,
        mut udas: Option<&mut Vec<dray_ir::ast::ExprId>>,
    ) -> StorageClass {
        let mut stc = StorageClass::NONE;
        loop {
            let kind = self.kind();
            let flag = match kind {
                TokenKind::Const => StorageClass::CONST,
                TokenKind::Immutable => StorageClass::IMMUTABLE,
                TokenKind::Shared => StorageClass::SHARED,
                TokenKind::Inout => StorageClass::WILD,
                TokenKind::Nothrow => StorageClass::NOTHROW,
                TokenKind::Pure => StorageClass::PURE,
                TokenKind::Scope => StorageClass::SCOPE,
                TokenKind::Return => StorageClass::RETURN,
                TokenKind::At => {
                    let mut scratch = Vec::new();
                    let flag = self.parse_at_attribute(&mut scratch);
                    if !scratch.is_empty() {
                        match udas.as_deref_mut() {
                            Some(out) => out.extend(scratch),
                            None => {
                                let span = self.prev_span();
                                self.error(
                                    span,
                                    "user-defined attributes are not allowed here".to_string(),
                                );
                            }
                        }
                    }
                    if !flag.is_empty() {
                        let span = self.prev_span();
                        stc = self.append_storage_class(stc, flag, span);
                    }
                    continue;
                }
                _ => return stc,
            };
            let span = self.span();
            self.advance();
            stc = self.append_storage_class(stc, flag, span);
        }
    }

    /// `__traits ( identifier , args... )`, shared between expression and
    /// type positions.
    pub(crate) fn parse_traits_parts(&mut self) -> (Name, TiArgRange) {
        self.advance(); // __traits
        let open = self.span();
        self.expect(TokenKind::LeftParen);

        let name = self
            .expect_identifier("`__traits(`")
            .unwrap_or_default();

        let mut args = Vec::new();
        while self.eat(TokenKind::Comma) {
            if self.check(TokenKind::RightParen) {
                break;
            }
            args.push(self.parse_template_arg());
        }
        self.expect_closing(TokenKind::RightParen, TokenKind::LeftParen, open);
        (name, self.arena.alloc_tiargs(args))
    }

    /// Template instance arguments after `!`: a parenthesised list or a
    /// single-token argument. Chained `!` applications are diagnosed.
    pub(crate) fn parse_template_args(&mut self) -> TiArgRange {
        self.advance(); // !
        let mut args = Vec::new();

        if self.check(TokenKind::LeftParen) {
            let open = self.span();
            self.advance();
            while !self.check(TokenKind::RightParen) && !self.is_at_end() {
                args.push(self.parse_template_arg());
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            self.expect_closing(TokenKind::RightParen, TokenKind::LeftParen, open);
        } else {
            args.push(self.parse_single_token_template_arg());
        }

        // a!b!c is not allowed
        while self.check(TokenKind::Not) && !self.bang_is_comparison() {
            self.error_here("multiple ! arguments are not allowed");
            self.advance();
            if self.check(TokenKind::LeftParen) {
                let open = self.span();
                self.advance();
                while !self.check(TokenKind::RightParen) && !self.is_at_end() {
                    self.parse_template_arg();
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
                self.expect_closing(TokenKind::RightParen, TokenKind::LeftParen, open);
            } else if !self.is_at_end() {
                self.advance();
            }
        }

        self.arena.alloc_tiargs(args)
    }

    /// One template argument: a type when the token run reads as one,
    /// otherwise an assign expression.
    pub(crate) fn parse_template_arg(&mut self) -> TiArg {
        if probes::is_declaration(
            self.cursor.tokens(),
            self.cursor.position(),
            NeedDeclaratorId::No,
            None,
        )
        .is_some()
        {
            TiArg::Type(self.parse_type())
        } else {
            TiArg::Expr(self.parse_assign_expr())
        }
    }

    fn parse_single_token_template_arg(&mut self) -> TiArg {
        let span = self.span();
        let kind = self.kind();

        if BasicType::from_token(kind).is_some() {
            let ty = self.parse_basic_type();
            return TiArg::Type(ty);
        }
        match kind {
            TokenKind::Identifier => {
                let name = self.cursor.ident().unwrap_or_default();
                self.advance();
                let seg = PathSeg {
                    name,
                    tiargs: None,
                    span,
                };
                let segments = self.arena.alloc_segments(vec![seg]);
                TiArg::Type(self.arena.alloc_type(Type::new(
                    TypeKind::Path {
                        leading_dot: false,
                        segments,
                    },
                    span,
                )))
            }
            TokenKind::IntLiteral
            | TokenKind::FloatLiteral
            | TokenKind::StringLiteral
            | TokenKind::CharLiteral
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Null
            | TokenKind::This => {
                let e = self.parse_primary_expr();
                TiArg::Expr(e)
            }
            _ => {
                self.error_here(format!(
                    "template argument expected following `!`, not `{}`",
                    kind.display_name()
                ));
                let e = self.error_expr(span);
                TiArg::Expr(e)
            }
        }
    }
}
