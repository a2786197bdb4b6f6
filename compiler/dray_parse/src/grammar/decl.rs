//! Declarations proper: shared-base-type declarator lists, alias forms,
//! function contracts, parameter lists, and initializers.

use crate::attributes::PrefixAttributes;
use crate::Parser;
use dray_ir::ast::{
    ArrayInitEntry, Decl, DeclId, DeclKind, Ensure, Expr, ExprId, ExprKind, FieldInit, FuncBody,
    InitId, InitKind, Initializer, Param, ParamRange, Stmt, StmtId, StmtKind, TemplateParam, Type,
    TypeId, TypeKind, VarArg,
};
use dray_ir::{Name, Span, StorageClass, TokenKind};

impl Parser<'_> {
    /// `parseDeclarations`: optional storage classes, a base type shared by
    /// every declarator, then the declarator list. Handles the alias forms
    /// up front.
    pub(crate) fn parse_declarations(&mut self, mut attrs: PrefixAttributes, out: &mut Vec<DeclId>) {
        let start = self.span();
        self.parse_storage_classes(&mut attrs);

        if self.check(TokenKind::Alias) {
            self.parse_alias(attrs, out);
            return;
        }

        // auto form reachable when only storage classes were written
        if self.check(TokenKind::Identifier) && self.peek_kind(1) == TokenKind::Assign {
            if attrs.stc.is_empty() && attrs.udas.is_empty() {
                self.error_here("declaration expected; an expression statement cannot start here");
            }
            self.parse_auto_declarations(attrs, out);
            return;
        }

        let base = self.parse_basic_type();
        let base = self.parse_type_suffixes(base);

        self.parse_declarator_list(attrs, base, start, out);
    }

    /// One or more declarators sharing `base`, each either a variable or a
    /// function declaration.
    fn parse_declarator_list(
        &mut self,
        attrs: PrefixAttributes,
        base: TypeId,
        start: Span,
        out: &mut Vec<DeclId>,
    ) {
        let mut items = Vec::new();
        let mut item_doc = attrs.doc;

        loop {
            let Some(name) = self.expect_identifier("declaration") else {
                self.resync();
                out.push(self.error_decl(start));
                return;
            };

            // template parameters and/or function parameters
            let mut tparams: Option<Vec<TemplateParam>> = None;
            if self.check(TokenKind::LeftParen) && self.function_follows_template_list() {
                tparams = Some(self.parse_template_parameter_list());
            }

            if self.check(TokenKind::LeftParen) {
                // function declaration
                let (params, varargs) = self.parse_parameter_list(None);
                let mut postfix_udas = Vec::new();
                let fn_stc = self.parse_postfix_attributes(Some(&mut postfix_udas));

                let constraint = if tparams.is_some() && self.check(TokenKind::If) {
                    Some(self.parse_constraint())
                } else {
                    None
                };

                let body = self.parse_contracts();
                let span = start.merge(self.prev_span());

                let ty = self.arena.alloc_type(Type::new(
                    TypeKind::Function {
                        params,
                        varargs,
                        ret: base,
                        stc: fn_stc,
                    },
                    span,
                ));
                let stc = attrs.stc.with(fn_stc);
                let mut d = self.arena.alloc_decl(Decl::with_doc(
                    DeclKind::Func {
                        name,
                        ty,
                        stc,
                        body,
                    },
                    span,
                    item_doc,
                ));
                if let Some(tps) = tparams {
                    d = self.wrap_template(name, tps, constraint, d, span);
                }
                if !postfix_udas.is_empty() {
                    let uda_range = self.arena.alloc_expr_list(&postfix_udas);
                    let range = self.arena.alloc_decl_list(&[d]);
                    d = self.arena.alloc_decl(Decl::new(
                        DeclKind::UserAttributeDecl {
                            attrs: uda_range,
                            decls: range,
                        },
                        span,
                    ));
                }
                items.push(d);
                break;
            }

            // C-style array suffixes on the identifier
            let mut ty = base;
            while self.check(TokenKind::LeftBracket) {
                let open = self.span();
                self.deprecation(open, "C-style array declarations are deprecated, use `T[] id`");
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

            // variable declaration
            let init = if self.eat(TokenKind::Assign) {
                Some(self.parse_initializer())
            } else {
                None
            };
            let span = start.merge(self.prev_span());
            let mut d = self.arena.alloc_decl(Decl::with_doc(
                DeclKind::Var {
                    name,
                    ty: Some(ty),
                    init,
                    stc: attrs.stc,
                },
                span,
                item_doc,
            ));
            if let Some(tps) = tparams {
                d = self.wrap_template(name, tps, None, d, span);
            }
            items.push(d);

            if self.eat(TokenKind::Comma) {
                item_doc = self.token_doc();
                continue;
            }
            self.expect(TokenKind::Semicolon);
            break;
        }

        let span = start.merge(self.prev_span());
        let wrapped = self.apply_uda_wrappers(attrs, items, span);
        out.extend(wrapped);
    }

    /// Is the `(` at the cursor a template parameter list directly
    /// followed by a function parameter list?
    fn function_follows_template_list(&self) -> bool {
        let tokens = self.cursor.tokens();
        match crate::probes::skip_parens(tokens, self.cursor.position()) {
            Some(past) => tokens.kind(past) == TokenKind::LeftParen,
            None => false,
        }
    }

    /// Wrap a declaration into the template declaration its parameter list
    /// introduced.
    pub(crate) fn wrap_template(
        &mut self,
        name: Name,
        tparams: Vec<TemplateParam>,
        constraint: Option<ExprId>,
        decl: DeclId,
        span: Span,
    ) -> DeclId {
        let tparams = self.arena.alloc_tparams(tparams);
        let members = self.arena.alloc_decl_list(&[decl]);
        self.arena.alloc_decl(Decl::new(
            DeclKind::Template {
                name,
                tparams,
                constraint,
                members,
                is_mixin: false,
            },
            span,
        ))
    }

    /// `if ( expression )` template constraint.
    pub(crate) fn parse_constraint(&mut self) -> ExprId {
        self.advance(); // if
        let open = self.span();
        self.expect(TokenKind::LeftParen);
        let e = self.parse_expression();
        self.expect_closing(TokenKind::RightParen, TokenKind::LeftParen, open);
        e
    }

    // --- Alias declarations ---

    /// `alias id this;`, `alias id [(tparams)] = Type|Lambda, ...;`, and
    /// the old-style `alias Type id;`.
    fn parse_alias(&mut self, attrs: PrefixAttributes, out: &mut Vec<DeclId>) {
        let start = self.span();
        self.advance(); // alias

        // alias Identifier this ;
        if self.check(TokenKind::Identifier) && self.peek_kind(1) == TokenKind::This {
            let name = self.cursor.ident().unwrap_or_default();
            self.advance();
            self.advance();
            self.expect(TokenKind::Semicolon);
            let span = start.merge(self.prev_span());
            out.push(
                self.arena
                    .alloc_decl(Decl::with_doc(DeclKind::AliasThis { name }, span, attrs.doc)),
            );
            return;
        }

        if self.check(TokenKind::Identifier) && self.alias_assign_follows() {
            let mut items = Vec::new();
            loop {
                let item_start = self.span();
                let item_doc = self.token_doc().or(attrs.doc);
                let name = self.cursor.ident().unwrap_or_default();
                self.advance();

                let tparams = if self.check(TokenKind::LeftParen) {
                    Some(self.parse_template_parameter_list())
                } else {
                    None
                };
                self.expect(TokenKind::Assign);

                let target = if self.alias_target_is_literal() {
                    let e = self.parse_function_literal();
                    dray_ir::ast::AliasTarget::FuncLiteral(e)
                } else {
                    let ty = self.parse_type();
                    dray_ir::ast::AliasTarget::Type(ty)
                };

                let span = item_start.merge(self.prev_span());
                let mut d = self.arena.alloc_decl(Decl::with_doc(
                    DeclKind::Alias {
                        name,
                        tparams: None,
                        target,
                        stc: attrs.stc,
                    },
                    span,
                    item_doc,
                ));
                if let Some(tps) = tparams {
                    d = self.wrap_template(name, tps, None, d, span);
                }
                items.push(d);

                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::Semicolon);
            let span = start.merge(self.prev_span());
            let wrapped = self.apply_uda_wrappers(attrs, items, span);
            out.extend(wrapped);
            return;
        }

        // old-style: alias Type Identifier ;
        let base = self.parse_basic_type();
        let base = self.parse_type_suffixes(base);
        let mut items = Vec::new();
        loop {
            let Some(name) = self.expect_identifier("`alias`") else {
                self.resync();
                out.push(self.error_decl(start));
                return;
            };
            let span = start.merge(self.prev_span());
            items.push(self.arena.alloc_decl(Decl::with_doc(
                DeclKind::Alias {
                    name,
                    tparams: None,
                    target: dray_ir::ast::AliasTarget::Type(base),
                    stc: attrs.stc,
                },
                span,
                attrs.doc,
            )));
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::Semicolon);
        let span = start.merge(self.prev_span());
        let wrapped = self.apply_uda_wrappers(attrs, items, span);
        out.extend(wrapped);
    }

    /// `alias id =` or `alias id(tparams) =`?
    fn alias_assign_follows(&self) -> bool {
        if self.peek_kind(1) == TokenKind::Assign {
            return true;
        }
        if self.peek_kind(1) == TokenKind::LeftParen {
            let tokens = self.cursor.tokens();
            if let Some(past) = crate::probes::skip_parens(tokens, self.cursor.position() + 1) {
                return tokens.kind(past) == TokenKind::Assign;
            }
        }
        false
    }

    /// Does the alias target read as a function literal rather than a type?
    fn alias_target_is_literal(&self) -> bool {
        match self.kind() {
            TokenKind::Function | TokenKind::Delegate => {
                // `function(int)` with no return type is a type; a literal
                // follows with a body
                let tokens = self.cursor.tokens();
                let mut pos = self.cursor.position() + 1;
                if tokens.kind(pos) == TokenKind::Ref {
                    return true;
                }
                if tokens.kind(pos) == TokenKind::LeftParen {
                    match crate::probes::skip_parens(tokens, pos) {
                        Some(past) => pos = past,
                        None => return false,
                    }
                    if let Some(after) = crate::probes::skip_attributes(tokens, pos) {
                        pos = after;
                    }
                    return matches!(
                        tokens.kind(pos),
                        TokenKind::LeftCurly | TokenKind::GoesTo
                    );
                }
                matches!(tokens.kind(pos), TokenKind::LeftCurly)
            }
            TokenKind::LeftCurly | TokenKind::GoesTo => true,
            TokenKind::Identifier if self.peek_kind(1) == TokenKind::GoesTo => true,
            TokenKind::LeftParen => {
                let tokens = self.cursor.tokens();
                match crate::probes::is_parameters(tokens, self.cursor.position()) {
                    Some(mut pos) => {
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
            _ => false,
        }
    }

    // --- Auto declarations ---

    /// `stc id = Initializer, id2 = Initializer ;` — also the
    /// `id(TemplateParams) = Initializer` template form.
    pub(crate) fn parse_auto_declarations(
        &mut self,
        attrs: PrefixAttributes,
        out: &mut Vec<DeclId>,
    ) {
        let start = self.span();
        let mut items = Vec::new();
        let mut item_doc = attrs.doc;

        loop {
            let item_start = self.span();
            let name = self.cursor.ident().unwrap_or_default();
            self.advance();

            let tparams = if self.check(TokenKind::LeftParen) {
                Some(self.parse_template_parameter_list())
            } else {
                None
            };

            self.expect(TokenKind::Assign);
            let init = self.parse_initializer();
            let span = item_start.merge(self.prev_span());

            let mut d = self.arena.alloc_decl(Decl::with_doc(
                DeclKind::Var {
                    name,
                    ty: None,
                    init: Some(init),
                    stc: attrs.stc,
                },
                span,
                item_doc,
            ));
            if let Some(tps) = tparams {
                d = self.wrap_template(name, tps, None, d, span);
            }
            items.push(d);

            if self.eat(TokenKind::Comma) {
                item_doc = self.token_doc();
                if !self.check(TokenKind::Identifier) {
                    self.error_here("identifier expected following `,`");
                    break;
                }
                continue;
            }
            break;
        }
        self.expect(TokenKind::Semicolon);

        let span = start.merge(self.prev_span());
        let wrapped = self.apply_uda_wrappers(attrs, items, span);
        out.extend(wrapped);
    }

    // --- Special member functions ---

    /// `this(...)` constructor or `this(this)` postblit.
    pub(crate) fn parse_ctor(&mut self, attrs: PrefixAttributes) -> DeclId {
        let start = self.span();
        self.advance(); // this

        // postblit: this(this)
        if self.check(TokenKind::LeftParen)
            && self.peek_kind(1) == TokenKind::This
            && self.peek_kind(2) == TokenKind::RightParen
        {
            self.advance();
            self.advance();
            self.advance();
            let stc = attrs.stc.with(self.parse_postfix_attributes(None));
            let body = self.parse_contracts();
            let span = start.merge(self.prev_span());
            return self
                .arena
                .alloc_decl(Decl::with_doc(DeclKind::Postblit { stc, body }, span, attrs.doc));
        }

        let tparams = if self.check(TokenKind::LeftParen) && self.function_follows_template_list() {
            Some(self.parse_template_parameter_list())
        } else {
            None
        };

        let (params, varargs) = if self.check(TokenKind::LeftParen) {
            self.parse_parameter_list(None)
        } else {
            self.error_here("`(` expected following `this`");
            (ParamRange::EMPTY, VarArg::None)
        };
        let stc = attrs.stc.with(self.parse_postfix_attributes(None));

        let constraint = if tparams.is_some() && self.check(TokenKind::If) {
            Some(self.parse_constraint())
        } else {
            None
        };

        let body = self.parse_contracts();
        let span = start.merge(self.prev_span());
        let tparams = tparams.map(|tps| self.arena.alloc_tparams(tps));
        self.arena.alloc_decl(Decl::with_doc(
            DeclKind::Ctor {
                params,
                varargs,
                stc,
                tparams,
                constraint,
                body,
            },
            span,
            attrs.doc,
        ))
    }

    /// `~this()` destructor.
    pub(crate) fn parse_dtor(&mut self, attrs: PrefixAttributes) -> DeclId {
        let start = self.span();
        self.advance(); // ~
        self.advance(); // this
        if self.eat(TokenKind::LeftParen) {
            self.expect(TokenKind::RightParen);
        }
        let stc = attrs.stc.with(self.parse_postfix_attributes(None));
        let body = self.parse_contracts();
        let span = start.merge(self.prev_span());
        self.arena
            .alloc_decl(Decl::with_doc(DeclKind::Dtor { stc, body }, span, attrs.doc))
    }

    /// `[shared] static this()` constructor.
    pub(crate) fn parse_static_ctor(&mut self, shared: bool, doc: Option<Name>) -> DeclId {
        let start = self.span();
        if shared {
            self.advance(); // shared
        }
        self.advance(); // static
        self.advance(); // this
        if self.eat(TokenKind::LeftParen) {
            if !self.check(TokenKind::RightParen) {
                self.error_here("static constructors take no parameters");
                crate::recovery::synchronize(
                    &mut self.cursor,
                    crate::recovery::TokenSet::new().with(TokenKind::RightParen),
                );
            }
            self.expect(TokenKind::RightParen);
        }
        let stc = self.parse_postfix_attributes(None);
        let body = self.parse_contracts();
        let span = start.merge(self.prev_span());
        let kind = if shared {
            DeclKind::SharedStaticCtor { stc, body }
        } else {
            DeclKind::StaticCtor { stc, body }
        };
        self.arena.alloc_decl(Decl::with_doc(kind, span, doc))
    }

    /// `[shared] static ~this()` destructor.
    pub(crate) fn parse_static_dtor(&mut self, shared: bool, doc: Option<Name>) -> DeclId {
        let start = self.span();
        if shared {
            self.advance(); // shared
        }
        self.advance(); // static
        self.advance(); // ~
        self.advance(); // this
        if self.eat(TokenKind::LeftParen) {
            self.expect(TokenKind::RightParen);
        }
        let stc = self.parse_postfix_attributes(None);
        let body = self.parse_contracts();
        let span = start.merge(self.prev_span());
        let kind = if shared {
            DeclKind::SharedStaticDtor { stc, body }
        } else {
            DeclKind::StaticDtor { stc, body }
        };
        self.arena.alloc_decl(Decl::with_doc(kind, span, doc))
    }

    /// `invariant { ... }`, `invariant () { ... }`, `invariant (expr);`
    pub(crate) fn parse_invariant(&mut self, doc: Option<Name>) -> DeclId {
        let start = self.span();
        self.advance(); // invariant

        let body = if self.check(TokenKind::LeftParen) {
            let open = self.span();
            self.advance();
            if self.check(TokenKind::RightParen) {
                self.advance();
                self.parse_block_statement()
            } else {
                let cond = self.parse_assign_expr();
                let msg = if self.eat(TokenKind::Comma) {
                    Some(self.parse_assign_expr())
                } else {
                    None
                };
                self.expect_closing(TokenKind::RightParen, TokenKind::LeftParen, open);
                self.expect(TokenKind::Semicolon);
                let span = start.merge(self.prev_span());
                let assert = self
                    .arena
                    .alloc_expr(Expr::new(ExprKind::Assert { cond, msg }, span));
                self.arena.alloc_stmt(Stmt::new(StmtKind::Expr(assert), span))
            }
        } else {
            self.parse_block_statement()
        };

        let span = start.merge(self.prev_span());
        self.arena
            .alloc_decl(Decl::with_doc(DeclKind::Invariant { body }, span, doc))
    }

    /// `unittest { ... }`
    pub(crate) fn parse_unittest(&mut self, doc: Option<Name>) -> DeclId {
        let start = self.span();
        self.advance(); // unittest
        let body = self.parse_block_statement();
        let span = start.merge(self.prev_span());
        self.arena
            .alloc_decl(Decl::with_doc(DeclKind::Unittest { body }, span, doc))
    }

    /// Legacy class allocator `new(params) { ... }`.
    pub(crate) fn parse_class_allocator(&mut self, doc: Option<Name>) -> DeclId {
        let start = self.span();
        self.deprecation(start, "class allocators are deprecated");
        self.advance(); // new
        let (params, varargs) = self.parse_parameter_list(None);
        let body = self.parse_contracts();
        let span = start.merge(self.prev_span());
        self.arena.alloc_decl(Decl::with_doc(
            DeclKind::ClassNew {
                params,
                varargs,
                body,
            },
            span,
            doc,
        ))
    }

    // --- Contracts ---

    /// Function contracts and body:
    /// `in { } | in (expr[, msg])`, `out [(id)] { } | out ([id]; expr[, msg])`,
    /// `do { }` (or a bare `{ }` when no block contracts were seen), or a
    /// closing `;`.
    pub(crate) fn parse_contracts(&mut self) -> FuncBody {
        let mut frequires: Vec<StmtId> = Vec::new();
        let mut fensures: Vec<Ensure> = Vec::new();
        let mut body = None;
        // block-form contracts require an explicit `do`
        let mut require_do = false;

        loop {
            match self.kind() {
                TokenKind::In => {
                    self.advance();
                    if self.check(TokenKind::LeftParen) {
                        let open = self.span();
                        self.advance();
                        let cond = self.parse_assign_expr();
                        let msg = if self.eat(TokenKind::Comma) {
                            Some(self.parse_assign_expr())
                        } else {
                            None
                        };
                        self.expect_closing(TokenKind::RightParen, TokenKind::LeftParen, open);
                        let span = open.merge(self.prev_span());
                        let assert = self
                            .arena
                            .alloc_expr(Expr::new(ExprKind::Assert { cond, msg }, span));
                        frequires
                            .push(self.arena.alloc_stmt(Stmt::new(StmtKind::Expr(assert), span)));
                    } else {
                        require_do = true;
                        frequires.push(self.parse_block_statement());
                    }
                }
                TokenKind::Out => {
                    self.advance();
                    if self.check(TokenKind::LeftParen) {
                        let open = self.span();
                        self.advance();
                        // `out (id) { }` — identifier alone before `)`
                        if self.check(TokenKind::Identifier)
                            && self.peek_kind(1) == TokenKind::RightParen
                        {
                            let ident = self.cursor.ident();
                            self.advance();
                            self.advance();
                            require_do = true;
                            let stmt = self.parse_block_statement();
                            fensures.push(Ensure { ident, stmt });
                        } else {
                            // `out (; expr)` or `out (id; expr)`
                            let ident = if self.check(TokenKind::Identifier) {
                                let name = self.cursor.ident();
                                self.advance();
                                name
                            } else {
                                None
                            };
                            self.expect(TokenKind::Semicolon);
                            let cond = self.parse_assign_expr();
                            let msg = if self.eat(TokenKind::Comma) {
                                Some(self.parse_assign_expr())
                            } else {
                                None
                            };
                            self.expect_closing(TokenKind::RightParen, TokenKind::LeftParen, open);
                            let span = open.merge(self.prev_span());
                            let assert = self
                                .arena
                                .alloc_expr(Expr::new(ExprKind::Assert { cond, msg }, span));
                            let stmt =
                                self.arena.alloc_stmt(Stmt::new(StmtKind::Expr(assert), span));
                            fensures.push(Ensure { ident, stmt });
                        }
                    } else {
                        require_do = true;
                        let stmt = self.parse_block_statement();
                        fensures.push(Ensure { ident: None, stmt });
                    }
                }
                TokenKind::Do => {
                    self.advance();
                    body = Some(self.parse_block_statement());
                    break;
                }
                // legacy `body` keyword, accepted as an alias for `do`
                TokenKind::Identifier
                    if self
                        .cursor
                        .ident()
                        .is_some_and(|n| self.is_well_known(n, "body")) =>
                {
                    self.advance();
                    body = Some(self.parse_block_statement());
                    break;
                }
                TokenKind::LeftCurly if !require_do => {
                    body = Some(self.parse_block_statement());
                    break;
                }
                TokenKind::Semicolon if !require_do => {
                    self.advance();
                    break;
                }
                _ => {
                    if require_do {
                        self.error_here("missing `do { ... }` after `in` or `out`");
                    } else {
                        self.error_here(format!(
                            "semicolon expected following function declaration, not `{}`",
                            self.kind().display_name()
                        ));
                    }
                    self.resync();
                    break;
                }
            }
        }

        FuncBody {
            frequires: self.arena.alloc_stmt_list(&frequires),
            fensures: self.arena.alloc_ensures(fensures),
            body,
        }
    }

    // --- Parameters ---

    /// A parenthesised parameter list. When `tpl` is given (function
    /// literals), untyped `(x, y)` parameters infer through synthesized
    /// template type parameters.
    pub(crate) fn parse_parameter_list(
        &mut self,
        mut tpl: Option<&mut Vec<TemplateParam>>,
    ) -> (ParamRange, VarArg) {
        let open = self.span();
        self.expect(TokenKind::LeftParen);

        let mut params = Vec::new();
        let mut varargs = VarArg::None;

        loop {
            match self.kind() {
                TokenKind::RightParen => {
                    self.advance();
                    break;
                }
                TokenKind::Eof => {
                    self.expect_closing(TokenKind::RightParen, TokenKind::LeftParen, open);
                    break;
                }
                TokenKind::DotDotDot => {
                    varargs = VarArg::Variadic;
                    self.advance();
                    self.expect_closing(TokenKind::RightParen, TokenKind::LeftParen, open);
                    break;
                }
                _ => {
                    let param = self.parse_parameter(tpl.as_deref_mut(), &mut varargs);
                    params.push(param);
                    if self.check(TokenKind::At) {
                        self.error_here(
                            "user-defined attributes cannot follow a parameter declaration",
                        );
                        let pos = crate::probes::skip_attributes(
                            self.cursor.tokens(),
                            self.cursor.position(),
                        );
                        if let Some(pos) = pos {
                            self.cursor.set_position(pos);
                        }
                    }
                    if varargs != VarArg::None {
                        // typesafe variadic must close the list
                        self.expect_closing(TokenKind::RightParen, TokenKind::LeftParen, open);
                        break;
                    }
                    if !self.eat(TokenKind::Comma) {
                        self.expect_closing(TokenKind::RightParen, TokenKind::LeftParen, open);
                        break;
                    }
                }
            }
        }

        (self.arena.alloc_params(params), varargs)
    }

    /// One parameter: storage classes, optional UDAs, type (possibly
    /// inferred), identifier, default value, and the typesafe-variadic
    /// marker.
    fn parse_parameter(
        &mut self,
        tpl: Option<&mut Vec<TemplateParam>>,
        varargs: &mut VarArg,
    ) -> Param {
        let start = self.span();
        let mut stc = StorageClass::NONE;
        let mut udas = Vec::new();

        loop {
            let flag = match self.kind() {
                TokenKind::In => StorageClass::IN,
                TokenKind::Out => StorageClass::OUT,
                TokenKind::Ref => StorageClass::REF,
                TokenKind::Lazy => StorageClass::LAZY,
                TokenKind::Scope => StorageClass::SCOPE,
                TokenKind::Final => StorageClass::FINAL,
                TokenKind::Auto => StorageClass::AUTO,
                TokenKind::Return => StorageClass::RETURN,
                TokenKind::Const | TokenKind::Immutable | TokenKind::Shared | TokenKind::Inout
                    if self.peek_kind(1) != TokenKind::LeftParen =>
                {
                    self.storage_class_of(self.kind()).unwrap_or_default()
                }
                TokenKind::At => {
                    let flag = self.parse_at_attribute(&mut udas);
                    if !flag.is_empty() {
                        let span = self.prev_span();
                        stc = self.append_storage_class(stc, flag, span);
                    }
                    continue;
                }
                _ => break,
            };
            let span = self.span();
            self.advance();
            stc = self.append_storage_class(stc, flag, span);
        }

        // inferred parameter: bare identifier in a literal parameter list
        let (ty, name) = if tpl.is_some()
            && self.check(TokenKind::Identifier)
            && matches!(
                self.peek_kind(1),
                TokenKind::Comma
                    | TokenKind::RightParen
                    | TokenKind::DotDotDot
                    | TokenKind::Assign
            ) {
            let name = self.cursor.ident();
            let span = self.span();
            self.advance();
            let (ty, tparam) = self.synthesize_lambda_type(span);
            if let Some(tpl) = tpl {
                tpl.push(tparam);
            }
            (Some(ty), name)
        } else {
            let base = self.parse_type();
            let ty = self.parse_type_suffixes(base);
            let name = if self.check(TokenKind::Identifier) {
                let name = self.cursor.ident();
                self.advance();
                name
            } else {
                None
            };
            (Some(ty), name)
        };

        let default = if self.eat(TokenKind::Assign) {
            Some(self.parse_assign_expr())
        } else {
            None
        };

        if self.check(TokenKind::DotDotDot) {
            if stc.intersects(StorageClass::OUT.with(StorageClass::REF)) {
                self.error_here("variadic argument cannot be `out` or `ref`");
            }
            self.advance();
            *varargs = VarArg::Typesafe;
        }

        let udas = if udas.is_empty() {
            None
        } else {
            Some(self.arena.alloc_expr_list(&udas))
        };
        Param {
            stc,
            udas,
            ty,
            name,
            default,
            span: start.merge(self.prev_span()),
        }
    }

    // --- Initializers ---

    /// The three-way initializer disambiguation.
    pub(crate) fn parse_initializer(&mut self) -> InitId {
        let start = self.span();
        match self.kind() {
            TokenKind::Void
                if matches!(
                    self.peek_kind(1),
                    TokenKind::Semicolon | TokenKind::Comma
                ) =>
            {
                self.advance();
                self.arena.alloc_init(Initializer {
                    kind: InitKind::Void,
                    span: start,
                })
            }
            TokenKind::LeftBracket if self.bracket_is_array_initializer() => {
                self.parse_array_initializer()
            }
            TokenKind::LeftCurly if !self.brace_is_function_body() => {
                self.parse_struct_initializer()
            }
            _ => {
                let e = self.parse_assign_expr();
                let span = self.expr_span(e);
                self.arena.alloc_init(Initializer {
                    kind: InitKind::Expr(e),
                    span,
                })
            }
        }
    }

    /// `[ ... ]` is an array initializer unless the matching `]` is
    /// followed by something other than `; , ] }`.
    fn bracket_is_array_initializer(&self) -> bool {
        let tokens = self.cursor.tokens();
        match crate::probes::skip_brackets(tokens, self.cursor.position()) {
            Some(past) => matches!(
                tokens.kind(past),
                TokenKind::Semicolon
                    | TokenKind::Comma
                    | TokenKind::RightBracket
                    | TokenKind::RightCurly
                    | TokenKind::Eof
            ),
            None => true,
        }
    }

    /// `{ ... }` is a struct initializer unless a statement keyword (or a
    /// statement-terminating `;`) appears at brace depth 1.
    fn brace_is_function_body(&self) -> bool {
        let tokens = self.cursor.tokens();
        let mut pos = self.cursor.position() + 1;
        let mut depth = 1usize;
        loop {
            let kind = tokens.kind(pos);
            match kind {
                TokenKind::LeftCurly => depth += 1,
                TokenKind::RightCurly => {
                    depth -= 1;
                    if depth == 0 {
                        return false;
                    }
                }
                TokenKind::Eof => return false,
                _ if depth == 1 => {
                    if matches!(
                        kind,
                        TokenKind::Semicolon
                            | TokenKind::If
                            | TokenKind::While
                            | TokenKind::Do
                            | TokenKind::For
                            | TokenKind::Foreach
                            | TokenKind::ForeachReverse
                            | TokenKind::Switch
                            | TokenKind::Return
                            | TokenKind::Break
                            | TokenKind::Continue
                            | TokenKind::With
                            | TokenKind::Try
                            | TokenKind::Throw
                            | TokenKind::Asm
                            | TokenKind::Synchronized
                            | TokenKind::Goto
                    ) {
                        return true;
                    }
                }
                _ => {}
            }
            pos += 1;
        }
    }

    /// `{ [id :] Initializer, ... }`
    fn parse_struct_initializer(&mut self) -> InitId {
        let open = self.span();
        self.advance(); // {

        let mut fields = Vec::new();
        while !self.check(TokenKind::RightCurly) && !self.is_at_end() {
            let before = self.cursor.position();
            let name = if self.check(TokenKind::Identifier) && self.peek_kind(1) == TokenKind::Colon
            {
                let name = self.cursor.ident();
                self.advance();
                self.advance();
                name
            } else {
                None
            };
            let init = self.parse_initializer();
            fields.push(FieldInit { name, init });

            if self.eat(TokenKind::Comma) {
                continue;
            }
            if !self.check(TokenKind::RightCurly) {
                self.error_here("comma expected separating field initializers");
                if self.cursor.position() == before {
                    self.advance();
                }
            }
        }
        self.expect_closing(TokenKind::RightCurly, TokenKind::LeftCurly, open);

        let span = open.merge(self.prev_span());
        let fields = self.arena.alloc_field_inits(fields);
        self.arena.alloc_init(Initializer {
            kind: InitKind::Struct(fields),
            span,
        })
    }

    /// `[ [expr :] Initializer, ... ]`
    fn parse_array_initializer(&mut self) -> InitId {
        let open = self.span();
        self.advance(); // [
        self.in_brackets += 1;

        let mut entries = Vec::new();
        while !self.check(TokenKind::RightBracket) && !self.is_at_end() {
            let before = self.cursor.position();
            let entry = if self.check(TokenKind::LeftCurly) || self.check(TokenKind::Void) {
                let init = self.parse_initializer();
                ArrayInitEntry { index: None, init }
            } else {
                let e = self.parse_assign_expr();
                if self.eat(TokenKind::Colon) {
                    let init = self.parse_initializer();
                    ArrayInitEntry {
                        index: Some(e),
                        init,
                    }
                } else {
                    let span = self.expr_span(e);
                    let init = self.arena.alloc_init(Initializer {
                        kind: InitKind::Expr(e),
                        span,
                    });
                    ArrayInitEntry { index: None, init }
                }
            };
            entries.push(entry);

            if self.eat(TokenKind::Comma) {
                continue;
            }
            if !self.check(TokenKind::RightBracket) {
                self.error_here("comma expected separating array initializers");
                if self.cursor.position() == before {
                    self.advance();
                }
            }
        }

        self.in_brackets -= 1;
        self.expect_closing(TokenKind::RightBracket, TokenKind::LeftBracket, open);

        let span = open.merge(self.prev_span());
        let entries = self.arena.alloc_array_inits(entries);
        self.arena.alloc_init(Initializer {
            kind: InitKind::Array(entries),
            span,
        })
    }
}
