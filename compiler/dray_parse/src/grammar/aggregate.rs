//! Aggregates, enums, templates, imports, mixins, and conditional
//! compilation declarations.

use crate::attributes::PrefixAttributes;
use crate::Parser;
use dray_ir::ast::{
    AggregateKind, CondArg, CondKind, Decl, DeclId, DeclKind, EnumMember, ImportSelect,
    TemplateParam, TemplateParamKind,
};
use dray_ir::{Name, TokenKind};

impl Parser<'_> {
    /// `struct|union|class|interface [id] [(tparams)] [constraint]
    /// [: bases] ( ; | { members } )`
    pub(crate) fn parse_aggregate(&mut self, doc: Option<Name>) -> DeclId {
        let start = self.span();
        let kind = match self.kind() {
            TokenKind::Struct => AggregateKind::Struct,
            TokenKind::Union => AggregateKind::Union,
            TokenKind::Class => AggregateKind::Class,
            _ => AggregateKind::Interface,
        };
        self.advance();

        let name = if self.check(TokenKind::Identifier) {
            let name = self.cursor.ident();
            self.advance();
            name
        } else {
            None
        };

        let tparams = if self.check(TokenKind::LeftParen) {
            if name.is_none() {
                self.error_here(format!(
                    "anonymous {} cannot have template parameters",
                    kind.display_name()
                ));
            }
            Some(self.parse_template_parameter_list())
        } else {
            None
        };

        let mut constraint = if tparams.is_some() && self.check(TokenKind::If) {
            Some(self.parse_constraint())
        } else {
            None
        };

        let mut bases = Vec::new();
        if self.eat(TokenKind::Colon) {
            if !kind.has_bases() {
                let span = self.prev_span();
                self.error(
                    span,
                    format!("base classes are not allowed for `{}`", kind.display_name()),
                );
            }
            loop {
                bases.push(self.parse_type());
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }

        // the constraint may also follow the base class list
        if constraint.is_none() && tparams.is_some() && self.check(TokenKind::If) {
            constraint = Some(self.parse_constraint());
        }

        let members = match self.kind() {
            TokenKind::Semicolon => {
                self.advance();
                None
            }
            TokenKind::LeftCurly => {
                let open = self.span();
                self.advance();
                let decls = self.parse_decl_defs_until(TokenKind::RightCurly);
                self.expect_closing(TokenKind::RightCurly, TokenKind::LeftCurly, open);
                Some(self.arena.alloc_decl_list(&decls))
            }
            _ => {
                self.error_here(format!(
                    "`{{` or `;` expected following {} declaration, not `{}`",
                    kind.display_name(),
                    self.kind().display_name()
                ));
                self.resync();
                None
            }
        };

        let span = start.merge(self.prev_span());
        let bases = self.arena.alloc_type_list(&bases);
        let mut d = self.arena.alloc_decl(Decl::with_doc(
            DeclKind::Aggregate {
                kind,
                name,
                bases,
                members,
            },
            span,
            doc,
        ));
        if let (Some(name), Some(tps)) = (name, tparams) {
            d = self.wrap_template(name, tps, constraint, d, span);
        }
        d
    }

    // --- Enums ---

    /// Dispatch on `enum`: a proper enum declaration, or `enum` as the
    /// manifest-constant storage class.
    pub(crate) fn parse_enum_or_manifest(&mut self, out: &mut Vec<DeclId>, doc: Option<Name>) {
        let next = self.peek_kind(1);
        let is_enum_decl = match next {
            TokenKind::LeftCurly | TokenKind::Colon => true,
            TokenKind::Identifier => matches!(
                self.peek_kind(2),
                TokenKind::LeftCurly | TokenKind::Colon | TokenKind::Semicolon
            ),
            _ => false,
        };

        if is_enum_decl {
            let d = self.parse_enum(doc);
            out.push(d);
            return;
        }

        // manifest constant: `enum x = 5;` / `enum int x = 5;`
        self.advance(); // enum
        let mut attrs = PrefixAttributes::new(doc);
        attrs.stc = dray_ir::StorageClass::MANIFEST;
        if self.check(TokenKind::Identifier) && self.peek_kind(1) == TokenKind::Assign {
            self.parse_auto_declarations(attrs, out);
        } else {
            self.parse_declarations(attrs, out);
        }
    }

    /// `enum [id] [: memtype] ( ; | { members } )`
    fn parse_enum(&mut self, doc: Option<Name>) -> DeclId {
        let start = self.span();
        self.advance(); // enum

        let name = if self.check(TokenKind::Identifier) {
            let name = self.cursor.ident();
            self.advance();
            name
        } else {
            None
        };

        let memtype = if self.eat(TokenKind::Colon) {
            Some(self.parse_type())
        } else {
            None
        };

        let members = match self.kind() {
            TokenKind::Semicolon => {
                if name.is_none() {
                    self.error_here("anonymous enum declaration must have members");
                }
                self.advance();
                None
            }
            TokenKind::LeftCurly => {
                let open = self.span();
                self.advance();
                let members = self.parse_enum_members();
                self.expect_closing(TokenKind::RightCurly, TokenKind::LeftCurly, open);
                Some(self.arena.alloc_enum_members(members))
            }
            _ => {
                self.error_here(format!(
                    "enum declaration is invalid, found `{}`",
                    self.kind().display_name()
                ));
                self.resync();
                None
            }
        };

        let span = start.merge(self.prev_span());
        self.arena.alloc_decl(Decl::with_doc(
            DeclKind::Enum {
                name,
                memtype,
                members,
            },
            span,
            doc,
        ))
    }

    fn parse_enum_members(&mut self) -> Vec<EnumMember> {
        let mut members = Vec::new();

        while !self.check(TokenKind::RightCurly) && !self.is_at_end() {
            let doc = self.token_doc();
            let start = self.span();

            // `Type id = value` manifest-style member
            let ty = if !(self.check(TokenKind::Identifier)
                && matches!(
                    self.peek_kind(1),
                    TokenKind::Comma | TokenKind::Assign | TokenKind::RightCurly
                )) {
                Some(self.parse_type())
            } else {
                None
            };

            let Some(name) = self.expect_identifier("enum member") else {
                crate::recovery::synchronize(
                    &mut self.cursor,
                    crate::recovery::TokenSet::new()
                        .with(TokenKind::Comma)
                        .with(TokenKind::RightCurly),
                );
                self.eat(TokenKind::Comma);
                continue;
            };

            let value = if self.eat(TokenKind::Assign) {
                Some(self.parse_assign_expr())
            } else {
                None
            };

            members.push(EnumMember {
                name,
                ty,
                value,
                doc,
                span: start.merge(self.prev_span()),
            });

            if self.eat(TokenKind::Comma) {
                continue;
            }
            if !self.check(TokenKind::RightCurly) {
                self.error_here("comma expected separating enum members");
            }
        }
        members
    }

    // --- Templates ---

    /// `[mixin] template id (tparams) [constraint] { members }`
    pub(crate) fn parse_template_decl(&mut self, is_mixin: bool, doc: Option<Name>) -> DeclId {
        let start = self.span();
        self.advance(); // template

        let Some(name) = self.expect_identifier("`template`") else {
            self.resync();
            return self.error_decl(start);
        };

        let tparams = if self.check(TokenKind::LeftParen) {
            self.parse_template_parameter_list()
        } else {
            self.error_here("template parameter list expected following template identifier");
            Vec::new()
        };

        let constraint = if self.check(TokenKind::If) {
            Some(self.parse_constraint())
        } else {
            None
        };

        let members = if self.check(TokenKind::LeftCurly) {
            let open = self.span();
            self.advance();
            let decls = self.parse_decl_defs_until(TokenKind::RightCurly);
            self.expect_closing(TokenKind::RightCurly, TokenKind::LeftCurly, open);
            if decls.is_empty() {
                self.error(open, "template has no members");
            }
            decls
        } else {
            self.error_here("members expected following template declaration");
            self.resync();
            Vec::new()
        };

        let span = start.merge(self.prev_span());
        let tparams = self.arena.alloc_tparams(tparams);
        let members = self.arena.alloc_decl_list(&members);
        self.arena.alloc_decl(Decl::with_doc(
            DeclKind::Template {
                name,
                tparams,
                constraint,
                members,
                is_mixin,
            },
            span,
            doc,
        ))
    }

    /// A parenthesised template parameter list.
    pub(crate) fn parse_template_parameter_list(&mut self) -> Vec<TemplateParam> {
        let open = self.span();
        self.expect(TokenKind::LeftParen);
        let items = self.parse_template_param_items(TokenKind::RightParen);
        self.expect_closing(TokenKind::RightParen, TokenKind::LeftParen, open);
        items
    }

    /// Template parameters up to (not consuming) `close`.
    pub(crate) fn parse_template_param_items(&mut self, close: TokenKind) -> Vec<TemplateParam> {
        let mut items = Vec::new();
        while !self.check(close) && !self.is_at_end() {
            items.push(self.parse_template_param(close));
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        items
    }

    fn parse_template_param(&mut self, close: TokenKind) -> TemplateParam {
        let start = self.span();

        match self.kind() {
            // this T
            TokenKind::This => {
                self.advance();
                let name = self
                    .expect_identifier("`this` template parameter")
                    .unwrap_or_default();
                let spec = if self.eat(TokenKind::Colon) {
                    Some(self.parse_type())
                } else {
                    None
                };
                let default = if self.eat(TokenKind::Assign) {
                    Some(self.parse_type())
                } else {
                    None
                };
                TemplateParam {
                    name,
                    kind: TemplateParamKind::This { spec, default },
                    span: start.merge(self.prev_span()),
                }
            }
            // alias a
            TokenKind::Alias => {
                self.advance();
                let name = self
                    .expect_identifier("`alias` template parameter")
                    .unwrap_or_default();
                let spec = if self.eat(TokenKind::Colon) {
                    Some(self.parse_template_arg())
                } else {
                    None
                };
                let default = if self.eat(TokenKind::Assign) {
                    Some(self.parse_template_arg())
                } else {
                    None
                };
                TemplateParam {
                    name,
                    kind: TemplateParamKind::Alias { spec, default },
                    span: start.merge(self.prev_span()),
                }
            }
            TokenKind::Identifier
                if self.peek_kind(1) == TokenKind::DotDotDot =>
            {
                let name = self.cursor.ident().unwrap_or_default();
                self.advance();
                self.advance();
                TemplateParam {
                    name,
                    kind: TemplateParamKind::Tuple,
                    span: start.merge(self.prev_span()),
                }
            }
            TokenKind::Identifier
                if self.peek_kind(1) == close
                    || matches!(
                        self.peek_kind(1),
                        TokenKind::Comma | TokenKind::Colon | TokenKind::Assign
                    ) =>
            {
                // type parameter
                let name = self.cursor.ident().unwrap_or_default();
                self.advance();
                let spec = if self.eat(TokenKind::Colon) {
                    Some(self.parse_type())
                } else {
                    None
                };
                let default = if self.eat(TokenKind::Assign) {
                    Some(self.parse_type())
                } else {
                    None
                };
                TemplateParam {
                    name,
                    kind: TemplateParamKind::Type { spec, default },
                    span: start.merge(self.prev_span()),
                }
            }
            // value parameter: Type id [: spec] [= default]
            _ => {
                let ty = self.parse_type();
                let name = self
                    .expect_identifier("value template parameter type")
                    .unwrap_or_default();
                let spec = if self.eat(TokenKind::Colon) {
                    Some(self.parse_assign_expr())
                } else {
                    None
                };
                let default = if self.eat(TokenKind::Assign) {
                    Some(self.parse_assign_expr())
                } else {
                    None
                };
                TemplateParam {
                    name,
                    kind: TemplateParamKind::Value { ty, spec, default },
                    span: start.merge(self.prev_span()),
                }
            }
        }
    }

    /// `mixin a.b!(args) [id] ;` — template mixin instantiation.
    pub(crate) fn parse_template_mixin(&mut self, doc: Option<Name>) -> DeclId {
        let start = self.span();
        self.advance(); // mixin

        let leading_dot = self.eat(TokenKind::Dot);
        if !self.check(TokenKind::Identifier) {
            self.error_and_resync(format!(
                "identifier expected following `mixin`, not `{}`",
                self.kind().display_name()
            ));
            return self.error_decl(start);
        }
        let segments = self.parse_type_path_segments();

        let ident = if self.check(TokenKind::Identifier) {
            let name = self.cursor.ident();
            self.advance();
            name
        } else {
            None
        };
        self.expect(TokenKind::Semicolon);

        let span = start.merge(self.prev_span());
        self.arena.alloc_decl(Decl::with_doc(
            DeclKind::TemplateMixin {
                leading_dot,
                segments,
                ident,
            },
            span,
            doc,
        ))
    }

    // --- Imports ---

    /// `import a.b, c = d.e : f, g = h;`
    pub(crate) fn parse_import(&mut self, is_static: bool, out: &mut Vec<DeclId>) {
        let start = self.span();
        let doc = self.token_doc();
        self.advance(); // import

        loop {
            let Some(first) = self.expect_identifier("`import`") else {
                self.resync();
                out.push(self.error_decl(start));
                return;
            };

            let mut alias = None;
            let mut names = vec![first];
            if self.eat(TokenKind::Assign) {
                alias = Some(first);
                names.clear();
                match self.expect_identifier("`=` in import") {
                    Some(name) => names.push(name),
                    None => {
                        self.resync();
                        out.push(self.error_decl(start));
                        return;
                    }
                }
            }
            while self.eat(TokenKind::Dot) {
                match self.expect_identifier("`.` in import") {
                    Some(name) => names.push(name),
                    None => break,
                }
            }

            let mut selects = Vec::new();
            let has_selects = self.check(TokenKind::Colon);
            if self.eat(TokenKind::Colon) {
                loop {
                    let Some(a) = self.expect_identifier("selective import") else {
                        break;
                    };
                    if self.eat(TokenKind::Assign) {
                        match self.expect_identifier("`=` in selective import") {
                            Some(name) => selects.push(ImportSelect {
                                name,
                                alias: Some(a),
                            }),
                            None => break,
                        }
                    } else {
                        selects.push(ImportSelect {
                            name: a,
                            alias: None,
                        });
                    }
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
            }

            let name = names.pop().unwrap_or_default();
            let packages = self.arena.alloc_names(names);
            let selects = self.arena.alloc_import_selects(selects);
            let span = start.merge(self.prev_span());
            out.push(self.arena.alloc_decl(Decl::with_doc(
                DeclKind::Import {
                    is_static,
                    packages,
                    name,
                    alias,
                    selects,
                },
                span,
                doc,
            )));

            if has_selects {
                // selective imports end the import list
                break;
            }
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::Semicolon);
    }

    // --- Conditional compilation ---

    /// `debug [(cond)]` / `version (cond)` declaration with optional else.
    pub(crate) fn parse_conditional_decl(&mut self, kind: CondKind, doc: Option<Name>) -> DeclId {
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
            CondArg::None
        };

        let then_decls = self.parse_block();
        let else_decls = if self.eat(TokenKind::Else) {
            Some(self.parse_block())
        } else {
            None
        };

        let span = start.merge(self.prev_span());
        let then_decls = self.arena.alloc_decl_list(&then_decls);
        let else_decls = else_decls.map(|d| self.arena.alloc_decl_list(&d));
        self.arena.alloc_decl(Decl::with_doc(
            DeclKind::Conditional {
                kind,
                arg,
                then_decls,
                else_decls,
            },
            span,
            doc,
        ))
    }

    /// The argument of a `debug(...)`/`version(...)` condition.
    pub(crate) fn parse_cond_arg(&mut self, kind: CondKind) -> CondArg {
        match self.kind() {
            TokenKind::Identifier => {
                let name = self.cursor.ident().unwrap_or_default();
                self.advance();
                CondArg::Ident(name)
            }
            TokenKind::IntLiteral => {
                let (value, _) = self.cursor.current().int_value().unwrap_or_default();
                self.advance();
                CondArg::Level(value)
            }
            // version(unittest) / version(assert) use reserved words
            TokenKind::Unittest if kind == CondKind::Version => {
                self.advance();
                CondArg::Ident(self.interner.intern("unittest"))
            }
            TokenKind::Assert if kind == CondKind::Version => {
                self.advance();
                CondArg::Ident(self.interner.intern("assert"))
            }
            _ => {
                self.error_here(format!(
                    "identifier or integer expected inside the condition, not `{}`",
                    self.kind().display_name()
                ));
                CondArg::None
            }
        }
    }

    /// `static assert ( cond [, msg] ) ;` — `static` already consumed.
    pub(crate) fn parse_static_assert_decl(&mut self, doc: Option<Name>) -> DeclId {
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
        self.expect(TokenKind::Semicolon);
        let span = start.merge(self.prev_span());
        self.arena
            .alloc_decl(Decl::with_doc(DeclKind::StaticAssert { cond, msg }, span, doc))
    }

    /// `static if ( cond ) decls [else decls]` — `static` already consumed.
    pub(crate) fn parse_static_if_decl(&mut self, doc: Option<Name>) -> DeclId {
        let start = self.span();
        self.advance(); // if
        let open = self.span();
        self.expect(TokenKind::LeftParen);
        let cond = self.parse_expression();
        self.expect_closing(TokenKind::RightParen, TokenKind::LeftParen, open);

        let then_decls = self.parse_block();
        let else_decls = if self.eat(TokenKind::Else) {
            Some(self.parse_block())
        } else {
            None
        };

        let span = start.merge(self.prev_span());
        let then_decls = self.arena.alloc_decl_list(&then_decls);
        let else_decls = else_decls.map(|d| self.arena.alloc_decl_list(&d));
        self.arena.alloc_decl(Decl::with_doc(
            DeclKind::StaticIf {
                cond,
                then_decls,
                else_decls,
            },
            span,
            doc,
        ))
    }

    /// `static foreach (...) { decls }` — `static` already consumed.
    pub(crate) fn parse_static_foreach_decl(&mut self, doc: Option<Name>) -> DeclId {
        let start = self.span();
        let header = self.parse_foreach_header();
        let decls = self.parse_block();
        let span = start.merge(self.prev_span());
        let decls = self.arena.alloc_decl_list(&decls);
        self.arena.alloc_decl(Decl::with_doc(
            DeclKind::StaticForeach { header, decls },
            span,
            doc,
        ))
    }

    /// `pragma ( id [, args] ) ( ; | { decls } | decl )`
    pub(crate) fn parse_pragma_decl(&mut self, doc: Option<Name>) -> DeclId {
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

        let decls = if self.eat(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_block())
        };

        let span = start.merge(self.prev_span());
        let decls = decls.map(|d| self.arena.alloc_decl_list(&d));
        self.arena.alloc_decl(Decl::with_doc(
            DeclKind::Pragma { name, args, decls },
            span,
            doc,
        ))
    }
}
