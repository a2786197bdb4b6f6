//! Module header and the declaration-definition dispatch loop.

use crate::attributes::PrefixAttributes;
use crate::{probes, ParseOutput, Parser};
use dray_ir::ast::{CondArg, CondKind, Decl, DeclId, DeclKind, ExprId, Module, ModuleDecl};
use dray_ir::{Span, TokenKind};

impl<'a> Parser<'a> {
    /// Parse one whole module: optional header, then declaration
    /// definitions until end of file.
    pub(crate) fn run_module(mut self) -> ParseOutput {
        let mut module = Module::new();

        self.parse_module_header(&mut module);

        let mut members = Vec::new();
        while !self.is_at_end() {
            if self.check(TokenKind::RightCurly) {
                self.error_here("unmatched closing `}`");
                self.advance();
                continue;
            }
            self.parse_decl_def(&mut members);
        }
        module.members = members;

        tracing::debug!(
            decls = module.members.len(),
            errors = self.handler.error_count(),
            "module parse finished"
        );

        ParseOutput {
            module,
            arena: self.arena,
        }
    }

    /// `[deprecated(msg)] [@udas] module a.b.c;`
    ///
    /// Leading attributes count as module attributes only when a `module`
    /// keyword actually follows them; otherwise they belong to the first
    /// declaration.
    fn parse_module_header(&mut self, module: &mut Module) {
        let attrs_belong_to_module = match self.kind() {
            TokenKind::Module => true,
            TokenKind::At | TokenKind::Deprecated => {
                match probes::skip_attributes(self.cursor.tokens(), self.cursor.position()) {
                    Some(past) => self.cursor.tokens().kind(past) == TokenKind::Module,
                    None => false,
                }
            }
            _ => false,
        };
        if !attrs_belong_to_module {
            return;
        }

        let doc = self.token_doc();
        let start = self.span();
        let mut udas: Vec<ExprId> = Vec::new();

        while !self.check(TokenKind::Module) {
            match self.kind() {
                TokenKind::At => {
                    let flag = self.parse_at_attribute(&mut udas);
                    if !flag.is_empty() {
                        let span = self.prev_span();
                        self.error(
                            span,
                            "predefined attributes are not supported on `module` declarations",
                        );
                    }
                }
                TokenKind::Deprecated => {
                    self.advance();
                    if self.check(TokenKind::LeftParen) {
                        let open = self.span();
                        self.advance();
                        self.parse_assign_expr();
                        self.expect_closing(TokenKind::RightParen, TokenKind::LeftParen, open);
                    }
                }
                _ => break,
            }
        }

        self.advance(); // module
        let mut names = Vec::new();
        loop {
            match self.expect_identifier("`module`") {
                Some(name) => names.push(name),
                None => {
                    self.resync();
                    return;
                }
            }
            if !self.eat(TokenKind::Dot) {
                break;
            }
        }
        self.expect(TokenKind::Semicolon);

        let name = names.pop().unwrap_or_default();
        let packages = self.arena.alloc_names(names);
        module.decl = Some(ModuleDecl {
            packages,
            name,
            span: start.merge(self.prev_span()),
            doc,
        });
        if !udas.is_empty() {
            module.attributes = Some(self.arena.alloc_expr_list(&udas));
        }
    }

    /// Declaration definitions until `terminator` (not consumed).
    pub(crate) fn parse_decl_defs_until(&mut self, terminator: TokenKind) -> Vec<DeclId> {
        let mut decls = Vec::new();
        while !self.check(terminator) && !self.is_at_end() {
            self.parse_decl_def(&mut decls);
        }
        decls
    }

    /// Parse one declaration definition, pushing the resulting symbols
    /// (a shared-base-type declaration yields several).
    pub(crate) fn parse_decl_def(&mut self, out: &mut Vec<DeclId>) {
        let doc = self.token_doc();
        let start = self.span();

        match self.kind() {
            TokenKind::Semicolon => {
                self.advance();
            }
            TokenKind::Enum => self.parse_enum_or_manifest(out, doc),
            TokenKind::Import => {
                self.parse_import(false, out);
            }
            TokenKind::Template => {
                let d = self.parse_template_decl(false, doc);
                out.push(d);
            }
            TokenKind::Mixin => match self.peek_kind(1) {
                TokenKind::Template => {
                    self.advance(); // mixin
                    let d = self.parse_template_decl(true, doc);
                    out.push(d);
                }
                TokenKind::LeftParen => {
                    self.advance(); // mixin
                    let open = self.span();
                    self.advance(); // (
                    let args = self.parse_argument_list(TokenKind::RightParen);
                    self.expect_closing(TokenKind::RightParen, TokenKind::LeftParen, open);
                    self.expect(TokenKind::Semicolon);
                    let span = start.merge(self.prev_span());
                    out.push(
                        self.arena
                            .alloc_decl(Decl::with_doc(DeclKind::MixinDecl { args }, span, doc)),
                    );
                }
                _ => {
                    let d = self.parse_template_mixin(doc);
                    out.push(d);
                }
            },
            TokenKind::Struct | TokenKind::Union | TokenKind::Class | TokenKind::Interface => {
                let d = self.parse_aggregate(doc);
                out.push(d);
            }
            TokenKind::This => {
                let d = self.parse_ctor(PrefixAttributes::new(doc));
                out.push(d);
            }
            TokenKind::Tilde if self.peek_kind(1) == TokenKind::This => {
                let d = self.parse_dtor(PrefixAttributes::new(doc));
                out.push(d);
            }
            TokenKind::Invariant => {
                let d = self.parse_invariant(doc);
                out.push(d);
            }
            TokenKind::Unittest => {
                let d = self.parse_unittest(doc);
                out.push(d);
            }
            TokenKind::New if self.peek_kind(1) == TokenKind::LeftParen => {
                let d = self.parse_class_allocator(doc);
                out.push(d);
            }
            TokenKind::Static => match self.peek_kind(1) {
                TokenKind::This => {
                    let d = self.parse_static_ctor(false, doc);
                    out.push(d);
                }
                TokenKind::Tilde if self.peek_kind(2) == TokenKind::This => {
                    let d = self.parse_static_dtor(false, doc);
                    out.push(d);
                }
                TokenKind::Assert => {
                    self.advance(); // static
                    let d = self.parse_static_assert_decl(doc);
                    out.push(d);
                }
                TokenKind::If => {
                    self.advance(); // static
                    let d = self.parse_static_if_decl(doc);
                    out.push(d);
                }
                TokenKind::Foreach | TokenKind::ForeachReverse => {
                    self.advance(); // static
                    let d = self.parse_static_foreach_decl(doc);
                    out.push(d);
                }
                TokenKind::Import => {
                    self.advance(); // static
                    self.parse_import(true, out);
                }
                _ => self.parse_attributed_declaration(doc, out),
            },
            TokenKind::Shared
                if self.peek_kind(1) == TokenKind::Static
                    && matches!(self.peek_kind(2), TokenKind::This | TokenKind::Tilde) =>
            {
                let d = if self.peek_kind(2) == TokenKind::This {
                    self.parse_static_ctor(true, doc)
                } else {
                    self.parse_static_dtor(true, doc)
                };
                out.push(d);
            }
            TokenKind::Extern if self.peek_kind(1) == TokenKind::LeftParen => {
                let d = self.parse_linkage_decl(doc);
                out.push(d);
            }
            TokenKind::Private
            | TokenKind::Package
            | TokenKind::Protected
            | TokenKind::Public
            | TokenKind::Export => {
                let (prot, pkg) = self.parse_protection();
                let decls = self.parse_block();
                let pkg = self.arena.alloc_names(pkg);
                let decls = self.arena.alloc_decl_list(&decls);
                let span = start.merge(self.prev_span());
                out.push(self.arena.alloc_decl(Decl::with_doc(
                    DeclKind::ProtectionDecl { prot, pkg, decls },
                    span,
                    doc,
                )));
            }
            TokenKind::Align => {
                let alignment = self.parse_align();
                let decls = self.parse_block();
                let decls = self.arena.alloc_decl_list(&decls);
                let span = start.merge(self.prev_span());
                out.push(self.arena.alloc_decl(Decl::with_doc(
                    DeclKind::AlignDecl { alignment, decls },
                    span,
                    doc,
                )));
            }
            TokenKind::Pragma => {
                let d = self.parse_pragma_decl(doc);
                out.push(d);
            }
            TokenKind::Debug => {
                if self.peek_kind(1) == TokenKind::Assign {
                    let d = self.parse_cond_symbol(CondKind::Debug, doc);
                    out.push(d);
                } else {
                    let d = self.parse_conditional_decl(CondKind::Debug, doc);
                    out.push(d);
                }
            }
            TokenKind::Version => {
                if self.peek_kind(1) == TokenKind::Assign {
                    let d = self.parse_cond_symbol(CondKind::Version, doc);
                    out.push(d);
                } else {
                    let d = self.parse_conditional_decl(CondKind::Version, doc);
                    out.push(d);
                }
            }
            TokenKind::LeftBracket => {
                // legacy [attribute] sugar
                self.error_here("use `@(attributes)` instead of `[attributes]`");
                let open = self.span();
                self.advance();
                let args = self.parse_argument_list(TokenKind::RightBracket);
                self.expect_closing(TokenKind::RightBracket, TokenKind::LeftBracket, open);
                let mut inner = Vec::new();
                self.parse_decl_def(&mut inner);
                let decls = self.arena.alloc_decl_list(&inner);
                let span = start.merge(self.prev_span());
                out.push(self.arena.alloc_decl(Decl::with_doc(
                    DeclKind::UserAttributeDecl { attrs: args, decls },
                    span,
                    doc,
                )));
            }
            TokenKind::Module => {
                self.error_and_resync("`module` declaration must be first in a source file");
                out.push(self.error_decl(start));
            }
            TokenKind::Eof | TokenKind::RightCurly => {}
            kind if self.starts_declaration(kind) => {
                self.parse_attributed_declaration(doc, out);
            }
            kind => {
                self.error_and_resync(format!(
                    "declaration expected, not `{}`",
                    kind.display_name()
                ));
                out.push(self.error_decl(start));
            }
        }
    }

    /// Can `kind` start an (attributed) declaration?
    fn starts_declaration(&self, kind: TokenKind) -> bool {
        kind.is_basic_type()
            || self.storage_class_of(kind).is_some()
            || matches!(
                kind,
                TokenKind::Identifier
                    | TokenKind::Dot
                    | TokenKind::Typeof
                    | TokenKind::Vector
                    | TokenKind::Traits
                    | TokenKind::Alias
                    | TokenKind::At
                    | TokenKind::Deprecated
            )
    }

    /// Storage classes / UDAs / `deprecated` prefix, then the declaration
    /// they attribute.
    fn parse_attributed_declaration(&mut self, doc: Option<dray_ir::Name>, out: &mut Vec<DeclId>) {
        let start = self.span();
        let mut attrs = PrefixAttributes::new(doc);
        let had_attrs = self.parse_storage_classes(&mut attrs);

        match self.kind() {
            // attribute block or colon form
            TokenKind::LeftCurly | TokenKind::Colon if had_attrs => {
                let decls = self.parse_block();
                let decls = self.arena.alloc_decl_list(&decls);
                let span = start.merge(self.prev_span());
                let wrapper = self.arena.alloc_decl(Decl::with_doc(
                    DeclKind::StorageClassDecl {
                        stc: attrs.stc,
                        decls,
                    },
                    span,
                    attrs.doc,
                ));
                let wrapped = self.apply_uda_wrappers(attrs, vec![wrapper], span);
                out.extend(wrapped);
            }
            // auto declaration: `stc x = init` or `stc x(T) = init`
            TokenKind::Identifier if had_attrs && self.is_auto_decl_start() => {
                self.parse_auto_declarations(attrs, out);
            }
            TokenKind::This => {
                let d = self.parse_ctor(attrs);
                out.push(d);
            }
            TokenKind::Tilde if self.peek_kind(1) == TokenKind::This => {
                let d = self.parse_dtor(attrs);
                out.push(d);
            }
            // attribute applied to a structural declaration
            TokenKind::Struct
            | TokenKind::Union
            | TokenKind::Class
            | TokenKind::Interface
            | TokenKind::Enum
            | TokenKind::Template
            | TokenKind::Mixin
            | TokenKind::Import
            | TokenKind::Unittest
            | TokenKind::Invariant
            | TokenKind::Extern
            | TokenKind::Align
            | TokenKind::Pragma
            | TokenKind::Private
            | TokenKind::Package
            | TokenKind::Protected
            | TokenKind::Public
            | TokenKind::Export
            | TokenKind::Debug
            | TokenKind::Version
            | TokenKind::Static
                if had_attrs =>
            {
                let mut inner = Vec::new();
                self.parse_decl_def(&mut inner);
                let span = start.merge(self.prev_span());
                let wrapped = self.wrap_with_attributes(attrs, inner, span);
                out.extend(wrapped);
            }
            _ => {
                self.parse_declarations(attrs, out);
            }
        }
    }

    /// `identifier =` or `identifier ( ... ) =` after attributes commits
    /// to the auto-declaration form.
    fn is_auto_decl_start(&self) -> bool {
        if self.peek_kind(1) == TokenKind::Assign {
            return true;
        }
        if self.peek_kind(1) == TokenKind::LeftParen {
            let tokens = self.cursor.tokens();
            if let Some(past) = probes::skip_parens(tokens, self.cursor.position() + 1) {
                return tokens.kind(past) == TokenKind::Assign;
            }
        }
        false
    }

    /// `extern(...)` declaration with scoped linkage state.
    fn parse_linkage_decl(&mut self, doc: Option<dray_ir::Name>) -> DeclId {
        let start = self.span();
        let (linkage, cpp_mangle, namespaces) = self.parse_linkage();

        let saved = self.linkage;
        self.linkage = linkage;
        let decls = self.parse_block();
        self.linkage = saved;

        let decls = self.arena.alloc_decl_list(&decls);
        let span = start.merge(self.prev_span());
        self.arena.alloc_decl(Decl::with_doc(
            DeclKind::LinkageDecl {
                linkage,
                cpp_mangle,
                namespaces,
                decls,
            },
            span,
            doc,
        ))
    }

    /// The three attribute block forms: `{ decls }`, `: decls-to-scope-end`,
    /// or a single declaration.
    pub(crate) fn parse_block(&mut self) -> Vec<DeclId> {
        match self.kind() {
            TokenKind::LeftCurly => {
                let open = self.span();
                self.advance();
                let decls = self.parse_decl_defs_until(TokenKind::RightCurly);
                self.expect_closing(TokenKind::RightCurly, TokenKind::LeftCurly, open);
                decls
            }
            TokenKind::Colon => {
                self.advance();
                self.parse_decl_defs_until(TokenKind::RightCurly)
            }
            TokenKind::Semicolon => {
                self.error_here("declaration expected following attribute, not `;`");
                self.advance();
                Vec::new()
            }
            TokenKind::Eof => {
                self.error_here("declaration expected following attribute, not end of file");
                Vec::new()
            }
            _ => {
                let mut decls = Vec::new();
                self.parse_decl_def(&mut decls);
                decls
            }
        }
    }

    /// Wrap declarations in `deprecated(msg)` / UDA wrappers collected in
    /// the prefix run. Later-parsed attributes wrap outermost.
    pub(crate) fn wrap_with_attributes(
        &mut self,
        attrs: PrefixAttributes,
        decls: Vec<DeclId>,
        span: Span,
    ) -> Vec<DeclId> {
        let mut decls = decls;
        if !attrs.stc.is_empty() {
            let range = self.arena.alloc_decl_list(&decls);
            decls = vec![self.arena.alloc_decl(Decl::with_doc(
                DeclKind::StorageClassDecl {
                    stc: attrs.stc,
                    decls: range,
                },
                span,
                attrs.doc,
            ))];
        }
        self.apply_uda_wrappers(attrs, decls, span)
    }

    /// Apply the deprecated-message and UDA wrappers only (storage classes
    /// already baked into the inner declarations).
    pub(crate) fn apply_uda_wrappers(
        &mut self,
        attrs: PrefixAttributes,
        decls: Vec<DeclId>,
        span: Span,
    ) -> Vec<DeclId> {
        let mut decls = decls;
        if let Some(msg) = attrs.deprecated_msg {
            let range = self.arena.alloc_decl_list(&decls);
            decls = vec![self.arena.alloc_decl(Decl::new(
                DeclKind::DeprecatedDecl {
                    msg: Some(msg),
                    decls: range,
                },
                span,
            ))];
        }
        if !attrs.udas.is_empty() {
            let uda_range = self.arena.alloc_expr_list(&attrs.udas);
            let range = self.arena.alloc_decl_list(&decls);
            decls = vec![self.arena.alloc_decl(Decl::new(
                DeclKind::UserAttributeDecl {
                    attrs: uda_range,
                    decls: range,
                },
                span,
            ))];
        }
        decls
    }

    /// `debug = id;` / `version = 2;`
    fn parse_cond_symbol(&mut self, kind: CondKind, doc: Option<dray_ir::Name>) -> DeclId {
        let start = self.span();
        self.advance(); // debug / version
        self.advance(); // =

        let arg = match self.kind() {
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
            _ => {
                self.error_here("identifier or integer expected");
                CondArg::None
            }
        };
        self.expect(TokenKind::Semicolon);
        let span = start.merge(self.prev_span());
        self.arena
            .alloc_decl(Decl::with_doc(DeclKind::CondSymbol { kind, arg }, span, doc))
    }
}
