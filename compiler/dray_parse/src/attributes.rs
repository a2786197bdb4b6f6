//! Attribute prefix handling.
//!
//! Storage classes, `@` attributes, `deprecated(...)` messages, linkage,
//! protection, and alignment. The prefix bundle is built by value while a
//! run of attributed declarations is parsed; each branch consumes what it
//! recognises and the caller folds the residual into wrapper declarations.

use crate::Parser;
use dray_ir::ast::{Expr, ExprId, ExprKind};
use dray_ir::{CppMangle, Linkage, Name, Protection, Span, StorageClass, TokenKind};

/// Attributes collected in front of a declaration.
#[derive(Default)]
pub struct PrefixAttributes {
    pub stc: StorageClass,
    /// Message of `deprecated("...")`; plain `deprecated` only sets the bit.
    pub deprecated_msg: Option<ExprId>,
    pub udas: Vec<ExprId>,
    /// Doc comment of the first token of the run; attaches to the declared
    /// symbol.
    pub doc: Option<Name>,
}

impl PrefixAttributes {
    pub fn new(doc: Option<Name>) -> Self {
        PrefixAttributes {
            doc,
            ..PrefixAttributes::default()
        }
    }
}

impl Parser<'_> {
    /// Add `flag` to `stc`, diagnosing redundancy and exclusive-group
    /// conflicts. The returned set is the union even when conflicting;
    /// consumers treat the first-seen group member as authoritative.
    pub(crate) fn append_storage_class(
        &mut self,
        stc: StorageClass,
        flag: StorageClass,
        span: Span,
    ) -> StorageClass {
        if stc.intersects(flag) {
            self.error(
                span,
                format!("redundant attribute `{}`", StorageClass::flag_name(flag)),
            );
            return stc.with(flag);
        }

        // `in` combined with `const` or `scope` (legacy-compat rule)
        let const_or_scope = StorageClass::CONST.with(StorageClass::SCOPE);
        if (flag == StorageClass::IN && stc.intersects(const_or_scope))
            || (stc.intersects(StorageClass::IN)
                && (flag == StorageClass::CONST || flag == StorageClass::SCOPE))
        {
            self.error(
                span,
                "attribute `in` cannot be combined with `const` or `scope`".to_string(),
            );
        }

        let both = stc.with(flag);
        for group in [
            StorageClass::GROUP_MUTABILITY,
            StorageClass::GROUP_GLOBAL,
            StorageClass::GROUP_SAFETY,
        ] {
            if flag.intersects(group) && both.intersection(group).count() > 1 {
                self.error(
                    span,
                    format!(
                        "conflicting attribute `{}`",
                        StorageClass::flag_name(flag)
                    ),
                );
            }
        }
        both
    }

    /// Map a plain storage-class keyword to its flag. Context-dependent
    /// tokens (`const(`, `extern(`, `static this`, ...) are resolved by the
    /// callers before this mapping applies.
    pub(crate) fn storage_class_of(&self, kind: TokenKind) -> Option<StorageClass> {
        Some(match kind {
            TokenKind::Const => StorageClass::CONST,
            TokenKind::Immutable => StorageClass::IMMUTABLE,
            TokenKind::Shared => StorageClass::SHARED,
            TokenKind::Inout => StorageClass::WILD,
            TokenKind::Static => StorageClass::STATIC,
            TokenKind::Final => StorageClass::FINAL,
            TokenKind::Auto => StorageClass::AUTO,
            TokenKind::Scope => StorageClass::SCOPE,
            TokenKind::Override => StorageClass::OVERRIDE,
            TokenKind::Abstract => StorageClass::ABSTRACT,
            TokenKind::Synchronized => StorageClass::SYNCHRONIZED,
            TokenKind::Nothrow => StorageClass::NOTHROW,
            TokenKind::Pure => StorageClass::PURE,
            TokenKind::Ref => StorageClass::REF,
            TokenKind::Gshared => StorageClass::GSHARED,
            TokenKind::Extern => StorageClass::EXTERN,
            _ => return None,
        })
    }

    /// Collect a run of storage classes, `@` attributes, and `deprecated`
    /// into `attrs`. Stops at the first token that opens something else
    /// (`const(`, `extern(`, a type, `{`, ...). Returns whether anything
    /// was consumed.
    pub(crate) fn parse_storage_classes(&mut self, attrs: &mut PrefixAttributes) -> bool {
        let mut any = false;
        loop {
            let kind = self.kind();
            match kind {
                // type constructor with parens belongs to the type
                TokenKind::Const | TokenKind::Immutable | TokenKind::Shared | TokenKind::Inout
                    if self.peek_kind(1) == TokenKind::LeftParen =>
                {
                    break;
                }
                // linkage attribute, parsed by the declaration dispatch
                TokenKind::Extern if self.peek_kind(1) == TokenKind::LeftParen => break,
                TokenKind::At => {
                    let flag = self.parse_at_attribute(&mut attrs.udas);
                    if !flag.is_empty() {
                        let span = self.prev_span();
                        attrs.stc = self.append_storage_class(attrs.stc, flag, span);
                    }
                    any = true;
                }
                TokenKind::Deprecated => {
                    let span = self.span();
                    self.advance();
                    attrs.stc =
                        self.append_storage_class(attrs.stc, StorageClass::DEPRECATED, span);
                    if self.check(TokenKind::LeftParen) {
                        if attrs.deprecated_msg.is_some() {
                            self.error_here("conflicting storage class `deprecated`");
                        }
                        let open = self.span();
                        self.advance();
                        let msg = self.parse_assign_expr();
                        self.expect_closing(TokenKind::RightParen, TokenKind::LeftParen, open);
                        attrs.deprecated_msg = Some(msg);
                    }
                    any = true;
                }
                _ => match self.storage_class_of(kind) {
                    Some(flag) => {
                        let span = self.span();
                        self.advance();
                        attrs.stc = self.append_storage_class(attrs.stc, flag, span);
                        any = true;
                    }
                    None => break,
                },
            }
        }
        any
    }

    /// Parse one `@` attribute. Predefined attributes yield a storage-class
    /// flag; anything else is a UDA expression pushed to `udas`.
    pub(crate) fn parse_at_attribute(&mut self, udas: &mut Vec<ExprId>) -> StorageClass {
        let at_span = self.span();
        self.advance(); // @

        match self.kind() {
            TokenKind::Identifier => {
                let name = self.cursor.ident().unwrap_or_default();
                if let Some(flag) = self.predefined_attribute(name) {
                    self.advance();
                    return flag;
                }
                let uda = self.parse_uda_expression(at_span);
                udas.push(uda);
                StorageClass::NONE
            }
            TokenKind::LeftParen => {
                // @(arg, arg) attaches every argument
                let open = self.span();
                self.advance();
                if self.check(TokenKind::RightParen) {
                    self.error_here("empty attribute list is not allowed");
                }
                while !self.check(TokenKind::RightParen) && !self.is_at_end() {
                    let e = self.parse_assign_expr();
                    udas.push(e);
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
                self.expect_closing(TokenKind::RightParen, TokenKind::LeftParen, open);
                StorageClass::NONE
            }
            _ => {
                self.error(
                    at_span,
                    format!(
                        "`@` must be followed by an identifier or `(`, not `{}`",
                        self.kind().display_name()
                    ),
                );
                StorageClass::NONE
            }
        }
    }

    fn predefined_attribute(&self, name: Name) -> Option<StorageClass> {
        Some(match self.lookup(name) {
            "safe" => StorageClass::SAFE,
            "trusted" => StorageClass::TRUSTED,
            "system" => StorageClass::SYSTEM,
            "live" => StorageClass::LIVE,
            "nogc" => StorageClass::NOGC,
            "property" => StorageClass::PROPERTY,
            "disable" => StorageClass::DISABLE,
            "future" => StorageClass::FUTURE,
            _ => return None,
        })
    }

    /// `@id`, `@id!arg`, `@id!(args)`, each optionally followed by `(args)`.
    fn parse_uda_expression(&mut self, at_span: Span) -> ExprId {
        let name = self.cursor.ident().unwrap_or_default();
        let ident_span = self.span();
        self.advance();

        let mut base = if self.check(TokenKind::Not) {
            let tiargs = self.parse_template_args();
            let span = at_span.merge(self.prev_span());
            self.arena
                .alloc_expr(Expr::new(ExprKind::TemplateInstance { name, tiargs }, span))
        } else {
            self.arena.alloc_expr(Expr::new(
                ExprKind::Ident(name),
                at_span.merge(ident_span),
            ))
        };

        if self.check(TokenKind::LeftParen) {
            let open = self.span();
            self.advance();
            let args = self.parse_argument_list(TokenKind::RightParen);
            self.expect_closing(TokenKind::RightParen, TokenKind::LeftParen, open);
            let span = at_span.merge(self.prev_span());
            base = self
                .arena
                .alloc_expr(Expr::new(ExprKind::Call { callee: base, args }, span));
        }
        base
    }

    /// Parse the parenthesised part of `extern(...)`. The cursor sits on
    /// `extern`; the caller verified the `(`.
    pub(crate) fn parse_linkage(&mut self) -> (Linkage, CppMangle, Option<dray_ir::ast::ExprRange>) {
        self.advance(); // extern
        let open = self.span();
        self.advance(); // (

        let mut cpp_mangle = CppMangle::Default;
        let mut namespaces = None;

        let linkage = match self.cursor.ident() {
            Some(name) => {
                let text = self.lookup(name);
                match text {
                    "D" => {
                        self.advance();
                        Linkage::D
                    }
                    "C" => {
                        self.advance();
                        if self.eat(TokenKind::PlusPlus) {
                            if self.eat(TokenKind::Comma) {
                                match self.kind() {
                                    TokenKind::Struct => {
                                        self.advance();
                                        cpp_mangle = CppMangle::AsStruct;
                                    }
                                    TokenKind::Class => {
                                        self.advance();
                                        cpp_mangle = CppMangle::AsClass;
                                    }
                                    _ => namespaces = Some(self.parse_cpp_namespaces()),
                                }
                            }
                            Linkage::Cpp
                        } else {
                            Linkage::C
                        }
                    }
                    "Windows" => {
                        self.advance();
                        Linkage::Windows
                    }
                    "Pascal" => {
                        self.advance();
                        Linkage::Pascal
                    }
                    "System" => {
                        self.advance();
                        Linkage::System
                    }
                    "Objective" => {
                        self.advance();
                        if self.eat(TokenKind::Min) && self.eat(TokenKind::Identifier) {
                            Linkage::ObjectiveC
                        } else {
                            self.error_here("expected `C` following `Objective-`");
                            Linkage::Default
                        }
                    }
                    _ => {
                        self.error_here(format!("unrecognized linkage `{text}`"));
                        self.advance();
                        Linkage::Default
                    }
                }
            }
            None => {
                self.error_here("linkage identifier expected following `extern(`");
                Linkage::Default
            }
        };

        self.expect_closing(TokenKind::RightParen, TokenKind::LeftParen, open);
        (linkage, cpp_mangle, namespaces)
    }

    /// `extern(C++, a.b.c)` identifier list or `extern(C++, (exprs))`.
    fn parse_cpp_namespaces(&mut self) -> dray_ir::ast::ExprRange {
        let mut parts = Vec::new();
        if self.check(TokenKind::LeftParen) {
            let open = self.span();
            self.advance();
            while !self.check(TokenKind::RightParen) && !self.is_at_end() {
                parts.push(self.parse_assign_expr());
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            self.expect_closing(TokenKind::RightParen, TokenKind::LeftParen, open);
        } else {
            loop {
                let span = self.span();
                match self.expect_identifier("`extern(C++, ...)` namespace") {
                    Some(name) => {
                        parts.push(
                            self.arena
                                .alloc_expr(Expr::new(ExprKind::Ident(name), span)),
                        );
                    }
                    None => break,
                }
                if !self.eat(TokenKind::Dot) {
                    break;
                }
            }
        }
        self.arena.alloc_expr_list(&parts)
    }

    /// Protection keyword, with the optional `package(a.b)` path.
    pub(crate) fn parse_protection(&mut self) -> (Protection, Vec<Name>) {
        let prot = match self.kind() {
            TokenKind::Private => Protection::Private,
            TokenKind::Package => Protection::Package,
            TokenKind::Protected => Protection::Protected,
            TokenKind::Public => Protection::Public,
            TokenKind::Export => Protection::Export,
            _ => Protection::Undefined,
        };
        self.advance();

        let mut pkg = Vec::new();
        if prot == Protection::Package && self.check(TokenKind::LeftParen) {
            let open = self.span();
            self.advance();
            loop {
                match self.expect_identifier("`package(`") {
                    Some(name) => pkg.push(name),
                    None => break,
                }
                if !self.eat(TokenKind::Dot) {
                    break;
                }
            }
            self.expect_closing(TokenKind::RightParen, TokenKind::LeftParen, open);
        }
        (prot, pkg)
    }

    /// `align` with an optional `(expr)`.
    pub(crate) fn parse_align(&mut self) -> Option<ExprId> {
        self.advance(); // align
        if self.check(TokenKind::LeftParen) {
            let open = self.span();
            self.advance();
            let e = self.parse_assign_expr();
            self.expect_closing(TokenKind::RightParen, TokenKind::LeftParen, open);
            Some(e)
        } else {
            None
        }
    }
}
