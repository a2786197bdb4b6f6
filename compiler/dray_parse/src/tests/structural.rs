//! Structural round-trip tests.
//!
//! `TreeDump` renders a parse tree with spans and parenthesisation marks
//! stripped, so two spellings of the same program — different whitespace,
//! non-doc comments, redundant parentheses, reordered non-conflicting
//! modifiers — must produce identical dumps. The tests below parse
//! equivalent sources through one shared interner and compare the dumps.

use dray_diagnostic::CollectHandler;
use dray_ir::ast::*;
use dray_ir::{AstArena, Name, StringInterner};

/// Span-insensitive renderer for one parsed tree.
pub(crate) struct TreeDump<'a> {
    arena: &'a AstArena,
    interner: &'a StringInterner,
}

impl<'a> TreeDump<'a> {
    pub(crate) fn new(arena: &'a AstArena, interner: &'a StringInterner) -> Self {
        TreeDump { arena, interner }
    }

    fn name(&self, name: Name) -> &'a str {
        self.interner.lookup(name)
    }

    fn opt_name(&self, name: Option<Name>) -> String {
        match name {
            Some(name) => self.name(name).to_string(),
            None => "-".to_string(),
        }
    }

    fn opt_doc(&self, doc: Option<Name>) -> String {
        match doc {
            Some(doc) => format!(" doc={:?}", self.name(doc)),
            None => String::new(),
        }
    }

    pub(crate) fn module(&self, module: &Module) -> String {
        let mut parts = Vec::new();
        if let Some(m) = module.decl {
            let mut path: Vec<&str> = self
                .arena
                .names(m.packages)
                .iter()
                .map(|&n| self.name(n))
                .collect();
            path.push(self.name(m.name));
            parts.push(format!("(module {}{})", path.join("."), self.opt_doc(m.doc)));
        }
        if let Some(attrs) = module.attributes {
            parts.push(format!("(module-attrs {})", self.exprs(attrs)));
        }
        for &d in &module.members {
            parts.push(self.decl(d));
        }
        parts.join("\n")
    }

    // --- Ranges ---

    fn decls(&self, range: DeclRange) -> String {
        self.arena
            .decl_list(range)
            .iter()
            .map(|&d| self.decl(d))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn opt_decls(&self, range: Option<DeclRange>) -> String {
        match range {
            Some(range) => format!("[{}]", self.decls(range)),
            None => "-".to_string(),
        }
    }

    fn exprs(&self, range: ExprRange) -> String {
        self.arena
            .expr_list(range)
            .iter()
            .map(|&e| self.expr(e))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn stmts(&self, range: StmtRange) -> String {
        self.arena
            .stmt_list(range)
            .iter()
            .map(|&s| self.stmt(s))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn types(&self, range: TypeRange) -> String {
        self.arena
            .type_list(range)
            .iter()
            .map(|&t| self.ty(t))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn opt_expr(&self, e: Option<ExprId>) -> String {
        match e {
            Some(e) => self.expr(e),
            None => "-".to_string(),
        }
    }

    fn opt_type(&self, t: Option<TypeId>) -> String {
        match t {
            Some(t) => self.ty(t),
            None => "-".to_string(),
        }
    }

    fn opt_stmt(&self, s: Option<StmtId>) -> String {
        match s {
            Some(s) => self.stmt(s),
            None => "-".to_string(),
        }
    }

    fn params(&self, range: ParamRange) -> String {
        self.arena
            .params(range)
            .iter()
            .map(|p| self.param(p))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn param(&self, p: &Param) -> String {
        let udas = match p.udas {
            Some(range) => format!("[{}]", self.exprs(range)),
            None => "-".to_string(),
        };
        format!(
            "(param {:?} {} {} {} {})",
            p.stc,
            udas,
            self.opt_type(p.ty),
            self.opt_name(p.name),
            self.opt_expr(p.default)
        )
    }

    fn tparams(&self, range: TemplateParamRange) -> String {
        self.arena
            .tparams(range)
            .iter()
            .map(|tp| self.tparam(tp))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn tparam(&self, tp: &TemplateParam) -> String {
        let kind = match tp.kind {
            TemplateParamKind::Type { spec, default } => {
                format!("type {} {}", self.opt_type(spec), self.opt_type(default))
            }
            TemplateParamKind::Value { ty, spec, default } => format!(
                "value {} {} {}",
                self.ty(ty),
                self.opt_expr(spec),
                self.opt_expr(default)
            ),
            TemplateParamKind::Alias { spec, default } => {
                format!("alias {} {}", self.opt_tiarg(spec), self.opt_tiarg(default))
            }
            TemplateParamKind::Tuple => "tuple".to_string(),
            TemplateParamKind::This { spec, default } => {
                format!("this {} {}", self.opt_type(spec), self.opt_type(default))
            }
        };
        format!("(tparam {} {})", self.name(tp.name), kind)
    }

    fn tiargs(&self, range: TiArgRange) -> String {
        self.arena
            .tiargs(range)
            .iter()
            .map(|&a| self.tiarg(a))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn tiarg(&self, arg: TiArg) -> String {
        match arg {
            TiArg::Type(t) => format!("t:{}", self.ty(t)),
            TiArg::Expr(e) => format!("e:{}", self.expr(e)),
        }
    }

    fn opt_tiarg(&self, arg: Option<TiArg>) -> String {
        match arg {
            Some(arg) => self.tiarg(arg),
            None => "-".to_string(),
        }
    }

    fn segments(&self, range: PathSegRange) -> String {
        self.arena
            .segments(range)
            .iter()
            .map(|seg| match seg.tiargs {
                Some(tiargs) => format!("{}!({})", self.name(seg.name), self.tiargs(tiargs)),
                None => self.name(seg.name).to_string(),
            })
            .collect::<Vec<_>>()
            .join(".")
    }

    fn func_body(&self, body: &FuncBody) -> String {
        let ensures = self
            .arena
            .ensures(body.fensures)
            .iter()
            .map(|e| format!("(ensure {} {})", self.opt_name(e.ident), self.stmt(e.stmt)))
            .collect::<Vec<_>>()
            .join(" ");
        format!(
            "(contracts [{}] [{}] {})",
            self.stmts(body.frequires),
            ensures,
            self.opt_stmt(body.body)
        )
    }

    fn foreach_header(&self, header: &ForeachHeader) -> String {
        format!(
            "({:?} [{}] {} {})",
            header.kind,
            self.params(header.params),
            self.expr(header.aggregate),
            self.opt_expr(header.upper)
        )
    }

    fn cond_arg(&self, arg: CondArg) -> String {
        match arg {
            CondArg::None => "-".to_string(),
            CondArg::Ident(name) => self.name(name).to_string(),
            CondArg::Level(level) => level.to_string(),
        }
    }

    fn init(&self, id: InitId) -> String {
        match self.arena.init(id).kind {
            InitKind::Void => "(void-init)".to_string(),
            InitKind::Expr(e) => format!("(init {})", self.expr(e)),
            InitKind::Struct(fields) => {
                let fields = self
                    .arena
                    .field_inits(fields)
                    .iter()
                    .map(|f| format!("{}:{}", self.opt_name(f.name), self.init(f.init)))
                    .collect::<Vec<_>>()
                    .join(" ");
                format!("(struct-init {fields})")
            }
            InitKind::Array(entries) => {
                let entries = self
                    .arena
                    .array_inits(entries)
                    .iter()
                    .map(|e| format!("{}:{}", self.opt_expr(e.index), self.init(e.init)))
                    .collect::<Vec<_>>()
                    .join(" ");
                format!("(array-init {entries})")
            }
            InitKind::Error => "(error-init)".to_string(),
        }
    }

    fn opt_init(&self, id: Option<InitId>) -> String {
        match id {
            Some(id) => self.init(id),
            None => "-".to_string(),
        }
    }

    // --- Declarations ---

    fn decl(&self, id: DeclId) -> String {
        let node = self.arena.decl(id);
        let body = match node.kind {
            DeclKind::Error => "(error-decl)".to_string(),
            DeclKind::Import {
                is_static,
                packages,
                name,
                alias,
                selects,
            } => {
                let mut path: Vec<&str> = self
                    .arena
                    .names(packages)
                    .iter()
                    .map(|&n| self.name(n))
                    .collect();
                path.push(self.name(name));
                let selects = self
                    .arena
                    .import_selects(selects)
                    .iter()
                    .map(|s| format!("{}={}", self.opt_name(s.alias), self.name(s.name)))
                    .collect::<Vec<_>>()
                    .join(" ");
                format!(
                    "(import static={is_static} {} alias={} [{selects}])",
                    path.join("."),
                    self.opt_name(alias)
                )
            }
            DeclKind::Var {
                name,
                ty,
                init,
                stc,
            } => format!(
                "(var {} {} {} {:?})",
                self.name(name),
                self.opt_type(ty),
                self.opt_init(init),
                stc
            ),
            DeclKind::Alias {
                name,
                tparams,
                target,
                stc,
            } => {
                let tparams = match tparams {
                    Some(range) => format!("[{}]", self.tparams(range)),
                    None => "-".to_string(),
                };
                let target = match target {
                    AliasTarget::Type(t) => self.ty(t),
                    AliasTarget::FuncLiteral(e) => self.expr(e),
                };
                format!("(alias {} {tparams} {target} {:?})", self.name(name), stc)
            }
            DeclKind::AliasThis { name } => format!("(alias-this {})", self.name(name)),
            DeclKind::Func {
                name,
                ty,
                stc,
                body,
            } => format!(
                "(func {} {} {:?} {})",
                self.name(name),
                self.ty(ty),
                stc,
                self.func_body(&body)
            ),
            DeclKind::Ctor {
                params,
                varargs,
                stc,
                tparams,
                constraint,
                body,
            } => {
                let tparams = match tparams {
                    Some(range) => format!("[{}]", self.tparams(range)),
                    None => "-".to_string(),
                };
                format!(
                    "(ctor [{}] {varargs:?} {stc:?} {tparams} {} {})",
                    self.params(params),
                    self.opt_expr(constraint),
                    self.func_body(&body)
                )
            }
            DeclKind::Postblit { stc, body } => {
                format!("(postblit {stc:?} {})", self.func_body(&body))
            }
            DeclKind::Dtor { stc, body } => format!("(dtor {stc:?} {})", self.func_body(&body)),
            DeclKind::StaticCtor { stc, body } => {
                format!("(static-ctor {stc:?} {})", self.func_body(&body))
            }
            DeclKind::StaticDtor { stc, body } => {
                format!("(static-dtor {stc:?} {})", self.func_body(&body))
            }
            DeclKind::SharedStaticCtor { stc, body } => {
                format!("(shared-static-ctor {stc:?} {})", self.func_body(&body))
            }
            DeclKind::SharedStaticDtor { stc, body } => {
                format!("(shared-static-dtor {stc:?} {})", self.func_body(&body))
            }
            DeclKind::Invariant { body } => format!("(invariant {})", self.stmt(body)),
            DeclKind::Unittest { body } => format!("(unittest {})", self.stmt(body)),
            DeclKind::ClassNew {
                params,
                varargs,
                body,
            } => format!(
                "(class-new [{}] {varargs:?} {})",
                self.params(params),
                self.func_body(&body)
            ),
            DeclKind::Aggregate {
                kind,
                name,
                bases,
                members,
            } => format!(
                "({} {} [{}] {})",
                kind.display_name(),
                self.opt_name(name),
                self.types(bases),
                self.opt_decls(members)
            ),
            DeclKind::Enum {
                name,
                memtype,
                members,
            } => {
                let members = match members {
                    Some(range) => {
                        let members = self
                            .arena
                            .enum_members(range)
                            .iter()
                            .map(|m| {
                                format!(
                                    "({} {} {}{})",
                                    self.name(m.name),
                                    self.opt_type(m.ty),
                                    self.opt_expr(m.value),
                                    self.opt_doc(m.doc)
                                )
                            })
                            .collect::<Vec<_>>()
                            .join(" ");
                        format!("[{members}]")
                    }
                    None => "-".to_string(),
                };
                format!(
                    "(enum {} {} {members})",
                    self.opt_name(name),
                    self.opt_type(memtype)
                )
            }
            DeclKind::Template {
                name,
                tparams,
                constraint,
                members,
                is_mixin,
            } => format!(
                "(template {} mixin={is_mixin} [{}] {} [{}])",
                self.name(name),
                self.tparams(tparams),
                self.opt_expr(constraint),
                self.decls(members)
            ),
            DeclKind::TemplateMixin {
                leading_dot,
                segments,
                ident,
            } => format!(
                "(template-mixin dot={leading_dot} {} {})",
                self.segments(segments),
                self.opt_name(ident)
            ),
            DeclKind::MixinDecl { args } => format!("(mixin-decl {})", self.exprs(args)),
            DeclKind::StorageClassDecl { stc, decls } => {
                format!("(stc-decl {stc:?} [{}])", self.decls(decls))
            }
            DeclKind::DeprecatedDecl { msg, decls } => format!(
                "(deprecated-decl {} [{}])",
                self.opt_expr(msg),
                self.decls(decls)
            ),
            DeclKind::LinkageDecl {
                linkage,
                cpp_mangle,
                namespaces,
                decls,
            } => {
                let namespaces = match namespaces {
                    Some(range) => format!("[{}]", self.exprs(range)),
                    None => "-".to_string(),
                };
                format!(
                    "(linkage {} {cpp_mangle:?} {namespaces} [{}])",
                    linkage.display_name(),
                    self.decls(decls)
                )
            }
            DeclKind::ProtectionDecl { prot, pkg, decls } => {
                let pkg = self
                    .arena
                    .names(pkg)
                    .iter()
                    .map(|&n| self.name(n))
                    .collect::<Vec<_>>()
                    .join(".");
                format!(
                    "(protection {} [{pkg}] [{}])",
                    prot.display_name(),
                    self.decls(decls)
                )
            }
            DeclKind::AlignDecl { alignment, decls } => format!(
                "(align {} [{}])",
                self.opt_expr(alignment),
                self.decls(decls)
            ),
            DeclKind::UserAttributeDecl { attrs, decls } => {
                format!("(uda [{}] [{}])", self.exprs(attrs), self.decls(decls))
            }
            DeclKind::Pragma { name, args, decls } => format!(
                "(pragma {} [{}] {})",
                self.name(name),
                self.exprs(args),
                self.opt_decls(decls)
            ),
            DeclKind::StaticAssert { cond, msg } => format!(
                "(static-assert {} {})",
                self.expr(cond),
                self.opt_expr(msg)
            ),
            DeclKind::StaticIf {
                cond,
                then_decls,
                else_decls,
            } => format!(
                "(static-if {} [{}] {})",
                self.expr(cond),
                self.decls(then_decls),
                self.opt_decls(else_decls)
            ),
            DeclKind::Conditional {
                kind,
                arg,
                then_decls,
                else_decls,
            } => format!(
                "(cond {kind:?} {} [{}] {})",
                self.cond_arg(arg),
                self.decls(then_decls),
                self.opt_decls(else_decls)
            ),
            DeclKind::CondSymbol { kind, arg } => {
                format!("(cond-symbol {kind:?} {})", self.cond_arg(arg))
            }
            DeclKind::StaticForeach { header, decls } => format!(
                "(static-foreach {} [{}])",
                self.foreach_header(&header),
                self.decls(decls)
            ),
        };
        match node.doc {
            Some(doc) => format!("(doc {:?} {body})", self.name(doc)),
            None => body,
        }
    }

    // --- Statements ---

    fn stmt(&self, id: StmtId) -> String {
        match self.arena.stmt(id).kind {
            StmtKind::Error => "(error-stmt)".to_string(),
            StmtKind::Empty => "(empty)".to_string(),
            StmtKind::Expr(e) => format!("(expr-stmt {})", self.expr(e)),
            StmtKind::DeclStmt(d) => format!("(decl-stmt {})", self.decl(d)),
            StmtKind::Block(stmts) => format!("(block {})", self.stmts(stmts)),
            StmtKind::Labeled { label, stmt } => {
                format!("(label {} {})", self.name(label), self.stmt(stmt))
            }
            StmtKind::If {
                param,
                cond,
                then_branch,
                else_branch,
            } => {
                let param = match param {
                    Some(p) => self.param(self.arena.param(p)),
                    None => "-".to_string(),
                };
                format!(
                    "(if {param} {} {} {})",
                    self.expr(cond),
                    self.stmt(then_branch),
                    self.opt_stmt(else_branch)
                )
            }
            StmtKind::While { cond, body } => {
                format!("(while {} {})", self.expr(cond), self.stmt(body))
            }
            StmtKind::DoWhile { body, cond } => {
                format!("(do-while {} {})", self.stmt(body), self.expr(cond))
            }
            StmtKind::For {
                init,
                cond,
                increment,
                body,
            } => format!(
                "(for {} {} {} {})",
                self.opt_stmt(init),
                self.opt_expr(cond),
                self.opt_expr(increment),
                self.stmt(body)
            ),
            StmtKind::Foreach { header, body } => {
                format!("(foreach {} {})", self.foreach_header(&header), self.stmt(body))
            }
            StmtKind::Switch {
                cond,
                body,
                is_final,
            } => format!(
                "(switch final={is_final} {} {})",
                self.expr(cond),
                self.stmt(body)
            ),
            StmtKind::Case { exprs, body } => {
                format!("(case [{}] {})", self.exprs(exprs), self.stmt(body))
            }
            StmtKind::CaseRange { first, last, body } => format!(
                "(case-range {} {} {})",
                self.expr(first),
                self.expr(last),
                self.stmt(body)
            ),
            StmtKind::DefaultCase { body } => format!("(default {})", self.stmt(body)),
            StmtKind::Return(e) => format!("(return {})", self.opt_expr(e)),
            StmtKind::Break { label } => format!("(break {})", self.opt_name(label)),
            StmtKind::Continue { label } => format!("(continue {})", self.opt_name(label)),
            StmtKind::Goto(target) => match target {
                GotoTarget::Label(name) => format!("(goto {})", self.name(name)),
                GotoTarget::Default => "(goto-default)".to_string(),
                GotoTarget::Case(e) => format!("(goto-case {})", self.opt_expr(e)),
            },
            StmtKind::Synchronized { expr, body } => format!(
                "(synchronized {} {})",
                self.opt_expr(expr),
                self.stmt(body)
            ),
            StmtKind::With { expr, body } => {
                format!("(with {} {})", self.expr(expr), self.stmt(body))
            }
            StmtKind::TryCatch {
                body,
                catches,
                finally,
            } => {
                let catches = self
                    .arena
                    .catches(catches)
                    .iter()
                    .map(|c| {
                        format!(
                            "(catch {} {} {})",
                            self.ty(c.ty),
                            self.opt_name(c.ident),
                            self.stmt(c.handler)
                        )
                    })
                    .collect::<Vec<_>>()
                    .join(" ");
                format!(
                    "(try {} [{catches}] {})",
                    self.stmt(body),
                    self.opt_stmt(finally)
                )
            }
            StmtKind::Throw(e) => format!("(throw {})", self.expr(e)),
            StmtKind::ScopeGuard { kind, body } => {
                format!("(scope-guard {kind:?} {})", self.stmt(body))
            }
            StmtKind::Asm { stc, insts } => {
                let insts = self
                    .arena
                    .asm_insts(insts)
                    .iter()
                    .map(|i| format!("(asm-inst len={})", i.tokens_end - i.tokens_start))
                    .collect::<Vec<_>>()
                    .join(" ");
                format!("(asm {stc:?} [{insts}])")
            }
            StmtKind::MixinStmt(args) => format!("(mixin-stmt {})", self.exprs(args)),
            StmtKind::StaticAssert { cond, msg } => format!(
                "(static-assert-stmt {} {})",
                self.expr(cond),
                self.opt_expr(msg)
            ),
            StmtKind::StaticIf {
                cond,
                then_branch,
                else_branch,
            } => format!(
                "(static-if-stmt {} {} {})",
                self.expr(cond),
                self.stmt(then_branch),
                self.opt_stmt(else_branch)
            ),
            StmtKind::Conditional {
                kind,
                arg,
                then_branch,
                else_branch,
            } => format!(
                "(cond-stmt {kind:?} {} {} {})",
                self.cond_arg(arg),
                self.stmt(then_branch),
                self.opt_stmt(else_branch)
            ),
            StmtKind::StaticForeach { header, body } => format!(
                "(static-foreach-stmt {} {})",
                self.foreach_header(&header),
                self.stmt(body)
            ),
            StmtKind::Pragma { name, args, body } => format!(
                "(pragma-stmt {} [{}] {})",
                self.name(name),
                self.exprs(args),
                self.opt_stmt(body)
            ),
        }
    }

    // --- Expressions ---

    fn expr(&self, id: ExprId) -> String {
        match self.arena.expr(id).kind {
            ExprKind::Error => "(error-expr)".to_string(),
            ExprKind::Ident(name) => format!("(id {})", self.name(name)),
            ExprKind::This => "(this)".to_string(),
            ExprKind::Super => "(super)".to_string(),
            ExprKind::Dollar => "(dollar)".to_string(),
            ExprKind::Null => "(null)".to_string(),
            ExprKind::Bool(value) => format!("(bool {value})"),
            ExprKind::Int { value, suffix } => format!("(int {value} {suffix:?})"),
            ExprKind::Float { bits, suffix } => format!("(float {bits} {suffix:?})"),
            ExprKind::String { name, postfix } => {
                format!("(str {:?} {postfix})", self.name(name))
            }
            ExprKind::CharLit(c) => format!("(char {c:?})"),
            ExprKind::Special(kw) => format!("(special {kw:?})"),
            ExprKind::ArrayLiteral(values) => format!("(array {})", self.exprs(values)),
            ExprKind::AssocArrayLiteral { keys, values } => format!(
                "(assoc-array [{}] [{}])",
                self.exprs(keys),
                self.exprs(values)
            ),
            ExprKind::TypeExpr(t) => format!("(type-expr {})", self.ty(t)),
            ExprKind::TypeDotId { ty, name } => {
                format!("(type-dot {} {})", self.ty(ty), self.name(name))
            }
            ExprKind::CtorCall { ty, args } => {
                format!("(ctor-call {} [{}])", self.ty(ty), self.exprs(args))
            }
            ExprKind::TemplateInstance { name, tiargs } => format!(
                "(instance {} [{}])",
                self.name(name),
                self.tiargs(tiargs)
            ),
            ExprKind::DotIdent { lhs, name } => {
                format!("(dot {} {})", self.opt_expr(lhs), self.name(name))
            }
            ExprKind::DotTemplateInstance { lhs, name, tiargs } => format!(
                "(dot-instance {} {} [{}])",
                self.expr(lhs),
                self.name(name),
                self.tiargs(tiargs)
            ),
            ExprKind::Unary { op, operand } => format!("(unary {op:?} {})", self.expr(operand)),
            ExprKind::Binary { op, lhs, rhs } => format!(
                "(binary {} {} {})",
                op.display_name(),
                self.expr(lhs),
                self.expr(rhs)
            ),
            ExprKind::Comma { lhs, rhs } => {
                format!("(comma {} {})", self.expr(lhs), self.expr(rhs))
            }
            ExprKind::Assign { op, lhs, rhs } => {
                format!("(assign {op:?} {} {})", self.expr(lhs), self.expr(rhs))
            }
            ExprKind::Cond {
                cond,
                then_expr,
                else_expr,
            } => format!(
                "(cond-expr {} {} {})",
                self.expr(cond),
                self.expr(then_expr),
                self.expr(else_expr)
            ),
            ExprKind::Cast { to, mods, operand } => format!(
                "(cast {} {mods:?} {})",
                self.opt_type(to),
                self.expr(operand)
            ),
            ExprKind::New {
                this_expr,
                ty,
                args,
            } => format!(
                "(new {} {} [{}])",
                self.opt_expr(this_expr),
                self.ty(ty),
                self.exprs(args)
            ),
            ExprKind::NewAnonClass {
                args,
                bases,
                members,
            } => format!(
                "(new-anon-class [{}] [{}] [{}])",
                self.exprs(args),
                self.types(bases),
                self.decls(members)
            ),
            ExprKind::Call { callee, args } => {
                format!("(call {} [{}])", self.expr(callee), self.exprs(args))
            }
            ExprKind::Index { base, args } => {
                format!("(index {} [{}])", self.expr(base), self.exprs(args))
            }
            ExprKind::Slice { base, lower, upper } => format!(
                "(slice {} {} {})",
                self.expr(base),
                self.opt_expr(lower),
                self.opt_expr(upper)
            ),
            ExprKind::Interval { lower, upper } => {
                format!("(interval {} {})", self.expr(lower), self.expr(upper))
            }
            ExprKind::PostInc(e) => format!("(post-inc {})", self.expr(e)),
            ExprKind::PostDec(e) => format!("(post-dec {})", self.expr(e)),
            ExprKind::Assert { cond, msg } => {
                format!("(assert {} {})", self.expr(cond), self.opt_expr(msg))
            }
            ExprKind::Mixin(args) => format!("(mixin-expr {})", self.exprs(args)),
            ExprKind::ImportExpr(e) => format!("(import-expr {})", self.expr(e)),
            ExprKind::Typeid(arg) => format!("(typeid {})", self.tiarg(arg)),
            ExprKind::Is {
                targ,
                ident,
                cmp,
                spec,
                tparams,
            } => {
                let spec = match spec {
                    Some(IsSpec::Type(t)) => self.ty(t),
                    Some(IsSpec::Keyword(kw)) => format!("{kw:?}"),
                    None => "-".to_string(),
                };
                format!(
                    "(is {} {} {cmp:?} {spec} [{}])",
                    self.ty(targ),
                    self.opt_name(ident),
                    self.tparams(tparams)
                )
            }
            ExprKind::TraitsExpr { name, args } => {
                format!("(traits {} [{}])", self.name(name), self.tiargs(args))
            }
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
            } => {
                let body = match body {
                    FuncLiteralBody::Expr(e) => self.expr(e),
                    FuncLiteralBody::Block(s) => self.stmt(s),
                };
                format!(
                    "(literal {kind:?} ref={is_ref} params={has_params} [{}] [{}] {varargs:?} {} {stc:?} {body})",
                    self.tparams(tparams),
                    self.params(params),
                    self.opt_type(ret)
                )
            }
        }
    }

    // --- Types ---

    fn ty(&self, id: TypeId) -> String {
        match self.arena.ty(id).kind {
            TypeKind::Error => "(error-type)".to_string(),
            TypeKind::Basic(basic) => format!("(basic {})", basic.name()),
            TypeKind::Path {
                leading_dot,
                segments,
            } => format!("(path dot={leading_dot} {})", self.segments(segments)),
            TypeKind::Typeof { arg, segments } => {
                let arg = match arg {
                    TypeofArg::Expr(e) => self.expr(e),
                    TypeofArg::Return => "return".to_string(),
                };
                format!("(typeof {arg} {})", self.segments(segments))
            }
            TypeKind::Modified { mods, inner } => {
                format!("(modified {mods:?} {})", self.ty(inner))
            }
            TypeKind::Pointer(t) => format!("(ptr {})", self.ty(t)),
            TypeKind::DArray(t) => format!("(darray {})", self.ty(t)),
            TypeKind::SArray { elem, dim } => {
                format!("(sarray {} {})", self.ty(elem), self.expr(dim))
            }
            TypeKind::AArray { elem, key } => {
                format!("(aarray {} {})", self.ty(elem), self.ty(key))
            }
            TypeKind::SliceOf { elem, lower, upper } => format!(
                "(slice-of {} {} {})",
                self.ty(elem),
                self.expr(lower),
                self.expr(upper)
            ),
            TypeKind::Function {
                params,
                varargs,
                ret,
                stc,
            } => format!(
                "(fn-type [{}] {varargs:?} {} {stc:?})",
                self.params(params),
                self.ty(ret)
            ),
            TypeKind::Delegate {
                params,
                varargs,
                ret,
                stc,
            } => format!(
                "(dg-type [{}] {varargs:?} {} {stc:?})",
                self.params(params),
                self.ty(ret)
            ),
            TypeKind::Vector(t) => format!("(vector {})", self.ty(t)),
            TypeKind::MixinType(args) => format!("(mixin-type {})", self.exprs(args)),
            TypeKind::TraitsType { name, args } => {
                format!("(traits-type {} [{}])", self.name(name), self.tiargs(args))
            }
        }
    }
}

/// Parse two equivalent spellings through one shared interner and assert
/// their span-insensitive dumps match.
fn assert_round_trip(a: &str, b: &str) {
    let interner = StringInterner::new();

    let mut handler_a = CollectHandler::new();
    let out_a = crate::parse(a, &interner, &mut handler_a);
    assert!(
        handler_a.set().is_empty(),
        "unexpected diagnostics for {a:?}: {:?}",
        handler_a.set()
    );

    let mut handler_b = CollectHandler::new();
    let out_b = crate::parse(b, &interner, &mut handler_b);
    assert!(
        handler_b.set().is_empty(),
        "unexpected diagnostics for {b:?}: {:?}",
        handler_b.set()
    );

    let dump_a = TreeDump::new(&out_a.arena, &interner).module(&out_a.module);
    let dump_b = TreeDump::new(&out_b.arena, &interner).module(&out_b.module);
    assert_eq!(dump_a, dump_b, "trees differ for:\n  {a:?}\n  {b:?}");
}

#[test]
fn whitespace_round_trips() {
    assert_round_trip("int x=1;", "  int  x  =  1  ;  ");
}

#[test]
fn comments_do_not_change_the_tree() {
    assert_round_trip(
        "int x = 1; int y;",
        "int x = /* init */ 1; // trailing\nint y;",
    );
}

#[test]
fn redundant_parens_round_trip() {
    // the parenthesisation mark is layout metadata, not structure
    assert_round_trip("int x = (3 + 4) * 2;", "int x = ((3 + 4)) * 2;");
    assert_round_trip("void f() { return (v); }", "void f() { return v; }");
}

#[test]
fn attribute_order_round_trips() {
    assert_round_trip(
        "@safe @nogc shared const int x;",
        "@nogc @safe const shared int x;",
    );
}

#[test]
fn comprehensive_module_round_trips() {
    let compact = "module demo.core;\
        import std.io : writeln;\
        enum Flag { A, B = 2, C }\
        struct Box(T) if (is(T == int)) {\
        T value;\
        this(T v) { value = v; }\
        int get() const in (value > 0) { return value; }\
        }\
        const int limit = (3 + 4) * 2;\
        void run(int n = 1, ...) @safe {\
        if (auto p = make(n)) use(p); else reset();\
        foreach (i; 0 .. n) { total += i; }\
        }";

    let spread = r"
        module demo . core ;

        import std . io : writeln ;

        // flags with an explicit value in the middle
        enum Flag {
            A ,
            B = 2 ,
            C ,
        }

        struct Box ( T ) if ( is ( T == int ) )
        {
            T value ;

            this ( T v )
            {
                value = v ;
            }

            int get ( ) const in ( value > 0 )
            {
                return ( value ) ;
            }
        }

        const int limit = ( ( 3 + 4 ) ) * 2 ;

        void run ( int n = 1 , ... ) @safe
        {
            if ( auto p = make ( n ) ) use ( p ) ; else reset ( ) ;
            foreach ( i ; 0 .. n ) { total += i ; }
        }
    ";

    assert_round_trip(compact, spread);
}

#[test]
fn reparse_is_structurally_stable() {
    // the same source parses to the same tree every time
    let source = "struct S { int x; void f() { if (x) g(); } }";
    assert_round_trip(source, source);
}
