//! Declaration nodes, parameters, initializers, and the module handle.

use super::ids::{
    ArrayInitRange, DeclRange, EnsureRange, EnumMemberRange, ExprId, ExprRange, FieldInitRange,
    ImportSelectRange, InitId, NameRange, ParamRange, PathSegRange, StmtId, StmtRange,
    TemplateParamRange, TypeId, TypeRange,
};
use super::stmt::{CondArg, CondKind, ForeachHeader};
use super::ty::{TiArg, VarArg};
use crate::{CppMangle, Linkage, Name, Protection, Span, StorageClass};

/// A declaration node in the arena.
///
/// `doc` is the doc comment attached to this symbol; it is consumed on
/// attach so a comment never lands on two symbols.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Decl {
    pub kind: DeclKind,
    pub span: Span,
    pub doc: Option<Name>,
}

impl Decl {
    #[inline]
    pub fn new(kind: DeclKind, span: Span) -> Self {
        Decl {
            kind,
            span,
            doc: None,
        }
    }

    #[inline]
    pub fn with_doc(kind: DeclKind, span: Span, doc: Option<Name>) -> Self {
        Decl { kind, span, doc }
    }

    /// The error sentinel; fills required slots after a diagnostic.
    #[inline]
    pub fn error(span: Span) -> Self {
        Decl::new(DeclKind::Error, span)
    }
}

/// A function or function-type parameter.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Param {
    pub stc: StorageClass,
    pub udas: Option<ExprRange>,
    /// `None` for inferred parameters (lambdas, foreach variables).
    pub ty: Option<TypeId>,
    pub name: Option<Name>,
    pub default: Option<ExprId>,
    pub span: Span,
}

impl Param {
    pub fn bare(ty: TypeId, span: Span) -> Self {
        Param {
            stc: StorageClass::NONE,
            udas: None,
            ty: Some(ty),
            name: None,
            default: None,
            span,
        }
    }
}

/// Template parameter flavors.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TemplateParamKind {
    /// `T`, `T : Spec`, `T = Default`
    Type {
        spec: Option<TypeId>,
        default: Option<TypeId>,
    },
    /// `int N`, `int N : 3`, `int N = 0`
    Value {
        ty: TypeId,
        spec: Option<ExprId>,
        default: Option<ExprId>,
    },
    /// `alias a`, with type-or-expression specialization/default
    Alias {
        spec: Option<TiArg>,
        default: Option<TiArg>,
    },
    /// `T...`
    Tuple,
    /// `this T`
    This {
        spec: Option<TypeId>,
        default: Option<TypeId>,
    },
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct TemplateParam {
    pub name: Name,
    pub kind: TemplateParamKind,
    pub span: Span,
}

/// One member of an enum body.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct EnumMember {
    pub name: Name,
    /// Present for manifest-style members with an explicit type.
    pub ty: Option<TypeId>,
    pub value: Option<ExprId>,
    pub doc: Option<Name>,
    pub span: Span,
}

/// One `out` contract: `out (id) { ... }` or `out (id; expr)`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Ensure {
    pub ident: Option<Name>,
    pub stmt: StmtId,
}

/// Contracts and body of a function.
///
/// All-empty with `body == None` is a contract-free `;` declaration.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct FuncBody {
    pub frequires: StmtRange,
    pub fensures: EnsureRange,
    pub body: Option<StmtId>,
}

impl FuncBody {
    pub fn is_empty(&self) -> bool {
        self.frequires.is_empty() && self.fensures.is_empty() && self.body.is_none()
    }
}

/// One entry of a selective import: `name` or `alias = name`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ImportSelect {
    pub name: Name,
    pub alias: Option<Name>,
}

/// Initializer forms.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum InitKind {
    /// `= void`
    Void,
    Expr(ExprId),
    Struct(FieldInitRange),
    Array(ArrayInitRange),
    Error,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Initializer {
    pub kind: InitKind,
    pub span: Span,
}

/// `[id :] Initializer` inside a struct initializer.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct FieldInit {
    pub name: Option<Name>,
    pub init: InitId,
}

/// `[expr :] Initializer` inside an array initializer.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ArrayInitEntry {
    pub index: Option<ExprId>,
    pub init: InitId,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum AggregateKind {
    Struct,
    Union,
    Class,
    Interface,
}

impl AggregateKind {
    pub const fn display_name(self) -> &'static str {
        match self {
            AggregateKind::Struct => "struct",
            AggregateKind::Union => "union",
            AggregateKind::Class => "class",
            AggregateKind::Interface => "interface",
        }
    }

    pub const fn has_bases(self) -> bool {
        matches!(self, AggregateKind::Class | AggregateKind::Interface)
    }
}

/// Target of an `alias name = ...` declaration.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum AliasTarget {
    Type(TypeId),
    FuncLiteral(ExprId),
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum DeclKind {
    /// Sentinel after a diagnostic.
    Error,
    Import {
        is_static: bool,
        packages: NameRange,
        name: Name,
        alias: Option<Name>,
        selects: ImportSelectRange,
    },
    Var {
        name: Name,
        ty: Option<TypeId>,
        init: Option<InitId>,
        stc: StorageClass,
    },
    Alias {
        name: Name,
        tparams: Option<TemplateParamRange>,
        target: AliasTarget,
        stc: StorageClass,
    },
    /// `alias name this;`
    AliasThis {
        name: Name,
    },
    Func {
        name: Name,
        /// Always a `TypeKind::Function`.
        ty: TypeId,
        stc: StorageClass,
        body: FuncBody,
    },
    Ctor {
        params: ParamRange,
        varargs: VarArg,
        stc: StorageClass,
        tparams: Option<TemplateParamRange>,
        constraint: Option<ExprId>,
        body: FuncBody,
    },
    /// `this(this)`
    Postblit {
        stc: StorageClass,
        body: FuncBody,
    },
    Dtor {
        stc: StorageClass,
        body: FuncBody,
    },
    StaticCtor {
        stc: StorageClass,
        body: FuncBody,
    },
    StaticDtor {
        stc: StorageClass,
        body: FuncBody,
    },
    SharedStaticCtor {
        stc: StorageClass,
        body: FuncBody,
    },
    SharedStaticDtor {
        stc: StorageClass,
        body: FuncBody,
    },
    Invariant {
        body: StmtId,
    },
    Unittest {
        body: StmtId,
    },
    /// Legacy class allocator `new(params) { ... }`.
    ClassNew {
        params: ParamRange,
        varargs: VarArg,
        body: FuncBody,
    },
    Aggregate {
        kind: AggregateKind,
        name: Option<Name>,
        bases: TypeRange,
        /// `None` for opaque declarations (`struct S;`).
        members: Option<DeclRange>,
    },
    Enum {
        name: Option<Name>,
        memtype: Option<TypeId>,
        /// `None` for opaque declarations (`enum E;`).
        members: Option<EnumMemberRange>,
    },
    Template {
        name: Name,
        tparams: TemplateParamRange,
        constraint: Option<ExprId>,
        members: DeclRange,
        is_mixin: bool,
    },
    /// `mixin a.b!(args) ident;`
    TemplateMixin {
        leading_dot: bool,
        segments: PathSegRange,
        ident: Option<Name>,
    },
    /// `mixin("...");` at declaration level.
    MixinDecl {
        args: ExprRange,
    },
    StorageClassDecl {
        stc: StorageClass,
        decls: DeclRange,
    },
    DeprecatedDecl {
        msg: Option<ExprId>,
        decls: DeclRange,
    },
    LinkageDecl {
        linkage: Linkage,
        cpp_mangle: CppMangle,
        /// `extern(C++, a.b)` / `extern(C++, (exprs))` namespace list.
        namespaces: Option<ExprRange>,
        decls: DeclRange,
    },
    ProtectionDecl {
        prot: Protection,
        /// Qualified path of `package(a.b)`.
        pkg: NameRange,
        decls: DeclRange,
    },
    AlignDecl {
        alignment: Option<ExprId>,
        decls: DeclRange,
    },
    UserAttributeDecl {
        attrs: ExprRange,
        decls: DeclRange,
    },
    Pragma {
        name: Name,
        args: ExprRange,
        /// `None` when terminated with `;`.
        decls: Option<DeclRange>,
    },
    StaticAssert {
        cond: ExprId,
        msg: Option<ExprId>,
    },
    StaticIf {
        cond: ExprId,
        then_decls: DeclRange,
        else_decls: Option<DeclRange>,
    },
    /// `debug`/`version` conditional declaration.
    Conditional {
        kind: CondKind,
        arg: CondArg,
        then_decls: DeclRange,
        else_decls: Option<DeclRange>,
    },
    /// `debug = id;` / `version = id;` (or an integer level).
    CondSymbol {
        kind: CondKind,
        arg: CondArg,
    },
    StaticForeach {
        header: ForeachHeader,
        decls: DeclRange,
    },
}

/// The `module a.b.c;` header.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ModuleDecl {
    pub packages: NameRange,
    pub name: Name,
    pub span: Span,
    pub doc: Option<Name>,
}

/// Root of one parsed module.
#[derive(Clone, Default, Debug)]
pub struct Module {
    pub decl: Option<ModuleDecl>,
    /// UDAs written before the `module` header attach to the module itself.
    pub attributes: Option<ExprRange>,
    pub members: Vec<super::ids::DeclId>,
}

impl Module {
    pub fn new() -> Self {
        Module::default()
    }
}
