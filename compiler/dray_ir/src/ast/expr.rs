//! Expression nodes.

use super::ids::{DeclRange, ExprId, ExprRange, ParamRange, StmtId, TemplateParamRange, TypeId, TypeRange, TiArgRange};
use super::ty::{TiArg, VarArg};
use crate::{FloatSuffix, IntSuffix, ModFlags, Name, Span, StorageClass, StringPostfix};

/// An expression node in the arena.
///
/// `parens` records whether the expression was written inside its own
/// parentheses; the precedence warnings consult it.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
    pub parens: bool,
}

impl Expr {
    #[inline]
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr {
            kind,
            span,
            parens: false,
        }
    }

    /// The error sentinel; fills required slots after a diagnostic.
    #[inline]
    pub fn error(span: Span) -> Self {
        Expr::new(ExprKind::Error, span)
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UnaryOp {
    /// `-e`
    Neg,
    /// `+e`
    UnaryAdd,
    /// `~e`
    Com,
    /// `!e`
    Not,
    /// `&e`
    AddrOf,
    /// `*e`
    Deref,
    /// `++e`
    PreInc,
    /// `--e`
    PreDec,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinOp {
    OrOr,
    AndAnd,
    Or,
    Xor,
    And,
    Equal,
    NotEqual,
    /// `is`
    Identity,
    /// `!is`
    NotIdentity,
    In,
    /// `!in`
    NotIn,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Shl,
    Shr,
    Ushr,
    Add,
    Sub,
    /// `~`
    Concat,
    Mul,
    Div,
    Mod,
    /// `^^`
    Pow,
}

impl BinOp {
    /// Is this one of the equality/identity/in/relational operators
    /// (the single comparison precedence level)?
    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            BinOp::Equal
                | BinOp::NotEqual
                | BinOp::Identity
                | BinOp::NotIdentity
                | BinOp::In
                | BinOp::NotIn
                | BinOp::Less
                | BinOp::LessEqual
                | BinOp::Greater
                | BinOp::GreaterEqual
        )
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            BinOp::OrOr => "||",
            BinOp::AndAnd => "&&",
            BinOp::Or => "|",
            BinOp::Xor => "^",
            BinOp::And => "&",
            BinOp::Equal => "==",
            BinOp::NotEqual => "!=",
            BinOp::Identity => "is",
            BinOp::NotIdentity => "!is",
            BinOp::In => "in",
            BinOp::NotIn => "!in",
            BinOp::Less => "<",
            BinOp::LessEqual => "<=",
            BinOp::Greater => ">",
            BinOp::GreaterEqual => ">=",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
            BinOp::Ushr => ">>>",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Concat => "~",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Pow => "^^",
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    Ushr,
    Concat,
    Pow,
}

/// `__FILE__`-family magic literals.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum SpecialKw {
    File,
    FileFullPath,
    Line,
    Module,
    Function,
    PrettyFunction,
}

/// How a function literal was introduced.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum FuncLiteralKind {
    /// `function (...) ...`
    Function,
    /// `delegate (...) ...`
    Delegate,
    /// `(params) => e`, `(params) { }`, `x => e`
    Lambda,
    /// bare `{ ... }`
    Block,
}

/// Body of a function literal.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum FuncLiteralBody {
    /// `=> expr`
    Expr(ExprId),
    /// `{ ... }`
    Block(StmtId),
}

/// Comparison form inside `is(...)`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum IsCmp {
    /// `is(T)`
    None,
    /// `is(T : Spec)`
    Colon,
    /// `is(T == Spec)`
    Equal,
}

/// Specialization keyword inside `is(T == kw)`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum IsSpecKw {
    Struct,
    Union,
    Class,
    Super,
    Enum,
    Interface,
    Package,
    Module,
    ArgTypes,
    Parameters,
    Const,
    Immutable,
    Shared,
    Wild,
    Function,
    Delegate,
    Return,
    Vector,
}

/// Specialization of an `is(...)` expression.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum IsSpec {
    Type(TypeId),
    Keyword(IsSpecKw),
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ExprKind {
    /// Sentinel after a diagnostic.
    Error,
    Ident(Name),
    This,
    Super,
    Dollar,
    Null,
    Bool(bool),
    Int {
        value: u64,
        suffix: IntSuffix,
    },
    Float {
        bits: u64,
        suffix: FloatSuffix,
    },
    String {
        name: Name,
        postfix: StringPostfix,
    },
    CharLit(char),
    Special(SpecialKw),
    ArrayLiteral(ExprRange),
    AssocArrayLiteral {
        keys: ExprRange,
        values: ExprRange,
    },
    /// A type in expression position (`typeid(int[])`'s argument and friends).
    TypeExpr(TypeId),
    /// `int.max`, `const(T).init`
    TypeDotId {
        ty: TypeId,
        name: Name,
    },
    /// `int(3)` — basic type constructor call.
    CtorCall {
        ty: TypeId,
        args: ExprRange,
    },
    /// `id!(args)` — scope expression.
    TemplateInstance {
        name: Name,
        tiargs: TiArgRange,
    },
    /// `e.id`; `lhs == None` is the module-scope `.id`.
    DotIdent {
        lhs: Option<ExprId>,
        name: Name,
    },
    /// `e.id!(args)`
    DotTemplateInstance {
        lhs: ExprId,
        name: Name,
        tiargs: TiArgRange,
    },
    Unary {
        op: UnaryOp,
        operand: ExprId,
    },
    Binary {
        op: BinOp,
        lhs: ExprId,
        rhs: ExprId,
    },
    Comma {
        lhs: ExprId,
        rhs: ExprId,
    },
    Assign {
        op: AssignOp,
        lhs: ExprId,
        rhs: ExprId,
    },
    Cond {
        cond: ExprId,
        then_expr: ExprId,
        else_expr: ExprId,
    },
    /// `cast(T)e`, `cast(const)e`, `cast()e`.
    Cast {
        to: Option<TypeId>,
        mods: ModFlags,
        operand: ExprId,
    },
    New {
        /// `e.new T` places the allocation in `e`.
        this_expr: Option<ExprId>,
        ty: TypeId,
        args: ExprRange,
    },
    NewAnonClass {
        args: ExprRange,
        bases: TypeRange,
        members: DeclRange,
    },
    Call {
        callee: ExprId,
        args: ExprRange,
    },
    /// `e[a, b]`; arguments may be `Interval`s.
    Index {
        base: ExprId,
        args: ExprRange,
    },
    /// `e[]` or `e[l..u]`.
    Slice {
        base: ExprId,
        lower: Option<ExprId>,
        upper: Option<ExprId>,
    },
    /// `l..u` inside an index list.
    Interval {
        lower: ExprId,
        upper: ExprId,
    },
    PostInc(ExprId),
    PostDec(ExprId),
    Assert {
        cond: ExprId,
        msg: Option<ExprId>,
    },
    /// `mixin(args)` in expression position.
    Mixin(ExprRange),
    /// `import(e)`
    ImportExpr(ExprId),
    Typeid(TiArg),
    Is {
        targ: TypeId,
        ident: Option<Name>,
        cmp: IsCmp,
        spec: Option<IsSpec>,
        tparams: TemplateParamRange,
    },
    TraitsExpr {
        name: Name,
        args: TiArgRange,
    },
    FuncLiteral {
        kind: FuncLiteralKind,
        is_ref: bool,
        /// `true` when a parameter list was written (distinguishes
        /// `function { }` from `function () { }`).
        has_params: bool,
        /// Implicit template type parameters synthesized for untyped
        /// lambda parameters.
        tparams: TemplateParamRange,
        params: ParamRange,
        varargs: VarArg,
        ret: Option<TypeId>,
        stc: StorageClass,
        body: FuncLiteralBody,
    },
}
