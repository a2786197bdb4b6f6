//! Statement nodes.

use super::ids::{AsmInstRange, CatchRange, DeclId, ExprId, ExprRange, ParamId, ParamRange, StmtId, StmtRange, TypeId};
use crate::{Name, Span, StorageClass};

/// A statement node in the arena.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    #[inline]
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Stmt { kind, span }
    }

    /// The error sentinel; fills required slots after a diagnostic.
    #[inline]
    pub fn error(span: Span) -> Self {
        Stmt::new(StmtKind::Error, span)
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ScopeGuardKind {
    /// `scope(exit)`
    Exit,
    /// `scope(failure)`
    Failure,
    /// `scope(success)`
    Success,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ForeachKind {
    Foreach,
    ForeachReverse,
}

/// Target of a `goto`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum GotoTarget {
    Label(Name),
    Default,
    /// `goto case;` or `goto case expr;`
    Case(Option<ExprId>),
}

/// `debug` vs `version` for conditional compilation constructs.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum CondKind {
    Debug,
    Version,
}

/// Argument of a `debug(...)` / `version(...)` condition.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum CondArg {
    /// Bare `debug`
    None,
    Ident(Name),
    Level(u64),
}

/// A `catch (T id) { ... }` clause.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct CatchClause {
    pub ty: TypeId,
    pub ident: Option<Name>,
    pub handler: StmtId,
    pub span: Span,
}

/// One instruction of an `asm { }` block: a raw run of token indices,
/// terminated in source by `;`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct AsmInst {
    /// Index of the first token of the instruction in the token list.
    pub tokens_start: u32,
    /// Index one past the last token.
    pub tokens_end: u32,
    pub span: Span,
}

/// Shared header of the four foreach variants.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ForeachHeader {
    pub kind: ForeachKind,
    pub params: ParamRange,
    pub aggregate: ExprId,
    /// Present for the range form `foreach (i; lwr .. upr)`.
    pub upper: Option<ExprId>,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum StmtKind {
    /// Sentinel after a diagnostic.
    Error,
    /// `;`
    Empty,
    Expr(ExprId),
    /// A declaration in statement position.
    DeclStmt(DeclId),
    Block(StmtRange),
    Labeled {
        label: Name,
        stmt: StmtId,
    },
    If {
        /// `if (auto x = e)` binds a parameter.
        param: Option<ParamId>,
        cond: ExprId,
        then_branch: StmtId,
        else_branch: Option<StmtId>,
    },
    While {
        cond: ExprId,
        body: StmtId,
    },
    DoWhile {
        body: StmtId,
        cond: ExprId,
    },
    For {
        init: Option<StmtId>,
        cond: Option<ExprId>,
        increment: Option<ExprId>,
        body: StmtId,
    },
    Foreach {
        header: ForeachHeader,
        body: StmtId,
    },
    Switch {
        cond: ExprId,
        body: StmtId,
        is_final: bool,
    },
    Case {
        exprs: ExprRange,
        body: StmtId,
    },
    /// `case first: .. case last:`
    CaseRange {
        first: ExprId,
        last: ExprId,
        body: StmtId,
    },
    DefaultCase {
        body: StmtId,
    },
    Return(Option<ExprId>),
    Break {
        label: Option<Name>,
    },
    Continue {
        label: Option<Name>,
    },
    Goto(GotoTarget),
    Synchronized {
        expr: Option<ExprId>,
        body: StmtId,
    },
    With {
        expr: ExprId,
        body: StmtId,
    },
    TryCatch {
        body: StmtId,
        catches: CatchRange,
        finally: Option<StmtId>,
    },
    Throw(ExprId),
    ScopeGuard {
        kind: ScopeGuardKind,
        body: StmtId,
    },
    Asm {
        stc: StorageClass,
        insts: AsmInstRange,
    },
    /// `mixin(args);` in statement position.
    MixinStmt(ExprRange),
    StaticAssert {
        cond: ExprId,
        msg: Option<ExprId>,
    },
    StaticIf {
        cond: ExprId,
        then_branch: StmtId,
        else_branch: Option<StmtId>,
    },
    /// `debug`/`version` conditional statement.
    Conditional {
        kind: CondKind,
        arg: CondArg,
        then_branch: StmtId,
        else_branch: Option<StmtId>,
    },
    StaticForeach {
        header: ForeachHeader,
        body: StmtId,
    },
    Pragma {
        name: Name,
        args: ExprRange,
        body: Option<StmtId>,
    },
}
