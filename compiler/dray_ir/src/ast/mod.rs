//! The arena-indexed AST.
//!
//! Nodes are plain `Copy` values; children are ids or flattened ranges into
//! the [`AstArena`](crate::AstArena). The parser only constructs nodes; it
//! never interprets them.

mod decl;
mod expr;
mod ids;
mod stmt;
mod ty;

pub use decl::{
    AggregateKind, AliasTarget, ArrayInitEntry, Decl, DeclKind, Ensure, EnumMember, FieldInit,
    FuncBody, ImportSelect, InitKind, Initializer, Module, ModuleDecl, Param, TemplateParam,
    TemplateParamKind,
};
pub use expr::{
    AssignOp, BinOp, Expr, ExprKind, FuncLiteralBody, FuncLiteralKind, IsCmp, IsSpec, IsSpecKw,
    SpecialKw, UnaryOp,
};
pub use ids::{
    ArrayInitRange, AsmInstRange, CatchRange, DeclId, DeclRange, EnsureRange, EnumMemberRange,
    ExprId, ExprRange, FieldInitRange, ImportSelectRange, InitId, NameRange, ParamId, ParamRange,
    PathSegRange, StmtId, StmtRange, TemplateParamRange, TiArgRange, TypeId, TypeRange,
};
pub use stmt::{
    AsmInst, CatchClause, CondArg, CondKind, ForeachHeader, ForeachKind, GotoTarget,
    ScopeGuardKind, Stmt, StmtKind,
};
pub use ty::{BasicType, PathSeg, TiArg, Type, TypeKind, TypeofArg, VarArg};
