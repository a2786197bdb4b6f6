//! Shared IR for the Dray front end.
//!
//! Home of the pieces every phase touches: byte-offset [`Span`]s, interned
//! [`Name`]s, the token model, storage-class/linkage/protection value types,
//! and the arena-indexed AST.

pub mod ast;

mod arena;
mod attrs;
mod interner;
mod name;
mod span;
mod token;

pub use arena::AstArena;
pub use attrs::{CppMangle, Linkage, ModFlags, Protection, StorageClass};
pub use interner::StringInterner;
pub use name::Name;
pub use span::Span;
pub use token::{
    FloatSuffix, IntSuffix, StringPostfix, Token, TokenKind, TokenList, TokenValue,
};
