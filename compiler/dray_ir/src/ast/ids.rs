//! Arena id and range newtypes.
//!
//! Nodes are indices into the per-parse [`AstArena`]; child lists are
//! flattened `(start, len)` ranges. Plain indices keep the tree acyclic and
//! ownership trivial.
//!
//! [`AstArena`]: crate::AstArena

use std::fmt;

macro_rules! define_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub const fn new(index: u32) -> Self {
                $name(index)
            }

            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

macro_rules! define_range {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash)]
        pub struct $name {
            pub start: u32,
            pub len: u32,
        }

        impl $name {
            pub const EMPTY: $name = $name { start: 0, len: 0 };

            #[inline]
            pub const fn new(start: u32, len: u32) -> Self {
                $name { start, len }
            }

            #[inline]
            pub const fn is_empty(self) -> bool {
                self.len == 0
            }

            #[inline]
            pub const fn len(self) -> usize {
                self.len as usize
            }

            #[inline]
            pub fn to_range(self) -> std::ops::Range<usize> {
                self.start as usize..(self.start + self.len) as usize
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::EMPTY
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}[{}..+{}]", stringify!($name), self.start, self.len)
            }
        }
    };
}

define_id!(
    /// Index of an expression in the arena.
    ExprId
);
define_id!(
    /// Index of a statement in the arena.
    StmtId
);
define_id!(
    /// Index of a declaration in the arena.
    DeclId
);
define_id!(
    /// Index of a type in the arena.
    TypeId
);
define_id!(
    /// Index of an initializer in the arena.
    InitId
);
define_id!(
    /// Index of a parameter in the arena.
    ParamId
);

define_range!(
    /// Range into the flattened expression-id list.
    ExprRange
);
define_range!(
    /// Range into the flattened statement-id list.
    StmtRange
);
define_range!(
    /// Range into the flattened declaration-id list.
    DeclRange
);
define_range!(
    /// Range into the flattened type-id list.
    TypeRange
);
define_range!(
    /// Contiguous run of parameters.
    ParamRange
);
define_range!(
    /// Contiguous run of template parameters.
    TemplateParamRange
);
define_range!(
    /// Contiguous run of enum members.
    EnumMemberRange
);
define_range!(
    /// Contiguous run of qualified-path segments.
    PathSegRange
);
define_range!(
    /// Contiguous run of template instance arguments.
    TiArgRange
);
define_range!(
    /// Contiguous run of struct-initializer fields.
    FieldInitRange
);
define_range!(
    /// Contiguous run of array-initializer entries.
    ArrayInitRange
);
define_range!(
    /// Contiguous run of catch clauses.
    CatchRange
);
define_range!(
    /// Contiguous run of `out` contract clauses.
    EnsureRange
);
define_range!(
    /// Contiguous run of interned names (qualified ids, package paths).
    NameRange
);
define_range!(
    /// Contiguous run of selective-import entries.
    ImportSelectRange
);
define_range!(
    /// Contiguous run of asm instructions.
    AsmInstRange
);
