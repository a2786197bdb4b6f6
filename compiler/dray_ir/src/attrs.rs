//! Storage classes, linkage, and protection.
//!
//! `StorageClass` is a manual bitset (one bit per flag) so attribute
//! accumulation and the exclusive-group checks are plain integer ops.

use std::fmt;

/// A set of storage class flags.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct StorageClass(u64);

impl StorageClass {
    pub const NONE: StorageClass = StorageClass(0);

    pub const CONST: StorageClass = StorageClass(1 << 0);
    pub const IMMUTABLE: StorageClass = StorageClass(1 << 1);
    pub const SHARED: StorageClass = StorageClass(1 << 2);
    /// `inout`
    pub const WILD: StorageClass = StorageClass(1 << 3);
    pub const STATIC: StorageClass = StorageClass(1 << 4);
    pub const FINAL: StorageClass = StorageClass(1 << 5);
    pub const AUTO: StorageClass = StorageClass(1 << 6);
    pub const SCOPE: StorageClass = StorageClass(1 << 7);
    pub const OVERRIDE: StorageClass = StorageClass(1 << 8);
    pub const ABSTRACT: StorageClass = StorageClass(1 << 9);
    pub const SYNCHRONIZED: StorageClass = StorageClass(1 << 10);
    pub const DEPRECATED: StorageClass = StorageClass(1 << 11);
    pub const NOTHROW: StorageClass = StorageClass(1 << 12);
    pub const PURE: StorageClass = StorageClass(1 << 13);
    pub const REF: StorageClass = StorageClass(1 << 14);
    /// `__gshared`
    pub const GSHARED: StorageClass = StorageClass(1 << 15);
    /// `enum` used as a storage class (manifest constant)
    pub const MANIFEST: StorageClass = StorageClass(1 << 16);
    /// `return` as a parameter/member-function storage class
    pub const RETURN: StorageClass = StorageClass(1 << 17);
    pub const IN: StorageClass = StorageClass(1 << 18);
    pub const OUT: StorageClass = StorageClass(1 << 19);
    pub const LAZY: StorageClass = StorageClass(1 << 20);
    pub const ALIAS: StorageClass = StorageClass(1 << 21);
    /// `@disable`
    pub const DISABLE: StorageClass = StorageClass(1 << 22);
    /// `@property`
    pub const PROPERTY: StorageClass = StorageClass(1 << 23);
    /// `@nogc`
    pub const NOGC: StorageClass = StorageClass(1 << 24);
    /// `@safe`
    pub const SAFE: StorageClass = StorageClass(1 << 25);
    /// `@trusted`
    pub const TRUSTED: StorageClass = StorageClass(1 << 26);
    /// `@system`
    pub const SYSTEM: StorageClass = StorageClass(1 << 27);
    /// `@live`
    pub const LIVE: StorageClass = StorageClass(1 << 28);
    /// `@future`
    pub const FUTURE: StorageClass = StorageClass(1 << 29);
    /// `extern` without a linkage list
    pub const EXTERN: StorageClass = StorageClass(1 << 30);
    /// Thread-local is the default; the flag exists for the gshared group.
    pub const TLS: StorageClass = StorageClass(1 << 31);

    /// Exclusive group: at most one of `const`, `immutable`, `enum`(manifest).
    pub const GROUP_MUTABILITY: StorageClass =
        StorageClass(Self::CONST.0 | Self::IMMUTABLE.0 | Self::MANIFEST.0);

    /// Exclusive group: at most one of `__gshared`, `shared`, thread-local.
    pub const GROUP_GLOBAL: StorageClass =
        StorageClass(Self::GSHARED.0 | Self::SHARED.0 | Self::TLS.0);

    /// Exclusive group: at most one of `@safe`, `@trusted`, `@system`, `@live`.
    pub const GROUP_SAFETY: StorageClass =
        StorageClass(Self::SAFE.0 | Self::TRUSTED.0 | Self::SYSTEM.0 | Self::LIVE.0);

    /// Flags that are also type constructors.
    pub const TYPE_CTOR: StorageClass =
        StorageClass(Self::CONST.0 | Self::IMMUTABLE.0 | Self::SHARED.0 | Self::WILD.0);

    #[inline]
    pub const fn bits(self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    #[must_use]
    pub const fn with(self, other: StorageClass) -> StorageClass {
        StorageClass(self.0 | other.0)
    }

    #[inline]
    #[must_use]
    pub const fn without(self, other: StorageClass) -> StorageClass {
        StorageClass(self.0 & !other.0)
    }

    /// True if any flag of `other` is present.
    #[inline]
    pub const fn intersects(self, other: StorageClass) -> bool {
        (self.0 & other.0) != 0
    }

    /// True if every flag of `other` is present.
    #[inline]
    pub const fn contains(self, other: StorageClass) -> bool {
        (self.0 & other.0) == other.0
    }

    #[inline]
    #[must_use]
    pub const fn intersection(self, other: StorageClass) -> StorageClass {
        StorageClass(self.0 & other.0)
    }

    /// Number of flags set.
    #[inline]
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Spelling of a single flag, for diagnostics.
    pub fn flag_name(flag: StorageClass) -> &'static str {
        match flag {
            f if f == Self::CONST => "const",
            f if f == Self::IMMUTABLE => "immutable",
            f if f == Self::SHARED => "shared",
            f if f == Self::WILD => "inout",
            f if f == Self::STATIC => "static",
            f if f == Self::FINAL => "final",
            f if f == Self::AUTO => "auto",
            f if f == Self::SCOPE => "scope",
            f if f == Self::OVERRIDE => "override",
            f if f == Self::ABSTRACT => "abstract",
            f if f == Self::SYNCHRONIZED => "synchronized",
            f if f == Self::DEPRECATED => "deprecated",
            f if f == Self::NOTHROW => "nothrow",
            f if f == Self::PURE => "pure",
            f if f == Self::REF => "ref",
            f if f == Self::GSHARED => "__gshared",
            f if f == Self::MANIFEST => "enum",
            f if f == Self::RETURN => "return",
            f if f == Self::IN => "in",
            f if f == Self::OUT => "out",
            f if f == Self::LAZY => "lazy",
            f if f == Self::ALIAS => "alias",
            f if f == Self::DISABLE => "@disable",
            f if f == Self::PROPERTY => "@property",
            f if f == Self::NOGC => "@nogc",
            f if f == Self::SAFE => "@safe",
            f if f == Self::TRUSTED => "@trusted",
            f if f == Self::SYSTEM => "@system",
            f if f == Self::LIVE => "@live",
            f if f == Self::FUTURE => "@future",
            f if f == Self::EXTERN => "extern",
            f if f == Self::TLS => "thread-local",
            _ => "storage class",
        }
    }

    /// The lowest set flag, as its own set. Empty input yields `NONE`.
    #[inline]
    pub const fn first(self) -> StorageClass {
        StorageClass(self.0 & self.0.wrapping_neg())
    }
}

impl std::ops::BitOr for StorageClass {
    type Output = StorageClass;

    fn bitor(self, rhs: StorageClass) -> StorageClass {
        self.with(rhs)
    }
}

impl std::ops::BitOrAssign for StorageClass {
    fn bitor_assign(&mut self, rhs: StorageClass) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for StorageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "StorageClass(none)");
        }
        write!(f, "StorageClass(")?;
        let mut rest = self.0;
        let mut first = true;
        while rest != 0 {
            let bit = StorageClass(rest & rest.wrapping_neg());
            if !first {
                write!(f, " | ")?;
            }
            write!(f, "{}", StorageClass::flag_name(bit))?;
            first = false;
            rest &= rest - 1;
        }
        write!(f, ")")
    }
}

/// Type qualifier bits for `const(T)`-style type constructors and
/// qualifier-only casts (`cast(shared)e`).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct ModFlags(u8);

impl ModFlags {
    pub const NONE: ModFlags = ModFlags(0);
    pub const CONST: ModFlags = ModFlags(1);
    pub const IMMUTABLE: ModFlags = ModFlags(2);
    pub const SHARED: ModFlags = ModFlags(4);
    pub const WILD: ModFlags = ModFlags(8);

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    #[must_use]
    pub const fn with(self, other: ModFlags) -> ModFlags {
        ModFlags(self.0 | other.0)
    }

    #[inline]
    pub const fn contains(self, other: ModFlags) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl fmt::Debug for ModFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.contains(ModFlags::CONST) {
            parts.push("const");
        }
        if self.contains(ModFlags::IMMUTABLE) {
            parts.push("immutable");
        }
        if self.contains(ModFlags::SHARED) {
            parts.push("shared");
        }
        if self.contains(ModFlags::WILD) {
            parts.push("inout");
        }
        write!(f, "ModFlags({})", parts.join(" "))
    }
}

/// Calling/mangling convention from `extern(...)`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Linkage {
    #[default]
    Default,
    D,
    C,
    Cpp,
    Windows,
    Pascal,
    ObjectiveC,
    System,
}

impl Linkage {
    pub const fn display_name(self) -> &'static str {
        match self {
            Linkage::Default => "default",
            Linkage::D => "D",
            Linkage::C => "C",
            Linkage::Cpp => "C++",
            Linkage::Windows => "Windows",
            Linkage::Pascal => "Pascal",
            Linkage::ObjectiveC => "Objective-C",
            Linkage::System => "System",
        }
    }
}

/// How `extern(C++)` aggregates mangle.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum CppMangle {
    #[default]
    Default,
    AsStruct,
    AsClass,
}

/// Protection (visibility) level.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Protection {
    #[default]
    Undefined,
    Private,
    Package,
    Protected,
    Public,
    Export,
}

impl Protection {
    pub const fn display_name(self) -> &'static str {
        match self {
            Protection::Undefined => "undefined",
            Protection::Private => "private",
            Protection::Package => "package",
            Protection::Protected => "protected",
            Protection::Public => "public",
            Protection::Export => "export",
        }
    }
}
