//! Error recovery for the parser.
//!
//! Token sets with O(1) membership testing, and the synchronization loop
//! used to re-align on statement/declaration boundaries after an error.

use crate::cursor::Cursor;
use dray_ir::TokenKind;

/// A set of token kinds using bitset representation.
///
/// Four 64-bit words cover the whole token alphabet; membership testing is
/// a shift and a mask.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenSet([u64; 4]);

impl TokenSet {
    /// Create an empty token set.
    #[inline]
    pub const fn new() -> Self {
        Self([0; 4])
    }

    /// Add a token kind to this set (builder pattern for const contexts).
    #[inline]
    #[must_use]
    pub const fn with(self, kind: TokenKind) -> Self {
        let mut words = self.0;
        let tag = kind.tag() as usize;
        words[tag / 64] |= 1u64 << (tag % 64);
        Self(words)
    }

    /// Union of two token sets.
    #[inline]
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self([
            self.0[0] | other.0[0],
            self.0[1] | other.0[1],
            self.0[2] | other.0[2],
            self.0[3] | other.0[3],
        ])
    }

    /// Check if this set contains a token kind.
    #[inline]
    pub const fn contains(&self, kind: TokenKind) -> bool {
        let tag = kind.tag() as usize;
        (self.0[tag / 64] & (1u64 << (tag % 64))) != 0
    }

    /// Check if this set is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.0[0] == 0 && self.0[1] == 0 && self.0[2] == 0 && self.0[3] == 0
    }

    /// Count the number of token kinds in this set.
    #[inline]
    pub const fn count(&self) -> u32 {
        self.0[0].count_ones()
            + self.0[1].count_ones()
            + self.0[2].count_ones()
            + self.0[3].count_ones()
    }
}

impl Default for TokenSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Recovery set for declaration boundaries: resync to the next `;`, the
/// end of the enclosing block, or EOF.
pub const DECL_BOUNDARY: TokenSet = TokenSet::new()
    .with(TokenKind::Semicolon)
    .with(TokenKind::RightCurly)
    .with(TokenKind::Eof);

/// Recovery set for statement boundaries.
pub const STMT_BOUNDARY: TokenSet = TokenSet::new()
    .with(TokenKind::Semicolon)
    .with(TokenKind::RightCurly)
    .with(TokenKind::Eof);

/// Advance the cursor until reaching a token in the recovery set or EOF.
///
/// Returns `true` if a recovery token was found before EOF.
pub fn synchronize(cursor: &mut Cursor<'_>, recovery: TokenSet) -> bool {
    while !cursor.is_at_end() {
        if recovery.contains(cursor.kind()) {
            return true;
        }
        cursor.advance();
    }
    recovery.contains(TokenKind::Eof)
}
