//! Token cursor for navigating the token stream.
//!
//! Provides low-level token access, arbitrary lookahead, and consumption.
//! `peek(k)` is positional and restartable: the lookahead probes walk the
//! same list by index and never move the cursor.

use crate::probes;
use dray_ir::{Name, Span, Token, TokenKind, TokenList};

/// Cursor over the token stream of one module.
pub struct Cursor<'a> {
    tokens: &'a TokenList,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(tokens: &'a TokenList) -> Self {
        Cursor { tokens, pos: 0 }
    }

    /// The underlying token list, for probes and token captures.
    #[inline]
    pub fn tokens(&self) -> &'a TokenList {
        self.tokens
    }

    /// Current position in the token stream.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Reset the position. Used to restore after speculative scans.
    #[inline]
    pub fn set_position(&mut self, pos: usize) {
        debug_assert!(pos <= self.tokens.len());
        self.pos = pos;
    }

    /// The current token. Saturates at the trailing EOF token.
    #[inline]
    pub fn current(&self) -> &Token {
        self.tokens.token(self.pos)
    }

    /// The current token's kind.
    #[inline]
    pub fn kind(&self) -> TokenKind {
        self.tokens.kind(self.pos)
    }

    /// The current token's span.
    #[inline]
    pub fn span(&self) -> Span {
        self.current().span
    }

    /// The previous token's span (DUMMY at position 0).
    #[inline]
    pub fn prev_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens.span(self.pos - 1)
        } else {
            Span::DUMMY
        }
    }

    /// Pure lookahead: the token `k` positions ahead (`peek(0)` is the
    /// current token).
    #[inline]
    pub fn peek(&self, k: usize) -> &Token {
        self.tokens.token(self.pos + k)
    }

    /// Pure lookahead of a kind only.
    #[inline]
    pub fn peek_kind(&self, k: usize) -> TokenKind {
        self.tokens.kind(self.pos + k)
    }

    /// Check the current token against a kind.
    #[inline]
    pub fn check(&self, kind: TokenKind) -> bool {
        self.kind() == kind
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.kind() == TokenKind::Eof
    }

    /// Advance to the next token and return the consumed token.
    ///
    /// The trailing EOF token is never consumed; advancing there is a
    /// no-op on the saturated position.
    #[inline]
    pub fn advance(&mut self) -> &Token {
        let current = self.pos;
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        } else {
            self.pos = self.tokens.len().saturating_sub(1);
        }
        self.tokens.token(current)
    }

    /// The identifier handle of the current token, if it is one.
    #[inline]
    pub fn ident(&self) -> Option<Name> {
        self.current().ident()
    }

    /// Position just past the `)` matching the `(` at `pos`.
    ///
    /// Returns the EOF position when unbalanced; the caller diagnoses.
    pub fn peek_past_paren(&self, pos: usize) -> usize {
        probes::skip_parens(self.tokens, pos)
            .unwrap_or_else(|| self.tokens.len().saturating_sub(1))
    }
}
