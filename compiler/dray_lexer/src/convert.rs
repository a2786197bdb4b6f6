//! Literal cooking and interning: raw tokens to final tokens.

use crate::parse_helpers::{cook_float, cook_int};
use dray_diagnostic::{Handler, Severity};
use dray_ir::{Span, StringInterner, Token, TokenKind, TokenValue};

/// Cook an identifier token.
pub(crate) fn convert_ident(slice: &str, span: Span, interner: &StringInterner) -> Token {
    Token::with_value(
        TokenKind::Identifier,
        span,
        TokenValue::Ident(interner.intern(slice)),
    )
}

/// Cook an integer literal token.
pub(crate) fn convert_int(slice: &str, span: Span, handler: &mut dyn Handler) -> Token {
    let (value, suffix) = cook_int(slice).unwrap_or_else(|| {
        handler.report(
            span,
            Severity::Error,
            format!("integer literal `{slice}` overflows"),
            false,
        );
        (u64::MAX, dray_ir::IntSuffix::None)
    });
    Token::with_value(TokenKind::IntLiteral, span, TokenValue::Int { value, suffix })
}

/// Cook a float literal token.
pub(crate) fn convert_float(slice: &str, span: Span, handler: &mut dyn Handler) -> Token {
    let (value, suffix) = cook_float(slice).unwrap_or_else(|| {
        handler.report(
            span,
            Severity::Error,
            format!("malformed floating point literal `{slice}`"),
            false,
        );
        (0.0, dray_ir::FloatSuffix::None)
    });
    Token::with_value(
        TokenKind::FloatLiteral,
        span,
        TokenValue::Float {
            bits: value.to_bits(),
            suffix,
        },
    )
}

/// Split a trailing `c`/`w`/`d` postfix from a string literal slice.
fn split_postfix(slice: &str) -> (&str, u8) {
    match slice.as_bytes().last() {
        Some(p @ (b'c' | b'w' | b'd')) => (&slice[..slice.len() - 1], *p),
        _ => (slice, 0),
    }
}

/// Cook a double-quoted string literal (escapes processed).
pub(crate) fn convert_string(
    slice: &str,
    span: Span,
    interner: &StringInterner,
    handler: &mut dyn Handler,
) -> Token {
    let (body, postfix) = split_postfix(slice);
    // Strip the surrounding quotes.
    let content = &body[1..body.len() - 1];
    let cooked = unescape(content, span, handler);
    Token::with_value(
        TokenKind::StringLiteral,
        span,
        TokenValue::Str {
            name: interner.intern(&cooked),
            postfix,
        },
    )
}

/// Cook a wysiwyg string literal (`r"..."` or backquoted; no escapes).
pub(crate) fn convert_wysiwyg(slice: &str, span: Span, interner: &StringInterner) -> Token {
    let (body, postfix) = split_postfix(slice);
    // Strip `r"` / `"` or the backquotes.
    let content = if let Some(rest) = body.strip_prefix("r\"") {
        &rest[..rest.len() - 1]
    } else {
        &body[1..body.len() - 1]
    };
    Token::with_value(
        TokenKind::StringLiteral,
        span,
        TokenValue::Str {
            name: interner.intern(content),
            postfix,
        },
    )
}

/// Cook a character literal.
pub(crate) fn convert_char(slice: &str, span: Span, handler: &mut dyn Handler) -> Token {
    let content = &slice[1..slice.len() - 1];
    let cooked = unescape(content, span, handler);
    let mut chars = cooked.chars();
    let c = chars.next().unwrap_or('\0');
    if chars.next().is_some() {
        handler.report(
            span,
            Severity::Error,
            "character literal has more than one character".to_string(),
            false,
        );
    }
    Token::with_value(TokenKind::CharLiteral, span, TokenValue::Char(c))
}

/// Process escape sequences. Unknown escapes are kept literally after a
/// diagnostic.
fn unescape(content: &str, span: Span, handler: &mut dyn Handler) -> String {
    let mut out = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('0') => out.push('\0'),
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some('a') => out.push('\x07'),
            Some('b') => out.push('\x08'),
            Some('f') => out.push('\x0c'),
            Some('v') => out.push('\x0b'),
            Some('x') => {
                let hi = chars.next();
                let lo = chars.next();
                match (
                    hi.and_then(|c| c.to_digit(16)),
                    lo.and_then(|c| c.to_digit(16)),
                ) {
                    (Some(hi), Some(lo)) => {
                        out.push(char::from_u32(hi * 16 + lo).unwrap_or('\u{fffd}'));
                    }
                    _ => {
                        handler.report(
                            span,
                            Severity::Error,
                            "invalid `\\x` escape sequence".to_string(),
                            false,
                        );
                        out.push_str("\\x");
                    }
                }
            }
            Some(esc @ ('u' | 'U')) => {
                let width = if esc == 'U' { 8 } else { 4 };
                let mut value = 0u32;
                let mut ok = true;
                for _ in 0..width {
                    match chars.next().and_then(|c| c.to_digit(16)) {
                        Some(d) => value = value * 16 + d,
                        None => {
                            ok = false;
                            break;
                        }
                    }
                }
                if ok {
                    out.push(char::from_u32(value).unwrap_or('\u{fffd}'));
                } else {
                    handler.report(
                        span,
                        Severity::Error,
                        "invalid unicode escape sequence".to_string(),
                        false,
                    );
                }
            }
            Some(other) => {
                handler.report(
                    span,
                    Severity::Deprecation,
                    format!("undefined escape sequence `\\{other}`"),
                    false,
                );
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use dray_diagnostic::CollectHandler;

    #[test]
    fn unescape_basics() {
        let mut h = CollectHandler::new();
        assert_eq!(unescape(r"a\nb", Span::DUMMY, &mut h), "a\nb");
        assert_eq!(unescape(r"\x41", Span::DUMMY, &mut h), "A");
        assert_eq!(unescape(r"A", Span::DUMMY, &mut h), "A");
        assert!(h.set().is_empty());
    }

    #[test]
    fn unknown_escape_diagnosed_and_kept() {
        let mut h = CollectHandler::new();
        assert_eq!(unescape(r"\q", Span::DUMMY, &mut h), "\\q");
        assert_eq!(h.set().len(), 1);
        assert_eq!(h.set()[0].severity, Severity::Deprecation);
    }
}
