#![recursion_limit = "256"]
//! Lexer for Dray using logos with string interning.
//!
//! The main entry point is [`lex()`], which converts a source buffer into a
//! [`TokenList`] satisfying the contract the parser requires:
//!
//! - the last token is always `Eof`, so positional lookahead saturates;
//! - doc comments (`///`, `/** */`, `/++ +/`) are attached to the next
//!   non-trivia token and never duplicated;
//! - lex diagnostics flow to the handler as they are produced, so by the
//!   time the parser inspects a token, its diagnostics have been surfaced.
//!
//! Invalid input produces `TokenKind::Error` tokens with a diagnostic; the
//! lexer continues past errors.

mod convert;
mod parse_helpers;
mod raw_token;

use convert::{convert_char, convert_float, convert_ident, convert_int, convert_string, convert_wysiwyg};
use dray_diagnostic::{Handler, Severity};
use dray_ir::{Span, StringInterner, Token, TokenKind, TokenList};
use logos::Logos;
use raw_token::RawToken;

/// Lex a source buffer into a [`TokenList`].
///
/// The parser itself never reads files; callers hand it an in-memory
/// UTF-8 buffer.
pub fn lex(source: &str, interner: &StringInterner, handler: &mut dyn Handler) -> TokenList {
    let mut result = TokenList::with_capacity(source.len() / 6 + 1);
    let mut logos = RawToken::lexer(source);
    let mut pending_doc: Option<String> = None;

    while let Some(token_result) = logos.next() {
        let span = Span::from_range(logos.span());
        let slice = logos.slice();

        let token = match token_result {
            Ok(raw) => match raw {
                RawToken::LineComment => continue,
                RawToken::BlockComment(false) | RawToken::NestingComment(false) => continue,
                RawToken::DocLineComment => {
                    append_doc(&mut pending_doc, slice.trim_start_matches('/').trim());
                    continue;
                }
                RawToken::BlockComment(true) => {
                    let body = &slice[3..slice.len() - 2];
                    append_doc(&mut pending_doc, body.trim());
                    continue;
                }
                RawToken::NestingComment(true) => {
                    let body = &slice[3..slice.len() - 2];
                    append_doc(&mut pending_doc, body.trim());
                    continue;
                }
                RawToken::Ident => convert_ident(slice, span, interner),
                RawToken::IntLit => convert_int(slice, span, handler),
                RawToken::FloatLit => convert_float(slice, span, handler),
                RawToken::Str => convert_string(slice, span, interner, handler),
                RawToken::WysiwygStr | RawToken::BacktickStr => {
                    convert_wysiwyg(slice, span, interner)
                }
                RawToken::CharLit => convert_char(slice, span, handler),
                RawToken::Simple(kind) => Token::new(kind, span),
            },
            Err(()) => {
                report_scan_error(slice, span, handler);
                Token::new(TokenKind::Error, span)
            }
        };

        let mut token = token;
        if let Some(doc) = pending_doc.take() {
            token.doc = Some(interner.intern(&doc));
        }
        result.push(token);
    }

    let eof_pos = u32::try_from(source.len()).unwrap_or(u32::MAX);
    result.push(Token::new(TokenKind::Eof, Span::point(eof_pos)));
    result
}

/// Merge consecutive doc comments, as they document one symbol together.
fn append_doc(pending: &mut Option<String>, text: &str) {
    match pending {
        Some(doc) => {
            doc.push('\n');
            doc.push_str(text);
        }
        None => *pending = Some(text.to_string()),
    }
}

#[cold]
fn report_scan_error(slice: &str, span: Span, handler: &mut dyn Handler) {
    let message = if slice.starts_with("/*") {
        "unterminated block comment".to_string()
    } else if slice.starts_with("/+") {
        "unterminated nesting comment".to_string()
    } else if slice.starts_with('"') || slice.starts_with("r\"") || slice.starts_with('`') {
        "unterminated string literal".to_string()
    } else if slice.starts_with('\'') {
        "unterminated character literal".to_string()
    } else {
        format!("unrecognized character `{}`", slice.escape_default())
    };
    handler.report(span, Severity::Error, message, false);
}

#[cfg(test)]
mod tests {
    use super::*;
    use dray_diagnostic::CollectHandler;
    use dray_ir::TokenValue;

    fn lex_ok(source: &str) -> TokenList {
        let interner = StringInterner::new();
        let mut handler = CollectHandler::new();
        let tokens = lex(source, &interner, &mut handler);
        assert!(
            handler.set().is_empty(),
            "unexpected diagnostics: {:?}",
            handler.set()
        );
        tokens
    }

    #[test]
    fn empty_input_is_just_eof() {
        let tokens = lex_ok("");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens.kind(0), TokenKind::Eof);
    }

    #[test]
    fn module_header() {
        let tokens = lex_ok("module a.b;");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Module,
                TokenKind::Identifier,
                TokenKind::Dot,
                TokenKind::Identifier,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn keywords_beat_identifiers() {
        let tokens = lex_ok("if iffy foreach foreach_reverse");
        assert_eq!(tokens.kind(0), TokenKind::If);
        assert_eq!(tokens.kind(1), TokenKind::Identifier);
        assert_eq!(tokens.kind(2), TokenKind::Foreach);
        assert_eq!(tokens.kind(3), TokenKind::ForeachReverse);
    }

    #[test]
    fn range_vs_float() {
        let tokens = lex_ok("1..2");
        assert_eq!(tokens.kind(0), TokenKind::IntLiteral);
        assert_eq!(tokens.kind(1), TokenKind::DotDot);
        assert_eq!(tokens.kind(2), TokenKind::IntLiteral);

        let tokens = lex_ok("1.5");
        assert_eq!(tokens.kind(0), TokenKind::FloatLiteral);
    }

    #[test]
    fn int_suffixes() {
        let tokens = lex_ok("42u 42L 42uL 0xFFu");
        for i in 0..4 {
            assert_eq!(tokens.kind(i), TokenKind::IntLiteral, "token {i}");
        }
        assert_eq!(
            tokens.token(0).int_value(),
            Some((42, dray_ir::IntSuffix::Unsigned))
        );
        assert_eq!(
            tokens.token(3).int_value(),
            Some((255, dray_ir::IntSuffix::Unsigned))
        );
    }

    #[test]
    fn compound_operators() {
        let tokens = lex_ok(">>> >>>= ^^ ^^= ~= => ...");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::UnsignedRightShift,
                TokenKind::UnsignedRightShiftAssign,
                TokenKind::Pow,
                TokenKind::PowAssign,
                TokenKind::ConcatAssign,
                TokenKind::GoesTo,
                TokenKind::DotDotDot,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn string_postfix() {
        let interner = StringInterner::new();
        let mut handler = CollectHandler::new();
        let tokens = lex(r#""abc"c "xy"w"#, &interner, &mut handler);

        let (name, postfix) = tokens.token(0).string_value().unwrap();
        assert_eq!(interner.lookup(name), "abc");
        assert_eq!(postfix, b'c');

        let (_, postfix) = tokens.token(1).string_value().unwrap();
        assert_eq!(postfix, b'w');
    }

    #[test]
    fn wysiwyg_strings_keep_backslashes() {
        let interner = StringInterner::new();
        let mut handler = CollectHandler::new();
        let tokens = lex(r#"r"a\nb" `c\d`"#, &interner, &mut handler);

        let (name, _) = tokens.token(0).string_value().unwrap();
        assert_eq!(interner.lookup(name), r"a\nb");
        let (name, _) = tokens.token(1).string_value().unwrap();
        assert_eq!(interner.lookup(name), r"c\d");
    }

    #[test]
    fn nesting_comments_nest() {
        let tokens = lex_ok("a /+ outer /+ inner +/ still +/ b");
        assert_eq!(tokens.len(), 3); // a, b, EOF
        assert_eq!(tokens.kind(0), TokenKind::Identifier);
        assert_eq!(tokens.kind(1), TokenKind::Identifier);
    }

    #[test]
    fn doc_comment_attaches_to_next_token() {
        let interner = StringInterner::new();
        let mut handler = CollectHandler::new();
        let tokens = lex("/// docs here\nint x;", &interner, &mut handler);

        let doc = tokens.token(0).doc.expect("doc attached to `int`");
        assert_eq!(interner.lookup(doc), "docs here");
        assert!(tokens.token(1).doc.is_none());
    }

    #[test]
    fn consecutive_doc_comments_merge() {
        let interner = StringInterner::new();
        let mut handler = CollectHandler::new();
        let tokens = lex("/// one\n/// two\nint x;", &interner, &mut handler);

        let doc = tokens.token(0).doc.unwrap();
        assert_eq!(interner.lookup(doc), "one\ntwo");
    }

    #[test]
    fn non_doc_comments_are_skipped() {
        let tokens = lex_ok("a // line\n/* block */ /+ nest +/ b");
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn unterminated_comment_is_diagnosed() {
        let interner = StringInterner::new();
        let mut handler = CollectHandler::new();
        let tokens = lex("a /* no end", &interner, &mut handler);

        assert!(tokens.iter().any(|t| t.kind == TokenKind::Error));
        assert_eq!(handler.set().len(), 1);
        assert!(handler.set()[0].message.contains("unterminated block comment"));
    }

    #[test]
    fn char_literals() {
        let tokens = lex_ok(r"'a' '\n' '\\'");
        assert_eq!(
            tokens.token(0).value,
            TokenValue::Char('a'),
        );
        assert_eq!(tokens.token(1).value, TokenValue::Char('\n'));
        assert_eq!(tokens.token(2).value, TokenValue::Char('\\'));
    }

    #[test]
    fn dunder_keywords() {
        let tokens = lex_ok("__traits __vector __gshared __FILE__ __LINE__");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Traits,
                TokenKind::Vector,
                TokenKind::Gshared,
                TokenKind::SpecialFile,
                TokenKind::SpecialLine,
                TokenKind::Eof,
            ]
        );
    }
}
