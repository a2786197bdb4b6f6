//! Raw token definition.
//!
//! The `RawToken` enum is the logos-derived tokenizer output before literal
//! cooking and string interning. Keywords and operators carry their final
//! [`TokenKind`] directly; literal and comment variants are cooked by
//! `convert` and the comment handlers.

use dray_ir::TokenKind;
use logos::{Lexer, Logos};

/// Scan past a `/* ... */` comment. Returns whether it is a doc comment
/// (`/**`, but not the empty `/**/`). Fails on unterminated input.
fn block_comment(lex: &mut Lexer<RawToken>) -> Result<bool, ()> {
    let rem = lex.remainder();
    match rem.find("*/") {
        Some(i) => {
            lex.bump(i + 2);
            let s = lex.slice();
            Ok(s.starts_with("/**") && s.len() > 4)
        }
        None => {
            lex.bump(rem.len());
            Err(())
        }
    }
}

/// Scan past a nesting `/+ ... +/` comment. Returns whether it is a doc
/// comment (`/++`, but not the empty `/++/`). Fails on unterminated input.
fn nesting_comment(lex: &mut Lexer<RawToken>) -> Result<bool, ()> {
    let bytes = lex.remainder().as_bytes();
    let mut depth = 1usize;
    let mut i = 0usize;
    while i + 1 < bytes.len() {
        if bytes[i] == b'/' && bytes[i + 1] == b'+' {
            depth += 1;
            i += 2;
        } else if bytes[i] == b'+' && bytes[i + 1] == b'/' {
            depth -= 1;
            i += 2;
            if depth == 0 {
                lex.bump(i);
                let s = lex.slice();
                return Ok(s.starts_with("/++") && s.len() > 4);
            }
        } else {
            i += 1;
        }
    }
    lex.bump(bytes.len());
    Err(())
}

/// Raw token from logos (before cooking).
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n\x0b\x0c]+")]
pub(crate) enum RawToken {
    #[regex(r"///[^\n]*")]
    DocLineComment,
    #[regex(r"//([^/\n][^\n]*)?")]
    LineComment,
    /// Payload: is this a doc comment.
    #[token("/*", block_comment)]
    BlockComment(bool),
    /// Payload: is this a doc comment.
    #[token("/+", nesting_comment)]
    NestingComment(bool),

    #[regex(r"[_a-zA-Z][_a-zA-Z0-9]*")]
    Ident,

    #[regex(r"0[xX][0-9a-fA-F_]+([uU]L?|L[uU]?)?")]
    #[regex(r"0[bB][01_]+([uU]L?|L[uU]?)?")]
    #[regex(r"[0-9][0-9_]*([uU]L?|L[uU]?)?")]
    IntLit,

    #[regex(r"[0-9][0-9_]*\.[0-9][0-9_]*([eE][+-]?[0-9][0-9_]*)?[fFL]?")]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9][0-9_]*[fFL]?")]
    #[regex(r"[0-9][0-9_]*[fF]")]
    FloatLit,

    /// Double-quoted string with escapes, optional `c`/`w`/`d` postfix.
    #[regex(r#""([^"\\]|\\.)*"[cwd]?"#)]
    Str,
    /// Wysiwyg string `r"..."`: no escapes.
    #[regex(r#"r"[^"]*"[cwd]?"#)]
    WysiwygStr,
    /// Backquoted wysiwyg string.
    #[regex(r"`[^`]*`[cwd]?")]
    BacktickStr,

    #[regex(r"'([^'\\]|\\.)+'")]
    CharLit,

    // Keywords and operators carry their TokenKind directly.
    #[token("module", |_| TokenKind::Module)]
    #[token("import", |_| TokenKind::Import)]
    #[token("struct", |_| TokenKind::Struct)]
    #[token("union", |_| TokenKind::Union)]
    #[token("class", |_| TokenKind::Class)]
    #[token("interface", |_| TokenKind::Interface)]
    #[token("enum", |_| TokenKind::Enum)]
    #[token("template", |_| TokenKind::Template)]
    #[token("mixin", |_| TokenKind::Mixin)]
    #[token("alias", |_| TokenKind::Alias)]
    #[token("this", |_| TokenKind::This)]
    #[token("super", |_| TokenKind::Super)]
    #[token("if", |_| TokenKind::If)]
    #[token("else", |_| TokenKind::Else)]
    #[token("while", |_| TokenKind::While)]
    #[token("do", |_| TokenKind::Do)]
    #[token("for", |_| TokenKind::For)]
    #[token("foreach", |_| TokenKind::Foreach)]
    #[token("foreach_reverse", |_| TokenKind::ForeachReverse)]
    #[token("switch", |_| TokenKind::Switch)]
    #[token("case", |_| TokenKind::Case)]
    #[token("default", |_| TokenKind::Default)]
    #[token("break", |_| TokenKind::Break)]
    #[token("continue", |_| TokenKind::Continue)]
    #[token("return", |_| TokenKind::Return)]
    #[token("goto", |_| TokenKind::Goto)]
    #[token("with", |_| TokenKind::With)]
    #[token("synchronized", |_| TokenKind::Synchronized)]
    #[token("try", |_| TokenKind::Try)]
    #[token("catch", |_| TokenKind::Catch)]
    #[token("finally", |_| TokenKind::Finally)]
    #[token("throw", |_| TokenKind::Throw)]
    #[token("scope", |_| TokenKind::Scope)]
    #[token("asm", |_| TokenKind::Asm)]
    #[token("pragma", |_| TokenKind::Pragma)]
    #[token("debug", |_| TokenKind::Debug)]
    #[token("version", |_| TokenKind::Version)]
    #[token("unittest", |_| TokenKind::Unittest)]
    #[token("invariant", |_| TokenKind::Invariant)]
    #[token("in", |_| TokenKind::In)]
    #[token("out", |_| TokenKind::Out)]
    #[token("is", |_| TokenKind::Is)]
    #[token("new", |_| TokenKind::New)]
    #[token("cast", |_| TokenKind::Cast)]
    #[token("typeof", |_| TokenKind::Typeof)]
    #[token("typeid", |_| TokenKind::Typeid)]
    #[token("assert", |_| TokenKind::Assert)]
    #[token("static", |_| TokenKind::Static)]
    #[token("final", |_| TokenKind::Final)]
    #[token("const", |_| TokenKind::Const)]
    #[token("immutable", |_| TokenKind::Immutable)]
    #[token("inout", |_| TokenKind::Inout)]
    #[token("shared", |_| TokenKind::Shared)]
    #[token("abstract", |_| TokenKind::Abstract)]
    #[token("override", |_| TokenKind::Override)]
    #[token("auto", |_| TokenKind::Auto)]
    #[token("ref", |_| TokenKind::Ref)]
    #[token("lazy", |_| TokenKind::Lazy)]
    #[token("align", |_| TokenKind::Align)]
    #[token("extern", |_| TokenKind::Extern)]
    #[token("private", |_| TokenKind::Private)]
    #[token("package", |_| TokenKind::Package)]
    #[token("protected", |_| TokenKind::Protected)]
    #[token("public", |_| TokenKind::Public)]
    #[token("export", |_| TokenKind::Export)]
    #[token("deprecated", |_| TokenKind::Deprecated)]
    #[token("nothrow", |_| TokenKind::Nothrow)]
    #[token("pure", |_| TokenKind::Pure)]
    #[token("function", |_| TokenKind::Function)]
    #[token("delegate", |_| TokenKind::Delegate)]
    #[token("true", |_| TokenKind::True)]
    #[token("false", |_| TokenKind::False)]
    #[token("null", |_| TokenKind::Null)]
    #[token("void", |_| TokenKind::Void)]
    #[token("bool", |_| TokenKind::Bool)]
    #[token("byte", |_| TokenKind::Byte)]
    #[token("ubyte", |_| TokenKind::Ubyte)]
    #[token("short", |_| TokenKind::Short)]
    #[token("ushort", |_| TokenKind::Ushort)]
    #[token("int", |_| TokenKind::Int)]
    #[token("uint", |_| TokenKind::Uint)]
    #[token("long", |_| TokenKind::Long)]
    #[token("ulong", |_| TokenKind::Ulong)]
    #[token("cent", |_| TokenKind::Cent)]
    #[token("ucent", |_| TokenKind::Ucent)]
    #[token("float", |_| TokenKind::Float)]
    #[token("double", |_| TokenKind::Double)]
    #[token("real", |_| TokenKind::Real)]
    #[token("char", |_| TokenKind::Char)]
    #[token("wchar", |_| TokenKind::Wchar)]
    #[token("dchar", |_| TokenKind::Dchar)]
    #[token("__gshared", |_| TokenKind::Gshared)]
    #[token("__traits", |_| TokenKind::Traits)]
    #[token("__vector", |_| TokenKind::Vector)]
    #[token("__parameters", |_| TokenKind::ParametersKw)]
    #[token("__argTypes", |_| TokenKind::ArgTypesKw)]
    #[token("__FILE__", |_| TokenKind::SpecialFile)]
    #[token("__FILE_FULL_PATH__", |_| TokenKind::SpecialFileFullPath)]
    #[token("__LINE__", |_| TokenKind::SpecialLine)]
    #[token("__MODULE__", |_| TokenKind::SpecialModule)]
    #[token("__FUNCTION__", |_| TokenKind::SpecialFunction)]
    #[token("__PRETTY_FUNCTION__", |_| TokenKind::SpecialPrettyFunction)]
    #[token("(", |_| TokenKind::LeftParen)]
    #[token(")", |_| TokenKind::RightParen)]
    #[token("[", |_| TokenKind::LeftBracket)]
    #[token("]", |_| TokenKind::RightBracket)]
    #[token("{", |_| TokenKind::LeftCurly)]
    #[token("}", |_| TokenKind::RightCurly)]
    #[token(",", |_| TokenKind::Comma)]
    #[token(";", |_| TokenKind::Semicolon)]
    #[token(":", |_| TokenKind::Colon)]
    #[token("$", |_| TokenKind::Dollar)]
    #[token("@", |_| TokenKind::At)]
    #[token(".", |_| TokenKind::Dot)]
    #[token("..", |_| TokenKind::DotDot)]
    #[token("...", |_| TokenKind::DotDotDot)]
    #[token("=", |_| TokenKind::Assign)]
    #[token("==", |_| TokenKind::Equal)]
    #[token("!=", |_| TokenKind::NotEqual)]
    #[token("<", |_| TokenKind::Less)]
    #[token("<=", |_| TokenKind::LessEqual)]
    #[token(">", |_| TokenKind::Greater)]
    #[token(">=", |_| TokenKind::GreaterEqual)]
    #[token("<<", |_| TokenKind::LeftShift)]
    #[token(">>", |_| TokenKind::RightShift)]
    #[token(">>>", |_| TokenKind::UnsignedRightShift)]
    #[token("<<=", |_| TokenKind::LeftShiftAssign)]
    #[token(">>=", |_| TokenKind::RightShiftAssign)]
    #[token(">>>=", |_| TokenKind::UnsignedRightShiftAssign)]
    #[token("+", |_| TokenKind::Add)]
    #[token("-", |_| TokenKind::Min)]
    #[token("*", |_| TokenKind::Mul)]
    #[token("/", |_| TokenKind::Div)]
    #[token("%", |_| TokenKind::Mod)]
    #[token("+=", |_| TokenKind::AddAssign)]
    #[token("-=", |_| TokenKind::MinAssign)]
    #[token("*=", |_| TokenKind::MulAssign)]
    #[token("/=", |_| TokenKind::DivAssign)]
    #[token("%=", |_| TokenKind::ModAssign)]
    #[token("&", |_| TokenKind::And)]
    #[token("&&", |_| TokenKind::AndAnd)]
    #[token("&=", |_| TokenKind::AndAssign)]
    #[token("|", |_| TokenKind::Or)]
    #[token("||", |_| TokenKind::OrOr)]
    #[token("|=", |_| TokenKind::OrAssign)]
    #[token("^", |_| TokenKind::Xor)]
    #[token("^=", |_| TokenKind::XorAssign)]
    #[token("^^", |_| TokenKind::Pow)]
    #[token("^^=", |_| TokenKind::PowAssign)]
    #[token("~", |_| TokenKind::Tilde)]
    #[token("~=", |_| TokenKind::ConcatAssign)]
    #[token("!", |_| TokenKind::Not)]
    #[token("++", |_| TokenKind::PlusPlus)]
    #[token("--", |_| TokenKind::MinusMinus)]
    #[token("?", |_| TokenKind::Question)]
    #[token("=>", |_| TokenKind::GoesTo)]
    Simple(TokenKind),
}
