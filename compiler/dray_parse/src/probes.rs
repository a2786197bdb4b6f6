//! Lookahead probes.
//!
//! Pure predicates over `(&TokenList, position)` used to classify a token
//! position as basic-type / declarator / parameters / expression /
//! attributes without consuming the parser's cursor. Positions are passed
//! by value; success returns the position just past the matched construct.

use dray_ir::{TokenKind, TokenList};

/// Whether a declarator must bind an identifier.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum NeedDeclaratorId {
    /// No identifier allowed (cast targets, template type arguments).
    No,
    /// Identifier optional (parameters).
    Opt,
    /// Identifier required.
    Must,
    /// Identifier required for the D-style declarator; this is the probe
    /// statement dispatch uses, so `int.max` fails it and reads as an
    /// expression.
    MustIfDstyle,
}

/// Result of a successful declarator probe.
#[derive(Copy, Clone, Debug)]
pub struct DeclaratorProbe {
    /// Position of the terminator token (not consumed).
    pub end: usize,
    pub have_id: bool,
    pub have_tpl: bool,
}

/// Skip a matched `( ... )` starting at `pos` (which must be `(`).
/// Fails on EOF before balance is restored.
pub fn skip_parens(tokens: &TokenList, pos: usize) -> Option<usize> {
    skip_matched(tokens, pos, TokenKind::LeftParen, TokenKind::RightParen)
}

/// Skip a matched `[ ... ]` starting at `pos` (which must be `[`).
pub fn skip_brackets(tokens: &TokenList, pos: usize) -> Option<usize> {
    skip_matched(tokens, pos, TokenKind::LeftBracket, TokenKind::RightBracket)
}

/// Skip a matched `{ ... }` starting at `pos` (which must be `{`).
pub fn skip_braces(tokens: &TokenList, pos: usize) -> Option<usize> {
    skip_matched(tokens, pos, TokenKind::LeftCurly, TokenKind::RightCurly)
}

fn skip_matched(
    tokens: &TokenList,
    mut pos: usize,
    open: TokenKind,
    close: TokenKind,
) -> Option<usize> {
    if tokens.kind(pos) != open {
        return None;
    }
    let mut depth = 0usize;
    loop {
        let k = tokens.kind(pos);
        if k == open {
            depth += 1;
        } else if k == close {
            depth -= 1;
            if depth == 0 {
                return Some(pos + 1);
            }
        } else if k == TokenKind::Eof {
            return None;
        }
        pos += 1;
    }
}

/// Skip a run of attribute tokens: qualifier/storage keywords,
/// `deprecated(...)`, and the `@` forms (`@id`, `@id!arg`, `@id!(args)`,
/// each optionally followed by `(args)`, and `@(args)`).
pub fn skip_attributes(tokens: &TokenList, mut pos: usize) -> Option<usize> {
    loop {
        match tokens.kind(pos) {
            TokenKind::Const
            | TokenKind::Immutable
            | TokenKind::Shared
            | TokenKind::Inout
            | TokenKind::Final
            | TokenKind::Auto
            | TokenKind::Scope
            | TokenKind::Override
            | TokenKind::Abstract
            | TokenKind::Synchronized
            | TokenKind::Nothrow
            | TokenKind::Pure
            | TokenKind::Ref
            | TokenKind::Gshared
            | TokenKind::Return => pos += 1,
            TokenKind::Deprecated => {
                pos += 1;
                if tokens.kind(pos) == TokenKind::LeftParen {
                    pos = skip_parens(tokens, pos)?;
                }
            }
            TokenKind::At => {
                pos += 1;
                match tokens.kind(pos) {
                    TokenKind::Identifier => {
                        pos += 1;
                        if tokens.kind(pos) == TokenKind::Not {
                            pos += 1;
                            if tokens.kind(pos) == TokenKind::LeftParen {
                                pos = skip_parens(tokens, pos)?;
                            } else if tokens.kind(pos) == TokenKind::Eof {
                                return None;
                            } else {
                                pos += 1;
                            }
                        }
                        if tokens.kind(pos) == TokenKind::LeftParen {
                            pos = skip_parens(tokens, pos)?;
                        }
                    }
                    TokenKind::LeftParen => pos = skip_parens(tokens, pos)?,
                    _ => return None,
                }
            }
            _ => return Some(pos),
        }
    }
}

/// Tokens that can stand alone as a `!arg` template argument.
fn is_single_token_tiarg(kind: TokenKind) -> bool {
    kind.is_basic_type()
        || matches!(
            kind,
            TokenKind::Identifier
                | TokenKind::IntLiteral
                | TokenKind::FloatLiteral
                | TokenKind::StringLiteral
                | TokenKind::CharLiteral
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Null
                | TokenKind::This
        )
}

/// Continue a qualified path after its first identifier at `pos`:
/// `.id`, `!arg`, `!(args)` segments.
fn is_path(tokens: &TokenList, mut pos: usize) -> Option<usize> {
    pos += 1;
    loop {
        match tokens.kind(pos) {
            TokenKind::Not => match tokens.kind(pos + 1) {
                // `a !is b` / `a !in b`: comparison, not template args
                TokenKind::Is | TokenKind::In => break,
                TokenKind::LeftParen => pos = skip_parens(tokens, pos + 1)?,
                k if is_single_token_tiarg(k) => pos += 2,
                _ => return None,
            },
            TokenKind::Dot => {
                if tokens.kind(pos + 1) == TokenKind::Identifier {
                    pos += 2;
                } else {
                    break;
                }
            }
            _ => break,
        }
    }
    Some(pos)
}

/// Recognise a basic type prefix: basic type keywords, qualified paths with
/// template instances, `typeof(e)`, `__vector(...)`, `__traits(...)`,
/// `mixin(...)`, and the type-constructor-with-parens forms `const(T)`.
pub fn is_basic_type(tokens: &TokenList, pos: usize) -> Option<usize> {
    let kind = tokens.kind(pos);
    if kind.is_basic_type() {
        return Some(pos + 1);
    }
    match kind {
        TokenKind::Identifier => is_path(tokens, pos),
        TokenKind::Dot => {
            if tokens.kind(pos + 1) == TokenKind::Identifier {
                is_path(tokens, pos + 1)
            } else {
                None
            }
        }
        TokenKind::Typeof => {
            let past = skip_parens(tokens, pos + 1)?;
            // optional `.id` path suffix
            let mut pos = past;
            while tokens.kind(pos) == TokenKind::Dot
                && tokens.kind(pos + 1) == TokenKind::Identifier
            {
                pos += 2;
            }
            Some(pos)
        }
        TokenKind::Vector | TokenKind::Traits | TokenKind::Mixin => {
            skip_parens(tokens, pos + 1)
        }
        TokenKind::Const | TokenKind::Immutable | TokenKind::Shared | TokenKind::Inout => {
            if tokens.kind(pos + 1) == TokenKind::LeftParen {
                skip_parens(tokens, pos + 1)
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Recognise a declarator following a basic type: pointer and array
/// suffixes, function/delegate types, an optional identifier, and the
/// declarator suffixes (template parameter list, function parameter list,
/// member attributes). On success the terminator token at `end` is one of
/// `) ] = , ... ; { in out do` — or the requested `endtok` — with `if`
/// accepted only after a template parameter list.
pub fn is_declarator(
    tokens: &TokenList,
    mut pos: usize,
    need_id: NeedDeclaratorId,
    endtok: Option<TokenKind>,
) -> Option<DeclaratorProbe> {
    let mut have_id = false;
    let mut have_tpl = false;

    loop {
        match tokens.kind(pos) {
            TokenKind::Mul => pos += 1,
            TokenKind::LeftBracket => {
                if tokens.kind(pos + 1) == TokenKind::RightBracket {
                    pos += 2;
                } else if let Some(end) = is_declaration(
                    tokens,
                    pos + 1,
                    NeedDeclaratorId::No,
                    Some(TokenKind::RightBracket),
                ) {
                    // associative array with a type key
                    pos = end + 1;
                } else {
                    // `[expr]` or `[expr .. expr]`
                    pos = skip_brackets(tokens, pos)?;
                }
            }
            TokenKind::Identifier => {
                if have_id {
                    return None;
                }
                have_id = true;
                pos += 1;
                break;
            }
            TokenKind::Function | TokenKind::Delegate => {
                pos += 1;
                if tokens.kind(pos) != TokenKind::LeftParen {
                    return None;
                }
                pos = skip_parens(tokens, pos)?;
                pos = skip_attributes(tokens, pos)?;
            }
            _ => break,
        }
    }

    if have_id {
        // DeclaratorSuffixes
        loop {
            match tokens.kind(pos) {
                TokenKind::LeftBracket => {
                    // C-style array suffix on the identifier
                    pos = skip_brackets(tokens, pos)?;
                }
                TokenKind::LeftParen => {
                    let past = skip_parens(tokens, pos)?;
                    if !have_tpl && tokens.kind(past) == TokenKind::LeftParen {
                        have_tpl = true;
                        pos = skip_parens(tokens, past)?;
                    } else {
                        pos = past;
                    }
                    pos = skip_attributes(tokens, pos)?;
                }
                _ => break,
            }
        }
    }

    match need_id {
        NeedDeclaratorId::No => {
            if have_id {
                return None;
            }
        }
        NeedDeclaratorId::Opt => {}
        NeedDeclaratorId::Must | NeedDeclaratorId::MustIfDstyle => {
            if !have_id {
                return None;
            }
        }
    }

    let kind = tokens.kind(pos);
    let terminated = match endtok {
        Some(e) => kind == e,
        None => {
            matches!(
                kind,
                TokenKind::RightParen
                    | TokenKind::RightBracket
                    | TokenKind::Assign
                    | TokenKind::Comma
                    | TokenKind::DotDotDot
                    | TokenKind::Semicolon
                    | TokenKind::LeftCurly
                    | TokenKind::In
                    | TokenKind::Out
                    | TokenKind::Do
            ) || (kind == TokenKind::If && have_tpl)
        }
    };
    if !terminated {
        return None;
    }

    Some(DeclaratorProbe {
        end: pos,
        have_id,
        have_tpl,
    })
}

/// Recognise `[storage classes] BasicType Declarator` ending at `endtok`
/// (or any standard declarator terminator).
pub fn is_declaration(
    tokens: &TokenList,
    mut pos: usize,
    need_id: NeedDeclaratorId,
    endtok: Option<TokenKind>,
) -> Option<usize> {
    // Qualifier keywords not applied as type constructors
    while tokens.kind(pos).is_type_ctor() && tokens.kind(pos + 1) != TokenKind::LeftParen {
        pos += 1;
    }
    let pos = is_basic_type(tokens, pos)?;
    let probe = is_declarator(tokens, pos, need_id, endtok)?;
    Some(probe.end)
}

/// Recognise a complete parameter list starting at `(`: parameter storage
/// classes, types with optional declarator ids, default arguments, and the
/// variadic forms.
pub fn is_parameters(tokens: &TokenList, mut pos: usize) -> Option<usize> {
    if tokens.kind(pos) != TokenKind::LeftParen {
        return None;
    }
    pos += 1;

    loop {
        match tokens.kind(pos) {
            TokenKind::RightParen => return Some(pos + 1),
            TokenKind::DotDotDot => {
                pos += 1;
                return if tokens.kind(pos) == TokenKind::RightParen {
                    Some(pos + 1)
                } else {
                    None
                };
            }
            TokenKind::In
            | TokenKind::Out
            | TokenKind::Ref
            | TokenKind::Lazy
            | TokenKind::Scope
            | TokenKind::Final
            | TokenKind::Auto
            | TokenKind::Return => pos += 1,
            TokenKind::Const | TokenKind::Immutable | TokenKind::Shared | TokenKind::Inout
                if tokens.kind(pos + 1) != TokenKind::LeftParen =>
            {
                pos += 1;
            }
            TokenKind::At => pos = skip_attributes(tokens, pos)?,
            TokenKind::Eof => return None,
            _ => {
                let after_type = is_basic_type(tokens, pos)?;
                let probe =
                    is_declarator(tokens, after_type, NeedDeclaratorId::Opt, None)?;
                pos = probe.end;
                if tokens.kind(pos) == TokenKind::Assign {
                    pos = skip_default_arg(tokens, pos + 1)?;
                }
                if tokens.kind(pos) == TokenKind::DotDotDot {
                    pos += 1;
                }
                match tokens.kind(pos) {
                    TokenKind::Comma => pos += 1,
                    TokenKind::RightParen => return Some(pos + 1),
                    _ => return None,
                }
            }
        }
    }
}

/// Skip a default argument expression: balanced until a `,` or `)` at
/// depth zero.
fn skip_default_arg(tokens: &TokenList, mut pos: usize) -> Option<usize> {
    let (mut par, mut bra, mut cur) = (0usize, 0usize, 0usize);
    loop {
        match tokens.kind(pos) {
            TokenKind::LeftParen => par += 1,
            TokenKind::RightParen => {
                if par == 0 {
                    return Some(pos);
                }
                par -= 1;
            }
            TokenKind::LeftBracket => bra += 1,
            TokenKind::RightBracket => {
                if bra == 0 {
                    return None;
                }
                bra -= 1;
            }
            TokenKind::LeftCurly => cur += 1,
            TokenKind::RightCurly => {
                if cur == 0 {
                    return None;
                }
                cur -= 1;
            }
            TokenKind::Comma => {
                if par == 0 && bra == 0 && cur == 0 {
                    return Some(pos);
                }
            }
            TokenKind::Semicolon | TokenKind::Eof => return None,
            _ => {}
        }
        pos += 1;
    }
}

/// Scan an expression-shaped token run: stops (successfully) at the first
/// unbalanced closing bracket; `;` outside braces and EOF fail.
pub fn is_expression(tokens: &TokenList, mut pos: usize) -> Option<usize> {
    let (mut par, mut bra, mut cur) = (0usize, 0usize, 0usize);
    loop {
        match tokens.kind(pos) {
            TokenKind::LeftParen => par += 1,
            TokenKind::LeftBracket => bra += 1,
            TokenKind::LeftCurly => cur += 1,
            TokenKind::RightParen => {
                if par == 0 {
                    return Some(pos);
                }
                par -= 1;
            }
            TokenKind::RightBracket => {
                if bra == 0 {
                    return Some(pos);
                }
                bra -= 1;
            }
            TokenKind::RightCurly => {
                if cur == 0 {
                    return Some(pos);
                }
                cur -= 1;
            }
            TokenKind::Semicolon => {
                if cur == 0 {
                    return None;
                }
            }
            TokenKind::Eof => return None,
            _ => {}
        }
        pos += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dray_diagnostic::CollectHandler;
    use dray_ir::StringInterner;

    fn tokens_of(source: &str) -> TokenList {
        let interner = StringInterner::new();
        let mut handler = CollectHandler::new();
        dray_lexer::lex(source, &interner, &mut handler)
    }

    #[test]
    fn skip_parens_matches_nesting() {
        let tokens = tokens_of("((a)(b)) x");
        let end = skip_parens(&tokens, 0).unwrap();
        assert_eq!(tokens.kind(end), TokenKind::Identifier);
    }

    #[test]
    fn skip_parens_fails_on_eof() {
        let tokens = tokens_of("((a)");
        assert!(skip_parens(&tokens, 0).is_none());
    }

    #[test]
    fn basic_type_probe() {
        let tokens = tokens_of("int x");
        assert_eq!(is_basic_type(&tokens, 0), Some(1));

        let tokens = tokens_of("a.b!c.d x");
        let end = is_basic_type(&tokens, 0).unwrap();
        assert_eq!(tokens.kind(end), TokenKind::Identifier);

        let tokens = tokens_of("const(int) x");
        let end = is_basic_type(&tokens, 0).unwrap();
        assert_eq!(tokens.kind(end), TokenKind::Identifier);

        let tokens = tokens_of("typeof(a + b).c x");
        let end = is_basic_type(&tokens, 0).unwrap();
        assert_eq!(tokens.kind(end), TokenKind::Identifier);
    }

    #[test]
    fn bang_before_is_stops_the_path() {
        // `a !is b` must not read `!is` as template arguments
        let tokens = tokens_of("a !is b");
        assert_eq!(is_basic_type(&tokens, 0), Some(1));
    }

    #[test]
    fn declaration_probe_accepts_declarations() {
        let tokens = tokens_of("int* x;");
        assert!(is_declaration(&tokens, 0, NeedDeclaratorId::MustIfDstyle, None).is_some());

        let tokens = tokens_of("int[3][] x = 1;");
        assert!(is_declaration(&tokens, 0, NeedDeclaratorId::MustIfDstyle, None).is_some());

        let tokens = tokens_of("const int x;");
        assert!(is_declaration(&tokens, 0, NeedDeclaratorId::MustIfDstyle, None).is_some());
    }

    #[test]
    fn declaration_probe_biases_expressions() {
        // `int.max` has no declarator id: expression reading wins
        let tokens = tokens_of("int.max;");
        assert!(is_declaration(&tokens, 0, NeedDeclaratorId::MustIfDstyle, None).is_none());

        // function call, not a declaration
        let tokens = tokens_of("f(x);");
        assert!(is_declaration(&tokens, 0, NeedDeclaratorId::MustIfDstyle, None).is_none());
    }

    #[test]
    fn declarator_accepts_function_form() {
        let tokens = tokens_of("int f(int a, int b) {");
        let probe = is_declarator(&tokens, 1, NeedDeclaratorId::Must, None).unwrap();
        assert!(probe.have_id);
        assert!(!probe.have_tpl);
        assert_eq!(tokens.kind(probe.end), TokenKind::LeftCurly);
    }

    #[test]
    fn declarator_detects_template_list() {
        let tokens = tokens_of("int f(T)(T a) if");
        let probe = is_declarator(&tokens, 1, NeedDeclaratorId::Must, None).unwrap();
        assert!(probe.have_tpl);
        assert_eq!(tokens.kind(probe.end), TokenKind::If);
    }

    #[test]
    fn if_terminates_only_templates() {
        // `if` is no valid terminator without a template parameter list
        let tokens = tokens_of("int f if");
        assert!(is_declarator(&tokens, 1, NeedDeclaratorId::Must, None).is_none());
    }

    #[test]
    fn parameters_probe() {
        let tokens = tokens_of("(int a, ref const b, T c = f(1), ...) x");
        assert!(is_parameters(&tokens, 0).is_some());

        let tokens = tokens_of("(int a");
        assert!(is_parameters(&tokens, 0).is_none());
    }

    #[test]
    fn expression_probe_stops_at_unbalanced_close() {
        let tokens = tokens_of("a + f(b, c)) x");
        let end = is_expression(&tokens, 0).unwrap();
        assert_eq!(tokens.kind(end), TokenKind::RightParen);
    }

    #[test]
    fn expression_probe_fails_on_semicolon() {
        let tokens = tokens_of("a + b; c");
        assert!(is_expression(&tokens, 0).is_none());
    }

    #[test]
    fn attribute_skipper() {
        let tokens = tokens_of("const nothrow @safe @uda!(1)(x) deprecated(\"m\") int");
        let end = skip_attributes(&tokens, 0).unwrap();
        assert_eq!(tokens.kind(end), TokenKind::Int);
    }
}
