// Lexer for type definition source files.
//
// Uses the `logos` crate for DFA-based lexing. Whitespace (newlines
// included) and `#` line comments are skipped.
//
// Preconditions: input is valid UTF-8.
// Postconditions: returns all tokens with byte-offset spans, plus any lex errors.
// Failure modes: unrecognized characters produce `LexError`; lexing continues.
// Side effects: none.

use logos::Logos;
use std::fmt;

/// Byte-offset span in source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// A lexer error with location.
#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub span: Span,
    pub message: String,
}

/// Result of lexing: tokens plus any errors (non-fatal).
#[derive(Debug)]
pub struct LexResult {
    pub tokens: Vec<(Token, Span)>,
    pub errors: Vec<LexError>,
}

/// Token types.
///
/// Identifiers carry no value — use the span to retrieve the text from the
/// source. Type variables carry their name without the leading quote.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+|#[^\n]*")]
pub enum Token {
    // ── Keywords ──
    #[token("type")]
    Type,
    #[token("of")]
    Of,
    #[token("inherit")]
    Inherit,

    // ── Symbols ──
    #[token("=")]
    Equals,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("|")]
    Pipe,
    #[token("*")]
    Star,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(";")]
    Semi,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,

    // ── Literals ──
    /// Type variable: `'[a-z_][a-zA-Z0-9_]*`
    #[regex(r"'[a-z_][a-zA-Z0-9_]*", |lex| lex.slice()[1..].to_string())]
    TypeVar(String),

    /// String literal with `\"` and `\\` escapes (annotation values).
    #[regex(r#""([^"\\]|\\.)*""#, parse_string)]
    StringLit(String),

    // ── Identifier ──
    //
    // Placed after keywords — logos prioritises fixed `#[token]` matches
    // over regex for the same length, so `type` matches Type, not Ident.
    /// Identifier: `[a-zA-Z_][a-zA-Z0-9_]*`
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Type => write!(f, "type"),
            Token::Of => write!(f, "of"),
            Token::Inherit => write!(f, "inherit"),
            Token::Equals => write!(f, "="),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::Pipe => write!(f, "|"),
            Token::Star => write!(f, "*"),
            Token::Comma => write!(f, ","),
            Token::Colon => write!(f, ":"),
            Token::Semi => write!(f, ";"),
            Token::Lt => write!(f, "<"),
            Token::Gt => write!(f, ">"),
            Token::TypeVar(v) => write!(f, "'{v}"),
            Token::StringLit(s) => write!(f, "\"{s}\""),
            Token::Ident => write!(f, "<ident>"),
        }
    }
}

// ── Callbacks ──

fn parse_string(lex: &mut logos::Lexer<'_, Token>) -> Option<String> {
    let slice = lex.slice();
    let inner = &slice[1..slice.len() - 1]; // strip quotes
    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next()? {
                '"' => result.push('"'),
                '\\' => result.push('\\'),
                _ => return None,
            }
        } else {
            result.push(c);
        }
    }
    Some(result)
}

// ── Public API ──

/// Lex a source string into tokens.
///
/// Returns all successfully parsed tokens together with any errors for
/// unrecognised characters. Lexing is non-fatal: errors are collected and
/// the lexer continues past bad characters.
pub fn lex(source: &str) -> LexResult {
    let lexer = Token::lexer(source);
    let mut tokens = Vec::new();
    let mut errors = Vec::new();

    for (result, range) in lexer.spanned() {
        let span = Span {
            start: range.start,
            end: range.end,
        };
        match result {
            Ok(token) => tokens.push((token, span)),
            Err(()) => errors.push(LexError {
                span,
                message: format!("unexpected character: {:?}", &source[span.start..span.end]),
            }),
        }
    }

    LexResult { tokens, errors }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper: lex and assert no errors, return token list.
    fn lex_ok(source: &str) -> Vec<Token> {
        let result = lex(source);
        assert!(
            result.errors.is_empty(),
            "unexpected lex errors: {:?}",
            result.errors
        );
        result.tokens.into_iter().map(|(t, _)| t).collect()
    }

    #[test]
    fn keywords() {
        assert_eq!(lex_ok("type of inherit"), vec![Token::Type, Token::Of, Token::Inherit]);
    }

    #[test]
    fn keyword_vs_ident() {
        // `types` is an identifier, not keyword `type` + `s`
        assert_eq!(lex_ok("type types offset"), vec![Token::Type, Token::Ident, Token::Ident]);
    }

    #[test]
    fn symbols() {
        let tokens = lex_ok("= ( ) [ ] { } | * , : ; < >");
        assert_eq!(
            tokens,
            vec![
                Token::Equals,
                Token::LParen,
                Token::RParen,
                Token::LBracket,
                Token::RBracket,
                Token::LBrace,
                Token::RBrace,
                Token::Pipe,
                Token::Star,
                Token::Comma,
                Token::Colon,
                Token::Semi,
                Token::Lt,
                Token::Gt,
            ]
        );
    }

    #[test]
    fn type_variables_drop_the_quote() {
        assert_eq!(
            lex_ok("'a 'elem_1"),
            vec![Token::TypeVar("a".into()), Token::TypeVar("elem_1".into())]
        );
    }

    #[test]
    fn string_escapes() {
        assert_eq!(
            lex_ok(r#""a\"b\\c""#),
            vec![Token::StringLit("a\"b\\c".into())]
        );
    }

    #[test]
    fn comments_and_newlines_are_skipped() {
        let tokens = lex_ok("# header\ntype t = int # trailing\n\n");
        assert_eq!(
            tokens,
            vec![Token::Type, Token::Ident, Token::Equals, Token::Ident]
        );
    }

    #[test]
    fn spans_are_byte_offsets() {
        let result = lex("type  t");
        assert_eq!(result.tokens[1].1, Span { start: 6, end: 7 });
    }

    #[test]
    fn at_sign_is_rejected() {
        let result = lex("type @(x) = int");
        assert!(!result.errors.is_empty());
        assert!(result.errors[0].message.contains('@'));
    }
}
