//! Lexer for rule expressions.
//!
//! Whitespace is dropped here; the parser only sees significant tokens.

mod tokens;

pub use tokens::TokenKind;

use logos::Logos;
use text_size::{TextRange, TextSize};

/// A token and its byte range in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub range: TextRange,
}

impl Token {
    /// The token's text within `source`.
    #[must_use]
    pub fn text(self, source: &str) -> &str {
        &source[self.range]
    }
}

/// Significant tokens of `source`, in order.
///
/// Unrecognized characters become `TokenKind::Error` so the parser can
/// report them with their position.
#[must_use]
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut lexer = TokenKind::lexer(source);
    let mut tokens = Vec::new();
    while let Some(kind) = lexer.next() {
        let kind = kind.unwrap_or(TokenKind::Error);
        if kind.is_trivia() {
            continue;
        }
        let span = lexer.span();
        tokens.push(Token {
            kind,
            range: TextRange::new(
                TextSize::from(span.start as u32),
                TextSize::from(span.end as u32),
            ),
        });
    }
    tokens
}
