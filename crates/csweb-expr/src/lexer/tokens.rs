//! Token definitions for rule expressions.
//!
//! Rule expressions are written in a small JavaScript-flavoured syntax, so
//! the token set mirrors the subset of ECMAScript operators that legacy
//! display files actually use.

use logos::Logos;

/// All token kinds of the expression language.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TokenKind {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    /// Whitespace (spaces, tabs, newlines)
    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("?")]
    Question,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,

    // =========================================================================
    // OPERATORS
    // =========================================================================
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("**")]
    StarStar,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("!")]
    Bang,
    #[token("~")]
    Tilde,
    #[token("&")]
    Amp,
    #[token("&&")]
    AmpAmp,
    #[token("|")]
    Pipe,
    #[token("||")]
    PipePipe,
    #[token("^")]
    Caret,
    #[token("??")]
    QuestionQuestion,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,
    #[token(">>>")]
    UShr,
    #[token("<")]
    Lt,
    #[token("<=")]
    Le,
    #[token(">")]
    Gt,
    #[token(">=")]
    Ge,
    #[token("==")]
    EqEq,
    #[token("===")]
    EqEqEq,
    #[token("!=")]
    NotEq,
    #[token("!==")]
    NotEqEq,

    // =========================================================================
    // KEYWORDS
    // =========================================================================
    #[token("true")]
    KwTrue,
    #[token("false")]
    KwFalse,
    #[token("null")]
    KwNull,
    #[token("undefined")]
    KwUndefined,
    #[token("typeof")]
    KwTypeof,
    #[token("return")]
    KwReturn,

    // =========================================================================
    // LITERALS
    // =========================================================================
    /// Hexadecimal integer: 0x1F
    #[regex(r"0[xX][0-9a-fA-F]+")]
    HexLiteral,

    /// Decimal number with optional fraction and exponent: 1, 1.5, .5, 1e-3
    #[regex(r"([0-9]+(\.[0-9]*)?|\.[0-9]+)([eE][+-]?[0-9]+)?")]
    NumberLiteral,

    /// Quoted string in single or double quotes.
    #[regex(r#""([^"\\\r\n]|\\.)*""#)]
    #[regex(r"'([^'\\\r\n]|\\.)*'")]
    StringLiteral,

    /// Identifier, including `$` as JavaScript allows.
    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*")]
    Ident,

    /// Unrecognized input.
    Error,
}

impl TokenKind {
    /// Returns true for tokens the parser skips.
    #[must_use]
    pub fn is_trivia(self) -> bool {
        matches!(self, TokenKind::Whitespace)
    }
}
