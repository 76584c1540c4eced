//! Precedence-climbing parser for rule expressions.

use smol_str::SmolStr;

use crate::ast::{Expr, MAX_DEPTH};
use crate::error::ExprError;
use crate::lexer::{tokenize, Token, TokenKind};
use crate::ops::{BinaryOp, LogicalOp, UnaryOp};
use crate::value::Value;

const TERNARY_BP: u8 = 2;
const PREFIX_BP: u8 = 25;

#[derive(Debug, Clone, Copy)]
enum Infix {
    Binary(BinaryOp),
    Logical(LogicalOp),
}

/// Left and right binding power for an infix operator.
fn infix_binding_power(kind: TokenKind) -> Option<(u8, u8, Infix)> {
    let entry = match kind {
        TokenKind::QuestionQuestion => (3, 4, Infix::Logical(LogicalOp::Nullish)),
        TokenKind::PipePipe => (3, 4, Infix::Logical(LogicalOp::Or)),
        TokenKind::AmpAmp => (5, 6, Infix::Logical(LogicalOp::And)),
        TokenKind::Pipe => (7, 8, Infix::Binary(BinaryOp::BitOr)),
        TokenKind::Caret => (9, 10, Infix::Binary(BinaryOp::BitXor)),
        TokenKind::Amp => (11, 12, Infix::Binary(BinaryOp::BitAnd)),
        TokenKind::EqEq => (13, 14, Infix::Binary(BinaryOp::Eq)),
        TokenKind::NotEq => (13, 14, Infix::Binary(BinaryOp::Ne)),
        TokenKind::EqEqEq => (13, 14, Infix::Binary(BinaryOp::StrictEq)),
        TokenKind::NotEqEq => (13, 14, Infix::Binary(BinaryOp::StrictNe)),
        TokenKind::Lt => (15, 16, Infix::Binary(BinaryOp::Lt)),
        TokenKind::Le => (15, 16, Infix::Binary(BinaryOp::Le)),
        TokenKind::Gt => (15, 16, Infix::Binary(BinaryOp::Gt)),
        TokenKind::Ge => (15, 16, Infix::Binary(BinaryOp::Ge)),
        TokenKind::Shl => (17, 18, Infix::Binary(BinaryOp::Shl)),
        TokenKind::Shr => (17, 18, Infix::Binary(BinaryOp::Shr)),
        TokenKind::UShr => (17, 18, Infix::Binary(BinaryOp::UShr)),
        TokenKind::Plus => (19, 20, Infix::Binary(BinaryOp::Add)),
        TokenKind::Minus => (19, 20, Infix::Binary(BinaryOp::Sub)),
        TokenKind::Star => (21, 22, Infix::Binary(BinaryOp::Mul)),
        TokenKind::Slash => (21, 22, Infix::Binary(BinaryOp::Div)),
        TokenKind::Percent => (21, 22, Infix::Binary(BinaryOp::Mod)),
        // Right associative.
        TokenKind::StarStar => (24, 23, Infix::Binary(BinaryOp::Pow)),
        _ => return None,
    };
    Some(entry)
}

fn prefix_op(kind: TokenKind) -> Option<UnaryOp> {
    match kind {
        TokenKind::Bang => Some(UnaryOp::Not),
        TokenKind::Minus => Some(UnaryOp::Neg),
        TokenKind::Plus => Some(UnaryOp::Pos),
        TokenKind::Tilde => Some(UnaryOp::BitNot),
        TokenKind::KwTypeof => Some(UnaryOp::TypeOf),
        _ => None,
    }
}

/// Parse expression source into a syntax tree.
///
/// A leading `return` and trailing semicolons are accepted so that bodies
/// written for function-style evaluation parse unchanged.
pub fn parse(source: &str) -> Result<Expr, ExprError> {
    let mut parser = Parser::new(source);
    parser.eat(TokenKind::KwReturn);
    let expr = parser.expression(0)?;
    while parser.eat(TokenKind::Semicolon) {}
    match parser.peek() {
        Some(token) => Err(parser.unexpected(token)),
        None => Ok(expr),
    }
}

struct Parser<'src> {
    source: &'src str,
    tokens: Vec<Token>,
    pos: usize,
    /// Nodes nested above the one being parsed, counted on the current path.
    depth: u32,
}

impl<'src> Parser<'src> {
    fn new(source: &'src str) -> Self {
        Self {
            source,
            tokens: tokenize(source),
            pos: 0,
            depth: 0,
        }
    }

    /// Account for one more level of nesting.
    fn nest(&mut self) -> Result<(), ExprError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ExprError::TooDeep(MAX_DEPTH));
        }
        Ok(())
    }

    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.peek()?;
        self.pos += 1;
        Some(token)
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.peek().is_some_and(|token| token.kind == kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ExprError> {
        match self.bump() {
            Some(token) if token.kind == kind => Ok(token),
            Some(token) => Err(self.unexpected(token)),
            None => Err(ExprError::UnexpectedEnd),
        }
    }

    fn text(&self, token: Token) -> &'src str {
        token.text(self.source)
    }

    fn unexpected(&self, token: Token) -> ExprError {
        let text = self.text(token);
        let offset = u32::from(token.range.start());
        if token.kind == TokenKind::Error && (text.starts_with('"') || text.starts_with('\'')) {
            return ExprError::UnterminatedString(offset);
        }
        ExprError::UnexpectedToken {
            text: SmolStr::new(text),
            offset,
        }
    }

    /// Folded operators and postfix chains count toward the nesting of the
    /// operands that follow them, so the tree depth never exceeds `MAX_DEPTH`.
    fn expression(&mut self, min_bp: u8) -> Result<Expr, ExprError> {
        let outer = self.depth;
        self.nest()?;
        let expr = self.fold(min_bp)?;
        self.depth = outer;
        Ok(expr)
    }

    fn fold(&mut self, min_bp: u8) -> Result<Expr, ExprError> {
        let mut left = self.prefix()?;
        while let Some(token) = self.peek() {
            if token.kind == TokenKind::Question {
                if TERNARY_BP < min_bp {
                    break;
                }
                self.bump();
                self.nest()?;
                let consequent = self.expression(0)?;
                self.expect(TokenKind::Colon)?;
                let alternate = self.expression(TERNARY_BP - 1)?;
                left = Expr::Conditional {
                    test: Box::new(left),
                    consequent: Box::new(consequent),
                    alternate: Box::new(alternate),
                };
                continue;
            }
            let Some((l_bp, r_bp, infix)) = infix_binding_power(token.kind) else {
                break;
            };
            if l_bp < min_bp {
                break;
            }
            self.bump();
            self.nest()?;
            let right = self.expression(r_bp)?;
            left = match infix {
                Infix::Binary(op) => Expr::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                Infix::Logical(op) => Expr::Logical {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
            };
        }
        Ok(left)
    }

    fn prefix(&mut self) -> Result<Expr, ExprError> {
        let token = self.bump().ok_or(ExprError::UnexpectedEnd)?;
        if let Some(op) = prefix_op(token.kind) {
            let expr = self.expression(PREFIX_BP)?;
            return Ok(Expr::Unary {
                op,
                expr: Box::new(expr),
            });
        }
        let primary = match token.kind {
            TokenKind::NumberLiteral => {
                let text = self.text(token);
                let value = text
                    .parse::<f64>()
                    .map_err(|_| ExprError::InvalidNumber(SmolStr::new(text)))?;
                Expr::Literal(Value::Number(value))
            }
            TokenKind::HexLiteral => {
                let text = self.text(token);
                let value = u64::from_str_radix(&text[2..], 16)
                    .map_err(|_| ExprError::InvalidNumber(SmolStr::new(text)))?;
                #[allow(clippy::cast_precision_loss)]
                let value = value as f64;
                Expr::Literal(Value::Number(value))
            }
            TokenKind::StringLiteral => {
                Expr::Literal(Value::String(unescape(self.text(token))))
            }
            TokenKind::KwTrue => Expr::Literal(Value::Bool(true)),
            TokenKind::KwFalse => Expr::Literal(Value::Bool(false)),
            TokenKind::KwNull => Expr::Literal(Value::Null),
            TokenKind::KwUndefined => Expr::Literal(Value::Undefined),
            TokenKind::Ident => Expr::Name(SmolStr::new(self.text(token))),
            TokenKind::LParen => {
                let inner = self.expression(0)?;
                self.expect(TokenKind::RParen)?;
                inner
            }
            _ => return Err(self.unexpected(token)),
        };
        self.postfix(primary)
    }

    fn postfix(&mut self, mut expr: Expr) -> Result<Expr, ExprError> {
        loop {
            if self.eat(TokenKind::Dot) {
                self.nest()?;
                let name = self.expect(TokenKind::Ident)?;
                expr = Expr::Member {
                    target: Box::new(expr),
                    property: SmolStr::new(self.text(name)),
                };
            } else if self.eat(TokenKind::LParen) {
                self.nest()?;
                let mut args = Vec::new();
                if !self.eat(TokenKind::RParen) {
                    loop {
                        args.push(self.expression(0)?);
                        if self.eat(TokenKind::Comma) {
                            continue;
                        }
                        self.expect(TokenKind::RParen)?;
                        break;
                    }
                }
                expr = Expr::Call {
                    target: Box::new(expr),
                    args,
                };
            } else {
                return Ok(expr);
            }
        }
    }
}

/// Strip the quotes from a string literal and resolve escapes.
fn unescape(literal: &str) -> SmolStr {
    let body = &literal[1..literal.len() - 1];
    if !body.contains('\\') {
        return SmolStr::new(body);
    }
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('v') => out.push('\u{b}'),
            Some('x') => push_code_unit(&mut out, &mut chars, 2),
            Some('u') => push_code_unit(&mut out, &mut chars, 4),
            Some(other) => out.push(other),
            None => {}
        }
    }
    SmolStr::new(out)
}

fn push_code_unit(out: &mut String, chars: &mut std::str::Chars<'_>, digits: usize) {
    let hex: String = chars.by_ref().take(digits).collect();
    match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
        Some(ch) => out.push(ch),
        None => out.push_str(&hex),
    }
}
