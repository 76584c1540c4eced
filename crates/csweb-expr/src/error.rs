//! Expression errors.

#![allow(missing_docs)]

use smol_str::SmolStr;
use thiserror::Error;

/// Errors raised while parsing or evaluating an expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
    /// A token appeared where it is not allowed.
    #[error("unexpected token '{text}' at offset {offset}")]
    UnexpectedToken { text: SmolStr, offset: u32 },

    /// The source ended in the middle of an expression.
    #[error("unexpected end of expression")]
    UnexpectedEnd,

    /// A string literal is missing its closing quote.
    #[error("unterminated string literal at offset {0}")]
    UnterminatedString(u32),

    /// A numeric literal could not be read.
    #[error("invalid number literal '{0}'")]
    InvalidNumber(SmolStr),

    /// Name not present in the evaluation scope.
    #[error("{0} is not defined")]
    UndefinedVariable(SmolStr),

    /// Unknown function.
    #[error("undefined function '{0}'")]
    UndefinedFunction(SmolStr),

    /// Call on something that is not a function.
    #[error("'{0}' is not a function")]
    NotCallable(SmolStr),

    /// Property read on `undefined` or `null`.
    #[error("cannot read property '{property}' of {target}")]
    NullProperty { property: SmolStr, target: SmolStr },

    /// Nesting exceeds [`MAX_DEPTH`](crate::ast::MAX_DEPTH).
    #[error("expression nested deeper than {0} levels")]
    TooDeep(u32),

    /// Wrong number of arguments for a builtin.
    #[error("invalid argument count for '{name}' (expected {expected}, got {got})")]
    InvalidArgumentCount {
        name: SmolStr,
        expected: usize,
        got: usize,
    },
}
