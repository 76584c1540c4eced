//! Parser, rule and load errors.

#![allow(missing_docs)]

use smol_str::SmolStr;
use thiserror::Error;

/// A single property fragment could not be converted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The fragment has no text payload.
    #[error("could not parse text from value {0}")]
    MissingText(SmolStr),

    /// Expected literal `true` or `false`.
    #[error("could not parse boolean from value {0}")]
    InvalidBoolean(SmolStr),

    /// Text is not a number.
    #[error("could not parse number from value {0}")]
    InvalidNumber(SmolStr),

    /// A color channel is not an integer in 0..=255.
    #[error("{channel} value {value} out of range")]
    ColorOutOfRange { channel: char, value: SmolStr },

    /// A required child element or attribute is missing.
    #[error("missing field '{0}'")]
    MissingField(SmolStr),

    /// A code is not in a fixed lookup table.
    #[error("unknown {table} code {code}")]
    UnknownCode { table: &'static str, code: SmolStr },

    /// Catch-all for fragments with the wrong shape.
    #[error("unexpected fragment for {0}")]
    UnexpectedShape(SmolStr),
}

/// A complex (whole-element) parser failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    /// Absolute position with an empty coordinate or size.
    #[error("invalid absolute position ({x},{y},{width},{height})")]
    InvalidPosition {
        x: SmolStr,
        y: SmolStr,
        width: SmolStr,
        height: SmolStr,
    },

    /// No default size is known for a widget type without explicit size.
    #[error("no default size for widget type '{0}'")]
    MissingDefaultSize(SmolStr),

    /// Declared and actual element counts differ.
    #[error("count {declared} is not equal to number of {what} {actual}")]
    CountMismatch {
        what: &'static str,
        declared: usize,
        actual: usize,
    },

    /// A nested value failed to parse.
    #[error(transparent)]
    Property(#[from] ParseError),

    /// A file referenced by the element could not be loaded.
    #[error(transparent)]
    Load(#[from] FileLoadError),
}

/// A rule could not be applied.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuleError {
    /// The boolean or output expression failed.
    #[error("expression '{source_text}' failed: {error}")]
    Expression {
        source_text: SmolStr,
        error: csweb_expr::ExprError,
    },

    /// The matched value could not be converted for its target.
    #[error("value for '{prop}' could not be converted: {error}")]
    Value { prop: SmolStr, error: ParseError },

    /// The rule targets a composite property that is not set.
    #[error("rule target '{0}' has no property to update")]
    MissingTarget(SmolStr),
}

/// A whole display file could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FileLoadError {
    /// The server answered with an HTML page instead of the file.
    #[error("file not found: {0}")]
    NotFound(SmolStr),

    /// The file is not well-formed XML or JSON.
    #[error("malformed {format} in {path}: {message}")]
    Malformed {
        format: &'static str,
        path: SmolStr,
        message: SmolStr,
    },

    /// The document has no root element of the expected name.
    #[error("missing <{0}> root element")]
    MissingRoot(SmolStr),

    /// The extension does not name a supported format.
    #[error("unsupported display format '{0}'")]
    UnsupportedFormat(SmolStr),

    /// A collaborator failed to read the file.
    #[error("could not read {path}: {message}")]
    Io { path: SmolStr, message: SmolStr },
}
