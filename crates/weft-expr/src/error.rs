//! Error types for expression evaluation.

/// Error while parsing or evaluating an expression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum EvalError {
    /// Character that cannot start a token.
    #[error("unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar {
        /// Offending character.
        ch: char,
        /// Byte offset in the expression.
        offset: usize,
    },

    /// String literal without closing quote.
    #[error("unterminated string starting at offset {0}")]
    UnterminatedString(usize),

    /// Numeric literal that does not parse.
    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    /// Token that does not fit the grammar.
    #[error("unexpected '{found}' at offset {offset}")]
    UnexpectedToken {
        /// Offending token text.
        found: String,
        /// Byte offset in the expression.
        offset: usize,
    },

    /// Expression ended early.
    #[error("unexpected end of expression")]
    UnexpectedEnd,

    /// Nesting beyond the parser's depth limit.
    #[error("expression nested deeper than {0} levels")]
    TooDeep(usize),

    /// Property read on `null`.
    #[error("cannot read property '{0}' of null")]
    NullAccess(String),
}
