use thiserror::Error;

/// Errors raised while turning a raw filter mapping into a predicate tree.
///
/// Parsing is purely structural: field names and operand types are not
/// checked here (that requires a field registry, which lives one layer up).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unsupported operator: {0}")]
    UnsupportedOperator(String),

    #[error("unsupported where combinator: {0}")]
    UnsupportedCombinator(String),
}

pub type ParseResult<T> = Result<T, ParseError>;
