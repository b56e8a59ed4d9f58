//! Error taxonomy for compilation, validation, and execution.
//!
//! Engine errors pass through untouched: anything the store reports
//! (constraint violations, connectivity failures) surfaces as
//! [`Error::Db`] with the original `DbErr` inside. This layer never
//! reclassifies them.

use std::fmt;

use recordkit_filter::ParseError;
use thiserror::Error;

use crate::fields::FieldKind;

/// One field-level schema violation: instance path plus message.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Violation {
    pub path: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    /// A filter, payload, or order token referenced a field the record type
    /// does not declare.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// An operator map used a key outside the catalog.
    #[error("unsupported operator: {0}")]
    UnsupportedOperator(String),

    /// An operand's shape does not fit the declared field kind. Raised
    /// before any I/O; semantic mismatches the registry cannot see are left
    /// to the engine.
    #[error("type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: FieldKind, got: String },

    /// An operand's structure does not fit the operator.
    #[error("operator {op} expects {expected}")]
    InvalidOperand { op: String, expected: &'static str },

    /// A payload or filter mapping failed its bound validation schema.
    #[error("schema validation failed for {record} ({} violation(s))", .violations.len())]
    Validation {
        record: String,
        violations: Vec<Violation>,
    },

    /// Setup-time misconfiguration of a validation-schema triple. Fatal to
    /// binding; no handlers are constructed.
    #[error("schema binding for {record}: {reason}")]
    Binding { record: String, reason: String },

    /// Unsupported group combinator tag.
    #[error("unsupported where combinator: {0}")]
    Configuration(String),

    /// Operation invoked from the wrong execution context.
    #[error("execution context: {0}")]
    ExecutionContext(&'static str),

    /// The blocking facade failed to set up its runtime.
    #[error("blocking runtime: {0}")]
    Runtime(#[from] std::io::Error),

    /// Opaque pass-through from the underlying engine.
    #[error(transparent)]
    Db(#[from] sea_orm::DbErr),
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::UnsupportedOperator(op) => Error::UnsupportedOperator(op),
            ParseError::UnsupportedCombinator(tag) => Error::Configuration(tag),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
