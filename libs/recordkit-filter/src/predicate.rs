//! Normalized predicate tree parsed from a raw filter mapping.
//!
//! A filter mapping is an ordered collection of `field -> value` pairs where
//! the value is either a literal (equality) or an operator map. Parsing
//! lowers that into a [`Predicate`] tree that downstream compilers can walk
//! without re-inspecting JSON shapes. Field names stay as strings: resolving
//! them against a record type's declared fields is the compiler's job, not
//! the parser's.

use serde_json::Value;

use crate::errors::{ParseError, ParseResult};
use crate::ops::FilterOp;

/// A loosely-typed filter or payload mapping.
pub type Document = serde_json::Map<String, Value>;

/// Engine-free boolean predicate tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// One `field <op> operand` leaf. The operand is still loosely typed;
    /// coercion happens against the field registry.
    Compare {
        field: String,
        op: FilterOp,
        operand: Value,
    },
    /// Conjunction. `All([])` is the always-true "no restriction" predicate.
    All(Vec<Predicate>),
    /// Disjunction.
    Any(Vec<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    #[must_use]
    pub fn compare(field: impl Into<String>, op: FilterOp, operand: Value) -> Self {
        Predicate::Compare {
            field: field.into(),
            op,
            operand,
        }
    }

    /// True when the predicate matches every record.
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        matches!(self, Predicate::All(children) if children.is_empty())
    }
}

/// Parse one `field -> value` pair.
///
/// A literal value means equality. An object value is an operator map: every
/// key must name a catalog operator, each entry becomes one leaf, and the
/// leaves combine with AND — `{"age": {"gte": 18, "lte": 65}}` is an
/// inclusive range. Cross-field combination logic lives one level up.
///
/// # Errors
/// Returns [`ParseError::UnsupportedOperator`] for a key outside the catalog.
pub fn parse_condition(field: &str, value: &Value) -> ParseResult<Predicate> {
    let Value::Object(op_map) = value else {
        return Ok(Predicate::compare(field, FilterOp::Exact, value.clone()));
    };

    let mut leaves = Vec::with_capacity(op_map.len());
    for (key, operand) in op_map {
        let op = FilterOp::from_key(key)
            .ok_or_else(|| ParseError::UnsupportedOperator(key.clone()))?;
        leaves.push(Predicate::compare(field, op, operand.clone()));
    }

    if leaves.len() == 1 {
        Ok(leaves.remove(0))
    } else {
        Ok(Predicate::All(leaves))
    }
}

/// Parse a whole filter mapping into a conjunction over its pairs.
///
/// An empty mapping parses to `All([])`, i.e. no restriction.
///
/// # Errors
/// Returns [`ParseError::UnsupportedOperator`] for any unrecognized key.
pub fn parse_filter(doc: &Document) -> ParseResult<Predicate> {
    let mut parts = Vec::with_capacity(doc.len());
    for (field, value) in doc {
        parts.push(parse_condition(field, value)?);
    }
    Ok(Predicate::All(parts))
}
