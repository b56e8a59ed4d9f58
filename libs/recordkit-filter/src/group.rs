//! Logical combinators for grouping the pairs of one `where` call.

use std::fmt;
use std::str::FromStr;

use crate::errors::ParseError;
use crate::predicate::Predicate;

/// How the per-field predicates of a single condition group combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum GroupOp {
    /// All pairs must match.
    #[serde(rename = "AND")]
    And,
    /// At least one pair must match.
    #[serde(rename = "OR")]
    Or,
    /// Negated conjunction: at least one pair must fail.
    #[serde(rename = "NOT_ALL")]
    NotAll,
    /// Negated disjunction: every pair must fail.
    #[serde(rename = "NOT_ANY")]
    NotAny,
}

impl GroupOp {
    /// Wire tag as accepted by [`GroupOp::from_str`].
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            GroupOp::And => "AND",
            GroupOp::Or => "OR",
            GroupOp::NotAll => "NOT_ALL",
            GroupOp::NotAny => "NOT_ANY",
        }
    }

    /// Combine a group's predicates under this combinator.
    #[must_use]
    pub fn combine(&self, parts: Vec<Predicate>) -> Predicate {
        match self {
            GroupOp::And => Predicate::All(parts),
            GroupOp::Or => Predicate::Any(parts),
            GroupOp::NotAll => Predicate::Not(Box::new(Predicate::All(parts))),
            GroupOp::NotAny => Predicate::Not(Box::new(Predicate::Any(parts))),
        }
    }
}

impl fmt::Display for GroupOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for GroupOp {
    type Err = ParseError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "AND" => Ok(GroupOp::And),
            "OR" => Ok(GroupOp::Or),
            "NOT_ALL" => Ok(GroupOp::NotAll),
            "NOT_ANY" => Ok(GroupOp::NotAny),
            other => Err(ParseError::UnsupportedCombinator(other.to_owned())),
        }
    }
}
