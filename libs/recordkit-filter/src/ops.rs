//! The fixed operator catalog for filter mappings.
//!
//! Every operator key that may appear inside a field's operator map is a
//! variant here. Keeping the catalog as a closed enum means every dispatch
//! site is an exhaustive `match`: adding an operator is a compile error
//! until all consumers handle it, and an unknown key is rejected exactly
//! once, at parse time.

use std::fmt;

/// Shape of the operand an operator expects.
///
/// The parser does not enforce this; it is advisory metadata consumed by
/// compilers that need to coerce operands into engine values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandShape {
    /// A single scalar value (`{"gt": 5}`).
    Scalar,
    /// A list of scalar values (`{"in": [1, 2, 3]}`).
    List,
    /// An ordered `[low, high]` pair (`{"between": [18, 65]}`).
    Pair,
    /// A boolean flag (`{"isnull": true}`).
    Flag,
}

/// Filter operators recognized inside an operator map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOp {
    /// Equality; also what a bare literal value means.
    Exact,
    Gt,
    Gte,
    Lt,
    Lte,
    Ne,
    In,
    NotIn,
    /// Raw `LIKE` with a caller-supplied pattern (no escaping).
    Like,
    Contains,
    StartsWith,
    EndsWith,
    /// Case-insensitive `LIKE` with a caller-supplied pattern.
    ILike,
    IContains,
    IStartsWith,
    IEndsWith,
    Range,
    Between,
    NotBetween,
    IsNull,
    IsNotNull,
    /// Date-part extraction compared for equality.
    Year,
    Month,
    Day,
}

impl FilterOp {
    /// All catalog entries, in catalog order.
    pub const ALL: &'static [FilterOp] = &[
        FilterOp::Exact,
        FilterOp::Gt,
        FilterOp::Gte,
        FilterOp::Lt,
        FilterOp::Lte,
        FilterOp::Ne,
        FilterOp::In,
        FilterOp::NotIn,
        FilterOp::Like,
        FilterOp::Contains,
        FilterOp::StartsWith,
        FilterOp::EndsWith,
        FilterOp::ILike,
        FilterOp::IContains,
        FilterOp::IStartsWith,
        FilterOp::IEndsWith,
        FilterOp::Range,
        FilterOp::Between,
        FilterOp::NotBetween,
        FilterOp::IsNull,
        FilterOp::IsNotNull,
        FilterOp::Year,
        FilterOp::Month,
        FilterOp::Day,
    ];

    /// Canonical key as written in a filter mapping.
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            FilterOp::Exact => "exact",
            FilterOp::Gt => "gt",
            FilterOp::Gte => "gte",
            FilterOp::Lt => "lt",
            FilterOp::Lte => "lte",
            FilterOp::Ne => "ne",
            FilterOp::In => "in",
            FilterOp::NotIn => "not_in",
            FilterOp::Like => "like",
            FilterOp::Contains => "contains",
            FilterOp::StartsWith => "startswith",
            FilterOp::EndsWith => "endswith",
            FilterOp::ILike => "ilike",
            FilterOp::IContains => "icontains",
            FilterOp::IStartsWith => "istartswith",
            FilterOp::IEndsWith => "iendswith",
            FilterOp::Range => "range",
            FilterOp::Between => "between",
            FilterOp::NotBetween => "not_between",
            FilterOp::IsNull => "isnull",
            FilterOp::IsNotNull => "isnotnull",
            FilterOp::Year => "year",
            FilterOp::Month => "month",
            FilterOp::Day => "day",
        }
    }

    /// Resolve an operator by its mapping key, or `None` if not in the catalog.
    #[must_use]
    pub fn from_key(key: &str) -> Option<FilterOp> {
        FilterOp::ALL.iter().copied().find(|op| op.key() == key)
    }

    /// Operand shape this operator expects.
    #[must_use]
    pub fn operand_shape(&self) -> OperandShape {
        match self {
            FilterOp::In | FilterOp::NotIn => OperandShape::List,
            FilterOp::Range | FilterOp::Between | FilterOp::NotBetween => OperandShape::Pair,
            FilterOp::IsNull | FilterOp::IsNotNull => OperandShape::Flag,
            _ => OperandShape::Scalar,
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_key_round_trips() {
        for op in FilterOp::ALL {
            assert_eq!(FilterOp::from_key(op.key()), Some(*op));
        }
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert_eq!(FilterOp::from_key("regex"), None);
        assert_eq!(FilterOp::from_key("GT"), None);
    }

    #[test]
    fn operand_shapes() {
        assert_eq!(FilterOp::In.operand_shape(), OperandShape::List);
        assert_eq!(FilterOp::Between.operand_shape(), OperandShape::Pair);
        assert_eq!(FilterOp::IsNull.operand_shape(), OperandShape::Flag);
        assert_eq!(FilterOp::Gte.operand_shape(), OperandShape::Scalar);
    }
}
