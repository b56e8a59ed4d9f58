//! Predicate tree → `sea_orm::Condition` compiler.
//!
//! Parsing the declarative mapping lives in `recordkit-filter`; this module
//! resolves field names through the [`FieldMap`], coerces loosely-typed
//! operands into engine values by declared [`FieldKind`], and lowers each
//! operator through one exhaustive match. Everything here is pure and runs
//! before any I/O: a filter that fails to compile never reaches the engine.

use chrono::{NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, Func, Order, SimpleExpr};
use sea_orm::{ColumnTrait, Condition, EntityTrait, Iterable, PrimaryKeyToColumn, QueryOrder, Select};
use serde_json::Value as Json;

use recordkit_filter::{Document, FilterOp, OrderBy, Predicate, SortDir, parse_condition, parse_filter};

use crate::error::{Error, Result};
use crate::fields::{Field, FieldKind, FieldMap};

/* ---------- coercion helpers ---------- */

fn json_type_name(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

/// Coerce one loosely-typed operand into an engine value of the field's kind.
///
/// Strings are parsed for the kinds that arrive as text (uuid, datetime,
/// date, time, decimal). Anything that does not fit the declared kind is a
/// [`Error::TypeMismatch`].
///
/// # Errors
/// Returns `Error::TypeMismatch` when the operand shape does not fit `kind`.
pub fn coerce(kind: FieldKind, value: &Json) -> Result<sea_orm::Value> {
    let mismatch = || Error::TypeMismatch {
        expected: kind,
        got: json_type_name(value).to_owned(),
    };

    Ok(match (kind, value) {
        (FieldKind::String, Json::String(s)) => sea_orm::Value::String(Some(Box::new(s.clone()))),

        (FieldKind::I64, Json::Number(n)) => {
            sea_orm::Value::BigInt(Some(n.as_i64().ok_or_else(mismatch)?))
        }

        (FieldKind::F64, Json::Number(n)) => {
            sea_orm::Value::Double(Some(n.as_f64().ok_or_else(mismatch)?))
        }

        // Decimals arrive as JSON numbers or strings; go through text to
        // preserve precision.
        (FieldKind::Decimal, Json::Number(n)) => {
            let d = n.to_string().parse::<Decimal>().map_err(|_| mismatch())?;
            sea_orm::Value::Decimal(Some(Box::new(d)))
        }
        (FieldKind::Decimal, Json::String(s)) => {
            let d = s.parse::<Decimal>().map_err(|_| mismatch())?;
            sea_orm::Value::Decimal(Some(Box::new(d)))
        }

        (FieldKind::Bool, Json::Bool(b)) => sea_orm::Value::Bool(Some(*b)),

        (FieldKind::Uuid, Json::String(s)) => {
            let u = s.parse::<uuid::Uuid>().map_err(|_| mismatch())?;
            sea_orm::Value::Uuid(Some(Box::new(u)))
        }

        (FieldKind::DateTimeUtc, Json::String(s)) => {
            let dt = chrono::DateTime::parse_from_rfc3339(s)
                .map_err(|_| mismatch())?
                .with_timezone(&Utc);
            sea_orm::Value::ChronoDateTimeUtc(Some(Box::new(dt)))
        }

        (FieldKind::Date, Json::String(s)) => {
            let d = s.parse::<NaiveDate>().map_err(|_| mismatch())?;
            sea_orm::Value::ChronoDate(Some(Box::new(d)))
        }

        (FieldKind::Time, Json::String(s)) => {
            let t = s.parse::<NaiveTime>().map_err(|_| mismatch())?;
            sea_orm::Value::ChronoTime(Some(Box::new(t)))
        }

        _ => return Err(mismatch()),
    })
}

fn coerce_list(kind: FieldKind, op: FilterOp, operand: &Json) -> Result<Vec<sea_orm::Value>> {
    let Json::Array(items) = operand else {
        return Err(Error::InvalidOperand {
            op: op.to_string(),
            expected: "a list of values",
        });
    };
    items.iter().map(|item| coerce(kind, item)).collect()
}

fn coerce_pair(kind: FieldKind, op: FilterOp, operand: &Json) -> Result<(sea_orm::Value, sea_orm::Value)> {
    let invalid = || Error::InvalidOperand {
        op: op.to_string(),
        expected: "a [low, high] pair",
    };
    let Json::Array(items) = operand else {
        return Err(invalid());
    };
    let [low, high] = items.as_slice() else {
        return Err(invalid());
    };
    Ok((coerce(kind, low)?, coerce(kind, high)?))
}

fn pattern(op: FilterOp, operand: &Json) -> Result<&str> {
    operand.as_str().ok_or_else(|| Error::InvalidOperand {
        op: op.to_string(),
        expected: "a string pattern",
    })
}

fn flag(op: FilterOp, operand: &Json) -> Result<bool> {
    operand.as_bool().ok_or_else(|| Error::InvalidOperand {
        op: op.to_string(),
        expected: "a boolean flag",
    })
}

fn date_part(op: FilterOp, operand: &Json) -> Result<i64> {
    operand.as_i64().ok_or_else(|| Error::InvalidOperand {
        op: op.to_string(),
        expected: "an integer",
    })
}

/* ---------- LIKE helpers ---------- */

fn like_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '%' | '_' | '\\' => {
                out.push('\\');
                out.push(ch);
            }
            c => out.push(c),
        }
    }
    out
}

fn like_contains(s: &str) -> String {
    format!("%{}%", like_escape(s))
}

fn like_starts(s: &str) -> String {
    format!("{}%", like_escape(s))
}

fn like_ends(s: &str) -> String {
    format!("%{}", like_escape(s))
}

/* ---------- leaf lowering ---------- */

/// `LOWER(col)` for the case-insensitive operators; lowering both sides is
/// portable across the gated backends, unlike `ILIKE`.
fn lowered<C: ColumnTrait + Copy>(col: C) -> Expr {
    Expr::expr(Func::lower(Expr::col(col)))
}

fn extract_eq<C: ColumnTrait + Copy>(col: C, part: &str, value: i64) -> SimpleExpr {
    let extracted = Expr::cust_with_expr(format!("EXTRACT({part} FROM $1)"), Expr::col(col));
    Expr::expr(extracted).eq(value)
}

fn leaf_condition<E>(field: &Field<E>, op: FilterOp, operand: &Json) -> Result<SimpleExpr>
where
    E: EntityTrait,
    E::Column: ColumnTrait + Copy,
{
    let col = field.col;
    let kind = field.kind;

    Ok(match op {
        // null handling: equality against null is a null test
        FilterOp::Exact => match operand {
            Json::Null => Expr::col(col).is_null(),
            v => Expr::col(col).eq(coerce(kind, v)?),
        },
        FilterOp::Ne => match operand {
            Json::Null => Expr::col(col).is_not_null(),
            v => Expr::col(col).ne(coerce(kind, v)?),
        },

        FilterOp::Gt => Expr::col(col).gt(coerce(kind, operand)?),
        FilterOp::Gte => Expr::col(col).gte(coerce(kind, operand)?),
        FilterOp::Lt => Expr::col(col).lt(coerce(kind, operand)?),
        FilterOp::Lte => Expr::col(col).lte(coerce(kind, operand)?),

        FilterOp::In => {
            let values = coerce_list(kind, op, operand)?;
            if values.is_empty() {
                // IN () → always false
                Expr::cust("1=0")
            } else {
                Expr::col(col).is_in(values)
            }
        }
        FilterOp::NotIn => {
            let values = coerce_list(kind, op, operand)?;
            if values.is_empty() {
                // NOT IN () → always true
                Expr::cust("1=1")
            } else {
                Expr::col(col).is_not_in(values)
            }
        }

        FilterOp::Like => Expr::col(col).like(pattern(op, operand)?),
        FilterOp::Contains => Expr::col(col).like(like_contains(pattern(op, operand)?)),
        FilterOp::StartsWith => Expr::col(col).like(like_starts(pattern(op, operand)?)),
        FilterOp::EndsWith => Expr::col(col).like(like_ends(pattern(op, operand)?)),

        FilterOp::ILike => lowered(col).like(pattern(op, operand)?.to_lowercase()),
        FilterOp::IContains => lowered(col).like(like_contains(&pattern(op, operand)?.to_lowercase())),
        FilterOp::IStartsWith => lowered(col).like(like_starts(&pattern(op, operand)?.to_lowercase())),
        FilterOp::IEndsWith => lowered(col).like(like_ends(&pattern(op, operand)?.to_lowercase())),

        FilterOp::Range | FilterOp::Between => {
            let (low, high) = coerce_pair(kind, op, operand)?;
            Expr::col(col).between(low, high)
        }
        FilterOp::NotBetween => {
            let (low, high) = coerce_pair(kind, op, operand)?;
            Expr::col(col).not_between(low, high)
        }

        FilterOp::IsNull => {
            if flag(op, operand)? {
                Expr::col(col).is_null()
            } else {
                Expr::col(col).is_not_null()
            }
        }
        FilterOp::IsNotNull => {
            if flag(op, operand)? {
                Expr::col(col).is_not_null()
            } else {
                Expr::col(col).is_null()
            }
        }

        FilterOp::Year => extract_eq(col, "YEAR", date_part(op, operand)?),
        FilterOp::Month => extract_eq(col, "MONTH", date_part(op, operand)?),
        FilterOp::Day => extract_eq(col, "DAY", date_part(op, operand)?),
    })
}

/* ---------- predicate -> Condition ---------- */

/// Lower a parsed predicate tree into an engine condition.
///
/// # Errors
/// Returns `Error::UnknownField` for undeclared fields and coercion errors
/// for operands that do not fit their field's kind.
pub fn compile_predicate<E>(fields: &FieldMap<E>, predicate: &Predicate) -> Result<Condition>
where
    E: EntityTrait,
    E::Column: ColumnTrait + Copy,
{
    Ok(match predicate {
        Predicate::Compare { field, op, operand } => {
            let resolved = fields
                .get(field)
                .ok_or_else(|| Error::UnknownField(field.clone()))?;
            Condition::all().add(leaf_condition::<E>(resolved, *op, operand)?)
        }
        Predicate::All(children) => {
            let mut cond = Condition::all();
            for child in children {
                cond = cond.add(compile_predicate(fields, child)?);
            }
            cond
        }
        Predicate::Any(children) => {
            let mut cond = Condition::any();
            for child in children {
                cond = cond.add(compile_predicate(fields, child)?);
            }
            cond
        }
        Predicate::Not(inner) => Condition::all().add(compile_predicate(fields, inner)?).not(),
    })
}

/// Compile one `field -> value-or-operator-map` pair.
///
/// # Errors
/// Returns `Error::UnknownField` if the field is not declared and
/// `Error::UnsupportedOperator` for keys outside the catalog.
pub fn compile_condition<E>(fields: &FieldMap<E>, field: &str, value: &Json) -> Result<Condition>
where
    E: EntityTrait,
    E::Column: ColumnTrait + Copy,
{
    if !fields.contains(field) {
        return Err(Error::UnknownField(field.to_owned()));
    }
    let predicate = parse_condition(field, value)?;
    compile_predicate(fields, &predicate)
}

/// Compile a whole filter mapping; pairs conjoin with AND. An empty mapping
/// compiles to the empty all-condition, which renders no WHERE clause.
///
/// # Errors
/// See [`compile_condition`].
pub fn compile_filter<E>(fields: &FieldMap<E>, doc: &Document) -> Result<Condition>
where
    E: EntityTrait,
    E::Column: ColumnTrait + Copy,
{
    let predicate = parse_filter(doc)?;
    compile_predicate(fields, &predicate)
}

/* ---------- ordering ---------- */

/// First declared primary-key column; the default sort key.
pub(crate) fn default_order_column<E: EntityTrait>() -> Option<E::Column> {
    E::PrimaryKey::iter().next().map(PrimaryKeyToColumn::into_column)
}

/// Apply an order specification to a select.
///
/// Unknown order fields are silently skipped — a deliberate best-effort
/// policy, not an error. When no requested key resolves (including the
/// empty specification), ordering falls back to the ascending primary key so
/// repeated fetches paginate stably.
pub fn apply_order<E>(mut select: Select<E>, fields: &FieldMap<E>, order: &OrderBy) -> Select<E>
where
    E: EntityTrait,
    E::Column: ColumnTrait + Copy,
{
    let mut applied = false;
    for key in &order.0 {
        let Some(field) = fields.get(&key.field) else {
            tracing::debug!(field = %key.field, "skipping unknown order field");
            continue;
        };
        let dir = match key.dir {
            SortDir::Asc => Order::Asc,
            SortDir::Desc => Order::Desc,
        };
        select = select.order_by(field.col, dir);
        applied = true;
    }

    if !applied {
        if let Some(col) = default_order_column::<E>() {
            select = select.order_by(col, Order::Asc);
        }
    }
    select
}

#[cfg(test)]
mod tests;
