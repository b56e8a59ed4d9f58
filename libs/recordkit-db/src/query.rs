//! Multi-group query builder.
//!
//! Accumulates condition groups built from filter mappings, each combined
//! under its own [`GroupOp`]; the groups themselves conjoin with AND at
//! build time. Execution reuses the handler lifecycle and returns the full
//! ordered sequence of matches — limit, offset, and explicit ordering stay
//! fetch-only capabilities.

use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter};

use recordkit_filter::{Document, GroupOp, parse_condition};

use crate::compile::compile_predicate;
use crate::error::{Error, Result};
use crate::fields::FieldMap;
use crate::handle::{BlockingDb, UnitOfWork, finalize};

#[derive(Debug)]
pub struct QueryBuilder<E: EntityTrait> {
    fields: FieldMap<E>,
    groups: Vec<Condition>,
}

impl<E> QueryBuilder<E>
where
    E: EntityTrait,
    E::Column: ColumnTrait + Copy,
{
    pub fn new(fields: FieldMap<E>) -> Self {
        Self {
            fields,
            groups: Vec::new(),
        }
    }

    /// Add one condition group. Compilation is eager: a bad field or
    /// operator fails here, before any execution. An empty mapping adds
    /// nothing.
    ///
    /// # Errors
    /// Returns field-resolution, operator, and coercion errors from the
    /// compiler.
    pub fn where_group(mut self, filter: &Document, group: GroupOp) -> Result<Self> {
        if filter.is_empty() {
            return Ok(self);
        }

        let mut parts = Vec::with_capacity(filter.len());
        for (field, value) in filter {
            parts.push(parse_condition(field, value)?);
        }
        let predicate = group.combine(parts);
        self.groups.push(compile_predicate(&self.fields, &predicate)?);
        Ok(self)
    }

    /// Add one condition group with the combinator given as a wire tag.
    ///
    /// # Errors
    /// As [`QueryBuilder::where_group`], plus [`Error::Configuration`] for
    /// an unsupported tag.
    pub fn where_tagged(self, filter: &Document, tag: &str) -> Result<Self> {
        let group: GroupOp = tag.parse().map_err(Error::from)?;
        self.where_group(filter, group)
    }

    /// The compiled condition: all accumulated groups conjoined.
    #[must_use]
    pub fn condition(&self) -> Condition {
        self.groups
            .iter()
            .fold(Condition::all(), |acc, group| acc.add(group.clone()))
    }

    /// Execute and return every matching record.
    ///
    /// # Errors
    /// Execution errors roll the unit of work back and pass through
    /// unchanged.
    pub async fn run(&self, uow: UnitOfWork) -> Result<Vec<E::Model>> {
        let select = E::find().filter(self.condition());
        let outcome = select.all(uow.txn()).await.map_err(Error::from);
        finalize(uow, outcome).await
    }

    /// Blocking variant; acquires its own scoped unit of work.
    ///
    /// # Errors
    /// As [`QueryBuilder::run`], plus [`Error::ExecutionContext`] when
    /// called from inside an async runtime.
    pub fn run_blocking(&self, db: &BlockingDb) -> Result<Vec<E::Model>> {
        let select = E::find().filter(self.condition());
        db.run(async {
            let uow = db.db().open_scoped().await?;
            let outcome = select.all(uow.txn()).await.map_err(Error::from);
            finalize(uow, outcome).await
        })
    }
}
