//! Bulk update handler.

use std::sync::Arc;

use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, UpdateMany};

use recordkit_filter::Document;

use crate::compile::{coerce, compile_filter};
use crate::error::{Error, Result};
use crate::fields::FieldMap;
use crate::handle::{BlockingDb, UnitOfWork, finalize};
use crate::schema::SchemaSet;

/// Handler updating every record matching a filter mapping.
///
/// Filter and payload are validated against independent schemas before
/// compilation. Returns the number of affected records.
#[derive(Debug)]
pub struct Update<E: EntityTrait> {
    fields: FieldMap<E>,
    schema: Option<Arc<SchemaSet>>,
}

impl<E> Update<E>
where
    E: EntityTrait,
    E::Column: ColumnTrait + Copy,
{
    pub fn new(fields: FieldMap<E>, schema: Option<Arc<SchemaSet>>) -> Self {
        Self { fields, schema }
    }

    /// Validate both mappings and assemble the statement. `None` when the
    /// validated payload sets nothing: there is no statement to run.
    fn build_update(&self, filter: &Document, payload: &Document) -> Result<Option<UpdateMany<E>>> {
        let (filter, payload) = match &self.schema {
            Some(schema) => (
                schema.validate_filter(filter)?,
                schema.validate_update(payload)?,
            ),
            None => (filter.clone(), payload.clone()),
        };

        if payload.is_empty() {
            return Ok(None);
        }

        let mut stmt = E::update_many().filter(compile_filter(&self.fields, &filter)?);
        for (key, value) in &payload {
            let field = self
                .fields
                .get(key)
                .ok_or_else(|| Error::UnknownField(key.clone()))?;
            stmt = stmt.col_expr(field.col, Expr::value(coerce(field.kind, value)?));
        }
        Ok(Some(stmt))
    }

    /// Update matching records, returning the affected-row count. An empty
    /// payload sets nothing and reports zero affected records.
    ///
    /// # Errors
    /// Validation and compilation errors abort before any I/O; execution
    /// errors roll the unit of work back and pass through unchanged.
    pub async fn exec(&self, uow: UnitOfWork, filter: &Document, payload: &Document) -> Result<u64> {
        let Some(stmt) = self.build_update(filter, payload)? else {
            return finalize(uow, Ok(0)).await;
        };
        let outcome = stmt
            .exec(uow.txn())
            .await
            .map(|res| res.rows_affected)
            .map_err(Error::from);
        finalize(uow, outcome).await
    }

    /// Blocking variant; acquires its own scoped unit of work.
    ///
    /// # Errors
    /// As [`Update::exec`], plus [`Error::ExecutionContext`] when called
    /// from inside an async runtime.
    pub fn exec_blocking(&self, db: &BlockingDb, filter: &Document, payload: &Document) -> Result<u64> {
        let stmt = self.build_update(filter, payload)?;
        db.run(async {
            let uow = db.db().open_scoped().await?;
            let Some(stmt) = stmt else {
                return finalize(uow, Ok(0)).await;
            };
            let outcome = stmt
                .exec(uow.txn())
                .await
                .map(|res| res.rows_affected)
                .map_err(Error::from);
            finalize(uow, outcome).await
        })
    }
}
