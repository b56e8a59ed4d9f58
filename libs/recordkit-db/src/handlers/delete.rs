//! Bulk delete handler.

use std::sync::Arc;

use sea_orm::{ColumnTrait, DeleteMany, EntityTrait, QueryFilter};

use recordkit_filter::Document;

use crate::compile::compile_filter;
use crate::error::{Error, Result};
use crate::fields::FieldMap;
use crate::handle::{BlockingDb, UnitOfWork, finalize};
use crate::schema::SchemaSet;

/// Handler deleting every record matching a filter mapping.
///
/// An **empty filter mapping matches all records and deletes the whole
/// table**. That is the documented contract, not an accident: the filter-in,
/// count-out shape stays uniform with update, and callers guarding against
/// accidental full-table deletes pass an explicit always-false condition
/// (e.g. `{"id": {"in": []}}`). Irreversible.
#[derive(Debug)]
pub struct Delete<E: EntityTrait> {
    fields: FieldMap<E>,
    schema: Option<Arc<SchemaSet>>,
}

impl<E> Delete<E>
where
    E: EntityTrait,
    E::Column: ColumnTrait + Copy,
{
    pub fn new(fields: FieldMap<E>, schema: Option<Arc<SchemaSet>>) -> Self {
        Self { fields, schema }
    }

    fn build_delete(&self, filter: &Document) -> Result<DeleteMany<E>> {
        let filter = match &self.schema {
            Some(schema) => schema.validate_filter(filter)?,
            None => filter.clone(),
        };
        Ok(E::delete_many().filter(compile_filter(&self.fields, &filter)?))
    }

    /// Delete matching records, returning the affected-row count.
    ///
    /// # Errors
    /// Validation and compilation errors abort before any I/O; execution
    /// errors roll the unit of work back and pass through unchanged.
    pub async fn exec(&self, uow: UnitOfWork, filter: &Document) -> Result<u64> {
        let stmt = self.build_delete(filter)?;
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
    /// As [`Delete::exec`], plus [`Error::ExecutionContext`] when called
    /// from inside an async runtime.
    pub fn exec_blocking(&self, db: &BlockingDb, filter: &Document) -> Result<u64> {
        let stmt = self.build_delete(filter)?;
        db.run(async {
            let uow = db.db().open_scoped().await?;
            let outcome = stmt
                .exec(uow.txn())
                .await
                .map(|res| res.rows_affected)
                .map_err(Error::from);
            finalize(uow, outcome).await
        })
    }
}
