//! Record-count handler.

use std::sync::Arc;

use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Select};

use recordkit_filter::Document;

use crate::compile::compile_filter;
use crate::error::{Error, Result};
use crate::fields::FieldMap;
use crate::handle::{BlockingDb, UnitOfWork, finalize};
use crate::schema::SchemaSet;

/// Handler counting the records matching an optional filter mapping.
/// Ordering and limits do not apply to counts.
#[derive(Debug)]
pub struct Count<E: EntityTrait> {
    fields: FieldMap<E>,
    schema: Option<Arc<SchemaSet>>,
}

impl<E> Count<E>
where
    E: EntityTrait,
    E::Column: ColumnTrait + Copy,
    E::Model: Send + Sync,
{
    pub fn new(fields: FieldMap<E>, schema: Option<Arc<SchemaSet>>) -> Self {
        Self { fields, schema }
    }

    fn build_select(&self, filter: Option<&Document>) -> Result<Select<E>> {
        let mut select = E::find();
        if let Some(doc) = filter {
            let doc = match &self.schema {
                Some(schema) => schema.validate_filter(doc)?,
                None => doc.clone(),
            };
            select = select.filter(compile_filter(&self.fields, &doc)?);
        }
        Ok(select)
    }

    /// Count matching records.
    ///
    /// # Errors
    /// Validation and compilation errors abort before any I/O; execution
    /// errors roll the unit of work back and pass through unchanged.
    pub async fn exec(&self, uow: UnitOfWork, filter: Option<&Document>) -> Result<u64> {
        let select = self.build_select(filter)?;
        let outcome = select.count(uow.txn()).await.map_err(Error::from);
        finalize(uow, outcome).await
    }

    /// Blocking variant; acquires its own scoped unit of work.
    ///
    /// # Errors
    /// As [`Count::exec`], plus [`Error::ExecutionContext`] when called from
    /// inside an async runtime.
    pub fn exec_blocking(&self, db: &BlockingDb, filter: Option<&Document>) -> Result<u64> {
        let select = self.build_select(filter)?;
        db.run(async {
            let uow = db.db().open_scoped().await?;
            let outcome = select.count(uow.txn()).await.map_err(Error::from);
            finalize(uow, outcome).await
        })
    }
}
