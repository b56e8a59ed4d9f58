//! First-match lookup handler.

use std::sync::Arc;

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Select};

use recordkit_filter::Document;

use crate::compile::compile_filter;
use crate::error::{Error, Result};
use crate::fields::FieldMap;
use crate::handle::{BlockingDb, UnitOfWork, finalize};
use crate::schema::SchemaSet;

/// Handler returning the first record matching an optional filter mapping,
/// under the engine's natural order. Callers that need an explicit order
/// compose one through the query builder or use fetch.
#[derive(Debug)]
pub struct Find<E: EntityTrait> {
    fields: FieldMap<E>,
    schema: Option<Arc<SchemaSet>>,
}

impl<E> Find<E>
where
    E: EntityTrait,
    E::Column: ColumnTrait + Copy,
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

    /// Find the first match, or `None`.
    ///
    /// # Errors
    /// Validation and compilation errors abort before any I/O; execution
    /// errors roll the unit of work back and pass through unchanged.
    pub async fn exec(&self, uow: UnitOfWork, filter: Option<&Document>) -> Result<Option<E::Model>> {
        let select = self.build_select(filter)?;
        let outcome = select.one(uow.txn()).await.map_err(Error::from);
        finalize(uow, outcome).await
    }

    /// Blocking variant; acquires its own scoped unit of work.
    ///
    /// # Errors
    /// As [`Find::exec`], plus [`Error::ExecutionContext`] when called from
    /// inside an async runtime.
    pub fn exec_blocking(&self, db: &BlockingDb, filter: Option<&Document>) -> Result<Option<E::Model>> {
        let select = self.build_select(filter)?;
        db.run(async {
            let uow = db.db().open_scoped().await?;
            let outcome = select.one(uow.txn()).await.map_err(Error::from);
            finalize(uow, outcome).await
        })
    }
}
