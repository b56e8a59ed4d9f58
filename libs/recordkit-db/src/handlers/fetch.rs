//! Multi-record fetch handler with pagination and ordering.

use std::sync::Arc;

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QuerySelect, Select};

use recordkit_filter::{Document, OrderBy};

use crate::compile::{apply_order, compile_filter};
use crate::error::{Error, Result};
use crate::fields::FieldMap;
use crate::handle::{BlockingDb, UnitOfWork, finalize};
use crate::schema::SchemaSet;

/// Page and order parameters for a fetch.
///
/// Order tokens are field names, each optionally prefixed with `-` for
/// descending. Tokens naming undeclared fields are silently skipped; when
/// nothing resolves, ordering falls back to the ascending primary key so
/// repeated fetches over identical data page stably.
#[derive(Debug, Clone, Default)]
pub struct FetchParams {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub order: Vec<String>,
}

impl FetchParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    #[must_use]
    pub fn order<S: Into<String>>(mut self, tokens: impl IntoIterator<Item = S>) -> Self {
        self.order = tokens.into_iter().map(Into::into).collect();
        self
    }
}

/// Handler returning an ordered, materialized sequence of matches.
#[derive(Debug)]
pub struct Fetch<E: EntityTrait> {
    fields: FieldMap<E>,
    schema: Option<Arc<SchemaSet>>,
}

impl<E> Fetch<E>
where
    E: EntityTrait,
    E::Column: ColumnTrait + Copy,
{
    pub fn new(fields: FieldMap<E>, schema: Option<Arc<SchemaSet>>) -> Self {
        Self { fields, schema }
    }

    fn build_select(&self, filter: Option<&Document>, params: &FetchParams) -> Result<Select<E>> {
        let mut select = E::find();

        if let Some(doc) = filter {
            let doc = match &self.schema {
                Some(schema) => schema.validate_filter(doc)?,
                None => doc.clone(),
            };
            select = select.filter(compile_filter(&self.fields, &doc)?);
        }

        select = apply_order(select, &self.fields, &OrderBy::parse(&params.order));

        if let Some(offset) = params.offset {
            select = select.offset(offset);
        }
        if let Some(limit) = params.limit {
            select = select.limit(limit);
        }
        Ok(select)
    }

    /// Fetch every match under the effective order and page window.
    ///
    /// # Errors
    /// Validation and compilation errors abort before any I/O; execution
    /// errors roll the unit of work back and pass through unchanged.
    pub async fn exec(
        &self,
        uow: UnitOfWork,
        filter: Option<&Document>,
        params: &FetchParams,
    ) -> Result<Vec<E::Model>> {
        let select = self.build_select(filter, params)?;
        let outcome = select.all(uow.txn()).await.map_err(Error::from);
        finalize(uow, outcome).await
    }

    /// Blocking variant; acquires its own scoped unit of work.
    ///
    /// # Errors
    /// As [`Fetch::exec`], plus [`Error::ExecutionContext`] when called from
    /// inside an async runtime.
    pub fn exec_blocking(
        &self,
        db: &BlockingDb,
        filter: Option<&Document>,
        params: &FetchParams,
    ) -> Result<Vec<E::Model>> {
        let select = self.build_select(filter, params)?;
        db.run(async {
            let uow = db.db().open_scoped().await?;
            let outcome = select.all(uow.txn()).await.map_err(Error::from);
            finalize(uow, outcome).await
        })
    }
}
