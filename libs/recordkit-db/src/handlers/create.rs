//! Single-record insert handler.

use std::sync::Arc;

use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel};

use recordkit_filter::Document;

use crate::compile::coerce;
use crate::error::{Error, Result};
use crate::fields::FieldMap;
use crate::handle::{BlockingDb, UnitOfWork, finalize};
use crate::schema::SchemaSet;

/// Handler for creating one record from a payload mapping.
///
/// The payload is (optionally) validated, coerced into an active model
/// through the field registry, inserted, and committed. The returned model
/// is re-read from the store, so generated fields (auto-assigned
/// identifiers, column defaults) are populated.
#[derive(Debug)]
pub struct Create<E: EntityTrait> {
    fields: FieldMap<E>,
    schema: Option<Arc<SchemaSet>>,
}

impl<E> Create<E>
where
    E: EntityTrait,
    E::Column: ColumnTrait + Copy,
    E::ActiveModel: ActiveModelTrait<Entity = E> + Send,
    E::Model: IntoActiveModel<E::ActiveModel>,
{
    pub fn new(fields: FieldMap<E>, schema: Option<Arc<SchemaSet>>) -> Self {
        Self { fields, schema }
    }

    /// Validate + compile the payload into an active model. Pure; runs
    /// before any I/O.
    fn build_active_model(&self, payload: &Document) -> Result<E::ActiveModel> {
        let payload = match &self.schema {
            Some(schema) => schema.validate_create(payload)?,
            None => payload.clone(),
        };

        let mut model = <E::ActiveModel as ActiveModelTrait>::default();
        for (key, value) in &payload {
            let field = self
                .fields
                .get(key)
                .ok_or_else(|| Error::UnknownField(key.clone()))?;
            model.set(field.col, coerce(field.kind, value)?);
        }
        Ok(model)
    }

    /// Create one record inside the supplied unit of work.
    ///
    /// # Errors
    /// Validation and compilation errors abort before any I/O; execution
    /// errors roll the unit of work back and pass through unchanged.
    pub async fn exec(&self, uow: UnitOfWork, payload: &Document) -> Result<E::Model> {
        let model = self.build_active_model(payload)?;
        let outcome = model.insert(uow.txn()).await.map_err(Error::from);
        finalize(uow, outcome).await
    }

    /// Blocking variant; acquires its own scoped unit of work.
    ///
    /// # Errors
    /// As [`Create::exec`], plus [`Error::ExecutionContext`] when called
    /// from inside an async runtime.
    pub fn exec_blocking(&self, db: &BlockingDb, payload: &Document) -> Result<E::Model> {
        let model = self.build_active_model(payload)?;
        db.run(async {
            let uow = db.db().open_scoped().await?;
            let outcome = model.insert(uow.txn()).await.map_err(Error::from);
            finalize(uow, outcome).await
        })
    }
}
