//! Instance-level operations on an already-loaded record.

use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel};

use recordkit_filter::Document;

use crate::compile::coerce;
use crate::error::{Error, Result};
use crate::fields::FieldMap;
use crate::handle::{BlockingDb, UnitOfWork, finalize};

/// Handler for mutating or destroying one loaded record.
#[derive(Debug)]
pub struct Record<E: EntityTrait> {
    fields: FieldMap<E>,
}

impl<E> Record<E>
where
    E: EntityTrait,
    E::Column: ColumnTrait + Copy,
    E::ActiveModel: ActiveModelTrait<Entity = E> + Send,
    E::Model: IntoActiveModel<E::ActiveModel> + Clone,
{
    pub fn new(fields: FieldMap<E>) -> Self {
        Self { fields }
    }

    /// Stage the payload onto an active model. Only keys naming declared
    /// fields are applied; unknown keys are skipped — a best-effort partial
    /// apply, by contract.
    fn stage(&self, instance: &E::Model, payload: &Document) -> Result<(E::ActiveModel, bool)> {
        let mut model = instance.clone().into_active_model();
        let mut touched = false;
        for (key, value) in payload {
            let Some(field) = self.fields.get(key) else {
                tracing::debug!(field = %key, "skipping unknown field in update_fields");
                continue;
            };
            model.set(field.col, coerce(field.kind, value)?);
            touched = true;
        }
        Ok((model, touched))
    }

    /// Apply the payload to the instance, persist, and refresh it in place.
    ///
    /// # Errors
    /// Coercion errors abort before any I/O; execution errors roll the unit
    /// of work back and pass through unchanged.
    pub async fn update_fields(
        &self,
        uow: UnitOfWork,
        instance: &mut E::Model,
        payload: &Document,
    ) -> Result<()> {
        let (model, touched) = self.stage(instance, payload)?;
        if !touched {
            // nothing applicable: still finalize the unit of work
            return finalize(uow, Ok(())).await;
        }
        let outcome = model.update(uow.txn()).await.map_err(Error::from);
        let refreshed = finalize(uow, outcome).await?;
        *instance = refreshed;
        Ok(())
    }

    /// Blocking variant of [`Record::update_fields`].
    ///
    /// # Errors
    /// As [`Record::update_fields`], plus [`Error::ExecutionContext`] when
    /// called from inside an async runtime.
    pub fn update_fields_blocking(
        &self,
        db: &BlockingDb,
        instance: &mut E::Model,
        payload: &Document,
    ) -> Result<()> {
        let (model, touched) = self.stage(instance, payload)?;
        let refreshed = db.run(async {
            let uow = db.db().open_scoped().await?;
            if !touched {
                return finalize(uow, Ok(None)).await;
            }
            let outcome = model.update(uow.txn()).await.map(Some).map_err(Error::from);
            finalize(uow, outcome).await
        })?;
        if let Some(refreshed) = refreshed {
            *instance = refreshed;
        }
        Ok(())
    }

    /// Delete the record and commit. Consumes the instance: a destroyed
    /// record cannot be used again.
    ///
    /// # Errors
    /// Execution errors roll the unit of work back and pass through
    /// unchanged.
    pub async fn destroy(&self, uow: UnitOfWork, instance: E::Model) -> Result<()> {
        let model = instance.into_active_model();
        let outcome = model.delete(uow.txn()).await.map(|_| ()).map_err(Error::from);
        finalize(uow, outcome).await
    }

    /// Blocking variant of [`Record::destroy`].
    ///
    /// # Errors
    /// As [`Record::destroy`], plus [`Error::ExecutionContext`] when called
    /// from inside an async runtime.
    pub fn destroy_blocking(&self, db: &BlockingDb, instance: E::Model) -> Result<()> {
        let model = instance.into_active_model();
        db.run(async {
            let uow = db.db().open_scoped().await?;
            let outcome = model.delete(uow.txn()).await.map(|_| ()).map_err(Error::from);
            finalize(uow, outcome).await
        })
    }
}
