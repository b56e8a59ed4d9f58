//! Generic CRUD handlers sharing one lifecycle:
//! validate → compile → execute → commit/rollback → result.
//!
//! Each operation lives in its own module and is constructed once per
//! record type by [`Crud::bind`]. Validation and compilation are pure and
//! run before the first engine call; execution errors roll the active unit
//! of work back and re-raise the engine's error unchanged.

pub mod count;
pub mod create;
pub mod delete;
pub mod fetch;
pub mod find;
pub mod record;
pub mod update;

use std::sync::Arc;

use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel};
use serde_json::Value;

use crate::error::Result;
use crate::fields::FieldMap;
use crate::query::QueryBuilder;
use crate::schema::SchemaSet;

pub use count::Count;
pub use create::Create;
pub use delete::Delete;
pub use fetch::{Fetch, FetchParams};
pub use find::Find;
pub use record::Record;
pub use update::Update;

/// Every handler for one record type, bound together.
///
/// Binding performs the validation-schema check first; a bad schema
/// document leaves no handlers constructed.
#[derive(Debug)]
pub struct Crud<E: EntityTrait> {
    pub create: Create<E>,
    pub find: Find<E>,
    pub fetch: Fetch<E>,
    pub count: Count<E>,
    pub update: Update<E>,
    pub delete: Delete<E>,
    pub record: Record<E>,
    fields: FieldMap<E>,
}

impl<E> Crud<E>
where
    E: EntityTrait,
    E::Column: ColumnTrait + Copy,
    E::ActiveModel: ActiveModelTrait<Entity = E> + Send,
    E::Model: IntoActiveModel<E::ActiveModel> + Clone + Send + Sync,
{
    /// Bind all handlers for `record_name` over the given field registry,
    /// optionally attaching a validation-schema triple.
    ///
    /// # Errors
    /// Returns [`crate::Error::Binding`] when the schema document is
    /// malformed; in that case nothing is bound.
    pub fn bind(record_name: &str, fields: FieldMap<E>, schema_doc: Option<&Value>) -> Result<Self> {
        let schema = match schema_doc {
            Some(doc) => Some(Arc::new(SchemaSet::bind(record_name, doc)?)),
            None => None,
        };

        Ok(Self {
            create: Create::new(fields.clone(), schema.clone()),
            find: Find::new(fields.clone(), schema.clone()),
            fetch: Fetch::new(fields.clone(), schema.clone()),
            count: Count::new(fields.clone(), schema.clone()),
            update: Update::new(fields.clone(), schema.clone()),
            delete: Delete::new(fields.clone(), schema),
            record: Record::new(fields.clone()),
            fields,
        })
    }

    /// Start a query builder over this record type's registry.
    pub fn query(&self) -> QueryBuilder<E> {
        QueryBuilder::new(self.fields.clone())
    }

    #[must_use]
    pub fn fields(&self) -> &FieldMap<E> {
        &self.fields
    }
}
