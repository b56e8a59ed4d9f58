//! Dictionary-driven CRUD layer over `SeaORM`.
//!
//! Callers describe filters, payloads, and updates as plain JSON mappings;
//! this crate resolves field names through a registration-time
//! [`FieldMap`], compiles the declarative predicates from
//! `recordkit-filter` into `sea_orm::Condition` trees, and runs every
//! operation through one lifecycle: validate → compile → execute →
//! commit/rollback.
//!
//! # Features
//! - `pg`, `mysql`, `sqlite`: enable the corresponding `SeaORM` backend
//!   (`sqlite` is on by default)
//!
//! # Example
//! ```rust,no_run
//! use recordkit_db::{Crud, Db, FieldKind, FieldMap};
//! use serde_json::json;
//!
//! # use sea_orm::entity::prelude::*;
//! # #[derive(Debug, Clone, PartialEq, DeriveEntityModel)]
//! # #[sea_orm(table_name = "users")]
//! # pub struct Model {
//! #     #[sea_orm(primary_key)]
//! #     pub id: i64,
//! #     pub email: String,
//! # }
//! # #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
//! # pub enum Relation {}
//! # impl ActiveModelBehavior for ActiveModel {}
//! # async fn demo() -> Result<(), recordkit_db::Error> {
//! let fields = FieldMap::<Entity>::new()
//!     .insert("id", Column::Id, FieldKind::I64)
//!     .insert("email", Column::Email, FieldKind::String);
//! let crud = Crud::<Entity>::bind("User", fields, None)?;
//!
//! let db = Db::connect("sqlite://app.db?mode=rwc").await?;
//!
//! let payload = json!({"email": "ada@example.com"});
//! let user = crud
//!     .create
//!     .exec(db.open_scoped().await?, payload.as_object().unwrap())
//!     .await?;
//!
//! let filter = json!({"email": {"icontains": "ADA"}});
//! let found = crud
//!     .find
//!     .exec(db.open_scoped().await?, filter.as_object())
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod compile;
pub mod error;
pub mod fields;
pub mod handle;
pub mod handlers;
pub mod query;
pub mod schema;

pub use compile::{apply_order, coerce, compile_condition, compile_filter, compile_predicate};
pub use error::{Error, Result, Violation};
pub use fields::{Field, FieldKind, FieldMap};
pub use handle::{BlockingDb, Db, UnitOfWork};
pub use handlers::{Count, Create, Crud, Delete, Fetch, FetchParams, Find, Record, Update};
pub use query::QueryBuilder;

// Re-export the declarative layer so callers need one import.
pub use recordkit_filter::{Document, FilterOp, GroupOp, OrderBy, OrderKey, Predicate, SortDir};
