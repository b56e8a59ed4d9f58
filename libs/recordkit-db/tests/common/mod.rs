#![allow(dead_code)]

use recordkit_db::{Crud, Db, FieldKind, FieldMap};
use sea_orm::{ConnectionTrait, DbBackend, Schema};
use tempfile::TempDir;

pub mod user {
    use sea_orm::entity::prelude::*;

    #[derive(Debug, Clone, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub name: String,
        pub email: String,
        pub status: String,
        pub tier: String,
        pub age: i64,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub fn field_map() -> FieldMap<user::Entity> {
    FieldMap::<user::Entity>::new()
        .insert("id", user::Column::Id, FieldKind::I64)
        .insert("name", user::Column::Name, FieldKind::String)
        .insert("email", user::Column::Email, FieldKind::String)
        .insert("status", user::Column::Status, FieldKind::String)
        .insert("tier", user::Column::Tier, FieldKind::String)
        .insert("age", user::Column::Age, FieldKind::I64)
}

pub fn crud() -> Crud<user::Entity> {
    Crud::bind("User", field_map(), None).expect("bind without schemas cannot fail")
}

/// Tempfile-backed SQLite URL; the `TempDir` guard keeps the file alive.
pub fn sqlite_url(dir: &TempDir) -> String {
    let path = dir.path().join("recordkit_test.db");
    format!("sqlite://{}?mode=rwc", path.display())
}

pub async fn create_schema(db: &Db) {
    let backend = db.connection().get_database_backend();
    let stmt = Schema::new(DbBackend::Sqlite).create_table_from_entity(user::Entity);
    db.connection()
        .execute(backend.build(&stmt))
        .await
        .expect("create table");
}

/// Fresh database with the users table in place.
pub async fn setup() -> (TempDir, Db) {
    let dir = TempDir::new().expect("tempdir");
    let db = Db::connect(&sqlite_url(&dir)).await.expect("connect");
    create_schema(&db).await;
    (dir, db)
}

/// Payload helper: build a `Document` from a `json!` literal.
#[macro_export]
macro_rules! doc {
    ($($json:tt)+) => {
        serde_json::json!($($json)+)
            .as_object()
            .expect("document literal must be an object")
            .clone()
    };
}
