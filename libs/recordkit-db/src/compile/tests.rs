#![allow(clippy::unwrap_used)]

use sea_orm::entity::prelude::*;
use sea_orm::{DbBackend, QueryTrait};
use serde_json::json;

use recordkit_filter::OrderBy;

use super::{apply_order, coerce, compile_condition, compile_filter};
use crate::error::Error;
use crate::fields::{FieldKind, FieldMap};

// Fixture entity for compilation tests
#[derive(Debug, Clone, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "compile_tests")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub age: i64,
    pub email: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn field_map() -> FieldMap<Entity> {
    FieldMap::<Entity>::new()
        .insert("id", Column::Id, FieldKind::I64)
        .insert("name", Column::Name, FieldKind::String)
        .insert("age", Column::Age, FieldKind::I64)
        .insert("email", Column::Email, FieldKind::String)
}

fn sql_for(cond: sea_orm::Condition) -> String {
    Entity::find().filter(cond).build(DbBackend::Sqlite).to_string()
}

#[test]
fn literal_compiles_to_equality() {
    // Arrange
    let fmap = field_map();

    // Act
    let literal = compile_condition(&fmap, "name", &json!("ada")).unwrap();
    let explicit = compile_condition(&fmap, "name", &json!({"exact": "ada"})).unwrap();

    // Assert
    assert_eq!(sql_for(literal), sql_for(explicit));
}

#[test]
fn multi_operator_map_conjoins_with_and() {
    // Arrange
    let fmap = field_map();

    // Act
    let cond = compile_condition(&fmap, "age", &json!({"gte": 18, "lte": 65})).unwrap();

    // Assert
    let sql = sql_for(cond);
    assert!(sql.contains(">="), "missing lower bound in: {sql}");
    assert!(sql.contains("<="), "missing upper bound in: {sql}");
    assert!(sql.contains("AND"), "bounds not conjoined in: {sql}");
}

#[test]
fn unknown_field_fails_before_parsing() {
    let fmap = field_map();
    let err = compile_condition(&fmap, "nickname", &json!("x")).unwrap_err();
    assert!(matches!(err, Error::UnknownField(f) if f == "nickname"));
}

#[test]
fn unknown_operator_is_rejected() {
    let fmap = field_map();
    let err = compile_condition(&fmap, "age", &json!({"regex": ".*"})).unwrap_err();
    assert!(matches!(err, Error::UnsupportedOperator(op) if op == "regex"));
}

#[test]
fn equality_against_null_is_a_null_test() {
    let fmap = field_map();
    let cond = compile_condition(&fmap, "email", &json!(null)).unwrap();
    assert!(sql_for(cond).contains("IS NULL"));

    let fmap = field_map();
    let cond = compile_condition(&fmap, "email", &json!({"ne": null})).unwrap();
    assert!(sql_for(cond).contains("IS NOT NULL"));
}

#[test]
fn contains_escapes_like_metacharacters() {
    // Arrange
    let fmap = field_map();

    // Act
    let cond = compile_condition(&fmap, "name", &json!({"contains": "50%_off"})).unwrap();

    // Assert
    let sql = sql_for(cond);
    assert!(sql.contains(r"%50\%\_off%"), "metacharacters not escaped in: {sql}");
}

#[test]
fn icontains_lowers_both_sides() {
    let fmap = field_map();
    let cond = compile_condition(&fmap, "name", &json!({"icontains": "Ada"})).unwrap();
    let sql = sql_for(cond);
    assert!(sql.contains("LOWER"), "column not lowered in: {sql}");
    assert!(sql.contains("%ada%"), "pattern not lowered in: {sql}");
}

#[test]
fn between_requires_a_pair() {
    let fmap = field_map();
    let err = compile_condition(&fmap, "age", &json!({"between": [1, 2, 3]})).unwrap_err();
    assert!(matches!(err, Error::InvalidOperand { .. }));

    let fmap = field_map();
    let cond = compile_condition(&fmap, "age", &json!({"between": [18, 65]})).unwrap();
    assert!(sql_for(cond).contains("BETWEEN"));
}

#[test]
fn empty_in_list_matches_nothing() {
    let fmap = field_map();
    let cond = compile_condition(&fmap, "age", &json!({"in": []})).unwrap();
    assert!(sql_for(cond).contains("1=0"));
}

#[test]
fn operand_kind_mismatch_is_rejected() {
    let fmap = field_map();
    let err = compile_condition(&fmap, "age", &json!({"gt": "young"})).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { .. }));
}

#[test]
fn empty_filter_compiles_to_no_restriction() {
    // Arrange
    let fmap = field_map();
    let doc = serde_json::Map::new();

    // Act
    let cond = compile_filter(&fmap, &doc).unwrap();

    // Assert
    let sql = sql_for(cond);
    assert!(!sql.contains("WHERE"), "empty filter produced a WHERE clause: {sql}");
}

#[test]
fn coerce_parses_typed_strings() {
    let uuid = coerce(
        FieldKind::Uuid,
        &json!("550e8400-e29b-41d4-a716-446655440000"),
    );
    assert!(uuid.is_ok());

    let dt = coerce(FieldKind::DateTimeUtc, &json!("2024-06-01T12:00:00Z"));
    assert!(dt.is_ok());

    let bad = coerce(FieldKind::Uuid, &json!("not-a-uuid"));
    assert!(matches!(bad.unwrap_err(), Error::TypeMismatch { .. }));
}

#[test]
fn unknown_order_fields_are_skipped() {
    // Arrange
    let fmap = field_map();
    let order = OrderBy::parse(&["-age", "shoe_size"]);

    // Act
    let sql = apply_order(Entity::find(), &fmap, &order)
        .build(DbBackend::Sqlite)
        .to_string();

    // Assert
    assert!(sql.contains("ORDER BY"));
    assert!(sql.contains("DESC"));
    assert!(!sql.contains("shoe_size"));
}

#[test]
fn absent_order_defaults_to_ascending_primary_key() {
    let fmap = field_map();
    let sql = apply_order(Entity::find(), &fmap, &OrderBy::empty())
        .build(DbBackend::Sqlite)
        .to_string();
    assert!(sql.contains("ORDER BY"), "no default order in: {sql}");
    assert!(sql.contains("id"), "default order not on primary key: {sql}");
}
