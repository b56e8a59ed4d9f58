#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Query-builder tests: group combinators and the shared execute lifecycle.

mod common;

use common::{crud, setup};
use recordkit_db::{Error, GroupOp};

async fn seed(db: &recordkit_db::Db) {
    let handlers = crud();
    for (name, email, status, tier, age) in [
        ("ada", "ada@example.com", "active", "silver", 36),
        ("grace", "grace@example.com", "active", "gold", 45),
        ("alan", "alan@example.com", "inactive", "bronze", 41),
        ("edsger", "edsger@example.com", "inactive", "gold", 72),
    ] {
        let payload = doc!({
            "name": name,
            "email": email,
            "status": status,
            "tier": tier,
            "age": age,
        });
        handlers
            .create
            .exec(db.open_scoped().await.unwrap(), &payload)
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn or_group_matches_either_pair() {
    // Arrange
    let (_dir, db) = setup().await;
    seed(&db).await;
    let handlers = crud();

    // Act
    let rows = handlers
        .query()
        .where_group(&doc!({"name": "ada", "tier": "gold"}), GroupOp::Or)
        .unwrap()
        .run(db.open_scoped().await.unwrap())
        .await
        .unwrap();

    // Assert
    let names: Vec<&str> = rows.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["ada", "grace", "edsger"]);
}

#[tokio::test]
async fn groups_accumulate_with_and() {
    let (_dir, db) = setup().await;
    seed(&db).await;
    let handlers = crud();

    // (tier = gold OR tier = silver) AND status = active
    let rows = handlers
        .query()
        .where_group(&doc!({"tier": {"in": ["gold", "silver"]}}), GroupOp::And)
        .unwrap()
        .where_group(&doc!({"status": "active"}), GroupOp::And)
        .unwrap()
        .run(db.open_scoped().await.unwrap())
        .await
        .unwrap();

    let names: Vec<&str> = rows.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["ada", "grace"]);
}

#[tokio::test]
async fn not_all_negates_the_conjunction() {
    let (_dir, db) = setup().await;
    seed(&db).await;
    let handlers = crud();

    // NOT (status = inactive AND tier = gold) → everyone except edsger
    let rows = handlers
        .query()
        .where_group(&doc!({"status": "inactive", "tier": "gold"}), GroupOp::NotAll)
        .unwrap()
        .run(db.open_scoped().await.unwrap())
        .await
        .unwrap();

    let names: Vec<&str> = rows.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["ada", "grace", "alan"]);
}

#[tokio::test]
async fn not_any_excludes_every_pair() {
    let (_dir, db) = setup().await;
    seed(&db).await;
    let handlers = crud();

    // NOT (name = ada OR tier = gold)
    let rows = handlers
        .query()
        .where_group(&doc!({"name": "ada", "tier": "gold"}), GroupOp::NotAny)
        .unwrap()
        .run(db.open_scoped().await.unwrap())
        .await
        .unwrap();

    let names: Vec<&str> = rows.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["alan"]);
}

#[tokio::test]
async fn empty_group_is_a_no_op() {
    let (_dir, db) = setup().await;
    seed(&db).await;
    let handlers = crud();

    let rows = handlers
        .query()
        .where_group(&doc!({}), GroupOp::Or)
        .unwrap()
        .run(db.open_scoped().await.unwrap())
        .await
        .unwrap();

    assert_eq!(rows.len(), 4);
}

#[tokio::test]
async fn unsupported_combinator_tag_is_a_configuration_error() {
    let handlers = crud();
    let err = handlers
        .query()
        .where_tagged(&doc!({"name": "ada"}), "XOR")
        .unwrap_err();
    assert!(matches!(err, Error::Configuration(tag) if tag == "XOR"));
}

#[tokio::test]
async fn bad_group_fails_eagerly_before_execution() {
    let handlers = crud();
    let err = handlers
        .query()
        .where_group(&doc!({"favourite_color": "mauve"}), GroupOp::And)
        .unwrap_err();
    assert!(matches!(err, Error::UnknownField(_)));
}
