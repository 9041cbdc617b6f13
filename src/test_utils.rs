//! Shared test utilities for the lending core.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{booking, item, user},
    entities,
    errors::Result,
};
use sea_orm::DatabaseConnection;
use sea_orm::prelude::DateTimeUtc;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test user with the given name and email.
pub async fn create_test_user(
    db: &DatabaseConnection,
    name: &str,
    email: &str,
) -> Result<entities::user::Model> {
    user::create_user(db, name.to_string(), email.to_string()).await
}

/// Creates an available test item with a stock description.
pub async fn create_test_item(
    db: &DatabaseConnection,
    owner_id: i64,
    name: &str,
) -> Result<entities::item::Model> {
    item::create_item(
        db,
        owner_id,
        name.to_string(),
        "Test description".to_string(),
        true, // available
        None,
    )
    .await
}

/// Creates a test item with an explicit availability flag.
pub async fn create_custom_item(
    db: &DatabaseConnection,
    owner_id: i64,
    name: &str,
    available: bool,
) -> Result<entities::item::Model> {
    item::create_item(
        db,
        owner_id,
        name.to_string(),
        "Test description".to_string(),
        available,
        None,
    )
    .await
}

/// Creates a booking through the core operation, leaving it in `Waiting`.
pub async fn create_test_booking(
    db: &DatabaseConnection,
    item_id: i64,
    booker_id: i64,
    start_date: DateTimeUtc,
    end_date: DateTimeUtc,
) -> Result<entities::booking::Model> {
    let view = booking::create_booking(db, item_id, booker_id, start_date, end_date).await?;
    Ok(view.booking)
}

/// Creates a booking and has the item's owner approve it.
pub async fn create_approved_booking(
    db: &DatabaseConnection,
    item_id: i64,
    owner_id: i64,
    booker_id: i64,
    start_date: DateTimeUtc,
    end_date: DateTimeUtc,
) -> Result<entities::booking::Model> {
    let created = create_test_booking(db, item_id, booker_id, start_date, end_date).await?;
    let decided = booking::decide_booking(db, created.id, owner_id, true).await?;
    Ok(decided.booking)
}

/// Sets up owner, booker, an item and one waiting booking a day out.
/// Returns (owner, booker, item, booking) for decision tests.
pub async fn setup_with_waiting_booking(
    db: &DatabaseConnection,
) -> Result<(
    entities::user::Model,
    entities::user::Model,
    entities::item::Model,
    entities::booking::Model,
)> {
    let owner = create_test_user(db, "Owner", "owner@example.com").await?;
    let booker = create_test_user(db, "Booker", "booker@example.com").await?;
    let item = create_test_item(db, owner.id, "Drill").await?;

    let now = chrono::Utc::now();
    let booking = create_test_booking(
        db,
        item.id,
        booker.id,
        now + chrono::Duration::days(1),
        now + chrono::Duration::days(2),
    )
    .await?;

    Ok((owner, booker, item, booking))
}

/// Sets up owner, booker and an item with one approved booking that has
/// already ended, making the booker eligible to comment.
/// Returns (owner, booker, item).
pub async fn setup_with_concluded_booking(
    db: &DatabaseConnection,
) -> Result<(
    entities::user::Model,
    entities::user::Model,
    entities::item::Model,
)> {
    let owner = create_test_user(db, "Owner", "owner@example.com").await?;
    let booker = create_test_user(db, "Booker", "booker@example.com").await?;
    let item = create_test_item(db, owner.id, "Drill").await?;

    let now = chrono::Utc::now();
    create_approved_booking(
        db,
        item.id,
        owner.id,
        booker.id,
        now - chrono::Duration::days(2),
        now - chrono::Duration::days(1),
    )
    .await?;

    Ok((owner, booker, item))
}
