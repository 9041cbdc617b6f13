//! Comment business logic - Appending feedback after a concluded rental.
//!
//! Eligibility binds to the author: a user may comment on an item only if
//! one of their own approved bookings of that item has already ended.
//! Other users' past bookings never qualify. Comments are immutable once
//! created.

use crate::{
    core::{item::check_and_get_item, user::get_user_by_id},
    entities::{Booking, BookingStatus, booking, comment},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{Set, prelude::*};
use serde::Serialize;

/// A comment together with its author's display name.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CommentView {
    /// The comment row itself
    pub comment: comment::Model,
    /// Display name of the comment's author
    pub author_name: String,
}

/// Appends a comment to an item on behalf of an eligible author.
pub async fn add_comment(
    db: &DatabaseConnection,
    item_id: i64,
    author_id: i64,
    text: String,
) -> Result<CommentView> {
    let author = get_user_by_id(db, author_id).await?;
    check_and_get_item(db, item_id).await?;

    if text.trim().is_empty() {
        return Err(Error::Validation {
            message: "comment text cannot be empty".to_string(),
        });
    }

    let now = Utc::now();
    let concluded = Booking::find()
        .filter(booking::Column::ItemId.eq(item_id))
        .filter(booking::Column::BookerId.eq(author_id))
        .filter(booking::Column::Status.eq(BookingStatus::Approved))
        .filter(booking::Column::EndDate.lt(now))
        .one(db)
        .await?;

    if concluded.is_none() {
        return Err(Error::Validation {
            message: "cannot comment without a concluded booking of this item".to_string(),
        });
    }

    let comment = comment::ActiveModel {
        text: Set(text),
        item_id: Set(item_id),
        author_id: Set(author_id),
        created: Set(now),
        ..Default::default()
    };

    let result = comment.insert(db).await?;
    Ok(CommentView {
        comment: result,
        author_name: author.name,
    })
}
