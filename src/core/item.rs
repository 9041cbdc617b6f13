//! Item business logic - Listings, owner views and the last/next booking
//! aggregation.
//!
//! The last/next booking timestamps are derived values: the most recently
//! concluded and the soonest upcoming approved booking of an item, relative
//! to the evaluation instant. They are attached only when the requester owns
//! the item; a non-owner viewing the same item never receives them.

use crate::{
    core::comment::CommentView,
    core::user::get_user_by_id,
    entities::{Booking, BookingStatus, Comment, Item, User, booking, comment, item, user},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{Condition, QueryOrder, Set, prelude::*};
use serde::Serialize;
use std::collections::HashMap;

/// An item enriched with its comments and, for the owner only, the
/// last/next booking timestamps.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ItemView {
    /// The item row itself
    pub item: item::Model,
    /// End of the most recently concluded approved booking, owner-only
    pub last_booking: Option<DateTimeUtc>,
    /// Start of the soonest upcoming approved booking, owner-only
    pub next_booking: Option<DateTimeUtc>,
    /// Comments on the item, newest first
    pub comments: Vec<CommentView>,
}

/// Per-item last/next booking timestamps, computed in a single pass.
///
/// `bookings` must already be restricted to approved bookings. "Last" is
/// the greatest end strictly before `now`, "next" the smallest start
/// strictly after `now`; ties on the timestamp are broken by booking id so
/// repeated calls pick the same row.
fn aggregate_last_next(
    bookings: &[booking::Model],
    now: DateTimeUtc,
) -> HashMap<i64, (Option<DateTimeUtc>, Option<DateTimeUtc>)> {
    let mut last: HashMap<i64, (DateTimeUtc, i64)> = HashMap::new();
    let mut next: HashMap<i64, (DateTimeUtc, i64)> = HashMap::new();

    for b in bookings {
        if b.end_date < now {
            let candidate = (b.end_date, b.id);
            let entry = last.entry(b.item_id).or_insert(candidate);
            if candidate > *entry {
                *entry = candidate;
            }
        }
        if b.start_date > now {
            let candidate = (b.start_date, b.id);
            let entry = next.entry(b.item_id).or_insert(candidate);
            if candidate < *entry {
                *entry = candidate;
            }
        }
    }

    let mut result = HashMap::new();
    for b in bookings {
        result.entry(b.item_id).or_insert((
            last.get(&b.item_id).map(|(end, _)| *end),
            next.get(&b.item_id).map(|(start, _)| *start),
        ));
    }
    result
}

/// Lists a new item for lending. The owner must exist.
pub async fn create_item(
    db: &DatabaseConnection,
    owner_id: i64,
    name: String,
    description: String,
    available: bool,
    request_id: Option<i64>,
) -> Result<item::Model> {
    get_user_by_id(db, owner_id).await?;

    if name.trim().is_empty() {
        return Err(Error::Validation {
            message: "item name cannot be empty".to_string(),
        });
    }

    let item = item::ActiveModel {
        name: Set(name.trim().to_string()),
        description: Set(description),
        available: Set(available),
        owner_id: Set(owner_id),
        request_id: Set(request_id),
        ..Default::default()
    };

    let result = item.insert(db).await?;
    Ok(result)
}

/// Applies a partial update to an item: `None` fields are left untouched.
/// Only the owner may edit.
pub async fn update_item(
    db: &DatabaseConnection,
    item_id: i64,
    user_id: i64,
    name: Option<String>,
    description: Option<String>,
    available: Option<bool>,
) -> Result<item::Model> {
    get_user_by_id(db, user_id).await?;
    let existing = check_and_get_item(db, item_id).await?;

    if existing.owner_id != user_id {
        return Err(Error::Forbidden {
            message: format!("only the owner can update item id={item_id}"),
        });
    }

    let mut active: item::ActiveModel = existing.into();
    if let Some(new_name) = name {
        active.name = Set(new_name);
    }
    if let Some(new_description) = description {
        active.description = Set(new_description);
    }
    if let Some(new_available) = available {
        active.available = Set(new_available);
    }

    let result = active.update(db).await?;
    Ok(result)
}

/// Fetches one item with its comments; last/next booking data is attached
/// only when `user_id` is the item's owner.
pub async fn get_item_by_id(
    db: &DatabaseConnection,
    item_id: i64,
    user_id: i64,
) -> Result<ItemView> {
    let user = get_user_by_id(db, user_id).await?;
    let item = check_and_get_item(db, item_id).await?;

    let (mut last_booking, mut next_booking) = (None, None);
    if user.id == item.owner_id {
        let approved = Booking::find()
            .filter(booking::Column::ItemId.eq(item.id))
            .filter(booking::Column::Status.eq(BookingStatus::Approved))
            .all(db)
            .await?;
        if let Some((last, next)) = aggregate_last_next(&approved, Utc::now()).remove(&item.id) {
            last_booking = last;
            next_booking = next;
        }
    }

    let comments = comments_for_items(db, vec![item.id])
        .await?
        .remove(&item.id)
        .unwrap_or_default();

    Ok(ItemView {
        item,
        last_booking,
        next_booking,
        comments,
    })
}

/// Lists all of an owner's items, each with last/next booking timestamps
/// and its comments.
///
/// Everything is fetched in batched queries: one for the items, one for the
/// approved bookings across them, one for the comments and one for the
/// comment authors. The aggregation itself groups by item id in one pass.
pub async fn get_items_by_owner(db: &DatabaseConnection, owner_id: i64) -> Result<Vec<ItemView>> {
    get_user_by_id(db, owner_id).await?;

    let items = Item::find()
        .filter(item::Column::OwnerId.eq(owner_id))
        .order_by_asc(item::Column::Id)
        .all(db)
        .await?;
    let item_ids: Vec<i64> = items.iter().map(|i| i.id).collect();

    let approved = Booking::find()
        .filter(booking::Column::ItemId.is_in(item_ids.clone()))
        .filter(booking::Column::Status.eq(BookingStatus::Approved))
        .all(db)
        .await?;
    let mut last_next = aggregate_last_next(&approved, Utc::now());

    let mut comments = comments_for_items(db, item_ids).await?;

    Ok(items
        .into_iter()
        .map(|item| {
            let (last_booking, next_booking) =
                last_next.remove(&item.id).unwrap_or((None, None));
            let comments = comments.remove(&item.id).unwrap_or_default();
            ItemView {
                item,
                last_booking,
                next_booking,
                comments,
            }
        })
        .collect())
}

/// Searches available items whose name or description contains `text`,
/// case-insensitively. An empty query matches nothing.
pub async fn search_items(db: &DatabaseConnection, text: &str) -> Result<Vec<item::Model>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    Item::find()
        .filter(item::Column::Available.eq(true))
        .filter(
            Condition::any()
                .add(item::Column::Name.contains(text))
                .add(item::Column::Description.contains(text)),
        )
        .order_by_asc(item::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

pub(crate) async fn check_and_get_item(
    db: &DatabaseConnection,
    item_id: i64,
) -> Result<item::Model> {
    Item::find_by_id(item_id)
        .one(db)
        .await?
        .ok_or(Error::ItemNotFound { id: item_id })
}

/// Batch-fetches the comments for a set of items, newest first, with author
/// names resolved through one user query. Authors that no longer exist are
/// rendered as "Unknown User".
async fn comments_for_items(
    db: &DatabaseConnection,
    item_ids: Vec<i64>,
) -> Result<HashMap<i64, Vec<CommentView>>> {
    let comments = Comment::find()
        .filter(comment::Column::ItemId.is_in(item_ids))
        .order_by_desc(comment::Column::Created)
        .order_by_desc(comment::Column::Id)
        .all(db)
        .await?;

    let author_ids: Vec<i64> = comments.iter().map(|c| c.author_id).collect();
    let author_names: HashMap<i64, String> = User::find()
        .filter(user::Column::Id.is_in(author_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, u.name))
        .collect();

    let mut grouped: HashMap<i64, Vec<CommentView>> = HashMap::new();
    for comment in comments {
        let author_name = author_names
            .get(&comment.author_id)
            .cloned()
            .unwrap_or_else(|| "Unknown User".to_string());
        grouped
            .entry(comment.item_id)
            .or_default()
            .push(CommentView {
                comment,
                author_name,
            });
    }
    Ok(grouped)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use chrono::Duration;

    fn approved(id: i64, item_id: i64, start: DateTimeUtc, end: DateTimeUtc) -> booking::Model {
        booking::Model {
            id,
            start_date: start,
            end_date: end,
            item_id,
            booker_id: 1,
            status: BookingStatus::Approved,
        }
    }

    #[test]
    fn test_aggregate_last_next_single_item() {
        let now = Utc::now();
        let bookings = vec![
            approved(1, 7, now - Duration::hours(5), now - Duration::hours(3)),
            approved(2, 7, now - Duration::hours(2), now - Duration::hours(1)),
            approved(3, 7, now + Duration::hours(2), now + Duration::hours(4)),
            approved(4, 7, now + Duration::hours(1), now + Duration::hours(3)),
        ];

        let result = aggregate_last_next(&bookings, now);
        let (last, next) = result[&7];
        assert_eq!(last, Some(now - Duration::hours(1)));
        assert_eq!(next, Some(now + Duration::hours(1)));
    }

    #[test]
    fn test_aggregate_last_next_groups_by_item() {
        let now = Utc::now();
        let bookings = vec![
            approved(1, 1, now - Duration::hours(3), now - Duration::hours(1)),
            approved(2, 2, now + Duration::hours(1), now + Duration::hours(2)),
        ];

        let result = aggregate_last_next(&bookings, now);
        assert_eq!(result[&1], (Some(now - Duration::hours(1)), None));
        assert_eq!(result[&2], (None, Some(now + Duration::hours(1))));
    }

    #[test]
    fn test_aggregate_current_booking_is_neither_last_nor_next() {
        let now = Utc::now();
        let bookings = vec![approved(
            1,
            1,
            now - Duration::hours(1),
            now + Duration::hours(1),
        )];

        let result = aggregate_last_next(&bookings, now);
        assert_eq!(result[&1], (None, None));
    }

    #[test]
    fn test_aggregate_tie_break_is_deterministic() {
        let now = Utc::now();
        let end = now - Duration::hours(1);
        let first = vec![
            approved(1, 1, now - Duration::hours(3), end),
            approved(2, 1, now - Duration::hours(2), end),
        ];
        let mut reversed = first.clone();
        reversed.reverse();

        // Same winner regardless of input order
        assert_eq!(
            aggregate_last_next(&first, now)[&1],
            aggregate_last_next(&reversed, now)[&1]
        );
    }

    #[tokio::test]
    async fn test_create_item_requires_owner() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_item(
            &db,
            999,
            "Drill".to_string(),
            "A drill".to_string(),
            true,
            None,
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::UserNotFound { id: 999 }));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_item_owner_only() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = create_test_user(&db, "Owner", "owner@example.com").await?;
        let other = create_test_user(&db, "Other", "other@example.com").await?;
        let item = create_test_item(&db, owner.id, "Drill").await?;

        let result = update_item(&db, item.id, other.id, Some("Stolen".to_string()), None, None).await;
        assert!(matches!(result.unwrap_err(), Error::Forbidden { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_item_partial_merge() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = create_test_user(&db, "Owner", "owner@example.com").await?;
        let item = create_test_item(&db, owner.id, "Drill").await?;

        let updated = update_item(&db, item.id, owner.id, None, None, Some(false)).await?;
        assert_eq!(updated.name, item.name);
        assert_eq!(updated.description, item.description);
        assert!(!updated.available);

        let updated = update_item(
            &db,
            item.id,
            owner.id,
            Some("Hammer drill".to_string()),
            None,
            None,
        )
        .await?;
        assert_eq!(updated.name, "Hammer drill");
        assert!(!updated.available);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_items_by_owner_last_and_next() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = create_test_user(&db, "Owner", "owner@example.com").await?;
        let booker = create_test_user(&db, "Booker", "booker@example.com").await?;
        let item = create_test_item(&db, owner.id, "Drill").await?;

        let now = Utc::now();

        // Two concluded approved bookings, ending three hours and one hour ago
        create_approved_booking(
            &db,
            item.id,
            owner.id,
            booker.id,
            now - Duration::hours(5),
            now - Duration::hours(3),
        )
        .await?;
        create_approved_booking(
            &db,
            item.id,
            owner.id,
            booker.id,
            now - Duration::hours(2),
            now - Duration::hours(1),
        )
        .await?;

        let views = get_items_by_owner(&db, owner.id).await?;
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].last_booking, Some(now - Duration::hours(1)));
        assert_eq!(views[0].next_booking, None);

        Ok(())
    }

    #[tokio::test]
    async fn test_aggregation_ignores_undecided_and_rejected_bookings() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = create_test_user(&db, "Owner", "owner@example.com").await?;
        let booker = create_test_user(&db, "Booker", "booker@example.com").await?;
        let item = create_test_item(&db, owner.id, "Drill").await?;

        let now = Utc::now();

        // A waiting booking and a rejected one, both upcoming
        create_test_booking(
            &db,
            item.id,
            booker.id,
            now + Duration::days(1),
            now + Duration::days(2),
        )
        .await?;
        let rejected = create_test_booking(
            &db,
            item.id,
            booker.id,
            now + Duration::days(3),
            now + Duration::days(4),
        )
        .await?;
        crate::core::booking::decide_booking(&db, rejected.id, owner.id, false).await?;

        let views = get_items_by_owner(&db, owner.id).await?;
        assert_eq!(views[0].last_booking, None);
        assert_eq!(views[0].next_booking, None);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_item_by_id_hides_bookings_from_non_owner() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = create_test_user(&db, "Owner", "owner@example.com").await?;
        let booker = create_test_user(&db, "Booker", "booker@example.com").await?;
        let item = create_test_item(&db, owner.id, "Drill").await?;

        let now = Utc::now();
        create_approved_booking(
            &db,
            item.id,
            owner.id,
            booker.id,
            now - Duration::hours(2),
            now - Duration::hours(1),
        )
        .await?;

        let for_owner = get_item_by_id(&db, item.id, owner.id).await?;
        assert_eq!(for_owner.last_booking, Some(now - Duration::hours(1)));

        // The booker of that very booking still sees nothing
        let for_booker = get_item_by_id(&db, item.id, booker.id).await?;
        assert_eq!(for_booker.last_booking, None);
        assert_eq!(for_booker.next_booking, None);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_item_by_id_includes_comments() -> Result<()> {
        let db = setup_test_db().await?;
        let (owner, booker, item) = setup_with_concluded_booking(&db).await?;

        crate::core::comment::add_comment(&db, item.id, booker.id, "Great drill".to_string())
            .await?;

        let view = get_item_by_id(&db, item.id, booker.id).await?;
        assert_eq!(view.comments.len(), 1);
        assert_eq!(view.comments[0].comment.text, "Great drill");
        assert_eq!(view.comments[0].author_name, booker.name);

        let owner_view = get_item_by_id(&db, item.id, owner.id).await?;
        assert_eq!(owner_view.comments.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_search_items() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = create_test_user(&db, "Owner", "owner@example.com").await?;

        create_item(
            &db,
            owner.id,
            "Cordless drill".to_string(),
            "Battery powered".to_string(),
            true,
            None,
        )
        .await?;
        create_item(
            &db,
            owner.id,
            "Hand saw".to_string(),
            "For drilling you want the other one".to_string(),
            true,
            None,
        )
        .await?;
        create_item(
            &db,
            owner.id,
            "Broken drill".to_string(),
            "Do not lend".to_string(),
            false,
            None,
        )
        .await?;

        // Empty query matches nothing
        assert!(search_items(&db, "").await?.is_empty());
        assert!(search_items(&db, "   ").await?.is_empty());

        // Case-insensitive match on name or description, available only
        let found = search_items(&db, "DRILL").await?;
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|i| i.available));

        Ok(())
    }
}
