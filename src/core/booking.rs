//! Booking business logic - The booking lifecycle and its list queries.
//!
//! A booking starts in `Waiting` and is decided exactly once by the item's
//! owner, to `Approved` or `Rejected`; there is no path out of a decided
//! status. Overlapping bookings of the same item are deliberately allowed:
//! the core never serializes bookings against each other.
//!
//! List queries accept a [`SearchState`] token and evaluate it in one of two
//! scopes: bookings placed by the caller, or bookings on items the caller
//! owns. The temporal states (`Current`/`Past`/`Future`) are derived from
//! approved bookings and the evaluation instant, never persisted.

use crate::{
    core::item::check_and_get_item,
    core::user::get_user_by_id,
    entities::{Booking, BookingStatus, Item, User, booking, item, user},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Serialize;
use std::collections::HashMap;
use std::str::FromStr;

/// A booking together with the item and booker it references.
///
/// The entity rows hold plain ids; list and lookup operations hydrate them
/// with batched fetches so callers never traverse relations lazily.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BookingView {
    /// The booking row itself
    pub booking: booking::Model,
    /// The item being booked
    pub item: item::Model,
    /// The user who placed the booking
    pub booker: user::Model,
}

/// State filter accepted by the booking list queries.
///
/// `Waiting`/`Approved`/`Rejected` match the persisted status exactly;
/// `Current`/`Past`/`Future` classify approved bookings against the
/// evaluation instant; `All` matches everything.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchState {
    /// No filter
    All,
    /// Approved and in progress right now
    Current,
    /// Approved and already concluded
    Past,
    /// Approved and not yet started
    Future,
    /// Status is `Waiting`
    Waiting,
    /// Status is `Approved`
    Approved,
    /// Status is `Rejected`
    Rejected,
}

impl FromStr for SearchState {
    type Err = Error;

    /// Parses a state token case-insensitively; unknown tokens fail with a
    /// validation error rather than silently defaulting.
    fn from_str(token: &str) -> Result<Self> {
        match token.to_ascii_uppercase().as_str() {
            "ALL" => Ok(Self::All),
            "CURRENT" => Ok(Self::Current),
            "PAST" => Ok(Self::Past),
            "FUTURE" => Ok(Self::Future),
            "WAITING" => Ok(Self::Waiting),
            "APPROVED" => Ok(Self::Approved),
            "REJECTED" => Ok(Self::Rejected),
            _ => Err(Error::Validation {
                message: format!("invalid state={token}"),
            }),
        }
    }
}

impl SearchState {
    /// Whether `booking` belongs to this state at instant `now`.
    pub fn admits(self, booking: &booking::Model, now: DateTimeUtc) -> bool {
        match self {
            Self::All => true,
            Self::Current => {
                booking.status == BookingStatus::Approved
                    && booking.start_date <= now
                    && now <= booking.end_date
            }
            Self::Past => booking.status == BookingStatus::Approved && booking.end_date < now,
            Self::Future => booking.status == BookingStatus::Approved && booking.start_date > now,
            Self::Waiting => booking.status == BookingStatus::Waiting,
            Self::Approved => booking.status == BookingStatus::Approved,
            Self::Rejected => booking.status == BookingStatus::Rejected,
        }
    }
}

/// Places a new booking of an item, starting the lifecycle in `Waiting`.
///
/// The availability flag is checked only here: flipping an item to
/// unavailable later does not invalidate bookings that already exist.
pub async fn create_booking(
    db: &DatabaseConnection,
    item_id: i64,
    booker_id: i64,
    start_date: DateTimeUtc,
    end_date: DateTimeUtc,
) -> Result<BookingView> {
    let booker = get_user_by_id(db, booker_id).await?;
    let item = check_and_get_item(db, item_id).await?;

    if !item.available {
        return Err(Error::Validation {
            message: format!("item with id={item_id} is not available"),
        });
    }

    if end_date <= start_date {
        return Err(Error::Validation {
            message: "end date must be after start date".to_string(),
        });
    }

    let booking = booking::ActiveModel {
        start_date: Set(start_date),
        end_date: Set(end_date),
        item_id: Set(item_id),
        booker_id: Set(booker_id),
        status: Set(BookingStatus::Waiting),
        ..Default::default()
    };

    let result = booking.insert(db).await?;
    Ok(BookingView {
        booking: result,
        item,
        booker,
    })
}

/// Approves or rejects a waiting booking.
///
/// Only the owner of the booked item may decide, and only while the booking
/// is still `Waiting`; deciding an already decided booking fails with a
/// validation error regardless of the actor.
pub async fn decide_booking(
    db: &DatabaseConnection,
    booking_id: i64,
    acting_user_id: i64,
    approve: bool,
) -> Result<BookingView> {
    let actor = get_user_by_id(db, acting_user_id).await?;
    let booking = check_and_get_booking(db, booking_id).await?;
    let item = check_and_get_item(db, booking.item_id).await?;

    if item.owner_id != actor.id {
        return Err(Error::Forbidden {
            message: format!("only the item owner can decide booking id={booking_id}"),
        });
    }

    if booking.status != BookingStatus::Waiting {
        return Err(Error::Validation {
            message: format!("booking id={booking_id} has already been decided"),
        });
    }

    let booker = get_user_by_id(db, booking.booker_id).await?;

    let mut active: booking::ActiveModel = booking.into();
    active.status = Set(if approve {
        BookingStatus::Approved
    } else {
        BookingStatus::Rejected
    });
    let result = active.update(db).await?;

    Ok(BookingView {
        booking: result,
        item,
        booker,
    })
}

/// Fetches a single booking, visible only to its booker or the item owner.
pub async fn get_booking_by_id(
    db: &DatabaseConnection,
    booking_id: i64,
    acting_user_id: i64,
) -> Result<BookingView> {
    let actor = get_user_by_id(db, acting_user_id).await?;
    let booking = check_and_get_booking(db, booking_id).await?;
    let item = check_and_get_item(db, booking.item_id).await?;

    if actor.id != booking.booker_id && actor.id != item.owner_id {
        return Err(Error::Forbidden {
            message: format!("only the booker or item owner can view booking id={booking_id}"),
        });
    }

    let booker = get_user_by_id(db, booking.booker_id).await?;

    Ok(BookingView {
        booking,
        item,
        booker,
    })
}

/// Lists the caller's own bookings matching `state`, most recent start first.
pub async fn bookings_for_booker(
    db: &DatabaseConnection,
    user_id: i64,
    state: SearchState,
) -> Result<Vec<BookingView>> {
    let booker = get_user_by_id(db, user_id).await?;

    let bookings = Booking::find()
        .filter(booking::Column::BookerId.eq(user_id))
        .order_by_desc(booking::Column::StartDate)
        .order_by_desc(booking::Column::Id)
        .all(db)
        .await?;

    let now = Utc::now();
    let bookings: Vec<booking::Model> =
        bookings.into_iter().filter(|b| state.admits(b, now)).collect();

    let items = fetch_items_by_id(db, bookings.iter().map(|b| b.item_id)).await?;

    bookings
        .into_iter()
        .map(|b| {
            let item = items
                .get(&b.item_id)
                .cloned()
                .ok_or(Error::ItemNotFound { id: b.item_id })?;
            Ok(BookingView {
                booking: b,
                item,
                booker: booker.clone(),
            })
        })
        .collect()
}

/// Lists bookings on the caller's items matching `state`, most recent start
/// first. The caller's item ids are batch-fetched once; a caller with no
/// items gets an empty list for every state.
pub async fn bookings_for_owner(
    db: &DatabaseConnection,
    user_id: i64,
    state: SearchState,
) -> Result<Vec<BookingView>> {
    get_user_by_id(db, user_id).await?;

    let items: HashMap<i64, item::Model> = Item::find()
        .filter(item::Column::OwnerId.eq(user_id))
        .all(db)
        .await?
        .into_iter()
        .map(|i| (i.id, i))
        .collect();

    let bookings = Booking::find()
        .filter(booking::Column::ItemId.is_in(items.keys().copied().collect::<Vec<_>>()))
        .order_by_desc(booking::Column::StartDate)
        .order_by_desc(booking::Column::Id)
        .all(db)
        .await?;

    let now = Utc::now();
    let bookings: Vec<booking::Model> =
        bookings.into_iter().filter(|b| state.admits(b, now)).collect();

    let bookers = fetch_users_by_id(db, bookings.iter().map(|b| b.booker_id)).await?;

    bookings
        .into_iter()
        .map(|b| {
            let item = items
                .get(&b.item_id)
                .cloned()
                .ok_or(Error::ItemNotFound { id: b.item_id })?;
            let booker = bookers
                .get(&b.booker_id)
                .cloned()
                .ok_or(Error::UserNotFound { id: b.booker_id })?;
            Ok(BookingView {
                booking: b,
                item,
                booker,
            })
        })
        .collect()
}

async fn check_and_get_booking(db: &DatabaseConnection, booking_id: i64) -> Result<booking::Model> {
    Booking::find_by_id(booking_id)
        .one(db)
        .await?
        .ok_or(Error::BookingNotFound { id: booking_id })
}

/// Batch-fetches items by id into a lookup map.
async fn fetch_items_by_id(
    db: &DatabaseConnection,
    ids: impl Iterator<Item = i64>,
) -> Result<HashMap<i64, item::Model>> {
    let ids: Vec<i64> = ids.collect();
    Ok(Item::find()
        .filter(item::Column::Id.is_in(ids))
        .all(db)
        .await?
        .into_iter()
        .map(|i| (i.id, i))
        .collect())
}

/// Batch-fetches users by id into a lookup map.
async fn fetch_users_by_id(
    db: &DatabaseConnection,
    ids: impl Iterator<Item = i64>,
) -> Result<HashMap<i64, user::Model>> {
    let ids: Vec<i64> = ids.collect();
    Ok(User::find()
        .filter(user::Column::Id.is_in(ids))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect())
}
