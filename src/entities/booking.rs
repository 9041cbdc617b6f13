//! Booking entity - Represents a time-bounded request to borrow an item.
//!
//! A booking references one item and one booker by id and carries a status
//! that starts as `Waiting` and is decided exactly once by the item's owner
//! to either `Approved` or `Rejected`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a booking.
///
/// `Waiting` is the only state a transition can leave; `Approved` and
/// `Rejected` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum BookingStatus {
    /// Initial state, awaiting the owner's decision
    #[sea_orm(string_value = "WAITING")]
    Waiting,
    /// Owner accepted the booking
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    /// Owner declined the booking
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
}

/// Booking database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    /// Unique identifier for the booking
    #[sea_orm(primary_key)]
    pub id: i64,
    /// When the rental period begins
    pub start_date: DateTimeUtc,
    /// When the rental period ends; always after `start_date`
    pub end_date: DateTimeUtc,
    /// ID of the item being booked
    pub item_id: i64,
    /// ID of the user who placed the booking
    pub booker_id: i64,
    /// Current lifecycle status
    pub status: BookingStatus,
}

/// Defines relationships between Booking and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each booking targets one item
    #[sea_orm(
        belongs_to = "super::item::Entity",
        from = "Column::ItemId",
        to = "super::item::Column::Id"
    )]
    Item,
    /// Each booking is placed by one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::BookerId",
        to = "super::user::Column::Id"
    )]
    Booker,
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Booker.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
