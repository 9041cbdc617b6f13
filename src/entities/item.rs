//! Item entity - Represents a thing offered for lending.
//!
//! Each item belongs to exactly one owner (by id) and carries an
//! availability flag; unavailable items cannot be booked. An item may
//! optionally reference the request that prompted its listing.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Item database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "items")]
pub struct Model {
    /// Unique identifier for the item
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable name of the item (e.g., "Cordless drill")
    pub name: String,
    /// Free-form description shown in listings and search
    pub description: String,
    /// Whether the item can currently be booked
    pub available: bool,
    /// ID of the user who listed the item
    pub owner_id: i64,
    /// ID of the request this item was listed in answer to, if any
    pub request_id: Option<i64>,
}

/// Defines relationships between Item and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each item belongs to one owner
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OwnerId",
        to = "super::user::Column::Id"
    )]
    Owner,
    /// One item has many bookings
    #[sea_orm(has_many = "super::booking::Entity")]
    Bookings,
    /// One item has many comments
    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
