//! User entity - Represents a registered account.
//!
//! Users are referenced by id from items (as owner), bookings (as booker),
//! comments (as author) and requests (as requestor); none of those entities
//! own the user. Email is globally unique.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name shown alongside comments and bookings
    pub name: String,
    /// Contact email, unique across all users
    #[sea_orm(unique)]
    pub email: String,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user owns many items
    #[sea_orm(has_many = "super::item::Entity")]
    Items,
    /// One user places many bookings
    #[sea_orm(has_many = "super::booking::Entity")]
    Bookings,
    /// One user writes many comments
    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
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
