//! Comment entity - Feedback left on an item after a concluded rental.
//!
//! Comments are append-only: once created they are never edited or removed.
//! Only users with a concluded booking of the item may write one.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Comment database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "comments")]
pub struct Model {
    /// Unique identifier for the comment
    #[sea_orm(primary_key)]
    pub id: i64,
    /// The comment body
    pub text: String,
    /// ID of the item the comment is attached to
    pub item_id: i64,
    /// ID of the user who wrote the comment
    pub author_id: i64,
    /// When the comment was created
    pub created: DateTimeUtc,
}

/// Defines relationships between Comment and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each comment is attached to one item
    #[sea_orm(
        belongs_to = "super::item::Entity",
        from = "Column::ItemId",
        to = "super::item::Column::Id"
    )]
    Item,
    /// Each comment is written by one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id"
    )]
    Author,
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
