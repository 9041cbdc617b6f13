//! Request entity - A user's ask for an item nobody has listed yet.
//!
//! Items may reference the request that prompted them via `request_id`,
//! which is how "items answering this request" listings are built.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Request database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "requests")]
pub struct Model {
    /// Unique identifier for the request
    #[sea_orm(primary_key)]
    pub id: i64,
    /// What the requestor is looking for
    pub description: String,
    /// ID of the user who posted the request
    pub requestor_id: i64,
    /// When the request was posted
    pub created: DateTimeUtc,
}

/// Defines relationships between Request and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each request is posted by one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::RequestorId",
        to = "super::user::Column::Id"
    )]
    Requestor,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Requestor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
