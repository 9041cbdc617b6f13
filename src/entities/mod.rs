//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod booking;
pub mod comment;
pub mod item;
pub mod request;
pub mod user;

// Re-export specific types to avoid conflicts
pub use booking::{
    BookingStatus, Column as BookingColumn, Entity as Booking, Model as BookingModel,
};
pub use comment::{Column as CommentColumn, Entity as Comment, Model as CommentModel};
pub use item::{Column as ItemColumn, Entity as Item, Model as ItemModel};
pub use request::{Column as RequestColumn, Entity as Request, Model as RequestModel};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
