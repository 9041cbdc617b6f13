//! Core business logic - framework-agnostic booking, item, comment, user
//! and request operations.
//!
//! Every function here takes the database connection explicitly and returns
//! a typed error; nothing reaches for ambient state. The surrounding
//! transport layer (out of scope for this crate) is expected to map the
//! error kinds to status codes and handle field-level input validation.

pub mod booking;
pub mod comment;
pub mod item;
pub mod request;
pub mod user;
