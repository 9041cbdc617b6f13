//! Unified error types for the lending core.
//!
//! Every failure the core can produce is deterministic for a given store
//! state, so nothing here is retryable. The boundary maps the not-found
//! family to 404, `Validation` to 400, `Forbidden` to 403 and `EmailInUse`
//! to 409; `Database` errors are surfaced unchanged.

use thiserror::Error;

/// All error conditions produced by the core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Referenced user does not exist
    #[error("user with id={id} not found")]
    UserNotFound { id: i64 },

    /// Referenced item does not exist
    #[error("item with id={id} not found")]
    ItemNotFound { id: i64 },

    /// Referenced booking does not exist
    #[error("booking with id={id} not found")]
    BookingNotFound { id: i64 },

    /// Referenced request does not exist
    #[error("request with id={id} not found")]
    RequestNotFound { id: i64 },

    /// Structurally valid input that is semantically illegal in the
    /// current state (bad state token, deciding a decided booking,
    /// unavailable item, end before start, ineligible commenter)
    #[error("validation failed: {message}")]
    Validation { message: String },

    /// Actor lacks the booker/owner relationship the operation requires
    #[error("forbidden: {message}")]
    Forbidden { message: String },

    /// Another user already registered with this email
    #[error("email {email} is already in use")]
    EmailInUse { email: String },

    /// Underlying store failure
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
