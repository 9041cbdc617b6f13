//! User business logic - Handles registration, lookup and profile updates.
//!
//! Email uniqueness is a global invariant: it is checked before every create
//! and before any update that changes the email. All functions are async and
//! return Result types for error handling.

use crate::{
    entities::{User, user},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};

/// Finds a user by id, failing with `UserNotFound` if missing.
///
/// Every core operation that takes an actor id resolves it through this
/// function before doing anything else.
pub async fn get_user_by_id(db: &DatabaseConnection, user_id: i64) -> Result<user::Model> {
    User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(Error::UserNotFound { id: user_id })
}

/// Registers a new user after checking that the email is not taken.
pub async fn create_user(db: &DatabaseConnection, name: String, email: String) -> Result<user::Model> {
    if name.trim().is_empty() {
        return Err(Error::Validation {
            message: "user name cannot be empty".to_string(),
        });
    }

    if email.trim().is_empty() {
        return Err(Error::Validation {
            message: "user email cannot be empty".to_string(),
        });
    }

    check_email_free(db, email.trim(), None).await?;

    let user = user::ActiveModel {
        name: Set(name.trim().to_string()),
        email: Set(email.trim().to_string()),
        ..Default::default()
    };

    let result = user.insert(db).await?;
    Ok(result)
}

/// Applies a partial update to a user: `None` fields are left untouched.
///
/// Changing the email re-checks uniqueness, excluding the user's own row so
/// that re-submitting the current email is not a conflict.
pub async fn update_user(
    db: &DatabaseConnection,
    user_id: i64,
    name: Option<String>,
    email: Option<String>,
) -> Result<user::Model> {
    let existing = get_user_by_id(db, user_id).await?;

    if let Some(new_email) = &email {
        check_email_free(db, new_email.trim(), Some(user_id)).await?;
    }

    let mut active: user::ActiveModel = existing.into();
    if let Some(new_name) = name {
        active.name = Set(new_name);
    }
    if let Some(new_email) = email {
        active.email = Set(new_email.trim().to_string());
    }

    let result = active.update(db).await?;
    Ok(result)
}

/// Removes a user by id. Deleting an unknown id is a no-op.
pub async fn delete_user(db: &DatabaseConnection, user_id: i64) -> Result<()> {
    User::delete_by_id(user_id).exec(db).await?;
    Ok(())
}

/// Fails with `EmailInUse` when another user already registered `email`.
async fn check_email_free(
    db: &DatabaseConnection,
    email: &str,
    exclude_user_id: Option<i64>,
) -> Result<()> {
    let holder = User::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await?;

    if let Some(holder) = holder
        && Some(holder.id) != exclude_user_id
    {
        return Err(Error::EmailInUse {
            email: email.to_string(),
        });
    }

    Ok(())
}
