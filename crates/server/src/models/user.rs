//! User accounts.

use serde::Serialize;
use storekeep_core::{Email, UserId};

use super::Timestamps;

/// A row of `ecommerce.users`.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    /// Unique across all users.
    pub email: Email,
    pub username: String,
    /// Never serialized.
    #[serde(skip_serializing)]
    pub hashed_password: String,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

/// Input for [`crate::db::UserRepository::create`].
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub username: String,
    /// Already hashed by the caller.
    pub hashed_password: String,
}

/// Partial update; `None` leaves the column as is.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub email: Option<Email>,
    pub username: Option<String>,
    pub hashed_password: Option<String>,
}
