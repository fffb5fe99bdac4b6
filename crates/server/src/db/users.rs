//! User repository for database operations.

use storekeep_core::{Email, UserId};

use super::{RepositoryError, Session};
use crate::models::{NewUser, User, UserUpdate};

/// Repository for `ecommerce.users`.
pub struct UserRepository<'s> {
    session: &'s mut Session,
}

impl<'s> UserRepository<'s> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(session: &'s mut Session) -> Self {
        Self { session }
    }

    /// Insert a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&mut self, new: &NewUser) -> Result<User, RepositoryError> {
        let conn = self.session.connection().await?;
        let result = sqlx::query_as::<_, User>(
            r"
            INSERT INTO ecommerce.users (email, username, hashed_password)
            VALUES ($1, $2, $3)
            RETURNING id, email, username, hashed_password, created_at, updated_at
            ",
        )
        .bind(&new.email)
        .bind(&new.username)
        .bind(&new.hashed_password)
        .fetch_one(conn)
        .await;

        let user = self.session.track(result)?;
        tracing::debug!(user_id = %user.id, "user created");
        Ok(user)
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&mut self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let conn = self.session.connection().await?;
        let result = sqlx::query_as::<_, User>(
            r"
            SELECT id, email, username, hashed_password, created_at, updated_at
            FROM ecommerce.users
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(conn)
        .await;

        self.session.track(result)
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&mut self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let conn = self.session.connection().await?;
        let result = sqlx::query_as::<_, User>(
            r"
            SELECT id, email, username, hashed_password, created_at, updated_at
            FROM ecommerce.users
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(conn)
        .await;

        self.session.track(result)
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Conflict` if the new email is taken.
    pub async fn update(&mut self, id: UserId, update: &UserUpdate) -> Result<User, RepositoryError> {
        let conn = self.session.connection().await?;
        let result = sqlx::query_as::<_, User>(
            r"
            UPDATE ecommerce.users
            SET email = COALESCE($2, email),
                username = COALESCE($3, username),
                hashed_password = COALESCE($4, hashed_password)
            WHERE id = $1
            RETURNING id, email, username, hashed_password, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(update.email.as_ref())
        .bind(update.username.as_deref())
        .bind(update.hashed_password.as_deref())
        .fetch_optional(conn)
        .await;

        self.session.track(result)?.ok_or(RepositoryError::NotFound)
    }

    /// Delete a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::ReferentialIntegrity` if orders or addresses
    /// still reference the user.
    pub async fn delete(&mut self, id: UserId) -> Result<(), RepositoryError> {
        let conn = self.session.connection().await?;
        let result = sqlx::query("DELETE FROM ecommerce.users WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await;

        if self.session.track(result)?.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
