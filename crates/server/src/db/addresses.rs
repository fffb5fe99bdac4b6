//! Address repository for database operations.

use storekeep_core::{AddressId, UserId};

use super::{RepositoryError, Session};
use crate::models::{Address, AddressUpdate, NewAddress};

/// Repository for `ecommerce.addresses`.
pub struct AddressRepository<'s> {
    session: &'s mut Session,
}

impl<'s> AddressRepository<'s> {
    #[must_use]
    pub const fn new(session: &'s mut Session) -> Self {
        Self { session }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::ReferentialIntegrity` if the user doesn't exist.
    pub async fn create(&mut self, new: &NewAddress) -> Result<Address, RepositoryError> {
        let conn = self.session.connection().await?;
        let result = sqlx::query_as::<_, Address>(
            r"
            INSERT INTO ecommerce.addresses (user_id, street, city, state, country, postal_code)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, street, city, state, country, postal_code, created_at, updated_at
            ",
        )
        .bind(new.user_id)
        .bind(&new.street)
        .bind(&new.city)
        .bind(new.state.as_deref())
        .bind(&new.country)
        .bind(&new.postal_code)
        .fetch_one(conn)
        .await;

        self.session.track(result)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&mut self, id: AddressId) -> Result<Option<Address>, RepositoryError> {
        let conn = self.session.connection().await?;
        let result = sqlx::query_as::<_, Address>(
            r"
            SELECT id, user_id, street, city, state, country, postal_code, created_at, updated_at
            FROM ecommerce.addresses
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(conn)
        .await;

        self.session.track(result)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_user(&mut self, user_id: UserId) -> Result<Vec<Address>, RepositoryError> {
        let conn = self.session.connection().await?;
        let result = sqlx::query_as::<_, Address>(
            r"
            SELECT id, user_id, street, city, state, country, postal_code, created_at, updated_at
            FROM ecommerce.addresses
            WHERE user_id = $1
            ORDER BY id
            ",
        )
        .bind(user_id)
        .fetch_all(conn)
        .await;

        self.session.track(result)
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address doesn't exist.
    pub async fn update(
        &mut self,
        id: AddressId,
        update: &AddressUpdate,
    ) -> Result<Address, RepositoryError> {
        let conn = self.session.connection().await?;
        let result = sqlx::query_as::<_, Address>(
            r"
            UPDATE ecommerce.addresses
            SET street = COALESCE($2, street),
                city = COALESCE($3, city),
                state = CASE WHEN $4 THEN $5 ELSE state END,
                country = COALESCE($6, country),
                postal_code = COALESCE($7, postal_code)
            WHERE id = $1
            RETURNING id, user_id, street, city, state, country, postal_code, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(update.street.as_deref())
        .bind(update.city.as_deref())
        .bind(update.state.is_some())
        .bind(update.state.clone().flatten())
        .bind(update.country.as_deref())
        .bind(update.postal_code.as_deref())
        .fetch_optional(conn)
        .await;

        self.session.track(result)?.ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address doesn't exist.
    pub async fn delete(&mut self, id: AddressId) -> Result<(), RepositoryError> {
        let conn = self.session.connection().await?;
        let result = sqlx::query("DELETE FROM ecommerce.addresses WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await;

        if self.session.track(result)?.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
