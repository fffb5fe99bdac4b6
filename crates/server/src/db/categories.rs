//! Category repository for database operations.

use storekeep_core::CategoryId;

use super::{RepositoryError, Session};
use crate::models::{Category, NewCategory};

/// Repository for `ecommerce.categories`.
pub struct CategoryRepository<'s> {
    session: &'s mut Session,
}

impl<'s> CategoryRepository<'s> {
    #[must_use]
    pub const fn new(session: &'s mut Session) -> Self {
        Self { session }
    }

    /// Insert a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name already exists.
    pub async fn create(&mut self, new: &NewCategory) -> Result<Category, RepositoryError> {
        let conn = self.session.connection().await?;
        let result = sqlx::query_as::<_, Category>(
            r"
            INSERT INTO ecommerce.categories (name)
            VALUES ($1)
            RETURNING id, name, created_at, updated_at
            ",
        )
        .bind(&new.name)
        .fetch_one(conn)
        .await;

        self.session.track(result)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&mut self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let conn = self.session.connection().await?;
        let result = sqlx::query_as::<_, Category>(
            "SELECT id, name, created_at, updated_at FROM ecommerce.categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(conn)
        .await;

        self.session.track(result)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_name(&mut self, name: &str) -> Result<Option<Category>, RepositoryError> {
        let conn = self.session.connection().await?;
        let result = sqlx::query_as::<_, Category>(
            "SELECT id, name, created_at, updated_at FROM ecommerce.categories WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(conn)
        .await;

        self.session.track(result)
    }

    /// All categories, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&mut self) -> Result<Vec<Category>, RepositoryError> {
        let conn = self.session.connection().await?;
        let result = sqlx::query_as::<_, Category>(
            "SELECT id, name, created_at, updated_at FROM ecommerce.categories ORDER BY name",
        )
        .fetch_all(conn)
        .await;

        self.session.track(result)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category doesn't exist.
    /// Returns `RepositoryError::Conflict` if the name is taken.
    pub async fn rename(&mut self, id: CategoryId, name: &str) -> Result<Category, RepositoryError> {
        let conn = self.session.connection().await?;
        let result = sqlx::query_as::<_, Category>(
            r"
            UPDATE ecommerce.categories
            SET name = $2
            WHERE id = $1
            RETURNING id, name, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(name)
        .fetch_optional(conn)
        .await;

        self.session.track(result)?.ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category doesn't exist.
    /// Returns `RepositoryError::ReferentialIntegrity` if products still use it.
    pub async fn delete(&mut self, id: CategoryId) -> Result<(), RepositoryError> {
        let conn = self.session.connection().await?;
        let result = sqlx::query("DELETE FROM ecommerce.categories WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await;

        if self.session.track(result)?.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
