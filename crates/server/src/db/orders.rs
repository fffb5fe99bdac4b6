//! Order repository for database operations.
//!
//! `orders.total` is whatever the caller stores. Adding or removing items
//! does not touch it; use [`OrderRepository::items_total`] to compare the
//! stored total with the sum of the order's lines and [`OrderRepository::set_total`]
//! to reconcile.

use rust_decimal::Decimal;
use storekeep_core::{OrderId, OrderStatus, Price, UserId};

use super::{RepositoryError, Session};
use crate::models::{NewOrder, Order};

/// Repository for `ecommerce.orders`.
pub struct OrderRepository<'s> {
    session: &'s mut Session,
}

impl<'s> OrderRepository<'s> {
    #[must_use]
    pub const fn new(session: &'s mut Session) -> Self {
        Self { session }
    }

    /// Insert an order. A missing status is stored as `pending`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::ReferentialIntegrity` if the user doesn't exist.
    pub async fn create(&mut self, new: &NewOrder) -> Result<Order, RepositoryError> {
        let conn = self.session.connection().await?;
        let result = sqlx::query_as::<_, Order>(
            r"
            INSERT INTO ecommerce.orders (user_id, total, status)
            VALUES ($1, $2, COALESCE($3, 'pending'))
            RETURNING id, user_id, total, status, created_at, updated_at
            ",
        )
        .bind(new.user_id)
        .bind(new.total)
        .bind(new.status.as_ref())
        .fetch_one(conn)
        .await;

        let order = self.session.track(result)?;
        tracing::debug!(order_id = %order.id, user_id = %order.user_id, "order created");
        Ok(order)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&mut self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let conn = self.session.connection().await?;
        let result = sqlx::query_as::<_, Order>(
            r"
            SELECT id, user_id, total, status, created_at, updated_at
            FROM ecommerce.orders
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(conn)
        .await;

        self.session.track(result)
    }

    /// A user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_user(&mut self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let conn = self.session.connection().await?;
        let result = sqlx::query_as::<_, Order>(
            r"
            SELECT id, user_id, total, status, created_at, updated_at
            FROM ecommerce.orders
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(user_id)
        .fetch_all(conn)
        .await;

        self.session.track(result)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn update_status(
        &mut self,
        id: OrderId,
        status: &OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let conn = self.session.connection().await?;
        let result = sqlx::query_as::<_, Order>(
            r"
            UPDATE ecommerce.orders
            SET status = $2
            WHERE id = $1
            RETURNING id, user_id, total, status, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(conn)
        .await;

        self.session.track(result)?.ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn set_total(&mut self, id: OrderId, total: Price) -> Result<Order, RepositoryError> {
        let conn = self.session.connection().await?;
        let result = sqlx::query_as::<_, Order>(
            r"
            UPDATE ecommerce.orders
            SET total = $2
            WHERE id = $1
            RETURNING id, user_id, total, status, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(total)
        .fetch_optional(conn)
        .await;

        self.session.track(result)?.ok_or(RepositoryError::NotFound)
    }

    /// `SUM(quantity * price)` over the order's items; zero for an order
    /// without items. Does not check that the order exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items_total(&mut self, id: OrderId) -> Result<Decimal, RepositoryError> {
        let conn = self.session.connection().await?;
        let result = sqlx::query_scalar::<_, Decimal>(
            r"
            SELECT COALESCE(SUM(quantity * price), 0)
            FROM ecommerce.order_items
            WHERE order_id = $1
            ",
        )
        .bind(id)
        .fetch_one(conn)
        .await;

        self.session.track(result)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    /// Returns `RepositoryError::ReferentialIntegrity` if items still reference it.
    pub async fn delete(&mut self, id: OrderId) -> Result<(), RepositoryError> {
        let conn = self.session.connection().await?;
        let result = sqlx::query("DELETE FROM ecommerce.orders WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await;

        if self.session.track(result)?.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
