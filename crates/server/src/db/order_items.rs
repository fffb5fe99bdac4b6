//! Order item repository for database operations.

use storekeep_core::{OrderId, OrderItemId, ProductId};

use super::{RepositoryError, Session};
use crate::models::{NewOrderItem, OrderItem};

/// Repository for `ecommerce.order_items`.
pub struct OrderItemRepository<'s> {
    session: &'s mut Session,
}

impl<'s> OrderItemRepository<'s> {
    #[must_use]
    pub const fn new(session: &'s mut Session) -> Self {
        Self { session }
    }

    /// Insert a line item. The order's stored total is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::ReferentialIntegrity` if the order or product
    /// doesn't exist; nothing is written in that case.
    /// Returns `RepositoryError::Invalid` if the quantity does not fit the column.
    pub async fn create(&mut self, new: &NewOrderItem) -> Result<OrderItem, RepositoryError> {
        let quantity = i32::try_from(new.quantity.get()).map_err(|_| {
            RepositoryError::Invalid(format!("quantity {} is too large", new.quantity))
        })?;
        let conn = self.session.connection().await?;
        let result = sqlx::query_as::<_, OrderItem>(
            r"
            INSERT INTO ecommerce.order_items (order_id, product_id, quantity, price)
            VALUES ($1, $2, $3, $4)
            RETURNING id, order_id, product_id, quantity, price
            ",
        )
        .bind(new.order_id)
        .bind(new.product_id)
        .bind(quantity)
        .bind(new.price)
        .fetch_one(conn)
        .await;

        let item = self.session.track(result)?;
        tracing::debug!(
            order_item_id = %item.id,
            order_id = %item.order_id,
            product_id = %item.product_id,
            "order item created"
        );
        Ok(item)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&mut self, id: OrderItemId) -> Result<Option<OrderItem>, RepositoryError> {
        let conn = self.session.connection().await?;
        let result = sqlx::query_as::<_, OrderItem>(
            r"
            SELECT id, order_id, product_id, quantity, price
            FROM ecommerce.order_items
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(conn)
        .await;

        self.session.track(result)
    }

    /// Items of an order in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_order(&mut self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let conn = self.session.connection().await?;
        let result = sqlx::query_as::<_, OrderItem>(
            r"
            SELECT id, order_id, product_id, quantity, price
            FROM ecommerce.order_items
            WHERE order_id = $1
            ORDER BY id
            ",
        )
        .bind(order_id)
        .fetch_all(conn)
        .await;

        self.session.track(result)
    }

    /// Every line that references a product, across all orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_product(
        &mut self,
        product_id: ProductId,
    ) -> Result<Vec<OrderItem>, RepositoryError> {
        let conn = self.session.connection().await?;
        let result = sqlx::query_as::<_, OrderItem>(
            r"
            SELECT id, order_id, product_id, quantity, price
            FROM ecommerce.order_items
            WHERE product_id = $1
            ORDER BY id
            ",
        )
        .bind(product_id)
        .fetch_all(conn)
        .await;

        self.session.track(result)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item doesn't exist.
    pub async fn delete(&mut self, id: OrderItemId) -> Result<(), RepositoryError> {
        let conn = self.session.connection().await?;
        let result = sqlx::query("DELETE FROM ecommerce.order_items WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await;

        if self.session.track(result)?.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
