//! Product repository for database operations.

use storekeep_core::{CategoryId, ProductId};

use super::{RepositoryError, Session};
use crate::models::{NewProduct, Product, ProductUpdate};

/// Repository for `ecommerce.products`.
pub struct ProductRepository<'s> {
    session: &'s mut Session,
}

impl<'s> ProductRepository<'s> {
    #[must_use]
    pub const fn new(session: &'s mut Session) -> Self {
        Self { session }
    }

    /// Insert a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::ReferentialIntegrity` if the category doesn't exist.
    /// Returns `RepositoryError::Invalid` if the stock does not fit the column.
    pub async fn create(&mut self, new: &NewProduct) -> Result<Product, RepositoryError> {
        let stock = stock_column(new.stock)?;
        let conn = self.session.connection().await?;
        let result = sqlx::query_as::<_, Product>(
            r"
            INSERT INTO ecommerce.products (name, description, price, stock, category_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, description, price, stock, category_id, created_at, updated_at
            ",
        )
        .bind(&new.name)
        .bind(new.description.as_deref())
        .bind(new.price)
        .bind(stock)
        .bind(new.category_id)
        .fetch_one(conn)
        .await;

        let product = self.session.track(result)?;
        tracing::debug!(product_id = %product.id, "product created");
        Ok(product)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&mut self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let conn = self.session.connection().await?;
        let result = sqlx::query_as::<_, Product>(
            r"
            SELECT id, name, description, price, stock, category_id, created_at, updated_at
            FROM ecommerce.products
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(conn)
        .await;

        self.session.track(result)
    }

    /// Products in a category, or uncategorized products for `None`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_category(
        &mut self,
        category_id: Option<CategoryId>,
    ) -> Result<Vec<Product>, RepositoryError> {
        let conn = self.session.connection().await?;
        let result = sqlx::query_as::<_, Product>(
            r"
            SELECT id, name, description, price, stock, category_id, created_at, updated_at
            FROM ecommerce.products
            WHERE category_id IS NOT DISTINCT FROM $1
            ORDER BY id
            ",
        )
        .bind(category_id)
        .fetch_all(conn)
        .await;

        self.session.track(result)
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::ReferentialIntegrity` if the new category doesn't exist.
    pub async fn update(
        &mut self,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<Product, RepositoryError> {
        let stock = update.stock.map(stock_column).transpose()?;
        let conn = self.session.connection().await?;
        let result = sqlx::query_as::<_, Product>(
            r"
            UPDATE ecommerce.products
            SET name = COALESCE($2, name),
                description = CASE WHEN $3 THEN $4 ELSE description END,
                price = COALESCE($5, price),
                stock = COALESCE($6, stock),
                category_id = CASE WHEN $7 THEN $8 ELSE category_id END
            WHERE id = $1
            RETURNING id, name, description, price, stock, category_id, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(update.name.as_deref())
        .bind(update.description.is_some())
        .bind(update.description.clone().flatten())
        .bind(update.price)
        .bind(stock)
        .bind(update.category_id.is_some())
        .bind(update.category_id.flatten())
        .fetch_optional(conn)
        .await;

        self.session.track(result)?.ok_or(RepositoryError::NotFound)
    }

    /// Add `delta` (possibly negative) to the stock count and return the new count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Invalid` if the stock would drop below zero.
    pub async fn adjust_stock(&mut self, id: ProductId, delta: i32) -> Result<i32, RepositoryError> {
        let conn = self.session.connection().await?;
        let result = sqlx::query_scalar::<_, i32>(
            r"
            UPDATE ecommerce.products
            SET stock = stock + $2
            WHERE id = $1
            RETURNING stock
            ",
        )
        .bind(id)
        .bind(delta)
        .fetch_optional(conn)
        .await;

        self.session.track(result)?.ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::ReferentialIntegrity` if order items still reference it.
    pub async fn delete(&mut self, id: ProductId) -> Result<(), RepositoryError> {
        let conn = self.session.connection().await?;
        let result = sqlx::query("DELETE FROM ecommerce.products WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await;

        if self.session.track(result)?.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

fn stock_column(stock: u32) -> Result<i32, RepositoryError> {
    i32::try_from(stock).map_err(|_| RepositoryError::Invalid(format!("stock {stock} is too large")))
}
