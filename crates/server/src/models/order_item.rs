//! Line items within an order.

use std::num::NonZeroU32;

use rust_decimal::Decimal;
use serde::Serialize;
use storekeep_core::{OrderId, OrderItemId, Price, ProductId};

/// A row of `ecommerce.order_items`. Items carry no timestamps.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    /// Always positive.
    pub quantity: i32,
    /// Unit price at the time of purchase, independent of the product's
    /// current price.
    pub price: Price,
}

impl OrderItem {
    /// `quantity * price`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price.amount() * Decimal::from(self.quantity)
    }
}

/// Input for [`crate::db::OrderItemRepository::create`].
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: NonZeroU32,
    pub price: Price,
}
