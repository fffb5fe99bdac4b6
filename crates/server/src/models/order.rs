//! Customer orders.

use serde::Serialize;
use storekeep_core::{OrderId, OrderStatus, Price, UserId};

use super::Timestamps;

/// A row of `ecommerce.orders`.
///
/// `total` is stored as given by the caller. It is not derived from the
/// order's items; see [`crate::db::OrderRepository::items_total`].
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub total: Price,
    pub status: OrderStatus,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

/// Input for [`crate::db::OrderRepository::create`].
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub total: Price,
    /// `None` takes the column default, `"pending"`.
    pub status: Option<OrderStatus>,
}
