//! Products available for purchase.

use serde::Serialize;
use storekeep_core::{CategoryId, Price, ProductId};

use super::Timestamps;

/// A row of `ecommerce.products`.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    /// Units on hand, never negative.
    pub stock: i32,
    pub category_id: Option<CategoryId>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

/// Input for [`crate::db::ProductRepository::create`].
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub stock: u32,
    pub category_id: Option<CategoryId>,
}

impl NewProduct {
    /// A product with no description, no stock and no category.
    #[must_use]
    pub fn new(name: impl Into<String>, price: Price) -> Self {
        Self {
            name: name.into(),
            description: None,
            price,
            stock: 0,
            category_id: None,
        }
    }
}

/// Partial update; `None` leaves the column as is.
///
/// Nullable columns use a nested `Option`: `Some(None)` clears the value.
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub price: Option<Price>,
    pub stock: Option<u32>,
    pub category_id: Option<Option<CategoryId>>,
}
