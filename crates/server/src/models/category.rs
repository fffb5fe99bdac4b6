//! Product categories.

use serde::Serialize;
use storekeep_core::CategoryId;

use super::Timestamps;

/// A row of `ecommerce.categories`.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Category {
    pub id: CategoryId,
    /// Unique across all categories.
    pub name: String,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
}
