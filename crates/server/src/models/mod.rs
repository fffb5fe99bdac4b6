//! Row and input types for the `ecommerce` schema.
//!
//! Each entity has a row type (what a `SELECT` returns), a `New*` type for
//! inserts and, where rows are mutable, an `*Update` type whose `None` fields
//! leave the column untouched. Relationships are not navigable attributes;
//! use the repository lookups in [`crate::db`] instead.
//!
//! ```text
//! users ──< orders ──< order_items >── products >── categories
//!   └───< addresses
//! ```

pub mod address;
pub mod category;
pub mod order;
pub mod order_item;
pub mod product;
pub mod user;

use chrono::{DateTime, Utc};
use serde::Serialize;

pub use address::{Address, AddressUpdate, NewAddress};
pub use category::{Category, NewCategory};
pub use order::{NewOrder, Order};
pub use order_item::{NewOrderItem, OrderItem};
pub use product::{NewProduct, Product, ProductUpdate};
pub use user::{NewUser, User, UserUpdate};

/// Creation and last-update times, assigned by the database.
///
/// Flattened into every timestamped row type. Callers never set these:
/// inserts take the column default and an `UPDATE` trigger bumps
/// `updated_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Timestamps {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
