//! User shipping and billing addresses.

use serde::Serialize;
use storekeep_core::{AddressId, UserId};

use super::Timestamps;

/// A row of `ecommerce.addresses`.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Address {
    pub id: AddressId,
    pub user_id: UserId,
    pub street: String,
    pub city: String,
    /// State, province or region.
    pub state: Option<String>,
    pub country: String,
    pub postal_code: String,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

/// Input for [`crate::db::AddressRepository::create`].
#[derive(Debug, Clone)]
pub struct NewAddress {
    pub user_id: UserId,
    pub street: String,
    pub city: String,
    pub state: Option<String>,
    pub country: String,
    pub postal_code: String,
}

/// Partial update; `None` leaves the column as is, `state: Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct AddressUpdate {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<Option<String>>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
}
