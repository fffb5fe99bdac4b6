//! Core types for Storekeep.
//!
//! This module provides type-safe wrappers for the ecommerce domain.

pub mod email;
pub mod id;
pub mod price;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::{Price, PriceError};
pub use status::{OrderStatus, OrderStatusError};
