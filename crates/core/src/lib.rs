//! Storekeep Core - Shared domain types.
//!
//! This crate provides the types shared by every Storekeep component:
//! - `server` - HTTP service and database layer
//! - `cli` - Command-line tools for migrations and configuration checks
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no database
//! access, no HTTP. With the `postgres` feature the types also implement the
//! sqlx encode/decode traits so they can be bound and fetched directly.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
