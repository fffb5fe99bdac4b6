//! Storekeep server library.
//!
//! Settings, the `ecommerce` schema's data access layer and the HTTP
//! surface, exposed as a library so the binary, the CLI and the integration
//! tests share one implementation.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
