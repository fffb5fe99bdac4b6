//! HTTP middleware and extractors.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request span and logging)
//! 3. Request ID (propagate or generate `x-request-id`)

pub mod db_session;
pub mod request_id;

pub use db_session::DbSession;
pub use request_id::{MAX_REQUEST_ID_LEN, REQUEST_ID_HEADER, request_id_middleware};
