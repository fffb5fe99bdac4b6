//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /              - Greeting
//! GET  /health        - Liveness (no database access)
//! GET  /health/ready  - Readiness (runs SELECT 1 in a session)
//! ```

pub mod health;
pub mod home;

use axum::{Router, http::Request, middleware as axum_middleware, routing::get};
use tower_http::trace::TraceLayer;

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Create the application router with its middleware stack.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home::root))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .layer(axum_middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
            )
        }))
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
