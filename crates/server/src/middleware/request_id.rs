//! Correlation IDs for Storekeep requests.
//!
//! Each request gets an `x-request-id`: the one a load balancer or caller
//! sent, or a fresh UUID v4. The ID lands on the `http_request` span opened by
//! the router's `TraceLayer`, so every log line for the request (including the
//! session and repository events under it) carries it. It is also set as a
//! Sentry tag and returned to the client.
//!
//! Incoming values that are empty or longer than [`MAX_REQUEST_ID_LEN`] bytes
//! are replaced rather than logged.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// Header carrying the correlation ID in both directions.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest client-supplied ID kept as is.
pub const MAX_REQUEST_ID_LEN: usize = 128;

fn incoming_id(request: &Request) -> Option<String> {
    request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|id| !id.is_empty() && id.len() <= MAX_REQUEST_ID_LEN)
        .map(String::from)
}

/// Tag the request with its correlation ID and echo it on the response.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = incoming_id(&request).unwrap_or_else(|| Uuid::new_v4().to_string());

    Span::current().record("request_id", request_id.as_str());
    sentry::configure_scope(|scope| scope.set_tag("request_id", &request_id));

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
