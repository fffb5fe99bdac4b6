//! Root route handler.

use axum::Json;
use serde::Serialize;

/// Body of `GET /`.
#[derive(Debug, Serialize)]
pub struct Greeting {
    pub message: &'static str,
}

/// Fixed greeting.
pub async fn root() -> Json<Greeting> {
    Json(Greeting {
        message: "Hello World",
    })
}
