//! Health check handlers.

use axum::{Json, http::StatusCode};
use serde::Serialize;

use crate::db::{RepositoryError, Session};
use crate::error::AppError;
use crate::middleware::DbSession;

/// Value of `service` in the liveness payload.
pub const SERVICE_NAME: &str = "storekeep";

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub service: &'static str,
}

/// Body of `GET /health/ready`.
#[derive(Debug, Serialize)]
pub struct Readiness {
    pub status: &'static str,
}

/// Liveness health check endpoint.
///
/// Does not touch the database, so it answers even when `PostgreSQL` is down.
pub async fn health() -> Json<Health> {
    Json(Health {
        status: "healthy",
        service: SERVICE_NAME,
    })
}

/// Readiness health check endpoint.
///
/// Checks out a session and runs `SELECT 1`. Returns 503 Service Unavailable
/// if no connection can be obtained or the query fails.
pub async fn readiness(
    session: Result<DbSession, AppError>,
) -> (StatusCode, Json<Readiness>) {
    let result = match session {
        Ok(mut db) => ping(&mut db).await.map_err(AppError::from),
        Err(err) => Err(err),
    };

    match result {
        Ok(()) => (StatusCode::OK, Json(Readiness { status: "ready" })),
        Err(err) => {
            tracing::warn!(error = %err, "readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(Readiness {
                    status: "unavailable",
                }),
            )
        }
    }
}

async fn ping(session: &mut Session) -> Result<(), RepositoryError> {
    let conn = session.connection().await?;
    let result = sqlx::query("SELECT 1").execute(conn).await;
    session.track(result)?;
    Ok(())
}
