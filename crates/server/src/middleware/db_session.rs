//! Per-request database session extractor.
//!
//! Handlers that take a [`DbSession`] get a fresh [`Session`] checked out
//! when the request is extracted. It lives as long as the handler holds it;
//! if the handler returns without committing, or the request is cancelled,
//! the session's drop rolls back and returns the connection.

use std::ops::{Deref, DerefMut};

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::db::Session;
use crate::error::AppError;
use crate::state::AppState;

/// Extractor that provides a database session for the request.
///
/// # Example
///
/// ```rust,ignore
/// async fn rename_category(mut db: DbSession) -> Result<Json<Category>, AppError> {
///     let category = CategoryRepository::new(&mut db).rename(id, "Books").await?;
///     db.commit().await?;
///     Ok(Json(category))
/// }
/// ```
#[derive(Debug)]
pub struct DbSession(pub Session);

impl FromRequestParts<AppState> for DbSession {
    type Rejection = AppError;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = state.db().session().await?;
        Ok(Self(session))
    }
}

impl Deref for DbSession {
    type Target = Session;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for DbSession {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}
