//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! storekeep-cli migrate
//! storekeep-cli --env-file .env.test migrate
//! ```
//!
//! Applies `crates/server/migrations/` (embedded at build time) to
//! `DATABASE_URL`. Already-applied migrations are skipped, so running it
//! twice is harmless.

use storekeep_server::config::{ConfigError, Settings};
use storekeep_server::db::{Database, RepositoryError};

/// Errors from the migrate command.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns `MigrationError` if the database is unreachable or a migration fails.
pub async fn run(settings: &Settings) -> Result<(), MigrationError> {
    tracing::info!(
        database_url = %settings.redacted_database_url(),
        "Connecting to database..."
    );
    let db = Database::connect(settings)?;

    let migrator = sqlx::migrate!("../server/migrations");
    tracing::info!(available = migrator.iter().count(), "Running migrations...");
    let result = migrator.run(db.pool()).await;

    db.close().await;
    result?;

    tracing::info!("Migrations complete!");
    Ok(())
}
