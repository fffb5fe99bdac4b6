//! Database access for the `ecommerce` schema.
//!
//! # Tables
//!
//! - `users` - Customer accounts
//! - `categories` - Product categories
//! - `products` - Catalog
//! - `orders` - Orders placed by users
//! - `order_items` - Lines of an order, with a price snapshot
//! - `addresses` - Shipping/billing addresses of users
//!
//! # Sessions
//!
//! [`Database`] owns the connection pool. Every unit of work runs in a
//! [`Session`]: one checked-out connection with an open transaction. Nothing
//! is committed unless the caller calls [`Session::commit`]; dropping a
//! session rolls back whatever is still open and returns the connection.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p storekeep-cli -- migrate
//! ```

pub mod addresses;
pub mod categories;
pub mod order_items;
pub mod orders;
pub mod products;
pub mod session;
pub mod users;

use std::str::FromStr;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::error::ErrorKind;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};
use thiserror::Error;

pub use addresses::AddressRepository;
pub use categories::CategoryRepository;
pub use order_items::OrderItemRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use session::Session;
pub use users::UserRepository;

use crate::config::{PoolSettings, Settings};

/// Connections above the steady-state pool size are closed after idling this long.
const OVERFLOW_IDLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No connection became free within the pool timeout.
    #[error("timed out waiting for a database connection")]
    PoolTimeout,

    /// The connection broke or could not be established.
    #[error("database connection failed: {0}")]
    Connectivity(#[source] sqlx::Error),

    /// A foreign key points at a missing row, or a row is still referenced.
    #[error("referential integrity violation: {0}")]
    ReferentialIntegrity(String),

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A value was rejected by a check constraint or does not fit its column.
    #[error("invalid value: {0}")]
    Invalid(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// An earlier statement in this session failed; call
    /// [`Session::rollback`] before issuing more statements or committing.
    #[error("session has a failed transaction, roll back before continuing")]
    PendingRollback,

    /// Any other database error from sqlx.
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl RepositoryError {
    /// Whether the error came from a broken or unreachable connection.
    #[must_use]
    pub const fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connectivity(_))
    }

    /// Whether retrying the same operation later might succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::PoolTimeout | Self::Connectivity(_))
    }
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => Self::PoolTimeout,
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => Self::Connectivity(err),
            sqlx::Error::RowNotFound => Self::NotFound,
            sqlx::Error::Database(db_err) if is_connection_failure(db_err.code().as_deref()) => {
                Self::Connectivity(sqlx::Error::Database(db_err))
            }
            sqlx::Error::Database(db_err) => {
                let detail = db_err.constraint().map_or_else(
                    || db_err.message().to_owned(),
                    |constraint| format!("{} ({constraint})", db_err.message()),
                );
                match db_err.kind() {
                    ErrorKind::ForeignKeyViolation => Self::ReferentialIntegrity(detail),
                    ErrorKind::UniqueViolation => Self::Conflict(detail),
                    ErrorKind::CheckViolation | ErrorKind::NotNullViolation => {
                        Self::Invalid(detail)
                    }
                    _ => Self::Database(sqlx::Error::Database(db_err)),
                }
            }
            other => Self::Database(other),
        }
    }
}

/// Snapshot of pool occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatus {
    /// Open connections, checked out or idle.
    pub size: u32,
    /// Open connections waiting in the pool.
    pub idle: usize,
}

/// SQLSTATE classes `08` (connection exception) and `57P` (server shutdown or
/// backend terminated): the connection is gone even though the server answered.
fn is_connection_failure(code: Option<&str>) -> bool {
    code.is_some_and(|code| code.starts_with("08") || code.starts_with("57P"))
}

/// The process-wide connection pool.
///
/// Build one with [`Database::connect`] at startup, share it through
/// `AppState`, and call [`Database::close`] during shutdown. Cloning is cheap
/// and every clone uses the same pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Build the pool described by `settings`.
    ///
    /// No connection is opened here; the first [`Database::session`] call
    /// connects. This keeps startup independent of database availability.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the URL is not a valid
    /// `PostgreSQL` connection string.
    pub fn connect(settings: &Settings) -> Result<Self, RepositoryError> {
        let options = PgConnectOptions::from_str(settings.database_url.expose_secret())
            .map_err(RepositoryError::Database)?;
        Ok(Self::with_options(&settings.pool, options))
    }

    /// Build a pool from already-parsed connect options.
    ///
    /// - `min_connections` is the steady-state size; idle connections above it
    ///   are closed after [`OVERFLOW_IDLE_TIMEOUT`].
    /// - `max_connections` is size plus overflow; further acquires wait up to
    ///   the pool timeout and then fail with [`RepositoryError::PoolTimeout`].
    /// - Connections are pinged before reuse so broken ones are replaced.
    #[must_use]
    pub fn with_options(pool: &PoolSettings, options: PgConnectOptions) -> Self {
        let options = if pool.echo {
            options
        } else {
            options.disable_statement_logging()
        };

        let pool = PgPoolOptions::new()
            .max_connections(pool.max_connections())
            .min_connections(pool.size)
            .idle_timeout(OVERFLOW_IDLE_TIMEOUT)
            .acquire_timeout(pool.timeout)
            .test_before_acquire(true)
            .connect_lazy_with(options);

        Self { pool }
    }

    /// Wrap an existing pool (e.g. one provided by `#[sqlx::test]`).
    #[must_use]
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check out a connection and begin a transaction.
    ///
    /// Waits for a free connection up to the configured pool timeout.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::PoolTimeout` if the pool stays exhausted and
    /// `RepositoryError::Connectivity` if a new connection cannot be opened.
    pub async fn session(&self) -> Result<Session, RepositoryError> {
        Session::begin(self.pool.clone()).await
    }

    /// Run `work` in a fresh session.
    ///
    /// If `work` fails, the transaction is rolled back and the error is
    /// returned unchanged. If it succeeds without calling
    /// [`Session::commit`], its writes are discarded when the session is
    /// released. The session never commits on its own.
    ///
    /// # Errors
    ///
    /// Returns the acquisition error (converted into `E`) or whatever `work`
    /// returned.
    pub async fn scoped<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: AsyncFnOnce(&mut Session) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let mut session = self.session().await?;

        match work(&mut session).await {
            Ok(value) => Ok(value),
            Err(err) => {
                if let Err(rollback_err) = session.rollback().await {
                    tracing::warn!(
                        session_id = %session.id(),
                        error = %rollback_err,
                        "rollback after failed unit of work also failed"
                    );
                }
                Err(err)
            }
        }
    }

    /// Current pool occupancy.
    #[must_use]
    pub fn status(&self) -> PoolStatus {
        PoolStatus {
            size: self.pool.size(),
            idle: self.pool.num_idle(),
        }
    }

    /// Close every connection and refuse new acquires.
    ///
    /// Waits for checked-out connections to be returned.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database pool closed");
    }
}
