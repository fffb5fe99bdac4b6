//! Scoped units of work.
//!
//! A [`Session`] holds one pooled connection with an open transaction.
//!
//! - Statements run in the order they are issued; `&mut` access makes a
//!   session usable by one task at a time.
//! - Writes reach the database when the repository call is made. Reads never
//!   send anything on the caller's behalf.
//! - [`Session::commit`] is the only way to make writes durable. After a
//!   commit (or rollback) the connection goes back to the pool, and the next
//!   statement checks out a connection and begins a new transaction.
//! - A statement rejected by the server, or a connection that breaks, leaves
//!   the session failed. Until [`Session::rollback`] is called, further
//!   statements and [`Session::commit`] return
//!   [`RepositoryError::PendingRollback`], so work from before the failure is
//!   never half-committed.
//! - Dropping a session with an open transaction rolls it back and returns the
//!   connection. This covers early returns, panics and cancelled requests.
//! - A connection that fails with an I/O or protocol error is released
//!   immediately; the pool's release-time ping then closes it instead of
//!   reusing it.

use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::RepositoryError;

/// One unit of work against the database.
pub struct Session {
    id: Uuid,
    pool: PgPool,
    tx: Option<Transaction<'static, Postgres>>,
    failed: bool,
}

impl Session {
    /// Check out a connection from `pool` and begin a transaction.
    pub(crate) async fn begin(pool: PgPool) -> Result<Self, RepositoryError> {
        let id = Uuid::new_v4();
        let tx = pool.begin().await.map_err(|e| {
            let err = RepositoryError::from(e);
            tracing::warn!(session_id = %id, error = %err, "failed to acquire database session");
            err
        })?;
        tracing::debug!(session_id = %id, "session acquired");

        Ok(Self {
            id,
            pool,
            tx: Some(tx),
            failed: false,
        })
    }

    /// Identifier used in log events for this session.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Whether a transaction is open (and a connection checked out).
    #[must_use]
    pub const fn in_transaction(&self) -> bool {
        self.tx.is_some()
    }

    /// Whether a failed statement is waiting for [`Session::rollback`].
    #[must_use]
    pub const fn needs_rollback(&self) -> bool {
        self.failed
    }

    /// The connection of the open transaction, beginning a new transaction if
    /// the previous one was committed or rolled back.
    ///
    /// Pass the result of any query run on this connection through
    /// [`Session::track`] so failures are recorded.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::PendingRollback` after a failed statement.
    /// Returns `RepositoryError::PoolTimeout` or `RepositoryError::Connectivity`
    /// if a new transaction is needed and no connection can be obtained.
    pub async fn connection(&mut self) -> Result<&mut PgConnection, RepositoryError> {
        if self.failed {
            return Err(RepositoryError::PendingRollback);
        }
        let tx = match self.tx {
            Some(ref mut tx) => tx,
            None => {
                let tx = self.pool.begin().await?;
                tracing::debug!(session_id = %self.id, "session began a new transaction");
                self.tx.insert(tx)
            }
        };
        Ok(&mut **tx)
    }

    /// Convert a query result, marking the session failed if the statement
    /// aborted the transaction.
    ///
    /// Errors raised by the server abort the transaction; the session keeps
    /// it until rolled back. A broken connection is released at once.
    ///
    /// # Errors
    ///
    /// Returns the classified [`RepositoryError`] for a failed query.
    pub fn track<T>(&mut self, result: Result<T, sqlx::Error>) -> Result<T, RepositoryError> {
        result.map_err(|e| {
            let aborts_transaction = matches!(e, sqlx::Error::Database(_));
            let err = RepositoryError::from(e);
            if err.is_connectivity() {
                self.failed = true;
                if self.tx.take().is_some() {
                    tracing::warn!(
                        session_id = %self.id,
                        error = %err,
                        "connection failed, discarding it and its transaction"
                    );
                }
            } else if aborts_transaction && self.tx.is_some() {
                self.failed = true;
                tracing::debug!(
                    session_id = %self.id,
                    error = %err,
                    "statement failed, session needs rollback"
                );
            }
            err
        })
    }

    /// Commit the open transaction. A no-op if none is open.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::PendingRollback` after a failed statement.
    /// Returns a [`RepositoryError`] if the commit fails; the transaction is
    /// gone either way.
    pub async fn commit(&mut self) -> Result<(), RepositoryError> {
        if self.failed {
            return Err(RepositoryError::PendingRollback);
        }
        let Some(tx) = self.tx.take() else {
            return Ok(());
        };
        tx.commit().await?;
        tracing::debug!(session_id = %self.id, "session committed");
        Ok(())
    }

    /// Roll back the open transaction and clear a failed state. A no-op if
    /// nothing is open.
    ///
    /// # Errors
    ///
    /// Returns a [`RepositoryError`] if the rollback statement fails; the
    /// transaction is gone and the session usable either way.
    pub async fn rollback(&mut self) -> Result<(), RepositoryError> {
        self.failed = false;
        let Some(tx) = self.tx.take() else {
            return Ok(());
        };
        tx.rollback().await?;
        tracing::debug!(session_id = %self.id, "session rolled back");
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // Dropping the transaction queues its rollback on the connection
        if self.tx.is_some() {
            tracing::debug!(
                session_id = %self.id,
                "session released without commit, discarding uncommitted work"
            );
        } else {
            tracing::debug!(session_id = %self.id, "session released");
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("in_transaction", &self.in_transaction())
            .field("needs_rollback", &self.failed)
            .finish_non_exhaustive()
    }
}
