//! Show the effective settings.

use storekeep_server::config::Settings;

/// Log every setting, with the database password and Sentry DSN masked.
pub fn show(settings: &Settings) {
    tracing::info!(app_name = %settings.app_name, debug = settings.debug, "Service");
    tracing::info!(database_url = %settings.redacted_database_url(), "Database");
    tracing::info!(
        size = settings.pool.size,
        max_overflow = settings.pool.max_overflow,
        max_connections = settings.pool.max_connections(),
        echo = settings.pool.echo,
        timeout_secs = settings.pool.timeout.as_secs(),
        "Pool"
    );
    tracing::info!(addr = %settings.socket_addr(), "Listen");
    tracing::info!(configured = settings.sentry_dsn.is_some(), "Sentry");
}
