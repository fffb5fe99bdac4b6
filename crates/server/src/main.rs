//! Storekeep - ecommerce web service.
//!
//! Serves `/`, `/health` and `/health/ready` on `HOST:PORT` (default
//! `127.0.0.1:8000`).
//!
//! # Architecture
//!
//! - Axum web framework with JSON handlers
//! - `PostgreSQL` via a sqlx pool sized by `DB_POOL_SIZE` + `DB_MAX_OVERFLOW`
//! - Settings from the environment and `.env`, loaded once at startup
//!
//! Migrations are not run on startup. Apply them with
//! `cargo run -p storekeep-cli -- migrate`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use sentry::integrations::tracing as sentry_tracing;
use storekeep_server::config::{self, Settings};
use storekeep_server::db::Database;
use storekeep_server::routes;
use storekeep_server::state::AppState;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Log filter: `RUST_LOG` if set, otherwise info for this crate (debug with
/// `DEBUG=true`). `DB_ECHO=true` adds statement logging either way.
fn env_filter(settings: &Settings) -> EnvFilter {
    let default = if settings.debug {
        "storekeep_server=debug,tower_http=debug"
    } else {
        "storekeep_server=info,tower_http=debug"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into());

    if settings.pool.echo {
        match "sqlx::query=debug".parse() {
            Ok(directive) => filter.add_directive(directive),
            Err(_) => filter,
        }
    } else {
        filter
    }
}

#[tokio::main]
async fn main() {
    // Configuration errors are fatal, before anything binds or connects
    let settings = match config::settings() {
        Ok(settings) => settings,
        Err(err) => {
            tracing_subscriber::fmt::init();
            tracing::error!(error = %err, "Failed to load configuration");
            std::process::exit(1);
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(settings);

    tracing_subscriber::registry()
        .with(env_filter(settings))
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(settings).await {
        tracing::error!("Server failed: {e}");
        std::process::exit(1);
    }
}

async fn run(settings: &'static Settings) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        app_name = %settings.app_name,
        database_url = %settings.redacted_database_url(),
        pool_size = settings.pool.size,
        max_overflow = settings.pool.max_overflow,
        "Starting"
    );

    let db = Database::connect(settings)?;
    let state = AppState::new(db.clone());
    let app = routes::router(state);

    let addr = settings.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("{} listening on {}", settings.app_name, addr);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    // Release pooled connections whether or not serving failed
    db.close().await;
    served?;
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
