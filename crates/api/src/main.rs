use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use portal_api::config::{ConfigError, ServerConfig};
use portal_api::router::build_app_router;
use portal_api::state::AppState;
use portal_core::labs::LabCatalog;
use portal_core::notify::Notifier;
use portal_db::PgStore;
use portal_events::{EmailConfig, EmailDelivery, LogDelivery};
use tokio::sync::Notify;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "portal_api=debug,portal_workflow=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env()?;
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url =
        std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

    let pool = portal_db::create_pool(&database_url).await?;
    tracing::info!("Database connection pool created");

    portal_db::health_check(&pool).await?;
    tracing::info!("Database health check passed");

    portal_db::run_migrations(&pool).await?;
    tracing::info!("Database migrations applied");

    // --- Notifications ---
    let notifier: Arc<dyn Notifier> = match EmailConfig::from_env() {
        Some(email) => {
            tracing::info!(host = %email.smtp_host, port = email.smtp_port, "SMTP delivery enabled");
            Arc::new(EmailDelivery::new(&email)?)
        }
        None => {
            tracing::warn!("SMTP_HOST not set, notifications will only be logged");
            Arc::new(LogDelivery)
        }
    };

    // --- App state ---
    let state = AppState::new(
        Arc::new(PgStore::new(pool)),
        notifier,
        LabCatalog::default(),
        config.clone(),
    );
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(config.host.parse()?, config.port);
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // In-flight requests get `shutdown_timeout_secs` to drain once a
    // signal arrives.
    let draining = Arc::new(Notify::new());
    let signalled = Arc::clone(&draining);
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            signalled.notify_one();
        })
        .into_future();

    let drain_deadline = async {
        draining.notified().await;
        tokio::time::sleep(Duration::from_secs(config.shutdown_timeout_secs)).await;
    };

    tokio::select! {
        result = server => result?,
        () = drain_deadline => {
            tracing::warn!(
                timeout_secs = config.shutdown_timeout_secs,
                "Graceful shutdown timed out, dropping open connections"
            );
        }
    }

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
///
/// If a handler cannot be installed the error is logged and that signal is
/// never observed.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl-C, starting graceful shutdown"),
        () = terminate => tracing::info!("Received SIGTERM, starting graceful shutdown"),
    }
}
