//! Folio server entry point.
//!
//! Loads configuration, prepares the documents directory, and starts the
//! Axum HTTP server with graceful shutdown. A background worker prunes
//! expired sessions alongside the server and is cancelled on shutdown.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, warn};

use folio_server::config::{LogFormat, ServerConfig};
use folio_server::routes;
use folio_server::session::SessionStore;
use folio_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env();

    init_tracing(&config);

    info!(
        data_dir = %config.data_dir.display(),
        users_file = %config.users_file.display(),
        raw_html = ?config.raw_html,
        "Folio starting"
    );

    let state = Arc::new(AppState::from_config(&config));

    state
        .documents
        .ensure_root()
        .await
        .context("failed to prepare documents directory")?;

    if !tokio::fs::try_exists(state.credentials.path())
        .await
        .unwrap_or(false)
    {
        warn!(
            path = %state.credentials.path().display(),
            "credentials file not found; sign-in will fail until it exists (see `folio user add`)"
        );
    }

    // Shutdown signal channel.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let session_worker_handle = {
        let sessions = Arc::clone(&state.sessions);
        let mut rx = shutdown_rx.clone();
        let interval_secs = config.session_scan_interval_secs;
        tokio::spawn(async move {
            session_expiry_worker(sessions, &mut rx, interval_secs).await;
        })
    };

    let app = routes::build_router(Arc::clone(&state));

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;

    info!(addr = %config.bind_addr, "Folio server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_tx))
        .await
        .context("server error")?;

    info!("waiting for background workers to stop");
    let _ = tokio::time::timeout(Duration::from_secs(10), session_worker_handle).await;

    info!("Folio server stopped");
    Ok(())
}

/// Initialize structured logging. `RUST_LOG` wins over `FOLIO_LOG_LEVEL`.
fn init_tracing(config: &ServerConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));

    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

/// Background worker that periodically drops expired sessions.
async fn session_expiry_worker(
    sessions: Arc<dyn SessionStore>,
    shutdown: &mut watch::Receiver<bool>,
    interval_secs: u64,
) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    info!(interval_secs, "session expiry worker started");

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let pruned = sessions.prune_expired().await;
                if pruned > 0 {
                    let remaining = sessions.count().await;
                    info!(pruned, remaining, "expired sessions pruned");
                }
            }
            _ = shutdown.changed() => {
                info!("session expiry worker shutting down");
                return;
            }
        }
    }
}

/// Wait for SIGINT or SIGTERM, then broadcast shutdown.
async fn shutdown_signal(shutdown_tx: watch::Sender<bool>) {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut sig) =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            sig.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received, stopping server");
    let _ = shutdown_tx.send(true);
}
