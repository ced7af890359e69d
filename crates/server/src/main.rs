//! Origin server entry point.
//!
//! Serves the app shell, static assets and the health endpoint. Logs go to
//! stderr as JSON.

use anyhow::{Context, Result};
use cendres_core::AppConfig;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod error;
mod routes;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    let addr = format!("{}:{}", config.server.bind, config.server.port);

    let router = routes::create_router(&config);
    let listener = TcpListener::bind(&addr).await.with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(
        %addr,
        service = %config.app_name,
        public_dir = %config.server.public_dir.display(),
        "origin server listening"
    );

    axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

    tracing::info!("origin server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for ctrl-c");
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
                tracing::warn!(error = %e, "failed to listen for SIGTERM");
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
    tracing::info!("shutdown signal received");
}
