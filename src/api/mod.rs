//! HTTP API server
//!
//! JSON endpoints for players, matches and the leaderboard, next to the
//! health and Prometheus metrics endpoints, served with Axum.

pub mod handlers;

use crate::service::app::AppState;
use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{info, warn};

pub use handlers::{ApiError, CreatePlayerBody, RegisterMatchBody};

/// Build the router for all ladder endpoints
pub fn router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::root_handler))
        .route("/health", get(handlers::health_handler))
        .route("/live", get(handlers::live_handler))
        .route("/ready", get(handlers::ready_handler))
        .route("/metrics", get(handlers::metrics_handler))
        .route(
            "/players",
            get(handlers::list_players).post(handlers::create_player),
        )
        .route("/players/{id}", get(handlers::player_profile))
        .route("/players/{id}/matches", get(handlers::player_matches))
        .route("/leaderboard", get(handlers::leaderboard))
        .route("/matches", post(handlers::register_match))
        .route("/matches/recent", get(handlers::recent_matches))
        .with_state(app_state)
}

/// HTTP server that serves the ladder API until stopped
pub struct HttpServer {
    app_state: Arc<AppState>,
    shutdown_tx: broadcast::Sender<()>,
}

impl HttpServer {
    pub fn new(app_state: Arc<AppState>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            app_state,
            shutdown_tx,
        }
    }

    /// Bind the configured address and serve until [`Self::stop`] is called
    pub async fn start(&self) -> Result<()> {
        let addr: SocketAddr = self
            .app_state
            .config()
            .http_address()
            .parse()
            .context("Invalid HTTP server address")?;

        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;

        self.serve(listener).await
    }

    /// Serve on an already bound listener
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        let addr = listener.local_addr()?;
        let app = router(self.app_state.clone());

        info!("HTTP server listening on http://{}", addr);

        let mut shutdown_rx = self.shutdown_tx.subscribe();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
                info!("HTTP server shutdown signal received");
            })
            .await?;

        info!("HTTP server stopped");
        Ok(())
    }

    /// Stop the HTTP server
    pub fn stop(&self) {
        info!("Stopping HTTP server...");

        if let Err(e) = self.shutdown_tx.send(()) {
            warn!("Failed to send shutdown signal to HTTP server: {}", e);
        }
    }
}
