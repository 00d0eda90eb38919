//! Browser UI and JSON API over the conversion pipeline.
//!
//! | Method | Path           | Response                                   |
//! |--------|----------------|--------------------------------------------|
//! | GET    | `/`            | upload page                                |
//! | POST   | `/convert`     | multipart `files` → HTML results page      |
//! | POST   | `/api/convert` | multipart `files` → JSON [`BatchReport`]   |
//! | GET    | `/health`      | engine name and readiness                  |
//!
//! Each request runs its own sequential batch; the engine and configuration
//! are shared read-only through [`AppState`].
//!
//! [`BatchReport`]: crate::output::BatchReport

mod handlers;
mod views;

use crate::config::ReaderConfig;
use crate::engine::ConversionEngine;
use crate::error::DocReaderError;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

pub use handlers::extract_uploads;

/// Shared state for every request.
pub struct AppState {
    pub engine: Arc<dyn ConversionEngine>,
    pub config: ReaderConfig,
    /// Set when the startup probe of the engine failed.
    pub engine_error: Option<String>,
}

impl AppState {
    /// Probe the engine once and build the state.
    ///
    /// A failed probe is logged and shown on the upload page; the server
    /// still starts.
    pub fn new(engine: Arc<dyn ConversionEngine>, config: ReaderConfig) -> Self {
        let engine_error = match engine.check() {
            Ok(()) => None,
            Err(e) => {
                error!("Failed to initialize conversion engine: {}", e);
                Some(e.to_string())
            }
        };
        Self {
            engine,
            config,
            engine_error,
        }
    }
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_request_bytes;
    Router::new()
        .route("/", get(handlers::index))
        .route("/convert", post(handlers::convert_page))
        .route("/api/convert", post(handlers::convert_json))
        .route("/health", get(handlers::health))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl+C / SIGTERM.
pub async fn serve(addr: &str, state: Arc<AppState>) -> Result<(), DocReaderError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| DocReaderError::Server {
            addr: addr.to_string(),
            source: e,
        })?;

    info!(
        addr = %addr,
        engine = %state.engine.name(),
        engine_ready = state.engine_error.is_none(),
        max_file_mb = state.config.max_file_bytes / 1024 / 1024,
        "Server ready and accepting connections"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| DocReaderError::Server {
            addr: addr.to_string(),
            source: e,
        })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
