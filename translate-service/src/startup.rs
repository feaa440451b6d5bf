//! Application startup and lifecycle management.

use axum::middleware::from_fn;
use axum::{
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::tracing::{request_id_middleware, request_span};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::handlers;
use crate::services::GeminiClient;

/// Shared application state. Immutable after startup; the handlers hold no
/// other state across requests.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub gemini: GeminiClient,
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    ///
    /// A missing Gemini key is not fatal here: the service boots and every
    /// proxy request fails uniformly until the key is provided.
    pub async fn build(config: Config) -> Result<Self, AppError> {
        let gemini = GeminiClient::new(config.gemini.clone());
        if gemini.is_configured() {
            tracing::info!(model = %config.gemini.model, "Gemini client initialized");
        } else {
            tracing::warn!("Gemini API key not configured - all proxy requests will fail");
        }

        let state = AppState {
            config: config.clone(),
            gemini,
        };

        // Port 0 = random port for testing
        let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|e| {
                tracing::error!("Invalid server address: {}", e);
                AppError::ConfigError(anyhow::anyhow!("invalid server address: {}", e))
            })?;
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = Router::new()
            .route("/health", get(handlers::health_check))
            .route("/ready", get(handlers::readiness_check))
            .route(
                "/api/translate",
                post(handlers::translate).fallback(handlers::method_not_allowed),
            )
            .route(
                "/api/phrase",
                post(handlers::phrase).fallback(handlers::method_not_allowed),
            )
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(|request: &axum::http::Request<_>| request_span(request)),
            )
            .layer(from_fn(request_id_middleware))
            .with_state(self.state);

        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

/// Resolve on ctrl-c or SIGTERM so in-flight requests can drain.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .unwrap_or_else(|e| tracing::error!("Failed to listen for ctrl-c: {}", e));
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("Failed to listen for SIGTERM: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}
