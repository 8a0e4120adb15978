//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, limits, request ID, CORS)
//! - Own the shared state: outbound transport and request log
//! - Bind server to listener and shut down gracefully

use axum::Router;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    cors::CorsLayer, limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer,
};

use crate::config::{DevFetchConfig, StorageConfig};
use crate::history::{setup_history_router, LogStore};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::proxy::setup_proxy_router;
use crate::transport::{HttpTransport, TransportError};

/// Application state injected into handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Outbound client bounded by the proxy budget.
    pub transport: HttpTransport,
    /// Request log; `None` when storage is disabled or failed to load.
    pub history: Option<LogStore>,
    /// Default User-Agent for `/api/external`.
    pub user_agent: String,
}

impl AppState {
    pub fn from_config(config: &DevFetchConfig) -> Result<Self, TransportError> {
        let transport = HttpTransport::new(
            Duration::from_secs(config.proxy.timeout_secs),
            config.proxy.max_redirects,
        )?;
        Ok(Self {
            transport,
            history: open_store(&config.storage),
            user_agent: config.proxy.user_agent.clone(),
        })
    }
}

/// Open the request log. A file that cannot be read leaves the server
/// running without history rather than failing startup.
fn open_store(config: &StorageConfig) -> Option<LogStore> {
    if !config.enabled {
        tracing::info!("Request history storage disabled");
        return None;
    }
    match &config.path {
        None => Some(LogStore::new(None, config.list_limit)),
        Some(path) => match LogStore::load_from_file(path, config.list_limit) {
            Ok(store) => Some(store),
            Err(e) => {
                tracing::warn!(
                    path = ?path,
                    error = %e,
                    "Request log unavailable. Running without history features"
                );
                None
            }
        },
    }
}

/// HTTP server for the proxy service.
pub struct HttpServer {
    router: Router,
    config: DevFetchConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: DevFetchConfig) -> Result<Self, TransportError> {
        let state = AppState::from_config(&config)?;
        Ok(Self::with_state(config, state))
    }

    /// Create a server around prepared state.
    pub fn with_state(config: DevFetchConfig, state: AppState) -> Self {
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &DevFetchConfig, state: AppState) -> Router {
        Router::new()
            .merge(setup_proxy_router())
            .merge(setup_history_router())
            .with_state(state)
            .layer(CorsLayer::permissive())
            .layer(RequestBodyLimitLayer::new(config.listener.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.listener.request_timeout_secs,
            )))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until Ctrl+C or a shutdown broadcast.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = crate::lifecycle::signals::ctrl_c() => {}
                    _ = shutdown.recv() => {
                        tracing::info!("Shutdown requested");
                    }
                }
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &DevFetchConfig {
        &self.config
    }
}
