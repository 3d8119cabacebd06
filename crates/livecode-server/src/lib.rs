//! HTTP front door for the LiveCode+ editor
//!
//! Exposes the health check and the two proxy endpoints the editor calls.
//! Every handler is stateless apart from the executor's language catalog;
//! failures are caught here and turned into `{ "error": ... }` bodies so no
//! request can take the process down.

pub mod error;

pub use error::{Result, ServerError};

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::{middleware, Router};
use livecode_core::{
    Assistant, AssistantReply, AssistantRequest, ExecuteRequest, ExecutionBackend, ExecutionReport,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub execution_enabled: bool,
    pub assistant_enabled: bool,
}

/// Configuration for the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
    /// Enable request logging
    pub enable_logging: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], livecode_core::config::DEFAULT_PORT)),
            enable_cors: true,
            max_body_size: 1024 * 1024, // 1MB
            enable_logging: true,
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Parse and set the bind address from a string.
    pub fn with_bind_addr_str(mut self, addr: &str) -> Result<Self> {
        self.bind_addr = addr
            .parse()
            .map_err(|e| ServerError::config_error(format!("Invalid bind address '{}': {}", addr, e)))?;
        Ok(self)
    }

    pub fn with_cors(mut self, enable: bool) -> Self {
        self.enable_cors = enable;
        self
    }

    pub fn with_max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = size;
        self
    }

    pub fn with_logging(mut self, enable: bool) -> Self {
        self.enable_logging = enable;
        self
    }
}

/// Shared application state: the two proxies.
#[derive(Clone)]
pub struct AppState {
    pub executor: Arc<dyn ExecutionBackend>,
    pub assistant: Arc<dyn Assistant>,
}

impl AppState {
    pub fn new(executor: Arc<dyn ExecutionBackend>, assistant: Arc<dyn Assistant>) -> Self {
        Self { executor, assistant }
    }
}

/// Handler for the /api/health GET endpoint.
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().timestamp_millis(),
        execution_enabled: state.executor.is_enabled(),
        assistant_enabled: state.assistant.is_enabled(),
    })
}

/// Handler for the /api/execute POST endpoint.
async fn execute_handler(
    State(state): State<AppState>,
    body: std::result::Result<Json<ExecuteRequest>, JsonRejection>,
) -> Result<Json<ExecutionReport>> {
    let Json(request) = body.map_err(reject_body)?;
    log::info!(
        "Execute request: language={:?}, {} bytes of code, {} bytes of input",
        request.language,
        request.code.len(),
        request.input.len()
    );

    match state.executor.execute(&request).await {
        Ok(report) => {
            log::info!("Execution finished with status {}", report.status);
            Ok(Json(report))
        }
        Err(e) => {
            let err = ServerError::from(e);
            if err.status_code() < 500 {
                log::warn!("Rejected execute request ({}): {}", err.error_type(), err);
            } else {
                log::error!("/api/execute error ({}): {}", err.error_type(), err);
            }
            Err(err)
        }
    }
}

/// Handler for the /api/ai POST endpoint.
async fn assistant_handler(
    State(state): State<AppState>,
    body: std::result::Result<Json<AssistantRequest>, JsonRejection>,
) -> Result<Json<AssistantReply>> {
    let Json(request) = body.map_err(reject_body)?;
    log::info!(
        "Assistant request: {} history turns, code attached: {}",
        request.history.len(),
        request.current_code.as_deref().is_some_and(|c| !c.trim().is_empty())
    );

    match state.assistant.respond(&request).await {
        Ok(response) => Ok(Json(AssistantReply { response })),
        Err(e) => {
            let err = ServerError::from(e);
            log::error!("/api/ai error ({}): {}", err.error_type(), err);
            Err(err)
        }
    }
}

fn reject_body(rejection: JsonRejection) -> ServerError {
    let err = ServerError::from(rejection);
    log::warn!("Rejected request body ({}): {}", err.error_type(), err);
    err
}

async fn not_found_handler() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "not_found" })))
}

/// The LiveCode+ backend server.
pub struct LiveCodeServer {
    state: AppState,
    config: ServerConfig,
}

impl LiveCodeServer {
    /// Create a new server with default configuration.
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            config: ServerConfig::default(),
        }
    }

    /// Create a new server with custom configuration.
    pub fn with_config(state: AppState, config: ServerConfig) -> Self {
        Self { state, config }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the Axum router with all routes and middleware.
    pub fn build_router(&self) -> Router {
        let mut router = Router::new()
            .route("/api/health", get(health_handler))
            .route("/api/execute", post(execute_handler))
            .route("/api/ai", post(assistant_handler))
            .fallback(not_found_handler)
            .layer(DefaultBodyLimit::max(self.config.max_body_size))
            .with_state(self.state.clone());

        if self.config.enable_logging {
            router = router.layer(middleware::from_fn(
                |request: axum::http::Request<axum::body::Body>, next: axum::middleware::Next| async {
                    let request_id = uuid::Uuid::new_v4().to_string();
                    let method = request.method().clone();
                    let uri = request.uri().clone();

                    // Health probes are frequent
                    if uri.path() == "/api/health" {
                        log::debug!("Request {} {} {}", request_id, method, uri);
                    } else {
                        log::info!("Request {} {} {}", request_id, method, uri);
                    }

                    let start = std::time::Instant::now();
                    let response = next.run(request).await;
                    let duration = start.elapsed();

                    log::debug!(
                        "Response {} {} completed in {:?}",
                        request_id,
                        response.status(),
                        duration
                    );

                    response
                },
            ));
        }

        router = router.layer(TraceLayer::new_for_http());

        if self.config.enable_cors {
            router = router.layer(CorsLayer::permissive());
        }

        router
    }

    /// Start the server with graceful shutdown support.
    ///
    /// The server will shut down when the provided shutdown signal is received.
    pub async fn serve_with_shutdown<F>(self, shutdown_signal: F) -> Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let router = self.build_router();
        let listener = TcpListener::bind(self.config.bind_addr)
            .await
            .inspect_err(|e| log::error!("Failed to bind to {}: {}", self.config.bind_addr, e))?;

        log::info!(
            "Backend listening on http://{} (Judge0 {}, Gemini {})",
            self.config.bind_addr,
            if self.state.executor.is_enabled() { "enabled" } else { "disabled" },
            if self.state.assistant.is_enabled() { "enabled" } else { "disabled" },
        );

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await?;

        log::info!("Server shut down gracefully");
        Ok(())
    }
}

/// Utility function to create a shutdown signal from Ctrl+C.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            log::info!("Received Ctrl+C, shutting down...");
        },
        _ = terminate => {
            log::info!("Received SIGTERM, shutting down...");
        },
    }
}
