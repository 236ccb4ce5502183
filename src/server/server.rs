//! Engine server implementation
//!
//! This module provides the HTTP server that exposes one workspace's
//! scheduling, generation and publication operations.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::generation::{GenerationClient, GenerationOrchestrator, OrchestratorConfig};
use crate::publish::{PublicationCoordinator, SiteApiClient};
use crate::scheduler::SchedulingAssigner;
use crate::workspace::Workspace;

use super::api::create_router;
use super::config::ServerConfig;

// ============================================================================
// App State
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// The workspace this server fronts
    pub workspace: Arc<Workspace>,

    /// Spacing-policy assigner
    pub assigner: Arc<SchedulingAssigner>,

    /// Generation orchestrator
    pub orchestrator: Arc<GenerationOrchestrator>,

    /// Publication coordinator
    pub coordinator: Arc<PublicationCoordinator>,

    /// Server start time
    pub start_time: Instant,
}

impl AppState {
    /// Assemble state for a fresh workspace from engine configuration
    pub fn from_config(config: &Config) -> Result<Self, ServerError> {
        Self::with_workspace(config, Arc::new(Workspace::new()))
    }

    /// Assemble state around an existing (e.g. hydrated) workspace
    pub fn with_workspace(
        config: &Config,
        workspace: Arc<Workspace>,
    ) -> Result<Self, ServerError> {
        let assigner = SchedulingAssigner::with_config(config.assigner_config())
            .map_err(|e| ServerError::ConfigError(e.to_string()))?;

        let generation_client = GenerationClient::with_config(config.generation_config())
            .map_err(|e| ServerError::InitError(e.to_string()))?;
        let orchestrator = GenerationOrchestrator::with_config(
            workspace.clone(),
            generation_client,
            OrchestratorConfig::default().with_timeout_secs(config.generation.timeout_secs),
        );

        let site_client = SiteApiClient::with_config(config.site_client_config())
            .map_err(|e| ServerError::InitError(e.to_string()))?;
        let coordinator = PublicationCoordinator::new(workspace.clone(), site_client);

        Ok(Self {
            workspace,
            assigner: Arc::new(assigner),
            orchestrator: Arc::new(orchestrator),
            coordinator: Arc::new(coordinator),
            start_time: Instant::now(),
        })
    }
}

// ============================================================================
// Engine Server
// ============================================================================

/// Main engine API server
pub struct EngineServer {
    config: ServerConfig,
    state: AppState,
}

impl EngineServer {
    /// Create a new engine server
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Get the application state
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        let mut router = create_router(self.state.clone());

        // Add CORS layer if enabled
        if self.config.enable_cors {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        }

        // Add tracing layer if enabled
        if self.config.enable_request_logging {
            router = router.layer(TraceLayer::new_for_http());
        }

        router
    }

    /// Start the server
    pub async fn start(&self) -> Result<(), ServerError> {
        let router = self.build_router();
        let addr = self.config.bind_address;

        tracing::info!("Starting engine server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(e.to_string()))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| ServerError::ServeError(e.to_string()))?;

        Ok(())
    }

    /// Start with graceful shutdown
    pub async fn start_with_shutdown(
        &self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<(), ServerError> {
        let router = self.build_router();
        let addr = self.config.bind_address;

        tracing::info!("Starting engine server on {} (with graceful shutdown)", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(e.to_string()))?;

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| ServerError::ServeError(e.to_string()))?;

        tracing::info!("Engine server shutdown complete");
        Ok(())
    }

    /// Get server info
    pub fn info(&self) -> ServerInfo {
        ServerInfo {
            bind_address: self.config.bind_address,
            workspace_id: self.state.workspace.id(),
            cors_enabled: self.config.enable_cors,
            request_logging_enabled: self.config.enable_request_logging,
        }
    }
}

/// Server information
#[derive(Debug, Clone)]
pub struct ServerInfo {
    pub bind_address: SocketAddr,
    pub workspace_id: uuid::Uuid,
    pub cors_enabled: bool,
    pub request_logging_enabled: bool,
}

impl ServerInfo {
    /// Format as display string
    pub fn display(&self) -> String {
        format!(
            "Engine Server\n\
             {:-<40}\n\
             Bind Address: {}\n\
             Workspace: {}\n\
             CORS: {}\n\
             Request Logging: {}",
            "",
            self.bind_address,
            self.workspace_id,
            if self.cors_enabled { "enabled" } else { "disabled" },
            if self.request_logging_enabled { "enabled" } else { "disabled" }
        )
    }
}

// ============================================================================
// Server Errors
// ============================================================================

/// Server errors
#[derive(Debug, Clone)]
pub enum ServerError {
    /// Configuration error
    ConfigError(String),

    /// Initialization error
    InitError(String),

    /// Failed to bind to address
    BindError(String),

    /// Server error
    ServeError(String),
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            Self::InitError(msg) => write!(f, "Initialization error: {}", msg),
            Self::BindError(msg) => write!(f, "Failed to bind: {}", msg),
            Self::ServeError(msg) => write!(f, "Server error: {}", msg),
        }
    }
}

impl std::error::Error for ServerError {}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_from_config() {
        let config = Config::default();
        let state = AppState::from_config(&config);
        assert!(state.is_ok());
    }

    #[test]
    fn test_server_info() {
        let config = Config::default();
        let state = AppState::from_config(&config).unwrap();
        let server = EngineServer::new(ServerConfig::default(), state);
        let info = server.info();

        assert!(info.cors_enabled);
        assert_eq!(info.bind_address.port(), 8080);
    }

    #[test]
    fn test_server_with_custom_config() {
        let server_config = ServerConfig::builder()
            .enable_cors(false)
            .enable_request_logging(false)
            .build();

        let state = AppState::from_config(&Config::default()).unwrap();
        let server = EngineServer::new(server_config, state);
        let info = server.info();

        assert!(!info.cors_enabled);
        assert!(!info.request_logging_enabled);
    }

    #[tokio::test]
    async fn test_app_state_components() {
        let state = AppState::from_config(&Config::default()).unwrap();

        // Fresh workspace starts empty
        assert!(state.workspace.items().await.is_empty());
        assert!(state.workspace.sites().await.is_empty());
        assert!(state.workspace.calendar().await.is_empty());
    }
}
