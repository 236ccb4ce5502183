//! HTTP API server for the engine
//!
//! Exposes one workspace's operations over REST: keyword planning, calendar
//! reads, rescheduling, generation runs, site connection and publishing.
//! Handlers are thin wrappers over the workspace, orchestrator and
//! coordinator; all contract enforcement lives in the core.

pub mod api;
pub mod config;
pub mod server;

// Re-export main types
pub use api::{ApiResponse, ErrorResponse};
pub use config::{ServerConfig, ServerConfigBuilder};
pub use server::{AppState, EngineServer, ServerError, ServerInfo};
