//! Qonto MCP Library
//!
//! Model Context Protocol server for the Qonto business banking API.

pub mod auth;
pub mod config;
pub mod mcp;
pub mod qonto;

pub use auth::ApiKeyAuth;
pub use config::{Config, RuntimeConfig};
pub use mcp::QontoMcpServer;
pub use qonto::{QontoClient, QontoError, QueryParams};
