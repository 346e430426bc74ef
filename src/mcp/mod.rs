//! MCP Server implementation for Qonto
//!
//! Exposes the Qonto API as Model Context Protocol tools

pub mod handler;
pub mod protocol;
mod server;
pub mod tools;

pub use handler::{handle_message, handle_request};
pub use protocol::*;
pub use server::QontoMcpServer;
pub use tools::{find_tool, ArgumentError, ToolSpec, TOOLS};
