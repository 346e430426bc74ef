//! MCP Server implementation for Qonto
//!
//! Exposes read-only tools over the Qonto business banking API

use crate::mcp::protocol::*;
use crate::mcp::tools::{find_tool, TOOLS};
use crate::qonto::QontoClient;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// MCP Server for Qonto
pub struct QontoMcpServer {
    client: Option<Arc<QontoClient>>,
    /// Why `client` is missing, reported on every tool call
    setup_error: Option<String>,
}

impl QontoMcpServer {
    /// Create a new MCP server instance
    pub fn new(client: Arc<QontoClient>) -> Self {
        Self {
            client: Some(client),
            setup_error: None,
        }
    }

    /// Server that lists tools but cannot call Qonto, typically because
    /// credentials are missing
    pub fn unconfigured(reason: impl Into<String>) -> Self {
        Self {
            client: None,
            setup_error: Some(reason.into()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    /// Get list of available tools
    pub fn get_tools(&self) -> Vec<Tool> {
        Self::get_tools_static()
    }

    /// Get list of available tools (static version for unconfigured server)
    pub fn get_tools_static() -> Vec<Tool> {
        TOOLS.iter().map(|t| t.to_tool()).collect()
    }

    /// Text sent back in the initialize result
    pub fn instructions(&self) -> String {
        match (&self.client, &self.setup_error) {
            (Some(client), _) => format!(
                "Read-only access to the Qonto API at {}{}. Identifiers returned by list tools \
                 can be passed to the matching retrieve tools.",
                client.base_url(),
                if client.is_sandbox() { " (sandbox)" } else { "" }
            ),
            (None, Some(reason)) => format!("Server is not configured: {}", reason),
            (None, None) => "Server is not configured".to_string(),
        }
    }

    /// Handle a tool call
    pub async fn call_tool(&self, name: &str, args: &HashMap<String, Value>) -> CallToolResult {
        let Some(spec) = find_tool(name) else {
            return CallToolResult::error(format!("Unknown tool: {}", name));
        };

        let Some(client) = &self.client else {
            return CallToolResult::error(format!(
                "Qonto client is not configured: {}",
                self.setup_error.as_deref().unwrap_or("unknown reason")
            ));
        };

        let request = match spec.resolve(args) {
            Ok(request) => request,
            Err(e) => return CallToolResult::error(e.to_string()),
        };

        tracing::info!("Calling tool {}", name);

        match client.get(request.segments.as_slice(), &request.query).await {
            Ok(Value::Null) => CallToolResult::text(format!("{} succeeded with no content", name)),
            Ok(body) => {
                let json = serde_json::to_string_pretty(&body).unwrap_or_else(|_| body.to_string());
                CallToolResult::text(json)
            }
            Err(e) => {
                tracing::warn!("Tool {} failed: {}", name, e);
                CallToolResult::error(format!("Error calling {}: {}", name, e))
            }
        }
    }
}
