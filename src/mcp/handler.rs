//! JSON-RPC request dispatch
//!
//! Maps MCP methods onto [`QontoMcpServer`]. Kept out of the binary so the
//! protocol can be exercised in tests without stdio.

use crate::mcp::protocol::*;
use crate::mcp::server::QontoMcpServer;
use serde_json::{json, Value};

pub const SERVER_NAME: &str = "qonto-mcp-server";
pub const SERVER_TITLE: &str = "Qonto MCP Server";

/// Parse one line from the transport and handle it.
///
/// Returns `None` when nothing must be written back (notifications).
pub async fn handle_message(server: &QontoMcpServer, line: &str) -> Option<JsonRpcResponse> {
    let value: Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => {
            return Some(JsonRpcResponse::error(
                None,
                PARSE_ERROR,
                &format!("Parse error: {}", e),
            ))
        }
    };

    if value.is_array() {
        return Some(JsonRpcResponse::error(
            None,
            INVALID_REQUEST,
            "Batch requests are not supported",
        ));
    }

    let id = value.get("id").cloned();
    let request: JsonRpcRequest = match serde_json::from_value(value) {
        Ok(req) => req,
        Err(e) => {
            return Some(JsonRpcResponse::error(
                id,
                INVALID_REQUEST,
                &format!("Invalid request: {}", e),
            ))
        }
    };

    handle_request(server, request).await
}

/// Handle a parsed request
pub async fn handle_request(
    server: &QontoMcpServer,
    request: JsonRpcRequest,
) -> Option<JsonRpcResponse> {
    if request.is_notification() {
        tracing::debug!("Notification: {}", request.method);
        return None;
    }

    let id = request.id.clone();

    let response = match request.method.as_str() {
        "initialize" => {
            let params: InitializeParams = request
                .params
                .and_then(|p| serde_json::from_value(p).ok())
                .unwrap_or_default();

            if let Some(ref client) = params.client_info {
                tracing::info!(
                    "Client connected: {} {}",
                    client.name,
                    client.version.as_deref().unwrap_or("")
                );
            }

            let result = InitializeResult {
                protocol_version: negotiate_protocol_version(params.protocol_version.as_deref())
                    .to_string(),
                capabilities: ServerCapabilities {
                    tools: Some(ToolsCapability {
                        list_changed: Some(false),
                    }),
                },
                server_info: ServerInfo {
                    name: SERVER_NAME.to_string(),
                    title: Some(SERVER_TITLE.to_string()),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                },
                instructions: Some(server.instructions()),
            };
            to_response(id, &result)
        }

        "ping" => JsonRpcResponse::success(id, json!({})),

        "tools/list" => {
            let result = ListToolsResult {
                tools: server.get_tools(),
            };
            to_response(id, &result)
        }

        "tools/call" => {
            let params: CallToolParams = match request.params {
                Some(p) => match serde_json::from_value(p) {
                    Ok(params) => params,
                    Err(e) => {
                        return Some(JsonRpcResponse::error(
                            id,
                            INVALID_PARAMS,
                            &format!("Invalid params: {}", e),
                        ));
                    }
                },
                None => {
                    return Some(JsonRpcResponse::error(id, INVALID_PARAMS, "Missing params"));
                }
            };

            let args = params.arguments.unwrap_or_default();
            let result = server.call_tool(&params.name, &args).await;
            to_response(id, &result)
        }

        _ => JsonRpcResponse::error(
            id,
            METHOD_NOT_FOUND,
            &format!("Method not found: {}", request.method),
        ),
    };

    Some(response)
}

fn to_response<T: serde::Serialize>(id: Option<Value>, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(
            id,
            INTERNAL_ERROR,
            &format!("Failed to serialize result: {}", e),
        ),
    }
}
