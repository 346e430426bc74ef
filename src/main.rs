//! Qonto MCP Server
//!
//! Entry point for the MCP server binary.
//! Implements MCP protocol over stdio using JSON-RPC 2.0.

use anyhow::Context;
use futures::{SinkExt, StreamExt};
use qonto_mcp_server::auth::ApiKeyAuth;
use qonto_mcp_server::config::{Config, ConfigError};
use qonto_mcp_server::mcp::{handle_message, JsonRpcResponse, QontoMcpServer, PARSE_ERROR};
use qonto_mcp_server::qonto::QontoClient;
use std::io;
use std::sync::Arc;
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec, LinesCodecError};
use tracing_subscriber::EnvFilter;

/// Upper bound for a single JSON-RPC message
const MAX_MESSAGE_BYTES: usize = 8 * 1024 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging to stderr (MCP uses stdout for protocol)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    tracing::info!("Starting Qonto MCP Server...");

    let server = build_server()?;

    tracing::info!("MCP Server ready, listening on stdio...");

    run_stdio_loop(server).await
}

/// Build the server from configuration.
///
/// Missing credentials do not abort startup: the client still gets a tool
/// list and a clear error on each call.
fn build_server() -> anyhow::Result<QontoMcpServer> {
    let config = Config::load_default().context("Failed to load configuration")?;

    let runtime_config = match config.to_runtime() {
        Ok(rc) => rc,
        Err(e @ ConfigError::MissingCredentials(_)) => {
            tracing::warn!("{}; starting without a Qonto client", e);
            return Ok(QontoMcpServer::unconfigured(e.to_string()));
        }
        Err(e) => return Err(e).context("Invalid configuration"),
    };

    tracing::info!(
        "Configured for {} as {}",
        runtime_config.base_url,
        runtime_config.api_identifier
    );

    let auth = ApiKeyAuth::from_config(&runtime_config)?;
    let client = QontoClient::new(&auth, &runtime_config).context("Failed to build HTTP client")?;

    Ok(QontoMcpServer::new(Arc::new(client)))
}

async fn run_stdio_loop(server: QontoMcpServer) -> anyhow::Result<()> {
    let mut reader = FramedRead::new(
        tokio::io::stdin(),
        LinesCodec::new_with_max_length(MAX_MESSAGE_BYTES),
    );
    let mut writer = FramedWrite::new(tokio::io::stdout(), LinesCodec::new());

    while let Some(line) = reader.next().await {
        let response = match line {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                tracing::debug!("Received: {}", line);
                handle_message(&server, &line).await
            }
            Err(LinesCodecError::Io(e)) => return Err(e).context("Failed to read from stdin"),
            Err(e) => {
                tracing::warn!("Discarding unreadable message: {}", e);
                Some(JsonRpcResponse::error(
                    None,
                    PARSE_ERROR,
                    &format!("Parse error: {}", e),
                ))
            }
        };

        if let Some(response) = response {
            send_response(&mut writer, &response).await?;
        }
    }

    tracing::info!("stdin closed, shutting down");
    Ok(())
}

async fn send_response(
    writer: &mut FramedWrite<tokio::io::Stdout, LinesCodec>,
    response: &JsonRpcResponse,
) -> anyhow::Result<()> {
    let json = serde_json::to_string(response)?;
    tracing::debug!("Sending: {}", json);
    writer.send(json).await.context("Failed to write to stdout")?;
    Ok(())
}
