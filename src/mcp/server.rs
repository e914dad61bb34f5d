//! MCP Server implementation
//!
//! Implements the Model Context Protocol server for stdio transport. Requests
//! are served one at a time, in arrival order.

use serde::Deserialize;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, trace, warn};

use crate::config::Config;
use crate::error::Result;
use crate::mcp::tools::ToolRegistry;
use crate::mcp::types::*;

/// MCP Server info
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// MCP Server for the filesystem tools
pub struct McpServer {
    /// Name reported in `initialize`
    server_name: String,

    /// Tool dispatch table
    registry: ToolRegistry,

    /// Whether initialized
    initialized: bool,
}

impl McpServer {
    /// Create a new MCP server
    pub fn new(config: &Config, registry: ToolRegistry) -> Self {
        Self {
            server_name: config.server_name.clone(),
            registry,
            initialized: false,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Run the server on stdio until stdin is closed
    pub async fn run_stdio(&mut self) -> Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    /// Serve newline-delimited JSON-RPC messages from `reader`, writing
    /// responses to `writer`
    pub async fn serve<R, W>(&mut self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            trace!("Received: {}", line);

            if let Some(response) = self.handle_message(&line)? {
                let mut response_str = serde_json::to_string(&response)?;
                trace!("Sending: {}", response_str);
                response_str.push('\n');
                writer.write_all(response_str.as_bytes()).await?;
                writer.flush().await?;
            }
        }

        info!("Input stream closed, shutting down");
        Ok(())
    }

    /// Handle an incoming JSON-RPC message
    fn handle_message(&mut self, message: &str) -> Result<Option<JsonRpcResponse>> {
        let value: Value = match serde_json::from_str(message) {
            Ok(value) => value,
            Err(e) => {
                warn!("Unparseable message: {}", e);
                return Ok(Some(JsonRpcResponse::error(
                    None,
                    JsonRpcError::parse_error(e.to_string()),
                )));
            }
        };

        // Valid JSON that is not a request shape
        let request = match JsonRpcRequest::deserialize(&value) {
            Ok(req) => req,
            Err(e) => {
                warn!("Malformed request: {}", e);
                let id = value.get("id").and_then(|id| RequestId::deserialize(id).ok());
                return Ok(Some(JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_request(e.to_string()),
                )));
            }
        };

        if request.jsonrpc != JSONRPC_VERSION {
            return Ok(Some(JsonRpcResponse::error(
                request.id,
                JsonRpcError::invalid_request(format!(
                    "Unsupported JSON-RPC version: {}",
                    request.jsonrpc
                )),
            )));
        }

        if request.is_notification() {
            self.handle_notification(&request);
            return Ok(None);
        }

        // Handle the request
        let response = match request.method.as_str() {
            methods::INITIALIZE => {
                let result = self.handle_initialize(&request)?;
                JsonRpcResponse::success(request.id, result)
            }
            methods::PING => JsonRpcResponse::success(request.id, serde_json::json!({})),
            methods::LIST_TOOLS => {
                let result = self.handle_list_tools()?;
                JsonRpcResponse::success(request.id, result)
            }
            methods::CALL_TOOL => {
                let result = self.handle_call_tool(&request)?;
                JsonRpcResponse::success(request.id, result)
            }
            _ => JsonRpcResponse::error(request.id, JsonRpcError::method_not_found(&request.method)),
        };

        Ok(Some(response))
    }

    fn handle_notification(&mut self, request: &JsonRpcRequest) {
        match request.method.as_str() {
            methods::INITIALIZED => {
                self.initialized = true;
                info!("Client initialization complete");
            }
            other => debug!(method = other, "Ignoring notification"),
        }
    }

    /// Handle initialize request
    fn handle_initialize(&self, request: &JsonRpcRequest) -> Result<Value> {
        if let Some(params) = request.params.clone() {
            match serde_json::from_value::<InitializeParams>(params) {
                Ok(params) => info!(
                    client = %params.client_info.name,
                    client_version = %params.client_info.version,
                    protocol = %params.protocol_version,
                    "Initializing session"
                ),
                Err(e) => debug!("Initialize params not understood: {}", e),
            }
        }

        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            server_info: ServerInfo {
                name: self.server_name.clone(),
                version: SERVER_VERSION.to_string(),
            },
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {}),
            },
        };

        Ok(serde_json::to_value(result)?)
    }

    /// Handle list tools request
    fn handle_list_tools(&self) -> Result<Value> {
        let result = ListToolsResult {
            tools: self.registry.list_tools(),
        };

        Ok(serde_json::to_value(result)?)
    }

    /// Handle call tool request
    fn handle_call_tool(&self, request: &JsonRpcRequest) -> Result<Value> {
        if !self.initialized {
            warn!("tools/call received before initialization completed");
        }

        let result = match request.params.clone() {
            Some(p) => match serde_json::from_value::<CallToolParams>(p) {
                Ok(params) => self.registry.call_tool(&params.name, params.arguments),
                Err(e) => CallToolResult::error(format!("Invalid tool parameters: {}", e)),
            },
            None => CallToolResult::error("Missing tool parameters"),
        };

        Ok(serde_json::to_value(result)?)
    }
}
