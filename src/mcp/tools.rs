//! MCP Tool definitions and dispatch
//!
//! Tools are registered once, at startup, into a name-keyed dispatch table.
//! Each entry pairs the tool definition advertised in `tools/list` with the
//! typed handler that serves `tools/call`.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::McpError;
use crate::fs::operations::{CREATE_DIRECTORY, MOVE_FILE};
use crate::fs::{CreateDirectoryRequest, FileSystemTools, MoveFileRequest};
use crate::mcp::types::{CallToolResult, Tool};

/// Handler signature stored in the dispatch table
pub type ToolFn = fn(&FileSystemTools, Value) -> CallToolResult;

struct Registration {
    tool: Tool,
    handler: ToolFn,
}

/// Dispatch table mapping tool names to handlers
pub struct ToolRegistry {
    fs_tools: FileSystemTools,
    entries: BTreeMap<&'static str, Registration>,
}

impl ToolRegistry {
    /// Create a registry with the built-in filesystem tools
    pub fn new(fs_tools: FileSystemTools) -> Self {
        let mut registry = Self {
            fs_tools,
            entries: BTreeMap::new(),
        };

        registry.register(
            CREATE_DIRECTORY,
            "Creates a directory at the specified path.",
            input_schema::<CreateDirectoryRequest>(),
            handle_create_directory,
        );
        registry.register(
            MOVE_FILE,
            "Moves a file from source to destination.",
            input_schema::<MoveFileRequest>(),
            handle_move_file,
        );

        registry
    }

    /// Add a tool to the table, replacing any previous entry with that name
    pub fn register(
        &mut self,
        name: &'static str,
        description: &str,
        input_schema: Value,
        handler: ToolFn,
    ) {
        let tool = Tool {
            name: name.to_string(),
            description: Some(description.to_string()),
            input_schema,
        };
        if self.entries.insert(name, Registration { tool, handler }).is_some() {
            warn!(tool = name, "tool registered twice, keeping the latest handler");
        }
    }

    /// List all available tools, ordered by name
    pub fn list_tools(&self) -> Vec<Tool> {
        self.entries.values().map(|entry| entry.tool.clone()).collect()
    }

    /// Call a tool by name
    pub fn call_tool(&self, name: &str, args: Value) -> CallToolResult {
        match self.entries.get(name) {
            Some(entry) => {
                debug!(tool = name, "dispatching tool call");
                (entry.handler)(&self.fs_tools, args)
            }
            None => CallToolResult::error(
                McpError::UnknownTool {
                    name: name.to_string(),
                }
                .to_string(),
            ),
        }
    }
}

// ==================== Tool Handlers ====================

fn handle_create_directory(fs_tools: &FileSystemTools, args: Value) -> CallToolResult {
    match parse_args::<CreateDirectoryRequest>(args) {
        Ok(request) => CallToolResult::record(&fs_tools.create_directory(&request)),
        Err(e) => CallToolResult::error(e.to_string()),
    }
}

fn handle_move_file(fs_tools: &FileSystemTools, args: Value) -> CallToolResult {
    match parse_args::<MoveFileRequest>(args) {
        Ok(request) => CallToolResult::record(&fs_tools.move_file(&request)),
        Err(e) => CallToolResult::error(e.to_string()),
    }
}

fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T, McpError> {
    serde_json::from_value(args).map_err(|e| McpError::InvalidArguments {
        message: e.to_string(),
    })
}

// ==================== Schema Definitions ====================

fn input_schema<T: JsonSchema>() -> Value {
    serde_json::to_value(schemars::schema_for!(T))
        .unwrap_or_else(|_| json!({"type": "object", "properties": {}}))
}
