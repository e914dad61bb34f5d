//! Error types for the filesystem tools MCP server
//!
//! Filesystem failures inside a tool call never surface here: they are turned
//! into an `OperationResult` at the handler boundary. These types cover
//! startup, configuration and transport failures.

use thiserror::Error;

/// Main error type for the filesystem tools MCP server
#[derive(Error, Debug)]
pub enum FsToolsError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// MCP protocol errors
    #[error("MCP protocol error: {0}")]
    Mcp(#[from] McpError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine the home directory of the invoking user")]
    HomeDirNotFound,
}

/// MCP protocol errors
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("Invalid tool arguments: {message}")]
    InvalidArguments { message: String },
}

/// Result type alias for server operations
pub type Result<T> = std::result::Result<T, FsToolsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = McpError::UnknownTool {
            name: "delete_everything".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown tool: delete_everything");
    }

    #[test]
    fn test_error_conversion() {
        let err: FsToolsError = ConfigError::HomeDirNotFound.into();
        assert!(matches!(err, FsToolsError::Config(_)));
        assert!(err.to_string().starts_with("Configuration error:"));

        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "stdout closed");
        let err: FsToolsError = io.into();
        assert!(matches!(err, FsToolsError::Io(_)));
    }
}
