//! Request and result records for the filesystem operations

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Arguments of the `create_directory` tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
pub struct CreateDirectoryRequest {
    /// Full path where the directory should be created
    #[validate(length(min = 1, message = "path must not be empty"))]
    pub path: String,
}

/// Arguments of the `move_file` tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
pub struct MoveFileRequest {
    /// Existing file or directory to move
    #[validate(length(min = 1, message = "source must not be empty"))]
    pub source: String,

    /// Target path; missing parent directories are created
    #[validate(length(min = 1, message = "destination must not be empty"))]
    pub destination: String,
}

/// Uniform outcome of every filesystem operation.
///
/// `message` is set iff `success` is true, `error` iff it is false. Use the
/// constructors rather than building the struct by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationResult {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OperationResult {
    /// Create a success result
    pub fn succeeded(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            error: None,
        }
    }

    /// Create a failure result
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
        }
    }

    /// Whether exactly one of `message`/`error` is populated, matching `success`
    pub fn is_well_formed(&self) -> bool {
        match (self.success, &self.message, &self.error) {
            (true, Some(_), None) | (false, None, Some(_)) => true,
            _ => false,
        }
    }
}
