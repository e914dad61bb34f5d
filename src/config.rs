//! Configuration for the filesystem tools MCP server
//!
//! There are no config files. The only runtime state is the invoking user's
//! home directory, resolved once at startup.

use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

/// Name advertised to the host during `initialize`
pub const SERVER_NAME: &str = "FileSystemTools";

/// Configuration for the filesystem tools MCP server
#[derive(Debug, Clone)]
pub struct Config {
    /// Home directory of the invoking user
    pub home_dir: PathBuf,

    /// Server name reported in `initialize`
    pub server_name: String,
}

impl Config {
    /// Create a configuration for the current user
    pub fn new() -> Result<Self> {
        let home_dir = dirs::home_dir().ok_or(ConfigError::HomeDirNotFound)?;
        Ok(Self::with_home_dir(home_dir))
    }

    /// Create a configuration rooted at an explicit home directory
    pub fn with_home_dir(home_dir: impl Into<PathBuf>) -> Self {
        Self {
            home_dir: home_dir.into(),
            server_name: SERVER_NAME.to_string(),
        }
    }

    pub fn home_dir(&self) -> &Path {
        &self.home_dir
    }
}
