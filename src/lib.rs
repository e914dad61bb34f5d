//! Filesystem Tools MCP Server Library
//!
//! A Model Context Protocol (MCP) server exposing directory creation and
//! file moves to a tool-invocation host over stdio.

pub mod config;
pub mod error;
pub mod fs;
pub mod mcp;

pub use config::Config;
pub use error::{FsToolsError, Result};
