//! MCP (Model Context Protocol) module
//!
//! JSON-RPC wire types, the stdio server loop, and the tool dispatch table.

pub mod server;
pub mod tools;
pub mod types;
