//! Filesystem operations exposed as tools
//!
//! Directory creation and move, plus the request/result records and the
//! diagnostic sinks they report through.

pub mod diagnostics;
pub mod operations;
pub mod types;

pub use diagnostics::{DiagnosticSink, MemorySink, TracingSink};
pub use operations::FileSystemTools;
pub use types::{CreateDirectoryRequest, MoveFileRequest, OperationResult};
