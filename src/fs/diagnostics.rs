//! Diagnostic sinks for failed operations
//!
//! Handlers report failures through a [`DiagnosticSink`] handed to them by the
//! caller instead of a global logger. What a sink does with a report never
//! changes the result returned to the host.

use std::sync::Mutex;

/// Destination for failure reports from the filesystem handlers
pub trait DiagnosticSink: Send + Sync {
    /// Record that `operation` failed; `context` names the paths involved
    fn operation_failed(&self, operation: &str, context: &str, error: &str);
}

/// Forwards failure reports to `tracing` at error level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn operation_failed(&self, operation: &str, context: &str, error: &str) {
        tracing::error!(operation, "{}: {}", context, error);
    }
}

/// A single recorded failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub operation: String,
    pub context: String,
    pub error: String,
}

/// Keeps failure reports in memory, for inspection in tests
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<Diagnostic>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far
    pub fn entries(&self) -> Vec<Diagnostic> {
        match self.entries.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

impl DiagnosticSink for MemorySink {
    fn operation_failed(&self, operation: &str, context: &str, error: &str) {
        let diagnostic = Diagnostic {
            operation: operation.to_string(),
            context: context.to_string(),
            error: error.to_string(),
        };
        match self.entries.lock() {
            Ok(mut entries) => entries.push(diagnostic),
            Err(poisoned) => poisoned.into_inner().push(diagnostic),
        }
    }
}
