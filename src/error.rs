//! # Error — Failure Taxonomy for the Search Engine
//!
//! Every failure the engine can surface to its caller. Configuration problems
//! are rejected up front as [`SearchError::Domain`]; a failure inside a chunk
//! is fatal and carries the chunk range so the run can be reproduced.
//! Cancellation is not an error and never appears here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    /// Invalid input or configuration value. Never silently clamped.
    #[error("invalid {field}: {reason}")]
    Domain { field: &'static str, reason: String },

    /// The search cursor would wrap past `u64::MAX`.
    #[error("search cursor overflow: cannot reserve {span} values after n = {cursor}")]
    CursorOverflow { cursor: u64, span: u64 },

    /// The worker pool could not be built.
    #[error("failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    /// A chunk computation failed. Fatal; chunks are never retried.
    #[error("chunk [{start}, {end}) failed: {message}")]
    ChunkFailed { start: u64, end: u64, message: String },

    /// A worker disappeared without reporting its chunk.
    #[error("worker pool hung up with {outstanding} chunk(s) outstanding")]
    WorkerLost { outstanding: usize },
}

impl SearchError {
    pub fn domain(field: &'static str, reason: impl Into<String>) -> Self {
        SearchError::Domain {
            field,
            reason: reason.into(),
        }
    }
}
