//! Error types for phylostream

use thiserror::Error;

/// Result type alias for phylostream operations
pub type Result<T> = std::result::Result<T, PhyloStreamError>;

/// Error types that can occur in phylostream
#[derive(Debug, Error)]
pub enum PhyloStreamError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// `next()` or `peek()` was called while `has_next()` is false
    ///
    /// Raised only by the pull reader's iteration methods. Consumers that
    /// want the non-raising form should use `next_of_type()`, which returns
    /// `Ok(None)` on exhaustion instead.
    #[error("No more events: the event stream is exhausted or closed")]
    EndOfStream,

    /// A data adapter declared a cross-reference that does not resolve
    #[error("Inconsistent adapter data: {msg}")]
    InconsistentAdapterData {
        /// Description of the unresolved reference
        msg: String,
    },

    /// An event producer violated the engine's progress contract
    ///
    /// A `produce_more()` call returned `Continue` without appending a single
    /// event to any sink. This indicates a bug in a format reader, not a
    /// problem with the input data, and is fatal to the read.
    #[error("Event producer made no progress: {msg}")]
    InternalInvariant {
        /// Description of the violated invariant
        msg: String,
    },

    /// Invalid argument or configuration value
    #[error("Invalid input: {msg}")]
    InvalidInput {
        /// Error message
        msg: String,
    },

    /// Malformed input reported by a format-specific reader
    #[error("Format error at line {line}: {msg}")]
    Format {
        /// Line number where the error occurred
        line: usize,
        /// Error message
        msg: String,
    },
}
