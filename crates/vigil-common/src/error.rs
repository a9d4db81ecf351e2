//! Error types for Vigil.

use thiserror::Error;

/// Top-level error type for Vigil operations.
///
/// Subsystem crates keep their own error enums; this one wraps whatever
/// crosses into the binary.
#[derive(Debug, Error)]
pub enum VigilError {
    /// Snapshot persistence failed
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// A command was rejected by the simulation
    #[error("Command rejected: {0}")]
    Command(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Vigil operations.
pub type VigilResult<T> = Result<T, VigilError>;
