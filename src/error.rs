//! Error types for synthloop
//!
//! Centralized error handling using thiserror. Expected loop outcomes are
//! never errors; these cover collaborator plumbing (LLM calls, templates, I/O).

use thiserror::Error;

/// All error types that can occur in synthloop
#[derive(Debug, Error)]
pub enum SynthloopError {
    /// Invalid state or precondition
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// LLM API error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Prompt template could not be rendered
    #[error("Template error: {0}")]
    Template(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for synthloop operations
pub type Result<T> = std::result::Result<T, SynthloopError>;
