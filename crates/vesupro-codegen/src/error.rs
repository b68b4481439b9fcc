//! Codegen error types.

use thiserror::Error;

/// Errors that can occur while rendering dispatchers.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// A non-aggregate parameter has no token kind it could be scanned as.
    #[error("{receiver}.{method}: parameter {position} of type {type_name} accepts no token kinds")]
    NoAcceptedKinds {
        receiver: String,
        method: String,
        position: usize,
        type_name: String,
    },

    /// An internal consistency check failed.
    #[error("internal codegen error: {0}")]
    Internal(String),
}

/// Codegen result type alias.
pub type CodegenResult<T> = Result<T, CodegenError>;
