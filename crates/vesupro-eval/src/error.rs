//! Dispatch-time errors.
//!
//! Each variant mirrors one error return of a generated dispatcher. None of
//! them is ever raised as a panic.

use thiserror::Error;
use vesupro_types::WireKind;

/// Why a call could not be dispatched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    /// The model has no dispatcher for this receiver type.
    #[error("vesupro: no dispatcher for receiver {receiver}")]
    UnknownReceiver { receiver: String },

    #[error("vesupro: unknown method {method:?}")]
    UnknownMethod { method: String },

    /// A token other than the separator stood between two arguments.
    #[error("vesupro: method {method}: expected COMMA before parameter {position}, got {found}")]
    SeparatorMismatch {
        method: String,
        position: usize,
        found: WireKind,
    },

    #[error("vesupro: method {method}: parameter {position} of type {type_name}: expected {}, got {found}", expected_list(.expected))]
    TokenKindMismatch {
        method: String,
        position: usize,
        type_name: String,
        expected: Vec<WireKind>,
        found: WireKind,
    },

    /// Listed arguments only: wrong argument count.
    #[error("vesupro: method {method}: expected {expected} arguments, got {found}")]
    ArityMismatch {
        method: String,
        expected: usize,
        found: usize,
    },

    /// Token text could not be converted, or an aggregate rejected its payload.
    #[error("vesupro: method {method}: failed to parse {text:?} as type {type_name}: {reason}")]
    ConversionFailure {
        method: String,
        position: usize,
        type_name: String,
        text: String,
        reason: String,
    },

    /// The invoked method itself returned an error.
    #[error("{message}")]
    MethodFailure { method: String, message: String },
}

fn expected_list(kinds: &[WireKind]) -> String {
    match kinds {
        [single] => single.to_string(),
        many => format!(
            "one of {}",
            many.iter().map(WireKind::to_string).collect::<Vec<_>>().join(", ")
        ),
    }
}

pub type DispatchResult<T> = Result<T, DispatchError>;
