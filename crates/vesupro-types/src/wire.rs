//! Wire token vocabulary shared with the vesupro runtime.
//!
//! The tokenizer itself lives in the Go runtime package; generated code
//! only refers to its kind constants, and the reference dispatcher in
//! `vesupro-eval` consumes already-classified [`WireToken`]s.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classified kind of a wire token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WireKind {
    Integer,
    Float,
    String,
    True,
    False,
    Null,
    /// Argument separator.
    Separator,
    /// A structured payload handed to an aggregate's own decoder.
    Object,
    /// End of the argument stream.
    End,
}

impl WireKind {
    /// Name of the kind constant in the Go runtime package (`vesupro.INT`).
    pub fn go_name(self) -> &'static str {
        match self {
            WireKind::Integer => "INT",
            WireKind::Float => "FLOAT",
            WireKind::String => "STRING",
            WireKind::True => "TRUE",
            WireKind::False => "FALSE",
            WireKind::Null => "NULL",
            WireKind::Separator => "COMMA",
            WireKind::Object => "OBJECT",
            WireKind::End => "EOF",
        }
    }
}

impl fmt::Display for WireKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.go_name())
    }
}

/// A classified wire token: its kind plus the raw text it was scanned from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireToken {
    pub kind: WireKind,
    pub text: String,
}

impl WireToken {
    pub fn new(kind: WireKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn integer(text: impl Into<String>) -> Self {
        Self::new(WireKind::Integer, text)
    }

    pub fn float(text: impl Into<String>) -> Self {
        Self::new(WireKind::Float, text)
    }

    pub fn string(text: impl Into<String>) -> Self {
        Self::new(WireKind::String, text)
    }

    pub fn boolean(value: bool) -> Self {
        if value {
            Self::new(WireKind::True, "true")
        } else {
            Self::new(WireKind::False, "false")
        }
    }

    pub fn separator() -> Self {
        Self::new(WireKind::Separator, ",")
    }

    pub fn object(text: impl Into<String>) -> Self {
        Self::new(WireKind::Object, text)
    }
}
