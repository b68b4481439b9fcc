//! Shared types for the vesupro stub compiler.
//!
//! This crate defines the declaration AST produced by the parser, the
//! API model consumed by the dispatcher generator, the wire token kinds
//! and type rule table that connect the two, plus source spans and the
//! coded diagnostics used across all stages.

mod error;
mod span;
pub mod ast;
pub mod model;
pub mod rules;
pub mod wire;

pub use error::{CompileErrors, ErrorCategory, ErrorCode, Severity, VesuproError, MAX_ERRORS};
pub use model::{ApiEntry, ApiModel, MethodSpec, PackageImport, ParameterSpec, ResultShape};
pub use rules::{Conversion, TypeRule};
pub use span::{SourceFile, Span};
pub use wire::{WireKind, WireToken};
