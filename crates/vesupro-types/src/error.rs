use crate::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of errors kept per source before the rest are only counted.
pub const MAX_ERRORS: usize = 20;

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Diagnostic category, determined by code range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Syntax,
    Type,
    Model,
}

/// Numeric diagnostic code. Errors print as `E100`–`E299`, model warnings
/// as `W300`–`W399`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    // ── Syntax errors (E100–E199) ──
    pub const UNEXPECTED_TOKEN: Self = Self(100);
    pub const UNCLOSED_DELIMITER: Self = Self(101);
    pub const UNTERMINATED_LITERAL: Self = Self(102);
    pub const UNEXPECTED_CHARACTER: Self = Self(103);
    pub const MISSING_PACKAGE_CLAUSE: Self = Self(104);
    pub const MIXED_PARAMETER_NAMES: Self = Self(105);

    // ── Type errors (E200–E299) ──
    pub const UNSUPPORTED_TYPE: Self = Self(200);
    pub const VARIADIC_PARAMETER: Self = Self(201);
    pub const UNSUPPORTED_RESULTS: Self = Self(202);
    pub const GENERIC_RECEIVER: Self = Self(203);
    pub const RESERVED_METHOD: Self = Self(204);
    pub const RESERVED_PACKAGE_NAME: Self = Self(205);

    // ── Model warnings (W300–W399) ──
    pub const DUPLICATE_METHOD: Self = Self(300);
    pub const PACKAGE_MISMATCH: Self = Self(301);

    /// Get the category for this code.
    pub fn category(self) -> ErrorCategory {
        match self.0 {
            200..=299 => ErrorCategory::Type,
            300..=399 => ErrorCategory::Model,
            _ => ErrorCategory::Syntax,
        }
    }

    /// `W` for model warnings, `E` otherwise.
    pub fn prefix(self) -> char {
        match self.category() {
            ErrorCategory::Model => 'W',
            ErrorCategory::Syntax | ErrorCategory::Type => 'E',
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.prefix(), self.0)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax => write!(f, "syntax"),
            Self::Type => write!(f, "type"),
            Self::Model => write!(f, "model"),
        }
    }
}

/// A structured diagnostic tied to a source location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VesuproError {
    /// Source file name.
    pub file: String,
    pub code: ErrorCode,
    pub severity: Severity,
    /// Derived from `code`.
    pub category: ErrorCategory,
    pub message: String,
    #[serde(flatten)]
    pub span: Span,
    /// The offending source line, verbatim.
    pub source_line: String,
}

impl VesuproError {
    /// Create a new error-severity diagnostic.
    pub fn new(
        file: impl Into<String>,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
        source_line: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            code,
            severity: Severity::Error,
            category: code.category(),
            message: message.into(),
            span,
            source_line: source_line.into(),
        }
    }

    /// Downgrade to a warning.
    pub fn warning(mut self) -> Self {
        self.severity = Severity::Warning;
        self
    }
}

impl fmt::Display for VesuproError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {} [{}] {}",
            self.file, self.span, self.code, self.category, self.message
        )
    }
}

impl std::error::Error for VesuproError {}

/// Diagnostics collected while lexing and parsing one source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompileErrors {
    pub errors: Vec<VesuproError>,
    pub warnings: Vec<VesuproError>,
    pub total_errors: usize,
    pub total_warnings: usize,
}

impl CompileErrors {
    /// Create an empty collection.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    /// Whether the error cap has been reached and callers should stop.
    pub fn is_full(&self) -> bool {
        self.total_errors >= MAX_ERRORS
    }

    /// Add an error, respecting the [`MAX_ERRORS`] limit.
    pub fn push_error(&mut self, error: VesuproError) {
        if self.errors.len() < MAX_ERRORS {
            self.errors.push(error);
        }
        self.total_errors += 1;
    }

    pub fn push_warning(&mut self, warning: VesuproError) {
        self.warnings.push(warning.warning());
        self.total_warnings += 1;
    }

    /// Move everything from `other` into `self`.
    pub fn extend(&mut self, other: CompileErrors) {
        // errors beyond the other side's cap were only counted
        let uncounted = other.total_errors.saturating_sub(other.errors.len());
        for error in other.errors {
            self.push_error(error);
        }
        self.total_errors += uncounted;
        for warning in other.warnings {
            self.push_warning(warning);
        }
    }
}
