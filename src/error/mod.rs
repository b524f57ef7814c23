//! Error taxonomy.
//!
//! # Responsibilities
//! - Classify every failure into a fixed set of [`ErrorCode`]s
//! - Carry the optional underlying cause for unwrapping
//! - Capture the construction-site stack
//! - Render diagnostic fields for structured logging
//!
//! # Design Decisions
//! - Construction is pure: no I/O, no logging
//! - The code is fixed at construction; there are no setters
//! - Propagation policy belongs to callers, not to this module

pub mod stack;

use std::error::Error as StdError;
use std::fmt;

use serde::Serialize;

pub use stack::{StackFrame, StackTrace};

/// Boxed underlying cause.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Result alias used across the service.
pub type AppResult<T> = Result<T, AppError>;

/// Failure classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unknown,
    NotFound,
    InvalidArgument,
    Database,
    Config,
    Server,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Unknown => "unknown",
            ErrorCode::NotFound => "not_found",
            ErrorCode::InvalidArgument => "invalid_argument",
            ErrorCode::Database => "database",
            ErrorCode::Config => "config",
            ErrorCode::Server => "server",
        }
    }

    /// Stable numeric value, in declaration order.
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified error with its construction-site stack.
pub struct AppError {
    code: ErrorCode,
    message: String,
    cause: Option<BoxError>,
    stack: StackTrace,
}

/// Structured view of an [`AppError`] for log emission.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticFields {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
    pub code: ErrorCode,
    pub stack: StackTrace,
}

impl AppError {
    #[inline(never)]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            cause: None,
            stack: StackTrace::capture(stack::DEFAULT_DEPTH),
        }
    }

    #[inline(never)]
    pub fn wrap(cause: impl Into<BoxError>, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            cause: Some(cause.into()),
            stack: StackTrace::capture(stack::DEFAULT_DEPTH),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Config, message)
    }

    pub fn wrap_config(cause: impl Into<BoxError>, message: impl Into<String>) -> Self {
        Self::wrap(cause, ErrorCode::Config, message)
    }

    pub fn wrap_database(cause: impl Into<BoxError>, message: impl Into<String>) -> Self {
        Self::wrap(cause, ErrorCode::Database, message)
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidArgument, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Server, message)
    }

    pub fn wrap_server(cause: impl Into<BoxError>, message: impl Into<String>) -> Self {
        Self::wrap(cause, ErrorCode::Server, message)
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The wrapped cause, if any.
    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// Give up the classification and return the wrapped cause.
    pub fn into_cause(self) -> Option<BoxError> {
        self.cause
    }

    pub fn stack(&self) -> &StackTrace {
        &self.stack
    }

    pub fn fields(&self) -> DiagnosticFields {
        DiagnosticFields {
            message: self.message.clone(),
            cause: self.cause.as_ref().map(|c| c.to_string()),
            code: self.code,
            stack: self.stack.clone(),
        }
    }

    /// Emit this error at error level with its diagnostic fields.
    pub fn log(&self, context: &str) {
        tracing::error!(
            context,
            code = %self.code,
            cause = self.cause.as_ref().map(tracing::field::display),
            stack = %self.stack,
            "{}",
            self.message
        );
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{}: {}", self.message, cause),
            None => f.write_str(&self.message),
        }
    }
}

impl fmt::Debug for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppError")
            .field("code", &self.code)
            .field("message", &self.message)
            .field("cause", &self.cause)
            .field("frames", &self.stack.len())
            .finish()
    }
}

impl StdError for AppError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause.as_deref().map(|c| c as &(dyn StdError + 'static))
    }
}
