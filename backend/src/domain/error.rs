//! Domain-level error payload.
//!
//! The payload is transport agnostic. Inbound adapters map it to HTTP
//! responses; the [`ErrorCode`] decides the status.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error as ThisError;

use super::TraceId;

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// No resource answers at the requested location.
    NotFound,
    /// A dependency such as the database is unreachable.
    ServiceUnavailable,
    /// An unexpected failure; clients only ever see a generic message.
    InternalError,
}

impl ErrorCode {
    fn fallback_message(self) -> &'static str {
        match self {
            Self::NotFound => "Not found",
            Self::ServiceUnavailable => "Service unavailable",
            Self::InternalError => "Internal server error",
        }
    }
}

/// Raised when an [`Error`] would break its invariants.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum ErrorValidationError {
    /// The message was empty once trimmed.
    #[error("error message must not be empty")]
    EmptyMessage,
    /// The trace identifier was empty once trimmed.
    #[error("trace identifier must not be empty")]
    EmptyTraceId,
}

/// API error payload.
///
/// ## Invariants
/// - `message` is non-empty once trimmed.
/// - `trace_id`, when present, is non-empty once trimmed.
///
/// # Examples
/// ```
/// use scaffold_backend::domain::{Error, ErrorCode};
///
/// let err = Error::new(ErrorCode::ServiceUnavailable, "database down");
/// assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
/// assert_eq!(err.message(), "database down");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireError", into = "WireError")]
pub struct Error {
    code: ErrorCode,
    message: String,
    trace_id: Option<String>,
    details: Option<Value>,
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

impl Error {
    /// Build an error tagged with the trace identifier in scope.
    ///
    /// Blank messages become the code's generic description.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        let message = Some(message.into())
            .filter(|text| !is_blank(text))
            .unwrap_or_else(|| code.fallback_message().to_owned());
        Self::in_scope(code, message)
    }

    /// Strict variant of [`Error::new`].
    pub fn try_new(
        code: ErrorCode,
        message: impl Into<String>,
    ) -> Result<Self, ErrorValidationError> {
        let message = message.into();
        if is_blank(&message) {
            Err(ErrorValidationError::EmptyMessage)
        } else {
            Ok(Self::in_scope(code, message))
        }
    }

    fn in_scope(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            trace_id: TraceId::current().map(|id| id.to_string()),
            details: None,
        }
    }

    /// Failure category.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Text returned to clients.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Correlation identifier, when one was in scope or attached.
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Structured context for clients.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Attach structured details.
    pub fn with_details(self, details: Value) -> Self {
        Self {
            details: Some(details),
            ..self
        }
    }

    /// Attach a trace identifier, rejecting blank values.
    pub fn try_with_trace_id(self, id: impl Into<String>) -> Result<Self, ErrorValidationError> {
        let id = id.into();
        if is_blank(&id) {
            return Err(ErrorValidationError::EmptyTraceId);
        }
        Ok(Self {
            trace_id: Some(id),
            ..self
        })
    }

    /// Attach a trace identifier; blank values leave the error unchanged.
    pub fn with_trace_id(self, id: impl Into<String>) -> Self {
        let id = id.into();
        if is_blank(&id) {
            self
        } else {
            Self {
                trace_id: Some(id),
                ..self
            }
        }
    }

    /// Error for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Error for [`ErrorCode::ServiceUnavailable`].
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    /// Error for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Error {}

/// JSON shape of [`Error`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct WireError {
    code: ErrorCode,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "trace_id")]
    trace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl From<Error> for WireError {
    fn from(value: Error) -> Self {
        let Error {
            code,
            message,
            trace_id,
            details,
        } = value;
        Self {
            code,
            message,
            trace_id,
            details,
        }
    }
}

impl TryFrom<WireError> for Error {
    type Error = ErrorValidationError;

    // Decoded payloads carry their own trace id; the ambient one is ignored.
    fn try_from(wire: WireError) -> Result<Self, Self::Error> {
        if is_blank(&wire.message) {
            return Err(ErrorValidationError::EmptyMessage);
        }
        let decoded = Self {
            code: wire.code,
            message: wire.message,
            trace_id: None,
            details: wire.details,
        };
        match wire.trace_id {
            Some(id) => decoded.try_with_trace_id(id),
            None => Ok(decoded),
        }
    }
}
