//! Failure raised by persistence adapters.
//!
//! A [`PersistenceError`] carries a fixed kind, the caller's message, and a
//! best-effort stack trace recorded through a [`TraceCapturer`] at the
//! construction site. Values are immutable once built.

use std::panic::Location;

use thiserror::Error;

use super::trace_capture::{NativeCapturer, TraceCapturer};

/// Message used when a caller supplies a blank one.
pub const DEFAULT_PERSISTENCE_MESSAGE: &str = "persistence operation failed";

/// Error kinds raised by the persistence layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum PersistenceErrorKind {
    /// A data-storage operation did not complete.
    PersistenceFailure,
}

impl PersistenceErrorKind {
    /// Fixed identifier reported as the error's name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::PersistenceFailure => "PersistenceError",
        }
    }
}

/// Raised by [`PersistenceError::try_new`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceErrorValidationError {
    /// The message was empty once trimmed.
    #[error("persistence error message must not be empty")]
    EmptyMessage,
}

/// A failed persistence operation.
///
/// # Examples
/// ```
/// use scaffold_backend::domain::{PersistenceError, PersistenceErrorKind};
///
/// let err = PersistenceError::new("msg");
/// assert_eq!(err.name(), "PersistenceError");
/// assert_eq!(err.kind(), PersistenceErrorKind::PersistenceFailure);
/// assert_eq!(err.message(), "msg");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}: {message}", .kind.name())]
pub struct PersistenceError {
    kind: PersistenceErrorKind,
    message: String,
    stack: Option<String>,
}

impl PersistenceError {
    /// Build an error, capturing a native backtrace where the platform
    /// supports one.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        Self::with_capturer(message, &NativeCapturer)
    }

    /// Build an error using the configured capturer.
    ///
    /// Never fails. A blank message is replaced with
    /// [`DEFAULT_PERSISTENCE_MESSAGE`].
    ///
    /// # Examples
    /// ```
    /// use scaffold_backend::domain::PersistenceError;
    /// use scaffold_backend::domain::trace_capture::DisabledCapturer;
    ///
    /// let err = PersistenceError::with_capturer("connection reset", &DisabledCapturer);
    /// assert!(err.stack().is_none());
    /// ```
    #[track_caller]
    pub fn with_capturer(message: impl Into<String>, capturer: &dyn TraceCapturer) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            DEFAULT_PERSISTENCE_MESSAGE.to_owned()
        } else {
            message
        };
        Self::build(message, capturer, Location::caller())
    }

    /// Strict constructor rejecting blank messages.
    #[track_caller]
    pub fn try_new(
        message: impl Into<String>,
        capturer: &dyn TraceCapturer,
    ) -> Result<Self, PersistenceErrorValidationError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(PersistenceErrorValidationError::EmptyMessage);
        }
        Ok(Self::build(message, capturer, Location::caller()))
    }

    fn build(
        message: String,
        capturer: &dyn TraceCapturer,
        origin: &'static Location<'static>,
    ) -> Self {
        Self {
            kind: PersistenceErrorKind::PersistenceFailure,
            message,
            stack: capturer.capture(origin).filter(|s| !s.trim().is_empty()),
        }
    }

    /// Dispatch tag for this error.
    #[must_use]
    pub fn kind(&self) -> PersistenceErrorKind {
        self.kind
    }

    /// Fixed identifier for the error kind.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Caller-supplied description.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Captured trace, when the capturer produced one.
    #[must_use]
    pub fn stack(&self) -> Option<&str> {
        self.stack.as_deref()
    }
}
