//! Domain primitives, errors, and ports.
//!
//! Purpose: keep failure types and port contracts free of framework
//! concerns. Inbound adapters translate these into HTTP responses; outbound
//! adapters raise [`PersistenceError`] through the ports.
//!
//! Public surface:
//! - Error / ErrorCode — API error payload and its stable code.
//! - PersistenceError / PersistenceErrorKind — failure raised by persistence adapters.
//! - TraceCapturer and its strategies — see [`trace_capture`].
//! - TraceId — request-scoped correlation identifier.

pub mod error;
pub mod persistence_error;
pub mod ports;
pub mod trace_capture;
pub mod trace_id;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::persistence_error::{
    DEFAULT_PERSISTENCE_MESSAGE, PersistenceError, PersistenceErrorKind,
    PersistenceErrorValidationError,
};
pub use self::trace_capture::{TraceCaptureMode, TraceCapturer};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};

impl From<PersistenceError> for Error {
    fn from(value: PersistenceError) -> Self {
        Self::service_unavailable(value.message())
    }
}
