use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;

use crate::common::{atomic, Atomic, WriteExecutor};

/// Error kinds for client operations.
///
/// Each kind names one failure category of the connection / store / query /
/// stream lifecycle so callers can branch on it without parsing messages.
///
/// # Examples
///
/// ```rust
/// use ojai::errors::{ErrorKind, OjaiError, OjaiResult};
///
/// fn lookup() -> OjaiResult<()> {
///     Err(OjaiError::new("store /apps/user not found", ErrorKind::StoreNotFound))
/// }
///
/// assert_eq!(lookup().unwrap_err().kind(), &ErrorKind::StoreNotFound);
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    // Open-time failures
    /// The endpoint is unreachable or rejected the session
    ConnectionError,
    /// The endpoint string could not be parsed
    InvalidEndpoint,

    // Lifecycle failures
    /// A connection, store or stream was used after `close()`
    ClosedResource,
    /// The named store does not exist
    StoreNotFound,

    // Write failures
    /// An upsert was rejected (missing id, malformed field, remote rejection)
    WriteError,

    // Query failures
    /// The query is malformed
    QueryError,
    /// A condition failed client-side validation
    InvalidCondition,
    /// A field path is empty or contains an empty segment
    InvalidFieldPath,

    // Stream failures
    /// Iteration failed before the stream was exhausted
    StreamError,
    /// A deadline passed while a stream was still open
    Timeout,

    // Data Encoding Errors
    /// Error encoding or decoding JSON text
    EncodingError,

    // Backend Errors
    /// Error reported by the store backend
    BackendError,

    /// The operation is not allowed in the current state
    InvalidOperation,

    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::ConnectionError => write!(f, "Connection error"),
            ErrorKind::InvalidEndpoint => write!(f, "Invalid endpoint"),
            ErrorKind::ClosedResource => write!(f, "Closed resource"),
            ErrorKind::StoreNotFound => write!(f, "Store not found"),
            ErrorKind::WriteError => write!(f, "Write error"),
            ErrorKind::QueryError => write!(f, "Query error"),
            ErrorKind::InvalidCondition => write!(f, "Invalid condition"),
            ErrorKind::InvalidFieldPath => write!(f, "Invalid field path"),
            ErrorKind::StreamError => write!(f, "Stream error"),
            ErrorKind::Timeout => write!(f, "Timeout"),
            ErrorKind::EncodingError => write!(f, "Encoding error"),
            ErrorKind::BackendError => write!(f, "Backend error"),
            ErrorKind::InvalidOperation => write!(f, "Invalid operation"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// The error type of every fallible client operation.
///
/// `OjaiError` carries a message, an [ErrorKind], an optional cause and a
/// lazily resolved backtrace captured where the error was created.
///
/// # Examples
///
/// ```rust
/// use ojai::errors::{ErrorKind, OjaiError};
///
/// let cause = OjaiError::new("socket reset", ErrorKind::BackendError);
/// let err = OjaiError::new_with_cause("cursor failed", ErrorKind::StreamError, cause);
/// assert_eq!(err.kind(), &ErrorKind::StreamError);
/// assert!(err.cause().is_some());
/// ```
#[derive(Clone)]
pub struct OjaiError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<OjaiError>>,
    backtrace: Atomic<Backtrace>,
}

impl OjaiError {
    /// Creates a new `OjaiError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        OjaiError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: atomic(Backtrace::new_unresolved()),
        }
    }

    /// Creates a new `OjaiError` that wraps the error which caused it.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: OjaiError) -> Self {
        OjaiError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: atomic(Backtrace::new_unresolved()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&OjaiError> {
        self.cause.as_deref()
    }

    /// Returns `true` if this error or any error in its cause chain has the given kind.
    pub fn is_caused_by(&self, kind: &ErrorKind) -> bool {
        if &self.error_kind == kind {
            return true;
        }
        self.cause
            .as_ref()
            .map(|cause| cause.is_caused_by(kind))
            .unwrap_or(false)
    }
}

impl Display for OjaiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for OjaiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // print error message with stack trace followed by cause
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => {
                let trace = self.backtrace.write_with(|bt| {
                    bt.resolve();
                    format!("{:?}", bt)
                });
                write!(f, "{}\n{}", self.message, trace)
            }
        }
    }
}

impl Error for OjaiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for client operations.
pub type OjaiResult<T> = Result<T, OjaiError>;

impl From<serde_json::Error> for OjaiError {
    fn from(err: serde_json::Error) -> Self {
        OjaiError::new(&format!("JSON error: {}", err), ErrorKind::EncodingError)
    }
}

impl From<chrono::ParseError> for OjaiError {
    fn from(err: chrono::ParseError) -> Self {
        OjaiError::new(
            &format!("Date parsing error: {}", err),
            ErrorKind::EncodingError,
        )
    }
}

impl From<regex::Error> for OjaiError {
    fn from(err: regex::Error) -> Self {
        OjaiError::new(
            &format!("Invalid regular expression: {}", err),
            ErrorKind::InvalidCondition,
        )
    }
}
