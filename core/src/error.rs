use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// Error codes returned by the Luno service.
///
/// Compare with [`Error::is_code`] instead of inspecting messages, which are
/// meant for humans only.
pub mod codes {
    /// The supplied password does not match the user's password.
    pub const INCORRECT_PASSWORD: &str = "incorrect_password";
    /// The user has been deactivated.
    pub const USER_CLOSED: &str = "user_closed";
    /// No session exists for the given id or key.
    pub const SESSION_NOT_FOUND: &str = "session_not_found";
}

/// The error type for luno operations
#[derive(Error, Debug)]
#[error("{message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    service: Option<Box<ServiceError>>,
    #[source]
    source: Option<anyhow::Error>,
}

/// The kind of error that occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request never produced an HTTP status (network, I/O, timeout)
    Transport,

    /// A response arrived but its body did not match the expected schema
    Decode,

    /// The service answered with a structured error body
    Service,

    /// The operation is not supported and was never sent
    Unsupported,

    /// Request cannot be assembled (bad uri, body encoding, etc.)
    RequestInvalid,

    /// Configuration error (missing credential, invalid host)
    ConfigInvalid,
}

impl Error {
    /// Create a new error with the given kind and message
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            service: None,
            source: None,
        }
    }

    /// Add a source error
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The structured service error, present only for [`ErrorKind::Service`].
    pub fn service_error(&self) -> Option<&ServiceError> {
        self.service.as_deref()
    }

    /// The stable service error code, if this is a service error.
    pub fn code(&self) -> Option<&str> {
        self.service_error().map(|e| e.code.as_str())
    }

    /// Check whether this is a service error carrying exactly `code`.
    pub fn is_code(&self, code: &str) -> bool {
        self.code() == Some(code)
    }

    /// Check if this is the unsupported operation sentinel
    pub fn is_unsupported(&self) -> bool {
        self.kind == ErrorKind::Unsupported
    }
}

// Convenience constructors
impl Error {
    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transport, message)
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Decode, message)
    }

    /// Wrap a decoded service error body
    pub fn service(err: ServiceError) -> Self {
        Self {
            kind: ErrorKind::Service,
            message: err.to_string(),
            service: Some(Box::new(err)),
            source: None,
        }
    }

    /// Create the unsupported operation sentinel for `operation`
    pub fn unsupported(operation: &str) -> Self {
        Self::new(
            ErrorKind::Unsupported,
            format!("{operation} is not supported"),
        )
    }

    /// Create a request invalid error
    pub fn request_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RequestInvalid, message)
    }

    /// Create a config invalid error
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigInvalid, message)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Transport => write!(f, "transport error"),
            ErrorKind::Decode => write!(f, "decode error"),
            ErrorKind::Service => write!(f, "service error"),
            ErrorKind::Unsupported => write!(f, "unsupported operation"),
            ErrorKind::RequestInvalid => write!(f, "invalid request"),
            ErrorKind::ConfigInvalid => write!(f, "invalid configuration"),
        }
    }
}

/// Convenience type alias for Results
pub type Result<T> = std::result::Result<T, Error>;

/// Error body returned by the service for any non-success status.
///
/// ```json
/// {"code": "session_not_found", "message": "...", "description": "...", "status": 404, "extra": null}
/// ```
#[derive(Error, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[error("luno error code: {code}, message: {message}, description: {description}, status: {status}, extra: {extra}")]
pub struct ServiceError {
    /// Stable machine readable code.
    #[serde(default)]
    pub code: String,
    /// Short human readable message.
    #[serde(default)]
    pub message: String,
    /// Longer human readable description.
    #[serde(default)]
    pub description: String,
    /// HTTP status reported by the service.
    #[serde(default)]
    pub status: u16,
    /// Opaque structured payload.
    #[serde(default)]
    pub extra: serde_json::Value,
}

// Transports report failures through anyhow, everything that reaches us that
// way happened before a status line was read.
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::transport(err.to_string()).with_source(err)
    }
}

impl From<http::Error> for Error {
    fn from(err: http::Error) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}
