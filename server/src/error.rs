//! Error types for the daynote server.
//!
//! [`ServerError`] is the top-level error of the HTTP layer. It wraps
//! journal and listener failures and knows how to render itself as a
//! JSON error response with a stable machine-readable `code`.
//!
//! # Example
//!
//! ```rust
//! use daynote_server::error::ServerError;
//!
//! let err = ServerError::invalid_encoding("body is not valid UTF-8");
//! assert!(err.is_client_error());
//! assert_eq!(err.code(), "invalid_encoding");
//! ```

use std::error::Error;
use std::fmt;
use std::io;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use daynote_journal::JournalError;

/// Top-level error type for the daynote server.
#[derive(Debug)]
pub enum ServerError {
    /// A journal operation failed.
    Journal(JournalError),

    /// Request body is not valid UTF-8.
    InvalidEncoding(String),

    /// Binding or serving the listener failed.
    Io(io::Error),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Journal(err) => write!(f, "journal error: {err}"),
            Self::InvalidEncoding(msg) => write!(f, "invalid encoding: {msg}"),
            Self::Io(err) => write!(f, "server I/O error: {err}"),
        }
    }
}

impl Error for ServerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Journal(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::InvalidEncoding(_) => None,
        }
    }
}

impl From<JournalError> for ServerError {
    fn from(err: JournalError) -> Self {
        Self::Journal(err)
    }
}

impl From<io::Error> for ServerError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl ServerError {
    /// Creates a new invalid encoding error.
    pub fn invalid_encoding(message: impl Into<String>) -> Self {
        Self::InvalidEncoding(message.into())
    }

    /// Returns `true` if this error indicates a client-side problem.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidEncoding(_))
    }

    /// HTTP status code the error maps to.
    pub fn status(&self) -> StatusCode {
        if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    /// Machine-readable error code included in JSON responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Journal(JournalError::Io { .. }) => "io_error",
            Self::Journal(JournalError::Task(_)) => "internal_error",
            Self::InvalidEncoding(_) => "invalid_encoding",
            Self::Io(_) => "io_error",
        }
    }
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl ErrorResponse {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: None,
        }
    }

    fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, code = self.code(), "Request failed");
        }
        let body = ErrorResponse::new(self.to_string()).with_code(self.code());
        (status, Json(body)).into_response()
    }
}

/// A specialized Result type for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;
