//! Error types for the API client.

use std::fmt;

/// Client error type.
#[derive(Debug, Clone)]
pub enum Error {
    /// Missing or invalid configuration (credentials, search terms, endpoint).
    Config(String),
    /// The request could not be signed.
    Signing(intf_auth::AuthError),
    /// Network failure or timeout.
    Transport(String),
    /// 401/403 from the API. A wrong signature is never fixed by retrying.
    Auth { status: u16, body: String },
    /// Any other non-2xx response.
    Http { status: u16, body: String },
    /// Body was not the JSON we expected.
    Protocol(String),
    /// Local file I/O (JSON dumps, log file).
    Io(String),
}

impl Error {
    /// HTTP status for `Auth` / `Http` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Auth { status, .. } | Error::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "config error: {msg}"),
            Error::Signing(e) => write!(f, "signing error: {e}"),
            Error::Transport(msg) => write!(f, "request failed: {msg}"),
            Error::Auth { status, body } => {
                write!(f, "authentication rejected (HTTP {status}): {body}")
            }
            Error::Http { status, body } => write!(f, "HTTP {status}: {body}"),
            Error::Protocol(msg) => write!(f, "protocol error: {msg}"),
            Error::Io(msg) => write!(f, "io error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<intf_auth::AuthError> for Error {
    fn from(e: intf_auth::AuthError) -> Self {
        Error::Signing(e)
    }
}
