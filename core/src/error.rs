//! Error types for the Anvil API client.
//!
//! # Design
//! Transport failures (`Connection`, `Timeout`) are produced by whichever host
//! executes the request; `HttpStatus` is produced by `AnvilClient` when it
//! inspects the reply. The rejected body is kept so callers can log what the
//! server said.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// DNS resolution, TCP connect, TLS handshake or socket I/O failed.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The transport gave up waiting for the server.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The network link never came up within the configured attempt budget.
    #[error("link not ready after {attempts} attempts")]
    LinkTimeout { attempts: u32 },
}

impl ApiError {
    /// Status code carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}
