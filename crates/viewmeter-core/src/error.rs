//! Shared error type across viewmeter crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input or failed downstream call.
    BadRequest,
    /// Admission gate exhausted.
    RateLimited,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in logs and responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::RateLimited => "RATE_LIMITED",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, MeterError>;

/// Unified error type used by core and server.
#[derive(Debug, Error)]
pub enum MeterError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("downstream failed: {0}")]
    Downstream(String),
    #[error("rate limited")]
    RateLimited,
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("persist failed: {0}")]
    Persist(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl MeterError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            MeterError::BadRequest(_) | MeterError::Downstream(_) => ClientCode::BadRequest,
            MeterError::RateLimited => ClientCode::RateLimited,
            MeterError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            MeterError::Persist(_) | MeterError::Internal(_) => ClientCode::Internal,
        }
    }
}
