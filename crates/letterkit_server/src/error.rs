//! Error types for the generation service.

use std::time::Duration;
use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Failure of an upstream generation call.
///
/// Cloneable so a single in-flight result can be handed to every caller
/// waiting on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerateError {
    /// The upstream model returned an error or an unusable body.
    #[error("upstream generation failed: {0}")]
    Upstream(String),

    /// The upstream call exceeded the configured timeout.
    #[error("generation timed out after {0:?}")]
    Timeout(Duration),
}

/// Errors that can occur in the generation service.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Malformed or invalid request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Request body exceeds the configured limit.
    #[error("request body too large: {size} bytes (limit {limit})")]
    PayloadTooLarge {
        /// Body size.
        size: usize,
        /// Configured limit.
        limit: usize,
    },

    /// The client exceeded its request budget.
    #[error("rate limit exceeded, retry after {retry_after:?}")]
    RateLimited {
        /// Time until the client's window resets.
        retry_after: Duration,
    },

    /// Upstream generation failed.
    #[error(transparent)]
    Generation(#[from] GenerateError),

    /// Response serialization failed.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ServerError {
    /// Returns true if this is a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ServerError::InvalidRequest(_)
                | ServerError::PayloadTooLarge { .. }
                | ServerError::RateLimited { .. }
        )
    }

    /// Returns true if this is a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        !self.is_client_error()
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ServerError::InvalidRequest(_) => 400,
            ServerError::PayloadTooLarge { .. } => 413,
            ServerError::RateLimited { .. } => 429,
            ServerError::Generation(GenerateError::Upstream(_)) => 502,
            ServerError::Generation(GenerateError::Timeout(_)) => 504,
            ServerError::Json(_) => 500,
        }
    }

    /// Seconds a client should wait before retrying, if applicable.
    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            // Round up so clients never retry early.
            ServerError::RateLimited { retry_after } => {
                Some(retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0))
            }
            _ => None,
        }
    }
}
