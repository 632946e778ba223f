//! Transport error types.
//!
//! These are the failures the client layer reports back when the router asks
//! it to send, edit or display something. The router never retries them.

use thiserror::Error;

/// Error type for calls into the remote platform.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The interaction no longer accepts a response.
    #[error("interaction is no longer repliable")]
    NotRepliable,

    /// A first response was already sent for this interaction.
    #[error("interaction was already acknowledged")]
    AlreadyAcknowledged,

    /// The remote platform rejected the request.
    #[error("remote platform rejected the request ({code}): {message}")]
    Rejected { code: i64, message: String },

    /// The call timed out.
    #[error("API call timed out")]
    Timeout,

    /// Failed to serialize the payload.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl ApiError {
    /// Creates a rejection error with the given code and message.
    pub fn rejected(code: i64, message: impl Into<String>) -> Self {
        Self::Rejected {
            code,
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type for API calls.
pub type ApiResult<T> = Result<T, ApiError>;
