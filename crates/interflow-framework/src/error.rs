//! Error types for the Interflow framework.

use thiserror::Error;

use interflow_core::{ApiError, InteractionKind};

/// Errors raised while executing a route or sending a reply.
#[derive(Debug, Clone, Error)]
pub enum FlowError {
    /// A modal was requested for an interaction that cannot display one.
    #[error("a modal cannot be shown in response to a {kind} interaction")]
    UnsupportedModal {
        /// The kind of the interaction being answered.
        kind: InteractionKind,
    },

    /// A continuation path contains the reserved `;` separator.
    #[error("path '{path}' contains the reserved ';' separator")]
    ReservedSeparator {
        /// The offending path.
        path: String,
    },

    /// A live session already holds this token.
    #[error("session token '{token}' is already in use")]
    SessionCollision {
        /// The colliding token.
        token: String,
    },

    /// The transport failed to deliver a reply.
    #[error(transparent)]
    Transport(#[from] ApiError),

    /// A middleware failed.
    #[error("middleware error: {0}")]
    Middleware(String),
}

impl FlowError {
    /// Creates a middleware error.
    pub fn middleware(msg: impl Into<String>) -> Self {
        Self::Middleware(msg.into())
    }
}

/// Result type for flow operations.
pub type FlowResult<T> = Result<T, FlowError>;

/// Errors detected while building a [`ContextProvider`](crate::ContextProvider).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// A route was registered with an empty path.
    #[error("route path must not be empty")]
    EmptyPath,

    /// Two routes were registered with the same path.
    #[error("route '{path}' is registered more than once")]
    DuplicateRoute {
        /// The duplicated path.
        path: String,
    },

    /// A route path contains the reserved `;` separator.
    #[error("route path '{path}' contains the reserved ';' separator")]
    ReservedSeparator {
        /// The offending path.
        path: String,
    },

    /// The session settings cannot be used.
    #[error("invalid session settings: {reason}")]
    InvalidSessionConfig {
        /// What is wrong with them.
        reason: String,
    },
}
