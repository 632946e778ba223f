//! Runtime error types.

use interflow_framework::{BuildError, FlowError};
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while setting up or running the runtime.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A context provider could not be built.
    #[error("failed to build context provider: {0}")]
    Build(#[from] BuildError),

    /// A command failed during setup.
    #[error("setup of command '{command}' failed: {source}")]
    Setup {
        command: String,
        #[source]
        source: FlowError,
    },

    /// Logging could not be initialized.
    #[error("failed to initialize logging: {0}")]
    Logging(String),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
