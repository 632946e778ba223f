//! Configuration for the Interflow runtime.
//!
//! Configuration is loaded in layers with figment (built-in defaults, then
//! `interflow.toml` / `interflow.yaml`, then `INTERFLOW_*` environment
//! variables) and validated before use.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    DispatchConfig, InterflowConfig, LogFormat, LogLevel, LogOutput, LoggingConfig,
    SessionConfig, SpanEventConfig,
};
pub use validation::validate_config;
