//! Interflow Runtime - the layer between the client library and the router.
//!
//! This crate provides:
//! - Configuration loading (`interflow.toml` and `INTERFLOW_*` variables)
//! - Logging setup driven by that configuration
//! - The slash command registry ([`CommandRegistry`])
//! - Voice-state transition classification ([`voice::classify`])
//! - The event loop ([`InteractionRuntime`])
//!
//! ```ignore
//! use interflow_runtime::InteractionRuntime;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = InteractionRuntime::builder().build()?;
//!     runtime.register_command(Ping);
//!
//!     let (tx, rx) = tokio::sync::mpsc::channel(256);
//!     client::connect(tx).await?;
//!
//!     runtime.setup().await?;
//!     runtime.run_until_signal(rx).await;
//!     Ok(())
//! }
//! ```

pub mod command;
pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod voice;

#[cfg(test)]
pub(crate) mod testing;

pub use command::{CommandRegistry, SlashCommand};
pub use config::{ConfigError, ConfigLoader, ConfigResult, InterflowConfig, load_config};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::{EventOutcome, InboundEvent, InteractionRuntime, RuntimeBuilder};
pub use voice::{VoiceEvent, VoiceState};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Logging macros.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
