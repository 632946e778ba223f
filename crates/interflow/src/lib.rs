//! # Interflow
//!
//! A stateful router for reply-once chat interactions.
//!
//! ## Overview
//!
//! A command opens a flow by replying with buttons, select menus or a form.
//! Each of those carries an identifier of the form `"<route>;<token>"`. When
//! the user acts on one, the identifier leads back to a route and to the
//! state saved with the reply, so multi-step flows read like ordinary
//! handlers.
//!
//! ```text
//! ┌──────────────┐     ┌────────────┐     ┌────────────────────────────────────┐
//! │   Runtime    │────▶│ Dispatcher │────▶│ Provider "orders" (routes, store)  │──▶ reply
//! │ (event loop) │     │            │────▶│ Provider "admin"  (routes, store)  │──▶ reply
//! └──────────────┘     └────────────┘     └────────────────────────────────────┘
//!        │
//!        └──▶ CommandRegistry (slash commands)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use interflow::prelude::*;
//!
//! #[derive(Debug, Clone, Default)]
//! struct Order {
//!     size: Option<String>,
//! }
//!
//! async fn pick_size(ctx: Arc<RequestContext<Order>>, next: Next<Order>) -> FlowResult<()> {
//!     ctx.reply(
//!         EmbedReply::new(Panel::new("Order", "Pick a size")).row(vec![
//!             ButtonSpec::new("Small", "size-small").into(),
//!             ButtonSpec::new("Large", "size-large").into(),
//!         ]),
//!     )
//!     .await?;
//!     next.advance().await
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = InteractionRuntime::builder().build()?;
//!     runtime.register_provider(
//!         runtime.provider::<Order>().name("orders").route("order", pick_size).build()?,
//!     );
//!
//!     let (tx, rx) = tokio::sync::mpsc::channel(256);
//!     // hand `tx` to the client layer
//!     runtime.setup().await?;
//!     runtime.run_until_signal(rx).await;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config`: load `interflow.toml` (default)
//! - `yaml-config`: load `interflow.yaml`
//! - `json-log`: JSON log output

pub use interflow_core as core;
pub use interflow_framework as framework;
pub use interflow_runtime as runtime;

/// Commonly used types.
///
/// ```rust,ignore
/// use interflow::prelude::*;
/// ```
pub mod prelude {
    pub use std::sync::Arc;

    // Runtime
    pub use interflow_runtime::{
        CommandRegistry, InboundEvent, InteractionRuntime, SlashCommand, VoiceEvent, VoiceState,
    };

    // Routing
    pub use interflow_framework::{
        ContextProvider, Dispatcher, FlowError, FlowResult, MatchMode, Next, RequestContext,
        RequireSession, SessionConsumption,
    };

    // Replies
    pub use interflow_framework::{
        ActionStyle, ButtonSpec, Component, EmbedReply, Footer, LinkButtonSpec, ModalField,
        ModalReply, MultiEmbedReply, Panel, ReplyOptions, SelectOption, SelectSpec,
    };

    // Platform contract
    pub use interflow_core::{BoxedInteraction, Interaction, InteractionKind};
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use crate::runtime::InterflowConfig;

    async fn done(_ctx: Arc<RequestContext<u32>>, next: Next<u32>) -> FlowResult<()> {
        next.advance().await
    }

    #[test]
    fn test_prelude_wires_a_runtime() {
        let runtime = InteractionRuntime::from_config(InterflowConfig::default());
        assert_eq!(runtime.provider_count(), 0);

        let provider = runtime
            .provider::<u32>()
            .name("orders")
            .route("order", done)
            .build()
            .unwrap();
        runtime.register_provider(provider);

        assert_eq!(runtime.provider_count(), 1);
        assert_eq!(runtime.command_count(), 0);
    }
}
