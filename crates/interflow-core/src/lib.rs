//! # Interflow Core
//!
//! The platform-facing contract of the Interflow interaction router.
//!
//! This crate holds everything that sits on the boundary between the router
//! and the client library that owns the connection to the remote chat
//! platform:
//!
//! - **Interaction**: the inbound, reply-once event ([`Interaction`],
//!   [`InteractionKind`], [`BoxedInteraction`])
//! - **Wire payloads**: what the router hands back to the transport
//!   ([`MessagePayload`], [`ModalPayload`], [`Embed`], [`ActionRow`])
//! - **Transport errors**: failures reported by the client layer ([`ApiError`])
//!
//! The router itself lives in `interflow-framework`; nothing here keeps state.
//!
//! ```text
//! ┌──────────────┐  BoxedInteraction  ┌────────────┐  MessagePayload  ┌──────────────┐
//! │ client layer │───────────────────▶│   router   │─────────────────▶│ client layer │
//! └──────────────┘                    └────────────┘  ModalPayload    └──────────────┘
//! ```

pub mod error;
pub mod interaction;
pub mod payload;

pub use error::{ApiError, ApiResult};
pub use interaction::{BoxedInteraction, Interaction, InteractionKind, SourceMessage};
pub use payload::{
    ActionRow, Button, ButtonStyle, Component, ComponentType, EPHEMERAL_FLAG, Embed, EmbedFooter,
    EmbedMedia, MessagePayload, ModalPayload, PartialEmoji, SelectMenuOption, StringSelect,
    TextInput, TextInputStyle,
};
