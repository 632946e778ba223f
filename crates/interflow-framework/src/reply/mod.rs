//! The reply compiler.
//!
//! Replies are described declaratively with a [`ReplySchema`] and compiled
//! into the wire payloads of `interflow-core`. The compiler is made of pure
//! functions:
//!
//! - [`schema`] – the declarative description (embeds, components, modals)
//! - [`compile`] – schema to payload translation, continuation encoding and
//!   identifier parsing
//! - [`delivery`] – which transport operation carries the payload
//!
//! # Continuations
//!
//! A continuation is an interactive element whose interaction should come
//! back to the router: a non-link button, a select menu, or a modal. Each one
//! names the route to take next (`next`). When a reply holds continuations,
//! the request's state is saved under a fresh session token and every
//! continuation identifier becomes `"<next>;<token>"`.
//!
//! ```text
//! ButtonSpec { next: "step2" }  ──compile(token = "1f-ab12")──▶  custom_id: "step2;1f-ab12"
//! ```

pub mod compile;
pub mod delivery;
pub mod schema;

pub use compile::{
    CompiledReply, InboundIdentifier, compile, compile_message, compile_modal, continuation_id,
    parse_identifier, requires_continuation, validate,
};
pub use delivery::{Delivery, DeliveryInput, ReplyOptions, plan_delivery};
pub use schema::{
    ActionStyle, ButtonSpec, Component, EmbedReply, Footer, LinkButtonSpec, ModalField,
    ModalReply, MultiEmbedReply, Panel, ReplySchema, SelectOption, SelectSpec,
};
