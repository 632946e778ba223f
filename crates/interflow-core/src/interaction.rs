//! Interaction trait and related types.
//!
//! An [`Interaction`] is a single inbound request from the remote chat
//! platform: a command invocation, a click on a button or select menu, or the
//! submission of a form. It can be answered once (`reply`, `update`,
//! `show_modal`) and afterwards edited or followed up.
//!
//! The router only ever sees interactions through this trait. Concrete
//! implementations live in the client layer and wrap whatever the platform
//! library hands them.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ApiResult;
use crate::payload::{MessagePayload, ModalPayload};

/// Classification of interaction kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionKind {
    /// A slash command (or context menu) invocation.
    Command,
    /// A click on a button.
    Button,
    /// A choice made in a string select menu.
    StringSelect,
    /// The submission of a modal form.
    ModalSubmit,
    /// An autocomplete request. Never repliable.
    Autocomplete,
}

impl InteractionKind {
    /// Returns `true` for command invocations.
    pub fn is_command(self) -> bool {
        matches!(self, Self::Command)
    }

    /// Returns `true` for interactions raised by a component on a message.
    pub fn is_message_component(self) -> bool {
        matches!(self, Self::Button | Self::StringSelect)
    }

    /// Returns `true` for modal submissions.
    pub fn is_modal_submit(self) -> bool {
        matches!(self, Self::ModalSubmit)
    }

    /// Returns the lowercase name of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Command => "command",
            Self::Button => "button",
            Self::StringSelect => "string_select",
            Self::ModalSubmit => "modal_submit",
            Self::Autocomplete => "autocomplete",
        }
    }
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The message an interaction originates from.
///
/// Components always originate from a message. Modal submissions only do when
/// the modal was opened from a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceMessage {
    /// Whether the message is only visible to the requesting user.
    pub ephemeral: bool,
}

/// The core Interaction trait.
///
/// # Identifiers
///
/// [`identifier`](Self::identifier) returns the command name for command
/// invocations and the custom id for components and modal submissions.
///
/// # Responding
///
/// Exactly one of `reply`, `update` and `show_modal` may be used as the first
/// response. Once [`is_deferred`](Self::is_deferred) or
/// [`is_replied`](Self::is_replied) is true, further output goes through
/// `edit_reply` or `follow_up`.
#[async_trait]
pub trait Interaction: Send + Sync + 'static {
    /// Returns the kind of this interaction.
    fn kind(&self) -> InteractionKind;

    /// Returns the raw identifier (command name or custom id).
    fn identifier(&self) -> &str;

    /// Returns the values chosen in a select menu.
    ///
    /// Empty for every other kind of interaction.
    fn selected_values(&self) -> &[String] {
        &[]
    }

    /// Returns the message this interaction originates from, if any.
    fn source_message(&self) -> Option<SourceMessage> {
        None
    }

    /// Returns `true` while the platform still accepts a response.
    fn is_repliable(&self) -> bool;

    /// Returns `true` if the response was deferred.
    fn is_deferred(&self) -> bool;

    /// Returns `true` if a response was already sent.
    fn is_replied(&self) -> bool;

    /// Returns `true` if the interaction was deferred or replied to.
    fn is_acknowledged(&self) -> bool {
        self.is_deferred() || self.is_replied()
    }

    /// Sends the first response as a new message.
    async fn reply(&self, payload: MessagePayload) -> ApiResult<()>;

    /// Edits the source message in place as the first response.
    async fn update(&self, payload: MessagePayload) -> ApiResult<()>;

    /// Edits the response that was previously sent or deferred.
    async fn edit_reply(&self, payload: MessagePayload) -> ApiResult<()>;

    /// Sends an additional message after the first response.
    async fn follow_up(&self, payload: MessagePayload) -> ApiResult<()>;

    /// Displays a modal form as the first response.
    async fn show_modal(&self, modal: ModalPayload) -> ApiResult<()>;

    /// Returns a reference to self as `Any` for downcasting to the client
    /// layer's concrete type.
    fn as_any(&self) -> &dyn Any;
}

impl fmt::Debug for dyn Interaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interaction")
            .field("kind", &self.kind())
            .field("identifier", &self.identifier())
            .finish_non_exhaustive()
    }
}

/// A shared Interaction trait object.
pub type BoxedInteraction = Arc<dyn Interaction>;
