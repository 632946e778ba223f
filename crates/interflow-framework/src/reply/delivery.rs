//! Delivery planning.
//!
//! Picks the transport operation for a compiled reply from the state of the
//! interaction being answered:
//!
//! | interaction                          | acknowledged | `new_message` | operation                |
//! |--------------------------------------|--------------|---------------|--------------------------|
//! | component                            | no           | yes           | `reply` (ephemeral)      |
//! | component                            | yes          | yes           | `follow_up` (ephemeral)  |
//! | component, or modal from a message   | no           | no            | `update`                 |
//! | component, or modal from a message   | yes          | no            | `edit_reply`             |
//! | anything else                        | no           | -             | `reply` (ephemeral)      |
//! | anything else                        | yes          | -             | `edit_reply`             |
//!
//! Modals are only shown in response to commands and components.

use interflow_core::{Interaction, InteractionKind};

use super::schema::ReplySchema;
use crate::error::{FlowError, FlowResult};

/// Options for [`RequestContext::reply_with`](crate::RequestContext::reply_with).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplyOptions {
    /// Send a new message instead of updating the source message.
    ///
    /// Only meaningful for component interactions.
    pub new_message: bool,
}

impl ReplyOptions {
    /// Options that send a new message.
    pub fn new_message() -> Self {
        Self { new_message: true }
    }
}

/// The transport operation carrying a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// A modal form as the first response.
    ShowModal,
    /// A new ephemeral message as the first response.
    Reply,
    /// A new ephemeral message after the first response.
    FollowUp,
    /// The source message, edited as the first response.
    Update,
    /// The existing response, edited.
    EditReply,
}

impl Delivery {
    /// Returns `true` if the payload is sent as an ephemeral message.
    pub fn is_ephemeral(self) -> bool {
        matches!(self, Self::Reply | Self::FollowUp)
    }
}

/// Everything delivery depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryInput {
    pub kind: InteractionKind,
    pub acknowledged: bool,
    pub from_message: bool,
    pub modal: bool,
    pub new_message: bool,
}

impl DeliveryInput {
    pub fn new(interaction: &dyn Interaction, schema: &ReplySchema, options: ReplyOptions) -> Self {
        Self {
            kind: interaction.kind(),
            acknowledged: interaction.is_acknowledged(),
            from_message: interaction.source_message().is_some(),
            modal: schema.is_modal(),
            new_message: options.new_message,
        }
    }
}

/// Chooses how a reply is delivered.
///
/// Fails with [`FlowError::UnsupportedModal`] when a modal is requested for
/// an interaction that cannot show one.
pub fn plan_delivery(input: &DeliveryInput) -> FlowResult<Delivery> {
    let component = input.kind.is_message_component();

    if input.modal {
        return if input.kind.is_command() || component {
            Ok(Delivery::ShowModal)
        } else {
            Err(FlowError::UnsupportedModal { kind: input.kind })
        };
    }

    let edits_source = component || (input.kind.is_modal_submit() && input.from_message);
    let delivery = match (component && input.new_message, edits_source, input.acknowledged) {
        (true, _, false) => Delivery::Reply,
        (true, _, true) => Delivery::FollowUp,
        (false, true, false) => Delivery::Update,
        (false, _, true) => Delivery::EditReply,
        (false, false, false) => Delivery::Reply,
    };
    Ok(delivery)
}
