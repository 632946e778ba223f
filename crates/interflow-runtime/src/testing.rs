//! Test doubles.

use std::any::Any;

use async_trait::async_trait;
use interflow_core::{ApiResult, Interaction, InteractionKind, MessagePayload, ModalPayload};
use parking_lot::Mutex;

/// An interaction that counts the replies sent through it.
#[derive(Debug)]
pub struct StubInteraction {
    kind: InteractionKind,
    identifier: String,
    replies: Mutex<Vec<MessagePayload>>,
}

impl StubInteraction {
    pub fn command(name: &str) -> Self {
        Self::new(InteractionKind::Command, name)
    }

    pub fn button(custom_id: &str) -> Self {
        Self::new(InteractionKind::Button, custom_id)
    }

    fn new(kind: InteractionKind, identifier: &str) -> Self {
        Self {
            kind,
            identifier: identifier.to_string(),
            replies: Mutex::new(Vec::new()),
        }
    }

    pub fn reply_count(&self) -> usize {
        self.replies.lock().len()
    }

    fn record(&self, payload: MessagePayload) -> ApiResult<()> {
        self.replies.lock().push(payload);
        Ok(())
    }
}

#[async_trait]
impl Interaction for StubInteraction {
    fn kind(&self) -> InteractionKind {
        self.kind
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn is_repliable(&self) -> bool {
        true
    }

    fn is_deferred(&self) -> bool {
        false
    }

    fn is_replied(&self) -> bool {
        !self.replies.lock().is_empty()
    }

    async fn reply(&self, payload: MessagePayload) -> ApiResult<()> {
        self.record(payload)
    }

    async fn update(&self, payload: MessagePayload) -> ApiResult<()> {
        self.record(payload)
    }

    async fn edit_reply(&self, payload: MessagePayload) -> ApiResult<()> {
        self.record(payload)
    }

    async fn follow_up(&self, payload: MessagePayload) -> ApiResult<()> {
        self.record(payload)
    }

    async fn show_modal(&self, _modal: ModalPayload) -> ApiResult<()> {
        self.record(MessagePayload::default())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
