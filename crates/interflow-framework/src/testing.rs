//! Test doubles.

use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use interflow_core::{
    ApiError, ApiResult, Interaction, InteractionKind, MessagePayload, ModalPayload, SourceMessage,
};
use parking_lot::Mutex;

/// A call recorded by [`MockInteraction`].
#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Reply(MessagePayload),
    Update(MessagePayload),
    EditReply(MessagePayload),
    FollowUp(MessagePayload),
    Modal(ModalPayload),
}

/// An in-memory interaction that records what is sent through it.
#[derive(Debug)]
pub struct MockInteraction {
    kind: InteractionKind,
    identifier: String,
    values: Vec<String>,
    source: Option<SourceMessage>,
    repliable: bool,
    deferred: bool,
    failing: bool,
    replied: AtomicBool,
    sent: Mutex<Vec<Sent>>,
}

impl MockInteraction {
    fn new(kind: InteractionKind, identifier: &str) -> Self {
        Self {
            kind,
            identifier: identifier.to_string(),
            values: Vec::new(),
            source: None,
            repliable: true,
            deferred: false,
            failing: false,
            replied: AtomicBool::new(false),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn command(name: &str) -> Self {
        Self::new(InteractionKind::Command, name)
    }

    pub fn button(custom_id: &str) -> Self {
        Self::new(InteractionKind::Button, custom_id).from_message(false)
    }

    pub fn select(custom_id: &str, values: &[&str]) -> Self {
        let mut mock = Self::new(InteractionKind::StringSelect, custom_id).from_message(false);
        mock.values = values.iter().map(|v| v.to_string()).collect();
        mock
    }

    pub fn modal_submit(custom_id: &str) -> Self {
        Self::new(InteractionKind::ModalSubmit, custom_id)
    }

    pub fn autocomplete(name: &str) -> Self {
        Self::new(InteractionKind::Autocomplete, name)
    }

    pub fn from_message(mut self, ephemeral: bool) -> Self {
        self.source = Some(SourceMessage { ephemeral });
        self
    }

    pub fn deferred(mut self) -> Self {
        self.deferred = true;
        self
    }

    pub fn unrepliable(mut self) -> Self {
        self.repliable = false;
        self
    }

    /// Makes every transport call fail.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().clone()
    }

    fn record(&self, sent: Sent) -> ApiResult<()> {
        if self.failing {
            return Err(ApiError::rejected(50_001, "missing access"));
        }
        self.sent.lock().push(sent);
        self.replied.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn first_response(&self, sent: Sent) -> ApiResult<()> {
        if self.is_acknowledged() {
            return Err(ApiError::AlreadyAcknowledged);
        }
        self.record(sent)
    }
}

#[async_trait]
impl Interaction for MockInteraction {
    fn kind(&self) -> InteractionKind {
        self.kind
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn selected_values(&self) -> &[String] {
        &self.values
    }

    fn source_message(&self) -> Option<SourceMessage> {
        self.source
    }

    fn is_repliable(&self) -> bool {
        self.repliable
    }

    fn is_deferred(&self) -> bool {
        self.deferred
    }

    fn is_replied(&self) -> bool {
        self.replied.load(Ordering::SeqCst)
    }

    async fn reply(&self, payload: MessagePayload) -> ApiResult<()> {
        self.first_response(Sent::Reply(payload))
    }

    async fn update(&self, payload: MessagePayload) -> ApiResult<()> {
        self.first_response(Sent::Update(payload))
    }

    async fn edit_reply(&self, payload: MessagePayload) -> ApiResult<()> {
        self.record(Sent::EditReply(payload))
    }

    async fn follow_up(&self, payload: MessagePayload) -> ApiResult<()> {
        self.record(Sent::FollowUp(payload))
    }

    async fn show_modal(&self, modal: ModalPayload) -> ApiResult<()> {
        self.first_response(Sent::Modal(modal))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
