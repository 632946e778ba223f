//! Per-request context.

use std::fmt;
use std::sync::Arc;

use interflow_core::{BoxedInteraction, Interaction};
use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, trace};

use crate::error::FlowResult;
use crate::reply::{self, CompiledReply, Delivery, DeliveryInput, ReplyOptions, ReplySchema};
use crate::session::{SessionData, SessionStore};

/// The state shared by every middleware of one request.
///
/// The context holds the mutable request state (`store`), seeded from the
/// session the interaction referred to, or from `S::default()` when none was
/// found. Replies with continuations snapshot this state into the provider's
/// session store.
pub struct RequestContext<S> {
    interaction: BoxedInteraction,
    route_path: String,
    store: Mutex<S>,
    has_store: bool,
    is_wildcard: bool,
    sessions: Arc<SessionStore<S>>,
}

impl<S: SessionData> RequestContext<S> {
    pub(crate) fn new(
        interaction: BoxedInteraction,
        route_path: String,
        store: Option<S>,
        is_wildcard: bool,
        sessions: Arc<SessionStore<S>>,
    ) -> Self {
        Self {
            interaction,
            route_path,
            has_store: store.is_some(),
            store: Mutex::new(store.unwrap_or_default()),
            is_wildcard,
            sessions,
        }
    }

    /// Returns the interaction being handled.
    pub fn interaction(&self) -> &dyn Interaction {
        self.interaction.as_ref()
    }

    /// Returns a shared handle to the interaction being handled.
    pub fn interaction_handle(&self) -> BoxedInteraction {
        Arc::clone(&self.interaction)
    }

    /// Returns the path of the matched route.
    pub fn route_path(&self) -> &str {
        &self.route_path
    }

    /// Returns `true` if a live session was found for this request.
    pub fn has_store(&self) -> bool {
        self.has_store
    }

    /// Returns `true` if the request matched the fallback route.
    pub fn is_wildcard(&self) -> bool {
        self.is_wildcard
    }

    /// Locks the request state.
    ///
    /// Do not hold the guard across an `.await`.
    pub fn store(&self) -> MutexGuard<'_, S> {
        self.store.lock()
    }

    /// Applies `f` to the request state.
    pub fn update_store<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        f(&mut self.store.lock())
    }

    /// Returns a copy of the request state.
    pub fn snapshot_store(&self) -> S {
        self.store.lock().clone()
    }

    /// Returns the session store of the provider handling this request.
    pub fn sessions(&self) -> &SessionStore<S> {
        &self.sessions
    }

    /// Sends `schema` with the default [`ReplyOptions`].
    pub async fn reply(&self, schema: impl Into<ReplySchema>) -> FlowResult<()> {
        self.reply_with(schema, ReplyOptions::default()).await
    }

    /// Compiles and sends `schema`.
    ///
    /// Does nothing if the interaction is no longer repliable. When the
    /// schema holds continuations, the current state is saved under a new
    /// session token first and the token is written into every continuation
    /// identifier.
    pub async fn reply_with(
        &self,
        schema: impl Into<ReplySchema>,
        options: ReplyOptions,
    ) -> FlowResult<()> {
        let schema = schema.into();
        let interaction = self.interaction();
        if !interaction.is_repliable() {
            debug!(route = %self.route_path, "interaction not repliable, reply skipped");
            return Ok(());
        }

        let delivery = reply::plan_delivery(&DeliveryInput::new(interaction, &schema, options))?;
        reply::validate(&schema)?;

        let token = if reply::requires_continuation(&schema) {
            Some(self.sessions.insert(self.snapshot_store())?)
        } else {
            None
        };

        trace!(?delivery, token = ?token.as_ref().map(|t| t.as_str()), "sending reply");
        match (reply::compile(&schema, token.as_ref())?, delivery) {
            (CompiledReply::Modal(modal), _) => interaction.show_modal(modal).await?,
            (CompiledReply::Message(payload), Delivery::Reply) => {
                interaction.reply(payload.ephemeral()).await?
            }
            (CompiledReply::Message(payload), Delivery::FollowUp) => {
                interaction.follow_up(payload.ephemeral()).await?
            }
            (CompiledReply::Message(payload), Delivery::Update) => {
                interaction.update(payload).await?
            }
            (CompiledReply::Message(payload), Delivery::EditReply | Delivery::ShowModal) => {
                interaction.edit_reply(payload).await?
            }
        }
        Ok(())
    }
}

impl<S> fmt::Debug for RequestContext<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("interaction", &self.interaction)
            .field("route_path", &self.route_path)
            .field("has_store", &self.has_store)
            .field("is_wildcard", &self.is_wildcard)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reply::{ButtonSpec, EmbedReply, ModalField, ModalReply, Panel, parse_identifier};
    use crate::testing::{MockInteraction, Sent};
    use crate::{FlowError, SessionSettings};
    use interflow_core::InteractionKind;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Order {
        size: Option<String>,
    }

    fn context(interaction: Arc<MockInteraction>) -> RequestContext<Order> {
        RequestContext::new(
            interaction,
            "order".to_string(),
            None,
            false,
            Arc::new(SessionStore::new(SessionSettings::default())),
        )
    }

    fn panel() -> Panel {
        Panel::new("Order", "Pick a size")
    }

    #[tokio::test]
    async fn test_reply_without_continuation_saves_nothing() {
        let interaction = Arc::new(MockInteraction::command("order"));
        let ctx = context(Arc::clone(&interaction));

        ctx.reply(EmbedReply::new(panel())).await.unwrap();

        assert!(ctx.sessions().is_empty());
        let sent = interaction.sent();
        assert!(matches!(&sent[..], [Sent::Reply(payload)] if payload.is_ephemeral()));
    }

    #[tokio::test]
    async fn test_reply_with_continuation_snapshots_store() {
        let interaction = Arc::new(MockInteraction::command("order"));
        let ctx = context(Arc::clone(&interaction));
        ctx.update_store(|order| order.size = Some("large".into()));

        ctx.reply(EmbedReply::new(panel()).row(vec![ButtonSpec::new("Confirm", "confirm").into()]))
            .await
            .unwrap();

        let sent = interaction.sent();
        let [Sent::Reply(payload)] = &sent[..] else {
            panic!("unexpected calls: {sent:?}");
        };
        let custom_id = payload.components.as_ref().unwrap()[0].components[0]
            .custom_id()
            .unwrap()
            .to_string();
        let parsed = parse_identifier(&custom_id);
        assert_eq!(parsed.id, "confirm");

        let token = parsed.token.unwrap();
        let saved = ctx.sessions().get(token.as_str()).unwrap();
        assert_eq!(saved.size.as_deref(), Some("large"));

        // later mutations do not leak into the saved snapshot
        ctx.store().size = Some("small".into());
        let saved = ctx.sessions().get(token.as_str()).unwrap();
        assert_eq!(saved.size.as_deref(), Some("large"));
    }

    #[tokio::test]
    async fn test_component_reply_updates_source() {
        let interaction = Arc::new(MockInteraction::button("order;t"));
        let ctx = context(Arc::clone(&interaction));

        ctx.reply(EmbedReply::new(panel())).await.unwrap();
        ctx.reply(EmbedReply::new(panel())).await.unwrap();
        ctx.reply_with(EmbedReply::new(panel()), ReplyOptions::new_message())
            .await
            .unwrap();

        let sent = interaction.sent();
        assert!(matches!(sent[0], Sent::Update(_)));
        assert!(matches!(sent[1], Sent::EditReply(_)));
        assert!(matches!(&sent[2], Sent::FollowUp(payload) if payload.is_ephemeral()));
    }

    #[tokio::test]
    async fn test_modal_from_command() {
        let interaction = Arc::new(MockInteraction::command("feedback"));
        let ctx = context(Arc::clone(&interaction));

        ctx.reply(ModalReply::new("submit", "Feedback").field(ModalField::new("text", "Text")))
            .await
            .unwrap();

        assert_eq!(ctx.sessions().len(), 1);
        let sent = interaction.sent();
        assert!(matches!(&sent[..], [Sent::Modal(modal)] if modal.custom_id.starts_with("submit;")));
    }

    #[tokio::test]
    async fn test_modal_from_modal_submit_fails() {
        let interaction = Arc::new(MockInteraction::modal_submit("submit;t"));
        let ctx = context(Arc::clone(&interaction));

        let err = ctx.reply(ModalReply::new("again", "Again")).await.unwrap_err();
        assert!(matches!(
            err,
            FlowError::UnsupportedModal {
                kind: InteractionKind::ModalSubmit
            }
        ));
        assert!(ctx.sessions().is_empty());
        assert!(interaction.sent().is_empty());
    }

    #[tokio::test]
    async fn test_unrepliable_reply_is_noop() {
        let interaction = Arc::new(MockInteraction::command("order").unrepliable());
        let ctx = context(Arc::clone(&interaction));

        ctx.reply(EmbedReply::new(panel()).row(vec![ButtonSpec::new("Go", "go").into()]))
            .await
            .unwrap();

        assert!(ctx.sessions().is_empty());
        assert!(interaction.sent().is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_surfaces() {
        let interaction = Arc::new(MockInteraction::command("order").failing());
        let ctx = context(Arc::clone(&interaction));

        let err = ctx.reply(EmbedReply::new(panel())).await.unwrap_err();
        assert!(matches!(err, FlowError::Transport(_)));
    }

    #[tokio::test]
    async fn test_deferred_command_edits_reply() {
        let interaction = Arc::new(MockInteraction::command("order").deferred());
        let ctx = context(Arc::clone(&interaction));

        ctx.reply(EmbedReply::new(panel())).await.unwrap();
        assert!(matches!(&interaction.sent()[..], [Sent::EditReply(_)]));
    }
}
