//! The middleware pipeline.
//!
//! A route runs an ordered chain of middleware: the provider's global
//! middleware first, then the route's own. Each middleware receives the
//! shared [`RequestContext`] and a [`Next`] cursor. Calling
//! [`Next::advance`] runs the rest of the chain; returning without calling it
//! stops the chain there.
//!
//! ```rust,ignore
//! let log = |ctx: Arc<RequestContext<State>>, next: Next<State>| async move {
//!     tracing::info!(route = ctx.route_path(), "handling");
//!     next.advance().await
//! };
//! ```
//!
//! `advance` consumes the cursor, so a middleware can advance at most once.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use interflow_core::{Embed, MessagePayload};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::context::RequestContext;
use crate::error::FlowResult;
use crate::session::SessionData;

/// A step of a route's middleware chain.
#[async_trait]
pub trait Middleware<S>: Send + Sync + 'static {
    /// Handles the request, optionally advancing to the rest of the chain.
    async fn handle(&self, ctx: Arc<RequestContext<S>>, next: Next<S>) -> FlowResult<()>;
}

#[async_trait]
impl<S, F, Fut> Middleware<S> for F
where
    S: SessionData,
    F: Fn(Arc<RequestContext<S>>, Next<S>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = FlowResult<()>> + Send + 'static,
{
    async fn handle(&self, ctx: Arc<RequestContext<S>>, next: Next<S>) -> FlowResult<()> {
        (self)(ctx, next).await
    }
}

/// A shared Middleware trait object.
pub type BoxedMiddleware<S> = Arc<dyn Middleware<S>>;

/// Boxes a middleware function.
pub fn into_middleware<S, F, Fut>(f: F) -> BoxedMiddleware<S>
where
    S: SessionData,
    F: Fn(Arc<RequestContext<S>>, Next<S>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = FlowResult<()>> + Send + 'static,
{
    Arc::new(f)
}

// ============================================================================
// Next
// ============================================================================

/// The cursor over the remaining middleware of a chain.
pub struct Next<S> {
    ctx: Arc<RequestContext<S>>,
    chain: Arc<[BoxedMiddleware<S>]>,
    index: usize,
}

impl<S: SessionData> Next<S> {
    pub(crate) fn new(ctx: Arc<RequestContext<S>>, chain: Arc<[BoxedMiddleware<S>]>) -> Self {
        Self {
            ctx,
            chain,
            index: 0,
        }
    }

    /// Returns the number of middleware left to run.
    pub fn remaining(&self) -> usize {
        self.chain.len().saturating_sub(self.index)
    }

    /// Runs the next middleware, which in turn decides whether to continue.
    ///
    /// Resolves immediately when the chain is exhausted.
    pub fn advance(self) -> BoxFuture<'static, FlowResult<()>> {
        Box::pin(async move {
            let Some(middleware) = self.chain.get(self.index).cloned() else {
                trace!(route = self.ctx.route_path(), "middleware chain exhausted");
                return Ok(());
            };
            trace!(
                route = self.ctx.route_path(),
                position = self.index,
                "advancing middleware chain"
            );
            let next = Next {
                ctx: Arc::clone(&self.ctx),
                chain: Arc::clone(&self.chain),
                index: self.index + 1,
            };
            middleware.handle(self.ctx, next).await
        })
    }
}

impl<S> fmt::Debug for Next<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("index", &self.index)
            .field("len", &self.chain.len())
            .finish()
    }
}

// ============================================================================
// RequireSession
// ============================================================================

/// The notice sent when a continuation arrives after its session is gone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpiredNotice {
    /// Embed title.
    pub title: String,
    /// Embed body text.
    pub description: String,
    /// Embed accent color as `0xRRGGBB`.
    pub color: u32,
}

impl Default for ExpiredNotice {
    fn default() -> Self {
        Self {
            title: "❌  Session expired".to_string(),
            description: "This interaction has expired, try again.".to_string(),
            color: 0x2C2F33,
        }
    }
}

impl ExpiredNotice {
    /// Builds the message payload of this notice. It clears the components
    /// of the message it replaces.
    pub fn to_payload(&self) -> MessagePayload {
        MessagePayload {
            content: None,
            embeds: Some(vec![Embed {
                title: Some(self.title.clone()),
                description: Some(self.description.clone()),
                color: Some(self.color),
                ..Default::default()
            }]),
            components: Some(Vec::new()),
            flags: None,
        }
    }
}

/// Stops requests whose session could not be found.
///
/// Installed in front of every chain of a provider that has a fallback
/// route. A request that matched a concrete route but carries no session
/// gets the [`ExpiredNotice`] and goes no further. Fallback matches always
/// pass.
#[derive(Debug, Clone, Default)]
pub struct RequireSession {
    notice: ExpiredNotice,
}

impl RequireSession {
    /// Creates the middleware with a custom notice.
    pub fn new(notice: ExpiredNotice) -> Self {
        Self { notice }
    }

    /// The notice sent for a missing session.
    pub fn notice(&self) -> &ExpiredNotice {
        &self.notice
    }
}

#[async_trait]
impl<S: SessionData> Middleware<S> for RequireSession {
    async fn handle(&self, ctx: Arc<RequestContext<S>>, next: Next<S>) -> FlowResult<()> {
        let interaction = ctx.interaction();
        if !interaction.is_repliable() {
            return Ok(());
        }
        if ctx.is_wildcard() || ctx.has_store() {
            return next.advance().await;
        }

        debug!(route = ctx.route_path(), "session missing or expired");

        let kind = interaction.kind();
        let edits_ephemeral = (kind.is_message_component() || kind.is_modal_submit())
            && interaction
                .source_message()
                .is_some_and(|message| message.ephemeral);

        let payload = self.notice.to_payload();
        if edits_ephemeral {
            interaction.update(payload).await?;
        } else {
            interaction.reply(payload.ephemeral()).await?;
        }
        Ok(())
    }
}
