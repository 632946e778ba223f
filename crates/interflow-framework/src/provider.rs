//! Context providers.
//!
//! A [`ContextProvider`] owns one route table, one session store and a list
//! of global middleware. Executing an interaction against it:
//!
//! 1. parses the identifier into a route id and an optional session token,
//! 2. resolves the route (composite select paths, plain id, fallback),
//! 3. looks the session up,
//! 4. runs the global middleware followed by the route's middleware.
//!
//! ```rust,ignore
//! let provider = ContextProvider::<Order>::builder()
//!     .name("orders")
//!     .route("order", |ctx, next| async move {
//!         ctx.reply(EmbedReply::new(Panel::new("Order", "Pick a size"))
//!             .row(vec![ButtonSpec::new("Large", "size").into()]))
//!             .await?;
//!         next.advance().await
//!     })
//!     .build()?;
//! ```
//!
//! A provider with a fallback route only lets concrete routes through when
//! their session is live; see [`RequireSession`].

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use interflow_core::{BoxedInteraction, InteractionKind};
use tracing::{Instrument, debug, debug_span, trace};

use crate::context::RequestContext;
use crate::error::{BuildError, FlowResult};
use crate::middleware::{BoxedMiddleware, ExpiredNotice, Next, RequireSession, into_middleware};
use crate::reply::parse_identifier;
use crate::route::{FALLBACK_PATH, MatchMode, Route, RouteTable};
use crate::session::{SessionData, SessionSettings, SessionStore, SessionToken};

/// The outcome of executing an interaction against a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Execution {
    /// The interaction cannot be answered (not repliable, or autocomplete).
    Skipped,
    /// No route matched.
    Unmatched,
    /// A route matched and its chain ran to completion or stopped early.
    Handled {
        /// The path of the matched route.
        route: String,
        /// `true` if the fallback route matched.
        is_wildcard: bool,
    },
}

impl Execution {
    /// Returns `true` if a route handled the interaction.
    pub fn is_handled(&self) -> bool {
        matches!(self, Self::Handled { .. })
    }
}

/// Something that can execute interactions.
///
/// Implemented by every [`ContextProvider`], whatever its state type, so that
/// providers with different state types can share one
/// [`Dispatcher`](crate::Dispatcher).
#[async_trait]
pub trait InteractionHandler: Send + Sync + 'static {
    /// Returns the name used in logs.
    fn name(&self) -> &str;

    /// Executes `interaction`.
    async fn execute(&self, interaction: BoxedInteraction, mode: MatchMode)
    -> FlowResult<Execution>;
}

// ============================================================================
// ContextProvider
// ============================================================================

struct ProviderInner<S> {
    name: String,
    globals: Vec<BoxedMiddleware<S>>,
    routes: RouteTable<S>,
    sessions: Arc<SessionStore<S>>,
}

/// A route table, a session store and global middleware, bundled.
///
/// Cheap to clone.
pub struct ContextProvider<S> {
    inner: Arc<ProviderInner<S>>,
}

impl<S> Clone for ContextProvider<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: SessionData> ContextProvider<S> {
    /// Creates a builder.
    pub fn builder() -> ContextProviderBuilder<S> {
        ContextProviderBuilder::default()
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn routes(&self) -> &RouteTable<S> {
        &self.inner.routes
    }

    /// Returns the session store of this provider.
    pub fn sessions(&self) -> &Arc<SessionStore<S>> {
        &self.inner.sessions
    }

    /// Executes `interaction` against this provider.
    pub async fn execute(
        &self,
        interaction: BoxedInteraction,
        mode: MatchMode,
    ) -> FlowResult<Execution> {
        let span = debug_span!(
            "execute",
            provider = %self.inner.name,
            kind = %interaction.kind(),
            identifier = interaction.identifier(),
        );
        self.execute_inner(interaction, mode).instrument(span).await
    }

    async fn execute_inner(
        &self,
        interaction: BoxedInteraction,
        mode: MatchMode,
    ) -> FlowResult<Execution> {
        let kind = interaction.kind();
        if !interaction.is_repliable() || kind == InteractionKind::Autocomplete {
            trace!("interaction cannot be answered, skipped");
            return Ok(Execution::Skipped);
        }

        let (id, token): (String, Option<SessionToken>) = if kind.is_command() {
            (interaction.identifier().to_string(), None)
        } else {
            let parsed = parse_identifier(interaction.identifier());
            (parsed.id, parsed.token)
        };

        let selected: &[String] = if kind == InteractionKind::StringSelect {
            interaction.selected_values()
        } else {
            &[]
        };

        let Some(resolved) = self.inner.routes.resolve(&id, selected, mode) else {
            debug!(id = %id, "no route matched");
            return Ok(Execution::Unmatched);
        };
        let route = resolved.route;
        let is_wildcard = resolved.is_wildcard;

        let store = token
            .as_ref()
            .and_then(|token| self.inner.sessions.lookup(token.as_str()));
        debug!(
            route = route.path(),
            is_wildcard,
            has_store = store.is_some(),
            "route matched"
        );

        let chain: Arc<[BoxedMiddleware<S>]> = self
            .inner
            .globals
            .iter()
            .chain(route.middlewares())
            .cloned()
            .collect();

        let ctx = Arc::new(RequestContext::new(
            Arc::clone(&interaction),
            route.path().to_string(),
            store,
            is_wildcard,
            Arc::clone(&self.inner.sessions),
        ));
        Next::new(ctx, chain).advance().await?;

        Ok(Execution::Handled {
            route: route.path().to_string(),
            is_wildcard,
        })
    }
}

#[async_trait]
impl<S: SessionData> InteractionHandler for ContextProvider<S> {
    fn name(&self) -> &str {
        &self.inner.name
    }

    async fn execute(
        &self,
        interaction: BoxedInteraction,
        mode: MatchMode,
    ) -> FlowResult<Execution> {
        ContextProvider::execute(self, interaction, mode).await
    }
}

impl<S> fmt::Debug for ContextProvider<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextProvider")
            .field("name", &self.inner.name)
            .field("globals", &self.inner.globals.len())
            .field("routes", &self.inner.routes)
            .field("sessions", &self.inner.sessions)
            .finish()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`ContextProvider`].
pub struct ContextProviderBuilder<S> {
    name: String,
    settings: SessionSettings,
    notice: ExpiredNotice,
    globals: Vec<BoxedMiddleware<S>>,
    routes: Vec<Route<S>>,
}

impl<S> Default for ContextProviderBuilder<S> {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            settings: SessionSettings::default(),
            notice: ExpiredNotice::default(),
            globals: Vec::new(),
            routes: Vec::new(),
        }
    }
}

impl<S: SessionData> ContextProviderBuilder<S> {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn session_settings(mut self, settings: SessionSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the notice sent when a session is missing or expired.
    pub fn expired_notice(mut self, notice: ExpiredNotice) -> Self {
        self.notice = notice;
        self
    }

    /// Adds a global middleware, run before every route's chain.
    pub fn middleware<F, Fut>(self, f: F) -> Self
    where
        F: Fn(Arc<RequestContext<S>>, Next<S>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = FlowResult<()>> + Send + 'static,
    {
        self.middleware_boxed(into_middleware(f))
    }

    /// Adds an already boxed global middleware.
    pub fn middleware_boxed(mut self, middleware: BoxedMiddleware<S>) -> Self {
        self.globals.push(middleware);
        self
    }

    /// Adds a route with a single middleware.
    pub fn route<F, Fut>(self, path: impl Into<String>, f: F) -> Self
    where
        F: Fn(Arc<RequestContext<S>>, Next<S>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = FlowResult<()>> + Send + 'static,
    {
        self.route_chain(path, vec![into_middleware(f)])
    }

    /// Adds a route with an ordered middleware chain.
    pub fn route_chain(mut self, path: impl Into<String>, chain: Vec<BoxedMiddleware<S>>) -> Self {
        self.routes.push(Route::new(path, chain));
        self
    }

    /// Adds the fallback route.
    pub fn fallback<F, Fut>(self, f: F) -> Self
    where
        F: Fn(Arc<RequestContext<S>>, Next<S>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = FlowResult<()>> + Send + 'static,
    {
        self.route(FALLBACK_PATH, f)
    }

    /// Builds the provider.
    ///
    /// When a fallback route is registered, [`RequireSession`] is installed
    /// as the first global middleware.
    pub fn build(self) -> Result<ContextProvider<S>, BuildError> {
        if self.settings.max_entries == 0 {
            return Err(BuildError::InvalidSessionConfig {
                reason: "max_entries must be greater than zero".to_string(),
            });
        }
        if self.settings.max_age.is_zero() {
            return Err(BuildError::InvalidSessionConfig {
                reason: "max_age must be greater than zero".to_string(),
            });
        }

        let routes = RouteTable::new(self.routes)?;

        let mut globals = self.globals;
        if routes.has_fallback() {
            let guard: BoxedMiddleware<S> = Arc::new(RequireSession::new(self.notice));
            globals.insert(0, guard);
        }

        debug!(
            provider = %self.name,
            routes = routes.len(),
            globals = globals.len(),
            "context provider built"
        );

        Ok(ContextProvider {
            inner: Arc::new(ProviderInner {
                name: self.name,
                globals,
                routes,
                sessions: Arc::new(SessionStore::new(self.settings)),
            }),
        })
    }
}
