//! # Interflow Framework
//!
//! A stateful router for reply-once interactions.
//!
//! Each inbound interaction carries an identifier. For commands it is the
//! command name; for components and modal submissions it is
//! `"<route>;<session token>"`, written by an earlier reply. The router turns
//! that identifier back into a route and the session state saved alongside
//! the earlier reply, then runs the middleware chain bound to the route.
//!
//! This layer provides:
//! - [`SessionStore`]: bounded, time-aware storage for per-flow state
//! - [`RouteTable`]: path to middleware-chain bindings with a fallback route
//! - [`Middleware`] / [`Next`]: the explicitly advanced middleware pipeline
//! - [`reply`]: the compiler from declarative reply schemas to wire payloads
//! - [`ContextProvider`]: one route table + one session store + global middleware
//! - [`Dispatcher`]: fan-out of interactions over every registered provider
//!
//! ```text
//! interaction ─▶ Dispatcher ─▶ ContextProvider ─▶ global middleware ─▶ route middleware
//!                                   │                                     │
//!                                   └──── SessionStore ◀── reply() ◀──────┘
//! ```

pub mod context;
pub mod dispatcher;
pub mod error;
pub mod middleware;
pub mod provider;
pub mod reply;
pub mod route;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use context::RequestContext;
pub use dispatcher::{DispatchReport, Dispatcher, ProviderFailure};
pub use error::{BuildError, FlowError, FlowResult};
pub use middleware::{BoxedMiddleware, ExpiredNotice, Middleware, Next, RequireSession, into_middleware};
pub use provider::{ContextProvider, ContextProviderBuilder, Execution, InteractionHandler};
pub use reply::{
    ActionStyle, ButtonSpec, Component, EmbedReply, Footer, LinkButtonSpec, ModalField,
    ModalReply, MultiEmbedReply, Panel, ReplyOptions, ReplySchema, SelectOption, SelectSpec,
};
pub use route::{FALLBACK_PATH, MatchMode, Resolved, Route, RouteTable};
pub use session::{SessionConsumption, SessionData, SessionSettings, SessionStore, SessionToken};
