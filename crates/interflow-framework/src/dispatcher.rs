//! Interaction dispatcher.
//!
//! The [`Dispatcher`] holds every registered provider and hands each inbound
//! interaction to all of them. Providers own disjoint route tables in
//! practice, so at most one is expected to match; the dispatcher does not
//! stop at the first match.
//!
//! ```rust,ignore
//! use interflow_framework::{ContextProvider, Dispatcher};
//!
//! let dispatcher = Dispatcher::new()
//!     .with_provider(orders)
//!     .with_provider(settings);
//!
//! let report = dispatcher.dispatch(interaction).await;
//! ```
//!
//! Matching is exact by default: a provider's fallback route only answers
//! when the dispatcher is switched to [`MatchMode::Fallback`].

use std::convert::Infallible;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::join_all;
use interflow_core::BoxedInteraction;
use tower::Service;
use tracing::{Instrument, debug, debug_span, error};

use crate::error::FlowError;
use crate::provider::{Execution, InteractionHandler};
use crate::route::MatchMode;

/// A provider whose execution failed.
#[derive(Debug, Clone)]
pub struct ProviderFailure {
    pub provider: String,
    pub error: FlowError,
}

/// What happened when an interaction was dispatched.
#[derive(Debug, Clone, Default)]
pub struct DispatchReport {
    /// Names of the providers that handled the interaction.
    pub handled: Vec<String>,
    /// Providers that failed.
    pub failures: Vec<ProviderFailure>,
}

impl DispatchReport {
    /// Returns `true` if any provider handled the interaction.
    pub fn is_handled(&self) -> bool {
        !self.handled.is_empty()
    }
}

/// The registry of interaction handlers.
///
/// `Dispatcher` is cheap to clone and can be shared across tasks.
#[derive(Clone)]
pub struct Dispatcher {
    providers: Vec<Arc<dyn InteractionHandler>>,
    mode: MatchMode,
}

impl Dispatcher {
    /// Creates an empty dispatcher using exact matching.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
            mode: MatchMode::Exact,
        }
    }

    /// Registers a provider.
    pub fn register_provider(&mut self, provider: impl InteractionHandler) {
        self.providers.push(Arc::new(provider));
    }

    /// Registers a provider (builder pattern).
    pub fn with_provider(mut self, provider: impl InteractionHandler) -> Self {
        self.register_provider(provider);
        self
    }

    /// Sets the match mode passed to every provider.
    pub fn match_mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Returns the number of registered providers.
    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    /// Removes every provider.
    pub fn clear(&mut self) {
        self.providers.clear();
    }

    /// Executes `interaction` against every provider concurrently.
    ///
    /// A failing provider is logged and reported; it does not affect the
    /// others.
    pub async fn dispatch(&self, interaction: BoxedInteraction) -> DispatchReport {
        let span = debug_span!(
            "dispatch",
            kind = %interaction.kind(),
            identifier = interaction.identifier(),
        );

        async {
            let outcomes = join_all(self.providers.iter().map(|provider| {
                let interaction = Arc::clone(&interaction);
                async move { (provider.name(), provider.execute(interaction, self.mode).await) }
            }))
            .await;

            let mut report = DispatchReport::default();
            for (name, outcome) in outcomes {
                match outcome {
                    Ok(Execution::Handled { route, .. }) => {
                        debug!(provider = name, route = %route, "interaction handled");
                        report.handled.push(name.to_string());
                    }
                    Ok(_) => {}
                    Err(error) => {
                        error!(provider = name, error = %error, "provider failed");
                        report.failures.push(ProviderFailure {
                            provider: name.to_string(),
                            error,
                        });
                    }
                }
            }
            report
        }
        .instrument(span)
        .await
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("provider_count", &self.providers.len())
            .field("mode", &self.mode)
            .finish()
    }
}

/// `Dispatcher` as a Tower service, so it can be wrapped in layers such as
/// timeouts or concurrency limits.
impl Service<BoxedInteraction> for Dispatcher {
    type Response = DispatchReport;
    type Error = Infallible;
    type Future =
        Pin<Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, interaction: BoxedInteraction) -> Self::Future {
        let dispatcher = self.clone();
        Box::pin(async move { Ok(dispatcher.dispatch(interaction).await) })
    }
}
