//! The event loop.
//!
//! The client layer owns the connection to the platform and forwards what it
//! receives as [`InboundEvent`]s. The runtime routes each one:
//!
//! - command invocations go to the [`CommandRegistry`]
//! - every other interaction goes to the [`Dispatcher`]
//! - voice-state updates are classified and broadcast to subscribers
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use interflow_runtime::InteractionRuntime;
//!
//! let runtime = InteractionRuntime::builder()
//!     .config_file("interflow.toml")
//!     .build()?;
//!
//! runtime.register_command(Ping);
//! runtime.register_provider(
//!     runtime
//!         .provider::<Order>()
//!         .name("orders")
//!         .route("order", order_menu)
//!         .build()?,
//! );
//!
//! let (tx, rx) = tokio::sync::mpsc::channel(256);
//! // hand `tx` to the client layer
//! runtime.setup().await?;
//! runtime.run_until_signal(rx).await;
//! ```

use std::path::Path;
use std::sync::Arc;

use interflow_core::BoxedInteraction;
use interflow_framework::{
    ContextProvider, ContextProviderBuilder, DispatchReport, Dispatcher, InteractionHandler,
    SessionData,
};
use parking_lot::RwLock;
use tokio::signal;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, debug_span, error, info, trace, warn};

use crate::command::{CommandRegistry, SlashCommand};
use crate::config::{ConfigLoader, InterflowConfig};
use crate::error::RuntimeResult;
use crate::logging;
use crate::voice::{VoiceEvent, VoiceState, classify};

/// Capacity of the voice event broadcast channel.
const VOICE_CHANNEL_CAPACITY: usize = 64;

/// An event forwarded by the client layer.
#[derive(Debug, Clone)]
pub enum InboundEvent {
    Interaction(BoxedInteraction),
    VoiceStateUpdate {
        before: VoiceState,
        after: VoiceState,
    },
}

/// What [`InteractionRuntime::handle`] did with an event.
#[derive(Debug, Clone)]
pub enum EventOutcome {
    /// A command invocation; `false` if no command owns the name.
    Command { handled: bool },
    /// A routed interaction.
    Dispatched(DispatchReport),
    /// A voice-state update, with the number of events broadcast.
    Voice { events: usize },
}

/// Routes inbound events to commands, providers and voice subscribers.
///
/// Cheap to clone; clones share their registries.
#[derive(Clone)]
pub struct InteractionRuntime {
    config: Arc<InterflowConfig>,
    commands: Arc<RwLock<CommandRegistry>>,
    dispatcher: Arc<RwLock<Dispatcher>>,
    voice: broadcast::Sender<VoiceEvent>,
}

impl InteractionRuntime {
    /// Creates a runtime builder that loads its configuration from files
    /// and the environment.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Creates a runtime from an already loaded configuration.
    ///
    /// Does not touch logging.
    pub fn from_config(config: InterflowConfig) -> Self {
        let dispatcher = Dispatcher::new().match_mode(config.dispatch.match_mode());
        let (voice, _) = broadcast::channel(VOICE_CHANNEL_CAPACITY);

        debug!(
            max_entries = config.session.max_entries,
            max_age_secs = config.session.max_age_secs,
            exact_match = config.dispatch.exact_match,
            "runtime created"
        );

        Self {
            config: Arc::new(config),
            commands: Arc::new(RwLock::new(CommandRegistry::new())),
            dispatcher: Arc::new(RwLock::new(dispatcher)),
            voice,
        }
    }

    pub fn config(&self) -> &InterflowConfig {
        &self.config
    }

    /// Returns a provider builder preset with the configured session settings
    /// and expired notice.
    pub fn provider<S: SessionData>(&self) -> ContextProviderBuilder<S> {
        ContextProvider::builder()
            .session_settings(self.config.session.settings())
            .expired_notice(self.config.dispatch.expired_notice.clone())
    }

    pub fn register_command(&self, command: impl SlashCommand) {
        self.commands.write().register(command);
    }

    pub fn register_provider(&self, provider: impl InteractionHandler) {
        self.dispatcher.write().register_provider(provider);
    }

    pub fn command_count(&self) -> usize {
        self.commands.read().len()
    }

    pub fn provider_count(&self) -> usize {
        self.dispatcher.read().provider_count()
    }

    /// Subscribes to classified voice events.
    ///
    /// Only events broadcast after subscribing are received.
    pub fn subscribe_voice(&self) -> broadcast::Receiver<VoiceEvent> {
        self.voice.subscribe()
    }

    /// Runs every command's setup hook.
    pub async fn setup(&self) -> RuntimeResult<()> {
        let commands = self.commands.read().clone();
        commands.setup_all().await?;
        info!(
            commands = commands.len(),
            providers = self.provider_count(),
            "interaction runtime ready"
        );
        Ok(())
    }

    /// Routes a single event.
    ///
    /// Failures are logged, never returned; one bad event does not stop the
    /// loop.
    pub async fn handle(&self, event: InboundEvent) -> EventOutcome {
        match event {
            InboundEvent::Interaction(interaction) if interaction.kind().is_command() => {
                let span = debug_span!("command", name = interaction.identifier());
                let commands = self.commands.read().clone();
                let handled = match commands.call(interaction).instrument(span).await {
                    Ok(handled) => handled,
                    Err(error) => {
                        error!(%error, "command failed");
                        true
                    }
                };
                EventOutcome::Command { handled }
            }
            InboundEvent::Interaction(interaction) => {
                let dispatcher = self.dispatcher.read().clone();
                EventOutcome::Dispatched(dispatcher.dispatch(interaction).await)
            }
            InboundEvent::VoiceStateUpdate { before, after } => {
                let events = classify(&before, &after);
                let count = events.len();
                for event in events {
                    trace!(user = %after.user_id, event = event.name(), "voice event");
                    // no subscribers is not an error
                    let _ = self.voice.send(event);
                }
                EventOutcome::Voice { events: count }
            }
        }
    }

    /// Handles events from `rx` until the channel closes or `shutdown` is
    /// cancelled, then waits for in-flight events.
    ///
    /// Each event is handled on its own task.
    pub async fn run(&self, mut rx: mpsc::Receiver<InboundEvent>, shutdown: CancellationToken) {
        let mut tasks = JoinSet::new();
        info!("interaction runtime running");

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    info!("shutdown requested");
                    break;
                }
                Some(result) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(error) = result {
                        error!(%error, "event task panicked");
                    }
                }
                event = rx.recv() => match event {
                    Some(event) => {
                        let runtime = self.clone();
                        tasks.spawn(async move {
                            runtime.handle(event).await;
                        });
                    }
                    None => {
                        debug!("event channel closed");
                        break;
                    }
                },
            }
        }

        while let Some(result) = tasks.join_next().await {
            if let Err(error) = result {
                error!(%error, "event task panicked");
            }
        }
        info!("interaction runtime stopped");
    }

    /// Like [`run`](Self::run), stopping on Ctrl+C or SIGTERM.
    pub async fn run_until_signal(&self, rx: mpsc::Receiver<InboundEvent>) {
        let shutdown = CancellationToken::new();
        let trigger = shutdown.clone();
        tokio::spawn(async move {
            wait_for_shutdown().await;
            trigger.cancel();
        });
        self.run(rx, shutdown).await;
    }
}

impl std::fmt::Debug for InteractionRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionRuntime")
            .field("commands", &*self.commands.read())
            .field("dispatcher", &*self.dispatcher.read())
            .finish_non_exhaustive()
    }
}

/// Waits for Ctrl+C or, on unix, SIGTERM.
async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = signal::ctrl_c() => info!("received Ctrl+C, shutting down"),
                    _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
                }
                return;
            }
            Err(error) => warn!(%error, "cannot listen for SIGTERM"),
        }
    }

    match signal::ctrl_c().await {
        Ok(()) => info!("received Ctrl+C, shutting down"),
        Err(error) => error!(%error, "cannot listen for Ctrl+C"),
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Loads the configuration, installs logging and creates the runtime.
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
    init_logging: bool,
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new(),
            init_logging: true,
        }
    }

    /// Sets a specific configuration file to load.
    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Sets the configuration profile.
    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Merges additional configuration programmatically.
    pub fn merge(mut self, config: InterflowConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Leaves the global subscriber alone.
    pub fn without_logging(mut self) -> Self {
        self.init_logging = false;
        self
    }

    pub fn build(self) -> RuntimeResult<InteractionRuntime> {
        let config = self.config_loader.load()?;
        if self.init_logging
            && let Err(error) = logging::init_from_config(&config.logging)
        {
            // most likely a subscriber installed by the host application
            debug!(%error, "logging not initialized");
        }
        Ok(InteractionRuntime::from_config(config))
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubInteraction;
    use async_trait::async_trait;
    use interflow_framework::{EmbedReply, FlowResult, Next, Panel, RequestContext};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Ping(Arc<AtomicUsize>);

    #[async_trait]
    impl SlashCommand for Ping {
        fn names(&self) -> Vec<String> {
            vec!["ping".into()]
        }

        async fn on_interaction(&self, _interaction: BoxedInteraction) -> FlowResult<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[derive(Debug, Clone, Default)]
    struct Cart;

    fn runtime() -> (InteractionRuntime, Arc<AtomicUsize>) {
        let runtime = InteractionRuntime::from_config(InterflowConfig::default());
        let pings = Arc::new(AtomicUsize::new(0));
        runtime.register_command(Ping(Arc::clone(&pings)));
        let provider = runtime
            .provider::<Cart>()
            .name("cart")
            .route("checkout", |ctx: Arc<RequestContext<Cart>>, next: Next<Cart>| async move {
                ctx.reply(EmbedReply::new(Panel::new("Checkout", "Done"))).await?;
                next.advance().await
            })
            .build()
            .unwrap();
        runtime.register_provider(provider);
        (runtime, pings)
    }

    #[tokio::test]
    async fn test_commands_bypass_dispatcher() {
        let (runtime, pings) = runtime();

        let outcome = runtime
            .handle(InboundEvent::Interaction(Arc::new(StubInteraction::command("ping"))))
            .await;
        assert!(matches!(outcome, EventOutcome::Command { handled: true }));
        assert_eq!(pings.load(Ordering::SeqCst), 1);

        // a command named like a route is not routed
        let outcome = runtime
            .handle(InboundEvent::Interaction(Arc::new(StubInteraction::command("checkout"))))
            .await;
        assert!(matches!(outcome, EventOutcome::Command { handled: false }));
    }

    #[tokio::test]
    async fn test_components_are_dispatched() {
        let (runtime, _) = runtime();
        let interaction = Arc::new(StubInteraction::button("checkout;gone"));

        let outcome = runtime
            .handle(InboundEvent::Interaction(interaction.clone()))
            .await;
        let EventOutcome::Dispatched(report) = outcome else {
            panic!("unexpected outcome: {outcome:?}");
        };
        assert_eq!(report.handled, vec!["cart".to_string()]);
        assert_eq!(interaction.reply_count(), 1);
    }

    #[tokio::test]
    async fn test_voice_updates_are_broadcast() {
        let (runtime, _) = runtime();
        let mut voice = runtime.subscribe_voice();

        let outcome = runtime
            .handle(InboundEvent::VoiceStateUpdate {
                before: VoiceState::new("7").in_channel("a"),
                after: VoiceState::new("7").in_channel("b"),
            })
            .await;
        assert!(matches!(outcome, EventOutcome::Voice { events: 2 }));
        assert_eq!(voice.recv().await.unwrap().name(), "quit");
        assert_eq!(voice.recv().await.unwrap().name(), "join");
    }

    #[tokio::test]
    async fn test_run_drains_channel() {
        let (runtime, pings) = runtime();
        let (tx, rx) = mpsc::channel(8);
        for _ in 0..3 {
            tx.send(InboundEvent::Interaction(Arc::new(StubInteraction::command("ping"))))
                .await
                .unwrap();
        }
        drop(tx);

        runtime.run(rx, CancellationToken::new()).await;
        assert_eq!(pings.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let (runtime, pings) = runtime();
        let (_tx, rx) = mpsc::channel(8);
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        runtime.run(rx, shutdown).await;
        assert_eq!(pings.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_setup_and_counts() {
        let (runtime, _) = runtime();
        assert_eq!(runtime.command_count(), 1);
        assert_eq!(runtime.provider_count(), 1);
        runtime.setup().await.unwrap();
    }

    #[test]
    fn test_provider_uses_configured_sessions() {
        let mut config = InterflowConfig::default();
        config.session.max_entries = 3;
        let runtime = InteractionRuntime::from_config(config);

        let provider = runtime.provider::<Cart>().build().unwrap();
        assert_eq!(provider.sessions().settings().max_entries, 3);
    }
}
