//! Slash command registry.
//!
//! Commands bypass the interaction router: a command invocation is looked up
//! by name and handed to the [`SlashCommand`] that owns it.
//!
//! ```rust,ignore
//! struct Ping;
//!
//! #[async_trait]
//! impl SlashCommand for Ping {
//!     fn names(&self) -> Vec<String> {
//!         vec!["ping".into()]
//!     }
//!
//!     async fn on_interaction(&self, interaction: BoxedInteraction) -> FlowResult<()> {
//!         interaction.reply(MessagePayload::default().ephemeral()).await?;
//!         Ok(())
//!     }
//! }
//!
//! let mut commands = CommandRegistry::new();
//! commands.register(Ping);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use interflow_core::BoxedInteraction;
use interflow_framework::FlowResult;
use tracing::{debug, trace, warn};

use crate::error::{RuntimeError, RuntimeResult};

/// A command owning one or more command definitions.
#[async_trait]
pub trait SlashCommand: Send + Sync + 'static {
    /// The names of the definitions this command answers.
    fn names(&self) -> Vec<String>;

    /// Called once before the runtime starts receiving events.
    async fn on_setup(&self) -> FlowResult<()> {
        Ok(())
    }

    /// Handles an invocation of one of [`names`](Self::names).
    async fn on_interaction(&self, interaction: BoxedInteraction) -> FlowResult<()>;
}

/// Commands indexed by definition name.
#[derive(Default, Clone)]
pub struct CommandRegistry {
    commands: Vec<Arc<dyn SlashCommand>>,
    by_name: HashMap<String, Arc<dyn SlashCommand>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `command` under each of its names.
    ///
    /// A name already owned by another command is taken over.
    pub fn register(&mut self, command: impl SlashCommand) {
        let command: Arc<dyn SlashCommand> = Arc::new(command);
        for name in command.names() {
            if self
                .by_name
                .insert(name.clone(), Arc::clone(&command))
                .is_some()
            {
                warn!(command = %name, "command registered twice, keeping the latest");
            }
        }
        self.commands.push(command);
    }

    /// Returns the command owning `name`.
    pub fn get(&self, name: &str) -> Option<Arc<dyn SlashCommand>> {
        self.by_name.get(name).cloned()
    }

    /// Returns the number of command names.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Runs every registered command's setup hook, in registration order.
    ///
    /// Commands whose names were all taken over by later registrations are
    /// skipped.
    pub async fn setup_all(&self) -> RuntimeResult<()> {
        for command in &self.commands {
            let names = command.names();
            let live = names
                .iter()
                .any(|name| self.by_name.get(name).is_some_and(|c| Arc::ptr_eq(c, command)));
            if !live {
                continue;
            }

            command.on_setup().await.map_err(|source| RuntimeError::Setup {
                command: names.join(","),
                source,
            })?;
            trace!(command = %names.join(","), "command set up");
        }
        Ok(())
    }

    /// Hands `interaction` to the command owning its identifier.
    ///
    /// Returns `Ok(false)` when no command owns it.
    pub async fn call(&self, interaction: BoxedInteraction) -> FlowResult<bool> {
        let Some(command) = self.get(interaction.identifier()) else {
            debug!(command = interaction.identifier(), "no command registered");
            return Ok(false);
        };
        command.on_interaction(interaction).await?;
        Ok(true)
    }
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.by_name.keys().collect();
        names.sort();
        f.debug_struct("CommandRegistry")
            .field("names", &names)
            .finish()
    }
}
