use std::fmt::Debug;
use std::sync::Arc;

use homecloud_core::HandlerKind;

use crate::command::Command;
use crate::error::{ConfigError, PipelineError};
use crate::factory::CommandFactory;
use crate::provider::ProviderHandle;

/// One resolved provider coupled with one command.
///
/// A handler owns its command (created lazily, replaced on each
/// `create_command`) and shares the provider with every other handler bound
/// to the same kind. Handlers are attached to a [`crate::CommandProcessor`]
/// and executed in registration order.
pub struct CommandHandler<E> {
    kind: HandlerKind,
    label: String,
    provider: ProviderHandle,
    factory: Arc<CommandFactory>,
    command: Option<Command<E>>,
}

impl<E> Debug for CommandHandler<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandHandler")
            .field("kind", &self.kind)
            .field("label", &self.label)
            .field("provider", &self.provider.kind())
            .field("has_command", &self.command.is_some())
            .finish()
    }
}

impl<E> CommandHandler<E> {
    /// Couple a provider handle with the given handler kind.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ProviderMismatch` if the handle's capability
    /// does not match the handler kind.
    pub fn new(
        kind: HandlerKind,
        provider: ProviderHandle,
        factory: Arc<CommandFactory>,
    ) -> Result<Self, ConfigError> {
        if provider.kind() != kind.provider_kind() {
            return Err(ConfigError::ProviderMismatch {
                handler: kind,
                provider: provider.kind(),
            });
        }
        Ok(Self {
            kind,
            label: kind.as_str().to_string(),
            provider,
            factory,
            command: None,
        })
    }

    #[must_use]
    pub fn kind(&self) -> HandlerKind {
        self.kind
    }

    /// Label used in errors and audit records; defaults to the kind name.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.set_label(label);
        self
    }

    #[must_use]
    pub fn provider(&self) -> &ProviderHandle {
        &self.provider
    }

    #[must_use]
    pub fn has_command(&self) -> bool {
        self.command.is_some()
    }

    /// True when the current command executed successfully and was not
    /// undone since.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.command.as_ref().is_some_and(Command::is_completed)
    }

    /// Build a provider-bound command through the factory and store it as
    /// this handler's current command, replacing any previous one.
    pub fn create_command(
        &mut self,
        execute: impl Fn(&ProviderHandle) -> Result<(), E> + Send + 'static,
        undo: impl Fn(&ProviderHandle) -> Result<(), E> + Send + 'static,
    ) -> &Command<E> {
        let command = self
            .factory
            .bound_command(self.provider.clone(), execute, undo);
        self.command.insert(command)
    }

    pub(crate) fn command_mut(&mut self) -> Option<&mut Command<E>> {
        self.command.as_mut()
    }
}

impl<E: Debug> CommandHandler<E> {
    /// Execute the current command.
    ///
    /// # Errors
    ///
    /// Returns `CommandMissing` if no command was created yet, or
    /// `StepFailed` carrying the action's error.
    pub fn execute(&mut self) -> Result<(), PipelineError<E>> {
        let label = self.label.clone();
        match self.command.as_mut() {
            None => Err(PipelineError::CommandMissing { handler: label }),
            Some(command) => command.execute().map_err(|source| {
                PipelineError::StepFailed {
                    handler: label,
                    source,
                }
            }),
        }
    }

    /// Undo the current command.
    ///
    /// # Errors
    ///
    /// Returns `CommandMissing` if no command was created yet, or
    /// `StepFailed` carrying the inverse action's error.
    pub fn undo(&mut self) -> Result<(), PipelineError<E>> {
        let label = self.label.clone();
        match self.command.as_mut() {
            None => Err(PipelineError::CommandMissing { handler: label }),
            Some(command) => command.undo().map_err(|source| PipelineError::StepFailed {
                handler: label,
                source,
            }),
        }
    }
}
