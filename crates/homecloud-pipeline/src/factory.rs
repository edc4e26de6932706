use std::sync::Arc;

use homecloud_core::ProviderKind;

use crate::command::Command;
use crate::error::ConfigError;
use crate::provider::{ProviderHandle, ProviderRegistry};

/// Builds commands, resolving provider handles through the injected registry.
pub struct CommandFactory {
    registry: Arc<ProviderRegistry>,
}

impl CommandFactory {
    #[must_use]
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self { registry }
    }

    #[must_use]
    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Build a provider-agnostic command from an action pair.
    #[must_use]
    pub fn command<E>(
        &self,
        execute: impl Fn() -> Result<(), E> + Send + 'static,
        undo: impl Fn() -> Result<(), E> + Send + 'static,
    ) -> Command<E> {
        Command::new(execute, undo)
    }

    /// Build a command bound to a specific provider handle.
    #[must_use]
    pub fn bound_command<E>(
        &self,
        provider: ProviderHandle,
        execute: impl Fn(&ProviderHandle) -> Result<(), E> + Send + 'static,
        undo: impl Fn(&ProviderHandle) -> Result<(), E> + Send + 'static,
    ) -> Command<E> {
        Command::with_provider(provider, execute, undo)
    }

    /// Resolve the provider for `kind` and build a command bound to it.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ProviderUnregistered` if no provider of this
    /// kind was registered.
    pub fn command_for<E>(
        &self,
        kind: ProviderKind,
        execute: impl Fn(&ProviderHandle) -> Result<(), E> + Send + 'static,
        undo: impl Fn(&ProviderHandle) -> Result<(), E> + Send + 'static,
    ) -> Result<Command<E>, ConfigError> {
        let provider = self.registry.get(kind)?;
        Ok(self.bound_command(provider, execute, undo))
    }
}
