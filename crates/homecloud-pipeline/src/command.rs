use std::fmt;

use crate::provider::ProviderHandle;

/// A forward or inverse action attached to a [`Command`].
pub type Action<E> = Box<dyn Fn() -> Result<(), E> + Send>;

/// A reversible unit of work: a forward action plus its inverse.
///
/// Actions are bound once at construction and immutable afterwards;
/// rebinding means constructing a new command. A missing action makes the
/// corresponding call a no-op that still toggles the completion flag.
pub struct Command<E> {
    execute: Option<Action<E>>,
    undo: Option<Action<E>>,
    completed: bool,
}

impl<E> Command<E> {
    /// Create a command from a forward action and its inverse.
    #[must_use]
    pub fn new(
        execute: impl Fn() -> Result<(), E> + Send + 'static,
        undo: impl Fn() -> Result<(), E> + Send + 'static,
    ) -> Self {
        Self::from_actions(Some(Box::new(execute)), Some(Box::new(undo)))
    }

    /// Create a command with no inverse; `undo` becomes a no-op.
    #[must_use]
    pub fn execute_only(execute: impl Fn() -> Result<(), E> + Send + 'static) -> Self {
        Self::from_actions(Some(Box::new(execute)), None)
    }

    /// Create a command bound to a provider handle.
    ///
    /// The handle is captured up front, so the stored actions close over it
    /// and the caller-supplied closures receive it on every invocation.
    #[must_use]
    pub fn with_provider(
        provider: ProviderHandle,
        execute: impl Fn(&ProviderHandle) -> Result<(), E> + Send + 'static,
        undo: impl Fn(&ProviderHandle) -> Result<(), E> + Send + 'static,
    ) -> Self {
        let undo_provider = provider.clone();
        Self::new(move || execute(&provider), move || undo(&undo_provider))
    }

    pub(crate) fn from_actions(execute: Option<Action<E>>, undo: Option<Action<E>>) -> Self {
        Self {
            execute,
            undo,
            completed: false,
        }
    }

    /// Run the forward action and mark the command completed.
    ///
    /// # Errors
    ///
    /// Propagates the forward action's error unmodified; the command stays
    /// not-completed in that case.
    pub fn execute(&mut self) -> Result<(), E> {
        if let Some(action) = &self.execute {
            action()?;
        }
        self.completed = true;
        Ok(())
    }

    /// Run the inverse action and mark the command not completed.
    ///
    /// # Errors
    ///
    /// Propagates the inverse action's error unmodified; the command stays
    /// completed in that case.
    pub fn undo(&mut self) -> Result<(), E> {
        if let Some(action) = &self.undo {
            action()?;
        }
        self.completed = false;
        Ok(())
    }

    /// True after a successful `execute`, false initially and after `undo`.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }
}

impl<E> fmt::Debug for Command<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("execute", &self.execute.is_some())
            .field("undo", &self.undo.is_some())
            .field("completed", &self.completed)
            .finish()
    }
}
