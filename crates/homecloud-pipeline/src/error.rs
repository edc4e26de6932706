use std::fmt::Debug;

use homecloud_core::{HandlerKind, ProviderKind};
use thiserror::Error;

/// Registry and wiring failures, raised fail-fast instead of degrading to
/// no-op commands.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("no provider registered for kind '{0}'")]
    ProviderUnregistered(ProviderKind),

    #[error("no handler constructor registered for kind '{0}'")]
    HandlerUnregistered(HandlerKind),

    #[error("provider kind '{0}' registered more than once")]
    DuplicateProvider(ProviderKind),

    #[error("handler kind '{0}' registered more than once")]
    DuplicateHandler(HandlerKind),

    #[error("handler kind '{handler}' cannot be bound to a '{provider}' provider")]
    ProviderMismatch {
        handler: HandlerKind,
        provider: ProviderKind,
    },
}

/// A single failed undo during the unwind of a failed pipeline.
#[derive(Debug, Error)]
#[error("undo failed for handler '{handler}'")]
pub struct UndoError<E> {
    /// Label of the handler whose undo failed.
    pub handler: String,
    /// The underlying error.
    #[source]
    pub source: E,
}

/// Error from running a command pipeline.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PipelineError<E: Debug> {
    /// A handler failed and the whole executed prefix was undone.
    #[error("handler '{handler}' failed")]
    StepFailed {
        /// Label of the handler that failed.
        handler: String,
        /// The error that caused the failure.
        #[source]
        source: E,
    },

    /// A handler failed and one or more undos in the prefix also failed.
    ///
    /// The unwind still visited every handler in the prefix; `undo_errors`
    /// lists the ones that failed, alongside the original step error.
    #[error("handler '{handler}' failed, and {} undo step(s) also failed", undo_errors.len())]
    UnwindFailed {
        /// Label of the handler that originally failed.
        handler: String,
        /// The error from the failed handler.
        step_error: E,
        /// Errors from failed undos, in unwind (reverse) order.
        undo_errors: Vec<UndoError<E>>,
    },

    /// A handler was processed before any command was attached to it.
    #[error("handler '{handler}' has no command attached")]
    CommandMissing {
        /// Label of the handler missing a command.
        handler: String,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}
