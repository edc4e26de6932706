use std::fmt::Debug;
use std::sync::Arc;

use homecloud_core::HandlerKind;

use crate::audit::PipelineAudit;
use crate::error::{ConfigError, PipelineError, UndoError};
use crate::handler::CommandHandler;
use crate::registry::HandlerRegistry;

/// Ordered pipeline of command handlers with reverse-order compensation.
///
/// Handlers execute in registration order. On the first failure the
/// already-executed prefix is undone back-to-front; every undo in the prefix
/// is attempted even if some fail, and the result reports the original step
/// error together with any undo errors.
///
/// A processor is single-use by convention: build a fresh instance per
/// logical business transaction.
pub struct CommandProcessor<E> {
    registry: Arc<HandlerRegistry<E>>,
    handlers: Vec<CommandHandler<E>>,
}

impl<E: Debug> CommandProcessor<E> {
    #[must_use]
    pub fn new(registry: Arc<HandlerRegistry<E>>) -> Self {
        Self {
            registry,
            handlers: Vec::new(),
        }
    }

    /// Append a handler to the pipeline, returning it for command binding.
    pub fn add_handler(&mut self, handler: CommandHandler<E>) -> &mut CommandHandler<E> {
        self.handlers.push(handler);
        self.handlers
            .last_mut()
            .expect("handler was pushed just above")
    }

    /// Build a handler of the requested kind through the registry and
    /// append it to the pipeline.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the kind (or its provider) is not
    /// registered.
    pub fn create_handler(
        &mut self,
        kind: HandlerKind,
    ) -> Result<&mut CommandHandler<E>, ConfigError> {
        let handler = self.registry.create(kind)?;
        Ok(self.add_handler(handler))
    }

    #[must_use]
    pub fn handlers(&self) -> &[CommandHandler<E>] {
        &self.handlers
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Execute all handlers in registration order.
    ///
    /// # Errors
    ///
    /// Returns `CommandMissing` (before any execution) if a handler has no
    /// command, `StepFailed` when a handler fails and the whole prefix is
    /// undone, or `UnwindFailed` when undos fail too.
    pub fn process(&mut self) -> Result<(), PipelineError<E>> {
        let mut audit = PipelineAudit::new();
        self.process_internal(&mut audit)
    }

    /// Execute like [`Self::process`], additionally returning the audit
    /// trail of the run.
    pub fn process_with_audit(&mut self) -> (Result<(), PipelineError<E>>, PipelineAudit) {
        let mut audit = PipelineAudit::new();
        let result = self.process_internal(&mut audit);
        (result, audit)
    }

    fn process_internal(&mut self, audit: &mut PipelineAudit) -> Result<(), PipelineError<E>> {
        // Guard the whole pipeline up front: no handler may run before every
        // handler has a command attached.
        if let Some(handler) = self.handlers.iter().find(|h| !h.has_command()) {
            return Err(PipelineError::CommandMissing {
                handler: handler.label().to_string(),
            });
        }

        for index in 0..self.handlers.len() {
            let label = self.handlers[index].label().to_string();
            audit.record_start(&label);

            let command = self.handlers[index]
                .command_mut()
                .expect("checked before the loop");
            match command.execute() {
                Ok(()) => audit.record_success(),
                Err(source) => {
                    audit.record_failure();
                    let undo_errors = self.unwind(index, audit);
                    return Err(if undo_errors.is_empty() {
                        PipelineError::StepFailed {
                            handler: label,
                            source,
                        }
                    } else {
                        PipelineError::UnwindFailed {
                            handler: label,
                            step_error: source,
                            undo_errors,
                        }
                    });
                }
            }
        }

        Ok(())
    }

    /// Undo handlers `failed_index - 1 .. 0`, collecting undo failures
    /// without aborting the walk.
    fn unwind(&mut self, failed_index: usize, audit: &mut PipelineAudit) -> Vec<UndoError<E>> {
        let mut undo_errors = Vec::new();

        for index in (0..failed_index).rev() {
            let label = self.handlers[index].label().to_string();
            let command = self.handlers[index]
                .command_mut()
                .expect("executed handlers have commands");
            match command.undo() {
                Ok(()) => audit.record_undone(index),
                Err(source) => {
                    audit.record_undo_failed(index);
                    undo_errors.push(UndoError {
                        handler: label,
                        source,
                    });
                }
            }
        }

        undo_errors
    }
}
