//! Compensating command pipeline for multi-store business operations.
//!
//! A business operation builds one [`CommandProcessor`], attaches a command
//! handler per step (each bound to one backing-store provider), and calls
//! [`CommandProcessor::process`]. Handlers execute in registration order; on
//! the first failure the already-executed prefix is undone in reverse order
//! and the original error is returned.

mod audit;
mod command;
mod error;
mod factory;
mod handler;
mod processor;
mod provider;
mod registry;

pub use audit::{HandlerRecord, HandlerStatus, PipelineAudit};
pub use command::{Action, Command};
pub use error::{ConfigError, PipelineError, UndoError};
pub use factory::CommandFactory;
pub use handler::CommandHandler;
pub use processor::CommandProcessor;
pub use provider::{ProviderHandle, ProviderRegistry, ProviderRegistryBuilder};
pub use registry::{HandlerCtor, HandlerRegistry, HandlerRegistryBuilder};
