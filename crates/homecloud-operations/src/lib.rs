//! Business operations for the HomeCloud data-storage layer.
//!
//! Every mutating operation spans several backing stores (file system,
//! records, aggregation documents) and runs as one compensating pipeline:
//! either all steps commit, or the already-applied prefix is undone in
//! reverse order and the caller sees the original failure.

mod context;
mod error;
pub mod operations;

#[cfg(test)]
pub mod mocks;

pub use context::StorageContext;
pub use error::{OperationError, Result, UndoFailure};
