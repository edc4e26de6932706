//! Core types and provider contracts shared across the HomeCloud crates.

mod error;
mod name;
mod providers;
mod types;

pub use error::{ProviderError, Result};
pub use name::{validate_entry_name, validate_entry_path};
pub use providers::{DocumentProvider, FileProvider, RecordProvider};
pub use types::{CatalogRecord, FileRecord, HandlerKind, ProviderKind, StorageRecord};
