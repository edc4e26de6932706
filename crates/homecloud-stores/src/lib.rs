//! Local backing stores for HomeCloud.
//!
//! Three stores implement the `homecloud-core` provider contracts against
//! the local disk: storage roots and file contents under a directory tree,
//! records in a single TOML file, and aggregation documents as JSON files.
//! Server-backed providers would plug in behind the same traits.

mod config;
mod documents;
mod fs;
mod records;

pub use config::{StoreConfig, StoreSet, open_stores};
pub use documents::JsonDocumentStore;
pub use fs::LocalFileStore;
pub use records::TomlRecordStore;
