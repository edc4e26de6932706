use std::fmt;

use serde::{Deserialize, Serialize};

/// One category of backing store a command can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
    /// Storage roots, catalog directories and file contents on disk.
    FileSystem,
    /// Storage, catalog and file records.
    DataStore,
    /// Aggregation documents (summaries, usage counters).
    Aggregation,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 3] = [
        ProviderKind::FileSystem,
        ProviderKind::DataStore,
        ProviderKind::Aggregation,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::FileSystem => "file-system",
            ProviderKind::DataStore => "data-store",
            ProviderKind::Aggregation => "aggregation",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tag selecting which provider a command handler is built against.
///
/// One concrete handler type carries this tag; the handler registry
/// dispatches on it when constructing handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HandlerKind {
    FileSystem,
    DataStore,
    Aggregation,
}

impl HandlerKind {
    pub const ALL: [HandlerKind; 3] = [
        HandlerKind::FileSystem,
        HandlerKind::DataStore,
        HandlerKind::Aggregation,
    ];

    /// The provider kind a handler of this kind resolves at construction.
    #[must_use]
    pub fn provider_kind(self) -> ProviderKind {
        match self {
            HandlerKind::FileSystem => ProviderKind::FileSystem,
            HandlerKind::DataStore => ProviderKind::DataStore,
            HandlerKind::Aggregation => ProviderKind::Aggregation,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            HandlerKind::FileSystem => "file-system",
            HandlerKind::DataStore => "data-store",
            HandlerKind::Aggregation => "aggregation",
        }
    }
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A storage: the top-level container a user owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageRecord {
    pub id: String,
    pub name: String,
    pub quota_bytes: Option<u64>,
}

/// A catalog: a directory-like grouping inside a storage.
///
/// `path` is the catalog's directory path relative to the storage root,
/// derived from the parent chain at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub id: String,
    pub storage_id: String,
    pub parent_id: Option<String>,
    pub name: String,
    pub path: String,
}

/// A file entry inside a catalog. `path` is relative to the storage root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: String,
    pub catalog_id: String,
    pub name: String,
    pub path: String,
    pub size_bytes: u64,
}
