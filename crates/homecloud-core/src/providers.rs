use std::path::PathBuf;

use serde_json::Value;

use crate::Result;
use crate::types::{CatalogRecord, FileRecord, StorageRecord};

/// Storage roots, catalog directories and file contents on disk.
///
/// `storage` is the storage id; `path` arguments are `/`-separated paths
/// relative to the storage root.
pub trait FileProvider: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the root already exists or cannot be created.
    fn create_storage_root(&self, storage: &str) -> Result<PathBuf>;

    /// Remove a storage root. The root must be empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the root is missing, not empty, or removal fails.
    fn remove_storage_root(&self, storage: &str) -> Result<()>;

    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    fn create_catalog_dir(&self, storage: &str, path: &str) -> Result<()>;

    /// Remove a catalog directory. The directory must be empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory is missing, not empty, or removal
    /// fails.
    fn remove_catalog_dir(&self, storage: &str, path: &str) -> Result<()>;

    /// Write file contents, replacing any existing entry at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn store_file(&self, storage: &str, path: &str, contents: &[u8]) -> Result<()>;

    /// # Errors
    ///
    /// Returns an error if the file is missing or cannot be read.
    fn read_file(&self, storage: &str, path: &str) -> Result<Vec<u8>>;

    /// # Errors
    ///
    /// Returns an error if the file is missing or removal fails.
    fn delete_file(&self, storage: &str, path: &str) -> Result<()>;

    /// # Errors
    ///
    /// Returns an error if existence cannot be determined.
    fn file_exists(&self, storage: &str, path: &str) -> Result<bool>;
}

/// Relational-style records for storages, catalogs and files.
pub trait RecordProvider: Send + Sync {
    /// # Errors
    ///
    /// Returns `AlreadyExists` if a storage with the same id is present.
    fn insert_storage(&self, record: &StorageRecord) -> Result<()>;

    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn get_storage(&self, id: &str) -> Result<Option<StorageRecord>>;

    /// Delete a storage record, returning the removed record.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no storage with this id exists.
    fn delete_storage(&self, id: &str) -> Result<StorageRecord>;

    /// # Errors
    ///
    /// Returns `AlreadyExists` if a catalog with the same id is present.
    fn insert_catalog(&self, record: &CatalogRecord) -> Result<()>;

    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn get_catalog(&self, id: &str) -> Result<Option<CatalogRecord>>;

    /// Delete a catalog record, returning the removed record.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no catalog with this id exists.
    fn delete_catalog(&self, id: &str) -> Result<CatalogRecord>;

    /// All catalogs belonging to a storage, in stable order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn list_catalogs(&self, storage_id: &str) -> Result<Vec<CatalogRecord>>;

    /// # Errors
    ///
    /// Returns `AlreadyExists` if a file with the same id is present.
    fn insert_file(&self, record: &FileRecord) -> Result<()>;

    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn get_file(&self, id: &str) -> Result<Option<FileRecord>>;

    /// Delete a file record, returning the removed record.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no file with this id exists.
    fn delete_file(&self, id: &str) -> Result<FileRecord>;

    /// All files belonging to a catalog, in stable order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn list_files(&self, catalog_id: &str) -> Result<Vec<FileRecord>>;
}

/// Aggregation documents keyed by collection and key.
///
/// Mutating operations return the previous document so callers can restore
/// it during compensation.
pub trait DocumentProvider: Send + Sync {
    /// Insert or replace a document, returning the previous one if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be written.
    fn upsert(&self, collection: &str, key: &str, document: &Value) -> Result<Option<Value>>;

    /// # Errors
    ///
    /// Returns an error if the document cannot be read.
    fn get(&self, collection: &str, key: &str) -> Result<Option<Value>>;

    /// Remove a document, returning it if it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if removal fails.
    fn remove(&self, collection: &str, key: &str) -> Result<Option<Value>>;
}
