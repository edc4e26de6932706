use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use homecloud_core::{DocumentProvider, ProviderError, Result, validate_entry_name};
use serde_json::Value;
use tracing::debug;

/// Document provider storing one JSON file per (collection, key).
///
/// Collections are directories under the store root; documents are
/// pretty-printed JSON files named `<key>.json`.
pub struct JsonDocumentStore {
    root: PathBuf,
}

impl JsonDocumentStore {
    /// Open the store, creating the root directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the root cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| ProviderError::Io {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn document_path(&self, collection: &str, key: &str) -> Result<PathBuf> {
        validate_entry_name(collection)?;
        validate_entry_name(key)?;
        Ok(self.root.join(collection).join(format!("{key}.json")))
    }

    fn read_document(&self, path: &Path) -> Result<Option<Value>> {
        let content = match fs::read(path) {
            Ok(content) => content,
            Err(source) if source.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ProviderError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let value = serde_json::from_slice(&content).map_err(|source| ProviderError::Parse {
            path: path.to_path_buf(),
            source: Box::new(source),
        })?;
        Ok(Some(value))
    }
}

impl DocumentProvider for JsonDocumentStore {
    fn upsert(&self, collection: &str, key: &str, document: &Value) -> Result<Option<Value>> {
        let path = self.document_path(collection, key)?;
        let previous = self.read_document(&path)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ProviderError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let content =
            serde_json::to_vec_pretty(document).map_err(|source| ProviderError::Serialize {
                path: path.clone(),
                source: Box::new(source),
            })?;
        fs::write(&path, content).map_err(|source| ProviderError::Io {
            path: path.clone(),
            source,
        })?;

        debug!(collection, key, replaced = previous.is_some(), "upserted document");
        Ok(previous)
    }

    fn get(&self, collection: &str, key: &str) -> Result<Option<Value>> {
        let path = self.document_path(collection, key)?;
        self.read_document(&path)
    }

    fn remove(&self, collection: &str, key: &str) -> Result<Option<Value>> {
        let path = self.document_path(collection, key)?;
        let previous = self.read_document(&path)?;
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(source) if source.kind() == io::ErrorKind::NotFound => {}
            Err(source) => return Err(ProviderError::Io { path, source }),
        }
        debug!(collection, key, existed = previous.is_some(), "removed document");
        Ok(previous)
    }
}
