use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use homecloud_core::{ProviderError, Result};
use serde::{Deserialize, Serialize};

use crate::documents::JsonDocumentStore;
use crate::fs::LocalFileStore;
use crate::records::TomlRecordStore;

/// Layout of the local data directory, loadable from a TOML file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Base directory all three stores live under.
    pub data_dir: PathBuf,
    /// Record-store filename, relative to `data_dir`.
    pub records_file: String,
    /// Document-store directory, relative to `data_dir`.
    pub documents_dir: String,
    /// Storage-roots directory, relative to `data_dir`.
    pub storages_dir: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            records_file: String::from("records.toml"),
            documents_dir: String::from("documents"),
            storages_dir: String::from("storages"),
        }
    }
}

impl StoreConfig {
    /// Load the config from a TOML file, falling back to defaults when the
    /// file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|source| ProviderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ProviderError::Parse {
            path: path.to_path_buf(),
            source: Box::new(source),
        })
    }

    #[must_use]
    pub fn records_path(&self) -> PathBuf {
        self.data_dir.join(&self.records_file)
    }

    #[must_use]
    pub fn documents_path(&self) -> PathBuf {
        self.data_dir.join(&self.documents_dir)
    }

    #[must_use]
    pub fn storages_path(&self) -> PathBuf {
        self.data_dir.join(&self.storages_dir)
    }
}

/// The three opened provider singletons.
pub struct StoreSet {
    pub files: Arc<LocalFileStore>,
    pub records: Arc<TomlRecordStore>,
    pub documents: Arc<JsonDocumentStore>,
}

/// Open all three stores under the configured data directory.
///
/// # Errors
///
/// Returns an error if a directory cannot be created or the record file
/// cannot be loaded.
pub fn open_stores(config: &StoreConfig) -> Result<StoreSet> {
    fs::create_dir_all(&config.data_dir).map_err(|source| ProviderError::Io {
        path: config.data_dir.clone(),
        source,
    })?;
    Ok(StoreSet {
        files: Arc::new(LocalFileStore::open(config.storages_path())?),
        records: Arc::new(TomlRecordStore::open(config.records_path())?),
        documents: Arc::new(JsonDocumentStore::open(config.documents_path())?),
    })
}
