use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use homecloud_core::{
    CatalogRecord, FileRecord, ProviderError, RecordProvider, Result, StorageRecord,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Default, Serialize, Deserialize)]
struct RecordTables {
    #[serde(default)]
    storages: BTreeMap<String, StorageRecord>,
    #[serde(default)]
    catalogs: BTreeMap<String, CatalogRecord>,
    #[serde(default)]
    files: BTreeMap<String, FileRecord>,
}

/// Record provider persisting all tables to one TOML file.
///
/// The file is loaded once at open; every successful mutation rewrites it.
/// Failed mutations leave neither the tables nor the file modified.
pub struct TomlRecordStore {
    path: PathBuf,
    tables: Mutex<RecordTables>,
}

impl TomlRecordStore {
    /// Open the store, loading existing tables if the file is present.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let tables = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|source| ProviderError::Io {
                path: path.clone(),
                source,
            })?;
            toml::from_str(&content).map_err(|source| ProviderError::Parse {
                path: path.clone(),
                source: Box::new(source),
            })?
        } else {
            RecordTables::default()
        };
        Ok(Self {
            path,
            tables: Mutex::new(tables),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read<T>(&self, f: impl FnOnce(&RecordTables) -> T) -> T {
        let tables = self.tables.lock().expect("record tables lock poisoned");
        f(&tables)
    }

    fn mutate<T>(&self, f: impl FnOnce(&mut RecordTables) -> Result<T>) -> Result<T> {
        let mut tables = self.tables.lock().expect("record tables lock poisoned");
        let value = f(&mut tables)?;
        let content = toml::to_string_pretty(&*tables).map_err(|source| {
            ProviderError::Serialize {
                path: self.path.clone(),
                source: Box::new(source),
            }
        })?;
        fs::write(&self.path, content).map_err(|source| ProviderError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(value)
    }
}

impl RecordProvider for TomlRecordStore {
    fn insert_storage(&self, record: &StorageRecord) -> Result<()> {
        self.mutate(|tables| {
            if tables.storages.contains_key(&record.id) {
                return Err(ProviderError::AlreadyExists {
                    entity: "storage",
                    id: record.id.clone(),
                });
            }
            tables.storages.insert(record.id.clone(), record.clone());
            Ok(())
        })?;
        debug!(id = %record.id, name = %record.name, "inserted storage record");
        Ok(())
    }

    fn get_storage(&self, id: &str) -> Result<Option<StorageRecord>> {
        Ok(self.read(|tables| tables.storages.get(id).cloned()))
    }

    fn delete_storage(&self, id: &str) -> Result<StorageRecord> {
        let record = self.mutate(|tables| {
            tables.storages.remove(id).ok_or(ProviderError::NotFound {
                entity: "storage",
                id: id.to_string(),
            })
        })?;
        debug!(id, "deleted storage record");
        Ok(record)
    }

    fn insert_catalog(&self, record: &CatalogRecord) -> Result<()> {
        self.mutate(|tables| {
            if tables.catalogs.contains_key(&record.id) {
                return Err(ProviderError::AlreadyExists {
                    entity: "catalog",
                    id: record.id.clone(),
                });
            }
            tables.catalogs.insert(record.id.clone(), record.clone());
            Ok(())
        })?;
        debug!(id = %record.id, storage = %record.storage_id, "inserted catalog record");
        Ok(())
    }

    fn get_catalog(&self, id: &str) -> Result<Option<CatalogRecord>> {
        Ok(self.read(|tables| tables.catalogs.get(id).cloned()))
    }

    fn delete_catalog(&self, id: &str) -> Result<CatalogRecord> {
        let record = self.mutate(|tables| {
            tables.catalogs.remove(id).ok_or(ProviderError::NotFound {
                entity: "catalog",
                id: id.to_string(),
            })
        })?;
        debug!(id, "deleted catalog record");
        Ok(record)
    }

    fn list_catalogs(&self, storage_id: &str) -> Result<Vec<CatalogRecord>> {
        Ok(self.read(|tables| {
            tables
                .catalogs
                .values()
                .filter(|c| c.storage_id == storage_id)
                .cloned()
                .collect()
        }))
    }

    fn insert_file(&self, record: &FileRecord) -> Result<()> {
        self.mutate(|tables| {
            if tables.files.contains_key(&record.id) {
                return Err(ProviderError::AlreadyExists {
                    entity: "file",
                    id: record.id.clone(),
                });
            }
            tables.files.insert(record.id.clone(), record.clone());
            Ok(())
        })?;
        debug!(id = %record.id, catalog = %record.catalog_id, "inserted file record");
        Ok(())
    }

    fn get_file(&self, id: &str) -> Result<Option<FileRecord>> {
        Ok(self.read(|tables| tables.files.get(id).cloned()))
    }

    fn delete_file(&self, id: &str) -> Result<FileRecord> {
        let record = self.mutate(|tables| {
            tables.files.remove(id).ok_or(ProviderError::NotFound {
                entity: "file",
                id: id.to_string(),
            })
        })?;
        debug!(id, "deleted file record");
        Ok(record)
    }

    fn list_files(&self, catalog_id: &str) -> Result<Vec<FileRecord>> {
        Ok(self.read(|tables| {
            tables
                .files
                .values()
                .filter(|f| f.catalog_id == catalog_id)
                .cloned()
                .collect()
        }))
    }
}
