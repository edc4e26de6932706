use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use homecloud_core::{
    FileProvider, ProviderError, Result, validate_entry_name, validate_entry_path,
};
use tracing::debug;

/// File-system provider rooted at a configured directory.
///
/// Storage roots are direct children of the root; catalog directories and
/// files live below their storage root at `/`-separated relative paths.
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    /// Open the store, creating the root directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the root cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| io_err(&root, source))?;
        Ok(Self { root })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn storage_path(&self, storage: &str) -> Result<PathBuf> {
        validate_entry_name(storage)?;
        Ok(self.root.join(storage))
    }

    fn entry_path(&self, storage: &str, path: &str) -> Result<PathBuf> {
        let mut full = self.storage_path(storage)?;
        validate_entry_path(path)?;
        for segment in path.split('/') {
            full.push(segment);
        }
        Ok(full)
    }
}

impl FileProvider for LocalFileStore {
    fn create_storage_root(&self, storage: &str) -> Result<PathBuf> {
        let path = self.storage_path(storage)?;
        fs::create_dir(&path).map_err(|source| {
            if source.kind() == io::ErrorKind::AlreadyExists {
                ProviderError::AlreadyExists {
                    entity: "storage root",
                    id: storage.to_string(),
                }
            } else {
                io_err(&path, source)
            }
        })?;
        debug!(storage, path = %path.display(), "created storage root");
        Ok(path)
    }

    fn remove_storage_root(&self, storage: &str) -> Result<()> {
        let path = self.storage_path(storage)?;
        remove_empty_dir(&path, "storage root", storage)?;
        debug!(storage, "removed storage root");
        Ok(())
    }

    fn create_catalog_dir(&self, storage: &str, path: &str) -> Result<()> {
        let storage_root = self.storage_path(storage)?;
        if !storage_root.is_dir() {
            return Err(ProviderError::NotFound {
                entity: "storage root",
                id: storage.to_string(),
            });
        }
        let dir = self.entry_path(storage, path)?;
        fs::create_dir_all(&dir).map_err(|source| io_err(&dir, source))?;
        debug!(storage, path, "created catalog directory");
        Ok(())
    }

    fn remove_catalog_dir(&self, storage: &str, path: &str) -> Result<()> {
        let dir = self.entry_path(storage, path)?;
        remove_empty_dir(&dir, "catalog directory", path)?;
        debug!(storage, path, "removed catalog directory");
        Ok(())
    }

    fn store_file(&self, storage: &str, path: &str, contents: &[u8]) -> Result<()> {
        let file = self.entry_path(storage, path)?;
        fs::write(&file, contents).map_err(|source| io_err(&file, source))?;
        debug!(storage, path, bytes = contents.len(), "stored file");
        Ok(())
    }

    fn read_file(&self, storage: &str, path: &str) -> Result<Vec<u8>> {
        let file = self.entry_path(storage, path)?;
        fs::read(&file).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                ProviderError::NotFound {
                    entity: "file",
                    id: path.to_string(),
                }
            } else {
                io_err(&file, source)
            }
        })
    }

    fn delete_file(&self, storage: &str, path: &str) -> Result<()> {
        let file = self.entry_path(storage, path)?;
        fs::remove_file(&file).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                ProviderError::NotFound {
                    entity: "file",
                    id: path.to_string(),
                }
            } else {
                io_err(&file, source)
            }
        })?;
        debug!(storage, path, "deleted file");
        Ok(())
    }

    fn file_exists(&self, storage: &str, path: &str) -> Result<bool> {
        let file = self.entry_path(storage, path)?;
        file.try_exists().map_err(|source| io_err(&file, source))
    }
}

fn io_err(path: &Path, source: io::Error) -> ProviderError {
    ProviderError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn remove_empty_dir(path: &Path, entity: &'static str, id: &str) -> Result<()> {
    if !path.is_dir() {
        return Err(ProviderError::NotFound {
            entity,
            id: id.to_string(),
        });
    }
    let mut entries = fs::read_dir(path).map_err(|source| io_err(path, source))?;
    if entries.next().is_some() {
        return Err(ProviderError::NotEmpty {
            entity,
            id: id.to_string(),
        });
    }
    fs::remove_dir(path).map_err(|source| io_err(path, source))
}
