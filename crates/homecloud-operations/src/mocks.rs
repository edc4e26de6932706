use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::sync::Mutex;

use homecloud_core::{
    CatalogRecord, DocumentProvider, FileProvider, FileRecord, ProviderError, RecordProvider,
    Result, StorageRecord,
};
use serde_json::Value;

fn injected_failure(op: &str) -> ProviderError {
    ProviderError::Io {
        path: PathBuf::from(format!("<injected {op}>")),
        source: std::io::Error::other(format!("injected failure in {op}")),
    }
}

/// In-memory file provider with per-operation failure injection.
pub struct MockFileProvider {
    roots: Mutex<HashSet<String>>,
    dirs: Mutex<HashSet<String>>,
    files: Mutex<BTreeMap<String, Vec<u8>>>,
    calls: Mutex<Vec<String>>,
    fail_on: Mutex<HashSet<&'static str>>,
}

impl MockFileProvider {
    #[must_use]
    pub fn new() -> Self {
        Self {
            roots: Mutex::new(HashSet::new()),
            dirs: Mutex::new(HashSet::new()),
            files: Mutex::new(BTreeMap::new()),
            calls: Mutex::new(Vec::new()),
            fail_on: Mutex::new(HashSet::new()),
        }
    }

    /// Make the named operation fail until cleared.
    pub fn set_fail_on(&self, op: &'static str) {
        self.fail_on.lock().expect("lock poisoned").insert(op);
    }

    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("lock poisoned").clone()
    }

    #[must_use]
    pub fn has_root(&self, storage: &str) -> bool {
        self.roots.lock().expect("lock poisoned").contains(storage)
    }

    #[must_use]
    pub fn has_dir(&self, storage: &str, path: &str) -> bool {
        self.dirs
            .lock()
            .expect("lock poisoned")
            .contains(&format!("{storage}/{path}"))
    }

    #[must_use]
    pub fn file_contents(&self, storage: &str, path: &str) -> Option<Vec<u8>> {
        self.files
            .lock()
            .expect("lock poisoned")
            .get(&format!("{storage}/{path}"))
            .cloned()
    }

    fn check(&self, op: &'static str, detail: &str) -> Result<()> {
        self.calls
            .lock()
            .expect("lock poisoned")
            .push(format!("{op} {detail}"));
        if self.fail_on.lock().expect("lock poisoned").contains(op) {
            return Err(injected_failure(op));
        }
        Ok(())
    }
}

impl Default for MockFileProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl FileProvider for MockFileProvider {
    fn create_storage_root(&self, storage: &str) -> Result<PathBuf> {
        self.check("create_storage_root", storage)?;
        let mut roots = self.roots.lock().expect("lock poisoned");
        if !roots.insert(storage.to_string()) {
            return Err(ProviderError::AlreadyExists {
                entity: "storage root",
                id: storage.to_string(),
            });
        }
        Ok(PathBuf::from(storage))
    }

    fn remove_storage_root(&self, storage: &str) -> Result<()> {
        self.check("remove_storage_root", storage)?;
        let mut roots = self.roots.lock().expect("lock poisoned");
        if !roots.remove(storage) {
            return Err(ProviderError::NotFound {
                entity: "storage root",
                id: storage.to_string(),
            });
        }
        Ok(())
    }

    fn create_catalog_dir(&self, storage: &str, path: &str) -> Result<()> {
        self.check("create_catalog_dir", &format!("{storage}/{path}"))?;
        self.dirs
            .lock()
            .expect("lock poisoned")
            .insert(format!("{storage}/{path}"));
        Ok(())
    }

    fn remove_catalog_dir(&self, storage: &str, path: &str) -> Result<()> {
        self.check("remove_catalog_dir", &format!("{storage}/{path}"))?;
        self.dirs
            .lock()
            .expect("lock poisoned")
            .remove(&format!("{storage}/{path}"));
        Ok(())
    }

    fn store_file(&self, storage: &str, path: &str, contents: &[u8]) -> Result<()> {
        self.check("store_file", &format!("{storage}/{path}"))?;
        self.files
            .lock()
            .expect("lock poisoned")
            .insert(format!("{storage}/{path}"), contents.to_vec());
        Ok(())
    }

    fn read_file(&self, storage: &str, path: &str) -> Result<Vec<u8>> {
        self.check("read_file", &format!("{storage}/{path}"))?;
        self.files
            .lock()
            .expect("lock poisoned")
            .get(&format!("{storage}/{path}"))
            .cloned()
            .ok_or(ProviderError::NotFound {
                entity: "file",
                id: path.to_string(),
            })
    }

    fn delete_file(&self, storage: &str, path: &str) -> Result<()> {
        self.check("delete_file", &format!("{storage}/{path}"))?;
        let mut files = self.files.lock().expect("lock poisoned");
        if files.remove(&format!("{storage}/{path}")).is_none() {
            return Err(ProviderError::NotFound {
                entity: "file",
                id: path.to_string(),
            });
        }
        Ok(())
    }

    fn file_exists(&self, storage: &str, path: &str) -> Result<bool> {
        Ok(self
            .files
            .lock()
            .expect("lock poisoned")
            .contains_key(&format!("{storage}/{path}")))
    }
}

/// In-memory record provider with per-operation failure injection.
pub struct MockRecordProvider {
    storages: Mutex<BTreeMap<String, StorageRecord>>,
    catalogs: Mutex<BTreeMap<String, CatalogRecord>>,
    files: Mutex<BTreeMap<String, FileRecord>>,
    calls: Mutex<Vec<String>>,
    fail_on: Mutex<HashSet<&'static str>>,
}

impl MockRecordProvider {
    #[must_use]
    pub fn new() -> Self {
        Self {
            storages: Mutex::new(BTreeMap::new()),
            catalogs: Mutex::new(BTreeMap::new()),
            files: Mutex::new(BTreeMap::new()),
            calls: Mutex::new(Vec::new()),
            fail_on: Mutex::new(HashSet::new()),
        }
    }

    #[must_use]
    pub fn with_storage(self, record: StorageRecord) -> Self {
        self.storages
            .lock()
            .expect("lock poisoned")
            .insert(record.id.clone(), record);
        self
    }

    #[must_use]
    pub fn with_catalog(self, record: CatalogRecord) -> Self {
        self.catalogs
            .lock()
            .expect("lock poisoned")
            .insert(record.id.clone(), record);
        self
    }

    #[must_use]
    pub fn with_file(self, record: FileRecord) -> Self {
        self.files
            .lock()
            .expect("lock poisoned")
            .insert(record.id.clone(), record);
        self
    }

    /// Make the named operation fail until cleared.
    pub fn set_fail_on(&self, op: &'static str) {
        self.fail_on.lock().expect("lock poisoned").insert(op);
    }

    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("lock poisoned").clone()
    }

    fn check(&self, op: &'static str, detail: &str) -> Result<()> {
        self.calls
            .lock()
            .expect("lock poisoned")
            .push(format!("{op} {detail}"));
        if self.fail_on.lock().expect("lock poisoned").contains(op) {
            return Err(injected_failure(op));
        }
        Ok(())
    }
}

impl Default for MockRecordProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordProvider for MockRecordProvider {
    fn insert_storage(&self, record: &StorageRecord) -> Result<()> {
        self.check("insert_storage", &record.id)?;
        let mut storages = self.storages.lock().expect("lock poisoned");
        if storages.contains_key(&record.id) {
            return Err(ProviderError::AlreadyExists {
                entity: "storage",
                id: record.id.clone(),
            });
        }
        storages.insert(record.id.clone(), record.clone());
        Ok(())
    }

    fn get_storage(&self, id: &str) -> Result<Option<StorageRecord>> {
        Ok(self.storages.lock().expect("lock poisoned").get(id).cloned())
    }

    fn delete_storage(&self, id: &str) -> Result<StorageRecord> {
        self.check("delete_storage", id)?;
        self.storages
            .lock()
            .expect("lock poisoned")
            .remove(id)
            .ok_or(ProviderError::NotFound {
                entity: "storage",
                id: id.to_string(),
            })
    }

    fn insert_catalog(&self, record: &CatalogRecord) -> Result<()> {
        self.check("insert_catalog", &record.id)?;
        let mut catalogs = self.catalogs.lock().expect("lock poisoned");
        if catalogs.contains_key(&record.id) {
            return Err(ProviderError::AlreadyExists {
                entity: "catalog",
                id: record.id.clone(),
            });
        }
        catalogs.insert(record.id.clone(), record.clone());
        Ok(())
    }

    fn get_catalog(&self, id: &str) -> Result<Option<CatalogRecord>> {
        Ok(self.catalogs.lock().expect("lock poisoned").get(id).cloned())
    }

    fn delete_catalog(&self, id: &str) -> Result<CatalogRecord> {
        self.check("delete_catalog", id)?;
        self.catalogs
            .lock()
            .expect("lock poisoned")
            .remove(id)
            .ok_or(ProviderError::NotFound {
                entity: "catalog",
                id: id.to_string(),
            })
    }

    fn list_catalogs(&self, storage_id: &str) -> Result<Vec<CatalogRecord>> {
        Ok(self
            .catalogs
            .lock()
            .expect("lock poisoned")
            .values()
            .filter(|c| c.storage_id == storage_id)
            .cloned()
            .collect())
    }

    fn insert_file(&self, record: &FileRecord) -> Result<()> {
        self.check("insert_file", &record.id)?;
        let mut files = self.files.lock().expect("lock poisoned");
        if files.contains_key(&record.id) {
            return Err(ProviderError::AlreadyExists {
                entity: "file",
                id: record.id.clone(),
            });
        }
        files.insert(record.id.clone(), record.clone());
        Ok(())
    }

    fn get_file(&self, id: &str) -> Result<Option<FileRecord>> {
        Ok(self.files.lock().expect("lock poisoned").get(id).cloned())
    }

    fn delete_file(&self, id: &str) -> Result<FileRecord> {
        self.check("delete_file", id)?;
        self.files
            .lock()
            .expect("lock poisoned")
            .remove(id)
            .ok_or(ProviderError::NotFound {
                entity: "file",
                id: id.to_string(),
            })
    }

    fn list_files(&self, catalog_id: &str) -> Result<Vec<FileRecord>> {
        Ok(self
            .files
            .lock()
            .expect("lock poisoned")
            .values()
            .filter(|f| f.catalog_id == catalog_id)
            .cloned()
            .collect())
    }
}

/// In-memory document provider with per-operation failure injection.
pub struct MockDocumentProvider {
    documents: Mutex<BTreeMap<(String, String), Value>>,
    calls: Mutex<Vec<String>>,
    fail_on: Mutex<HashSet<&'static str>>,
}

impl MockDocumentProvider {
    #[must_use]
    pub fn new() -> Self {
        Self {
            documents: Mutex::new(BTreeMap::new()),
            calls: Mutex::new(Vec::new()),
            fail_on: Mutex::new(HashSet::new()),
        }
    }

    #[must_use]
    pub fn with_document(self, collection: &str, key: &str, document: Value) -> Self {
        self.documents
            .lock()
            .expect("lock poisoned")
            .insert((collection.to_string(), key.to_string()), document);
        self
    }

    /// Make the named operation fail until cleared.
    pub fn set_fail_on(&self, op: &'static str) {
        self.fail_on.lock().expect("lock poisoned").insert(op);
    }

    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("lock poisoned").clone()
    }

    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<(String, String), Value> {
        self.documents.lock().expect("lock poisoned").clone()
    }

    fn check(&self, op: &'static str, detail: &str) -> Result<()> {
        self.calls
            .lock()
            .expect("lock poisoned")
            .push(format!("{op} {detail}"));
        if self.fail_on.lock().expect("lock poisoned").contains(op) {
            return Err(injected_failure(op));
        }
        Ok(())
    }
}

impl Default for MockDocumentProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentProvider for MockDocumentProvider {
    fn upsert(&self, collection: &str, key: &str, document: &Value) -> Result<Option<Value>> {
        self.check("upsert", &format!("{collection}/{key}"))?;
        Ok(self
            .documents
            .lock()
            .expect("lock poisoned")
            .insert((collection.to_string(), key.to_string()), document.clone()))
    }

    fn get(&self, collection: &str, key: &str) -> Result<Option<Value>> {
        Ok(self
            .documents
            .lock()
            .expect("lock poisoned")
            .get(&(collection.to_string(), key.to_string()))
            .cloned())
    }

    fn remove(&self, collection: &str, key: &str) -> Result<Option<Value>> {
        self.check("remove", &format!("{collection}/{key}"))?;
        Ok(self
            .documents
            .lock()
            .expect("lock poisoned")
            .remove(&(collection.to_string(), key.to_string())))
    }
}
