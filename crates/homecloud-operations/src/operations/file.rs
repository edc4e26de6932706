use std::sync::{Arc, Mutex};

use homecloud_core::{
    FileProvider, FileRecord, HandlerKind, RecordProvider, validate_entry_name,
};
use tracing::debug;

use super::{USAGE, add_adjust_counters_step, data_store, file_system, run_pipeline};
use crate::context::StorageContext;
use crate::error::{OperationError, Result};

pub struct SaveFileInput {
    pub id: String,
    pub catalog_id: String,
    pub name: String,
    pub contents: Vec<u8>,
}

fn byte_delta(size: u64) -> i64 {
    i64::try_from(size).unwrap_or(i64::MAX)
}

/// Save a file: contents on disk, file record, usage counters.
pub struct SaveFile<'a> {
    context: &'a StorageContext,
}

impl<'a> SaveFile<'a> {
    #[must_use]
    pub fn new(context: &'a StorageContext) -> Self {
        Self { context }
    }

    /// # Errors
    ///
    /// Fails fast on invalid names, a missing catalog, or a duplicate file
    /// id. An existing entry at the same path is overwritten; its previous
    /// contents are restored if a later step fails.
    pub fn execute(&self, input: SaveFileInput) -> Result<FileRecord> {
        validate_entry_name(&input.id)?;
        validate_entry_name(&input.name)?;
        let catalog = self
            .context
            .records()
            .get_catalog(&input.catalog_id)?
            .ok_or_else(|| OperationError::CatalogNotFound(input.catalog_id.clone()))?;
        if self.context.records().get_file(&input.id)?.is_some() {
            return Err(OperationError::FileAlreadyExists(input.id));
        }

        let record = FileRecord {
            id: input.id,
            catalog_id: input.catalog_id,
            name: input.name.clone(),
            path: format!("{}/{}", catalog.path, input.name),
            size_bytes: input.contents.len() as u64,
        };
        debug!(file = %record.id, path = %record.path, bytes = record.size_bytes, "saving file");

        let contents = Arc::new(input.contents);
        let mut processor = self.context.processor();

        let handler = processor.create_handler(HandlerKind::FileSystem)?;
        handler.set_label("store-file-contents");
        let previous: Arc<Mutex<Option<Vec<u8>>>> = Arc::default();
        let undo_previous = Arc::clone(&previous);
        let storage_id = catalog.storage_id.clone();
        let exec_storage = storage_id.clone();
        let exec_path = record.path.clone();
        let undo_storage = storage_id.clone();
        let undo_path = record.path.clone();
        handler.create_command(
            move |provider| {
                let files = file_system(provider)?;
                if files.file_exists(&exec_storage, &exec_path)? {
                    let backup = files.read_file(&exec_storage, &exec_path)?;
                    *previous.lock().expect("lock poisoned") = Some(backup);
                }
                files.store_file(&exec_storage, &exec_path, &contents)?;
                Ok(())
            },
            move |provider| {
                let files = file_system(provider)?;
                match undo_previous.lock().expect("lock poisoned").take() {
                    Some(backup) => files.store_file(&undo_storage, &undo_path, &backup)?,
                    None => files.delete_file(&undo_storage, &undo_path)?,
                }
                Ok(())
            },
        );

        let handler = processor.create_handler(HandlerKind::DataStore)?;
        handler.set_label("insert-file-record");
        let insert_record = record.clone();
        let record_undo_id = record.id.clone();
        handler.create_command(
            move |provider| {
                data_store(provider)?.insert_file(&insert_record)?;
                Ok(())
            },
            move |provider| {
                data_store(provider)?.delete_file(&record_undo_id)?;
                Ok(())
            },
        );

        add_adjust_counters_step(
            &mut processor,
            "adjust-usage-counters",
            USAGE,
            storage_id,
            vec![("files", 1), ("bytes", byte_delta(record.size_bytes))],
        )?;

        run_pipeline(processor, "save-file")?;
        Ok(record)
    }
}

/// Delete a file: usage counters, file record, contents on disk.
pub struct DeleteFile<'a> {
    context: &'a StorageContext,
}

impl<'a> DeleteFile<'a> {
    #[must_use]
    pub fn new(context: &'a StorageContext) -> Self {
        Self { context }
    }

    /// # Errors
    ///
    /// Fails fast when the file or its catalog record is missing.
    pub fn execute(&self, id: &str) -> Result<FileRecord> {
        let record = self
            .context
            .records()
            .get_file(id)?
            .ok_or_else(|| OperationError::FileNotFound(id.to_string()))?;
        let catalog = self
            .context
            .records()
            .get_catalog(&record.catalog_id)?
            .ok_or_else(|| OperationError::CatalogNotFound(record.catalog_id.clone()))?;
        let storage_id = catalog.storage_id;
        debug!(file = %id, path = %record.path, "deleting file");

        let mut processor = self.context.processor();

        add_adjust_counters_step(
            &mut processor,
            "adjust-usage-counters",
            USAGE,
            storage_id.clone(),
            vec![("files", -1), ("bytes", -byte_delta(record.size_bytes))],
        )?;

        let handler = processor.create_handler(HandlerKind::DataStore)?;
        handler.set_label("delete-file-record");
        let delete_id = id.to_string();
        let undo_record = record.clone();
        handler.create_command(
            move |provider| {
                data_store(provider)?.delete_file(&delete_id)?;
                Ok(())
            },
            move |provider| {
                data_store(provider)?.insert_file(&undo_record)?;
                Ok(())
            },
        );

        let handler = processor.create_handler(HandlerKind::FileSystem)?;
        handler.set_label("delete-file-contents");
        let backup: Arc<Mutex<Option<Vec<u8>>>> = Arc::default();
        let undo_backup = Arc::clone(&backup);
        let exec_storage = storage_id.clone();
        let exec_path = record.path.clone();
        let undo_storage = storage_id.clone();
        let undo_path = record.path.clone();
        handler.create_command(
            move |provider| {
                let files = file_system(provider)?;
                let bytes = files.read_file(&exec_storage, &exec_path)?;
                files.delete_file(&exec_storage, &exec_path)?;
                *backup.lock().expect("lock poisoned") = Some(bytes);
                Ok(())
            },
            move |provider| {
                if let Some(bytes) = undo_backup.lock().expect("lock poisoned").take() {
                    file_system(provider)?.store_file(&undo_storage, &undo_path, &bytes)?;
                }
                Ok(())
            },
        );

        run_pipeline(processor, "delete-file")?;
        Ok(record)
    }
}
