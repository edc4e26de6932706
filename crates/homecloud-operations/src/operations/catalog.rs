use homecloud_core::{CatalogRecord, FileProvider, HandlerKind, RecordProvider, validate_entry_name};
use tracing::debug;

use super::{
    STORAGE_SUMMARIES, add_adjust_counters_step, data_store, file_system, run_pipeline,
};
use crate::context::StorageContext;
use crate::error::{OperationError, Result};

pub struct CreateCatalogInput {
    pub id: String,
    pub storage_id: String,
    pub parent_id: Option<String>,
    pub name: String,
}

/// Create a catalog: directory, catalog record, summary counter bump.
pub struct CreateCatalog<'a> {
    context: &'a StorageContext,
}

impl<'a> CreateCatalog<'a> {
    #[must_use]
    pub fn new(context: &'a StorageContext) -> Self {
        Self { context }
    }

    /// # Errors
    ///
    /// Fails fast on invalid names, a missing storage or parent, a parent
    /// from another storage, and duplicate catalog ids.
    pub fn execute(&self, input: CreateCatalogInput) -> Result<CatalogRecord> {
        validate_entry_name(&input.id)?;
        validate_entry_name(&input.name)?;
        if self.context.records().get_storage(&input.storage_id)?.is_none() {
            return Err(OperationError::StorageNotFound(input.storage_id));
        }
        if self.context.records().get_catalog(&input.id)?.is_some() {
            return Err(OperationError::CatalogAlreadyExists(input.id));
        }

        let path = match &input.parent_id {
            Some(parent_id) => {
                let parent = self
                    .context
                    .records()
                    .get_catalog(parent_id)?
                    .ok_or_else(|| OperationError::CatalogNotFound(parent_id.clone()))?;
                if parent.storage_id != input.storage_id {
                    return Err(OperationError::ParentStorageMismatch {
                        parent_id: parent_id.clone(),
                        storage_id: input.storage_id,
                    });
                }
                format!("{}/{}", parent.path, input.name)
            }
            None => input.name.clone(),
        };

        let record = CatalogRecord {
            id: input.id,
            storage_id: input.storage_id,
            parent_id: input.parent_id,
            name: input.name,
            path,
        };
        debug!(catalog = %record.id, storage = %record.storage_id, path = %record.path, "creating catalog");

        let mut processor = self.context.processor();

        let handler = processor.create_handler(HandlerKind::FileSystem)?;
        handler.set_label("create-catalog-dir");
        let dir_storage = record.storage_id.clone();
        let dir_path = record.path.clone();
        let undo_storage = record.storage_id.clone();
        let undo_path = record.path.clone();
        handler.create_command(
            move |provider| {
                file_system(provider)?.create_catalog_dir(&dir_storage, &dir_path)?;
                Ok(())
            },
            move |provider| {
                file_system(provider)?.remove_catalog_dir(&undo_storage, &undo_path)?;
                Ok(())
            },
        );

        let handler = processor.create_handler(HandlerKind::DataStore)?;
        handler.set_label("insert-catalog-record");
        let insert_record = record.clone();
        let record_undo_id = record.id.clone();
        handler.create_command(
            move |provider| {
                data_store(provider)?.insert_catalog(&insert_record)?;
                Ok(())
            },
            move |provider| {
                data_store(provider)?.delete_catalog(&record_undo_id)?;
                Ok(())
            },
        );

        add_adjust_counters_step(
            &mut processor,
            "adjust-storage-summary",
            STORAGE_SUMMARIES,
            record.storage_id.clone(),
            vec![("catalogs", 1)],
        )?;

        run_pipeline(processor, "create-catalog")?;
        Ok(record)
    }
}

/// Delete an empty catalog: summary counter, record, directory.
pub struct DeleteCatalog<'a> {
    context: &'a StorageContext,
}

impl<'a> DeleteCatalog<'a> {
    #[must_use]
    pub fn new(context: &'a StorageContext) -> Self {
        Self { context }
    }

    /// # Errors
    ///
    /// Fails fast when the catalog is missing or still holds files or
    /// sub-catalogs.
    pub fn execute(&self, id: &str) -> Result<CatalogRecord> {
        let record = self
            .context
            .records()
            .get_catalog(id)?
            .ok_or_else(|| OperationError::CatalogNotFound(id.to_string()))?;
        let files = self.context.records().list_files(id)?;
        let children = self
            .context
            .records()
            .list_catalogs(&record.storage_id)?
            .into_iter()
            .filter(|c| c.parent_id.as_deref() == Some(id))
            .count();
        if !files.is_empty() || children > 0 {
            return Err(OperationError::CatalogNotEmpty {
                id: id.to_string(),
                files: files.len(),
                children,
            });
        }
        debug!(catalog = %id, storage = %record.storage_id, "deleting catalog");

        let mut processor = self.context.processor();

        add_adjust_counters_step(
            &mut processor,
            "adjust-storage-summary",
            STORAGE_SUMMARIES,
            record.storage_id.clone(),
            vec![("catalogs", -1)],
        )?;

        let handler = processor.create_handler(HandlerKind::DataStore)?;
        handler.set_label("delete-catalog-record");
        let delete_id = id.to_string();
        let undo_record = record.clone();
        handler.create_command(
            move |provider| {
                data_store(provider)?.delete_catalog(&delete_id)?;
                Ok(())
            },
            move |provider| {
                data_store(provider)?.insert_catalog(&undo_record)?;
                Ok(())
            },
        );

        let handler = processor.create_handler(HandlerKind::FileSystem)?;
        handler.set_label("remove-catalog-dir");
        let dir_storage = record.storage_id.clone();
        let dir_path = record.path.clone();
        let undo_storage = record.storage_id.clone();
        let undo_path = record.path.clone();
        handler.create_command(
            move |provider| {
                file_system(provider)?.remove_catalog_dir(&dir_storage, &dir_path)?;
                Ok(())
            },
            move |provider| {
                file_system(provider)?.create_catalog_dir(&undo_storage, &undo_path)?;
                Ok(())
            },
        );

        run_pipeline(processor, "delete-catalog")?;
        Ok(record)
    }
}
