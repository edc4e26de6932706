use homecloud_core::{
    FileProvider, HandlerKind, RecordProvider, StorageRecord, validate_entry_name,
};
use serde_json::json;
use tracing::debug;

use super::{
    STORAGE_SUMMARIES, USAGE, add_put_document_step, add_remove_document_step, data_store,
    file_system, run_pipeline,
};
use crate::context::StorageContext;
use crate::error::{OperationError, Result};

pub struct CreateStorageInput {
    pub id: String,
    pub name: String,
    pub quota_bytes: Option<u64>,
}

/// Create a storage: root directory, storage record, summary document.
pub struct CreateStorage<'a> {
    context: &'a StorageContext,
}

impl<'a> CreateStorage<'a> {
    #[must_use]
    pub fn new(context: &'a StorageContext) -> Self {
        Self { context }
    }

    /// # Errors
    ///
    /// Fails fast on invalid ids and duplicate storages; pipeline failures
    /// arrive as `PipelineFailed`/`RollbackIncomplete` with the storage
    /// restored to its prior state where undos succeeded.
    pub fn execute(&self, input: CreateStorageInput) -> Result<StorageRecord> {
        validate_entry_name(&input.id)?;
        if self.context.records().get_storage(&input.id)?.is_some() {
            return Err(OperationError::StorageAlreadyExists(input.id));
        }

        let record = StorageRecord {
            id: input.id,
            name: input.name,
            quota_bytes: input.quota_bytes,
        };
        debug!(storage = %record.id, "creating storage");

        let mut processor = self.context.processor();

        let handler = processor.create_handler(HandlerKind::FileSystem)?;
        handler.set_label("create-storage-root");
        let root_id = record.id.clone();
        let root_undo_id = record.id.clone();
        handler.create_command(
            move |provider| {
                file_system(provider)?.create_storage_root(&root_id)?;
                Ok(())
            },
            move |provider| {
                file_system(provider)?.remove_storage_root(&root_undo_id)?;
                Ok(())
            },
        );

        let handler = processor.create_handler(HandlerKind::DataStore)?;
        handler.set_label("insert-storage-record");
        let insert_record = record.clone();
        let record_undo_id = record.id.clone();
        handler.create_command(
            move |provider| {
                data_store(provider)?.insert_storage(&insert_record)?;
                Ok(())
            },
            move |provider| {
                data_store(provider)?.delete_storage(&record_undo_id)?;
                Ok(())
            },
        );

        let summary = json!({ "name": record.name, "catalogs": 0 });
        add_put_document_step(
            &mut processor,
            "write-storage-summary",
            STORAGE_SUMMARIES,
            record.id.clone(),
            summary,
        )?;

        run_pipeline(processor, "create-storage")?;
        Ok(record)
    }
}

/// Delete an empty storage: summary and usage documents, record, root.
pub struct DeleteStorage<'a> {
    context: &'a StorageContext,
}

impl<'a> DeleteStorage<'a> {
    #[must_use]
    pub fn new(context: &'a StorageContext) -> Self {
        Self { context }
    }

    /// # Errors
    ///
    /// Fails fast when the storage is missing or still has catalogs.
    pub fn execute(&self, id: &str) -> Result<StorageRecord> {
        let record = self
            .context
            .records()
            .get_storage(id)?
            .ok_or_else(|| OperationError::StorageNotFound(id.to_string()))?;
        let catalogs = self.context.records().list_catalogs(id)?;
        if !catalogs.is_empty() {
            return Err(OperationError::StorageNotEmpty {
                id: id.to_string(),
                catalogs: catalogs.len(),
            });
        }
        debug!(storage = %id, "deleting storage");

        let mut processor = self.context.processor();

        add_remove_document_step(
            &mut processor,
            "remove-storage-summary",
            STORAGE_SUMMARIES,
            id.to_string(),
        )?;
        add_remove_document_step(&mut processor, "remove-usage-document", USAGE, id.to_string())?;

        let handler = processor.create_handler(HandlerKind::DataStore)?;
        handler.set_label("delete-storage-record");
        let delete_id = id.to_string();
        let undo_record = record.clone();
        handler.create_command(
            move |provider| {
                data_store(provider)?.delete_storage(&delete_id)?;
                Ok(())
            },
            move |provider| {
                data_store(provider)?.insert_storage(&undo_record)?;
                Ok(())
            },
        );

        let handler = processor.create_handler(HandlerKind::FileSystem)?;
        handler.set_label("remove-storage-root");
        let root_id = id.to_string();
        let root_undo_id = id.to_string();
        handler.create_command(
            move |provider| {
                file_system(provider)?.remove_storage_root(&root_id)?;
                Ok(())
            },
            move |provider| {
                file_system(provider)?.create_storage_root(&root_undo_id)?;
                Ok(())
            },
        );

        run_pipeline(processor, "delete-storage")?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use homecloud_core::{CatalogRecord, DocumentProvider};
    use serde_json::json;

    use super::*;
    use crate::mocks::{MockDocumentProvider, MockFileProvider, MockRecordProvider};

    struct Fixture {
        files: Arc<MockFileProvider>,
        records: Arc<MockRecordProvider>,
        documents: Arc<MockDocumentProvider>,
        context: StorageContext,
    }

    fn fixture() -> anyhow::Result<Fixture> {
        fixture_with(
            MockFileProvider::new(),
            MockRecordProvider::new(),
            MockDocumentProvider::new(),
        )
    }

    fn fixture_with(
        files: MockFileProvider,
        records: MockRecordProvider,
        documents: MockDocumentProvider,
    ) -> anyhow::Result<Fixture> {
        let files = Arc::new(files);
        let records = Arc::new(records);
        let documents = Arc::new(documents);
        let context = StorageContext::new(
            Arc::clone(&files) as Arc<dyn FileProvider>,
            Arc::clone(&records) as Arc<dyn RecordProvider>,
            Arc::clone(&documents) as Arc<dyn DocumentProvider>,
        )?;
        Ok(Fixture {
            files,
            records,
            documents,
            context,
        })
    }

    fn input(id: &str) -> CreateStorageInput {
        CreateStorageInput {
            id: id.to_string(),
            name: format!("storage {id}"),
            quota_bytes: None,
        }
    }

    #[test]
    fn create_storage_touches_all_three_stores() -> anyhow::Result<()> {
        let fx = fixture()?;

        let record = CreateStorage::new(&fx.context).execute(input("st-1"))?;

        assert!(fx.files.has_root("st-1"));
        assert_eq!(fx.records.get_storage("st-1")?, Some(record));
        assert_eq!(
            fx.documents.get("storages", "st-1")?,
            Some(json!({"name": "storage st-1", "catalogs": 0}))
        );
        Ok(())
    }

    #[test]
    fn create_storage_rejects_duplicate_ids_before_any_side_effect() -> anyhow::Result<()> {
        let fx = fixture_with(
            MockFileProvider::new(),
            MockRecordProvider::new().with_storage(StorageRecord {
                id: "st-1".to_string(),
                name: "existing".to_string(),
                quota_bytes: None,
            }),
            MockDocumentProvider::new(),
        )?;

        let err = CreateStorage::new(&fx.context)
            .execute(input("st-1"))
            .expect_err("duplicate id");

        assert!(matches!(err, OperationError::StorageAlreadyExists(_)));
        assert!(fx.files.calls().is_empty());
        Ok(())
    }

    #[test]
    fn create_storage_rejects_invalid_ids() -> anyhow::Result<()> {
        let fx = fixture()?;

        let err = CreateStorage::new(&fx.context)
            .execute(input("../escape"))
            .expect_err("invalid id");

        assert!(matches!(
            err,
            OperationError::Provider(homecloud_core::ProviderError::InvalidName { .. })
        ));
        Ok(())
    }

    #[test]
    fn summary_failure_rolls_back_root_and_record() -> anyhow::Result<()> {
        let fx = fixture()?;
        fx.documents.set_fail_on("upsert");

        let err = CreateStorage::new(&fx.context)
            .execute(input("st-1"))
            .expect_err("summary write fails");

        assert!(matches!(
            &err,
            OperationError::PipelineFailed { handler, .. } if handler == "write-storage-summary"
        ));
        assert!(!fx.files.has_root("st-1"));
        assert_eq!(fx.records.get_storage("st-1")?, None);
        assert!(
            fx.files
                .calls()
                .contains(&"remove_storage_root st-1".to_string())
        );
        Ok(())
    }

    #[test]
    fn failed_undo_surfaces_as_rollback_incomplete() -> anyhow::Result<()> {
        let fx = fixture()?;
        fx.documents.set_fail_on("upsert");
        fx.files.set_fail_on("remove_storage_root");

        let err = CreateStorage::new(&fx.context)
            .execute(input("st-1"))
            .expect_err("summary write fails and root removal is stuck");

        match err {
            OperationError::RollbackIncomplete {
                handler,
                undo_failures,
                ..
            } => {
                assert_eq!(handler, "write-storage-summary");
                assert_eq!(undo_failures.len(), 1);
                assert_eq!(undo_failures[0].handler, "create-storage-root");
            }
            other => panic!("expected RollbackIncomplete, got {other:?}"),
        }
        // The record undo below the stuck one still ran.
        assert_eq!(fx.records.get_storage("st-1")?, None);
        Ok(())
    }

    #[test]
    fn delete_storage_removes_everything_create_added() -> anyhow::Result<()> {
        let fx = fixture()?;
        CreateStorage::new(&fx.context).execute(input("st-1"))?;

        let removed = DeleteStorage::new(&fx.context).execute("st-1")?;

        assert_eq!(removed.id, "st-1");
        assert!(!fx.files.has_root("st-1"));
        assert_eq!(fx.records.get_storage("st-1")?, None);
        assert_eq!(fx.documents.get("storages", "st-1")?, None);
        Ok(())
    }

    #[test]
    fn delete_storage_refuses_when_catalogs_remain() -> anyhow::Result<()> {
        let fx = fixture()?;
        CreateStorage::new(&fx.context).execute(input("st-1"))?;
        fx.records.insert_catalog(&CatalogRecord {
            id: "cat-1".to_string(),
            storage_id: "st-1".to_string(),
            parent_id: None,
            name: "photos".to_string(),
            path: "photos".to_string(),
        })?;

        let err = DeleteStorage::new(&fx.context)
            .execute("st-1")
            .expect_err("storage still has catalogs");

        assert!(matches!(
            err,
            OperationError::StorageNotEmpty { catalogs: 1, .. }
        ));
        assert!(fx.files.has_root("st-1"));
        Ok(())
    }

    #[test]
    fn delete_storage_restores_state_when_root_removal_fails() -> anyhow::Result<()> {
        let fx = fixture()?;
        let record = CreateStorage::new(&fx.context).execute(input("st-1"))?;
        fx.files.set_fail_on("remove_storage_root");

        let err = DeleteStorage::new(&fx.context)
            .execute("st-1")
            .expect_err("root removal fails");

        assert!(matches!(
            &err,
            OperationError::PipelineFailed { handler, .. } if handler == "remove-storage-root"
        ));
        assert_eq!(fx.records.get_storage("st-1")?, Some(record));
        assert_eq!(
            fx.documents.get("storages", "st-1")?,
            Some(json!({"name": "storage st-1", "catalogs": 0}))
        );
        Ok(())
    }

    #[test]
    fn delete_missing_storage_is_not_found() -> anyhow::Result<()> {
        let fx = fixture()?;

        let err = DeleteStorage::new(&fx.context)
            .execute("st-404")
            .expect_err("missing storage");

        assert!(matches!(err, OperationError::StorageNotFound(_)));
        Ok(())
    }
}
