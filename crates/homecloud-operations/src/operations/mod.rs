mod catalog;
mod file;
mod storage;

pub use catalog::{CreateCatalog, CreateCatalogInput, DeleteCatalog};
pub use file::{DeleteFile, SaveFile, SaveFileInput};
pub use storage::{CreateStorage, CreateStorageInput, DeleteStorage};

use std::sync::{Arc, Mutex};

use homecloud_core::{DocumentProvider, FileProvider, HandlerKind, ProviderKind, RecordProvider};
use homecloud_pipeline::{CommandProcessor, ProviderHandle};
use serde_json::Value;
use tracing::debug;

use crate::error::{OperationError, Result};

/// Collection holding one summary document per storage.
pub(crate) const STORAGE_SUMMARIES: &str = "storages";
/// Collection holding one usage document per storage.
pub(crate) const USAGE: &str = "usage";

pub(crate) fn file_system(provider: &ProviderHandle) -> Result<&dyn FileProvider> {
    provider
        .as_file_system()
        .ok_or(OperationError::ProviderMismatch {
            expected: ProviderKind::FileSystem,
        })
}

pub(crate) fn data_store(provider: &ProviderHandle) -> Result<&dyn RecordProvider> {
    provider
        .as_data_store()
        .ok_or(OperationError::ProviderMismatch {
            expected: ProviderKind::DataStore,
        })
}

pub(crate) fn aggregation(provider: &ProviderHandle) -> Result<&dyn DocumentProvider> {
    provider
        .as_aggregation()
        .ok_or(OperationError::ProviderMismatch {
            expected: ProviderKind::Aggregation,
        })
}

/// Build a document from `previous` with the given counter fields adjusted.
///
/// Non-object or missing documents start from an empty object; counters
/// never drop below zero.
pub(crate) fn with_counters(previous: Option<&Value>, updates: &[(&str, i64)]) -> Value {
    let mut doc = match previous {
        Some(Value::Object(map)) => Value::Object(map.clone()),
        _ => Value::Object(serde_json::Map::new()),
    };
    for (field, delta) in updates {
        let current = doc.get(*field).and_then(Value::as_i64).unwrap_or(0);
        doc[*field] = Value::from((current + delta).max(0));
    }
    doc
}

/// Attach a step that writes `document` at `collection/key`, restoring
/// whatever the key held before on undo.
pub(crate) fn add_put_document_step(
    processor: &mut CommandProcessor<OperationError>,
    label: &'static str,
    collection: &'static str,
    key: String,
    document: Value,
) -> Result<()> {
    let previous: Arc<Mutex<Option<Value>>> = Arc::default();
    let undo_previous = Arc::clone(&previous);
    let undo_key = key.clone();

    let handler = processor.create_handler(HandlerKind::Aggregation)?;
    handler.set_label(label);
    handler.create_command(
        move |provider| {
            let replaced = aggregation(provider)?.upsert(collection, &key, &document)?;
            *previous.lock().expect("lock poisoned") = replaced;
            Ok(())
        },
        move |provider| {
            let documents = aggregation(provider)?;
            match undo_previous.lock().expect("lock poisoned").take() {
                Some(old) => {
                    documents.upsert(collection, &undo_key, &old)?;
                }
                None => {
                    documents.remove(collection, &undo_key)?;
                }
            }
            Ok(())
        },
    );
    Ok(())
}

/// Attach a step that removes `collection/key`, re-writing the removed
/// document on undo.
pub(crate) fn add_remove_document_step(
    processor: &mut CommandProcessor<OperationError>,
    label: &'static str,
    collection: &'static str,
    key: String,
) -> Result<()> {
    let previous: Arc<Mutex<Option<Value>>> = Arc::default();
    let undo_previous = Arc::clone(&previous);
    let undo_key = key.clone();

    let handler = processor.create_handler(HandlerKind::Aggregation)?;
    handler.set_label(label);
    handler.create_command(
        move |provider| {
            let removed = aggregation(provider)?.remove(collection, &key)?;
            *previous.lock().expect("lock poisoned") = removed;
            Ok(())
        },
        move |provider| {
            if let Some(old) = undo_previous.lock().expect("lock poisoned").take() {
                aggregation(provider)?.upsert(collection, &undo_key, &old)?;
            }
            Ok(())
        },
    );
    Ok(())
}

/// Attach a step that adjusts counter fields on `collection/key`, restoring
/// the previous document on undo.
pub(crate) fn add_adjust_counters_step(
    processor: &mut CommandProcessor<OperationError>,
    label: &'static str,
    collection: &'static str,
    key: String,
    updates: Vec<(&'static str, i64)>,
) -> Result<()> {
    let previous: Arc<Mutex<Option<Value>>> = Arc::default();
    let undo_previous = Arc::clone(&previous);
    let undo_key = key.clone();

    let handler = processor.create_handler(HandlerKind::Aggregation)?;
    handler.set_label(label);
    handler.create_command(
        move |provider| {
            let documents = aggregation(provider)?;
            let current = documents.get(collection, &key)?;
            let adjusted = with_counters(current.as_ref(), &updates);
            documents.upsert(collection, &key, &adjusted)?;
            *previous.lock().expect("lock poisoned") = current;
            Ok(())
        },
        move |provider| {
            let documents = aggregation(provider)?;
            match undo_previous.lock().expect("lock poisoned").take() {
                Some(old) => {
                    documents.upsert(collection, &undo_key, &old)?;
                }
                None => {
                    documents.remove(collection, &undo_key)?;
                }
            }
            Ok(())
        },
    );
    Ok(())
}

/// Run the assembled pipeline, logging the audit trail when it rolls back.
pub(crate) fn run_pipeline(
    mut processor: CommandProcessor<OperationError>,
    operation: &'static str,
) -> Result<()> {
    let (result, audit) = processor.process_with_audit();
    match result {
        Ok(()) => {
            debug!(operation, handlers = processor.len(), "pipeline committed");
            Ok(())
        }
        Err(err) => {
            debug!(operation, summary = %audit.summary(), "pipeline rolled back");
            Err(err.into())
        }
    }
}
