use std::sync::Arc;

use homecloud_core::{DocumentProvider, FileProvider, RecordProvider};
use homecloud_pipeline::{
    CommandFactory, CommandProcessor, HandlerRegistry, ProviderHandle, ProviderRegistry,
};

use crate::error::{OperationError, Result};

/// Shared dependencies for every storage operation.
///
/// Owns the three provider singletons and the registries seeded from them;
/// each operation asks for a fresh processor per logical transaction.
pub struct StorageContext {
    files: Arc<dyn FileProvider>,
    records: Arc<dyn RecordProvider>,
    documents: Arc<dyn DocumentProvider>,
    handlers: Arc<HandlerRegistry<OperationError>>,
}

impl StorageContext {
    /// Wire the provider registry, command factory and handler registry
    /// from the given provider singletons.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if registry wiring fails.
    pub fn new(
        files: Arc<dyn FileProvider>,
        records: Arc<dyn RecordProvider>,
        documents: Arc<dyn DocumentProvider>,
    ) -> Result<Self> {
        let providers = ProviderRegistry::builder()
            .register(ProviderHandle::FileSystem(Arc::clone(&files)))
            .register(ProviderHandle::DataStore(Arc::clone(&records)))
            .register(ProviderHandle::Aggregation(Arc::clone(&documents)))
            .build()?;
        let factory = Arc::new(CommandFactory::new(Arc::new(providers)));
        let handlers = Arc::new(HandlerRegistry::with_defaults(&factory)?);
        Ok(Self {
            files,
            records,
            documents,
            handlers,
        })
    }

    /// Direct read access for validation; mutations go through pipelines.
    #[must_use]
    pub fn files(&self) -> &dyn FileProvider {
        self.files.as_ref()
    }

    #[must_use]
    pub fn records(&self) -> &dyn RecordProvider {
        self.records.as_ref()
    }

    #[must_use]
    pub fn documents(&self) -> &dyn DocumentProvider {
        self.documents.as_ref()
    }

    /// A fresh single-use processor for one business transaction.
    #[must_use]
    pub fn processor(&self) -> CommandProcessor<OperationError> {
        CommandProcessor::new(Arc::clone(&self.handlers))
    }
}
