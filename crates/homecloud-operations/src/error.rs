use homecloud_core::{ProviderError, ProviderKind};
use homecloud_pipeline::{ConfigError, PipelineError};
use thiserror::Error;

/// Details about one undo that failed while a pipeline was rolling back.
#[derive(Debug)]
pub struct UndoFailure {
    /// Label of the handler whose undo failed.
    pub handler: String,
    /// The error that occurred during the undo.
    pub error: Box<OperationError>,
}

#[derive(Debug, Error)]
pub enum OperationError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("storage '{0}' not found")]
    StorageNotFound(String),

    #[error("storage '{0}' already exists")]
    StorageAlreadyExists(String),

    #[error("storage '{id}' still has {catalogs} catalog(s)")]
    StorageNotEmpty { id: String, catalogs: usize },

    #[error("catalog '{0}' not found")]
    CatalogNotFound(String),

    #[error("catalog '{0}' already exists")]
    CatalogAlreadyExists(String),

    #[error("catalog '{id}' still has {files} file(s) and {children} sub-catalog(s)")]
    CatalogNotEmpty {
        id: String,
        files: usize,
        children: usize,
    },

    #[error("parent catalog '{parent_id}' belongs to a different storage than '{storage_id}'")]
    ParentStorageMismatch {
        parent_id: String,
        storage_id: String,
    },

    #[error("file '{0}' not found")]
    FileNotFound(String),

    #[error("file '{0}' already exists")]
    FileAlreadyExists(String),

    #[error("expected a '{expected}' provider on this handler")]
    ProviderMismatch { expected: ProviderKind },

    #[error("handler '{handler}' has no command attached")]
    CommandMissing { handler: String },

    #[error("operation failed at handler '{handler}'")]
    PipelineFailed {
        handler: String,
        #[source]
        source: Box<OperationError>,
    },

    #[error(
        "operation failed at handler '{handler}' and {} undo step(s) also failed", undo_failures.len()
    )]
    RollbackIncomplete {
        handler: String,
        source: Box<OperationError>,
        undo_failures: Vec<UndoFailure>,
    },
}

pub type Result<T> = std::result::Result<T, OperationError>;

impl From<PipelineError<OperationError>> for OperationError {
    fn from(err: PipelineError<OperationError>) -> Self {
        match err {
            PipelineError::StepFailed { handler, source } => Self::PipelineFailed {
                handler,
                source: Box::new(source),
            },
            PipelineError::UnwindFailed {
                handler,
                step_error,
                undo_errors,
            } => {
                let undo_failures = undo_errors
                    .into_iter()
                    .map(|e| UndoFailure {
                        handler: e.handler,
                        error: Box::new(e.source),
                    })
                    .collect();
                Self::RollbackIncomplete {
                    handler,
                    source: Box::new(step_error),
                    undo_failures,
                }
            }
            PipelineError::CommandMissing { handler } => Self::CommandMissing { handler },
            PipelineError::Config(config) => Self::Config(config),
            _ => Self::CommandMissing {
                handler: String::from("unknown"),
            },
        }
    }
}
