use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("IO error at '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse store file '{path}'")]
    Parse {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("failed to serialize store file '{path}'")]
    Serialize {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    #[error("{entity} '{id}' already exists")]
    AlreadyExists { entity: &'static str, id: String },

    #[error("{entity} '{id}' is not empty")]
    NotEmpty { entity: &'static str, id: String },

    #[error("invalid entry name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },
}

pub type Result<T> = std::result::Result<T, ProviderError>;
