use thiserror::Error;

use crate::storage::error::StorageError;

/// Failures surfaced by the storage engine. None of them is retried by the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("resource [{0}] could not be found")]
    NotFound(String),

    #[error("unable to persist resource [{id}]")]
    Persistence {
        id: String,
        #[source]
        source: StorageError,
    },

    #[error("unable to access existing resource [{id}]")]
    Retrieval {
        id: String,
        #[source]
        source: StorageError,
    },
}

impl EngineError {
    /// Stable name for adapters mapping failures onto transport status codes.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::NotFound(_) => "NOT_FOUND",
            EngineError::Persistence { .. } => "PERSISTENCE_ERROR",
            EngineError::Retrieval { .. } => "RETRIEVAL_ERROR",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, EngineError::NotFound(_))
    }

    pub fn identifier(&self) -> &str {
        match self {
            EngineError::NotFound(id)
            | EngineError::Persistence { id, .. }
            | EngineError::Retrieval { id, .. } => id,
        }
    }

    pub(crate) fn persistence(id: &str, source: impl Into<StorageError>) -> Self {
        EngineError::Persistence { id: id.to_string(), source: source.into() }
    }

    /// A store-level `NotFound` stays `NotFound`; anything else becomes a retrieval failure.
    pub(crate) fn retrieval(id: &str, source: StorageError) -> Self {
        match source {
            StorageError::NotFound(_) => EngineError::NotFound(id.to_string()),
            source => EngineError::Retrieval { id: id.to_string(), source },
        }
    }
}
