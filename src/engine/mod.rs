//! Create / read / delete orchestration over a content store and a metadata store.
//!
//! The metadata store decides whether a resource exists. Content is only
//! opened for identifiers it knows about, and a create registers metadata
//! only after every byte has been written, so a successful create never
//! leaves metadata pointing at a missing blob.

pub mod housekeeping;


use std::{
    io::{ErrorKind, Read},
    sync::Arc,
};

use dashmap::DashMap;

use crate::{
    config::{Config, MetadataBackend},
    error::EngineError,
    metadata::{MetadataBuilder, ResourceMetadata},
    storage::{
        FileContentStore, MemoryMetadataStore, RedbMetadataStore,
        api::{ContentStore, MetadataStore},
        error::StorageError,
    },
    util::id::next_identifier,
};

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

pub type SharedMetadataStore = Arc<dyn MetadataStore + Send + Sync>;

pub struct StorageEngine<C = FileContentStore> {
    content: C,
    metadata: SharedMetadataStore,
    // creates whose blob may exist before their metadata does
    in_flight: DashMap<String, ()>,
}

impl StorageEngine<FileContentStore> {
    /// Builds the file-backed engine described by `config`.
    pub fn open(config: &Config) -> Result<Self, StorageError> {
        let content = FileContentStore::new(&config.root_dir, config.buffer_size)?;
        let metadata: SharedMetadataStore = match &config.metadata_backend {
            MetadataBackend::Memory => Arc::new(MemoryMetadataStore::new()),
            MetadataBackend::Redb(path) => Arc::new(RedbMetadataStore::new(path)?),
        };
        tracing::info!(root = %config.root_dir.display(), backend = ?config.metadata_backend, "Storage engine opened");
        Ok(Self::new(content, metadata))
    }
}

impl<C: ContentStore> StorageEngine<C> {
    pub fn new(content: C, metadata: SharedMetadataStore) -> Self {
        StorageEngine { content, metadata, in_flight: DashMap::new() }
    }

    /// Stores `src` under a fresh identifier and registers its finalized metadata.
    ///
    /// The recorded length is the number of bytes actually written; a declared
    /// length in `partial` is ignored. On failure nothing stays registered and
    /// any partially written blob is removed.
    pub fn create<R: Read + ?Sized>(
        &self,
        partial: MetadataBuilder,
        src: &mut R,
    ) -> Result<ResourceMetadata, EngineError> {
        let id = next_identifier();
        self.in_flight.insert(id.clone(), ());
        let res = self.create_under(&id, partial, src);
        self.in_flight.remove(&id);
        res
    }

    fn create_under<R: Read + ?Sized>(
        &self,
        id: &str,
        partial: MetadataBuilder,
        src: &mut R,
    ) -> Result<ResourceMetadata, EngineError> {
        let length = match self.content.write(id, src) {
            Ok(n) => n,
            Err(e) => {
                // an existing blob under this key belongs to someone else
                let collided = matches!(&e, StorageError::Io(io) if io.kind() == ErrorKind::AlreadyExists);
                if !collided {
                    self.discard_blob(id);
                }
                return Err(EngineError::persistence(id, e));
            }
        };

        if let Some(declared) = partial.declared_length() {
            if declared != length {
                tracing::warn!(%id, declared, measured = length, "Declared length disagrees with content");
            }
        }

        let content_type = partial.content_type().unwrap_or(DEFAULT_CONTENT_TYPE).to_string();
        let metadata = partial
            .with_identifier(id)
            .with_content_type(content_type)
            .with_length(length)
            .build()
            .map_err(|e| {
                self.discard_blob(id);
                EngineError::persistence(id, e)
            })?;

        if let Err(e) = self.metadata.put(id, &metadata) {
            self.discard_blob(id);
            return Err(EngineError::persistence(id, e));
        }

        tracing::debug!(%id, length, content_type = %metadata.content_type(), "Resource created");
        Ok(metadata)
    }

    fn discard_blob(&self, id: &str) {
        match self.content.delete(id) {
            Ok(()) | Err(StorageError::NotFound(_)) => {}
            Err(e) => tracing::warn!(%id, error = %e, "Failed to remove partial blob"),
        }
    }

    pub fn read_metadata(&self, id: &str) -> Result<ResourceMetadata, EngineError> {
        self.metadata.get(id).map_err(|e| EngineError::retrieval(id, e))
    }

    /// Opens the content of a registered resource. The caller owns the returned
    /// reader; dropping it releases the blob on every path.
    pub fn read_content(&self, id: &str) -> Result<C::Reader, EngineError> {
        if !self.metadata.has(id).map_err(|e| EngineError::retrieval(id, e))? {
            return Err(EngineError::NotFound(id.to_string()));
        }
        // a concurrent delete may have removed the blob since, which reads as NotFound
        self.content.read(id).map_err(|e| EngineError::retrieval(id, e))
    }

    /// Removes both the metadata record and the blob, returning the record.
    pub fn delete(&self, id: &str) -> Result<ResourceMetadata, EngineError> {
        // only one of several concurrent deletes gets the record
        let metadata = match self.metadata.remove(id) {
            Ok(md) => md,
            Err(StorageError::NotFound(_)) => return Err(EngineError::NotFound(id.to_string())),
            Err(e) => return Err(EngineError::persistence(id, e)),
        };

        match self.content.delete(id) {
            Ok(()) => {
                tracing::debug!(%id, "Resource deleted");
                Ok(metadata)
            }
            Err(StorageError::NotFound(_)) => {
                tracing::warn!(%id, "Registered resource had no blob");
                Err(EngineError::NotFound(id.to_string()))
            }
            Err(e) => {
                // blob is still there, keep it reachable
                if let Err(put_err) = self.metadata.put(id, &metadata) {
                    tracing::warn!(%id, error = %put_err, "Failed to restore metadata after failed delete");
                }
                Err(EngineError::persistence(id, e))
            }
        }
    }

    /// Deletes blobs that no metadata record points at, returning how many went.
    /// Blobs of creates still in progress are left alone.
    pub fn sweep_orphans(&self) -> Result<usize, StorageError> {
        let mut removed = 0;
        for id in self.content.ids()? {
            // in_flight before metadata: a create registers metadata before leaving in_flight
            if self.in_flight.contains_key(&id) || self.metadata.has(&id)? {
                continue;
            }
            match self.content.delete(&id) {
                Ok(()) => removed += 1,
                Err(StorageError::NotFound(_)) => {}
                Err(e) => tracing::warn!(%id, error = %e, "Failed to remove orphaned blob"),
            }
        }
        if removed > 0 {
            tracing::info!(removed, "Swept orphaned blobs");
        }
        Ok(removed)
    }

    /// Number of registered resources.
    pub fn len(&self) -> Result<usize, StorageError> {
        self.metadata.len()
    }

    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }
}
