use std::io::Read;

use crate::{metadata::ResourceMetadata, storage::error::StorageError};

/// Raw byte content, one blob per identifier in a flat namespace.
pub trait ContentStore {
    /// Handle returned by [`ContentStore::read`]. Dropping it releases the blob.
    type Reader: Read + Send;

    /// Streams `src` into a new blob through a bounded buffer and returns the byte count.
    fn write<R: Read + ?Sized>(&self, id: &str, src: &mut R) -> Result<u64, StorageError>;

    fn read(&self, id: &str) -> Result<Self::Reader, StorageError>;

    fn delete(&self, id: &str) -> Result<(), StorageError>;

    /// Identifiers of every blob currently held.
    fn ids(&self) -> Result<Vec<String>, StorageError>;
}

/// Index from identifier to its finalized metadata. The single source of truth
/// for whether a resource exists.
pub trait MetadataStore {
    /// Registers `metadata`, returning whatever was stored under `id` before.
    fn put(
        &self,
        id: &str,
        metadata: &ResourceMetadata,
    ) -> Result<Option<ResourceMetadata>, StorageError>;

    fn get(&self, id: &str) -> Result<ResourceMetadata, StorageError>;

    fn remove(&self, id: &str) -> Result<ResourceMetadata, StorageError>;

    fn has(&self, id: &str) -> Result<bool, StorageError>;

    fn len(&self) -> Result<usize, StorageError>;
}
