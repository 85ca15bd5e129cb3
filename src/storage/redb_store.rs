use std::{path::Path, sync::Arc};

use redb::{Database, ReadableTable, ReadableTableMetadata, TableDefinition};

use crate::{
    metadata::ResourceMetadata,
    storage::{api::MetadataStore, error::StorageError},
};

/// Metadata records as JSON keyed by identifier.
static METADATA_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("metadata");

/// Durable metadata index. Survives restarts, unlike [`super::MemoryMetadataStore`].
pub struct RedbMetadataStore {
    db: Arc<Database>,
}

impl RedbMetadataStore {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let db = Arc::new(Database::create(path)?);

        // make sure the table exists so read transactions can open it
        let txn = db.begin_write()?;
        txn.open_table(METADATA_TABLE)?;
        txn.commit()?;

        Ok(RedbMetadataStore { db })
    }
}

impl MetadataStore for RedbMetadataStore {
    fn put(
        &self,
        id: &str,
        metadata: &ResourceMetadata,
    ) -> Result<Option<ResourceMetadata>, StorageError> {
        let bytes = serde_json::to_vec(metadata)?;
        let txn = self.db.begin_write()?;

        let old_bytes = {
            let mut table = txn.open_table(METADATA_TABLE)?;
            table.insert(id, bytes.as_slice())?.map(|vg| vg.value().to_vec())
        };

        txn.commit()?;

        match old_bytes {
            Some(old) => Ok(Some(serde_json::from_slice(&old)?)),
            None => Ok(None),
        }
    }

    fn get(&self, id: &str) -> Result<ResourceMetadata, StorageError> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(METADATA_TABLE)?;
        match table.get(id)? {
            Some(value_guard) => Ok(serde_json::from_slice(value_guard.value())?),
            None => Err(StorageError::NotFound(id.to_string())),
        }
    }

    fn remove(&self, id: &str) -> Result<ResourceMetadata, StorageError> {
        let txn = self.db.begin_write()?;

        let removed = {
            let mut table = txn.open_table(METADATA_TABLE)?;
            table.remove(id)?.map(|vg| vg.value().to_vec())
        };

        // nothing to remove, the transaction is simply dropped
        let Some(removed) = removed else {
            return Err(StorageError::NotFound(id.to_string()));
        };
        txn.commit()?;

        Ok(serde_json::from_slice(&removed)?)
    }

    fn has(&self, id: &str) -> Result<bool, StorageError> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(METADATA_TABLE)?;
        Ok(table.get(id)?.is_some())
    }

    fn len(&self) -> Result<usize, StorageError> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(METADATA_TABLE)?;
        Ok(table.len()? as usize)
    }
}
