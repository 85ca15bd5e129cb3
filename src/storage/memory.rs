use dashmap::DashMap;

use crate::{
    metadata::ResourceMetadata,
    storage::{api::MetadataStore, error::StorageError},
};

/// Concurrent in-process index. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryMetadataStore {
    entries: DashMap<String, ResourceMetadata>,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MetadataStore for MemoryMetadataStore {
    fn put(
        &self,
        id: &str,
        metadata: &ResourceMetadata,
    ) -> Result<Option<ResourceMetadata>, StorageError> {
        Ok(self.entries.insert(id.to_string(), metadata.clone()))
    }

    fn get(&self, id: &str) -> Result<ResourceMetadata, StorageError> {
        self.entries
            .get(id)
            .map(|e| e.value().clone())
            .ok_or_else(|| StorageError::NotFound(id.to_string()))
    }

    fn remove(&self, id: &str) -> Result<ResourceMetadata, StorageError> {
        self.entries.remove(id).map(|(_, md)| md).ok_or_else(|| StorageError::NotFound(id.to_string()))
    }

    fn has(&self, id: &str) -> Result<bool, StorageError> {
        Ok(self.entries.contains_key(id))
    }

    fn len(&self) -> Result<usize, StorageError> {
        Ok(self.entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{sync::Arc, thread};

    fn md(id: &str) -> ResourceMetadata {
        ResourceMetadata::builder()
            .with_identifier(id)
            .with_content_type("text/plain")
            .with_length(1)
            .build()
            .unwrap()
    }

    #[test]
    fn put_get_remove() {
        let store = MemoryMetadataStore::new();
        assert!(store.put("a", &md("a")).unwrap().is_none());
        assert_eq!(store.get("a").unwrap().identifier(), "a");
        assert!(store.has("a").unwrap());

        let removed = store.remove("a").unwrap();
        assert_eq!(removed.identifier(), "a");
        assert!(matches!(store.get("a"), Err(StorageError::NotFound(_))));
        assert!(matches!(store.remove("a"), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn only_one_concurrent_remove_wins() {
        let store = Arc::new(MemoryMetadataStore::new());
        store.put("x", &md("x")).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                thread::spawn(move || store.remove("x").is_ok())
            })
            .collect();
        let wins = handles.into_iter().map(|h| h.join().unwrap()).filter(|won| *won).count();
        assert_eq!(wins, 1);
        assert_eq!(store.len().unwrap(), 0);
    }

    #[test]
    fn concurrent_puts_all_land() {
        let store = Arc::new(MemoryMetadataStore::new());
        thread::scope(|s| {
            for t in 0..4 {
                let store = &store;
                s.spawn(move || {
                    for i in 0..250 {
                        let id = format!("{t}-{i}");
                        store.put(&id, &md(&id)).unwrap();
                    }
                });
            }
        });
        assert_eq!(store.len().unwrap(), 1000);
    }
}
