pub mod api;
pub mod error;
pub mod fs_content;
pub mod memory;
pub mod redb_store;

pub use api::{ContentStore, MetadataStore};
pub use fs_content::FileContentStore;
pub use memory::MemoryMetadataStore;
pub use redb_store::RedbMetadataStore;
