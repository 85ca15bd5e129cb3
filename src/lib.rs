//! Blob storage engine: byte streams plus free-form descriptive fields,
//! stored under generated identifiers.

pub mod config;
pub mod engine;
pub mod error;
pub mod metadata;
pub mod storage;
pub mod util;

pub use config::{Config, MetadataBackend};
pub use engine::StorageEngine;
pub use error::EngineError;
pub use metadata::{FieldValue, MetadataBuilder, MetadataError, ResourceMetadata};
