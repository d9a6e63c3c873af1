//! paraxfer storage
//!
//! Registry snapshot holder plus in-memory and on-disk caches for raw registry
//! documents.

pub mod file_store;
pub mod memory_store;
pub mod snapshot;
pub mod traits;

pub use file_store::FileStore;
pub use memory_store::MemoryStore;
pub use snapshot::{RegistrySnapshot, SnapshotStore};
pub use traits::{CacheStats, CachedDocument, DocumentCache, StorageError, StorageResult};
