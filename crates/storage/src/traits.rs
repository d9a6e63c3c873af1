//! Storage traits for pluggable document caches

// Re-export the storage traits from types crate
pub use paraxfer_types::storage::{
	CacheStats, CachedDocument, DocumentCache, StorageError, StorageResult,
};
