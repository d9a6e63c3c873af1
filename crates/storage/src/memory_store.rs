//! In-memory document cache using DashMap with TTL support

use crate::traits::{CacheStats, CachedDocument, DocumentCache, StorageResult};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::time::{interval, Duration};
use tracing::debug;

/// In-memory cache of raw registry documents
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
	documents: Arc<DashMap<String, CachedDocument>>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Start the TTL cleanup task for expired documents
	pub fn start_ttl_cleanup(&self, every: Duration) -> tokio::task::JoinHandle<()> {
		let documents = Arc::clone(&self.documents);
		tokio::spawn(async move {
			let mut cleanup_interval = interval(every);

			loop {
				cleanup_interval.tick().await;
				let removed = remove_expired(&documents);
				if removed > 0 {
					debug!("Cleaned up {} expired registry documents", removed);
				}
			}
		})
	}
}

fn remove_expired(documents: &DashMap<String, CachedDocument>) -> usize {
	let now = Utc::now();
	let before = documents.len();
	documents.retain(|_, document| document.expires_at > now);
	before.saturating_sub(documents.len())
}

#[async_trait]
impl DocumentCache for MemoryStore {
	async fn get(&self, reference: &str) -> StorageResult<Option<CachedDocument>> {
		Ok(self.documents.get(reference).map(|entry| entry.clone()))
	}

	async fn put(&self, document: CachedDocument) -> StorageResult<()> {
		self.documents.insert(document.reference.clone(), document);
		Ok(())
	}

	async fn remove(&self, reference: &str) -> StorageResult<bool> {
		Ok(self.documents.remove(reference).is_some())
	}

	async fn cleanup_expired(&self) -> StorageResult<usize> {
		Ok(remove_expired(&self.documents))
	}

	async fn stats(&self) -> StorageResult<CacheStats> {
		let expired = self
			.documents
			.iter()
			.filter(|entry| entry.value().is_expired())
			.count();
		Ok(CacheStats {
			total: self.documents.len(),
			expired,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use paraxfer_types::test_utils::sample_registry_document;

	#[tokio::test]
	async fn test_put_get_remove() {
		let store = MemoryStore::new();
		let document = CachedDocument::new(
			"polkadot",
			sample_registry_document(),
			chrono::Duration::hours(1),
		);
		store.put(document.clone()).await.unwrap();

		assert_eq!(store.get("polkadot").await.unwrap(), Some(document));
		assert!(store.get("kusama").await.unwrap().is_none());
		assert!(store.remove("polkadot").await.unwrap());
		assert!(!store.remove("polkadot").await.unwrap());
	}

	#[tokio::test]
	async fn test_cleanup_expired() {
		let store = MemoryStore::new();
		store
			.put(CachedDocument::new(
				"fresh",
				serde_json::json!({}),
				chrono::Duration::hours(1),
			))
			.await
			.unwrap();
		store
			.put(CachedDocument::new(
				"stale",
				serde_json::json!({}),
				chrono::Duration::seconds(-1),
			))
			.await
			.unwrap();

		let stats = store.stats().await.unwrap();
		assert_eq!(stats, CacheStats { total: 2, expired: 1 });
		assert_eq!(store.cleanup_expired().await.unwrap(), 1);
		assert!(store.get("stale").await.unwrap().is_none());
		assert!(store.get("fresh").await.unwrap().is_some());
	}
}
