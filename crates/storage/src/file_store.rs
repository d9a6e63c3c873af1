//! On-disk document cache, one JSON file per reference

use crate::traits::{CacheStats, CachedDocument, DocumentCache, StorageResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Stores each document as `<dir>/<reference>.json`
#[derive(Debug, Clone)]
pub struct FileStore {
	dir: PathBuf,
}

impl FileStore {
	pub fn new(dir: impl Into<PathBuf>) -> Self {
		Self { dir: dir.into() }
	}

	pub fn dir(&self) -> &Path {
		&self.dir
	}

	fn path_for(&self, reference: &str) -> PathBuf {
		let name: String = reference
			.chars()
			.map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
			.collect();
		self.dir.join(format!("{name}.json"))
	}

	async fn read_all(&self) -> StorageResult<Vec<CachedDocument>> {
		let mut documents = Vec::new();
		let mut entries = match tokio::fs::read_dir(&self.dir).await {
			Ok(entries) => entries,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(documents),
			Err(e) => return Err(e.into()),
		};
		while let Some(entry) = entries.next_entry().await? {
			let path = entry.path();
			if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
				continue;
			}
			let bytes = tokio::fs::read(&path).await?;
			match serde_json::from_slice::<CachedDocument>(&bytes) {
				Ok(document) => documents.push(document),
				Err(e) => warn!("Skipping unreadable cache file {}: {}", path.display(), e),
			}
		}
		Ok(documents)
	}
}

#[async_trait]
impl DocumentCache for FileStore {
	async fn get(&self, reference: &str) -> StorageResult<Option<CachedDocument>> {
		let bytes = match tokio::fs::read(self.path_for(reference)).await {
			Ok(bytes) => bytes,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
			Err(e) => return Err(e.into()),
		};
		Ok(Some(serde_json::from_slice(&bytes)?))
	}

	async fn put(&self, document: CachedDocument) -> StorageResult<()> {
		tokio::fs::create_dir_all(&self.dir).await?;
		let path = self.path_for(&document.reference);
		let staging = path.with_extension("json.tmp");
		let bytes = serde_json::to_vec_pretty(&document)?;
		tokio::fs::write(&staging, bytes).await?;
		tokio::fs::rename(&staging, &path).await?;
		debug!("Cached registry document '{}' at {}", document.reference, path.display());
		Ok(())
	}

	async fn remove(&self, reference: &str) -> StorageResult<bool> {
		match tokio::fs::remove_file(self.path_for(reference)).await {
			Ok(()) => Ok(true),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
			Err(e) => Err(e.into()),
		}
	}

	async fn cleanup_expired(&self) -> StorageResult<usize> {
		let mut removed = 0;
		for document in self.read_all().await? {
			if document.is_expired() && self.remove(&document.reference).await? {
				removed += 1;
			}
		}
		Ok(removed)
	}

	async fn stats(&self) -> StorageResult<CacheStats> {
		let documents = self.read_all().await?;
		Ok(CacheStats {
			total: documents.len(),
			expired: documents.iter().filter(|d| d.is_expired()).count(),
		})
	}

	async fn health_check(&self) -> StorageResult<bool> {
		tokio::fs::create_dir_all(&self.dir).await?;
		Ok(true)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn temp_dir(name: &str) -> PathBuf {
		std::env::temp_dir().join(format!("paraxfer-file-store-{}-{}", name, std::process::id()))
	}

	#[tokio::test]
	async fn test_round_trip_on_disk() {
		let dir = temp_dir("round-trip");
		let store = FileStore::new(&dir);
		let document = CachedDocument::new(
			"polkadot/v2",
			serde_json::json!({"chains": []}),
			chrono::Duration::hours(24),
		);

		assert!(store.get("polkadot/v2").await.unwrap().is_none());
		store.put(document.clone()).await.unwrap();
		assert!(dir.join("polkadot_v2.json").exists());
		assert_eq!(store.get("polkadot/v2").await.unwrap(), Some(document));

		assert!(store.remove("polkadot/v2").await.unwrap());
		assert!(!store.remove("polkadot/v2").await.unwrap());
		let _ = tokio::fs::remove_dir_all(&dir).await;
	}

	#[tokio::test]
	async fn test_cleanup_expired_files() {
		let dir = temp_dir("cleanup");
		let store = FileStore::new(&dir);
		store
			.put(CachedDocument::new("old", serde_json::json!({}), chrono::Duration::seconds(-5)))
			.await
			.unwrap();
		store
			.put(CachedDocument::new("new", serde_json::json!({}), chrono::Duration::hours(1)))
			.await
			.unwrap();

		assert_eq!(store.stats().await.unwrap(), CacheStats { total: 2, expired: 1 });
		assert_eq!(store.cleanup_expired().await.unwrap(), 1);
		assert_eq!(store.stats().await.unwrap().total, 1);
		let _ = tokio::fs::remove_dir_all(&dir).await;
	}

	#[tokio::test]
	async fn test_missing_dir_is_empty() {
		let store = FileStore::new(temp_dir("missing"));
		assert_eq!(store.stats().await.unwrap(), CacheStats::default());
		assert_eq!(store.cleanup_expired().await.unwrap(), 0);
	}
}
