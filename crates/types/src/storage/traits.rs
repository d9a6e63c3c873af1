//! Storage traits for pluggable registry document caches

use super::StorageResult;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Debug;

/// A raw registry document as last fetched from its source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedDocument {
	pub reference: String,
	pub document: Value,
	pub fetched_at: DateTime<Utc>,
	pub expires_at: DateTime<Utc>,
}

impl CachedDocument {
	pub fn new(reference: impl Into<String>, document: Value, ttl: Duration) -> Self {
		let fetched_at = Utc::now();
		Self {
			reference: reference.into(),
			document,
			fetched_at,
			expires_at: fetched_at + ttl,
		}
	}

	pub fn is_expired(&self) -> bool {
		Utc::now() >= self.expires_at
	}
}

/// Statistics about cache usage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
	pub total: usize,
	pub expired: usize,
}

/// Cache of raw registry documents keyed by reference
#[async_trait]
pub trait DocumentCache: Send + Sync + Debug {
	/// Get a document; expired entries are returned too, callers decide freshness
	async fn get(&self, reference: &str) -> StorageResult<Option<CachedDocument>>;

	/// Store or replace a document
	async fn put(&self, document: CachedDocument) -> StorageResult<()>;

	/// Remove a document, returning whether it existed
	async fn remove(&self, reference: &str) -> StorageResult<bool>;

	/// Drop expired documents
	async fn cleanup_expired(&self) -> StorageResult<usize>;

	async fn stats(&self) -> StorageResult<CacheStats>;

	/// Health check for the backing store
	async fn health_check(&self) -> StorageResult<bool> {
		Ok(true)
	}
}
