//! Current registry snapshot with atomic replacement

use chrono::{DateTime, Utc};
use paraxfer_types::Registry;
use std::sync::{Arc, RwLock};
use tracing::info;

/// A loaded registry and where it came from
#[derive(Debug, Clone)]
pub struct RegistrySnapshot {
	pub registry: Arc<Registry>,
	/// Name of the source that produced it
	pub source: String,
	pub loaded_at: DateTime<Utc>,
	/// Increments on every replacement
	pub generation: u64,
}

/// Holds the current snapshot
///
/// Readers clone the `Arc` and keep using it while a refresh swaps in a new one.
#[derive(Debug, Default)]
pub struct SnapshotStore {
	current: RwLock<Option<Arc<RegistrySnapshot>>>,
}

impl SnapshotStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn current(&self) -> Option<Arc<RegistrySnapshot>> {
		self.current
			.read()
			.unwrap_or_else(|poisoned| poisoned.into_inner())
			.clone()
	}

	pub fn registry(&self) -> Option<Arc<Registry>> {
		self.current().map(|snapshot| Arc::clone(&snapshot.registry))
	}

	/// Install `registry` as the current snapshot and return it
	pub fn replace(&self, registry: Registry, source: impl Into<String>) -> Arc<RegistrySnapshot> {
		let mut current = self
			.current
			.write()
			.unwrap_or_else(|poisoned| poisoned.into_inner());
		let generation = current.as_ref().map(|s| s.generation + 1).unwrap_or(1);
		let snapshot = Arc::new(RegistrySnapshot {
			registry: Arc::new(registry),
			source: source.into(),
			loaded_at: Utc::now(),
			generation,
		});
		*current = Some(Arc::clone(&snapshot));
		info!(
			"Registry snapshot {} installed from {} ({} chains)",
			generation,
			snapshot.source,
			snapshot.registry.len()
		);
		snapshot
	}
}
