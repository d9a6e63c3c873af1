//! Registry loading and periodic refresh

use crate::registry_loader::load_registry;
use paraxfer_config::log_registry_summary;
use paraxfer_storage::{RegistrySnapshot, SnapshotStore};
use paraxfer_types::{Registry, RegistryError, RegistrySource, SourceError};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{info, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryServiceError {
	#[error("Registry source failed: {0}")]
	Source(#[from] SourceError),

	#[error(transparent)]
	Registry(#[from] RegistryError),

	#[error("No registry has been loaded yet")]
	NotLoaded,
}

pub type RegistryServiceResult<T> = Result<T, RegistryServiceError>;

/// Fetches, loads and publishes registry snapshots
#[derive(Debug, Clone)]
pub struct RegistryService {
	source: Arc<dyn RegistrySource>,
	reference: String,
	strict: bool,
	store: Arc<SnapshotStore>,
}

impl RegistryService {
	pub fn new(source: Arc<dyn RegistrySource>, reference: impl Into<String>) -> Self {
		Self {
			source,
			reference: reference.into(),
			strict: false,
			store: Arc::new(SnapshotStore::new()),
		}
	}

	/// Refuse registries with dangling or one-sided registrations
	pub fn strict(mut self, strict: bool) -> Self {
		self.strict = strict;
		self
	}

	pub fn store(&self) -> Arc<SnapshotStore> {
		Arc::clone(&self.store)
	}

	pub fn reference(&self) -> &str {
		&self.reference
	}

	/// The current snapshot's registry
	pub fn registry(&self) -> RegistryServiceResult<Arc<Registry>> {
		self.store.registry().ok_or(RegistryServiceError::NotLoaded)
	}

	/// Fetch and install a new snapshot
	///
	/// On failure the current snapshot, if any, stays in place.
	pub async fn load(&self) -> RegistryServiceResult<Arc<RegistrySnapshot>> {
		let document = self.source.fetch(&self.reference).await?;
		let registry = load_registry(&document)?;
		if self.strict {
			registry.ensure_consistent()?;
		}

		let assets = registry.chains().map(|chain| chain.all_assets().count()).sum();
		let issues: Vec<String> = registry.issues().iter().map(ToString::to_string).collect();
		log_registry_summary(registry.len(), assets, &issues);

		Ok(self.store.replace(registry, self.source.name()))
	}

	/// Reload every `every`, starting one period from now
	pub fn start_refresh(&self, every: Duration) -> JoinHandle<()> {
		let service = self.clone();
		tokio::spawn(async move {
			let mut refresh_interval = interval_at(Instant::now() + every, every);
			refresh_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
			info!(
				"Registry refresh for '{}' every {:?}",
				service.reference, every
			);

			loop {
				refresh_interval.tick().await;
				match service.load().await {
					Ok(snapshot) => {
						info!("Registry refreshed (generation {})", snapshot.generation)
					},
					Err(e) => warn!("Registry refresh failed, keeping previous snapshot: {}", e),
				}
			}
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use paraxfer_types::serde_json::json;
	use paraxfer_types::test_utils::{sample_registry_document, StaticRegistrySource};

	fn network_error() -> SourceError {
		SourceError::Network {
			reason: "connection reset".to_string(),
		}
	}

	#[tokio::test]
	async fn test_load_installs_snapshot() {
		let source = Arc::new(StaticRegistrySource::document("static", sample_registry_document()));
		let service = RegistryService::new(source, "polkadot");
		assert_eq!(service.registry().unwrap_err(), RegistryServiceError::NotLoaded);

		let snapshot = service.load().await.unwrap();
		assert_eq!(snapshot.source, "static");
		assert_eq!(snapshot.generation, 1);
		assert!(service.registry().unwrap().chain("assethub").is_some());
	}

	#[tokio::test]
	async fn test_failed_load_keeps_previous_snapshot() {
		let source = Arc::new(StaticRegistrySource::new(
			"static",
			vec![Ok(sample_registry_document()), Err(network_error()), Ok(json!({"chains": []}))],
		));
		let service = RegistryService::new(source, "polkadot");
		service.load().await.unwrap();

		assert_eq!(
			service.load().await.unwrap_err(),
			RegistryServiceError::Source(network_error())
		);
		assert_eq!(
			service.load().await.unwrap_err(),
			RegistryServiceError::Registry(RegistryError::EmptyRegistry)
		);
		assert_eq!(service.store().current().unwrap().generation, 1);
	}

	#[tokio::test]
	async fn test_strict_mode_rejects_dangling_reference() {
		let mut document = sample_registry_document();
		document["assets"]["polkadot"]["nativeToken"]["registeredChains"]["kusama"] =
			json!({"assetId": "KSM", "symbol": "KSM", "decimals": 12});
		let source = Arc::new(StaticRegistrySource::document("static", document));

		let lenient = RegistryService::new(source.clone(), "polkadot");
		assert!(lenient.load().await.is_ok());

		let strict = RegistryService::new(source, "polkadot").strict(true);
		assert!(matches!(
			strict.load().await,
			Err(RegistryServiceError::Registry(RegistryError::UnresolvedReference { .. }))
		));
	}

	#[tokio::test(start_paused = true)]
	async fn test_refresh_job_replaces_snapshot() {
		let source = Arc::new(StaticRegistrySource::new(
			"static",
			vec![Ok(sample_registry_document()), Err(network_error()), Ok(sample_registry_document())],
		));
		let service = RegistryService::new(source.clone(), "polkadot");
		service.load().await.unwrap();

		let handle = service.start_refresh(Duration::from_secs(60));
		tokio::time::sleep(Duration::from_secs(61)).await;
		assert_eq!(source.fetches(), 2);
		assert_eq!(service.store().current().unwrap().generation, 1);

		tokio::time::sleep(Duration::from_secs(60)).await;
		assert_eq!(source.fetches(), 3);
		assert_eq!(service.store().current().unwrap().generation, 2);
		handle.abort();
	}
}
