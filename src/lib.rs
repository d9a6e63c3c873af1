//! paraxfer
//!
//! Cross-chain asset registry and XCM fee resolution for parachain transfers.
//! Loads a registry of chains and assets, picks RPC endpoints, validates a
//! transfer and asks the source runtime what it will cost.

use paraxfer_adapters::{
	BundledRegistrySource, CachedRegistrySource, FallbackRegistrySource, HttpPriceFeed,
	HttpRegistrySource, WsConnector,
};
use paraxfer_config::LogFormat;
use paraxfer_storage::{FileStore, MemoryStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

// Core domain types
pub use paraxfer_types::{
	chrono,
	serde_json,
	AccountNetwork,
	Amount,
	Asset,
	Chain,
	ChainConnector,
	CodecError,
	DocumentCache,
	EndpointError,
	FeeError,
	FeeEstimate,
	FeeResult,
	FeeType,
	Location,
	PriceFeed,
	Registry,
	RegistryError,
	RegistrySource,
	RuntimeClient,
	SourceError,
	TransferRequest,
	VersionedLocation,
	XcmVersion,
};

// Service layer
pub use paraxfer_service::{
	EndpointSelector, FeeResolver, FeeResolverConfig, FeeResolverTrait, RegistryService,
	RegistryServiceError, RequestTracker, TransferPlan, TransferPlanner,
};

// Config
pub use paraxfer_config::{load_config, log_service_info, log_startup_complete, Settings};

pub mod types {
	pub use paraxfer_types::*;
}

pub mod storage {
	pub use paraxfer_storage::*;
}

pub mod config {
	pub use paraxfer_config::*;
}

pub mod adapters {
	pub use paraxfer_adapters::*;
}

pub mod service {
	pub use paraxfer_service::*;
}

/// Everything needed to plan transfers
#[derive(Clone)]
pub struct Paraxfer {
	pub settings: Settings,
	pub registry: RegistryService,
	pub resolver: Arc<FeeResolver>,
	pub planner: TransferPlanner,
	pub tracker: RequestTracker,
	pub price_feed: Option<Arc<dyn PriceFeed>>,
}

impl Paraxfer {
	/// Refresh the registry on the configured interval
	pub fn start_refresh(&self) -> JoinHandle<()> {
		self.registry
			.start_refresh(Duration::from_secs(self.settings.registry.refresh_interval_secs))
	}

	/// Plan a transfer, discarding the result if a newer plan for `field` started meanwhile
	pub async fn plan_latest(
		&self,
		field: &str,
		request: TransferRequest,
	) -> Option<FeeResult<TransferPlan>> {
		let ticket = self.tracker.begin(field);
		let result = self.planner.plan(request).await;
		self.tracker.complete(&ticket, result)
	}
}

/// Builder for a configured [`Paraxfer`]
#[derive(Default)]
pub struct PlannerBuilder {
	settings: Option<Settings>,
	source: Option<Arc<dyn RegistrySource>>,
	connector: Option<Arc<dyn ChainConnector>>,
	cache: Option<Arc<dyn DocumentCache>>,
}

impl PlannerBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Set custom settings
	pub fn with_settings(mut self, settings: Settings) -> Self {
		self.settings = Some(settings);
		self
	}

	/// Use `source` instead of the sources described by the settings
	pub fn with_source(mut self, source: Arc<dyn RegistrySource>) -> Self {
		self.source = Some(source);
		self
	}

	/// Use `connector` instead of WebSocket connections
	pub fn with_connector(mut self, connector: Arc<dyn ChainConnector>) -> Self {
		self.connector = Some(connector);
		self
	}

	/// Cache raw registry documents in `cache`
	pub fn with_cache(mut self, cache: Arc<dyn DocumentCache>) -> Self {
		self.cache = Some(cache);
		self
	}

	/// Get the current settings
	pub fn settings(&self) -> Option<&Settings> {
		self.settings.as_ref()
	}

	/// Registry source chain described by `settings`
	fn source_from_settings(
		&self,
		settings: &Settings,
	) -> Result<Arc<dyn RegistrySource>, Box<dyn std::error::Error>> {
		let registry = &settings.registry;
		let source: Arc<dyn RegistrySource> = match &registry.base_url {
			Some(base_url) => {
				let http: Arc<dyn RegistrySource> = Arc::new(HttpRegistrySource::new(base_url)?);
				if registry.bundled_fallback {
					Arc::new(FallbackRegistrySource::new(
						http,
						Arc::new(BundledRegistrySource::new()),
					))
				} else {
					http
				}
			},
			None => Arc::new(BundledRegistrySource::new()),
		};

		let cache: Arc<dyn DocumentCache> = match (&self.cache, &registry.cache_dir) {
			(Some(cache), _) => Arc::clone(cache),
			(None, Some(dir)) => Arc::new(FileStore::new(dir)),
			(None, None) => Arc::new(MemoryStore::new()),
		};
		let ttl = Duration::from_secs(registry.cache_ttl_hours * 60 * 60);
		Ok(Arc::new(CachedRegistrySource::new(source, cache, ttl)))
	}

	/// Validate settings, load the registry and wire the services
	pub async fn build(self) -> Result<Paraxfer, Box<dyn std::error::Error>> {
		let settings = self.settings.clone().unwrap_or_default();
		settings.validate()?;

		let source = match &self.source {
			Some(source) => Arc::clone(source),
			None => self.source_from_settings(&settings)?,
		};
		let registry = RegistryService::new(source, settings.registry.reference.clone())
			.strict(settings.registry.strict);
		registry.load().await?;

		let endpoints = &settings.endpoints;
		let connector: Arc<dyn ChainConnector> = match &self.connector {
			Some(connector) => Arc::clone(connector),
			None => Arc::new(WsConnector::new(endpoints.query_timeout())),
		};
		let pool = paraxfer_adapters::ConnectionPool::with_timeouts(
			connector,
			endpoints.connect_timeout(),
			endpoints.pool_ttl(),
		);
		let config = FeeResolverConfig {
			multipliers: settings.fees.multipliers()?,
			beneficiary_network: settings.xcm.beneficiary_network()?,
			destination_version: settings.xcm.destination_version()?,
			query_timeout: endpoints.query_timeout(),
			resolution_timeout: endpoints.resolution_timeout(),
		};
		let resolver = Arc::new(FeeResolver::new(
			pool,
			EndpointSelector::new(settings.endpoint_priority()),
			config.clone(),
		));

		let planner = TransferPlanner::new(
			registry.clone(),
			Arc::clone(&resolver) as Arc<dyn FeeResolverTrait>,
		)
		.with_beneficiary_network(config.beneficiary_network)
		.with_version(config.destination_version);

		let price_feed = if settings.price_feed.enabled {
			let feed = HttpPriceFeed::new(
				&settings.price_feed.base_url,
				Duration::from_millis(settings.price_feed.timeout_ms),
			)?;
			Some(Arc::new(feed) as Arc<dyn PriceFeed>)
		} else {
			None
		};

		Ok(Paraxfer {
			settings,
			registry,
			resolver,
			planner,
			tracker: RequestTracker::new(),
			price_feed,
		})
	}

	/// Load `.env` and the configuration, initialize tracing and build
	///
	/// Settings passed through [`with_settings`](Self::with_settings) win over the
	/// configuration file.
	pub async fn start(mut self) -> Result<Paraxfer, Box<dyn std::error::Error>> {
		dotenvy::dotenv().ok();

		let using_provided_settings = self.settings.is_some();
		let settings = match self.settings.take() {
			Some(settings) => settings,
			None => load_config().unwrap_or_else(|e| {
				eprintln!("Falling back to default settings: {e}");
				Settings::default()
			}),
		};

		init_tracing_from_settings(&settings)?;
		log_service_info();
		info!(
			"Using configuration: loaded from {}",
			if using_provided_settings {
				"provided settings"
			} else {
				"config file or defaults"
			}
		);

		let paraxfer = self.with_settings(settings).build().await?;
		log_startup_complete(&paraxfer.settings);
		Ok(paraxfer)
	}
}

/// Initialize tracing with configuration-based settings
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_tracing_from_settings(settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
	let log_level = &settings.logging.level;
	let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

	let result = match settings.logging.format {
		LogFormat::Json => {
			let subscriber = tracing_subscriber::fmt().json().with_env_filter(env_filter);
			if settings.logging.structured {
				subscriber.with_target(true).with_thread_ids(true).try_init()
			} else {
				subscriber.try_init()
			}
		},
		LogFormat::Pretty => {
			let subscriber = tracing_subscriber::fmt().pretty().with_env_filter(env_filter);
			if settings.logging.structured {
				subscriber.with_target(true).with_thread_ids(true).try_init()
			} else {
				subscriber.try_init()
			}
		},
		LogFormat::Compact => {
			let subscriber = tracing_subscriber::fmt().compact().with_env_filter(env_filter);
			if settings.logging.structured {
				subscriber.with_target(true).with_thread_ids(true).try_init()
			} else {
				subscriber.try_init()
			}
		},
	};
	if let Err(e) = result {
		warn!("Tracing already initialized: {}", e);
	}

	info!(
		"Logging configuration applied: level={}, format={:?}, structured={}",
		settings.logging.level, settings.logging.format, settings.logging.structured
	);
	Ok(())
}
