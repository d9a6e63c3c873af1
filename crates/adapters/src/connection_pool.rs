//! Per-chain runtime connection pool
//!
//! One live client is kept per chain slug. Establishing a connection is
//! serialized per slug, so concurrent callers for the same chain share one
//! handshake, while different chains connect independently.

use dashmap::DashMap;
use paraxfer_types::{
	ChainConnector, EndpointCandidate, EndpointError, EndpointResult, RuntimeClient,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Default per-attempt connection timeout
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default lifetime of a pooled connection
pub const DEFAULT_POOL_TTL: Duration = Duration::from_secs(30 * 60);

/// Pooled client with creation timestamp for TTL management
#[derive(Debug, Clone)]
struct PooledClient {
	client: Arc<dyn RuntimeClient>,
	created_at: Instant,
}

impl PooledClient {
	fn new(client: Arc<dyn RuntimeClient>) -> Self {
		Self {
			client,
			created_at: Instant::now(),
		}
	}

	fn is_expired(&self, ttl: Duration) -> bool {
		self.created_at.elapsed() > ttl
	}
}

type Slot = Arc<Mutex<Option<PooledClient>>>;

/// Thread-safe pool of runtime clients keyed by chain slug
#[derive(Debug, Clone)]
pub struct ConnectionPool {
	connector: Arc<dyn ChainConnector>,
	slots: Arc<DashMap<String, Slot>>,
	connect_timeout: Duration,
	ttl: Duration,
}

impl ConnectionPool {
	pub fn new(connector: Arc<dyn ChainConnector>) -> Self {
		Self::with_timeouts(connector, DEFAULT_CONNECT_TIMEOUT, DEFAULT_POOL_TTL)
	}

	pub fn with_timeouts(
		connector: Arc<dyn ChainConnector>,
		connect_timeout: Duration,
		ttl: Duration,
	) -> Self {
		Self {
			connector,
			slots: Arc::new(DashMap::new()),
			connect_timeout,
			ttl,
		}
	}

	pub fn connect_timeout(&self) -> Duration {
		self.connect_timeout
	}

	/// Get the pooled client for `chain`, connecting through `candidates` if needed
	///
	/// Candidates are tried in order, each bounded by the per-attempt connect
	/// timeout. The whole operation is bounded by `deadline`.
	pub async fn get(
		&self,
		chain: &str,
		candidates: &[EndpointCandidate],
		deadline: Duration,
	) -> EndpointResult<Arc<dyn RuntimeClient>> {
		let slot = self
			.slots
			.entry(chain.to_string())
			.or_insert_with(|| Arc::new(Mutex::new(None)))
			.clone();

		let started = Instant::now();
		let mut guard = match tokio::time::timeout(deadline, slot.lock()).await {
			Ok(guard) => guard,
			Err(_) => return Err(connect_timeout_error(chain, deadline)),
		};

		if let Some(pooled) = guard.as_ref() {
			if !pooled.client.is_connected() {
				warn!(
					"Pooled connection for {} ({}) dropped, reconnecting",
					chain,
					pooled.client.endpoint()
				);
				*guard = None;
			} else if pooled.is_expired(self.ttl) {
				debug!(
					"Pooled connection for {} expired (age: {:?}), reconnecting",
					chain,
					pooled.created_at.elapsed()
				);
				*guard = None;
			} else {
				debug!("Reusing pooled connection for {}", chain);
				return Ok(pooled.client.clone());
			}
		}

		let remaining = deadline.saturating_sub(started.elapsed());
		let client = match tokio::time::timeout(remaining, self.connect_ranked(chain, candidates)).await
		{
			Ok(result) => result?,
			Err(_) => {
				warn!("Connecting to {} exceeded the {:?} deadline", chain, deadline);
				return Err(connect_timeout_error(chain, deadline));
			},
		};

		*guard = Some(PooledClient::new(client.clone()));
		Ok(client)
	}

	async fn connect_ranked(
		&self,
		chain: &str,
		candidates: &[EndpointCandidate],
	) -> EndpointResult<Arc<dyn RuntimeClient>> {
		let mut attempted = 0;
		for candidate in candidates {
			attempted += 1;
			match tokio::time::timeout(self.connect_timeout, self.connector.connect(candidate)).await {
				Ok(Ok(client)) => {
					info!("Connected to {} via {}", chain, candidate.url);
					return Ok(client);
				},
				Ok(Err(e)) => {
					warn!("Connection to {} failed: {}. Trying next endpoint.", candidate.url, e);
				},
				Err(_) => {
					warn!(
						"Connection to {} timed out after {:?}. Trying next endpoint.",
						candidate.url, self.connect_timeout
					);
				},
			}
		}
		Err(EndpointError::NoLiveEndpoint {
			chain: chain.to_string(),
			attempted,
		})
	}

	/// Drop the pooled client for `chain` if it is still `failed`
	///
	/// A client pooled by a later reconnect is kept. Returns whether anything
	/// was dropped.
	pub async fn evict(&self, chain: &str, failed: &Arc<dyn RuntimeClient>) -> bool {
		let Some(slot) = self.slots.get(chain).map(|slot| slot.clone()) else {
			return false;
		};
		let mut guard = slot.lock().await;
		let pooled_failed = guard
			.as_ref()
			.is_some_and(|pooled| same_client(&pooled.client, failed));
		if pooled_failed {
			debug!("Evicting connection for {} ({})", chain, failed.endpoint());
			*guard = None;
		}
		pooled_failed
	}

	/// Number of chains with a pooled client
	pub async fn len(&self) -> usize {
		let slots: Vec<Slot> = self.slots.iter().map(|entry| entry.value().clone()).collect();
		let mut count = 0;
		for slot in slots {
			if slot.lock().await.is_some() {
				count += 1;
			}
		}
		count
	}

	pub async fn is_empty(&self) -> bool {
		self.len().await == 0
	}

	/// Drop expired and disconnected clients
	pub async fn cleanup(&self) -> usize {
		let slots: Vec<(String, Slot)> = self
			.slots
			.iter()
			.map(|entry| (entry.key().clone(), entry.value().clone()))
			.collect();
		let mut removed = 0;
		for (chain, slot) in slots {
			let mut guard = slot.lock().await;
			let stale = guard
				.as_ref()
				.map(|pooled| pooled.is_expired(self.ttl) || !pooled.client.is_connected())
				.unwrap_or(false);
			if stale {
				debug!("Dropping stale connection for {}", chain);
				*guard = None;
				removed += 1;
			}
		}
		removed
	}
}

fn same_client(a: &Arc<dyn RuntimeClient>, b: &Arc<dyn RuntimeClient>) -> bool {
	std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

fn connect_timeout_error(chain: &str, deadline: Duration) -> EndpointError {
	EndpointError::ConnectTimeout {
		chain: chain.to_string(),
		timeout_ms: deadline.as_millis() as u64,
	}
}
