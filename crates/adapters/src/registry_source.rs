//! Registry document sources
//!
//! A registry reference names a published document. It can be served over
//! HTTP, from the copy bundled into the binary, or from the local document
//! cache when the network is unavailable.

use async_trait::async_trait;
use paraxfer_types::chrono::Duration as TtlDuration;
use paraxfer_types::{CachedDocument, DocumentCache, RegistrySource, SourceError, SourceResult};
use reqwest::{
	header::{HeaderMap, HeaderValue},
	Client, StatusCode,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Reference of the bundled document
pub const BUNDLED_REFERENCE: &str = "polkadot";

const BUNDLED_REGISTRY: &str = include_str!("../data/registry.json");

const CHAINS_DOCUMENT: &str = "chains.json";
const ASSETS_DOCUMENT: &str = "assets.json";

/// Default timeout for registry downloads
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches `{base}/{reference}/chains.json` and, when published, `assets.json`
///
/// The two parts are combined into `{"chains": .., "assets": ..}`. A
/// `chains.json` that is already a full document is used as published.
#[derive(Debug, Clone)]
pub struct HttpRegistrySource {
	client: Client,
	base_url: Url,
}

impl HttpRegistrySource {
	pub fn new(base_url: &str) -> SourceResult<Self> {
		Self::with_timeout(base_url, DEFAULT_FETCH_TIMEOUT)
	}

	pub fn with_timeout(base_url: &str, timeout: Duration) -> SourceResult<Self> {
		let base_url = parse_base_url(base_url)?;

		let mut headers = HeaderMap::new();
		headers.insert("Accept", HeaderValue::from_static("application/json"));
		headers.insert("User-Agent", HeaderValue::from_static("paraxfer/0.1"));

		let client = Client::builder()
			.default_headers(headers)
			.timeout(timeout)
			.build()
			.map_err(|e| SourceError::Network {
				reason: format!("failed to build HTTP client: {e}"),
			})?;

		Ok(Self { client, base_url })
	}

	fn document_url(&self, reference: &str, document: &str) -> SourceResult<Url> {
		let reference = reference.trim_matches('/');
		self.base_url
			.join(&format!("{reference}/{document}"))
			.map_err(|e| SourceError::InvalidDocument {
				reason: format!("invalid registry reference '{reference}': {e}"),
			})
	}

	/// GET a JSON document; `Ok(None)` on 404
	async fn get_json(&self, url: Url) -> SourceResult<Option<Value>> {
		debug!("Fetching registry document {}", url);
		let response = self
			.client
			.get(url.clone())
			.send()
			.await
			.map_err(|e| SourceError::Network {
				reason: e.to_string(),
			})?;

		let status = response.status();
		if status == StatusCode::NOT_FOUND {
			return Ok(None);
		}
		if !status.is_success() {
			return Err(SourceError::Network {
				reason: format!("{url} returned status {status}"),
			});
		}

		let body = response.text().await.map_err(|e| SourceError::Network {
			reason: e.to_string(),
		})?;
		serde_json::from_str(&body)
			.map(Some)
			.map_err(|e| SourceError::InvalidDocument {
				reason: format!("{url}: {e}"),
			})
	}
}

fn parse_base_url(base_url: &str) -> SourceResult<Url> {
	// Url::join drops the last path segment unless it ends with '/'
	let normalized = if base_url.ends_with('/') {
		base_url.to_string()
	} else {
		format!("{base_url}/")
	};
	Url::parse(&normalized).map_err(|e| SourceError::InvalidDocument {
		reason: format!("invalid registry base URL '{base_url}': {e}"),
	})
}

#[async_trait]
impl RegistrySource for HttpRegistrySource {
	fn name(&self) -> &str {
		"http"
	}

	async fn fetch(&self, reference: &str) -> SourceResult<Value> {
		let chains = self
			.get_json(self.document_url(reference, CHAINS_DOCUMENT)?)
			.await?
			.ok_or_else(|| SourceError::NotFound {
				reference: reference.to_string(),
			})?;

		let assets = self
			.get_json(self.document_url(reference, ASSETS_DOCUMENT)?)
			.await?;

		if assets.is_none() {
			debug!("No separate assets document for '{}'", reference);
		}
		Ok(combine_documents(chains, assets))
	}
}

/// Merge the two published parts into one registry document
fn combine_documents(chains: Value, assets: Option<Value>) -> Value {
	let mut document = match chains {
		Value::Object(map) if map.contains_key("chains") => Value::Object(map),
		chains => json!({ "chains": chains }),
	};
	if let (Some(assets), Value::Object(map)) = (assets, &mut document) {
		map.entry("assets").or_insert(assets);
	}
	document
}

/// The registry compiled into the binary
#[derive(Debug, Clone, Default)]
pub struct BundledRegistrySource;

impl BundledRegistrySource {
	pub fn new() -> Self {
		Self
	}
}

#[async_trait]
impl RegistrySource for BundledRegistrySource {
	fn name(&self) -> &str {
		"bundled"
	}

	async fn fetch(&self, reference: &str) -> SourceResult<Value> {
		if reference != BUNDLED_REFERENCE {
			return Err(SourceError::NotFound {
				reference: reference.to_string(),
			});
		}
		serde_json::from_str(BUNDLED_REGISTRY).map_err(|e| SourceError::InvalidDocument {
			reason: format!("bundled registry: {e}"),
		})
	}
}

/// Tries `primary`, then `fallback` when the primary error is recoverable
#[derive(Debug, Clone)]
pub struct FallbackRegistrySource {
	name: String,
	primary: Arc<dyn RegistrySource>,
	fallback: Arc<dyn RegistrySource>,
}

impl FallbackRegistrySource {
	pub fn new(primary: Arc<dyn RegistrySource>, fallback: Arc<dyn RegistrySource>) -> Self {
		let name = format!("{}+{}", primary.name(), fallback.name());
		Self {
			name,
			primary,
			fallback,
		}
	}
}

#[async_trait]
impl RegistrySource for FallbackRegistrySource {
	fn name(&self) -> &str {
		&self.name
	}

	async fn fetch(&self, reference: &str) -> SourceResult<Value> {
		match self.primary.fetch(reference).await {
			Ok(document) => Ok(document),
			Err(e) if e.is_recoverable() => {
				warn!(
					"Registry source '{}' failed ({}), falling back to '{}'",
					self.primary.name(),
					e,
					self.fallback.name()
				);
				self.fallback.fetch(reference).await
			},
			Err(e) => Err(e),
		}
	}
}

/// Serves fresh cached documents and keeps the last good copy for outages
#[derive(Debug, Clone)]
pub struct CachedRegistrySource {
	name: String,
	inner: Arc<dyn RegistrySource>,
	cache: Arc<dyn DocumentCache>,
	ttl: TtlDuration,
}

impl CachedRegistrySource {
	pub fn new(inner: Arc<dyn RegistrySource>, cache: Arc<dyn DocumentCache>, ttl: Duration) -> Self {
		let ttl = TtlDuration::from_std(ttl).unwrap_or_else(|_| TtlDuration::hours(24));
		Self {
			name: format!("cached({})", inner.name()),
			inner,
			cache,
			ttl,
		}
	}

	async fn cached(&self, reference: &str) -> Option<CachedDocument> {
		match self.cache.get(reference).await {
			Ok(document) => document,
			Err(e) => {
				warn!("Failed to read cached registry '{}': {}", reference, e);
				None
			},
		}
	}
}

#[async_trait]
impl RegistrySource for CachedRegistrySource {
	fn name(&self) -> &str {
		&self.name
	}

	async fn fetch(&self, reference: &str) -> SourceResult<Value> {
		let cached = self.cached(reference).await;
		if let Some(document) = cached.as_ref().filter(|d| !d.is_expired()) {
			debug!("Using cached registry '{}' fetched at {}", reference, document.fetched_at);
			return Ok(document.document.clone());
		}

		match self.inner.fetch(reference).await {
			Ok(document) => {
				let entry = CachedDocument::new(reference, document.clone(), self.ttl);
				if let Err(e) = self.cache.put(entry).await {
					warn!("Failed to cache registry '{}': {}", reference, e);
				}
				Ok(document)
			},
			Err(e) if e.is_recoverable() => match cached {
				Some(stale) => {
					info!(
						"Registry source '{}' unavailable ({}), serving cached copy from {}",
						self.inner.name(),
						e,
						stale.fetched_at
					);
					Ok(stale.document)
				},
				None => Err(e),
			},
			Err(e) => Err(e),
		}
	}
}
