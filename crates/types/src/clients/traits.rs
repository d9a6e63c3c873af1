//! Client traits implemented by the adapters crate
//!
//! Services only see these seams, so tests can swap in scripted clients.

use super::errors::{ClientResult, PriceFeedResult, SourceResult};
use crate::endpoints::EndpointCandidate;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::Arc;

/// A connected runtime that answers JSON-RPC calls
#[async_trait]
pub trait RuntimeClient: Send + Sync + Debug {
	/// URL this client is connected to
	fn endpoint(&self) -> String;

	/// Whether the underlying transport is still usable
	fn is_connected(&self) -> bool;

	/// Issue one JSON-RPC request
	async fn call(&self, method: &str, params: Vec<Value>) -> ClientResult<Value>;
}

/// Opens runtime clients
#[async_trait]
pub trait ChainConnector: Send + Sync + Debug {
	async fn connect(&self, endpoint: &EndpointCandidate) -> ClientResult<Arc<dyn RuntimeClient>>;
}

/// Where raw registry documents come from
#[async_trait]
pub trait RegistrySource: Send + Sync + Debug {
	/// Short name for logs
	fn name(&self) -> &str;

	/// Fetch the raw document published under `reference`
	async fn fetch(&self, reference: &str) -> SourceResult<Value>;
}

/// USD price of one token
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TokenPrice {
	pub usd: f64,
}

/// Display-only price lookups
#[async_trait]
pub trait PriceFeed: Send + Sync + Debug {
	/// Prices keyed by feed id; ids the feed does not know are omitted
	async fn prices(&self, ids: &[String]) -> PriceFeedResult<BTreeMap<String, TokenPrice>>;
}
