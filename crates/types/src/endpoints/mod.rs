//! RPC endpoint candidates and connection errors

use crate::registry::Provider;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A WebSocket endpoint that passed scheme filtering, with its rank
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EndpointCandidate {
	pub url: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub label: Option<String>,
	/// Zero-based priority class; lower is preferred
	pub priority: usize,
}

impl EndpointCandidate {
	pub fn new(url: impl Into<String>, priority: usize) -> Self {
		Self {
			url: url.into(),
			label: None,
			priority,
		}
	}

	pub fn from_provider(provider: &Provider, priority: usize) -> Self {
		Self {
			url: provider.url.clone(),
			label: provider.label.clone(),
			priority,
		}
	}
}

/// Connection failures for a chain's endpoint list
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EndpointError {
	#[error("No live endpoint for chain '{chain}' after {attempted} attempt(s)")]
	NoLiveEndpoint { chain: String, attempted: usize },

	#[error("Connecting to chain '{chain}' timed out after {timeout_ms}ms")]
	ConnectTimeout { chain: String, timeout_ms: u64 },
}

pub type EndpointResult<T> = Result<T, EndpointError>;
