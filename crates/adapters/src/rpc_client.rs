//! WebSocket JSON-RPC runtime client

use async_trait::async_trait;
use jsonrpsee::core::client::ClientT;
use jsonrpsee::core::params::ArrayParams;
use jsonrpsee::core::ClientError as RpcError;
use jsonrpsee::ws_client::{WsClient, WsClientBuilder};
use paraxfer_types::{ChainConnector, ClientError, ClientResult, EndpointCandidate, RuntimeClient};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default timeout for a single RPC request
pub const RPC_TIMEOUT: Duration = Duration::from_secs(60);

/// Largest request or response accepted, metadata blobs included
const MAX_MESSAGE_SIZE: u32 = 16 * 1024 * 1024;

/// A runtime reached over WebSocket
#[derive(Debug)]
pub struct WsRuntimeClient {
	client: WsClient,
	endpoint: String,
}

impl WsRuntimeClient {
	/// Connect to a `ws://` or `wss://` endpoint
	pub async fn connect(endpoint: &str, request_timeout: Duration) -> ClientResult<Self> {
		let url = validate_ws_url(endpoint)?;
		debug!("Initializing runtime client to {}", url);

		let client = WsClientBuilder::default()
			.max_request_size(MAX_MESSAGE_SIZE)
			.max_response_size(MAX_MESSAGE_SIZE)
			.request_timeout(request_timeout)
			.build(url.as_str())
			.await
			.map_err(|e| ClientError::Connection {
				endpoint: endpoint.to_string(),
				reason: e.to_string(),
			})?;

		Ok(Self {
			client,
			endpoint: endpoint.to_string(),
		})
	}
}

fn validate_ws_url(endpoint: &str) -> ClientResult<Url> {
	let url = Url::parse(endpoint).map_err(|e| ClientError::Connection {
		endpoint: endpoint.to_string(),
		reason: format!("invalid URL: {e}"),
	})?;
	match url.scheme() {
		"ws" | "wss" => Ok(url),
		other => Err(ClientError::Connection {
			endpoint: endpoint.to_string(),
			reason: format!("unsupported scheme '{other}'"),
		}),
	}
}

fn map_rpc_error(method: &str, err: RpcError) -> ClientError {
	match err {
		RpcError::Call(call) => ClientError::Request {
			method: method.to_string(),
			reason: call.message().to_string(),
		},
		RpcError::ParseError(e) => ClientError::invalid_response(method, e.to_string()),
		other => ClientError::Transport {
			reason: other.to_string(),
		},
	}
}

#[async_trait]
impl RuntimeClient for WsRuntimeClient {
	fn endpoint(&self) -> String {
		self.endpoint.clone()
	}

	fn is_connected(&self) -> bool {
		self.client.is_connected()
	}

	async fn call(&self, method: &str, params: Vec<Value>) -> ClientResult<Value> {
		let mut rpc_params = ArrayParams::new();
		for param in params {
			rpc_params
				.insert(param)
				.map_err(|e| ClientError::Request {
					method: method.to_string(),
					reason: format!("failed to encode params: {e}"),
				})?;
		}
		self.client
			.request::<Value, _>(method, rpc_params)
			.await
			.map_err(|e| map_rpc_error(method, e))
	}
}

/// Opens [`WsRuntimeClient`]s
#[derive(Debug, Clone)]
pub struct WsConnector {
	request_timeout: Duration,
}

impl WsConnector {
	pub fn new(request_timeout: Duration) -> Self {
		Self { request_timeout }
	}
}

impl Default for WsConnector {
	fn default() -> Self {
		Self::new(RPC_TIMEOUT)
	}
}

#[async_trait]
impl ChainConnector for WsConnector {
	async fn connect(&self, endpoint: &EndpointCandidate) -> ClientResult<Arc<dyn RuntimeClient>> {
		let client = WsRuntimeClient::connect(&endpoint.url, self.request_timeout).await?;
		Ok(Arc::new(client))
	}
}
