//! USD price lookups for display
//!
//! Speaks the CoinGecko `simple/price` shape:
//! `GET {base}?ids=polkadot,tether&vs_currencies=usd` answers
//! `{"polkadot": {"usd": 4.21}, "tether": {"usd": 1.0}}`.

use async_trait::async_trait;
use paraxfer_types::{PriceFeed, PriceFeedError, PriceFeedResult, TokenPrice};
use reqwest::{
	header::{HeaderMap, HeaderValue},
	Client,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const DEFAULT_PRICE_FEED_URL: &str = "https://api.coingecko.com/api/v3/simple/price";

#[derive(Debug, Deserialize)]
struct ErrorBody {
	#[serde(default)]
	error: Option<String>,
	#[serde(default)]
	status: Option<ErrorStatus>,
}

#[derive(Debug, Deserialize)]
struct ErrorStatus {
	error_message: String,
}

impl ErrorBody {
	fn message(self) -> Option<String> {
		self.error.or(self.status.map(|s| s.error_message))
	}
}

#[derive(Debug, Clone)]
pub struct HttpPriceFeed {
	client: Client,
	url: Url,
}

impl HttpPriceFeed {
	pub fn new(url: &str, timeout: Duration) -> PriceFeedResult<Self> {
		let url = Url::parse(url).map_err(|e| PriceFeedError::InvalidResponse {
			reason: format!("invalid price feed URL '{url}': {e}"),
		})?;

		let mut headers = HeaderMap::new();
		headers.insert("Accept", HeaderValue::from_static("application/json"));
		headers.insert("User-Agent", HeaderValue::from_static("paraxfer/0.1"));

		let client = Client::builder()
			.default_headers(headers)
			.timeout(timeout)
			.build()
			.map_err(|e| PriceFeedError::Network {
				reason: e.to_string(),
			})?;
		Ok(Self { client, url })
	}
}

#[async_trait]
impl PriceFeed for HttpPriceFeed {
	async fn prices(&self, ids: &[String]) -> PriceFeedResult<BTreeMap<String, TokenPrice>> {
		if ids.is_empty() {
			return Ok(BTreeMap::new());
		}
		let joined = ids.join(",");
		debug!("Requesting prices for {}", joined);

		let response = self
			.client
			.get(self.url.clone())
			.query(&[("ids", joined.as_str()), ("vs_currencies", "usd")])
			.send()
			.await
			.map_err(|e| PriceFeedError::Network {
				reason: e.to_string(),
			})?;

		let status = response.status();
		let body = response.text().await.map_err(|e| PriceFeedError::Network {
			reason: e.to_string(),
		})?;

		if !status.is_success() {
			let message = serde_json::from_str::<ErrorBody>(&body)
				.ok()
				.and_then(ErrorBody::message)
				.unwrap_or_else(|| status.to_string());
			return Err(PriceFeedError::Http {
				status: status.as_u16(),
				message,
			});
		}

		serde_json::from_str(&body).map_err(|e| PriceFeedError::InvalidResponse {
			reason: format!("Failed to parse price response: {e}"),
		})
	}
}
