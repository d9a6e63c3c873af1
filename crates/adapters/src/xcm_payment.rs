//! `XcmPaymentApi` runtime calls over `state_call`
//!
//! Requests and answers are SCALE-encoded and travel as `0x` hex strings. Every
//! answer is a `Result<T, XcmPaymentApiError>`.

use codec::{Compact, Decode, Encode};
use paraxfer_types::xcm::{decode_versioned_asset_id, encode_versioned_asset_id, Weight, Xcm};
use paraxfer_types::{ClientError, CodecError, Location, RuntimeClient};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

pub const QUERY_ACCEPTABLE_PAYMENT_ASSETS: &str = "XcmPaymentApi_query_acceptable_payment_assets";
pub const QUERY_XCM_WEIGHT: &str = "XcmPaymentApi_query_xcm_weight";
pub const QUERY_WEIGHT_TO_ASSET_FEE: &str = "XcmPaymentApi_query_weight_to_asset_fee";

/// Error returned by the runtime API itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XcmPaymentApiError {
	Unimplemented,
	VersionedConversionFailed,
	WeightNotComputable,
	UnhandledXcmVersion,
	AssetNotFound,
	Unroutable,
	Unknown(u8),
}

impl From<u8> for XcmPaymentApiError {
	fn from(index: u8) -> Self {
		match index {
			0 => XcmPaymentApiError::Unimplemented,
			1 => XcmPaymentApiError::VersionedConversionFailed,
			2 => XcmPaymentApiError::WeightNotComputable,
			3 => XcmPaymentApiError::UnhandledXcmVersion,
			4 => XcmPaymentApiError::AssetNotFound,
			5 => XcmPaymentApiError::Unroutable,
			other => XcmPaymentApiError::Unknown(other),
		}
	}
}

impl fmt::Display for XcmPaymentApiError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			XcmPaymentApiError::Unknown(index) => write!(f, "unknown error {index}"),
			other => write!(f, "{other:?}"),
		}
	}
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaymentQueryError {
	#[error(transparent)]
	Client(#[from] ClientError),

	#[error("{method} returned {error}")]
	Api {
		method: String,
		error: XcmPaymentApiError,
	},

	#[error("Failed to decode {method} answer: {reason}")]
	Decode { method: String, reason: String },

	#[error(transparent)]
	Codec(#[from] CodecError),
}

impl PaymentQueryError {
	fn decode(method: &str, reason: impl Into<String>) -> Self {
		Self::Decode {
			method: method.to_string(),
			reason: reason.into(),
		}
	}
}

pub type PaymentQueryResult<T> = Result<T, PaymentQueryError>;

/// Typed access to a runtime's `XcmPaymentApi`
#[derive(Debug, Clone)]
pub struct XcmPaymentApi {
	client: Arc<dyn RuntimeClient>,
}

impl XcmPaymentApi {
	pub fn new(client: Arc<dyn RuntimeClient>) -> Self {
		Self { client }
	}

	/// Client the calls go through
	pub fn client(&self) -> &Arc<dyn RuntimeClient> {
		&self.client
	}

	/// Assets the runtime accepts for execution fees, as locations
	pub async fn acceptable_payment_assets(&self, xcm_version: u32) -> PaymentQueryResult<Vec<Location>> {
		let method = QUERY_ACCEPTABLE_PAYMENT_ASSETS;
		let bytes = self.state_call(method, xcm_version.encode()).await?;
		let mut input = ok_payload(method, &bytes)?;
		let count = Compact::<u32>::decode(&mut input)
			.map_err(|e| PaymentQueryError::decode(method, e.to_string()))?
			.0;
		let mut assets = Vec::with_capacity(count.min(64) as usize);
		for _ in 0..count {
			assets.push(decode_versioned_asset_id(&mut input)?);
		}
		Ok(assets)
	}

	/// Weight needed to execute `message`
	pub async fn query_xcm_weight(&self, message: &Xcm) -> PaymentQueryResult<Weight> {
		let method = QUERY_XCM_WEIGHT;
		let bytes = self.state_call(method, message.encode_versioned()?).await?;
		let mut input = ok_payload(method, &bytes)?;
		Ok(Weight::decode(&mut input)?)
	}

	/// Price of `weight` in base units of `asset`
	pub async fn query_weight_to_asset_fee(
		&self,
		weight: Weight,
		asset: &Location,
	) -> PaymentQueryResult<u128> {
		let method = QUERY_WEIGHT_TO_ASSET_FEE;
		let mut payload = Vec::new();
		weight.encode_to(&mut payload);
		payload.extend(encode_versioned_asset_id(asset)?);

		let bytes = self.state_call(method, payload).await?;
		let mut input = ok_payload(method, &bytes)?;
		u128::decode(&mut input).map_err(|e| PaymentQueryError::decode(method, e.to_string()))
	}

	async fn state_call(&self, method: &str, payload: Vec<u8>) -> PaymentQueryResult<Vec<u8>> {
		debug!("state_call {} on {}", method, self.client.endpoint());
		let params = vec![
			Value::String(method.to_string()),
			Value::String(format!("0x{}", hex::encode(payload))),
		];
		let answer = self.client.call("state_call", params).await?;
		let text = answer
			.as_str()
			.ok_or_else(|| PaymentQueryError::decode(method, "expected a hex string"))?;
		hex::decode(text.trim_start_matches("0x"))
			.map_err(|e| PaymentQueryError::decode(method, e.to_string()))
	}
}

/// Unwrap the `Result` envelope of a runtime API answer
fn ok_payload<'a>(method: &str, bytes: &'a [u8]) -> PaymentQueryResult<&'a [u8]> {
	match bytes.split_first() {
		Some((0, rest)) => Ok(rest),
		Some((1, rest)) => {
			let index = rest.first().copied().unwrap_or(u8::MAX);
			Err(PaymentQueryError::Api {
				method: method.to_string(),
				error: XcmPaymentApiError::from(index),
			})
		},
		Some((tag, _)) => Err(PaymentQueryError::decode(
			method,
			format!("unexpected result tag {tag}"),
		)),
		None => Err(PaymentQueryError::decode(method, "empty answer")),
	}
}
