//! Transfer requests as submitted by callers

use super::FeeType;
use crate::models::Amount;
use serde::{Deserialize, Serialize};

/// A cross-chain transfer to be validated, priced and planned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
	/// Slug of the sending chain
	pub source_chain: String,
	/// Symbol of the asset on the source chain
	pub asset: String,
	pub recipient_address: String,
	pub destination_para_id: u32,
	/// Base units of the asset
	pub amount: Amount,
	#[serde(default = "default_fee_type")]
	pub fee_type: FeeType,
}

fn default_fee_type() -> FeeType {
	FeeType::CrossChainFee
}

impl TransferRequest {
	pub fn new(
		source_chain: impl Into<String>,
		asset: impl Into<String>,
		recipient_address: impl Into<String>,
		destination_para_id: u32,
		amount: impl Into<Amount>,
	) -> Self {
		Self {
			source_chain: source_chain.into(),
			asset: asset.into(),
			recipient_address: recipient_address.into(),
			destination_para_id,
			amount: amount.into(),
			fee_type: default_fee_type(),
		}
	}

	pub fn with_fee_type(mut self, fee_type: FeeType) -> Self {
		self.fee_type = fee_type;
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_request_from_json() {
		let request: TransferRequest = serde_json::from_value(json!({
			"sourceChain": "assethub",
			"asset": "USDt",
			"recipientAddress": "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266",
			"destinationParaId": 2004,
			"amount": "1000000"
		}))
		.unwrap();
		assert_eq!(request.fee_type, FeeType::CrossChainFee);
		assert_eq!(request.amount.as_u128().unwrap(), 1_000_000);

		assert!(serde_json::from_value::<TransferRequest>(json!({
			"sourceChain": "assethub",
			"asset": "USDt",
			"recipientAddress": "x",
			"destinationParaId": 2004,
			"amount": 1.5
		}))
		.is_err());
	}
}
