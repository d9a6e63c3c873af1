//! Pre-flight checks
//!
//! Nothing here talks to a chain. A request that passes [`validate_transfer`]
//! has every piece the fee resolver needs resolved against the registry.

use paraxfer_types::{
	Asset, Chain, FeeError, FeeResult, Location, Recipient, Registry, TransferRequest,
};
use serde::{Deserialize, Serialize};

pub const FROM_CHAIN_NOT_SELECTED: &str = "From chain not selected";
pub const TO_CHAIN_NOT_SELECTED: &str = "To chain not selected";
pub const NO_ASSETS_AVAILABLE: &str = "No assets available";

/// Inputs of a token-list fetch for the transfer form
#[derive(Debug, Clone, Default)]
pub struct TokenFetchRequest<'a> {
	pub from_chain: Option<&'a Chain>,
	pub to_chain: Option<&'a Chain>,
	pub assets: &'a [Asset],
	pub substrate_address: Option<&'a str>,
	pub evm_address: Option<&'a str>,
}

/// Outcome of [`validate_token_fetch`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenFetchValidation {
	pub is_valid: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
	/// Account whose balances should be fetched
	#[serde(skip_serializing_if = "Option::is_none")]
	pub address: Option<String>,
}

impl TokenFetchValidation {
	fn invalid(error: &str) -> Self {
		Self {
			is_valid: false,
			error: Some(error.to_string()),
			address: None,
		}
	}
}

/// Check that a token list can be fetched and pick the account to query
pub fn validate_token_fetch(request: &TokenFetchRequest<'_>) -> TokenFetchValidation {
	let Some(from_chain) = request.from_chain else {
		return TokenFetchValidation::invalid(FROM_CHAIN_NOT_SELECTED);
	};
	if request.to_chain.is_none() {
		return TokenFetchValidation::invalid(TO_CHAIN_NOT_SELECTED);
	}
	if request.assets.is_empty() {
		return TokenFetchValidation::invalid(NO_ASSETS_AVAILABLE);
	}

	let address = if from_chain.is_evm {
		request.evm_address
	} else {
		request.substrate_address
	};
	TokenFetchValidation {
		is_valid: true,
		error: None,
		address: address.map(str::to_string),
	}
}

/// A transfer request resolved against a registry snapshot
#[derive(Debug, Clone)]
pub struct ValidatedTransfer<'a> {
	pub source: &'a Chain,
	pub destination: &'a Chain,
	pub asset: &'a Asset,
	/// Location of the asset as seen from the source chain
	pub asset_location: &'a Location,
	pub recipient: Recipient,
	pub amount: u128,
}

/// Gate a transfer before any runtime is contacted
pub fn validate_transfer<'a>(
	registry: &'a Registry,
	request: &TransferRequest,
) -> FeeResult<ValidatedTransfer<'a>> {
	let source = registry.chain(&request.source_chain).ok_or_else(|| {
		FeeError::validation(format!("Unknown source chain '{}'", request.source_chain))
	})?;

	let destination = registry
		.chain_by_para_id(request.destination_para_id)
		.ok_or_else(|| {
			FeeError::validation(format!(
				"No chain with parachain id {}",
				request.destination_para_id
			))
		})?;
	if destination.slug == source.slug {
		return Err(FeeError::validation(
			"Source and destination chains must differ",
		));
	}

	let asset = source.find_asset(&request.asset).ok_or_else(|| {
		FeeError::validation(format!(
			"Asset '{}' is not known on {}",
			request.asset, source.slug
		))
	})?;
	let asset_location = asset.location().ok_or_else(|| {
		FeeError::validation(format!(
			"Asset '{}' on {} has no XCM location",
			asset.symbol, source.slug
		))
	})?;

	if request.recipient_address.trim().is_empty() {
		return Err(FeeError::validation("Recipient address is required"));
	}
	let recipient = Recipient::parse(&request.recipient_address, destination.account_kind())
		.map_err(|e| FeeError::validation(format!("Invalid recipient for {}: {e}", destination.slug)))?;

	let amount = request
		.amount
		.as_u128()
		.map_err(|e| FeeError::validation(e.to_string()))?;
	if amount == 0 {
		return Err(FeeError::validation("Amount must be greater than zero"));
	}

	Ok(ValidatedTransfer {
		source,
		destination,
		asset,
		asset_location,
		recipient,
		amount,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use paraxfer_types::test_utils::{sample_registry, ALICE, ALICE_SS58, EVM_RECIPIENT};

	const SUBSTRATE: &str = "15oF4uVJwmo4TdGW7VfQxNLavjCXviqxT9S1MgbjMNHr6Sp5";

	fn usdt_to_moonbeam() -> TransferRequest {
		TransferRequest::new("assethub", "USDt", EVM_RECIPIENT, 2004, 1_000_000u128)
	}

	fn reason(result: FeeResult<ValidatedTransfer<'_>>) -> String {
		match result {
			Err(FeeError::ValidationFailed(reason)) => reason,
			other => panic!("expected a validation failure, got {other:?}"),
		}
	}

	#[test]
	fn test_token_fetch_messages() {
		let registry = sample_registry();
		let polkadot = registry.chain("polkadot").unwrap();
		let assets = vec![polkadot.native_token.clone()];

		let missing_from = TokenFetchRequest {
			to_chain: Some(polkadot),
			assets: &assets,
			..Default::default()
		};
		assert_eq!(
			validate_token_fetch(&missing_from),
			TokenFetchValidation {
				is_valid: false,
				error: Some("From chain not selected".to_string()),
				address: None
			}
		);

		let missing_to = TokenFetchRequest {
			from_chain: Some(polkadot),
			assets: &assets,
			..Default::default()
		};
		assert_eq!(
			validate_token_fetch(&missing_to).error.as_deref(),
			Some("To chain not selected")
		);

		let no_assets = TokenFetchRequest {
			from_chain: Some(polkadot),
			to_chain: Some(polkadot),
			..Default::default()
		};
		assert_eq!(
			validate_token_fetch(&no_assets).error.as_deref(),
			Some("No assets available")
		);
	}

	#[test]
	fn test_token_fetch_picks_address_by_source_kind() {
		let registry = sample_registry();
		let moonbeam = registry.chain("moonbeam").unwrap();
		let assethub = registry.chain("assethub").unwrap();
		let assets = vec![assethub.native_token.clone()];

		let from_evm = TokenFetchRequest {
			from_chain: Some(moonbeam),
			to_chain: Some(assethub),
			assets: &assets,
			substrate_address: Some(ALICE_SS58),
			evm_address: Some(EVM_RECIPIENT),
		};
		let validation = validate_token_fetch(&from_evm);
		assert!(validation.is_valid);
		assert_eq!(validation.address.as_deref(), Some(EVM_RECIPIENT));

		let from_substrate = TokenFetchRequest {
			from_chain: Some(assethub),
			to_chain: Some(moonbeam),
			assets: &assets,
			substrate_address: None,
			evm_address: Some(EVM_RECIPIENT),
		};
		let validation = validate_token_fetch(&from_substrate);
		assert!(validation.is_valid);
		assert_eq!(validation.address, None);

		let evm_without_address = TokenFetchRequest {
			evm_address: None,
			..from_evm
		};
		assert_eq!(
			validate_token_fetch(&evm_without_address),
			TokenFetchValidation {
				is_valid: true,
				error: None,
				address: None
			}
		);
	}

	#[test]
	fn test_valid_transfer() {
		let registry = sample_registry();
		let validated = validate_transfer(&registry, &usdt_to_moonbeam()).unwrap();
		assert_eq!(validated.source.slug, "assethub");
		assert_eq!(validated.destination.slug, "moonbeam");
		assert_eq!(validated.asset.symbol, "USDt");
		assert!(matches!(validated.recipient, Recipient::Key20(_)));
		assert_eq!(validated.amount, 1_000_000);
	}

	#[test]
	fn test_substrate_recipient_forms() {
		let registry = sample_registry();
		for recipient in [ALICE_SS58.to_string(), SUBSTRATE.to_string(), format!("0x{}", hex::encode(ALICE))] {
			let request = TransferRequest::new("moonbeam", "USDt", recipient, 1000, 5u128);
			let validated = validate_transfer(&registry, &request).unwrap();
			assert!(matches!(validated.recipient, Recipient::Id32(_)));
		}
	}

	#[test]
	fn test_rejections() {
		let registry = sample_registry();

		let mut request = usdt_to_moonbeam();
		request.source_chain = "kusama".to_string();
		assert!(reason(validate_transfer(&registry, &request)).contains("Unknown source chain"));

		let mut request = usdt_to_moonbeam();
		request.destination_para_id = 9999;
		assert!(reason(validate_transfer(&registry, &request)).contains("parachain id 9999"));

		let mut request = usdt_to_moonbeam();
		request.destination_para_id = 1000;
		assert!(reason(validate_transfer(&registry, &request)).contains("must differ"));

		let mut request = usdt_to_moonbeam();
		request.asset = "GLMR".to_string();
		assert!(reason(validate_transfer(&registry, &request)).contains("not known"));

		let request = TransferRequest::new("acala", "ACA", ALICE_SS58, 1000, 1u128);
		assert!(reason(validate_transfer(&registry, &request)).contains("no XCM location"));

		let mut request = usdt_to_moonbeam();
		request.recipient_address = "  ".to_string();
		assert!(reason(validate_transfer(&registry, &request)).contains("required"));

		let mut request = usdt_to_moonbeam();
		request.recipient_address = ALICE_SS58.to_string();
		assert!(reason(validate_transfer(&registry, &request)).contains("Invalid recipient"));

		let mut request = usdt_to_moonbeam();
		request.amount = 0u128.into();
		assert!(reason(validate_transfer(&registry, &request)).contains("greater than zero"));
	}
}
