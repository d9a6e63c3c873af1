//! Scripted chains and requests for testing

use paraxfer::adapters::xcm_payment::{
	QUERY_ACCEPTABLE_PAYMENT_ASSETS, QUERY_WEIGHT_TO_ASSET_FEE, QUERY_XCM_WEIGHT,
};
use paraxfer_types::test_utils::{
	fee_response, payment_assets_response, weight_response, ScriptedConnector,
	ScriptedRuntimeClient,
};
use paraxfer_types::xcm::Weight;
use paraxfer::{FeeType, Location, TransferRequest};
use std::sync::Arc;

/// Endpoints and accounts from the bundled dataset
pub struct TestConstants;

#[allow(dead_code)]
impl TestConstants {
	pub const ASSETHUB_ONFINALITY: &'static str = "wss://statemint.api.onfinality.io/public-ws";
	pub const ASSETHUB_DWELLIR: &'static str = "wss://asset-hub-polkadot-rpc.dwellir.com";
	pub const ASSETHUB_PARITY: &'static str = "wss://polkadot-asset-hub-rpc.polkadot.io";
	pub const POLKADOT_ONFINALITY: &'static str = "wss://polkadot.api.onfinality.io/public-ws";
	pub const MOONBEAM_RECIPIENT: &'static str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
	pub const SUBSTRATE_RECIPIENT: &'static str =
		"0xd43593c715fdd31c61141abd04a99fd6822c8558854ccde39a5684e7a56da27d";
	pub const USDT_ASSET_ID: u128 = 1984;
}

/// Builders for scripted runtimes and requests
#[allow(dead_code)]
pub struct MockEntities;

#[allow(dead_code)]
impl MockEntities {
	pub fn weight() -> Weight {
		Weight::new(2_000_000_000, 100_000)
	}

	/// Asset Hub location of USDt
	pub fn usdt_location() -> Location {
		paraxfer_types::test_utils::usdt_location()
	}

	/// Runtime that quotes `fee` for any transfer and accepts `accepted` as payment
	pub fn runtime(endpoint: &str, fee: u128, accepted: &[Location]) -> ScriptedRuntimeClient {
		ScriptedRuntimeClient::new(endpoint)
			.respond(QUERY_ACCEPTABLE_PAYMENT_ASSETS, Ok(payment_assets_response(accepted)))
			.respond(QUERY_XCM_WEIGHT, Ok(weight_response(Self::weight())))
			.respond(QUERY_WEIGHT_TO_ASSET_FEE, Ok(fee_response(fee)))
	}

	/// Connector with a live Asset Hub behind its preferred endpoint
	pub fn assethub_connector(fee: u128) -> (Arc<ScriptedConnector>, Arc<ScriptedRuntimeClient>) {
		let client = Arc::new(Self::runtime(
			TestConstants::ASSETHUB_ONFINALITY,
			fee,
			&[Location::parent(), Self::usdt_location()],
		));
		let connector = Arc::new(
			ScriptedConnector::new().live(TestConstants::ASSETHUB_ONFINALITY, Arc::clone(&client)),
		);
		(connector, client)
	}

	/// 10 USDt from Asset Hub to Moonbeam
	pub fn usdt_to_moonbeam() -> TransferRequest {
		TransferRequest::new(
			"assethub",
			"USDt",
			TestConstants::MOONBEAM_RECIPIENT,
			2004,
			10_000_000u128,
		)
	}

	pub fn dot_to_hydration() -> TransferRequest {
		TransferRequest::new(
			"assethub",
			"DOT",
			TestConstants::SUBSTRATE_RECIPIENT,
			2034,
			10_000_000_000u128,
		)
		.with_fee_type(FeeType::NetworkFee)
	}
}
