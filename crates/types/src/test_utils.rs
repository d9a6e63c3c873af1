//! Test utilities: registry fixtures and scripted clients
//!
//! Available to this crate's unit tests and, through the `test-utils` feature,
//! to the tests of downstream crates.

use crate::clients::{
	ChainConnector, ClientError, ClientResult, RegistrySource, RuntimeClient, SourceError,
	SourceResult,
};
use crate::endpoints::EndpointCandidate;
use crate::models::Amount;
use crate::registry::{Asset, Chain, LocalAsset, Provider, Registry, ReserveType};
use crate::xcm::{Junction, Location, VersionedLocation, Weight, XcmVersion};
use async_trait::async_trait;
use codec::Encode;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Alice's account id, used as a Substrate recipient
pub const ALICE: [u8; 32] = [
	0xd4, 0x35, 0x93, 0xc7, 0x15, 0xfd, 0xd3, 0x1c, 0x61, 0x14, 0x1a, 0xbd, 0x04, 0xa9, 0x9f, 0xd6,
	0x82, 0x2c, 0x85, 0x58, 0x85, 0x4c, 0xcd, 0xe3, 0x9a, 0x56, 0x84, 0xe7, 0xa5, 0x6d, 0xa2, 0x7d,
];

/// Alice in generic SS58 (prefix 42)
pub const ALICE_SS58: &str = "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY";

/// An EVM recipient
pub const EVM_RECIPIENT: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

/// V3 location of USDt as seen from inside Asset Hub
pub fn usdt_location() -> Location {
	Location {
		parents: 0,
		interior: vec![Junction::PalletInstance(50), Junction::GeneralIndex(1984)],
	}
}

/// Small registry: Polkadot relay, Asset Hub, Moonbeam (EVM) and Acala
pub fn sample_registry() -> Registry {
	let dot = Asset::new("DOT", "DOT", 10)
		.with_location(VersionedLocation::new(XcmVersion::V3, Location::parent()));

	let mut polkadot = Chain::new("polkadot", "Polkadot", dot.clone());
	polkadot.address_prefix = 0;
	polkadot.providers = vec![
		Provider::labelled("Parity", "wss://rpc.polkadot.io"),
		Provider::labelled("OnFinality", "wss://polkadot.api.onfinality.io/public-ws"),
	];
	polkadot.existential_deposit = Amount::from(10_000_000_000u128);
	polkadot.native_token = Asset::new("DOT", "DOT", 10)
		.with_location(VersionedLocation::new(XcmVersion::V3, Location::here()))
		.with_registration("assethub", dot.clone());

	let usdt = Asset::new(1984u128, "USDt", 6)
		.with_location(VersionedLocation::new(XcmVersion::V3, usdt_location()));
	let mut assethub = Chain::new("assethub", "Asset Hub", dot.clone());
	assethub.para_id = Some(1000);
	assethub.relay = Some("polkadot".to_string());
	assethub.providers = vec![
		Provider::labelled("Dwellir", "wss://asset-hub-polkadot-rpc.dwellir.com"),
		Provider::labelled("Parity", "wss://polkadot-asset-hub-rpc.polkadot.io"),
	];
	assethub.existential_deposit = Amount::from(100_000_000u128);
	assethub.native_token = dot.clone().with_registration(
		"polkadot",
		Asset::new("DOT", "DOT", 10)
			.with_location(VersionedLocation::new(XcmVersion::V3, Location::here())),
	);
	assethub.local_assets.push(LocalAsset {
		id: 1984,
		asset: usdt.clone().with_registration(
			"moonbeam",
			Asset::new("xcUSDT", "USDt", 6).with_reserve_type(ReserveType::Foreign),
		),
	});

	let mut moonbeam = Chain::new("moonbeam", "Moonbeam", Asset::new("GLMR", "GLMR", 18));
	moonbeam.para_id = Some(2004);
	moonbeam.relay = Some("polkadot".to_string());
	moonbeam.is_evm = true;
	moonbeam.evm_chain_id = Some(1284);
	moonbeam.address_prefix = 1284;
	moonbeam.providers = vec![Provider::labelled("Blast", "wss://moonbeam.public.blastapi.io")];
	moonbeam.existential_deposit = Amount::zero();
	moonbeam.xc_assets_data.insert(
		"assethub".to_string(),
		vec![Asset::new("xcUSDT", "USDt", 6)
			.with_location(VersionedLocation::new(
				XcmVersion::V3,
				Location {
					parents: 1,
					interior: vec![
						Junction::Parachain(1000),
						Junction::PalletInstance(50),
						Junction::GeneralIndex(1984),
					],
				},
			))
			.with_reserve_type(ReserveType::Foreign)
			.with_registration("assethub", usdt)],
	);

	let mut acala = Chain::new("acala", "Acala", Asset::new("ACA", "ACA", 12));
	acala.para_id = Some(2000);
	acala.relay = Some("polkadot".to_string());
	acala.address_prefix = 10;
	acala.providers = vec![Provider::new("https://acala-rpc.dwellir.com")];

	let chains = [polkadot, assethub, moonbeam, acala]
		.into_iter()
		.map(|chain| (chain.slug.clone(), chain))
		.collect();
	Registry::new(chains, Vec::new()).expect("sample registry is not empty")
}

/// Raw registry document in the split `chains` + `assets` shape
pub fn sample_registry_document() -> Value {
	json!({
		"chains": [
			{
				"slug": "polkadot",
				"name": "Polkadot",
				"addressPrefix": 0,
				"providers": {"Parity": "wss://rpc.polkadot.io"},
				"existentialDeposit": "10000000000"
			},
			{
				"slug": "assethub",
				"name": "Asset Hub",
				"paraId": 1000,
				"relay": "polkadot",
				"providers": ["wss://polkadot-asset-hub-rpc.polkadot.io"],
				"existentialDeposit": "100000000"
			}
		],
		"assets": {
			"polkadot": {
				"nativeToken": {
					"assetId": "DOT",
					"symbol": "DOT",
					"decimals": 10,
					"xcmLocation": {"v3": {"parents": 0, "interior": "here"}},
					"registeredChains": {
						"assethub": {"assetId": "DOT", "symbol": "DOT", "decimals": 10}
					}
				}
			},
			"assethub": {
				"nativeToken": {
					"assetId": "DOT",
					"symbol": "DOT",
					"decimals": 10,
					"xcmLocation": {"v3": {"parents": 1, "interior": "here"}},
					"registeredChains": {
						"polkadot": {"assetId": "DOT", "symbol": "DOT", "decimals": 10}
					}
				},
				"localAssets": [
					{
						"id": 1984,
						"assetId": 1984,
						"symbol": "USDt",
						"decimals": 6,
						"xcmLocation": {"v3": {"parents": 0, "interior": {"x2": [{"palletInstance": 50}, {"generalIndex": 1984}]}}}
					}
				]
			}
		}
	})
}

/// SCALE `Ok(value)` of a runtime API result, as the hex string `state_call` returns
pub fn runtime_ok(value: &[u8]) -> Value {
	let mut bytes = vec![0u8];
	bytes.extend_from_slice(value);
	Value::String(format!("0x{}", hex::encode(bytes)))
}

/// SCALE `Err(index)` of an `XcmPaymentApi` result
pub fn runtime_err(index: u8) -> Value {
	Value::String(format!("0x{}", hex::encode([1u8, index])))
}

/// `query_xcm_weight` answer
pub fn weight_response(weight: Weight) -> Value {
	let mut bytes = Vec::new();
	weight.encode_to(&mut bytes);
	runtime_ok(&bytes)
}

/// `query_weight_to_asset_fee` answer
pub fn fee_response(fee: u128) -> Value {
	runtime_ok(&fee.encode())
}

/// `query_acceptable_payment_assets` answer listing V3 concrete ids
pub fn payment_assets_response(locations: &[Location]) -> Value {
	let mut bytes = codec::Compact(locations.len() as u32).encode();
	for location in locations {
		bytes.extend(
			crate::xcm::encode_versioned_asset_id(location).expect("fixture location encodes"),
		);
	}
	runtime_ok(&bytes)
}

/// Runtime client that answers from a script
///
/// `state_call` requests are keyed by the runtime API method (the first param);
/// other requests by the RPC method name.
#[derive(Debug)]
pub struct ScriptedRuntimeClient {
	endpoint: String,
	connected: AtomicBool,
	delay: Option<Duration>,
	responses: Mutex<HashMap<String, ClientResult<Value>>>,
	calls: Mutex<Vec<(String, Vec<Value>)>>,
}

impl ScriptedRuntimeClient {
	pub fn new(endpoint: impl Into<String>) -> Self {
		Self {
			endpoint: endpoint.into(),
			connected: AtomicBool::new(true),
			delay: None,
			responses: Mutex::new(HashMap::new()),
			calls: Mutex::new(Vec::new()),
		}
	}

	/// Sleep before answering every call
	pub fn with_delay(mut self, delay: Duration) -> Self {
		self.delay = Some(delay);
		self
	}

	pub fn respond(self, key: impl Into<String>, response: ClientResult<Value>) -> Self {
		self.responses
			.lock()
			.unwrap()
			.insert(key.into(), response);
		self
	}

	pub fn disconnect(&self) {
		self.connected.store(false, Ordering::SeqCst);
	}

	/// Keys of the calls received so far, in order
	pub fn calls(&self) -> Vec<String> {
		self.calls.lock().unwrap().iter().map(|(key, _)| key.clone()).collect()
	}

	/// Hex payloads of the `state_call`s made to runtime API `api`
	pub fn payloads(&self, api: &str) -> Vec<String> {
		self.calls
			.lock()
			.unwrap()
			.iter()
			.filter(|(key, _)| key == api)
			.filter_map(|(_, params)| params.get(1).and_then(Value::as_str).map(str::to_string))
			.collect()
	}
}

#[async_trait]
impl RuntimeClient for ScriptedRuntimeClient {
	fn endpoint(&self) -> String {
		self.endpoint.clone()
	}

	fn is_connected(&self) -> bool {
		self.connected.load(Ordering::SeqCst)
	}

	async fn call(&self, method: &str, params: Vec<Value>) -> ClientResult<Value> {
		let key = match (method, params.first()) {
			("state_call", Some(Value::String(api))) => api.clone(),
			_ => method.to_string(),
		};
		self.calls.lock().unwrap().push((key.clone(), params.clone()));
		if let Some(delay) = self.delay {
			tokio::time::sleep(delay).await;
		}
		self.responses
			.lock()
			.unwrap()
			.get(&key)
			.cloned()
			.unwrap_or_else(|| {
				Err(ClientError::Request {
					method: key,
					reason: "method not found".to_string(),
				})
			})
	}
}

#[derive(Debug, Clone)]
enum ScriptedEndpoint {
	Live(Arc<ScriptedRuntimeClient>),
	Refused(String),
	Hang,
}

/// Connector that hands out scripted clients by URL
///
/// Unknown URLs are refused.
#[derive(Debug, Default)]
pub struct ScriptedConnector {
	endpoints: Mutex<HashMap<String, ScriptedEndpoint>>,
	attempts: Mutex<Vec<String>>,
	connects: AtomicUsize,
}

impl ScriptedConnector {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn live(self, url: impl Into<String>, client: Arc<ScriptedRuntimeClient>) -> Self {
		self.insert(url.into(), ScriptedEndpoint::Live(client))
	}

	pub fn refused(self, url: impl Into<String>, reason: impl Into<String>) -> Self {
		self.insert(url.into(), ScriptedEndpoint::Refused(reason.into()))
	}

	/// The handshake never completes
	pub fn hanging(self, url: impl Into<String>) -> Self {
		self.insert(url.into(), ScriptedEndpoint::Hang)
	}

	fn insert(self, url: String, endpoint: ScriptedEndpoint) -> Self {
		self.endpoints.lock().unwrap().insert(url, endpoint);
		self
	}

	/// URLs attempted so far, in order
	pub fn attempts(&self) -> Vec<String> {
		self.attempts.lock().unwrap().clone()
	}

	/// Number of successful connections
	pub fn connects(&self) -> usize {
		self.connects.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl ChainConnector for ScriptedConnector {
	async fn connect(&self, endpoint: &EndpointCandidate) -> ClientResult<Arc<dyn RuntimeClient>> {
		self.attempts.lock().unwrap().push(endpoint.url.clone());
		let scripted = self.endpoints.lock().unwrap().get(&endpoint.url).cloned();
		match scripted {
			Some(ScriptedEndpoint::Live(client)) => {
				self.connects.fetch_add(1, Ordering::SeqCst);
				Ok(client as Arc<dyn RuntimeClient>)
			},
			Some(ScriptedEndpoint::Hang) => std::future::pending().await,
			Some(ScriptedEndpoint::Refused(reason)) => Err(ClientError::Connection {
				endpoint: endpoint.url.clone(),
				reason,
			}),
			None => Err(ClientError::Connection {
				endpoint: endpoint.url.clone(),
				reason: "unknown endpoint".to_string(),
			}),
		}
	}
}

/// Registry source returning queued answers, repeating the last one
#[derive(Debug)]
pub struct StaticRegistrySource {
	name: String,
	answers: Mutex<VecDeque<SourceResult<Value>>>,
	fetches: AtomicUsize,
}

impl StaticRegistrySource {
	pub fn new(name: impl Into<String>, answers: Vec<SourceResult<Value>>) -> Self {
		Self {
			name: name.into(),
			answers: Mutex::new(answers.into()),
			fetches: AtomicUsize::new(0),
		}
	}

	pub fn document(name: impl Into<String>, document: Value) -> Self {
		Self::new(name, vec![Ok(document)])
	}

	pub fn fetches(&self) -> usize {
		self.fetches.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl RegistrySource for StaticRegistrySource {
	fn name(&self) -> &str {
		&self.name
	}

	async fn fetch(&self, reference: &str) -> SourceResult<Value> {
		self.fetches.fetch_add(1, Ordering::SeqCst);
		let mut answers = self.answers.lock().unwrap();
		let answer = if answers.len() > 1 {
			answers.pop_front()
		} else {
			answers.front().cloned()
		};
		answer.unwrap_or_else(|| {
			Err(SourceError::NotFound {
				reference: reference.to_string(),
			})
		})
	}
}
