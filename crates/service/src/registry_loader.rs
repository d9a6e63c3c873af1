//! Raw registry documents to [`Registry`] snapshots
//!
//! Two document shapes are accepted: a combined `{"chains": [..]}` where each
//! chain embeds its assets, and a split form with a sibling
//! `"assets": {"<slug>": {nativeToken, localAssets, xcAssetsData}}` map. A bare
//! chain array is treated like the combined form.
//!
//! Only structural problems fail a load. Defects in single chains or assets
//! are recorded as [`RegistryIssue`]s and the offending entry is dropped.

use paraxfer_types::registry::{IssueKind, RegistryIssue};
use paraxfer_types::{
	Amount, Asset, Chain, LocalAsset, Provider, Registry, RegistryError, RegistryResult,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

const NATIVE_TOKEN: &str = "nativeToken";
const LOCAL_ASSETS: &str = "localAssets";
const XC_ASSETS_DATA: &str = "xcAssetsData";
const ASSET_FIELDS: [&str; 3] = [NATIVE_TOKEN, LOCAL_ASSETS, XC_ASSETS_DATA];

/// Chain fields other than its assets
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChainHeader {
	#[serde(default)]
	slug: String,
	#[serde(default)]
	name: String,
	#[serde(default)]
	address_prefix: u16,
	#[serde(default)]
	is_evm: bool,
	#[serde(default)]
	evm_chain_id: Option<u64>,
	#[serde(default)]
	para_id: Option<u32>,
	#[serde(default)]
	relay: Option<String>,
	#[serde(default, deserialize_with = "paraxfer_types::registry::chain::deserialize_providers")]
	providers: Vec<Provider>,
	#[serde(default = "Amount::zero")]
	existential_deposit: Amount,
}

/// Build a registry from a raw document
pub fn load_registry(document: &Value) -> RegistryResult<Registry> {
	let (chains, assets) = split_document(document)?;
	let mut issues = Vec::new();
	let mut registry: BTreeMap<String, Chain> = BTreeMap::new();

	for (index, raw) in chains.iter().enumerate() {
		let Some(object) = raw.as_object() else {
			issues.push(RegistryIssue::chain(
				format!("#{index}"),
				IssueKind::InvalidChain {
					reason: "chain entry must be an object".to_string(),
				},
			));
			continue;
		};

		let label = object
			.get("slug")
			.and_then(Value::as_str)
			.filter(|slug| !slug.trim().is_empty())
			.map(str::to_string)
			.unwrap_or_else(|| format!("#{index}"));
		let embedded = assets.and_then(|assets| assets.get(&label)).and_then(Value::as_object);

		let chain = match parse_chain(object, embedded, &label, &mut issues) {
			Ok(chain) => chain,
			Err(reason) => {
				issues.push(RegistryIssue::chain(&label, IssueKind::InvalidChain { reason }));
				continue;
			},
		};

		if registry.contains_key(&chain.slug) {
			issues.push(RegistryIssue::chain(&chain.slug, IssueKind::DuplicateChain));
			continue;
		}
		registry.insert(chain.slug.clone(), chain);
	}

	resolve_references(&mut registry, &mut issues);
	check_reciprocals(&registry, &mut issues);

	for issue in &issues {
		warn!("Registry issue: {}", issue);
	}
	debug!("Loaded {} chains with {} issues", registry.len(), issues.len());
	Registry::new(registry, issues)
}

fn split_document(document: &Value) -> RegistryResult<(&Vec<Value>, Option<&Map<String, Value>>)> {
	let malformed = |reason: &str| RegistryError::MalformedSource {
		reason: reason.to_string(),
	};

	match document {
		Value::Array(chains) => Ok((chains, None)),
		Value::Object(root) => {
			let chains = root
				.get("chains")
				.ok_or_else(|| malformed("missing top-level 'chains'"))?
				.as_array()
				.ok_or_else(|| malformed("'chains' must be an array"))?;
			let assets = match root.get("assets") {
				None | Some(Value::Null) => None,
				Some(Value::Object(assets)) => Some(assets),
				Some(_) => return Err(malformed("'assets' must be an object keyed by chain slug")),
			};
			Ok((chains, assets))
		},
		_ => Err(malformed("registry document must be an object or an array of chains")),
	}
}

fn parse_chain(
	object: &Map<String, Value>,
	embedded: Option<&Map<String, Value>>,
	label: &str,
	issues: &mut Vec<RegistryIssue>,
) -> Result<Chain, String> {
	// Fields inside the chain entry win over the split assets map
	let field = |name: &str| object.get(name).or_else(|| embedded.and_then(|assets| assets.get(name)));

	let mut header_fields = object.clone();
	for name in ASSET_FIELDS {
		header_fields.remove(name);
	}
	let header: ChainHeader =
		serde_json::from_value(Value::Object(header_fields)).map_err(|e| e.to_string())?;

	let native_token = match field(NATIVE_TOKEN) {
		Some(raw) => parse_native_token(raw, label, issues)?,
		None => return Err("missing nativeToken".to_string()),
	};

	let mut chain = Chain {
		slug: header.slug,
		name: header.name,
		address_prefix: header.address_prefix,
		is_evm: header.is_evm,
		evm_chain_id: header.evm_chain_id,
		para_id: header.para_id,
		relay: header.relay,
		providers: header.providers,
		native_token,
		local_assets: Vec::new(),
		xc_assets_data: BTreeMap::new(),
		existential_deposit: header.existential_deposit,
	};

	if !chain.is_evm && chain.evm_chain_id.is_some() {
		issues.push(RegistryIssue::chain(
			label,
			IssueKind::InvalidChain {
				reason: "evmChainId on a non-EVM chain was dropped".to_string(),
			},
		));
		chain.evm_chain_id = None;
	}
	chain.validate()?;

	match field(LOCAL_ASSETS) {
		None | Some(Value::Null) => {},
		Some(Value::Array(entries)) => {
			for (index, raw) in entries.iter().enumerate() {
				match serde_json::from_value::<LocalAsset>(raw.clone()) {
					Ok(local) => chain.local_assets.push(local),
					Err(e) => issues.push(asset_issue(label, raw, index, e.to_string())),
				}
			}
		},
		Some(_) => return Err("localAssets must be an array".to_string()),
	}

	match field(XC_ASSETS_DATA) {
		None | Some(Value::Null) => {},
		Some(Value::Object(groups)) => {
			for (counterpart, entries) in groups {
				let Some(entries) = entries.as_array() else {
					issues.push(RegistryIssue::chain(
						label,
						IssueKind::InvalidAsset {
							reason: format!("xcAssetsData.{counterpart} must be an array"),
						},
					));
					continue;
				};
				let parsed = entries
					.iter()
					.enumerate()
					.filter_map(|(index, raw)| match serde_json::from_value::<Asset>(raw.clone()) {
						Ok(asset) => Some(asset),
						Err(e) => {
							issues.push(asset_issue(label, raw, index, e.to_string()));
							None
						},
					})
					.collect();
				chain.xc_assets_data.insert(counterpart.clone(), parsed);
			}
		},
		Some(_) => return Err("xcAssetsData must be an object".to_string()),
	}

	Ok(chain)
}

/// The native token cannot be dropped; a bad location is stripped instead
fn parse_native_token(
	raw: &Value,
	label: &str,
	issues: &mut Vec<RegistryIssue>,
) -> Result<Asset, String> {
	match serde_json::from_value::<Asset>(raw.clone()) {
		Ok(asset) => Ok(asset),
		Err(e) => {
			let mut stripped = raw.clone();
			let had_location = stripped
				.as_object_mut()
				.map(|object| object.remove("xcmLocation").is_some())
				.unwrap_or(false);
			if !had_location {
				return Err(format!("invalid nativeToken: {e}"));
			}
			let asset = serde_json::from_value::<Asset>(stripped)
				.map_err(|e| format!("invalid nativeToken: {e}"))?;
			issues.push(RegistryIssue::asset(
				label,
				&asset.symbol,
				IssueKind::InvalidAsset {
					reason: format!("xcmLocation dropped: {e}"),
				},
			));
			Ok(asset)
		},
	}
}

fn asset_issue(chain: &str, raw: &Value, index: usize, reason: String) -> RegistryIssue {
	let name = raw
		.get("symbol")
		.and_then(Value::as_str)
		.map(str::to_string)
		.unwrap_or_else(|| format!("#{index}"));
	RegistryIssue::asset(chain, name, IssueKind::InvalidAsset { reason })
}

fn assets_mut(chain: &mut Chain) -> impl Iterator<Item = &mut Asset> {
	std::iter::once(&mut chain.native_token)
		.chain(chain.local_assets.iter_mut().map(|local| &mut local.asset))
		.chain(chain.xc_assets_data.values_mut().flatten())
}

/// Drop registrations and asset groups that point at unknown chains
fn resolve_references(registry: &mut BTreeMap<String, Chain>, issues: &mut Vec<RegistryIssue>) {
	let known: BTreeSet<String> = registry.keys().cloned().collect();

	for (slug, chain) in registry.iter_mut() {
		let dangling: Vec<String> = chain
			.xc_assets_data
			.keys()
			.filter(|key| !known.contains(*key))
			.cloned()
			.collect();
		for key in dangling {
			chain.xc_assets_data.remove(&key);
			issues.push(RegistryIssue::chain(
				slug,
				IssueKind::UnresolvedReference { reference: key },
			));
		}

		for asset in assets_mut(chain) {
			let dangling: Vec<String> = asset
				.registered_chains
				.keys()
				.filter(|key| !known.contains(*key))
				.cloned()
				.collect();
			for key in dangling {
				asset.registered_chains.remove(&key);
				issues.push(RegistryIssue::asset(
					slug,
					&asset.symbol,
					IssueKind::UnresolvedReference { reference: key },
				));
			}
		}
	}
}

/// Flag registrations the counterpart chain does not mirror
fn check_reciprocals(registry: &BTreeMap<String, Chain>, issues: &mut Vec<RegistryIssue>) {
	for (slug, chain) in registry {
		for asset in chain.all_assets() {
			for (counterpart, record) in &asset.registered_chains {
				let Some(other) = registry.get(counterpart) else {
					continue;
				};
				let mirrored = other
					.all_assets()
					.any(|candidate| candidate.same_token(record) && candidate.is_registered_on(slug));
				if !mirrored {
					issues.push(RegistryIssue::asset(
						slug,
						&asset.symbol,
						IssueKind::MissingReciprocal {
							counterpart: counterpart.clone(),
						},
					));
				}
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use paraxfer_types::test_utils::{sample_registry, sample_registry_document};
	use paraxfer_types::{AssetId, Location};
	use serde_json::json;

	fn chain(slug: &str) -> Value {
		json!({
			"slug": slug,
			"name": slug,
			"nativeToken": {"assetId": "X", "symbol": "X", "decimals": 12}
		})
	}

	#[test]
	fn test_split_document() {
		let registry = load_registry(&sample_registry_document()).unwrap();
		assert_eq!(registry.len(), 2);
		assert!(registry.issues().is_empty());

		let assethub = registry.chain("assethub").unwrap();
		assert_eq!(assethub.para_id, Some(1000));
		assert_eq!(assethub.local_assets[0].id, 1984);
		assert_eq!(
			assethub.native_token.xcm_location.as_ref().unwrap().location,
			Location::parent()
		);
		assert_eq!(
			registry.chain("polkadot").unwrap().providers[0].label.as_deref(),
			Some("Parity")
		);
	}

	#[test]
	fn test_combined_document_matches_model() {
		let document = json!({"chains": serde_json::to_value(sample_registry().chains().collect::<Vec<_>>()).unwrap()});
		let registry = load_registry(&document).unwrap();
		assert_eq!(registry, sample_registry());
	}

	#[test]
	fn test_malformed_shapes() {
		for document in [json!("chains"), json!({"chain": []}), json!({"chains": {}}), json!({"chains": [], "assets": []})] {
			assert!(matches!(
				load_registry(&document),
				Err(RegistryError::MalformedSource { .. })
			));
		}
		assert_eq!(load_registry(&json!({"chains": []})), Err(RegistryError::EmptyRegistry));
	}

	#[test]
	fn test_invalid_chains_are_dropped() {
		let mut negative = chain("negative");
		negative["addressPrefix"] = json!(-1);
		let mut float = chain("float");
		float["paraId"] = json!(2000.5);
		let mut evm = chain("evm");
		evm["isEvm"] = json!(true);
		let mut deposit = chain("deposit");
		deposit["existentialDeposit"] = json!("1e10");

		let document = json!({"chains": [
			chain("good"),
			chain(""),
			negative,
			float,
			evm,
			deposit,
			chain("good"),
			42,
		]});
		let registry = load_registry(&document).unwrap();
		assert_eq!(registry.slugs().collect::<Vec<_>>(), vec!["good"]);

		let kinds: Vec<&IssueKind> = registry.issues().iter().map(|issue| &issue.kind).collect();
		assert_eq!(
			kinds.iter().filter(|kind| matches!(kind, IssueKind::InvalidChain { .. })).count(),
			6
		);
		assert!(kinds.contains(&&IssueKind::DuplicateChain));
	}

	#[test]
	fn test_evm_chain_id_on_substrate_chain_is_dropped() {
		let mut substrate = chain("acala");
		substrate["evmChainId"] = json!(787);
		let registry = load_registry(&json!([substrate])).unwrap();
		assert_eq!(registry.chain("acala").unwrap().evm_chain_id, None);
		assert_eq!(registry.issues().len(), 1);
	}

	#[test]
	fn test_undecodable_asset_is_dropped_with_issue() {
		let mut polkadot = chain("polkadot");
		polkadot["localAssets"] = json!([
			{"id": 1, "assetId": 1, "symbol": "GOOD", "decimals": 6,
			 "xcmLocation": {"v3": {"parents": 0, "interior": {"x1": {"generalIndex": 1}}}}},
			{"id": 2, "assetId": 2, "symbol": "BAD", "decimals": 6,
			 "xcmLocation": {"v2": {"parents": 0, "interior": "here"}}},
			{"id": 3, "assetId": 3.5, "symbol": "FLOAT", "decimals": 6}
		]);
		polkadot["nativeToken"]["xcmLocation"] = json!({"v3": {"parents": 0, "interior": {"x1": {"teleporter": 1}}}});

		let registry = load_registry(&json!({"chains": [polkadot]})).unwrap();
		let chain = registry.chain("polkadot").unwrap();
		assert_eq!(chain.local_assets.len(), 1);
		assert_eq!(chain.local_assets[0].asset.symbol, "GOOD");
		assert!(chain.native_token.xcm_location.is_none());

		let assets: BTreeSet<&str> = registry
			.issues()
			.iter()
			.filter(|issue| matches!(issue.kind, IssueKind::InvalidAsset { .. }))
			.filter_map(|issue| issue.asset.as_deref())
			.collect();
		assert_eq!(assets, BTreeSet::from(["BAD", "FLOAT", "X"]));
	}

	#[test]
	fn test_unresolved_reference_dropped() {
		let mut polkadot = chain("polkadot");
		polkadot["nativeToken"]["registeredChains"] = json!({
			"ghost": {"assetId": "X", "symbol": "X", "decimals": 12}
		});
		polkadot["xcAssetsData"] = json!({"phantom": [{"assetId": 1, "symbol": "P", "decimals": 6}]});

		let registry = load_registry(&json!([polkadot])).unwrap();
		let chain = registry.chain("polkadot").unwrap();
		assert!(chain.native_token.registered_chains.is_empty());
		assert!(chain.xc_assets_data.is_empty());
		assert!(registry.issues().iter().any(|issue| issue.kind
			== IssueKind::UnresolvedReference {
				reference: "ghost".to_string()
			}));
		assert!(registry.ensure_consistent().is_err());
	}

	#[test]
	fn test_missing_reciprocal_flagged_but_kept() {
		let mut polkadot = chain("polkadot");
		polkadot["nativeToken"]["registeredChains"] = json!({
			"assethub": {"assetId": "X", "symbol": "X", "decimals": 12}
		});
		let registry = load_registry(&json!([polkadot, chain("assethub")])).unwrap();

		assert!(registry
			.chain("polkadot")
			.unwrap()
			.native_token
			.is_registered_on("assethub"));
		assert_eq!(
			registry.issues(),
			&[RegistryIssue::asset(
				"polkadot",
				"X",
				IssueKind::MissingReciprocal {
					counterpart: "assethub".to_string()
				}
			)]
		);
		assert_eq!(
			registry.ensure_consistent(),
			Err(RegistryError::UnresolvedReference {
				chain: "polkadot".to_string(),
				asset: "X".to_string(),
				reference: "assethub".to_string()
			})
		);
	}

	#[test]
	fn test_loading_is_idempotent() {
		let document = sample_registry_document();
		let first = load_registry(&document).unwrap();
		let second = load_registry(&document).unwrap();
		assert_eq!(first, second);

		// Re-serializing a loaded registry and loading it again changes nothing
		let again = json!({"chains": serde_json::to_value(first.chains().collect::<Vec<_>>()).unwrap()});
		assert_eq!(load_registry(&again).unwrap(), first);
	}

	#[test]
	fn test_large_ids_as_strings() {
		let mut moonbeam = chain("moonbeam");
		moonbeam["nativeToken"]["assetId"] = json!("340282366920938463463374607431768211455");
		moonbeam["localAssets"] = json!([{
			"id": -5,
			"assetId": 1,
			"symbol": "NEG",
			"decimals": 18
		}]);

		let registry = load_registry(&json!([moonbeam])).unwrap();
		let chain = registry.chain("moonbeam").unwrap();
		assert_eq!(chain.native_token.asset_id.as_numeric(), Some(u128::MAX));
		assert!(matches!(chain.native_token.asset_id, AssetId::Textual(_)));
		assert!(chain.local_assets.is_empty());
		assert_eq!(registry.issues().len(), 1);
	}
}
