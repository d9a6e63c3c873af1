//! Chain descriptors

use super::asset::{Asset, LocalAsset};
use crate::models::{AccountKind, Amount};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// One RPC endpoint published for a chain
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Provider {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub label: Option<String>,
	pub url: String,
}

impl Provider {
	pub fn new(url: impl Into<String>) -> Self {
		Self {
			label: None,
			url: url.into(),
		}
	}

	pub fn labelled(label: impl Into<String>, url: impl Into<String>) -> Self {
		Self {
			label: Some(label.into()),
			url: url.into(),
		}
	}
}

/// Provider lists come either as URLs or as `{label: url}` maps
#[derive(Deserialize)]
#[serde(untagged)]
enum ProvidersRepr {
	List(Vec<ProviderRepr>),
	Map(BTreeMap<String, String>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ProviderRepr {
	Url(String),
	Full(Provider),
}

pub fn deserialize_providers<'de, D>(deserializer: D) -> Result<Vec<Provider>, D::Error>
where
	D: Deserializer<'de>,
{
	let providers = match ProvidersRepr::deserialize(deserializer)? {
		ProvidersRepr::List(entries) => entries
			.into_iter()
			.map(|entry| match entry {
				ProviderRepr::Url(url) => Provider::new(url),
				ProviderRepr::Full(provider) => provider,
			})
			.collect(),
		ProvidersRepr::Map(entries) => entries
			.into_iter()
			.map(|(label, url)| Provider::labelled(label, url))
			.collect(),
	};
	Ok(providers)
}

/// A relay chain or parachain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chain {
	pub slug: String,
	pub name: String,
	#[serde(default)]
	pub address_prefix: u16,
	#[serde(default)]
	pub is_evm: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub evm_chain_id: Option<u64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub para_id: Option<u32>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub relay: Option<String>,
	#[serde(default, deserialize_with = "deserialize_providers")]
	pub providers: Vec<Provider>,
	pub native_token: Asset,
	#[serde(default)]
	pub local_assets: Vec<LocalAsset>,
	/// Assets registered from each counterparty chain, keyed by chain slug
	#[serde(default)]
	pub xc_assets_data: BTreeMap<String, Vec<Asset>>,
	#[serde(default = "Amount::zero")]
	pub existential_deposit: Amount,
}

impl Chain {
	pub fn new(slug: impl Into<String>, name: impl Into<String>, native_token: Asset) -> Self {
		Self {
			slug: slug.into(),
			name: name.into(),
			address_prefix: 42,
			is_evm: false,
			evm_chain_id: None,
			para_id: None,
			relay: None,
			providers: Vec::new(),
			native_token,
			local_assets: Vec::new(),
			xc_assets_data: BTreeMap::new(),
			existential_deposit: Amount::zero(),
		}
	}

	/// Check the invariants a chain must hold to enter a registry
	pub fn validate(&self) -> Result<(), String> {
		if self.slug.trim().is_empty() {
			return Err("chain slug cannot be empty".to_string());
		}
		if self.is_evm && self.evm_chain_id.is_none() {
			return Err(format!(
				"EVM chain '{}' is missing evmChainId",
				self.slug
			));
		}
		if !self.is_evm && self.evm_chain_id.is_some() {
			return Err(format!(
				"non-EVM chain '{}' declares evmChainId",
				self.slug
			));
		}
		self.existential_deposit
			.validate()
			.map_err(|e| format!("invalid existentialDeposit on '{}': {e}", self.slug))
	}

	pub fn account_kind(&self) -> AccountKind {
		AccountKind::for_chain(self.is_evm)
	}

	/// Native token, local assets and cross-chain assets, in that order
	pub fn all_assets(&self) -> impl Iterator<Item = &Asset> {
		std::iter::once(&self.native_token)
			.chain(self.local_assets.iter().map(|local| &local.asset))
			.chain(self.xc_assets_data.values().flatten())
	}

	pub fn find_asset(&self, symbol: &str) -> Option<&Asset> {
		self.all_assets()
			.find(|asset| asset.symbol.eq_ignore_ascii_case(symbol))
	}

	pub fn provider_urls(&self) -> Vec<&str> {
		self.providers.iter().map(|p| p.url.as_str()).collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn native() -> serde_json::Value {
		json!({"assetId": "DOT", "symbol": "DOT", "decimals": 10})
	}

	#[test]
	fn test_providers_accept_list_and_map() {
		let from_list: Chain = serde_json::from_value(json!({
			"slug": "polkadot",
			"name": "Polkadot",
			"providers": ["wss://rpc.polkadot.io", {"label": "Dwellir", "url": "wss://polkadot-rpc.dwellir.com"}],
			"nativeToken": native()
		}))
		.unwrap();
		assert_eq!(from_list.providers.len(), 2);
		assert_eq!(from_list.providers[1].label.as_deref(), Some("Dwellir"));

		let from_map: Chain = serde_json::from_value(json!({
			"slug": "polkadot",
			"name": "Polkadot",
			"providers": {"OnFinality": "wss://polkadot.api.onfinality.io/public-ws"},
			"nativeToken": native()
		}))
		.unwrap();
		assert_eq!(
			from_map.providers,
			vec![Provider::labelled(
				"OnFinality",
				"wss://polkadot.api.onfinality.io/public-ws"
			)]
		);
	}

	#[test]
	fn test_validate_evm_invariant() {
		let mut chain = Chain::new("moonbeam", "Moonbeam", Asset::new("GLMR", "GLMR", 18));
		chain.is_evm = true;
		assert!(chain.validate().is_err());

		chain.evm_chain_id = Some(1284);
		assert!(chain.validate().is_ok());
		assert_eq!(chain.account_kind(), AccountKind::Key20);
	}

	#[test]
	fn test_validate_empty_slug() {
		let chain = Chain::new("  ", "Nameless", Asset::new("X", "X", 12));
		assert!(chain.validate().is_err());
	}

	#[test]
	fn test_find_asset_across_groups() {
		let mut chain = Chain::new("assethub", "Asset Hub", Asset::new("DOT", "DOT", 10));
		chain.local_assets.push(LocalAsset {
			id: 1984,
			asset: Asset::new(1984u128, "USDt", 6),
		});
		chain
			.xc_assets_data
			.insert("acala".to_string(), vec![Asset::new("ACA", "ACA", 12)]);

		assert_eq!(chain.find_asset("usdt").unwrap().decimals, 6);
		assert_eq!(chain.find_asset("ACA").unwrap().decimals, 12);
		assert_eq!(chain.all_assets().count(), 3);
		assert!(chain.find_asset("GLMR").is_none());
	}
}
