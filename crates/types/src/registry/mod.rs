//! Registry of chains and assets
//!
//! A [`Registry`] is an immutable snapshot: it is built once by the loader and
//! replaced wholesale on refresh. Data-quality defects found while building it
//! are kept alongside as [`RegistryIssue`]s instead of failing the load.

pub mod asset;
pub mod chain;
pub mod errors;

pub use asset::{Asset, AssetId, LocalAsset, ReserveType};
pub use chain::{Chain, Provider};
pub use errors::{RegistryError, RegistryResult};

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// What went wrong with one registry entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum IssueKind {
	/// `registeredChains` names a chain that is not in the registry; the link was dropped
	UnresolvedReference { reference: String },
	/// The counterpart chain has no record of the token listing this chain back
	MissingReciprocal { counterpart: String },
	/// The chain failed validation and was dropped
	InvalidChain { reason: String },
	/// A later chain reused an existing slug and was dropped
	DuplicateChain,
	/// The asset failed validation and was dropped from its chain
	InvalidAsset { reason: String },
}

/// A data-quality defect recorded while loading
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryIssue {
	pub chain: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub asset: Option<String>,
	#[serde(flatten)]
	pub kind: IssueKind,
}

impl RegistryIssue {
	pub fn chain(chain: impl Into<String>, kind: IssueKind) -> Self {
		Self {
			chain: chain.into(),
			asset: None,
			kind,
		}
	}

	pub fn asset(chain: impl Into<String>, asset: impl Into<String>, kind: IssueKind) -> Self {
		Self {
			chain: chain.into(),
			asset: Some(asset.into()),
			kind,
		}
	}
}

impl fmt::Display for RegistryIssue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let subject = match &self.asset {
			Some(asset) => format!("{}/{}", self.chain, asset),
			None => self.chain.clone(),
		};
		match &self.kind {
			IssueKind::UnresolvedReference { reference } => {
				write!(f, "{subject}: registered on unknown chain '{reference}'")
			},
			IssueKind::MissingReciprocal { counterpart } => {
				write!(f, "{subject}: '{counterpart}' does not register it back")
			},
			IssueKind::InvalidChain { reason } => write!(f, "{subject}: invalid chain ({reason})"),
			IssueKind::DuplicateChain => write!(f, "{subject}: duplicate slug"),
			IssueKind::InvalidAsset { reason } => write!(f, "{subject}: invalid asset ({reason})"),
		}
	}
}

/// Immutable snapshot of every known chain, keyed by slug
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Registry {
	chains: BTreeMap<String, Chain>,
	issues: Vec<RegistryIssue>,
}

impl Registry {
	/// Build a registry; fails when no chain survived validation
	pub fn new(chains: BTreeMap<String, Chain>, issues: Vec<RegistryIssue>) -> RegistryResult<Self> {
		if chains.is_empty() {
			return Err(RegistryError::EmptyRegistry);
		}
		Ok(Self { chains, issues })
	}

	pub fn len(&self) -> usize {
		self.chains.len()
	}

	pub fn is_empty(&self) -> bool {
		self.chains.is_empty()
	}

	pub fn chains(&self) -> impl Iterator<Item = &Chain> {
		self.chains.values()
	}

	pub fn slugs(&self) -> impl Iterator<Item = &str> {
		self.chains.keys().map(String::as_str)
	}

	pub fn issues(&self) -> &[RegistryIssue] {
		&self.issues
	}

	pub fn chain(&self, slug: &str) -> Option<&Chain> {
		self.chains.get(slug)
	}

	pub fn require_chain(&self, slug: &str) -> RegistryResult<&Chain> {
		self.chain(slug).ok_or_else(|| RegistryError::ChainNotFound {
			slug: slug.to_string(),
		})
	}

	pub fn chain_by_para_id(&self, para_id: u32) -> Option<&Chain> {
		self.chains().find(|chain| chain.para_id == Some(para_id))
	}

	pub fn chain_by_evm_chain_id(&self, evm_chain_id: u64) -> Option<&Chain> {
		self.chains()
			.find(|chain| chain.evm_chain_id == Some(evm_chain_id))
	}

	/// Every asset known on `slug`
	pub fn assets_of(&self, slug: &str) -> Vec<&Asset> {
		self.chain(slug)
			.map(|chain| chain.all_assets().collect())
			.unwrap_or_default()
	}

	pub fn find_asset(&self, slug: &str, symbol: &str) -> Option<&Asset> {
		self.chain(slug).and_then(|chain| chain.find_asset(symbol))
	}

	/// Chains reachable from `slug` through registrations or cross-chain asset lists
	pub fn destinations_from(&self, slug: &str) -> Vec<&Chain> {
		let Some(chain) = self.chain(slug) else {
			return Vec::new();
		};
		let mut keys: BTreeSet<&str> = chain.xc_assets_data.keys().map(String::as_str).collect();
		for asset in chain.all_assets() {
			keys.extend(asset.registered_chains.keys().map(String::as_str));
		}
		keys.into_iter()
			.filter(|key| *key != slug)
			.filter_map(|key| self.chain(key))
			.collect()
	}

	/// Assets on `from` that can be sent to `to`
	pub fn transferable_assets(&self, from: &str, to: &str) -> Vec<&Asset> {
		let Some(chain) = self.chain(from) else {
			return Vec::new();
		};
		let mut assets: Vec<&Asset> = Vec::new();
		let candidates = chain
			.all_assets()
			.filter(|asset| asset.is_registered_on(to))
			.chain(chain.xc_assets_data.get(to).into_iter().flatten());
		for asset in candidates {
			if !assets.iter().any(|known| known.same_token(asset)) {
				assets.push(asset);
			}
		}
		assets
	}

	/// Fail on the first recorded reference problem
	///
	/// Loading tolerates dangling and one-sided registrations; callers that need
	/// a fully linked registry use this to turn them into an error.
	pub fn ensure_consistent(&self) -> RegistryResult<()> {
		for issue in &self.issues {
			let reference = match &issue.kind {
				IssueKind::UnresolvedReference { reference } => reference,
				IssueKind::MissingReciprocal { counterpart } => counterpart,
				_ => continue,
			};
			return Err(RegistryError::UnresolvedReference {
				chain: issue.chain.clone(),
				asset: issue.asset.clone().unwrap_or_default(),
				reference: reference.clone(),
			});
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn registry() -> Registry {
		let dot = Asset::new("DOT", "DOT", 10);
		let mut polkadot = Chain::new("polkadot", "Polkadot", dot.clone());
		polkadot.native_token = dot
			.clone()
			.with_registration("assethub", Asset::new("DOT", "DOT", 10));

		let mut assethub = Chain::new("assethub", "Asset Hub", dot.clone());
		assethub.para_id = Some(1000);
		assethub.native_token = dot.with_registration("polkadot", Asset::new("DOT", "DOT", 10));
		assethub
			.xc_assets_data
			.insert("acala".to_string(), vec![Asset::new("ACA", "ACA", 12)]);

		let mut acala = Chain::new("acala", "Acala", Asset::new("ACA", "ACA", 12));
		acala.para_id = Some(2000);

		let chains = [polkadot, assethub, acala]
			.into_iter()
			.map(|chain| (chain.slug.clone(), chain))
			.collect();
		Registry::new(chains, Vec::new()).unwrap()
	}

	#[test]
	fn test_empty_registry_rejected() {
		assert_eq!(
			Registry::new(BTreeMap::new(), Vec::new()),
			Err(RegistryError::EmptyRegistry)
		);
	}

	#[test]
	fn test_lookups() {
		let registry = registry();
		assert_eq!(registry.len(), 3);
		assert_eq!(registry.chain_by_para_id(2000).unwrap().slug, "acala");
		assert!(registry.chain_by_para_id(9999).is_none());
		assert_eq!(registry.find_asset("assethub", "dot").unwrap().decimals, 10);
		assert_eq!(registry.assets_of("assethub").len(), 2);
		assert!(registry.assets_of("unknown").is_empty());
		assert!(matches!(
			registry.require_chain("kusama"),
			Err(RegistryError::ChainNotFound { .. })
		));
	}

	#[test]
	fn test_destinations_and_transferable_assets() {
		let registry = registry();
		let destinations: Vec<&str> = registry
			.destinations_from("assethub")
			.into_iter()
			.map(|chain| chain.slug.as_str())
			.collect();
		assert_eq!(destinations, vec!["acala", "polkadot"]);

		let to_polkadot = registry.transferable_assets("assethub", "polkadot");
		assert_eq!(to_polkadot.len(), 1);
		assert_eq!(to_polkadot[0].symbol, "DOT");

		let to_acala = registry.transferable_assets("assethub", "acala");
		assert_eq!(to_acala[0].symbol, "ACA");
	}

	#[test]
	fn test_ensure_consistent() {
		let registry = registry();
		assert!(registry.ensure_consistent().is_ok());

		let mut chains = BTreeMap::new();
		chains.insert(
			"polkadot".to_string(),
			Chain::new("polkadot", "Polkadot", Asset::new("DOT", "DOT", 10)),
		);
		let issues = vec![RegistryIssue::asset(
			"polkadot",
			"DOT",
			IssueKind::UnresolvedReference {
				reference: "ghost".to_string(),
			},
		)];
		let registry = Registry::new(chains, issues).unwrap();
		assert_eq!(
			registry.ensure_consistent(),
			Err(RegistryError::UnresolvedReference {
				chain: "polkadot".to_string(),
				asset: "DOT".to_string(),
				reference: "ghost".to_string()
			})
		);
		assert_eq!(
			registry.issues()[0].to_string(),
			"polkadot/DOT: registered on unknown chain 'ghost'"
		);
	}
}
