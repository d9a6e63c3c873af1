//! Assets as known on one chain

use crate::xcm::{Location, VersionedLocation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Chain-local asset identifier
///
/// Registries use plain integers (`1984`), strings (`"DOT"`) or nested
/// descriptors (`{"ForeignAsset": "0"}`) depending on the pallet holding the asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetId {
	Numeric(u128),
	Textual(String),
	Composite(BTreeMap<String, Value>),
}

impl AssetId {
	/// Identity comparison across representations
	///
	/// A numeric id and a decimal string naming the same number match; composite
	/// ids only match structurally equal composites.
	pub fn matches(&self, other: &AssetId) -> bool {
		match (self, other) {
			(AssetId::Numeric(a), AssetId::Numeric(b)) => a == b,
			(AssetId::Textual(a), AssetId::Textual(b)) => a.eq_ignore_ascii_case(b),
			(AssetId::Numeric(n), AssetId::Textual(text))
			| (AssetId::Textual(text), AssetId::Numeric(n)) => {
				text.parse::<u128>().map(|parsed| parsed == *n).unwrap_or(false)
			},
			(AssetId::Composite(a), AssetId::Composite(b)) => a == b,
			(AssetId::Composite(_), _) | (_, AssetId::Composite(_)) => false,
		}
	}

	pub fn as_numeric(&self) -> Option<u128> {
		match self {
			AssetId::Numeric(id) => Some(*id),
			AssetId::Textual(text) => text.parse().ok(),
			AssetId::Composite(_) => None,
		}
	}
}

impl fmt::Display for AssetId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			AssetId::Numeric(id) => write!(f, "{id}"),
			AssetId::Textual(text) => write!(f, "{text}"),
			AssetId::Composite(map) => {
				let rendered = serde_json::to_string(map).map_err(|_| fmt::Error)?;
				write!(f, "{rendered}")
			},
		}
	}
}

impl From<u128> for AssetId {
	fn from(value: u128) -> Self {
		AssetId::Numeric(value)
	}
}

impl From<&str> for AssetId {
	fn from(value: &str) -> Self {
		AssetId::Textual(value.to_string())
	}
}

impl Serialize for AssetId {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		match self {
			AssetId::Numeric(id) => match u64::try_from(*id) {
				Ok(small) => serializer.serialize_u64(small),
				Err(_) => serializer.serialize_str(&id.to_string()),
			},
			AssetId::Textual(text) => serializer.serialize_str(text),
			AssetId::Composite(map) => map.serialize(serializer),
		}
	}
}

impl<'de> Deserialize<'de> for AssetId {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		let value = Value::deserialize(deserializer)?;
		AssetId::try_from(value).map_err(serde::de::Error::custom)
	}
}

impl TryFrom<Value> for AssetId {
	type Error = String;

	fn try_from(value: Value) -> Result<Self, Self::Error> {
		match value {
			Value::Number(number) => number.as_u64().map(|id| AssetId::Numeric(id as u128)).ok_or_else(|| {
				format!("asset id {number} must be a non-negative integer; use a string for large ids")
			}),
			Value::String(text) => Ok(AssetId::Textual(text)),
			Value::Object(map) => Ok(AssetId::Composite(map.into_iter().collect())),
			other => Err(format!("unsupported asset id {other}")),
		}
	}
}

/// Where an asset's reserve lives relative to the chain holding the record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReserveType {
	/// Issued on this chain
	#[default]
	Local,
	/// Reserved elsewhere, recognised here
	Foreign,
	/// Neither issued nor reserved here
	Remote,
}

impl std::str::FromStr for ReserveType {
	type Err = String;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		match value.to_ascii_lowercase().as_str() {
			"local" => Ok(ReserveType::Local),
			"foreign" => Ok(ReserveType::Foreign),
			"remote" => Ok(ReserveType::Remote),
			other => Err(format!("unknown reserve type '{other}'")),
		}
	}
}

/// A fungible token as registered on one chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
	pub asset_id: AssetId,
	pub symbol: String,
	pub decimals: u8,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub xcm_location: Option<VersionedLocation>,
	#[serde(default)]
	pub reserve_type: ReserveType,
	/// Records of the same logical token on other chains, keyed by chain slug
	#[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
	pub registered_chains: BTreeMap<String, Asset>,
}

impl Asset {
	pub fn new(asset_id: impl Into<AssetId>, symbol: impl Into<String>, decimals: u8) -> Self {
		Self {
			asset_id: asset_id.into(),
			symbol: symbol.into(),
			decimals,
			xcm_location: None,
			reserve_type: ReserveType::Local,
			registered_chains: BTreeMap::new(),
		}
	}

	pub fn with_location(mut self, location: VersionedLocation) -> Self {
		self.xcm_location = Some(location);
		self
	}

	pub fn with_reserve_type(mut self, reserve_type: ReserveType) -> Self {
		self.reserve_type = reserve_type;
		self
	}

	pub fn with_registration(mut self, chain: impl Into<String>, asset: Asset) -> Self {
		self.registered_chains.insert(chain.into(), asset);
		self
	}

	pub fn location(&self) -> Option<&Location> {
		self.xcm_location.as_ref().map(|versioned| &versioned.location)
	}

	pub fn is_registered_on(&self, chain: &str) -> bool {
		self.registered_chains.contains_key(chain)
	}

	/// Whether `other` describes the same logical token
	///
	/// Ids are compared first; records whose ids differ in kind fall back to the
	/// symbol, since chains often key the same token differently.
	pub fn same_token(&self, other: &Asset) -> bool {
		self.asset_id.matches(&other.asset_id) || self.symbol.eq_ignore_ascii_case(&other.symbol)
	}
}

/// An asset held by an on-chain assets pallet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalAsset {
	pub id: u128,
	#[serde(flatten)]
	pub asset: Asset,
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_asset_id_variants() {
		let numeric: AssetId = serde_json::from_value(json!(1984)).unwrap();
		let textual: AssetId = serde_json::from_value(json!("USDT")).unwrap();
		let composite: AssetId = serde_json::from_value(json!({"ForeignAsset": "0"})).unwrap();

		assert_eq!(numeric, AssetId::Numeric(1984));
		assert_eq!(textual, AssetId::Textual("USDT".to_string()));
		assert!(matches!(composite, AssetId::Composite(_)));

		assert!(serde_json::from_value::<AssetId>(json!(1.5)).is_err());
		assert!(serde_json::from_value::<AssetId>(json!(-7)).is_err());
		assert!(serde_json::from_value::<AssetId>(json!(null)).is_err());
	}

	#[test]
	fn test_asset_id_matching() {
		assert!(AssetId::Numeric(1984).matches(&AssetId::Textual("1984".to_string())));
		assert!(AssetId::Textual("dot".to_string()).matches(&AssetId::Textual("DOT".to_string())));
		assert!(!AssetId::Numeric(1).matches(&AssetId::Numeric(2)));

		let composite = AssetId::Composite(
			[("Token".to_string(), json!("ACA"))].into_iter().collect(),
		);
		assert!(composite.matches(&composite.clone()));
		assert!(!composite.matches(&AssetId::Textual("ACA".to_string())));
	}

	#[test]
	fn test_large_numeric_id_serializes_as_string() {
		let id = AssetId::Numeric(u128::MAX);
		let value = serde_json::to_value(&id).unwrap();
		assert_eq!(value, json!(u128::MAX.to_string()));
		assert_eq!(AssetId::try_from(value).unwrap().as_numeric(), Some(u128::MAX));
	}

	#[test]
	fn test_reserve_type_parsing() {
		assert_eq!("Foreign".parse::<ReserveType>().unwrap(), ReserveType::Foreign);
		assert!("bridged".parse::<ReserveType>().is_err());
	}

	#[test]
	fn test_local_asset_flattened() {
		let local: LocalAsset = serde_json::from_value(json!({
			"id": 1984,
			"assetId": 1984,
			"symbol": "USDt",
			"decimals": 6,
			"reserveType": "local"
		}))
		.unwrap();
		assert_eq!(local.id, 1984);
		assert_eq!(local.asset.symbol, "USDt");
	}
}
