//! Configuration settings structures

use paraxfer_types::{AccountNetwork, FeeMultipliers, Multiplier, NetworkId, XcmVersion};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Main application settings
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Settings {
	pub registry: RegistrySettings,
	pub endpoints: EndpointSettings,
	pub fees: FeeSettings,
	pub xcm: XcmSettings,
	pub price_feed: PriceFeedSettings,
	pub logging: LoggingSettings,
}

/// Where the registry comes from and how often it is refreshed
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct RegistrySettings {
	/// Base URL of the published registry documents; `None` uses the bundled dataset only
	pub base_url: Option<String>,
	/// Dataset reference, e.g. `polkadot`
	pub reference: String,
	/// Fall back to the bundled dataset when the remote one is unavailable
	pub bundled_fallback: bool,
	pub refresh_interval_secs: u64,
	/// Directory for the on-disk document cache; `None` keeps documents in memory
	pub cache_dir: Option<String>,
	pub cache_ttl_hours: u64,
	/// Reject registries with unresolved or one-sided references
	pub strict: bool,
}

/// Endpoint selection and timeouts
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct EndpointSettings {
	/// Per-attempt connection timeout
	pub connect_timeout_ms: u64,
	/// Per-call runtime query timeout
	pub query_timeout_ms: u64,
	/// Overall budget for finding a live endpoint
	pub resolution_timeout_ms: u64,
	/// How long an idle pooled connection is kept
	pub pool_ttl_secs: u64,
	/// Provider keywords, most preferred first
	pub priority: Vec<String>,
}

/// Fee safety margins as decimal strings
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct FeeSettings {
	pub min_balance: String,
	pub payment_info: String,
	pub network_fee: String,
	pub cross_chain_fee: String,
}

/// XCM construction options
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct XcmSettings {
	/// Network on beneficiary account junctions: `any`, `polkadot`, `kusama`, ...
	pub beneficiary_network: String,
	/// Version used for encoded destinations: 0, 1 or 3
	pub destination_version: u8,
}

/// Display-only price lookups
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct PriceFeedSettings {
	pub enabled: bool,
	pub base_url: String,
	pub timeout_ms: u64,
}

/// Logging configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingSettings {
	pub level: String,
	pub format: LogFormat,
	pub structured: bool,
}

/// Log format options
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	Json,
	Pretty,
	Compact,
}

/// Settings that parse but make no sense
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
	#[error("Invalid value for {field}: {reason}")]
	InvalidValue { field: String, reason: String },

	#[error("Missing required value: {field}")]
	Missing { field: String },
}

impl ConfigValidationError {
	fn invalid(field: &str, reason: impl Into<String>) -> Self {
		Self::InvalidValue {
			field: field.to_string(),
			reason: reason.into(),
		}
	}
}

impl Default for RegistrySettings {
	fn default() -> Self {
		Self {
			base_url: None,
			reference: "polkadot".to_string(),
			bundled_fallback: true,
			refresh_interval_secs: 6 * 60 * 60,
			cache_dir: None,
			cache_ttl_hours: 24,
			strict: false,
		}
	}
}

impl Default for EndpointSettings {
	fn default() -> Self {
		Self {
			connect_timeout_ms: 5000,
			query_timeout_ms: 10000,
			resolution_timeout_ms: 30000,
			pool_ttl_secs: 1800,
			priority: vec![
				"onfinality".to_string(),
				"dwellir".to_string(),
				"blastapi".to_string(),
			],
		}
	}
}

impl Default for FeeSettings {
	fn default() -> Self {
		Self {
			min_balance: "1.1".to_string(),
			payment_info: "1.3".to_string(),
			network_fee: "1.2".to_string(),
			cross_chain_fee: "1.5".to_string(),
		}
	}
}

impl Default for XcmSettings {
	fn default() -> Self {
		Self {
			beneficiary_network: "any".to_string(),
			destination_version: 3,
		}
	}
}

impl Default for PriceFeedSettings {
	fn default() -> Self {
		Self {
			enabled: false,
			base_url: "https://api.coingecko.com/api/v3/simple/price".to_string(),
			timeout_ms: 5000,
		}
	}
}

impl Default for LoggingSettings {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
			format: LogFormat::Pretty,
			structured: false,
		}
	}
}

impl EndpointSettings {
	pub fn connect_timeout(&self) -> Duration {
		Duration::from_millis(self.connect_timeout_ms)
	}

	pub fn query_timeout(&self) -> Duration {
		Duration::from_millis(self.query_timeout_ms)
	}

	pub fn resolution_timeout(&self) -> Duration {
		Duration::from_millis(self.resolution_timeout_ms)
	}

	pub fn pool_ttl(&self) -> Duration {
		Duration::from_secs(self.pool_ttl_secs)
	}
}

impl FeeSettings {
	/// Parse the four margins
	pub fn multipliers(&self) -> Result<FeeMultipliers, ConfigValidationError> {
		Ok(FeeMultipliers {
			min_balance: parse_multiplier("fees.min_balance", &self.min_balance)?,
			payment_info: parse_multiplier("fees.payment_info", &self.payment_info)?,
			network_fee: parse_multiplier("fees.network_fee", &self.network_fee)?,
			cross_chain_fee: parse_multiplier("fees.cross_chain_fee", &self.cross_chain_fee)?,
		})
	}
}

fn parse_multiplier(field: &str, value: &str) -> Result<Multiplier, ConfigValidationError> {
	let multiplier: Multiplier = value
		.parse()
		.map_err(|e| ConfigValidationError::invalid(field, format!("{e}")))?;
	if multiplier.numerator() < multiplier.denominator() {
		return Err(ConfigValidationError::invalid(
			field,
			format!("multiplier {value} is below 1"),
		));
	}
	Ok(multiplier)
}

impl XcmSettings {
	pub fn beneficiary_network(&self) -> Result<AccountNetwork, ConfigValidationError> {
		let network = match self.beneficiary_network.to_ascii_lowercase().as_str() {
			"any" | "" => return Ok(AccountNetwork::Any),
			"polkadot" => NetworkId::Polkadot,
			"kusama" => NetworkId::Kusama,
			"westend" => NetworkId::Westend,
			"rococo" => NetworkId::Rococo,
			other => {
				return Err(ConfigValidationError::invalid(
					"xcm.beneficiary_network",
					format!("unknown network '{other}'"),
				))
			},
		};
		Ok(AccountNetwork::Named(network))
	}

	pub fn destination_version(&self) -> Result<XcmVersion, ConfigValidationError> {
		XcmVersion::from_tag(self.destination_version)
			.map_err(|e| ConfigValidationError::invalid("xcm.destination_version", e.to_string()))
	}
}

impl Settings {
	/// Check value ranges and parse derived values once
	pub fn validate(&self) -> Result<(), ConfigValidationError> {
		let endpoints = &self.endpoints;
		if !(100..=60_000).contains(&endpoints.connect_timeout_ms) {
			return Err(ConfigValidationError::invalid(
				"endpoints.connect_timeout_ms",
				"must be between 100 and 60000",
			));
		}
		if !(100..=120_000).contains(&endpoints.query_timeout_ms) {
			return Err(ConfigValidationError::invalid(
				"endpoints.query_timeout_ms",
				"must be between 100 and 120000",
			));
		}
		if endpoints.resolution_timeout_ms < endpoints.connect_timeout_ms {
			return Err(ConfigValidationError::invalid(
				"endpoints.resolution_timeout_ms",
				"must not be shorter than connect_timeout_ms",
			));
		}
		if endpoints.priority.iter().all(|keyword| keyword.trim().is_empty()) {
			return Err(ConfigValidationError::Missing {
				field: "endpoints.priority".to_string(),
			});
		}

		if self.registry.refresh_interval_secs == 0 {
			return Err(ConfigValidationError::invalid(
				"registry.refresh_interval_secs",
				"must be greater than zero",
			));
		}
		if self.registry.reference.trim().is_empty() {
			return Err(ConfigValidationError::Missing {
				field: "registry.reference".to_string(),
			});
		}
		if self.registry.base_url.is_none() && !self.registry.bundled_fallback {
			return Err(ConfigValidationError::invalid(
				"registry.bundled_fallback",
				"no registry source: set registry.base_url or enable the bundled fallback",
			));
		}

		self.fees.multipliers()?;
		self.xcm.beneficiary_network()?;
		self.xcm.destination_version()?;
		Ok(())
	}

	/// Lower-cased priority keywords, empty entries removed
	pub fn endpoint_priority(&self) -> Vec<String> {
		self.endpoints
			.priority
			.iter()
			.map(|keyword| keyword.trim().to_ascii_lowercase())
			.filter(|keyword| !keyword.is_empty())
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_settings_are_valid() {
		let settings = Settings::default();
		assert!(settings.validate().is_ok());
		assert_eq!(
			settings.fees.multipliers().unwrap(),
			FeeMultipliers::default()
		);
		assert_eq!(
			settings.endpoint_priority(),
			vec!["onfinality", "dwellir", "blastapi"]
		);
		assert_eq!(settings.xcm.beneficiary_network().unwrap(), AccountNetwork::Any);
	}

	#[test]
	fn test_multiplier_below_one_rejected() {
		let mut settings = Settings::default();
		settings.fees.network_fee = "0.9".to_string();
		assert!(matches!(
			settings.validate(),
			Err(ConfigValidationError::InvalidValue { field, .. }) if field == "fees.network_fee"
		));

		settings.fees.network_fee = "lots".to_string();
		assert!(settings.validate().is_err());
	}

	#[test]
	fn test_timeouts_checked() {
		let mut settings = Settings::default();
		settings.endpoints.connect_timeout_ms = 0;
		assert!(settings.validate().is_err());

		let mut settings = Settings::default();
		settings.endpoints.resolution_timeout_ms = 1000;
		assert!(settings.validate().is_err());
	}

	#[test]
	fn test_registry_source_required() {
		let mut settings = Settings::default();
		settings.registry.bundled_fallback = false;
		assert!(settings.validate().is_err());

		settings.registry.base_url = Some("https://registry.example.com".to_string());
		assert!(settings.validate().is_ok());
	}

	#[test]
	fn test_named_beneficiary_network() {
		let mut settings = Settings::default();
		settings.xcm.beneficiary_network = "Polkadot".to_string();
		assert_eq!(
			settings.xcm.beneficiary_network().unwrap(),
			AccountNetwork::Named(NetworkId::Polkadot)
		);

		settings.xcm.beneficiary_network = "mars".to_string();
		assert!(settings.validate().is_err());

		settings.xcm.beneficiary_network = "any".to_string();
		settings.xcm.destination_version = 2;
		assert!(settings.validate().is_err());
	}

	#[test]
	fn test_partial_json_uses_defaults() {
		let settings: Settings = serde_json::from_value(serde_json::json!({
			"endpoints": {"connect_timeout_ms": 2500},
			"logging": {"format": "json"}
		}))
		.unwrap();
		assert_eq!(settings.endpoints.connect_timeout_ms, 2500);
		assert_eq!(settings.endpoints.query_timeout_ms, 10000);
		assert_eq!(settings.logging.format, LogFormat::Json);
		assert_eq!(settings.registry.reference, "polkadot");
	}
}
