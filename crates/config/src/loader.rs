//! Configuration loading utilities

use crate::settings::ConfigValidationError;
use crate::Settings;
use config::{Config, ConfigError, Environment, File};
use thiserror::Error;

/// Prefix of environment overrides, e.g. `PARAXFER__ENDPOINTS__CONNECT_TIMEOUT_MS`
pub const ENV_PREFIX: &str = "PARAXFER";

#[derive(Error, Debug)]
pub enum ConfigLoadError {
	#[error("Failed to load configuration: {0}")]
	Config(#[from] ConfigError),

	#[error("Invalid configuration: {0}")]
	Validation(#[from] ConfigValidationError),
}

/// Load `config/config.*` (optional) with environment overrides, then validate
pub fn load_config() -> Result<Settings, ConfigLoadError> {
	load_config_from("config/config")
}

/// Same as [`load_config`] with an explicit file stem
pub fn load_config_from(path: &str) -> Result<Settings, ConfigLoadError> {
	let s = Config::builder()
		.add_source(File::with_name(path).required(false))
		.add_source(
			Environment::with_prefix(ENV_PREFIX)
				.prefix_separator("__")
				.separator("__")
				.list_separator(",")
				.with_list_parse_key("endpoints.priority")
				.try_parsing(true),
		)
		.build()?;

	let settings: Settings = s.try_deserialize()?;
	settings.validate()?;
	Ok(settings)
}

#[cfg(test)]
mod tests {
	use super::*;
	use config::FileFormat;

	#[test]
	fn test_missing_file_uses_defaults() {
		let settings = load_config_from("config/does-not-exist").unwrap();
		assert_eq!(settings.endpoints.connect_timeout_ms, 5000);
		assert_eq!(settings.fees.cross_chain_fee, "1.5");
	}

	#[test]
	fn test_toml_overrides() {
		let toml = r#"
			[endpoints]
			connect_timeout_ms = 2000
			priority = ["dwellir", "onfinality"]

			[fees]
			network_fee = "1.25"
		"#;
		let settings: Settings = Config::builder()
			.add_source(File::from_str(toml, FileFormat::Toml))
			.build()
			.unwrap()
			.try_deserialize()
			.unwrap();
		assert!(settings.validate().is_ok());
		assert_eq!(settings.endpoints.connect_timeout_ms, 2000);
		assert_eq!(settings.endpoint_priority(), vec!["dwellir", "onfinality"]);
		assert_eq!(
			settings.fees.multipliers().unwrap().network_fee.to_string(),
			"5/4"
		);
		assert_eq!(settings.registry.reference, "polkadot");
	}
}
