//! Configuration mocks for tests

use paraxfer::config::*;

/// Configuration builders for tests
#[allow(dead_code)]
pub struct MockConfigs;

#[allow(dead_code)]
impl MockConfigs {
	/// Bundled registry only, short timeouts
	pub fn test_settings() -> Settings {
		Settings {
			registry: RegistrySettings {
				base_url: None,
				reference: "polkadot".to_string(),
				bundled_fallback: true,
				refresh_interval_secs: 60,
				cache_dir: None,
				cache_ttl_hours: 1,
				strict: true,
			},
			endpoints: EndpointSettings {
				connect_timeout_ms: 500,
				query_timeout_ms: 1000,
				resolution_timeout_ms: 2000,
				pool_ttl_secs: 60,
				priority: vec![
					"onfinality".to_string(),
					"dwellir".to_string(),
					"blastapi".to_string(),
				],
			},
			logging: LoggingSettings {
				level: "debug".to_string(),
				format: LogFormat::Compact,
				structured: false,
			},
			..Default::default()
		}
	}

	/// Registry served from `base_url`, optionally without the bundled fallback
	pub fn remote_settings(base_url: &str, bundled_fallback: bool) -> Settings {
		let mut settings = Self::test_settings();
		settings.registry.base_url = Some(base_url.to_string());
		settings.registry.bundled_fallback = bundled_fallback;
		settings
	}
}
