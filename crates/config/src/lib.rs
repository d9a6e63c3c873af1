//! paraxfer configuration
//!
//! Settings, loading and startup logging for the paraxfer engine.

pub mod loader;
pub mod settings;
pub mod startup_logger;

pub use loader::{load_config, load_config_from, ConfigLoadError, ENV_PREFIX};
pub use settings::{
	ConfigValidationError, EndpointSettings, FeeSettings, LogFormat, LoggingSettings,
	PriceFeedSettings, RegistrySettings, Settings, XcmSettings,
};
pub use startup_logger::{
	log_registry_summary, log_service_info, log_service_shutdown, log_startup_complete,
};
