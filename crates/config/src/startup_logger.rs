//! Service startup logging for paraxfer

use crate::Settings;
use std::env;
use tracing::{info, warn};

/// Logs service information at startup
pub fn log_service_info() {
	let service_name = "paraxfer";
	let service_version = env!("CARGO_PKG_VERSION");

	info!("=== paraxfer Starting ===");
	info!("🚀 Service: {} v{}", service_name, service_version);

	info!("💻 Platform: {}", env::consts::OS);
	info!("🏗️ Architecture: {}", env::consts::ARCH);

	if let Ok(cwd) = env::current_dir() {
		info!("📁 Working Directory: {}", cwd.display());
	}

	if let Ok(rust_log) = env::var("RUST_LOG") {
		info!("🔧 Log Level: {}", rust_log);
	}

	info!(
		"🕒 Started at: {}",
		chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
	);
}

/// Logs the effective registry and endpoint settings
pub fn log_startup_complete(settings: &Settings) {
	info!("✅ paraxfer initialized");
	match &settings.registry.base_url {
		Some(url) => info!(
			"📚 Registry: {}/{} (bundled fallback: {})",
			url, settings.registry.reference, settings.registry.bundled_fallback
		),
		None => info!("📚 Registry: bundled dataset '{}'", settings.registry.reference),
	}
	info!(
		"🔌 Endpoints: connect {}ms, query {}ms, priority [{}]",
		settings.endpoints.connect_timeout_ms,
		settings.endpoints.query_timeout_ms,
		settings.endpoint_priority().join(", ")
	);
	info!(
		"💸 Fee margins: minBalance {}, paymentInfo {}, networkFee {}, crossChainFee {}",
		settings.fees.min_balance,
		settings.fees.payment_info,
		settings.fees.network_fee,
		settings.fees.cross_chain_fee
	);
}

/// Logs what a registry load produced
pub fn log_registry_summary(chains: usize, assets: usize, issues: &[String]) {
	info!("🔗 Registry loaded: {} chains, {} assets", chains, assets);
	if !issues.is_empty() {
		warn!("⚠️ Registry has {} data issue(s)", issues.len());
		for issue in issues {
			warn!("   {}", issue);
		}
	}
}

/// Logs service shutdown information
pub fn log_service_shutdown() {
	info!("🛑 paraxfer Shutting Down");
	info!(
		"🕒 Shutdown at: {}",
		chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
	);
}
