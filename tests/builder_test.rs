//! Tests for the builder wiring

mod mocks;

use mocks::{MockConfigs, MockEntities};
use paraxfer_types::test_utils::{sample_registry_document, StaticRegistrySource};
use paraxfer::{PlannerBuilder, RegistryServiceError, SourceError};
use std::sync::Arc;

#[tokio::test]
async fn test_builds_from_bundled_dataset() {
	let paraxfer = PlannerBuilder::new()
		.with_settings(MockConfigs::test_settings())
		.build()
		.await
		.unwrap();

	let registry = paraxfer.registry.registry().unwrap();
	assert_eq!(registry.len(), 6);
	assert!(registry.issues().is_empty());
	assert_eq!(
		registry.chain_by_evm_chain_id(1284).map(|chain| chain.slug.as_str()),
		Some("moonbeam")
	);
	assert!(paraxfer.price_feed.is_none());

	let snapshot = paraxfer.registry.store().current().unwrap();
	assert_eq!(snapshot.source, "cached(bundled)");
}

#[tokio::test]
async fn test_invalid_settings_rejected() {
	let mut settings = MockConfigs::test_settings();
	settings.fees.network_fee = "0.5".to_string();

	let result = PlannerBuilder::new().with_settings(settings).build().await;
	assert!(result.is_err());
}

#[tokio::test]
async fn test_unreachable_registry_falls_back_to_bundled() {
	let settings = MockConfigs::remote_settings("http://127.0.0.1:9/", true);
	let paraxfer = PlannerBuilder::new().with_settings(settings).build().await.unwrap();
	assert!(paraxfer.registry.registry().unwrap().chain("hydration").is_some());
}

#[tokio::test]
async fn test_unreachable_registry_without_fallback_fails() {
	let settings = MockConfigs::remote_settings("http://127.0.0.1:9/", false);
	let error = PlannerBuilder::new()
		.with_settings(settings)
		.build()
		.await
		.err()
		.unwrap();

	let error = error.downcast_ref::<RegistryServiceError>().unwrap();
	assert!(matches!(error, RegistryServiceError::Source(SourceError::Network { .. })));
}

#[tokio::test]
async fn test_custom_source_and_connector() {
	let (connector, _) = MockEntities::assethub_connector(1_000);
	let source = Arc::new(StaticRegistrySource::document("static", sample_registry_document()));

	let mut settings = MockConfigs::test_settings();
	settings.registry.strict = false;
	let paraxfer = PlannerBuilder::new()
		.with_settings(settings)
		.with_source(source.clone())
		.with_connector(connector.clone())
		.build()
		.await
		.unwrap();

	assert_eq!(source.fetches(), 1);
	assert_eq!(paraxfer.registry.registry().unwrap().len(), 2);
	// connections are opened lazily
	assert!(connector.attempts().is_empty());
}
