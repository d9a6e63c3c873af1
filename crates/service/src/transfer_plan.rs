//! Transfer planning
//!
//! A plan is everything a wallet needs to build the extrinsic: the encoded
//! destination and beneficiary and the fee to budget for. Nothing is signed or
//! submitted here.

use crate::fee_resolver::FeeResolverTrait;
use crate::registry_service::{RegistryService, RegistryServiceError};
use crate::validation::validate_transfer;
use paraxfer_types::xcm::{build_destination, LATEST_VERSION};
use paraxfer_types::{
	AccountNetwork, Amount, FeeError, FeeEstimate, FeeResult, Location, Registry, RegistryError,
	TransferRequest, VersionedLocation, XcmVersion,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferPlan {
	pub source: String,
	pub destination: String,
	pub asset: String,
	pub amount: Amount,
	/// SCALE-encoded versioned destination, `0x`-prefixed
	pub destination_location: String,
	/// SCALE-encoded versioned beneficiary relative to the destination
	pub beneficiary_location: String,
	pub recipient: String,
	pub fee: FeeEstimate,
}

/// Builds transfer plans against the current registry snapshot
#[derive(Clone)]
pub struct TransferPlanner {
	registry: RegistryService,
	resolver: Arc<dyn FeeResolverTrait>,
	beneficiary_network: AccountNetwork,
	version: XcmVersion,
}

impl TransferPlanner {
	pub fn new(registry: RegistryService, resolver: Arc<dyn FeeResolverTrait>) -> Self {
		Self {
			registry,
			resolver,
			beneficiary_network: AccountNetwork::Any,
			version: LATEST_VERSION,
		}
	}

	pub fn with_beneficiary_network(mut self, network: AccountNetwork) -> Self {
		self.beneficiary_network = network;
		self
	}

	pub fn with_version(mut self, version: XcmVersion) -> Self {
		self.version = version;
		self
	}

	pub fn registry_service(&self) -> &RegistryService {
		&self.registry
	}

	fn snapshot(&self) -> FeeResult<Arc<Registry>> {
		self.registry.registry().map_err(|e| match e {
			RegistryServiceError::Registry(e) => FeeError::Registry(e),
			// nothing loaded yet
			_ => FeeError::Registry(RegistryError::EmptyRegistry),
		})
	}

	/// Validate `request`, encode its locations and resolve the cross-chain fee
	pub async fn plan(&self, request: TransferRequest) -> FeeResult<TransferPlan> {
		let registry = self.snapshot()?;

		let (source, destination, asset, amount, destination_location, beneficiary_location) = {
			let transfer = validate_transfer(&registry, &request)?;
			let para_id = transfer.destination.para_id.ok_or_else(|| {
				FeeError::validation(format!("{} has no parachain id", transfer.destination.slug))
			})?;
			let account = transfer.recipient.to_junction(self.beneficiary_network.clone());
			let destination = build_destination(para_id, account.clone())?;
			let beneficiary = Location {
				parents: 0,
				interior: vec![account],
			};
			(
				transfer.source.slug.clone(),
				transfer.destination.slug.clone(),
				transfer.asset.symbol.clone(),
				transfer.amount,
				VersionedLocation::new(self.version, destination).to_hex()?,
				VersionedLocation::new(self.version, beneficiary).to_hex()?,
			)
		};
		debug!("Planned destination for {} -> {}: {}", source, destination, destination_location);

		let fee = self.resolver.resolve_fee(registry, request.clone()).await?;
		info!(
			"Planned {} {} from {} to {} with fee {} {}",
			amount,
			asset,
			source,
			destination,
			fee.formatted(),
			fee.asset.symbol
		);

		Ok(TransferPlan {
			source,
			destination,
			asset,
			amount: Amount::from(amount),
			destination_location,
			beneficiary_location,
			recipient: request.recipient_address,
			fee,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::fee_resolver::MockFeeResolverTrait;
	use paraxfer_types::test_utils::{
		sample_registry_document, StaticRegistrySource, EVM_RECIPIENT,
	};
	use paraxfer_types::{FeeAsset, FeeStatus, FeeType, Multiplier};

	fn estimate() -> FeeEstimate {
		FeeEstimate {
			amount: 1_500_000,
			base_amount: 1_000_000,
			fee_type: FeeType::CrossChainFee,
			multiplier: "1.5".parse::<Multiplier>().unwrap(),
			asset: FeeAsset {
				symbol: "USDt".to_string(),
				decimals: 6,
				location: None,
			},
			status: FeeStatus::Adjusted,
		}
	}

	async fn loaded_service() -> RegistryService {
		let source = Arc::new(StaticRegistrySource::document("static", sample_registry_document()));
		let service = RegistryService::new(source, "polkadot");
		service.load().await.unwrap();
		service
	}

	#[tokio::test]
	async fn test_plan_to_asset_hub() {
		let mut resolver = MockFeeResolverTrait::new();
		resolver
			.expect_resolve_fee()
			.times(1)
			.returning(|_, request| {
				assert_eq!(request.fee_type, FeeType::CrossChainFee);
				Ok(estimate())
			});

		let planner = TransferPlanner::new(loaded_service().await, Arc::new(resolver));
		let recipient = format!("0x{}", "d4".repeat(32));
		let plan = planner
			.plan(TransferRequest::new("polkadot", "DOT", recipient.clone(), 1000, 10_000_000_000u128))
			.await
			.unwrap();

		assert_eq!(plan.source, "polkadot");
		assert_eq!(plan.destination, "assethub");
		assert_eq!(plan.asset, "DOT");
		assert_eq!(plan.recipient, recipient);
		assert_eq!(plan.fee.amount, 1_500_000);
		// V3, parents 1, X2(Parachain(1000), AccountId32 { network: None, id })
		assert_eq!(
			plan.destination_location,
			format!("0x03010200a10f0100{}", "d4".repeat(32))
		);
		assert_eq!(plan.beneficiary_location, format!("0x0300010100{}", "d4".repeat(32)));
	}

	#[tokio::test]
	async fn test_invalid_request_never_reaches_resolver() {
		let mut resolver = MockFeeResolverTrait::new();
		resolver.expect_resolve_fee().times(0);

		let planner = TransferPlanner::new(loaded_service().await, Arc::new(resolver));
		let result = planner
			.plan(TransferRequest::new("polkadot", "DOT", EVM_RECIPIENT, 1000, 1u128))
			.await;
		assert!(matches!(result, Err(FeeError::ValidationFailed(_))));
	}

	#[tokio::test]
	async fn test_resolver_error_propagates() {
		let mut resolver = MockFeeResolverTrait::new();
		resolver
			.expect_resolve_fee()
			.returning(|_, _| Err(FeeError::runtime("XcmPaymentApi_query_xcm_weight", "boom")));

		let planner = TransferPlanner::new(loaded_service().await, Arc::new(resolver));
		let result = planner
			.plan(TransferRequest::new("polkadot", "DOT", format!("0x{}", "d4".repeat(32)), 1000, 1u128))
			.await;
		assert!(matches!(result, Err(FeeError::RuntimeQueryFailed { .. })));
	}

	#[tokio::test]
	async fn test_no_snapshot_yet() {
		let source = Arc::new(StaticRegistrySource::document("static", sample_registry_document()));
		let planner = TransferPlanner::new(
			RegistryService::new(source, "polkadot"),
			Arc::new(MockFeeResolverTrait::new()),
		);
		let result = planner
			.plan(TransferRequest::new("polkadot", "DOT", EVM_RECIPIENT, 1000, 1u128))
			.await;
		assert_eq!(result, Err(FeeError::Registry(RegistryError::EmptyRegistry)));
	}
}
