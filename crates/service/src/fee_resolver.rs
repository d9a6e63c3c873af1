//! Fee resolution pipeline
//!
//! A resolution validates the request, connects to the source chain, asks its
//! runtime what the transfer program costs and applies the fee type's safety
//! margin. Each call walks
//! `Idle -> Validating -> Connecting -> Querying -> Adjusting -> Done`, or ends
//! in `Failed(kind)` from one of the first three working states.
//!
//! Resolutions are independent of each other and only read the registry.

use crate::endpoint_selector::EndpointSelector;
use crate::validation::{validate_transfer, ValidatedTransfer};
use async_trait::async_trait;
use paraxfer_adapters::{ConnectionPool, PaymentQueryError, XcmPaymentApi, XcmPaymentApiError};
use paraxfer_types::xcm::{build_destination, encode_destination, Xcm, LATEST_VERSION};
use paraxfer_types::{
	AccountNetwork, ClientError, CodecError, FeeAsset, FeeError, FeeEstimate, FeeMultipliers,
	FeeResult, FeeStatus, FeeType, Location, Registry, RuntimeClient, TransferRequest,
	VersionedLocation, XcmVersion,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default bound for each runtime call
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Default bound for obtaining a connection
pub const DEFAULT_RESOLUTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Where a resolution is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionState {
	Idle,
	Validating,
	Connecting,
	Querying,
	Adjusting,
	Done,
	/// Carries [`FeeError::kind`]
	Failed(&'static str),
}

impl ResolutionState {
	pub fn is_terminal(self) -> bool {
		matches!(self, ResolutionState::Done | ResolutionState::Failed(_))
	}

	pub fn can_advance_to(self, next: ResolutionState) -> bool {
		use ResolutionState::*;
		matches!(
			(self, next),
			(Idle, Validating)
				| (Validating, Connecting)
				| (Connecting, Querying)
				| (Querying, Adjusting)
				| (Adjusting, Done)
				| (Validating, Failed(_))
				| (Connecting, Failed(_))
				| (Querying, Failed(_))
		)
	}
}

/// States visited by one resolution
#[derive(Debug)]
struct Transitions {
	states: Vec<ResolutionState>,
}

impl Transitions {
	fn new() -> Self {
		Self {
			states: vec![ResolutionState::Idle],
		}
	}

	fn current(&self) -> ResolutionState {
		self.states.last().copied().unwrap_or(ResolutionState::Idle)
	}

	fn advance(&mut self, next: ResolutionState) {
		let current = self.current();
		if !current.can_advance_to(next) {
			warn!("Unexpected fee resolution transition {:?} -> {:?}", current, next);
		}
		debug!("Fee resolution {:?} -> {:?}", current, next);
		self.states.push(next);
	}
}

/// Outcome of a resolution together with the states it went through
#[derive(Debug, Clone)]
pub struct FeeResolution {
	pub outcome: FeeResult<FeeEstimate>,
	pub states: Vec<ResolutionState>,
}

/// Tunables for [`FeeResolver`]
#[derive(Debug, Clone)]
pub struct FeeResolverConfig {
	pub multipliers: FeeMultipliers,
	/// Network recorded in beneficiary account junctions
	pub beneficiary_network: AccountNetwork,
	/// Version the destination location must be expressible in
	pub destination_version: XcmVersion,
	pub query_timeout: Duration,
	/// Deadline for getting a live connection
	pub resolution_timeout: Duration,
}

impl Default for FeeResolverConfig {
	fn default() -> Self {
		Self {
			multipliers: FeeMultipliers::default(),
			beneficiary_network: AccountNetwork::Any,
			destination_version: LATEST_VERSION,
			query_timeout: DEFAULT_QUERY_TIMEOUT,
			resolution_timeout: DEFAULT_RESOLUTION_TIMEOUT,
		}
	}
}

/// Trait for fee resolution
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeeResolverTrait: Send + Sync {
	/// Estimate the fee for `request` against `registry`
	async fn resolve_fee(
		&self,
		registry: Arc<Registry>,
		request: TransferRequest,
	) -> FeeResult<FeeEstimate>;

	/// Existential deposit of `chain` with the `minBalance` margin applied
	fn min_balance(&self, registry: &Registry, chain: &str) -> FeeResult<FeeEstimate>;
}

/// Resolves fees by querying source chain runtimes
#[derive(Debug, Clone)]
pub struct FeeResolver {
	pool: ConnectionPool,
	selector: EndpointSelector,
	config: FeeResolverConfig,
}

impl FeeResolver {
	pub fn new(pool: ConnectionPool, selector: EndpointSelector, config: FeeResolverConfig) -> Self {
		Self {
			pool,
			selector,
			config,
		}
	}

	pub fn config(&self) -> &FeeResolverConfig {
		&self.config
	}

	/// Resolve a fee
	pub async fn resolve(&self, registry: &Registry, request: &TransferRequest) -> FeeResult<FeeEstimate> {
		self.resolve_traced(registry, request).await.outcome
	}

	/// Resolve a fee and report the states visited
	pub async fn resolve_traced(&self, registry: &Registry, request: &TransferRequest) -> FeeResolution {
		let mut transitions = Transitions::new();
		let outcome = self.run(registry, request, &mut transitions).await;
		match &outcome {
			Ok(estimate) => {
				transitions.advance(ResolutionState::Done);
				info!(
					"Resolved {} for {} from {}: {} {}",
					estimate.fee_type,
					request.asset,
					request.source_chain,
					estimate.formatted(),
					estimate.asset.symbol
				);
			},
			Err(e) => {
				transitions.advance(ResolutionState::Failed(e.kind()));
				warn!(
					"Fee resolution for {} from {} failed: {}",
					request.asset, request.source_chain, e
				);
			},
		}
		FeeResolution {
			outcome,
			states: transitions.states,
		}
	}

	async fn run(
		&self,
		registry: &Registry,
		request: &TransferRequest,
		transitions: &mut Transitions,
	) -> FeeResult<FeeEstimate> {
		transitions.advance(ResolutionState::Validating);
		let transfer = validate_transfer(registry, request)?;

		transitions.advance(ResolutionState::Connecting);
		let candidates = self.selector.rank(&transfer.source.providers);
		debug!(
			"Connecting to {} through {} candidate(s)",
			transfer.source.slug,
			candidates.len()
		);
		let client = self
			.pool
			.get(&transfer.source.slug, &candidates, self.config.resolution_timeout)
			.await?;

		transitions.advance(ResolutionState::Querying);
		let (fee_asset, base_amount) = match self.query_base_fee(&transfer, client.clone()).await {
			Ok(result) => result,
			Err(e) => {
				if matches!(e, FeeError::QueryTimeout { .. }) {
					self.pool.evict(&transfer.source.slug, &client).await;
				}
				return Err(e);
			},
		};

		transitions.advance(ResolutionState::Adjusting);
		Ok(self.adjust(request.fee_type, base_amount, fee_asset))
	}

	async fn query_base_fee(
		&self,
		transfer: &ValidatedTransfer<'_>,
		client: Arc<dyn RuntimeClient>,
	) -> FeeResult<(FeeAsset, u128)> {
		let para_id = transfer.destination.para_id.ok_or_else(|| {
			FeeError::validation(format!("{} has no parachain id", transfer.destination.slug))
		})?;
		let account = transfer.recipient.to_junction(self.config.beneficiary_network.clone());
		let destination = build_destination(para_id, account)?;
		let encoded = encode_destination(&destination, self.config.destination_version)?;
		debug!(
			"Pricing transfer to {} (0x{})",
			transfer.destination.slug,
			hex::encode(&encoded)
		);

		let api = XcmPaymentApi::new(client);
		let fee_asset = self.fee_asset(&api, transfer).await?;
		let fee_location = fee_asset
			.location
			.as_ref()
			.map(|versioned| versioned.location.clone())
			.unwrap_or_else(Location::here);

		let message = Xcm::reserve_transfer(
			transfer.asset_location.clone(),
			transfer.amount,
			transfer.source.para_id,
			&destination,
		)?;
		let chain = transfer.source.slug.as_str();
		let weight = self
			.timed(
				chain,
				&api,
				paraxfer_adapters::xcm_payment::QUERY_XCM_WEIGHT,
				api.query_xcm_weight(&message),
			)
			.await?;
		debug!("Transfer weight on {}: {:?}", transfer.source.slug, weight);

		let base = self
			.timed(
				chain,
				&api,
				paraxfer_adapters::xcm_payment::QUERY_WEIGHT_TO_ASSET_FEE,
				api.query_weight_to_asset_fee(weight, &fee_location),
			)
			.await?;
		Ok((fee_asset, base))
	}

	/// Pay in the transferred asset when the runtime accepts it, else in the native token
	async fn fee_asset(&self, api: &XcmPaymentApi, transfer: &ValidatedTransfer<'_>) -> FeeResult<FeeAsset> {
		let method = paraxfer_adapters::xcm_payment::QUERY_ACCEPTABLE_PAYMENT_ASSETS;
		let accepted = match tokio::time::timeout(
			self.config.query_timeout,
			api.acceptable_payment_assets(u32::from(XcmVersion::V3.tag())),
		)
		.await
		{
			Ok(Ok(accepted)) => accepted,
			Ok(Err(e)) if pays_in_native(&e) => {
				debug!("{} on {}: {}; paying in native token", method, transfer.source.slug, e);
				Vec::new()
			},
			Ok(Err(e)) => return Err(self.query_failed(&transfer.source.slug, api, method, e).await),
			Err(_) => return Err(self.timeout_error(method)),
		};

		if accepted.iter().any(|location| location == transfer.asset_location) {
			return Ok(FeeAsset {
				symbol: transfer.asset.symbol.clone(),
				decimals: transfer.asset.decimals,
				location: transfer.asset.xcm_location.clone(),
			});
		}

		let native = &transfer.source.native_token;
		Ok(FeeAsset {
			symbol: native.symbol.clone(),
			decimals: native.decimals,
			location: Some(VersionedLocation::new(XcmVersion::V3, Location::here())),
		})
	}

	/// Bound a runtime call by the query timeout
	async fn timed<T, F>(&self, chain: &str, api: &XcmPaymentApi, method: &str, call: F) -> FeeResult<T>
	where
		F: Future<Output = Result<T, PaymentQueryError>>,
	{
		match tokio::time::timeout(self.config.query_timeout, call).await {
			Ok(Ok(value)) => Ok(value),
			Ok(Err(e)) => Err(self.query_failed(chain, api, method, e).await),
			Err(_) => Err(self.timeout_error(method)),
		}
	}

	/// A dropped transport also invalidates the pooled connection
	async fn query_failed(
		&self,
		chain: &str,
		api: &XcmPaymentApi,
		method: &str,
		error: PaymentQueryError,
	) -> FeeError {
		if matches!(error, PaymentQueryError::Client(ClientError::Transport { .. })) {
			self.pool.evict(chain, api.client()).await;
		}
		FeeError::runtime(method, error.to_string())
	}

	fn timeout_error(&self, method: &str) -> FeeError {
		warn!("{} timed out after {:?}", method, self.config.query_timeout);
		FeeError::QueryTimeout {
			method: method.to_string(),
			timeout_ms: self.config.query_timeout.as_millis() as u64,
		}
	}

	/// Apply the margin, falling back to the base amount if it cannot be applied
	fn adjust(&self, fee_type: FeeType, base_amount: u128, asset: FeeAsset) -> FeeEstimate {
		let multiplier = self.config.multipliers.get(fee_type);
		let (amount, status) = match multiplier.apply(base_amount) {
			Ok(amount) => (amount, FeeStatus::Adjusted),
			Err(e) => {
				warn!(
					"Could not apply {} multiplier {} to {}: {}. Using the unadjusted fee.",
					fee_type, multiplier, base_amount, e
				);
				(
					base_amount,
					FeeStatus::Degraded {
						reason: e.to_string(),
					},
				)
			},
		};
		FeeEstimate {
			amount,
			base_amount,
			fee_type,
			multiplier,
			asset,
			status,
		}
	}
}

/// Answers meaning the runtime cannot tell us which assets it accepts
fn pays_in_native(error: &PaymentQueryError) -> bool {
	matches!(
		error,
		PaymentQueryError::Client(ClientError::Request { .. })
			| PaymentQueryError::Api {
				error: XcmPaymentApiError::Unimplemented | XcmPaymentApiError::UnhandledXcmVersion,
				..
			} | PaymentQueryError::Codec(CodecError::UnsupportedVersion { .. })
	)
}

#[async_trait]
impl FeeResolverTrait for FeeResolver {
	async fn resolve_fee(
		&self,
		registry: Arc<Registry>,
		request: TransferRequest,
	) -> FeeResult<FeeEstimate> {
		self.resolve(&registry, &request).await
	}

	fn min_balance(&self, registry: &Registry, chain: &str) -> FeeResult<FeeEstimate> {
		let chain = registry.require_chain(chain)?;
		let deposit = chain
			.existential_deposit
			.as_u128()
			.map_err(|e| FeeError::validation(e.to_string()))?;
		let native = &chain.native_token;
		let asset = FeeAsset {
			symbol: native.symbol.clone(),
			decimals: native.decimals,
			location: native.xcm_location.clone(),
		};
		Ok(self.adjust(FeeType::MinBalance, deposit, asset))
	}
}
