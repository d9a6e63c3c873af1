//! paraxfer service
//!
//! Registry loading, endpoint ranking, pre-flight validation and fee
//! resolution for cross-chain transfers.

pub mod endpoint_selector;
pub mod fee_resolver;
pub mod registry_loader;
pub mod registry_service;
pub mod supersede;
pub mod transfer_plan;
pub mod validation;

pub use endpoint_selector::{is_websocket, select_endpoint, EndpointSelector, DEFAULT_PRIORITY};
pub use fee_resolver::{
	FeeResolution, FeeResolver, FeeResolverConfig, FeeResolverTrait, ResolutionState,
	DEFAULT_QUERY_TIMEOUT, DEFAULT_RESOLUTION_TIMEOUT,
};
pub use registry_loader::load_registry;
pub use registry_service::{RegistryService, RegistryServiceError, RegistryServiceResult};
pub use supersede::{RequestTicket, RequestTracker};
pub use transfer_plan::{TransferPlan, TransferPlanner};
pub use validation::{
	validate_token_fetch, validate_transfer, TokenFetchRequest, TokenFetchValidation,
	ValidatedTransfer,
};
