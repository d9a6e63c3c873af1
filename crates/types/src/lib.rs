//! paraxfer types
//!
//! Shared models and traits for the paraxfer cross-chain transfer engine: the
//! chain/asset registry model, the versioned XCM location codec, fee estimates
//! and the client seams implemented by the adapters crate.

pub mod clients;
pub mod endpoints;
pub mod fees;
pub mod models;
pub mod registry;
pub mod storage;
pub mod xcm;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export chrono and serde_json for convenience
pub use chrono;
pub use serde_json;

pub use clients::{
	ChainConnector, ClientError, ClientResult, PriceFeed, PriceFeedError, PriceFeedResult,
	RegistrySource, RuntimeClient, SourceError, SourceResult, TokenPrice,
};

pub use endpoints::{EndpointCandidate, EndpointError, EndpointResult};

pub use fees::{
	FeeAsset, FeeError, FeeEstimate, FeeMultipliers, FeeResult, FeeStatus, FeeType, Multiplier,
	MultiplierError, TransferRequest,
};

pub use models::{AccountError, AccountKind, Amount, AmountError, Recipient};

pub use registry::{
	Asset, AssetId, Chain, IssueKind, LocalAsset, Provider, Registry, RegistryError,
	RegistryIssue, RegistryResult, ReserveType,
};

pub use storage::{CacheStats, CachedDocument, DocumentCache, StorageError, StorageResult};

pub use xcm::{
	AccountNetwork, CodecError, CodecResult, Junction, Location, NetworkId, VersionedLocation,
	XcmVersion,
};
