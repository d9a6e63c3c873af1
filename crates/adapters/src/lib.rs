//! paraxfer adapters
//!
//! Concrete clients behind the service traits: WebSocket runtime RPC with a
//! per-chain connection pool, the `XcmPaymentApi` runtime calls, registry
//! document sources and the display price feed.

pub mod connection_pool;
pub mod price_feed;
pub mod registry_source;
pub mod rpc_client;
pub mod xcm_payment;

#[cfg(test)]
mod test_server;

pub use connection_pool::{ConnectionPool, DEFAULT_CONNECT_TIMEOUT, DEFAULT_POOL_TTL};
pub use price_feed::{HttpPriceFeed, DEFAULT_PRICE_FEED_URL};
pub use registry_source::{
	BundledRegistrySource, CachedRegistrySource, FallbackRegistrySource, HttpRegistrySource,
	BUNDLED_REFERENCE,
};
pub use rpc_client::{WsConnector, WsRuntimeClient, RPC_TIMEOUT};
pub use xcm_payment::{PaymentQueryError, PaymentQueryResult, XcmPaymentApi, XcmPaymentApiError};
