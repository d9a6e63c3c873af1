//! External client seams: runtime RPC, registry sources and price feeds

pub mod errors;
pub mod traits;

pub use errors::{
	ClientError, ClientResult, PriceFeedError, PriceFeedResult, SourceError, SourceResult,
};
pub use traits::{ChainConnector, PriceFeed, RegistrySource, RuntimeClient, TokenPrice};
