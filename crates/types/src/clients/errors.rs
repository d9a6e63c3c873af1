//! Errors raised by external clients

use thiserror::Error;

/// Runtime RPC client errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
	#[error("Failed to connect to {endpoint}: {reason}")]
	Connection { endpoint: String, reason: String },

	#[error("Request {method} rejected: {reason}")]
	Request { method: String, reason: String },

	#[error("Transport error: {reason}")]
	Transport { reason: String },

	#[error("Invalid response to {method}: {reason}")]
	InvalidResponse { method: String, reason: String },
}

impl ClientError {
	pub fn invalid_response(method: impl Into<String>, reason: impl Into<String>) -> Self {
		Self::InvalidResponse {
			method: method.into(),
			reason: reason.into(),
		}
	}
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Registry document source errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
	#[error("Registry document '{reference}' not found")]
	NotFound { reference: String },

	#[error("Network error: {reason}")]
	Network { reason: String },

	#[error("Invalid registry document: {reason}")]
	InvalidDocument { reason: String },
}

impl SourceError {
	/// Whether a fallback source should be consulted
	pub fn is_recoverable(&self) -> bool {
		matches!(self, SourceError::NotFound { .. } | SourceError::Network { .. })
	}
}

pub type SourceResult<T> = Result<T, SourceError>;

/// Price feed errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceFeedError {
	#[error("Price feed returned {status}: {message}")]
	Http { status: u16, message: String },

	#[error("Price feed network error: {reason}")]
	Network { reason: String },

	#[error("Invalid price feed response: {reason}")]
	InvalidResponse { reason: String },
}

pub type PriceFeedResult<T> = Result<T, PriceFeedError>;
