//! Error types for fee resolution

use crate::endpoints::EndpointError;
use crate::registry::RegistryError;
use crate::xcm::CodecError;
use thiserror::Error;

/// Invalid multiplier configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MultiplierError {
	#[error("Invalid multiplier '{value}': {reason}")]
	Invalid { value: String, reason: String },

	#[error("Multiplier denominator cannot be zero")]
	ZeroDenominator,
}

/// Fee resolution errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeeError {
	#[error("Validation failed: {0}")]
	ValidationFailed(String),

	#[error("Endpoint error: {0}")]
	Endpoint(#[from] EndpointError),

	#[error("Codec error: {0}")]
	Codec(#[from] CodecError),

	#[error("Runtime query {method} failed: {reason}")]
	RuntimeQueryFailed { method: String, reason: String },

	#[error("Runtime query {method} timed out after {timeout_ms}ms")]
	QueryTimeout { method: String, timeout_ms: u64 },

	#[error("Fee adjustment degraded: {reason}")]
	AdjustmentDegraded { reason: String },

	#[error("Registry error: {0}")]
	Registry(#[from] RegistryError),
}

impl FeeError {
	pub fn validation(reason: impl Into<String>) -> Self {
		Self::ValidationFailed(reason.into())
	}

	pub fn runtime(method: impl Into<String>, reason: impl Into<String>) -> Self {
		Self::RuntimeQueryFailed {
			method: method.into(),
			reason: reason.into(),
		}
	}

	/// Short label used for the failed state of a resolution
	pub fn kind(&self) -> &'static str {
		match self {
			FeeError::ValidationFailed(_) => "validation",
			FeeError::Endpoint(_) => "endpoint",
			FeeError::Codec(_) => "codec",
			FeeError::RuntimeQueryFailed { .. } => "runtime_query",
			FeeError::QueryTimeout { .. } => "query_timeout",
			FeeError::AdjustmentDegraded { .. } => "adjustment",
			FeeError::Registry(_) => "registry",
		}
	}
}

pub type FeeResult<T> = Result<T, FeeError>;
