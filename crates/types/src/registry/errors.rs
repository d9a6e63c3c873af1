//! Error types for registry loading and lookups

use thiserror::Error;

/// Structural registry failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
	#[error("Malformed registry source: {reason}")]
	MalformedSource { reason: String },

	#[error("Registry contains no valid chains")]
	EmptyRegistry,

	#[error("Unresolved reference: asset {asset} on {chain} refers to {reference}")]
	UnresolvedReference {
		chain: String,
		asset: String,
		reference: String,
	},

	#[error("Chain not found: {slug}")]
	ChainNotFound { slug: String },
}

pub type RegistryResult<T> = Result<T, RegistryError>;
