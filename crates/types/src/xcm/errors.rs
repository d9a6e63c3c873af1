//! Error types for XCM location encoding and decoding

use thiserror::Error;

/// Errors raised by the versioned location codec
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
	#[error("Unsupported XCM version: {version}")]
	UnsupportedVersion { version: u8 },

	#[error("Unknown junction for XCM V{version}: {junction}")]
	UnknownJunction { version: u8, junction: String },

	#[error("Invalid junction order: {reason}")]
	InvalidJunctionOrder { reason: String },

	#[error("{item} cannot be represented in XCM V{version}")]
	NotRepresentable { version: u8, item: String },

	#[error("Malformed location: {reason}")]
	Malformed { reason: String },
}

impl CodecError {
	pub(crate) fn malformed(reason: impl Into<String>) -> Self {
		Self::Malformed {
			reason: reason.into(),
		}
	}

	pub(crate) fn not_representable(version: u8, item: impl Into<String>) -> Self {
		Self::NotRepresentable {
			version,
			item: item.into(),
		}
	}
}

pub type CodecResult<T> = Result<T, CodecError>;
