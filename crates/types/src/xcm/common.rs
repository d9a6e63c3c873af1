//! Canonical location model shared by every XCM version
//!
//! Business logic only ever sees these types. The per-version modules convert
//! to and from their wire shapes at the boundary.

use super::{CodecError, CodecResult};
use std::fmt;

/// Maximum number of interior junctions a location can carry
pub const MAX_JUNCTIONS: usize = 8;

/// Maximum length of a `GeneralKey` payload
pub const MAX_GENERAL_KEY_LEN: usize = 32;

/// Supported wire versions for versioned locations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum XcmVersion {
	V0,
	V1,
	V3,
}

impl XcmVersion {
	/// Leading tag byte used by the versioned SCALE encoding
	pub fn tag(self) -> u8 {
		match self {
			XcmVersion::V0 => 0,
			XcmVersion::V1 => 1,
			XcmVersion::V3 => 3,
		}
	}

	pub fn from_tag(tag: u8) -> CodecResult<Self> {
		match tag {
			0 => Ok(XcmVersion::V0),
			1 => Ok(XcmVersion::V1),
			3 => Ok(XcmVersion::V3),
			version => Err(CodecError::UnsupportedVersion { version }),
		}
	}
}

impl fmt::Display for XcmVersion {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "V{}", self.tag())
	}
}

/// Consensus system identifier
///
/// Covers the V3 vocabulary plus the free-form `Named` network of V0/V1.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NetworkId {
	ByGenesis([u8; 32]),
	ByFork { block_number: u64, block_hash: [u8; 32] },
	Polkadot,
	Kusama,
	Westend,
	Rococo,
	Wococo,
	Ethereum { chain_id: u64 },
	BitcoinCore,
	BitcoinCash,
	Named(Vec<u8>),
}

/// Network qualifier on account junctions
///
/// `Any` is the wildcard (V0/V1 `Any`, V3 `None`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum AccountNetwork {
	#[default]
	Any,
	Named(NetworkId),
}

impl AccountNetwork {
	pub fn is_any(&self) -> bool {
		matches!(self, AccountNetwork::Any)
	}
}

/// One interior segment of a location
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Junction {
	Parachain(u32),
	AccountId32 { network: AccountNetwork, id: [u8; 32] },
	AccountIndex64 { network: AccountNetwork, index: u64 },
	AccountKey20 { network: AccountNetwork, key: [u8; 20] },
	PalletInstance(u8),
	GeneralIndex(u128),
	GeneralKey(Vec<u8>),
	OnlyChild,
	GlobalConsensus(NetworkId),
}

impl Junction {
	/// Short name used in error messages
	pub fn kind(&self) -> &'static str {
		match self {
			Junction::Parachain(_) => "Parachain",
			Junction::AccountId32 { .. } => "AccountId32",
			Junction::AccountIndex64 { .. } => "AccountIndex64",
			Junction::AccountKey20 { .. } => "AccountKey20",
			Junction::PalletInstance(_) => "PalletInstance",
			Junction::GeneralIndex(_) => "GeneralIndex",
			Junction::GeneralKey(_) => "GeneralKey",
			Junction::OnlyChild => "OnlyChild",
			Junction::GlobalConsensus(_) => "GlobalConsensus",
		}
	}

	pub fn is_account(&self) -> bool {
		matches!(
			self,
			Junction::AccountId32 { .. }
				| Junction::AccountIndex64 { .. }
				| Junction::AccountKey20 { .. }
		)
	}
}

/// A relative location: parent hops followed by interior junctions
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Location {
	pub parents: u8,
	pub interior: Vec<Junction>,
}

impl Location {
	/// Create a location, rejecting interiors longer than `MAX_JUNCTIONS`
	pub fn new(parents: u8, interior: Vec<Junction>) -> CodecResult<Self> {
		let location = Self { parents, interior };
		location.check_len()?;
		Ok(location)
	}

	/// The location of the local consensus system
	pub fn here() -> Self {
		Self::default()
	}

	/// The relay chain, seen from a parachain
	pub fn parent() -> Self {
		Self {
			parents: 1,
			interior: Vec::new(),
		}
	}

	pub fn is_here(&self) -> bool {
		self.parents == 0 && self.interior.is_empty()
	}

	pub fn junctions(&self) -> &[Junction] {
		&self.interior
	}

	/// First `Parachain` junction in the interior, if any
	pub fn para_id(&self) -> Option<u32> {
		self.interior.iter().find_map(|junction| match junction {
			Junction::Parachain(id) => Some(*id),
			_ => None,
		})
	}

	pub(crate) fn check_len(&self) -> CodecResult<()> {
		if self.interior.len() > MAX_JUNCTIONS {
			return Err(CodecError::malformed(format!(
				"{} interior junctions exceed the maximum of {}",
				self.interior.len(),
				MAX_JUNCTIONS
			)));
		}
		Ok(())
	}
}

/// A location tagged with the wire version it was read from or should be written as
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionedLocation {
	pub version: XcmVersion,
	pub location: Location,
}

impl VersionedLocation {
	pub fn new(version: XcmVersion, location: Location) -> Self {
		Self { version, location }
	}

	/// Re-tag the location for another wire version
	///
	/// Fails when the location uses vocabulary the target version lacks.
	pub fn into_version(self, version: XcmVersion) -> CodecResult<Self> {
		super::check_representable(&self.location, version)?;
		Ok(Self {
			version,
			location: self.location,
		})
	}
}
