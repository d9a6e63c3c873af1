//! Account addresses for EVM and Substrate chains
//!
//! EVM chains address accounts with 20-byte keys written as `0x` hex. Substrate
//! chains use 32-byte account ids, normally written in SS58 with the chain's
//! address prefix.

use crate::xcm::{AccountNetwork, Junction};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const SS58_CHECKSUM_PREFIX: &[u8] = b"SS58PRE";
const SS58_CHECKSUM_LEN: usize = 2;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccountError {
	#[error("Address cannot be empty")]
	Empty,

	#[error("Invalid hex address '{value}': {reason}")]
	InvalidHex { value: String, reason: String },

	#[error("Invalid address length for {kind:?}: expected {expected} bytes, got {actual}")]
	InvalidLength {
		kind: AccountKind,
		expected: usize,
		actual: usize,
	},

	#[error("Invalid SS58 address '{value}': {reason}")]
	InvalidSs58 { value: String, reason: String },

	#[error("Address prefix {prefix} is out of range")]
	InvalidPrefix { prefix: u16 },
}

/// Which account junction a chain uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountKind {
	/// 20-byte EVM account
	Key20,
	/// 32-byte Substrate account id
	Id32,
}

impl AccountKind {
	pub fn for_chain(is_evm: bool) -> Self {
		if is_evm {
			AccountKind::Key20
		} else {
			AccountKind::Id32
		}
	}

	pub fn byte_len(self) -> usize {
		match self {
			AccountKind::Key20 => 20,
			AccountKind::Id32 => 32,
		}
	}
}

/// A decoded transfer recipient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Recipient {
	Key20([u8; 20]),
	Id32([u8; 32]),
}

impl Recipient {
	/// Parse a recipient address for a chain of the given account kind
	///
	/// `Key20` accepts `0x` + 40 hex digits. `Id32` accepts SS58 (any prefix) or
	/// `0x` + 64 hex digits.
	pub fn parse(text: &str, kind: AccountKind) -> Result<Self, AccountError> {
		let text = text.trim();
		if text.is_empty() {
			return Err(AccountError::Empty);
		}

		if text.starts_with("0x") || text.starts_with("0X") {
			let bytes = hex::decode(&text[2..]).map_err(|e| AccountError::InvalidHex {
				value: text.to_string(),
				reason: e.to_string(),
			})?;
			return Self::from_bytes(&bytes, kind);
		}

		match kind {
			AccountKind::Id32 => {
				let (_, account) = ss58_decode(text)?;
				Ok(Recipient::Id32(account))
			},
			AccountKind::Key20 => Err(AccountError::InvalidHex {
				value: text.to_string(),
				reason: "EVM addresses must start with 0x".to_string(),
			}),
		}
	}

	pub fn from_bytes(bytes: &[u8], kind: AccountKind) -> Result<Self, AccountError> {
		let invalid_length = || AccountError::InvalidLength {
			kind,
			expected: kind.byte_len(),
			actual: bytes.len(),
		};
		match kind {
			AccountKind::Key20 => bytes
				.try_into()
				.map(Recipient::Key20)
				.map_err(|_| invalid_length()),
			AccountKind::Id32 => bytes
				.try_into()
				.map(Recipient::Id32)
				.map_err(|_| invalid_length()),
		}
	}

	pub fn kind(&self) -> AccountKind {
		match self {
			Recipient::Key20(_) => AccountKind::Key20,
			Recipient::Id32(_) => AccountKind::Id32,
		}
	}

	pub fn as_bytes(&self) -> &[u8] {
		match self {
			Recipient::Key20(key) => key,
			Recipient::Id32(id) => id,
		}
	}

	pub fn to_hex(&self) -> String {
		format!("0x{}", hex::encode(self.as_bytes()))
	}

	/// The account junction used as the last hop of a destination
	pub fn to_junction(&self, network: AccountNetwork) -> Junction {
		match self {
			Recipient::Key20(key) => Junction::AccountKey20 { network, key: *key },
			Recipient::Id32(id) => Junction::AccountId32 { network, id: *id },
		}
	}
}

fn ss58_checksum(data: &[u8]) -> [u8; SS58_CHECKSUM_LEN] {
	let mut state = blake2b_simd::State::new();
	state.update(SS58_CHECKSUM_PREFIX);
	state.update(data);
	let hash = state.finalize();
	let mut checksum = [0u8; SS58_CHECKSUM_LEN];
	checksum.copy_from_slice(&hash.as_bytes()[..SS58_CHECKSUM_LEN]);
	checksum
}

/// Decode an SS58 address into its prefix and 32-byte account id
pub fn ss58_decode(text: &str) -> Result<(u16, [u8; 32]), AccountError> {
	let invalid = |reason: &str| AccountError::InvalidSs58 {
		value: text.to_string(),
		reason: reason.to_string(),
	};

	let data = bs58::decode(text)
		.into_vec()
		.map_err(|e| invalid(&e.to_string()))?;
	let (prefix, prefix_len) = match data.first() {
		Some(&first) if first < 64 => (first as u16, 1),
		Some(&first) if first < 128 => {
			let second = *data.get(1).ok_or_else(|| invalid("truncated prefix"))?;
			let lower = (first << 2) | (second >> 6);
			let upper = second & 0b0011_1111;
			(lower as u16 | ((upper as u16) << 8), 2)
		},
		Some(_) => return Err(invalid("unsupported address format")),
		None => return Err(invalid("empty payload")),
	};

	if data.len() != prefix_len + 32 + SS58_CHECKSUM_LEN {
		return Err(invalid("payload is not a 32-byte account"));
	}

	let (body, checksum) = data.split_at(data.len() - SS58_CHECKSUM_LEN);
	if ss58_checksum(body) != checksum {
		return Err(invalid("checksum mismatch"));
	}

	let mut account = [0u8; 32];
	account.copy_from_slice(&body[prefix_len..]);
	Ok((prefix, account))
}

/// Encode a 32-byte account id as SS58 with the given address prefix
pub fn ss58_encode(account: &[u8; 32], prefix: u16) -> Result<String, AccountError> {
	let mut data = match prefix {
		0..=63 => vec![prefix as u8],
		64..=16_383 => {
			let first = ((prefix & 0b0000_0000_1111_1100) as u8) >> 2;
			let second = ((prefix >> 8) as u8) | (((prefix & 0b0000_0000_0000_0011) as u8) << 6);
			vec![first | 0b0100_0000, second]
		},
		_ => return Err(AccountError::InvalidPrefix { prefix }),
	};
	data.extend_from_slice(account);
	let checksum = ss58_checksum(&data);
	data.extend_from_slice(&checksum);
	Ok(bs58::encode(data).into_string())
}
