//! Versioned XCM location codec
//!
//! Locations are held in one canonical shape ([`Location`]) and converted to the
//! V0, V1 or V3 wire format only when they are encoded or decoded. The SCALE form
//! is prefixed with the version tag (`0`, `1` or `3`); the JSON form is keyed by
//! `v0`/`v1`/`v3`.

pub mod common;
pub mod errors;
pub mod json;
pub mod message;
mod scale;
pub mod v0;
pub mod v1;
pub mod v3;

pub use common::{
	AccountNetwork, Junction, Location, NetworkId, VersionedLocation, XcmVersion,
	MAX_GENERAL_KEY_LEN, MAX_JUNCTIONS,
};
pub use errors::{CodecError, CodecResult};
pub use json::{location_from_json, location_to_json};
pub use message::{
	decode_versioned_asset_id, encode_versioned_asset_id, AssetFilter, FungibleAsset,
	Instruction, Weight, WeightLimit, Xcm,
};

/// Latest wire version used for newly built locations and messages
pub const LATEST_VERSION: XcmVersion = XcmVersion::V3;

/// Encode the location body (without the version tag)
pub fn encode_location(
	location: &Location,
	version: XcmVersion,
	out: &mut Vec<u8>,
) -> CodecResult<()> {
	match version {
		XcmVersion::V0 => v0::encode_location(location, out),
		XcmVersion::V1 => v1::encode_location(location, out),
		XcmVersion::V3 => v3::encode_location(location, out),
	}
}

/// Decode a location body written in `version`
pub fn decode_location(version: XcmVersion, input: &mut &[u8]) -> CodecResult<Location> {
	match version {
		XcmVersion::V0 => v0::decode_location(input),
		XcmVersion::V1 => v1::decode_location(input),
		XcmVersion::V3 => v3::decode_location(input),
	}
}

/// SCALE-encode a location with its leading version tag
pub fn encode(location: &Location, version: XcmVersion) -> CodecResult<Vec<u8>> {
	let mut out = vec![version.tag()];
	encode_location(location, version, &mut out)?;
	Ok(out)
}

/// Decode a version-tagged SCALE location
///
/// The tag is read first; the whole input must be consumed.
pub fn decode(bytes: &[u8]) -> CodecResult<VersionedLocation> {
	let mut input = bytes;
	let tag = scale::read_u8(&mut input, "version tag")?;
	let version = XcmVersion::from_tag(tag)?;
	let location = decode_location(version, &mut input)?;
	scale::ensure_consumed(input)?;
	Ok(VersionedLocation { version, location })
}

/// Check that `location` only uses vocabulary `version` can express
pub fn check_representable(location: &Location, version: XcmVersion) -> CodecResult<()> {
	encode_location(location, version, &mut Vec::new())
}

impl VersionedLocation {
	pub fn encode(&self) -> CodecResult<Vec<u8>> {
		encode(&self.location, self.version)
	}

	pub fn decode(bytes: &[u8]) -> CodecResult<Self> {
		decode(bytes)
	}

	/// Hex form of the SCALE encoding, `0x` prefixed
	pub fn to_hex(&self) -> CodecResult<String> {
		Ok(format!("0x{}", hex::encode(self.encode()?)))
	}
}

/// Build the location of an account on a sibling parachain
///
/// The result is `{ parents: 1, interior: [Parachain(para_id), account] }`.
pub fn build_destination(para_id: u32, account: Junction) -> CodecResult<Location> {
	let location = Location {
		parents: 1,
		interior: vec![Junction::Parachain(para_id), account],
	};
	validate_destination(&location)?;
	Ok(location)
}

/// Check that a destination is exactly one `Parachain` followed by one account junction
pub fn validate_destination(location: &Location) -> CodecResult<()> {
	let parachain_at = location
		.interior
		.iter()
		.position(|junction| matches!(junction, Junction::Parachain(_)));
	let account_at = location.interior.iter().position(Junction::is_account);

	match (parachain_at, account_at) {
		(Some(parachain), Some(account)) if account < parachain => {
			Err(CodecError::InvalidJunctionOrder {
				reason: format!(
					"{} precedes Parachain",
					location.interior[account].kind()
				),
			})
		},
		(Some(0), Some(1)) if location.interior.len() == 2 => Ok(()),
		(None, _) => Err(CodecError::InvalidJunctionOrder {
			reason: "destination has no Parachain junction".to_string(),
		}),
		(_, None) => Err(CodecError::InvalidJunctionOrder {
			reason: "destination has no account junction".to_string(),
		}),
		_ => Err(CodecError::InvalidJunctionOrder {
			reason: format!(
				"destination must be [Parachain, account], got [{}]",
				location
					.interior
					.iter()
					.map(Junction::kind)
					.collect::<Vec<_>>()
					.join(", ")
			),
		}),
	}
}

/// Encode a parachain destination after checking its junction order
pub fn encode_destination(location: &Location, version: XcmVersion) -> CodecResult<Vec<u8>> {
	validate_destination(location)?;
	encode(location, version)
}
