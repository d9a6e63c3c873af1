//! XCM V0 location wire format
//!
//! V0 has no `parents` field: the location is `Null` or `X1..X8` of junctions,
//! and parent hops are leading `Parent` junctions. Upgrading folds them into
//! `parents`; downgrading expands them again.

use super::scale::{
	read, read_bytes, read_compact_u128, read_compact_u32, read_compact_u64, read_junction_count,
	read_u8, write_bytes, write_compact_u128, write_compact_u32, write_compact_u64,
};
use super::v1::{decode_network, encode_network};
use super::{CodecError, CodecResult, Junction, Location, MAX_GENERAL_KEY_LEN, MAX_JUNCTIONS};

const VERSION: u8 = 0;

const PARENT: u8 = 0;

pub fn encode_location(location: &Location, out: &mut Vec<u8>) -> CodecResult<()> {
	location.check_len()?;
	let total = location.parents as usize + location.interior.len();
	if total > MAX_JUNCTIONS {
		return Err(CodecError::not_representable(
			VERSION,
			format!(
				"location with {} parents and {} junctions",
				location.parents,
				location.interior.len()
			),
		));
	}

	out.push(total as u8);
	for _ in 0..location.parents {
		out.push(PARENT);
	}
	for junction in &location.interior {
		encode_junction(junction, out)?;
	}
	Ok(())
}

pub fn decode_location(input: &mut &[u8]) -> CodecResult<Location> {
	let count = read_junction_count(input)?;
	let mut parents = 0u8;
	let mut interior = Vec::with_capacity(count);
	for _ in 0..count {
		match decode_junction(input)? {
			None if interior.is_empty() => parents += 1,
			None => {
				return Err(CodecError::malformed(
					"V0 Parent junction follows an interior junction",
				))
			},
			Some(junction) => interior.push(junction),
		}
	}
	Ok(Location { parents, interior })
}

fn encode_junction(junction: &Junction, out: &mut Vec<u8>) -> CodecResult<()> {
	match junction {
		Junction::Parachain(id) => {
			out.push(1);
			write_compact_u32(*id, out);
		},
		Junction::AccountId32 { network, id } => {
			out.push(2);
			encode_network(network, VERSION, out)?;
			out.extend_from_slice(id);
		},
		Junction::AccountIndex64 { network, index } => {
			out.push(3);
			encode_network(network, VERSION, out)?;
			write_compact_u64(*index, out);
		},
		Junction::AccountKey20 { network, key } => {
			out.push(4);
			encode_network(network, VERSION, out)?;
			out.extend_from_slice(key);
		},
		Junction::PalletInstance(index) => {
			out.push(5);
			out.push(*index);
		},
		Junction::GeneralIndex(index) => {
			out.push(6);
			write_compact_u128(*index, out);
		},
		Junction::GeneralKey(key) => {
			if key.len() > MAX_GENERAL_KEY_LEN {
				return Err(CodecError::malformed(format!(
					"general key of {} bytes exceeds {}",
					key.len(),
					MAX_GENERAL_KEY_LEN
				)));
			}
			out.push(7);
			write_bytes(key, out);
		},
		Junction::OnlyChild => out.push(8),
		Junction::GlobalConsensus(_) => {
			return Err(CodecError::not_representable(VERSION, "GlobalConsensus junction"));
		},
	}
	Ok(())
}

/// Decode one junction; `None` stands for `Parent`
fn decode_junction(input: &mut &[u8]) -> CodecResult<Option<Junction>> {
	let index = read_u8(input, "junction index")?;
	let junction = match index {
		PARENT => return Ok(None),
		1 => Junction::Parachain(read_compact_u32(input, "para id")?),
		2 => {
			let network = decode_network(input, VERSION)?;
			let id = read::<[u8; 32]>(input, "account id")?;
			Junction::AccountId32 { network, id }
		},
		3 => {
			let network = decode_network(input, VERSION)?;
			let index = read_compact_u64(input, "account index")?;
			Junction::AccountIndex64 { network, index }
		},
		4 => {
			let network = decode_network(input, VERSION)?;
			let key = read::<[u8; 20]>(input, "account key")?;
			Junction::AccountKey20 { network, key }
		},
		5 => Junction::PalletInstance(read_u8(input, "pallet instance")?),
		6 => Junction::GeneralIndex(read_compact_u128(input, "general index")?),
		7 => {
			let key = read_bytes(input, "general key")?;
			if key.len() > MAX_GENERAL_KEY_LEN {
				return Err(CodecError::malformed(format!(
					"general key of {} bytes exceeds {}",
					key.len(),
					MAX_GENERAL_KEY_LEN
				)));
			}
			Junction::GeneralKey(key)
		},
		8 => Junction::OnlyChild,
		9 => {
			return Err(CodecError::UnknownJunction {
				version: VERSION,
				junction: "Plurality".to_string(),
			})
		},
		other => {
			return Err(CodecError::UnknownJunction {
				version: VERSION,
				junction: format!("index {other}"),
			})
		},
	};
	Ok(Some(junction))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::xcm::{AccountNetwork, NetworkId};

	#[test]
	fn test_parents_become_leading_parent_junctions() {
		let location = Location {
			parents: 1,
			interior: vec![Junction::Parachain(1000), Junction::GeneralIndex(1984)],
		};
		let mut out = Vec::new();
		encode_location(&location, &mut out).unwrap();
		assert_eq!(out[0], 3);
		assert_eq!(out[1], PARENT);
		assert_eq!(out[2], 1);

		let decoded = decode_location(&mut &out[..]).unwrap();
		assert_eq!(decoded, location);
	}

	#[test]
	fn test_parent_after_interior_is_rejected() {
		// X2(Parachain(1), Parent)
		let bytes = [0x02, 0x01, 0x04, 0x00];
		assert!(matches!(
			decode_location(&mut &bytes[..]),
			Err(CodecError::Malformed { .. })
		));
	}

	#[test]
	fn test_named_network_round_trip() {
		let location = Location {
			parents: 0,
			interior: vec![Junction::AccountId32 {
				network: AccountNetwork::Named(NetworkId::Named(b"westmint".to_vec())),
				id: [1u8; 32],
			}],
		};
		let mut out = Vec::new();
		encode_location(&location, &mut out).unwrap();
		assert_eq!(decode_location(&mut &out[..]).unwrap(), location);
	}

	#[test]
	fn test_too_many_hops_for_v0() {
		let location = Location {
			parents: 4,
			interior: vec![Junction::OnlyChild; 5],
		};
		assert!(matches!(
			encode_location(&location, &mut Vec::new()),
			Err(CodecError::NotRepresentable { version: 0, .. })
		));
	}
}
