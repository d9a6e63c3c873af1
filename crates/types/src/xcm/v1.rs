//! XCM V1 location wire format
//!
//! `MultiLocation { parents: u8, interior: Junctions }` where `Junctions` is
//! `Here` or `X1..X8`. Networks use the legacy `Any`/`Named`/`Polkadot`/`Kusama`
//! vocabulary, shared with V0.

use super::scale::{
	read, read_bytes, read_compact_u128, read_compact_u32, read_compact_u64, read_junction_count,
	read_u8, write_bytes, write_compact_u128, write_compact_u32, write_compact_u64,
};
use super::{
	AccountNetwork, CodecError, CodecResult, Junction, Location, NetworkId, MAX_GENERAL_KEY_LEN,
};

const VERSION: u8 = 1;

pub fn encode_location(location: &Location, out: &mut Vec<u8>) -> CodecResult<()> {
	location.check_len()?;
	out.push(location.parents);
	out.push(location.interior.len() as u8);
	for junction in &location.interior {
		encode_junction(junction, out)?;
	}
	Ok(())
}

pub fn decode_location(input: &mut &[u8]) -> CodecResult<Location> {
	let parents = read_u8(input, "parents")?;
	let count = read_junction_count(input)?;
	let mut interior = Vec::with_capacity(count);
	for _ in 0..count {
		interior.push(decode_junction(input)?);
	}
	Ok(Location { parents, interior })
}

fn encode_junction(junction: &Junction, out: &mut Vec<u8>) -> CodecResult<()> {
	match junction {
		Junction::Parachain(id) => {
			out.push(0);
			write_compact_u32(*id, out);
		},
		Junction::AccountId32 { network, id } => {
			out.push(1);
			encode_network(network, VERSION, out)?;
			out.extend_from_slice(id);
		},
		Junction::AccountIndex64 { network, index } => {
			out.push(2);
			encode_network(network, VERSION, out)?;
			write_compact_u64(*index, out);
		},
		Junction::AccountKey20 { network, key } => {
			out.push(3);
			encode_network(network, VERSION, out)?;
			out.extend_from_slice(key);
		},
		Junction::PalletInstance(index) => {
			out.push(4);
			out.push(*index);
		},
		Junction::GeneralIndex(index) => {
			out.push(5);
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
			out.push(6);
			write_bytes(key, out);
		},
		Junction::OnlyChild => out.push(7),
		Junction::GlobalConsensus(_) => {
			return Err(CodecError::not_representable(VERSION, "GlobalConsensus junction"));
		},
	}
	Ok(())
}

fn decode_junction(input: &mut &[u8]) -> CodecResult<Junction> {
	let index = read_u8(input, "junction index")?;
	let junction = match index {
		0 => Junction::Parachain(read_compact_u32(input, "para id")?),
		1 => {
			let network = decode_network(input, VERSION)?;
			let id = read::<[u8; 32]>(input, "account id")?;
			Junction::AccountId32 { network, id }
		},
		2 => {
			let network = decode_network(input, VERSION)?;
			let index = read_compact_u64(input, "account index")?;
			Junction::AccountIndex64 { network, index }
		},
		3 => {
			let network = decode_network(input, VERSION)?;
			let key = read::<[u8; 20]>(input, "account key")?;
			Junction::AccountKey20 { network, key }
		},
		4 => Junction::PalletInstance(read_u8(input, "pallet instance")?),
		5 => Junction::GeneralIndex(read_compact_u128(input, "general index")?),
		6 => {
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
		7 => Junction::OnlyChild,
		8 => {
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
	Ok(junction)
}

/// Encode a V0/V1 network id
pub(crate) fn encode_network(
	network: &AccountNetwork,
	version: u8,
	out: &mut Vec<u8>,
) -> CodecResult<()> {
	match network {
		AccountNetwork::Any => out.push(0),
		AccountNetwork::Named(NetworkId::Named(name)) => {
			out.push(1);
			write_bytes(name, out);
		},
		AccountNetwork::Named(NetworkId::Polkadot) => out.push(2),
		AccountNetwork::Named(NetworkId::Kusama) => out.push(3),
		AccountNetwork::Named(other) => {
			return Err(CodecError::not_representable(
				version,
				format!("network {other:?}"),
			));
		},
	}
	Ok(())
}

/// Decode a V0/V1 network id
pub(crate) fn decode_network(input: &mut &[u8], version: u8) -> CodecResult<AccountNetwork> {
	let network = match read_u8(input, "network id")? {
		0 => AccountNetwork::Any,
		1 => AccountNetwork::Named(NetworkId::Named(read_bytes(input, "network name")?)),
		2 => AccountNetwork::Named(NetworkId::Polkadot),
		3 => AccountNetwork::Named(NetworkId::Kusama),
		other => {
			return Err(CodecError::malformed(format!(
				"unknown V{version} network id index {other}"
			)))
		},
	};
	Ok(network)
}
