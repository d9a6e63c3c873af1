//! XCM V3 location wire format
//!
//! Same `{ parents, interior }` layout as V1 with a richer network vocabulary,
//! optional account networks (`None` is the wildcard), fixed-width general keys
//! and `GlobalConsensus` junctions.

use super::scale::{
	read, read_compact_u128, read_compact_u32, read_compact_u64, read_junction_count, read_u8,
	write_compact_u128, write_compact_u32, write_compact_u64,
};
use super::{
	AccountNetwork, CodecError, CodecResult, Junction, Location, NetworkId, MAX_GENERAL_KEY_LEN,
};
use codec::Encode;

const VERSION: u8 = 3;

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
			encode_account_network(network, out)?;
			out.extend_from_slice(id);
		},
		Junction::AccountIndex64 { network, index } => {
			out.push(2);
			encode_account_network(network, out)?;
			write_compact_u64(*index, out);
		},
		Junction::AccountKey20 { network, key } => {
			out.push(3);
			encode_account_network(network, out)?;
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
			let mut data = [0u8; MAX_GENERAL_KEY_LEN];
			data[..key.len()].copy_from_slice(key);
			out.push(6);
			out.push(key.len() as u8);
			out.extend_from_slice(&data);
		},
		Junction::OnlyChild => out.push(7),
		Junction::GlobalConsensus(network) => {
			out.push(9);
			encode_network(network, out)?;
		},
	}
	Ok(())
}

fn decode_junction(input: &mut &[u8]) -> CodecResult<Junction> {
	let index = read_u8(input, "junction index")?;
	let junction = match index {
		0 => Junction::Parachain(read_compact_u32(input, "para id")?),
		1 => {
			let network = decode_account_network(input)?;
			let id = read::<[u8; 32]>(input, "account id")?;
			Junction::AccountId32 { network, id }
		},
		2 => {
			let network = decode_account_network(input)?;
			let index = read_compact_u64(input, "account index")?;
			Junction::AccountIndex64 { network, index }
		},
		3 => {
			let network = decode_account_network(input)?;
			let key = read::<[u8; 20]>(input, "account key")?;
			Junction::AccountKey20 { network, key }
		},
		4 => Junction::PalletInstance(read_u8(input, "pallet instance")?),
		5 => Junction::GeneralIndex(read_compact_u128(input, "general index")?),
		6 => {
			let length = read_u8(input, "general key length")? as usize;
			let data = read::<[u8; 32]>(input, "general key data")?;
			if length > MAX_GENERAL_KEY_LEN {
				return Err(CodecError::malformed(format!(
					"general key length {length} exceeds {MAX_GENERAL_KEY_LEN}"
				)));
			}
			Junction::GeneralKey(data[..length].to_vec())
		},
		7 => Junction::OnlyChild,
		8 => {
			return Err(CodecError::UnknownJunction {
				version: VERSION,
				junction: "Plurality".to_string(),
			})
		},
		9 => Junction::GlobalConsensus(decode_network(input)?),
		other => {
			return Err(CodecError::UnknownJunction {
				version: VERSION,
				junction: format!("index {other}"),
			})
		},
	};
	Ok(junction)
}

fn encode_account_network(network: &AccountNetwork, out: &mut Vec<u8>) -> CodecResult<()> {
	match network {
		AccountNetwork::Any => out.push(0),
		AccountNetwork::Named(network) => {
			out.push(1);
			encode_network(network, out)?;
		},
	}
	Ok(())
}

fn decode_account_network(input: &mut &[u8]) -> CodecResult<AccountNetwork> {
	match read_u8(input, "network option")? {
		0 => Ok(AccountNetwork::Any),
		1 => Ok(AccountNetwork::Named(decode_network(input)?)),
		other => Err(CodecError::malformed(format!(
			"invalid option discriminant {other} for account network"
		))),
	}
}

pub(crate) fn encode_network(network: &NetworkId, out: &mut Vec<u8>) -> CodecResult<()> {
	match network {
		NetworkId::ByGenesis(hash) => {
			out.push(0);
			out.extend_from_slice(hash);
		},
		NetworkId::ByFork {
			block_number,
			block_hash,
		} => {
			out.push(1);
			block_number.encode_to(out);
			out.extend_from_slice(block_hash);
		},
		NetworkId::Polkadot => out.push(2),
		NetworkId::Kusama => out.push(3),
		NetworkId::Westend => out.push(4),
		NetworkId::Rococo => out.push(5),
		NetworkId::Wococo => out.push(6),
		NetworkId::Ethereum { chain_id } => {
			out.push(7);
			write_compact_u64(*chain_id, out);
		},
		NetworkId::BitcoinCore => out.push(8),
		NetworkId::BitcoinCash => out.push(9),
		NetworkId::Named(_) => {
			return Err(CodecError::not_representable(VERSION, "Named network"));
		},
	}
	Ok(())
}

pub(crate) fn decode_network(input: &mut &[u8]) -> CodecResult<NetworkId> {
	let network = match read_u8(input, "network id")? {
		0 => NetworkId::ByGenesis(read::<[u8; 32]>(input, "genesis hash")?),
		1 => NetworkId::ByFork {
			block_number: read::<u64>(input, "fork block number")?,
			block_hash: read::<[u8; 32]>(input, "fork block hash")?,
		},
		2 => NetworkId::Polkadot,
		3 => NetworkId::Kusama,
		4 => NetworkId::Westend,
		5 => NetworkId::Rococo,
		6 => NetworkId::Wococo,
		7 => NetworkId::Ethereum {
			chain_id: read_compact_u64(input, "ethereum chain id")?,
		},
		8 => NetworkId::BitcoinCore,
		9 => NetworkId::BitcoinCash,
		other => {
			return Err(CodecError::malformed(format!(
				"unknown V3 network id index {other}"
			)))
		},
	};
	Ok(network)
}
