//! Minimal XCM V3 program encoding for fee queries
//!
//! Only the instructions a reserve transfer estimate needs are modelled:
//! `WithdrawAsset`, `BuyExecution`, `DepositAsset` and `DepositReserveAsset`.

use super::scale::{read_compact_u64, read_u8, write_compact_u128, write_compact_u32, write_compact_u64};
use super::{v3, validate_destination, CodecError, CodecResult, Junction, Location, XcmVersion};
use serde::{Deserialize, Serialize};

const WITHDRAW_ASSET: u8 = 0;
const DEPOSIT_ASSET: u8 = 13;
const DEPOSIT_RESERVE_ASSET: u8 = 14;
const BUY_EXECUTION: u8 = 19;

const ASSET_ID_CONCRETE: u8 = 0;
const FUNGIBLE: u8 = 0;
const FILTER_DEFINITE: u8 = 0;
const FILTER_WILD: u8 = 1;
const WILD_ALL: u8 = 0;
const WILD_ALL_COUNTED: u8 = 2;

/// Two-dimensional execution weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Weight {
	pub ref_time: u64,
	pub proof_size: u64,
}

impl Weight {
	pub fn new(ref_time: u64, proof_size: u64) -> Self {
		Self {
			ref_time,
			proof_size,
		}
	}

	pub fn encode_to(&self, out: &mut Vec<u8>) {
		write_compact_u64(self.ref_time, out);
		write_compact_u64(self.proof_size, out);
	}

	pub fn decode(input: &mut &[u8]) -> CodecResult<Self> {
		Ok(Self {
			ref_time: read_compact_u64(input, "weight ref_time")?,
			proof_size: read_compact_u64(input, "weight proof_size")?,
		})
	}
}

/// A fungible amount of a concrete asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FungibleAsset {
	pub id: Location,
	pub amount: u128,
}

impl FungibleAsset {
	pub fn new(id: Location, amount: u128) -> Self {
		Self { id, amount }
	}

	fn encode_to(&self, out: &mut Vec<u8>) -> CodecResult<()> {
		out.push(ASSET_ID_CONCRETE);
		v3::encode_location(&self.id, out)?;
		out.push(FUNGIBLE);
		write_compact_u128(self.amount, out);
		Ok(())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightLimit {
	Unlimited,
	Limited(Weight),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetFilter {
	Definite(Vec<FungibleAsset>),
	All,
	AllCounted(u32),
}

impl AssetFilter {
	fn encode_to(&self, out: &mut Vec<u8>) -> CodecResult<()> {
		match self {
			AssetFilter::Definite(assets) => {
				out.push(FILTER_DEFINITE);
				encode_assets(assets, out)?;
			},
			AssetFilter::All => {
				out.push(FILTER_WILD);
				out.push(WILD_ALL);
			},
			AssetFilter::AllCounted(count) => {
				out.push(FILTER_WILD);
				out.push(WILD_ALL_COUNTED);
				write_compact_u32(*count, out);
			},
		}
		Ok(())
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
	WithdrawAsset(Vec<FungibleAsset>),
	BuyExecution {
		fees: FungibleAsset,
		weight_limit: WeightLimit,
	},
	DepositAsset {
		assets: AssetFilter,
		beneficiary: Location,
	},
	/// Move assets to `dest` and run `xcm` there
	DepositReserveAsset {
		assets: AssetFilter,
		dest: Location,
		xcm: Xcm,
	},
}

impl Instruction {
	fn encode_to(&self, out: &mut Vec<u8>) -> CodecResult<()> {
		match self {
			Instruction::WithdrawAsset(assets) => {
				out.push(WITHDRAW_ASSET);
				encode_assets(assets, out)?;
			},
			Instruction::BuyExecution { fees, weight_limit } => {
				out.push(BUY_EXECUTION);
				fees.encode_to(out)?;
				match weight_limit {
					WeightLimit::Unlimited => out.push(0),
					WeightLimit::Limited(weight) => {
						out.push(1);
						weight.encode_to(out);
					},
				}
			},
			Instruction::DepositAsset {
				assets,
				beneficiary,
			} => {
				out.push(DEPOSIT_ASSET);
				assets.encode_to(out)?;
				v3::encode_location(beneficiary, out)?;
			},
			Instruction::DepositReserveAsset { assets, dest, xcm } => {
				out.push(DEPOSIT_RESERVE_ASSET);
				assets.encode_to(out)?;
				v3::encode_location(dest, out)?;
				xcm.encode_to(out)?;
			},
		}
		Ok(())
	}
}

/// An XCM V3 program
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Xcm(pub Vec<Instruction>);

impl Xcm {
	/// Program priced for a reserve transfer to `destination`
	///
	/// `destination` is `[Parachain, account]` as built by
	/// [`build_destination`](super::build_destination). The local part withdraws
	/// the asset, buys execution and deposits it into the destination's sovereign
	/// account; the forwarded part buys execution there and credits the account.
	/// `source_para` is the parachain id of the chain executing the program, used
	/// to express its local assets from the destination.
	pub fn reserve_transfer(
		asset: Location,
		amount: u128,
		source_para: Option<u32>,
		destination: &Location,
	) -> CodecResult<Self> {
		validate_destination(destination)?;
		let (chain, account) = destination.interior.split_at(1);
		let dest = Location {
			parents: destination.parents,
			interior: chain.to_vec(),
		};
		let beneficiary = Location {
			parents: 0,
			interior: account.to_vec(),
		};

		let remote = FungibleAsset::new(as_seen_from_sibling(asset.clone(), source_para)?, amount);
		let local = FungibleAsset::new(asset, amount);
		Ok(Self(vec![
			Instruction::WithdrawAsset(vec![local.clone()]),
			Instruction::BuyExecution {
				fees: local,
				weight_limit: WeightLimit::Unlimited,
			},
			Instruction::DepositReserveAsset {
				assets: AssetFilter::AllCounted(1),
				dest,
				xcm: Xcm(vec![
					Instruction::BuyExecution {
						fees: remote,
						weight_limit: WeightLimit::Unlimited,
					},
					Instruction::DepositAsset {
						assets: AssetFilter::AllCounted(1),
						beneficiary,
					},
				]),
			},
		]))
	}

	fn encode_to(&self, out: &mut Vec<u8>) -> CodecResult<()> {
		write_compact_u32(self.0.len() as u32, out);
		for instruction in &self.0 {
			instruction.encode_to(out)?;
		}
		Ok(())
	}

	/// SCALE-encode as `VersionedXcm::V3`
	pub fn encode_versioned(&self) -> CodecResult<Vec<u8>> {
		let mut out = vec![XcmVersion::V3.tag()];
		self.encode_to(&mut out)?;
		Ok(out)
	}
}

/// Re-anchor a location of the executing chain to a sibling's point of view
///
/// Locations already going through the relay are the same from every sibling.
fn as_seen_from_sibling(location: Location, source_para: Option<u32>) -> CodecResult<Location> {
	if location.parents > 0 {
		return Ok(location);
	}
	let interior = source_para
		.map(Junction::Parachain)
		.into_iter()
		.chain(location.interior)
		.collect();
	Location::new(1, interior)
}

fn encode_assets(assets: &[FungibleAsset], out: &mut Vec<u8>) -> CodecResult<()> {
	write_compact_u32(assets.len() as u32, out);
	for asset in assets {
		asset.encode_to(out)?;
	}
	Ok(())
}

/// SCALE-encode a location as `VersionedAssetId::V3(Concrete(location))`
pub fn encode_versioned_asset_id(location: &Location) -> CodecResult<Vec<u8>> {
	let mut out = vec![XcmVersion::V3.tag(), ASSET_ID_CONCRETE];
	v3::encode_location(location, &mut out)?;
	Ok(out)
}

/// Decode one `VersionedAssetId`
///
/// V3 ids carry a `Concrete`/`Abstract` tag; V4 ids are a bare location with
/// the same junction layout as V3.
pub fn decode_versioned_asset_id(input: &mut &[u8]) -> CodecResult<Location> {
	match read_u8(input, "asset id version")? {
		3 => match read_u8(input, "asset id kind")? {
			ASSET_ID_CONCRETE => v3::decode_location(input),
			1 => Err(CodecError::not_representable(3, "Abstract asset id")),
			other => Err(CodecError::malformed(format!(
				"unknown asset id kind {other}"
			))),
		},
		4 => v3::decode_location(input),
		version => Err(CodecError::UnsupportedVersion { version }),
	}
}
