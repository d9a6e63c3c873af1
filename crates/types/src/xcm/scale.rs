//! SCALE primitives shared by the versioned codecs

use super::{CodecError, CodecResult};
use codec::{Compact, Decode, Encode};

pub(crate) fn read<T: Decode>(input: &mut &[u8], what: &str) -> CodecResult<T> {
	T::decode(input).map_err(|e| CodecError::malformed(format!("cannot read {what}: {e}")))
}

pub(crate) fn read_u8(input: &mut &[u8], what: &str) -> CodecResult<u8> {
	read::<u8>(input, what)
}

pub(crate) fn read_compact_u32(input: &mut &[u8], what: &str) -> CodecResult<u32> {
	Ok(read::<Compact<u32>>(input, what)?.0)
}

pub(crate) fn read_compact_u64(input: &mut &[u8], what: &str) -> CodecResult<u64> {
	Ok(read::<Compact<u64>>(input, what)?.0)
}

pub(crate) fn read_compact_u128(input: &mut &[u8], what: &str) -> CodecResult<u128> {
	Ok(read::<Compact<u128>>(input, what)?.0)
}

pub(crate) fn read_bytes(input: &mut &[u8], what: &str) -> CodecResult<Vec<u8>> {
	read::<Vec<u8>>(input, what)
}

pub(crate) fn write_compact_u32(value: u32, out: &mut Vec<u8>) {
	Compact(value).encode_to(out);
}

pub(crate) fn write_compact_u64(value: u64, out: &mut Vec<u8>) {
	Compact(value).encode_to(out);
}

pub(crate) fn write_compact_u128(value: u128, out: &mut Vec<u8>) {
	Compact(value).encode_to(out);
}

pub(crate) fn write_bytes(value: &[u8], out: &mut Vec<u8>) {
	value.encode_to(out);
}

/// Fail when bytes remain after a complete value was read
pub(crate) fn ensure_consumed(input: &[u8]) -> CodecResult<()> {
	if input.is_empty() {
		Ok(())
	} else {
		Err(CodecError::malformed(format!(
			"{} trailing bytes after value",
			input.len()
		)))
	}
}

/// Read the `Here`/`X1..X8` discriminant shared by every version
pub(crate) fn read_junction_count(input: &mut &[u8]) -> CodecResult<usize> {
	let count = read_u8(input, "junctions discriminant")? as usize;
	if count > super::MAX_JUNCTIONS {
		return Err(CodecError::malformed(format!(
			"junctions discriminant {count} is out of range"
		)));
	}
	Ok(count)
}
