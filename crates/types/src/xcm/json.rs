//! Structured JSON form of versioned locations
//!
//! Registries describe locations the way polkadot.js prints them, e.g.
//! `{"v3": {"parents": 1, "interior": {"x2": [{"parachain": 1000}, {"generalIndex": 1984}]}}}`.
//! Keys are matched case-insensitively, `x1` may hold an object or a one-element
//! array, and integers may be JSON numbers or decimal strings. Emission always
//! uses lower-camel keys.

use super::{
	check_representable, AccountNetwork, CodecError, CodecResult, Junction, Location, NetworkId,
	VersionedLocation, XcmVersion, MAX_GENERAL_KEY_LEN, MAX_JUNCTIONS,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Parse a versioned location descriptor
pub fn location_from_json(value: &Value) -> CodecResult<VersionedLocation> {
	let (key, body) = single_entry(value)
		.ok_or_else(|| CodecError::malformed("versioned location must have exactly one key"))?;
	let version = parse_version_key(&key)?;
	let location = match version {
		XcmVersion::V0 => parse_v0_body(body)?,
		XcmVersion::V1 | XcmVersion::V3 => parse_location_body(body, version)?,
	};
	location.check_len()?;
	Ok(VersionedLocation { version, location })
}

/// Emit a versioned location descriptor
pub fn location_to_json(versioned: &VersionedLocation) -> CodecResult<Value> {
	let VersionedLocation { version, location } = versioned;
	check_representable(location, *version)?;

	let body = match version {
		XcmVersion::V0 => {
			let mut junctions = vec![unit("parent"); location.parents as usize];
			for junction in &location.interior {
				junctions.push(junction_to_json(junction, *version));
			}
			junctions_to_json(junctions, "null")
		},
		XcmVersion::V1 | XcmVersion::V3 => {
			let junctions = location
				.interior
				.iter()
				.map(|junction| junction_to_json(junction, *version))
				.collect();
			json!({
				"parents": location.parents,
				"interior": junctions_to_json(junctions, "here"),
			})
		},
	};

	let mut root = Map::new();
	root.insert(format!("v{}", version.tag()), body);
	Ok(Value::Object(root))
}

impl serde::Serialize for VersionedLocation {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		location_to_json(self)
			.map_err(serde::ser::Error::custom)?
			.serialize(serializer)
	}
}

impl<'de> serde::Deserialize<'de> for VersionedLocation {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		let value = Value::deserialize(deserializer)?;
		location_from_json(&value).map_err(serde::de::Error::custom)
	}
}

fn parse_version_key(key: &str) -> CodecResult<XcmVersion> {
	let digits = key
		.strip_prefix('v')
		.ok_or_else(|| CodecError::malformed(format!("unexpected version key '{key}'")))?;
	let version: u8 = digits
		.parse()
		.map_err(|_| CodecError::malformed(format!("unexpected version key '{key}'")))?;
	XcmVersion::from_tag(version)
}

/// A parsed junction, where V0 may also carry `Parent`
enum Segment {
	Parent,
	Junction(Junction),
}

fn parse_v0_body(body: &Value) -> CodecResult<Location> {
	let segments = parse_junctions(body, XcmVersion::V0, "null")?;
	let mut parents = 0u8;
	let mut interior = Vec::with_capacity(segments.len());
	for segment in segments {
		match segment {
			Segment::Parent if interior.is_empty() => parents += 1,
			Segment::Parent => {
				return Err(CodecError::malformed(
					"V0 Parent junction follows an interior junction",
				))
			},
			Segment::Junction(junction) => interior.push(junction),
		}
	}
	Ok(Location { parents, interior })
}

fn parse_location_body(body: &Value, version: XcmVersion) -> CodecResult<Location> {
	let object = body
		.as_object()
		.ok_or_else(|| CodecError::malformed("location must be an object"))?;
	let parents = match field(object, "parents") {
		Some(value) => {
			let parents = parse_uint(value, "parents")?;
			u8::try_from(parents)
				.map_err(|_| CodecError::malformed(format!("parents {parents} exceeds u8")))?
		},
		None => 0,
	};
	let interior = match field(object, "interior") {
		Some(value) => parse_junctions(value, version, "here")?,
		None => return Err(CodecError::malformed("location is missing 'interior'")),
	};

	let interior = interior
		.into_iter()
		.map(|segment| match segment {
			Segment::Junction(junction) => Ok(junction),
			Segment::Parent => Err(CodecError::UnknownJunction {
				version: version.tag(),
				junction: "parent".to_string(),
			}),
		})
		.collect::<CodecResult<Vec<_>>>()?;
	Ok(Location { parents, interior })
}

fn parse_junctions(value: &Value, version: XcmVersion, empty: &str) -> CodecResult<Vec<Segment>> {
	let (key, inner) = single_entry(value)
		.ok_or_else(|| CodecError::malformed("junctions must have exactly one key"))?;
	if key == empty {
		return Ok(Vec::new());
	}

	let count: usize = key
		.strip_prefix('x')
		.and_then(|digits| digits.parse().ok())
		.filter(|count| (1..=MAX_JUNCTIONS).contains(count))
		.ok_or_else(|| CodecError::malformed(format!("unexpected junctions key '{key}'")))?;

	let items: Vec<&Value> = match inner {
		Value::Array(items) => items.iter().collect(),
		other if count == 1 => vec![other],
		_ => {
			return Err(CodecError::malformed(format!(
				"'{key}' must hold an array of junctions"
			)))
		},
	};
	if items.len() != count {
		return Err(CodecError::malformed(format!(
			"'{key}' holds {} junctions",
			items.len()
		)));
	}

	items
		.into_iter()
		.map(|item| parse_junction(item, version))
		.collect()
}

fn parse_junction(value: &Value, version: XcmVersion) -> CodecResult<Segment> {
	let (key, inner) = single_entry(value)
		.ok_or_else(|| CodecError::malformed("junction must have exactly one key"))?;

	let junction = match key.as_str() {
		"parent" if version == XcmVersion::V0 => return Ok(Segment::Parent),
		"parachain" => {
			let id = parse_uint(inner, "para id")?;
			Junction::Parachain(
				u32::try_from(id)
					.map_err(|_| CodecError::malformed(format!("para id {id} exceeds u32")))?,
			)
		},
		"accountid32" => {
			let object = as_object(inner, "accountId32")?;
			Junction::AccountId32 {
				network: parse_account_network(field(object, "network"))?,
				id: parse_hex_array(required(object, "id")?, "account id")?,
			}
		},
		"accountindex64" => {
			let object = as_object(inner, "accountIndex64")?;
			let index = parse_uint(required(object, "index")?, "account index")?;
			Junction::AccountIndex64 {
				network: parse_account_network(field(object, "network"))?,
				index: u64::try_from(index).map_err(|_| {
					CodecError::malformed(format!("account index {index} exceeds u64"))
				})?,
			}
		},
		"accountkey20" => {
			let object = as_object(inner, "accountKey20")?;
			Junction::AccountKey20 {
				network: parse_account_network(field(object, "network"))?,
				key: parse_hex_array(required(object, "key")?, "account key")?,
			}
		},
		"palletinstance" => {
			let index = parse_uint(inner, "pallet instance")?;
			Junction::PalletInstance(u8::try_from(index).map_err(|_| {
				CodecError::malformed(format!("pallet instance {index} exceeds u8"))
			})?)
		},
		"generalindex" => Junction::GeneralIndex(parse_uint(inner, "general index")?),
		"generalkey" => Junction::GeneralKey(parse_general_key(inner)?),
		"onlychild" => Junction::OnlyChild,
		"globalconsensus" => Junction::GlobalConsensus(parse_network(inner)?),
		_ => {
			return Err(CodecError::UnknownJunction {
				version: version.tag(),
				junction: key,
			})
		},
	};
	Ok(Segment::Junction(junction))
}

fn parse_general_key(value: &Value) -> CodecResult<Vec<u8>> {
	let key = match value {
		Value::Object(object) => {
			let data = parse_hex(required(object, "data")?, "general key data")?;
			let length = match field(object, "length") {
				Some(length) => parse_uint(length, "general key length")? as usize,
				None => data.len(),
			};
			if length > data.len() {
				return Err(CodecError::malformed(format!(
					"general key length {length} exceeds data of {} bytes",
					data.len()
				)));
			}
			data[..length].to_vec()
		},
		other => parse_hex(other, "general key")?,
	};
	if key.len() > MAX_GENERAL_KEY_LEN {
		return Err(CodecError::malformed(format!(
			"general key of {} bytes exceeds {}",
			key.len(),
			MAX_GENERAL_KEY_LEN
		)));
	}
	Ok(key)
}

fn parse_account_network(value: Option<&Value>) -> CodecResult<AccountNetwork> {
	match value {
		None | Some(Value::Null) => Ok(AccountNetwork::Any),
		Some(value) => {
			let is_any = single_entry(value)
				.map(|(key, _)| key == "any")
				.unwrap_or(false);
			if is_any {
				Ok(AccountNetwork::Any)
			} else {
				parse_network(value).map(AccountNetwork::Named)
			}
		},
	}
}

fn parse_network(value: &Value) -> CodecResult<NetworkId> {
	let (key, inner) =
		single_entry(value).ok_or_else(|| CodecError::malformed("network must have one key"))?;
	let network = match key.as_str() {
		"polkadot" => NetworkId::Polkadot,
		"kusama" => NetworkId::Kusama,
		"westend" => NetworkId::Westend,
		"rococo" => NetworkId::Rococo,
		"wococo" => NetworkId::Wococo,
		"bitcoincore" => NetworkId::BitcoinCore,
		"bitcoincash" => NetworkId::BitcoinCash,
		"bygenesis" => NetworkId::ByGenesis(parse_hex_array(inner, "genesis hash")?),
		"byfork" => {
			let object = as_object(inner, "byFork")?;
			let block_number = parse_uint(required(object, "blockNumber")?, "block number")?;
			NetworkId::ByFork {
				block_number: u64::try_from(block_number).map_err(|_| {
					CodecError::malformed(format!("block number {block_number} exceeds u64"))
				})?,
				block_hash: parse_hex_array(required(object, "blockHash")?, "block hash")?,
			}
		},
		"ethereum" => {
			let object = as_object(inner, "ethereum")?;
			let chain_id = parse_uint(required(object, "chainId")?, "chain id")?;
			NetworkId::Ethereum {
				chain_id: u64::try_from(chain_id).map_err(|_| {
					CodecError::malformed(format!("chain id {chain_id} exceeds u64"))
				})?,
			}
		},
		"named" => NetworkId::Named(match inner {
			Value::String(text) if text.starts_with("0x") => parse_hex(inner, "network name")?,
			Value::String(text) => text.as_bytes().to_vec(),
			_ => return Err(CodecError::malformed("named network must be a string")),
		}),
		other => return Err(CodecError::malformed(format!("unknown network '{other}'"))),
	};
	Ok(network)
}

fn junction_to_json(junction: &Junction, version: XcmVersion) -> Value {
	match junction {
		Junction::Parachain(id) => json!({ "parachain": id }),
		Junction::AccountId32 { network, id } => json!({
			"accountId32": {
				"network": account_network_to_json(network, version),
				"id": to_hex(id),
			}
		}),
		Junction::AccountIndex64 { network, index } => json!({
			"accountIndex64": {
				"network": account_network_to_json(network, version),
				"index": index,
			}
		}),
		Junction::AccountKey20 { network, key } => json!({
			"accountKey20": {
				"network": account_network_to_json(network, version),
				"key": to_hex(key),
			}
		}),
		Junction::PalletInstance(index) => json!({ "palletInstance": index }),
		Junction::GeneralIndex(index) => json!({ "generalIndex": uint_to_json(*index) }),
		Junction::GeneralKey(key) if version == XcmVersion::V3 => {
			let mut data = [0u8; MAX_GENERAL_KEY_LEN];
			data[..key.len()].copy_from_slice(key);
			json!({ "generalKey": { "length": key.len(), "data": to_hex(&data) } })
		},
		Junction::GeneralKey(key) => json!({ "generalKey": to_hex(key) }),
		Junction::OnlyChild => unit("onlyChild"),
		Junction::GlobalConsensus(network) => json!({ "globalConsensus": network_to_json(network) }),
	}
}

fn account_network_to_json(network: &AccountNetwork, version: XcmVersion) -> Value {
	match (network, version) {
		(AccountNetwork::Any, XcmVersion::V3) => Value::Null,
		(AccountNetwork::Any, _) => unit("any"),
		(AccountNetwork::Named(network), _) => network_to_json(network),
	}
}

fn network_to_json(network: &NetworkId) -> Value {
	match network {
		NetworkId::ByGenesis(hash) => json!({ "byGenesis": to_hex(hash) }),
		NetworkId::ByFork {
			block_number,
			block_hash,
		} => json!({ "byFork": { "blockNumber": block_number, "blockHash": to_hex(block_hash) } }),
		NetworkId::Polkadot => unit("polkadot"),
		NetworkId::Kusama => unit("kusama"),
		NetworkId::Westend => unit("westend"),
		NetworkId::Rococo => unit("rococo"),
		NetworkId::Wococo => unit("wococo"),
		NetworkId::Ethereum { chain_id } => json!({ "ethereum": { "chainId": chain_id } }),
		NetworkId::BitcoinCore => unit("bitcoinCore"),
		NetworkId::BitcoinCash => unit("bitcoinCash"),
		NetworkId::Named(name) => json!({ "named": to_hex(name) }),
	}
}

fn junctions_to_json(mut junctions: Vec<Value>, empty: &str) -> Value {
	match junctions.len() {
		0 => unit(empty),
		1 => json!({ "x1": junctions.remove(0) }),
		count => {
			let mut object = Map::new();
			object.insert(format!("x{count}"), Value::Array(junctions));
			Value::Object(object)
		},
	}
}

fn unit(name: &str) -> Value {
	let mut object = Map::new();
	object.insert(name.to_string(), Value::Null);
	Value::Object(object)
}

/// Values that fit in a JSON-safe u64 stay numbers, larger ones become strings
fn uint_to_json(value: u128) -> Value {
	match u64::try_from(value) {
		Ok(small) => json!(small),
		Err(_) => Value::String(value.to_string()),
	}
}

fn to_hex(bytes: &[u8]) -> String {
	format!("0x{}", hex::encode(bytes))
}

static NULL: Value = Value::Null;

/// Lower-cased key and value of a single-entry object, or a bare string
fn single_entry(value: &Value) -> Option<(String, &Value)> {
	match value {
		Value::String(name) => Some((name.to_ascii_lowercase(), &NULL)),
		Value::Object(object) if object.len() == 1 => object
			.iter()
			.next()
			.map(|(key, inner)| (key.to_ascii_lowercase(), inner)),
		_ => None,
	}
}

fn field<'a>(object: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
	object
		.iter()
		.find(|(key, _)| key.eq_ignore_ascii_case(name))
		.map(|(_, value)| value)
}

fn required<'a>(object: &'a Map<String, Value>, name: &str) -> CodecResult<&'a Value> {
	field(object, name).ok_or_else(|| CodecError::malformed(format!("missing field '{name}'")))
}

fn as_object<'a>(value: &'a Value, what: &str) -> CodecResult<&'a Map<String, Value>> {
	value
		.as_object()
		.ok_or_else(|| CodecError::malformed(format!("{what} must be an object")))
}

/// Parse a non-negative integer without going through a float
fn parse_uint(value: &Value, what: &str) -> CodecResult<u128> {
	match value {
		Value::Number(number) => number.as_u64().map(u128::from).ok_or_else(|| {
			CodecError::malformed(format!(
				"{what} {number} is not a non-negative integer that fits in u64; use a string"
			))
		}),
		Value::String(text) => {
			let digits: String = text.chars().filter(|c| *c != ',').collect();
			if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
				return Err(CodecError::malformed(format!(
					"{what} '{text}' is not a decimal integer"
				)));
			}
			digits
				.parse()
				.map_err(|_| CodecError::malformed(format!("{what} '{text}' exceeds u128")))
		},
		_ => Err(CodecError::malformed(format!("{what} must be an integer"))),
	}
}

fn parse_hex(value: &Value, what: &str) -> CodecResult<Vec<u8>> {
	let text = value
		.as_str()
		.ok_or_else(|| CodecError::malformed(format!("{what} must be a hex string")))?;
	let digits = text.strip_prefix("0x").unwrap_or(text);
	hex::decode(digits).map_err(|e| CodecError::malformed(format!("{what} is not hex: {e}")))
}

fn parse_hex_array<const N: usize>(value: &Value, what: &str) -> CodecResult<[u8; N]> {
	let bytes = parse_hex(value, what)?;
	let len = bytes.len();
	bytes
		.try_into()
		.map_err(|_| CodecError::malformed(format!("{what} must be {N} bytes, got {len}")))
}
