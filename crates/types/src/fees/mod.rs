//! Fee types, multipliers and estimates
//!
//! All amounts are integers in the fee asset's base units. Safety margins are
//! exact ratios applied with a 256-bit intermediate, so no amount ever passes
//! through a floating-point value.

pub mod errors;
pub mod request;

pub use errors::{FeeError, FeeResult, MultiplierError};
pub use request::TransferRequest;

use crate::models::format_units;
use crate::xcm::VersionedLocation;
use primitive_types::U256;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Kind of fee being estimated, each with its own safety margin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FeeType {
	MinBalance,
	PaymentInfo,
	NetworkFee,
	CrossChainFee,
}

impl FeeType {
	pub const ALL: [FeeType; 4] = [
		FeeType::MinBalance,
		FeeType::PaymentInfo,
		FeeType::NetworkFee,
		FeeType::CrossChainFee,
	];
}

impl fmt::Display for FeeType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			FeeType::MinBalance => "minBalance",
			FeeType::PaymentInfo => "paymentInfo",
			FeeType::NetworkFee => "networkFee",
			FeeType::CrossChainFee => "crossChainFee",
		};
		f.write_str(name)
	}
}

/// An exact rational multiplier such as `6/5` for `1.2`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Multiplier {
	numerator: u128,
	denominator: u128,
}

impl Multiplier {
	pub const ONE: Multiplier = Multiplier {
		numerator: 1,
		denominator: 1,
	};

	/// Build a reduced ratio
	pub fn new(numerator: u128, denominator: u128) -> Result<Self, MultiplierError> {
		if denominator == 0 {
			return Err(MultiplierError::ZeroDenominator);
		}
		let divisor = gcd(numerator, denominator).max(1);
		Ok(Self {
			numerator: numerator / divisor,
			denominator: denominator / divisor,
		})
	}

	pub fn numerator(&self) -> u128 {
		self.numerator
	}

	pub fn denominator(&self) -> u128 {
		self.denominator
	}

	/// Multiply `amount` by the numerator, then integer-divide by the denominator
	///
	/// Fails only when the product does not fit back into `u128`.
	pub fn apply(&self, amount: u128) -> FeeResult<u128> {
		if self.denominator == 0 {
			return Err(FeeError::AdjustmentDegraded {
				reason: "multiplier denominator is zero".to_string(),
			});
		}
		let numerator = U256::from(self.numerator);
		let denominator = U256::from(self.denominator);
		let adjusted = U256::from(amount) * numerator / denominator;
		if adjusted > U256::from(u128::MAX) {
			return Err(FeeError::AdjustmentDegraded {
				reason: format!("{amount} x {self} overflows u128"),
			});
		}
		Ok(adjusted.as_u128())
	}
}

impl FromStr for Multiplier {
	type Err = MultiplierError;

	/// Parse a decimal such as `"1.2"` or a ratio such as `"6/5"`
	fn from_str(value: &str) -> Result<Self, Self::Err> {
		let text = value.trim();
		let invalid = |reason: &str| MultiplierError::Invalid {
			value: value.to_string(),
			reason: reason.to_string(),
		};

		if let Some((numerator, denominator)) = text.split_once('/') {
			let numerator = numerator
				.trim()
				.parse()
				.map_err(|_| invalid("numerator is not an integer"))?;
			let denominator = denominator
				.trim()
				.parse()
				.map_err(|_| invalid("denominator is not an integer"))?;
			return Multiplier::new(numerator, denominator);
		}

		let (whole, fraction) = text.split_once('.').unwrap_or((text, ""));
		let digits = format!("{whole}{fraction}");
		if whole.is_empty() || digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
			return Err(invalid("expected a decimal number"));
		}
		if fraction.len() > 18 {
			return Err(invalid("too many decimal places"));
		}
		let numerator: u128 = digits.parse().map_err(|_| invalid("value too large"))?;
		let denominator = 10u128.pow(fraction.len() as u32);
		Multiplier::new(numerator, denominator)
	}
}

impl fmt::Display for Multiplier {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{}", self.numerator, self.denominator)
	}
}

impl Serialize for Multiplier {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.collect_str(self)
	}
}

impl<'de> Deserialize<'de> for Multiplier {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		let text = String::deserialize(deserializer)?;
		text.parse().map_err(serde::de::Error::custom)
	}
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
	while b != 0 {
		let rest = a % b;
		a = b;
		b = rest;
	}
	a
}

/// Safety margin per fee type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeMultipliers {
	pub min_balance: Multiplier,
	pub payment_info: Multiplier,
	pub network_fee: Multiplier,
	pub cross_chain_fee: Multiplier,
}

impl FeeMultipliers {
	pub fn get(&self, fee_type: FeeType) -> Multiplier {
		match fee_type {
			FeeType::MinBalance => self.min_balance,
			FeeType::PaymentInfo => self.payment_info,
			FeeType::NetworkFee => self.network_fee,
			FeeType::CrossChainFee => self.cross_chain_fee,
		}
	}
}

impl Default for FeeMultipliers {
	/// 1.1, 1.3, 1.2 and 1.5
	fn default() -> Self {
		Self {
			min_balance: Multiplier {
				numerator: 11,
				denominator: 10,
			},
			payment_info: Multiplier {
				numerator: 13,
				denominator: 10,
			},
			network_fee: Multiplier {
				numerator: 6,
				denominator: 5,
			},
			cross_chain_fee: Multiplier {
				numerator: 3,
				denominator: 2,
			},
		}
	}
}

/// Whether the safety margin was applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum FeeStatus {
	Adjusted,
	/// The margin could not be applied; `amount` is the unadjusted base fee
	Degraded { reason: String },
}

/// The asset a fee is denominated in
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeAsset {
	pub symbol: String,
	pub decimals: u8,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub location: Option<VersionedLocation>,
}

/// A fee estimate in base units of `asset`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeEstimate {
	#[serde(serialize_with = "serialize_u128_string")]
	pub amount: u128,
	#[serde(serialize_with = "serialize_u128_string")]
	pub base_amount: u128,
	pub fee_type: FeeType,
	pub multiplier: Multiplier,
	pub asset: FeeAsset,
	#[serde(flatten)]
	pub status: FeeStatus,
}

impl FeeEstimate {
	pub fn is_degraded(&self) -> bool {
		matches!(self.status, FeeStatus::Degraded { .. })
	}

	/// Human-readable amount, e.g. `"0.0123"`
	pub fn formatted(&self) -> String {
		format_units(self.amount, self.asset.decimals)
	}
}

fn serialize_u128_string<S>(value: &u128, serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	serializer.collect_str(value)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_decimal_multiplier() {
		let multiplier: Multiplier = "1.2".parse().unwrap();
		assert_eq!(multiplier.numerator(), 6);
		assert_eq!(multiplier.denominator(), 5);

		let ratio: Multiplier = "3/2".parse().unwrap();
		assert_eq!(ratio, "1.5".parse::<Multiplier>().unwrap());
		assert_eq!("2".parse::<Multiplier>().unwrap(), Multiplier::new(2, 1).unwrap());
	}

	#[test]
	fn test_parse_invalid_multiplier() {
		assert!("".parse::<Multiplier>().is_err());
		assert!("abc".parse::<Multiplier>().is_err());
		assert!(".5".parse::<Multiplier>().is_err());
		assert!("-1.2".parse::<Multiplier>().is_err());
		assert_eq!(
			"1/0".parse::<Multiplier>(),
			Err(MultiplierError::ZeroDenominator)
		);
	}

	#[test]
	fn test_network_fee_is_exact() {
		let multiplier: Multiplier = "1.2".parse().unwrap();
		assert_eq!(multiplier.apply(1_000_000_000).unwrap(), 1_200_000_000);
	}

	#[test]
	fn test_no_float_precision_loss() {
		// 2^53 + 1 is not representable as f64
		let base = 9_007_199_254_740_993u128;
		let multiplier: Multiplier = "1.2".parse().unwrap();
		assert_eq!(multiplier.apply(base).unwrap(), 10_808_639_105_689_191);

		let one: Multiplier = "1".parse().unwrap();
		assert_eq!(one.apply(base).unwrap(), base);
	}

	#[test]
	fn test_truncates_fractional_units() {
		let multiplier: Multiplier = "1.1".parse().unwrap();
		assert_eq!(multiplier.apply(1).unwrap(), 1);
		assert_eq!(multiplier.apply(9).unwrap(), 9);
		assert_eq!(multiplier.apply(10).unwrap(), 11);
		assert_eq!(multiplier.apply(0).unwrap(), 0);
	}

	#[test]
	fn test_large_amount_without_overflow() {
		let multiplier: Multiplier = "1.5".parse().unwrap();
		let base = u128::MAX / 2;
		assert_eq!(multiplier.apply(base).unwrap(), base + base / 2);
	}

	#[test]
	fn test_overflow_is_reported() {
		let multiplier: Multiplier = "2".parse().unwrap();
		assert!(matches!(
			multiplier.apply(u128::MAX),
			Err(FeeError::AdjustmentDegraded { .. })
		));
	}

	#[test]
	fn test_default_multipliers() {
		let multipliers = FeeMultipliers::default();
		assert_eq!(multipliers.get(FeeType::MinBalance), "1.1".parse::<Multiplier>().unwrap());
		assert_eq!(multipliers.get(FeeType::PaymentInfo), "1.3".parse::<Multiplier>().unwrap());
		assert_eq!(multipliers.get(FeeType::NetworkFee), "1.2".parse::<Multiplier>().unwrap());
		assert_eq!(multipliers.get(FeeType::CrossChainFee), "1.5".parse::<Multiplier>().unwrap());
	}

	#[test]
	fn test_estimate_serialization() {
		let estimate = FeeEstimate {
			amount: 1_200_000_000,
			base_amount: 1_000_000_000,
			fee_type: FeeType::NetworkFee,
			multiplier: "1.2".parse().unwrap(),
			asset: FeeAsset {
				symbol: "DOT".to_string(),
				decimals: 10,
				location: None,
			},
			status: FeeStatus::Adjusted,
		};
		let value = serde_json::to_value(&estimate).unwrap();
		assert_eq!(value["amount"], "1200000000");
		assert_eq!(value["feeType"], "networkFee");
		assert_eq!(value["multiplier"], "6/5");
		assert_eq!(value["status"], "adjusted");
		assert_eq!(estimate.formatted(), "0.12");
		assert!(!estimate.is_degraded());
	}
}
