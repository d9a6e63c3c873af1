//! Integer token amounts carried as decimal strings

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
	#[error("Amount cannot be empty")]
	Empty,

	#[error("Invalid amount '{value}': must contain only digits")]
	InvalidDigits { value: String },

	#[error("Amount '{value}' does not fit in 128 bits")]
	Overflow { value: String },

	#[error("Amount '{value}' has more than {decimals} decimal places")]
	TooManyDecimals { value: String, decimals: u8 },
}

/// Non-negative integer amount in base units, stored as a decimal string
///
/// Registries publish balances such as existential deposits as strings so
/// large values survive JSON tooling that would round them through `f64`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Amount(String);

impl Amount {
	pub fn new(value: impl Into<String>) -> Result<Self, AmountError> {
		let amount = Self(value.into());
		amount.validate()?;
		Ok(amount)
	}

	pub fn zero() -> Self {
		Self("0".to_string())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn as_u128(&self) -> Result<u128, AmountError> {
		self.0.parse().map_err(|_| AmountError::Overflow {
			value: self.0.clone(),
		})
	}

	pub fn is_zero(&self) -> bool {
		self.0.chars().all(|c| c == '0')
	}

	pub fn validate(&self) -> Result<(), AmountError> {
		if self.0.is_empty() {
			return Err(AmountError::Empty);
		}
		if !self.0.chars().all(|c| c.is_ascii_digit()) {
			return Err(AmountError::InvalidDigits {
				value: self.0.clone(),
			});
		}
		Ok(())
	}
}

impl std::fmt::Display for Amount {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl From<u128> for Amount {
	fn from(value: u128) -> Self {
		Self(value.to_string())
	}
}

impl From<u64> for Amount {
	fn from(value: u64) -> Self {
		Self(value.to_string())
	}
}

impl serde::Serialize for Amount {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		serializer.serialize_str(&self.0)
	}
}

impl<'de> serde::Deserialize<'de> for Amount {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		// Integers are accepted as JSON numbers too, but never floats
		let value = serde_json::Value::deserialize(deserializer)?;
		let text = match value {
			serde_json::Value::String(text) => text,
			serde_json::Value::Number(number) => match number.as_u64() {
				Some(value) => value.to_string(),
				None => {
					return Err(serde::de::Error::custom(format!(
						"amount {number} must be a non-negative integer; use a string for large values"
					)))
				},
			},
			other => {
				return Err(serde::de::Error::custom(format!(
					"amount must be a string or integer, got {other}"
				)))
			},
		};
		Amount::new(text).map_err(serde::de::Error::custom)
	}
}

/// Render base units as a decimal string with `decimals` fractional digits
///
/// Trailing fractional zeros are trimmed: `format_units(1_500_000, 6) == "1.5"`.
pub fn format_units(amount: u128, decimals: u8) -> String {
	if decimals == 0 {
		return amount.to_string();
	}
	let digits = format!("{:0>width$}", amount, width = decimals as usize + 1);
	let (whole, fraction) = digits.split_at(digits.len() - decimals as usize);
	let fraction = fraction.trim_end_matches('0');
	if fraction.is_empty() {
		whole.to_string()
	} else {
		format!("{whole}.{fraction}")
	}
}

/// Parse a human decimal string into base units without floating point
pub fn parse_units(text: &str, decimals: u8) -> Result<u128, AmountError> {
	let text = text.trim();
	if text.is_empty() {
		return Err(AmountError::Empty);
	}
	let (whole, fraction) = match text.split_once('.') {
		Some((whole, fraction)) => (whole, fraction),
		None => (text, ""),
	};
	let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
	if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction)
	{
		return Err(AmountError::InvalidDigits {
			value: text.to_string(),
		});
	}

	let fraction = fraction.trim_end_matches('0');
	if fraction.len() > decimals as usize {
		return Err(AmountError::TooManyDecimals {
			value: text.to_string(),
			decimals,
		});
	}

	let overflow = || AmountError::Overflow {
		value: text.to_string(),
	};
	let scale = 10u128.checked_pow(decimals as u32).ok_or_else(overflow)?;
	let whole: u128 = if whole.is_empty() {
		0
	} else {
		whole.parse().map_err(|_| overflow())?
	};
	let fraction_units: u128 = if fraction.is_empty() {
		0
	} else {
		let padded = format!("{:0<width$}", fraction, width = decimals as usize);
		padded.parse().map_err(|_| overflow())?
	};

	whole
		.checked_mul(scale)
		.and_then(|units| units.checked_add(fraction_units))
		.ok_or_else(overflow)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_amount_validation() {
		assert!(Amount::new("1000000000").is_ok());
		assert_eq!(Amount::new(""), Err(AmountError::Empty));
		assert!(matches!(
			Amount::new("1.5"),
			Err(AmountError::InvalidDigits { .. })
		));
		assert!(matches!(
			Amount::new("-1"),
			Err(AmountError::InvalidDigits { .. })
		));
	}

	#[test]
	fn test_amount_as_u128() {
		assert_eq!(Amount::new("100000000").unwrap().as_u128().unwrap(), 100_000_000);
		let huge = Amount::new("340282366920938463463374607431768211456").unwrap();
		assert!(matches!(huge.as_u128(), Err(AmountError::Overflow { .. })));
		assert!(Amount::new("000").unwrap().is_zero());
	}

	#[test]
	fn test_amount_serde() {
		let from_string: Amount = serde_json::from_str("\"10000000000\"").unwrap();
		let from_number: Amount = serde_json::from_str("10000000000").unwrap();
		assert_eq!(from_string, from_number);
		assert_eq!(serde_json::to_string(&from_string).unwrap(), "\"10000000000\"");

		assert!(serde_json::from_str::<Amount>("1.5").is_err());
		assert!(serde_json::from_str::<Amount>("-3").is_err());
	}

	#[test]
	fn test_format_units() {
		assert_eq!(format_units(1_500_000, 6), "1.5");
		assert_eq!(format_units(10_000_000_000, 10), "1");
		assert_eq!(format_units(1, 18), "0.000000000000000001");
		assert_eq!(format_units(42, 0), "42");
		assert_eq!(format_units(0, 12), "0");
	}

	#[test]
	fn test_parse_units() {
		assert_eq!(parse_units("1.5", 6).unwrap(), 1_500_000);
		assert_eq!(parse_units("0.000000000000000001", 18).unwrap(), 1);
		assert_eq!(parse_units("12", 10).unwrap(), 120_000_000_000);
		assert_eq!(parse_units(".25", 2).unwrap(), 25);
		assert_eq!(parse_units("1.10", 1).unwrap(), 11);
		assert!(matches!(
			parse_units("1.123", 2),
			Err(AmountError::TooManyDecimals { .. })
		));
		assert!(matches!(
			parse_units("1e5", 2),
			Err(AmountError::InvalidDigits { .. })
		));
		assert!(matches!(parse_units(".", 2), Err(AmountError::InvalidDigits { .. })));
	}

	#[test]
	fn test_parse_format_precision_beyond_f64() {
		let units = parse_units("9007199254.740993", 6).unwrap();
		assert_eq!(units, 9_007_199_254_740_993);
		assert_eq!(format_units(units, 6), "9007199254.740993");
	}
}
