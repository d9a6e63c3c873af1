//! Shared domain models used across the registry, codec and fee components

pub mod account;
pub mod amount;

pub use account::{ss58_decode, ss58_encode, AccountError, AccountKind, Recipient};
pub use amount::{format_units, parse_units, Amount, AmountError};
