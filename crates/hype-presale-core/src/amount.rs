use alloy::primitives::utils::{parse_units, ParseUnits};
use alloy::primitives::U256;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,
    #[error("amount is not a decimal number: {0}")]
    NotNumeric(String),
    #[error("amount must be positive")]
    NotPositive,
    #[error("amount has more than {max} decimal places")]
    TooManyDecimals { max: u8 },
    #[error("amount is too large")]
    Overflow,
}

/// Parses a user-entered native amount into the chain's smallest unit.
///
/// Accepts plain decimals (`1`, `1.5`, `.5`, `2.`); rejects signs, exponents,
/// hex and anything with more fractional digits than `decimals`.
pub fn parse_native_amount(raw: &str, decimals: u8) -> Result<U256, AmountError> {
    let amount = raw.trim();
    if amount.is_empty() {
        return Err(AmountError::Empty);
    }
    if amount.starts_with('-') {
        return Err(AmountError::NotPositive);
    }

    let (whole, fraction) = match amount.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (amount, ""),
    };
    let digits_only = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !digits_only(whole) || !digits_only(fraction) || (whole.is_empty() && fraction.is_empty())
    {
        return Err(AmountError::NotNumeric(amount.to_owned()));
    }
    if fraction.len() > usize::from(decimals) {
        return Err(AmountError::TooManyDecimals { max: decimals });
    }

    let whole = if whole.is_empty() { "0" } else { whole };
    let normalized = if fraction.is_empty() {
        whole.to_owned()
    } else {
        format!("{whole}.{fraction}")
    };
    let value = match parse_units(&normalized, decimals).map_err(|_| AmountError::Overflow)? {
        ParseUnits::U256(value) => value,
        ParseUnits::I256(_) => return Err(AmountError::NotPositive),
    };
    if value.is_zero() {
        return Err(AmountError::NotPositive);
    }
    Ok(value)
}
