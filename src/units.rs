use crate::error::BindError;
use alloy_primitives::{Address, U256};
use anyhow::{anyhow, Result};
use bigdecimal::BigDecimal;
use std::str::FromStr;

/// Decimals used by every BEP2 asset on the beacon chain.
pub const BEP2_DECIMALS: u8 = 8;

/// Length of a `0x`-prefixed 20 byte hex address.
pub const BSC_ADDR_LENGTH: usize = 42;

/// Accepts `0x` + 40 hex characters regardless of checksum casing.
pub fn validate_address(what: &'static str, value: &str) -> Result<Address> {
    let value = value.trim();
    if !value.starts_with("0x") || value.len() != BSC_ADDR_LENGTH {
        return Err(BindError::InvalidAddress {
            what,
            value: value.to_string(),
        }
        .into());
    }
    Address::from_str(value).map_err(|_| {
        BindError::InvalidAddress {
            what,
            value: value.to_string(),
        }
        .into()
    })
}

pub fn parse_u256(value: &str) -> Result<U256> {
    U256::from_str(value.trim()).map_err(|err| anyhow!("invalid uint256 {value}: {err}"))
}

/// Scale an 8-decimal BEP2 amount into the contract's decimal base.
///
/// Exact when `decimals >= 8`; truncates toward zero otherwise.
pub fn convert_to_bep20_amount(amount: U256, decimals: u8) -> Result<U256> {
    if decimals >= BEP2_DECIMALS {
        let scale = pow10(u32::from(decimals - BEP2_DECIMALS))?;
        amount
            .checked_mul(scale)
            .ok_or_else(|| anyhow!("amount overflow converting {amount} to {decimals} decimals"))
    } else {
        Ok(amount / pow10(u32::from(BEP2_DECIMALS - decimals))?)
    }
}

/// Inverse of [`convert_to_bep20_amount`]. Drops any precision below 1e-8.
pub fn convert_to_bep2_amount(amount: U256, decimals: u8) -> Result<U256> {
    if decimals >= BEP2_DECIMALS {
        Ok(amount / pow10(u32::from(decimals - BEP2_DECIMALS))?)
    } else {
        let scale = pow10(u32::from(BEP2_DECIMALS - decimals))?;
        amount
            .checked_mul(scale)
            .ok_or_else(|| anyhow!("amount overflow converting {amount} to 8 decimals"))
    }
}

/// Compute 10^exp with overflow protection.
pub fn pow10(exp: u32) -> Result<U256> {
    let mut value = U256::from(1u64);
    for _ in 0..exp {
        value = value
            .checked_mul(U256::from(10u64))
            .ok_or_else(|| anyhow!("amount overflow"))?;
    }
    Ok(value)
}

/// Format a token value with the given decimals.
pub fn format_units(value: U256, decimals: u8) -> String {
    let decimals = decimals as usize;
    if decimals == 0 {
        return value.to_string();
    }
    let mut digits = value.to_string();
    if digits.len() <= decimals {
        let zeros = "0".repeat(decimals + 1 - digits.len());
        digits = format!("{zeros}{digits}");
    }
    let split = digits.len() - decimals;
    let mut out = format!("{}.{}", &digits[..split], &digits[split..]);
    while out.ends_with('0') {
        out.pop();
    }
    if out.ends_with('.') {
        out.pop();
    }
    out
}

pub fn to_decimal(value: U256, decimals: u8) -> BigDecimal {
    BigDecimal::from_str(&format_units(value, decimals)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_8_to_18_multiplies() {
        let amount = U256::from(123_456_789u64);
        let converted = convert_to_bep20_amount(amount, 18).unwrap();
        assert_eq!(converted, amount * U256::from(10_000_000_000u64));
    }

    #[test]
    fn test_convert_18_to_8_truncates() {
        let raw = U256::from(1_000_000_000_000_000_001u128);
        let bep2 = convert_to_bep2_amount(raw, 18).unwrap();
        assert_eq!(bep2, U256::from(100_000_000u64));

        // not a multiple of 10^10, so the round trip loses the remainder
        let back = convert_to_bep20_amount(bep2, 18).unwrap();
        assert_ne!(back, raw);
        assert_eq!(back, U256::from(1_000_000_000_000_000_000u128));
    }

    #[test]
    fn test_convert_below_8_decimals() {
        // 6 decimals: 8-decimal amount loses two digits
        let converted = convert_to_bep20_amount(U256::from(123_456_789u64), 6).unwrap();
        assert_eq!(converted, U256::from(1_234_567u64));
        let back = convert_to_bep2_amount(converted, 6).unwrap();
        assert_eq!(back, U256::from(123_456_700u64));
    }

    #[test]
    fn test_convert_same_decimals_is_identity() {
        let amount = U256::from(42u64);
        assert_eq!(convert_to_bep20_amount(amount, 8).unwrap(), amount);
        assert_eq!(convert_to_bep2_amount(amount, 8).unwrap(), amount);
    }

    #[test]
    fn test_validate_address() {
        assert!(validate_address("owner", "0x4E656459ed25bF986Eea1196Bc1B00665401645d").is_ok());
        // casing is not checked
        assert!(validate_address("owner", "0x4e656459ed25bf986eea1196bc1b00665401645d").is_ok());
        assert!(validate_address("owner", "0X4E656459ed25bF986Eea1196Bc1B00665401645d").is_err());
        assert!(validate_address("owner", "4E656459ed25bF986Eea1196Bc1B00665401645d00").is_err());
        assert!(validate_address("owner", "0x4E656459ed25bF986Eea1196Bc1B00665401645").is_err());
        assert!(validate_address("owner", "0x4E656459ed25bF986Eea1196Bc1B00665401645dd").is_err());
    }

    #[test]
    fn test_invalid_address_kind() {
        let err = validate_address("bep20 contract address", "0x1234").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BindError>(),
            Some(BindError::InvalidAddress { what: "bep20 contract address", .. })
        ));
    }

    #[test]
    fn test_format_units() {
        assert_eq!(format_units(U256::from(1_500_000_000_000_000_000u128), 18), "1.5");
        assert_eq!(format_units(U256::from(5u64), 8), "0.00000005");
        assert_eq!(format_units(U256::from(100u64), 0), "100");
        assert_eq!(format_units(U256::ZERO, 18), "0");
    }

    #[test]
    fn test_to_decimal() {
        let value = to_decimal(U256::from(250_000_000u64), 8);
        assert_eq!(value, BigDecimal::from_str("2.5").unwrap());
    }
}
