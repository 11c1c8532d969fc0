//! Conversions between field elements, u256 token amounts and ether units.

use alloy::primitives::utils::{format_ether, parse_ether};
use alloy::primitives::U256;
use anyhow::Result;
use starknet::core::types::Felt;

/// Parses a hex string (with or without `0x`) into a field element.
pub fn parse_hex_felt(value: &str) -> Result<Felt> {
    let trimmed = value.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(anyhow::anyhow!("Not a hex value: {:?}", value));
    }
    Felt::from_hex(&format!("0x{}", digits))
        .map_err(|e| anyhow::anyhow!("Hex value {:?} is not a field element: {}", value, e))
}

pub fn felt_to_u128(value: Felt) -> Result<u128> {
    let bytes = value.to_bytes_be();
    if bytes[..16].iter().any(|b| *b != 0) {
        return Err(anyhow::anyhow!("Value {:#x} does not fit in u128", value));
    }
    let mut low = [0u8; 16];
    low.copy_from_slice(&bytes[16..]);
    Ok(u128::from_be_bytes(low))
}

/// Splits a u256 into the `(low, high)` felt pair Cairo uses for `u256`.
pub fn u256_to_felts(amount: U256) -> (Felt, Felt) {
    let low: u128 = (amount & U256::from(u128::MAX)).to::<u128>();
    let high: u128 = (amount >> 128usize).to::<u128>();
    (Felt::from(low), Felt::from(high))
}

pub fn u256_from_felts(low: Felt, high: Felt) -> Result<U256> {
    let low = felt_to_u128(low)?;
    let high = felt_to_u128(high)?;
    Ok((U256::from(high) << 128) | U256::from(low))
}

/// Converts a decimal token amount such as `"100"` or `"12.5"` to its
/// 18-decimal smallest unit.
pub fn ether_to_wei(amount: &str) -> Result<U256> {
    parse_ether(amount.trim())
        .map_err(|e| anyhow::anyhow!("Invalid token amount {:?}: {}", amount, e))
}

pub fn wei_to_ether(amount: U256) -> String {
    format_ether(amount)
}

pub fn wei_to_gwei(amount: u128) -> f64 {
    amount as f64 / 1e9
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_felt_accepts_both_cases_and_prefixes() {
        let a = parse_hex_felt("0xAB").unwrap();
        let b = parse_hex_felt("ab").unwrap();
        let c = parse_hex_felt(" 0x00ab ").unwrap();
        assert_eq!(a, Felt::from(0xabu64));
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn test_parse_hex_felt_rejects_garbage() {
        assert!(parse_hex_felt("").is_err());
        assert!(parse_hex_felt("0x").is_err());
        assert!(parse_hex_felt("0xzz").is_err());
        assert!(parse_hex_felt("12:34").is_err());
    }

    #[test]
    fn test_u256_split_keeps_high_bits() {
        let amount = (U256::from(3u8) << 128) + U256::from(7u8);
        let (low, high) = u256_to_felts(amount);
        assert_eq!(low, Felt::from(7u8));
        assert_eq!(high, Felt::from(3u8));
        assert_eq!(u256_from_felts(low, high).unwrap(), amount);
    }

    #[test]
    fn test_ether_to_wei_handles_fractions() {
        assert_eq!(
            ether_to_wei("100").unwrap(),
            U256::from(100_000_000_000_000_000_000u128)
        );
        assert_eq!(
            ether_to_wei("12.5").unwrap(),
            U256::from(12_500_000_000_000_000_000u128)
        );
        assert!(ether_to_wei("ten").is_err());
    }

    #[test]
    fn test_felt_to_u128_overflow() {
        let big = Felt::from(u128::MAX) + Felt::ONE;
        assert!(felt_to_u128(big).is_err());
        assert_eq!(felt_to_u128(Felt::from(55u8)).unwrap(), 55);
    }
}
