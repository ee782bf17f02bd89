//! Local input validation.
//!
//! Everything here is pure: a failure is an `InvalidInput` that is resolved
//! before any node, indexer or signer is contacted.

use crate::core::errors::{TxFlowError, TxResult};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use sha2::{Digest, Sha512_256};
use std::str::FromStr;

/// Ledger address length in characters (base32, no padding).
pub const ADDRESS_LEN: usize = 58;
pub const PUBLIC_KEY_LEN: usize = 32;
pub const CHECKSUM_LEN: usize = 4;

/// Decimal places of the native currency.
pub const ALGO_DECIMALS: u32 = 6;
/// Minor units per whole ALGO.
pub const MICROALGOS_PER_ALGO: u64 = 1_000_000;

const BASE32_ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// RFC 4648 base32 without padding.
pub(crate) fn base32_encode(data: &[u8]) -> String {
    let mut out = String::with_capacity((data.len() * 8 + 4) / 5);
    let mut buffer: u32 = 0;
    let mut bits = 0u32;

    for &byte in data {
        buffer = (buffer << 8) | byte as u32;
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(BASE32_ALPHABET[((buffer >> bits) & 0x1f) as usize] as char);
        }
        buffer &= (1 << bits) - 1;
    }
    if bits > 0 {
        out.push(BASE32_ALPHABET[((buffer << (5 - bits)) & 0x1f) as usize] as char);
    }
    out
}

/// Inverse of [`base32_encode`]. Rejects foreign characters and non-zero
/// trailing bits so that every byte string has exactly one encoding.
pub(crate) fn base32_decode(input: &str) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(input.len() * 5 / 8);
    let mut buffer: u32 = 0;
    let mut bits = 0u32;

    for ch in input.bytes() {
        let value = BASE32_ALPHABET.iter().position(|&c| c == ch)? as u32;
        buffer = (buffer << 5) | value;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push((buffer >> bits) as u8);
            buffer &= (1 << bits) - 1;
        }
    }

    if bits >= 5 || buffer != 0 {
        return None;
    }
    Some(out)
}

/// Last four bytes of SHA-512/256 over the public key.
pub(crate) fn address_checksum(public_key: &[u8; PUBLIC_KEY_LEN]) -> [u8; CHECKSUM_LEN] {
    let digest = Sha512_256::digest(public_key);
    let mut checksum = [0u8; CHECKSUM_LEN];
    checksum.copy_from_slice(&digest[digest.len() - CHECKSUM_LEN..]);
    checksum
}

/// Validates a ledger address and returns the public key it encodes.
pub fn validate_address(address: &str) -> TxResult<[u8; PUBLIC_KEY_LEN]> {
    if address.len() != ADDRESS_LEN {
        return Err(TxFlowError::invalid_input(format!(
            "address must be {} characters, got {}",
            ADDRESS_LEN,
            address.len()
        )));
    }
    let decoded = base32_decode(address)
        .ok_or_else(|| TxFlowError::invalid_input("address is not valid base32"))?;
    if decoded.len() != PUBLIC_KEY_LEN + CHECKSUM_LEN {
        return Err(TxFlowError::invalid_input("address decodes to the wrong length"));
    }

    let mut public_key = [0u8; PUBLIC_KEY_LEN];
    public_key.copy_from_slice(&decoded[..PUBLIC_KEY_LEN]);
    if address_checksum(&public_key)[..] != decoded[PUBLIC_KEY_LEN..] {
        return Err(TxFlowError::invalid_input("address checksum mismatch"));
    }
    Ok(public_key)
}

/// Asset identifiers are strictly positive.
pub fn check_asset_id(asset_id: i64) -> TxResult<u64> {
    if asset_id <= 0 {
        return Err(TxFlowError::invalid_input(format!(
            "asset id must be positive, got {}",
            asset_id
        )));
    }
    Ok(asset_id as u64)
}

/// Asset amounts are non-negative integers in the asset's base unit.
pub fn check_asset_amount(amount: i64) -> TxResult<u64> {
    if amount < 0 {
        return Err(TxFlowError::invalid_input(format!(
            "amount must not be negative, got {}",
            amount
        )));
    }
    Ok(amount as u64)
}

/// Parses an integer form field such as an asset id or asset amount.
pub fn parse_integer_field(field: &str, raw: &str) -> TxResult<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TxFlowError::invalid_input(format!("{} is required", field)));
    }
    trimmed
        .parse::<i64>()
        .map_err(|_| TxFlowError::invalid_input(format!("{} must be a whole number: {:?}", field, raw)))
}

/// Parses a decimal amount in whole ALGO. Exponent notation is accepted.
pub fn parse_algo_amount(raw: &str) -> TxResult<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TxFlowError::invalid_input("amount is required"));
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
        .or_else(|| parse_tiny_scientific(trimmed))
        .ok_or_else(|| TxFlowError::invalid_input(format!("amount is not a number: {:?}", raw)))
}

/// Exponent-form values past the 28-digit scale `from_scientific` accepts.
/// Digits below that scale are truncated, so `1e-40` reads as zero.
fn parse_tiny_scientific(raw: &str) -> Option<Decimal> {
    let (mantissa, exponent) = raw.split_once(|c| c == 'e' || c == 'E')?;
    let mut value = Decimal::from_str(mantissa).ok()?;
    let exponent: i64 = exponent.parse().ok()?;
    if exponent >= 0 {
        return None;
    }
    for _ in 0..exponent.unsigned_abs() {
        if value.is_zero() {
            break;
        }
        value /= Decimal::TEN;
    }
    Some(if value.is_zero() { Decimal::ZERO } else { value })
}

/// Converts whole ALGO to microalgos, truncating below the minimum
/// denomination.
pub fn algos_to_micro(amount: Decimal) -> TxResult<u64> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(TxFlowError::invalid_input(format!(
            "amount must not be negative, got {}",
            amount
        )));
    }
    let truncated = amount.round_dp_with_strategy(ALGO_DECIMALS, RoundingStrategy::ToZero);
    let micro = truncated
        .checked_mul(Decimal::from(MICROALGOS_PER_ALGO))
        .ok_or_else(|| TxFlowError::invalid_input("amount is too large"))?;
    if !micro.fract().is_zero() {
        return Err(TxFlowError::invalid_input("amount is finer than one microalgo"));
    }
    micro
        .to_u64()
        .ok_or_else(|| TxFlowError::invalid_input("amount does not fit in microalgos"))
}

/// Converts microalgos back to whole ALGO for display.
pub fn micro_to_algos(micro: u64) -> Decimal {
    Decimal::from(micro) / Decimal::from(MICROALGOS_PER_ALGO)
}

/// Notes are raw bytes on the ledger with a hard size cap.
pub fn validate_note(note: &str, max_bytes: usize) -> TxResult<()> {
    if note.len() > max_bytes {
        return Err(TxFlowError::invalid_input(format!(
            "note is {} bytes, limit is {}",
            note.len(),
            max_bytes
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ZERO_ADDRESS: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAY5HFKQ";

    #[test]
    fn test_zero_address_round_trip() {
        let public_key = [0u8; PUBLIC_KEY_LEN];
        let mut raw = public_key.to_vec();
        raw.extend_from_slice(&address_checksum(&public_key));
        assert_eq!(base32_encode(&raw), ZERO_ADDRESS);
        assert_eq!(validate_address(ZERO_ADDRESS).unwrap(), public_key);
    }

    #[test]
    fn test_validate_address_rejects_bad_checksum() {
        let tampered = format!("{}A", &ZERO_ADDRESS[..ADDRESS_LEN - 1]);
        assert!(matches!(
            validate_address(&tampered),
            Err(TxFlowError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_validate_address_rejects_lowercase_and_length() {
        assert!(validate_address(&ZERO_ADDRESS.to_lowercase()).is_err());
        assert!(validate_address("ADDR1").is_err());
        assert!(validate_address("").is_err());
    }

    #[test]
    fn test_check_asset_id_edges() {
        assert_eq!(check_asset_id(1).unwrap(), 1);
        assert!(check_asset_id(0).is_err());
        assert!(check_asset_id(-7).is_err());
    }

    #[test]
    fn test_parse_integer_field() {
        assert_eq!(parse_integer_field("asset id", " 31566704 ").unwrap(), 31566704);
        assert!(parse_integer_field("asset id", "").is_err());
        assert!(parse_integer_field("asset id", "12abc").is_err());
        assert!(parse_integer_field("amount", "1.5").is_err());
    }

    #[test]
    fn test_algos_to_micro_scenarios() {
        assert_eq!(algos_to_micro(parse_algo_amount("1.5").unwrap()).unwrap(), 1_500_000);
        assert_eq!(algos_to_micro(parse_algo_amount("0.001").unwrap()).unwrap(), 1_000);
        assert_eq!(algos_to_micro(parse_algo_amount("0").unwrap()).unwrap(), 0);
        // Truncated, not rounded.
        assert_eq!(algos_to_micro(parse_algo_amount("0.0000019").unwrap()).unwrap(), 1);
        assert_eq!(algos_to_micro(parse_algo_amount("1e-3").unwrap()).unwrap(), 1_000);
    }

    #[test]
    fn test_tiny_exponent_truncates_to_zero() {
        assert_eq!(algos_to_micro(parse_algo_amount("1e-40").unwrap()).unwrap(), 0);
        assert_eq!(algos_to_micro(parse_algo_amount("9.99E-31").unwrap()).unwrap(), 0);
        assert_eq!(algos_to_micro(parse_algo_amount("-1e-40").unwrap()).unwrap(), 0);
        assert!(parse_algo_amount("1e-").is_err());
        assert!(parse_algo_amount("e-40").is_err());
    }

    #[test]
    fn test_algos_to_micro_rejects_negative_and_garbage() {
        assert!(algos_to_micro(parse_algo_amount("-0.5").unwrap()).is_err());
        assert!(parse_algo_amount("one").is_err());
        assert!(parse_algo_amount("  ").is_err());
    }

    #[test]
    fn test_micro_to_algos() {
        assert_eq!(micro_to_algos(2_500_000), Decimal::new(25, 1));
    }

    #[test]
    fn test_validate_note_limit() {
        assert!(validate_note(&"x".repeat(1024), 1024).is_ok());
        assert!(validate_note(&"x".repeat(1025), 1024).is_err());
    }

    proptest! {
        #[test]
        fn prop_base32_round_trip(data in proptest::collection::vec(any::<u8>(), 0..64)) {
            let encoded = base32_encode(&data);
            prop_assert_eq!(base32_decode(&encoded), Some(data));
        }

        #[test]
        fn prop_any_public_key_encodes_to_valid_address(key in any::<[u8; 32]>()) {
            let mut raw = key.to_vec();
            raw.extend_from_slice(&address_checksum(&key));
            let address = base32_encode(&raw);
            prop_assert_eq!(address.len(), ADDRESS_LEN);
            prop_assert_eq!(validate_address(&address).unwrap(), key);
        }

        #[test]
        fn prop_whole_micro_amounts_convert_exactly(micro in 0u64..10_000_000_000_000u64) {
            let algos = Decimal::from(micro) / Decimal::from(MICROALGOS_PER_ALGO);
            prop_assert_eq!(algos_to_micro(algos).unwrap(), micro);
        }
    }
}
