//! Field element helpers
//!
//! Every value crossing the circuit or contract boundary is an unsigned
//! big-endian integer modulo the BN254 scalar field (Grumpkin's base field).
//! Noir emits them as `0x`-prefixed hex; nargo consumes them as decimal.

use std::sync::LazyLock;

use ark_ff::{BigInteger, PrimeField};
use ark_grumpkin::Fq;
use num_bigint::BigUint;

use crate::error::CryptoError;

/// Modulus of the base field, `p`
pub static FIELD_MODULUS: LazyLock<BigUint> = LazyLock::new(|| BigUint::from(Fq::MODULUS));

/// Width of one field element on the wire
pub const FIELD_BYTES: usize = 32;

/// Parse a field element given as `0x` hex or as a decimal string.
///
/// Values are reduced modulo `p`. Signs, empty strings and anything wider
/// than 32 bytes are rejected.
pub fn parse_field_element(s: &str) -> Result<BigUint, CryptoError> {
    let s = s.trim();
    let value = if let Some(hex_str) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        if hex_str.is_empty() || !hex_str.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CryptoError::InvalidFieldElement(s.to_string()));
        }
        BigUint::parse_bytes(hex_str.as_bytes(), 16)
    } else {
        if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
            return Err(CryptoError::InvalidFieldElement(s.to_string()));
        }
        BigUint::parse_bytes(s.as_bytes(), 10)
    }
    .ok_or_else(|| CryptoError::InvalidFieldElement(s.to_string()))?;

    if value.bits() > (FIELD_BYTES * 8) as u64 {
        return Err(CryptoError::InvalidFieldElement(format!(
            "{s} is wider than {FIELD_BYTES} bytes"
        )));
    }

    Ok(value % &*FIELD_MODULUS)
}

/// Parse a field element straight into `Fq`
pub fn parse_fq(s: &str) -> Result<Fq, CryptoError> {
    parse_field_element(s).map(Fq::from)
}

/// Big-endian 32-byte encoding of an integer known to fit the field
pub fn biguint_to_be_bytes(value: &BigUint) -> [u8; FIELD_BYTES] {
    let bytes = value.to_bytes_be();
    let mut out = [0u8; FIELD_BYTES];
    let start = FIELD_BYTES.saturating_sub(bytes.len());
    out[start..].copy_from_slice(&bytes[bytes.len().saturating_sub(FIELD_BYTES)..]);
    out
}

/// Big-endian 32-byte encoding of a field element
pub fn fq_to_be_bytes(value: &Fq) -> [u8; FIELD_BYTES] {
    let bytes = value.into_bigint().to_bytes_be();
    let mut out = [0u8; FIELD_BYTES];
    out.copy_from_slice(&bytes);
    out
}

/// Interpret 32 big-endian bytes as a field element (reduced mod `p`)
pub fn fq_from_be_bytes(bytes: &[u8; FIELD_BYTES]) -> Fq {
    Fq::from_be_bytes_mod_order(bytes)
}

/// Decimal text of a field element, the format nargo expects
pub fn fq_to_decimal(value: &Fq) -> String {
    BigUint::from(value.into_bigint()).to_string()
}

/// `0x`-prefixed, zero-padded hex of a field element, the format bb emits
pub fn fq_to_hex(value: &Fq) -> String {
    format!("0x{}", hex::encode(fq_to_be_bytes(value)))
}

/// Decimal text of 32 big-endian bytes, without reduction
pub fn be_bytes_to_decimal(bytes: &[u8]) -> String {
    BigUint::from_bytes_be(bytes).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_and_decimal_agree() {
        let from_hex = parse_field_element("0x0d").unwrap();
        let from_dec = parse_field_element("13").unwrap();
        assert_eq!(from_hex, from_dec);
        assert_eq!(from_hex, BigUint::from(13u32));
    }

    #[test]
    fn test_parse_reduces_modulo_p() {
        let p_plus_one = &*FIELD_MODULUS + 1u32;
        let parsed = parse_field_element(&p_plus_one.to_string()).unwrap();
        assert_eq!(parsed, BigUint::from(1u32));
    }

    #[test]
    fn test_parse_rejects_signed_and_garbage() {
        assert!(parse_field_element("-1").is_err());
        assert!(parse_field_element("").is_err());
        assert!(parse_field_element("0x").is_err());
        assert!(parse_field_element("0xzz").is_err());
        assert!(parse_field_element("12ab").is_err());
    }

    #[test]
    fn test_parse_rejects_wider_than_32_bytes() {
        let wide = format!("0x01{}", "00".repeat(32));
        assert!(parse_field_element(&wide).is_err());
    }

    #[test]
    fn test_be_bytes_roundtrip() {
        let value = parse_fq("0x1234").unwrap();
        let bytes = fq_to_be_bytes(&value);
        assert_eq!(&bytes[30..], &[0x12, 0x34]);
        assert!(bytes[..30].iter().all(|b| *b == 0));
        assert_eq!(fq_from_be_bytes(&bytes), value);
        assert_eq!(fq_to_decimal(&value), "4660");
        assert_eq!(fq_to_hex(&value).len(), 66);
    }
}
