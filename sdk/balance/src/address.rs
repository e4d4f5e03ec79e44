//! 20-byte account and token addresses

use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::error::BalanceError;

pub const ADDRESS_BYTES: usize = 20;

/// An EVM-style address. Circuits take it as a field element in decimal.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(pub [u8; ADDRESS_BYTES]);

impl Address {
    pub fn as_bytes(&self) -> &[u8; ADDRESS_BYTES] {
        &self.0
    }

    /// Decimal text of the address read as a big-endian integer
    pub fn to_decimal(&self) -> String {
        BigUint::from_bytes_be(&self.0).to_string()
    }

    /// The address right-aligned in a zero-padded 32-byte word
    pub fn to_word(&self) -> [u8; 32] {
        let mut word = [0u8; 32];
        word[32 - ADDRESS_BYTES..].copy_from_slice(&self.0);
        word
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = BalanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let hex_str = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
        let bytes = hex::decode(hex_str)
            .map_err(|e| BalanceError::InvalidFieldElement(format!("address {s}: {e}")))?;
        let bytes: [u8; ADDRESS_BYTES] =
            bytes
                .as_slice()
                .try_into()
                .map_err(|_| BalanceError::InvalidLength {
                    expected: ADDRESS_BYTES,
                    actual: bytes.len(),
                })?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for Address {
    type Error = BalanceError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let addr: Address = "0x00000000000000000000000000000000000000ff".parse().unwrap();
        assert_eq!(addr.0[19], 0xff);
        assert_eq!(addr.to_decimal(), "255");
        assert_eq!(addr.to_string(), "0x00000000000000000000000000000000000000ff");
    }

    #[test]
    fn test_rejects_wrong_length() {
        let err = "0x1234".parse::<Address>().unwrap_err();
        assert_eq!(
            err,
            BalanceError::InvalidLength {
                expected: 20,
                actual: 2
            }
        );
        assert!("0xzz".parse::<Address>().is_err());
    }

    #[test]
    fn test_word_is_right_aligned() {
        let addr = Address([0xab; 20]);
        let word = addr.to_word();
        assert!(word[..12].iter().all(|b| *b == 0));
        assert!(word[12..].iter().all(|b| *b == 0xab));
    }
}
