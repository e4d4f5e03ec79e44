//! Scalars modulo the Grumpkin group order
//!
//! Private keys and encryption randomness are both scalars. They are kept as
//! arbitrary-precision integers and only turned into circuit text (decimal)
//! at the prover boundary.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use ark_ff::PrimeField;
use ark_grumpkin::Fr;
use num_bigint::BigUint;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::error::CryptoError;

/// Order of the Grumpkin group, `n`
pub static GROUP_ORDER: LazyLock<BigUint> = LazyLock::new(|| BigUint::from(Fr::MODULUS));

/// High bits cleared from a 256-bit draw; 253 bits always sit below `n`
const RANDOM_TOP_BYTE_MASK: u8 = 0x1f;

/// An integer strictly below the group order
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Scalar(BigUint);

impl Scalar {
    /// Wrap an integer, rejecting anything `>= n`
    pub fn new(value: BigUint) -> Result<Self, CryptoError> {
        if value >= *GROUP_ORDER {
            return Err(CryptoError::InvalidScalar(format!(
                "{value} is not below the group order"
            )));
        }
        Ok(Self(value))
    }

    pub fn from_u64(value: u64) -> Self {
        Self(BigUint::from(value))
    }

    pub fn zero() -> Self {
        Self(BigUint::default())
    }

    /// Uniform 253-bit draw: 32 random bytes with the top 3 bits masked
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);
        bytes[0] &= RANDOM_TOP_BYTE_MASK;
        Self(BigUint::from_bytes_be(&bytes))
    }

    /// Parse `0x` hex or decimal text
    pub fn parse(s: &str) -> Result<Self, CryptoError> {
        let s = s.trim();
        let value = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex_str) if !hex_str.is_empty() && hex_str.chars().all(|c| c.is_ascii_hexdigit()) => {
                BigUint::parse_bytes(hex_str.as_bytes(), 16)
            }
            Some(_) => None,
            None if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) => {
                BigUint::parse_bytes(s.as_bytes(), 10)
            }
            None => None,
        }
        .ok_or_else(|| CryptoError::InvalidScalar(s.to_string()))?;
        Self::new(value)
    }

    pub fn is_zero(&self) -> bool {
        self.0.bits() == 0
    }

    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    /// The scalar as an arkworks field element for curve multiplication
    pub fn to_field(&self) -> Fr {
        Fr::from(self.0.clone())
    }

    /// Decimal text, as nargo expects it
    pub fn to_decimal_string(&self) -> String {
        self.0.to_string()
    }

    /// `0x`-prefixed 64-digit hex
    pub fn to_hex(&self) -> String {
        format!("0x{:0>64}", self.0.to_str_radix(16))
    }
}

impl fmt::Debug for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Scalar({})", self.to_hex())
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Scalar {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Scalar {
    type Error = CryptoError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Scalar> for String {
    fn from(scalar: Scalar) -> Self {
        scalar.to_hex()
    }
}
