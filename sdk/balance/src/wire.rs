//! Encrypted balance wire format
//!
//! The contract stores a balance as 128 bytes:
//!
//! ```text
//! 0        32        64        96       128
//! ├─ c1.x ─┼─ c1.y ──┼─ c2.x ──┼─ c2.y ─┤
//! ```
//!
//! Each word is a big-endian field element. A slot that was never written is
//! all zeroes; `c2.x == 0` alone is enough to recognise it.

use std::fmt;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use umbra_elgamal::{Ciphertext, FIELD_BYTES, FIELD_MODULUS, POINT_BYTES, Point};

use crate::error::{BalanceError, Result};

pub const ENCRYPTED_BALANCE_LEN: usize = 2 * POINT_BYTES;

/// Byte range of `c2.x`, the never-funded marker word
const C2_X: std::ops::Range<usize> = POINT_BYTES..POINT_BYTES + FIELD_BYTES;

/// A ciphertext as the contract stores it
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EncryptedBalance([u8; ENCRYPTED_BALANCE_LEN]);

impl EncryptedBalance {
    pub fn zero() -> Self {
        Self([0u8; ENCRYPTED_BALANCE_LEN])
    }

    pub fn new(bytes: [u8; ENCRYPTED_BALANCE_LEN]) -> Self {
        Self(bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; ENCRYPTED_BALANCE_LEN] =
            bytes.try_into().map_err(|_| BalanceError::InvalidLength {
                expected: ENCRYPTED_BALANCE_LEN,
                actual: bytes.len(),
            })?;
        Ok(Self(bytes))
    }

    /// Parse `0x` hex (prefix optional)
    pub fn from_hex(s: &str) -> Result<Self> {
        let s = s.trim();
        let hex_str = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
        let bytes = hex::decode(hex_str)
            .map_err(|e| BalanceError::InvalidFieldElement(format!("encrypted balance: {e}")))?;
        Self::from_bytes(&bytes)
    }

    pub fn from_ciphertext(ciphertext: &Ciphertext) -> Self {
        let mut bytes = [0u8; ENCRYPTED_BALANCE_LEN];
        bytes[..POINT_BYTES].copy_from_slice(&ciphertext.c1.to_bytes());
        bytes[POINT_BYTES..].copy_from_slice(&ciphertext.c2.to_bytes());
        Self(bytes)
    }

    /// Lift to a ciphertext, checking both points lie on the curve.
    /// The all-zero slot maps to [`Ciphertext::zero`].
    pub fn to_ciphertext(&self) -> Result<Ciphertext> {
        if self.0.iter().all(|b| *b == 0) {
            return Ok(Ciphertext::zero());
        }
        let mut c1 = [0u8; POINT_BYTES];
        let mut c2 = [0u8; POINT_BYTES];
        c1.copy_from_slice(&self.0[..POINT_BYTES]);
        c2.copy_from_slice(&self.0[POINT_BYTES..]);
        Ok(Ciphertext {
            c1: Point::from_bytes(&c1)?,
            c2: Point::from_bytes(&c2)?,
        })
    }

    /// True for a balance that has never been funded
    pub fn is_zero_marker(&self) -> bool {
        self.0[C2_X].iter().all(|b| *b == 0)
    }

    pub fn as_bytes(&self) -> &[u8; ENCRYPTED_BALANCE_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// The two points in circuit form
    pub fn points(&self) -> BalancePoints {
        decode_encrypted_balance(&self.0)
    }
}

impl Default for EncryptedBalance {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Debug for EncryptedBalance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncryptedBalance({})", self.to_hex())
    }
}

impl From<&Ciphertext> for EncryptedBalance {
    fn from(ciphertext: &Ciphertext) -> Self {
        Self::from_ciphertext(ciphertext)
    }
}

impl TryFrom<String> for EncryptedBalance {
    type Error = BalanceError;

    fn try_from(s: String) -> Result<Self> {
        Self::from_hex(&s)
    }
}

impl From<EncryptedBalance> for String {
    fn from(balance: EncryptedBalance) -> Self {
        balance.to_hex()
    }
}

/// A point with decimal coordinates, the form Noir prover inputs take
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitPoint {
    pub x: String,
    pub y: String,
}

impl From<&Point> for CircuitPoint {
    fn from(point: &Point) -> Self {
        Self {
            x: point.x_decimal(),
            y: point.y_decimal(),
        }
    }
}

/// An encrypted balance split into its two circuit points
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalancePoints {
    pub x1: CircuitPoint,
    pub x2: CircuitPoint,
}

/// Split 128 wire bytes into `(c1, c2)` with decimal coordinates.
///
/// Words are read as unsigned big-endian integers and reduced modulo the
/// field order. No curve check is made; the circuit does that.
pub fn decode_encrypted_balance(bytes: &[u8; ENCRYPTED_BALANCE_LEN]) -> BalancePoints {
    let word = |i: usize| {
        let start = i * FIELD_BYTES;
        (BigUint::from_bytes_be(&bytes[start..start + FIELD_BYTES]) % &*FIELD_MODULUS).to_string()
    };
    BalancePoints {
        x1: CircuitPoint { x: word(0), y: word(1) },
        x2: CircuitPoint { x: word(2), y: word(3) },
    }
}
