//! Key pairs
//!
//! A private key is a nonzero scalar; the public key is `sk·G`. Keys are
//! generated once when a user registers, and only the public key (as 64
//! bytes, `x || y`) is published to the contract.

use std::fmt;
use std::str::FromStr;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::error::CryptoError;
use crate::point::Point;
use crate::scalar::Scalar;

/// A registered public key, `sk·G`
pub type PublicKey = Point;

/// Secret scalar. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct PrivateKey(Scalar);

impl PrivateKey {
    pub fn new(scalar: Scalar) -> Result<Self, CryptoError> {
        if scalar.is_zero() {
            return Err(CryptoError::InvalidScalar("private key must be nonzero".into()));
        }
        Ok(Self(scalar))
    }

    pub fn scalar(&self) -> &Scalar {
        &self.0
    }

    pub fn public_key(&self) -> Result<PublicKey, CryptoError> {
        Point::generator().mul(&self.0)
    }

    /// Hex text of the secret, for writing key files
    pub fn expose_hex(&self) -> String {
        self.0.to_hex()
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

impl FromStr for PrivateKey {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(Scalar::parse(s)?)
    }
}

impl TryFrom<String> for PrivateKey {
    type Error = CryptoError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[derive(Clone, Debug)]
pub struct KeyPair {
    pub private_key: PrivateKey,
    pub public_key: PublicKey,
}

impl KeyPair {
    /// Derive the public half of a known private scalar
    pub fn from_private_key(private_key: PrivateKey) -> Result<Self, CryptoError> {
        let public_key = private_key.public_key()?;
        Ok(Self {
            private_key,
            public_key,
        })
    }

    /// Fresh key pair from the thread-local CSPRNG
    pub fn generate() -> Result<Self, CryptoError> {
        derive_key_pair(None)
    }
}

/// Derive a key pair.
///
/// Without a seed the scalar comes from the OS-seeded thread RNG. A seed makes
/// the derivation deterministic (SHA-256 of the seed keys a `StdRng`); that
/// path exists for fixtures and must not be used for real accounts.
pub fn derive_key_pair(seed: Option<&[u8]>) -> Result<KeyPair, CryptoError> {
    let scalar = match seed {
        Some(seed) => {
            let digest: [u8; 32] = Sha256::digest(seed).into();
            nonzero_scalar(&mut StdRng::from_seed(digest))
        }
        None => nonzero_scalar(&mut rand::thread_rng()),
    };
    KeyPair::from_private_key(PrivateKey::new(scalar)?)
}

fn nonzero_scalar<R: rand::RngCore + rand::CryptoRng>(rng: &mut R) -> Scalar {
    loop {
        let candidate = Scalar::random(rng);
        if !candidate.is_zero() {
            return candidate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_derivation_is_deterministic() {
        let a = derive_key_pair(Some(b"alice")).unwrap();
        let b = derive_key_pair(Some(b"alice")).unwrap();
        let c = derive_key_pair(Some(b"bob")).unwrap();
        assert_eq!(a.public_key, b.public_key);
        assert_eq!(a.private_key, b.private_key);
        assert_ne!(a.public_key, c.public_key);
    }

    #[test]
    fn test_random_derivation_differs() {
        let a = KeyPair::generate().unwrap();
        let b = KeyPair::generate().unwrap();
        assert_ne!(a.public_key, b.public_key);
        assert!(!a.public_key.is_zero());
    }

    #[test]
    fn test_public_key_is_sk_times_g() {
        let sk = PrivateKey::new(Scalar::from_u64(1)).unwrap();
        let kp = KeyPair::from_private_key(sk).unwrap();
        assert_eq!(kp.public_key, Point::generator());
    }

    #[test]
    fn test_matches_circuit_key_derivation() {
        let kp = KeyPair::from_private_key("42".parse().unwrap()).unwrap();
        assert_eq!(
            kp.public_key.x_decimal(),
            "7356913722468763155518092886238006860757299964193402191943647957243737021149"
        );
        assert_eq!(
            kp.public_key.y_decimal(),
            "8353686781200727416994686754908207716480106082647483667993604622182232784267"
        );
    }

    #[test]
    fn test_zero_private_key_rejected() {
        assert!(PrivateKey::new(Scalar::zero()).is_err());
        assert!("0".parse::<PrivateKey>().is_err());
    }

    #[test]
    fn test_debug_is_redacted() {
        let sk: PrivateKey = "42".parse().unwrap();
        let printed = format!("{sk:?}");
        assert!(!printed.contains("2a"));
        assert!(printed.contains("redacted"));
    }

    #[test]
    fn test_registration_bytes() {
        let kp = derive_key_pair(Some(b"registration")).unwrap();
        let bytes = kp.public_key.to_bytes();
        assert_eq!(bytes.len(), 64);
        assert_eq!(PublicKey::from_bytes(&bytes).unwrap(), kp.public_key);
    }
}
