//! Exponential ElGamal
//!
//! ```text
//! encrypt:  c1 = r·G,  c2 = r·PK + m·G
//! decrypt:  M  = c2 − sk·c1 = m·G,  m = dlog(M)
//! ```
//!
//! The message sits in the exponent, so ciphertexts add: component-wise
//! addition of two ciphertexts under the same key encrypts the sum.

use ark_ec::{CurveGroup, PrimeGroup};
use ark_ff::Zero;
use ark_grumpkin::{Fr, Projective};
use serde::{Deserialize, Serialize};

use crate::bsgs::DiscreteLog;
use crate::error::CryptoError;
use crate::keys::{PrivateKey, PublicKey};
use crate::point::Point;
use crate::scalar::Scalar;

/// An ElGamal ciphertext `(c1, c2)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Ciphertext {
    pub c1: Point,
    pub c2: Point,
}

impl Ciphertext {
    /// All-zero ciphertext, the storage value of a never-funded balance
    pub fn zero() -> Self {
        Self {
            c1: Point::zero(),
            c2: Point::zero(),
        }
    }

    /// A balance slot nobody has written yet has `c2.x == 0`
    pub fn is_zero_marker(&self) -> bool {
        self.c2.x.is_zero()
    }
}

/// Fresh encryption randomness, uniform over 253 bits
pub fn generate_randomness() -> Scalar {
    Scalar::random(&mut rand::thread_rng())
}

/// `m·G`
pub fn message_point(message: u64) -> Point {
    Point::from_projective(&(Projective::generator() * Fr::from(message)))
}

/// Encrypt `message` to `public_key` with caller-supplied randomness.
///
/// The randomness must be fresh for every call: two ciphertexts sharing `r`
/// share `c1`, which links them.
pub fn encrypt(
    public_key: &PublicKey,
    message: u64,
    randomness: &Scalar,
) -> Result<Ciphertext, CryptoError> {
    if public_key.is_zero() {
        return Err(CryptoError::InvalidPoint {
            x: "0".into(),
            y: "0".into(),
        });
    }
    let pk = public_key.to_projective()?;
    let g = Projective::generator();
    let r = randomness.to_field();

    let c1 = g * r;
    let c2 = pk * r + g * Fr::from(message);
    let [c1, c2] = [c1, c2].map(|p| Point::from_projective(&p));
    Ok(Ciphertext { c1, c2 })
}

/// Decrypt with a precomputed discrete-log table.
///
/// The zero marker decrypts to 0 without searching. A miss within the table
/// bound yields `DecryptionFailed`, which is what a wrong key produces.
pub fn decrypt(
    ciphertext: &Ciphertext,
    private_key: &PrivateKey,
    table: &DiscreteLog,
) -> Result<u64, CryptoError> {
    if ciphertext.is_zero_marker() {
        return Ok(0);
    }
    let c1 = ciphertext.c1.to_projective()?;
    let c2 = ciphertext.c2.to_projective()?;
    let m = (c2 - c1 * private_key.scalar().to_field()).into_affine();

    table
        .solve(&m)
        .ok_or(CryptoError::DecryptionFailed { bound: table.bound() })
}

/// `Enc(a) + Enc(b) = Enc(a + b)`. Both must be under the same key; this is
/// not checked.
pub fn homomorphic_add(a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext, CryptoError> {
    Ok(Ciphertext {
        c1: Point::from_projective(&(a.c1.to_projective()? + b.c1.to_projective()?)),
        c2: Point::from_projective(&(a.c2.to_projective()? + b.c2.to_projective()?)),
    })
}

/// `Enc(a) − Enc(b) = Enc(a − b)`
pub fn homomorphic_subtract(a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext, CryptoError> {
    Ok(Ciphertext {
        c1: Point::from_projective(&(a.c1.to_projective()? - b.c1.to_projective()?)),
        c2: Point::from_projective(&(a.c2.to_projective()? - b.c2.to_projective()?)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::KeyPair;

    fn key(sk: u64) -> KeyPair {
        KeyPair::from_private_key(PrivateKey::new(Scalar::from_u64(sk)).unwrap()).unwrap()
    }

    fn table() -> DiscreteLog {
        DiscreteLog::new(1_000_000)
    }

    #[test]
    fn test_roundtrip_known_key() {
        let dlog = table();
        let alice = key(42);
        let ct = encrypt(&alice.public_key, 500, &generate_randomness()).unwrap();
        assert_eq!(decrypt(&ct, &alice.private_key, &dlog).unwrap(), 500);
    }

    /// Ciphertext of 500 under sk = 42, produced by the Noir circuits
    #[test]
    fn test_decrypts_circuit_vector() {
        let dlog = table();
        let ct = Ciphertext {
            c1: Point::from_decimal(
                "4975362976902519270991051485761515025451487065608113469365554307533714678904",
                "11107342823962471378327065917659110680364498807938611326388672169911937649323",
            )
            .unwrap(),
            c2: Point::from_decimal(
                "9863331575647124993747572899844356693180873101289877909455720458809493493815",
                "20667496008998255495504838139471524687995529485879200038689438738233366509677",
            )
            .unwrap(),
        };
        assert_eq!(decrypt(&ct, &key(42).private_key, &dlog).unwrap(), 500);
    }

    #[test]
    fn test_wrong_key_never_yields_plaintext() {
        let dlog = table();
        let alice = key(42);
        let mallory = key(43);
        let ct = encrypt(&alice.public_key, 500, &Scalar::from_u64(7)).unwrap();
        match decrypt(&ct, &mallory.private_key, &dlog) {
            Ok(m) => assert_ne!(m, 500),
            Err(e) => assert_eq!(e, CryptoError::DecryptionFailed { bound: 1_000_000 }),
        }
    }

    #[test]
    fn test_zero_message_roundtrip() {
        let dlog = table();
        let kp = key(1234);
        let ct = encrypt(&kp.public_key, 0, &generate_randomness()).unwrap();
        assert!(!ct.is_zero_marker());
        assert_eq!(decrypt(&ct, &kp.private_key, &dlog).unwrap(), 0);
    }

    #[test]
    fn test_zero_marker_short_circuits() {
        // an empty table cannot solve anything but 0
        let dlog = DiscreteLog::new(1);
        let kp = key(5);
        assert_eq!(decrypt(&Ciphertext::zero(), &kp.private_key, &dlog).unwrap(), 0);
    }

    #[test]
    fn test_homomorphic_add_and_subtract() {
        let dlog = table();
        let kp = key(77);
        let a = encrypt(&kp.public_key, 1_500, &generate_randomness()).unwrap();
        let b = encrypt(&kp.public_key, 250, &generate_randomness()).unwrap();

        let sum = homomorphic_add(&a, &b).unwrap();
        assert_eq!(decrypt(&sum, &kp.private_key, &dlog).unwrap(), 1_750);

        let diff = homomorphic_subtract(&a, &b).unwrap();
        assert_eq!(decrypt(&diff, &kp.private_key, &dlog).unwrap(), 1_250);
    }

    #[test]
    fn test_add_to_zero_ciphertext_is_identity() {
        let dlog = table();
        let kp = key(9);
        let deposit = encrypt(&kp.public_key, 321, &generate_randomness()).unwrap();
        let balance = homomorphic_add(&Ciphertext::zero(), &deposit).unwrap();
        assert_eq!(balance, deposit);
        assert_eq!(decrypt(&balance, &kp.private_key, &dlog).unwrap(), 321);
    }

    #[test]
    fn test_rejects_bad_public_keys() {
        let r = generate_randomness();
        assert!(matches!(
            encrypt(&Point::zero(), 1, &r),
            Err(CryptoError::InvalidPoint { .. })
        ));
        let off_curve = Point {
            x: ark_grumpkin::Fq::from(3u64),
            y: ark_grumpkin::Fq::from(4u64),
        };
        assert!(matches!(
            encrypt(&off_curve, 1, &r),
            Err(CryptoError::InvalidPoint { .. })
        ));
    }

    #[test]
    fn test_same_randomness_links_ciphertexts() {
        let kp = key(11);
        let r = Scalar::from_u64(99);
        let a = encrypt(&kp.public_key, 1, &r).unwrap();
        let b = encrypt(&kp.public_key, 2, &r).unwrap();
        assert_eq!(a.c1, b.c1);
        assert_eq!(message_point(0), Point::zero());
    }
}
