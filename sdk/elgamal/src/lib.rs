//! Umbra ElGamal SDK
//!
//! Additively homomorphic ElGamal over Grumpkin, the embedded curve of the
//! BN254 proving system used by the Umbra balance circuits.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Encrypted Balance                          │
//! │                                                                 │
//! │     c1 = r·G                   c2 = r·PK + m·G                  │
//! │  ┌──────────────┐          ┌──────────────────────┐            │
//! │  │  ephemeral   │          │   masked message     │            │
//! │  └──────────────┘          └──────────────────────┘            │
//! │         │                             │                         │
//! │         ▼                             ▼                         │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │  Decrypt: M = c2 − sk·c1, then m = dlog_G(M) via BSGS    │   │
//! │  │  Homomorphic: Enc(a) + Enc(b) = Enc(a + b)               │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod bsgs;
pub mod elgamal;
pub mod error;
pub mod field;
pub mod keys;
pub mod point;
pub mod scalar;

pub use bsgs::DiscreteLog;
pub use elgamal::{
    Ciphertext, decrypt, encrypt, generate_randomness, homomorphic_add, homomorphic_subtract,
    message_point,
};
pub use error::CryptoError;
pub use field::{FIELD_BYTES, FIELD_MODULUS, parse_field_element};
pub use keys::{KeyPair, PrivateKey, PublicKey, derive_key_pair};
pub use point::{POINT_BYTES, Point};
pub use scalar::{GROUP_ORDER, Scalar};

/// Grumpkin base field (equal to the BN254 scalar field).
pub use ark_grumpkin::Fq;
/// Grumpkin scalar field.
pub use ark_grumpkin::Fr;
