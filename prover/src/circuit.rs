//! Circuit identities and proof artifacts

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProverError;

/// The three balance-transition circuits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CircuitId {
    Deposit,
    Withdraw,
    Transfer,
}

impl CircuitId {
    pub const ALL: [CircuitId; 3] = [Self::Deposit, Self::Withdraw, Self::Transfer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Withdraw => "withdraw",
            Self::Transfer => "transfer",
        }
    }

    /// Number of public inputs a proof carries, outputs included
    pub fn public_input_count(&self) -> usize {
        match self {
            Self::Deposit | Self::Withdraw => umbra_balance::codec::DEPOSIT_PUBLIC_INPUTS,
            Self::Transfer => umbra_balance::codec::TRANSFER_PUBLIC_INPUTS,
        }
    }
}

impl fmt::Display for CircuitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CircuitId {
    type Err = ProverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "deposit" => Ok(Self::Deposit),
            "withdraw" => Ok(Self::Withdraw),
            "transfer" => Ok(Self::Transfer),
            other => Err(ProverError::InvalidWitness(format!("unknown circuit {other:?}"))),
        }
    }
}

/// Transcript hash used by the proving system.
///
/// `keccak` produces proofs the EVM verifier accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashingScheme {
    #[default]
    Keccak,
    Poseidon2,
}

impl HashingScheme {
    /// Value of bb's `--oracle_hash` flag
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Keccak => "keccak",
            Self::Poseidon2 => "poseidon2",
        }
    }
}

impl fmt::Display for HashingScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashingScheme {
    type Err = ProverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "keccak" => Ok(Self::Keccak),
            "poseidon2" => Ok(Self::Poseidon2),
            other => Err(ProverError::Serialize(format!("unknown hashing scheme {other:?}"))),
        }
    }
}

/// Options passed to every proof generation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofOptions {
    pub hashing: HashingScheme,
}

/// A generated proof with its public inputs in circuit order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofBundle {
    pub circuit: CircuitId,
    /// Opaque proof bytes
    #[serde(with = "hex::serde")]
    pub proof: Vec<u8>,
    /// `0x`-prefixed 32-byte field elements; declared inputs, then outputs
    pub public_inputs: Vec<String>,
}

impl ProofBundle {
    pub fn proof_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.proof))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circuit_names_roundtrip() {
        for id in CircuitId::ALL {
            assert_eq!(id.as_str().parse::<CircuitId>().unwrap(), id);
        }
        assert!("mint".parse::<CircuitId>().is_err());
    }

    #[test]
    fn test_public_input_counts() {
        assert_eq!(CircuitId::Deposit.public_input_count(), 13);
        assert_eq!(CircuitId::Withdraw.public_input_count(), 13);
        assert_eq!(CircuitId::Transfer.public_input_count(), 22);
    }

    #[test]
    fn test_hashing_defaults_to_keccak() {
        assert_eq!(ProofOptions::default().hashing, HashingScheme::Keccak);
        assert_eq!("POSEIDON2".parse::<HashingScheme>().unwrap(), HashingScheme::Poseidon2);
    }

    #[test]
    fn test_bundle_serializes_proof_as_hex() {
        let bundle = ProofBundle {
            circuit: CircuitId::Deposit,
            proof: vec![0xde, 0xad],
            public_inputs: vec!["0x01".into()],
        };
        let json = serde_json::to_value(&bundle).unwrap();
        assert_eq!(json["proof"], "dead");
        assert_eq!(json["circuit"], "deposit");
        assert_eq!(bundle.proof_hex(), "0xdead");
    }
}
