use std::path::PathBuf;

use thiserror::Error;
use umbra_balance::BalanceError;
use umbra_elgamal::CryptoError;

/// Errors that can occur while preparing witnesses or generating proofs
#[derive(Error, Debug)]
pub enum ProverError {
    /// The declared transition does not satisfy the circuit
    #[error("Invalid witness: {0}")]
    InvalidWitness(String),

    #[error("Amount too large: {0}")]
    AmountTooLarge(String),

    #[error("Circuit not found: {0}")]
    CircuitNotFound(PathBuf),

    #[error("Proof file not found: {0}")]
    ProofFileNotFound(PathBuf),

    #[error("{tool} failed: {message}")]
    Backend { tool: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize inputs: {0}")]
    Serialize(String),

    #[error(transparent)]
    Balance(BalanceError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

impl From<BalanceError> for ProverError {
    fn from(err: BalanceError) -> Self {
        match err {
            BalanceError::AmountTooLarge(msg) => Self::AmountTooLarge(msg),
            BalanceError::Crypto(e) => Self::Crypto(e),
            other => Self::Balance(other),
        }
    }
}

impl From<toml::ser::Error> for ProverError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialize(err.to_string())
    }
}

impl From<serde_json::Error> for ProverError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialize(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ProverError>;
